use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_data_message_wire_shape() {
    let msg = OutputMessage::data(CellId::from("c1"), "\u{1b}[31mhi\u{1b}[0m", true, 80);
    let value = serde_json::to_value(&msg).unwrap();
    assert_eq!(
        value,
        json!({
            "type": "data",
            "identity": "c1",
            "chunk": "\u{1b}[31mhi\u{1b}[0m",
            "isFirstChunkOfExecution": true,
            "terminalColumns": 80,
        })
    );
}

#[test]
fn test_finished_message_wire_shape() {
    let msg = OutputMessage::finished(CellId::from("c1"));
    let value = serde_json::to_value(&msg).unwrap();
    assert_eq!(value, json!({ "type": "finished", "identity": "c1" }));
}

#[test]
fn test_output_message_deserializes_by_tag() {
    let msg: OutputMessage = serde_json::from_value(json!({
        "type": "data",
        "identity": "c2",
        "chunk": "x",
        "isFirstChunkOfExecution": false,
        "terminalColumns": 120,
    }))
    .unwrap();
    assert!(matches!(msg, OutputMessage::Data(ref data) if data.terminal_columns == 120));
    assert_eq!(msg.identity().as_str(), "c2");

    let err = serde_json::from_value::<OutputMessage>(json!({ "type": "progress", "identity": "c2" }));
    assert!(err.is_err());
}

#[test]
fn test_cell_output_json_line() {
    let replace = CellOutput::Replace("a\nb".to_string());
    assert_eq!(
        serde_json::to_value(&replace).unwrap(),
        json!({ "kind": "replace", "payload": "a\nb" })
    );

    let message: CellOutput = OutputMessage::finished(CellId::from("c1")).into();
    assert_eq!(
        serde_json::to_value(&message).unwrap(),
        json!({ "kind": "message", "payload": { "type": "finished", "identity": "c1" } })
    );
}

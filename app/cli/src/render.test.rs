use super::*;
use pretty_assertions::assert_eq;

fn data(chunk: &str) -> CellOutput {
    CellOutput::Message(OutputMessage::data(CellId::from("c"), chunk, false, 80))
}

fn rendered(mode: RenderMode, items: &[CellOutput], summary: &CellSummary) -> String {
    let mut renderer = Renderer::new(Vec::new(), mode);
    for item in items {
        renderer.item(item).unwrap();
    }
    renderer.summary(summary).unwrap();
    String::from_utf8(renderer.into_inner()).unwrap()
}

fn summary(success: bool, duration_ms: Option<i64>) -> CellSummary {
    CellSummary {
        identity: CellId::from("c"),
        order: None,
        success,
        duration_ms,
    }
}

#[test]
fn test_live_mode_keeps_escapes_and_breaks_before_status() {
    let items = vec![
        data("\u{1b}[31mred\u{1b}[0m"),
        CellOutput::Message(OutputMessage::finished(CellId::from("c"))),
        CellOutput::Replace("red".to_string()),
    ];
    assert_eq!(
        rendered(RenderMode::Live, &items, &summary(true, Some(1_500))),
        "\u{1b}[31mred\u{1b}[0m\n[-] ok in 1.50s\n"
    );
}

#[test]
fn test_plain_mode_strips_chunks() {
    let items = vec![data("\u{1b}[1mbold\u{1b}[0m\r\n"), data("next\r\n")];
    assert_eq!(
        rendered(RenderMode::Plain, &items, &summary(false, Some(20))),
        "bold\nnext\n[-] failed in 20ms\n"
    );
}

#[test]
fn test_error_is_printed_on_its_own_line() {
    let items = vec![CellOutput::Error("undefined value".to_string())];
    assert_eq!(
        rendered(RenderMode::Live, &items, &summary(false, None)),
        "error: undefined value\n[-] failed\n"
    );
}

#[test]
fn test_json_mode_writes_one_object_per_line() {
    let items = vec![data("hi"), CellOutput::Replace("hi".to_string())];
    let text = rendered(RenderMode::Json, &items, &summary(true, Some(3)));
    let lines: Vec<serde_json::Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["kind"], "message");
    assert_eq!(lines[0]["payload"]["type"], "data");
    assert_eq!(lines[0]["payload"]["chunk"], "hi");
    assert_eq!(lines[1]["kind"], "replace");
    assert_eq!(lines[2]["kind"], "ended");
    assert_eq!(lines[2]["payload"]["success"], true);
    assert_eq!(lines[2]["payload"]["durationMs"], 3);
}

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_cell_id_random_is_unique() {
    let a = CellId::new();
    let b = CellId::new();
    assert_ne!(a, b);
    assert!(!a.as_str().is_empty());
}

#[test]
fn test_cell_id_conversions() {
    let id = CellId::from("cell-1");
    assert_eq!(id.as_str(), "cell-1");
    assert_eq!(id.to_string(), "cell-1");
    assert_eq!(CellId::from_string(String::from("cell-1")), id);
    assert_eq!(id.into_inner(), "cell-1");
}

#[test]
fn test_cell_id_serializes_as_plain_string() {
    let id = CellId::from("abc");
    assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
    let back: CellId = serde_json::from_str("\"abc\"").unwrap();
    assert_eq!(back, id);
}

#[test]
fn test_execution_order_is_strictly_increasing() {
    let first = ExecutionOrder::next();
    let second = ExecutionOrder::next();
    let third = ExecutionOrder::next();
    assert!(first < second);
    assert!(second < third);
    assert!(first.value() >= 1);
}

#[test]
fn test_execution_order_is_unique_across_threads() {
    let handles: Vec<_> = (0..8)
        .map(|_| std::thread::spawn(|| (0..100).map(|_| ExecutionOrder::next()).collect::<Vec<_>>()))
        .collect();
    let mut all: Vec<ExecutionOrder> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    let total = all.len();
    all.sort();
    all.dedup();
    assert_eq!(all.len(), total);
}

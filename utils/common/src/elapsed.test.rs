use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_format_sub_second() {
    assert_eq!(format_duration(Duration::from_millis(0)), "0ms");
    assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
    assert_eq!(format_duration(Duration::from_millis(999)), "999ms");
}

#[test]
fn test_format_seconds() {
    assert_eq!(format_duration(Duration::from_millis(1_000)), "1.00s");
    assert_eq!(format_duration(Duration::from_millis(1_500)), "1.50s");
    assert_eq!(format_duration(Duration::from_millis(59_999)), "60.00s");
}

#[test]
fn test_format_minutes() {
    assert_eq!(format_duration(Duration::from_secs(60)), "1m 00s");
    assert_eq!(format_duration(Duration::from_secs(125)), "2m 05s");
}

#[test]
fn test_negative_millis_clamp_to_zero() {
    assert_eq!(format_millis(-40), "0ms");
}

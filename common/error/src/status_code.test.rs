use super::*;
use strum::IntoEnumIterator;

#[test]
fn test_status_code_values() {
    // General categories (01-04)
    assert_eq!(StatusCode::Unknown as i32, 01_000);
    assert_eq!(StatusCode::InvalidJson as i32, 02_002);
    assert_eq!(StatusCode::IoError as i32, 03_000);
    assert_eq!(StatusCode::SpawnFailed as i32, 04_000);

    // Business categories (10-12)
    assert_eq!(StatusCode::InvalidConfig as i32, 10_000);
    assert_eq!(StatusCode::TransformFailed as i32, 11_000);
    assert_eq!(StatusCode::Timeout as i32, 12_000);
}

#[test]
fn test_from_i32() {
    assert_eq!(StatusCode::from_i32(04_002), Some(StatusCode::CommandFailed));
    assert_eq!(StatusCode::from_i32(99_999), None);
}

#[test]
fn test_is_retryable() {
    assert!(StatusCode::Timeout.is_retryable());
    assert!(StatusCode::DriverBusy.is_retryable());
    assert!(!StatusCode::InvalidJson.is_retryable());
    assert!(!StatusCode::TransformFailed.is_retryable());
    assert!(!StatusCode::ShellExited.is_retryable());
}

#[test]
fn test_should_log_error() {
    assert!(StatusCode::Unknown.should_log_error());
    assert!(StatusCode::ShellExited.should_log_error());
    assert!(!StatusCode::CommandFailed.should_log_error());
    assert!(!StatusCode::InvalidConfig.should_log_error());
}

#[test]
fn test_display() {
    assert_eq!(format!("{}", StatusCode::Unknown), "Unknown");
    assert_eq!(format!("{}", StatusCode::QueueClosed), "QueueClosed");
}

#[test]
fn test_name() {
    assert_eq!(StatusCode::TransformFailed.name(), "TransformFailed");
    assert_eq!(StatusCode::ConfigFileError.name(), "ConfigFileError");
}

#[test]
fn test_category() {
    assert_eq!(StatusCode::Unknown.category(), StatusCategory::Common);
    assert_eq!(StatusCode::InvalidJson.category(), StatusCategory::Input);
    assert_eq!(StatusCode::IoError.category(), StatusCategory::IO);
    assert_eq!(StatusCode::ShellExited.category(), StatusCategory::Process);
    assert_eq!(StatusCode::InvalidConfig.category(), StatusCategory::Config);
    assert_eq!(
        StatusCode::QueueClosed.category(),
        StatusCategory::Execution
    );
    assert_eq!(StatusCode::Timeout.category(), StatusCategory::Resource);
}

#[test]
fn test_metadata_consistency() {
    for code in StatusCode::iter() {
        let meta = code.meta();
        let value = code as i32;

        // Verify category matches code range (XX_YYY format)
        match meta.category {
            StatusCategory::Common => assert!((01_000..02_000).contains(&value)),
            StatusCategory::Input => assert!((02_000..03_000).contains(&value)),
            StatusCategory::IO => assert!((03_000..04_000).contains(&value)),
            StatusCategory::Process => assert!((04_000..05_000).contains(&value)),
            StatusCategory::Config => assert!((10_000..11_000).contains(&value)),
            StatusCategory::Execution => assert!((11_000..12_000).contains(&value)),
            StatusCategory::Resource => assert!((12_000..13_000).contains(&value)),
        }
    }
}

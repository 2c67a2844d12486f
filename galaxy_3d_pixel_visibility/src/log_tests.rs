//! Unit tests for log.rs
//!
//! Tests LogSeverity, LogEntry, DefaultLogger and the global logger slot.
//!
//! IMPORTANT: the logger slot is process-wide. Tests that swap it are
//! marked #[serial] so they don't observe each other's entries.

use crate::log::{self, Logger, LogEntry, LogSeverity, DefaultLogger};
use crate::renderer::mock_renderer::CaptureLogger;
use serial_test::serial;
use std::time::SystemTime;

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_debug() {
    assert_eq!(format!("{:?}", LogSeverity::Trace), "Trace");
    assert_eq!(format!("{:?}", LogSeverity::Warn), "Warn");
    assert_eq!(format!("{:?}", LogSeverity::Error), "Error");
}

// ============================================================================
// LOG ENTRY TESTS
// ============================================================================

#[test]
fn test_log_entry_clone() {
    let entry1 = LogEntry {
        severity: LogSeverity::Warn,
        timestamp: SystemTime::now(),
        source: "galaxy3d::PixelVisibility".to_string(),
        message: "query creation failed".to_string(),
        file: Some("system.rs"),
        line: Some(10),
    };

    let entry2 = entry1.clone();

    assert_eq!(entry1.severity, entry2.severity);
    assert_eq!(entry1.source, entry2.source);
    assert_eq!(entry1.message, entry2.message);
    assert_eq!(entry1.file, entry2.file);
    assert_eq!(entry1.line, entry2.line);
}

// ============================================================================
// DEFAULT LOGGER TESTS
// ============================================================================

#[test]
fn test_default_logger_all_severities() {
    let logger = DefaultLogger;
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        // Should not panic
        logger.log(&LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: "galaxy3d::test".to_string(),
            message: format!("{:?} message", severity),
            file: None,
            line: None,
        });
    }
}

#[test]
fn test_default_logger_error_with_file_line() {
    let logger = DefaultLogger;
    logger.log(&LogEntry {
        severity: LogSeverity::Error,
        timestamp: SystemTime::now(),
        source: "galaxy3d::test".to_string(),
        message: "detailed".to_string(),
        file: Some("log_tests.rs"),
        line: Some(99),
    });
}

#[test]
fn test_logger_trait_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DefaultLogger>();
    assert_send_sync::<CaptureLogger>();
}

// ============================================================================
// GLOBAL LOGGER SLOT TESTS
// ============================================================================

#[test]
#[serial]
fn test_set_logger_captures_macros() {
    let capture = CaptureLogger::new();
    log::set_logger(capture.clone());

    crate::pixvis_info!("galaxy3d::LogTest", "hello {}", 1);
    crate::pixvis_warn!("galaxy3d::LogTest", "careful");
    crate::pixvis_error!("galaxy3d::LogTest", "broken");

    // Other tests may log concurrently; only look at ours
    let entries = capture.entries_from("galaxy3d::LogTest");
    log::reset_logger();

    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].severity, LogSeverity::Info);
    assert_eq!(entries[0].message, "hello 1");
    assert_eq!(entries[1].severity, LogSeverity::Warn);
    assert!(entries[1].file.is_none());
    assert_eq!(entries[2].severity, LogSeverity::Error);
    assert!(entries[2].file.is_some());
    assert!(entries[2].line.is_some());
}

#[test]
#[serial]
fn test_reset_logger_stops_capture() {
    let capture = CaptureLogger::new();
    log::set_logger(capture.clone());
    log::reset_logger();

    crate::pixvis_debug!("galaxy3d::LogTest", "not captured");

    assert!(capture.entries_from("galaxy3d::LogTest").is_empty());
}

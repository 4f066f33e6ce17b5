//! Integration tests for retry options loading
//!
//! Covers TOML documents as they appear in service configuration files,
//! including unbounded keywords and camelCase keys.

#![cfg(feature = "foundation")]

use std::time::Duration;

use retryop::backoff::compute_sequence;
use retryop::config::{Retries, RetryOptions};
use retryop::error::{ErrorClassification, ErrorSeverity, RetryError};

/// A full document loads into options that drive the expected sequence.
#[test]
fn test_full_document_drives_sequence() -> anyhow::Result<()> {
    let options = RetryOptions::from_toml_str(
        r#"
        retries = 3
        factor = 3.0
        min_timeout = 10
        max_timeout = 60
        randomize = false
        forever = false
        max_retry_time = 5000
        "#,
    )?;

    assert_eq!(options.retries, Retries::Limited(3));
    assert_eq!(options.max_retry_time, Some(Duration::from_secs(5)));

    let sequence = compute_sequence(&options)?;
    assert_eq!(
        sequence.as_slice(),
        &[Duration::from_millis(10), Duration::from_millis(30), Duration::from_millis(60)]
    );
    Ok(())
}

#[test]
fn test_empty_document_uses_defaults() -> anyhow::Result<()> {
    let options = RetryOptions::from_toml_str("")?;

    assert_eq!(options, RetryOptions::default());
    Ok(())
}

#[test]
fn test_camel_case_keys() -> anyhow::Result<()> {
    let options = RetryOptions::from_toml_str(
        r#"
        minTimeout = 20
        maxTimeout = 40
        maxRetryTime = "inf"
        "#,
    )?;

    assert_eq!(options.min_timeout, Duration::from_millis(20));
    assert_eq!(options.max_timeout, Some(Duration::from_millis(40)));
    assert_eq!(options.max_retry_time, None);
    Ok(())
}

/// Unlimited retries survive a write/read cycle and resolve to forever mode.
#[test]
fn test_unlimited_retries_round_trip() -> anyhow::Result<()> {
    let options = RetryOptions::builder().unlimited_retries().build()?;

    let rendered = options.to_toml_string()?;
    let loaded = RetryOptions::from_toml_str(&rendered)?;

    assert!(loaded.retries.is_unlimited());
    assert!(loaded.resolved_forever());
    assert_eq!(compute_sequence(&loaded)?.len(), 1);
    Ok(())
}

#[test]
fn test_malformed_document_is_serialization_error() {
    let err = RetryOptions::from_toml_str("retries = [1, 2]").unwrap_err();

    assert!(matches!(err, RetryError::Serialization { .. }));
    assert!(!err.is_retryable());
}

#[test]
fn test_invalid_factor_is_config_error() {
    let err = RetryOptions::from_toml_str("factor = -2.0").unwrap_err();

    assert!(err.is_config());
    assert_eq!(err.severity(), ErrorSeverity::Error);
    assert!(err.to_string().contains("factor"));
}

#[test]
fn test_options_from_json() -> anyhow::Result<()> {
    let options: RetryOptions =
        serde_json::from_str(r#"{"retries": "unlimited", "minTimeout": 5, "factor": 1.2}"#)?;

    assert_eq!(options.retries, Retries::Unlimited);
    assert_eq!(options.min_timeout, Duration::from_millis(5));
    assert_eq!(options.factor, 1.2);
    Ok(())
}

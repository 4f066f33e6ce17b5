//! Serialization helpers for durations in retry options
//!
//! Durations are written as integer milliseconds. Ceilings and budgets that
//! may be unbounded accept the keywords `"unlimited"` and `"infinity"` (case
//! insensitive) in place of a number.

use std::time::Duration;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serializer};

/// Keyword written for an unbounded value.
pub const UNBOUNDED_KEYWORD: &str = "unlimited";

/// Whether `value` spells an unbounded limit.
pub fn is_unbounded_keyword(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "unlimited" | "infinity" | "inf")
}

/// Custom serialization module for Duration as milliseconds
///
/// # Usage
/// ```rust
/// use std::time::Duration;
///
/// use retryop::duration_millis;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Example {
///     #[serde(with = "duration_millis")]
///     timeout: Duration,
/// }
/// ```
pub mod duration_millis {
    use super::*;

    type SerializeResult<S> = Result<<S as Serializer>::Ok, <S as Serializer>::Error>;

    /// Serialize a Duration as milliseconds (u64)
    pub fn serialize<S>(duration: &Duration, serializer: S) -> SerializeResult<S>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    /// Deserialize milliseconds (u64) into a Duration
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Optional Duration where `None` means "no limit"
///
/// Serializes `None` as [`UNBOUNDED_KEYWORD`] and accepts either integer
/// milliseconds or an unbounded keyword.
pub mod unbounded_millis {
    use super::*;

    type SerializeResult<S> = Result<<S as Serializer>::Ok, <S as Serializer>::Error>;

    /// Serialize an optional limit
    pub fn serialize<S>(limit: &Option<Duration>, serializer: S) -> SerializeResult<S>
    where
        S: Serializer,
    {
        match limit {
            Some(duration) => super::duration_millis::serialize(duration, serializer),
            None => serializer.serialize_str(UNBOUNDED_KEYWORD),
        }
    }

    /// Deserialize milliseconds or an unbounded keyword
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer
            .deserialize_any(LimitVisitor { expecting: "milliseconds or \"unlimited\"" })
            .map(|limit| limit.map(Duration::from_millis))
    }
}

/// Visitor shared by unbounded limits: integer → `Some`, keyword → `None`.
pub(crate) struct LimitVisitor {
    pub(crate) expecting: &'static str,
}

impl<'de> Visitor<'de> for LimitVisitor {
    type Value = Option<u64>;

    fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.expecting)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(Some(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        u64::try_from(value)
            .map(Some)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(value), &self))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        if value.is_infinite() && value.is_sign_positive() {
            Ok(None)
        } else {
            Err(E::invalid_value(de::Unexpected::Float(value), &self))
        }
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        if is_unbounded_keyword(value) {
            Ok(None)
        } else {
            Err(E::invalid_value(de::Unexpected::Str(value), &self))
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for serialization utilities
    //!
    //! Tests cover duration_millis and unbounded_millis, including the
    //! keyword spellings and rejection of negative values.

    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Limits {
        #[serde(with = "duration_millis")]
        floor: Duration,
        #[serde(with = "unbounded_millis")]
        ceiling: Option<Duration>,
    }

    /// Tests that Duration serializes to milliseconds as u64
    #[test]
    fn test_duration_millis_serialize() {
        let data = Limits { floor: Duration::from_millis(1500), ceiling: None };

        let json = serde_json::to_string(&data).expect("Should serialize valid struct");
        assert_eq!(json, r#"{"floor":1500,"ceiling":"unlimited"}"#);
    }

    /// Validates the unbounded keyword deserialize scenario.
    ///
    /// Assertions:
    /// - Confirms `"Infinity"` and `"unlimited"` both map to `None`.
    /// - Confirms integers map to `Some`.
    #[test]
    fn test_unbounded_millis_keywords() {
        let data: Limits = serde_json::from_str(r#"{"floor":10,"ceiling":"Infinity"}"#).unwrap();
        assert_eq!(data.ceiling, None);

        let data: Limits = serde_json::from_str(r#"{"floor":10,"ceiling":"unlimited"}"#).unwrap();
        assert_eq!(data.ceiling, None);

        let data: Limits = serde_json::from_str(r#"{"floor":10,"ceiling":2500}"#).unwrap();
        assert_eq!(data.ceiling, Some(Duration::from_millis(2500)));
    }

    /// Validates the invalid input scenario.
    ///
    /// Assertions:
    /// - Ensures negative and unknown keyword values are rejected.
    #[test]
    fn test_unbounded_millis_rejects_invalid() {
        let result: Result<Limits, _> = serde_json::from_str(r#"{"floor":10,"ceiling":-5}"#);
        assert!(result.is_err());

        let result: Result<Limits, _> = serde_json::from_str(r#"{"floor":10,"ceiling":"soon"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_is_unbounded_keyword() {
        assert!(is_unbounded_keyword(" INF "));
        assert!(is_unbounded_keyword("Unlimited"));
        assert!(!is_unbounded_keyword("1000"));
    }
}

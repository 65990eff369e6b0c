//! Firehose message decoding and validation
//!
//! Only retweet events drive state. The fields consumed are:
//!
//! ```text
//! { id_str, created_at, retweeted_status: { id_str, text } }
//! ```
//!
//! Everything else in the (large) status object is ignored, so nothing but
//! the extracted fields is retained after validation. That includes
//! `retweeted_status.created_at`: the original is timed by its latest
//! retweet, not by when it was posted.

use chrono::DateTime;
use serde_json::{Map, Value};

/// Twitter's `created_at` layout, e.g. `Mon Jan 01 00:00:00 +0000 2024`
const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

pub type RawRecord = Map<String, Value>;

#[derive(Debug)]
pub enum ValidationError {
    MissingField(&'static str),
    InvalidTimestamp(String),
    /// Well-formed status without `retweeted_status` (original post, delete notice, ...)
    NotARetweet,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingField(field) => write!(f, "Missing or non-string field: {}", field),
            ValidationError::InvalidTimestamp(raw) => write!(f, "Unparseable created_at: {}", raw),
            ValidationError::NotARetweet => write!(f, "Message is not a retweet"),
        }
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug)]
pub enum DecodeError {
    Parse(serde_json::Error),
    Validation(ValidationError),
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::Parse(err)
    }
}

impl From<ValidationError> for DecodeError {
    fn from(err: ValidationError) -> Self {
        DecodeError::Validation(err)
    }
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::Parse(e) => write!(f, "Parse error: {}", e),
            DecodeError::Validation(e) => write!(f, "Validation error: {}", e),
        }
    }
}

impl std::error::Error for DecodeError {}

/// The retweeted original as seen inside a retweet event
#[derive(Debug, Clone, PartialEq)]
pub struct RetweetTarget {
    pub id: String,
    pub text: String,
}

/// Fields extracted from a retweet event
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedTweet {
    pub id: String,
    /// Unix seconds
    pub created_at: i64,
    pub target: RetweetTarget,
}

/// Parse a framed block into a JSON object.
pub fn decode(raw: &[u8]) -> Result<RawRecord, DecodeError> {
    match serde_json::from_slice::<Value>(raw)? {
        Value::Object(map) => Ok(map),
        _ => Err(DecodeError::Validation(ValidationError::MissingField("id_str"))),
    }
}

/// Extract the retweet fields, rejecting anything incomplete.
pub fn validate(record: &RawRecord) -> Result<ValidatedTweet, ValidationError> {
    // Anything without a retweeted status is ignored before field checks
    let status = match record.get("retweeted_status") {
        Some(Value::Object(status)) => status,
        Some(Value::Null) | None => return Err(ValidationError::NotARetweet),
        Some(_) => return Err(ValidationError::MissingField("retweeted_status")),
    };

    let id = string_field(record, "id_str")?;
    let created_raw = string_field(record, "created_at")?;
    let created_at = parse_created_at(created_raw)
        .ok_or_else(|| ValidationError::InvalidTimestamp(created_raw.to_string()))?;

    let target_id = string_field(status, "id_str")
        .map_err(|_| ValidationError::MissingField("retweeted_status.id_str"))?;
    // Empty text is legal (media-only posts)
    let target_text = status
        .get("text")
        .and_then(Value::as_str)
        .ok_or(ValidationError::MissingField("retweeted_status.text"))?;

    Ok(ValidatedTweet {
        id: id.to_string(),
        created_at,
        target: RetweetTarget {
            id: target_id.to_string(),
            text: target_text.to_string(),
        },
    })
}

/// `decode` followed by `validate`
pub fn decode_tweet(raw: &[u8]) -> Result<ValidatedTweet, DecodeError> {
    let record = decode(raw)?;
    Ok(validate(&record)?)
}

/// Parse a `created_at` value into Unix seconds.
///
/// Accepts the feed's native layout and, for replayed captures, RFC 3339.
pub fn parse_created_at(raw: &str) -> Option<i64> {
    DateTime::parse_from_str(raw, CREATED_AT_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.timestamp())
        .ok()
}

fn string_field<'a>(record: &'a RawRecord, field: &'static str) -> Result<&'a str, ValidationError> {
    record
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or(ValidationError::MissingField(field))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RETWEET: &str = r#"{"id_str":"1","created_at":"Mon Jan 01 00:00:00 +0000 2024","text":"RT @a: hello","retweeted_status":{"id_str":"100","text":"hello","created_at":"Sun Dec 31 23:00:00 +0000 2023","user":{"id":5}}}"#;

    #[test]
    fn test_parse_retweet() {
        let tweet = decode_tweet(RETWEET.as_bytes()).unwrap();

        assert_eq!(tweet.id, "1");
        assert_eq!(tweet.created_at, 1_704_067_200);
        assert_eq!(tweet.target.id, "100");
        assert_eq!(tweet.target.text, "hello");
    }

    #[test]
    fn test_target_created_at_is_ignored() {
        let raw = r#"{"id_str":"1","created_at":"Mon Jan 01 00:00:00 +0000 2024","retweeted_status":{"id_str":"100","text":"hello","created_at":"yesterday"}}"#;
        let tweet = decode_tweet(raw.as_bytes()).unwrap();
        assert_eq!(
            tweet.target,
            RetweetTarget {
                id: "100".to_string(),
                text: "hello".to_string(),
            }
        );
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = decode_tweet(br#"{"text":"smile :}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Parse(_)));
    }

    #[test]
    fn test_original_post_is_not_a_retweet() {
        let raw = r#"{"id_str":"2","created_at":"Mon Jan 01 00:00:00 +0000 2024","text":"original"}"#;
        let err = decode_tweet(raw.as_bytes()).unwrap_err();
        assert!(matches!(err, DecodeError::Validation(ValidationError::NotARetweet)));
    }

    #[test]
    fn test_missing_fields() {
        let cases = [
            (r#"{"created_at":"Mon Jan 01 00:00:00 +0000 2024","retweeted_status":{"id_str":"1","text":"t"}}"#, "id_str"),
            (r#"{"id_str":"1","retweeted_status":{"id_str":"1","text":"t"}}"#, "created_at"),
            (r#"{"id_str":"1","created_at":"Mon Jan 01 00:00:00 +0000 2024","retweeted_status":{"text":"t"}}"#, "retweeted_status.id_str"),
            (r#"{"id_str":"1","created_at":"Mon Jan 01 00:00:00 +0000 2024","retweeted_status":{"id_str":"9"}}"#, "retweeted_status.text"),
            (r#"{"id_str":"1","created_at":"Mon Jan 01 00:00:00 +0000 2024","retweeted_status":"9"}"#, "retweeted_status"),
        ];

        for (raw, expected) in cases {
            match decode_tweet(raw.as_bytes()) {
                Err(DecodeError::Validation(ValidationError::MissingField(field))) => {
                    assert_eq!(field, expected, "input: {}", raw)
                }
                other => panic!("expected missing {} for {}, got {:?}", expected, raw, other),
            }
        }
    }

    #[test]
    fn test_bad_timestamp() {
        let raw = r#"{"id_str":"1","created_at":"not a date","retweeted_status":{"id_str":"9","text":"t"}}"#;
        let err = decode_tweet(raw.as_bytes()).unwrap_err();
        assert!(matches!(err, DecodeError::Validation(ValidationError::InvalidTimestamp(_))));
    }

    #[test]
    fn test_delete_notice_is_not_a_retweet() {
        let err = decode_tweet(br#"{"delete":{"status":{"id_str":"7"}}}"#).unwrap_err();
        assert!(matches!(err, DecodeError::Validation(ValidationError::NotARetweet)));
    }

    #[test]
    fn test_non_object_json() {
        assert!(decode(b"[1,2]").is_err());
    }

    #[test]
    fn test_rfc3339_timestamps_accepted() {
        assert_eq!(parse_created_at("2024-01-01T00:00:30Z"), Some(1_704_067_230));
    }
}

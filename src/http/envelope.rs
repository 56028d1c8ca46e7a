//! The uniform backend response wrapper.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Message used by [`ApiEnvelope::empty_success`].
pub const EMPTY_SUCCESS_MESSAGE: &str = "OK";

/// Every backend response: `{ is_success, message, data, errors? }`.
///
/// When `is_success` is `false` the `data` field must not be trusted, even if
/// it is present. A missing `is_success` is read as `false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T = Value> {
    /// Success flag set by the backend.
    #[serde(default)]
    pub is_success: bool,
    /// Human-readable message; `null` reads as empty.
    #[serde(default, deserialize_with = "deserialize_message")]
    pub message: String,
    /// Typed payload.
    #[serde(default)]
    pub data: T,
    /// Optional error details.
    #[serde(
        default,
        deserialize_with = "deserialize_errors",
        skip_serializing_if = "Option::is_none"
    )]
    pub errors: Option<Vec<String>>,
}

impl ApiEnvelope<Value> {
    /// The envelope synthesised for an empty 2xx body:
    /// `{ is_success: true, message: "OK", data: null }`.
    #[must_use]
    pub fn empty_success() -> Self {
        Self {
            is_success: true,
            message: EMPTY_SUCCESS_MESSAGE.to_string(),
            data: Value::Null,
            errors: None,
        }
    }

    /// Decodes the payload into a concrete type.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when `data` does not have the expected shape.
    pub fn decode<T: DeserializeOwned>(self) -> Result<ApiEnvelope<T>, serde_json::Error> {
        Ok(ApiEnvelope {
            is_success: self.is_success,
            message: self.message,
            data: serde_json::from_value(self.data)?,
            errors: self.errors,
        })
    }
}

impl<T> ApiEnvelope<T> {
    /// The backend message, or `fallback` when the backend sent none.
    #[must_use]
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.message.is_empty() {
            fallback
        } else {
            &self.message
        }
    }

    /// Error details, empty when absent.
    #[must_use]
    pub fn error_list(&self) -> &[String] {
        self.errors.as_deref().unwrap_or_default()
    }
}

fn deserialize_message<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// Validation failures from the backend carry structured objects instead of strings.
fn deserialize_errors<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    Ok(raw.map(|entries| {
        entries
            .into_iter()
            .map(|entry| match entry {
                Value::String(text) => text,
                other => other.to_string(),
            })
            .collect()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn test_empty_success() {
        let envelope = ApiEnvelope::empty_success();
        assert!(envelope.is_success);
        assert_eq!(envelope.message, "OK");
        assert_eq!(envelope.data, Value::Null);
        assert!(envelope.errors.is_none());
    }

    #[rstest]
    fn test_missing_success_flag_reads_false() {
        let envelope: ApiEnvelope = serde_json::from_value(json!({ "message": "oops" })).unwrap();
        assert!(!envelope.is_success);
        assert_eq!(envelope.data, Value::Null);
    }

    #[rstest]
    #[case(json!(null), Vec::<String>::new())]
    #[case(json!(["a", "b"]), vec!["a".to_string(), "b".to_string()])]
    #[case(json!([{"loc": ["name"], "msg": "field required"}]), vec![r#"{"loc":["name"],"msg":"field required"}"#.to_string()])]
    fn test_errors_are_lenient(#[case] errors: Value, #[case] expected: Vec<String>) {
        let envelope: ApiEnvelope = serde_json::from_value(json!({
            "is_success": false,
            "message": "Validation Error",
            "errors": errors,
        }))
        .unwrap();
        assert_eq!(envelope.error_list(), expected.as_slice());
    }

    #[rstest]
    fn test_null_message_reads_empty() {
        let envelope: ApiEnvelope =
            serde_json::from_value(json!({ "is_success": true, "message": null, "data": 1 }))
                .unwrap();
        assert!(envelope.is_success);
        assert!(envelope.message.is_empty());
        assert_eq!(envelope.message_or("fallback"), "fallback");
    }

    #[rstest]
    fn test_message_or_fallback() {
        let mut envelope = ApiEnvelope::empty_success();
        assert_eq!(envelope.message_or("fallback"), "OK");
        envelope.message.clear();
        assert_eq!(envelope.message_or("fallback"), "fallback");
    }

    #[rstest]
    fn test_decode_payload() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Payload {
            insights: Vec<String>,
        }

        let envelope: ApiEnvelope = serde_json::from_value(json!({
            "is_success": true,
            "message": "OK",
            "data": { "insights": ["save more"] },
        }))
        .unwrap();

        let decoded = envelope.decode::<Payload>().unwrap();
        assert_eq!(decoded.data.insights, vec!["save more".to_string()]);
    }
}

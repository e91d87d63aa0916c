//! The uniform response wrapper every backend endpoint returns.
//!
//! `{ "status": bool, "data": .., "pages": { "page", "page_size", "total" },
//!   "request_id": "..", "error": ".." }`

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Pagination block attached to list responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Pages {
    #[serde(default)]
    pub page: u64,
    #[serde(default)]
    pub page_size: u64,
    /// Item count across all pages.
    #[serde(default)]
    pub total: u64,
}

/// Parsed response body.
#[derive(Debug, Clone)]
pub struct Envelope<T> {
    pub status: bool,
    pub data: Option<T>,
    pub pages: Option<Pages>,
    pub request_id: String,
    pub error: Option<String>,
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Build an envelope from a raw JSON body.
    ///
    /// `status` is classified with [`is_truthy`] rather than strictly as a bool.
    /// `data` and `pages` are decoded into their typed forms; a `null` or
    /// missing field becomes `None`.
    pub fn from_value(mut body: Value) -> Result<Self, serde_json::Error> {
        let status = body.get("status").map(is_truthy).unwrap_or(false);
        let request_id = request_id_of(&body).unwrap_or_default();
        let error = body
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string);
        let pages = take_typed(&mut body, "pages")?;
        let data = take_typed(&mut body, "data")?;

        Ok(Self {
            status,
            data,
            pages,
            request_id,
            error,
        })
    }
}

impl<T> Envelope<T> {
    /// Total reported by the server, 0 when the endpoint is not paginated.
    pub fn total(&self) -> u64 {
        self.pages.map(|p| p.total).unwrap_or(0)
    }
}

fn take_typed<U: DeserializeOwned>(
    body: &mut Value,
    field: &str,
) -> Result<Option<U>, serde_json::Error> {
    match body.get_mut(field).map(Value::take) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => serde_json::from_value(v).map(Some),
    }
}

/// JavaScript-style truthiness of the raw `status` field.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Pull `request_id` out of a raw body, if the body has one.
pub fn request_id_of(value: &Value) -> Option<String> {
    value
        .get("request_id")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthiness() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("ok")));
        assert!(is_truthy(&json!({})));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&Value::Null));
    }

    #[test]
    fn test_envelope_without_pages() {
        let env: Envelope<u64> =
            Envelope::from_value(json!({"status": true, "data": 7, "request_id": "r1"})).unwrap();
        assert!(env.status);
        assert_eq!(env.data, Some(7));
        assert_eq!(env.total(), 0);
        assert_eq!(env.request_id, "r1");
    }

    #[test]
    fn test_envelope_with_pages() {
        let env: Envelope<Vec<u32>> = Envelope::from_value(json!({
            "status": true,
            "data": [1, 2, 3],
            "pages": {"page": 1, "page_size": 10, "total": 23},
            "request_id": "r2"
        }))
        .unwrap();
        assert_eq!(env.total(), 23);
        assert_eq!(env.data.unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_envelope_failed_has_no_data() {
        let env: Envelope<Vec<String>> = Envelope::from_value(
            json!({"status": false, "request_id": "abc", "error": "record not found"}),
        )
        .unwrap();
        assert!(!env.status);
        assert!(env.data.is_none());
        assert_eq!(env.error.as_deref(), Some("record not found"));
    }

    #[test]
    fn test_envelope_data_type_mismatch() {
        let result: Result<Envelope<Vec<u32>>, _> =
            Envelope::from_value(json!({"status": true, "data": "nope"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_request_id_of() {
        assert_eq!(request_id_of(&json!({"request_id": "abc"})), Some("abc".into()));
        assert_eq!(request_id_of(&json!({"request_id": ""})), None);
        assert_eq!(request_id_of(&json!([1, 2])), None);
    }
}

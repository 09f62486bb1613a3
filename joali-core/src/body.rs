//! Defensive decoding of response bodies
//!
//! The backend sometimes answers with an empty body or plain text where JSON
//! is expected. Every body is decoded into a tagged `Body` first, so callers
//! decide explicitly what an empty or unparseable body means for them.

use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Body<T> {
    Parsed(T),
    Empty,
    /// Body present but not decodable as `T`; holds the decode error
    Invalid(String),
}

impl<T: DeserializeOwned> Body<T> {
    pub fn parse(text: &str) -> Self {
        if text.trim().is_empty() {
            return Body::Empty;
        }
        match serde_json::from_str(text) {
            Ok(value) => Body::Parsed(value),
            Err(e) => Body::Invalid(e.to_string()),
        }
    }
}

impl<T> Body<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Body::Parsed(value) => Some(value),
            Body::Empty | Body::Invalid(_) => None,
        }
    }
}

/// Decode a listing; anything but a well-formed array yields an empty list
pub fn parse_list<T: DeserializeOwned>(text: &str) -> Vec<T> {
    match Body::<Vec<T>>::parse(text) {
        Body::Parsed(items) => items,
        Body::Empty => Vec::new(),
        Body::Invalid(e) => {
            tracing::warn!(error = %e, "Listing body was not a valid array, using empty list");
            Vec::new()
        }
    }
}

/// Human-readable message from an error payload, or `fallback`
pub fn error_message(text: &str, fallback: &str) -> String {
    match Body::<Value>::parse(text) {
        Body::Parsed(value) => value
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.trim().is_empty())
            .map(String::from)
            .unwrap_or_else(|| fallback.to_string()),
        Body::Empty | Body::Invalid(_) => fallback.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, serde::Deserialize, PartialEq)]
    struct Item {
        id: i64,
    }

    #[test]
    fn test_body_variants() {
        assert_eq!(Body::<Item>::parse(""), Body::Empty);
        assert_eq!(Body::<Item>::parse("  \n"), Body::Empty);
        assert_eq!(Body::<Item>::parse(r#"{"id": 4}"#), Body::Parsed(Item { id: 4 }));
        assert!(matches!(Body::<Item>::parse("<html>"), Body::Invalid(_)));
        assert_eq!(Body::<Item>::parse("oops").into_option(), None);
    }

    #[test]
    fn test_parse_list_never_fails() {
        assert_eq!(parse_list::<Item>(""), vec![]);
        assert_eq!(parse_list::<Item>("not json"), vec![]);
        assert_eq!(parse_list::<Item>(r#"{"message": "ok"}"#), vec![]);
        assert_eq!(parse_list::<Item>("null"), vec![]);
        assert_eq!(
            parse_list::<Item>(r#"[{"id": 1}, {"id": 2}]"#),
            vec![Item { id: 1 }, Item { id: 2 }]
        );
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            error_message(r#"{"message": "Invalid credentials"}"#, "Login failed"),
            "Invalid credentials"
        );
        assert_eq!(error_message("", "Login failed"), "Login failed");
        assert_eq!(error_message("Bad Gateway", "Login failed"), "Login failed");
        assert_eq!(error_message(r#"{"message": ""}"#, "Login failed"), "Login failed");
        assert_eq!(error_message(r#"{"errors": {}}"#, "Login failed"), "Login failed");
    }
}

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::error::MaskError;
use crate::writer::{Event, EventProcessor};

/// Replacement written in place of every masked value.
pub const MASK: &str = "***";

/// Field names whose values never reach the log output.
///
/// Matched exactly against event keys, JSON object keys and query parameter
/// names; the XML masker matches them case-insensitively as name suffixes.
pub const SENSITIVE_KEYWORDS: &[&str] = &["password", "pin", "cvv", "cvc", "card_number", "secret"];

/// Masks sensitive top-level fields and sensitive keys inside string fields
/// that hold a JSON object or a URL query string.
#[derive(Debug, Clone, Copy)]
pub struct FieldMasker {
    keywords: &'static [&'static str],
}

impl FieldMasker {
    pub fn new() -> Self {
        Self {
            keywords: SENSITIVE_KEYWORDS,
        }
    }

    pub fn with_keywords(keywords: &'static [&'static str]) -> Self {
        Self { keywords }
    }

    /// Mask an event in place: sensitive keys first, then every string value.
    ///
    /// # Errors
    ///
    /// Fails only when a masked sub-document cannot be serialized again.
    pub fn mask_event(&self, event: &mut Event) -> Result<(), MaskError> {
        mask_map(event, self.keywords);

        for (key, value) in event.iter_mut() {
            if let Value::String(text) = value {
                let masked = mask_string(text, self.keywords).map_err(|source| MaskError::Field {
                    field: key.clone(),
                    source: Box::new(source),
                })?;
                *text = masked;
            }
        }

        Ok(())
    }

    /// Mask a single value. Non-string values are returned unchanged.
    ///
    /// # Errors
    ///
    /// Fails only when a masked sub-document cannot be serialized again.
    pub fn mask_value(&self, value: &Value) -> Result<Value, MaskError> {
        match value {
            Value::String(text) => Ok(Value::String(mask_string(text, self.keywords)?)),
            other => Ok(other.clone()),
        }
    }
}

impl Default for FieldMasker {
    fn default() -> Self {
        Self::new()
    }
}

impl EventProcessor for FieldMasker {
    fn process(&self, event: &mut Event) -> Result<(), MaskError> {
        self.mask_event(event)
    }
}

/// Try the value as a JSON object, then as a query string; otherwise keep it.
fn mask_string(value: &str, keywords: &[&str]) -> Result<String, MaskError> {
    if let Some(masked) = mask_json(value, keywords)? {
        return Ok(masked);
    }

    if let Some(masked) = mask_query(value, keywords) {
        return Ok(masked);
    }

    Ok(value.to_string())
}

/// Replace the value of every present, non-null keyword key. Returns whether
/// anything was replaced.
fn mask_map(map: &mut Map<String, Value>, keywords: &[&str]) -> bool {
    let mut changed = false;
    for keyword in keywords {
        if let Some(value) = map.get_mut(*keyword) {
            if !value.is_null() {
                *value = Value::String(MASK.to_string());
                changed = true;
            }
        }
    }

    changed
}

/// `Ok(None)` when `data` is not a JSON object.
fn mask_json(data: &str, keywords: &[&str]) -> Result<Option<String>, MaskError> {
    let Ok(mut object) = serde_json::from_str::<Map<String, Value>>(data) else {
        return Ok(None);
    };

    if !mask_map(&mut object, keywords) {
        return Ok(Some(data.to_string()));
    }

    serde_json::to_string(&object)
        .map(Some)
        .map_err(MaskError::JsonEncode)
}

/// `None` when `data` is not a query string.
fn mask_query(data: &str, keywords: &[&str]) -> Option<String> {
    let pairs = parse_query(data)?;

    let mut query: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, value) in pairs {
        query.entry(key).or_default().push(value);
    }

    let mut changed = false;
    for keyword in keywords {
        if let Some(values) = query.get_mut(*keyword) {
            if !values.is_empty() {
                *values = vec![MASK.to_string()];
                changed = true;
            }
        }
    }

    if !changed {
        return Some(data.to_string());
    }

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, values) in &query {
        for value in values {
            serializer.append_pair(key, value);
        }
    }

    Some(serializer.finish())
}

/// Semicolon separators and malformed percent escapes disqualify a query.
fn parse_query(data: &str) -> Option<Vec<(String, String)>> {
    if data.contains(';') || !has_valid_escapes(data) {
        return None;
    }

    Some(form_urlencoded::parse(data.as_bytes()).into_owned().collect())
}

fn has_valid_escapes(data: &str) -> bool {
    let mut rest = data;
    while let Some(pos) = rest.find('%') {
        match rest.get(pos + 1..pos + 3) {
            Some(hex) if hex.bytes().all(|b| b.is_ascii_hexdigit()) => {
                rest = rest.get(pos + 3..).unwrap_or("");
            }
            _ => return false,
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(value: Value) -> Event {
        match value {
            Value::Object(map) => map,
            _ => panic!("test event must be an object"),
        }
    }

    #[test]
    fn test_top_level_keyword_is_masked() {
        let mut e = event(json!({"password": "s3cret", "user": "bob"}));
        FieldMasker::new().mask_event(&mut e).unwrap();

        assert_eq!(e["password"], json!("***"));
        assert_eq!(e["user"], json!("bob"));
    }

    #[test]
    fn test_null_keyword_is_left_alone() {
        let mut e = event(json!({"password": null}));
        FieldMasker::new().mask_event(&mut e).unwrap();
        assert_eq!(e["password"], Value::Null);
    }

    #[test]
    fn test_embedded_json_is_masked() {
        let mut e = event(json!({"metadata": "{\"password\":\"s3cret\",\"user\":\"bob\"}"}));
        FieldMasker::new().mask_event(&mut e).unwrap();

        assert_eq!(e["metadata"], json!("{\"password\":\"***\",\"user\":\"bob\"}"));
    }

    #[test]
    fn test_embedded_json_without_keyword_keeps_original_bytes() {
        let original = "{ \"user\" : \"bob\",  \"n\": 1.50 }";
        let mut e = event(json!({ "metadata": original }));
        FieldMasker::new().mask_event(&mut e).unwrap();

        assert_eq!(e["metadata"], json!(original));
    }

    #[test]
    fn test_nested_json_objects_are_not_descended() {
        let original = "{\"user\":{\"password\":\"s3cret\"}}";
        let masked = FieldMasker::new().mask_value(&json!(original)).unwrap();
        assert_eq!(masked, json!(original));
    }

    #[test]
    fn test_query_string_is_masked() {
        let masked = FieldMasker::new()
            .mask_value(&json!("user=bob&password=s3cret&password=again"))
            .unwrap();

        assert_eq!(masked, json!("password=***&user=bob"));
    }

    #[test]
    fn test_query_string_without_keyword_is_unchanged() {
        let original = "user=bob&lang=en";
        assert_eq!(FieldMasker::new().mask_value(&json!(original)).unwrap(), json!(original));
    }

    #[test]
    fn test_invalid_escape_is_not_a_query() {
        let original = "password=%zz";
        assert_eq!(FieldMasker::new().mask_value(&json!(original)).unwrap(), json!(original));
    }

    #[test]
    fn test_semicolon_is_not_a_query() {
        let original = "password=a;user=b";
        assert_eq!(FieldMasker::new().mask_value(&json!(original)).unwrap(), json!(original));
    }

    #[test]
    fn test_bare_keyword_reads_as_query_parameter() {
        let masked = FieldMasker::new().mask_value(&json!("password")).unwrap();
        assert_eq!(masked, json!("password=***"));
    }

    #[test]
    fn test_plain_text_and_scalars_pass_through() {
        let masker = FieldMasker::new();
        for value in [json!("user logged in"), json!(42), json!(true), json!(null), json!(["password"])] {
            assert_eq!(masker.mask_value(&value).unwrap(), value);
        }
    }

    #[test]
    fn test_custom_keywords() {
        let masker = FieldMasker::with_keywords(&["iban"]);
        let mut e = event(json!({"iban": "EE38", "password": "kept"}));
        masker.mask_event(&mut e).unwrap();

        assert_eq!(e["iban"], json!("***"));
        assert_eq!(e["password"], json!("kept"));
    }

    #[test]
    fn test_escape_validation() {
        assert!(has_valid_escapes("a=%20b"));
        assert!(has_valid_escapes("no escapes"));
        assert!(!has_valid_escapes("a=%2"));
        assert!(!has_valid_escapes("a=%g0"));
    }
}

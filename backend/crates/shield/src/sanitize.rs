//! Payload Sanitizer
//!
//! Rewrites request bodies and query strings in place before any handler
//! sees them:
//!
//! - keys used for prototype pollution are dropped
//! - keys that look like NoSQL operators (`$` prefix, any `.`) are rewritten
//! - string leaves are HTML-escaped, trimmed and capped at
//!   [`MAX_STRING_CHARS`]; a string matching an XSS rule becomes `""`
//! - an `image` field holding a data or http(s) URL is left untouched

use serde_json::{Map, Value};

use crate::patterns;

/// Longest string leaf kept after sanitizing
pub const MAX_STRING_CHARS: usize = 1000;

/// Keys deleted wherever they appear
pub const POLLUTION_KEYS: &[&str] = &["__proto__", "constructor", "prototype"];

/// Field exempt from sanitizing when it holds an image URL
pub const IMAGE_FIELD: &str = "image";

const IMAGE_PREFIXES: &[&str] = &["data:image/", "https://", "http://"];

/// HTML-escape the characters that can break out of markup or attributes
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            '\\' => out.push_str("&#x5C;"),
            '`' => out.push_str("&#x60;"),
            other => out.push(other),
        }
    }
    out
}

/// Sanitize one string leaf.
///
/// The XSS check runs on the input, not the escaped form, and wins over
/// escaping.
pub fn sanitize_string(input: &str) -> String {
    if let Some(rule) = patterns::xss().classify(input) {
        tracing::warn!(rule, "XSS payload blanked");
        return String::new();
    }
    let escaped = escape_html(input);
    escaped.trim().chars().take(MAX_STRING_CHARS).collect()
}

/// Rewrite a key that could be read as a NoSQL operator or path.
/// Returns `None` when the key is already safe.
pub fn neutralize_key(key: &str) -> Option<String> {
    if !key.starts_with('$') && !key.contains('.') {
        return None;
    }
    let (prefix, rest) = match key.strip_prefix('$') {
        Some(rest) => ("_", rest),
        None => ("", key),
    };
    Some(format!("{prefix}{}", rest.replace('.', "_")))
}

pub fn is_pollution_key(key: &str) -> bool {
    POLLUTION_KEYS.contains(&key)
}

fn is_exempt_image(key: &str, value: Option<&str>) -> bool {
    key == IMAGE_FIELD && value.is_some_and(|s| IMAGE_PREFIXES.iter().any(|p| s.starts_with(p)))
}

/// Sanitize a JSON value recursively, in place
pub fn sanitize_value(value: &mut Value) {
    match value {
        Value::String(s) => *s = sanitize_string(s),
        Value::Array(items) => items.iter_mut().for_each(sanitize_value),
        Value::Object(map) => sanitize_object(map),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

fn sanitize_object(map: &mut Map<String, Value>) {
    let entries = std::mem::take(map);
    for (key, mut child) in entries {
        let key = match neutralize_key(&key) {
            Some(rewritten) => {
                tracing::warn!(key = %key, "NoSQL operator key rewritten");
                rewritten
            }
            None => key,
        };
        if is_pollution_key(&key) {
            tracing::warn!(key = %key, "Prototype pollution key dropped");
            continue;
        }
        if !is_exempt_image(&key, child.as_str()) {
            sanitize_value(&mut child);
        }
        map.insert(key, child);
    }
}

/// Decoded and cleaned query string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanitizedQuery {
    /// One pair per distinct key, in first-seen order
    pub pairs: Vec<(String, String)>,
}

impl SanitizedQuery {
    /// Decode, collapse duplicate keys to their last value, then sanitize.
    pub fn parse(raw: &str) -> Result<Self, serde_urlencoded::de::Error> {
        let decoded: Vec<(String, String)> = serde_urlencoded::from_str(raw)?;
        let mut pairs: Vec<(String, String)> = Vec::with_capacity(decoded.len());

        for (key, value) in decoded {
            let key = neutralize_key(&key).unwrap_or(key);
            if is_pollution_key(&key) {
                tracing::warn!(key = %key, "Prototype pollution key dropped from query");
                continue;
            }
            let value = if is_exempt_image(&key, Some(&value)) {
                value
            } else {
                sanitize_string(&value)
            };
            match pairs.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => {
                    tracing::debug!(key = %key, "Duplicate query parameter collapsed");
                    slot.1 = value;
                }
                None => pairs.push((key, value)),
            }
        }

        Ok(Self { pairs })
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Re-encode for the rewritten request URI
    pub fn encode(&self) -> Result<String, serde_urlencoded::ser::Error> {
        serde_urlencoded::to_string(&self.pairs)
    }

    /// JSON object form, used as part of the pattern-guard surface
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.pairs
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"a" & 'b' / \ `c`</b>"#),
            "&lt;b&gt;&quot;a&quot; & &#x27;b&#x27; &#x2F; &#x5C; &#x60;c&#x60;&lt;&#x2F;b&gt;"
        );
    }

    #[test]
    fn test_script_string_is_blanked() {
        assert_eq!(sanitize_string("<script>alert(1)</script>"), "");
        assert_eq!(sanitize_string("hello <SCRIPT src=x>"), "");
        assert_eq!(sanitize_string("<img src=x onerror=alert(1)>"), "");
    }

    #[test]
    fn test_plain_string_is_escaped_and_trimmed() {
        assert_eq!(sanitize_string("  a > b  "), "a &gt; b");
        assert_eq!(sanitize_string("مرحبا بكم"), "مرحبا بكم");
    }

    #[test]
    fn test_truncates_by_characters() {
        let long = "ب".repeat(MAX_STRING_CHARS + 50);
        let out = sanitize_string(&long);
        assert_eq!(out.chars().count(), MAX_STRING_CHARS);
    }

    #[test]
    fn test_neutralize_key() {
        assert_eq!(neutralize_key("$gt").as_deref(), Some("_gt"));
        assert_eq!(neutralize_key("a.b.c").as_deref(), Some("a_b_c"));
        assert_eq!(neutralize_key("$where.x").as_deref(), Some("_where_x"));
        assert_eq!(neutralize_key("price$"), None);
        assert_eq!(neutralize_key("name"), None);
    }

    #[test]
    fn test_pollution_keys_removed_at_every_depth() {
        let mut value: Value = serde_json::from_str(
            r#"{"__proto__":{"isAdmin":true},"a":{"constructor":1,"b":[{"prototype":2,"c":"ok"}]}}"#,
        )
        .unwrap();
        sanitize_value(&mut value);
        assert_eq!(value, json!({"a": {"b": [{"c": "ok"}]}}));
    }

    #[test]
    fn test_operator_keys_rewritten() {
        let mut value = json!({"name": {"$ne": null}, "a.b": 1});
        sanitize_value(&mut value);
        assert_eq!(value, json!({"name": {"_ne": null}, "a_b": 1}));
    }

    #[test]
    fn test_image_field_exemption() {
        let data_url = "data:image/png;base64,iVBORw0KGgo=";
        let mut value = json!({
            "image": data_url,
            "other": data_url,
            "nested": {"image": "https://cdn.example.com/a.png"},
        });
        sanitize_value(&mut value);
        assert_eq!(value["image"], data_url);
        assert_eq!(value["other"], "");
        assert_eq!(value["nested"]["image"], "https://cdn.example.com/a.png");
    }

    #[test]
    fn test_image_field_without_url_is_sanitized() {
        let mut value = json!({"image": "<b>x</b>"});
        sanitize_value(&mut value);
        assert_eq!(value["image"], "&lt;b&gt;x&lt;&#x2F;b&gt;");
    }

    #[test]
    fn test_scalars_and_arrays_pass() {
        let mut value = json!([1, true, null, " x "]);
        sanitize_value(&mut value);
        assert_eq!(value, json!([1, true, null, "x"]));
    }

    #[test]
    fn test_query_last_value_wins() {
        let query = SanitizedQuery::parse("sort=asc&page=1&sort=desc").unwrap();
        assert_eq!(
            query.pairs,
            vec![
                ("sort".to_string(), "desc".to_string()),
                ("page".to_string(), "1".to_string()),
            ]
        );
        assert_eq!(query.encode().unwrap(), "sort=desc&page=1");
    }

    #[test]
    fn test_query_values_sanitized() {
        let query = SanitizedQuery::parse("q=%3Cscript%3Ealert(1)%3C%2Fscript%3E&$where=1").unwrap();
        assert_eq!(query.get("q"), Some(""));
        assert_eq!(query.get("_where"), Some("1"));
        assert_eq!(query.to_json(), json!({"q": "", "_where": "1"}));
    }
}

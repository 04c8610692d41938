//! Reply-shape extraction for upstream agent responses.
//!
//! Providers name the reply field differently, and some return the reply as a
//! JSON-encoded document with the answer nested inside. Extraction is an
//! ordered list of rules evaluated in priority order; the first hit wins and
//! new providers are handled by editing the lists, not the control flow.

use serde_json::Value;

/// Nested paths probed when a reply field holds a JSON-encoded document.
const NESTED_REPLY_PATHS: &[&[&str]] = &[&["result", "answer"], &["answer"], &["message"]];

/// First candidate field present on `body`, in the order given. String values
/// are returned as-is; other JSON values are rendered to their JSON text.
pub fn first_reply_field(body: &Value, fields: &[String]) -> Option<String> {
    let obj = body.as_object()?;
    for field in fields {
        if let Some(v) = obj.get(field.as_str()) {
            return Some(match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            });
        }
    }
    None
}

/// Display text for a canonical reply string. When the text parses as JSON,
/// the nested paths are probed in order; otherwise (or when none match) the
/// raw text is returned unchanged.
pub fn derive_display_text(reply: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<Value>(reply) {
        for p in NESTED_REPLY_PATHS {
            if let Some(s) = lookup_path(&parsed, p) {
                return s.to_string();
            }
        }
    }
    reply.to_string()
}

fn lookup_path<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    let mut cur = value;
    for key in path {
        cur = cur.get(key)?;
    }
    cur.as_str()
}

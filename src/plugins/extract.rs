//! Tool-call extraction from streamed assistant text.
//!
//! The upstream model embeds plugin invocations as JSON objects inside
//! otherwise free-form prose, sometimes wrapped in markup. Extraction is a
//! best-effort heuristic, not a grammar: after sanitizing, the first
//! parseable balanced `{...}` substring wins. A JSON-looking example quoted
//! in prose can therefore match; the allow-list and per-turn deduplication
//! bound the damage.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use super::{PluginCall, ALLOWED_PLUGIN_NAMES};

/// Key aliases under which the model may put the plugin name.
const NAME_ALIASES: [&str; 4] = ["plugin_name", "api_name", "name", "plugin"];

fn anchor_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<a[^>]*>(.*?)</a>").expect("anchor regex"))
}

/// Strip control characters and `<a>` markup, keeping the anchor text.
fn sanitize(text: &str) -> String {
    let without_control: String = text.chars().filter(|c| (*c as u32) >= 0x20).collect();
    anchor_re().replace_all(&without_control, "$1").into_owned()
}

/// Find the first balanced top-level `{...}` substring that parses to an
/// object. Brace depth is tracked over raw characters; braces inside JSON
/// string literals are not special-cased.
pub fn extract_first_json_object(text: &str) -> Option<Value> {
    let mut candidates = Vec::new();
    let mut depth = 0usize;
    let mut start = None;

    for (i, ch) in text.char_indices() {
        match ch {
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' => {
                if depth > 0 {
                    depth -= 1;
                    if depth == 0 {
                        if let Some(s) = start.take() {
                            candidates.push(&text[s..i + ch.len_utf8()]);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    candidates
        .into_iter()
        .filter_map(|c| serde_json::from_str::<Value>(c).ok())
        .find(|v| v.is_object())
}

/// Parse a content fragment into a plugin call, if it contains one.
///
/// Returns `None` for ordinary prose, malformed JSON, and calls whose name
/// is not on the allow-list. Runs on every streamed delta and again on the
/// completed text; duplicates are handled downstream.
pub fn parse_plugin_call(text: &str) -> Option<PluginCall> {
    let cleaned = sanitize(text);

    let value = match serde_json::from_str::<Value>(&cleaned) {
        Ok(v) => v,
        Err(_) => extract_first_json_object(&cleaned)?,
    };
    let obj = value.as_object()?;

    let name = NAME_ALIASES
        .iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_str))?;
    if !ALLOWED_PLUGIN_NAMES.contains(&name) {
        return None;
    }

    Some(PluginCall {
        plugin_name: name.to_string(),
        arguments: obj
            .get("arguments")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default(),
        plugin_icon: obj
            .get("plugin_icon")
            .and_then(Value::as_str)
            .map(String::from),
    })
}

//! Raw model text to [`ReplyIntent`]
//!
//! Pure functions, no I/O. Models often answer in prose or wrap their JSON in
//! code fences even when told not to, so interpretation is two-staged: try the
//! structured shape, otherwise speak the text as-is.

use serde_json::{Map, Value};

use crate::reply::{ReplyIntent, Suggestion};

/// Remove every ```` ```json ```` and ```` ``` ```` marker and trim.
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

/// Interpret upstream text as a reply.
///
/// A JSON object is normalised field by field. Anything else, including JSON
/// that is not an object, becomes a `chat` reply carrying the stripped text.
pub fn interpret(raw: &str) -> ReplyIntent {
    let clean = strip_code_fences(raw);

    match serde_json::from_str::<Value>(&clean) {
        Ok(Value::Object(fields)) => from_fields(&fields),
        Ok(_) => {
            tracing::debug!("Upstream JSON is not an object, treating as chat text");
            ReplyIntent::chat(clean)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Upstream text is not JSON, treating as chat text");
            ReplyIntent::chat(clean)
        }
    }
}

/// Keep only suggestion entries that are objects with a non-empty string
/// `name` and `url`. Non-array input yields no suggestions.
pub fn sanitize_suggestions(value: Option<&Value>) -> Vec<Suggestion> {
    let Some(entries) = value.and_then(Value::as_array) else {
        return vec![];
    };

    entries
        .iter()
        .filter_map(|entry| {
            let name = non_empty_str(entry.get("name"))?;
            let url = non_empty_str(entry.get("url"))?;
            Some(Suggestion::new(name, url))
        })
        .collect()
}

fn from_fields(fields: &Map<String, Value>) -> ReplyIntent {
    let text = fields
        .get("text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let wants_open = fields
        .get("type")
        .and_then(Value::as_str)
        .map(|t| t.trim().eq_ignore_ascii_case("open"))
        .unwrap_or(false);

    let target = non_empty_str(fields.get("url"));
    let suggestions = sanitize_suggestions(fields.get("suggestions"));

    let reply = match (wants_open, target) {
        (true, Some(target)) => {
            let label = non_empty_str(fields.get("name")).map(str::to_string);
            ReplyIntent::open(text, target, label)
        }
        (true, None) => {
            tracing::debug!("Open reply without a url, downgrading to chat");
            ReplyIntent::chat(text)
        }
        (false, _) => ReplyIntent::chat(text),
    };

    reply.with_suggestions(suggestions)
}

/// The string as sent, provided it is not blank.
fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

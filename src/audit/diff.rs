//! Change summaries for update entries

use serde_json::{Map, Value};

/// Bookkeeping fields left out of summaries
const IGNORED_FIELDS: &[&str] = &["updated_at"];

/// Describe which fields differ between two snapshots
///
/// Nested objects are walked with dotted paths; arrays are compared by
/// length only. Returns `None` when nothing meaningful changed.
pub fn summarize_changes(before: &Value, after: &Value) -> Option<String> {
    let mut changes = Vec::new();
    collect("", before, after, &mut changes);

    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

fn collect(path: &str, before: &Value, after: &Value, out: &mut Vec<String>) {
    match (before, after) {
        (Value::Object(b), Value::Object(a)) => collect_objects(path, b, a, out),
        _ if before != after => out.push(format!(
            "{}: {} -> {}",
            path,
            render(before),
            render(after)
        )),
        _ => {}
    }
}

fn collect_objects(
    path: &str,
    before: &Map<String, Value>,
    after: &Map<String, Value>,
    out: &mut Vec<String>,
) {
    let mut keys: Vec<&String> = before.keys().chain(after.keys()).collect();
    keys.sort();
    keys.dedup();

    for key in keys {
        if path.is_empty() && IGNORED_FIELDS.contains(&key.as_str()) {
            continue;
        }
        let field = if path.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", path, key)
        };

        match (before.get(key), after.get(key)) {
            (Some(b), Some(a)) => collect(&field, b, a, out),
            (Some(b), None) => out.push(format!("{}: {} -> (removed)", field, render(b))),
            (None, Some(a)) => out.push(format!("{}: (added) -> {}", field, render(a))),
            (None, None) => {}
        }
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) if s.chars().count() > 40 => {
            let head: String = s.chars().take(37).collect();
            format!("\"{}...\"", head)
        }
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Object(fields) => format!("{{{} fields}}", fields.len()),
        other => other.to_string(),
    }
}

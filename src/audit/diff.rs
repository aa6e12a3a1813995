//! Diff generation for audit entries
//!
//! Cell values are sequences, mappings or scalars. The summary diff reports
//! top-level changes only; the detailed diff walks into nested values.

use serde_json::Value;

/// Longest string shown verbatim in a diff
const MAX_STRING_LEN: usize = 50;

/// Summarize the change between two cell values
///
/// Returns `None` when the values are equal.
pub fn generate_diff(before: &Value, after: &Value) -> Option<String> {
    if before == after {
        return None;
    }

    match (before, after) {
        (Value::Object(before_obj), Value::Object(after_obj)) => {
            let mut changes = Vec::new();

            for (key, before_val) in before_obj {
                match after_obj.get(key) {
                    Some(after_val) if after_val != before_val => changes.push(format!(
                        "{}: {} -> {}",
                        key,
                        format_value(before_val),
                        format_value(after_val)
                    )),
                    Some(_) => {}
                    None => changes.push(format!(
                        "{}: {} -> (removed)",
                        key,
                        format_value(before_val)
                    )),
                }
            }

            for (key, after_val) in after_obj {
                if !before_obj.contains_key(key) {
                    changes.push(format!("{}: (added) -> {}", key, format_value(after_val)));
                }
            }

            Some(changes.join(", "))
        }
        (Value::Array(before_arr), Value::Array(after_arr)) => {
            if before_arr.len() != after_arr.len() {
                Some(format!(
                    "[{} items] -> [{} items]",
                    before_arr.len(),
                    after_arr.len()
                ))
            } else {
                let changed = before_arr
                    .iter()
                    .zip(after_arr)
                    .filter(|(b, a)| b != a)
                    .count();
                Some(format!("{} of {} items changed", changed, after_arr.len()))
            }
        }
        _ => Some(format!(
            "{} -> {}",
            format_value(before),
            format_value(after)
        )),
    }
}

/// Format a JSON value for human-readable display
fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => {
            if s.chars().count() > MAX_STRING_LEN {
                let head: String = s.chars().take(MAX_STRING_LEN - 3).collect();
                format!("\"{}...\"", head)
            } else {
                format!("\"{}\"", s)
            }
        }
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}

/// List every leaf-level change, with paths like `rules[1].categorize`
pub fn generate_detailed_diff(before: &Value, after: &Value, prefix: &str) -> Vec<String> {
    let mut changes = Vec::new();
    collect_changes(before, after, prefix, &mut changes);
    changes
}

fn collect_changes(before: &Value, after: &Value, path: &str, changes: &mut Vec<String>) {
    if before == after {
        return;
    }

    match (before, after) {
        (Value::Object(before_obj), Value::Object(after_obj)) => {
            for (key, before_val) in before_obj {
                let field_path = join_path(path, key);
                match after_obj.get(key) {
                    Some(after_val) => collect_changes(before_val, after_val, &field_path, changes),
                    None => changes.push(format!(
                        "{}: {} -> (removed)",
                        field_path,
                        format_value(before_val)
                    )),
                }
            }
            for (key, after_val) in after_obj {
                if !before_obj.contains_key(key) {
                    changes.push(format!(
                        "{}: (added) -> {}",
                        join_path(path, key),
                        format_value(after_val)
                    ));
                }
            }
        }
        (Value::Array(before_arr), Value::Array(after_arr)) => {
            for (i, (b, a)) in before_arr.iter().zip(after_arr).enumerate() {
                collect_changes(b, a, &format!("{}[{}]", path, i), changes);
            }
            for (i, removed) in before_arr.iter().enumerate().skip(after_arr.len()) {
                changes.push(format!(
                    "{}[{}]: {} -> (removed)",
                    path,
                    i,
                    format_value(removed)
                ));
            }
            for (i, added) in after_arr.iter().enumerate().skip(before_arr.len()) {
                changes.push(format!(
                    "{}[{}]: (added) -> {}",
                    path,
                    i,
                    format_value(added)
                ));
            }
        }
        _ => changes.push(format!(
            "{}: {} -> {}",
            path,
            format_value(before),
            format_value(after)
        )),
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

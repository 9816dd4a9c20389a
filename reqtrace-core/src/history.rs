//! Change history table

use serde_json::{Map, Value};

use crate::models::{ChangeType, HistoryEntry};
use crate::render::{escape_html, format_optional_date};

pub const EMPTY_HISTORY_MESSAGE: &str = "No change history";
pub const CREATED_TEXT: &str = "Created new requirement";
pub const DELETED_TEXT: &str = "Requirement deleted";
pub const NO_CHANGES_TEXT: &str = "No changes";
pub const UNKNOWN_ACTOR: &str = "not specified";

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub date: String,
    pub change_type: ChangeType,
    pub actor: String,
    /// One line per changed field, or a single fixed sentence
    pub changes: Vec<String>,
}

impl HistoryRow {
    pub fn from_entry(entry: &HistoryEntry) -> Self {
        let actor = entry
            .changed_by
            .as_deref()
            .filter(|a| !a.is_empty())
            .unwrap_or(UNKNOWN_ACTOR)
            .to_string();

        Self {
            date: format_optional_date(entry.changed_at.as_deref()),
            change_type: entry.change_type.clone(),
            actor,
            changes: describe_changes(entry),
        }
    }

    /// Lower-cased change type, used as a CSS class
    pub fn css_class(&self) -> String {
        self.change_type.as_str().to_lowercase()
    }
}

fn describe_changes(entry: &HistoryEntry) -> Vec<String> {
    match &entry.change_type {
        ChangeType::Create => vec![CREATED_TEXT.to_string()],
        ChangeType::Delete => vec![DELETED_TEXT.to_string()],
        ChangeType::Update => match (&entry.old_values, &entry.new_values) {
            (Some(old), Some(new)) => {
                let lines = diff_lines(old, new);
                if lines.is_empty() {
                    vec![NO_CHANGES_TEXT.to_string()]
                } else {
                    lines
                }
            }
            _ => Vec::new(),
        },
        ChangeType::Other(_) => Vec::new(),
    }
}

/// `key: "old" → "new"` for each key of `new` whose value changed
fn diff_lines(old: &Map<String, Value>, new: &Map<String, Value>) -> Vec<String> {
    let mut keys: Vec<&String> = new.keys().filter(|k| k.as_str() != "id").collect();
    keys.sort();

    keys.into_iter()
        .filter_map(|key| {
            let after = &new[key.as_str()];
            let before = old.get(key.as_str());
            if before == Some(after) {
                return None;
            }
            Some(format!(
                "{}: \"{}\" → \"{}\"",
                key,
                before.map(display_value).unwrap_or_default(),
                display_value(after)
            ))
        })
        .collect()
}

/// Strings bare, everything else as JSON
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryTable {
    pub rows: Vec<HistoryRow>,
}

impl HistoryTable {
    /// Rows keep the backend's order (newest first)
    pub fn from_entries(entries: &[HistoryEntry]) -> Self {
        Self {
            rows: entries.iter().map(HistoryRow::from_entry).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn to_html(&self) -> String {
        if self.is_empty() {
            return format!("<p class=\"placeholder\">{}</p>", EMPTY_HISTORY_MESSAGE);
        }

        let mut html = String::from(
            "<table class=\"history-table\"><thead><tr><th>Date</th><th>Change</th><th>Changed by</th><th>Changes</th></tr></thead><tbody>",
        );
        for row in &self.rows {
            let changes: Vec<String> = row.changes.iter().map(|c| escape_html(c)).collect();
            html.push_str(&format!(
                "<tr><td>{}</td><td><span class=\"history-change {}\">{}</span></td><td>{}</td><td><div class=\"history-values\">{}</div></td></tr>",
                escape_html(&row.date),
                escape_html(&row.css_class()),
                escape_html(row.change_type.as_str()),
                escape_html(&row.actor),
                changes.join("<br>")
            ));
        }
        html.push_str("</tbody></table>");
        html
    }
}

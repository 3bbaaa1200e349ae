//! Maps schemaless Notion page properties to [`RecordSnapshot`]s.

use serde::{Deserialize, Serialize};

use restock_types::RecordSnapshot;

use crate::wire::Page;

/// Names of the properties that carry the record's title, group, and status.
///
/// Titles are tried across `title_candidates` in order because databases
/// rename their title column freely; the first candidate with a non-empty
/// title wins. Group and status are `select` properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSchema {
    pub title_candidates: Vec<String>,
    pub group_property: String,
    pub status_property: String,
}

impl Default for RecordSchema {
    fn default() -> Self {
        Self {
            title_candidates: vec!["Name".to_string()],
            group_property: "Group".to_string(),
            status_property: "Status".to_string(),
        }
    }
}

impl RecordSchema {
    /// Builds a snapshot from a raw page.
    ///
    /// Missing or malformed properties degrade instead of failing: the title
    /// falls back to `"Untitled"`, group and status to absent.
    pub fn snapshot(&self, page: &Page) -> RecordSnapshot {
        RecordSnapshot {
            id: page.id.clone(),
            title: self.title(page),
            group: select_name(page, &self.group_property),
            status: select_name(page, &self.status_property),
            url: page.url.clone(),
            last_edited: page.last_edited_time,
        }
    }

    fn title(&self, page: &Page) -> String {
        self.title_candidates
            .iter()
            .find_map(|candidate| {
                let text = page
                    .properties
                    .get(candidate)?
                    .get("title")?
                    .get(0)?
                    .get("plain_text")?
                    .as_str()?;
                if text.is_empty() {
                    None
                } else {
                    Some(text.to_string())
                }
            })
            .unwrap_or_else(|| "Untitled".to_string())
    }
}

/// Extracts the chosen value of a `select` property, if any.
fn select_name(page: &Page, property: &str) -> Option<String> {
    page.properties
        .get(property)?
        .get("select")?
        .get("name")?
        .as_str()
        .map(str::to_string)
}

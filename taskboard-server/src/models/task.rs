//! Task rows for display
//!
//! Task documents are opaque to the dashboard: the full set is passed to the
//! view unchanged. `TaskRow` is a read-only projection used by the template.

use bson::Document;

/// Fields read from task documents
pub mod fields {
    pub const DESCRIPTION: &str = "description";
    pub const TITLE: &str = "title";
    pub const CATEGORY: &str = "category";
    pub const COMPLETED: &str = "completed";
    pub const CREATED_AT: &str = "createdAt";
}

/// Display projection of a task document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub description: String,
    pub category: Option<String>,
    pub completed: bool,
    pub created_at: Option<String>,
}

impl From<&Document> for TaskRow {
    fn from(doc: &Document) -> Self {
        let description = doc
            .get_str(fields::DESCRIPTION)
            .or_else(|_| doc.get_str(fields::TITLE))
            .unwrap_or_default()
            .to_owned();

        // Stored as a BSON date by the app, but tolerate imported string dates
        let created_at = match doc.get_datetime(fields::CREATED_AT) {
            Ok(dt) => Some(dt.to_chrono().format("%Y-%m-%d %H:%M").to_string()),
            Err(_) => doc.get_str(fields::CREATED_AT).ok().map(str::to_owned),
        };

        Self {
            description,
            category: doc.get_str(fields::CATEGORY).ok().map(str::to_owned),
            completed: doc.get_bool(fields::COMPLETED).unwrap_or(false),
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{doc, DateTime};
    use chrono::{TimeZone, Utc};

    #[test]
    fn full_document() {
        let created = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
        let doc = doc! {
            "description": "Buy milk",
            "category": "Personal",
            "completed": true,
            "createdAt": DateTime::from_chrono(created),
        };

        let row = TaskRow::from(&doc);
        assert_eq!(row.description, "Buy milk");
        assert_eq!(row.category.as_deref(), Some("Personal"));
        assert!(row.completed);
        assert_eq!(row.created_at.as_deref(), Some("2024-03-09 14:05"));
    }

    #[test]
    fn title_used_when_description_missing() {
        let row = TaskRow::from(&doc! { "title": "Write report" });
        assert_eq!(row.description, "Write report");
    }

    #[test]
    fn missing_and_mistyped_fields_fall_back() {
        let doc = doc! {
            "description": 42,
            "completed": "yes",
            "category": null,
        };

        let row = TaskRow::from(&doc);
        assert_eq!(row.description, "");
        assert!(!row.completed);
        assert!(row.category.is_none());
        assert!(row.created_at.is_none());
    }

    #[test]
    fn string_created_at_passes_through() {
        let row = TaskRow::from(&doc! { "createdAt": "2024-03-09" });
        assert_eq!(row.created_at.as_deref(), Some("2024-03-09"));
    }
}

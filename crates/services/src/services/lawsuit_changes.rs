//! Detects which notifiable lawsuit fields an edit touched.

use db::models::lawsuit::Lawsuit;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct FieldChange {
    pub field: String,
    pub before: Option<String>,
    pub after: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct LawsuitChanges {
    pub changes: Vec<FieldChange>,
}

impl LawsuitChanges {
    /// Compares status, case number, court, filing date and description.
    pub fn between(before: &Lawsuit, after: &Lawsuit) -> Self {
        let mut changes = Vec::new();
        let mut track = |field: &str, old: Option<String>, new: Option<String>| {
            if old != new {
                changes.push(FieldChange {
                    field: field.to_string(),
                    before: old,
                    after: new,
                });
            }
        };

        track(
            "status",
            Some(before.status.to_string()),
            Some(after.status.to_string()),
        );
        track(
            "case_number",
            Some(before.case_number.clone()),
            Some(after.case_number.clone()),
        );
        track(
            "court_name",
            Some(before.court_name.clone()),
            Some(after.court_name.clone()),
        );
        track(
            "filing_date",
            before.filing_date.map(|d| d.to_string()),
            after.filing_date.map(|d| d.to_string()),
        );
        track(
            "description",
            before.description.clone(),
            after.description.clone(),
        );

        Self { changes }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn touches(&self, field: &str) -> bool {
        self.changes.iter().any(|c| c.field == field)
    }

    /// One clause per changed field, e.g. `status: filed → judgment`.
    /// Description text is not repeated, only flagged as updated.
    pub fn summary(&self) -> String {
        self.changes
            .iter()
            .map(|change| match change.field.as_str() {
                "description" => "description updated".to_string(),
                field => format!(
                    "{}: {} → {}",
                    field.replace('_', " "),
                    change.before.as_deref().unwrap_or("none"),
                    change.after.as_deref().unwrap_or("none"),
                ),
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

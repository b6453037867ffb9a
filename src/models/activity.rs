use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

use super::serialize_timestamp;

/// An activity-log row joined with the acting user's name.
#[derive(Debug, Serialize, FromRow)]
pub struct ActivityLog {
    pub log_id: i64,
    pub user_id: i64,
    pub username: Option<String>,
    pub action_type: String,
    pub affected_table: String,
    pub affected_id: Option<i64>,
    pub description: Option<String>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewActivity {
    pub action_type: &'static str,
    pub affected_table: &'static str,
    pub affected_id: Option<i64>,
    pub description: String,
}

impl NewActivity {
    pub fn new(
        action_type: &'static str,
        affected_table: &'static str,
        affected_id: impl Into<Option<i64>>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            action_type,
            affected_table,
            affected_id: affected_id.into(),
            description: description.into(),
        }
    }
}

impl ActivityLog {
    pub fn timestamp_label(&self) -> String {
        self.timestamp.format(super::TIMESTAMP_FORMAT).to_string()
    }

    pub fn description_label(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

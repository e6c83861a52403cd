use serde::{Deserialize, Serialize};

/// One building entry from the card login export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AccessEvent {
    pub employee_id: String,
    pub date: String,
    /// Swipe time as exported; never used for presence
    pub time: String,
}

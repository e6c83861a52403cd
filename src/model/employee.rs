use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Directorate reported for employees whose directory row had none.
pub const UNKNOWN_DIRECTORATE: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(
    example = json!({
        "employeeId": "1001",
        "name": "Jane Doe",
        "directorate": "Engineering",
        "department": "Platform"
    })
)]
pub struct EmployeeRecord {
    #[schema(example = "1001")]
    pub employee_id: String,

    #[schema(example = "Jane Doe")]
    pub name: String,

    /// Empty when the directory row had no directorate column
    #[schema(example = "Engineering")]
    pub directorate: String,

    #[schema(example = "Platform")]
    pub department: String,
}

impl EmployeeRecord {
    pub fn directorate_or_unknown(&self) -> &str {
        directorate_or_unknown(&self.directorate)
    }
}

pub fn directorate_or_unknown(directorate: &str) -> &str {
    if directorate.trim().is_empty() {
        UNKNOWN_DIRECTORATE
    } else {
        directorate
    }
}

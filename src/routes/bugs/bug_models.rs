use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const VALID_BUG_STATUSES: [&str; 4] = ["OPEN", "IN_PROGRESS", "RESOLVED", "CLOSED"];

#[derive(Deserialize)]
pub struct ListBugsQuery {
    pub ticket_id: Option<String>,
    pub test_case_id: Option<String>,
    pub project_id: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateBugRequest {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub ticket_id: Option<String>,
    pub test_case_id: Option<String>,
    pub project_id: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateBugRequest {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct DeleteBugRequest {
    pub id: String,
}

// Bug row joined with the records it points at.
#[derive(Debug, Serialize, FromRow)]
pub struct BugWithRelations {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: String,
    pub status: String,
    pub ticket_id: String,
    pub test_case_id: Option<String>,
    pub project_id: String,
    pub created_by_id: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub ticket_title: String,
    pub test_case_title: Option<String>,
    pub project_name: String,
    pub created_by_name: String,
    pub created_by_email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defect_lifecycle_whitelist_is_closed() {
        assert!(VALID_BUG_STATUSES.contains(&"OPEN"));
        assert!(VALID_BUG_STATUSES.contains(&"CLOSED"));
        assert!(!VALID_BUG_STATUSES.contains(&"FIXED"));
    }
}

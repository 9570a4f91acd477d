use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct TestExecution {
    pub id: String,
    pub test_case_id: String,
    pub test_plan_id: Option<String>,
    pub executed_by_id: String,
    pub status: String,
    pub result: Option<String>,
    pub executed_at: NaiveDateTime,
}

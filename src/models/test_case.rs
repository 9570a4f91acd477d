use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct TestCase {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub steps: String,
    pub expected: String,
    pub priority: String,
    pub status: String,
    pub is_automated: bool,
    pub is_ai_generated: bool,
    pub ai_prompt: Option<String>,
    pub project_id: String,
    pub test_plan_id: Option<String>,
    pub created_by_id: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

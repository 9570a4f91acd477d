use serde::Deserialize;

pub const VALID_EXECUTION_STATUSES: [&str; 4] = ["PASSED", "FAILED", "BLOCKED", "SKIPPED"];

#[derive(Deserialize)]
pub struct ListExecutionsQuery {
    pub test_case_id: Option<String>,
    pub test_plan_id: Option<String>,
}

#[derive(Deserialize)]
pub struct RecordExecutionRequest {
    pub test_case_id: String,
    pub test_plan_id: Option<String>,
    pub status: String,
    pub result: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_whitelist_is_closed() {
        assert!(VALID_EXECUTION_STATUSES.contains(&"PASSED"));
        assert!(VALID_EXECUTION_STATUSES.contains(&"SKIPPED"));
        assert!(!VALID_EXECUTION_STATUSES.contains(&"PENDING"));
    }
}

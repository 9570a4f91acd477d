use serde::Deserialize;

pub const VALID_PRIORITIES: [&str; 4] = ["P0", "P1", "P2", "P3"];
pub const VALID_STATUSES: [&str; 5] =
    ["PENDING", "IN_PROGRESS", "PASSED", "FAILED", "COMPLETED"];

// Unknown values fall back to the default, as the web routes always did.
pub fn normalize_priority(priority: Option<&str>) -> &str {
    match priority {
        Some(p) if VALID_PRIORITIES.contains(&p) => p,
        _ => "P2",
    }
}

#[derive(Deserialize)]
pub struct ListTestCasesQuery {
    pub project_id: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateTestCaseRequest {
    pub title: String,
    pub description: Option<String>,
    pub steps: String,
    pub expected: String,
    pub priority: Option<String>,
    pub project_id: Option<String>,
    pub test_plan_id: Option<String>,
    pub ticket_id: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateTestCaseRequest {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub steps: Option<String>,
    pub expected: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct DeleteTestCaseRequest {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_priority_passes_through() {
        assert_eq!(normalize_priority(Some("P0")), "P0");
        assert_eq!(normalize_priority(Some("P3")), "P3");
    }

    #[test]
    fn unknown_priority_falls_back_to_p2() {
        assert_eq!(normalize_priority(Some("URGENT")), "P2");
        assert_eq!(normalize_priority(None), "P2");
    }

    #[test]
    fn status_whitelist_covers_the_case_lifecycle() {
        assert!(VALID_STATUSES.contains(&"PENDING"));
        assert!(VALID_STATUSES.contains(&"PASSED"));
        assert!(!VALID_STATUSES.contains(&"ARCHIVED"));
    }
}

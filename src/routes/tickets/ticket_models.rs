use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const VALID_TICKET_STATUSES: [&str; 5] =
    ["PENDING", "SCHEDULED", "DEVELOPING", "PAUSED", "LIVE"];
pub const VALID_TICKET_PRIORITIES: [&str; 4] = ["P0", "P1", "P2", "P3"];

pub fn normalize_ticket_status(status: Option<&str>) -> &str {
    match status {
        Some(s) if VALID_TICKET_STATUSES.contains(&s) => s,
        _ => "PENDING",
    }
}

pub fn normalize_ticket_priority(priority: Option<&str>) -> &str {
    match priority {
        Some(p) if VALID_TICKET_PRIORITIES.contains(&p) => p,
        _ => "P2",
    }
}

#[derive(Deserialize)]
pub struct TicketQuery {
    pub id: Option<String>,
    pub project_id: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateTicketRequest {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub project_id: Option<String>,
    pub assigned_to_id: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateTicketRequest {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assigned_to_id: Option<String>,
}

// Ticket row joined with creator/assignee names.
#[derive(Debug, Serialize, FromRow)]
pub struct TicketWithRelations {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub priority: String,
    pub project_id: String,
    pub created_by_id: String,
    pub assigned_to_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub created_by_name: String,
    pub assigned_to_name: Option<String>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct RelatedTestCase {
    pub id: String,
    pub title: String,
    pub status: String,
}

#[derive(Serialize)]
pub struct TicketDetail {
    #[serde(flatten)]
    pub ticket: TicketWithRelations,
    pub related_test_cases: Vec<RelatedTestCase>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_statuses_pass_through() {
        for status in VALID_TICKET_STATUSES {
            assert_eq!(normalize_ticket_status(Some(status)), status);
        }
    }

    #[test]
    fn unknown_status_becomes_pending() {
        assert_eq!(normalize_ticket_status(Some("DONE")), "PENDING");
        assert_eq!(normalize_ticket_status(None), "PENDING");
    }

    #[test]
    fn unknown_priority_becomes_p2() {
        assert_eq!(normalize_ticket_priority(Some("HIGH")), "P2");
        assert_eq!(normalize_ticket_priority(Some("P1")), "P1");
    }
}

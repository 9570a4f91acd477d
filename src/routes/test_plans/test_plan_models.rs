use chrono::NaiveDate;
use serde::Deserialize;

pub const VALID_PLAN_STATUSES: [&str; 4] =
    ["PLANNED", "IN_PROGRESS", "COMPLETED", "ARCHIVED"];

#[derive(Deserialize)]
pub struct ListTestPlansQuery {
    pub project_id: Option<String>,
}

#[derive(Deserialize)]
pub struct TestPlanPayload {
    pub name: String,
    pub status: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub implementation: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default)]
    pub is_ai_generated: bool,
    pub project_id: Option<String>,
}

// Plan dates arrive as `YYYY-MM-DD` strings.
pub fn parse_plan_date(value: Option<&str>) -> Result<Option<NaiveDate>, String> {
    match value {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| format!("Invalid date: {}", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates() {
        let date = parse_plan_date(Some("2025-03-14")).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 3, 14));
    }

    #[test]
    fn missing_and_empty_dates_are_none() {
        assert_eq!(parse_plan_date(None).unwrap(), None);
        assert_eq!(parse_plan_date(Some("")).unwrap(), None);
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(parse_plan_date(Some("14/03/2025")).is_err());
        assert!(parse_plan_date(Some("not-a-date")).is_err());
    }
}

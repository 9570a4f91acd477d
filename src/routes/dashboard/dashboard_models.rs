use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, FromRow)]
pub struct StatusCount {
    pub status: String,
    pub cnt: i64,
}

#[derive(Debug, FromRow)]
pub struct PriorityCount {
    pub priority: String,
    pub cnt: i64,
}

#[derive(Debug, FromRow)]
pub struct ExecutionSample {
    pub executed_at: NaiveDateTime,
    pub status: String,
}

#[derive(Debug, FromRow)]
pub struct PlanCaseRow {
    pub plan_id: String,
    pub plan_status: String,
    pub case_status: Option<String>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct RecentTestCase {
    pub id: String,
    pub title: String,
    pub status: String,
    pub priority: String,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Serialize, FromRow)]
pub struct RecentTicket {
    pub id: String,
    pub title: String,
    pub status: String,
    pub priority: String,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Serialize, FromRow)]
pub struct RecentIssue {
    pub id: String,
    pub test_case_title: String,
    pub priority: String,
    pub executed_at: NaiveDateTime,
}

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct TestCaseCounts {
    pub total: i64,
    pub passed: i64,
    pub failed: i64,
    pub other: i64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct TrendPoint {
    pub date: String,
    pub pass_rate: i64,
    pub fail_rate: i64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ChartEntry {
    pub name: String,
    pub value: i64,
    pub color: String,
}

#[derive(Serialize)]
pub struct DashboardResponse {
    pub test_case_counts: TestCaseCounts,
    pub execution_trend: Vec<TrendPoint>,
    pub test_plan_progress: i64,
    pub ticket_status: Vec<ChartEntry>,
    pub ticket_priority: Vec<ChartEntry>,
    pub recent_test_cases: Vec<RecentTestCase>,
    pub recent_issues: Vec<RecentIssue>,
    pub recent_tickets: Vec<RecentTicket>,
}

// Releases ship Tuesday and Thursday; map any day to the most recent one.
pub fn last_release_date(today: NaiveDate) -> NaiveDate {
    let days_back = match today.weekday() {
        Weekday::Tue | Weekday::Thu => 0,
        Weekday::Wed | Weekday::Fri => 1,
        Weekday::Sat => 2,
        Weekday::Sun => 3,
        Weekday::Mon => 4,
    };
    today - Duration::days(days_back)
}

pub fn rollup_status_counts(counts: &[StatusCount]) -> TestCaseCounts {
    let mut rollup = TestCaseCounts::default();
    for entry in counts {
        rollup.total += entry.cnt;
        match entry.status.as_str() {
            "PASSED" => rollup.passed += entry.cnt,
            "FAILED" => rollup.failed += entry.cnt,
            _ => rollup.other += entry.cnt,
        }
    }
    rollup
}

fn percent(part: i64, total: i64) -> i64 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as i64
}

// Bucket executions per calendar day into pass/fail percentages.
pub fn daily_pass_rates(executions: &[ExecutionSample]) -> Vec<TrendPoint> {
    let mut daily: BTreeMap<NaiveDate, (i64, i64)> = BTreeMap::new();
    for exec in executions {
        let entry = daily.entry(exec.executed_at.date()).or_insert((0, 0));
        entry.0 += 1;
        if exec.status == "PASSED" {
            entry.1 += 1;
        }
    }

    daily
        .into_iter()
        .map(|(date, (total, passed))| TrendPoint {
            date: date.format("%Y-%m-%d").to_string(),
            pass_rate: percent(passed, total),
            fail_rate: percent(total - passed, total),
        })
        .collect()
}

// Average completion over non-archived plans: COMPLETED counts as 100%,
// everything else as the share of its cases that reached PASSED/COMPLETED.
pub fn average_plan_progress(rows: &[PlanCaseRow]) -> i64 {
    let mut plans: BTreeMap<&str, (&str, i64, i64)> = BTreeMap::new();
    for row in rows {
        let entry = plans
            .entry(row.plan_id.as_str())
            .or_insert((row.plan_status.as_str(), 0, 0));
        if let Some(case_status) = &row.case_status {
            entry.1 += 1;
            if case_status == "PASSED" || case_status == "COMPLETED" {
                entry.2 += 1;
            }
        }
    }

    if plans.is_empty() {
        return 0;
    }

    let total: i64 = plans
        .values()
        .map(|(plan_status, cases, completed)| {
            if *plan_status == "COMPLETED" {
                100
            } else {
                percent(*completed, *cases)
            }
        })
        .sum();

    ((total as f64) / (plans.len() as f64)).round() as i64
}

fn ticket_status_color(status: &str) -> &'static str {
    match status {
        "PENDING" => "#ff6384",
        "SCHEDULED" => "#36a2eb",
        "DEVELOPING" => "#ffcd56",
        "PAUSED" => "#4bc0c0",
        "LIVE" => "#9966ff",
        _ => "#c9cbcf",
    }
}

fn ticket_priority_color(priority: &str) -> &'static str {
    match priority {
        "P0" => "#ff4d4f",
        "P1" => "#faad14",
        "P2" => "#52c41a",
        "P3" => "#1890ff",
        _ => "#c9cbcf",
    }
}

pub fn ticket_status_chart(counts: Vec<StatusCount>) -> Vec<ChartEntry> {
    counts
        .into_iter()
        .map(|entry| ChartEntry {
            color: ticket_status_color(&entry.status).to_string(),
            name: entry.status,
            value: entry.cnt,
        })
        .collect()
}

pub fn ticket_priority_chart(counts: Vec<PriorityCount>) -> Vec<ChartEntry> {
    counts
        .into_iter()
        .map(|entry| ChartEntry {
            color: ticket_priority_color(&entry.priority).to_string(),
            name: entry.priority,
            value: entry.cnt,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn sample(date: &str, status: &str) -> ExecutionSample {
        let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        ExecutionSample {
            executed_at: day.and_time(NaiveTime::MIN),
            status: status.to_string(),
        }
    }

    #[test]
    fn release_days_are_fixpoints() {
        // 2025-06-03 is a Tuesday, 2025-06-05 a Thursday.
        let tuesday = NaiveDate::from_ymd_opt(2025, 6, 3).unwrap();
        let thursday = NaiveDate::from_ymd_opt(2025, 6, 5).unwrap();
        assert_eq!(last_release_date(tuesday), tuesday);
        assert_eq!(last_release_date(thursday), thursday);
    }

    #[test]
    fn other_weekdays_map_to_previous_release() {
        let thursday = NaiveDate::from_ymd_opt(2025, 6, 5).unwrap();
        for (y, m, d) in [(2025, 6, 6), (2025, 6, 7), (2025, 6, 8), (2025, 6, 9)] {
            // Friday through Monday all fall back to the same Thursday.
            let day = NaiveDate::from_ymd_opt(y, m, d).unwrap();
            assert_eq!(last_release_date(day), thursday);
        }
        let wednesday = NaiveDate::from_ymd_opt(2025, 6, 4).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2025, 6, 3).unwrap();
        assert_eq!(last_release_date(wednesday), tuesday);
    }

    #[test]
    fn rollup_buckets_by_outcome() {
        let counts = vec![
            StatusCount { status: "PASSED".into(), cnt: 7 },
            StatusCount { status: "FAILED".into(), cnt: 2 },
            StatusCount { status: "PENDING".into(), cnt: 3 },
            StatusCount { status: "IN_PROGRESS".into(), cnt: 1 },
        ];
        let rollup = rollup_status_counts(&counts);
        assert_eq!(
            rollup,
            TestCaseCounts { total: 13, passed: 7, failed: 2, other: 4 }
        );
    }

    #[test]
    fn trend_rates_sum_to_hundred() {
        let executions = vec![
            sample("2025-06-02", "PASSED"),
            sample("2025-06-02", "PASSED"),
            sample("2025-06-02", "FAILED"),
            sample("2025-06-03", "FAILED"),
        ];
        let trend = daily_pass_rates(&executions);
        assert_eq!(trend.len(), 2);
        assert_eq!(trend[0].date, "2025-06-02");
        assert_eq!(trend[0].pass_rate, 67);
        assert_eq!(trend[0].fail_rate, 33);
        assert_eq!(trend[1].pass_rate + trend[1].fail_rate, 100);
    }

    #[test]
    fn trend_of_no_executions_is_empty() {
        assert!(daily_pass_rates(&[]).is_empty());
    }

    #[test]
    fn completed_plans_count_as_full_progress() {
        let rows = vec![
            PlanCaseRow {
                plan_id: "a".into(),
                plan_status: "COMPLETED".into(),
                case_status: Some("PENDING".into()),
            },
            PlanCaseRow {
                plan_id: "b".into(),
                plan_status: "IN_PROGRESS".into(),
                case_status: Some("PASSED".into()),
            },
            PlanCaseRow {
                plan_id: "b".into(),
                plan_status: "IN_PROGRESS".into(),
                case_status: Some("PENDING".into()),
            },
        ];
        // (100 + 50) / 2
        assert_eq!(average_plan_progress(&rows), 75);
    }

    #[test]
    fn plan_without_cases_counts_as_zero() {
        let rows = vec![PlanCaseRow {
            plan_id: "a".into(),
            plan_status: "IN_PROGRESS".into(),
            case_status: None,
        }];
        assert_eq!(average_plan_progress(&rows), 0);
        assert_eq!(average_plan_progress(&[]), 0);
    }

    #[test]
    fn chart_entries_keep_known_colors() {
        let chart = ticket_status_chart(vec![StatusCount {
            status: "LIVE".into(),
            cnt: 4,
        }]);
        assert_eq!(chart[0].color, "#9966ff");
        assert_eq!(chart[0].value, 4);

        let chart = ticket_priority_chart(vec![PriorityCount {
            priority: "P9".into(),
            cnt: 1,
        }]);
        assert_eq!(chart[0].color, "#c9cbcf");
    }
}

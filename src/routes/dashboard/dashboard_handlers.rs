use actix_web::{web, HttpRequest, HttpResponse, Responder};
use chrono::{Duration, NaiveTime, Utc};
use log::error;
use sqlx::MySqlPool;

use super::dashboard_models::{
    average_plan_progress, daily_pass_rates, last_release_date, rollup_status_counts,
    ticket_priority_chart, ticket_status_chart, ChartEntry, DashboardResponse, ExecutionSample,
    PlanCaseRow, PriorityCount, RecentIssue, RecentTestCase, RecentTicket, StatusCount,
    TestCaseCounts, TrendPoint,
};
use crate::routes::guard;

// Every helper swallows its own query error and falls back to an empty
// default, so one broken stat never takes the whole dashboard down.
pub async fn get_dashboard(pool: web::Data<MySqlPool>, req: HttpRequest) -> impl Responder {
    let user = match guard::current_user(pool.get_ref(), &req).await {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let pool = pool.get_ref();

    let response = DashboardResponse {
        test_case_counts: test_case_counts(pool, &user.id).await,
        execution_trend: execution_trend(pool, &user.id).await,
        test_plan_progress: test_plan_progress(pool, &user.id).await,
        ticket_status: ticket_status(pool, &user.id).await,
        ticket_priority: ticket_priority(pool, &user.id).await,
        recent_test_cases: recent_test_cases(pool, &user.id).await,
        recent_issues: recent_issues(pool, &user.id).await,
        recent_tickets: recent_tickets(pool, &user.id).await,
    };

    HttpResponse::Ok().json(response)
}

async fn test_case_counts(pool: &MySqlPool, user_id: &str) -> TestCaseCounts {
    let result = sqlx::query_as::<_, StatusCount>(
        "SELECT status, COUNT(*) AS cnt FROM test_cases WHERE created_by_id = ? \
         GROUP BY status",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await;

    match result {
        Ok(counts) => rollup_status_counts(&counts),
        Err(e) => {
            error!("Failed to fetch test case counts for user {}: {}", user_id, e);
            TestCaseCounts::default()
        }
    }
}

async fn execution_trend(pool: &MySqlPool, user_id: &str) -> Vec<TrendPoint> {
    let thirty_days_ago = Utc::now().naive_utc() - Duration::days(30);
    let result = sqlx::query_as::<_, ExecutionSample>(
        "SELECT executed_at, status FROM test_executions \
         WHERE executed_by_id = ? AND executed_at >= ? ORDER BY executed_at ASC",
    )
    .bind(user_id)
    .bind(thirty_days_ago)
    .fetch_all(pool)
    .await;

    match result {
        Ok(executions) => daily_pass_rates(&executions),
        Err(e) => {
            error!("Failed to fetch execution trend for user {}: {}", user_id, e);
            Vec::new()
        }
    }
}

async fn test_plan_progress(pool: &MySqlPool, user_id: &str) -> i64 {
    let result = sqlx::query_as::<_, PlanCaseRow>(
        "SELECT tp.id AS plan_id, tp.status AS plan_status, tc.status AS case_status \
         FROM test_plans tp \
         LEFT JOIN test_cases tc ON tc.test_plan_id = tp.id \
         WHERE tp.created_by_id = ? AND tp.status <> 'ARCHIVED'",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await;

    match result {
        Ok(rows) => average_plan_progress(&rows),
        Err(e) => {
            error!("Failed to fetch plan progress for user {}: {}", user_id, e);
            0
        }
    }
}

async fn ticket_status(pool: &MySqlPool, user_id: &str) -> Vec<ChartEntry> {
    let thirty_days_ago = Utc::now().naive_utc() - Duration::days(30);
    let result = sqlx::query_as::<_, StatusCount>(
        "SELECT status, COUNT(*) AS cnt FROM tickets \
         WHERE created_by_id = ? \
         AND (status NOT IN ('LIVE', 'PAUSED') OR updated_at >= ?) \
         GROUP BY status",
    )
    .bind(user_id)
    .bind(thirty_days_ago)
    .fetch_all(pool)
    .await;

    match result {
        Ok(counts) => ticket_status_chart(counts),
        Err(e) => {
            error!("Failed to fetch ticket stats for user {}: {}", user_id, e);
            Vec::new()
        }
    }
}

async fn ticket_priority(pool: &MySqlPool, user_id: &str) -> Vec<ChartEntry> {
    let thirty_days_ago = Utc::now().naive_utc() - Duration::days(30);
    let result = sqlx::query_as::<_, PriorityCount>(
        "SELECT priority, COUNT(*) AS cnt FROM tickets \
         WHERE created_by_id = ? \
         AND (status NOT IN ('LIVE', 'PAUSED') OR updated_at >= ?) \
         GROUP BY priority",
    )
    .bind(user_id)
    .bind(thirty_days_ago)
    .fetch_all(pool)
    .await;

    match result {
        Ok(counts) => ticket_priority_chart(counts),
        Err(e) => {
            error!(
                "Failed to fetch ticket priority stats for user {}: {}",
                user_id, e
            );
            Vec::new()
        }
    }
}

async fn recent_test_cases(pool: &MySqlPool, user_id: &str) -> Vec<RecentTestCase> {
    let since = last_release_date(Utc::now().date_naive()).and_time(NaiveTime::MIN);
    let result = sqlx::query_as::<_, RecentTestCase>(
        "SELECT id, title, status, priority, updated_at FROM test_cases \
         WHERE created_by_id = ? AND (created_at >= ? OR updated_at >= ?) \
         ORDER BY updated_at DESC LIMIT 5",
    )
    .bind(user_id)
    .bind(since)
    .bind(since)
    .fetch_all(pool)
    .await;

    match result {
        Ok(cases) => cases,
        Err(e) => {
            error!("Failed to fetch recent test cases for user {}: {}", user_id, e);
            Vec::new()
        }
    }
}

async fn recent_issues(pool: &MySqlPool, user_id: &str) -> Vec<RecentIssue> {
    let last_week = Utc::now().naive_utc() - Duration::days(7);
    let result = sqlx::query_as::<_, RecentIssue>(
        "SELECT te.id, tc.title AS test_case_title, tc.priority, te.executed_at \
         FROM test_executions te \
         JOIN test_cases tc ON te.test_case_id = tc.id \
         WHERE te.executed_by_id = ? AND te.status = 'FAILED' AND te.executed_at >= ? \
         ORDER BY te.executed_at DESC LIMIT 3",
    )
    .bind(user_id)
    .bind(last_week)
    .fetch_all(pool)
    .await;

    match result {
        Ok(issues) => issues,
        Err(e) => {
            error!("Failed to fetch recent issues for user {}: {}", user_id, e);
            Vec::new()
        }
    }
}

async fn recent_tickets(pool: &MySqlPool, user_id: &str) -> Vec<RecentTicket> {
    let result = sqlx::query_as::<_, RecentTicket>(
        "SELECT id, title, status, priority, updated_at FROM tickets \
         WHERE created_by_id = ? OR assigned_to_id = ? \
         ORDER BY updated_at DESC LIMIT 3",
    )
    .bind(user_id)
    .bind(user_id)
    .fetch_all(pool)
    .await;

    match result {
        Ok(tickets) => tickets,
        Err(e) => {
            error!("Failed to fetch recent tickets for user {}: {}", user_id, e);
            Vec::new()
        }
    }
}

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::{error, info};
use sqlx::MySqlPool;
use uuid::Uuid;

use super::test_execution_models::{
    ListExecutionsQuery, RecordExecutionRequest, VALID_EXECUTION_STATUSES,
};
use crate::models::test_execution::TestExecution;
use crate::routes::guard::{self, ErrorResponse};

const EXECUTION_COLUMNS: &str =
    "id, test_case_id, test_plan_id, executed_by_id, status, result, executed_at";

pub async fn get_test_executions(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    query: web::Query<ListExecutionsQuery>,
) -> impl Responder {
    if let Err(resp) = guard::current_user(pool.get_ref(), &req).await {
        return resp;
    }

    let mut sql = format!(
        "SELECT {} FROM test_executions WHERE 1 = 1",
        EXECUTION_COLUMNS
    );
    if query.test_case_id.is_some() {
        sql.push_str(" AND test_case_id = ?");
    }
    if query.test_plan_id.is_some() {
        sql.push_str(" AND test_plan_id = ?");
    }
    sql.push_str(" ORDER BY executed_at DESC");

    let mut db_query = sqlx::query_as::<_, TestExecution>(&sql);
    if let Some(test_case_id) = &query.test_case_id {
        db_query = db_query.bind(test_case_id);
    }
    if let Some(test_plan_id) = &query.test_plan_id {
        db_query = db_query.bind(test_plan_id);
    }

    match db_query.fetch_all(pool.get_ref()).await {
        Ok(executions) => HttpResponse::Ok().json(executions),
        Err(e) => {
            error!("Failed to fetch test executions: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::with_details(
                "Failed to fetch test executions",
                e,
            ))
        }
    }
}

// Record one run of a test case.
pub async fn record_test_execution(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<RecordExecutionRequest>,
) -> impl Responder {
    let user = match guard::current_user(pool.get_ref(), &req).await {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    if !VALID_EXECUTION_STATUSES.contains(&request.status.as_str()) {
        return HttpResponse::BadRequest().json(ErrorResponse::new("Unknown execution status"));
    }

    let execution_id = Uuid::new_v4().to_string();
    let insert_result = sqlx::query(
        "INSERT INTO test_executions (id, test_case_id, test_plan_id, executed_by_id, \
         status, result) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&execution_id)
    .bind(&request.test_case_id)
    .bind(&request.test_plan_id)
    .bind(&user.id)
    .bind(&request.status)
    .bind(&request.result)
    .execute(pool.get_ref())
    .await;

    if let Err(e) = insert_result {
        error!(
            "Failed to record execution of test case {}: {}",
            request.test_case_id, e
        );
        return HttpResponse::InternalServerError()
            .json(ErrorResponse::with_details("Failed to record execution", e));
    }

    let fetch_result = sqlx::query_as::<_, TestExecution>(&format!(
        "SELECT {} FROM test_executions WHERE id = ?",
        EXECUTION_COLUMNS
    ))
    .bind(&execution_id)
    .fetch_one(pool.get_ref())
    .await;

    match fetch_result {
        Ok(execution) => {
            info!(
                "Execution {} recorded for test case {} by user {}",
                execution.id, execution.test_case_id, user.id
            );
            HttpResponse::Created().json(execution)
        }
        Err(e) => {
            error!("Execution not found after insertion: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Execution not found after insertion"))
        }
    }
}

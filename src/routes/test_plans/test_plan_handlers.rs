use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::{error, info};
use sqlx::MySqlPool;
use uuid::Uuid;

use super::test_plan_models::{
    parse_plan_date, ListTestPlansQuery, TestPlanPayload, VALID_PLAN_STATUSES,
};
use crate::models::test_plan::TestPlan;
use crate::routes::guard::{self, ErrorResponse};

const TEST_PLAN_COLUMNS: &str = "id, name, description, content, implementation, status, \
     start_date, end_date, is_ai_generated, project_id, created_by_id, created_at, updated_at";

pub async fn get_test_plans(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    query: web::Query<ListTestPlansQuery>,
) -> impl Responder {
    if let Err(resp) = guard::current_user(pool.get_ref(), &req).await {
        return resp;
    }

    let mut sql = format!("SELECT {} FROM test_plans", TEST_PLAN_COLUMNS);
    if query.project_id.is_some() {
        sql.push_str(" WHERE project_id = ?");
    }
    sql.push_str(" ORDER BY created_at DESC");

    let mut db_query = sqlx::query_as::<_, TestPlan>(&sql);
    if let Some(project_id) = &query.project_id {
        db_query = db_query.bind(project_id);
    }

    match db_query.fetch_all(pool.get_ref()).await {
        Ok(plans) => HttpResponse::Ok().json(plans),
        Err(e) => {
            error!("Failed to fetch test plans: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::with_details("Failed to fetch test plans", e))
        }
    }
}

pub async fn create_test_plan(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<TestPlanPayload>,
) -> impl Responder {
    let user = match guard::current_user(pool.get_ref(), &req).await {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    if request.name.trim().is_empty() || !VALID_PLAN_STATUSES.contains(&request.status.as_str())
    {
        return HttpResponse::BadRequest()
            .json(ErrorResponse::new("Name and a valid status are required"));
    }

    let start_date = match parse_plan_date(request.start_date.as_deref()) {
        Ok(date) => date,
        Err(e) => return HttpResponse::BadRequest().json(ErrorResponse::new(&e)),
    };
    let end_date = match parse_plan_date(request.end_date.as_deref()) {
        Ok(date) => date,
        Err(e) => return HttpResponse::BadRequest().json(ErrorResponse::new(&e)),
    };

    let plan_id = Uuid::new_v4().to_string();
    let insert_result = sqlx::query(
        "INSERT INTO test_plans (id, name, description, content, implementation, status, \
         start_date, end_date, is_ai_generated, project_id, created_by_id) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&plan_id)
    .bind(request.name.trim())
    .bind(&request.description)
    .bind(&request.content)
    .bind(&request.implementation)
    .bind(&request.status)
    .bind(start_date)
    .bind(end_date)
    .bind(request.is_ai_generated)
    .bind(&request.project_id)
    .bind(&user.id)
    .execute(pool.get_ref())
    .await;

    if let Err(e) = insert_result {
        error!("Failed to create test plan for user {}: {}", user.id, e);
        return HttpResponse::InternalServerError()
            .json(ErrorResponse::with_details("Failed to create test plan", e));
    }

    let fetch_result = sqlx::query_as::<_, TestPlan>(&format!(
        "SELECT {} FROM test_plans WHERE id = ?",
        TEST_PLAN_COLUMNS
    ))
    .bind(&plan_id)
    .fetch_one(pool.get_ref())
    .await;

    match fetch_result {
        Ok(plan) => {
            info!("Test plan {} created by user {}", plan.id, user.id);
            HttpResponse::Created().json(plan)
        }
        Err(e) => {
            error!("Test plan not found after insertion: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Test plan not found after insertion"))
        }
    }
}

pub async fn get_test_plan(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    path: web::Path<String>,
) -> impl Responder {
    if let Err(resp) = guard::current_user(pool.get_ref(), &req).await {
        return resp;
    }
    let plan_id = path.into_inner();

    let result = sqlx::query_as::<_, TestPlan>(&format!(
        "SELECT {} FROM test_plans WHERE id = ?",
        TEST_PLAN_COLUMNS
    ))
    .bind(&plan_id)
    .fetch_optional(pool.get_ref())
    .await;

    match result {
        Ok(Some(plan)) => HttpResponse::Ok().json(plan),
        Ok(None) => {
            info!("Test plan not found: {}", plan_id);
            HttpResponse::NotFound().json(ErrorResponse::new("Test plan not found"))
        }
        Err(e) => {
            error!("Failed to fetch test plan {}: {}", plan_id, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::with_details("Failed to fetch test plan", e))
        }
    }
}

pub async fn update_test_plan(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    path: web::Path<String>,
    request: web::Json<TestPlanPayload>,
) -> impl Responder {
    if let Err(resp) = guard::current_user(pool.get_ref(), &req).await {
        return resp;
    }
    let plan_id = path.into_inner();

    if request.name.trim().is_empty() || !VALID_PLAN_STATUSES.contains(&request.status.as_str())
    {
        return HttpResponse::BadRequest()
            .json(ErrorResponse::new("Name and a valid status are required"));
    }

    let start_date = match parse_plan_date(request.start_date.as_deref()) {
        Ok(date) => date,
        Err(e) => return HttpResponse::BadRequest().json(ErrorResponse::new(&e)),
    };
    let end_date = match parse_plan_date(request.end_date.as_deref()) {
        Ok(date) => date,
        Err(e) => return HttpResponse::BadRequest().json(ErrorResponse::new(&e)),
    };

    let update_result = sqlx::query(
        "UPDATE test_plans SET name = ?, description = ?, content = ?, implementation = ?, \
         status = ?, start_date = ?, end_date = ?, is_ai_generated = ? WHERE id = ?",
    )
    .bind(request.name.trim())
    .bind(&request.description)
    .bind(&request.content)
    .bind(&request.implementation)
    .bind(&request.status)
    .bind(start_date)
    .bind(end_date)
    .bind(request.is_ai_generated)
    .bind(&plan_id)
    .execute(pool.get_ref())
    .await;

    match update_result {
        Ok(done) if done.rows_affected() == 0 => {
            info!("Test plan not found for update: {}", plan_id);
            HttpResponse::NotFound().json(ErrorResponse::new("Test plan not found"))
        }
        Ok(_) => {
            let fetch_result = sqlx::query_as::<_, TestPlan>(&format!(
                "SELECT {} FROM test_plans WHERE id = ?",
                TEST_PLAN_COLUMNS
            ))
            .bind(&plan_id)
            .fetch_one(pool.get_ref())
            .await;

            match fetch_result {
                Ok(plan) => HttpResponse::Ok().json(plan),
                Err(e) => {
                    error!("Failed to fetch updated test plan {}: {}", plan_id, e);
                    HttpResponse::InternalServerError()
                        .json(ErrorResponse::with_details("Failed to fetch test plan", e))
                }
            }
        }
        Err(e) => {
            error!("Failed to update test plan {}: {}", plan_id, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::with_details("Failed to update test plan", e))
        }
    }
}

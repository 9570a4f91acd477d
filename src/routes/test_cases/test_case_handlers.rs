use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::{error, info};
use sqlx::MySqlPool;
use uuid::Uuid;

use super::test_case_models::{
    normalize_priority, CreateTestCaseRequest, DeleteTestCaseRequest, ListTestCasesQuery,
    UpdateTestCaseRequest, VALID_PRIORITIES, VALID_STATUSES,
};
use crate::models::test_case::TestCase;
use crate::routes::guard::{self, ErrorResponse, SuccessResponse};

const TEST_CASE_COLUMNS: &str = "id, title, description, steps, expected, priority, status, \
     is_automated, is_ai_generated, ai_prompt, project_id, test_plan_id, created_by_id, \
     created_at, updated_at";

// Owner-scoped listing, optionally narrowed to one project.
pub async fn get_test_cases(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    query: web::Query<ListTestCasesQuery>,
) -> impl Responder {
    let user = match guard::current_user(pool.get_ref(), &req).await {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    let mut sql = format!(
        "SELECT {} FROM test_cases WHERE created_by_id = ?",
        TEST_CASE_COLUMNS
    );
    if query.project_id.is_some() {
        sql.push_str(" AND project_id = ?");
    }
    sql.push_str(" ORDER BY created_at DESC");

    let mut db_query = sqlx::query_as::<_, TestCase>(&sql).bind(&user.id);
    if let Some(project_id) = &query.project_id {
        db_query = db_query.bind(project_id);
    }

    match db_query.fetch_all(pool.get_ref()).await {
        Ok(cases) => HttpResponse::Ok().json(cases),
        Err(e) => {
            error!("Failed to fetch test cases for user {}: {}", user.id, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::with_details("Failed to fetch test cases", e))
        }
    }
}

pub async fn create_test_case(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<CreateTestCaseRequest>,
) -> impl Responder {
    let user = match guard::current_user(pool.get_ref(), &req).await {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    let project_id = match &request.project_id {
        Some(id) if !id.is_empty() => id,
        _ => {
            return HttpResponse::BadRequest()
                .json(ErrorResponse::new("A test case must belong to a project"));
        }
    };
    if request.title.trim().is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse::new("Title is required"));
    }

    let case_id = Uuid::new_v4().to_string();
    let priority = normalize_priority(request.priority.as_deref());

    let insert_result = sqlx::query(
        "INSERT INTO test_cases (id, title, description, steps, expected, priority, \
         project_id, test_plan_id, created_by_id) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&case_id)
    .bind(request.title.trim())
    .bind(request.description.as_deref().unwrap_or(""))
    .bind(&request.steps)
    .bind(&request.expected)
    .bind(priority)
    .bind(project_id)
    .bind(&request.test_plan_id)
    .bind(&user.id)
    .execute(pool.get_ref())
    .await;

    if let Err(e) = insert_result {
        error!("Failed to create test case for user {}: {}", user.id, e);
        return HttpResponse::InternalServerError()
            .json(ErrorResponse::with_details("Failed to create test case", e));
    }

    // Optional many-to-many link back to the ticket that motivated the case.
    if let Some(ticket_id) = request.ticket_id.as_deref().filter(|t| !t.is_empty()) {
        let link_result = sqlx::query(
            "INSERT INTO ticket_test_cases (ticket_id, test_case_id) VALUES (?, ?)",
        )
        .bind(ticket_id)
        .bind(&case_id)
        .execute(pool.get_ref())
        .await;

        if let Err(e) = link_result {
            error!(
                "Failed to link test case {} to ticket {}: {}",
                case_id, ticket_id, e
            );
        }
    }

    let fetch_result = sqlx::query_as::<_, TestCase>(&format!(
        "SELECT {} FROM test_cases WHERE id = ?",
        TEST_CASE_COLUMNS
    ))
    .bind(&case_id)
    .fetch_one(pool.get_ref())
    .await;

    match fetch_result {
        Ok(case) => {
            info!("Test case {} created by user {}", case.id, user.id);
            HttpResponse::Created().json(case)
        }
        Err(e) => {
            error!("Test case not found after insertion: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Test case not found after insertion"))
        }
    }
}

// Partial update of an owned test case.
pub async fn update_test_case(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<UpdateTestCaseRequest>,
) -> impl Responder {
    let user = match guard::current_user(pool.get_ref(), &req).await {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    let priority = request
        .priority
        .as_deref()
        .filter(|p| VALID_PRIORITIES.contains(p));
    let status = request
        .status
        .as_deref()
        .filter(|s| VALID_STATUSES.contains(s));

    let update_result = sqlx::query(
        "UPDATE test_cases SET \
         title = COALESCE(?, title), \
         description = COALESCE(?, description), \
         steps = COALESCE(?, steps), \
         expected = COALESCE(?, expected), \
         priority = COALESCE(?, priority), \
         status = COALESCE(?, status) \
         WHERE id = ? AND created_by_id = ?",
    )
    .bind(&request.title)
    .bind(&request.description)
    .bind(&request.steps)
    .bind(&request.expected)
    .bind(priority)
    .bind(status)
    .bind(&request.id)
    .bind(&user.id)
    .execute(pool.get_ref())
    .await;

    match update_result {
        Ok(done) if done.rows_affected() == 0 => {
            info!("Test case {} not found for user {}", request.id, user.id);
            HttpResponse::NotFound().json(ErrorResponse::new("Test case not found"))
        }
        Ok(_) => {
            let fetch_result = sqlx::query_as::<_, TestCase>(&format!(
                "SELECT {} FROM test_cases WHERE id = ?",
                TEST_CASE_COLUMNS
            ))
            .bind(&request.id)
            .fetch_one(pool.get_ref())
            .await;

            match fetch_result {
                Ok(case) => HttpResponse::Ok().json(case),
                Err(e) => {
                    error!("Failed to fetch updated test case {}: {}", request.id, e);
                    HttpResponse::InternalServerError()
                        .json(ErrorResponse::with_details("Failed to fetch test case", e))
                }
            }
        }
        Err(e) => {
            error!("Failed to update test case {}: {}", request.id, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::with_details("Failed to update test case", e))
        }
    }
}

pub async fn delete_test_case(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<DeleteTestCaseRequest>,
) -> impl Responder {
    let user = match guard::current_user(pool.get_ref(), &req).await {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    let delete_result = sqlx::query(
        "DELETE FROM test_cases WHERE id = ? AND created_by_id = ?",
    )
    .bind(&request.id)
    .bind(&user.id)
    .execute(pool.get_ref())
    .await;

    match delete_result {
        Ok(done) if done.rows_affected() > 0 => {
            info!("Test case {} deleted by user {}", request.id, user.id);
            HttpResponse::Ok().json(SuccessResponse::ok())
        }
        Ok(_) => {
            info!("Test case {} not found for user {}", request.id, user.id);
            HttpResponse::NotFound().json(ErrorResponse::new("Test case not found"))
        }
        Err(e) => {
            error!("Failed to delete test case {}: {}", request.id, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::with_details("Failed to delete test case", e))
        }
    }
}

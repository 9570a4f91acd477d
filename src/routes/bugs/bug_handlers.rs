use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::{error, info};
use sqlx::MySqlPool;
use uuid::Uuid;

use super::bug_models::{
    BugWithRelations, CreateBugRequest, DeleteBugRequest, ListBugsQuery, UpdateBugRequest,
    VALID_BUG_STATUSES,
};
use crate::models::bug::Bug;
use crate::routes::guard::{self, ErrorResponse, SuccessResponse};
use crate::routes::tickets::ticket_models::{normalize_ticket_priority, VALID_TICKET_PRIORITIES};

const BUG_COLUMNS: &str = "id, title, description, priority, status, ticket_id, \
     test_case_id, project_id, created_by_id, created_at, updated_at";

const BUG_JOIN_SELECT: &str = "SELECT b.id, b.title, b.description, b.priority, b.status, \
     b.ticket_id, b.test_case_id, b.project_id, b.created_by_id, b.created_at, b.updated_at, \
     t.title AS ticket_title, tc.title AS test_case_title, p.name AS project_name, \
     u.name AS created_by_name, u.email AS created_by_email \
     FROM bugs b \
     JOIN tickets t ON b.ticket_id = t.id \
     LEFT JOIN test_cases tc ON b.test_case_id = tc.id \
     JOIN projects p ON b.project_id = p.id \
     JOIN users u ON b.created_by_id = u.id";

pub async fn get_bugs(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    query: web::Query<ListBugsQuery>,
) -> impl Responder {
    if let Err(resp) = guard::current_user(pool.get_ref(), &req).await {
        return resp;
    }

    let mut sql = format!("{} WHERE 1 = 1", BUG_JOIN_SELECT);
    if query.ticket_id.is_some() {
        sql.push_str(" AND b.ticket_id = ?");
    }
    if query.test_case_id.is_some() {
        sql.push_str(" AND b.test_case_id = ?");
    }
    if query.project_id.is_some() {
        sql.push_str(" AND b.project_id = ?");
    }
    sql.push_str(" ORDER BY b.created_at DESC");

    let mut db_query = sqlx::query_as::<_, BugWithRelations>(&sql);
    if let Some(ticket_id) = &query.ticket_id {
        db_query = db_query.bind(ticket_id);
    }
    if let Some(test_case_id) = &query.test_case_id {
        db_query = db_query.bind(test_case_id);
    }
    if let Some(project_id) = &query.project_id {
        db_query = db_query.bind(project_id);
    }

    match db_query.fetch_all(pool.get_ref()).await {
        Ok(bugs) => HttpResponse::Ok().json(bugs),
        Err(e) => {
            error!("Failed to fetch bugs: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::with_details("Failed to fetch bugs", e))
        }
    }
}

pub async fn create_bug(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<CreateBugRequest>,
) -> impl Responder {
    let user = match guard::current_user(pool.get_ref(), &req).await {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    let ticket_id = request.ticket_id.as_deref().unwrap_or("");
    let project_id = request.project_id.as_deref().unwrap_or("");
    if request.title.trim().is_empty() || ticket_id.is_empty() || project_id.is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse::new("Missing required fields"));
    }

    let priority = normalize_ticket_priority(request.priority.as_deref());
    let bug_id = Uuid::new_v4().to_string();

    let insert_result = sqlx::query(
        "INSERT INTO bugs (id, title, description, priority, ticket_id, test_case_id, \
         project_id, created_by_id) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&bug_id)
    .bind(request.title.trim())
    .bind(&request.description)
    .bind(priority)
    .bind(ticket_id)
    .bind(&request.test_case_id)
    .bind(project_id)
    .bind(&user.id)
    .execute(pool.get_ref())
    .await;

    if let Err(e) = insert_result {
        error!("Failed to create bug for user {}: {}", user.id, e);
        return HttpResponse::InternalServerError()
            .json(ErrorResponse::with_details("Failed to create bug", e));
    }

    let fetch_result = sqlx::query_as::<_, Bug>(&format!(
        "SELECT {} FROM bugs WHERE id = ?",
        BUG_COLUMNS
    ))
    .bind(&bug_id)
    .fetch_one(pool.get_ref())
    .await;

    match fetch_result {
        Ok(bug) => {
            info!("Bug {} created by user {}", bug.id, user.id);
            HttpResponse::Created().json(bug)
        }
        Err(e) => {
            error!("Bug not found after insertion: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Bug not found after insertion"))
        }
    }
}

pub async fn update_bug(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<UpdateBugRequest>,
) -> impl Responder {
    if let Err(resp) = guard::current_user(pool.get_ref(), &req).await {
        return resp;
    }

    let priority = request
        .priority
        .as_deref()
        .filter(|p| VALID_TICKET_PRIORITIES.contains(p));
    let status = request
        .status
        .as_deref()
        .filter(|s| VALID_BUG_STATUSES.contains(s));

    let update_result = sqlx::query(
        "UPDATE bugs SET \
         title = COALESCE(?, title), \
         description = COALESCE(?, description), \
         priority = COALESCE(?, priority), \
         status = COALESCE(?, status) \
         WHERE id = ?",
    )
    .bind(&request.title)
    .bind(&request.description)
    .bind(priority)
    .bind(status)
    .bind(&request.id)
    .execute(pool.get_ref())
    .await;

    match update_result {
        Ok(done) if done.rows_affected() == 0 => {
            info!("Bug not found for update: {}", request.id);
            HttpResponse::NotFound().json(ErrorResponse::new("Bug not found"))
        }
        Ok(_) => {
            let fetch_result = sqlx::query_as::<_, Bug>(&format!(
                "SELECT {} FROM bugs WHERE id = ?",
                BUG_COLUMNS
            ))
            .bind(&request.id)
            .fetch_one(pool.get_ref())
            .await;

            match fetch_result {
                Ok(bug) => HttpResponse::Ok().json(bug),
                Err(e) => {
                    error!("Failed to fetch updated bug {}: {}", request.id, e);
                    HttpResponse::InternalServerError()
                        .json(ErrorResponse::with_details("Failed to fetch bug", e))
                }
            }
        }
        Err(e) => {
            error!("Failed to update bug {}: {}", request.id, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::with_details("Failed to update bug", e))
        }
    }
}

pub async fn delete_bug(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<DeleteBugRequest>,
) -> impl Responder {
    if let Err(resp) = guard::current_user(pool.get_ref(), &req).await {
        return resp;
    }

    let delete_result = sqlx::query("DELETE FROM bugs WHERE id = ?")
        .bind(&request.id)
        .execute(pool.get_ref())
        .await;

    match delete_result {
        Ok(done) if done.rows_affected() > 0 => {
            info!("Bug {} deleted", request.id);
            HttpResponse::Ok().json(SuccessResponse::ok())
        }
        Ok(_) => {
            info!("Bug not found for deletion: {}", request.id);
            HttpResponse::NotFound().json(ErrorResponse::new("Bug not found"))
        }
        Err(e) => {
            error!("Failed to delete bug {}: {}", request.id, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::with_details("Failed to delete bug", e))
        }
    }
}

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::{error, info};
use sqlx::MySqlPool;
use uuid::Uuid;

use super::project_models::CreateProjectRequest;
use crate::models::project::Project;
use crate::routes::guard::{self, ErrorResponse};

const PROJECT_COLUMNS: &str =
    "id, name, type, description, created_at, updated_at";

pub async fn get_projects(pool: web::Data<MySqlPool>, req: HttpRequest) -> impl Responder {
    if let Err(resp) = guard::current_user(pool.get_ref(), &req).await {
        return resp;
    }

    let result = sqlx::query_as::<_, Project>(&format!(
        "SELECT {} FROM projects ORDER BY created_at DESC",
        PROJECT_COLUMNS
    ))
    .fetch_all(pool.get_ref())
    .await;

    match result {
        Ok(projects) => HttpResponse::Ok().json(projects),
        Err(e) => {
            error!("Failed to fetch projects: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::with_details("Failed to fetch projects", e))
        }
    }
}

pub async fn create_project(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<CreateProjectRequest>,
) -> impl Responder {
    if let Err(resp) = guard::current_user(pool.get_ref(), &req).await {
        return resp;
    }

    let name = request.name.trim();
    let project_type = request.project_type.trim();
    if name.is_empty() || project_type.is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse::new("Name and type are required"));
    }

    let project_id = Uuid::new_v4().to_string();
    let insert_result = sqlx::query(
        "INSERT INTO projects (id, name, type, description) VALUES (?, ?, ?, ?)",
    )
    .bind(&project_id)
    .bind(name)
    .bind(project_type)
    .bind(&request.description)
    .execute(pool.get_ref())
    .await;

    if let Err(e) = insert_result {
        error!("Failed to create project {}: {}", name, e);
        return HttpResponse::InternalServerError()
            .json(ErrorResponse::with_details("Failed to create project", e));
    }

    let fetch_result = sqlx::query_as::<_, Project>(&format!(
        "SELECT {} FROM projects WHERE id = ?",
        PROJECT_COLUMNS
    ))
    .bind(&project_id)
    .fetch_one(pool.get_ref())
    .await;

    match fetch_result {
        Ok(project) => {
            info!("Project {} created", project.name);
            HttpResponse::Created().json(project)
        }
        Err(e) => {
            error!("Project not found after insertion: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Project not found after insertion"))
        }
    }
}

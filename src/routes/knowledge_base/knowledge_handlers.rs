use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::{error, info};
use sqlx::MySqlPool;
use uuid::Uuid;

use super::knowledge_models::{
    encode_tags, CreateKnowledgeRequest, KnowledgeIdQuery, KnowledgeResponse, KnowledgeRow,
    KnowledgeSearchQuery, UpdateKnowledgeRequest,
};
use crate::routes::guard::{self, ErrorResponse, SuccessResponse};

const KNOWLEDGE_JOIN_SELECT: &str = "SELECT k.id, k.title, k.content, k.category, k.tags, \
     k.is_public, k.created_by_id, k.created_at, k.updated_at, \
     u.name AS created_by_name, u.email AS created_by_email \
     FROM knowledge_base k \
     JOIN users u ON k.created_by_id = u.id";

// Public entries plus the caller's own, searchable over title/content/tags.
pub async fn get_knowledge(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    query: web::Query<KnowledgeSearchQuery>,
) -> impl Responder {
    let user = match guard::current_user(pool.get_ref(), &req).await {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    let mut sql = format!(
        "{} WHERE (k.is_public = TRUE OR k.created_by_id = ?)",
        KNOWLEDGE_JOIN_SELECT
    );
    if query.search.is_some() {
        sql.push_str(" AND (k.title LIKE ? OR k.content LIKE ? OR k.tags LIKE ?)");
    }
    if query.category.is_some() {
        sql.push_str(" AND LOWER(k.category) = LOWER(?)");
    }
    sql.push_str(" ORDER BY k.created_at DESC");

    let mut db_query = sqlx::query_as::<_, KnowledgeRow>(&sql).bind(&user.id);
    let pattern = query.search.as_ref().map(|s| format!("%{}%", s));
    if let Some(pattern) = &pattern {
        db_query = db_query.bind(pattern).bind(pattern).bind(pattern);
    }
    if let Some(category) = &query.category {
        db_query = db_query.bind(category);
    }

    match db_query.fetch_all(pool.get_ref()).await {
        Ok(rows) => {
            let entries: Vec<KnowledgeResponse> =
                rows.into_iter().map(KnowledgeResponse::from).collect();
            HttpResponse::Ok().json(entries)
        }
        Err(e) => {
            error!("Failed to fetch knowledge entries: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::with_details(
                "Failed to fetch knowledge entries",
                e,
            ))
        }
    }
}

pub async fn create_knowledge(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<CreateKnowledgeRequest>,
) -> impl Responder {
    let user = match guard::current_user(pool.get_ref(), &req).await {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    if request.title.trim().is_empty() || request.content.trim().is_empty() {
        return HttpResponse::BadRequest()
            .json(ErrorResponse::new("Title and content are required"));
    }

    let entry_id = Uuid::new_v4().to_string();
    let category = request
        .category
        .as_deref()
        .filter(|c| !c.is_empty())
        .unwrap_or("General");

    let insert_result = sqlx::query(
        "INSERT INTO knowledge_base (id, title, content, category, tags, is_public, \
         created_by_id) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&entry_id)
    .bind(request.title.trim())
    .bind(&request.content)
    .bind(category)
    .bind(encode_tags(&request.tags))
    .bind(request.is_public)
    .bind(&user.id)
    .execute(pool.get_ref())
    .await;

    if let Err(e) = insert_result {
        error!("Failed to create knowledge entry for user {}: {}", user.id, e);
        return HttpResponse::InternalServerError().json(ErrorResponse::with_details(
            "Failed to create knowledge entry",
            e,
        ));
    }

    let fetch_result = sqlx::query_as::<_, KnowledgeRow>(&format!(
        "{} WHERE k.id = ?",
        KNOWLEDGE_JOIN_SELECT
    ))
    .bind(&entry_id)
    .fetch_one(pool.get_ref())
    .await;

    match fetch_result {
        Ok(row) => {
            info!("Knowledge entry {} created by user {}", entry_id, user.id);
            HttpResponse::Created().json(KnowledgeResponse::from(row))
        }
        Err(e) => {
            error!("Knowledge entry not found after insertion: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Knowledge entry not found after insertion"))
        }
    }
}

pub async fn update_knowledge(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    query: web::Query<KnowledgeIdQuery>,
    request: web::Json<UpdateKnowledgeRequest>,
) -> impl Responder {
    let user = match guard::current_user(pool.get_ref(), &req).await {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    let entry_id = match &query.id {
        Some(id) if !id.is_empty() => id.clone(),
        _ => return HttpResponse::BadRequest().json(ErrorResponse::new("ID is required")),
    };

    let update_result = sqlx::query(
        "UPDATE knowledge_base SET title = ?, content = ?, category = ?, tags = ?, \
         is_public = ? WHERE id = ? AND created_by_id = ?",
    )
    .bind(request.title.trim())
    .bind(&request.content)
    .bind(&request.category)
    .bind(encode_tags(&request.tags))
    .bind(request.is_public)
    .bind(&entry_id)
    .bind(&user.id)
    .execute(pool.get_ref())
    .await;

    match update_result {
        Ok(done) if done.rows_affected() == 0 => {
            info!("Knowledge entry {} not found for user {}", entry_id, user.id);
            HttpResponse::NotFound().json(ErrorResponse::new("Knowledge entry not found"))
        }
        Ok(_) => {
            let fetch_result = sqlx::query_as::<_, KnowledgeRow>(&format!(
                "{} WHERE k.id = ?",
                KNOWLEDGE_JOIN_SELECT
            ))
            .bind(&entry_id)
            .fetch_one(pool.get_ref())
            .await;

            match fetch_result {
                Ok(row) => HttpResponse::Ok().json(KnowledgeResponse::from(row)),
                Err(e) => {
                    error!("Failed to fetch updated knowledge entry {}: {}", entry_id, e);
                    HttpResponse::InternalServerError().json(ErrorResponse::with_details(
                        "Failed to fetch knowledge entry",
                        e,
                    ))
                }
            }
        }
        Err(e) => {
            error!("Failed to update knowledge entry {}: {}", entry_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse::with_details(
                "Failed to update knowledge entry",
                e,
            ))
        }
    }
}

pub async fn delete_knowledge(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    query: web::Query<KnowledgeIdQuery>,
) -> impl Responder {
    let user = match guard::current_user(pool.get_ref(), &req).await {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    let entry_id = match &query.id {
        Some(id) if !id.is_empty() => id.clone(),
        _ => return HttpResponse::BadRequest().json(ErrorResponse::new("ID is required")),
    };

    let delete_result = sqlx::query(
        "DELETE FROM knowledge_base WHERE id = ? AND created_by_id = ?",
    )
    .bind(&entry_id)
    .bind(&user.id)
    .execute(pool.get_ref())
    .await;

    match delete_result {
        Ok(done) if done.rows_affected() > 0 => {
            info!("Knowledge entry {} deleted by user {}", entry_id, user.id);
            HttpResponse::Ok().json(SuccessResponse::ok())
        }
        Ok(_) => {
            info!("Knowledge entry {} not found for user {}", entry_id, user.id);
            HttpResponse::NotFound().json(ErrorResponse::new("Knowledge entry not found"))
        }
        Err(e) => {
            error!("Failed to delete knowledge entry {}: {}", entry_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse::with_details(
                "Failed to delete knowledge entry",
                e,
            ))
        }
    }
}

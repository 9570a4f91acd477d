use actix_web::{web, HttpRequest, HttpResponse, Responder};
use bcrypt::{hash, DEFAULT_COST};
use log::{error, info};
use sqlx::MySqlPool;
use uuid::Uuid;

use super::admin_models::{
    normalize_role, AdminDefaultResponse, AdminUser, CreateUserRequest, DeleteUserRequest,
    UpdateUserRequest,
};
use crate::routes::guard::{self, ErrorResponse, SuccessResponse};

const ADMIN_USER_COLUMNS: &str = "id, name, email, role, image, created_at";

pub async fn get_users(pool: web::Data<MySqlPool>, req: HttpRequest) -> impl Responder {
    if let Err(resp) = guard::current_admin(pool.get_ref(), &req).await {
        return resp;
    }

    let result = sqlx::query_as::<_, AdminUser>(&format!(
        "SELECT {} FROM users ORDER BY created_at DESC",
        ADMIN_USER_COLUMNS
    ))
    .fetch_all(pool.get_ref())
    .await;

    match result {
        Ok(users) => HttpResponse::Ok().json(users),
        Err(e) => {
            error!("Failed to fetch users: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::with_details("Failed to fetch users", e))
        }
    }
}

pub async fn create_user(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<CreateUserRequest>,
) -> impl Responder {
    let admin = match guard::current_admin(pool.get_ref(), &req).await {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    let email = request.email.trim();
    if email.is_empty() || request.password.is_empty() {
        return HttpResponse::BadRequest()
            .json(ErrorResponse::new("Email and password are required"));
    }

    let hashed_password = match hash(&request.password, DEFAULT_COST) {
        Ok(hp) => hp,
        Err(e) => {
            error!("Failed to hash password: {}", e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Failed to hash password"));
        }
    };

    let user_id = Uuid::new_v4().to_string();
    let role = normalize_role(request.role.as_deref());

    let insert_result = sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, role) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&user_id)
    .bind(request.name.trim())
    .bind(email)
    .bind(&hashed_password)
    .bind(role)
    .execute(pool.get_ref())
    .await;

    if let Err(e) = insert_result {
        error!("Failed to create user {}: {}", email, e);
        return HttpResponse::InternalServerError()
            .json(ErrorResponse::with_details("Failed to create user", e));
    }

    let fetch_result = sqlx::query_as::<_, AdminUser>(&format!(
        "SELECT {} FROM users WHERE id = ?",
        ADMIN_USER_COLUMNS
    ))
    .bind(&user_id)
    .fetch_one(pool.get_ref())
    .await;

    match fetch_result {
        Ok(user) => {
            info!("User {} created by admin {}", user.email, admin.id);
            HttpResponse::Created().json(user)
        }
        Err(e) => {
            error!("User not found after insertion: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::new("User not found after insertion"))
        }
    }
}

pub async fn update_user(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<UpdateUserRequest>,
) -> impl Responder {
    if let Err(resp) = guard::current_admin(pool.get_ref(), &req).await {
        return resp;
    }

    let role = request
        .role
        .as_deref()
        .filter(|r| super::admin_models::VALID_ROLES.contains(r));

    let update_result = sqlx::query(
        "UPDATE users SET \
         name = COALESCE(?, name), \
         email = COALESCE(?, email), \
         role = COALESCE(?, role) \
         WHERE id = ?",
    )
    .bind(&request.name)
    .bind(&request.email)
    .bind(role)
    .bind(&request.id)
    .execute(pool.get_ref())
    .await;

    match update_result {
        Ok(done) if done.rows_affected() == 0 => {
            info!("User not found for update: {}", request.id);
            HttpResponse::NotFound().json(ErrorResponse::new("User not found"))
        }
        Ok(_) => {
            let fetch_result = sqlx::query_as::<_, AdminUser>(&format!(
                "SELECT {} FROM users WHERE id = ?",
                ADMIN_USER_COLUMNS
            ))
            .bind(&request.id)
            .fetch_one(pool.get_ref())
            .await;

            match fetch_result {
                Ok(user) => HttpResponse::Ok().json(user),
                Err(e) => {
                    error!("Failed to fetch updated user {}: {}", request.id, e);
                    HttpResponse::InternalServerError()
                        .json(ErrorResponse::with_details("Failed to fetch user", e))
                }
            }
        }
        Err(e) => {
            error!("Failed to update user {}: {}", request.id, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::with_details("Failed to update user", e))
        }
    }
}

// Deleting yourself or another admin is refused.
pub async fn delete_user(
    pool: web::Data<MySqlPool>,
    req: HttpRequest,
    request: web::Json<DeleteUserRequest>,
) -> impl Responder {
    let admin = match guard::current_admin(pool.get_ref(), &req).await {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    if request.id == admin.id {
        return HttpResponse::BadRequest()
            .json(ErrorResponse::new("You cannot delete your own account"));
    }

    let target_role = sqlx::query_scalar::<_, String>("SELECT role FROM users WHERE id = ?")
        .bind(&request.id)
        .fetch_optional(pool.get_ref())
        .await;

    let target_role = match target_role {
        Ok(Some(role)) => role,
        Ok(None) => {
            info!("User not found for deletion: {}", request.id);
            return HttpResponse::NotFound().json(ErrorResponse::new("User not found"));
        }
        Err(e) => {
            error!("Failed to fetch user {}: {}", request.id, e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::with_details("Failed to fetch user", e));
        }
    };

    if target_role == "ADMIN" {
        return HttpResponse::Forbidden()
            .json(ErrorResponse::new("Other admins cannot be deleted"));
    }

    let delete_result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(&request.id)
        .execute(pool.get_ref())
        .await;

    match delete_result {
        Ok(_) => {
            info!("User {} deleted by admin {}", request.id, admin.id);
            HttpResponse::Ok().json(SuccessResponse::ok())
        }
        Err(e) => {
            error!("Failed to delete user {}: {}", request.id, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::with_details("Failed to delete user", e))
        }
    }
}

pub async fn session_reset(pool: web::Data<MySqlPool>, req: HttpRequest) -> impl Responder {
    if let Err(resp) = guard::current_admin(pool.get_ref(), &req).await {
        return resp;
    }

    let result = sqlx::query("DELETE FROM sessions").execute(pool.get_ref()).await;

    match result {
        Ok(_) => HttpResponse::Ok().json(AdminDefaultResponse {
            success: true,
            message: "All sessions have been reset successfully".into(),
        }),
        Err(e) => {
            error!("Failed to reset sessions: {}", e);
            HttpResponse::InternalServerError().json(AdminDefaultResponse {
                success: false,
                message: "Failed to reset sessions".into(),
            })
        }
    }
}

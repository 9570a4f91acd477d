use actix_web::{web, HttpRequest, HttpResponse, Responder};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use log::{error, info};
use sqlx::MySqlPool;
use uuid::Uuid;

use super::auth_models::{
    session_expiry, AutoLoginResponse, LoginRequest, LoginResponse, LogoutResponse,
    RegisterRequest, RegisterResponse, RegisteredUser,
};
use crate::models::session::Session;
use crate::models::user::User;
use crate::routes::guard::ErrorResponse;

pub async fn auth_get() -> impl Responder {
    HttpResponse::Ok().body("Hello, this is the TestHub auth endpoint.")
}

// Register a new user with a bcrypt-hashed password.
pub async fn register(
    pool: web::Data<MySqlPool>,
    req: web::Json<RegisterRequest>,
) -> impl Responder {
    let email = req.email.trim();
    if email.is_empty() || req.password.is_empty() {
        return HttpResponse::BadRequest()
            .json(ErrorResponse::new("Email and password are required"));
    }
    info!("Received request to register user: {}", email);

    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind(email)
        .fetch_one(pool.get_ref())
        .await;

    match existing {
        Ok(0) => {}
        Ok(_) => {
            info!("Registration rejected, email already in use: {}", email);
            return HttpResponse::BadRequest().json(ErrorResponse::new("User already exists"));
        }
        Err(e) => {
            error!("Failed to check existing user {}: {}", email, e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::with_details("Failed to register user", e));
        }
    }

    let hashed_password = match hash(&req.password, DEFAULT_COST) {
        Ok(hp) => hp,
        Err(e) => {
            error!("Failed to hash password: {}", e);
            return HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Failed to hash password"));
        }
    };

    let user_id = Uuid::new_v4().to_string();
    let result = sqlx::query(
        "INSERT INTO users (id, name, email, password_hash) VALUES (?, ?, ?, ?)",
    )
    .bind(&user_id)
    .bind(req.name.trim())
    .bind(email)
    .bind(&hashed_password)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => {
            info!("User {} registered successfully", email);
            HttpResponse::Created().json(RegisterResponse {
                message: "Registration successful".into(),
                user: RegisteredUser {
                    id: user_id,
                    email: email.to_string(),
                },
            })
        }
        Err(e) => {
            error!("Failed to insert user {}: {}", email, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::with_details("Failed to register user", e))
        }
    }
}

// Verify credentials and hand out a session cookie. Any previous session for
// the user is replaced.
pub async fn login(pool: web::Data<MySqlPool>, req: web::Json<LoginRequest>) -> impl Responder {
    let email = req.email.trim();
    info!("Received login request for user: {}", email);

    let result = sqlx::query_as::<_, User>(
        "SELECT id, name, email, password_hash, role, image, created_at, updated_at \
         FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool.get_ref())
    .await;

    let user = match result {
        Ok(Some(user)) => user,
        Ok(None) => {
            info!("Invalid email: {}", email);
            return HttpResponse::Unauthorized().json(LoginResponse {
                success: false,
                message: "Invalid email or password".into(),
            });
        }
        Err(e) => {
            error!("Failed to fetch user {}: {}", email, e);
            return HttpResponse::InternalServerError().json(LoginResponse {
                success: false,
                message: "Failed to check credentials".into(),
            });
        }
    };

    let valid = match verify(&req.password, &user.password_hash) {
        Ok(valid) => valid,
        Err(e) => {
            error!("Error when checking password for user {}: {}", email, e);
            return HttpResponse::Unauthorized().json(LoginResponse {
                success: false,
                message: "Error when checking password".into(),
            });
        }
    };

    if !valid {
        info!("Invalid password for user: {}", email);
        return HttpResponse::Unauthorized().json(LoginResponse {
            success: false,
            message: "Invalid email or password".into(),
        });
    }

    let new_session_id = Uuid::new_v4().to_string();
    let expires_at = session_expiry(req.remember_me, Utc::now());

    if let Err(e) = sqlx::query("DELETE FROM sessions WHERE user_id = ?")
        .bind(&user.id)
        .execute(pool.get_ref())
        .await
    {
        error!("Failed to clear old session for user {}: {}", email, e);
        return HttpResponse::InternalServerError().json(LoginResponse {
            success: false,
            message: "Failed to create session".into(),
        });
    }

    let insert_result = sqlx::query(
        "INSERT INTO sessions (session_id, user_id, expires_at, is_persistent) VALUES (?, ?, ?, ?)",
    )
    .bind(&new_session_id)
    .bind(&user.id)
    .bind(expires_at)
    .bind(req.remember_me)
    .execute(pool.get_ref())
    .await;

    if let Err(e) = insert_result {
        error!("Failed to insert session for user {}: {}", email, e);
        return HttpResponse::InternalServerError().json(LoginResponse {
            success: false,
            message: "Failed to create session".into(),
        });
    }

    info!("User {} logged in successfully", email);
    HttpResponse::Ok()
        .cookie(
            actix_web::cookie::Cookie::build("session_id", new_session_id.clone())
                .http_only(true)
                .finish(),
        )
        .json(LoginResponse {
            success: true,
            message: "Login successful".into(),
        })
}

// Validate the cookie session and refresh the cookie on the way out.
pub async fn auto_login(pool: web::Data<MySqlPool>, req: HttpRequest) -> impl Responder {
    let session_id = match req.cookie("session_id") {
        Some(cookie) => cookie.value().to_string(),
        None => {
            info!("Session ID not found in cookies for auto login");
            return HttpResponse::BadRequest().json(AutoLoginResponse {
                success: false,
                message: "Session ID not found in cookies".into(),
                name: "".into(),
                email: "".into(),
            });
        }
    };

    info!("Received auto login request with session ID: {}", session_id);

    let session_result = sqlx::query_as::<_, Session>(
        "SELECT session_id, user_id, expires_at, is_persistent FROM sessions \
         WHERE session_id = ?",
    )
    .bind(&session_id)
    .fetch_optional(pool.get_ref())
    .await;

    let session = match session_result {
        Ok(Some(session)) => session,
        Ok(None) => {
            info!("Invalid session ID: {}", session_id);
            return HttpResponse::Unauthorized().json(AutoLoginResponse {
                success: false,
                message: "Invalid session ID".into(),
                name: "".into(),
                email: "".into(),
            });
        }
        Err(e) => {
            error!("Failed to validate session ID {}: {}", session_id, e);
            return HttpResponse::InternalServerError().json(AutoLoginResponse {
                success: false,
                message: "Failed to validate session".into(),
                name: "".into(),
                email: "".into(),
            });
        }
    };

    if session.expires_at < Utc::now() {
        let _ = sqlx::query("DELETE FROM sessions WHERE session_id = ?")
            .bind(&session_id)
            .execute(pool.get_ref())
            .await;

        info!("Session expired for session ID: {}", session_id);
        return HttpResponse::Unauthorized().json(AutoLoginResponse {
            success: false,
            message: "Login is needed, session expired".into(),
            name: "".into(),
            email: "".into(),
        });
    }

    let user_result = sqlx::query_as::<_, (String, String)>(
        "SELECT name, email FROM users WHERE id = ?",
    )
    .bind(&session.user_id)
    .fetch_one(pool.get_ref())
    .await;

    match user_result {
        Ok((name, email)) => {
            info!("Auto login successful for user: {}", email);
            HttpResponse::Ok()
                .cookie(
                    actix_web::cookie::Cookie::build("session_id", session_id.clone())
                        .http_only(true)
                        .finish(),
                )
                .json(AutoLoginResponse {
                    success: true,
                    message: format!("Welcome back, {}", name),
                    name,
                    email,
                })
        }
        Err(e) => {
            error!(
                "Failed to fetch user information for session ID {}: {}",
                session_id, e
            );
            HttpResponse::InternalServerError().json(AutoLoginResponse {
                success: false,
                message: "Failed to fetch user information".into(),
                name: "".into(),
                email: "".into(),
            })
        }
    }
}

pub async fn logout(pool: web::Data<MySqlPool>, req: HttpRequest) -> impl Responder {
    let session_id = match req.cookie("session_id") {
        Some(cookie) => cookie.value().to_string(),
        None => {
            info!("Session ID does not exist in cookies for logout");
            return HttpResponse::BadRequest().json(LogoutResponse {
                success: false,
                message: "Session ID does not exist".into(),
            });
        }
    };

    info!("Received logout request with session ID: {}", session_id);

    let delete_result = sqlx::query("DELETE FROM sessions WHERE session_id = ?")
        .bind(&session_id)
        .execute(pool.get_ref())
        .await;

    match delete_result {
        Ok(done) if done.rows_affected() > 0 => {
            info!("Logout successful for session ID: {}", session_id);
            HttpResponse::Ok().json(LogoutResponse {
                success: true,
                message: "Logout successful".into(),
            })
        }
        Ok(_) => {
            info!("Session not found for session ID: {}", session_id);
            HttpResponse::BadRequest().json(LogoutResponse {
                success: false,
                message: "Session not found".into(),
            })
        }
        Err(e) => {
            error!("Failed to delete session ID {}: {}", session_id, e);
            HttpResponse::InternalServerError().json(LogoutResponse {
                success: false,
                message: "Failed to logout".into(),
            })
        }
    }
}

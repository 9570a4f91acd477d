use actix_web::{HttpRequest, HttpResponse};
use log::{error, info};
use serde::Serialize;
use sqlx::{FromRow, MySqlPool};

#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: &str) -> Self {
        Self {
            error: error.to_string(),
            details: None,
        }
    }

    pub fn with_details(error: &str, details: impl ToString) -> Self {
        Self {
            error: error.to_string(),
            details: Some(details.to_string()),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CurrentUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

// Resolves the session cookie to its user. Expired rows are treated the same
// as missing ones; the expiry sweep happens on auto-login.
pub async fn current_user(
    pool: &MySqlPool,
    req: &HttpRequest,
) -> Result<CurrentUser, HttpResponse> {
    let session_id = match req.cookie("session_id") {
        Some(cookie) => cookie.value().to_string(),
        None => {
            info!("Session ID not found in cookies for {}", req.path());
            return Err(HttpResponse::Unauthorized().json(ErrorResponse::new("Unauthorized")));
        }
    };

    let result = sqlx::query_as::<_, CurrentUser>(
        "SELECT u.id, u.name, u.email, u.role FROM sessions s
         JOIN users u ON s.user_id = u.id
         WHERE s.session_id = ? AND s.expires_at > NOW()",
    )
    .bind(&session_id)
    .fetch_optional(pool)
    .await;

    match result {
        Ok(Some(user)) => Ok(user),
        Ok(None) => {
            info!("Invalid or expired session ID: {}", session_id);
            Err(HttpResponse::Unauthorized()
                .json(ErrorResponse::new("Invalid or expired session")))
        }
        Err(e) => {
            error!("Failed to validate session ID {}: {}", session_id, e);
            Err(HttpResponse::InternalServerError()
                .json(ErrorResponse::with_details("Failed to validate session", e)))
        }
    }
}

pub async fn current_admin(
    pool: &MySqlPool,
    req: &HttpRequest,
) -> Result<CurrentUser, HttpResponse> {
    let user = current_user(pool, req).await?;
    if user.role != "ADMIN" {
        info!("User {} denied admin access to {}", user.id, req.path());
        return Err(
            HttpResponse::Forbidden().json(ErrorResponse::new("Admin privileges required"))
        );
    }
    Ok(user)
}

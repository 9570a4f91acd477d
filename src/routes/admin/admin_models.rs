use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Serialize, FromRow)]
pub struct AdminUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub image: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

#[derive(Deserialize)]
pub struct DeleteUserRequest {
    pub id: String,
}

#[derive(Serialize)]
pub struct AdminDefaultResponse {
    pub success: bool,
    pub message: String,
}

pub const VALID_ROLES: [&str; 2] = ["USER", "ADMIN"];

pub fn normalize_role(role: Option<&str>) -> &str {
    match role {
        Some(r) if VALID_ROLES.contains(&r) => r,
        _ => "USER",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_role_defaults_to_user() {
        assert_eq!(normalize_role(Some("SUPERUSER")), "USER");
        assert_eq!(normalize_role(None), "USER");
        assert_eq!(normalize_role(Some("ADMIN")), "ADMIN");
    }
}

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// Registration request and response
#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct RegisteredUser {
    pub id: String,
    pub email: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: RegisteredUser,
}

// Login request and response
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
}

// Auto-login response
#[derive(Serialize)]
pub struct AutoLoginResponse {
    pub success: bool,
    pub message: String,
    pub name: String,
    pub email: String,
}

// Logout response
#[derive(Serialize)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
}

// Sessions last 30 minutes, or 10 days with remember-me.
pub fn session_expiry(remember_me: bool, now: DateTime<Utc>) -> DateTime<Utc> {
    if remember_me {
        now + Duration::days(10)
    } else {
        now + Duration::minutes(30)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_session_without_remember_me() {
        let now = Utc::now();
        assert_eq!(session_expiry(false, now), now + Duration::minutes(30));
    }

    #[test]
    fn persistent_session_with_remember_me() {
        let now = Utc::now();
        assert_eq!(session_expiry(true, now), now + Duration::days(10));
    }
}

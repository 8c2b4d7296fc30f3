//! Authentication routes — registration, login and account deletion.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use courier_accounts::users::{RegisterParams, UserService, normalize_email};
use courier_common::error::AppError;
use courier_common::types::User;

use crate::middleware::auth::{AuthUser, encode_jwt};
use crate::notify::{escape_html, spawn_email};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/delete/{email}", delete(delete_account))
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response for successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// POST /api/auth/register — Create a user and send a welcome email in the background.
async fn register(
    State(state): State<AppState>,
    Json(params): Json<RegisterParams>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = UserService::register(&state.pool, &params).await?;

    spawn_email(
        &state,
        user.email.clone(),
        "Welcome to Courier!".to_string(),
        welcome_body(&user.name),
    );

    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /api/auth/login — Verify credentials and return a JWT.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = UserService::authenticate(&state.pool, &req.email, &req.password).await?;

    let token = encode_jwt(
        user.id,
        &user.email,
        &state.config.jwt_secret,
        state.config.jwt_expiry_hours,
    )?;

    Ok(Json(LoginResponse { token, user }))
}

/// DELETE /api/auth/delete/:email — Delete the caller's own account.
async fn delete_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(email): Path<String>,
) -> Result<StatusCode, AppError> {
    if email.trim().is_empty() {
        return Err(AppError::Validation("Email is required.".to_string()));
    }

    if !owns_email(&auth, &email) {
        return Err(AppError::Forbidden(
            "Accounts can only be deleted by their owner".to_string(),
        ));
    }

    let user = UserService::delete_by_email(&state.pool, &email).await?;

    spawn_email(
        &state,
        user.email.clone(),
        "Account Deleted".to_string(),
        deletion_body(&user.name, &user.email),
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Whether the token was issued for `email`.
fn owns_email(auth: &AuthUser, email: &str) -> bool {
    auth.claims.email == normalize_email(email)
}

fn welcome_body(name: &str) -> String {
    format!(
        "<p>Hi {},</p>\
         <p>Thank you for registering with us. We are excited to have you on board!</p>\
         <p>Best Regards,<br>The Courier Team</p>",
        escape_html(name)
    )
}

fn deletion_body(name: &str, email: &str) -> String {
    format!(
        "<p>Hi {},</p>\
         <p>Your account associated with {} has been successfully deleted.</p>\
         <p>Best Regards,<br>The Courier Team</p>",
        escape_html(name),
        escape_html(email)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::Claims;

    fn auth_for(email: &str) -> AuthUser {
        AuthUser {
            user_id: uuid::Uuid::new_v4(),
            claims: Claims {
                sub: uuid::Uuid::new_v4().to_string(),
                email: email.to_string(),
                exp: 0,
                iat: 0,
            },
        }
    }

    #[test]
    fn test_owns_email_normalizes_path() {
        let auth = auth_for("ada@example.com");
        assert!(owns_email(&auth, " Ada@Example.com "));
        assert!(!owns_email(&auth, "grace@example.com"));
    }

    #[test]
    fn test_welcome_body_escapes_name() {
        let body = welcome_body("<script>alert(1)</script>");
        assert!(body.contains("&lt;script&gt;"));
        assert!(!body.contains("<script>"));
    }

    #[test]
    fn test_deletion_body_mentions_email() {
        let body = deletion_body("Ada", "ada@example.com");
        assert!(body.starts_with("<p>Hi Ada,</p>"));
        assert!(body.contains("ada@example.com"));
    }
}

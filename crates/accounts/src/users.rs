//! User service — registration, credential checks and lookups.
//!
//! Emails are stored lower-cased so lookups are case-insensitive without
//! relying on a functional index.

use sqlx::PgPool;
use uuid::Uuid;

use courier_common::error::AppError;
use courier_common::types::{Channel, User};

use crate::password::{MIN_PASSWORD_LENGTH, hash_password, verify_password};

/// Service layer for user accounts.
pub struct UserService;

/// Parameters for registering a new user.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct RegisterParams {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone_number: Option<String>,
    pub notification_preference: Option<Channel>,
}

impl RegisterParams {
    /// Check required fields and that the preferred channel has a contact field.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("Name is required.".to_string()));
        }
        if self.email.trim().is_empty() || self.password.trim().is_empty() {
            return Err(AppError::Validation(
                "Email and Password are required.".to_string(),
            ));
        }
        if !self.email.contains('@') {
            return Err(AppError::Validation(format!(
                "Invalid email address '{}'",
                self.email
            )));
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        let has_phone = self
            .phone_number
            .as_deref()
            .is_some_and(|p| !p.trim().is_empty());
        if self.notification_preference == Some(Channel::Sms) && !has_phone {
            return Err(AppError::Validation(
                "A phone number is required for SMS notifications".to_string(),
            ));
        }

        Ok(())
    }
}

/// Normalize an email for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl UserService {
    /// Register a new user. Fails with `Conflict` if the email is taken.
    pub async fn register(pool: &PgPool, params: &RegisterParams) -> Result<User, AppError> {
        params.validate()?;

        let email = normalize_email(&params.email);
        if Self::find_by_email(pool, &email).await?.is_some() {
            return Err(AppError::Conflict(
                "A user with this email already exists.".to_string(),
            ));
        }

        let password_hash = hash_password(&params.password)?;
        let phone_number = params
            .phone_number
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty());

        let user: User = sqlx::query_as(
            r#"
            INSERT INTO users (id, name, email, password_hash, phone_number, notification_preference)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(params.name.trim())
        .bind(&email)
        .bind(&password_hash)
        .bind(phone_number)
        .bind(params.notification_preference)
        .fetch_one(pool)
        .await
        .map_err(|e| match e {
            // Lost a race with a concurrent registration for the same email
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("A user with this email already exists.".to_string())
            }
            other => AppError::Database(other),
        })?;

        tracing::info!(user_id = %user.id, "User registered");

        Ok(user)
    }

    /// Check an email/password pair and return the matching user.
    pub async fn authenticate(pool: &PgPool, email: &str, password: &str) -> Result<User, AppError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "Email and Password are required.".to_string(),
            ));
        }

        let invalid = || AppError::Auth("Invalid credentials.".to_string());

        let user = Self::find_by_email(pool, email).await?.ok_or_else(invalid)?;
        if !verify_password(password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "Password mismatch");
            return Err(invalid());
        }

        tracing::info!(user_id = %user.id, "User authenticated");
        Ok(user)
    }

    /// Get a single user by ID.
    pub async fn get(pool: &PgPool, user_id: Uuid) -> Result<User, AppError> {
        let user: User = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        Ok(user)
    }

    /// Look up a user by email (case-insensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AppError> {
        let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(normalize_email(email))
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Delete a user by email and return the deleted row.
    pub async fn delete_by_email(pool: &PgPool, email: &str) -> Result<User, AppError> {
        let user: User = sqlx::query_as("DELETE FROM users WHERE email = $1 RETURNING *")
            .bind(normalize_email(email))
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

        tracing::info!(user_id = %user.id, "User deleted");

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> RegisterParams {
        RegisterParams {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: "analytical".to_string(),
            phone_number: None,
            notification_preference: Some(Channel::Email),
        }
    }

    #[test]
    fn test_valid_params() {
        assert!(params().validate().is_ok());
    }

    #[test]
    fn test_missing_email_rejected() {
        let mut p = params();
        p.email = "   ".to_string();
        assert!(matches!(p.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_short_password_rejected() {
        let mut p = params();
        p.password = "short".to_string();
        assert!(matches!(p.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_sms_preference_requires_phone() {
        let mut p = params();
        p.notification_preference = Some(Channel::Sms);
        assert!(p.validate().is_err());

        p.phone_number = Some("  ".to_string());
        assert!(p.validate().is_err());

        p.phone_number = Some("+15550001111".to_string());
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }

    #[test]
    fn test_register_params_accept_mixed_case_preference() {
        let p: RegisterParams = serde_json::from_value(serde_json::json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "analytical",
            "notification_preference": "sMs",
            "phone_number": "+15550001111"
        }))
        .unwrap();
        assert_eq!(p.notification_preference, Some(Channel::Sms));
    }
}

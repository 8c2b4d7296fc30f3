//! Message routes — direct email/SMS sends and user notifications.
//!
//! All routes require authentication and wait for the delivery outcome.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use courier_accounts::users::UserService;
use courier_common::error::AppError;
use courier_common::types::Channel;
use courier_notifier::{DispatchOutcome, NotificationRequest, Recipient};

use crate::middleware::auth::AuthUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/message/send-email", post(send_email))
        .route("/api/message/send-sms", post(send_sms))
        .route("/api/message/notify-user", post(notify_user))
}

#[derive(Debug, Deserialize)]
pub struct SendEmailRequest {
    pub email: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct SendSmsRequest {
    pub phone_number: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct NotifyUserRequest {
    pub user_id: Uuid,
    pub message: String,
    /// "email" or "sms"; the user's stored preference is used when absent.
    pub notification_type: Option<String>,
    pub subject: Option<String>,
}

/// Body returned once a message has been delivered.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct DeliveryResponse {
    pub message: String,
    pub channel: Channel,
    pub attempts: u32,
}

/// Map a dispatch outcome onto an HTTP result.
pub fn delivery_result(outcome: DispatchOutcome) -> Result<Json<DeliveryResponse>, AppError> {
    match outcome {
        DispatchOutcome::Delivered { channel, attempts } => Ok(Json(DeliveryResponse {
            message: format!("{} sent successfully.", label(channel)),
            channel,
            attempts,
        })),
        DispatchOutcome::FailedPermanent {
            channel, reason, ..
        } => Err(AppError::DeliveryRejected(format!(
            "{} was rejected: {}",
            label(channel),
            reason
        ))),
        DispatchOutcome::FailedAfterRetries {
            channel,
            attempts,
            reason,
        } => Err(AppError::DeliveryFailed(format!(
            "Failed to send {} after {} attempts: {}",
            label(channel).to_lowercase(),
            attempts,
            reason
        ))),
        DispatchOutcome::Cancelled { channel, .. } => Err(AppError::Unavailable(format!(
            "{} delivery was interrupted by shutdown",
            label(channel)
        ))),
    }
}

fn label(channel: Channel) -> &'static str {
    match channel {
        Channel::Email => "Email",
        Channel::Sms => "SMS",
    }
}

/// POST /api/message/send-email — Email an explicit address.
async fn send_email(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<SendEmailRequest>,
) -> Result<Json<DeliveryResponse>, AppError> {
    tracing::info!(user_id = %auth.user_id, to = %req.email, "Send email requested");

    let cancel = state.shutdown.child_token();
    let outcome = state
        .dispatcher
        .send_email(&req.email, &req.subject, &req.body, &cancel)
        .await?;

    delivery_result(outcome)
}

/// POST /api/message/send-sms — Text an explicit phone number.
async fn send_sms(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<SendSmsRequest>,
) -> Result<Json<DeliveryResponse>, AppError> {
    tracing::info!(user_id = %auth.user_id, to = %req.phone_number, "Send SMS requested");

    let cancel = state.shutdown.child_token();
    let outcome = state
        .dispatcher
        .send_sms(&req.phone_number, &req.message, &cancel)
        .await?;

    delivery_result(outcome)
}

/// POST /api/message/notify-user — Notify a stored user on the resolved channel.
async fn notify_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<NotifyUserRequest>,
) -> Result<Json<DeliveryResponse>, AppError> {
    tracing::info!(
        user_id = %auth.user_id,
        target_user_id = %req.user_id,
        notification_type = ?req.notification_type,
        "Notify user requested"
    );

    let user = UserService::get(&state.pool, req.user_id).await?;
    let recipient = Recipient::from(&user);

    let mut request = NotificationRequest::new(&recipient, &req.message);
    if let Some(channel) = req.notification_type.as_deref() {
        request = request.with_channel(channel);
    }
    if let Some(subject) = req.subject.as_deref() {
        request = request.with_subject(subject);
    }

    let cancel = state.shutdown.child_token();
    let outcome = state.dispatcher.dispatch_with_cancel(&request, &cancel).await?;

    delivery_result(outcome)
}

#[cfg(test)]
mod tests {
    use axum::response::IntoResponse;

    use super::*;

    #[test]
    fn test_delivered_is_ok() {
        let Json(body) = delivery_result(DispatchOutcome::Delivered {
            channel: Channel::Sms,
            attempts: 2,
        })
        .unwrap();
        assert_eq!(
            body,
            DeliveryResponse {
                message: "SMS sent successfully.".to_string(),
                channel: Channel::Sms,
                attempts: 2,
            }
        );
    }

    #[test]
    fn test_failures_map_to_distinct_statuses() {
        let permanent = delivery_result(DispatchOutcome::FailedPermanent {
            channel: Channel::Email,
            attempts: 1,
            reason: "550".to_string(),
        })
        .unwrap_err();
        assert_eq!(
            permanent.into_response().status(),
            axum::http::StatusCode::UNPROCESSABLE_ENTITY
        );

        let retried = delivery_result(DispatchOutcome::FailedAfterRetries {
            channel: Channel::Email,
            attempts: 3,
            reason: "timeout".to_string(),
        })
        .unwrap_err();
        assert!(matches!(retried, AppError::DeliveryFailed(ref msg) if msg.contains("3 attempts")));
        assert_eq!(
            retried.into_response().status(),
            axum::http::StatusCode::BAD_GATEWAY
        );

        let cancelled = delivery_result(DispatchOutcome::Cancelled {
            channel: Channel::Sms,
            attempts: 1,
            reason: "timeout".to_string(),
        })
        .unwrap_err();
        assert_eq!(
            cancelled.into_response().status(),
            axum::http::StatusCode::SERVICE_UNAVAILABLE
        );
    }
}

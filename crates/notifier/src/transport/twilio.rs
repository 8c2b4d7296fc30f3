//! SMS via the Twilio Messages REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use courier_common::error::AppError;

use super::SmsTransport;
use crate::error::TransportError;

/// Twilio account settings.
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender number in E.164 form.
    pub from_number: String,
    /// API root, overridable for tests.
    pub api_base: String,
    pub timeout: Duration,
}

impl TwilioConfig {
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        from_number: impl Into<String>,
    ) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            from_number: from_number.into(),
            api_base: "https://api.twilio.com".to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

/// Message resource returned on success.
#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
}

/// Error body Twilio returns on 4xx/5xx.
#[derive(Debug, Deserialize)]
struct ApiError {
    code: Option<u32>,
    message: String,
}

/// Sends SMS through Twilio. The `reqwest::Client` pools connections internally.
pub struct TwilioSmsTransport {
    client: reqwest::Client,
    config: TwilioConfig,
    messages_url: String,
}

impl TwilioSmsTransport {
    pub fn new(config: TwilioConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let messages_url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            config.api_base.trim_end_matches('/'),
            config.account_sid
        );

        tracing::info!(from = %config.from_number, "Twilio SMS transport initialized");

        Ok(Self {
            client,
            config,
            messages_url,
        })
    }
}

/// Throttling and server errors are transient; any other rejection is permanent.
fn classify_status(status: StatusCode, detail: String) -> TransportError {
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        TransportError::transient(detail)
    } else {
        TransportError::permanent(detail)
    }
}

#[async_trait]
impl SmsTransport for TwilioSmsTransport {
    fn name(&self) -> &'static str {
        "twilio"
    }

    async fn attempt(&self, to: &str, body: &str) -> Result<(), TransportError> {
        let response = self
            .client
            .post(&self.messages_url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[
                ("To", to),
                ("From", self.config.from_number.as_str()),
                ("Body", body),
            ])
            .send()
            .await
            .map_err(|e| TransportError::transient(format!("Twilio request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            match response.json::<MessageResource>().await {
                Ok(message) => tracing::debug!(to, sid = %message.sid, "Twilio accepted SMS"),
                Err(e) => tracing::debug!(to, error = %e, "Twilio accepted SMS, unreadable body"),
            }
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        let detail = match serde_json::from_str::<ApiError>(&text) {
            Ok(ApiError {
                code: Some(code),
                message,
            }) => format!("Twilio returned {} (code {}): {}", status, code, message),
            Ok(ApiError { message, .. }) => format!("Twilio returned {}: {}", status, message),
            Err(_) => format!("Twilio returned {}", status),
        };

        Err(classify_status(status, detail))
    }
}

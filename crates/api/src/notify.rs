//! Dispatcher wiring and fire-and-forget account emails.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use courier_common::config::AppConfig;
use courier_common::error::AppError;
use courier_notifier::transport::{
    LogTransport, SmtpConfig, SmtpMailTransport, TwilioConfig, TwilioSmsTransport,
};
use courier_notifier::{MailTransport, NotificationDispatcher, RetryPolicy, SmsTransport};

use crate::state::AppState;

/// Build the dispatcher from configuration.
///
/// Providers without complete settings fall back to [`LogTransport`].
pub fn build_dispatcher(config: &AppConfig) -> Result<NotificationDispatcher, AppError> {
    let mail: Arc<dyn MailTransport> = match (&config.smtp_host, &config.email_from) {
        (Some(host), Some(from)) => Arc::new(SmtpMailTransport::new(&SmtpConfig {
            host: host.clone(),
            port: config.smtp_port,
            username: config.smtp_username.clone(),
            password: config.smtp_password.clone(),
            tls: config.smtp_tls,
            from: from.clone(),
            pool_size: config.smtp_pool_size,
            ..SmtpConfig::default()
        })?),
        _ => {
            tracing::warn!("SMTP_HOST or EMAIL_FROM not set, emails will only be logged");
            Arc::new(LogTransport)
        }
    };

    let sms: Arc<dyn SmsTransport> = match (
        &config.twilio_account_sid,
        &config.twilio_auth_token,
        &config.twilio_from_number,
    ) {
        (Some(sid), Some(token), Some(from)) => {
            let mut twilio = TwilioConfig::new(sid.clone(), token.clone(), from.clone());
            twilio.api_base = config.twilio_api_base.clone();
            Arc::new(TwilioSmsTransport::new(twilio)?)
        }
        _ => {
            tracing::warn!("Twilio credentials not set, SMS will only be logged");
            Arc::new(LogTransport)
        }
    };

    let policy = RetryPolicy::new(
        config.notify_max_attempts,
        Duration::from_millis(config.notify_retry_delay_ms),
    );

    tracing::info!(
        mail = mail.name(),
        sms = sms.name(),
        max_attempts = policy.max_attempts(),
        retry_delay_ms = config.notify_retry_delay_ms,
        "Notification dispatcher ready"
    );

    Ok(NotificationDispatcher::new(mail, sms)
        .with_policy(policy)
        .with_default_subject(config.notify_default_subject.clone()))
}

/// Send an email in the background without blocking the request.
///
/// The outcome is only logged. The send is abandoned between retries once
/// the server starts shutting down.
pub fn spawn_email(state: &AppState, to: String, subject: String, body: String) -> JoinHandle<()> {
    let dispatcher = state.dispatcher.clone();
    let cancel = state.shutdown.child_token();

    tokio::spawn(async move {
        match dispatcher.send_email(&to, &subject, &body, &cancel).await {
            Ok(outcome) if outcome.is_delivered() => {
                tracing::debug!(subject = %subject, "Background email delivered");
            }
            Ok(outcome) => {
                tracing::warn!(subject = %subject, ?outcome, "Background email not delivered");
            }
            Err(e) => {
                tracing::error!(subject = %subject, error = %e, "Background email rejected");
            }
        }
    })
}

/// Minimal HTML escaping for user-supplied text placed in email bodies.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

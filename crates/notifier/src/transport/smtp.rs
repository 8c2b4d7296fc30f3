//! Email over SMTP using lettre.
//!
//! The underlying `AsyncSmtpTransport` keeps a bounded connection pool, so a
//! single `SmtpMailTransport` is built at start-up and shared.

use std::time::Duration;

use async_trait::async_trait;
use lettre::address::AddressError;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::PoolConfig;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use courier_common::error::AppError;

use super::MailTransport;
use crate::error::TransportError;

/// SMTP relay settings.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Upgrade with STARTTLS. Disable only for local relays such as Mailpit.
    pub tls: bool,
    pub from: String,
    pub pool_size: u32,
    pub timeout: Duration,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 587,
            username: None,
            password: None,
            tls: true,
            from: String::new(),
            pool_size: 4,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Sends HTML email through an SMTP relay.
pub struct SmtpMailTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailTransport {
    pub fn new(config: &SmtpConfig) -> Result<Self, AppError> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid sender address '{}': {}", config.from, e)))?;

        let builder = if config.tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| AppError::Config(format!("Invalid SMTP relay '{}': {}", config.host, e)))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };

        let mut builder = builder
            .port(config.port)
            .timeout(Some(config.timeout))
            .pool_config(PoolConfig::new().max_size(config.pool_size));

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        tracing::info!(
            host = %config.host,
            port = config.port,
            tls = config.tls,
            pool_size = config.pool_size,
            "SMTP transport initialized"
        );

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn build_message(&self, to: &str, subject: &str, body: &str) -> Result<Message, TransportError> {
        let to: Mailbox = to.parse().map_err(|e: AddressError| {
            TransportError::permanent(format!("invalid recipient address '{}': {}", to, e))
        })?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body.to_string())
            .map_err(|e| TransportError::permanent(format!("could not build message: {}", e)))
    }
}

/// 5xx replies are permanent; connection, TLS, timeout and 4xx errors are transient.
fn classify(err: lettre::transport::smtp::Error) -> TransportError {
    if err.is_permanent() {
        TransportError::permanent(err.to_string())
    } else {
        TransportError::transient(err.to_string())
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    fn name(&self) -> &'static str {
        "smtp"
    }

    async fn attempt(&self, to: &str, subject: &str, body: &str) -> Result<(), TransportError> {
        let message = self.build_message(to, subject, body)?;

        let response = self.transport.send(message).await.map_err(classify)?;
        tracing::debug!(to, code = %response.code(), "SMTP relay accepted message");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_config() -> SmtpConfig {
        SmtpConfig {
            host: "127.0.0.1".to_string(),
            port: 2525,
            tls: false,
            from: "Courier <noreply@example.com>".to_string(),
            ..SmtpConfig::default()
        }
    }

    #[tokio::test]
    async fn test_invalid_sender_is_config_error() {
        let config = SmtpConfig {
            from: "not an address".to_string(),
            ..local_config()
        };
        assert!(matches!(SmtpMailTransport::new(&config), Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn test_invalid_recipient_is_permanent() {
        let transport = SmtpMailTransport::new(&local_config()).unwrap();

        // Fails during message construction, before any connection is opened
        let err = transport
            .attempt("definitely not an email", "Hello", "<p>Hi</p>")
            .await
            .unwrap_err();
        assert!(!err.is_transient());
        assert!(err.message().contains("invalid recipient address"));
    }

    #[tokio::test]
    async fn test_builds_html_message() {
        let transport = SmtpMailTransport::new(&local_config()).unwrap();
        let message = transport
            .build_message("ada@example.com", "Welcome", "<b>hi</b>")
            .unwrap();

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Welcome"));
        assert!(raw.contains("To: ada@example.com"));
        assert!(raw.contains("Content-Type: text/html"));
    }

    #[tokio::test]
    async fn test_unreachable_relay_is_transient() {
        // Nothing listens on port 1 locally
        let config = SmtpConfig {
            port: 1,
            timeout: Duration::from_secs(2),
            ..local_config()
        };
        let transport = SmtpMailTransport::new(&config).unwrap();

        let err = transport
            .attempt("ada@example.com", "Hello", "<p>Hi</p>")
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }
}

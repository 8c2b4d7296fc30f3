use async_trait::async_trait;

use super::{MailTransport, SmsTransport};
use crate::error::TransportError;

/// Transport that only logs. Wired in when a provider is not configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTransport;

#[async_trait]
impl MailTransport for LogTransport {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn attempt(&self, to: &str, subject: &str, body: &str) -> Result<(), TransportError> {
        tracing::info!(
            to,
            subject,
            body_len = body.len(),
            "Email transport not configured, logging instead of sending"
        );
        Ok(())
    }
}

#[async_trait]
impl SmsTransport for LogTransport {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn attempt(&self, to: &str, body: &str) -> Result<(), TransportError> {
        tracing::info!(
            to,
            body_len = body.len(),
            "SMS transport not configured, logging instead of sending"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_transport_always_succeeds() {
        let t = LogTransport;
        assert!(MailTransport::attempt(&t, "a@example.com", "hi", "body").await.is_ok());
        assert!(SmsTransport::attempt(&t, "+15550001111", "body").await.is_ok());
    }
}

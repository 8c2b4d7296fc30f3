//! Delivery transports.
//!
//! Each transport makes exactly one delivery attempt per call and classifies
//! its own failures; retrying is the dispatcher's job.
//! - SMTP email (lettre, pooled connections)
//! - Twilio SMS (REST over reqwest)
//! - Logging no-op for unconfigured providers

mod log;
mod smtp;
mod twilio;

pub use log::LogTransport;
pub use smtp::{SmtpConfig, SmtpMailTransport};
pub use twilio::{TwilioConfig, TwilioSmsTransport};

use async_trait::async_trait;

use crate::error::TransportError;

/// Sends one email.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn attempt(&self, to: &str, subject: &str, body: &str) -> Result<(), TransportError>;
}

/// Sends one SMS.
#[async_trait]
pub trait SmsTransport: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn attempt(&self, to: &str, body: &str) -> Result<(), TransportError>;
}

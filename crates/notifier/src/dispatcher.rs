//! Notification dispatcher — channel selection plus retried delivery.
//!
//! The dispatcher holds no per-call state. One instance is shared behind an
//! `Arc` and may run any number of dispatches concurrently. Delivery is
//! at-least-once: a transient failure that actually reached the provider can
//! lead to a duplicate message on retry.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use courier_common::types::Channel;

use crate::error::DispatchError;
use crate::outcome::DispatchOutcome;
use crate::recipient::{NotificationRequest, Recipient};
use crate::retry::RetryPolicy;
use crate::transport::{MailTransport, SmsTransport};

/// Subject used for emailed notifications when the request names none.
pub const DEFAULT_SUBJECT: &str = "Notification";

pub struct NotificationDispatcher {
    mail: Arc<dyn MailTransport>,
    sms: Arc<dyn SmsTransport>,
    policy: RetryPolicy,
    default_subject: String,
}

impl NotificationDispatcher {
    pub fn new(mail: Arc<dyn MailTransport>, sms: Arc<dyn SmsTransport>) -> Self {
        Self {
            mail,
            sms,
            policy: RetryPolicy::default(),
            default_subject: DEFAULT_SUBJECT.to_string(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_default_subject(mut self, subject: impl Into<String>) -> Self {
        self.default_subject = subject.into();
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Names of the (email, SMS) transports in use.
    pub fn transport_names(&self) -> (&'static str, &'static str) {
        (self.mail.name(), self.sms.name())
    }

    /// Pick the channel for `recipient`.
    ///
    /// An explicit `requested` channel wins over the stored preference. Blank
    /// strings count as no request. The recipient must have a non-empty
    /// contact field for the chosen channel.
    pub fn resolve_channel(
        recipient: &Recipient,
        requested: Option<&str>,
    ) -> Result<Channel, DispatchError> {
        let requested = requested.map(str::trim).filter(|r| !r.is_empty());

        let channel = match requested {
            Some(name) => name.parse::<Channel>()?,
            None => recipient.preference.channel().ok_or_else(|| {
                DispatchError::InvalidChannel(format!(
                    "recipient {} has no stored channel preference and none was requested",
                    recipient.id
                ))
            })?,
        };

        Self::require_contact(recipient, channel)?;
        Ok(channel)
    }

    fn require_contact(recipient: &Recipient, channel: Channel) -> Result<&str, DispatchError> {
        recipient.contact(channel).ok_or_else(|| {
            let field = match channel {
                Channel::Email => "email address",
                Channel::Sms => "phone number",
            };
            DispatchError::InvalidChannel(format!(
                "recipient {} has no {} for {} delivery",
                recipient.id, field, channel
            ))
        })
    }

    /// Dispatch a notification without a cancellation signal.
    pub async fn dispatch(
        &self,
        request: &NotificationRequest<'_>,
    ) -> Result<DispatchOutcome, DispatchError> {
        self.dispatch_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// Validate, resolve the channel and deliver with retries.
    ///
    /// Input problems come back as `Err` before any transport call. Once a
    /// transport has been tried, every result is an `Ok(DispatchOutcome)`.
    pub async fn dispatch_with_cancel(
        &self,
        request: &NotificationRequest<'_>,
        cancel: &CancellationToken,
    ) -> Result<DispatchOutcome, DispatchError> {
        require_non_empty(request.message, "message")?;
        let channel = Self::resolve_channel(request.recipient, request.channel)?;

        tracing::info!(
            recipient_id = %request.recipient.id,
            %channel,
            overridden = request.channel.is_some(),
            "Dispatching notification"
        );

        self.deliver(request.recipient, request.message, channel, request.subject, cancel)
            .await
    }

    /// Deliver on an already-resolved channel.
    pub async fn send(
        &self,
        recipient: &Recipient,
        message: &str,
        channel: Channel,
        cancel: &CancellationToken,
    ) -> Result<DispatchOutcome, DispatchError> {
        require_non_empty(message, "message")?;
        self.deliver(recipient, message, channel, None, cancel).await
    }

    async fn deliver(
        &self,
        recipient: &Recipient,
        message: &str,
        channel: Channel,
        subject: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<DispatchOutcome, DispatchError> {
        let to = Self::require_contact(recipient, channel)?;
        let outcome = match channel {
            Channel::Email => {
                let subject = subject.unwrap_or(&self.default_subject);
                self.email_with_retry(to, subject, message, cancel).await
            }
            Channel::Sms => self.sms_with_retry(to, message, cancel).await,
        };

        if !outcome.is_delivered() {
            tracing::debug!(recipient_id = %recipient.id, "Notification not delivered");
        }

        Ok(outcome)
    }

    /// Send an email to an explicit address, with retries.
    pub async fn send_email(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        cancel: &CancellationToken,
    ) -> Result<DispatchOutcome, DispatchError> {
        require_non_empty(to, "email address")?;
        require_non_empty(subject, "subject")?;
        require_non_empty(body, "body")?;

        Ok(self.email_with_retry(to.trim(), subject, body, cancel).await)
    }

    /// Send an SMS to an explicit number, with retries.
    pub async fn send_sms(
        &self,
        to: &str,
        body: &str,
        cancel: &CancellationToken,
    ) -> Result<DispatchOutcome, DispatchError> {
        require_non_empty(to, "phone number")?;
        require_non_empty(body, "message")?;

        Ok(self.sms_with_retry(to.trim(), body, cancel).await)
    }

    async fn email_with_retry(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        cancel: &CancellationToken,
    ) -> DispatchOutcome {
        let transport = self.mail.as_ref();
        self.policy
            .run(Channel::Email, cancel, |attempt| {
                tracing::debug!(transport = transport.name(), to, attempt, "Sending email");
                transport.attempt(to, subject, body)
            })
            .await
    }

    async fn sms_with_retry(&self, to: &str, body: &str, cancel: &CancellationToken) -> DispatchOutcome {
        let transport = self.sms.as_ref();
        self.policy
            .run(Channel::Sms, cancel, |attempt| {
                tracing::debug!(transport = transport.name(), to, attempt, "Sending SMS");
                transport.attempt(to, body)
            })
            .await
    }
}

fn require_non_empty(value: &str, what: &str) -> Result<(), DispatchError> {
    if value.trim().is_empty() {
        return Err(DispatchError::InvalidArgument(format!(
            "{} cannot be empty",
            what
        )));
    }
    Ok(())
}

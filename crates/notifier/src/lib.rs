//! Outbound notification delivery.
//!
//! [`NotificationDispatcher`] picks a channel for a recipient, hands the
//! message to the matching transport and retries transient failures under a
//! fixed [`RetryPolicy`]. Transports are black boxes behind the
//! [`MailTransport`] and [`SmsTransport`] traits; each one decides whether a
//! failure is transient or permanent.

pub mod dispatcher;
pub mod error;
pub mod outcome;
pub mod recipient;
pub mod retry;
pub mod transport;

pub use dispatcher::NotificationDispatcher;
pub use error::{DispatchError, FailureKind, TransportError};
pub use outcome::DispatchOutcome;
pub use recipient::{ChannelPreference, NotificationRequest, Recipient};
pub use retry::RetryPolicy;
pub use transport::{MailTransport, SmsTransport};

use serde::Serialize;

use courier_common::types::Channel;

/// Final result of a dispatch once input validation has passed.
///
/// Failures are values here, not errors: the caller decides how to
/// report them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DispatchOutcome {
    Delivered {
        channel: Channel,
        attempts: u32,
    },
    /// The transport reported a failure that retrying cannot fix.
    FailedPermanent {
        channel: Channel,
        attempts: u32,
        reason: String,
    },
    /// Every allowed attempt failed transiently. `reason` is the last error.
    FailedAfterRetries {
        channel: Channel,
        attempts: u32,
        reason: String,
    },
    /// The caller's cancellation token fired before delivery succeeded.
    Cancelled {
        channel: Channel,
        attempts: u32,
        reason: String,
    },
}

impl DispatchOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DispatchOutcome::Delivered { .. })
    }

    pub fn channel(&self) -> Channel {
        match self {
            DispatchOutcome::Delivered { channel, .. }
            | DispatchOutcome::FailedPermanent { channel, .. }
            | DispatchOutcome::FailedAfterRetries { channel, .. }
            | DispatchOutcome::Cancelled { channel, .. } => *channel,
        }
    }

    /// Number of transport calls made.
    pub fn attempts(&self) -> u32 {
        match self {
            DispatchOutcome::Delivered { attempts, .. }
            | DispatchOutcome::FailedPermanent { attempts, .. }
            | DispatchOutcome::FailedAfterRetries { attempts, .. }
            | DispatchOutcome::Cancelled { attempts, .. } => *attempts,
        }
    }
}

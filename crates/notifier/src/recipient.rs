//! Who a notification goes to and how they prefer to receive it.

use uuid::Uuid;

use courier_common::types::{Channel, User};

/// A recipient's stored channel preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelPreference {
    Email,
    Sms,
    /// No stored preference; every request must name a channel.
    PerRequest,
}

impl ChannelPreference {
    pub fn channel(&self) -> Option<Channel> {
        match self {
            ChannelPreference::Email => Some(Channel::Email),
            ChannelPreference::Sms => Some(Channel::Sms),
            ChannelPreference::PerRequest => None,
        }
    }
}

impl From<Option<Channel>> for ChannelPreference {
    fn from(channel: Option<Channel>) -> Self {
        match channel {
            Some(Channel::Email) => ChannelPreference::Email,
            Some(Channel::Sms) => ChannelPreference::Sms,
            None => ChannelPreference::PerRequest,
        }
    }
}

/// Delivery view of a user. Owned by the caller, never persisted here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub id: Uuid,
    pub display_name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub preference: ChannelPreference,
}

impl Recipient {
    /// The contact address for `channel`, if present and not blank.
    pub fn contact(&self, channel: Channel) -> Option<&str> {
        let field = match channel {
            Channel::Email => self.email.as_deref(),
            Channel::Sms => self.phone_number.as_deref(),
        };
        field.map(str::trim).filter(|c| !c.is_empty())
    }
}

impl From<&User> for Recipient {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            display_name: user.name.clone(),
            email: Some(user.email.clone()),
            phone_number: user.phone_number.clone(),
            preference: user.notification_preference.into(),
        }
    }
}

/// One notification to dispatch.
#[derive(Debug, Clone, Copy)]
pub struct NotificationRequest<'a> {
    pub recipient: &'a Recipient,
    pub message: &'a str,
    /// Channel name overriding the stored preference. Blank counts as absent.
    pub channel: Option<&'a str>,
    /// Email subject; the dispatcher's default is used when absent.
    pub subject: Option<&'a str>,
}

impl<'a> NotificationRequest<'a> {
    pub fn new(recipient: &'a Recipient, message: &'a str) -> Self {
        Self {
            recipient,
            message,
            channel: None,
            subject: None,
        }
    }

    pub fn with_channel(mut self, channel: &'a str) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn with_subject(mut self, subject: &'a str) -> Self {
        self.subject = Some(subject);
        self
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_from_user() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "hash".to_string(),
            phone_number: Some("+15550001111".to_string()),
            notification_preference: Some(Channel::Sms),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let recipient = Recipient::from(&user);
        assert_eq!(recipient.id, user.id);
        assert_eq!(recipient.display_name, "Ada");
        assert_eq!(recipient.preference, ChannelPreference::Sms);
        assert_eq!(recipient.contact(Channel::Email), Some("ada@example.com"));
        assert_eq!(recipient.contact(Channel::Sms), Some("+15550001111"));
    }

    #[test]
    fn test_blank_contact_is_missing() {
        let recipient = Recipient {
            id: Uuid::new_v4(),
            display_name: "Bob".to_string(),
            email: Some("   ".to_string()),
            phone_number: None,
            preference: ChannelPreference::PerRequest,
        };
        assert_eq!(recipient.contact(Channel::Email), None);
        assert_eq!(recipient.contact(Channel::Sms), None);
    }

    #[test]
    fn test_preference_from_option() {
        assert_eq!(ChannelPreference::from(None), ChannelPreference::PerRequest);
        assert_eq!(
            ChannelPreference::from(Some(Channel::Email)).channel(),
            Some(Channel::Email)
        );
    }
}

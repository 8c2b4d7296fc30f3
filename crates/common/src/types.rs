use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Notification delivery channel.
///
/// Stored lowercase; parsing accepts any casing (`"Email"`, `"SMS"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Channel {
    Email,
    Sms,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Email, Channel::Sms];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Sms => "sms",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known channel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported channel '{0}', expected one of: email, sms")]
pub struct UnknownChannel(pub String);

impl std::str::FromStr for Channel {
    type Err = UnknownChannel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Channel::ALL
            .into_iter()
            .find(|c| trimmed.eq_ignore_ascii_case(c.as_str()))
            .ok_or_else(|| UnknownChannel(s.to_string()))
    }
}

impl TryFrom<String> for Channel {
    type Error = UnknownChannel;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone_number: Option<String>,
    /// Stored channel preference. `None` means the channel must be given per request.
    pub notification_preference: Option<Channel>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_parse_is_case_insensitive() {
        assert_eq!("email".parse::<Channel>().unwrap(), Channel::Email);
        assert_eq!("Email".parse::<Channel>().unwrap(), Channel::Email);
        assert_eq!("SMS".parse::<Channel>().unwrap(), Channel::Sms);
        assert_eq!(" sms ".parse::<Channel>().unwrap(), Channel::Sms);
    }

    #[test]
    fn test_channel_parse_rejects_unknown() {
        let err = "fax".parse::<Channel>().unwrap_err();
        assert_eq!(err, UnknownChannel("fax".to_string()));
        assert!("".parse::<Channel>().is_err());
    }

    #[test]
    fn test_channel_serde() {
        assert_eq!(serde_json::to_string(&Channel::Sms).unwrap(), "\"sms\"");
        let parsed: Channel = serde_json::from_str("\"SMS\"").unwrap();
        assert_eq!(parsed, Channel::Sms);
        let parsed: Channel = serde_json::from_str("\"eMail\"").unwrap();
        assert_eq!(parsed, Channel::Email);
        let err = serde_json::from_str::<Channel>("\"fax\"").unwrap_err();
        assert!(err.to_string().contains("unsupported channel 'fax'"));
    }

    #[test]
    fn test_user_serialization_hides_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            phone_number: None,
            notification_preference: Some(Channel::Email),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["notification_preference"], "email");
    }
}

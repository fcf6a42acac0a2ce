//! Mail server settings.
//!
//! Nothing is sent yet; the settings are read at startup so a misconfiguration
//! shows up in the logs and in `/health`.

use std::fmt;

use enlist_config::{keys, AppConfig};

/// SMTP connection settings read from the `smtp.*` keys.
#[derive(Clone, Default)]
pub struct MailSettings {
    /// Server host.
    pub host: Option<String>,
    /// Server port.
    pub port: Option<u16>,
    /// Authentication identity.
    pub identity: Option<String>,
    /// User name.
    pub user: Option<String>,
    /// Password.
    pub secret: Option<String>,
    /// Sender address.
    pub sender: Option<String>,
}

impl MailSettings {
    /// Read the settings from configuration. Missing keys stay unset.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        let port = config.get_i64(keys::SMTP_PORT).and_then(|p| u16::try_from(p).ok());

        Self {
            host: config.get_string(keys::SMTP_HOST),
            port,
            identity: config.get_string(keys::SMTP_IDENTITY),
            user: config.get_string(keys::SMTP_USER),
            secret: config.get_string(keys::SMTP_SECRET),
            sender: config.get_string(keys::SMTP_SENDER),
        }
    }

    /// Whether a mail server is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.host.as_deref().is_some_and(|h| !h.is_empty())
    }

    /// Initialize the mail server connection.
    pub fn init(&self) {
        if self.is_configured() {
            tracing::info!(
                host = self.host.as_deref().unwrap_or_default(),
                port = ?self.port,
                sender = self.sender.as_deref().unwrap_or_default(),
                "Initialized mail server connection"
            );
        } else {
            tracing::warn!("Mail server not configured - notifications will not be sent");
        }
    }
}

impl fmt::Debug for MailSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("identity", &self.identity)
            .field("user", &self.user)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("sender", &self.sender)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_smtp_keys() {
        let config = AppConfig::from_value(json!({
            "smtp": {
                "host": "smtp.example.com",
                "port": 587,
                "user": "mailer",
                "secret": "s3cret",
                "sender": "news@example.com"
            }
        }))
        .unwrap();

        let mail = MailSettings::from_config(&config);
        assert!(mail.is_configured());
        assert_eq!(mail.port, Some(587));
        assert_eq!(mail.identity, None);
        assert_eq!(mail.sender.as_deref(), Some("news@example.com"));
    }

    #[test]
    fn debug_redacts_secret() {
        let mail = MailSettings {
            host: Some("smtp.example.com".into()),
            secret: Some("s3cret".into()),
            ..MailSettings::default()
        };
        let debug = format!("{mail:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("s3cret"));
    }

    #[test]
    fn unconfigured_without_host() {
        assert!(!MailSettings::default().is_configured());
    }
}

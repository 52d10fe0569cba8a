use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Amazon SES SMTP interface settings.
#[derive(Debug, Deserialize, Clone)]
pub struct MailerConfig {
    /// SES region; the relay host is `email-smtp.{region}.amazonaws.com`.
    /// Default: "us-east-1".
    #[serde(default = "default_region")]
    pub region: String,
    /// SMTP credentials generated for the SES identity.
    #[serde(default)]
    pub smtp_username: String,
    #[serde(default)]
    pub smtp_password: String,
    /// 465 uses implicit TLS, 587 and 2587 use STARTTLS. Default: 465.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_region() -> String {
    "us-east-1".into()
}
fn default_port() -> u16 {
    465
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            port: default_port(),
        }
    }
}

impl MailerConfig {
    pub fn smtp_host(&self) -> String {
        format!("email-smtp.{}.amazonaws.com", self.region)
    }

    pub fn uses_starttls(&self) -> bool {
        matches!(self.port, 25 | 587 | 2587)
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct MailerAppConfig {
    #[serde(default)]
    pub mailer: MailerConfig,
}

impl MailerAppConfig {
    /// Load from `config/config.toml` (or `$STOREFRONT_CONFIG`) and
    /// `STOREFRONT__MAILER__*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("STOREFRONT_CONFIG").unwrap_or_else(|_| "config/config".to_string());
        Self::load_from(config_path)
    }

    pub fn load_from(config_path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("mailer.region", "us-east-1")?
            .set_default("mailer.port", 465_i64)?
            .add_source(File::from(config_path.as_ref()).required(false))
            .add_source(Environment::with_prefix("STOREFRONT").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

use async_trait::async_trait;
use lettre::address::Envelope;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use tracing::debug;

use crate::config::MailerConfig;
use crate::error::MailError;

/// Delivers an already formatted message.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send_raw(&self, envelope: &Envelope, message: &[u8]) -> Result<(), MailError>;
}

/// Amazon SES through its SMTP interface.
pub struct SesSmtpTransport {
    host: String,
    inner: AsyncSmtpTransport<Tokio1Executor>,
}

impl SesSmtpTransport {
    pub fn new(config: &MailerConfig) -> Result<Self, MailError> {
        let host = config.smtp_host();
        let builder = if config.uses_starttls() {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&host)?
        };
        let inner = builder
            .port(config.port)
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
            .build();

        Ok(Self { host, inner })
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

#[async_trait]
impl MailTransport for SesSmtpTransport {
    async fn send_raw(&self, envelope: &Envelope, message: &[u8]) -> Result<(), MailError> {
        let response = self.inner.send_raw(envelope, message).await?;
        debug!(
            host = %self.host,
            code = %response.code(),
            "SES accepted message"
        );
        Ok(())
    }
}

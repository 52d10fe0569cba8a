use lettre::address::AddressError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid address {address:?}: {source}")]
    Address {
        address: String,
        #[source]
        source: AddressError,
    },

    #[error("Invalid header name: {0:?}")]
    HeaderName(String),

    #[error("Invalid content type: {0:?}")]
    ContentType(String),

    #[error("Failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Download lookup failed: {0}")]
    Repository(String),
}

//! Outbound email: MIME assembly with inline attachments, delivered through
//! a pluggable transport (SES SMTP by default).

pub mod config;
pub mod download;
pub mod error;
pub mod message;
pub mod sender;
pub mod transport;

pub use download::{Download, DownloadRepository, MemoryDownloadRepository};
pub use error::MailError;
pub use message::{EmailRequest, InlineResource};
pub use sender::EmailSender;
pub use transport::{MailTransport, SesSmtpTransport};

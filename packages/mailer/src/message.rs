use std::path::PathBuf;

use lettre::{Address, Message};
use lettre::message::header::{ContentType, HeaderName, HeaderValue};
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};

use crate::error::MailError;

/// A message to send. Addresses are plain `user@host` strings.
#[derive(Debug, Clone, Default)]
pub struct EmailRequest {
    pub subject: String,
    /// HTML body.
    pub body: String,
    pub from_address: String,
    pub from_name: Option<String>,
    pub to_address: String,
    pub to_name: Option<String>,
    pub reply_to: Option<String>,
    pub reply_to_name: Option<String>,
    pub bcc: Vec<String>,
    pub cc: Vec<String>,
    /// Local file attached inline; skipped if it does not exist.
    pub attachment_file_path: Option<PathBuf>,
    pub attachment_file_name: Option<String>,
    pub attached_download_id: Option<i32>,
    /// Extra headers, written in order.
    pub headers: Vec<(String, String)>,
}

impl EmailRequest {
    pub fn new(
        from_address: impl Into<String>,
        to_address: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            from_address: from_address.into(),
            to_address: to_address.into(),
            subject: subject.into(),
            body: body.into(),
            ..Self::default()
        }
    }
}

/// A file embedded in the message as a linked resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineResource {
    pub name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl InlineResource {
    /// Resolves the MIME type from `declared`, then the name's extension.
    pub fn new(name: impl Into<String>, declared: Option<&str>, data: Vec<u8>) -> Self {
        let name = name.into();
        let content_type = declared
            .map(str::trim)
            .filter(|ct| !ct.is_empty() && ContentType::parse(ct).is_ok())
            .map(str::to_string)
            .unwrap_or_else(|| {
                mime_guess::from_path(&name)
                    .first_or_octet_stream()
                    .to_string()
            });
        Self {
            name,
            content_type,
            data,
        }
    }
}

/// Builds a `multipart/related` message: the HTML part first, then each
/// resource inline under a freshly generated Content-ID.
pub fn build_message(
    request: &EmailRequest,
    resources: Vec<InlineResource>,
) -> Result<Message, MailError> {
    let mut builder = Message::builder()
        .from(mailbox(&request.from_address, request.from_name.as_deref())?)
        .to(mailbox(&request.to_address, request.to_name.as_deref())?)
        .subject(request.subject.clone());

    if let Some(reply_to) = request.reply_to.as_deref().filter(|r| !r.trim().is_empty()) {
        builder = builder.reply_to(mailbox(reply_to, request.reply_to_name.as_deref())?);
    }
    for address in non_blank(&request.bcc) {
        builder = builder.bcc(mailbox(address, None)?);
    }
    for address in non_blank(&request.cc) {
        builder = builder.cc(mailbox(address, None)?);
    }
    for (name, value) in &request.headers {
        let header_name = HeaderName::new_from_ascii(name.clone())
            .map_err(|_| MailError::HeaderName(name.clone()))?;
        builder = builder.raw_header(HeaderValue::new(header_name, value.clone()));
    }

    let mut body = MultiPart::related().singlepart(SinglePart::html(request.body.clone()));
    for resource in resources {
        let content_type = ContentType::parse(&resource.content_type)
            .map_err(|_| MailError::ContentType(resource.content_type.clone()))?;
        body = body.singlepart(
            Attachment::new_inline_with_name(content_id(), resource.name)
                .body(resource.data, content_type),
        );
    }

    Ok(builder.multipart(body)?)
}

fn mailbox(address: &str, name: Option<&str>) -> Result<Mailbox, MailError> {
    let address = address.trim();
    let parsed = address.parse::<Address>().map_err(|source| MailError::Address {
        address: address.to_string(),
        source,
    })?;
    let name = name.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string);
    Ok(Mailbox::new(name, parsed))
}

fn non_blank(addresses: &[String]) -> impl Iterator<Item = &str> {
    addresses.iter().map(|a| a.trim()).filter(|a| !a.is_empty())
}

fn content_id() -> String {
    format!("{}@storefront", uuid::Uuid::new_v4().simple())
}

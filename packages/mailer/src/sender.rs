use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::download::DownloadRepository;
use crate::error::MailError;
use crate::message::{EmailRequest, InlineResource, build_message};
use crate::transport::MailTransport;

pub struct EmailSender {
    transport: Arc<dyn MailTransport>,
    downloads: Arc<dyn DownloadRepository>,
}

impl EmailSender {
    pub fn new(transport: Arc<dyn MailTransport>, downloads: Arc<dyn DownloadRepository>) -> Self {
        Self {
            transport,
            downloads,
        }
    }

    /// Assemble and deliver `request`.
    ///
    /// A missing attachment file and downloads hosted at an external URL are
    /// skipped; the message is still sent.
    pub async fn send_email(&self, request: &EmailRequest) -> Result<(), MailError> {
        let mut resources = Vec::new();
        if let Some(path) = &request.attachment_file_path {
            if let Some(resource) =
                file_resource(path, request.attachment_file_name.as_deref()).await?
            {
                resources.push(resource);
            }
        }
        if let Some(download_id) = request.attached_download_id.filter(|id| *id > 0) {
            if let Some(resource) = self.download_resource(download_id).await? {
                resources.push(resource);
            }
        }

        let attachments = resources.len();
        let message = build_message(request, resources)?;
        let raw = message.formatted();

        match self.transport.send_raw(message.envelope(), &raw).await {
            Ok(()) => {
                info!(to = %request.to_address, attachments, "Sent email");
                Ok(())
            }
            Err(e) => {
                error!(to = %request.to_address, error = %e, "Failed to send email");
                Err(e)
            }
        }
    }

    async fn download_resource(&self, download_id: i32) -> Result<Option<InlineResource>, MailError> {
        let Some(download) = self.downloads.get(download_id).await? else {
            warn!(download_id, "Attached download not found");
            return Ok(None);
        };
        if download.use_download_url {
            debug!(download_id, "Skipping download served from an external URL");
            return Ok(None);
        }
        Ok(Some(InlineResource::new(
            download.attachment_name(),
            Some(download.content_type.as_str()),
            download.binary,
        )))
    }
}

async fn file_resource(
    path: &Path,
    display_name: Option<&str>,
) -> Result<Option<InlineResource>, MailError> {
    let data = match tokio::fs::read(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "Attachment file does not exist");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let name = display_name
        .filter(|n| !n.trim().is_empty())
        .map(str::to_string)
        .or_else(|| path.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "attachment".to_string());
    Ok(Some(InlineResource::new(name, None, data)))
}

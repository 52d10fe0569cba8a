use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::{ByteStream, DateTime as SmithyDateTime, DateTimeFormat};
use aws_sdk_s3::types::ObjectCannedAcl;
use chrono::{DateTime, Utc};
use tracing::debug;

use super::error::{FORBIDDEN_CODE, StorageError};
use super::traits::{BlobStore, PutOptions, validate_key};
use crate::config::S3Config;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Blob store backed by an S3 bucket.
///
/// Every upload is `public-read` and carries an `Expires` header: the
/// caller's `expires_in`, or `expires_days` from the configuration.
pub struct S3BlobStore {
    client: Client,
    bucket: String,
    base_url: String,
    default_expiry: Duration,
}

impl S3BlobStore {
    /// Build a client from static credentials in the configuration.
    pub fn new(config: &S3Config) -> Self {
        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            "storefront-media",
        );

        let mut builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(config.force_path_style);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint.clone());
        }

        Self::from_client(Client::from_conf(builder.build()), config)
    }

    /// Wrap an already configured client.
    pub fn from_client(client: Client, config: &S3Config) -> Self {
        Self {
            client,
            bucket: config.bucket.clone(),
            base_url: config.bucket_url(),
            default_expiry: Duration::from_secs(u64::from(config.expires_days) * SECONDS_PER_DAY),
        }
    }

    fn expiry_timestamp(&self, expires_in: Option<Duration>) -> SmithyDateTime {
        let ttl = expires_in.unwrap_or(self.default_expiry);
        let secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        SmithyDateTime::from_secs(Utc::now().timestamp().saturating_add(secs))
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        validate_key(key)?;
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) if err.as_service_error().is_some_and(|e| e.is_not_found()) => Ok(false),
            Err(err) => Err(backend_error(err)),
        }
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        validate_key(key)?;
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) if err.as_service_error().is_some_and(|e| e.is_no_such_key()) => {
                return Err(StorageError::NotFound(key.to_string()));
            }
            Err(err) => return Err(backend_error(err)),
        };

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Backend {
                code: None,
                message: format!("failed to read object body: {e}"),
            })?;
        Ok(data.into_bytes().to_vec())
    }

    async fn put(&self, key: &str, data: &[u8], options: &PutOptions) -> Result<(), StorageError> {
        validate_key(key)?;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data.to_vec()))
            .set_content_type(options.content_type.clone())
            .acl(ObjectCannedAcl::PublicRead)
            .expires(self.expiry_timestamp(options.expires_in))
            .send()
            .await
            .map_err(backend_error)?;

        debug!(bucket = %self.bucket, key, bytes = data.len(), "Uploaded object");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        match self
            .client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(err) if err.code() == Some("NoSuchKey") => Ok(()),
            Err(err) => Err(backend_error(err)),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let page = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .set_continuation_token(continuation_token.take())
                .send()
                .await
                .map_err(backend_error)?;

            keys.extend(
                page.contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_string)),
            );

            match (page.is_truncated(), page.next_continuation_token()) {
                (Some(true), Some(token)) => continuation_token = Some(token.to_string()),
                _ => break,
            }
        }

        Ok(keys)
    }

    async fn expires_at(&self, key: &str) -> Result<Option<DateTime<Utc>>, StorageError> {
        validate_key(key)?;
        let output = match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) if err.as_service_error().is_some_and(|e| e.is_not_found()) => {
                return Err(StorageError::NotFound(key.to_string()));
            }
            Err(err) => return Err(backend_error(err)),
        };

        Ok(output.expires_string().and_then(parse_expires))
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Parses an HTTP-date `Expires` header value.
fn parse_expires(value: &str) -> Option<DateTime<Utc>> {
    match SmithyDateTime::from_str(value, DateTimeFormat::HttpDate) {
        Ok(parsed) => DateTime::from_timestamp(parsed.secs(), parsed.subsec_nanos()),
        Err(e) => {
            debug!(value, error = %e, "Ignoring unparseable Expires header");
            None
        }
    }
}

fn backend_error<E>(err: SdkError<E>) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    // HEAD errors carry no body, so a rejected signature only shows as a 403.
    let code = err.code().map(str::to_string).or_else(|| {
        err.raw_response()
            .filter(|response| response.status().as_u16() == 403)
            .map(|_| FORBIDDEN_CODE.to_string())
    });
    StorageError::Backend {
        code,
        message: DisplayErrorContext(&err).to_string(),
    }
}

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream as AwsByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart, ObjectCannedAcl};
use aws_sdk_s3::Client;
use dog_image::ImageBlob;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::encode_key;
use crate::progress::simulate_while;
use crate::types::require;
use crate::{
    Backend, ProgressReporter, StoredObject, UploadAdapter, UploadConfig, UploadError,
    UploadResult, Validate,
};

/// S3 rejects multipart parts smaller than this, except the last one
const MIN_PART_SIZE: u64 = 5 * 1024 * 1024;

/// Canned ACL applied to uploaded objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum S3Acl {
    Private,
    #[default]
    PublicRead,
    PublicReadWrite,
    AuthenticatedRead,
}

impl S3Acl {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::PublicRead => "public-read",
            Self::PublicReadWrite => "public-read-write",
            Self::AuthenticatedRead => "authenticated-read",
        }
    }
}

/// Credentials and target for S3-compatible object storage
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default)]
    pub acl: S3Acl,
    /// Custom endpoint for S3-compatible stores; switches to path-style addressing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
}

impl S3Config {
    pub fn new<B, R, K, S>(bucket: B, region: R, access_key_id: K, secret_access_key: S) -> Self
    where
        B: Into<String>,
        R: Into<String>,
        K: Into<String>,
        S: Into<String>,
    {
        Self {
            bucket: bucket.into(),
            region: region.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            acl: S3Acl::default(),
            endpoint_url: None,
        }
    }

    pub fn with_acl(mut self, acl: S3Acl) -> Self {
        self.acl = acl;
        self
    }

    pub fn with_endpoint_url<S: Into<String>>(mut self, endpoint_url: S) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// Public URL of `key` in this bucket
    pub fn object_url(&self, key: &str) -> String {
        match &self.endpoint_url {
            Some(endpoint) => format!(
                "{}/{}/{}",
                endpoint.trim_end_matches('/'),
                self.bucket,
                encode_key(key)
            ),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket,
                self.region,
                encode_key(key)
            ),
        }
    }
}

impl Validate for S3Config {
    fn validate(&self) -> UploadResult<()> {
        require("bucket", &self.bucket)?;
        require("region", &self.region)?;
        require("accessKeyId", &self.access_key_id)?;
        require("secretAccessKey", &self.secret_access_key)
    }
}

impl std::fmt::Debug for S3Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Config")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("acl", &self.acl)
            .field("endpoint_url", &self.endpoint_url)
            .finish_non_exhaustive()
    }
}

/// Byte ranges of each multipart part, in order
pub(crate) fn part_ranges(total: u64, part_size: u64) -> Vec<(u64, u64)> {
    let part_size = part_size.max(1);
    (0..total)
        .step_by(part_size as usize)
        .map(|start| (start, (start + part_size).min(total)))
        .collect()
}

/// Uploads to S3 with `PutObject`, or multipart upload for large blobs
#[derive(Debug, Clone, Default)]
pub struct S3Adapter {
    settings: UploadConfig,
}

impl S3Adapter {
    pub fn new(settings: UploadConfig) -> Self {
        Self { settings }
    }

    async fn client(config: &S3Config) -> Client {
        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            "dog-upload",
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials);
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let aws_config = loader.load().await;

        Client::from_conf(
            aws_sdk_s3::config::Builder::from(&aws_config)
                .force_path_style(config.endpoint_url.is_some())
                .build(),
        )
    }

    fn map_aws_error<E: std::error::Error>(err: E) -> UploadError {
        UploadError::backend(Backend::S3, DisplayErrorContext(err).to_string())
    }

    async fn put_single(
        &self,
        client: &Client,
        blob: &ImageBlob,
        key: &str,
        config: &S3Config,
        progress: &ProgressReporter,
    ) -> UploadResult<()> {
        let request = client
            .put_object()
            .bucket(&config.bucket)
            .key(key)
            .body(AwsByteStream::from(blob.bytes.clone()))
            .content_type(&blob.mime_type)
            .acl(ObjectCannedAcl::from(config.acl.as_str()))
            .send();

        simulate_while(progress, blob.len(), self.settings.progress_interval, request)
            .await
            .map_err(Self::map_aws_error)?;

        Ok(())
    }

    async fn put_multipart(
        &self,
        client: &Client,
        blob: &ImageBlob,
        key: &str,
        config: &S3Config,
        progress: &ProgressReporter,
    ) -> UploadResult<()> {
        let created = client
            .create_multipart_upload()
            .bucket(&config.bucket)
            .key(key)
            .content_type(&blob.mime_type)
            .acl(ObjectCannedAcl::from(config.acl.as_str()))
            .send()
            .await
            .map_err(Self::map_aws_error)?;

        let upload_id = created
            .upload_id()
            .ok_or_else(|| UploadError::backend(Backend::S3, "Multipart upload returned no upload id"))?
            .to_string();

        match self
            .send_parts(client, blob, key, config, &upload_id, progress)
            .await
        {
            Ok(()) => Ok(()),
            Err(e) => {
                let abort = client
                    .abort_multipart_upload()
                    .bucket(&config.bucket)
                    .key(key)
                    .upload_id(&upload_id)
                    .send()
                    .await;
                if let Err(abort_err) = abort {
                    warn!("Failed to abort multipart upload {}: {}", upload_id, DisplayErrorContext(abort_err));
                }
                Err(e)
            }
        }
    }

    async fn send_parts(
        &self,
        client: &Client,
        blob: &ImageBlob,
        key: &str,
        config: &S3Config,
        upload_id: &str,
        progress: &ProgressReporter,
    ) -> UploadResult<()> {
        let total = blob.len();
        let part_size = self.settings.part_size.max(MIN_PART_SIZE);
        let mut parts = Vec::new();

        for (index, (start, end)) in part_ranges(total, part_size).into_iter().enumerate() {
            let part_number = (index + 1) as i32;
            let body = blob.bytes.slice(start as usize..end as usize);

            let uploaded = client
                .upload_part()
                .bucket(&config.bucket)
                .key(key)
                .upload_id(upload_id)
                .part_number(part_number)
                .body(AwsByteStream::from(body))
                .send()
                .await
                .map_err(Self::map_aws_error)?;

            parts.push(
                CompletedPart::builder()
                    .set_e_tag(uploaded.e_tag().map(str::to_string))
                    .part_number(part_number)
                    .build(),
            );

            debug!("Uploaded part {} ({}..{})", part_number, start, end);
            progress.report(end, total);
        }

        client
            .complete_multipart_upload()
            .bucket(&config.bucket)
            .key(key)
            .upload_id(upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(parts))
                    .build(),
            )
            .send()
            .await
            .map_err(Self::map_aws_error)?;

        Ok(())
    }
}

#[async_trait]
impl UploadAdapter for S3Adapter {
    type Config = S3Config;

    fn backend(&self) -> Backend {
        Backend::S3
    }

    async fn upload(
        &self,
        blob: &ImageBlob,
        path: &str,
        config: &S3Config,
        progress: &ProgressReporter,
    ) -> UploadResult<StoredObject> {
        let client = Self::client(config).await;

        if blob.len() >= self.settings.multipart_threshold {
            debug!("Using multipart upload for {} bytes", blob.len());
            self.put_multipart(&client, blob, path, config, progress).await?;
        } else {
            self.put_single(&client, blob, path, config, progress).await?;
        }

        progress.complete(blob.len());

        Ok(StoredObject::new(config.object_url(path), blob.len(), blob.format())
            .with_optional_dimensions(blob.width, blob.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> S3Config {
        S3Config::new("my-bucket", "eu-west-1", "AKIA", "secret")
    }

    #[test]
    fn test_object_url_virtual_hosted() {
        assert_eq!(
            config().object_url("photos/my cat.jpg"),
            "https://my-bucket.s3.eu-west-1.amazonaws.com/photos/my%20cat.jpg"
        );
    }

    #[test]
    fn test_object_url_custom_endpoint() {
        let config = config().with_endpoint_url("http://localhost:9000/");
        assert_eq!(config.object_url("a.png"), "http://localhost:9000/my-bucket/a.png");
    }

    #[test]
    fn test_acl_defaults_to_public_read() {
        let config: S3Config = serde_json::from_value(serde_json::json!({
            "bucket": "b",
            "region": "us-east-1",
            "accessKeyId": "k",
            "secretAccessKey": "s"
        }))
        .unwrap();
        assert_eq!(config.acl, S3Acl::PublicRead);
        assert_eq!(config.acl.as_str(), "public-read");

        let acl: S3Acl = serde_json::from_str("\"authenticated-read\"").unwrap();
        assert_eq!(acl, S3Acl::AuthenticatedRead);
    }

    #[test]
    fn test_validate_requires_credentials() {
        assert!(config().validate().is_ok());

        let mut missing = config();
        missing.secret_access_key = " ".to_string();
        let err = missing.validate().unwrap_err();
        assert_eq!(err.message(), "secretAccessKey is required");
    }

    #[test]
    fn test_debug_hides_secret() {
        let rendered = format!("{:?}", config());
        assert!(rendered.contains("my-bucket"));
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn test_part_ranges() {
        assert_eq!(part_ranges(10, 4), vec![(0, 4), (4, 8), (8, 10)]);
        assert_eq!(part_ranges(8, 4), vec![(0, 4), (4, 8)]);
        assert!(part_ranges(0, 4).is_empty());
    }
}

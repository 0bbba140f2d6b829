use std::collections::BTreeMap;

use async_trait::async_trait;
use dog_image::ImageBlob;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};

use super::error_message;
use crate::naming::{file_stem, split_path};
use crate::progress::simulate_while;
use crate::types::require;
use crate::{
    Backend, ProgressReporter, StoredObject, UploadAdapter, UploadConfig, UploadError,
    UploadResult, Validate,
};

pub const DEFAULT_API_BASE_URL: &str = "https://api.cloudinary.com";

/// Digest used to sign upload parameters; must match the account setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

/// Credentials for the Cloudinary upload API
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Overrides the public id derived from the file name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
    #[serde(default)]
    pub signature_algorithm: SignatureAlgorithm,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

impl CloudinaryConfig {
    pub fn new<C, K, S>(cloud_name: C, api_key: K, api_secret: S) -> Self
    where
        C: Into<String>,
        K: Into<String>,
        S: Into<String>,
    {
        Self {
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            public_id: None,
            signature_algorithm: SignatureAlgorithm::default(),
            api_base_url: default_api_base_url(),
        }
    }

    pub fn with_public_id<S: Into<String>>(mut self, public_id: S) -> Self {
        self.public_id = Some(public_id.into());
        self
    }

    pub fn with_signature_algorithm(mut self, algorithm: SignatureAlgorithm) -> Self {
        self.signature_algorithm = algorithm;
        self
    }

    pub fn with_api_base_url<S: Into<String>>(mut self, url: S) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn upload_url(&self) -> String {
        format!(
            "{}/v1_1/{}/image/upload",
            self.api_base_url.trim_end_matches('/'),
            self.cloud_name
        )
    }
}

impl Validate for CloudinaryConfig {
    fn validate(&self) -> UploadResult<()> {
        require("cloudName", &self.cloud_name)?;
        require("apiKey", &self.api_key)?;
        require("apiSecret", &self.api_secret)
    }
}

impl std::fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("public_id", &self.public_id)
            .field("signature_algorithm", &self.signature_algorithm)
            .field("api_base_url", &self.api_base_url)
            .finish_non_exhaustive()
    }
}

/// Sign upload parameters: `k1=v1&k2=v2...` sorted by key, followed by the secret.
/// Empty values are left out.
pub fn sign_params(params: &BTreeMap<&str, String>, secret: &str, algorithm: SignatureAlgorithm) -> String {
    let to_sign = params
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    let payload = format!("{to_sign}{secret}");

    match algorithm {
        SignatureAlgorithm::Sha1 => hex::encode(Sha1::digest(payload.as_bytes())),
        SignatureAlgorithm::Sha256 => hex::encode(Sha256::digest(payload.as_bytes())),
    }
}

#[derive(Debug, Deserialize)]
struct CloudinaryResponse {
    secure_url: String,
    public_id: String,
    bytes: u64,
    format: String,
    width: Option<u32>,
    height: Option<u32>,
}

/// Signed uploads to Cloudinary's image upload endpoint
#[derive(Debug, Clone, Default)]
pub struct CloudinaryAdapter {
    settings: UploadConfig,
}

impl CloudinaryAdapter {
    pub fn new(settings: UploadConfig) -> Self {
        Self { settings }
    }

    /// Parameters sent with the file and covered by the signature
    fn upload_params(path: &str, config: &CloudinaryConfig, timestamp: i64) -> BTreeMap<&'static str, String> {
        let (folder, file_name) = split_path(path);
        let public_id = config
            .public_id
            .clone()
            .unwrap_or_else(|| file_stem(file_name).to_string());

        let mut params = BTreeMap::new();
        params.insert("public_id", public_id);
        params.insert("timestamp", timestamp.to_string());
        if let Some(folder) = folder {
            params.insert("folder", folder.to_string());
        }
        params
    }

    fn error(message: impl Into<String>) -> UploadError {
        UploadError::backend(Backend::Cloudinary, message)
    }
}

#[async_trait]
impl UploadAdapter for CloudinaryAdapter {
    type Config = CloudinaryConfig;

    fn backend(&self) -> Backend {
        Backend::Cloudinary
    }

    async fn upload(
        &self,
        blob: &ImageBlob,
        path: &str,
        config: &CloudinaryConfig,
        progress: &ProgressReporter,
    ) -> UploadResult<StoredObject> {
        let params = Self::upload_params(path, config, chrono::Utc::now().timestamp());
        let signature = sign_params(&params, &config.api_secret, config.signature_algorithm);
        let (_, file_name) = split_path(path);

        let file_part = Part::bytes(blob.bytes.to_vec())
            .file_name(file_name.to_string())
            .mime_str(&blob.mime_type)
            .map_err(|e| Self::error(format!("Invalid content type {}: {e}", blob.mime_type)))?;

        let mut form = Form::new()
            .text("api_key", config.api_key.clone())
            .text("signature", signature);
        for (key, value) in params {
            form = form.text(key, value);
        }
        let form = form.part("file", file_part);

        let request = reqwest::Client::new()
            .post(config.upload_url())
            .multipart(form)
            .send();

        let response = simulate_while(progress, blob.len(), self.settings.progress_interval, request)
            .await
            .map_err(|e| Self::error(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Self::error(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(Self::error(error_message(status, &body)));
        }

        let result: CloudinaryResponse = serde_json::from_str(&body)
            .map_err(|e| Self::error(format!("Unexpected response: {e}")))?;

        progress.complete(blob.len());

        Ok(StoredObject::new(result.secure_url, result.bytes, result.format)
            .with_optional_dimensions(result.width, result.height)
            .with_backend_id(result.public_id))
    }
}

//! Upload adapters for the supported storage backends.

mod cloudinary;
mod firebase;
mod s3;

pub use cloudinary::{CloudinaryAdapter, CloudinaryConfig, SignatureAlgorithm};
pub use firebase::{FirebaseAdapter, FirebaseConfig};
pub use s3::{S3Acl, S3Adapter, S3Config};

use serde::Deserialize;

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Human-readable message from a failed JSON API response.
///
/// Understands `{"error": {"message": ...}}` bodies and falls back to the
/// status line plus raw body otherwise.
pub(crate) fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) if body.trim().is_empty() => status.to_string(),
        Err(_) => format!("{status}: {}", body.trim()),
    }
}

/// Percent-encode each segment of an object key, keeping the `/` separators
pub(crate) fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

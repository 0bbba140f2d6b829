//! # dog-upload: Image uploads to S3, Cloudinary and Firebase Storage
//!
//! `dog-upload` takes an image (bytes in hand or a URL), optionally transforms
//! it in memory with [`dog_image`], stores it on one of several backends and
//! hands back a uniform [`UploadReceipt`], reporting progress along the way.
//!
//! ## Key Features
//!
//! - **One shape for every backend**: same options, same receipt, same progress events
//! - **Client-side transforms**: resize, crop, rotate and re-encode before upload
//! - **Progress everywhere**: real byte counts where the transport exposes them, estimates otherwise
//! - **Batches**: sequential multi-file uploads that stop at the first failure
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dog_upload::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> UploadResult<()> {
//! let options = S3UploadOptions::new(
//!     ImageSource::from_path("photo.jpg")?,
//!     S3Config::new("my-bucket", "us-east-1", "AKIA...", "secret"),
//! )
//! .with_folder("avatars")
//! .with_transformations(
//!     Transformations::new()
//!         .with_resize(Resize::width(400))
//!         .with_format(OutputFormat::WebP),
//! )
//! .with_progress(|p| println!("{}%", p.percentage));
//!
//! let receipt = upload_s3(options).await?;
//! println!("{}", receipt.url);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   upload_many   │  ← sequential batches
//! ├─────────────────┤
//! │    Uploader     │  ← validate, transform, name, upload
//! ├─────────────────┤
//! │  UploadAdapter  │  ← S3 / Cloudinary / Firebase
//! └─────────────────┘
//! ```

pub mod adapter;
mod api;
pub mod backends;
mod batch;
mod config;
mod error;
pub mod naming;
mod progress;
mod receipt;
mod types;
mod uploader;
pub mod validation;

// Re-export main types for clean API
pub use adapter::{Backend, StoredObject, UploadAdapter, Validate};
pub use api::{
    upload, upload_cloudinary, upload_cloudinary_with, upload_firebase, upload_firebase_with,
    upload_s3, upload_s3_with, upload_with,
};
pub use backends::{
    CloudinaryAdapter, CloudinaryConfig, FirebaseAdapter, FirebaseConfig, S3Acl, S3Adapter,
    S3Config, SignatureAlgorithm,
};
pub use batch::upload_many;
pub use config::UploadConfig;
pub use error::{UploadError, UploadResult};
pub use progress::{
    percentage, simulate_while, BatchProgressSink, ProgressEvent, ProgressReporter, ProgressSink,
};
pub use receipt::UploadReceipt;
pub use types::{
    BackendConfig, BatchOptions, CloudinaryUploadOptions, FirebaseUploadOptions, S3UploadOptions,
    UploadOptions,
};
pub use uploader::Uploader;
pub use validation::{check_size, AcceptFilter, UploadKind};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        upload, upload_cloudinary, upload_firebase, upload_many, upload_s3, BackendConfig,
        BatchOptions, CloudinaryConfig, CloudinaryUploadOptions, FirebaseConfig,
        FirebaseUploadOptions, ProgressEvent, S3Config, S3UploadOptions, UploadError,
        UploadOptions, UploadReceipt, UploadResult,
    };
    pub use dog_image::{Crop, FitMode, ImageSource, OutputFormat, Resize, Transformations};
}

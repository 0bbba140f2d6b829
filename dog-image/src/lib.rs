//! # dog-image: In-memory image transforms for DogRS uploads
//!
//! `dog-image` turns an [`ImageSource`] (bytes in hand, an `http(s)` URL or a
//! `data:` URI) into an upload-ready [`ImageBlob`], optionally running a
//! [`Transformations`] spec over it first.
//!
//! Operations always run in the same order, regardless of which are present:
//!
//! ```text
//! decode → resize → crop → rotate → encode
//! ```
//!
//! When no transformation is requested the source bytes pass through
//! untouched and nothing is decoded.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dog_image::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> ImageResult<()> {
//! let source = ImageSource::from_path("photo.png")?;
//! let spec = Transformations::new()
//!     .with_resize(Resize::width(400).with_fit(FitMode::Cover))
//!     .with_format(OutputFormat::WebP);
//!
//! let mut engine = TransformEngine::new();
//! let blob = engine.process(&source, Some(&spec)).await?;
//! assert_eq!(blob.mime_type, "image/webp");
//! # Ok(())
//! # }
//! ```

mod config;
pub mod crop;
pub mod dimensions;
pub mod encode;
mod engine;
mod error;
mod params;
pub mod resize;
pub mod rotate;
mod source;

pub use config::{TransformConfig, DEFAULT_MAX_PIXELS, DEFAULT_QUALITY};
pub use engine::TransformEngine;
pub use error::{ImageError, ImageResult};
pub use params::{Crop, FitMode, OutputFormat, Resize, Transformations};
pub use source::{sniff_mime_type, ImageBlob, ImageSource, OCTET_STREAM};

/// Re-exported so callers can pick a resampling filter without depending on `image`
pub use image::imageops::FilterType;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Crop, FitMode, ImageBlob, ImageError, ImageResult, ImageSource, OutputFormat, Resize,
        TransformConfig, TransformEngine, Transformations,
    };
}

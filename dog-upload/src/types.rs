use std::sync::Arc;

use dog_image::{ImageSource, Transformations};
use serde::{Deserialize, Serialize};

use crate::backends::{CloudinaryConfig, FirebaseConfig, S3Config};
use crate::{Backend, ProgressEvent, ProgressSink, UploadError, UploadResult, Validate};

/// One upload request: a source, where to put it and how to transform it.
///
/// `B` carries the backend credentials and options.
pub struct UploadOptions<B> {
    pub file: ImageSource,
    /// Destination file name; generated when absent
    pub file_name: Option<String>,
    /// Destination folder; surrounding `/` are ignored
    pub folder: Option<String>,
    pub transformations: Option<Transformations>,
    pub on_progress: Option<ProgressSink>,
    pub backend: B,
}

pub type S3UploadOptions = UploadOptions<S3Config>;
pub type CloudinaryUploadOptions = UploadOptions<CloudinaryConfig>;
pub type FirebaseUploadOptions = UploadOptions<FirebaseConfig>;

impl<B> UploadOptions<B> {
    pub fn new(file: ImageSource, backend: B) -> Self {
        Self {
            file,
            file_name: None,
            folder: None,
            transformations: None,
            on_progress: None,
            backend,
        }
    }

    pub fn with_file_name<S: Into<String>>(mut self, file_name: S) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn with_folder<S: Into<String>>(mut self, folder: S) -> Self {
        self.folder = Some(folder.into());
        self
    }

    pub fn with_transformations(mut self, transformations: Transformations) -> Self {
        self.transformations = Some(transformations);
        self
    }

    /// Receive progress events for this upload
    pub fn with_progress<F>(mut self, on_progress: F) -> Self
    where
        F: Fn(ProgressEvent) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(on_progress));
        self
    }

    pub fn with_progress_sink(mut self, sink: ProgressSink) -> Self {
        self.on_progress = Some(sink);
        self
    }

    /// Swap the backend part, keeping everything else
    pub fn map_backend<C, F>(self, f: F) -> UploadOptions<C>
    where
        F: FnOnce(B) -> C,
    {
        UploadOptions {
            file: self.file,
            file_name: self.file_name,
            folder: self.folder,
            transformations: self.transformations,
            on_progress: self.on_progress,
            backend: f(self.backend),
        }
    }
}

impl<B: Validate> Validate for UploadOptions<B> {
    fn validate(&self) -> UploadResult<()> {
        if let Some(name) = &self.file_name {
            if name.trim().is_empty() {
                return Err(UploadError::validation("File name must not be empty"));
            }
            if name.contains('/') {
                return Err(UploadError::validation(format!(
                    "File name must not contain '/': {name}"
                )));
            }
        }
        if let Some(spec) = &self.transformations {
            spec.validate()?;
        }
        self.backend.validate()
    }
}

impl<B: std::fmt::Debug> std::fmt::Debug for UploadOptions<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadOptions")
            .field("file", &self.file.name_hint())
            .field("file_name", &self.file_name)
            .field("folder", &self.folder)
            .field("transformations", &self.transformations)
            .field("on_progress", &self.on_progress.is_some())
            .field("backend", &self.backend)
            .finish()
    }
}

/// Options shared by every item of a batch
#[derive(Debug, Clone)]
pub struct BatchOptions<B> {
    pub file_name: Option<String>,
    pub folder: Option<String>,
    pub transformations: Option<Transformations>,
    pub backend: B,
}

impl<B> BatchOptions<B> {
    pub fn new(backend: B) -> Self {
        Self {
            file_name: None,
            folder: None,
            transformations: None,
            backend,
        }
    }

    /// Every item gets this exact name, so later items overwrite earlier ones
    pub fn with_file_name<S: Into<String>>(mut self, file_name: S) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn with_folder<S: Into<String>>(mut self, folder: S) -> Self {
        self.folder = Some(folder.into());
        self
    }

    pub fn with_transformations(mut self, transformations: Transformations) -> Self {
        self.transformations = Some(transformations);
        self
    }
}

impl<B: Clone> BatchOptions<B> {
    /// Options for one item of the batch
    pub fn for_file(&self, file: ImageSource, on_progress: Option<ProgressSink>) -> UploadOptions<B> {
        UploadOptions {
            file,
            file_name: self.file_name.clone(),
            folder: self.folder.clone(),
            transformations: self.transformations.clone(),
            on_progress,
            backend: self.backend.clone(),
        }
    }
}

/// Backend options tagged by backend, for callers choosing a backend at runtime
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    S3(S3Config),
    Cloudinary(CloudinaryConfig),
    Firebase(FirebaseConfig),
}

impl BackendConfig {
    pub fn backend(&self) -> Backend {
        match self {
            Self::S3(_) => Backend::S3,
            Self::Cloudinary(_) => Backend::Cloudinary,
            Self::Firebase(_) => Backend::Firebase,
        }
    }
}

impl Validate for BackendConfig {
    fn validate(&self) -> UploadResult<()> {
        match self {
            Self::S3(config) => config.validate(),
            Self::Cloudinary(config) => config.validate(),
            Self::Firebase(config) => config.validate(),
        }
    }
}

impl From<S3Config> for BackendConfig {
    fn from(config: S3Config) -> Self {
        Self::S3(config)
    }
}

impl From<CloudinaryConfig> for BackendConfig {
    fn from(config: CloudinaryConfig) -> Self {
        Self::Cloudinary(config)
    }
}

impl From<FirebaseConfig> for BackendConfig {
    fn from(config: FirebaseConfig) -> Self {
        Self::Firebase(config)
    }
}

/// Checks a required string field is present
pub(crate) fn require(field: &str, value: &str) -> UploadResult<()> {
    if value.trim().is_empty() {
        return Err(UploadError::validation(format!("{field} is required")));
    }
    Ok(())
}

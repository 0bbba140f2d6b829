use dog_image::TransformEngine;
use tracing::{info, instrument, warn};

use crate::naming::{destination_path, generate_file_name};
use crate::{
    ProgressReporter, UploadAdapter, UploadConfig, UploadError, UploadOptions, UploadReceipt,
    UploadResult, Validate,
};

/// Runs single uploads against one adapter: validate, transform, name, upload.
pub struct Uploader<A> {
    adapter: A,
    config: UploadConfig,
}

impl<A: UploadAdapter> Uploader<A> {
    pub fn new(adapter: A) -> Self {
        Self::with_config(adapter, UploadConfig::default())
    }

    pub fn with_config(adapter: A, config: UploadConfig) -> Self {
        Self { adapter, config }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Upload one source and describe where it ended up.
    ///
    /// Each call gets its own transform engine; the transformed blob is
    /// dropped once the adapter returns.
    #[instrument(skip_all, fields(backend = %self.adapter.backend()))]
    pub async fn upload_one(&self, options: UploadOptions<A::Config>) -> UploadResult<UploadReceipt> {
        options.validate().map_err(log_failure)?;

        let UploadOptions {
            file,
            file_name,
            folder,
            transformations,
            on_progress,
            backend,
        } = options;

        let mut engine = TransformEngine::with_config(self.config.transform.clone());
        let blob = engine
            .process(&file, transformations.as_ref())
            .await
            .map_err(|e| log_failure(UploadError::from(e)))?;

        let file_name = file_name.unwrap_or_else(|| generate_file_name(file.name_hint()));
        let path = destination_path(folder.as_deref(), &file_name);
        let reporter = ProgressReporter::new(on_progress);

        info!("Uploading {} ({} bytes, {})", path, blob.len(), blob.mime_type);

        let stored = self
            .adapter
            .upload(&blob, &path, &backend, &reporter)
            .await
            .map_err(log_failure)?;
        reporter.complete(stored.size);
        drop(blob);

        info!("Uploaded {} to {}", path, stored.url);

        Ok(UploadReceipt::from_stored(stored, file_name))
    }
}

fn log_failure(error: UploadError) -> UploadError {
    warn!(stage = error.stage(), "Upload failed: {}", error);
    error
}

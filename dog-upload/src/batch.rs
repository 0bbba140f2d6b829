use std::future::Future;
use std::sync::Arc;

use dog_image::ImageSource;
use tracing::{debug, warn};

use crate::{
    BatchOptions, BatchProgressSink, ProgressEvent, ProgressSink, UploadOptions, UploadReceipt, UploadResult,
};

/// Upload `files` one after another with shared options.
///
/// Items run strictly in input order and item `i + 1` starts only after item
/// `i` has settled. The first failure stops the batch and is returned as-is;
/// receipts of earlier items are discarded. `on_progress` receives each
/// item's events along with its 0-based index.
pub async fn upload_many<B, F, Fut>(
    upload_fn: F,
    files: Vec<ImageSource>,
    base: &BatchOptions<B>,
    on_progress: Option<BatchProgressSink>,
) -> UploadResult<Vec<UploadReceipt>>
where
    B: Clone,
    F: Fn(UploadOptions<B>) -> Fut,
    Fut: Future<Output = UploadResult<UploadReceipt>>,
{
    let total = files.len();
    let mut receipts = Vec::with_capacity(total);

    for (index, file) in files.into_iter().enumerate() {
        let sink = on_progress.clone().map(|batch_sink| {
            let sink: ProgressSink = Arc::new(move |event: ProgressEvent| batch_sink(index, event));
            sink
        });

        debug!("Uploading file {} of {}", index + 1, total);

        match upload_fn(base.for_file(file, sink)).await {
            Ok(receipt) => receipts.push(receipt),
            Err(error) => {
                warn!("Failed to upload file {}: {}", index + 1, error);
                return Err(error);
            }
        }
    }

    Ok(receipts)
}

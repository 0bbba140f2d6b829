use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dog_image::encode::encode_surface;
use dog_image::ImageBlob;
use dog_upload::prelude::*;
use dog_upload::{
    Backend, ProgressReporter, StoredObject, UploadAdapter, UploadConfig, Uploader, Validate,
};
use image::{Rgba, RgbaImage};

#[derive(Debug, Clone, Default)]
struct StubConfig;

impl Validate for StubConfig {
    fn validate(&self) -> UploadResult<()> {
        Ok(())
    }
}

/// Echoes the blob back and reports progress in four steps
#[derive(Default)]
struct EchoAdapter {
    blobs: Mutex<Vec<(String, ImageBlob)>>,
    fail_with: Option<UploadError>,
}

#[async_trait]
impl UploadAdapter for EchoAdapter {
    type Config = StubConfig;

    fn backend(&self) -> Backend {
        Backend::Cloudinary
    }

    async fn upload(
        &self,
        blob: &ImageBlob,
        path: &str,
        _config: &StubConfig,
        progress: &ProgressReporter,
    ) -> UploadResult<StoredObject> {
        if let Some(error) = &self.fail_with {
            return Err(error.clone());
        }

        let total = blob.len();
        for step in 1..=4 {
            progress.report(total * step / 4, total);
        }
        self.blobs.lock().unwrap().push((path.to_string(), blob.clone()));

        Ok(StoredObject::new(format!("https://stub.test/{path}"), total, blob.format())
            .with_optional_dimensions(blob.width, blob.height))
    }
}

fn photo(width: u32, height: u32) -> ImageSource {
    let surface = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 90, 255])
    });
    let bytes = encode_surface(&surface, OutputFormat::Png, 1.0).unwrap();
    ImageSource::binary("holiday.png", "image/png", bytes)
}

fn recorder() -> (Arc<Mutex<Vec<ProgressEvent>>>, impl Fn(ProgressEvent) + Send + Sync + 'static) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink_events = events.clone();
    (events, move |event: ProgressEvent| sink_events.lock().unwrap().push(event))
}

#[tokio::test]
async fn transformed_upload_end_to_end() {
    let uploader = Uploader::new(EchoAdapter::default());
    let (events, on_progress) = recorder();

    let options = UploadOptions::new(photo(800, 600), StubConfig)
        .with_folder("albums")
        .with_transformations(
            Transformations::new()
                .with_resize(Resize::width(400).with_fit(FitMode::Cover))
                .with_format(OutputFormat::WebP)
                .with_quality(0.9),
        )
        .with_progress(on_progress);

    let receipt = uploader.upload_one(options).await.unwrap();

    let blobs = uploader.adapter().blobs.lock().unwrap();
    let (path, blob) = &blobs[0];

    assert_eq!(receipt.format, "webp");
    assert_eq!(receipt.size, blob.len());
    assert_eq!(receipt.public_id, None);
    assert_eq!((receipt.width, receipt.height), (Some(400), Some(300)));
    assert_eq!(blob.mime_type, "image/webp");
    assert_eq!(path, &format!("albums/{}", receipt.file_name));
    assert!(receipt.file_name.ends_with(".png"));
    assert_eq!(receipt.url, format!("https://stub.test/{path}"));

    let events = events.lock().unwrap();
    assert!(!events.is_empty());
    assert!(events.windows(2).all(|w| w[0].loaded <= w[1].loaded));
    assert!(events.iter().all(|e| e.percentage <= 100));
    assert_eq!(events.last().unwrap().percentage, 100);
}

#[tokio::test]
async fn passthrough_upload_keeps_bytes() {
    let uploader = Uploader::new(EchoAdapter::default());
    let source = photo(10, 10);
    let expected = source.known_size();

    let receipt = uploader
        .upload_one(UploadOptions::new(source, StubConfig).with_file_name("raw.png"))
        .await
        .unwrap();

    assert_eq!(Some(receipt.size), expected);
    assert_eq!(receipt.format, "png");
    assert_eq!((receipt.width, receipt.height), (None, None));
}

#[tokio::test]
async fn undecodable_source_stops_before_adapter() {
    let uploader = Uploader::new(EchoAdapter::default());
    let source = ImageSource::binary("broken.png", "image/png", vec![0u8; 32]);
    let options = UploadOptions::new(source, StubConfig)
        .with_transformations(Transformations::new().with_format(OutputFormat::Jpeg));

    let err = uploader.upload_one(options).await.unwrap_err();

    assert!(matches!(err, UploadError::Decode { .. }));
    assert!(uploader.adapter().blobs.lock().unwrap().is_empty());
}

#[tokio::test]
async fn adapter_error_is_returned_unchanged() {
    let failure = UploadError::backend(Backend::Cloudinary, "Invalid Signature");
    let uploader = Uploader::new(EchoAdapter {
        fail_with: Some(failure.clone()),
        ..Default::default()
    });

    let err = uploader
        .upload_one(UploadOptions::new(photo(4, 4), StubConfig))
        .await
        .unwrap_err();
    assert_eq!(err, failure);
}

#[tokio::test]
async fn batch_through_uploader() {
    let uploader = Uploader::with_config(EchoAdapter::default(), UploadConfig::default());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink_seen = seen.clone();

    let receipts = upload_many(
        |options| uploader.upload_one(options),
        vec![photo(8, 8), photo(16, 16)],
        &BatchOptions::new(StubConfig).with_folder("batch"),
        Some(Arc::new(move |index: usize, event: ProgressEvent| {
            sink_seen.lock().unwrap().push((index, event.percentage))
        })),
    )
    .await
    .unwrap();

    assert_eq!(receipts.len(), 2);
    assert_ne!(receipts[0].file_name, receipts[1].file_name);

    let seen = seen.lock().unwrap();
    assert!(seen.iter().any(|(index, _)| *index == 0));
    assert_eq!(seen.last(), Some(&(1, 100)));
}

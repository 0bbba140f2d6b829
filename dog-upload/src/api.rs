use crate::backends::{CloudinaryAdapter, FirebaseAdapter, S3Adapter};
use crate::{
    BackendConfig, CloudinaryUploadOptions, FirebaseUploadOptions, S3UploadOptions, UploadConfig,
    UploadOptions, UploadReceipt, UploadResult, Uploader,
};

/// Upload one image to S3-compatible object storage
pub async fn upload_s3(options: S3UploadOptions) -> UploadResult<UploadReceipt> {
    upload_s3_with(options, UploadConfig::default()).await
}

/// Upload one image to Cloudinary
pub async fn upload_cloudinary(options: CloudinaryUploadOptions) -> UploadResult<UploadReceipt> {
    upload_cloudinary_with(options, UploadConfig::default()).await
}

/// Upload one image to Firebase Storage
pub async fn upload_firebase(options: FirebaseUploadOptions) -> UploadResult<UploadReceipt> {
    upload_firebase_with(options, UploadConfig::default()).await
}

/// Upload one image to whichever backend `options.backend` names
pub async fn upload(options: UploadOptions<BackendConfig>) -> UploadResult<UploadReceipt> {
    upload_with(options, UploadConfig::default()).await
}

pub async fn upload_s3_with(options: S3UploadOptions, config: UploadConfig) -> UploadResult<UploadReceipt> {
    Uploader::with_config(S3Adapter::new(config.clone()), config)
        .upload_one(options)
        .await
}

pub async fn upload_cloudinary_with(
    options: CloudinaryUploadOptions,
    config: UploadConfig,
) -> UploadResult<UploadReceipt> {
    Uploader::with_config(CloudinaryAdapter::new(config.clone()), config)
        .upload_one(options)
        .await
}

pub async fn upload_firebase_with(
    options: FirebaseUploadOptions,
    config: UploadConfig,
) -> UploadResult<UploadReceipt> {
    Uploader::with_config(FirebaseAdapter::new(config.clone()), config)
        .upload_one(options)
        .await
}

pub async fn upload_with(
    options: UploadOptions<BackendConfig>,
    config: UploadConfig,
) -> UploadResult<UploadReceipt> {
    let backend = options.backend.clone();
    match backend {
        BackendConfig::S3(s3) => upload_s3_with(options.map_backend(|_| s3), config).await,
        BackendConfig::Cloudinary(cloudinary) => {
            upload_cloudinary_with(options.map_backend(|_| cloudinary), config).await
        }
        BackendConfig::Firebase(firebase) => {
            upload_firebase_with(options.map_backend(|_| firebase), config).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::S3Config;
    use crate::UploadError;
    use dog_image::ImageSource;

    fn source() -> ImageSource {
        ImageSource::binary("a.png", "image/png", vec![1u8])
    }

    #[tokio::test]
    async fn test_dispatch_validates_selected_backend() {
        let options = UploadOptions::new(
            source(),
            BackendConfig::S3(S3Config::new("", "us-east-1", "k", "s")),
        );

        let err = tokio_test::assert_err!(upload(options).await);
        assert_eq!(err, UploadError::validation("bucket is required"));
    }

    #[tokio::test]
    async fn test_backend_config_from_tagged_json() {
        let config: BackendConfig = serde_json::from_value(serde_json::json!({
            "type": "cloudinary",
            "cloudName": "demo",
            "apiKey": "",
            "apiSecret": "secret"
        }))
        .unwrap();
        assert_eq!(config.backend(), crate::Backend::Cloudinary);

        let err = upload(UploadOptions::new(source(), config)).await.unwrap_err();
        assert_eq!(err.message(), "apiKey is required");
    }
}

use serde::{Deserialize, Serialize};

use crate::StoredObject;

/// Receipt returned after successfully uploading an image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub url: String,
    pub file_name: String,
    pub size: u64,
    pub format: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
}

impl UploadReceipt {
    /// Create a new upload receipt
    pub fn new<U, N, F>(url: U, file_name: N, size: u64, format: F) -> Self
    where
        U: Into<String>,
        N: Into<String>,
        F: Into<String>,
    {
        Self {
            url: url.into(),
            file_name: file_name.into(),
            size,
            format: format.into(),
            width: None,
            height: None,
            public_id: None,
        }
    }

    /// Build a receipt from what the backend stored
    pub fn from_stored<N: Into<String>>(stored: StoredObject, file_name: N) -> Self {
        let mut receipt = Self::new(stored.url, file_name, stored.size, stored.format);
        if let (Some(width), Some(height)) = (stored.width, stored.height) {
            receipt = receipt.with_dimensions(width, height);
        }
        if let Some(id) = stored.backend_id {
            receipt = receipt.with_public_id(id);
        }
        receipt
    }

    /// Set pixel dimensions
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Set the backend-assigned id
    pub fn with_public_id<S: Into<String>>(mut self, public_id: S) -> Self {
        self.public_id = Some(public_id.into());
        self
    }
}

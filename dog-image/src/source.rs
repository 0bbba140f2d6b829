use std::path::Path;

use base64::Engine as _;
use bytes::Bytes;
use image::ImageFormat;

use crate::{ImageError, ImageResult};

/// Content type used when nothing better is known
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Where an image comes from. Never modified by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// In-memory file with its name and MIME type
    Binary {
        name: String,
        mime_type: String,
        bytes: Bytes,
    },
    /// Remote reference: an `http(s)://` URL or a `data:` URI
    Remote { uri: String },
}

impl ImageSource {
    pub fn binary<N, M, B>(name: N, mime_type: M, bytes: B) -> Self
    where
        N: Into<String>,
        M: Into<String>,
        B: Into<Bytes>,
    {
        Self::Binary {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn remote<S: Into<String>>(uri: S) -> Self {
        Self::Remote { uri: uri.into() }
    }

    /// Read a local file, guessing its MIME type from the extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> ImageResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| ImageError::decode(format!("Failed to read {}: {e}", path.display())))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = ImageFormat::from_path(path)
            .map(|f| f.to_mime_type().to_string())
            .unwrap_or_else(|_| OCTET_STREAM.to_string());

        Ok(Self::binary(name, mime_type, bytes))
    }

    /// File name for binary sources, the URI for remote ones
    pub fn name_hint(&self) -> &str {
        match self {
            Self::Binary { name, .. } => name,
            Self::Remote { uri } => uri,
        }
    }

    /// Size in bytes when known without fetching
    pub fn known_size(&self) -> Option<u64> {
        match self {
            Self::Binary { bytes, .. } => Some(bytes.len() as u64),
            Self::Remote { uri } => data_uri_payload(uri).ok().map(|(_, data)| data.len() as u64),
        }
    }

    /// Declared MIME type when known without fetching
    pub fn known_mime_type(&self) -> Option<&str> {
        match self {
            Self::Binary { mime_type, .. } => Some(mime_type),
            Self::Remote { uri } => uri
                .strip_prefix("data:")
                .and_then(|rest| rest.split([';', ',']).next())
                .filter(|m| !m.is_empty()),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }
}

impl From<Bytes> for ImageSource {
    fn from(bytes: Bytes) -> Self {
        let mime_type = sniff_mime_type(&bytes).unwrap_or(OCTET_STREAM).to_string();
        Self::Binary {
            name: String::new(),
            mime_type,
            bytes,
        }
    }
}

/// Bytes plus the content type they should be stored with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlob {
    pub bytes: Bytes,
    pub mime_type: String,
    /// Pixel dimensions when the blob was produced by the pipeline
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ImageBlob {
    pub fn new<B: Into<Bytes>, M: Into<String>>(bytes: B, mime_type: M) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
            width: None,
            height: None,
        }
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Subtype of the MIME type (`image/webp` -> `webp`)
    pub fn format(&self) -> &str {
        self.mime_type
            .split_once('/')
            .map(|(_, sub)| sub.split(';').next().unwrap_or(sub).trim())
            .filter(|sub| !sub.is_empty())
            .unwrap_or("unknown")
    }
}

/// Guess a MIME type from magic bytes
pub fn sniff_mime_type(bytes: &[u8]) -> Option<&'static str> {
    image::guess_format(bytes).ok().map(|f| f.to_mime_type())
}

/// Split a `data:` URI into its MIME type and decoded payload
pub(crate) fn data_uri_payload(uri: &str) -> ImageResult<(Option<String>, Vec<u8>)> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| ImageError::decode("Not a data URI"))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| ImageError::decode("Malformed data URI: missing ','"))?;

    let mut parts = meta.split(';');
    let mime_type = parts.next().filter(|m| !m.is_empty()).map(str::to_string);
    let is_base64 = parts.any(|p| p.eq_ignore_ascii_case("base64"));

    let data = if is_base64 {
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| ImageError::decode(format!("Malformed data URI payload: {e}")))?
    } else {
        payload.as_bytes().to_vec()
    };

    Ok((mime_type, data))
}

/// Fetch the raw bytes behind a source without decoding them
pub(crate) async fn fetch_raw(http: &reqwest::Client, source: &ImageSource) -> ImageResult<ImageBlob> {
    match source {
        ImageSource::Binary {
            mime_type, bytes, ..
        } => Ok(ImageBlob::new(bytes.clone(), mime_type.clone())),
        ImageSource::Remote { uri } if uri.starts_with("data:") => {
            let (mime_type, data) = data_uri_payload(uri)?;
            let mime_type = mime_type
                .or_else(|| sniff_mime_type(&data).map(str::to_string))
                .unwrap_or_else(|| OCTET_STREAM.to_string());
            Ok(ImageBlob::new(data, mime_type))
        }
        ImageSource::Remote { uri } => {
            tracing::debug!("Fetching remote image: {}", uri);

            let response = http
                .get(uri)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| ImageError::decode(format!("Failed to fetch {uri}: {e}")))?;

            let header_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
                .filter(|v| !v.is_empty());

            let bytes = response
                .bytes()
                .await
                .map_err(|e| ImageError::decode(format!("Failed to read body of {uri}: {e}")))?;

            let mime_type = header_type
                .or_else(|| sniff_mime_type(&bytes).map(str::to_string))
                .unwrap_or_else(|| OCTET_STREAM.to_string());

            Ok(ImageBlob::new(bytes, mime_type))
        }
    }
}

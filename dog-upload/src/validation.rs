//! Checks a file picker runs before handing files to an upload function.

use bytesize::ByteSize;
use dog_image::ImageSource;

use crate::{Backend, UploadError, UploadResult};

/// Upload type tag chosen by a picker (`s3`, `cloudinary`, `firebase`)
pub type UploadKind = Backend;

/// Reject sources larger than `max_size` bytes.
///
/// Remote sources whose size is unknown until fetched always pass.
pub fn check_size(source: &ImageSource, max_size: u64) -> UploadResult<()> {
    match source.known_size() {
        Some(size) if size > max_size => Err(UploadError::validation(format!(
            "File {} is too large. Maximum size is {}",
            source.name_hint(),
            ByteSize::b(max_size)
        ))),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AcceptRule {
    Any,
    /// `image/*`
    TypePrefix(String),
    /// `image/png`
    MimeType(String),
    /// `.jpg`
    Extension(String),
}

/// An HTML-style `accept` list such as `image/*` or `image/png, .jpg`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AcceptFilter {
    rules: Vec<AcceptRule>,
}

impl AcceptFilter {
    pub fn parse(accept: &str) -> Self {
        let rules = accept
            .split(',')
            .map(|rule| rule.trim().to_ascii_lowercase())
            .filter(|rule| !rule.is_empty())
            .map(|rule| {
                if rule == "*" || rule == "*/*" {
                    AcceptRule::Any
                } else if let Some(extension) = rule.strip_prefix('.') {
                    AcceptRule::Extension(extension.to_string())
                } else if let Some(prefix) = rule.strip_suffix("/*") {
                    AcceptRule::TypePrefix(prefix.to_string())
                } else {
                    AcceptRule::MimeType(rule)
                }
            })
            .collect();

        Self { rules }
    }

    /// An empty filter accepts everything
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn matches(&self, name: &str, mime_type: &str) -> bool {
        if self.rules.is_empty() {
            return true;
        }

        let mime_type = mime_type.trim().to_ascii_lowercase();
        let name = name.to_ascii_lowercase();

        self.rules.iter().any(|rule| match rule {
            AcceptRule::Any => true,
            AcceptRule::TypePrefix(prefix) => mime_type
                .split_once('/')
                .is_some_and(|(top, _)| top == prefix),
            AcceptRule::MimeType(expected) => mime_type == *expected,
            AcceptRule::Extension(extension) => name
                .rsplit_once('.')
                .is_some_and(|(_, ext)| ext == extension),
        })
    }

    /// Check a source against the filter.
    ///
    /// Remote sources with no declared type are matched by name only.
    pub fn check(&self, source: &ImageSource) -> UploadResult<()> {
        let mime_type = source.known_mime_type().unwrap_or_default();
        if self.matches(source.name_hint(), mime_type) {
            Ok(())
        } else {
            Err(UploadError::validation(format!(
                "File {} is not an accepted type",
                source.name_hint()
            )))
        }
    }
}

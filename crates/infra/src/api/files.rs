//! Multipart uploads from local files

use std::path::Path;

use reqwest::multipart::{Form, Part};
use tracing::debug;
use wwsdk_domain::SdkError;

use crate::errors::to_sdk;

/// Multipart field the platform reads uploads from.
pub const FILE_FIELD: &str = "file";

/// Width and height of an image, rendered as the `dim` query value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn as_query(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

/// MIME type guessed from the file extension, `application/octet-stream` when
/// unknown.
pub fn content_type(path: &Path) -> String {
    mime_guess::from_path(path).first_or_octet_stream().essence_str().to_string()
}

pub fn is_image(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().starts_with("image/")
}

/// Read the pixel size of the image at `path`.
///
/// Decoding runs on the blocking pool.
pub async fn image_dimensions(path: &Path) -> Result<Dimensions, SdkError> {
    let owned = path.to_path_buf();
    let (width, height) = tokio::task::spawn_blocking(move || image::image_dimensions(owned))
        .await
        .map_err(|e| SdkError::Internal(format!("image size task failed: {e}")))?
        .map_err(to_sdk)?;
    Ok(Dimensions { width, height })
}

/// `dim` value for an upload: explicit dimensions win, images are measured,
/// anything else gets none.
pub async fn upload_dimensions(
    path: &Path,
    content_type: &str,
    explicit: Option<Dimensions>,
) -> Result<Option<Dimensions>, SdkError> {
    match explicit {
        Some(dims) => Ok(Some(dims)),
        None if is_image(content_type) => image_dimensions(path).await.map(Some),
        None => Ok(None),
    }
}

/// Build a single-part form with the file contents under [`FILE_FIELD`].
pub async fn file_form(path: &Path, content_type: &str) -> Result<Form, SdkError> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| SdkError::InvalidInput(format!("'{}' has no file name", path.display())))?
        .to_string();

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| SdkError::Io(format!("failed to read '{}': {e}", path.display())))?;

    debug!(file = %file_name, content_type, len = bytes.len(), "prepared upload");

    let part = Part::bytes(bytes).file_name(file_name).mime_str(content_type).map_err(to_sdk)?;
    Ok(Form::new().part(FILE_FIELD, part))
}

//! Uploaded images.

use axum::body::Bytes;
use axum::extract::Multipart;
use tracing::debug;

use crate::error::{ApiError, ApiResult};

/// Form field carrying the images.
pub const IMAGE_FIELD: &str = "image";

/// One file entry under the image field.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Bytes,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Readable stream over the uploaded content.
    pub fn open(&self) -> &[u8] {
        &self.bytes
    }
}

/// Image uploads of one request, in upload order.
#[derive(Debug, Clone, Default)]
pub struct UploadBatch {
    uploads: Vec<Upload>,
}

impl UploadBatch {
    pub fn push(&mut self, upload: Upload) {
        self.uploads.push(upload);
    }

    pub fn len(&self) -> usize {
        self.uploads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uploads.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Upload> {
        self.uploads.iter()
    }

    /// Collect every file under [`IMAGE_FIELD`].
    ///
    /// Fails with `MalformedRequest` when the body cannot be parsed or holds
    /// no parts, `Stream` when a part cannot be read, and `MissingInput` when
    /// no file was sent under the image field. Other fields, and image parts
    /// with an empty file name, are skipped.
    pub async fn from_multipart(mut multipart: Multipart) -> ApiResult<Self> {
        let mut batch = Self::default();
        let mut parts = 0usize;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::malformed(e.body_text()))?
        {
            parts += 1;

            let name = field.name().unwrap_or_default().to_string();
            let file_name = match field.file_name() {
                // An empty file input still sends a part, with `filename=""`
                Some(file_name) if name == IMAGE_FIELD && !file_name.is_empty() => {
                    file_name.to_string()
                }
                _ => {
                    debug!(field = %name, "Skipping non-image form field");
                    continue;
                }
            };

            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::stream(e.body_text()))?;

            debug!(image = %file_name, bytes = bytes.len(), "Received upload");
            batch.push(Upload::new(file_name, bytes));
        }

        if parts == 0 {
            return Err(ApiError::malformed("Expecting multipart form file"));
        }
        if batch.is_empty() {
            return Err(ApiError::MissingInput);
        }

        Ok(batch)
    }
}

impl FromIterator<Upload> for UploadBatch {
    fn from_iter<T: IntoIterator<Item = Upload>>(iter: T) -> Self {
        Self {
            uploads: iter.into_iter().collect(),
        }
    }
}

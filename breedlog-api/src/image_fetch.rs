//! Resolve an image reference to bytes
//!
//! Storage references are read straight from the object store; anything else
//! must be an http(s) URL and is downloaded.

use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;
use crate::storage::{ObjectPath, ObjectStore, StorageError};

/// Image retrieval errors; all surface as upstream failures
#[derive(Debug, Error)]
pub enum ImageFetchError {
    #[error("Image not found: {0}")]
    NotFound(String),

    #[error("Image is empty: {0}")]
    Empty(String),

    #[error("Unsupported image reference: {0}")]
    Unsupported(String),

    #[error("Image download failed: {0}")]
    Network(String),

    #[error("Image download returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<ImageFetchError> for ApiError {
    fn from(err: ImageFetchError) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

/// Fetch the image behind `reference` on behalf of `caller`
///
/// A private object outside the caller's prefix is reported as not found.
pub async fn fetch_image(
    store: &dyn ObjectStore,
    http: &reqwest::Client,
    reference: &str,
    caller: Uuid,
) -> Result<Vec<u8>, ImageFetchError> {
    if let Some(path) = ObjectPath::parse_reference(reference) {
        if !path.readable_by(Some(caller)) {
            return Err(ImageFetchError::NotFound(path.to_string()));
        }
        debug!("Reading image {} from object store", path);
        let bytes = store
            .get(&path)
            .await?
            .ok_or_else(|| ImageFetchError::NotFound(path.to_string()))?;
        return non_empty(bytes, reference);
    }

    let is_http = reference.starts_with("http://") || reference.starts_with("https://");
    if !is_http {
        return Err(ImageFetchError::Unsupported(reference.to_string()));
    }

    debug!("Downloading image {}", reference);
    let response = http
        .get(reference)
        .send()
        .await
        .map_err(|e| ImageFetchError::Network(e.to_string()))?;

    if !response.status().is_success() {
        return Err(ImageFetchError::Status {
            status: response.status().as_u16(),
            url: reference.to_string(),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| ImageFetchError::Network(e.to_string()))?;
    non_empty(bytes.to_vec(), reference)
}

fn non_empty(bytes: Vec<u8>, reference: &str) -> Result<Vec<u8>, ImageFetchError> {
    if bytes.is_empty() {
        return Err(ImageFetchError::Empty(reference.to_string()));
    }
    Ok(bytes)
}

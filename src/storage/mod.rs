pub mod blob;
pub mod traits;

use crate::{
    error::{PopArtError, Result},
    models::PutOptions,
};
use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

pub use blob::BlobStore;
pub use traits::ObjectStore;

pub const IMAGE_FOLDER: &str = "pop-art-images";
pub const IMAGE_CONTENT_TYPE: &str = "image/jpeg";

/// `pop-art-images/<uuid>-<millis>.jpeg`; unique across sessions so uploads
/// never overwrite each other.
pub fn storage_key() -> String {
    format!(
        "{}/{}-{}.jpeg",
        IMAGE_FOLDER,
        Uuid::new_v4(),
        Utc::now().timestamp_millis()
    )
}

/// Decodes standard base64, tolerating a leading `data:<mime>;base64,` header.
pub fn decode_image_data(image_data: &str) -> Result<Vec<u8>> {
    let trimmed = image_data.trim();
    let encoded = match trimmed.split_once(";base64,") {
        Some((header, rest)) if header.starts_with("data:") => rest,
        _ => trimmed,
    };
    let bytes = general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| PopArtError::UpstreamUpload(format!("invalid base64 image data: {}", e)))?;
    if bytes.is_empty() {
        return Err(PopArtError::UpstreamUpload("image data decoded to zero bytes".into()));
    }
    Ok(bytes)
}

/// Decodes client uploads and writes them to the object store.
#[derive(Clone)]
pub struct ImageUploader {
    backend: Arc<dyn ObjectStore>,
}

impl ImageUploader {
    pub fn new(backend: Arc<dyn ObjectStore>) -> Self {
        Self { backend }
    }

    pub fn storage(&self) -> &Arc<dyn ObjectStore> {
        &self.backend
    }

    /// Returns the public URL of the stored image.
    pub async fn upload(&self, image_data: &str, prompt: Option<&str>) -> Result<String> {
        let bytes = decode_image_data(image_data)?;
        let key = storage_key();

        log::info!(
            "Uploading {} bytes as {} (prompt: {:?})",
            bytes.len(),
            key,
            prompt.unwrap_or("")
        );

        let object = self
            .backend
            .put(&key, bytes, &PutOptions::public(IMAGE_CONTENT_TYPE))
            .await?;

        log::info!("Stored image at {}", object.url);
        Ok(object.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_keys_are_namespaced_and_unique() {
        let a = storage_key();
        let b = storage_key();
        assert!(a.starts_with("pop-art-images/"));
        assert!(a.ends_with(".jpeg"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_decode_plain_and_data_url() {
        let encoded = general_purpose::STANDARD.encode(b"\x89PNG");
        assert_eq!(decode_image_data(&encoded).unwrap(), b"\x89PNG");

        let data_url = format!("data:image/png;base64,{}", encoded);
        assert_eq!(decode_image_data(&data_url).unwrap(), b"\x89PNG");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode_image_data("not base64!!").unwrap_err();
        assert!(matches!(err, PopArtError::UpstreamUpload(_)));
    }
}

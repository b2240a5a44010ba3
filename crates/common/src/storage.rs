//! Media storage for uploaded post images.

use std::path::PathBuf;

use base64::{Engine, engine::general_purpose::STANDARD};
use image::ImageFormat;

use crate::{AppError, AppResult, config::MediaConfig};

/// Stored file metadata.
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Storage key, relative to the media root.
    pub key: String,
    /// Size in bytes.
    pub size: u64,
}

/// Storage backend trait.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Store a file under `key`.
    async fn save(&self, key: &str, data: &[u8]) -> AppResult<StoredFile>;

    /// Delete a file. Missing files are not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Get the public URL for a key.
    fn public_url(&self, key: &str) -> String;
}

/// Local filesystem storage backend.
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new local storage backend.
    #[must_use]
    pub const fn new(base_path: PathBuf, base_url: String) -> Self {
        Self {
            base_path,
            base_url,
        }
    }

    /// Create a backend from the media configuration and the public server URL.
    #[must_use]
    pub fn from_config(media: &MediaConfig, server_url: &str) -> Self {
        let base_url = if media.url.starts_with("http://") || media.url.starts_with("https://") {
            media.url.clone()
        } else {
            format!(
                "{}/{}",
                server_url.trim_end_matches('/'),
                media.url.trim_start_matches('/')
            )
        };
        Self::new(media.root.clone(), base_url)
    }
}

#[async_trait::async_trait]
impl StorageBackend for LocalStorage {
    async fn save(&self, key: &str, data: &[u8]) -> AppResult<StoredFile> {
        let path = self.base_path.join(key);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to create directory: {e}")))?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write file: {e}")))?;

        tracing::debug!(key = %key, size = data.len(), "Stored media file");

        Ok(StoredFile {
            key: key.to_string(),
            size: data.len() as u64,
        })
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.base_path.join(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!("Failed to delete file: {e}"))),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }
}

/// A decoded image upload.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Raw image bytes.
    pub data: Vec<u8>,
    /// File extension matching the detected format.
    pub extension: &'static str,
}

/// Decode a `data:image/...;base64,...` URI.
///
/// A bare base64 payload without the `data:` prefix is accepted too. The
/// format is sniffed from the bytes, not taken from the declared MIME type.
pub fn decode_image_data_uri(value: &str) -> AppResult<DecodedImage> {
    let payload = match value.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest
                .split_once(',')
                .ok_or_else(|| AppError::Validation("Malformed data URI".to_string()))?;
            if !header.starts_with("image/") || !header.ends_with(";base64") {
                return Err(AppError::Validation(
                    "Upload a valid base64 encoded image".to_string(),
                ));
            }
            payload
        }
        None => value,
    };

    let data = STANDARD
        .decode(payload.trim())
        .map_err(|_| AppError::Validation("Upload a valid base64 encoded image".to_string()))?;

    let format = image::guess_format(&data).map_err(|_| {
        AppError::Validation(
            "Upload a valid image. The file you uploaded was either not an image or a corrupted image"
                .to_string(),
        )
    })?;

    let extension = match format {
        ImageFormat::Png => "png",
        ImageFormat::Jpeg => "jpg",
        ImageFormat::Gif => "gif",
        ImageFormat::WebP => "webp",
        _ => {
            return Err(AppError::Validation(
                "Unsupported image format".to_string(),
            ));
        }
    };

    Ok(DecodedImage { data, extension })
}

/// Generate a storage key for a post image.
#[must_use]
pub fn post_image_key(extension: &str) -> String {
    format!("posts/{}.{extension}", uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // 1x1 transparent PNG.
    const PNG_1X1: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    #[test]
    fn test_decode_png_data_uri() {
        let decoded = decode_image_data_uri(&format!("data:image/png;base64,{PNG_1X1}")).unwrap();
        assert_eq!(decoded.extension, "png");
        assert!(decoded.data.starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn test_decode_bare_base64() {
        let decoded = decode_image_data_uri(PNG_1X1).unwrap();
        assert_eq!(decoded.extension, "png");
    }

    #[test]
    fn test_rejects_non_image_payload() {
        let text = STANDARD.encode(b"just some text");
        let result = decode_image_data_uri(&format!("data:image/png;base64,{text}"));
        assert!(matches!(result, Err(AppError::Validation(_))));

        let result = decode_image_data_uri("data:text/plain;base64,aGVsbG8=");
        assert!(matches!(result, Err(AppError::Validation(_))));

        let result = decode_image_data_uri("data:image/png;base64,%%%");
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_public_url_joins_base() {
        let storage = LocalStorage::from_config(
            &MediaConfig {
                root: PathBuf::from("./media"),
                url: "/media/".to_string(),
            },
            "https://yatube.example/",
        );
        assert_eq!(
            storage.public_url("posts/a.png"),
            "https://yatube.example/media/posts/a.png"
        );
    }

    #[test]
    fn test_post_image_key() {
        let key = post_image_key("png");
        assert!(key.starts_with("posts/"));
        assert!(key.ends_with(".png"));
    }

    #[tokio::test]
    async fn test_save_and_delete_roundtrip_on_disk() {
        let dir = std::env::temp_dir().join(format!("yatube-media-{}", uuid::Uuid::new_v4()));
        let storage = LocalStorage::new(dir.clone(), "/media".to_string());

        let stored = storage.save("posts/x.png", b"data").await.unwrap();
        assert_eq!(stored.size, 4);
        assert!(dir.join("posts/x.png").exists());

        storage.delete("posts/x.png").await.unwrap();
        assert!(!dir.join("posts/x.png").exists());
        // Deleting again is a no-op.
        storage.delete("posts/x.png").await.unwrap();

        tokio::fs::remove_dir_all(&dir).await.ok();
    }
}

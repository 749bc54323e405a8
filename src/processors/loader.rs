// geotag/src/processors/loader.rs
use crate::core::{GeotagError, ImagePreview, Result};
use crate::utils::{data_url, is_supported_format};
use image::ImageFormat;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where a submitted photo comes from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// A file picked from disk.
    File(PathBuf),
    /// Bytes handed over by a camera capture.
    Capture(Vec<u8>),
}

/// A validated image payload, ready for extraction.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub bytes: Arc<[u8]>,
    pub format: ImageFormat,
    pub preview: ImagePreview,
}

#[derive(Clone)]
pub struct Loader {
    max_file_size: Option<u64>,
}

impl Loader {
    pub fn new() -> Self {
        Self {
            max_file_size: None,
        }
    }

    pub fn with_max_file_size(mut self, max_file_size: Option<u64>) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    pub async fn load(&self, source: ImageSource) -> Result<LoadedImage> {
        match source {
            ImageSource::File(path) => self.load_file(&path).await,
            ImageSource::Capture(bytes) => {
                log::debug!("Loading captured photo ({} bytes)", bytes.len());
                self.load_from_bytes(bytes)
            }
        }
    }

    pub async fn load_file(&self, path: &Path) -> Result<LoadedImage> {
        log::debug!("Loading image from: {}", path.display());

        self.validate_path(path).await?;
        let bytes = tokio::fs::read(path).await?;
        self.load_from_bytes(bytes)
    }

    pub fn load_from_bytes(&self, bytes: Vec<u8>) -> Result<LoadedImage> {
        if bytes.is_empty() {
            return Err(GeotagError::InvalidParameter(
                "Image data is empty".to_string(),
            ));
        }
        self.check_size(bytes.len() as u64)?;

        let format = self.detect_format(&bytes)?;
        let mime_type = format.to_mime_type();
        let preview = ImagePreview {
            mime_type,
            byte_len: bytes.len(),
            data_url: data_url(mime_type, &bytes),
        };

        log::info!("Accepted {} image ({} bytes)", mime_type, bytes.len());

        Ok(LoadedImage {
            bytes: Arc::from(bytes),
            format,
            preview,
        })
    }

    /// Sniffs the container format. Only formats that can carry EXIF are accepted.
    pub fn detect_format(&self, bytes: &[u8]) -> Result<ImageFormat> {
        let format = image::guess_format(bytes).map_err(|_| {
            GeotagError::UnsupportedFormat("unrecognized image data".to_string())
        })?;

        match format {
            ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::WebP | ImageFormat::Tiff => {
                Ok(format)
            }
            other => Err(GeotagError::UnsupportedFormat(format!(
                "{:?} images carry no EXIF metadata",
                other
            ))),
        }
    }

    async fn validate_path(&self, path: &Path) -> Result<()> {
        let metadata = tokio::fs::metadata(path).await.map_err(|_| {
            GeotagError::InvalidParameter(format!("File does not exist: {}", path.display()))
        })?;

        if !metadata.is_file() {
            return Err(GeotagError::InvalidParameter(format!(
                "Not a file: {}",
                path.display()
            )));
        }

        if !is_supported_format(path) {
            return Err(GeotagError::UnsupportedFormat(format!(
                "File type not supported: {}",
                path.display()
            )));
        }

        if metadata.len() == 0 {
            return Err(GeotagError::InvalidParameter(format!(
                "File is empty: {}",
                path.display()
            )));
        }

        self.check_size(metadata.len())
    }

    fn check_size(&self, size: u64) -> Result<()> {
        if let Some(max_size) = self.max_file_size {
            if size > max_size {
                return Err(GeotagError::MemoryLimitExceeded(format!(
                    "File size {} exceeds limit {}",
                    size, max_size
                )));
            }
        }
        Ok(())
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

//! Extraction service. Receipt photo in, normalized bill data out.
//!
//! Coordinates between the filesystem (image), the AI adapter (text) and the normalizer.

use crate::domain::{DomainError, Extraction, ReceiptImage, normalize};
use crate::ports::ExtractionPort;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::{info, warn};

/// Shown when the chosen file is not an image.
pub const NOT_AN_IMAGE: &str = "Please select a valid image file";

/// Default upper bound for receipt photos.
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// MIME type for a receipt photo, from its file extension.
pub fn image_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "tif" | "tiff" => "image/tiff",
        _ => return None,
    };
    Some(mime)
}

/// Read a receipt photo from disk, rejecting non-images and oversized files.
pub async fn load_receipt(path: &Path, max_bytes: usize) -> Result<ReceiptImage, DomainError> {
    if path.as_os_str().is_empty() {
        return Err(DomainError::NoFile);
    }
    let mime_type = image_mime_type(path)
        .ok_or_else(|| DomainError::InvalidImage(NOT_AN_IMAGE.to_string()))?;
    let bytes = fs::read(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => DomainError::NoFile,
        _ => DomainError::InvalidImage(format!("Failed to read {}: {}", path.display(), e)),
    })?;
    if bytes.is_empty() {
        return Err(DomainError::InvalidImage(NOT_AN_IMAGE.to_string()));
    }
    if bytes.len() > max_bytes {
        return Err(DomainError::InvalidImage(format!(
            "Image is too large ({} bytes, limit {})",
            bytes.len(),
            max_bytes
        )));
    }
    Ok(ReceiptImage {
        mime_type: mime_type.to_string(),
        bytes,
    })
}

/// Service for AI-powered receipt extraction.
///
/// Orchestrates the flow:
/// 1. Load and validate the image
/// 2. Send it to the AI adapter
/// 3. Normalize the reply (parse failures become [`Extraction::Unparsed`])
pub struct ExtractionService {
    ai: Arc<dyn ExtractionPort>,
    max_image_bytes: usize,
}

impl ExtractionService {
    pub fn new(ai: Arc<dyn ExtractionPort>, max_image_bytes: usize) -> Self {
        Self {
            ai,
            max_image_bytes,
        }
    }

    /// Load the photo at `path` and extract it.
    pub async fn extract_file(&self, path: &Path) -> Result<Extraction, DomainError> {
        let image = load_receipt(path, self.max_image_bytes).await?;
        info!(path = %path.display(), bytes = image.bytes.len(), "receipt loaded");
        self.extract(&image).await
    }

    /// Only transport and API failures are errors; unreadable replies are `Unparsed`.
    pub async fn extract(&self, image: &ReceiptImage) -> Result<Extraction, DomainError> {
        let text = self.ai.extract_text(image).await.map_err(|e| {
            warn!(error = %e, "receipt extraction failed");
            let detail = match e {
                DomainError::Ai(msg) => msg,
                other => other.to_string(),
            };
            DomainError::Ai(format!("Failed to process bill: {}", detail))
        })?;

        let extraction = normalize(&text);
        match &extraction {
            Extraction::Parsed(bill) => info!(items = bill.items.len(), "receipt extracted"),
            Extraction::Unparsed { .. } => warn!("receipt reply could not be parsed"),
        }
        Ok(extraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAiAdapter;
    use crate::domain::LineItem;

    struct FailingAi;

    #[async_trait::async_trait]
    impl ExtractionPort for FailingAi {
        async fn extract_text(&self, _image: &ReceiptImage) -> Result<String, DomainError> {
            Err(DomainError::Ai("API error 401 Unauthorized".into()))
        }
    }

    fn service(ai: impl ExtractionPort + 'static) -> ExtractionService {
        ExtractionService::new(Arc::new(ai), DEFAULT_MAX_IMAGE_BYTES)
    }

    #[test]
    fn test_image_mime_type() {
        assert_eq!(image_mime_type(Path::new("r.JPG")), Some("image/jpeg"));
        assert_eq!(image_mime_type(Path::new("a/b/r.webp")), Some("image/webp"));
        assert_eq!(image_mime_type(Path::new("r.pdf")), None);
        assert_eq!(image_mime_type(Path::new("receipt")), None);
    }

    #[tokio::test]
    async fn test_extract_file_parses_mock_reply() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipt.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let extraction = service(MockAiAdapter::with_delay(0).with_reply(
            "```json\n{\"items\": [{\"name\": \"Tea\", \"price\": 2.2}], \"currency\": \"EUR\"}\n```",
        ))
        .extract_file(&path)
        .await
        .unwrap();

        let Extraction::Parsed(bill) = extraction else {
            panic!("expected parsed extraction");
        };
        assert_eq!(bill.items, vec![LineItem::new("Tea", "2.2")]);
        assert_eq!(bill.currency.as_deref(), Some("EUR"));
    }

    #[tokio::test]
    async fn test_unparseable_reply_is_not_an_error() {
        let image = ReceiptImage {
            mime_type: "image/png".into(),
            bytes: vec![1],
        };
        let extraction = service(MockAiAdapter::with_delay(0).with_reply("not json"))
            .extract(&image)
            .await
            .unwrap();
        assert_eq!(
            extraction,
            Extraction::Unparsed {
                error: "Could not parse response".into(),
                raw_text: "not json".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_ai_failure_is_reported() {
        let image = ReceiptImage {
            mime_type: "image/png".into(),
            bytes: vec![1],
        };
        let err = service(FailingAi).extract(&image).await.unwrap_err();
        assert!(err.to_string().contains("Failed to process bill"));
    }

    #[tokio::test]
    async fn test_rejects_non_images_and_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("receipt.pdf");
        std::fs::write(&pdf, b"%PDF").unwrap();

        let svc = service(MockAiAdapter::with_delay(0));
        match svc.extract_file(&pdf).await {
            Err(DomainError::InvalidImage(msg)) => assert_eq!(msg, NOT_AN_IMAGE),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            svc.extract_file(&dir.path().join("missing.jpg")).await,
            Err(DomainError::NoFile)
        ));
        assert!(matches!(
            svc.extract_file(Path::new("")).await,
            Err(DomainError::NoFile)
        ));
    }

    #[tokio::test]
    async fn test_rejects_oversized_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.jpg");
        std::fs::write(&path, vec![0u8; 64]).unwrap();
        let svc = ExtractionService::new(Arc::new(MockAiAdapter::with_delay(0)), 16);
        assert!(matches!(
            svc.extract_file(&path).await,
            Err(DomainError::InvalidImage(_))
        ));
    }
}

//! Collaborator service interfaces
//!
//! The hosted generative endpoints sit behind these traits. The library
//! supplies conversational context and reference payloads; it never
//! constructs the provider's wire format itself.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;

use panelforge_session::ApiMessage;

use crate::config::{
    AspectRatio, OutputFormat, MAX_IMAGE_SIZE_MB, MAX_INPUT_IMAGES, SUPPORTED_FILE_EXTENSIONS,
};
use crate::error::{ForgeError, ForgeResult};
use crate::story::Story;

/// A reference image loaded for a generation request
#[derive(Debug, Clone)]
pub struct ReferenceData {
    /// Path the bytes were read from
    pub source: PathBuf,

    /// Raw image bytes
    pub bytes: Vec<u8>,
}

/// One image-generation request
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Conversational context accompanying the request, selected by the
    /// session's context policy
    pub context: Vec<ApiMessage>,

    /// The new prompt
    pub prompt: String,

    /// Reference images for style/character consistency
    pub references: Vec<ReferenceData>,

    /// Requested aspect ratio
    pub aspect_ratio: AspectRatio,
}

/// A generated image returned by the service
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    /// Raw image bytes
    pub bytes: Vec<u8>,

    /// Format of the returned bytes
    pub format: OutputFormat,
}

/// Hosted image-generation endpoint
#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    /// Generate a single image from a prompt plus context
    async fn generate(&self, request: GenerationRequest) -> ForgeResult<GeneratedImage>;
}

/// Hosted story-drafting endpoint
#[async_trait]
pub trait StoryDraftingService: Send + Sync {
    /// Draft a structured story from free-text requirements
    async fn draft(&self, requirements: &str) -> ForgeResult<Story>;
}

/// Outcome of validating reference images before dispatch
#[derive(Debug, Default)]
pub struct ReferenceReport {
    /// Paths that passed every check
    pub valid: Vec<PathBuf>,

    /// Hard failures; any entry here fails the whole set
    pub errors: Vec<String>,

    /// Soft findings, e.g. files near the size limit
    pub warnings: Vec<String>,
}

impl ReferenceReport {
    /// Whether the set may be sent
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

fn has_supported_extension(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    let dotted = format!(".{}", ext.to_ascii_lowercase());
    SUPPORTED_FILE_EXTENSIONS.contains(&dotted.as_str())
}

/// Validate reference images: count, existence, extension, and size
///
/// Checks on-disk facts only; the bytes are never decoded.
pub async fn validate_references(paths: &[PathBuf]) -> ReferenceReport {
    let mut report = ReferenceReport::default();

    if paths.len() > MAX_INPUT_IMAGES {
        report.errors.push(format!(
            "Too many images: {} (max: {})",
            paths.len(),
            MAX_INPUT_IMAGES
        ));
        return report;
    }

    for path in paths {
        let metadata = match fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(_) => {
                report.errors.push(format!("File not found: {}", path.display()));
                continue;
            }
        };

        if !has_supported_extension(path) {
            report.errors.push(format!(
                "Unsupported format: {} (must be PNG, JPEG, or WebP)",
                path.display()
            ));
            continue;
        }

        let size_mb = metadata.len() as f64 / (1024.0 * 1024.0);
        if size_mb > MAX_IMAGE_SIZE_MB {
            report.errors.push(format!(
                "Image too large: {} ({:.2}MB, max: {}MB)",
                path.display(),
                size_mb,
                MAX_IMAGE_SIZE_MB
            ));
            continue;
        } else if size_mb > MAX_IMAGE_SIZE_MB * 0.8 {
            let message = format!("Image near size limit: {} ({:.2}MB)", path.display(), size_mb);
            warn!("{}", message);
            report.warnings.push(message);
        }

        report.valid.push(path.clone());
    }

    report
}

/// Read validated reference images into request payloads
pub async fn load_references(paths: &[PathBuf]) -> ForgeResult<Vec<ReferenceData>> {
    let mut references = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = fs::read(path).await?;
        references.push(ReferenceData {
            source: path.clone(),
            bytes,
        });
    }
    Ok(references)
}

/// Validate and load a reference set in one step
pub async fn prepare_references(paths: &[PathBuf]) -> ForgeResult<Vec<ReferenceData>> {
    if paths.is_empty() {
        return Ok(Vec::new());
    }

    let report = validate_references(paths).await;
    if !report.is_valid() {
        return Err(ForgeError::invalid_input(format!(
            "invalid reference images: {}",
            report.errors.join("; ")
        )));
    }
    load_references(&report.valid).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn write_png(dir: &TempDir, name: &str, len: usize) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, vec![0u8; len]).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_validate_references_ok() {
        let temp = TempDir::new().unwrap();
        let a = write_png(&temp, "a.png", 128).await;
        let b = write_png(&temp, "b.JPG", 128).await;

        let report = validate_references(&[a.clone(), b.clone()]).await;
        assert!(report.is_valid());
        assert_eq!(report.valid, vec![a, b]);
        assert!(report.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_validate_references_too_many() {
        let temp = TempDir::new().unwrap();
        let mut paths = Vec::new();
        for i in 0..=MAX_INPUT_IMAGES {
            paths.push(write_png(&temp, &format!("{}.png", i), 16).await);
        }

        let report = validate_references(&paths).await;
        assert!(!report.is_valid());
        assert!(report.valid.is_empty());
    }

    #[tokio::test]
    async fn test_validate_references_missing_and_bad_format() {
        let temp = TempDir::new().unwrap();
        let good = write_png(&temp, "good.webp", 16).await;
        let bad_ext = write_png(&temp, "notes.txt", 16).await;
        let missing = temp.path().join("missing.png");

        let report = validate_references(&[good.clone(), bad_ext, missing]).await;
        assert!(!report.is_valid());
        assert_eq!(report.errors.len(), 2);
        // Valid entries are still collected so callers can report precisely.
        assert_eq!(report.valid, vec![good]);
    }

    #[tokio::test]
    async fn test_validate_references_near_size_limit() {
        let temp = TempDir::new().unwrap();
        let near = write_png(&temp, "near.png", (6.5 * 1024.0 * 1024.0) as usize).await;

        let report = validate_references(&[near]).await;
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_prepare_references_loads_bytes() {
        let temp = TempDir::new().unwrap();
        let path = write_png(&temp, "ref.png", 64).await;

        let references = prepare_references(&[path.clone()]).await.unwrap();
        assert_eq!(references.len(), 1);
        assert_eq!(references[0].source, path);
        assert_eq!(references[0].bytes.len(), 64);
    }

    #[tokio::test]
    async fn test_prepare_references_rejects_invalid_set() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.png");

        let result = prepare_references(&[missing]).await;
        assert!(matches!(result, Err(ForgeError::InvalidInput(_))));
    }
}

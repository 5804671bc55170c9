//! Image-generation configuration
//!
//! Aspect ratios, output settings, and the technical limits the hosted
//! service imposes on requests.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{ForgeError, ForgeResult};

/// Maximum reference images per request
pub const MAX_INPUT_IMAGES: usize = 3;

/// Maximum size per reference image, in megabytes
pub const MAX_IMAGE_SIZE_MB: f64 = 7.0;

/// Maximum images to generate per prompt
pub const MAX_OUTPUT_IMAGES: u32 = 10;

/// File extensions accepted as reference images
pub const SUPPORTED_FILE_EXTENSIONS: [&str; 4] = [".png", ".jpg", ".jpeg", ".webp"];

/// Default base directory for generated output
pub const DEFAULT_OUTPUT_DIR: &str = "generated";

/// Supported aspect ratios
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "3:2")]
    PhotoLandscape,
    #[serde(rename = "2:3")]
    PhotoPortrait,
    #[serde(rename = "3:4")]
    StandardPortrait,
    #[serde(rename = "4:3")]
    StandardLandscape,
    #[serde(rename = "4:5")]
    NearSquareTall,
    #[serde(rename = "5:4")]
    NearSquareWide,
    #[serde(rename = "9:16")]
    TallPortrait,
    #[serde(rename = "16:9")]
    WideLandscape,
    #[serde(rename = "21:9")]
    UltraWide,
}

impl AspectRatio {
    /// All supported ratios
    pub const ALL: [AspectRatio; 10] = [
        AspectRatio::Square,
        AspectRatio::PhotoLandscape,
        AspectRatio::PhotoPortrait,
        AspectRatio::StandardPortrait,
        AspectRatio::StandardLandscape,
        AspectRatio::NearSquareTall,
        AspectRatio::NearSquareWide,
        AspectRatio::TallPortrait,
        AspectRatio::WideLandscape,
        AspectRatio::UltraWide,
    ];

    /// Ratio string as the service expects it
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::PhotoLandscape => "3:2",
            AspectRatio::PhotoPortrait => "2:3",
            AspectRatio::StandardPortrait => "3:4",
            AspectRatio::StandardLandscape => "4:3",
            AspectRatio::NearSquareTall => "4:5",
            AspectRatio::NearSquareWide => "5:4",
            AspectRatio::TallPortrait => "9:16",
            AspectRatio::WideLandscape => "16:9",
            AspectRatio::UltraWide => "21:9",
        }
    }

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            AspectRatio::Square => "Square",
            AspectRatio::PhotoLandscape => "Photo landscape",
            AspectRatio::PhotoPortrait => "Photo portrait",
            AspectRatio::StandardPortrait => "Standard portrait",
            AspectRatio::StandardLandscape => "Standard landscape",
            AspectRatio::NearSquareTall => "Near square tall",
            AspectRatio::NearSquareWide => "Near square wide",
            AspectRatio::TallPortrait => "Tall portrait",
            AspectRatio::WideLandscape => "Wide landscape",
            AspectRatio::UltraWide => "Ultra wide",
        }
    }

    /// Typical use case
    pub fn use_case(&self) -> &'static str {
        match self {
            AspectRatio::Square => "Social media posts, avatars",
            AspectRatio::PhotoLandscape => "Standard photos",
            AspectRatio::PhotoPortrait => "Portrait photography",
            AspectRatio::StandardPortrait => "Print materials",
            AspectRatio::StandardLandscape => "Presentations",
            AspectRatio::NearSquareTall => "Instagram posts",
            AspectRatio::NearSquareWide => "Computer displays",
            AspectRatio::TallPortrait => "Mobile stories",
            AspectRatio::WideLandscape => "Videos, banners",
            AspectRatio::UltraWide => "Cinematic, panoramas",
        }
    }

    /// One-line description for user-facing listings
    pub fn description(&self) -> String {
        format!("{} - {} ({})", self.as_str(), self.name(), self.use_case())
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        AspectRatio::Square
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AspectRatio::ALL
            .into_iter()
            .find(|ratio| ratio.as_str() == s)
            .ok_or_else(|| {
                ForgeError::invalid_input(format!(
                    "unsupported aspect ratio '{}', expected one of: {}",
                    s,
                    AspectRatio::ALL.map(|r| r.as_str()).join(", ")
                ))
            })
    }
}

/// Output image format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    Jpeg,
    Webp,
}

impl OutputFormat {
    /// File extension, without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Webp => "webp",
        }
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Png
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "jpg" is normalized to jpeg.
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "webp" => Ok(OutputFormat::Webp),
            other => Err(ForgeError::invalid_input(format!(
                "output format must be png, jpeg, or webp, got '{}'",
                other
            ))),
        }
    }
}

/// Configuration for image generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Requested aspect ratio
    pub aspect_ratio: AspectRatio,

    /// Number of images to generate per prompt (1 to 10).
    /// Each image is a separate request to the service.
    pub num_images: u32,

    /// Base directory for outputs
    pub output_dir: PathBuf,

    /// Whether to save reference images alongside outputs
    pub save_references: bool,

    /// Organize output into per-day folders
    pub organize_by_date: bool,

    /// Output image format
    pub output_format: OutputFormat,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: AspectRatio::default(),
            num_images: 1,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            save_references: true,
            organize_by_date: true,
            output_format: OutputFormat::default(),
        }
    }
}

impl ImageConfig {
    /// Create a validated configuration
    pub fn new(aspect_ratio: AspectRatio, num_images: u32) -> ForgeResult<Self> {
        let config = Self {
            aspect_ratio,
            num_images,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration values
    pub fn validate(&self) -> ForgeResult<()> {
        if self.num_images < 1 || self.num_images > MAX_OUTPUT_IMAGES {
            return Err(ForgeError::invalid_input(format!(
                "num_images must be between 1 and {}, got {}",
                MAX_OUTPUT_IMAGES, self.num_images
            )));
        }
        Ok(())
    }

    /// Set the aspect ratio
    pub fn with_aspect_ratio(mut self, ratio: AspectRatio) -> Self {
        self.aspect_ratio = ratio;
        self
    }

    /// Set the output directory
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the output format
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Disable per-day output folders
    pub fn flat_output(mut self) -> Self {
        self.organize_by_date = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio_round_trip() {
        for ratio in AspectRatio::ALL {
            assert_eq!(ratio.as_str().parse::<AspectRatio>().unwrap(), ratio);
        }
        assert!("7:3".parse::<AspectRatio>().is_err());
    }

    #[test]
    fn test_aspect_ratio_serde_wire_string() {
        let json = serde_json::to_string(&AspectRatio::WideLandscape).unwrap();
        assert_eq!(json, "\"16:9\"");

        let parsed: AspectRatio = serde_json::from_str("\"9:16\"").unwrap();
        assert_eq!(parsed, AspectRatio::TallPortrait);
    }

    #[test]
    fn test_aspect_ratio_description() {
        let description = AspectRatio::Square.description();
        assert!(description.starts_with("1:1"));
        assert!(description.contains("Square"));
    }

    #[test]
    fn test_output_format_normalizes_jpg() {
        assert_eq!("jpg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("JPEG".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert!("bmp".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_image_config_validation() {
        assert!(ImageConfig::new(AspectRatio::Square, 1).is_ok());
        assert!(ImageConfig::new(AspectRatio::Square, MAX_OUTPUT_IMAGES).is_ok());
        assert!(ImageConfig::new(AspectRatio::Square, 0).is_err());
        assert!(ImageConfig::new(AspectRatio::Square, MAX_OUTPUT_IMAGES + 1).is_err());
    }
}

//! Transform specifications for derived renditions.

use atelier_error::ValidationError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Largest width or height a rendition may request.
pub const MAX_DIMENSION: u32 = 4096;

/// Output formats a rendition may be encoded to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JPEG, `.jpg` spelling
    #[display("jpg")]
    Jpg,
    /// JPEG
    #[display("jpeg")]
    Jpeg,
    /// PNG
    #[display("png")]
    Png,
    /// WebP (lossless)
    #[display("webp")]
    Webp,
    /// GIF
    #[display("gif")]
    Gif,
    /// TIFF
    #[display("tiff")]
    Tiff,
    /// BMP
    #[display("bmp")]
    Bmp,
}

impl OutputFormat {
    /// Collapse spellings that produce identical output.
    pub fn canonical(self) -> Self {
        match self {
            OutputFormat::Jpg => OutputFormat::Jpeg,
            other => other,
        }
    }

    /// MIME type of encoded output.
    pub fn mimetype(&self) -> &'static str {
        match self {
            OutputFormat::Jpg | OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::Webp => "image/webp",
            OutputFormat::Gif => "image/gif",
            OutputFormat::Tiff => "image/tiff",
            OutputFormat::Bmp => "image/bmp",
        }
    }

    /// Map a source MIME type onto an allowed output format, if any.
    pub fn from_mimetype(mimetype: &str) -> Option<Self> {
        let essence = mimetype.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(OutputFormat::Jpeg),
            "image/png" => Some(OutputFormat::Png),
            "image/webp" => Some(OutputFormat::Webp),
            "image/gif" => Some(OutputFormat::Gif),
            "image/tiff" => Some(OutputFormat::Tiff),
            "image/bmp" | "image/x-ms-bmp" => Some(OutputFormat::Bmp),
            _ => None,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpg" => Ok(OutputFormat::Jpg),
            "jpeg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "webp" => Ok(OutputFormat::Webp),
            "gif" => Ok(OutputFormat::Gif),
            "tiff" => Ok(OutputFormat::Tiff),
            "bmp" => Ok(OutputFormat::Bmp),
            _ => Err(ValidationError::invalid(
                "format",
                format!("'{}' is not one of jpg, jpeg, png, webp, gif, tiff, bmp", s),
            )),
        }
    }
}

/// Resize/crop/format parameters for a rendition.
///
/// - `width` and `height`: exact box; with `crop`, cut the box from the
///   top-left corner without scaling, otherwise stretch.
/// - only one of them: shrink to that bound, preserving aspect ratio. Images
///   already within it are never enlarged.
/// - neither: keep the source dimensions.
/// - no `format`: keep the source format.
///
/// ```
/// use atelier_core::{OutputFormat, TransformSpec};
///
/// let spec = TransformSpec::default().with_width(100).with_format(OutputFormat::Webp);
/// assert!(spec.validate().is_ok());
/// assert!(TransformSpec::default().with_width(5000).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransformSpec {
    /// Target width in pixels
    #[serde(default)]
    pub width: Option<u32>,
    /// Target height in pixels
    #[serde(default)]
    pub height: Option<u32>,
    /// Crop the exact box from the top-left corner (only meaningful with both dimensions)
    #[serde(default)]
    pub crop: bool,
    /// Output format (defaults to the source format)
    #[serde(default)]
    pub format: Option<OutputFormat>,
    /// Encoder quality, 1-100 (used by JPEG)
    #[serde(default = "default_quality")]
    pub quality: u8,
}

fn default_quality() -> u8 {
    80
}

impl Default for TransformSpec {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            crop: false,
            format: None,
            quality: default_quality(),
        }
    }
}

impl TransformSpec {
    /// Set the target width.
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    /// Set the target height.
    pub fn with_height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    /// Enable or disable cropping.
    pub fn with_crop(mut self, crop: bool) -> Self {
        self.crop = crop;
        self
    }

    /// Set the output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Set the encoder quality.
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    /// Check every parameter against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for a zero or oversized dimension or a
    /// quality outside 1-100.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [("width", self.width), ("height", self.height)] {
            match value {
                Some(v) if !(1..=MAX_DIMENSION).contains(&v) => {
                    return Err(ValidationError::out_of_range(
                        field,
                        v as u64,
                        1,
                        MAX_DIMENSION as u64,
                    ));
                }
                _ => {}
            }
        }
        if !(1..=100).contains(&self.quality) {
            return Err(ValidationError::out_of_range(
                "quality",
                self.quality as u64,
                1,
                100,
            ));
        }
        Ok(())
    }

    /// Normalise parameters that cannot affect the output, so equivalent
    /// requests share one cache entry.
    pub fn canonical(self) -> Self {
        let both = self.width.is_some() && self.height.is_some();
        let format = self.format.map(OutputFormat::canonical);
        let lossy = matches!(format, None | Some(OutputFormat::Jpeg));
        Self {
            crop: self.crop && both,
            format,
            quality: if lossy { self.quality } else { default_quality() },
            ..self
        }
    }
}

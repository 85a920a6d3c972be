//! Image transform capability.

use atelier_core::{OutputFormat, TransformSpec};
use atelier_error::{TransformError, TransformErrorKind};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

/// Codec that turns source image bytes into a rendition.
///
/// Implementations are synchronous and CPU-bound; the cache runs them on the
/// blocking pool. Parameters arrive already validated, and `format` is the
/// resolved output format.
pub trait Transformer: Send + Sync + 'static {
    /// Decode `source`, apply `spec`, and encode as `format`.
    ///
    /// # Errors
    ///
    /// Returns a decode error for unreadable input and an encode error if the
    /// output cannot be produced.
    fn transform(
        &self,
        source: &[u8],
        spec: &TransformSpec,
        format: OutputFormat,
    ) -> Result<Vec<u8>, TransformError>;
}

/// [`Transformer`] backed by the `image` crate.
///
/// Output is a pure function of the input bytes and parameters: resampling
/// uses a fixed filter and every encoder is deterministic. WebP output is
/// lossless; quality applies to JPEG only.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageTransformer;

impl ImageTransformer {
    /// Create an image transformer.
    pub fn new() -> Self {
        Self
    }
}

const FILTER: FilterType = FilterType::Lanczos3;

/// Scale `other` by `target / side`, keeping at least one pixel.
fn scaled(other: u32, target: u32, side: u32) -> u32 {
    if side == 0 {
        return target;
    }
    let value = (other as u64 * target as u64 + side as u64 / 2) / side as u64;
    value.clamp(1, u32::MAX as u64) as u32
}

/// Crop the `width` x `height` box anchored at the top-left corner.
///
/// Parts of the box beyond the source are left blank (zeroed pixels).
fn crop_top_left(image: DynamicImage, width: u32, height: u32) -> DynamicImage {
    if width <= image.width() && height <= image.height() {
        return image.crop_imm(0, 0, width, height);
    }
    let mut canvas = DynamicImage::new(width, height, image.color());
    imageops::replace(&mut canvas, &image, 0, 0);
    canvas
}

/// Shrink to fit within `max_width` x `max_height`, keeping the aspect
/// ratio. Images already inside the box are returned untouched.
fn fit_within(image: DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
    let (width, height) = (image.width(), image.height());
    if width <= max_width && height <= max_height {
        return image;
    }
    // Compare max_width / width against max_height / height without floats.
    let (w, h) = if max_width as u64 * height as u64 <= max_height as u64 * width as u64 {
        (max_width, scaled(height, max_width, width).min(max_height))
    } else {
        (scaled(width, max_height, height).min(max_width), max_height)
    };
    image.resize_exact(w, h, FILTER)
}

fn resize(image: DynamicImage, spec: &TransformSpec) -> DynamicImage {
    let (width, height) = (image.width(), image.height());
    match (spec.width, spec.height) {
        (Some(w), Some(h)) if spec.crop => crop_top_left(image, w, h),
        (Some(w), Some(h)) => image.resize_exact(w, h, FILTER),
        (Some(w), None) => fit_within(image, w, height),
        (None, Some(h)) => fit_within(image, width, h),
        (None, None) => image,
    }
}

fn encode(image: &DynamicImage, format: OutputFormat, quality: u8) -> Result<Vec<u8>, TransformError> {
    let encode_err = |e: image::ImageError| {
        TransformError::new(TransformErrorKind::Encode(format!("{}: {}", format, e)))
    };
    let mut out = Cursor::new(Vec::new());

    let target = match format.canonical() {
        OutputFormat::Jpg | OutputFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut out, quality);
            DynamicImage::ImageRgb8(image.to_rgb8())
                .write_with_encoder(encoder)
                .map_err(encode_err)?;
            return Ok(out.into_inner());
        }
        OutputFormat::Png => ImageFormat::Png,
        OutputFormat::Webp => ImageFormat::WebP,
        OutputFormat::Gif => ImageFormat::Gif,
        OutputFormat::Tiff => ImageFormat::Tiff,
        OutputFormat::Bmp => ImageFormat::Bmp,
    };

    // Every remaining encoder accepts 8-bit RGBA.
    DynamicImage::ImageRgba8(image.to_rgba8())
        .write_to(&mut out, target)
        .map_err(encode_err)?;
    Ok(out.into_inner())
}

impl Transformer for ImageTransformer {
    fn transform(
        &self,
        source: &[u8],
        spec: &TransformSpec,
        format: OutputFormat,
    ) -> Result<Vec<u8>, TransformError> {
        let image = image::load_from_memory(source).map_err(|e| {
            TransformError::new(TransformErrorKind::Decode(e.to_string()))
        })?;
        let resized = resize(image, spec);
        tracing::debug!(
            width = resized.width(),
            height = resized.height(),
            format = %format,
            "Encoding rendition"
        );
        encode(&resized, format, spec.quality)
    }
}

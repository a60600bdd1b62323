// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image loading and utility functions for OCR requests

use base64::{
    alphabet,
    engine::{general_purpose::GeneralPurpose, DecodePaddingMode, GeneralPurposeConfig},
    Engine as _,
};
use image::{ColorType, ImageFormat, RgbImage};
use thiserror::Error;

/// Default maximum decoded image size (10MB)
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Standard alphabet, padding optional, tolerant of non-zero trailing bits
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Custom error types for image processing
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image data is too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),

    #[error("Invalid base64 encoding: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Image data is empty")]
    EmptyData,
}

/// Image information extracted during loading
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Detected format
    pub format: ImageFormat,
    /// Color layout before conversion to RGB
    pub source_color: ColorType,
    /// Size in bytes
    pub size_bytes: usize,
}

/// Decode a base64-encoded image into an RGB8 buffer
///
/// Accepts plain base64 or a `data:<mime>;base64,` URL. Whitespace and line
/// breaks inside the payload are ignored and padding is optional.
///
/// # Example
/// ```ignore
/// let (image, info) = decode_base64_image("iVBORw0KGgo...", DEFAULT_MAX_IMAGE_BYTES)?;
/// println!("Image size: {}x{}", info.width, info.height);
/// ```
pub fn decode_base64_image(
    base64_str: &str,
    max_bytes: usize,
) -> Result<(RgbImage, ImageInfo), ImageError> {
    let payload: String = strip_data_url_prefix(base64_str.trim())
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    if payload.is_empty() {
        return Err(ImageError::EmptyData);
    }

    // Every 4 base64 chars carry 3 bytes; reject before allocating the decode buffer
    let estimated = payload.len() / 4 * 3;
    if estimated > max_bytes.saturating_add(3) {
        return Err(ImageError::TooLarge(estimated, max_bytes));
    }

    let bytes = LENIENT_BASE64.decode(payload.as_bytes())?;
    decode_image_bytes(&bytes, max_bytes)
}

/// Decode raw image bytes into an RGB8 buffer
///
/// Alpha, grayscale, palette and 16-bit sources are all converted to 8-bit RGB,
/// the only layout the OCR engine accepts.
pub fn decode_image_bytes(
    bytes: &[u8],
    max_bytes: usize,
) -> Result<(RgbImage, ImageInfo), ImageError> {
    if bytes.len() > max_bytes {
        return Err(ImageError::TooLarge(bytes.len(), max_bytes));
    }

    if bytes.is_empty() {
        return Err(ImageError::EmptyData);
    }

    let format = detect_format(bytes)?;

    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| ImageError::DecodeFailed(e.to_string()))?;

    let info = ImageInfo {
        width: img.width(),
        height: img.height(),
        format,
        source_color: img.color(),
        size_bytes: bytes.len(),
    };

    Ok((img.to_rgb8(), info))
}

/// Detect image format from magic bytes
pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, ImageError> {
    if bytes.len() < 4 {
        return Err(ImageError::UnsupportedFormat);
    }

    match bytes {
        // PNG: 89 50 4E 47 (0x89 P N G)
        [0x89, 0x50, 0x4E, 0x47, ..] => Ok(ImageFormat::Png),

        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Ok(ImageFormat::Jpeg),

        // WebP: RIFF .... WEBP
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Ok(ImageFormat::WebP),

        // GIF: GIF87a or GIF89a
        [0x47, 0x49, 0x46, 0x38, x, ..] if *x == 0x37 || *x == 0x39 => Ok(ImageFormat::Gif),

        // BMP: BM
        [0x42, 0x4D, ..] => Ok(ImageFormat::Bmp),

        // TIFF: II (little-endian) or MM (big-endian)
        [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => Ok(ImageFormat::Tiff),

        _ => Err(ImageError::UnsupportedFormat),
    }
}

/// Get the format extension as a string
pub fn format_to_extension(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "png",
        ImageFormat::Jpeg => "jpg",
        ImageFormat::WebP => "webp",
        ImageFormat::Gif => "gif",
        ImageFormat::Bmp => "bmp",
        ImageFormat::Tiff => "tiff",
        _ => "unknown",
    }
}

fn strip_data_url_prefix(input: &str) -> &str {
    if !input.starts_with("data:") {
        return input;
    }
    match input.find(";base64,") {
        Some(idx) => &input[idx + ";base64,".len()..],
        None => input,
    }
}

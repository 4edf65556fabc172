//! Image size normalization ahead of the transform engine.
//!
//! Inputs arrive as arbitrary browser uploads: palette PNGs, CMYK-ish JPEGs,
//! animated GIFs. [`normalize`] flattens everything to a plain RGB8 frame and
//! caps the larger dimension at the backend's ceiling using Lanczos3
//! resampling. It never upscales — a small image passes through untouched.
//!
//! Decode failures are the caller's problem to classify: the pipeline maps
//! them to request-validation failures, not transform failures.

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("could not decode image: {0}")]
    Undecodable(#[from] image::ImageError),
}

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("could not encode image: {0}")]
    Encode(#[from] image::ImageError),
}

/// Decode raw bytes to RGB8 and downscale so the larger dimension does not
/// exceed `max_dimension`, preserving aspect ratio.
pub fn normalize(bytes: &[u8], max_dimension: u32) -> Result<RgbImage, DecodeError> {
    let decoded = image::load_from_memory(bytes)?;
    let rgb = decoded.into_rgb8();
    let (w, h) = rgb.dimensions();
    if w.max(h) <= max_dimension {
        return Ok(rgb);
    }
    // DynamicImage::resize fits within the bounding square, so the larger
    // dimension lands exactly on the ceiling.
    let scaled =
        DynamicImage::ImageRgb8(rgb).resize(max_dimension, max_dimension, FilterType::Lanczos3);
    Ok(scaled.into_rgb8())
}

/// Encode an RGB8 frame into `format`. JPEG is written at quality 95; other
/// formats use the encoder defaults.
pub fn encode(image: &RgbImage, format: ImageFormat) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    if format == ImageFormat::Jpeg {
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, 95);
        image.write_with_encoder(encoder)?;
    } else {
        DynamicImage::ImageRgb8(image.clone()).write_to(&mut Cursor::new(&mut buf), format)?;
    }
    Ok(buf)
}

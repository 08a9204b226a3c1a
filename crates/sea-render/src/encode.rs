// SPDX-License-Identifier: CEPL-1.0
//! RGBA8 image encoding.
//!
//! Boundary to the `image` crate: takes a tightly packed `width * height`
//! RGBA8 buffer and writes it to a file whose format is picked from the path
//! extension.

use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::RenderSize;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("cannot encode an empty image ({0})")]
    EmptyExtent(RenderSize),

    #[error("pixel buffer is {actual} bytes, {size} RGBA8 needs {expected}")]
    BufferSize {
        size: RenderSize,
        expected: usize,
        actual: usize,
    },

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

pub fn write_rgba8(path: &Path, size: RenderSize, pixels: &[u8]) -> Result<(), EncodeError> {
    if size.is_empty() {
        return Err(EncodeError::EmptyExtent(size));
    }
    let expected = size.rgba8_len();
    if pixels.len() != expected {
        return Err(EncodeError::BufferSize {
            size,
            expected,
            actual: pixels.len(),
        });
    }

    image::save_buffer(path, pixels, size.width, size.height, image::ColorType::Rgba8)?;
    debug!("wrote {} image to {}", size, path.display());
    Ok(())
}

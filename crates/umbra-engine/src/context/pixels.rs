use thiserror::Error;

use crate::consts;

/// Unpack-side pixel storage state of a context.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PixelStore {
    /// `UNPACK_FLIP_Y_WEBGL`: rows are copied bottom-up.
    pub flip_y: bool,
    /// `UNPACK_PREMULTIPLY_ALPHA_WEBGL`. Recorded only.
    pub premultiply_alpha: bool,
    /// `UNPACK_COLORSPACE_CONVERSION_WEBGL`. Recorded only.
    pub colorspace_conversion: u32,
    /// `UNPACK_ALIGNMENT`: one of 1, 2, 4, 8.
    alignment: u32,
}

impl Default for PixelStore {
    fn default() -> Self {
        Self {
            flip_y: false,
            premultiply_alpha: false,
            colorspace_conversion: consts::BROWSER_DEFAULT_WEBGL,
            alignment: 4,
        }
    }
}

impl PixelStore {
    pub fn alignment(&self) -> u32 {
        self.alignment
    }

    /// Sets the row alignment; returns `false` (and keeps the old value) for
    /// anything but 1, 2, 4 or 8.
    pub fn set_alignment(&mut self, alignment: u32) -> bool {
        if matches!(alignment, 1 | 2 | 4 | 8) {
            self.alignment = alignment;
            true
        } else {
            false
        }
    }

    /// Builder-style variant of [`PixelStore::set_alignment`] for tests and
    /// callers holding a snapshot.
    pub fn with_alignment(mut self, alignment: u32) -> Self {
        self.set_alignment(alignment);
        self
    }

    pub fn with_flip_y(mut self, flip_y: bool) -> Self {
        self.flip_y = flip_y;
        self
    }
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum UnpackError {
    #[error("pixel source holds {actual} bytes, {expected} required")]
    SourceTooShort { expected: usize, actual: usize },

    #[error("pixel rectangle {width}x{height} is too large")]
    TooLarge { width: u32, height: u32 },
}

/// Components per pixel for `format`. Unknown formats count as RGBA.
pub fn channel_count(format: u32) -> usize {
    match format {
        consts::ALPHA | consts::LUMINANCE => 1,
        consts::LUMINANCE_ALPHA => 2,
        consts::RGB => 3,
        consts::RGBA => 4,
        _ => 4,
    }
}

/// Bytes per pixel: packed 16-bit types are 2 bytes, anything else one byte
/// per channel.
pub fn bytes_per_pixel(ty: u32, format: u32) -> usize {
    match ty {
        consts::UNSIGNED_SHORT_5_6_5
        | consts::UNSIGNED_SHORT_4_4_4_4
        | consts::UNSIGNED_SHORT_5_5_5_1 => 2,
        _ => channel_count(format),
    }
}

/// Copies a tightly packed client image into the row layout the driver
/// expects under `store`.
///
/// Output rows are `row_size` rounded up to the alignment; padding bytes are
/// zero. With `flip_y`, output row `j` comes from source row `height - 1 - j`.
pub fn unpack_pixels(
    store: &PixelStore,
    ty: u32,
    format: u32,
    width: u32,
    height: u32,
    src: &[u8],
) -> Result<Vec<u8>, UnpackError> {
    let too_large = || UnpackError::TooLarge { width, height };
    let rows = height as usize;

    let row_size = bytes_per_pixel(ty, format)
        .checked_mul(width as usize)
        .ok_or_else(too_large)?;
    let aligned_row_size = row_size
        .checked_next_multiple_of(store.alignment as usize)
        .ok_or_else(too_large)?;
    let out_len = aligned_row_size.checked_mul(rows).ok_or_else(too_large)?;

    let expected = row_size.checked_mul(rows).ok_or_else(too_large)?;
    if src.len() < expected {
        return Err(UnpackError::SourceTooShort {
            expected,
            actual: src.len(),
        });
    }

    let mut out = vec![0u8; out_len];
    if row_size == 0 {
        return Ok(out);
    }

    for (j, dst) in out.chunks_exact_mut(aligned_row_size).enumerate() {
        let src_row = if store.flip_y { rows - 1 - j } else { j };
        let start = src_row * row_size;
        dst[..row_size].copy_from_slice(&src[start..start + row_size]);
    }

    Ok(out)
}

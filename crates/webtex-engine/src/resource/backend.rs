use thiserror::Error;

use crate::coords::{PixelRect, PixelSize};
use crate::import::{DmaBufImport, SharedHandleImport};

use super::{TextureDesc, TextureId};

/// Failure reported by the graphics API after an otherwise valid call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DriverError {
    #[error("{call} failed with error 0x{code:x}")]
    Api { call: &'static str, code: u32 },

    #[error("upload needs {required} source bytes but only {available} are available")]
    InvalidUpload { required: usize, available: usize },

    #[error("upload region {region:?} does not fit a {size:?} texture")]
    OutOfBounds { region: PixelRect, size: PixelSize },

    #[error("unknown texture {0:?}")]
    UnknownTexture(TextureId),
}

/// One sub-region upload.
///
/// `region` is the destination in texture pixels. The source pixel for the
/// region's top-left corner sits at `data[offset..]`, and consecutive source
/// rows are `bytes_per_row` apart (the "row length" of the source image times
/// four). Pixels are 4 bytes, blue-green-red-alpha.
#[derive(Debug, Clone, Copy)]
pub struct TextureWrite<'a> {
    pub region: PixelRect,
    pub data: &'a [u8],
    pub offset: usize,
    pub bytes_per_row: u32,
}

impl<'a> TextureWrite<'a> {
    /// Upload of a whole tightly packed image.
    pub fn full(size: PixelSize, data: &'a [u8]) -> Self {
        Self {
            region: size.bounds(),
            data,
            offset: 0,
            bytes_per_row: size.width.saturating_mul(4),
        }
    }

    /// Upload of `src` (a rectangle inside a source image `row_length` pixels
    /// wide) to `dst_x, dst_y`.
    pub fn from_source(
        data: &'a [u8],
        row_length: u32,
        src: PixelRect,
        dst_x: i32,
        dst_y: i32,
    ) -> Self {
        let offset = (src.y.max(0) as usize * row_length as usize + src.x.max(0) as usize) * 4;
        Self {
            region: PixelRect::new(dst_x, dst_y, src.width, src.height),
            data,
            offset,
            bytes_per_row: row_length.saturating_mul(4),
        }
    }

    /// Source bytes the write reads, counted from the start of `data`.
    pub fn required_len(&self) -> usize {
        if self.region.is_empty() {
            return self.offset;
        }
        let rows = self.region.height as usize;
        let row_bytes = self.region.width as usize * 4;
        self.offset + (rows - 1) * self.bytes_per_row as usize + row_bytes
    }

    /// Checks the write against the source slice and the destination texture.
    pub fn validate(&self, texture: PixelSize) -> Result<(), DriverError> {
        let fits = !self.region.is_empty()
            && texture.bounds().intersect(self.region) == Some(self.region);
        if !fits {
            return Err(DriverError::OutOfBounds {
                region: self.region,
                size: texture,
            });
        }

        let required = self.required_len();
        if required > self.data.len() || (self.bytes_per_row as usize) < self.region.width as usize * 4 {
            return Err(DriverError::InvalidUpload {
                required,
                available: self.data.len(),
            });
        }
        Ok(())
    }
}

/// The host graphics API as seen by the paint core.
///
/// All methods are called on the render thread only. Implementations keep
/// their own handle tables and take `&self` like the underlying APIs do.
pub trait GraphicsBackend {
    /// Allocates a 4-byte-per-pixel texture the CPU can write into.
    fn create_texture(&self, desc: &TextureDesc<'_>) -> Result<TextureId, DriverError>;

    /// Copies one region of CPU pixels into a texture.
    fn write_texture(&self, texture: TextureId, write: &TextureWrite<'_>) -> Result<(), DriverError>;

    /// Releases a texture created by this backend or by one of its import
    /// capabilities. Unknown ids are ignored.
    fn destroy_texture(&self, texture: TextureId);

    /// Shared-texture-handle import (Direct3D 11 handles through
    /// `EXT_memory_object_win32`), if the host context supports it.
    fn shared_handles(&self) -> Option<&dyn SharedHandleImport> {
        None
    }

    /// DMA-buffer import (`EGL_EXT_image_dma_buf_import`), if the host
    /// context supports it.
    fn dma_buf(&self) -> Option<&dyn DmaBufImport> {
        None
    }
}

/// Host-side lookup from a texture identifier to the texture it samples.
pub trait HostTextureRegistry {
    /// Binds `name` to `texture`, replacing any previous binding.
    fn register(&self, name: &str, texture: TextureId);

    /// Removes the binding for `name`.
    fn release(&self, name: &str);
}

use crate::coords::PixelSize;

/// Opaque texture handle issued by a [`super::GraphicsBackend`].
///
/// The value is only meaningful to the backend that created it (a GL name,
/// a slot in a wgpu texture table, ...).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(u64);

impl TextureId {
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Channel order the host sees when it samples the texture.
///
/// `Bgra` means red and blue arrive swapped and the host must pick a
/// swizzling sampler or shader path.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum PixelOrder {
    #[default]
    Rgba,
    Bgra,
}

impl PixelOrder {
    #[inline]
    pub fn is_bgra(self) -> bool {
        self == PixelOrder::Bgra
    }
}

/// Which paint path produced a texture.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TextureKind {
    /// Filled from CPU pixel buffers.
    Software,
    /// Imported zero-copy from another process's GPU memory.
    Accelerated,
}

/// Parameters for a CPU-writable texture.
#[derive(Debug, Clone, Copy)]
pub struct TextureDesc<'a> {
    pub label: &'a str,
    pub size: PixelSize,
}

/// A live GPU texture owned by one renderer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FrameTexture {
    pub id: TextureId,
    pub size: PixelSize,
    pub order: PixelOrder,
    pub kind: TextureKind,
}

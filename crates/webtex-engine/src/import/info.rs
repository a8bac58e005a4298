use crate::coords::PixelSize;

/// Pixel layout the browser engine reports for a frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ColorType {
    Rgba8888,
    Bgra8888,
}

impl ColorType {
    pub const RAW_RGBA_8888: i32 = 0;
    pub const RAW_BGRA_8888: i32 = 1;

    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            Self::RAW_RGBA_8888 => Some(Self::Rgba8888),
            Self::RAW_BGRA_8888 => Some(Self::Bgra8888),
            _ => None,
        }
    }
}

/// Windows: a Direct3D 11 texture shared by handle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedTextureInfo {
    pub format: i32,
    pub width: u32,
    pub height: u32,
    /// `HANDLE` that can be opened with `OpenSharedResource`; zero is invalid.
    pub shared_texture_handle: u64,
}

/// Linux: an image backed by DMA-buffer planes.
///
/// The per-plane lists are parallel and may be shorter than `plane_count`
/// when the browser engine reports inconsistent data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DmaBufInfo {
    pub format: i32,
    pub width: u32,
    pub height: u32,
    pub plane_count: u32,
    pub fds: Vec<i32>,
    /// Bytes per row.
    pub strides: Vec<u32>,
    pub offsets: Vec<u64>,
    pub sizes: Vec<u64>,
    /// DRM format modifier shared by all planes.
    pub modifier: u64,
}

impl DmaBufInfo {
    pub fn has_planes(&self) -> bool {
        self.plane_count > 0
            && !self.fds.is_empty()
            && !self.strides.is_empty()
            && !self.offsets.is_empty()
    }
}

/// macOS: an `IOSurface`. Declared so the variant can be recognized and
/// refused; no import path exists for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IoSurfaceInfo {
    pub format: i32,
    pub width: u32,
    pub height: u32,
    pub io_surface_handle: u64,
}

/// Platform paint record delivered with an accelerated paint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceleratedPaintInfo {
    SharedTexture(SharedTextureInfo),
    DmaBuf(DmaBufInfo),
    IoSurface(IoSurfaceInfo),
}

impl AcceleratedPaintInfo {
    pub fn size(&self) -> PixelSize {
        match self {
            Self::SharedTexture(i) => PixelSize::new(i.width, i.height),
            Self::DmaBuf(i) => PixelSize::new(i.width, i.height),
            Self::IoSurface(i) => PixelSize::new(i.width, i.height),
        }
    }

    pub fn format(&self) -> i32 {
        match self {
            Self::SharedTexture(i) => i.format,
            Self::DmaBuf(i) => i.format,
            Self::IoSurface(i) => i.format,
        }
    }
}

//! Zero-copy import of the browser engine's GPU frames.
//!
//! Two platform paths exist:
//! - a Direct3D 11 shared texture handle imported through a GL memory object
//! - a set of DMA-buffer planes imported as an EGL image
//!
//! Both produce an ordinary [`FrameTexture`]. Every transient object created
//! on the way (memory objects, EGL images, half-initialized textures) is held
//! by a guard and released before the import returns, on success and on
//! every error path.

mod dmabuf;
mod error;
mod info;
mod shared_handle;
mod support;

pub use dmabuf::{
    build_attributes, drm_format_for, egl, fourcc, DmaBufImport, EglCapabilities, EglDisplay,
    EglImage, DRM_FORMAT_ABGR8888, DRM_FORMAT_ARGB8888, MAX_PLANES,
};
pub use error::ImportError;
pub use info::{AcceleratedPaintInfo, ColorType, DmaBufInfo, IoSurfaceInfo, SharedTextureInfo};
pub use shared_handle::{
    shared_handle_size, MemoryObject, SharedHandleImport, BYTES_PER_PIXEL,
    SHARED_HANDLE_SIZE_MULTIPLIER,
};
pub use support::{
    acceleration_support, evaluate, AccelerationSupport, HostCapabilities, DMABUF_RENDERER_ENV,
};

use crate::coords::PixelSize;
use crate::dispatch::RenderMode;
use crate::resource::{FrameTexture, GraphicsBackend, ResourceLifecycle};

/// Result of a successful import.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ImportedTexture {
    pub texture: FrameTexture,
    /// Accelerated mode the texture puts the renderer in.
    pub mode: RenderMode,
}

/// Imports one accelerated frame of `size`.
///
/// Must run on the render thread with the host graphics context current. The
/// returned texture is not installed yet; on error nothing created here
/// survives and the caller keeps its previous texture.
pub fn import_texture<B: GraphicsBackend>(
    lifecycle: &ResourceLifecycle<B>,
    info: &AcceleratedPaintInfo,
    size: PixelSize,
) -> Result<ImportedTexture, ImportError> {
    lifecycle.render_thread().assert_current();

    match info {
        AcceleratedPaintInfo::SharedTexture(win) => {
            let texture = shared_handle::import(lifecycle, win, size)?;
            Ok(ImportedTexture {
                texture,
                mode: RenderMode::SharedTexture,
            })
        }
        AcceleratedPaintInfo::DmaBuf(linux) => {
            let texture = dmabuf::import(lifecycle, linux, size)?;
            Ok(ImportedTexture {
                texture,
                mode: RenderMode::DmaBuf,
            })
        }
        AcceleratedPaintInfo::IoSurface(_) => Err(ImportError::UnsupportedPlatform("macOS IOSurface")),
    }
}

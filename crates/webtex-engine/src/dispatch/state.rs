use crate::coords::PixelSize;
use crate::resource::PixelOrder;

/// Which path owns the current texture of a surface.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum RenderMode {
    #[default]
    Uninitialized,
    /// CPU pixel buffers uploaded by the software painter.
    Software,
    /// Direct3D 11 shared handle imported through a GL memory object.
    SharedTexture,
    /// DMA-buffer planes imported as an EGL image.
    DmaBuf,
}

impl RenderMode {
    #[inline]
    pub fn is_accelerated(self) -> bool {
        matches!(self, Self::SharedTexture | Self::DmaBuf)
    }
}

/// Per-surface renderer state.
///
/// Only the dispatcher writes it, and only after a paint has fully
/// succeeded, so readers never see a half-switched mode.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct RendererState {
    pub mode: RenderMode,
    /// Size of the current texture.
    pub size: PixelSize,
    pub order: PixelOrder,
    pub has_ever_painted: bool,
}

impl RendererState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Records a successful paint.
    pub(crate) fn painted(&mut self, mode: RenderMode, size: PixelSize, order: PixelOrder) {
        self.mode = mode;
        self.size = size;
        self.order = order;
        self.has_ever_painted = true;
    }
}

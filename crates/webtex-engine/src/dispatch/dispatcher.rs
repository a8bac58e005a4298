use std::collections::HashSet;

use crate::coords::{PixelRect, PixelSize};
use crate::device::RenderThread;
use crate::import::{import_texture, AcceleratedPaintInfo};
use crate::paint::{PopupOverlay, SoftwarePainter, SoftwareUpdate};
use crate::resource::{
    FrameTexture, GraphicsBackend, HostTextureRegistry, PixelOrder, ResourceLifecycle, TextureKind,
};

use super::{PaintError, RenderMode, RendererState, StaleReason, SurfaceInit, UnsupportedReason};

/// Layer a paint event targets.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PaintLayer {
    /// The page itself.
    Base,
    /// A dropdown or context menu drawn over the page.
    Popup,
}

/// What a successful paint did.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PaintOutcome {
    /// A new software texture now backs the surface.
    Reallocated,
    /// The existing texture was updated in place.
    Updated,
    /// A new accelerated texture now backs the surface.
    Imported(RenderMode),
}

/// One browser surface: receives paint events and owns the texture the host
/// samples.
///
/// Must be created, used and dropped on the render thread. Dropping it
/// performs [`PaintDispatcher::close`].
pub struct PaintDispatcher<B: GraphicsBackend> {
    lifecycle: ResourceLifecycle<B>,
    painter: SoftwarePainter,
    state: RendererState,
    transparent: bool,

    /// Unsupported configurations already reported for this surface.
    warned: HashSet<UnsupportedReason>,
}

impl<B: GraphicsBackend> PaintDispatcher<B> {
    /// Creates a surface bound to the calling thread.
    pub fn new(
        backend: B,
        registry: impl HostTextureRegistry + 'static,
        init: SurfaceInit,
    ) -> Self {
        let render_thread = RenderThread::current();
        let identifier = init.next_identifier();
        log::debug!(
            "PaintDispatcher: created surface {identifier} (transparent={})",
            init.transparent
        );

        Self {
            lifecycle: ResourceLifecycle::new(
                render_thread,
                backend,
                Box::new(registry),
                identifier,
                init.label,
            ),
            painter: SoftwarePainter::new(),
            state: RendererState::default(),
            transparent: init.transparent,
            warned: HashSet::new(),
        }
    }

    /// Handles a CPU pixel buffer from the browser engine.
    ///
    /// `buffer` is `size.width * size.height * 4` bytes, blue-green-red-alpha.
    /// For [`PaintLayer::Popup`] the dirty rectangles are relative to the popup.
    pub fn on_software_paint(
        &mut self,
        layer: PaintLayer,
        dirty: &[PixelRect],
        buffer: &[u8],
        size: PixelSize,
    ) -> Result<PaintOutcome, PaintError> {
        self.lifecycle.render_thread().assert_current();

        if dirty.is_empty() {
            return Err(self.report(PaintError::Stale(StaleReason::NoDirtyRegions)));
        }

        match layer {
            PaintLayer::Popup => {
                let painted = self
                    .painter
                    .paint_popup(&self.lifecycle, buffer, dirty, size);
                painted.map_err(|e| self.report(e))?;
                Ok(PaintOutcome::Updated)
            }
            PaintLayer::Base => {
                let painted = self
                    .painter
                    .paint_base(&mut self.lifecycle, buffer, dirty, size);
                let update = painted.map_err(|e| self.report(e))?;

                if self.lifecycle.texture(TextureKind::Accelerated).is_some() {
                    log::debug!("PaintDispatcher: {} back to software paint", self.identifier());
                    self.lifecycle.retire(TextureKind::Accelerated);
                }
                self.state.painted(RenderMode::Software, size, PixelOrder::Rgba);

                Ok(match update {
                    SoftwareUpdate::Reallocated => PaintOutcome::Reallocated,
                    SoftwareUpdate::Updated => PaintOutcome::Updated,
                })
            }
        }
    }

    /// Handles a platform shared-texture paint from the browser engine.
    ///
    /// The host graphics context must be current.
    pub fn on_accelerated_paint(
        &mut self,
        layer: PaintLayer,
        dirty: &[PixelRect],
        info: &AcceleratedPaintInfo,
    ) -> Result<PaintOutcome, PaintError> {
        self.lifecycle.render_thread().assert_current();

        let Some(first) = dirty.first().copied() else {
            return Err(self.report(PaintError::Stale(StaleReason::NoDirtyRegions)));
        };

        let size = info.size();
        if size.width <= 1 || size.height <= 1 || first.width <= 1 || first.height <= 1 {
            return Err(self.report(PaintError::Stale(StaleReason::TransitionalFrame)));
        }

        // No base frame exists at a new size, so only a full update is usable.
        if size != self.state.size && first != size.bounds() {
            return Err(self.report(PaintError::Stale(StaleReason::PartialAfterResize)));
        }

        if layer == PaintLayer::Popup {
            return Err(self.report(PaintError::Unsupported(UnsupportedReason::AcceleratedPopup)));
        }

        let imported = import_texture(&self.lifecycle, info, size)
            .map_err(|e| self.report(PaintError::from(e)))?;

        self.lifecycle.install(imported.texture);
        self.lifecycle.retire(TextureKind::Software);
        self.state
            .painted(imported.mode, size, imported.texture.order);

        log::trace!(
            "PaintDispatcher: {} imported {:?} {}x{}",
            self.identifier(),
            imported.mode,
            size.width,
            size.height
        );
        Ok(PaintOutcome::Imported(imported.mode))
    }

    pub fn on_popup_show(&mut self, visible: bool) {
        self.lifecycle.render_thread().assert_current();
        log::debug!("PaintDispatcher: popup visible={visible}");
        self.painter.popup_mut().show(visible);
    }

    pub fn on_popup_resize(&mut self, bounds: PixelRect) {
        self.lifecycle.render_thread().assert_current();
        log::debug!("PaintDispatcher: popup bounds {bounds:?}");
        self.painter.popup_mut().resize(bounds);
    }

    /// Texture the host should sample this frame.
    pub fn current_texture(&self) -> Option<FrameTexture> {
        let kind = match self.state.mode {
            RenderMode::Uninitialized => return None,
            RenderMode::Software => TextureKind::Software,
            RenderMode::SharedTexture | RenderMode::DmaBuf => TextureKind::Accelerated,
        };
        self.lifecycle.texture(kind).copied()
    }

    /// True once a texture exists and the host identifier points at it.
    pub fn is_ready(&self) -> bool {
        match (self.current_texture(), self.lifecycle.registered()) {
            (Some(current), Some(registered)) => current.id == registered.id,
            _ => false,
        }
    }

    pub fn is_accelerated(&self) -> bool {
        self.state.mode.is_accelerated()
    }

    /// Whether red and blue arrive swapped and the host must pick the
    /// swizzling sampling path.
    pub fn is_bgra_order(&self) -> bool {
        self.state.order.is_bgra()
    }

    pub fn mode(&self) -> RenderMode {
        self.state.mode
    }

    pub fn state(&self) -> &RendererState {
        &self.state
    }

    /// Size of the current texture; zero before the first paint.
    pub fn texture_size(&self) -> PixelSize {
        self.state.size
    }

    pub fn is_unpainted(&self) -> bool {
        !self.state.has_ever_painted
    }

    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    /// Host texture identifier, `<namespace>:browser_<n>`.
    pub fn identifier(&self) -> &str {
        self.lifecycle.identifier()
    }

    pub fn popup(&self) -> &PopupOverlay {
        self.painter.popup()
    }

    pub fn backend(&self) -> &B {
        self.lifecycle.backend()
    }

    /// Frees every texture, releases the host identifier and forgets the
    /// popup. Idempotent. Later paints start from
    /// [`RenderMode::Uninitialized`] again.
    pub fn close(&mut self) {
        self.lifecycle.render_thread().assert_current();

        let was = self.state.mode;
        self.lifecycle.close_all(&mut self.state);
        self.painter.popup_mut().reset();

        if was != RenderMode::Uninitialized {
            log::debug!("PaintDispatcher: closed {} (was {was:?})", self.identifier());
        }
    }

    /// Logs a failed paint at the level its class calls for.
    fn report(&mut self, err: PaintError) -> PaintError {
        match &err {
            PaintError::Stale(reason) => {
                log::trace!("PaintDispatcher: dropping stale paint ({reason:?})");
            }
            PaintError::Unsupported(reason) => {
                if self.warned.insert(*reason) {
                    log::warn!("PaintDispatcher: {reason} is not supported, ignoring");
                }
            }
            PaintError::Driver(e) => {
                log::error!("PaintDispatcher: keeping previous frame after driver error: {e}");
            }
            PaintError::Import(_) | PaintError::BufferTooSmall { .. } => {
                log::debug!("PaintDispatcher: keeping previous frame: {err}");
            }
        }
        err
    }
}

impl<B: GraphicsBackend> Drop for PaintDispatcher<B> {
    fn drop(&mut self) {
        self.close();
    }
}

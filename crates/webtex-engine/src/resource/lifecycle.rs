use std::ops::Deref;

use crate::coords::PixelSize;
use crate::device::RenderThread;
use crate::dispatch::RendererState;

use super::{
    DriverError, FrameTexture, GraphicsBackend, HostTextureRegistry, PixelOrder, TextureDesc,
    TextureKind,
};

/// A texture that exists on the GPU but is not owned by a renderer yet.
///
/// Dropping it frees the texture. [`PendingTexture::commit`] hands ownership
/// to the caller, normally straight into [`ResourceLifecycle::install`].
pub struct PendingTexture<'a, B: GraphicsBackend + ?Sized> {
    backend: &'a B,
    texture: FrameTexture,
    armed: bool,
}

impl<'a, B: GraphicsBackend + ?Sized> PendingTexture<'a, B> {
    pub(crate) fn new(backend: &'a B, texture: FrameTexture) -> Self {
        Self {
            backend,
            texture,
            armed: true,
        }
    }

    /// Disarms the guard and returns the texture.
    pub fn commit(mut self) -> FrameTexture {
        self.armed = false;
        self.texture
    }
}

impl<B: GraphicsBackend + ?Sized> Deref for PendingTexture<'_, B> {
    type Target = FrameTexture;

    fn deref(&self) -> &FrameTexture {
        &self.texture
    }
}

impl<B: GraphicsBackend + ?Sized> Drop for PendingTexture<'_, B> {
    fn drop(&mut self) {
        if self.armed {
            log::debug!(
                "ResourceLifecycle: discarding unused texture {:?}",
                self.texture.id
            );
            self.backend.destroy_texture(self.texture.id);
        }
    }
}

/// Owns every texture of one browser surface.
///
/// Holds at most one texture per [`TextureKind`]. A replacement is installed
/// before its predecessor is freed, so a failed allocation never leaves the
/// surface without a texture.
pub struct ResourceLifecycle<B: GraphicsBackend> {
    render_thread: RenderThread,
    backend: B,
    registry: Box<dyn HostTextureRegistry>,

    /// Host identifier the current texture is registered under.
    identifier: String,
    /// Debug label prefix for allocated textures.
    label: String,

    software: Option<FrameTexture>,
    accelerated: Option<FrameTexture>,

    /// Texture the host identifier currently points at.
    registered: Option<FrameTexture>,
}

impl<B: GraphicsBackend> ResourceLifecycle<B> {
    pub fn new(
        render_thread: RenderThread,
        backend: B,
        registry: Box<dyn HostTextureRegistry>,
        identifier: String,
        label: String,
    ) -> Self {
        Self {
            render_thread,
            backend,
            registry,
            identifier,
            label,
            software: None,
            accelerated: None,
            registered: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn render_thread(&self) -> RenderThread {
        self.render_thread
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Live texture of `kind`, if any.
    pub fn texture(&self, kind: TextureKind) -> Option<&FrameTexture> {
        match kind {
            TextureKind::Software => self.software.as_ref(),
            TextureKind::Accelerated => self.accelerated.as_ref(),
        }
    }

    /// Texture the host identifier is bound to.
    pub fn registered(&self) -> Option<&FrameTexture> {
        self.registered.as_ref()
    }

    /// Creates a new texture of `size`. It is freed again unless committed.
    pub fn allocate(
        &self,
        kind: TextureKind,
        size: PixelSize,
    ) -> Result<PendingTexture<'_, B>, DriverError> {
        self.render_thread.assert_current();

        let label = format!("{} {}x{}", self.label, size.width, size.height);
        let id = self.backend.create_texture(&TextureDesc {
            label: &label,
            size,
        })?;

        log::debug!("ResourceLifecycle: allocated {kind:?} texture {id:?} ({label})");

        Ok(PendingTexture::new(
            &self.backend,
            FrameTexture {
                id,
                size,
                order: PixelOrder::Rgba,
                kind,
            },
        ))
    }

    /// Wraps a texture created outside [`Self::allocate`] (an import) so it is
    /// freed on every early return.
    pub fn adopt(&self, texture: FrameTexture) -> PendingTexture<'_, B> {
        PendingTexture::new(&self.backend, texture)
    }

    /// Makes `texture` the live texture of its kind and points the host
    /// identifier at it. The texture it replaces is freed afterwards.
    pub fn install(&mut self, texture: FrameTexture) {
        self.render_thread.assert_current();

        let slot = match texture.kind {
            TextureKind::Software => &mut self.software,
            TextureKind::Accelerated => &mut self.accelerated,
        };
        let previous = slot.replace(texture);

        if self.registered.map(|t| t.id) != Some(texture.id) {
            self.registry.register(&self.identifier, texture.id);
            self.registered = Some(texture);
        }

        if let Some(previous) = previous {
            if previous.id != texture.id {
                self.free(previous);
            }
        }
    }

    /// Frees the live texture of `kind`, if any.
    pub fn retire(&mut self, kind: TextureKind) {
        self.render_thread.assert_current();

        let taken = match kind {
            TextureKind::Software => self.software.take(),
            TextureKind::Accelerated => self.accelerated.take(),
        };

        if let Some(texture) = taken {
            if self.registered.map(|t| t.id) == Some(texture.id) {
                self.registry.release(&self.identifier);
                self.registered = None;
            }
            self.free(texture);
        }
    }

    /// Releases one texture on the GPU.
    pub fn free(&self, texture: FrameTexture) {
        self.render_thread.assert_current();
        log::debug!(
            "ResourceLifecycle: freeing {:?} texture {:?} ({}x{})",
            texture.kind,
            texture.id,
            texture.size.width,
            texture.size.height
        );
        self.backend.destroy_texture(texture.id);
    }

    /// Frees everything this surface owns and resets `state`.
    ///
    /// Idempotent: a second call finds nothing to free.
    pub fn close_all(&mut self, state: &mut RendererState) {
        self.render_thread.assert_current();

        if let Some(texture) = self.software.take() {
            self.free(texture);
        }
        if let Some(texture) = self.accelerated.take() {
            self.free(texture);
        }
        if self.registered.take().is_some() {
            self.registry.release(&self.identifier);
            log::debug!("ResourceLifecycle: released host identifier {}", self.identifier);
        }

        state.reset();
    }
}

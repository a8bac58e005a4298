use crate::coords::{PixelRect, PixelSize};
use crate::dispatch::{PaintError, StaleReason};
use crate::resource::{
    DriverError, FrameTexture, GraphicsBackend, ResourceLifecycle, TextureKind, TextureWrite,
};

use super::PopupOverlay;

/// What a base-layer software paint did to the texture.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SoftwareUpdate {
    /// A new texture was allocated and filled with the whole buffer.
    Reallocated,
    /// The existing texture was patched in place.
    Updated,
}

/// Uploads CPU pixel buffers into the surface's software texture.
///
/// Buffers are tightly packed, 4 bytes per pixel, blue-green-red-alpha, in
/// the layout the browser engine paints them.
#[derive(Debug, Default)]
pub struct SoftwarePainter {
    popup: PopupOverlay,
}

impl SoftwarePainter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn popup(&self) -> &PopupOverlay {
        &self.popup
    }

    pub fn popup_mut(&mut self) -> &mut PopupOverlay {
        &mut self.popup
    }

    /// Paints the base layer.
    ///
    /// A missing texture or a size change reallocates and uploads the whole
    /// buffer in one write. Otherwise every dirty rectangle is clipped to the
    /// frame and uploaded on its own, then the popup overlay is composited.
    /// The new texture replaces the old one only once it is filled.
    pub fn paint_base<B: GraphicsBackend>(
        &mut self,
        lifecycle: &mut ResourceLifecycle<B>,
        buffer: &[u8],
        dirty: &[PixelRect],
        size: PixelSize,
    ) -> Result<SoftwareUpdate, PaintError> {
        lifecycle.render_thread().assert_current();

        if size.is_empty() {
            return Err(PaintError::Stale(StaleReason::EmptyFrame));
        }
        check_buffer(buffer, size)?;

        match lifecycle.texture(TextureKind::Software).copied() {
            Some(texture) if texture.size == size => {
                update_regions(lifecycle, texture, buffer, dirty)?;
                self.composite_popup(lifecycle, texture)?;
                Ok(SoftwareUpdate::Updated)
            }
            previous => {
                let pending = lifecycle.allocate(TextureKind::Software, size)?;
                lifecycle
                    .backend()
                    .write_texture(pending.id, &TextureWrite::full(size, buffer))?;
                let texture = pending.commit();
                lifecycle.install(texture);

                log::debug!(
                    "SoftwarePainter: reallocated texture {:?} -> {}x{}",
                    previous.map(|t| t.size),
                    size.width,
                    size.height
                );

                // The full upload already covered whatever a hidden popup left behind.
                if !self.popup.is_visible() && self.popup.drawn_once() {
                    self.popup.consume();
                }
                Ok(SoftwareUpdate::Reallocated)
            }
        }
    }

    /// Paints the popup layer into the base texture at the popup's bounds and
    /// keeps a private copy of the touched bytes. `dirty` is relative to the
    /// popup; `size` is the popup buffer's extent.
    pub fn paint_popup<B: GraphicsBackend>(
        &mut self,
        lifecycle: &ResourceLifecycle<B>,
        buffer: &[u8],
        dirty: &[PixelRect],
        size: PixelSize,
    ) -> Result<(), PaintError> {
        lifecycle.render_thread().assert_current();

        let Some(texture) = lifecycle.texture(TextureKind::Software).copied() else {
            return Err(PaintError::Stale(StaleReason::NoBaseTexture));
        };
        let Some(bounds) = self.popup.bounds() else {
            return Err(PaintError::Stale(StaleReason::NoPopupBounds));
        };
        if size.is_empty() {
            return Err(PaintError::Stale(StaleReason::EmptyFrame));
        }
        check_buffer(buffer, size)?;

        let source = size.bounds();
        let frame = texture.size.bounds();
        let mut touched = Vec::with_capacity(dirty.len());

        for rect in dirty {
            let Some(local) = source.intersect(*rect) else {
                continue;
            };
            touched.push(local);

            let Some(dst) = frame.intersect(local.translate(bounds.x, bounds.y)) else {
                continue;
            };
            let src = relative_to(dst, bounds);
            let write = TextureWrite::from_source(buffer, size.width, src, dst.x, dst.y);
            lifecycle.backend().write_texture(texture.id, &write)?;
        }

        self.retain(buffer, size, bounds, &touched);
        self.popup.mark_drawn();
        Ok(())
    }

    /// Copies the bytes spanned by the bounding box of `touched` into the
    /// popup's backing buffer.
    fn retain(&mut self, buffer: &[u8], size: PixelSize, bounds: PixelRect, touched: &[PixelRect]) {
        let Some(bbox) = PixelRect::bounding(touched.iter().copied()) else {
            return;
        };
        if size.width != bounds.width as u32 {
            log::warn!(
                "SoftwarePainter: popup buffer is {}px wide but bounds are {bounds:?}, content not retained",
                size.width
            );
            return;
        }
        let Some(backing) = self.popup.backing_mut() else {
            return;
        };

        // bbox lies inside the popup buffer, so every coordinate is >= 0.
        let row = size.width as usize;
        let start = (bbox.y as usize * row + bbox.x as usize) * 4;
        let end = ((bbox.bottom() as usize - 1) * row + bbox.right() as usize) * 4;
        let end = end.min(backing.len()).min(buffer.len());

        if start < end {
            backing[start..end].copy_from_slice(&buffer[start..end]);
        }
    }

    fn composite_popup<B: GraphicsBackend>(
        &mut self,
        lifecycle: &ResourceLifecycle<B>,
        texture: FrameTexture,
    ) -> Result<(), DriverError> {
        let popup = &mut self.popup;
        if !popup.is_visible() && !popup.drawn_once() {
            return Ok(());
        }
        let Some(bounds) = popup.bounds() else {
            return Ok(());
        };

        if !popup.is_visible() {
            // One last composite of the hidden popup, then it is gone.
            let result = match popup.backing() {
                Some(backing) => blit_backing(lifecycle, texture, bounds, backing),
                None => Ok(()),
            };
            popup.consume();
            log::trace!("SoftwarePainter: consumed hidden popup at {bounds:?}");
            result
        } else if popup.drawn_once() {
            match popup.backing() {
                Some(backing) => blit_backing(lifecycle, texture, bounds, backing),
                None => Ok(()),
            }
        } else {
            Ok(())
        }
    }
}

fn check_buffer(buffer: &[u8], size: PixelSize) -> Result<(), PaintError> {
    let required = size.byte_len();
    if buffer.len() < required {
        log::warn!(
            "SoftwarePainter: {}x{} frame needs {required} bytes, buffer has {}",
            size.width,
            size.height,
            buffer.len()
        );
        return Err(PaintError::BufferTooSmall {
            required,
            available: buffer.len(),
        });
    }
    Ok(())
}

fn update_regions<B: GraphicsBackend>(
    lifecycle: &ResourceLifecycle<B>,
    texture: FrameTexture,
    buffer: &[u8],
    dirty: &[PixelRect],
) -> Result<(), DriverError> {
    let frame = texture.size.bounds();
    for rect in dirty {
        let Some(clipped) = frame.intersect(*rect) else {
            log::trace!("SoftwarePainter: dirty rect {rect:?} outside frame");
            continue;
        };
        let write = TextureWrite::from_source(buffer, texture.size.width, clipped, clipped.x, clipped.y);
        lifecycle.backend().write_texture(texture.id, &write)?;
    }
    Ok(())
}

/// Draws the retained popup pixels at `bounds`, clipped to the texture.
fn blit_backing<B: GraphicsBackend>(
    lifecycle: &ResourceLifecycle<B>,
    texture: FrameTexture,
    bounds: PixelRect,
    backing: &[u8],
) -> Result<(), DriverError> {
    let Some(dst) = texture.size.bounds().intersect(bounds) else {
        return Ok(());
    };
    let src = relative_to(dst, bounds);
    let write = TextureWrite::from_source(backing, bounds.width as u32, src, dst.x, dst.y);
    lifecycle.backend().write_texture(texture.id, &write)
}

/// `rect` expressed relative to `origin`'s top-left corner. `rect` must lie
/// inside `origin`.
fn relative_to(rect: PixelRect, origin: PixelRect) -> PixelRect {
    PixelRect::new(
        (rect.x as i64 - origin.x as i64) as i32,
        (rect.y as i64 - origin.y as i64) as i32,
        rect.width,
        rect.height,
    )
}

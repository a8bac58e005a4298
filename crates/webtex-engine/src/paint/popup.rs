use crate::coords::PixelRect;

/// Largest popup edge accepted from the browser engine.
pub const MAX_POPUP_EXTENT: i32 = 16_384;

/// A dropdown or context menu drawn over the base frame.
///
/// The popup layer's source buffer is only valid during its own paint call,
/// so the overlay keeps a private copy (`backing`) that later base-layer
/// paints re-composite from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopupOverlay {
    visible: bool,
    /// Position in base-frame pixels.
    bounds: Option<PixelRect>,
    /// `bounds.width * bounds.height * 4` bytes, row-major, no padding.
    backing: Option<Vec<u8>>,
    drawn_once: bool,
}

impl PopupOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn bounds(&self) -> Option<PixelRect> {
        self.bounds
    }

    pub fn backing(&self) -> Option<&[u8]> {
        self.backing.as_deref()
    }

    /// Whether popup content reached the base texture since it was last
    /// consumed.
    pub fn drawn_once(&self) -> bool {
        self.drawn_once
    }

    /// Shows or hides the popup. Hiding keeps the content: the next base
    /// paint draws it one final time and then drops it.
    pub fn show(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Records new bounds and reallocates the backing buffer to match. The
    /// fresh backing is not composited until the next popup paint. Returns
    /// `false` (leaving the overlay unchanged) for bounds that are empty or
    /// exceed [`MAX_POPUP_EXTENT`].
    pub fn resize(&mut self, bounds: PixelRect) -> bool {
        if bounds.is_empty() || bounds.width > MAX_POPUP_EXTENT || bounds.height > MAX_POPUP_EXTENT {
            log::warn!("PopupOverlay: ignoring popup bounds {bounds:?}");
            return false;
        }

        self.bounds = Some(bounds);
        self.backing = Some(vec![0; bounds.size().byte_len()]);
        self.drawn_once = false;
        true
    }

    pub(crate) fn backing_mut(&mut self) -> Option<&mut Vec<u8>> {
        self.backing.as_mut()
    }

    pub(crate) fn mark_drawn(&mut self) {
        self.drawn_once = true;
    }

    /// Drops the retained content after its last composite.
    pub(crate) fn consume(&mut self) {
        self.bounds = None;
        self.backing = None;
        self.drawn_once = false;
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

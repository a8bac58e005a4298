//! Software paint path.
//!
//! This module is responsible for:
//! - keeping a CPU-sourced texture in sync with the browser's pixel buffers
//! - choosing between a full reallocation and per-rectangle sub-uploads
//! - compositing the popup overlay over the base frame

mod popup;
mod software;

pub use popup::{PopupOverlay, MAX_POPUP_EXTENT};
pub use software::{SoftwarePainter, SoftwareUpdate};

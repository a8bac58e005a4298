//! Integer pixel geometry used by the paint paths.
//!
//! Canonical space:
//! - Physical pixels of the browser frame
//! - Origin top-left
//! - +X right, +Y down

mod rect;

pub use rect::{PixelRect, PixelSize};

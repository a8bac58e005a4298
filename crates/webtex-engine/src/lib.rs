//! Webtex engine crate.
//!
//! Turns the paint output of an off-screen rendered browser into a texture the
//! host renderer can sample every frame. CPU pixel buffers are uploaded by the
//! software painter; platform shared textures are imported zero-copy by the
//! accelerated importer. The paint dispatcher decides which of the two owns
//! the current frame.

pub mod coords;
pub mod device;
pub mod dispatch;
pub mod import;
pub mod logging;
pub mod paint;
pub mod platform;
pub mod resource;

#[cfg(test)]
mod testing;

pub use dispatch::{PaintDispatcher, PaintError, PaintLayer, PaintOutcome, RenderMode, SurfaceInit};

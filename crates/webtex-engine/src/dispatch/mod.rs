//! Paint event dispatch.
//!
//! This module is responsible for:
//! - filtering stale and unsupported paint events from the browser engine
//! - routing base-layer paints to the software painter or the importer
//! - the per-surface render mode and the texture the host samples
//!
//! Every entry point leaves the surface on its previous frame when it fails.

mod config;
mod dispatcher;
mod error;
mod state;

pub use config::SurfaceInit;
pub use dispatcher::{PaintDispatcher, PaintLayer, PaintOutcome};
pub use error::{ErrorKind, PaintError, StaleReason, UnsupportedReason};
pub use state::{RenderMode, RendererState};

//! GPU device ownership and the render-thread contract.
//!
//! This module is responsible for:
//! - creating a headless wgpu Instance/Adapter/Device/Queue for hosts that do
//!   not bring their own
//! - the wgpu implementation of [`crate::resource::GraphicsBackend`]
//! - asserting that GPU-touching calls stay on the render thread

mod context;
mod init;
mod thread;
mod wgpu_backend;

pub use context::Gpu;
pub use init::GpuInit;
pub use thread::RenderThread;
pub use wgpu_backend::{WgpuBackend, TEXTURE_FORMAT};

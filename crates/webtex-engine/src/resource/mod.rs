//! GPU texture ownership.
//!
//! The lifecycle manager is the only place that frees textures and the only
//! place that touches the host's texture-identifier registry. Every texture
//! created during a paint is wrapped in a [`PendingTexture`] until it is
//! installed, so early returns never leak GPU memory.

mod backend;
mod lifecycle;
mod registry;
mod texture;

pub use backend::{DriverError, GraphicsBackend, HostTextureRegistry, TextureWrite};
pub use lifecycle::{PendingTexture, ResourceLifecycle};
pub use registry::TextureTable;
pub use texture::{FrameTexture, PixelOrder, TextureDesc, TextureId, TextureKind};

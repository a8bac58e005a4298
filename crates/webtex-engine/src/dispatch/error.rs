use thiserror::Error;

use crate::import::ImportError;
use crate::resource::DriverError;

/// Coarse failure class of a paint event.
///
/// No class is fatal: the surface keeps showing its last good frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Nothing to do, or a transitional signal from the browser engine.
    StaleEvent,
    /// Malformed or unusable import data.
    ImportRejected,
    /// The graphics API refused an otherwise valid call.
    DriverError,
    /// A paint the embedding cannot handle on this configuration.
    UnsupportedConfiguration,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StaleReason {
    NoDirtyRegions,
    /// Frame or first dirty rectangle is at most one pixel wide or high.
    TransitionalFrame,
    /// Partial accelerated update right after a size change.
    PartialAfterResize,
    /// Popup paint without a software base texture to draw into.
    NoBaseTexture,
    /// Popup paint before the popup announced its bounds.
    NoPopupBounds,
    EmptyFrame,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum UnsupportedReason {
    AcceleratedPopup,
    /// Paint info of a platform without an import path.
    PaintInfo(&'static str),
    /// The host context lacks an import capability.
    MissingCapability(&'static str),
}

impl std::fmt::Display for UnsupportedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AcceleratedPopup => f.write_str("accelerated paint of the popup layer"),
            Self::PaintInfo(name) => write!(f, "{name} accelerated paint"),
            Self::MissingCapability(name) => write!(f, "accelerated paint without {name}"),
        }
    }
}

/// Why a paint event left the surface unchanged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PaintError {
    #[error("stale paint event ({0:?})")]
    Stale(StaleReason),

    #[error("accelerated import failed: {0}")]
    Import(ImportError),

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error("{0} is not supported")]
    Unsupported(UnsupportedReason),

    #[error("paint buffer holds {available} bytes, frame needs {required}")]
    BufferTooSmall { required: usize, available: usize },
}

impl PaintError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Stale(_) => ErrorKind::StaleEvent,
            Self::Import(e) => e.kind(),
            Self::Driver(_) => ErrorKind::DriverError,
            Self::Unsupported(_) => ErrorKind::UnsupportedConfiguration,
            Self::BufferTooSmall { .. } => ErrorKind::ImportRejected,
        }
    }
}

impl From<ImportError> for PaintError {
    fn from(e: ImportError) -> Self {
        match e {
            ImportError::UnsupportedPlatform(name) => {
                Self::Unsupported(UnsupportedReason::PaintInfo(name))
            }
            ImportError::MissingCapability(name) => {
                Self::Unsupported(UnsupportedReason::MissingCapability(name))
            }
            other => Self::Import(other),
        }
    }
}

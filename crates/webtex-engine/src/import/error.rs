use thiserror::Error;

use crate::dispatch::ErrorKind;
use crate::resource::DriverError;

/// Why an accelerated import produced no texture.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ImportError {
    #[error("shared texture handle is zero")]
    ZeroHandle,

    #[error("no dmabuf planes available")]
    NoPlanes,

    #[error("unsupported accelerated paint format {0}")]
    UnsupportedFormat(i32),

    #[error("dmabuf plane {plane} offset {offset} does not fit an EGL attribute")]
    OffsetTooLarge { plane: usize, offset: u64 },

    #[error("dmabuf plane {plane} stride {stride} does not fit an EGL attribute")]
    StrideTooLarge { plane: usize, stride: u32 },

    #[error("frame size {width}x{height} does not fit an EGL attribute")]
    DimensionTooLarge { width: u32, height: u32 },

    #[error("EGL display is not available")]
    NoDisplay,

    #[error("no EGL context is current on the render thread")]
    NoCurrentContext,

    #[error("graphics context lacks {0}")]
    MissingCapability(&'static str),

    #[error("failed to create memory object for shared texture")]
    MemoryObjectCreation,

    #[error("eglCreateImageKHR failed with EGL error 0x{egl_error:x}")]
    ImageCreation { egl_error: i32 },

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error("{0} accelerated paint is not supported")]
    UnsupportedPlatform(&'static str),
}

impl ImportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MemoryObjectCreation | Self::ImageCreation { .. } | Self::Driver(_) => {
                ErrorKind::DriverError
            }
            Self::UnsupportedPlatform(_) | Self::MissingCapability(_) => {
                ErrorKind::UnsupportedConfiguration
            }
            _ => ErrorKind::ImportRejected,
        }
    }
}

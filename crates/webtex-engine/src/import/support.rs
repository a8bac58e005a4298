use state::InitCell;

use crate::platform::Platform;

/// Environment switch that disables the browser engine's dmabuf renderer.
pub const DMABUF_RENDERER_ENV: &str = "WEBKIT_DISABLE_DMABUF_RENDERER";

/// What the host graphics context offers, probed once on the render thread.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostCapabilities {
    pub platform: Option<Platform>,

    /// `GL_VENDOR` / `GL_RENDERER`.
    pub gl_vendor: String,
    pub gl_renderer: String,

    pub gl_memory_object: bool,
    pub gl_memory_object_win32: bool,
    /// `glImportMemoryWin32HandleEXT` resolved.
    pub gl_import_entry_point: bool,

    pub egl_display: bool,
    pub egl_current_context: bool,
    pub egl_dma_buf_import: bool,
    pub egl_image_base: bool,

    pub dmabuf_renderer_disabled: bool,
}

impl HostCapabilities {
    pub fn dmabuf_renderer_disabled_from_env() -> bool {
        std::env::var(DMABUF_RENDERER_ENV).is_ok_and(|v| v == "1")
    }
}

/// Whether accelerated paint should be requested from the browser engine.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AccelerationSupport {
    pub supported: bool,
    /// Works, but on hardware with known rough edges.
    pub beta: bool,
}

impl AccelerationSupport {
    pub const UNSUPPORTED: Self = Self {
        supported: false,
        beta: false,
    };
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum GpuVendor {
    Nvidia,
    Amd,
    Other,
}

fn gpu_vendor(caps: &HostCapabilities) -> GpuVendor {
    let vendor = caps.gl_vendor.to_lowercase();
    let renderer = caps.gl_renderer.to_lowercase();

    if vendor.contains("nvidia") || renderer.contains("geforce") || renderer.contains("quadro") {
        GpuVendor::Nvidia
    } else if vendor.contains("amd") || renderer.contains("radeon") {
        GpuVendor::Amd
    } else {
        GpuVendor::Other
    }
}

fn evaluate_windows(caps: &HostCapabilities) -> AccelerationSupport {
    let vendor = gpu_vendor(caps);
    if vendor == GpuVendor::Other {
        log::info!(
            "AccelerationSupport: GPU '{}' / '{}' is not supported, using software paint",
            caps.gl_vendor,
            caps.gl_renderer
        );
        return AccelerationSupport::UNSUPPORTED;
    }

    let missing = [
        (caps.gl_memory_object, "GL_EXT_memory_object"),
        (caps.gl_memory_object_win32, "GL_EXT_memory_object_win32"),
        (caps.gl_import_entry_point, "glImportMemoryWin32HandleEXT"),
    ]
    .into_iter()
    .find(|(present, _)| !present);

    if let Some((_, name)) = missing {
        log::info!("AccelerationSupport: {name} unavailable, using software paint");
        return AccelerationSupport::UNSUPPORTED;
    }

    AccelerationSupport {
        supported: true,
        beta: vendor == GpuVendor::Amd,
    }
}

fn evaluate_linux(caps: &HostCapabilities) -> AccelerationSupport {
    if caps.dmabuf_renderer_disabled {
        log::info!("AccelerationSupport: {DMABUF_RENDERER_ENV}=1, using software paint");
        return AccelerationSupport::UNSUPPORTED;
    }

    let missing = [
        (caps.egl_display, "EGL display"),
        (caps.egl_current_context, "current EGL context"),
        (caps.egl_dma_buf_import, "EGL_EXT_image_dma_buf_import"),
        (caps.egl_image_base, "EGL_KHR_image_base"),
    ]
    .into_iter()
    .find(|(present, _)| !present);

    match missing {
        Some((_, name)) => {
            log::info!("AccelerationSupport: {name} unavailable, using software paint");
            AccelerationSupport::UNSUPPORTED
        }
        None => AccelerationSupport {
            supported: true,
            beta: false,
        },
    }
}

/// Decides acceleration support for one set of capabilities. Pure.
pub fn evaluate(caps: &HostCapabilities) -> AccelerationSupport {
    match caps.platform {
        Some(p) if p.is_windows() => evaluate_windows(caps),
        Some(p) if p.is_linux() => evaluate_linux(caps),
        Some(p) => {
            log::info!(
                "AccelerationSupport: no accelerated import on {}, using software paint",
                p.normalized_name()
            );
            AccelerationSupport::UNSUPPORTED
        }
        None => AccelerationSupport::UNSUPPORTED,
    }
}

static SUPPORT: InitCell<AccelerationSupport> = InitCell::new();

/// Process-wide acceleration support.
///
/// `probe` runs on the first call only, so it should be issued from the
/// render thread with the host context current. Later calls from any thread
/// return the cached answer until the process exits.
pub fn acceleration_support(probe: impl FnOnce() -> HostCapabilities) -> AccelerationSupport {
    *SUPPORT.get_or_init(|| {
        let support = evaluate(&probe());
        log::info!(
            "AccelerationSupport: supported={} beta={}",
            support.supported,
            support.beta
        );
        support
    })
}

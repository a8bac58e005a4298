use crate::coords::PixelSize;
use crate::resource::{
    DriverError, FrameTexture, GraphicsBackend, PixelOrder, ResourceLifecycle, TextureId,
    TextureKind,
};

use super::{ColorType, DmaBufInfo, ImportError};

/// EGL enum values used in the dmabuf attribute list.
pub mod egl {
    pub const NONE: i32 = 0x3038;
    pub const HEIGHT: i32 = 0x3056;
    pub const WIDTH: i32 = 0x3057;

    /// `EGL_LINUX_DMA_BUF_EXT`, the `eglCreateImageKHR` target.
    pub const LINUX_DMA_BUF: u32 = 0x3270;
    pub const LINUX_DRM_FOURCC: i32 = 0x3271;

    pub const PLANE_FD: [i32; 3] = [0x3272, 0x3275, 0x3278];
    pub const PLANE_OFFSET: [i32; 3] = [0x3273, 0x3276, 0x3279];
    pub const PLANE_PITCH: [i32; 3] = [0x3274, 0x3277, 0x327A];
    pub const PLANE_MODIFIER_LO: [i32; 3] = [0x3443, 0x3445, 0x3447];
    pub const PLANE_MODIFIER_HI: [i32; 3] = [0x3444, 0x3446, 0x3448];
}

/// Plane attribute slots available in the attribute list.
pub const MAX_PLANES: usize = egl::PLANE_FD.len();

pub const fn fourcc(a: u8, b: u8, c: u8, d: u8) -> u32 {
    (a as u32) | ((b as u32) << 8) | ((c as u32) << 16) | ((d as u32) << 24)
}

pub const DRM_FORMAT_ARGB8888: u32 = fourcc(b'A', b'R', b'2', b'4');
pub const DRM_FORMAT_ABGR8888: u32 = fourcc(b'A', b'B', b'2', b'4');

/// DRM fourcc for a browser color type. Little-endian DRM names list
/// channels from the most significant byte, hence the reversal.
pub fn drm_format_for(color: ColorType) -> u32 {
    match color {
        ColorType::Rgba8888 => DRM_FORMAT_ABGR8888,
        ColorType::Bgra8888 => DRM_FORMAT_ARGB8888,
    }
}

/// `EGLDisplay` handle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct EglDisplay(pub u64);

/// `EGLImageKHR` handle. Never zero.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct EglImage(pub u64);

/// Display extensions relevant to dmabuf import.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct EglCapabilities {
    pub dma_buf_import: bool,
    pub dma_buf_import_modifiers: bool,
    pub image_base: bool,
}

/// EGL + `EXT_EGL_image_storage` entry points of the host context.
pub trait DmaBufImport {
    /// The initialized display of the current context, cached by the host.
    fn display(&self) -> Option<EglDisplay>;

    /// Whether an EGL context is current on the calling thread.
    fn has_current_context(&self) -> bool;

    fn capabilities(&self) -> EglCapabilities;

    /// `eglCreateImageKHR(display, EGL_NO_CONTEXT, EGL_LINUX_DMA_BUF_EXT,
    /// NULL, attribs)`; `None` when the call returned `EGL_NO_IMAGE_KHR`.
    /// `attribs` is terminated by `EGL_NONE`.
    fn create_image(&self, display: EglDisplay, attribs: &[i32]) -> Option<EglImage>;

    /// `eglGetError`.
    fn last_error(&self) -> i32;

    /// New texture whose storage is `image` (`glEGLImageTargetTexStorageEXT`).
    /// On error nothing created by the call remains.
    fn create_texture_from_image(
        &self,
        image: EglImage,
        size: PixelSize,
    ) -> Result<TextureId, DriverError>;

    /// `eglDestroyImageKHR`.
    fn destroy_image(&self, display: EglDisplay, image: EglImage);
}

/// Destroys the image when dropped.
struct ImageGuard<'a> {
    api: &'a dyn DmaBufImport,
    display: EglDisplay,
    image: EglImage,
}

impl Drop for ImageGuard<'_> {
    fn drop(&mut self) {
        self.api.destroy_image(self.display, self.image);
    }
}

/// Number of planes that can be described: the reported count, bounded by
/// the attribute slots and by every per-plane list.
fn usable_planes(info: &DmaBufInfo) -> usize {
    (info.plane_count as usize)
        .min(MAX_PLANES)
        .min(info.fds.len())
        .min(info.strides.len())
        .min(info.offsets.len())
}

/// Builds the `EGL_NONE`-terminated attribute list for `eglCreateImageKHR`.
///
/// `planes` is clamped to what `info` can describe. Offsets and strides must
/// fit a signed 32-bit `EGLint`.
pub fn build_attributes(
    info: &DmaBufInfo,
    size: PixelSize,
    drm_format: u32,
    planes: usize,
    use_modifiers: bool,
) -> Result<Vec<i32>, ImportError> {
    let (Ok(width), Ok(height)) = (i32::try_from(size.width), i32::try_from(size.height)) else {
        return Err(ImportError::DimensionTooLarge {
            width: size.width,
            height: size.height,
        });
    };

    let planes = planes.min(usable_planes(info));
    let per_plane = if use_modifiers { 10 } else { 6 };
    let mut attribs = Vec::with_capacity(6 + planes * per_plane + 1);
    attribs.extend_from_slice(&[
        egl::WIDTH,
        width,
        egl::HEIGHT,
        height,
        egl::LINUX_DRM_FOURCC,
        drm_format as i32,
    ]);

    let modifier_lo = (info.modifier & 0xffff_ffff) as u32 as i32;
    let modifier_hi = (info.modifier >> 32) as u32 as i32;

    for plane in 0..planes {
        let offset = info.offsets[plane];
        let Ok(offset) = i32::try_from(offset) else {
            log::error!("DmaBufImporter: plane {plane} offset too large for EGL attributes: {offset}");
            return Err(ImportError::OffsetTooLarge { plane, offset });
        };
        let stride = info.strides[plane];
        let Ok(stride) = i32::try_from(stride) else {
            log::error!("DmaBufImporter: plane {plane} stride too large for EGL attributes: {stride}");
            return Err(ImportError::StrideTooLarge { plane, stride });
        };

        attribs.extend_from_slice(&[
            egl::PLANE_FD[plane],
            info.fds[plane],
            egl::PLANE_OFFSET[plane],
            offset,
            egl::PLANE_PITCH[plane],
            stride,
        ]);

        if use_modifiers {
            attribs.extend_from_slice(&[
                egl::PLANE_MODIFIER_LO[plane],
                modifier_lo,
                egl::PLANE_MODIFIER_HI[plane],
                modifier_hi,
            ]);
        }
    }

    attribs.push(egl::NONE);
    Ok(attribs)
}

pub(super) fn import<B: GraphicsBackend>(
    lifecycle: &ResourceLifecycle<B>,
    info: &DmaBufInfo,
    size: PixelSize,
) -> Result<FrameTexture, ImportError> {
    if !info.has_planes() {
        log::warn!("DmaBufImporter: accelerated paint info has no dmabuf planes");
        return Err(ImportError::NoPlanes);
    }

    let api = lifecycle
        .backend()
        .dma_buf()
        .ok_or(ImportError::MissingCapability("EGL_EXT_image_dma_buf_import"))?;

    let Some(display) = api.display() else {
        log::error!("DmaBufImporter: EGL display is not available for dmabuf import");
        return Err(ImportError::NoDisplay);
    };
    if !api.has_current_context() {
        log::warn!("DmaBufImporter: no current EGL context available for dmabuf import");
        return Err(ImportError::NoCurrentContext);
    }

    let Some(color) = ColorType::from_raw(info.format) else {
        log::error!("DmaBufImporter: unsupported accelerated paint format: {}", info.format);
        return Err(ImportError::UnsupportedFormat(info.format));
    };
    let drm_format = drm_format_for(color);

    let planes = usable_planes(info);
    if planes == 0 {
        log::warn!("DmaBufImporter: no dmabuf planes available for accelerated paint");
        return Err(ImportError::NoPlanes);
    }

    let use_modifiers = api.capabilities().dma_buf_import_modifiers;

    log::debug!(
        "DmaBufImporter: planes count={}, fds={:?}, strides={:?}, offsets={:?}, modifier=0x{:x}",
        planes,
        info.fds,
        info.strides,
        info.offsets,
        info.modifier
    );
    log::debug!(
        "DmaBufImporter: display=0x{:x} drmFormat=0x{:x} size={}x{}",
        display.0,
        drm_format,
        size.width,
        size.height
    );

    let attribs = build_attributes(info, size, drm_format, planes, use_modifiers)?;
    log::debug!("DmaBufImporter: eglCreateImageKHR attribs: {attribs:?}");

    let Some(image) = api.create_image(display, &attribs) else {
        let egl_error = api.last_error();
        log::error!("DmaBufImporter: eglCreateImageKHR failed for dmabuf import, eglGetError=0x{egl_error:x}");
        log::error!("DmaBufImporter: dmabuf attribs at failure: {attribs:?}");
        return Err(ImportError::ImageCreation { egl_error });
    };
    let image = ImageGuard {
        api,
        display,
        image,
    };

    let bound = api.create_texture_from_image(image.image, size);
    // The texture keeps the storage; the image handle is no longer needed.
    drop(image);

    let id = bound.map_err(|e| {
        log::error!("DmaBufImporter: {e}");
        e
    })?;

    // Browser BGRA already matches the host's swapped convention.
    let order = if color == ColorType::Bgra8888 {
        PixelOrder::Rgba
    } else {
        PixelOrder::Bgra
    };

    Ok(lifecycle
        .adopt(FrameTexture {
            id,
            size,
            order,
            kind: TextureKind::Accelerated,
        })
        .commit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::RenderThread;
    use crate::resource::TextureTable;
    use crate::testing::{Call, RecordingBackend};

    fn lifecycle(backend: RecordingBackend) -> ResourceLifecycle<RecordingBackend> {
        ResourceLifecycle::new(
            RenderThread::current(),
            backend,
            Box::new(TextureTable::new()),
            "webtex:test".into(),
            "test".into(),
        )
    }

    fn info() -> DmaBufInfo {
        DmaBufInfo {
            format: ColorType::RAW_BGRA_8888,
            width: 256,
            height: 128,
            plane_count: 1,
            fds: vec![42],
            strides: vec![1024],
            offsets: vec![0],
            sizes: vec![1024 * 128],
            modifier: 0x0100_0000_0000_0002,
        }
    }

    // ── constants ─────────────────────────────────────────────────────────

    #[test]
    fn fourcc_codes_match_drm() {
        assert_eq!(DRM_FORMAT_ARGB8888, 0x3432_5241);
        assert_eq!(DRM_FORMAT_ABGR8888, 0x3432_4241);
        assert_eq!(drm_format_for(ColorType::Rgba8888), DRM_FORMAT_ABGR8888);
    }

    // ── attribute list ────────────────────────────────────────────────────

    #[test]
    fn attributes_without_modifiers() {
        let attribs =
            build_attributes(&info(), PixelSize::new(256, 128), DRM_FORMAT_ARGB8888, 1, false).unwrap();
        assert_eq!(
            attribs,
            vec![
                egl::WIDTH, 256,
                egl::HEIGHT, 128,
                egl::LINUX_DRM_FOURCC, DRM_FORMAT_ARGB8888 as i32,
                egl::PLANE_FD[0], 42,
                egl::PLANE_OFFSET[0], 0,
                egl::PLANE_PITCH[0], 1024,
                egl::NONE,
            ]
        );
    }

    #[test]
    fn attributes_split_modifier_into_words() {
        let attribs =
            build_attributes(&info(), PixelSize::new(256, 128), DRM_FORMAT_ARGB8888, 1, true).unwrap();
        assert_eq!(attribs.len(), 6 + 10 + 1);
        assert_eq!(&attribs[12..16], &[egl::PLANE_MODIFIER_LO[0], 2, egl::PLANE_MODIFIER_HI[0], 0x0100_0000]);
    }

    #[test]
    fn oversized_offset_is_rejected() {
        let mut i = info();
        i.offsets[0] = i32::MAX as u64 + 1;
        let err = build_attributes(&i, PixelSize::new(256, 128), DRM_FORMAT_ARGB8888, 1, false)
            .unwrap_err();
        assert_eq!(err, ImportError::OffsetTooLarge { plane: 0, offset: i32::MAX as u64 + 1 });
    }

    #[test]
    fn attributes_ignore_planes_beyond_the_lists() {
        let attribs =
            build_attributes(&info(), PixelSize::new(256, 128), DRM_FORMAT_ARGB8888, 3, false).unwrap();
        assert_eq!(attribs.len(), 6 + 6 + 1);
        assert!(!attribs.contains(&egl::PLANE_FD[1]));
    }

    #[test]
    fn plane_count_is_clamped_to_shortest_list() {
        let mut i = info();
        i.plane_count = 4;
        i.fds = vec![1, 2, 3, 4];
        i.strides = vec![10, 20];
        i.offsets = vec![0, 0, 0, 0];
        assert_eq!(usable_planes(&i), 2);

        i.strides = vec![10, 20, 30, 40];
        assert_eq!(usable_planes(&i), MAX_PLANES);
    }

    // ── import ────────────────────────────────────────────────────────────

    #[test]
    fn zero_planes_touches_nothing() {
        let lc = lifecycle(RecordingBackend::new());
        let mut i = info();
        i.plane_count = 0;
        assert_eq!(import(&lc, &i, PixelSize::new(256, 128)), Err(ImportError::NoPlanes));
        assert!(lc.backend().calls().is_empty());
    }

    #[test]
    fn unknown_format_is_rejected_before_image_creation() {
        let lc = lifecycle(RecordingBackend::new());
        let mut i = info();
        i.format = 7;
        assert_eq!(import(&lc, &i, PixelSize::new(256, 128)), Err(ImportError::UnsupportedFormat(7)));
        assert_eq!(lc.backend().live_images(), 0);
    }

    #[test]
    fn success_destroys_image_and_keeps_texture() {
        let lc = lifecycle(RecordingBackend::new());
        let texture = import(&lc, &info(), PixelSize::new(256, 128)).unwrap();

        assert_eq!(texture.order, PixelOrder::Rgba);
        assert_eq!(lc.backend().live_images(), 0);
        assert_eq!(lc.backend().live_textures(), 1);

        let calls = lc.backend().calls();
        let bound = calls
            .iter()
            .position(|c| matches!(c, Call::TextureFromImage { .. }))
            .unwrap();
        let destroyed = calls
            .iter()
            .position(|c| matches!(c, Call::DestroyImage(_)))
            .unwrap();
        assert!(bound < destroyed);
    }

    #[test]
    fn rgba_frames_are_tagged_swapped() {
        let lc = lifecycle(RecordingBackend::new());
        let mut i = info();
        i.format = ColorType::RAW_RGBA_8888;
        let texture = import(&lc, &i, PixelSize::new(256, 128)).unwrap();
        assert_eq!(texture.order, PixelOrder::Bgra);

        let attribs = lc.backend().last_image_attribs().unwrap();
        assert_eq!(attribs[5], DRM_FORMAT_ABGR8888 as i32);
    }

    #[test]
    fn modifiers_follow_display_capability() {
        let backend = RecordingBackend::new();
        backend.set_faults(|f| f.modifiers = true);
        let lc = lifecycle(backend);
        import(&lc, &info(), PixelSize::new(256, 128)).unwrap();
        assert_eq!(lc.backend().last_image_attribs().unwrap().len(), 17);
    }

    #[test]
    fn image_failure_reports_egl_error() {
        let backend = RecordingBackend::new();
        backend.set_faults(|f| f.image_error = Some(0x3003));
        let lc = lifecycle(backend);
        assert_eq!(
            import(&lc, &info(), PixelSize::new(256, 128)),
            Err(ImportError::ImageCreation { egl_error: 0x3003 })
        );
        assert_eq!(lc.backend().live_textures(), 0);
    }

    #[test]
    fn bind_failure_still_destroys_image() {
        let backend = RecordingBackend::new();
        backend.set_faults(|f| f.fail_texture_from_image = true);
        let lc = lifecycle(backend);
        assert!(import(&lc, &info(), PixelSize::new(256, 128)).is_err());
        assert_eq!(lc.backend().live_images(), 0);
        assert_eq!(lc.backend().live_textures(), 0);
    }

    #[test]
    fn missing_context_is_rejected() {
        let backend = RecordingBackend::new();
        backend.set_faults(|f| f.no_context = true);
        let lc = lifecycle(backend);
        assert_eq!(import(&lc, &info(), PixelSize::new(256, 128)), Err(ImportError::NoCurrentContext));
    }
}

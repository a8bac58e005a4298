use crate::coords::PixelSize;
use crate::resource::{
    DriverError, FrameTexture, GraphicsBackend, PixelOrder, ResourceLifecycle, TextureId,
    TextureKind,
};

use super::{ImportError, SharedTextureInfo};

/// Bytes per pixel of the shared texture (BGRA, 8 bits per channel).
pub const BYTES_PER_PIXEL: u64 = 4;

/// Size multiplier applied when importing a shared handle as a memory object.
///
/// Empirical constant: the import only succeeds when the memory object is
/// declared at twice the tightly packed frame size, matching the allocation
/// class the browser engine reports for its shared textures. Whether the
/// factor stems from alignment padding or a planar layout is not known, so it
/// is kept as is rather than derived.
pub const SHARED_HANDLE_SIZE_MULTIPLIER: u64 = 2;

/// Declared memory-object size for a shared texture of `size`.
pub fn shared_handle_size(size: PixelSize) -> u64 {
    size.width as u64 * size.height as u64 * BYTES_PER_PIXEL * SHARED_HANDLE_SIZE_MULTIPLIER
}

/// GL memory object name. Never zero.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct MemoryObject(pub u32);

/// `EXT_memory_object` + `EXT_memory_object_win32` entry points of the host
/// GL context.
pub trait SharedHandleImport {
    /// `glCreateMemoryObjectsEXT`; `None` when the driver returned zero.
    fn create_memory_object(&self) -> Option<MemoryObject>;

    /// `glImportMemoryWin32HandleEXT` with `GL_HANDLE_TYPE_D3D11_IMAGE_EXT`.
    /// Failures surface through [`SharedHandleImport::take_error`].
    fn import_win32_handle(&self, memory: MemoryObject, size: u64, handle: u64);

    /// `glGetError`, mapped to `None` for `GL_NO_ERROR`.
    fn take_error(&self) -> Option<u32>;

    /// New texture whose immutable storage is `memory` (`glTexStorageMem2DEXT`,
    /// `GL_RGBA8`, one level). On error nothing created by the call remains.
    fn create_texture_from_memory(
        &self,
        memory: MemoryObject,
        size: PixelSize,
    ) -> Result<TextureId, DriverError>;

    /// `glFinish`.
    fn finish(&self);

    /// `glDeleteMemoryObjectsEXT`.
    fn delete_memory_object(&self, memory: MemoryObject);
}

/// Deletes the memory object when dropped.
struct MemoryObjectGuard<'a> {
    api: &'a dyn SharedHandleImport,
    memory: MemoryObject,
}

impl Drop for MemoryObjectGuard<'_> {
    fn drop(&mut self) {
        self.api.delete_memory_object(self.memory);
    }
}

pub(super) fn import<B: GraphicsBackend>(
    lifecycle: &ResourceLifecycle<B>,
    info: &SharedTextureInfo,
    size: PixelSize,
) -> Result<FrameTexture, ImportError> {
    if info.shared_texture_handle == 0 {
        log::warn!("SharedTextureImporter: shared texture handle is invalid");
        return Err(ImportError::ZeroHandle);
    }

    let api = lifecycle
        .backend()
        .shared_handles()
        .ok_or(ImportError::MissingCapability("EXT_memory_object_win32"))?;

    let Some(memory) = api.create_memory_object() else {
        log::error!("SharedTextureImporter: failed to create memory object for shared texture");
        return Err(ImportError::MemoryObjectCreation);
    };
    let memory = MemoryObjectGuard { api, memory };

    api.import_win32_handle(memory.memory, shared_handle_size(size), info.shared_texture_handle);
    if let Some(code) = api.take_error() {
        log::error!("SharedTextureImporter: glImportMemoryWin32HandleEXT failed with error 0x{code:x}");
        return Err(DriverError::Api {
            call: "glImportMemoryWin32HandleEXT",
            code,
        }
        .into());
    }

    let id = api.create_texture_from_memory(memory.memory, size).map_err(|e| {
        log::error!("SharedTextureImporter: {e}");
        e
    })?;
    let texture = lifecycle.adopt(FrameTexture {
        id,
        size,
        order: PixelOrder::Bgra,
        kind: TextureKind::Accelerated,
    });

    if let Some(code) = api.take_error() {
        log::error!("SharedTextureImporter: glTexStorageMem2DEXT failed with error 0x{code:x}");
        return Err(DriverError::Api {
            call: "glTexStorageMem2DEXT",
            code,
        }
        .into());
    }

    // The texture keeps the imported contents once the memory object is gone,
    // but only after the GPU has consumed the import.
    api.finish();
    drop(memory);

    log::debug!(
        "SharedTextureImporter: imported handle 0x{:x} as {:?} ({}x{})",
        info.shared_texture_handle,
        id,
        size.width,
        size.height
    );
    Ok(texture.commit())
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

    fn info(handle: u64) -> SharedTextureInfo {
        SharedTextureInfo {
            format: 1,
            width: 64,
            height: 32,
            shared_texture_handle: handle,
        }
    }

    #[test]
    fn memory_object_size_is_twice_the_packed_frame() {
        // 2x is an observed requirement of the driver import, not a layout rule.
        assert_eq!(SHARED_HANDLE_SIZE_MULTIPLIER, 2);
        assert_eq!(shared_handle_size(PixelSize::new(64, 32)), 64 * 32 * 4 * 2);
    }

    #[test]
    fn zero_handle_touches_nothing() {
        let lc = lifecycle(RecordingBackend::new());
        let err = import(&lc, &info(0), PixelSize::new(64, 32)).unwrap_err();
        assert_eq!(err, ImportError::ZeroHandle);
        assert!(lc.backend().calls().is_empty());
    }

    #[test]
    fn success_releases_memory_object_after_finish() {
        let lc = lifecycle(RecordingBackend::new());
        let texture = import(&lc, &info(0xbeef), PixelSize::new(64, 32)).unwrap();

        assert_eq!(texture.order, PixelOrder::Bgra);
        assert_eq!(texture.kind, TextureKind::Accelerated);

        let calls = lc.backend().calls();
        let finish = calls.iter().position(|c| *c == Call::Finish).unwrap();
        let delete = calls
            .iter()
            .position(|c| matches!(c, Call::DeleteMemoryObject(_)))
            .unwrap();
        assert!(finish < delete);
        assert!(calls.contains(&Call::ImportHandle {
            memory: 1,
            size: 64 * 32 * 8,
            handle: 0xbeef
        }));
        assert_eq!(lc.backend().live_memory_objects(), 0);
        assert_eq!(lc.backend().live_textures(), 1);
    }

    #[test]
    fn import_error_cleans_up_memory_object() {
        let backend = RecordingBackend::new();
        backend.set_faults(|f| f.import_error = Some(0x0502));
        let lc = lifecycle(backend);

        let err = import(&lc, &info(0xbeef), PixelSize::new(64, 32)).unwrap_err();
        assert_eq!(
            err,
            ImportError::Driver(DriverError::Api {
                call: "glImportMemoryWin32HandleEXT",
                code: 0x0502
            })
        );
        assert_eq!(lc.backend().live_memory_objects(), 0);
        assert_eq!(lc.backend().live_textures(), 0);
    }

    #[test]
    fn storage_error_frees_texture_and_memory_object() {
        let backend = RecordingBackend::new();
        backend.set_faults(|f| f.storage_error = Some(0x0505));
        let lc = lifecycle(backend);

        assert!(import(&lc, &info(0xbeef), PixelSize::new(64, 32)).is_err());
        assert_eq!(lc.backend().live_memory_objects(), 0);
        assert_eq!(lc.backend().live_textures(), 0);
    }

    #[test]
    fn failed_memory_object_creation_is_a_driver_error() {
        let backend = RecordingBackend::new();
        backend.set_faults(|f| f.fail_memory_object = true);
        let lc = lifecycle(backend);

        let err = import(&lc, &info(0xbeef), PixelSize::new(64, 32)).unwrap_err();
        assert_eq!(err, ImportError::MemoryObjectCreation);
        assert_eq!(lc.backend().live_textures(), 0);
    }
}

//! CPU-side fake of the host graphics context for unit tests.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::coords::{PixelRect, PixelSize};
use crate::import::{DmaBufImport, EglCapabilities, EglDisplay, EglImage, MemoryObject, SharedHandleImport};
use crate::resource::{DriverError, GraphicsBackend, TextureDesc, TextureId, TextureWrite};

/// One observed backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create(TextureId),
    Write { texture: TextureId, region: PixelRect },
    Destroy(TextureId),
    CreateMemoryObject(u32),
    ImportHandle { memory: u32, size: u64, handle: u64 },
    TextureFromMemory(TextureId),
    Finish,
    DeleteMemoryObject(u32),
    CreateImage(u64),
    TextureFromImage { image: u64, texture: TextureId },
    DestroyImage(u64),
}

/// Injected failures and capability switches.
#[derive(Debug, Clone)]
pub struct Faults {
    pub fail_create: bool,
    /// Every texture upload fails.
    pub fail_write: bool,
    pub fail_memory_object: bool,
    /// `glGetError` after the handle import.
    pub import_error: Option<u32>,
    /// `glGetError` after allocating memory-backed storage.
    pub storage_error: Option<u32>,
    /// `eglGetError` when image creation fails.
    pub image_error: Option<i32>,
    pub fail_texture_from_image: bool,
    pub no_display: bool,
    pub no_context: bool,
    pub modifiers: bool,
    pub shared_handles: bool,
    pub dma_buf: bool,
}

impl Default for Faults {
    fn default() -> Self {
        Self {
            fail_create: false,
            fail_write: false,
            fail_memory_object: false,
            import_error: None,
            storage_error: None,
            image_error: None,
            fail_texture_from_image: false,
            no_display: false,
            no_context: false,
            modifiers: false,
            shared_handles: true,
            dma_buf: true,
        }
    }
}

struct Texture {
    size: PixelSize,
    pixels: Vec<u8>,
}

#[derive(Default)]
struct Inner {
    next_texture: u64,
    next_memory: u32,
    next_image: u64,
    textures: HashMap<TextureId, Texture>,
    memory_objects: HashSet<u32>,
    images: HashSet<u64>,
    gl_error: Option<u32>,
    egl_error: i32,
    last_image_attribs: Option<Vec<i32>>,
    calls: Vec<Call>,
}

impl Inner {
    fn new_texture(&mut self, size: PixelSize) -> TextureId {
        self.next_texture += 1;
        let id = TextureId::from_raw(self.next_texture);
        self.textures.insert(
            id,
            Texture {
                size,
                pixels: vec![0; size.byte_len()],
            },
        );
        id
    }
}

#[derive(Default)]
pub struct RecordingBackend {
    inner: RefCell<Inner>,
    faults: RefCell<Faults>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_faults(&self, f: impl FnOnce(&mut Faults)) {
        f(&mut self.faults.borrow_mut());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.borrow().calls.clone()
    }

    pub fn destroy_count(&self, id: TextureId) -> usize {
        self.inner
            .borrow()
            .calls
            .iter()
            .filter(|c| **c == Call::Destroy(id))
            .count()
    }

    pub fn live_textures(&self) -> usize {
        self.inner.borrow().textures.len()
    }

    pub fn live_memory_objects(&self) -> usize {
        self.inner.borrow().memory_objects.len()
    }

    pub fn live_images(&self) -> usize {
        self.inner.borrow().images.len()
    }

    /// Regions written into `id`, in call order.
    pub fn writes(&self, id: TextureId) -> Vec<PixelRect> {
        self.inner
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Write { texture, region } if *texture == id => Some(*region),
                _ => None,
            })
            .collect()
    }

    pub fn pixel(&self, id: TextureId, x: u32, y: u32) -> [u8; 4] {
        let inner = self.inner.borrow();
        let texture = &inner.textures[&id];
        let i = (y as usize * texture.size.width as usize + x as usize) * 4;
        [
            texture.pixels[i],
            texture.pixels[i + 1],
            texture.pixels[i + 2],
            texture.pixels[i + 3],
        ]
    }

    pub fn last_image_attribs(&self) -> Option<Vec<i32>> {
        self.inner.borrow().last_image_attribs.clone()
    }
}

impl GraphicsBackend for RecordingBackend {
    fn create_texture(&self, desc: &TextureDesc<'_>) -> Result<TextureId, DriverError> {
        if self.faults.borrow().fail_create {
            return Err(DriverError::Api {
                call: "glTexImage2D",
                code: 0x0505,
            });
        }
        let mut inner = self.inner.borrow_mut();
        let id = inner.new_texture(desc.size);
        inner.calls.push(Call::Create(id));
        Ok(id)
    }

    fn write_texture(&self, id: TextureId, write: &TextureWrite<'_>) -> Result<(), DriverError> {
        if self.faults.borrow().fail_write {
            return Err(DriverError::Api {
                call: "glTexSubImage2D",
                code: 0x0501,
            });
        }
        let mut inner = self.inner.borrow_mut();
        let texture = inner
            .textures
            .get_mut(&id)
            .ok_or(DriverError::UnknownTexture(id))?;
        write.validate(texture.size)?;

        let region = write.region;
        let row_bytes = region.width as usize * 4;
        for row in 0..region.height as usize {
            let src = write.offset + row * write.bytes_per_row as usize;
            let dst = ((region.y as usize + row) * texture.size.width as usize + region.x as usize) * 4;
            texture.pixels[dst..dst + row_bytes].copy_from_slice(&write.data[src..src + row_bytes]);
        }

        inner.calls.push(Call::Write { texture: id, region });
        Ok(())
    }

    fn destroy_texture(&self, id: TextureId) {
        let mut inner = self.inner.borrow_mut();
        inner.textures.remove(&id);
        inner.calls.push(Call::Destroy(id));
    }

    fn shared_handles(&self) -> Option<&dyn SharedHandleImport> {
        self.faults
            .borrow()
            .shared_handles
            .then_some(self as &dyn SharedHandleImport)
    }

    fn dma_buf(&self) -> Option<&dyn DmaBufImport> {
        self.faults
            .borrow()
            .dma_buf
            .then_some(self as &dyn DmaBufImport)
    }
}

impl SharedHandleImport for RecordingBackend {
    fn create_memory_object(&self) -> Option<MemoryObject> {
        if self.faults.borrow().fail_memory_object {
            return None;
        }
        let mut inner = self.inner.borrow_mut();
        inner.next_memory += 1;
        let name = inner.next_memory;
        inner.memory_objects.insert(name);
        inner.calls.push(Call::CreateMemoryObject(name));
        Some(MemoryObject(name))
    }

    fn import_win32_handle(&self, memory: MemoryObject, size: u64, handle: u64) {
        let mut inner = self.inner.borrow_mut();
        inner.gl_error = self.faults.borrow().import_error;
        inner.calls.push(Call::ImportHandle {
            memory: memory.0,
            size,
            handle,
        });
    }

    fn take_error(&self) -> Option<u32> {
        self.inner.borrow_mut().gl_error.take()
    }

    fn create_texture_from_memory(
        &self,
        _memory: MemoryObject,
        size: PixelSize,
    ) -> Result<TextureId, DriverError> {
        let mut inner = self.inner.borrow_mut();
        let id = inner.new_texture(size);
        inner.gl_error = self.faults.borrow().storage_error;
        inner.calls.push(Call::TextureFromMemory(id));
        Ok(id)
    }

    fn finish(&self) {
        self.inner.borrow_mut().calls.push(Call::Finish);
    }

    fn delete_memory_object(&self, memory: MemoryObject) {
        let mut inner = self.inner.borrow_mut();
        inner.memory_objects.remove(&memory.0);
        inner.calls.push(Call::DeleteMemoryObject(memory.0));
    }
}

impl DmaBufImport for RecordingBackend {
    fn display(&self) -> Option<EglDisplay> {
        (!self.faults.borrow().no_display).then_some(EglDisplay(0xd15))
    }

    fn has_current_context(&self) -> bool {
        !self.faults.borrow().no_context
    }

    fn capabilities(&self) -> EglCapabilities {
        EglCapabilities {
            dma_buf_import: true,
            dma_buf_import_modifiers: self.faults.borrow().modifiers,
            image_base: true,
        }
    }

    fn create_image(&self, _display: EglDisplay, attribs: &[i32]) -> Option<EglImage> {
        let mut inner = self.inner.borrow_mut();
        inner.last_image_attribs = Some(attribs.to_vec());
        if let Some(code) = self.faults.borrow().image_error {
            inner.egl_error = code;
            return None;
        }
        inner.next_image += 1;
        let image = inner.next_image;
        inner.images.insert(image);
        inner.calls.push(Call::CreateImage(image));
        Some(EglImage(image))
    }

    fn last_error(&self) -> i32 {
        self.inner.borrow().egl_error
    }

    fn create_texture_from_image(
        &self,
        image: EglImage,
        size: PixelSize,
    ) -> Result<TextureId, DriverError> {
        if self.faults.borrow().fail_texture_from_image {
            return Err(DriverError::Api {
                call: "glEGLImageTargetTexStorageEXT",
                code: 0x0502,
            });
        }
        let mut inner = self.inner.borrow_mut();
        let texture = inner.new_texture(size);
        inner.calls.push(Call::TextureFromImage {
            image: image.0,
            texture,
        });
        Ok(texture)
    }

    fn destroy_image(&self, _display: EglDisplay, image: EglImage) {
        let mut inner = self.inner.borrow_mut();
        inner.images.remove(&image.0);
        inner.calls.push(Call::DestroyImage(image.0));
    }
}

/// A tightly packed frame filled with one pixel value.
pub fn solid(size: PixelSize, px: [u8; 4]) -> Vec<u8> {
    px.repeat(size.width as usize * size.height as usize)
}

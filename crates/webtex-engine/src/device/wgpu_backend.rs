use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::coords::PixelSize;
use crate::resource::{DriverError, GraphicsBackend, TextureDesc, TextureId, TextureWrite};

/// Format of every software texture.
///
/// Browser pixel buffers are blue-green-red-alpha in memory, which is exactly
/// `Bgra8Unorm`; sampling yields correct RGBA without a swizzle.
pub const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8Unorm;

/// [`GraphicsBackend`] on a wgpu device.
///
/// Covers the software path only: zero-copy import needs the host's GL/EGL
/// context, which wgpu does not expose.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    textures: RefCell<HashMap<TextureId, (wgpu::Texture, PixelSize)>>,
    next_id: Cell<u64>,
}

impl WgpuBackend {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            device,
            queue,
            textures: RefCell::new(HashMap::new()),
            next_id: Cell::new(1),
        }
    }

    /// The wgpu texture behind `id`, for building views and bind groups.
    pub fn texture(&self, id: TextureId) -> Option<wgpu::Texture> {
        self.textures.borrow().get(&id).map(|(t, _)| t.clone())
    }

    /// Number of live textures.
    pub fn len(&self) -> usize {
        self.textures.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.borrow().is_empty()
    }
}

impl GraphicsBackend for WgpuBackend {
    fn create_texture(&self, desc: &TextureDesc<'_>) -> Result<TextureId, DriverError> {
        let limit = self.device.limits().max_texture_dimension_2d;
        if desc.size.is_empty() || desc.size.width > limit || desc.size.height > limit {
            return Err(DriverError::OutOfBounds {
                region: desc.size.bounds(),
                size: PixelSize::new(limit, limit),
            });
        }

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(desc.label),
            size: wgpu::Extent3d {
                width: desc.size.width,
                height: desc.size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        let id = TextureId::from_raw(self.next_id.get());
        self.next_id.set(id.raw() + 1);
        self.textures.borrow_mut().insert(id, (texture, desc.size));
        Ok(id)
    }

    fn write_texture(&self, id: TextureId, write: &TextureWrite<'_>) -> Result<(), DriverError> {
        let textures = self.textures.borrow();
        let (texture, size) = textures.get(&id).ok_or(DriverError::UnknownTexture(id))?;
        write.validate(*size)?;

        let region = write.region;
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: region.x as u32,
                    y: region.y as u32,
                    z: 0,
                },
                aspect: wgpu::TextureAspect::All,
            },
            &write.data[write.offset..],
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(write.bytes_per_row),
                rows_per_image: Some(region.height as u32),
            },
            wgpu::Extent3d {
                width: region.width as u32,
                height: region.height as u32,
                depth_or_array_layers: 1,
            },
        );
        Ok(())
    }

    fn destroy_texture(&self, id: TextureId) {
        match self.textures.borrow_mut().remove(&id) {
            Some((texture, _)) => texture.destroy(),
            None => log::warn!("WgpuBackend: destroy of unknown texture {id:?}"),
        }
    }
}

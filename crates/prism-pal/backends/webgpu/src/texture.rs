use api::{texture::TextureTransferError, types::Format};

pub struct Texture {
    pub(crate) texture: wgpu::Texture,
    pub(crate) format: Format,
    pub(crate) mip_count: usize,
}

impl Texture {
    #[inline(always)]
    pub(crate) fn mip_dims(&self, mip: usize) -> (u32, u32) {
        let size = self.texture.size().mip_level_size(mip as u32, wgpu::TextureDimension::D2);
        (size.width, size.height)
    }

    #[inline(always)]
    pub(crate) fn copy_info(&self, array_element: usize, mip: usize) -> wgpu::TexelCopyTextureInfo {
        wgpu::TexelCopyTextureInfo {
            texture: &self.texture,
            mip_level: mip as u32,
            origin: wgpu::Origin3d {
                x: 0,
                y: 0,
                z: array_element as u32,
            },
            aspect: wgpu::TextureAspect::All,
        }
    }

    /// Copies one mip of one array element into a mappable buffer and returns tightly packed
    /// texels.
    pub(crate) fn read(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        array_element: usize,
        mip: usize,
    ) -> Result<Vec<u8>, TextureTransferError> {
        let (width, height) = self.mip_dims(mip);
        let bytes_per_row = width * self.format.texel_size() as u32;
        let padded_bytes_per_row = crate::util::align_up(
            bytes_per_row as u64,
            wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as u64,
        ) as u32;

        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("texture_readback"),
            size: padded_bytes_per_row as u64 * height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("texture_readback"),
        });
        encoder.copy_texture_to_buffer(
            self.copy_info(array_element, mip),
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        queue.submit(Some(encoder.finish()));

        let slice = staging.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        device.poll(wgpu::Maintain::Wait);
        receiver
            .recv()
            .map_err(|err| TextureTransferError::Other(err.to_string()))?
            .map_err(|err| TextureTransferError::Other(err.to_string()))?;

        let mut texels = Vec::with_capacity((bytes_per_row * height) as usize);
        {
            let data = slice.get_mapped_range();
            for row in 0..height as usize {
                let start = row * padded_bytes_per_row as usize;
                texels.extend_from_slice(&data[start..start + bytes_per_row as usize]);
            }
        }
        staging.unmap();

        Ok(texels)
    }
}

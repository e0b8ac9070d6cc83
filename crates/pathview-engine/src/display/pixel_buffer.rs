use anyhow::{Context, Result};

use super::layout::PixelLayout;

/// GPU buffer a render step writes finished texels into.
///
/// Usage flags make it shareable between a compute pass (`STORAGE`), CPU
/// uploads (`COPY_DST`), and the display copy (`COPY_SRC`); there is no
/// separate registration step. One RGBA8 texel per `u32`, rows laid out per
/// [`PixelLayout`].
pub struct PixelBuffer {
    buffer: wgpu::Buffer,
    layout: PixelLayout,
}

impl PixelBuffer {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Result<Self> {
        anyhow::ensure!(width > 0 && height > 0, "pixel buffer has zero size ({width}x{height})");

        let layout = PixelLayout::new(width, height);
        let max = device.limits().max_buffer_size;
        anyhow::ensure!(
            layout.size_bytes() <= max,
            "pixel buffer of {} bytes exceeds device limit of {max}",
            layout.size_bytes(),
        );

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pathview pixel buffer"),
            size: layout.size_bytes(),
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_SRC
                | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        log::debug!(
            "pixel buffer {}x{} (pitch {} bytes, {} bytes total)",
            width,
            height,
            layout.row_pitch_bytes,
            layout.size_bytes(),
        );

        Ok(Self { buffer, layout })
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    pub fn width(&self) -> u32 {
        self.layout.width
    }

    pub fn height(&self) -> u32 {
        self.layout.height
    }

    /// Uploads a tightly packed RGBA8 image, inserting row padding as needed.
    pub fn write_rgba8(&self, queue: &wgpu::Queue, packed: &[u8]) -> Result<()> {
        let data = self
            .layout
            .pad_rows(packed)
            .context("pixel upload rejected")?;
        queue.write_buffer(&self.buffer, 0, &data);
        Ok(())
    }

    /// Zeroes the buffer (transparent black).
    pub fn clear(&self, encoder: &mut wgpu::CommandEncoder) {
        encoder.clear_buffer(&self.buffer, 0, None);
    }

    /// Records the copy of this buffer into `texture` (same dimensions).
    pub fn copy_to_texture(&self, encoder: &mut wgpu::CommandEncoder, texture: &wgpu::Texture) {
        encoder.copy_buffer_to_texture(
            wgpu::TexelCopyBufferInfo {
                buffer: &self.buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(self.layout.row_pitch_bytes),
                    rows_per_image: Some(self.layout.height),
                },
            },
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::Extent3d {
                width: self.layout.width,
                height: self.layout.height,
                depth_or_array_layers: 1,
            },
        );
    }
}

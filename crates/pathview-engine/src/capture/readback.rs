use anyhow::{Context, Result};

use crate::display::{DisplayImage, PixelLayout};

/// Reads the display image back to the CPU as tightly packed RGBA8.
///
/// Blocks until the GPU has finished all submitted work. Meant for occasional
/// captures, not per-frame use.
pub fn read_display_image(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    image: &DisplayImage,
) -> Result<Vec<u8>> {
    let (width, height) = image.size();
    let layout = PixelLayout::new(width, height);

    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("pathview screenshot staging"),
        size: layout.size_bytes(),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("pathview screenshot encoder"),
    });

    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture: image.texture(),
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &staging,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(layout.row_pitch_bytes),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );

    queue.submit(std::iter::once(encoder.finish()));

    let slice = staging.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });

    device
        .poll(wgpu::PollType::wait_indefinitely())
        .context("device poll failed during screenshot readback")?;

    rx.recv()
        .context("screenshot map callback never ran")?
        .context("failed to map screenshot buffer")?;

    let pixels = {
        let mapped = slice.get_mapped_range();
        layout.unpad_rows(&mapped)?
    };
    staging.unmap();

    Ok(pixels)
}

use anyhow::Result;
use bytemuck::{Pod, Zeroable};

use crate::display::{PixelBuffer, PixelLayout};

use super::{RenderStep, StepCtx};

const WORKGROUP_SIZE: u32 = 8;

/// Compute step writing a fixed red/green gradient.
///
/// Proves the GPU-only path end to end: a compute pass writes the pixel
/// buffer, the display copies it into the texture, no CPU upload involved.
/// Bound to the pixel buffer it was created for.
pub struct GradientStep {
    layout: PixelLayout,
    pipeline: wgpu::ComputePipeline,
    params_ubo: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    iteration: u32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct GradientParams {
    width: u32,
    height: u32,
    row_pitch_texels: u32,
    iteration: u32,
}

impl GradientStep {
    pub fn new(device: &wgpu::Device, pixels: &PixelBuffer) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("pathview gradient shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/gradient.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("pathview gradient bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<GradientParams>() as u64,
                        ),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pathview gradient pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("pathview gradient pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("cs_main"),
            compilation_options: Default::default(),
            cache: None,
        });

        let params_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pathview gradient params"),
            size: std::mem::size_of::<GradientParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("pathview gradient bind group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: pixels.buffer().as_entire_binding(),
                },
            ],
        });

        Self {
            layout: pixels.layout(),
            pipeline,
            params_ubo,
            bind_group,
            iteration: 0,
        }
    }
}

impl RenderStep for GradientStep {
    fn label(&self) -> &str {
        "gradient"
    }

    fn step(&mut self, ctx: &StepCtx<'_>, pixels: &PixelBuffer) -> Result<()> {
        anyhow::ensure!(
            pixels.layout() == self.layout,
            "gradient step was built for a {}x{} buffer, got {}x{}",
            self.layout.width,
            self.layout.height,
            pixels.width(),
            pixels.height(),
        );

        let params = GradientParams {
            width: self.layout.width,
            height: self.layout.height,
            row_pitch_texels: self.layout.row_pitch_texels(),
            iteration: self.iteration + 1,
        };
        ctx.queue.write_buffer(&self.params_ubo, 0, bytemuck::bytes_of(&params));

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("pathview gradient encoder"),
            });

        {
            let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("pathview gradient pass"),
                timestamp_writes: None,
            });
            cpass.set_pipeline(&self.pipeline);
            cpass.set_bind_group(0, &self.bind_group, &[]);
            cpass.dispatch_workgroups(
                self.layout.width.div_ceil(WORKGROUP_SIZE),
                self.layout.height.div_ceil(WORKGROUP_SIZE),
                1,
            );
        }

        ctx.queue.submit(std::iter::once(encoder.finish()));
        self.iteration += 1;
        Ok(())
    }

    fn iteration(&self) -> u32 {
        self.iteration
    }

    fn reset(&mut self) {
        self.iteration = 0;
    }
}

/// CPU reference of the shader's output for texel `(x, y)`, as RGBA bytes.
pub fn gradient_texel(x: u32, y: u32, width: u32, height: u32) -> [u8; 4] {
    [
        (x * 255 / width) as u8,
        (y * 255 / height) as u8,
        0,
        255,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_of_the_gradient() {
        assert_eq!(gradient_texel(0, 0, 800, 600), [0, 0, 0, 255]);
        assert_eq!(gradient_texel(799, 599, 800, 600), [254, 254, 0, 255]);
    }

    #[test]
    fn red_depends_only_on_column() {
        assert_eq!(gradient_texel(400, 0, 800, 600)[0], gradient_texel(400, 599, 800, 600)[0]);
        assert_eq!(gradient_texel(400, 0, 800, 600)[0], 127);
    }

    #[test]
    fn params_match_shader_struct_size() {
        assert_eq!(std::mem::size_of::<GradientParams>(), 16);
    }
}

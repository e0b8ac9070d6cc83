use anyhow::Result;
use wgpu::util::DeviceExt;

use super::pixel_buffer::PixelBuffer;
use super::quad::{fit_viewport, texcoords, ScaleMode, QUAD_INDICES, QUAD_POSITIONS};
use super::texture::DisplayImage;

/// Display configuration.
#[derive(Debug, Copy, Clone)]
pub struct DisplayConfig {
    /// Render resolution (pixel buffer and display image size).
    pub width: u32,
    pub height: u32,
    pub scale_mode: ScaleMode,
    pub flip_x: bool,
    pub flip_y: bool,
    /// Color outside the image when letterboxing.
    pub clear: wgpu::Color,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            scale_mode: ScaleMode::Stretch,
            flip_x: false,
            flip_y: false,
            clear: wgpu::Color::BLACK,
        }
    }
}

/// Owns the display resources and draws the pixel buffer to a surface.
///
/// Field order is drop order: pixel buffer first, then the display image.
pub struct Display {
    pixels: PixelBuffer,
    image: DisplayImage,

    config: DisplayConfig,

    position_vbo: wgpu::Buffer,
    texcoord_vbo: wgpu::Buffer,
    quad_ibo: wgpu::Buffer,

    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,

    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
}

impl Display {
    pub fn new(device: &wgpu::Device, config: DisplayConfig) -> Result<Self> {
        let max_dim = device.limits().max_texture_dimension_2d;
        anyhow::ensure!(
            config.width <= max_dim && config.height <= max_dim,
            "display image {}x{} exceeds device limit of {max_dim}",
            config.width,
            config.height,
        );

        let pixels = PixelBuffer::new(device, config.width, config.height)?;
        let image = DisplayImage::new(device, config.width, config.height);

        let position_vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("pathview quad positions"),
            contents: bytemuck::cast_slice(&QUAD_POSITIONS),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let texcoord_vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("pathview quad texcoords"),
            contents: bytemuck::cast_slice(&texcoords(config.flip_x, config.flip_y)),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let quad_ibo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("pathview quad indices"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("pathview display bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("pathview display bind group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(image.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(image.sampler()),
                },
            ],
        });

        log::debug!("display created: {:?}", config);

        Ok(Self {
            pixels,
            image,
            config,
            position_vbo,
            texcoord_vbo,
            quad_ibo,
            bind_group_layout,
            bind_group,
            pipeline_format: None,
            pipeline: None,
        })
    }

    /// The buffer render steps write into.
    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    pub fn image(&self) -> &DisplayImage {
        &self.image
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    pub fn set_scale_mode(&mut self, mode: ScaleMode) {
        self.config.scale_mode = mode;
    }

    /// Changes the texcoord mirroring; takes effect on the next present.
    pub fn set_flip(&mut self, queue: &wgpu::Queue, flip_x: bool, flip_y: bool) {
        self.config.flip_x = flip_x;
        self.config.flip_y = flip_y;
        queue.write_buffer(
            &self.texcoord_vbo,
            0,
            bytemuck::cast_slice(&texcoords(flip_x, flip_y)),
        );
    }

    /// Records one display frame into `encoder`.
    ///
    /// Copies the pixel buffer into the display image, clears `target`, and
    /// draws the quad. Must be recorded after (or submitted after) whatever
    /// wrote the pixel buffer this frame.
    pub fn record(
        &mut self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        target: &wgpu::TextureView,
        target_format: wgpu::TextureFormat,
        target_size: (u32, u32),
    ) {
        self.ensure_pipeline(device, target_format);

        self.pixels.copy_to_texture(encoder, self.image.texture());

        let viewport = fit_viewport(
            self.config.scale_mode,
            (self.config.width, self.config.height),
            target_size,
        );

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("pathview display pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.config.clear),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        let (Some(vp), Some(pipeline)) = (viewport, self.pipeline.as_ref()) else {
            return;
        };

        rpass.set_viewport(vp.x, vp.y, vp.width, vp.height, 0.0, 1.0);
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.position_vbo.slice(..));
        rpass.set_vertex_buffer(1, self.texcoord_vbo.slice(..));
        rpass.set_index_buffer(self.quad_ibo.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..1);
    }

    fn ensure_pipeline(&mut self, device: &wgpu::Device, format: wgpu::TextureFormat) {
        if self.pipeline_format == Some(format) && self.pipeline.is_some() {
            return;
        }

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("pathview passthrough shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/passthrough.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pathview passthrough pipeline layout"),
            bind_group_layouts: &[&self.bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("pathview passthrough pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[vec2_layout(&POSITION_ATTRS), vec2_layout(&TEXCOORD_ATTRS)],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!("passthrough pipeline built for {format:?}");
        self.pipeline_format = Some(format);
        self.pipeline = Some(pipeline);
    }
}

impl Drop for Display {
    fn drop(&mut self) {
        log::debug!("releasing display resources");
    }
}

const POSITION_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];
const TEXCOORD_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x2];

/// Layout of a tightly packed `vec2<f32>` vertex stream.
fn vec2_layout(attributes: &'static [wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<[f32; 2]>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes,
    }
}

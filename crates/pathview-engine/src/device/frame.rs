/// Swapchain image plus the encoder the display pass records into.
///
/// Hand it back to `Gpu::submit` promptly; the next acquire waits on it.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

impl GpuFrame {
    /// Swapchain size in pixels, which may lag a pending resize.
    pub fn size(&self) -> (u32, u32) {
        let t = &self.surface_texture.texture;
        (t.width(), t.height())
    }
}

//! Display path: pixel buffer → display image → full-screen quad.
//!
//! A render step writes texels into the [`PixelBuffer`]. Each presented frame
//! copies that buffer into the [`DisplayImage`] texture on the GPU and draws
//! it with a passthrough pipeline. Pixel data never visits the CPU on this
//! path.

mod layout;
mod pixel_buffer;
mod quad;
mod renderer;
mod texture;

pub use layout::{PixelLayout, BYTES_PER_TEXEL};
pub use pixel_buffer::PixelBuffer;
pub use quad::{fit_viewport, texcoords, ScaleMode, Viewport, QUAD_INDICES, QUAD_POSITIONS};
pub use renderer::{Display, DisplayConfig};
pub use texture::DisplayImage;

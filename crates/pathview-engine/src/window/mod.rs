//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the preview window, and wires them to the
//! GPU layer.

mod runtime;
mod title;

pub use runtime::{RedrawMode, Runtime, RuntimeConfig, RuntimeCtx};
pub use title::format_title;

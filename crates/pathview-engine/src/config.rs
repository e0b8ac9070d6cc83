//! Preview configuration.
//!
//! One flat struct the binary fills from its command line; the runtime,
//! GPU, and display configs are derived from it.

use std::path::PathBuf;

use anyhow::Result;
use winit::dpi::PhysicalSize;

use crate::device::GpuInit;
use crate::display::{DisplayConfig, ScaleMode};
use crate::window::RuntimeConfig;

/// Largest image edge accepted up front (wgpu's default 2D texture limit).
pub const MAX_IMAGE_DIMENSION: u32 = 8192;

#[derive(Debug, Clone)]
pub struct PreviewConfig {
    /// Render resolution; the window opens at this size in physical pixels.
    pub width: u32,
    pub height: u32,

    /// Base window title; the iteration count is appended each frame.
    pub title: String,

    pub vsync: bool,
    pub scale_mode: ScaleMode,
    pub flip_x: bool,
    pub flip_y: bool,

    pub screenshot_dir: PathBuf,
    pub screenshot_prefix: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            title: "pathview".to_string(),
            vsync: true,
            scale_mode: ScaleMode::Stretch,
            flip_x: false,
            flip_y: false,
            screenshot_dir: PathBuf::from("screenshots"),
            screenshot_prefix: "pathview".to_string(),
        }
    }
}

impl PreviewConfig {
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.width > 0 && self.height > 0,
            "image size must be non-zero, got {}x{}",
            self.width,
            self.height,
        );
        anyhow::ensure!(
            self.width <= MAX_IMAGE_DIMENSION && self.height <= MAX_IMAGE_DIMENSION,
            "image size {}x{} exceeds {MAX_IMAGE_DIMENSION}",
            self.width,
            self.height,
        );
        anyhow::ensure!(!self.title.trim().is_empty(), "window title must not be empty");
        anyhow::ensure!(
            !self.screenshot_prefix.is_empty()
                && !self.screenshot_prefix.contains(['/', '\\']),
            "screenshot prefix {:?} is not a plain file name",
            self.screenshot_prefix,
        );
        Ok(())
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            title: self.title.clone(),
            initial_size: PhysicalSize::new(self.width, self.height).into(),
        }
    }

    pub fn gpu_init(&self) -> GpuInit {
        GpuInit::default().with_vsync(self.vsync)
    }

    pub fn display_config(&self) -> DisplayConfig {
        DisplayConfig {
            width: self.width,
            height: self.height,
            scale_mode: self.scale_mode,
            flip_x: self.flip_x,
            flip_y: self.flip_y,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::Size;

    #[test]
    fn default_is_valid() {
        PreviewConfig::default().validate().unwrap();
    }

    #[test]
    fn zero_size_rejected() {
        let cfg = PreviewConfig { width: 0, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn oversized_image_rejected() {
        let cfg = PreviewConfig { height: MAX_IMAGE_DIMENSION + 1, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn blank_title_rejected() {
        let cfg = PreviewConfig { title: "  ".into(), ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn prefix_with_path_separator_rejected() {
        let cfg = PreviewConfig { screenshot_prefix: "../out".into(), ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn derived_configs_follow_preview_settings() {
        let cfg = PreviewConfig {
            width: 640,
            height: 360,
            vsync: false,
            scale_mode: ScaleMode::Fit,
            flip_x: true,
            ..Default::default()
        };

        let rt = cfg.runtime_config();
        assert_eq!(rt.initial_size, Size::from(PhysicalSize::new(640u32, 360u32)));

        let display = cfg.display_config();
        assert_eq!((display.width, display.height), (640, 360));
        assert_eq!(display.scale_mode, ScaleMode::Fit);
        assert!(display.flip_x && !display.flip_y);

        assert_eq!(cfg.gpu_init().present_mode, wgpu::PresentMode::AutoNoVsync);
    }
}

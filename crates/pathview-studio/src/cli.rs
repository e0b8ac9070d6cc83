use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use pathview_engine::config::PreviewConfig;
use pathview_engine::display::ScaleMode;

/// Which built-in render step feeds the preview.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
pub enum StepKind {
    /// Compute-shader test gradient (GPU only).
    Gradient,
    /// CPU progressive accumulation of noisy samples.
    Noise,
}

/// Interactive preview window for a progressive renderer.
#[derive(Debug, Parser)]
#[command(name = "pathview", version)]
pub struct Args {
    /// Render width in pixels.
    #[arg(long, default_value_t = 800)]
    pub width: u32,

    /// Render height in pixels.
    #[arg(long, default_value_t = 800)]
    pub height: u32,

    /// Window title; the iteration count is appended.
    #[arg(long, default_value = "pathview")]
    pub title: String,

    /// Render step to run.
    #[arg(long, value_enum, default_value_t = StepKind::Noise)]
    pub step: StepKind,

    /// Present without waiting for vblank.
    #[arg(long)]
    pub no_vsync: bool,

    /// Keep the image aspect ratio when the window is resized.
    #[arg(long)]
    pub fit: bool,

    /// Mirror the image horizontally.
    #[arg(long)]
    pub flip_x: bool,

    /// Mirror the image vertically.
    #[arg(long)]
    pub flip_y: bool,

    /// Directory screenshots are written to.
    #[arg(long, default_value = "screenshots")]
    pub screenshot_dir: PathBuf,

    /// Log filter (env_logger syntax); overrides RUST_LOG.
    #[arg(long)]
    pub log: Option<String>,
}

impl Args {
    pub fn preview_config(&self) -> PreviewConfig {
        PreviewConfig {
            width: self.width,
            height: self.height,
            title: self.title.clone(),
            vsync: !self.no_vsync,
            scale_mode: if self.fit { ScaleMode::Fit } else { ScaleMode::Stretch },
            flip_x: self.flip_x,
            flip_y: self.flip_y,
            screenshot_dir: self.screenshot_dir.clone(),
            screenshot_prefix: screenshot_prefix(&self.title),
        }
    }
}

/// Derives a file-name-safe prefix from the window title.
fn screenshot_prefix(title: &str) -> String {
    let prefix: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect::<String>()
        .split('_')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("_");

    if prefix.is_empty() { "pathview".to_string() } else { prefix }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_preview_defaults() {
        let args = Args::try_parse_from(["pathview"]).unwrap();
        let cfg = args.preview_config();

        assert_eq!((cfg.width, cfg.height), (800, 800));
        assert!(cfg.vsync);
        assert_eq!(cfg.scale_mode, ScaleMode::Stretch);
        assert_eq!(args.step, StepKind::Noise);
        cfg.validate().unwrap();
    }

    #[test]
    fn flags_map_onto_config() {
        let args = Args::try_parse_from([
            "pathview", "--width", "320", "--height", "240", "--no-vsync", "--fit", "--flip-x",
            "--step", "gradient",
        ])
        .unwrap();
        let cfg = args.preview_config();

        assert_eq!((cfg.width, cfg.height), (320, 240));
        assert!(!cfg.vsync);
        assert_eq!(cfg.scale_mode, ScaleMode::Fit);
        assert!(cfg.flip_x && !cfg.flip_y);
        assert_eq!(args.step, StepKind::Gradient);
    }

    #[test]
    fn unknown_step_is_rejected() {
        assert!(Args::try_parse_from(["pathview", "--step", "bvh"]).is_err());
    }

    #[test]
    fn prefix_is_sanitized_title() {
        assert_eq!(screenshot_prefix("CIS565 Path Tracer"), "cis565_path_tracer");
        assert_eq!(screenshot_prefix("a/b\\c"), "a_b_c");
        assert_eq!(screenshot_prefix("***"), "pathview");
    }
}

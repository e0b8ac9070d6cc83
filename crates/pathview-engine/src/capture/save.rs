use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Writes a tightly packed RGBA8 image to `dir/name` as PNG.
///
/// Creates `dir` if needed and returns the full path.
pub fn save_png(dir: &Path, name: &str, width: u32, height: u32, rgba: Vec<u8>) -> Result<PathBuf> {
    let image = image::RgbaImage::from_raw(width, height, rgba)
        .with_context(|| format!("pixel data does not match {width}x{height} RGBA8"))?;

    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create screenshot directory {}", dir.display()))?;

    let path = dir.join(name);
    image
        .save_with_format(&path, image::ImageFormat::Png)
        .with_context(|| format!("failed to write {}", path.display()))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_png_into_new_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("shots");
        let rgba = vec![
            255, 0, 0, 255, //
            0, 255, 0, 255, //
            0, 0, 255, 255, //
            255, 255, 255, 255,
        ];

        let path = save_png(&dir, "test.png", 2, 2, rgba).unwrap();
        assert_eq!(path, dir.join("test.png"));

        let back = image::open(&path).unwrap().to_rgba8();
        assert_eq!(back.dimensions(), (2, 2));
        assert_eq!(back.get_pixel(1, 0).0, [0, 255, 0, 255]);
        assert_eq!(back.get_pixel(0, 1).0, [0, 0, 255, 255]);
    }

    #[test]
    fn rejects_mismatched_length() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(save_png(tmp.path(), "bad.png", 4, 4, vec![0; 8]).is_err());
    }
}

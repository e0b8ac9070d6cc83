//! Full-screen quad geometry and image-to-surface scaling.

/// Clip-space corners: bottom-left, bottom-right, top-right, top-left.
pub const QUAD_POSITIONS: [[f32; 2]; 4] = [
    [-1.0, -1.0],
    [1.0, -1.0],
    [1.0, 1.0],
    [-1.0, 1.0],
];

/// Two triangles sharing the 1–3 diagonal.
pub const QUAD_INDICES: [u16; 6] = [0, 1, 3, 3, 1, 2];

/// Texture coordinates for [`QUAD_POSITIONS`].
///
/// Unflipped, image row 0 lands at the top of the window and column 0 on the
/// left. `flip_x` / `flip_y` mirror the mapping for steps that write mirrored
/// images.
pub fn texcoords(flip_x: bool, flip_y: bool) -> [[f32; 2]; 4] {
    QUAD_POSITIONS.map(|[x, y]| {
        let u = (x + 1.0) * 0.5;
        let v = (1.0 - y) * 0.5;
        [
            if flip_x { 1.0 - u } else { u },
            if flip_y { 1.0 - v } else { v },
        ]
    })
}

/// How the display image is fitted to the window.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum ScaleMode {
    /// Fill the whole surface, ignoring aspect ratio.
    #[default]
    Stretch,
    /// Largest centered rect with the image's aspect ratio.
    Fit,
}

/// Viewport rect in physical pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Computes where the image is drawn on a `surface`-sized target.
///
/// Returns `None` when either size is zero (nothing to draw).
pub fn fit_viewport(mode: ScaleMode, image: (u32, u32), surface: (u32, u32)) -> Option<Viewport> {
    let (iw, ih) = (image.0 as f32, image.1 as f32);
    let (sw, sh) = (surface.0 as f32, surface.1 as f32);
    if iw <= 0.0 || ih <= 0.0 || sw <= 0.0 || sh <= 0.0 {
        return None;
    }

    match mode {
        ScaleMode::Stretch => Some(Viewport { x: 0.0, y: 0.0, width: sw, height: sh }),
        ScaleMode::Fit => {
            let scale = (sw / iw).min(sh / ih);
            let width = (iw * scale).min(sw);
            let height = (ih * scale).min(sh);
            Some(Viewport {
                x: ((sw - width) * 0.5).floor(),
                y: ((sh - height) * 0.5).floor(),
                width,
                height,
            })
        }
    }
}

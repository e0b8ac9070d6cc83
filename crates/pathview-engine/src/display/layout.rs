use std::borrow::Cow;

use anyhow::Result;

/// Bytes per RGBA8 texel.
pub const BYTES_PER_TEXEL: u32 = 4;

/// Memory layout of an RGBA8 image stored in a GPU buffer.
///
/// Rows are padded to `wgpu::COPY_BYTES_PER_ROW_ALIGNMENT` so the buffer can
/// be the source of a buffer-to-texture copy without repacking. Writers must
/// address texels through `row_pitch_*`, not `width`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PixelLayout {
    pub width: u32,
    pub height: u32,
    pub row_pitch_bytes: u32,
}

impl PixelLayout {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            row_pitch_bytes: align_up(width * BYTES_PER_TEXEL, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT),
        }
    }

    /// Bytes in a row without padding.
    pub fn unpadded_row_bytes(&self) -> u32 {
        self.width * BYTES_PER_TEXEL
    }

    /// Row stride in texels (what compute shaders index with).
    pub fn row_pitch_texels(&self) -> u32 {
        self.row_pitch_bytes / BYTES_PER_TEXEL
    }

    /// Total buffer size in bytes.
    pub fn size_bytes(&self) -> u64 {
        self.row_pitch_bytes as u64 * self.height as u64
    }

    /// Size of the tightly packed image in bytes.
    pub fn packed_size_bytes(&self) -> usize {
        self.unpadded_row_bytes() as usize * self.height as usize
    }

    pub fn is_padded(&self) -> bool {
        self.row_pitch_bytes != self.unpadded_row_bytes()
    }

    /// Byte offset of texel `(x, y)`.
    pub fn texel_offset(&self, x: u32, y: u32) -> u64 {
        debug_assert!(x < self.width && y < self.height);
        y as u64 * self.row_pitch_bytes as u64 + x as u64 * BYTES_PER_TEXEL as u64
    }

    /// Converts tightly packed rows into this layout.
    pub fn pad_rows<'a>(&self, packed: &'a [u8]) -> Result<Cow<'a, [u8]>> {
        anyhow::ensure!(
            packed.len() == self.packed_size_bytes(),
            "image data is {} bytes, expected {} for {}x{} RGBA8",
            packed.len(),
            self.packed_size_bytes(),
            self.width,
            self.height,
        );

        if !self.is_padded() {
            return Ok(Cow::Borrowed(packed));
        }

        let row = self.unpadded_row_bytes() as usize;
        let mut out = vec![0u8; self.size_bytes() as usize];
        for (src, dst) in packed
            .chunks_exact(row)
            .zip(out.chunks_exact_mut(self.row_pitch_bytes as usize))
        {
            dst[..row].copy_from_slice(src);
        }
        Ok(Cow::Owned(out))
    }

    /// Strips row padding from data in this layout.
    pub fn unpad_rows(&self, padded: &[u8]) -> Result<Vec<u8>> {
        anyhow::ensure!(
            padded.len() as u64 >= self.size_bytes(),
            "readback holds {} bytes, expected at least {}",
            padded.len(),
            self.size_bytes(),
        );

        let row = self.unpadded_row_bytes() as usize;
        let mut out = Vec::with_capacity(self.packed_size_bytes());
        for chunk in padded
            .chunks_exact(self.row_pitch_bytes as usize)
            .take(self.height as usize)
        {
            out.extend_from_slice(&chunk[..row]);
        }
        Ok(out)
    }
}

fn align_up(value: u32, align: u32) -> u32 {
    value.div_ceil(align) * align
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── pitch ─────────────────────────────────────────────────────────────

    #[test]
    fn aligned_width_has_no_padding() {
        let l = PixelLayout::new(64, 10);
        assert_eq!(l.row_pitch_bytes, 256);
        assert!(!l.is_padded());
        assert_eq!(l.size_bytes(), 2560);
    }

    #[test]
    fn odd_width_rounds_up_to_256() {
        let l = PixelLayout::new(800, 600);
        assert_eq!(l.unpadded_row_bytes(), 3200);
        assert_eq!(l.row_pitch_bytes, 3328);
        assert_eq!(l.row_pitch_texels(), 832);
        assert_eq!(l.size_bytes(), 3328 * 600);
    }

    #[test]
    fn single_texel_row_still_takes_256_bytes() {
        let l = PixelLayout::new(1, 3);
        assert_eq!(l.row_pitch_bytes, 256);
        assert_eq!(l.texel_offset(0, 2), 512);
    }

    #[test]
    fn texel_offset_uses_pitch_not_width() {
        let l = PixelLayout::new(100, 4);
        assert_eq!(l.texel_offset(5, 1), 512 + 20);
    }

    // ── padding ───────────────────────────────────────────────────────────

    #[test]
    fn pad_then_unpad_preserves_pixels() {
        let l = PixelLayout::new(3, 2);
        let packed: Vec<u8> = (0..24).collect();

        let padded = l.pad_rows(&packed).unwrap();
        assert_eq!(padded.len(), 512);
        assert_eq!(&padded[..12], &packed[..12]);
        assert_eq!(&padded[256..268], &packed[12..]);
        assert!(padded[12..256].iter().all(|&b| b == 0));

        assert_eq!(l.unpad_rows(&padded).unwrap(), packed);
    }

    #[test]
    fn pad_borrows_when_already_aligned() {
        let l = PixelLayout::new(64, 1);
        let packed = vec![7u8; 256];
        assert!(matches!(l.pad_rows(&packed).unwrap(), Cow::Borrowed(_)));
    }

    #[test]
    fn pad_rejects_wrong_length() {
        let l = PixelLayout::new(4, 4);
        assert!(l.pad_rows(&[0u8; 10]).is_err());
    }

    #[test]
    fn unpad_rejects_short_readback() {
        let l = PixelLayout::new(4, 4);
        assert!(l.unpad_rows(&[0u8; 256]).is_err());
    }
}

use image::{Rgba, RgbaImage};

use crate::config::BackdropStyle;
use crate::theme::Theme;

/// Visual treatment applied to the backdrop when it is shown behind content:
/// `contrast()` then `brightness()`, then the layer opacity over the page
/// background. Filter values are shared by both themes; only opacity and
/// background change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackdropFilter {
    pub contrast: f32,
    pub brightness: f32,
    pub opacity: f32,
    pub background: [u8; 3],
}

impl BackdropFilter {
    pub fn new(style: &BackdropStyle, theme: Theme) -> Self {
        Self {
            contrast: style.contrast,
            brightness: style.brightness,
            opacity: style.opacity_for(theme),
            background: theme.background_rgb(),
        }
    }

    fn channel(&self, c: u8) -> f32 {
        let c = f32::from(c) / 255.0;
        let c = ((c - 0.5) * self.contrast + 0.5).clamp(0.0, 1.0);
        (c * self.brightness).clamp(0.0, 1.0)
    }

    /// Final opaque color of one canvas pixel as seen on the page.
    pub fn apply(&self, px: [u8; 4]) -> [u8; 3] {
        let alpha = (f32::from(px[3]) / 255.0) * self.opacity;
        let mut out = [0u8; 3];
        for (i, slot) in out.iter_mut().enumerate() {
            let fg = self.channel(px[i]);
            let bg = f32::from(self.background[i]) / 255.0;
            *slot = ((fg * alpha + bg * (1.0 - alpha)) * 255.0).round() as u8;
        }
        out
    }

    /// Flatten an RGBA8 canvas buffer into an opaque image.
    pub fn compose(&self, width: u32, height: u32, pixels: &[u8]) -> RgbaImage {
        let mut out = RgbaImage::new(width, height);
        for (dst, src) in out.pixels_mut().zip(pixels.chunks_exact(4)) {
            let [r, g, b] = self.apply([src[0], src[1], src[2], src[3]]);
            *dst = Rgba([r, g, b, 255]);
        }
        out
    }
}

//! Drawing surfaces the backdrop paints into.

use anyhow::{Context, Result};
use fast_image_resize as fir;

use crate::events::PreparedFrame;
use crate::processing::layout::DrawRect;

/// A 2D drawing surface with a resizable pixel buffer.
pub trait Canvas {
    /// Buffer dimensions in pixels.
    fn size(&self) -> (u32, u32);

    /// Reallocate the buffer. Like a platform canvas, this discards the contents.
    fn resize(&mut self, width: u32, height: u32);

    /// Reset every pixel to transparent.
    fn clear(&mut self);

    /// Draw `frame` scaled into `rect`, clipped to the buffer.
    fn draw_image(&mut self, frame: &PreparedFrame, rect: DrawRect) -> Result<()>;
}

/// RGBA8 canvas held in memory; what the window uploads and snapshots encode.
pub struct CpuCanvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    resizer: fir::Resizer,
}

impl std::fmt::Debug for CpuCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuCanvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl CpuCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; buffer_len(width, height)],
            resizer: fir::Resizer::new(),
        }
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize * self.width as usize) + x as usize) * 4;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }

}

fn buffer_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 4
}

/// Pixel span `[start, end)` covered by `[lo, hi)` after clipping to `[0, limit]`.
fn clip_span(lo: f64, hi: f64, limit: u32) -> Option<(u32, u32)> {
    let start = lo.max(0.0).round();
    let end = hi.min(f64::from(limit)).round();
    if !(end > start) {
        return None;
    }
    Some((start as u32, end as u32))
}

impl Canvas for CpuCanvas {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(buffer_len(width, height), 0);
    }

    fn clear(&mut self) {
        self.pixels.fill(0);
    }

    fn draw_image(&mut self, frame: &PreparedFrame, rect: DrawRect) -> Result<()> {
        if frame.width == 0 || frame.height == 0 || rect.width <= 0.0 || rect.height <= 0.0 {
            return Ok(());
        }
        let Some((dx0, dx1)) = clip_span(rect.x, rect.x + rect.width, self.width) else {
            return Ok(());
        };
        let Some((dy0, dy1)) = clip_span(rect.y, rect.y + rect.height, self.height) else {
            return Ok(());
        };
        let (dw, dh) = (dx1 - dx0, dy1 - dy0);

        // Map the visible destination span back into source pixels.
        let sx_scale = f64::from(frame.width) / rect.width;
        let sy_scale = f64::from(frame.height) / rect.height;
        let fw = f64::from(frame.width);
        let fh = f64::from(frame.height);
        let left = ((f64::from(dx0) - rect.x) * sx_scale).clamp(0.0, fw);
        let top = ((f64::from(dy0) - rect.y) * sy_scale).clamp(0.0, fh);
        let crop_w = (f64::from(dw) * sx_scale).min(fw - left);
        let crop_h = (f64::from(dh) * sy_scale).min(fh - top);
        if crop_w <= 0.0 || crop_h <= 0.0 {
            return Ok(());
        }

        let src = fir::images::ImageRef::new(
            frame.width,
            frame.height,
            &frame.pixels,
            fir::PixelType::U8x4,
        )
        .context("failed to create source view for frame draw")?;
        let mut dst = fir::images::Image::new(dw, dh, fir::PixelType::U8x4);
        let options = fir::ResizeOptions::new()
            .crop(left, top, crop_w, crop_h)
            .resize_alg(fir::ResizeAlg::Convolution(fir::FilterType::Bilinear))
            // premultiply while filtering so transparent texels add no color
            .use_alpha(true);
        self.resizer
            .resize(&src, &mut dst, Some(&options))
            .context("frame resample failed")?;

        let scaled = dst.buffer();
        let row_bytes = dw as usize * 4;
        for row in 0..dh as usize {
            let src_row = &scaled[row * row_bytes..(row + 1) * row_bytes];
            let start = ((dy0 as usize + row) * self.width as usize + dx0 as usize) * 4;
            let dst_row = &mut self.pixels[start..start + row_bytes];
            blend_row(dst_row, src_row);
        }
        Ok(())
    }
}

/// Source-over compositing with straight alpha.
fn blend_row(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        match s[3] {
            255 => d.copy_from_slice(s),
            0 => {}
            sa => {
                let sa = f32::from(sa) / 255.0;
                let da = f32::from(d[3]) / 255.0;
                let out_a = sa + da * (1.0 - sa);
                for c in 0..3 {
                    let sc = f32::from(s[c]) * sa;
                    let dc = f32::from(d[c]) * da * (1.0 - sa);
                    d[c] = ((sc + dc) / out_a).round().clamp(0.0, 255.0) as u8;
                }
                d[3] = (out_a * 255.0).round() as u8;
            }
        }
    }
}

/// Destination rectangle of an image on the canvas, in canvas pixels.
///
/// Offsets may be negative: a cover-fit image overflows the canvas on one
/// axis and is centered, so part of it lies outside the visible area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DrawRect {
    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }
}

/// Scale an image so it fully covers the canvas while keeping its aspect
/// ratio, then center it. The constraining axis matches the canvas exactly;
/// the other axis overflows and is cropped evenly on both sides.
pub fn cover_rect(canvas_w: u32, canvas_h: u32, image_w: u32, image_h: u32) -> DrawRect {
    let cw = f64::from(canvas_w.max(1));
    let ch = f64::from(canvas_h.max(1));
    let image_aspect = f64::from(image_w.max(1)) / f64::from(image_h.max(1));
    let canvas_aspect = cw / ch;

    if canvas_aspect > image_aspect {
        let height = cw / image_aspect;
        DrawRect {
            x: 0.0,
            y: (ch - height) / 2.0,
            width: cw,
            height,
        }
    } else {
        let width = ch * image_aspect;
        DrawRect {
            x: (cw - width) / 2.0,
            y: 0.0,
            width,
            height: ch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_canvas_fills_width_and_centers_vertically() {
        // 2:1 canvas, 4:3 image
        let r = cover_rect(1000, 500, 400, 300);
        assert_eq!(r.x, 0.0);
        assert_eq!(r.width, 1000.0);
        assert!((r.height - 750.0).abs() < 1e-9);
        assert!((r.y + 125.0).abs() < 1e-9);
    }

    #[test]
    fn matching_aspect_fills_exactly() {
        let r = cover_rect(1920, 1080, 3840, 2160);
        assert_eq!((r.x, r.y), (0.0, 0.0));
        assert!((r.width - 1920.0).abs() < 1e-9);
        assert!((r.height - 1080.0).abs() < 1e-9);
    }
}

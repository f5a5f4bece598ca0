use scroll_backdrop::processing::layout::{DrawRect, cover_rect};

fn rect_close(a: DrawRect, b: (f64, f64, f64, f64), eps: f64) {
    assert!((a.x - b.0).abs() <= eps, "x mismatch: {:?} vs {:?}", a, b);
    assert!((a.y - b.1).abs() <= eps, "y mismatch: {:?} vs {:?}", a, b);
    assert!((a.width - b.2).abs() <= eps, "w mismatch: {:?} vs {:?}", a, b);
    assert!((a.height - b.3).abs() <= eps, "h mismatch: {:?} vs {:?}", a, b);
}

#[test]
fn wide_image_on_4x3_canvas_fills_height() {
    // 1600x900 (1.778) on 800x600 (1.333): canvas is narrower, fill height
    let rect = cover_rect(800, 600, 1600, 900);
    // w = 600 * 16/9 = 1066.67, x = (800 - 1066.67) / 2 = -133.33
    rect_close(rect, (-133.333, 0.0, 1066.667, 600.0), 0.001);
}

#[test]
fn tall_image_on_16x9_canvas_fills_width() {
    // 1000x1500 portrait on 1920x1080
    let rect = cover_rect(1920, 1080, 1000, 1500);
    // h = 1920 / (2/3) = 2880, y = (1080 - 2880) / 2 = -900
    rect_close(rect, (0.0, -900.0, 1920.0, 2880.0), 0.001);
}

#[test]
fn square_image_on_portrait_canvas() {
    let rect = cover_rect(1080, 1920, 1000, 1000);
    rect_close(rect, (-420.0, 0.0, 1920.0, 1920.0), 0.001);
}

#[test]
fn cover_always_fills_canvas_and_keeps_aspect() {
    let canvases = [(800, 600), (1920, 1080), (1080, 1920), (1, 1), (3, 1000), (4096, 7)];
    let images = [(1600, 900), (900, 1600), (1, 1), (640, 480), (7, 3001), (5000, 2)];
    for &(cw, ch) in &canvases {
        for &(iw, ih) in &images {
            let r = cover_rect(cw, ch, iw, ih);
            let eps = 1e-6 * f64::from(cw.max(ch));
            assert!(r.width + eps >= f64::from(cw), "{cw}x{ch} <- {iw}x{ih}: {r:?}");
            assert!(r.height + eps >= f64::from(ch), "{cw}x{ch} <- {iw}x{ih}: {r:?}");
            let image_aspect = f64::from(iw) / f64::from(ih);
            assert!(
                (r.aspect() - image_aspect).abs() <= 1e-9 * image_aspect.max(1.0),
                "aspect drift for {cw}x{ch} <- {iw}x{ih}: {r:?}"
            );
            // centered: overflow split evenly, never positive offsets
            assert!(r.x <= eps && r.y <= eps);
            assert!((r.x * 2.0 + r.width - f64::from(cw)).abs() <= eps);
            assert!((r.y * 2.0 + r.height - f64::from(ch)).abs() <= eps);
        }
    }
}

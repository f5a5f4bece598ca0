use std::path::Path;

use image::{Rgba, RgbaImage};
use scroll_backdrop::config::{BackdropStyle, Configuration};
use scroll_backdrop::mapper::ScrollProgress;
use scroll_backdrop::render::renderer::RenderOutcome;
use scroll_backdrop::tasks::snapshot::render_to_file;
use scroll_backdrop::theme::Theme;
use tokio_util::sync::CancellationToken;

fn write_frames(dir: &Path, colors: &[[u8; 3]]) {
    let images = dir.join("images");
    std::fs::create_dir_all(&images).unwrap();
    for (i, [r, g, b]) in colors.iter().copied().enumerate() {
        RgbaImage::from_pixel(16, 9, Rgba([r, g, b, 255]))
            .save(images.join(format!("frame_{:03}.png", i + 1)))
            .unwrap();
    }
}

fn identity_config(base: &Path) -> Configuration {
    Configuration {
        asset_base_path: base.to_path_buf(),
        frame_directory: Some("images".into()),
        backdrop: BackdropStyle {
            dark_opacity: 1.0,
            light_opacity: 1.0,
            contrast: 1.0,
            brightness: 1.0,
        },
        ..Configuration::default()
    }
    .validated()
    .unwrap()
}

#[tokio::test]
async fn renders_frame_under_progress_to_png() {
    let dir = tempfile::tempdir().unwrap();
    write_frames(dir.path(), &[[255, 0, 0], [0, 255, 0], [0, 0, 255]]);
    let cfg = identity_config(dir.path());
    let seq = cfg.frame_sequence().unwrap();
    let out = dir.path().join("out/snap.png");

    let report = render_to_file(
        &cfg,
        &seq,
        ScrollProgress::new(0.5),
        (40, 30),
        Theme::Dark,
        &out,
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.index, Some(1));
    assert_eq!(report.outcome, RenderOutcome::Painted(1));
    assert_eq!((report.ready, report.frames), (3, 3));

    let img = image::open(&out).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (40, 30));
    let px = img.get_pixel(20, 15).0;
    assert!(px[0] <= 1 && px[1] >= 254 && px[2] <= 1, "{px:?}");
}

#[tokio::test]
async fn broken_frame_produces_background_only() {
    let dir = tempfile::tempdir().unwrap();
    write_frames(dir.path(), &[[255, 255, 255]]);
    std::fs::write(dir.path().join("images/frame_002.png"), b"garbage").unwrap();
    let cfg = identity_config(dir.path());
    let seq = cfg.frame_sequence().unwrap();
    let out = dir.path().join("snap.png");

    let report = render_to_file(
        &cfg,
        &seq,
        ScrollProgress::END,
        (8, 8),
        Theme::Light,
        &out,
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.outcome, RenderOutcome::NotReady(1));
    assert_eq!(report.ready, 1);
    let img = image::open(&out).unwrap().to_rgba8();
    let bg = Theme::Light.background_rgb();
    assert!(img.pixels().all(|p| p.0[..3] == bg));
}

#[tokio::test]
async fn empty_sequence_still_writes_background() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = Configuration {
        asset_base_path: dir.path().to_path_buf(),
        ..Configuration::default()
    };
    let seq = cfg.frame_sequence().unwrap();
    let out = dir.path().join("empty.png");

    let report = render_to_file(
        &cfg,
        &seq,
        ScrollProgress::START,
        (4, 4),
        Theme::Dark,
        &out,
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.outcome, RenderOutcome::Empty);
    assert_eq!(report.index, None);
    assert!(out.exists());
}

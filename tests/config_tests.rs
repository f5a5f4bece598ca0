use std::path::PathBuf;

use scroll_backdrop::config::Configuration;
use scroll_backdrop::theme::Theme;

#[test]
fn parse_kebab_case_config() {
    let yaml = r#"
asset-base-path: "/srv/portfolio"
frames: ["images/frame_001.jpg", "images/frame_002.jpg"]
loader-max-concurrent-decodes: 8
repaint-on-ready: true
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let cfg = cfg.validated().unwrap();
    assert_eq!(cfg.asset_base_path, PathBuf::from("/srv/portfolio"));
    assert_eq!(cfg.loader_max_concurrent_decodes, 8);
    assert!(cfg.repaint_on_ready);

    let seq = cfg.frame_sequence().unwrap();
    assert_eq!(seq.len(), 2);
    assert_eq!(
        cfg.asset_base().resolve(seq.get(1).unwrap()),
        PathBuf::from("/srv/portfolio/images/frame_002.jpg")
    );
}

#[test]
fn defaults_match_the_page_backdrop() {
    let cfg: Configuration = serde_yaml::from_str("{}").unwrap();
    let cfg = cfg.validated().unwrap();
    assert!(!cfg.repaint_on_ready);
    assert!(cfg.frame_sequence().unwrap().is_empty());
    assert!((cfg.backdrop.opacity_for(Theme::Dark) - 0.2).abs() < f32::EPSILON);
    assert!((cfg.backdrop.opacity_for(Theme::Light) - 0.4).abs() < f32::EPSILON);
    assert!((cfg.backdrop.contrast - 1.1).abs() < f32::EPSILON);
    assert!((cfg.backdrop.brightness - 0.9).abs() < f32::EPSILON);
    assert_eq!(cfg.theme_store_path, PathBuf::from("theme.json"));
}

#[test]
fn nested_sections_parse() {
    let yaml = r#"
scroll:
  content-height-px: 12000
  line-height-px: 60
backdrop:
  dark-opacity: 0.3
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(cfg.scroll.content_height_px, 12000.0);
    assert_eq!(cfg.scroll.line_height_px, 60.0);
    assert!((cfg.backdrop.dark_opacity - 0.3).abs() < f32::EPSILON);
    assert!((cfg.backdrop.light_opacity - 0.4).abs() < f32::EPSILON);
}

#[test]
fn unknown_keys_are_rejected() {
    let err = serde_yaml::from_str::<Configuration>("frame-names: [a]").unwrap_err();
    assert!(err.to_string().contains("unknown field"), "{err}");
}

#[test]
fn zero_concurrency_is_invalid() {
    let cfg: Configuration = serde_yaml::from_str("loader-max-concurrent-decodes: 0").unwrap();
    let err = cfg.validated().unwrap_err();
    assert!(format!("{err:#}").contains("loader-max-concurrent-decodes"));
}

#[test]
fn opacity_outside_unit_range_is_invalid() {
    let cfg: Configuration = serde_yaml::from_str("backdrop: { light-opacity: 1.5 }").unwrap();
    let err = cfg.validated().unwrap_err();
    assert!(format!("{err:#}").contains("light-opacity"), "{err:#}");
}

#[test]
fn empty_frame_name_is_invalid() {
    let cfg: Configuration = serde_yaml::from_str(r#"frames: ["a.jpg", " "]"#).unwrap();
    assert!(cfg.validated().is_err());
}

#[test]
fn frame_directory_is_listed_when_no_explicit_frames() {
    let dir = tempfile::tempdir().unwrap();
    let images = dir.path().join("images");
    std::fs::create_dir(&images).unwrap();
    for name in ["b.png", "a.png", "readme.md"] {
        std::fs::write(images.join(name), b"x").unwrap();
    }
    let yaml = format!(
        "asset-base-path: {:?}\nframe-directory: images\n",
        dir.path().display().to_string()
    );
    let cfg: Configuration = serde_yaml::from_str(&yaml).unwrap();
    let seq = cfg.validated().unwrap().frame_sequence().unwrap();
    let names: Vec<_> = seq.iter().collect();
    assert_eq!(names, vec!["images/a.png", "images/b.png"]);
}

#[test]
fn loads_from_yaml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "frames: [one.jpg]\ntheme-store-path: /tmp/prefs/theme.json\n").unwrap();
    let cfg = Configuration::from_yaml_file(&path).unwrap();
    assert_eq!(cfg.frames, vec!["one.jpg".to_string()]);
    assert_eq!(cfg.theme_store_path, PathBuf::from("/tmp/prefs/theme.json"));
}

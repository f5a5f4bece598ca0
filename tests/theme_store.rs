use scroll_backdrop::theme::{Theme, ThemeStore};

#[test]
fn missing_file_defaults_to_dark() {
    let dir = tempfile::tempdir().unwrap();
    let store = ThemeStore::new(dir.path().join("theme.json"));
    assert_eq!(store.load(), Theme::Dark);
}

#[test]
fn save_then_load_persists_single_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs/theme.json");
    let store = ThemeStore::new(&path);

    store.save(Theme::Light).unwrap();
    assert_eq!(store.load(), Theme::Light);
    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw, serde_json::json!({ "theme": "light" }));

    store.save(Theme::Light.toggled()).unwrap();
    assert_eq!(store.load(), Theme::Dark);
}

#[test]
fn malformed_preference_falls_back_to_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("theme.json");
    std::fs::write(&path, r#"{"theme":"sepia"}"#).unwrap();
    assert_eq!(ThemeStore::new(&path).load(), Theme::Dark);
}

#[test]
fn theme_parses_case_insensitively() {
    assert_eq!("LIGHT".parse::<Theme>().unwrap(), Theme::Light);
    assert_eq!(" dark ".parse::<Theme>().unwrap(), Theme::Dark);
    assert!("blue".parse::<Theme>().is_err());
    assert_eq!(Theme::Light.to_string(), "light");
}

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

use crate::frames::{AssetBase, FrameSequence};
use crate::theme::Theme;

pub const DEFAULT_THEME_STORE_PATH: &str = "theme.json";

/// Extensions accepted when the frame list is discovered from a directory.
pub const FRAME_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct ScrollSettings {
    /// Height of the virtual page the backdrop scrubs through, in pixels.
    pub content_height_px: f64,
    /// Pixels scrolled per wheel line (mouse wheels report lines, touchpads pixels).
    pub line_height_px: f64,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            content_height_px: 8000.0,
            line_height_px: 48.0,
        }
    }
}

impl ScrollSettings {
    fn validate(&self) -> Result<()> {
        ensure!(
            self.content_height_px.is_finite() && self.content_height_px > 0.0,
            "scroll.content-height-px must be positive"
        );
        ensure!(
            self.line_height_px.is_finite() && self.line_height_px > 0.0,
            "scroll.line-height-px must be positive"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct BackdropStyle {
    pub dark_opacity: f32,
    pub light_opacity: f32,
    pub contrast: f32,
    pub brightness: f32,
}

impl Default for BackdropStyle {
    fn default() -> Self {
        Self {
            dark_opacity: 0.2,
            light_opacity: 0.4,
            contrast: 1.1,
            brightness: 0.9,
        }
    }
}

impl BackdropStyle {
    pub fn opacity_for(&self, theme: Theme) -> f32 {
        match theme {
            Theme::Dark => self.dark_opacity,
            Theme::Light => self.light_opacity,
        }
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("dark-opacity", self.dark_opacity),
            ("light-opacity", self.light_opacity),
        ] {
            ensure!(
                (0.0..=1.0).contains(&value),
                "backdrop.{name} must be within [0, 1]"
            );
        }
        ensure!(
            self.contrast.is_finite() && self.contrast >= 0.0,
            "backdrop.contrast must be non-negative"
        );
        ensure!(
            self.brightness.is_finite() && self.brightness >= 0.0,
            "backdrop.brightness must be non-negative"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Configuration {
    /// Prefix every frame name is resolved against.
    pub asset_base_path: PathBuf,
    /// Explicit, ordered frame names. Takes precedence over `frame-directory`.
    pub frames: Vec<String>,
    /// Directory (relative to the base path) listed for frames when `frames` is empty.
    pub frame_directory: Option<PathBuf>,
    /// Maximum number of concurrent image decodes in the loader.
    pub loader_max_concurrent_decodes: usize,
    /// Repaint as soon as the frame under the cursor finishes decoding instead
    /// of waiting for the next scroll or resize.
    pub repaint_on_ready: bool,
    /// JSON file holding the persisted theme preference.
    pub theme_store_path: PathBuf,
    pub scroll: ScrollSettings,
    pub backdrop: BackdropStyle,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            asset_base_path: PathBuf::from("."),
            frames: Vec::new(),
            frame_directory: None,
            loader_max_concurrent_decodes: 4,
            repaint_on_ready: false,
            theme_store_path: PathBuf::from(DEFAULT_THEME_STORE_PATH),
            scroll: ScrollSettings::default(),
            backdrop: BackdropStyle::default(),
        }
    }
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        ensure!(
            self.loader_max_concurrent_decodes > 0,
            "loader-max-concurrent-decodes must be greater than zero"
        );
        ensure!(
            !self.asset_base_path.as_os_str().is_empty(),
            "asset-base-path must not be empty"
        );
        ensure!(
            !self.theme_store_path.as_os_str().is_empty(),
            "theme-store-path must not be empty"
        );
        ensure!(
            self.frames.iter().all(|name| !name.trim().is_empty()),
            "frames must not contain empty names"
        );
        self.scroll
            .validate()
            .context("invalid scroll configuration")?;
        self.backdrop
            .validate()
            .context("invalid backdrop configuration")?;
        Ok(self)
    }

    pub fn asset_base(&self) -> AssetBase {
        AssetBase::new(self.asset_base_path.clone())
    }

    /// Resolve the frame sequence: the explicit list when given, otherwise
    /// the sorted image files of `frame-directory`. Neither yields an empty
    /// sequence, which the renderer treats as a no-op.
    pub fn frame_sequence(&self) -> Result<FrameSequence> {
        if !self.frames.is_empty() {
            return Ok(FrameSequence::new(self.frames.iter().cloned()));
        }
        match &self.frame_directory {
            Some(dir) => {
                let base = self.asset_base();
                FrameSequence::discover(&base, dir, FRAME_EXTENSIONS).with_context(|| {
                    format!("failed to list frames under {}", base.resolve(dir).display())
                })
            }
            None => Ok(FrameSequence::default()),
        }
    }
}

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Page background behind the backdrop (slate-950 / slate-50), sRGB.
    pub fn background_rgb(self) -> [u8; 3] {
        match self {
            Self::Dark => [0x02, 0x06, 0x17],
            Self::Light => [0xf8, 0xfa, 0xfc],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            other => anyhow::bail!("unknown theme '{other}' (expected dark or light)"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredPreference {
    theme: Theme,
}

/// Single-key JSON file remembering the last chosen theme.
#[derive(Debug, Clone)]
pub struct ThemeStore {
    path: PathBuf,
}

impl ThemeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable preferences fall back to the default theme.
    pub fn load(&self) -> Theme {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                debug!(path = %self.path.display(), error = %err, "no stored theme; using default");
                return Theme::default();
            }
        };
        match serde_json::from_str::<StoredPreference>(&raw) {
            Ok(pref) => pref.theme,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "ignoring malformed theme preference");
                Theme::default()
            }
        }
    }

    pub fn save(&self, theme: Theme) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let body = serde_json::to_string(&StoredPreference { theme })?;
        std::fs::write(&self.path, body)
            .with_context(|| format!("failed to write theme preference to {}", self.path.display()))
    }
}

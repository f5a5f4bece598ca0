//! Frame sequence and the eagerly preloaded asset pool behind it.
//!
//! Every frame gets a write-once slot. The loader fills slots as decodes
//! complete; the renderer polls them. A slot never empties again, and a slot
//! that is never filled (missing file, corrupt data) is skipped at render time.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::events::{LoadFrame, PreparedFrame};

/// Ordered, immutable list of frame identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameSequence {
    names: Arc<[String]>,
}

impl FrameSequence {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// List image files directly under `base/dir`, sorted by file name. The
    /// returned names are relative to `base` so they resolve the same way an
    /// explicit list does.
    pub fn discover(base: &AssetBase, dir: &Path, extensions: &[&str]) -> Result<Self> {
        let root = base.resolve(dir);
        let mut names = Vec::new();
        for entry in WalkDir::new(&root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.with_context(|| format!("failed to read {}", root.display()))?;
            if !entry.file_type().is_file() || !has_extension(entry.path(), extensions) {
                continue;
            }
            let relative = dir.join(entry.file_name());
            names.push(relative.to_string_lossy().into_owned());
        }
        info!(dir = %root.display(), count = names.len(), "discovered frames");
        Ok(Self::new(names))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Base path every frame name is served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetBase {
    root: PathBuf,
}

impl AssetBase {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, name: impl AsRef<Path>) -> PathBuf {
        self.root.join(name)
    }
}

/// Shared write-once cell a decoded frame lands in.
#[derive(Debug, Clone, Default)]
pub struct FrameSlot(Arc<OnceLock<PreparedFrame>>);

impl FrameSlot {
    /// Returns `false` when the slot was already filled; the first frame wins.
    pub fn fill(&self, frame: PreparedFrame) -> bool {
        self.0.set(frame).is_ok()
    }

    pub fn get(&self) -> Option<&PreparedFrame> {
        self.0.get()
    }
}

#[derive(Debug, Clone)]
pub struct FrameAsset {
    pub index: usize,
    pub source: PathBuf,
    slot: FrameSlot,
}

impl FrameAsset {
    /// The decoded frame, once its pixels and dimensions are known.
    pub fn ready(&self) -> Option<&PreparedFrame> {
        self.slot
            .get()
            .filter(|frame| frame.width > 0 && frame.height > 0)
    }

    pub fn is_ready(&self) -> bool {
        self.ready().is_some()
    }
}

/// Position-indexed pool of frame assets, owned by a single backdrop instance.
#[derive(Debug, Default)]
pub struct FrameStore {
    assets: Vec<FrameAsset>,
}

impl FrameStore {
    /// Create one asset per frame name and queue its decode. Never blocks: the
    /// requests go out on an unbounded channel and are decoded by the loader.
    pub fn initialize(
        sequence: &FrameSequence,
        base: &AssetBase,
        requests: &UnboundedSender<LoadFrame>,
    ) -> Self {
        let mut assets = Vec::with_capacity(sequence.len());
        for (index, name) in sequence.iter().enumerate() {
            let asset = FrameAsset {
                index,
                source: base.resolve(name),
                slot: FrameSlot::default(),
            };
            let request = LoadFrame {
                index,
                path: asset.source.clone(),
                slot: asset.slot.clone(),
            };
            if requests.send(request).is_err() {
                debug!(index, "loader unavailable; frame stays unready");
            }
            assets.push(asset);
        }
        info!(frames = assets.len(), base = %base.root().display(), "frame store initialized");
        Self { assets }
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FrameAsset> {
        self.assets.get(index)
    }

    pub fn ready_count(&self) -> usize {
        self.assets.iter().filter(|asset| asset.is_ready()).count()
    }
}

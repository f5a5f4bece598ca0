use std::path::PathBuf;

use crate::frames::FrameSlot;

/// Decode request issued once per frame when the store initializes.
#[derive(Debug, Clone)]
pub struct LoadFrame {
    pub index: usize,
    pub path: PathBuf,
    pub slot: FrameSlot,
}

/// A frame decoded to tightly packed RGBA8.
#[derive(Debug, Clone)]
pub struct PreparedFrame {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Emitted by the loader after a frame's slot has been filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReady(pub usize);

//! Camera Capture Library for Driver Monitoring
//!
//! Provides the frame acquisition seam used by the drowsiness pipeline:
//! - `FrameSource` trait implemented by concrete capture backends
//! - Synthetic cabin camera (test pattern at a fixed rate) for replay runs
//! - RGB video frame type with the resize helpers detectors need

pub mod frame;
pub mod source;

pub use frame::VideoFrame;
pub use source::{FrameSource, SyntheticCamera};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Camera error types
#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Failed to open camera: {0}")]
    Open(String),

    /// Transient: no frame available this iteration
    #[error("Frame read failed: {0}")]
    Read(String),

    #[error("Capture timeout")]
    Timeout,

    #[error("Camera not initialized")]
    NotInitialized,

    #[error("End of frame stream")]
    EndOfStream,
}

impl CameraError {
    /// Whether the capture loop should skip this iteration and keep going
    pub fn is_transient(&self) -> bool {
        matches!(self, CameraError::Read(_) | CameraError::Timeout)
    }
}

/// Camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Device path (e.g., "/dev/video0")
    pub device: String,
    /// Capture width
    pub width: u32,
    /// Capture height
    pub height: u32,
    /// Target FPS
    pub fps: u32,
    /// Stop after this many frames (replay runs)
    pub max_frames: Option<u64>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self::cabin()
    }
}

impl CameraConfig {
    /// Create cabin camera config (DMS)
    pub fn cabin() -> Self {
        Self {
            device: "/dev/video0".to_string(),
            width: 640,
            height: 480,
            fps: 15,
            max_frames: None,
        }
    }

    /// Interval between frames at the configured rate
    pub fn frame_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.fps.max(1) as f64)
    }
}

//! Facial landmark detection seam
//!
//! Face and landmark detection is an external collaborator. The pipeline only
//! needs the two 6-point eye contours of the primary face per frame, which any
//! backend delivers through [`LandmarkDetector`].

use camera_capture::VideoFrame;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

use crate::DmsError;

/// Six eye-contour points in image coordinates.
///
/// Order: outer corner, upper lid (2), inner corner, lower lid (2).
pub type EyePoints = [(f32, f32); 6];

/// Eye contours of one detected face
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceLandmarks {
    pub left_eye: EyePoints,
    pub right_eye: EyePoints,
}

/// Landmark detector backend
pub trait LandmarkDetector: Send {
    /// Detect faces in a frame. An empty result means no face this frame.
    fn detect(&mut self, frame: &VideoFrame) -> Result<Vec<FaceLandmarks>, DmsError>;

    /// Whether detection reads pixel data. Frames for detectors that do are
    /// resized to the working width first.
    fn uses_pixels(&self) -> bool {
        true
    }
}

/// One line of a landmark trace
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraceFrame {
    #[serde(default)]
    pub faces: Vec<FaceLandmarks>,
}

/// Replays recorded landmarks, one JSON object per line, indexed by frame
/// sequence number. Frames past the end of the trace have no face.
pub struct TraceDetector {
    frames: Vec<TraceFrame>,
}

impl TraceDetector {
    /// Load a trace file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DmsError> {
        let path = path.as_ref();
        info!("Loading landmark trace from {}", path.display());
        let file = File::open(path).map_err(|e| {
            DmsError::DetectorUnavailable(format!("cannot open {}: {}", path.display(), e))
        })?;
        Self::from_reader(file)
    }

    /// Parse a trace from any reader. Blank lines are ignored.
    pub fn from_reader(reader: impl Read) -> Result<Self, DmsError> {
        let mut frames = Vec::new();
        for (idx, line) in BufReader::new(reader).lines().enumerate() {
            let line = line.map_err(|e| DmsError::DetectorUnavailable(e.to_string()))?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let frame: TraceFrame = serde_json::from_str(line).map_err(|e| {
                DmsError::DetectorUnavailable(format!("trace line {}: {}", idx + 1, e))
            })?;
            frames.push(frame);
        }

        if frames.is_empty() {
            return Err(DmsError::DetectorUnavailable("landmark trace is empty".into()));
        }

        info!("Landmark trace loaded: {} frames", frames.len());
        Ok(Self { frames })
    }

    /// Build a detector from in-memory frames
    pub fn from_frames(frames: Vec<TraceFrame>) -> Self {
        Self { frames }
    }

    /// Number of recorded frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the trace holds no frames
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl LandmarkDetector for TraceDetector {
    fn detect(&mut self, frame: &VideoFrame) -> Result<Vec<FaceLandmarks>, DmsError> {
        match self.frames.get(frame.sequence as usize) {
            Some(recorded) => Ok(recorded.faces.clone()),
            None => {
                debug!("Frame {} is past the end of the trace", frame.sequence);
                Ok(Vec::new())
            }
        }
    }

    /// Only the frame sequence is read
    fn uses_pixels(&self) -> bool {
        false
    }
}

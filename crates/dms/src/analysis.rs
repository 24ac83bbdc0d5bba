//! DMS analysis results

use serde::{Deserialize, Serialize};

use crate::state::DrowsinessOutcome;

/// What the monitor could make of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FrameStatus {
    /// Eye openness was measured and fed to the state machine
    #[default]
    Observed,
    /// No face in the frame; state left untouched
    NoFace,
    /// Eye contour collapsed (zero width); frame skipped
    Degenerate,
}

/// Per-frame DMS analysis result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DmsAnalysis {
    /// Frame sequence number
    pub sequence: u32,

    pub status: FrameStatus,

    /// Number of faces the detector reported (only the first is used)
    pub faces: usize,

    /// Averaged eye aspect ratio (if measured)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ear: Option<f32>,

    /// State machine verdict
    pub outcome: DrowsinessOutcome,

    /// Low-openness streak after this frame
    pub consecutive_low_frames: u32,
}

impl DmsAnalysis {
    /// Whether an actionable alert fired on this frame
    pub fn is_alert(&self) -> bool {
        self.outcome == DrowsinessOutcome::Alert
    }

    /// Whether the drowsy indicator should be shown
    pub fn is_drowsy(&self) -> bool {
        self.outcome.is_drowsy()
    }
}

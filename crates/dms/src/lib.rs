//! Driver Monitoring System (DMS)
//!
//! Real-time drowsiness detection from facial landmarks:
//! - Eye aspect ratio (EAR) from 6-point eye contours
//! - Debounced, cooldown-gated drowsiness alerts
//! - Landmark detector seam (trace replay bundled)

pub mod analysis;
pub mod config;
pub mod detector;
pub mod ear;
pub mod state;

pub use analysis::{DmsAnalysis, FrameStatus};
pub use config::DmsConfig;
pub use detector::{EyePoints, FaceLandmarks, LandmarkDetector, TraceDetector, TraceFrame};
pub use ear::{eye_aspect_ratio, mean_eye_aspect_ratio};
pub use state::{DrowsinessMonitor, DrowsinessOutcome, DrowsinessState};

use camera_capture::VideoFrame;
use std::time::Instant;
use thiserror::Error;
use tracing::debug;

/// DMS error types
#[derive(Error, Debug)]
pub enum DmsError {
    #[error("Degenerate eye geometry: eye width {width}")]
    DegenerateGeometry { width: f32 },

    #[error("Landmark detector unavailable: {0}")]
    DetectorUnavailable(String),

    #[error("Detection failed: {0}")]
    Detection(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Driver monitoring module: detector + EAR + drowsiness state machine
pub struct DmsModule {
    config: DmsConfig,
    detector: Box<dyn LandmarkDetector>,
    monitor: DrowsinessMonitor,
}

impl DmsModule {
    /// Create a new DMS module with configuration
    pub fn new(config: DmsConfig, detector: Box<dyn LandmarkDetector>) -> Result<Self, DmsError> {
        config.validate()?;
        Ok(Self {
            monitor: DrowsinessMonitor::new(config.clone()),
            detector,
            config,
        })
    }

    /// Analyze a single frame for driver state.
    ///
    /// Errors are detector failures for this frame only; geometry problems
    /// and missing faces are reported through [`FrameStatus`].
    pub fn analyze(&mut self, frame: &VideoFrame, now: Instant) -> Result<DmsAnalysis, DmsError> {
        let faces = if self.detector.uses_pixels() {
            let working = frame.resize_to_width(self.config.working_width);
            self.detector.detect(&working)?
        } else {
            self.detector.detect(frame)?
        };

        let mut analysis = DmsAnalysis {
            sequence: frame.sequence,
            faces: faces.len(),
            ..Default::default()
        };

        // Single primary face
        let Some(face) = faces.first() else {
            analysis.status = FrameStatus::NoFace;
            analysis.consecutive_low_frames = self.monitor.state().consecutive_low_frames;
            return Ok(analysis);
        };

        match mean_eye_aspect_ratio(face) {
            Ok(ear) => {
                analysis.ear = Some(ear);
                analysis.outcome = self.monitor.observe(ear, now);
            }
            Err(e) => {
                debug!("Skipping frame {}: {}", frame.sequence, e);
                analysis.status = FrameStatus::Degenerate;
            }
        }

        analysis.consecutive_low_frames = self.monitor.state().consecutive_low_frames;
        Ok(analysis)
    }

    /// Drowsiness state machine
    pub fn monitor(&self) -> &DrowsinessMonitor {
        &self.monitor
    }

    /// Reset driver state (on driver change)
    pub fn reset_state(&mut self) {
        self.monitor.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Detector returning a scripted sequence of per-frame results
    struct Scripted(VecDeque<Result<Vec<FaceLandmarks>, DmsError>>);

    impl LandmarkDetector for Scripted {
        fn detect(&mut self, _frame: &VideoFrame) -> Result<Vec<FaceLandmarks>, DmsError> {
            self.0.pop_front().unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn eye(opening: f32) -> EyePoints {
        [
            (0.0, 0.0),
            (1.0, -opening),
            (2.0, -opening),
            (3.0, 0.0),
            (2.0, opening),
            (1.0, opening),
        ]
    }

    fn face(opening: f32) -> FaceLandmarks {
        FaceLandmarks {
            left_eye: eye(opening),
            right_eye: eye(opening),
        }
    }

    fn frame(sequence: u32) -> VideoFrame {
        VideoFrame::new(vec![0; 4 * 3 * 3], 4, 3, 0, sequence)
    }

    fn module(script: Vec<Result<Vec<FaceLandmarks>, DmsError>>, frames: u32) -> DmsModule {
        let config = DmsConfig {
            required_consecutive_frames: frames,
            ..Default::default()
        };
        DmsModule::new(config, Box::new(Scripted(script.into()))).unwrap()
    }

    #[test]
    fn test_open_eyes_no_signal() {
        let mut dms = module(vec![Ok(vec![face(1.0)])], 3);
        let analysis = dms.analyze(&frame(0), Instant::now()).unwrap();

        assert_eq!(analysis.status, FrameStatus::Observed);
        assert!(analysis.ear.unwrap() > 0.6);
        assert_eq!(analysis.outcome, DrowsinessOutcome::NoSignal);
    }

    #[test]
    fn test_missing_face_does_not_reset_streak() {
        let script = vec![
            Ok(vec![face(0.1)]),
            Ok(vec![face(0.1)]),
            Ok(vec![]),
            Ok(vec![face(0.1)]),
        ];
        let mut dms = module(script, 3);
        let start = Instant::now();

        dms.analyze(&frame(0), start).unwrap();
        dms.analyze(&frame(1), start + Duration::from_millis(66)).unwrap();
        let absent = dms.analyze(&frame(2), start + Duration::from_millis(133)).unwrap();
        assert_eq!(absent.status, FrameStatus::NoFace);
        assert_eq!(absent.consecutive_low_frames, 2);

        let third = dms.analyze(&frame(3), start + Duration::from_millis(200)).unwrap();
        assert!(third.is_alert());
        assert_eq!(third.consecutive_low_frames, 3);
    }

    #[test]
    fn test_degenerate_frame_is_skipped() {
        let mut collapsed = face(0.1);
        collapsed.left_eye[3] = collapsed.left_eye[0];
        let script = vec![Ok(vec![face(0.1)]), Ok(vec![collapsed]), Ok(vec![face(0.1)])];
        let mut dms = module(script, 3);
        let now = Instant::now();

        dms.analyze(&frame(0), now).unwrap();
        let skipped = dms.analyze(&frame(1), now).unwrap();
        assert_eq!(skipped.status, FrameStatus::Degenerate);
        assert!(skipped.ear.is_none());
        assert_eq!(skipped.consecutive_low_frames, 1);

        let next = dms.analyze(&frame(2), now).unwrap();
        assert_eq!(next.consecutive_low_frames, 2);
    }

    #[test]
    fn test_only_primary_face_is_used() {
        let mut dms = module(vec![Ok(vec![face(0.1), face(1.0)])], 1);
        let analysis = dms.analyze(&frame(0), Instant::now()).unwrap();
        assert_eq!(analysis.faces, 2);
        assert!(analysis.is_alert());
    }

    #[test]
    fn test_detector_error_propagates() {
        let mut dms = module(vec![Err(DmsError::Detection("model crashed".into()))], 3);
        assert!(matches!(
            dms.analyze(&frame(0), Instant::now()),
            Err(DmsError::Detection(_))
        ));
    }

    /// Records the width of every frame it is handed
    struct WidthRecorder {
        pixels: bool,
        widths: Arc<Mutex<Vec<u32>>>,
    }

    impl LandmarkDetector for WidthRecorder {
        fn detect(&mut self, frame: &VideoFrame) -> Result<Vec<FaceLandmarks>, DmsError> {
            self.widths.lock().unwrap().push(frame.width);
            Ok(Vec::new())
        }

        fn uses_pixels(&self) -> bool {
            self.pixels
        }
    }

    fn width_seen_by_detector(pixels: bool) -> u32 {
        let widths = Arc::new(Mutex::new(Vec::new()));
        let detector = WidthRecorder {
            pixels,
            widths: widths.clone(),
        };
        let mut dms = DmsModule::new(DmsConfig::default(), Box::new(detector)).unwrap();
        let cabin = VideoFrame::new(vec![0; 640 * 480 * 3], 640, 480, 0, 0);
        dms.analyze(&cabin, Instant::now()).unwrap();

        let widths = widths.lock().unwrap();
        assert_eq!(widths.len(), 1);
        widths[0]
    }

    #[test]
    fn test_pixel_detectors_get_working_width() {
        assert_eq!(width_seen_by_detector(true), 450);
    }

    #[test]
    fn test_sequence_only_detectors_skip_resize() {
        assert_eq!(width_seen_by_detector(false), 640);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = DmsConfig {
            low_threshold: -1.0,
            ..Default::default()
        };
        assert!(DmsModule::new(config, Box::new(Scripted(VecDeque::new()))).is_err());
    }

    #[test]
    fn test_trace_detector_end_to_end() {
        let closed = r#"{"faces":[{"left_eye":[[0,0],[1,-0.1],[2,-0.1],[3,0],[2,0.1],[1,0.1]],"right_eye":[[0,0],[1,-0.1],[2,-0.1],[3,0],[2,0.1],[1,0.1]]}]}"#;
        let trace = vec![closed; 5].join("\n");
        let detector = TraceDetector::from_reader(trace.as_bytes()).unwrap();
        let config = DmsConfig {
            required_consecutive_frames: 5,
            ..Default::default()
        };
        let mut dms = DmsModule::new(config, Box::new(detector)).unwrap();
        let now = Instant::now();

        let alerts = (0..5)
            .filter(|&i| dms.analyze(&frame(i), now).unwrap().is_alert())
            .count();
        assert_eq!(alerts, 1);
    }
}

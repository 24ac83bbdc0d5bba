//! Monitoring session
//!
//! One sequential loop: read frame, analyze, alert. Recommendation work is
//! only posted, never awaited.

use alerting::{AlertEvent, AlertSink};
use camera_capture::{CameraError, FrameSource};
use dms::{DmsAnalysis, DmsModule, FrameStatus};
use rest_stops::{GeoPoint, RecommendationCapability};
use serde::Serialize;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::control::StopSignal;

/// Counters for one session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub frames: u64,
    pub read_failures: u64,
    pub detection_failures: u64,
    pub no_face_frames: u64,
    pub degenerate_frames: u64,
    pub drowsy_frames: u64,
    pub alerts: u64,
    pub dropped_requests: u64,
}

impl SessionStats {
    fn log(&self) {
        info!(
            "Session finished: {} frames, {} read failures, {} detection failures, {} without face, {} degenerate, {} drowsy, {} alerts, {} dropped recommendations",
            self.frames,
            self.read_failures,
            self.detection_failures,
            self.no_face_frames,
            self.degenerate_frames,
            self.drowsy_frames,
            self.alerts,
            self.dropped_requests
        );
    }
}

/// Drives the per-frame pipeline until stopped
pub struct Session {
    dms: DmsModule,
    source: Box<dyn FrameSource>,
    sink: Box<dyn AlertSink>,
    recommendations: RecommendationCapability,
    reference: Option<GeoPoint>,
    frame_interval: Duration,
    stop: StopSignal,
    was_drowsy: bool,
    stats: SessionStats,
}

impl Session {
    pub fn new(
        dms: DmsModule,
        source: Box<dyn FrameSource>,
        sink: Box<dyn AlertSink>,
        recommendations: RecommendationCapability,
        reference: Option<GeoPoint>,
        frame_interval: Duration,
        stop: StopSignal,
    ) -> Self {
        Self {
            dms,
            source,
            sink,
            recommendations,
            reference,
            frame_interval,
            stop,
            was_drowsy: false,
            stats: SessionStats::default(),
        }
    }

    /// Run until a stop request or the end of the frame stream.
    ///
    /// The frame source is released on every exit path. Only a broken
    /// source is an error.
    pub async fn run(mut self) -> Result<SessionStats, CameraError> {
        info!(
            "Monitoring started (recommendations {})",
            if self.recommendations.is_enabled() { "enabled" } else { "disabled" }
        );

        let mut ticker = tokio::time::interval(self.frame_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let result = loop {
            ticker.tick().await;
            if self.stop.is_triggered() {
                info!("Stop requested");
                break Ok(());
            }

            let frame = match self.source.read() {
                Ok(frame) => frame,
                Err(CameraError::EndOfStream) => {
                    info!("Frame stream ended");
                    break Ok(());
                }
                Err(e) if e.is_transient() => {
                    self.stats.read_failures += 1;
                    warn!("Frame read failed, skipping: {}", e);
                    continue;
                }
                Err(e) => break Err(e),
            };

            self.stats.frames += 1;
            let now = tokio::time::Instant::now().into_std();
            match self.dms.analyze(&frame, now) {
                Ok(analysis) => self.record(&analysis, now),
                Err(e) => {
                    self.stats.detection_failures += 1;
                    warn!("Landmark detection failed on frame {}: {}", frame.sequence, e);
                }
            }
        };

        self.source.release();
        self.stats.log();
        result.map(|()| self.stats)
    }

    fn record(&mut self, analysis: &DmsAnalysis, now: Instant) {
        match analysis.status {
            FrameStatus::NoFace => {
                self.stats.no_face_frames += 1;
                return;
            }
            FrameStatus::Degenerate => {
                self.stats.degenerate_frames += 1;
                return;
            }
            FrameStatus::Observed => {}
        }

        let drowsy = analysis.is_drowsy();
        if drowsy {
            self.stats.drowsy_frames += 1;
            if !self.was_drowsy {
                warn!(
                    "DROWSINESS DETECTED: eyes closed for {} frames",
                    analysis.consecutive_low_frames
                );
            }
        } else if self.was_drowsy {
            info!("Driver alert again");
        }
        self.was_drowsy = drowsy;

        if analysis.is_alert() {
            self.stats.alerts += 1;
            self.sink.raise(&AlertEvent {
                sequence: analysis.sequence,
                ear: analysis.ear.unwrap_or_default(),
                consecutive_low_frames: analysis.consecutive_low_frames,
                raised_at: now,
            });
            self.request_recommendation(now);
        }
    }

    fn request_recommendation(&mut self, now: Instant) {
        let Some(reference) = self.reference else {
            return;
        };
        if !self.recommendations.is_enabled() {
            debug!("Recommendations disabled, alert only");
            return;
        }
        if !self.recommendations.request(reference, now) {
            self.stats.dropped_requests += 1;
        }
    }
}

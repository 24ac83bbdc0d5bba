//! Rest-Stop Recommendations
//!
//! Suggests nearby places to rest once the driver is judged drowsy:
//! - Synthetic rest-stop catalog around a reference location
//! - Haversine proximity ranking with radius and top-k limits
//! - Self-contained HTML map artifact
//! - Rate-limited orchestration running on a background worker

pub mod catalog;
pub mod geo;
pub mod map;
pub mod orchestrator;
pub mod ranker;
pub mod viewer;
pub mod worker;

pub use catalog::{RestStop, RestStopCatalog, StopKind};
pub use geo::{haversine_km, GeoPoint};
pub use map::MapArtifactBuilder;
pub use orchestrator::{RecommendationConfig, RecommendationOrchestrator, TriggerOutcome};
pub use ranker::{ProximityRanker, RankedStop};
pub use viewer::{wait_for_launcher, BrowserViewer, LogViewer, Viewer};
pub use worker::{RecommendationCapability, RecommendationHandle, RecommendationRequest, RecommendationWorker};

use std::path::PathBuf;
use thiserror::Error;

/// Recommendation error types
#[derive(Error, Debug)]
pub enum RecommendError {
    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    #[error("Failed to write map artifact {}: {source}", path.display())]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Viewer launch failed: {0}")]
    ViewerLaunch(String),

    #[error("Recommendation subsystem unavailable: {0}")]
    SubsystemUnavailable(String),
}

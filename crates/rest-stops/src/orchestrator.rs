//! Rest-stop recommendation orchestration

use alerting::{Boundary, CooldownGate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::catalog::{RestStopCatalog, DEFAULT_STOP_COUNT};
use crate::geo::GeoPoint;
use crate::map::{MapArtifactBuilder, DEFAULT_MAP_FILE};
use crate::ranker::ProximityRanker;
use crate::viewer::{wait_for_launcher, Viewer};
use crate::RecommendError;

/// Recommendation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    /// Build the recommendation subsystem at all
    pub enabled: bool,
    /// Reference latitude (defaults to San Francisco)
    pub latitude: f64,
    /// Reference longitude
    pub longitude: f64,
    /// Number of synthetic rest stops
    pub stop_count: usize,
    /// Seed for reproducible catalogs
    pub seed: Option<u64>,
    /// Search radius
    pub max_distance_km: f64,
    /// Maximum stops shown
    pub top_k: usize,
    /// Minimum seconds between two map generations
    pub cooldown_secs: u64,
    /// Map artifact path
    pub map_path: PathBuf,
    /// Pending requests the worker queue holds
    pub queue_capacity: usize,
    /// Launch a browser (otherwise only log the artifact path)
    pub open_viewer: bool,
    /// Opener command override, e.g. `["gio", "open"]`
    pub viewer_command: Option<Vec<String>>,
    /// Give up on the viewer launch after this long
    pub launch_timeout_ms: u64,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            latitude: 37.7749,
            longitude: -122.4194,
            stop_count: DEFAULT_STOP_COUNT,
            seed: None,
            max_distance_km: 50.0,
            top_k: 5,
            cooldown_secs: 60,
            map_path: PathBuf::from(DEFAULT_MAP_FILE),
            queue_capacity: 4,
            open_viewer: true,
            viewer_command: None,
            launch_timeout_ms: 5000,
        }
    }
}

impl RecommendationConfig {
    /// Configured reference location
    pub fn reference(&self) -> Result<GeoPoint, RecommendError> {
        GeoPoint::new(self.latitude, self.longitude)
    }

    fn validate(&self) -> Result<(), RecommendError> {
        if self.stop_count == 0 {
            return Err(RecommendError::SubsystemUnavailable(
                "stop_count must be at least 1".into(),
            ));
        }
        if self.top_k == 0 {
            return Err(RecommendError::SubsystemUnavailable(
                "top_k must be at least 1".into(),
            ));
        }
        if !self.max_distance_km.is_finite() || self.max_distance_km < 0.0 {
            return Err(RecommendError::SubsystemUnavailable(format!(
                "invalid max_distance_km {}",
                self.max_distance_km
            )));
        }
        if self.queue_capacity == 0 {
            return Err(RecommendError::SubsystemUnavailable(
                "queue_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// What a trigger did
#[derive(Debug)]
pub enum TriggerOutcome {
    /// Inside the recommendation cooldown; nothing done
    CoolingDown,
    /// No rest stop within range
    NoStopsInRange,
    /// Map written and handed to the viewer
    Presented { path: PathBuf, stops: usize },
    /// Map generation or viewer launch failed
    Failed(RecommendError),
}

/// Ranks nearby stops, writes the map and hands it to the viewer, at most
/// once per cooldown period
pub struct RecommendationOrchestrator {
    catalog: RestStopCatalog,
    ranker: ProximityRanker,
    builder: MapArtifactBuilder,
    viewer: Arc<dyn Viewer>,
    gate: CooldownGate,
    launch_timeout: Duration,
}

impl RecommendationOrchestrator {
    /// Create the orchestrator and its catalog
    pub fn new(config: &RecommendationConfig, viewer: Arc<dyn Viewer>) -> Result<Self, RecommendError> {
        config.validate()?;
        let reference = config
            .reference()
            .map_err(|e| RecommendError::SubsystemUnavailable(e.to_string()))?;

        info!(
            "Creating rest stop recommender: {} stops, radius {} km, top {}",
            config.stop_count, config.max_distance_km, config.top_k
        );

        Ok(Self {
            catalog: RestStopCatalog::initialize(reference, config.stop_count, config.seed),
            ranker: ProximityRanker::new(config.max_distance_km, config.top_k),
            builder: MapArtifactBuilder::new(&config.map_path),
            viewer,
            gate: CooldownGate::new(Duration::from_secs(config.cooldown_secs), Boundary::Inclusive),
            launch_timeout: Duration::from_millis(config.launch_timeout_ms),
        })
    }

    /// Recommend rest stops around `reference`.
    ///
    /// Never fails: every problem is logged and reported in the outcome so the
    /// monitoring loop is unaffected.
    pub async fn trigger(&mut self, reference: GeoPoint, now: Instant) -> TriggerOutcome {
        if !self.gate.try_fire(now) {
            debug!("Recommendation skipped: cooldown active");
            return TriggerOutcome::CoolingDown;
        }

        if reference != self.catalog.reference() {
            self.catalog.relocate(reference);
        }

        let ranked = self.ranker.rank(reference, self.catalog.stops());
        if ranked.is_empty() {
            info!("No rest stops found within {} km", self.ranker.max_distance_km);
            return TriggerOutcome::NoStopsInRange;
        }

        let path = match self.builder.build(reference, &ranked).await {
            Ok(path) => path,
            Err(e) => {
                error!("Error creating rest stop map: {}", e);
                return TriggerOutcome::Failed(e);
            }
        };

        if let Err(e) = self.launch_viewer(&path).await {
            warn!("Could not open rest stop map: {}", e);
            return TriggerOutcome::Failed(e);
        }

        TriggerOutcome::Presented {
            path,
            stops: ranked.len(),
        }
    }

    /// A launcher still running at the timeout is killed
    async fn launch_viewer(&self, path: &Path) -> Result<(), RecommendError> {
        match self.viewer.open(path)? {
            Some(child) => wait_for_launcher(child, self.launch_timeout).await,
            None => Ok(()),
        }
    }

    /// When the last recommendation ran
    pub fn last_recommendation(&self) -> Option<Instant> {
        self.gate.last_fired()
    }

    /// Catalog for the current reference location
    pub fn catalog(&self) -> &RestStopCatalog {
        &self.catalog
    }

    /// Map artifact location
    pub fn map_path(&self) -> &Path {
        self.builder.path()
    }
}

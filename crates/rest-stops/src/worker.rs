//! Background recommendation worker
//!
//! The monitoring loop posts requests without waiting; one worker task owns
//! the orchestrator and handles them in order.

use std::time::Instant;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::geo::GeoPoint;
use crate::orchestrator::{RecommendationOrchestrator, TriggerOutcome};

/// One recommendation request
#[derive(Debug, Clone, Copy)]
pub struct RecommendationRequest {
    pub reference: GeoPoint,
    /// When the drowsiness alert fired
    pub at: Instant,
}

/// Sending side of the worker queue
#[derive(Debug, Clone)]
pub struct RecommendationHandle {
    sender: mpsc::Sender<RecommendationRequest>,
}

impl RecommendationHandle {
    /// Queue a request without blocking. Returns false if it was dropped.
    pub fn post(&self, request: RecommendationRequest) -> bool {
        match self.sender.try_send(request) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("Recommendation queue full, request dropped");
                false
            }
            Err(TrySendError::Closed(_)) => {
                warn!("Recommendation worker stopped, request dropped");
                false
            }
        }
    }
}

/// Worker task draining the request queue
pub struct RecommendationWorker {
    task: JoinHandle<RecommendationOrchestrator>,
}

impl RecommendationWorker {
    /// Spawn the worker on the current runtime
    pub fn spawn(
        mut orchestrator: RecommendationOrchestrator,
        capacity: usize,
    ) -> (RecommendationHandle, Self) {
        let (sender, mut receiver) = mpsc::channel::<RecommendationRequest>(capacity.max(1));
        info!("Starting recommendation worker: queue capacity={}", capacity.max(1));

        let task = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                match orchestrator.trigger(request.reference, request.at).await {
                    TriggerOutcome::Presented { path, stops } => {
                        info!("Recommended {} rest stops: {}", stops, path.display())
                    }
                    TriggerOutcome::NoStopsInRange => debug!("No rest stops to recommend"),
                    TriggerOutcome::CoolingDown => debug!("Recommendation cooling down"),
                    TriggerOutcome::Failed(e) => debug!("Recommendation failed: {}", e),
                }
            }
            info!("Recommendation worker stopped");
            orchestrator
        });

        (RecommendationHandle { sender }, Self { task })
    }

    /// Wait for the queue to drain. All handles must be dropped first.
    pub async fn join(self) -> Option<RecommendationOrchestrator> {
        match self.task.await {
            Ok(orchestrator) => Some(orchestrator),
            Err(e) => {
                warn!("Recommendation worker panicked: {}", e);
                None
            }
        }
    }
}

/// Whether the session can recommend rest stops
#[derive(Debug, Clone)]
pub enum RecommendationCapability {
    Enabled(RecommendationHandle),
    /// Subsystem could not be built or was switched off
    Disabled,
}

impl RecommendationCapability {
    /// Post a request if enabled. Returns true if it was queued.
    pub fn request(&self, reference: GeoPoint, at: Instant) -> bool {
        match self {
            RecommendationCapability::Enabled(handle) => {
                handle.post(RecommendationRequest { reference, at })
            }
            RecommendationCapability::Disabled => false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, RecommendationCapability::Enabled(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::RecommendationConfig;
    use crate::viewer::LogViewer;
    use std::sync::Arc;
    use std::time::Duration;

    fn sf() -> GeoPoint {
        GeoPoint::new(37.7749, -122.4194).unwrap()
    }

    fn orchestrator(dir: &std::path::Path) -> RecommendationOrchestrator {
        let config = RecommendationConfig {
            seed: Some(5),
            map_path: dir.join("map.html"),
            ..Default::default()
        };
        RecommendationOrchestrator::new(&config, Arc::new(LogViewer)).unwrap()
    }

    #[tokio::test]
    async fn test_worker_handles_request() {
        let dir = tempfile::tempdir().unwrap();
        let (handle, worker) = RecommendationWorker::spawn(orchestrator(dir.path()), 4);
        let at = Instant::now();

        assert!(handle.post(RecommendationRequest { reference: sf(), at }));
        drop(handle);

        let orchestrator = worker.join().await.unwrap();
        assert_eq!(orchestrator.last_recommendation(), Some(at));
        assert!(dir.path().join("map.html").exists());
    }

    #[tokio::test]
    async fn test_requests_inside_cooldown_collapse() {
        let dir = tempfile::tempdir().unwrap();
        let (handle, worker) = RecommendationWorker::spawn(orchestrator(dir.path()), 4);
        let start = Instant::now();

        handle.post(RecommendationRequest { reference: sf(), at: start });
        handle.post(RecommendationRequest {
            reference: sf(),
            at: start + Duration::from_secs(10),
        });
        drop(handle);

        let orchestrator = worker.join().await.unwrap();
        assert_eq!(orchestrator.last_recommendation(), Some(start));
    }

    #[tokio::test]
    async fn test_full_queue_drops() {
        let (sender, _receiver) = mpsc::channel(1);
        let handle = RecommendationHandle { sender };
        let request = RecommendationRequest {
            reference: sf(),
            at: Instant::now(),
        };

        assert!(handle.post(request));
        assert!(!handle.post(request));
    }

    #[tokio::test]
    async fn test_closed_queue_drops() {
        let (sender, receiver) = mpsc::channel(1);
        drop(receiver);
        let handle = RecommendationHandle { sender };
        assert!(!handle.post(RecommendationRequest {
            reference: sf(),
            at: Instant::now(),
        }));
    }

    #[test]
    fn test_disabled_capability() {
        let capability = RecommendationCapability::Disabled;
        assert!(!capability.is_enabled());
        assert!(!capability.request(sf(), Instant::now()));
    }
}

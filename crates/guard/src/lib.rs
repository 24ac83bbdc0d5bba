//! Drowsy Guard
//!
//! Wires camera capture, drowsiness detection, alerting and rest-stop
//! recommendations into one monitoring session.

pub mod config;
pub mod control;
pub mod session;

pub use crate::config::{AppConfig, LogFormat, SessionConfig};
pub use control::{spawn_stop_listeners, wait_for_start_flag, StopSignal};
pub use session::{Session, SessionStats};

use rest_stops::{
    BrowserViewer, LogViewer, RecommendationCapability, RecommendationConfig,
    RecommendationOrchestrator, RecommendationWorker, Viewer,
};
use std::sync::Arc;
use tracing::subscriber::SetGlobalDefaultError;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging. `RUST_LOG` overrides the default `info` filter.
pub fn init_logging(format: LogFormat) -> Result<(), SetGlobalDefaultError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true);

    match format {
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish()),
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
    }
}

/// Viewer selected by the recommendation config
pub fn viewer_for(config: &RecommendationConfig) -> Arc<dyn Viewer> {
    if !config.open_viewer {
        return Arc::new(LogViewer);
    }
    let browser = config
        .viewer_command
        .as_deref()
        .and_then(BrowserViewer::from_command)
        .unwrap_or_else(BrowserViewer::system_default);
    Arc::new(browser)
}

/// Build the recommendation subsystem on the current runtime.
///
/// Any setup failure leaves the capability `Disabled`; monitoring goes on
/// without recommendations.
pub fn start_recommendations(
    config: &RecommendationConfig,
) -> (RecommendationCapability, Option<RecommendationWorker>) {
    if !config.enabled {
        info!("Rest stop recommendations disabled by configuration");
        return (RecommendationCapability::Disabled, None);
    }

    match RecommendationOrchestrator::new(config, viewer_for(config)) {
        Ok(orchestrator) => {
            let (handle, worker) = RecommendationWorker::spawn(orchestrator, config.queue_capacity);
            (RecommendationCapability::Enabled(handle), Some(worker))
        }
        Err(e) => {
            warn!("Rest stop recommendations unavailable, continuing without: {}", e);
            (RecommendationCapability::Disabled, None)
        }
    }
}

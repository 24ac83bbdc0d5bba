//! Drowsy Guard - Main Entry Point

use alerting::BellSink;
use anyhow::Context;
use camera_capture::SyntheticCamera;
use dms::{DmsModule, TraceDetector};
use guard::config::{config_path, CONFIG_ENV};
use guard::{
    init_logging, spawn_stop_listeners, start_recommendations, wait_for_start_flag, AppConfig,
    Session, StopSignal,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = config_path(std::env::args().skip(1), std::env::var(CONFIG_ENV).ok());
    let config = AppConfig::load(path.as_deref()).context("failed to load configuration")?;
    init_logging(config.session.log_format).context("failed to initialize logging")?;

    info!("=== Drowsy Guard v{} ===", env!("CARGO_PKG_VERSION"));

    let detector = TraceDetector::from_path(&config.session.trace_path)
        .context("landmark detector unavailable")?;
    let mut camera_config = config.camera.clone();
    if camera_config.max_frames.is_none() {
        camera_config.max_frames = Some(detector.len() as u64);
    }
    let dms = DmsModule::new(config.dms.clone(), Box::new(detector))
        .context("invalid drowsiness configuration")?;

    let stop = StopSignal::new();
    spawn_stop_listeners(&stop);
    info!("Press 'q' then Enter, or Ctrl-C, to quit");

    if config.session.require_start_flag
        && !wait_for_start_flag(&config.session.start_flag, config.session.start_poll(), &stop).await
    {
        info!("Stopped before detection started");
        return Ok(());
    }

    let camera = SyntheticCamera::open(camera_config).context("failed to open camera")?;
    let frame_interval = config.camera.frame_interval();

    let (recommendations, worker) = start_recommendations(&config.recommendations);
    let reference = match config.recommendations.reference() {
        Ok(reference) => Some(reference),
        Err(e) => {
            warn!("No reference location: {}", e);
            None
        }
    };

    let session = Session::new(
        dms,
        Box::new(camera),
        Box::new(BellSink::stderr(config.tone.clone())),
        recommendations,
        reference,
        frame_interval,
        stop,
    );
    let stats = session.run().await.context("camera failure")?;

    if let Some(worker) = worker {
        worker.join().await;
    }

    info!(
        "Drowsy Guard stopped after {} frames and {} alerts",
        stats.frames, stats.alerts
    );
    Ok(())
}

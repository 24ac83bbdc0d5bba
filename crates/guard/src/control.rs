//! Start/stop control

use std::io::BufRead;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Shared stop request, checked once per frame
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the session to stop
    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Whether a console line asks to quit
pub fn is_quit_command(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case("q")
}

/// Stop on Ctrl-C or a `q` line on stdin
pub fn spawn_stop_listeners(stop: &StopSignal) {
    let on_signal = stop.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, stopping");
                on_signal.trigger();
            }
            Err(e) => warn!("Cannot listen for Ctrl-C: {}", e),
        }
    });

    // Detached; never joined
    let on_quit = stop.clone();
    let spawned = std::thread::Builder::new()
        .name("console".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) if is_quit_command(&line) => {
                        info!("Quit requested from console");
                        on_quit.trigger();
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        debug!("Console closed: {}", e);
                        break;
                    }
                }
            }
        });
    if let Err(e) = spawned {
        warn!("Console listener unavailable: {}", e);
    }
}

/// Wait until `flag` exists, then remove it.
///
/// Returns false if a stop was requested first.
pub async fn wait_for_start_flag(flag: &Path, poll: Duration, stop: &StopSignal) -> bool {
    info!("Waiting for start flag {}", flag.display());
    let mut ticker = tokio::time::interval(poll);

    loop {
        ticker.tick().await;
        if stop.is_triggered() {
            return false;
        }
        if tokio::fs::metadata(flag).await.is_ok() {
            if let Err(e) = tokio::fs::remove_file(flag).await {
                warn!("Could not remove start flag {}: {}", flag.display(), e);
            }
            info!("Start flag found, starting detection");
            return true;
        }
    }
}

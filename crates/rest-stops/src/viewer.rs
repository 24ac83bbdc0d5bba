//! External map viewer

use std::path::{Component, Path};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{debug, info};

use crate::RecommendError;

/// Presents a written map artifact to the driver
pub trait Viewer: Send + Sync {
    /// Start presenting the artifact without blocking.
    ///
    /// A returned child is the launcher still running; the caller decides how
    /// long to wait for it. `None` means presentation already finished.
    fn open(&self, path: &Path) -> Result<Option<Child>, RecommendError>;
}

/// Launches the desktop's default browser through an opener command
#[derive(Debug, Clone)]
pub struct BrowserViewer {
    program: String,
    args: Vec<String>,
}

impl BrowserViewer {
    /// Opener command of the current platform
    pub fn system_default() -> Self {
        if cfg!(target_os = "macos") {
            Self::new("open", Vec::new())
        } else if cfg!(target_os = "windows") {
            Self::new("cmd", vec!["/C".into(), "start".into(), String::new()])
        } else {
            Self::new("xdg-open", Vec::new())
        }
    }

    /// Custom opener: `program args... <file-url>`
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from a command line such as `["gio", "open"]`
    pub fn from_command(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }
}

impl Viewer for BrowserViewer {
    fn open(&self, path: &Path) -> Result<Option<Child>, RecommendError> {
        let url = file_url(path);
        debug!("Launching {} {:?} {}", self.program, self.args, url);

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(&url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| RecommendError::ViewerLaunch(format!("{}: {}", self.program, e)))?;

        Ok(Some(child))
    }
}

/// Headless viewer: only reports where the map is
#[derive(Debug, Clone, Default)]
pub struct LogViewer;

impl Viewer for LogViewer {
    fn open(&self, path: &Path) -> Result<Option<Child>, RecommendError> {
        info!("Rest stop map ready: {}", file_url(path));
        Ok(None)
    }
}

/// Wait for a launcher to finish, killing it once `limit` has passed
pub async fn wait_for_launcher(mut child: Child, limit: Duration) -> Result<(), RecommendError> {
    let waited = tokio::time::timeout(limit, child.wait()).await;

    match waited {
        Ok(Ok(status)) if status.success() => {
            info!("Rest stop map opened in browser");
            Ok(())
        }
        Ok(Ok(status)) => Err(RecommendError::ViewerLaunch(format!(
            "opener exited with {status}"
        ))),
        Ok(Err(e)) => Err(RecommendError::ViewerLaunch(format!("waiting for opener: {e}"))),
        Err(_) => {
            if let Err(e) = child.kill().await {
                debug!("Opener already gone: {}", e);
            }
            Err(RecommendError::ViewerLaunch(format!("timed out after {limit:?}")))
        }
    }
}

/// `file://` URL for an absolute path, with each segment percent-encoded
pub fn file_url(path: &Path) -> String {
    let mut url = String::from("file://");
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => {
                // Drive letter such as `C:`
                url.push('/');
                url.push_str(&prefix.as_os_str().to_string_lossy());
            }
            Component::RootDir => {}
            Component::CurDir => continue,
            Component::ParentDir => url.push_str("/.."),
            Component::Normal(segment) => {
                url.push('/');
                encode_segment(&segment.to_string_lossy(), &mut url);
            }
        }
    }
    if url.len() == "file://".len() {
        url.push('/');
    }
    url
}

fn encode_segment(segment: &str, out: &mut String) {
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
}

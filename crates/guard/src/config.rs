//! Application configuration
//!
//! Layered with the `config` crate: struct defaults, then an optional TOML
//! file, then `DROWSY_GUARD__SECTION__KEY` environment overrides.

use alerting::ToneConfig;
use camera_capture::CameraConfig;
use config::{Config, ConfigError, Environment, File};
use dms::DmsConfig;
use rest_stops::RecommendationConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "drowsy-guard.toml";

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "DROWSY_GUARD_CONFIG";

/// Prefix of per-key environment overrides
pub const ENV_PREFIX: &str = "DROWSY_GUARD";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Session control settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Recorded landmark trace (JSON Lines)
    pub trace_path: PathBuf,
    /// File whose appearance starts detection
    pub start_flag: PathBuf,
    /// Wait for the start flag before monitoring
    pub require_start_flag: bool,
    /// Start flag poll interval
    pub start_poll_ms: u64,
    pub log_format: LogFormat,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            trace_path: PathBuf::from("landmarks.jsonl"),
            start_flag: PathBuf::from("start_detection.flag"),
            require_start_flag: true,
            start_poll_ms: 500,
            log_format: LogFormat::Text,
        }
    }
}

impl SessionConfig {
    pub fn start_poll(&self) -> Duration {
        Duration::from_millis(self.start_poll_ms.max(1))
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub dms: DmsConfig,
    pub tone: ToneConfig,
    pub camera: CameraConfig,
    pub recommendations: RecommendationConfig,
    pub session: SessionConfig,
}

impl AppConfig {
    /// Load configuration.
    ///
    /// An explicit `path` must exist; otherwise `drowsy-guard.toml` is used
    /// when present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (file, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        Config::builder()
            .add_source(File::from(file).required(required))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

/// Config file named by `--config <path>` / `--config=<path>`, falling back
/// to the `DROWSY_GUARD_CONFIG` value
pub fn config_path<I>(args: I, env_value: Option<String>) -> Option<PathBuf>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--config" {
            if let Some(path) = args.next() {
                return Some(PathBuf::from(path));
            }
        } else if let Some(path) = arg.strip_prefix("--config=") {
            return Some(PathBuf::from(path));
        }
    }
    env_value.filter(|v| !v.is_empty()).map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.dms.low_threshold, 0.3);
        assert_eq!(config.dms.required_consecutive_frames, 48);
        assert_eq!(config.tone.frequency_hz, 2500);
        assert_eq!(config.recommendations.max_distance_km, 50.0);
        assert_eq!(config.session.start_flag, PathBuf::from("start_detection.flag"));
        assert_eq!(config.session.start_poll(), Duration::from_millis(500));
    }

    #[test]
    fn test_load_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[dms]
low_threshold = 0.25
required_consecutive_frames = 30

[recommendations]
seed = 42
open_viewer = false

[session]
require_start_flag = false
log_format = "json"
"#
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.dms.low_threshold, 0.25);
        assert_eq!(config.dms.required_consecutive_frames, 30);
        // Untouched keys keep their defaults
        assert_eq!(config.dms.alert_cooldown_secs, 60);
        assert_eq!(config.recommendations.seed, Some(42));
        assert!(!config.recommendations.open_viewer);
        assert!(!config.session.require_start_flag);
        assert_eq!(config.session.log_format, LogFormat::Json);
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn test_environment_override() {
        std::env::set_var("DROWSY_GUARD__RECOMMENDATIONS__TOP_K", "3");
        let config = AppConfig::load(None);
        std::env::remove_var("DROWSY_GUARD__RECOMMENDATIONS__TOP_K");

        assert_eq!(config.unwrap().recommendations.top_k, 3);
    }

    #[test]
    fn test_config_path_resolution() {
        assert_eq!(
            config_path(args(&["--config", "a.toml"]), Some("b.toml".into())),
            Some(PathBuf::from("a.toml"))
        );
        assert_eq!(
            config_path(args(&["--config=c.toml"]), None),
            Some(PathBuf::from("c.toml"))
        );
        assert_eq!(
            config_path(args(&[]), Some("b.toml".into())),
            Some(PathBuf::from("b.toml"))
        );
        assert_eq!(config_path(args(&["--verbose"]), Some(String::new())), None);
    }
}

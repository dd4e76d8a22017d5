//! TOML-based configuration persistence for the capture application.
//!
//! Reads and writes `AppConfig` to the platform-appropriate config file:
//! - Windows:  `%APPDATA%\CamKit\config.toml`
//! - Linux:    `~/.config/camkit/config.toml`
//! - macOS:    `~/Library/Application Support/CamKit/config.toml`
//!
//! # Serde default values
//!
//! Fields annotated with `#[serde(default = "some_fn")]` use the return value
//! of `some_fn()` when the field is absent from the TOML file.  This allows
//! the app to work correctly on first run (before a config file exists) and
//! when upgrading from an older config file that is missing newer fields.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use cam_core::Position;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level application configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    pub session: SessionConfig,
    pub capture: CaptureConfig,
}

/// Session lifecycle settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    /// Camera the session configures on launch: `"back"` or `"front"`.
    #[serde(default = "default_initial_position")]
    pub initial_position: Position,
    /// Delay in milliseconds between stopping and restarting the session
    /// around a device switch or interruption recovery.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// Interval in milliseconds between session health checks.
    #[serde(default = "default_health_check_interval_ms")]
    pub health_check_interval_ms: u64,
    /// Automatic recovery attempts per interruption episode before giving up.
    #[serde(default = "default_max_recovery_attempts")]
    pub max_recovery_attempts: u32,
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Photo capture settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaptureConfig {
    /// Whether to request high-resolution capture when the output supports it.
    #[serde(default = "default_true")]
    pub prefer_high_resolution: bool,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_initial_position() -> Position {
    Position::Back
}
fn default_settle_delay_ms() -> u64 {
    300
}
fn default_health_check_interval_ms() -> u64 {
    2000
}
fn default_max_recovery_attempts() -> u32 {
    3
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            capture: CaptureConfig::default(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            initial_position: default_initial_position(),
            settle_delay_ms: default_settle_delay_ms(),
            health_check_interval_ms: default_health_check_interval_ms(),
            max_recovery_attempts: default_max_recovery_attempts(),
            log_level: default_log_level(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            prefer_high_resolution: default_true(),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from disk, returning `AppConfig::default()` if the file
/// does not yet exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let path = config_file_path()?;

    match std::fs::read_to_string(&path) {
        Ok(content) => {
            let cfg: AppConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io { path, source: e }),
    }
}

/// Persists `config` to disk.
///
/// Creates the config directory and file if they do not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    let path = config_file_path()?;

    // Ensure directory exists before writing.
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(&path, content).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(())
}

/// Resolves the platform config base directory including the app subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        // %APPDATA% e.g. C:\Users\<user>\AppData\Roaming
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("CamKit"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("camkit"))
    }

    #[cfg(target_os = "macos")]
    {
        // ~/Library/Application Support/CamKit
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("CamKit")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        // Fallback for unsupported platforms.
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_app_config_default_has_expected_session_settings() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.session.initial_position, Position::Back);
        assert_eq!(cfg.session.settle_delay_ms, 300);
        assert_eq!(cfg.session.health_check_interval_ms, 2000);
        assert_eq!(cfg.session.max_recovery_attempts, 3);
    }

    #[test]
    fn test_app_config_default_log_level_is_info() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.session.log_level, "info");
    }

    #[test]
    fn test_app_config_default_prefers_high_resolution() {
        let cfg = AppConfig::default();
        assert!(cfg.capture.prefer_high_resolution);
    }

    #[test]
    fn test_app_config_serializes_and_deserializes_round_trip() {
        let mut cfg = AppConfig::default();
        cfg.session.initial_position = Position::Front;
        cfg.session.settle_delay_ms = 500;
        cfg.capture.prefer_high_resolution = false;

        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let restored: AppConfig = toml::from_str(&toml_str).expect("deserialize");

        assert_eq!(cfg, restored);
    }

    #[test]
    fn test_deserialize_minimal_toml_uses_defaults() {
        let toml_str = r#"
[session]
[capture]
"#;
        let cfg: AppConfig = toml::from_str(toml_str).expect("deserialize minimal");
        assert_eq!(cfg.session.initial_position, Position::Back);
        assert_eq!(cfg.session.max_recovery_attempts, 3);
        assert!(cfg.capture.prefer_high_resolution);
    }

    #[test]
    fn test_deserialize_partial_session_overrides_defaults() {
        let toml_str = r#"
[session]
initial_position = "front"
settle_delay_ms = 150
[capture]
"#;
        let cfg: AppConfig = toml::from_str(toml_str).expect("deserialize partial");
        assert_eq!(cfg.session.initial_position, Position::Front);
        assert_eq!(cfg.session.settle_delay_ms, 150);
        // Unspecified fields keep their defaults.
        assert_eq!(cfg.session.health_check_interval_ms, 2000);
    }

    #[test]
    fn test_deserialize_invalid_toml_returns_parse_error() {
        let bad_toml = "[[[ not valid toml";
        let result: Result<AppConfig, toml::de::Error> = toml::from_str(bad_toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_load_config_round_trip_via_temp_dir() {
        let dir = std::env::temp_dir().join(format!("camkit_test_{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");

        let mut cfg = AppConfig::default();
        cfg.session.log_level = "debug".to_string();
        cfg.session.max_recovery_attempts = 5;

        // Serialize and write manually (mirrors save_config logic).
        let content = toml::to_string_pretty(&cfg).unwrap();
        std::fs::write(&path, &content).unwrap();
        let loaded: AppConfig = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(loaded.session.log_level, "debug");
        assert_eq!(loaded.session.max_recovery_attempts, 5);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_config_file_path_ends_with_config_toml() {
        if let Ok(path) = config_file_path() {
            assert!(
                path.ends_with("config.toml"),
                "config file must be named config.toml, got {path:?}"
            );
        }
        // NoPlatformConfigDir in a stripped CI env is also acceptable.
    }
}

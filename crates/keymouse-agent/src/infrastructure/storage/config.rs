//! TOML-based configuration for the agent.
//!
//! Reads `AppConfig` from the platform-appropriate config file:
//! - macOS:    `~/Library/Application Support/KeyMouse/config.toml`
//! - Linux:    `~/.config/keymouse/config.toml` (`$XDG_CONFIG_HOME` honoured)
//!
//! # File layout
//!
//! ```toml
//! [agent]
//! log_level = "info"
//! notify_on_launch = true
//!
//! [timing]
//! hold_threshold_ms = 400
//! deactivation_grace_ms = 300
//!
//! [media]
//! numpadPlus = "volume-up"
//!
//! [keys]
//! numpad1 = "-a /Applications/Firefox.app"
//! ```
//!
//! `[media]` maps a key name to a media key.  `[keys]` maps a key name to the
//! argument list for `open`, split on whitespace.  A key bound in both tables
//! uses the `[keys]` entry.
//!
//! # Serde default values
//!
//! Fields annotated with `#[serde(default = "some_fn")]` use the return value
//! of `some_fn()` when the field is absent from the TOML file.  A section that
//! is absent entirely takes its `Default` impl, so a file containing only
//! `[keys]` is valid.
//!
//! # Bad entries
//!
//! An unknown key name or an unparseable action drops only that entry; the
//! caller receives the list of problems and logs them.  Only a file that is
//! not valid TOML at all fails to load.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use keymouse_core::keymap::macos_vk;
use keymouse_core::{Action, ActivationTiming, KeyMap, MediaKey, MotionProfile};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::application::remap_engine::EngineSettings;
use crate::infrastructure::scheduler::TickRates;

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

    /// A `[media]` or `[keys]` entry names a key that cannot be bound.
    #[error("[{section}] unknown key name {name:?}")]
    UnknownKeyName { section: &'static str, name: String },

    /// A `[media]` or `[keys]` entry has a value that is not a valid action.
    #[error("[{section}] {name}: cannot parse action {value:?}")]
    MalformedAction {
        section: &'static str,
        name: String,
        value: String,
    },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level application configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub motion: MotionConfig,
    /// Key name → media key name.
    #[serde(default = "default_media")]
    pub media: BTreeMap<String, String>,
    /// Key name → whitespace-separated `open` arguments.
    #[serde(default = "default_keys")]
    pub keys: BTreeMap<String, String>,
}

/// General agent behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentConfig {
    /// `tracing` filter directive, e.g. `"info"` or `"keymouse_agent=debug"`.
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Publish a status event naming the application on every launch.
    #[serde(default = "default_true")]
    pub notify_on_launch: bool,
}

/// Activation and tick timing, in milliseconds and hertz.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimingConfig {
    #[serde(default = "default_hold_threshold_ms")]
    pub hold_threshold_ms: u64,
    #[serde(default = "default_deactivation_grace_ms")]
    pub deactivation_grace_ms: u64,
    #[serde(default = "default_multi_click_window_ms")]
    pub multi_click_window_ms: u64,
    #[serde(default = "default_movement_hz")]
    pub movement_hz: u32,
    #[serde(default = "default_scroll_hz")]
    pub scroll_hz: u32,
}

/// Speed profiles for pointer movement and scrolling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MotionConfig {
    #[serde(default = "default_movement")]
    pub movement: MotionProfile,
    #[serde(default = "default_movement_boost")]
    pub movement_boost: MotionProfile,
    #[serde(default = "default_scroll")]
    pub scroll: MotionProfile,
    #[serde(default = "default_scroll_boost")]
    pub scroll_boost: MotionProfile,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}
fn default_hold_threshold_ms() -> u64 {
    400
}
fn default_deactivation_grace_ms() -> u64 {
    300
}
fn default_multi_click_window_ms() -> u64 {
    500
}
fn default_movement_hz() -> u32 {
    120
}
fn default_scroll_hz() -> u32 {
    60
}
fn default_movement() -> MotionProfile {
    MotionProfile::MOVEMENT
}
fn default_movement_boost() -> MotionProfile {
    MotionProfile::MOVEMENT_BOOST
}
fn default_scroll() -> MotionProfile {
    MotionProfile::SCROLL
}
fn default_scroll_boost() -> MotionProfile {
    MotionProfile::SCROLL_BOOST
}

fn default_media() -> BTreeMap<String, String> {
    [
        ("numpadPlus", MediaKey::VolumeUp),
        ("numpadMinus", MediaKey::VolumeDown),
        ("numpadDot", MediaKey::Mute),
        ("numpadStar", MediaKey::PlayPause),
        ("numpadSlash", MediaKey::Next),
        ("numpadEqual", MediaKey::Previous),
    ]
    .into_iter()
    .map(|(name, key)| (name.to_string(), key.as_str().to_string()))
    .collect()
}

fn default_keys() -> BTreeMap<String, String> {
    [
        ("numpad1", "-a /Applications/Firefox.app"),
        ("numpad2", "-a /Applications/Spotify.app"),
        ("numpad3", "-a /Applications/WhatsApp.app"),
    ]
    .into_iter()
    .map(|(name, line)| (name.to_string(), line.to_string()))
    .collect()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            notify_on_launch: default_true(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            hold_threshold_ms: default_hold_threshold_ms(),
            deactivation_grace_ms: default_deactivation_grace_ms(),
            multi_click_window_ms: default_multi_click_window_ms(),
            movement_hz: default_movement_hz(),
            scroll_hz: default_scroll_hz(),
        }
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            movement: default_movement(),
            movement_boost: default_movement_boost(),
            scroll: default_scroll(),
            scroll_boost: default_scroll_boost(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            agent: AgentConfig::default(),
            timing: TimingConfig::default(),
            motion: MotionConfig::default(),
            media: default_media(),
            keys: default_keys(),
        }
    }
}

impl AppConfig {
    /// Builds the engine's key map.
    ///
    /// Entries that fail to parse are left out and returned as errors so the
    /// caller can report them.
    pub fn build_key_map(&self) -> (KeyMap, Vec<ConfigError>) {
        let mut map = KeyMap::new();
        let mut problems = Vec::new();

        for (name, value) in &self.media {
            let Some(code) = bindable_code("media", name, &mut problems) else {
                continue;
            };
            match value.parse::<MediaKey>() {
                Ok(key) => {
                    map.insert(code, Action::MediaSignal(key));
                }
                Err(_) => problems.push(ConfigError::MalformedAction {
                    section: "media",
                    name: name.clone(),
                    value: value.clone(),
                }),
            }
        }

        for (name, value) in &self.keys {
            let Some(code) = bindable_code("keys", name, &mut problems) else {
                continue;
            };
            match Action::launch_from_line(value) {
                Some(action) => {
                    map.insert(code, action);
                }
                None => problems.push(ConfigError::MalformedAction {
                    section: "keys",
                    name: name.clone(),
                    value: value.clone(),
                }),
            }
        }

        (map, problems)
    }

    /// Engine tunables from the `[agent]`, `[timing]`, and `[motion]` sections.
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            activation: ActivationTiming {
                hold_threshold: Duration::from_millis(self.timing.hold_threshold_ms),
                deactivation_grace: Duration::from_millis(self.timing.deactivation_grace_ms),
            },
            multi_click_window: Duration::from_millis(self.timing.multi_click_window_ms),
            movement: self.motion.movement,
            movement_boost: self.motion.movement_boost,
            scroll: self.motion.scroll,
            scroll_boost: self.motion.scroll_boost,
            notify_on_launch: self.agent.notify_on_launch,
        }
    }

    /// Tick periods from the `[timing]` section.
    pub fn tick_rates(&self) -> TickRates {
        TickRates::from_hz(self.timing.movement_hz, self.timing.scroll_hz)
    }
}

fn bindable_code(
    section: &'static str,
    name: &str,
    problems: &mut Vec<ConfigError>,
) -> Option<u16> {
    let code = macos_vk::key_code_for_name(name);
    if code.is_none() {
        problems.push(ConfigError::UnknownKeyName {
            section,
            name: name.to_string(),
        });
    }
    code
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

/// Loads `AppConfig` from `path`, returning the defaults if the file does not
/// exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Loads `path`, first writing the default configuration there if it does
/// not exist yet.
///
/// # Errors
///
/// As [`load_config`] and [`save_config`].
pub fn load_or_create_config(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        let config = AppConfig::default();
        save_config(path, &config)?;
        info!(path = %path.display(), "wrote default configuration");
        return Ok(config);
    }
    load_config(path)
}

/// Persists `config` to `path`.
///
/// Creates the config directory and file if they do not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    // Ensure directory exists before writing.
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = default_header() + &toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// The default configuration rendered as TOML, with a short header.
///
/// # Errors
///
/// Returns [`ConfigError::Serialize`] if serialization fails.
pub fn default_config_toml() -> Result<String, ConfigError> {
    Ok(default_header() + &toml::to_string_pretty(&AppConfig::default())?)
}

fn default_header() -> String {
    let names: Vec<&str> = macos_vk::bindable_names().collect();
    let media: Vec<&str> = MediaKey::ALL.iter().map(|k| k.as_str()).collect();
    format!(
        "# KeyMouse configuration.\n\
         # Bindable key names: {}\n\
         # Media keys: {}\n\n",
        names.join(", "),
        media.join(", ")
    )
}

/// Resolves the platform config base directory including the `KeyMouse`
/// subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        // ~/Library/Application Support/KeyMouse
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("KeyMouse")
        })
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("keymouse"))
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        // Fallback for unsupported platforms.
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Actions bound to keys through the user's configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

/// A hardware media key, identified by its `NX_KEYTYPE_*` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MediaKey {
    VolumeUp,
    VolumeDown,
    Mute,
    PlayPause,
    Next,
    Previous,
}

impl MediaKey {
    /// Every media key, in `NX_KEYTYPE` order.
    pub const ALL: [MediaKey; 6] = [
        MediaKey::VolumeUp,
        MediaKey::VolumeDown,
        MediaKey::Mute,
        MediaKey::PlayPause,
        MediaKey::Next,
        MediaKey::Previous,
    ];

    /// The `NX_KEYTYPE_*` constant carried in a system-defined event's `data1`.
    pub fn nx_key_type(self) -> i32 {
        match self {
            MediaKey::VolumeUp => 0,   // NX_KEYTYPE_SOUND_UP
            MediaKey::VolumeDown => 1, // NX_KEYTYPE_SOUND_DOWN
            MediaKey::Mute => 7,       // NX_KEYTYPE_MUTE
            MediaKey::PlayPause => 16, // NX_KEYTYPE_PLAY
            MediaKey::Next => 17,      // NX_KEYTYPE_NEXT
            MediaKey::Previous => 18,  // NX_KEYTYPE_PREVIOUS
        }
    }

    /// The kebab-case name used in the configuration file.
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKey::VolumeUp => "volume-up",
            MediaKey::VolumeDown => "volume-down",
            MediaKey::Mute => "mute",
            MediaKey::PlayPause => "play-pause",
            MediaKey::Next => "next",
            MediaKey::Previous => "previous",
        }
    }
}

impl fmt::Display for MediaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a media key name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown media key {0:?} (expected one of volume-up, volume-down, mute, play-pause, next, previous)")]
pub struct UnknownMediaKey(pub String);

impl FromStr for MediaKey {
    type Err = UnknownMediaKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MediaKey::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownMediaKey(s.to_string()))
    }
}

/// What a mapped key does when pressed while the engine is armed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Post a media key press/release pair.
    MediaSignal(MediaKey),
    /// Run `/usr/bin/open` with these arguments.
    Launch(Vec<String>),
}

impl Action {
    /// Builds a [`Action::Launch`] from a whitespace-separated argument line.
    ///
    /// Returns `None` for a blank line.
    pub fn launch_from_line(line: &str) -> Option<Self> {
        let args: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        if args.is_empty() {
            None
        } else {
            Some(Action::Launch(args))
        }
    }

    /// Human-readable label for status notifications.
    pub fn display_name(&self) -> String {
        match self {
            Action::MediaSignal(key) => key.as_str().to_string(),
            Action::Launch(args) => launch_display_name(args),
        }
    }
}

/// Derives a short name for a launch argument list.
///
/// Uses the first argument ending in `.app` (final path component without the
/// extension), falling back to the first argument verbatim, or an empty string
/// when there are no arguments.
pub fn launch_display_name(args: &[String]) -> String {
    let bundle = args
        .iter()
        .map(|a| a.trim_end_matches('/'))
        .find(|a| a.ends_with(".app"));
    if let Some(bundle) = bundle {
        let stem = Path::new(bundle)
            .file_stem()
            .and_then(|s| s.to_str());
        if let Some(stem) = stem {
            return stem.to_string();
        }
    }
    args.first().cloned().unwrap_or_default()
}

//! Infrastructure layer for the agent.
//!
//! Contains OS-facing adapters: the event tap, event synthesis, display
//! enumeration, tokio timers, process launching, status delivery, and the
//! configuration file.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `keymouse_core`, but MUST NOT be imported by the `application` or domain
//! layers.
//!
//! # Sub-modules
//!
//! - **`input_capture`** – The active `CGEventTap` that feeds key events to the
//!   engine and swallows the ones it consumes.  A `MockInputSource` is provided
//!   for tests.
//!
//! - **`input_emulation`** – `InputSynthesizer` implementations: CoreGraphics
//!   pointer and scroll events plus `NSEvent` media keys on macOS, and a
//!   recording mock.
//!
//! - **`screen_info`** – Display enumeration and the reconfiguration watcher.
//!
//! - **`scheduler`** – Movement and scroll tick sources and the deferred
//!   deactivation timer, as tokio tasks.
//!
//! - **`launcher`** – Runs `open` for launch actions without blocking the tap.
//!
//! - **`status`** – Delivers armed, disarmed, and launch notices to the log.
//!
//! - **`storage`** – TOML configuration loading and key map construction.

pub mod input_capture;
pub mod input_emulation;
pub mod launcher;
pub mod scheduler;
pub mod screen_info;
pub mod status;
pub mod storage;

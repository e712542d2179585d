//! keymouse-agent library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does the agent do? (for beginners)
//!
//! The agent is a background process that sits between the keyboard and the
//! rest of macOS.  It installs an *event tap*, a hook that sees every key
//! press before any application does and may swallow it.
//!
//! 1. A tap of F13 (or holding it) arms KeyMouse.  The held form disarms on
//!    release; the latched form disarms on the next tap.
//! 2. While armed, arrow keys move the pointer with acceleration, Page Up,
//!    Page Down, Home, and End scroll, and `\`, `` ` ``, and `/` act as the
//!    left, right, and middle buttons.  Shift switches to the faster profile.
//! 3. While armed, keys bound in the configuration file send media keys or
//!    run `open`.
//! 4. Everything else passes through untouched.  While disarmed, every key
//!    except F13 itself passes through, bound keys included.
//!
//! The decision logic lives in `keymouse_core` and the
//! [`application::remap_engine::RemapEngine`]; this crate supplies the OS
//! plumbing around it.

/// Application layer: the remap engine and its ports.
pub mod application;

/// Infrastructure layer: OS adapters, timers, and configuration.
pub mod infrastructure;

//! Platform-specific input synthesis implementations.
//!
//! The correct implementation is selected at compile time via `#[cfg(target_os = ...)]`
//! and re-exported as `NativeInputSynthesizer`.  [`mock::MockInputSynthesizer`]
//! is always compiled so tests run on any platform.

pub mod mock;

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(target_os = "macos")]
pub use macos::MacosInputSynthesizer as NativeInputSynthesizer;

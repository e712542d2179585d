//! Domain entities for KeyMouse.
//!
//! This module contains pure remapping logic with no infrastructure dependencies.
//!
//! # What is "domain" in Clean Architecture? (for beginners)
//!
//! Clean Architecture organises code into concentric layers.  The innermost
//! layer is called the **domain** (or "entities" layer).  Domain code:
//!
//! - Contains the core rules of the application.
//! - Has **no** imports from OS APIs, event taps, or process spawning.
//! - Can be compiled and tested on any platform without any external setup.
//!
//! Here that means: when does the modifier arm the engine, how fast does the
//! pointer move after N ticks, where does the pointer land when it leaves the
//! displays, and how many clicks does a button-down count as.  Every function
//! takes time as an argument (`Instant`) instead of reading a clock, so tests
//! can replay exact timelines.

/// Mapped actions (media keys and application launches).
pub mod action;

/// Modifier toggle/hold state machine.
pub mod activation;

/// Mouse buttons and click-run counting.
pub mod clicks;

/// Display rectangles and pointer clamping.
pub mod display;

/// Raw key events and the engine's verdict.
pub mod input;

/// Accelerating velocity integrator for movement and scrolling.
pub mod motion;

//! Application layer use cases for the agent.
//!
//! # What use cases does the agent have?
//!
//! - **`remap_engine`** – The single entry point for raw key events.  Owns all
//!   remapping state (activation, velocities, held buttons) and decides, per
//!   event, whether to consume it or let it reach the foreground application.
//!
//! - **`emulate_input`** – Turns engine decisions into synthetic pointer
//!   events: click runs, drags, clamped moves, and scrolls.  The actual OS call
//!   is made by an `InputSynthesizer` implementation injected at construction
//!   time.
//!
//! - **`dispatch_action`** – Runs the action bound to a mapped key: a media key
//!   pair or an external process launch.
//!
//! Every OS-facing collaborator is a trait object, so the whole layer can be
//! driven from tests with the recording doubles in `infrastructure`.

pub mod dispatch_action;
pub mod emulate_input;
pub mod remap_engine;

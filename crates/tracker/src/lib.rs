//! Sweetspot Tracker
//!
//! The runner that ties perception to actuation: a per-frame loop pulls
//! camera frames, locates the primary face, asks the balance engine for a
//! command, and drives the audio backend under an update throttle. A
//! command interpreter mutates engine state concurrently from stdin lines
//! and preview key presses.
//!
//! Shared state is one mutex around the engine; every locked operation is
//! short, and neither capture nor actuation happens under the lock. A
//! cooperative stop flag is checked once per frame, and every exit path
//! resets the balance to center before the frame source is released.

pub mod commands;
pub mod engine;
pub mod session;

pub use commands::CommandInterpreter;
pub use engine::SharedEngine;
pub use session::TrackerSession;

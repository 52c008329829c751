//! Terminal user interface.
//!
//! Hosts the waveform in the terminal: a full-screen canvas surface and a frame
//! scheduler that also handles the quit keys.

pub mod terminal;

pub use terminal::{TerminalScheduler, TerminalSurface};

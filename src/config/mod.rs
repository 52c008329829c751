//! Configuration management for barwave.
//!
//! This module handles loading and saving application configuration from a TOML
//! file in the user's config directory. Every option has a default, so barwave
//! runs without any config file at all.

pub mod file;

pub use file::{ensure_config_file, BarwaveConfig, DotMarker, WaveformConfig};

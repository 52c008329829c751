//! Configuration file management for barwave.
//!
//! This module handles loading and saving application configuration from TOML files.
//! Configuration is stored in the user's config directory. Every field has a default,
//! so a missing file or a partial file is fine.

use anyhow::Context;
use ratatui::symbols::Marker;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::waveform::{Easing, VisualizerError};

/// Canvas marker used to draw the waveform in the terminal.
///
/// The marker decides how many addressable dots a terminal cell holds, which is
/// the pixel density of the terminal surface.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DotMarker {
    /// 2x4 dots per cell
    #[default]
    Braille,
    /// 1x2 dots per cell
    HalfBlock,
    /// One dot per cell
    Block,
}

impl DotMarker {
    /// Returns the ratatui canvas marker.
    pub fn symbol(self) -> Marker {
        match self {
            Self::Braille => Marker::Braille,
            Self::HalfBlock => Marker::HalfBlock,
            Self::Block => Marker::Block,
        }
    }

    /// Horizontal and vertical dots per terminal cell.
    pub fn dots_per_cell(self) -> (u16, u16) {
        match self {
            Self::Braille => (2, 4),
            Self::HalfBlock => (1, 2),
            Self::Block => (1, 1),
        }
    }
}

impl std::fmt::Display for DotMarker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Braille => write!(f, "braille"),
            Self::HalfBlock => write!(f, "half-block"),
            Self::Block => write!(f, "block"),
        }
    }
}

/// Audio capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Audio device to use. Options:
    /// - "default" for system default device
    /// - numeric index (0, 1, 2, etc.) from `barwave list-devices`
    /// - device name from `barwave list-devices`
    #[serde(default = "default_device")]
    pub device: String,
    /// Number of most recent samples inspected per amplitude reading
    #[serde(default = "default_window_size")]
    pub window_size: usize,
}

fn default_device() -> String {
    "default".to_string()
}

fn default_window_size() -> usize {
    512
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            window_size: default_window_size(),
        }
    }
}

impl AudioConfig {
    /// Checks that the sample window can hold at least one sample.
    ///
    /// # Errors
    /// - If `window_size` is 0
    pub fn validate(&self) -> Result<(), VisualizerError> {
        if self.window_size == 0 {
            return Err(VisualizerError::InvalidConfig(
                "window_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Waveform animation and appearance.
///
/// Distances are in surface units (canvas dots in the terminal).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveformConfig {
    /// Minimum time between two amplitude readings
    pub sample_interval_ms: f64,
    pub bar_width: f64,
    /// Empty space between neighbouring bars
    pub bar_gap: f64,
    /// Distance every bar moves left per tick
    pub scroll_speed: f64,
    pub bar_color: String,
    /// Color of bars whose signal stayed under the noise threshold
    pub quiet_color: String,
    /// Color of the dots shown before audio arrives
    pub placeholder_color: String,
    /// Fraction of the surface height below which a bar is drawn as a dot
    pub noise_threshold: f64,
    pub easing: Easing,
    /// Time a new bar takes to grow to full height
    pub expand_duration_ms: f64,
    /// Multiplier from peak amplitude to fraction of the surface height
    pub amplitude_gain: f64,
    /// Animation ticks per second
    pub frame_rate: u32,
    pub marker: DotMarker,
}

impl Default for WaveformConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: 100.0,
            bar_width: 3.0,
            bar_gap: 10.0,
            scroll_speed: 1.0,
            bar_color: "#cee0dc".to_string(),
            quiet_color: "#b9cfd4".to_string(),
            placeholder_color: "#4b5a5e".to_string(),
            noise_threshold: 0.01,
            easing: Easing::default(),
            expand_duration_ms: 200.0,
            amplitude_gain: 1.2,
            frame_rate: 60,
            marker: DotMarker::default(),
        }
    }
}

impl WaveformConfig {
    /// Checks that every numeric option is in range.
    ///
    /// Colors are checked separately when the renderer palette is built.
    ///
    /// # Errors
    /// - If a size, interval or rate is out of range
    pub fn validate(&self) -> Result<(), VisualizerError> {
        let positive = [
            ("bar_width", self.bar_width),
            ("sample_interval_ms", self.sample_interval_ms),
            ("amplitude_gain", self.amplitude_gain),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(VisualizerError::InvalidConfig(format!(
                    "{name} must be greater than 0 (got {value})"
                )));
            }
        }

        let non_negative = [
            ("bar_gap", self.bar_gap),
            ("scroll_speed", self.scroll_speed),
            ("expand_duration_ms", self.expand_duration_ms),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(VisualizerError::InvalidConfig(format!(
                    "{name} must not be negative (got {value})"
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.noise_threshold) {
            return Err(VisualizerError::InvalidConfig(format!(
                "noise_threshold must be between 0 and 1 (got {})",
                self.noise_threshold
            )));
        }

        if self.frame_rate == 0 {
            return Err(VisualizerError::InvalidConfig(
                "frame_rate must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BarwaveConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub waveform: WaveformConfig,
}

impl BarwaveConfig {
    /// Validates both sections.
    ///
    /// # Errors
    /// - If any `[audio]` or `[waveform]` value is out of range
    pub fn validate(&self) -> Result<(), VisualizerError> {
        self.audio.validate()?;
        self.waveform.validate()
    }

    /// Loads configuration from the user's config directory.
    ///
    /// Falls back to defaults when no config file exists yet.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If the config file cannot be read
    /// - If the TOML is malformed
    pub fn load() -> anyhow::Result<Self> {
        let config_path = config_path()?;
        if !config_path.exists() {
            tracing::info!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from(&config_path)
    }

    /// Loads configuration from an explicit path.
    ///
    /// # Errors
    /// - If the file cannot be read
    /// - If the TOML is malformed
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let config_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: BarwaveConfig = toml::from_str(&config_content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    /// Writes the configuration to `path`, creating parent directories.
    ///
    /// # Errors
    /// - If the directory cannot be created
    /// - If the file cannot be written
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let config_content = toml::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        tracing::info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// Retrieves the path to the config file (`~/.config/barwave/barwave.toml`).
///
/// # Errors
/// - If the home directory cannot be determined
pub fn config_path() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("barwave").join("barwave.toml"))
}

/// Writes a config file full of defaults unless one already exists.
///
/// Returns the path of the config file.
///
/// # Errors
/// - If the config path cannot be determined
/// - If the file cannot be written
pub fn ensure_config_file() -> anyhow::Result<PathBuf> {
    let path = config_path()?;
    if !path.exists() {
        BarwaveConfig::default().save_to(&path)?;
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_yields_defaults() {
        let config: BarwaveConfig = toml::from_str("").unwrap();
        assert_eq!(config.audio.device, "default");
        assert_eq!(config.audio.window_size, 512);
        assert_eq!(config.waveform.sample_interval_ms, 100.0);
        assert_eq!(config.waveform.bar_width, 3.0);
        assert_eq!(config.waveform.bar_gap, 10.0);
        assert_eq!(config.waveform.scroll_speed, 1.0);
        assert_eq!(config.waveform.noise_threshold, 0.01);
        assert_eq!(config.waveform.expand_duration_ms, 200.0);
        assert_eq!(config.waveform.amplitude_gain, 1.2);
        assert_eq!(config.waveform.easing, Easing::EaseInOutCubic);
        assert_eq!(config.waveform.marker, DotMarker::Braille);
    }

    #[test]
    fn test_partial_sections_keep_remaining_defaults() {
        let config: BarwaveConfig = toml::from_str(
            r#"
            [audio]
            device = "USB Microphone"

            [waveform]
            bar_width = 4.0
            easing = "linear"
            marker = "half-block"
            "#,
        )
        .unwrap();

        assert_eq!(config.audio.device, "USB Microphone");
        assert_eq!(config.audio.window_size, 512);
        assert_eq!(config.waveform.bar_width, 4.0);
        assert_eq!(config.waveform.bar_gap, 10.0);
        assert_eq!(config.waveform.easing, Easing::Linear);
        assert_eq!(config.waveform.marker, DotMarker::HalfBlock);
    }

    #[test]
    fn test_default_file_parses_back() {
        let written = toml::to_string_pretty(&BarwaveConfig::default()).unwrap();
        let parsed: BarwaveConfig = toml::from_str(&written).unwrap();
        assert_eq!(parsed.waveform.bar_color, "#cee0dc");
        assert_eq!(parsed.waveform.easing, Easing::EaseInOutCubic);
    }

    #[test]
    fn test_unknown_easing_is_rejected() {
        let result: Result<BarwaveConfig, _> = toml::from_str("[waveform]\neasing = \"bounce\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_defaults_validate() {
        assert!(WaveformConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_out_of_range_values() {
        let cases: [fn(&mut WaveformConfig); 6] = [
            |c| c.bar_width = 0.0,
            |c| c.bar_gap = -1.0,
            |c| c.sample_interval_ms = f64::NAN,
            |c| c.noise_threshold = 1.5,
            |c| c.frame_rate = 0,
            |c| c.expand_duration_ms = -5.0,
        ];

        for mutate in cases {
            let mut config = WaveformConfig::default();
            mutate(&mut config);
            assert!(matches!(
                config.validate(),
                Err(VisualizerError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_empty_sample_window_is_rejected() {
        let config: BarwaveConfig = toml::from_str("[audio]\nwindow_size = 0").unwrap();
        assert!(matches!(
            config.validate(),
            Err(VisualizerError::InvalidConfig(_))
        ));

        let mut config = BarwaveConfig::default();
        assert!(config.validate().is_ok());
        config.audio.window_size = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_waveform_errors_surface_through_full_validation() {
        let mut config = BarwaveConfig::default();
        config.waveform.bar_width = -3.0;
        assert!(matches!(
            config.validate(),
            Err(VisualizerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_marker_density() {
        assert_eq!(DotMarker::Braille.dots_per_cell(), (2, 4));
        assert_eq!(DotMarker::HalfBlock.dots_per_cell(), (1, 2));
        assert_eq!(DotMarker::Block.dots_per_cell(), (1, 1));
        assert_eq!(DotMarker::HalfBlock.to_string(), "half-block");
    }
}

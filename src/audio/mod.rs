//! Microphone capture for barwave.
//!
//! Finds the configured input device, opens a cpal input stream on a dedicated
//! thread and exposes the most recent mono samples as an
//! [`AmplitudeSource`](crate::waveform::AmplitudeSource).

pub mod device;
pub mod microphone;

use thiserror::Error;

pub use microphone::acquire_microphone;

#[derive(Debug, Error)]
pub enum AudioInputError {
    #[error("No audio input device available")]
    NoDevices,
    #[error("Audio input device '{0}' not found. Use 'barwave list-devices' to see available devices.")]
    DeviceNotFound(String),
    #[error("Failed to configure audio input: {0}")]
    Config(String),
    #[error("Failed to open audio stream: {0}")]
    Stream(String),
    #[error("Audio acquisition failed: {0}")]
    Acquisition(String),
}

//! Live microphone source.
//!
//! A cpal input stream cannot move between threads, so it lives on its own
//! capture thread for its whole life. Only the shared sample window crosses
//! over to the animation loop. The capture thread exits, closing the stream,
//! once the [`MicrophoneSource`] handed to the loop is dropped.

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample, StreamConfig};
use std::collections::VecDeque;
use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::oneshot;

use super::device::{find_input_device, suppress_alsa_warnings};
use super::AudioInputError;
use crate::waveform::{AmplitudeSource, SourceResult};

/// Sliding window over the most recent mono samples.
#[derive(Debug)]
pub struct SampleWindow {
    samples: Mutex<VecDeque<f32>>,
    capacity: usize,
}

impl SampleWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Mixes interleaved frames down to mono by averaging all channels, then
    /// appends them, evicting the oldest samples beyond capacity.
    pub fn push_interleaved<T>(&self, data: &[T], channels: usize)
    where
        T: Copy,
        f32: FromSample<T>,
    {
        if channels == 0 || self.capacity == 0 {
            return;
        }

        let mut samples = self.samples.lock().unwrap_or_else(PoisonError::into_inner);
        for frame in data.chunks_exact(channels) {
            let sum: f32 = frame.iter().map(|&s| f32::from_sample_(s)).sum();
            samples.push_back(sum / channels as f32);
        }

        let excess = samples.len().saturating_sub(self.capacity);
        samples.drain(..excess);
    }

    /// Copies the newest samples into the tail of `out`.
    ///
    /// When fewer samples have been captured than `out` holds, the front of
    /// `out` is zero-filled. Returns the number of captured samples copied.
    pub fn copy_latest(&self, out: &mut [f32]) -> usize {
        let samples = self.samples.lock().unwrap_or_else(PoisonError::into_inner);
        let count = samples.len().min(out.len());
        let padding = out.len() - count;

        out[..padding].fill(0.0);
        for (slot, &sample) in out[padding..]
            .iter_mut()
            .zip(samples.iter().skip(samples.len() - count))
        {
            *slot = sample;
        }
        count
    }
}

/// Amplitude source backed by a running input stream.
pub struct MicrophoneSource {
    window: Arc<SampleWindow>,
    device_name: String,
    /// Dropping this ends the capture thread
    _shutdown: mpsc::Sender<()>,
}

impl MicrophoneSource {
    pub fn device_name(&self) -> &str {
        &self.device_name
    }
}

impl AmplitudeSource for MicrophoneSource {
    fn window_len(&self) -> usize {
        self.window.capacity()
    }

    fn read_latest(&self, out: &mut [f32]) -> usize {
        self.window.copy_latest(out)
    }
}

/// Starts opening the input device in the background.
///
/// The returned receiver resolves to the source once the stream is running, or
/// to the error that prevented it. Acquisition is attempted exactly once.
pub fn acquire_microphone(device_spec: &str, window_size: usize) -> oneshot::Receiver<SourceResult> {
    let (ready_tx, ready_rx) = oneshot::channel();
    let device_spec = device_spec.to_string();

    let spawned = std::thread::Builder::new()
        .name("barwave-capture".to_string())
        .spawn(move || run_capture(&device_spec, window_size, ready_tx));

    match spawned {
        Ok(_) => ready_rx,
        Err(e) => {
            tracing::error!("Failed to spawn audio capture thread: {}", e);
            let (failed_tx, failed_rx) = oneshot::channel();
            let _ = failed_tx.send(Err(AudioInputError::Acquisition(format!(
                "could not start capture thread: {e}"
            ))));
            failed_rx
        }
    }
}

/// Body of the capture thread.
fn run_capture(device_spec: &str, window_size: usize, ready: oneshot::Sender<SourceResult>) {
    let window = Arc::new(SampleWindow::new(window_size));

    let (stream, device_name) = match open_stream(device_spec, Arc::clone(&window)) {
        Ok(opened) => opened,
        Err(e) => {
            tracing::warn!("Could not open audio input '{}': {}", device_spec, e);
            let _ = ready.send(Err(e));
            return;
        }
    };

    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
    let source = MicrophoneSource {
        window,
        device_name,
        _shutdown: shutdown_tx,
    };
    tracing::info!("Recording device: {}", source.device_name());

    if ready.send(Ok(Box::new(source))).is_err() {
        tracing::debug!("Visualizer went away before the audio stream was ready");
        return;
    }

    // Blocks until the source is dropped and the channel disconnects.
    let _ = shutdown_rx.recv();
    drop(stream);
    tracing::debug!("Audio stream closed");
}

/// Opens and starts an input stream feeding `window`.
///
/// # Errors
/// - If the device cannot be found
/// - If its configuration cannot be read or its sample format is unsupported
/// - If the stream cannot be built or started
fn open_stream(
    device_spec: &str,
    window: Arc<SampleWindow>,
) -> Result<(cpal::Stream, String), AudioInputError> {
    let device = suppress_alsa_warnings(|| {
        let host = cpal::default_host();
        find_input_device(&host, device_spec)
    })?;

    let device_name = device
        .name()
        .unwrap_or_else(|_| "Unknown device".to_string());

    let supported = device
        .default_input_config()
        .map_err(|e| AudioInputError::Config(e.to_string()))?;
    let channels = supported.channels() as usize;

    tracing::debug!(
        "Device configuration: {}Hz, {} channels, {:?}",
        supported.sample_rate().0,
        channels,
        supported.sample_format()
    );

    let config: StreamConfig = supported.config();
    let stream = match supported.sample_format() {
        SampleFormat::F32 => build_stream::<f32>(&device, &config, channels, window),
        SampleFormat::I16 => build_stream::<i16>(&device, &config, channels, window),
        SampleFormat::U16 => build_stream::<u16>(&device, &config, channels, window),
        SampleFormat::I32 => build_stream::<i32>(&device, &config, channels, window),
        format => Err(AudioInputError::Config(format!(
            "Unsupported sample format: {format:?}"
        ))),
    }?;

    stream
        .play()
        .map_err(|e| AudioInputError::Stream(e.to_string()))?;

    tracing::debug!("Audio stream started");
    Ok((stream, device_name))
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    channels: usize,
    window: Arc<SampleWindow>,
) -> Result<cpal::Stream, AudioInputError>
where
    T: SizedSample + Send + 'static,
    f32: FromSample<T>,
{
    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                window.push_interleaved(data, channels);
            },
            |err| {
                tracing::error!("Audio stream error: {}", err);
            },
            None,
        )
        .map_err(|e| AudioInputError::Stream(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stereo_is_mixed_down_to_mono() {
        let window = SampleWindow::new(8);
        window.push_interleaved(&[0.2_f32, 0.4, -1.0, 0.0], 2);

        let mut out = [9.0_f32; 2];
        assert_eq!(window.copy_latest(&mut out), 2);
        assert!((out[0] - 0.3).abs() < 1e-6);
        assert!((out[1] + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_integer_samples_are_normalized() {
        let window = SampleWindow::new(4);
        window.push_interleaved(&[i16::MIN, 0], 1);

        let mut out = [0.0_f32; 2];
        window.copy_latest(&mut out);
        assert_eq!(out, [-1.0, 0.0]);
    }

    #[test]
    fn test_window_keeps_only_the_newest_samples() {
        let window = SampleWindow::new(3);
        window.push_interleaved(&[1.0_f32, 2.0, 3.0, 4.0, 5.0], 1);

        let mut out = [0.0_f32; 3];
        assert_eq!(window.copy_latest(&mut out), 3);
        assert_eq!(out, [3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_short_window_is_zero_padded_at_the_front() {
        let window = SampleWindow::new(4);
        window.push_interleaved(&[0.5_f32], 1);

        let mut out = [7.0_f32; 4];
        assert_eq!(window.copy_latest(&mut out), 1);
        assert_eq!(out, [0.0, 0.0, 0.0, 0.5]);
    }

    #[test]
    fn test_partial_frames_are_ignored() {
        let window = SampleWindow::new(4);
        window.push_interleaved(&[0.5_f32, 0.5, 0.9], 2);

        let mut out = [0.0_f32; 4];
        assert_eq!(window.copy_latest(&mut out), 1);
    }

    #[test]
    fn test_source_reports_window_capacity() {
        let (shutdown, _rx) = mpsc::channel();
        let source = MicrophoneSource {
            window: Arc::new(SampleWindow::new(512)),
            device_name: "test".to_string(),
            _shutdown: shutdown,
        };
        assert_eq!(source.window_len(), 512);
        assert_eq!(source.device_name(), "test");
    }
}

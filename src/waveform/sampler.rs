//! Amplitude sampling cadence.
//!
//! The sampler decides, once per tick, whether a new amplitude reading should
//! be taken. It owns the audio source slot, which starts out pending and is
//! attached whenever the asynchronous acquisition finishes.

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

use super::error::{Result, VisualizerError};
use crate::audio::AudioInputError;

/// Anything that can hand out a fixed-size window of recent time-domain samples.
pub trait AmplitudeSource: Send {
    /// Number of samples in one read.
    fn window_len(&self) -> usize;

    /// Copies the latest samples into `out`, returning how many are real.
    ///
    /// Slots not backed by captured audio yet are zero-filled.
    fn read_latest(&self, out: &mut [f32]) -> usize;
}

/// Outcome of an audio acquisition attempt.
pub type SourceResult = std::result::Result<Box<dyn AmplitudeSource>, AudioInputError>;

enum SourceSlot {
    /// No acquisition was ever requested
    Detached,
    Pending(oneshot::Receiver<SourceResult>),
    Attached(Box<dyn AmplitudeSource>),
    /// Acquisition failed or was abandoned; never retried
    Unavailable,
}

/// Rate-limited reader of peak amplitude.
pub struct Sampler {
    slot: SourceSlot,
    interval_ms: f64,
    last_sample_time: Option<f64>,
    window: Vec<f32>,
}

impl Sampler {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            slot: SourceSlot::Detached,
            interval_ms,
            last_sample_time: None,
            window: Vec::new(),
        }
    }

    /// Hands over a pending acquisition; the source attaches once it resolves.
    pub fn attach(&mut self, pending: oneshot::Receiver<SourceResult>) {
        self.slot = SourceSlot::Pending(pending);
    }

    /// Attaches an already opened source.
    pub fn attach_source(&mut self, source: Box<dyn AmplitudeSource>) {
        tracing::info!(window = source.window_len(), "Audio source attached");
        self.window = vec![0.0; source.window_len()];
        self.slot = SourceSlot::Attached(source);
    }

    #[cfg(test)]
    pub fn is_attached(&self) -> bool {
        matches!(self.slot, SourceSlot::Attached(_))
    }

    /// Checks, without blocking, whether a pending acquisition has resolved.
    pub fn poll_source(&mut self) {
        let SourceSlot::Pending(pending) = &mut self.slot else {
            return;
        };

        match pending.try_recv() {
            Ok(Ok(source)) => self.attach_source(source),
            Ok(Err(e)) => {
                tracing::error!("Audio input unavailable, keeping placeholder bars: {}", e);
                self.slot = SourceSlot::Unavailable;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Closed) => {
                tracing::error!("Audio acquisition ended without a result");
                self.slot = SourceSlot::Unavailable;
            }
        }
    }

    /// Returns true when the sampling interval has elapsed at `now`.
    pub fn is_due(&self, now: f64) -> bool {
        match self.last_sample_time {
            Some(last) => now - last > self.interval_ms,
            None => true,
        }
    }

    /// Takes one peak reading if a source is attached, the interval has
    /// elapsed and the timeline has room for another bar.
    ///
    /// # Errors
    /// - If the source delivers non-finite samples
    pub fn sample(&mut self, now: f64, has_room: bool) -> Result<Option<f32>> {
        if !has_room || !self.is_due(now) {
            return Ok(None);
        }
        let SourceSlot::Attached(source) = &self.slot else {
            return Ok(None);
        };

        source.read_latest(&mut self.window);
        let peak = peak_amplitude(&self.window)?;
        self.last_sample_time = Some(now);
        Ok(Some(peak))
    }
}

/// Largest absolute sample value in `samples`, or 0 for an empty buffer.
///
/// # Errors
/// - If any sample is NaN or infinite
pub fn peak_amplitude(samples: &[f32]) -> Result<f32> {
    samples.iter().try_fold(0.0_f32, |peak, &sample| {
        if sample.is_finite() {
            Ok(peak.max(sample.abs()))
        } else {
            Err(VisualizerError::MalformedSamples(format!(
                "non-finite sample value {sample}"
            )))
        }
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Source returning whatever the test last put into it.
    #[derive(Clone)]
    pub(crate) struct ScriptedSource {
        samples: Arc<Mutex<Vec<f32>>>,
    }

    impl ScriptedSource {
        pub(crate) fn new(samples: Vec<f32>) -> Self {
            Self {
                samples: Arc::new(Mutex::new(samples)),
            }
        }

        pub(crate) fn set(&self, samples: Vec<f32>) {
            *self.samples.lock().unwrap() = samples;
        }
    }

    impl AmplitudeSource for ScriptedSource {
        fn window_len(&self) -> usize {
            self.samples.lock().unwrap().len()
        }

        fn read_latest(&self, out: &mut [f32]) -> usize {
            let samples = self.samples.lock().unwrap();
            let count = samples.len().min(out.len());
            out[..count].copy_from_slice(&samples[..count]);
            out[count..].fill(0.0);
            count
        }
    }

    fn attached_sampler(samples: Vec<f32>) -> Sampler {
        let mut sampler = Sampler::new(100.0);
        sampler.attach_source(Box::new(ScriptedSource::new(samples)));
        sampler
    }

    #[test]
    fn test_peak_uses_absolute_value() {
        assert_eq!(peak_amplitude(&[0.1, -0.7, 0.3]).unwrap(), 0.7);
        assert_eq!(peak_amplitude(&[-0.2, -0.4]).unwrap(), 0.4);
        assert_eq!(peak_amplitude(&[]).unwrap(), 0.0);
    }

    #[test]
    fn test_non_finite_samples_are_rejected() {
        assert!(matches!(
            peak_amplitude(&[0.1, f32::NAN]),
            Err(VisualizerError::MalformedSamples(_))
        ));
        assert!(peak_amplitude(&[f32::INFINITY]).is_err());
    }

    #[test]
    fn test_sampling_is_gated_by_interval() {
        let mut sampler = attached_sampler(vec![0.5; 8]);

        assert_eq!(sampler.sample(0.0, true).unwrap(), Some(0.5));
        assert_eq!(sampler.sample(50.0, true).unwrap(), None);
        assert_eq!(sampler.sample(100.0, true).unwrap(), None);
        assert_eq!(sampler.sample(150.0, true).unwrap(), Some(0.5));
    }

    #[test]
    fn test_no_sample_without_room() {
        let mut sampler = attached_sampler(vec![0.5; 8]);

        assert_eq!(sampler.sample(0.0, false).unwrap(), None);
        // A skipped reading does not reset the interval.
        assert_eq!(sampler.sample(1.0, true).unwrap(), Some(0.5));
    }

    #[test]
    fn test_silence_still_produces_a_reading() {
        let mut sampler = attached_sampler(vec![0.0; 8]);
        assert_eq!(sampler.sample(0.0, true).unwrap(), Some(0.0));
    }

    #[test]
    fn test_detached_sampler_is_a_no_op() {
        let mut sampler = Sampler::new(100.0);
        sampler.poll_source();
        assert!(!sampler.is_attached());
        assert_eq!(sampler.sample(1_000.0, true).unwrap(), None);
    }

    #[test]
    fn test_pending_source_attaches_when_acquisition_completes() {
        let (tx, rx) = oneshot::channel();
        let mut sampler = Sampler::new(100.0);
        sampler.attach(rx);

        sampler.poll_source();
        assert!(!sampler.is_attached());
        assert_eq!(sampler.sample(0.0, true).unwrap(), None);

        let source: Box<dyn AmplitudeSource> = Box::new(ScriptedSource::new(vec![0.25; 4]));
        assert!(tx.send(Ok(source)).is_ok());

        sampler.poll_source();
        assert!(sampler.is_attached());
        assert_eq!(sampler.sample(10.0, true).unwrap(), Some(0.25));
    }

    #[test]
    fn test_failed_acquisition_leaves_sampler_detached() {
        let (tx, rx) = oneshot::channel();
        let mut sampler = Sampler::new(100.0);
        sampler.attach(rx);

        assert!(tx.send(Err(AudioInputError::NoDevices)).is_ok());
        sampler.poll_source();
        sampler.poll_source();

        assert!(!sampler.is_attached());
        assert_eq!(sampler.sample(0.0, true).unwrap(), None);
    }

    #[test]
    fn test_dropped_acquisition_leaves_sampler_detached() {
        let (tx, rx) = oneshot::channel::<SourceResult>();
        let mut sampler = Sampler::new(100.0);
        sampler.attach(rx);
        drop(tx);

        sampler.poll_source();
        assert!(!sampler.is_attached());
    }

    #[test]
    fn test_malformed_window_is_an_error() {
        let mut sampler = attached_sampler(vec![0.1, f32::NAN]);
        assert!(sampler.sample(0.0, true).is_err());
    }
}

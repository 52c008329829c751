//! Visualizer lifecycle and the tick loop.
//!
//! [`Visualizer`] owns all mutable state of a session: the timeline, the
//! sampler, the renderer and the surface. It moves through
//! `Uninitialized -> Seeded -> Running -> Stopped`, and while running each tick
//! samples, mutates the timeline and paints one frame.

use super::clock::Clock;
use super::error::{Result, VisualizerError};
use super::renderer::{Palette, Renderer};
use super::sampler::{Sampler, SourceResult};
use super::schedule::Scheduler;
use super::surface::Surface;
use super::timeline::BarTimeline;
use crate::config::WaveformConfig;
use tokio::sync::oneshot;

/// Where a [`Visualizer`] is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    /// Placeholders drawn, one static frame on screen
    Seeded,
    /// Tick loop active
    Running,
    /// Loop cancelled; the last frame stays on screen
    Stopped,
}

/// Audio-reactive scrolling bar visualization.
pub struct Visualizer<S: Surface, C: Clock> {
    config: WaveformConfig,
    timeline: BarTimeline,
    sampler: Sampler,
    renderer: Renderer,
    surface: S,
    clock: C,
    state: LifecycleState,
    frames: u64,
}

impl<S: Surface, C: Clock> Visualizer<S, C> {
    /// Creates a visualizer drawing onto `surface`.
    ///
    /// # Errors
    /// - If the configuration is invalid
    /// - If the surface has no paintable area
    pub fn new(config: WaveformConfig, surface: S, clock: C) -> Result<Self> {
        config.validate()?;

        if surface.width() <= 0.0 || surface.height() <= 0.0 {
            return Err(VisualizerError::Surface(format!(
                "no paintable area ({}x{})",
                surface.width(),
                surface.height()
            )));
        }

        let renderer = Renderer::new(Palette::from_config(&config)?, config.noise_threshold);

        Ok(Self {
            timeline: BarTimeline::new(config.bar_width, config.bar_gap),
            sampler: Sampler::new(config.sample_interval_ms),
            renderer,
            surface,
            clock,
            state: LifecycleState::Uninitialized,
            frames: 0,
            config,
        })
    }

    /// Hands the sampler a pending audio acquisition.
    ///
    /// The loop keeps running on placeholders until the acquisition resolves,
    /// whenever that is.
    pub fn attach_source(&mut self, pending: oneshot::Receiver<SourceResult>) {
        self.sampler.attach(pending);
    }

    /// Seeds placeholders and paints a single static frame.
    ///
    /// # Errors
    /// - If the frame cannot be presented
    pub fn initialize(&mut self) -> Result<()> {
        self.timeline.seed_placeholders(
            self.surface.width(),
            self.config.bar_width,
            self.config.bar_gap,
        );
        self.paint()?;
        self.state = LifecycleState::Seeded;

        tracing::debug!(
            placeholders = self.timeline.len(),
            width = self.surface.width(),
            height = self.surface.height(),
            "Waveform seeded"
        );
        Ok(())
    }

    /// Enters the running state, seeding first if that has not happened yet.
    ///
    /// Calling this while already running has no effect.
    ///
    /// # Errors
    /// - If the initial frame cannot be presented
    pub fn start(&mut self) -> Result<()> {
        match self.state {
            LifecycleState::Running => {
                tracing::warn!("Visualizer already running, ignoring start");
                return Ok(());
            }
            LifecycleState::Uninitialized => self.initialize()?,
            LifecycleState::Seeded | LifecycleState::Stopped => {}
        }

        self.state = LifecycleState::Running;
        tracing::info!("Waveform animation started");
        Ok(())
    }

    /// Stops the animation. The last painted frame is left as is.
    pub fn stop(&mut self) {
        if self.state == LifecycleState::Running {
            tracing::info!(
                frames = self.frames,
                recorded_bars = self.timeline.recorded_count(),
                "Waveform animation stopped"
            );
        }
        self.state = LifecycleState::Stopped;
    }

    /// Runs one animation step: sample, append, scroll, grow, paint.
    ///
    /// Does nothing unless the visualizer is running.
    ///
    /// # Errors
    /// - If the audio source delivers malformed samples
    /// - If the frame cannot be presented
    pub fn tick(&mut self) -> Result<()> {
        if self.state != LifecycleState::Running {
            return Ok(());
        }

        let now = self.clock.now_ms();
        let surface_width = self.surface.width();
        let surface_height = self.surface.height();

        self.sampler.poll_source();
        let has_room = self.timeline.has_room(surface_width);
        if let Some(peak) = self.sampler.sample(now, has_room)? {
            let target_height =
                (f64::from(peak) * surface_height * self.config.amplitude_gain).floor();
            self.timeline.try_append(target_height, now, surface_width);
        }

        self.timeline.advance_and_cull(self.config.scroll_speed);

        let easing = self.config.easing;
        self.timeline
            .update_heights(now, self.config.expand_duration_ms, |p| easing.apply(p));

        self.paint()?;
        self.frames += 1;
        Ok(())
    }

    /// Drives the tick loop until the scheduler is cancelled.
    ///
    /// An error escaping a tick ends the loop: the scheduler is cancelled, the
    /// visualizer stopped and the error returned.
    ///
    /// # Errors
    /// - If starting or any tick fails
    pub fn run<T: Scheduler + ?Sized>(&mut self, scheduler: &mut T) -> Result<()> {
        self.start()?;

        while self.state == LifecycleState::Running && scheduler.wait_next() {
            if let Err(e) = self.tick() {
                tracing::error!("Tick failed, stopping animation: {}", e);
                scheduler.cancel();
                self.stop();
                return Err(e);
            }
        }

        self.stop();
        Ok(())
    }

    fn paint(&mut self) -> Result<()> {
        self.renderer.paint(&self.timeline, &mut self.surface);
        self.surface.present()
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    #[cfg(test)]
    pub fn timeline(&self) -> &BarTimeline {
        &self.timeline
    }

    #[cfg(test)]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Number of frames painted by the tick loop.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

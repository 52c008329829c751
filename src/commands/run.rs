//! Live waveform visualization.
//!
//! Takes over the terminal, paints the placeholder strip, starts microphone
//! acquisition in the background and animates until the user quits or a
//! termination signal arrives.

use anyhow::Context;
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};

use crate::audio::acquire_microphone;
use crate::config::BarwaveConfig;
use crate::ui::{TerminalScheduler, TerminalSurface};
use crate::waveform::{MonotonicClock, StopHandle, Visualizer};

/// Runs the visualizer until `q`, `Esc`, `Ctrl+C` or a termination signal.
///
/// # Errors
/// - If the configuration cannot be loaded or is invalid
/// - If the terminal cannot be used as a drawing surface
/// - If the animation loop fails
pub async fn handle_run(device: Option<String>) -> anyhow::Result<()> {
    tracing::info!("=== barwave started ===");

    let mut config_data = BarwaveConfig::load()?;
    if let Some(device) = device {
        config_data.audio.device = device;
    }
    config_data.validate()?;

    tracing::info!(
        "Configuration loaded: device={}, window={} samples, interval={}ms, bar={}+{}, easing={}, marker={}",
        config_data.audio.device,
        config_data.audio.window_size,
        config_data.waveform.sample_interval_ms,
        config_data.waveform.bar_width,
        config_data.waveform.bar_gap,
        config_data.waveform.easing,
        config_data.waveform.marker
    );

    let stop = StopHandle::new();
    for signal in [SIGTERM, SIGINT, SIGHUP] {
        signal_hook::flag::register(signal, stop.flag())
            .with_context(|| format!("Failed to register handler for signal {signal}"))?;
    }

    let frames = tokio::task::spawn_blocking(move || animate(config_data, stop))
        .await
        .context("Waveform thread panicked")??;

    tracing::info!(frames, "=== barwave exited successfully ===");
    Ok(())
}

/// Builds the visualizer on the terminal and drives it to completion.
///
/// Returns the number of animated frames.
fn animate(config_data: BarwaveConfig, stop: StopHandle) -> anyhow::Result<u64> {
    let marker = config_data.waveform.marker;
    let frame_rate = config_data.waveform.frame_rate;

    let surface = TerminalSurface::new(marker)?;
    let mut visualizer = Visualizer::new(config_data.waveform, surface, MonotonicClock::new())?;

    // Show the placeholder strip before the device is opened, so there is
    // something on screen while the audio backend negotiates access.
    visualizer.initialize()?;
    visualizer.attach_source(acquire_microphone(
        &config_data.audio.device,
        config_data.audio.window_size,
    ));

    let mut scheduler = TerminalScheduler::new(frame_rate, stop);
    let result = visualizer.run(&mut scheduler);
    let frames = visualizer.frames();
    tracing::debug!(state = ?visualizer.state(), frames, "Waveform loop returned");

    // Restores the terminal before any error is printed.
    drop(visualizer);

    result?;
    Ok(frames)
}

//! barwave: a scrolling bar waveform of live microphone input, in the terminal.

mod app;
mod audio;
mod commands;
mod config;
mod logging;
mod ui;
mod waveform;

use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = app::run().await {
        tracing::error!("Fatal error: {e:#}");
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to appropriate command handlers.

use crate::commands;
use crate::logging;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;

/// A terminal waveform that scrolls with your microphone
#[derive(Parser)]
#[command(name = "barwave")]
#[command(version)]
#[command(about = "\n\n ▂▅▇▃▆▂ barwave")]
#[command(long_about = "\n\n ▂▅▇▃▆▂ barwave\n\nA scrolling bar waveform of live microphone input, drawn in the terminal.\nEvery sample interval the loudest recent sample becomes a new bar at the\nright edge; bars grow to their height and drift left until they scroll off.\n\nDEFAULT COMMAND:\n    If no command is specified, 'run' is used by default.\n\nKEYS:\n    q, Esc, Ctrl+C    Quit\n\nEXAMPLES:\n    # Visualize the default input device\n    $ barwave\n\n    # Visualize device #2 from 'barwave list-devices'\n    $ barwave --device 2\n\n    # Tune colors, speed and easing\n    $ barwave config")]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/barwave/barwave.toml\n    Logs:               ~/.local/state/barwave/barwave.log.*"
)]
struct Cli {
    /// Input device: "default", a device ID or a device name (run default command)
    #[arg(short, long, value_name = "DEVICE", global = true)]
    device: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the live waveform (default)
    ///
    /// Press q, Esc or Ctrl+C to quit.
    #[command(visible_alias = "r")]
    Run,

    /// Open configuration file in your preferred editor
    ///
    /// Edit the input device, bar geometry, colors, easing and frame rate.
    /// Uses $VISUAL or $EDITOR, falling back to nano/vi.
    #[command(visible_alias = "c")]
    Config,

    /// List available audio input devices
    ///
    /// Shows device IDs, names, and configurations to help configure
    /// the correct input device in barwave.toml.
    #[command(name = "list-devices")]
    ListDevices,

    /// Show recent log entries from the application
    ///
    /// Display the last 50 lines of the most recent log file.
    /// Useful for troubleshooting issues.
    Logs,

    /// Generate shell completion script
    ///
    /// Examples:
    ///   barwave completions bash > barwave.bash
    ///   barwave completions zsh > _barwave
    ///   barwave completions fish > barwave.fish
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Errors
/// - If logging initialization fails
/// - If command execution fails
pub async fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Commands that print to the terminal and don't need logging
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "barwave", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::ListDevices) => return commands::handle_list_devices(),
        Some(Commands::Logs) => return commands::handle_logs(),
        _ => {}
    }

    logging::init_logging()?;

    match cli.command {
        None | Some(Commands::Run) => commands::handle_run(cli.device).await?,
        Some(Commands::Config) => commands::handle_config()?,
        Some(Commands::Completions { .. }) | Some(Commands::ListDevices) | Some(Commands::Logs) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_run() {
        let cli = Cli::try_parse_from(["barwave", "--device", "2"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.device.as_deref(), Some("2"));
    }

    #[test]
    fn test_device_is_global() {
        let cli = Cli::try_parse_from(["barwave", "run", "-d", "USB Mic"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Run)));
        assert_eq!(cli.device.as_deref(), Some("USB Mic"));
    }

    #[test]
    fn test_list_devices_name() {
        let cli = Cli::try_parse_from(["barwave", "list-devices"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::ListDevices)));
    }
}

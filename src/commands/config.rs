//! Configuration file editor command.
//!
//! Opens `~/.config/barwave/barwave.toml` in the user's preferred editor,
//! writing out a file full of defaults first if there is none.

use anyhow::Context;
use std::process::Command;

use crate::config::{ensure_config_file, BarwaveConfig};

/// Opens the barwave configuration file in the user's preferred editor.
///
/// Editor lookup order: `$VISUAL`, `$EDITOR`, `nano`, `vi`. After the editor
/// exits the file is parsed again so mistakes are reported right away.
///
/// # Errors
/// - If the config file cannot be created
/// - If no editor can be found or executed
/// - If the edited file no longer parses or validates
pub fn handle_config() -> anyhow::Result<()> {
    let config_path = ensure_config_file()?;
    tracing::info!("Opening config file: {}", config_path.display());

    let (program, args) = find_editor()?;
    tracing::debug!("Using editor: {} {:?}", program, args);

    let status = Command::new(&program)
        .args(&args)
        .arg(&config_path)
        .status()
        .with_context(|| {
            format!("Failed to open editor '{program}'. Make sure it is installed and on PATH.")
        })?;

    if !status.success() {
        anyhow::bail!(
            "Editor exited with error code: {}",
            status.code().unwrap_or(-1)
        );
    }

    let edited = BarwaveConfig::load_from(&config_path)?;
    edited.validate()?;

    tracing::info!("Config file edited successfully");
    Ok(())
}

/// Picks the editor command, split into program and leading arguments.
fn find_editor() -> anyhow::Result<(String, Vec<String>)> {
    for var in ["VISUAL", "EDITOR"] {
        if let Some(command) = std::env::var(var).ok().and_then(|v| split_command(&v)) {
            return Ok(command);
        }
    }

    for editor in ["nano", "vi"] {
        if is_editor_available(editor) {
            return Ok((editor.to_string(), Vec::new()));
        }
    }

    anyhow::bail!("No editor found. Please set the $EDITOR environment variable.")
}

/// Splits an editor setting such as `code --wait` on whitespace.
fn split_command(command: &str) -> Option<(String, Vec<String>)> {
    let mut parts = command.split_whitespace().map(str::to_string);
    let program = parts.next()?;
    Some((program, parts.collect()))
}

fn is_editor_available(editor: &str) -> bool {
    Command::new("which")
        .arg(editor)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_editor_command() {
        assert_eq!(split_command("vim"), Some(("vim".to_string(), vec![])));
        assert_eq!(
            split_command("  code --wait "),
            Some(("code".to_string(), vec!["--wait".to_string()]))
        );
        assert_eq!(split_command("   "), None);
    }
}

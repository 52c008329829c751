//! Display recent log entries from the application.

use anyhow::{anyhow, Context};
use std::fs;
use std::path::{Path, PathBuf};

use crate::logging::{is_rotated_log, log_dir};

const DEFAULT_LINES: usize = 50;

/// Shows recent log entries from the application logs.
///
/// Displays the last lines of the most recently modified log file.
///
/// # Errors
/// - If the log directory cannot be determined
/// - If log files cannot be read
pub fn handle_logs() -> Result<(), anyhow::Error> {
    let log_dir = log_dir()?;

    if !log_dir.exists() {
        println!("Log directory does not exist yet: {}", log_dir.display());
        println!("Logs will be created when the application runs.");
        return Ok(());
    }

    let Some(log_file) = find_latest_log(&log_dir)? else {
        println!("No log files found in: {}", log_dir.display());
        println!("Run 'barwave' to generate logs.");
        return Ok(());
    };

    let content = fs::read_to_string(&log_file)
        .with_context(|| format!("Failed to read log file {}", log_file.display()))?;

    if content.is_empty() {
        println!("Log file is empty: {}", log_file.display());
        return Ok(());
    }

    let lines: Vec<&str> = content.lines().collect();
    let start_index = lines.len().saturating_sub(DEFAULT_LINES);

    println!();
    if start_index > 0 {
        println!("Showing last {} of {} lines:", DEFAULT_LINES, lines.len());
    } else {
        println!("Showing all {} lines:", lines.len());
    }
    println!("Full log file at: {}", log_file.display());
    println!();

    for line in &lines[start_index..] {
        println!("{line}");
    }

    Ok(())
}

/// Finds the most recently modified rotated log file in the directory.
///
/// Uses the same file name rule as the startup cleanup.
fn find_latest_log(log_dir: &Path) -> Result<Option<PathBuf>, anyhow::Error> {
    let entries =
        fs::read_dir(log_dir).map_err(|e| anyhow!("Failed to read log directory: {e}"))?;

    let latest = entries
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            let is_log = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(is_rotated_log);
            if !is_log {
                return None;
            }
            let modified = fs::metadata(&path).ok()?.modified().ok()?;
            Some((path, modified))
        })
        .max_by_key(|(_, modified)| *modified)
        .map(|(path, _)| path);

    Ok(latest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LOG_FILE_PREFIX;

    #[test]
    fn test_latest_log_ignores_foreign_files() {
        let dir = std::env::temp_dir().join(format!("barwave-logs-test-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("create temp dir");
        fs::write(dir.join("notes.txt"), "not a log").expect("write file");
        fs::write(dir.join(format!("{LOG_FILE_PREFIX}.old")), "backup").expect("write file");
        fs::write(dir.join(LOG_FILE_PREFIX), "unrotated").expect("write file");

        assert_eq!(find_latest_log(&dir).expect("read dir"), None);

        let log = dir.join(format!("{LOG_FILE_PREFIX}.2024-05-01"));
        fs::write(&log, "line").expect("write log");
        assert_eq!(find_latest_log(&dir).expect("read dir"), Some(log));

        fs::remove_dir_all(&dir).expect("remove temp dir");
    }
}

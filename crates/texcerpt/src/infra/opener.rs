//! Opening generated files with the platform's default viewer.

use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{Context, Result, anyhow};

/// Hand `path` to the first platform opener that accepts it.
pub fn open(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(anyhow!("cannot open missing file {}", path.display()));
    }

    for command in opener_commands() {
        match try_command_open(command, path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), opener = command[0], "opened file");
                return Ok(());
            }
            Err(err) => tracing::debug!(error = %err, opener = command[0], "opener failed"),
        }
    }

    Err(anyhow!(
        "no default viewer available to open {}",
        path.display()
    ))
}

fn try_command_open(command: &[&str], path: &Path) -> Result<()> {
    let (program, args) = command
        .split_first()
        .context("opener command missing program")?;

    let status = Command::new(program)
        .args(args)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .with_context(|| format!("failed to spawn opener: {program}"))?;

    if status.success() {
        Ok(())
    } else {
        Err(anyhow!("opener {program} exited with status {status}"))
    }
}

#[cfg(target_os = "macos")]
fn opener_commands() -> Vec<&'static [&'static str]> {
    vec![&["open"]]
}

#[cfg(all(unix, not(target_os = "macos")))]
fn opener_commands() -> Vec<&'static [&'static str]> {
    vec![&["xdg-open"], &["gio", "open"]]
}

#[cfg(target_os = "windows")]
fn opener_commands() -> Vec<&'static [&'static str]> {
    // `start` treats its first quoted argument as a window title.
    vec![&["cmd", "/C", "start", ""]]
}

#[cfg(not(any(unix, target_os = "windows")))]
fn opener_commands() -> Vec<&'static [&'static str]> {
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_rejected_before_spawning() {
        let err = open(Path::new("/no/such/excerpt.pdf")).unwrap_err();
        assert!(err.to_string().contains("missing file"));
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_error() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        assert!(try_command_open(&["false"], temp.path()).is_err());
        assert!(try_command_open(&["true"], temp.path()).is_ok());
    }
}

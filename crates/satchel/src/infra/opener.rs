//! Opening satchel entries in an editor or the platform's default handler.

use std::env;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, anyhow};

/// Opens files using, in order: the configured command, `$VISUAL`, `$EDITOR`, then platform
/// openers.
#[derive(Debug, Clone, Default)]
pub struct Opener {
    configured: Option<Vec<String>>,
}

impl Opener {
    pub fn new(configured: Option<Vec<String>>) -> Self {
        Self {
            configured: configured.filter(|command| !command.is_empty()),
        }
    }

    pub fn open(&self, path: &Path) -> Result<()> {
        if let Some(command) = self.preferred_command() {
            return run_command(&command, path);
        }
        try_commands(&fallback_commands(), path)
    }

    fn preferred_command(&self) -> Option<Vec<String>> {
        if let Some(command) = &self.configured {
            return Some(command.clone());
        }
        ["VISUAL", "EDITOR"]
            .into_iter()
            .filter_map(|var| env::var(var).ok())
            .map(|value| split_command(&value))
            .find(|command| !command.is_empty())
    }
}

fn try_commands(commands: &[&[&str]], path: &Path) -> Result<()> {
    let mut last_error = None;
    for command in commands {
        let command: Vec<String> = command.iter().map(|part| (*part).to_owned()).collect();
        match run_command(&command, path) {
            Ok(()) => return Ok(()),
            Err(err) => {
                tracing::debug!(command = ?command, error = %err, "open command failed");
                last_error = Some(err);
            }
        }
    }

    let hint = format!(
        "no way to open {}; set `open.command`, $VISUAL, or $EDITOR",
        path.display()
    );
    match last_error {
        Some(err) => Err(err.context(hint)),
        None => Err(anyhow!(hint)),
    }
}

fn split_command(value: &str) -> Vec<String> {
    value.split_whitespace().map(str::to_owned).collect()
}

fn run_command(command: &[String], path: &Path) -> Result<()> {
    let (program, args) = command
        .split_first()
        .context("open command missing program")?;

    tracing::info!(program = %program, path = %path.display(), "opening entry");
    let status = Command::new(program)
        .args(args)
        .arg(path)
        .status()
        .with_context(|| format!("failed to spawn open command: {program}"))?;
    if status.success() {
        Ok(())
    } else {
        Err(anyhow!("open command `{program}` exited with status {status}"))
    }
}

#[cfg(target_os = "macos")]
fn fallback_commands() -> Vec<&'static [&'static str]> {
    vec![&["open"]]
}

#[cfg(all(unix, not(target_os = "macos")))]
fn fallback_commands() -> Vec<&'static [&'static str]> {
    vec![&["xdg-open"]]
}

#[cfg(target_os = "windows")]
fn fallback_commands() -> Vec<&'static [&'static str]> {
    vec![&["cmd", "/C", "start", ""]]
}

#[cfg(not(any(unix, target_os = "windows")))]
fn fallback_commands() -> Vec<&'static [&'static str]> {
    Vec::new()
}

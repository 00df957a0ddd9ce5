use crate::constants::{
    COLOR_RESET, DEFAULT_ERROR_COLOR, DEFAULT_FRAGINFO_COLOR, DEFAULT_HEADER_COLOR,
    DEFAULT_PROMPT_COLOR,
};
use anyhow::{Context, Result, bail};
use std::io::IsTerminal;
use std::path::Path;
use std::process::Command;

/// ANSI escape strings for the interactive color slots, resolved once at
/// startup. All strings are empty when color is disabled, which makes every
/// renderer colorless without further checks.
#[derive(Debug, Clone)]
pub struct Palette {
    pub header: String,
    pub prompt: String,
    pub error: String,
    pub fraginfo: String,
    pub reset: String,
}

impl Palette {
    pub fn plain() -> Self {
        Self {
            header: String::new(),
            prompt: String::new(),
            error: String::new(),
            fraginfo: String::new(),
            reset: String::new(),
        }
    }

    /// resolve the palette from the repository's configuration, honouring
    /// `color.interactive` (with `auto` meaning "stdout is a terminal") and
    /// the per-slot `color.interactive.*` overrides
    pub fn resolve(workdir: &Path) -> Result<Self> {
        let tty = std::io::stdout().is_terminal();
        if !config_colorbool(workdir, "color.interactive", tty)? {
            return Ok(Self::plain());
        }

        Ok(Self {
            header: config_color(workdir, "color.interactive.header", DEFAULT_HEADER_COLOR)?,
            prompt: config_color(workdir, "color.interactive.prompt", DEFAULT_PROMPT_COLOR)?,
            error: config_color(workdir, "color.interactive.error", DEFAULT_ERROR_COLOR)?,
            fraginfo: config_color(workdir, "color.interactive.fraginfo", DEFAULT_FRAGINFO_COLOR)?,
            reset: COLOR_RESET.to_string(),
        })
    }

    pub fn is_enabled(&self) -> bool {
        !self.reset.is_empty()
    }

    /// wrap text in a slot's escape and the reset escape; a no-op when the
    /// slot (or the whole palette) is colorless
    pub fn paint(&self, color: &str, text: &str) -> String {
        if color.is_empty() {
            text.to_string()
        } else {
            format!("{color}{text}{}", self.reset)
        }
    }
}

fn config_colorbool(workdir: &Path, name: &str, tty: bool) -> Result<bool> {
    let output = Command::new("git")
        .current_dir(workdir)
        .args([
            "config",
            "--get-colorbool",
            name,
            if tty { "true" } else { "false" },
        ])
        .output()
        .context("failed to run git config")?;

    if !output.status.success() {
        bail!("could not parse {name} config");
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim() == "true")
}

/// ask git for the escape sequence of a configured color slot, falling back
/// to the given default color name
fn config_color(workdir: &Path, name: &str, default: &str) -> Result<String> {
    let output = Command::new("git")
        .current_dir(workdir)
        .args(["config", "--get-color", name, default])
        .output()
        .context("failed to run git config")?;

    if !output.status.success() {
        bail!("could not parse {name} config");
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

//! Cross-platform config file resolution.
//!
//! Lookup order:
//! 1. Explicit override (`--config`)
//! 2. Home directory (`~/.timecard-sync/config.toml`)
//! 3. Platform config directory (XDG on Linux, Application Support on macOS,
//!    AppData on Windows)
//!
//! The first candidate that exists wins. When none exists the home location
//! is returned so error messages point at the canonical place.

use anyhow::{Context, Result};
use std::path::PathBuf;

const APP_DIR: &str = "timecard-sync";
const CONFIG_FILE: &str = "config.toml";

pub fn config_path(override_path: Option<&PathBuf>) -> Result<PathBuf> {
    if let Some(path) = override_path {
        return Ok(path.clone());
    }

    let candidates = candidate_paths();
    if let Some(found) = candidates.iter().find(|path| path.exists()) {
        return Ok(found.clone());
    }

    candidates
        .into_iter()
        .next()
        .context("Could not determine a config location. Pass --config <PATH>.")
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(home) = home::home_dir() {
        candidates.push(home.join(format!(".{}", APP_DIR)).join(CONFIG_FILE));
    }

    if let Some(config) = dirs::config_dir() {
        candidates.push(config.join(APP_DIR).join(CONFIG_FILE));
    }

    candidates
}

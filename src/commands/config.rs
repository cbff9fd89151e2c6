use crate::config::Config;
use anyhow::{Context, Result};

pub fn list(config: &Config) -> Result<()> {
    let mut shown = config.clone();
    if shown.backend.token.is_some() {
        shown.backend.token = Some("********".to_string());
    }
    let toml_str = toml::to_string_pretty(&shown).context("Failed to serialize config")?;
    println!("{}", toml_str);
    Ok(())
}

pub fn get(key: &str, config: &Config) -> Result<()> {
    let value = serde_json::to_value(config).context("Failed to serialize config")?;

    // Dot notation: "sync.poll_interval_secs"
    let mut current = &value;
    for part in key.split('.') {
        current = current
            .get(part)
            .with_context(|| format!("Key not found: {}", part))?;
    }

    match current {
        serde_json::Value::String(s) => println!("{}", s),
        v => println!("{}", v),
    }

    Ok(())
}

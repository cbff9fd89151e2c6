use crate::OutputFormat;
use crate::config::Config;
use crate::duration::format_relative;
use crate::session::clock::compute;
use crate::sync::TrackerState;
use crate::tracker::{TrackerLabel, render};
use anyhow::{Context, Result};

fn one_shot_label(state: &TrackerState) -> TrackerLabel {
    let elapsed = state
        .clock_range()
        .map(|range| compute(range.start, range.end));
    render(state, elapsed)
}

fn print_label(label: &TrackerLabel, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{}", label),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(label).context("Failed to serialize status")?
        ),
    }
    Ok(())
}

pub async fn start(config: &Config, format: OutputFormat) -> Result<()> {
    let controller = super::controller(config)?;
    controller
        .refresh_snapshots()
        .await
        .context("Failed to load current session")?;

    let session = controller
        .machine()
        .request_start()
        .await
        .context("Failed to start session")?;

    let label = one_shot_label(&controller.store().snapshot());
    match format {
        OutputFormat::Text => println!(
            "✓ Session {} started at {}",
            session.id,
            session.started_at.format("%H:%M")
        ),
        OutputFormat::Json => print_label(&label, format)?,
    }
    Ok(())
}

pub async fn stop(config: &Config, format: OutputFormat) -> Result<()> {
    let controller = super::controller(config)?;
    controller
        .refresh_snapshots()
        .await
        .context("Failed to load current session")?;

    controller
        .machine()
        .request_stop()
        .await
        .context("Failed to stop session")?;

    let label = one_shot_label(&controller.store().snapshot());
    match format {
        OutputFormat::Text => println!(
            "✓ Session stopped after {}",
            label.elapsed.as_deref().unwrap_or("0m")
        ),
        OutputFormat::Json => print_label(&label, format)?,
    }
    Ok(())
}

pub async fn status(config: &Config, format: OutputFormat) -> Result<()> {
    let controller = super::controller(config)?;
    tokio::try_join!(controller.refresh_snapshots(), controller.refresh_daily_total())
        .context("Failed to fetch status")?;

    print_label(&one_shot_label(&controller.store().snapshot()), format)
}

pub async fn today(config: &Config) -> Result<()> {
    let controller = super::controller(config)?;
    let total = controller
        .refresh_daily_total()
        .await
        .context("Failed to fetch time tracked today")?;

    println!("{}", format_relative(total));
    Ok(())
}

pub mod backend;
pub mod commands;
pub mod config;
pub mod duration;
pub mod error;
pub mod keyring;
pub mod logging;
pub mod platform;
pub mod session;
pub mod sync;
pub mod tracker;

use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Copy, ValueEnum, Debug, Default, Serialize)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

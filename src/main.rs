use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use timecard_sync::OutputFormat;
use timecard_sync::commands;
use timecard_sync::config;
use timecard_sync::duration::{format_compact, format_relative};

#[derive(Parser)]
#[command(name = "tcsync")]
#[command(about = "Live session clock and daily total for the timecard backend")]
#[command(version)]
struct Cli {
    #[arg(long, global = true, help = "Path to config.toml")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a tracked session
    Start {
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Stop the active session
    Stop {
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Show user, session phase, elapsed time and time tracked today
    Status {
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Show time tracked today
    Today,
    /// Keep the tracker label live until Ctrl-C
    Watch,
    /// Format a number of seconds
    Format {
        #[arg(help = "Duration in seconds")]
        secs: u64,
        #[arg(long, help = "Use the verbose phrase (e.g. \"2 minutes\")")]
        relative: bool,
    },
    /// Manage the backend token
    Auth(AuthArgs),
    /// Inspect configuration
    Config(ConfigArgs),
}

#[derive(Args)]
struct AuthArgs {
    #[command(subcommand)]
    action: AuthAction,
}

#[derive(Subcommand)]
enum AuthAction {
    /// Store the backend token in the system keyring
    Login {
        #[arg(long)]
        token: String,
    },
    /// Remove the stored backend token
    Logout,
}

#[derive(Args)]
struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Subcommand)]
enum ConfigAction {
    List,
    Get { key: String },
}

fn main() -> Result<()> {
    timecard_sync::logging::init();
    let cli = Cli::parse();

    let load_config = || config::load(cli.config.as_ref());

    match &cli.command {
        Commands::Start { format } => {
            let config = load_config()?;
            tokio::runtime::Runtime::new()?.block_on(commands::session::start(&config, *format))?;
        }
        Commands::Stop { format } => {
            let config = load_config()?;
            tokio::runtime::Runtime::new()?.block_on(commands::session::stop(&config, *format))?;
        }
        Commands::Status { format } => {
            let config = load_config()?;
            tokio::runtime::Runtime::new()?
                .block_on(commands::session::status(&config, *format))?;
        }
        Commands::Today => {
            let config = load_config()?;
            tokio::runtime::Runtime::new()?.block_on(commands::session::today(&config))?;
        }
        Commands::Watch => {
            let config = load_config()?;
            tokio::runtime::Runtime::new()?.block_on(commands::watch::watch(&config))?;
        }
        Commands::Format { secs, relative } => {
            if *relative {
                println!("{}", format_relative(*secs));
            } else {
                println!("{}", format_compact(*secs));
            }
        }
        Commands::Auth(args) => match &args.action {
            AuthAction::Login { token } => commands::auth::login(token)?,
            AuthAction::Logout => commands::auth::logout()?,
        },
        Commands::Config(args) => {
            let config = load_config()?;
            match &args.action {
                ConfigAction::List => commands::config::list(&config)?,
                ConfigAction::Get { key } => commands::config::get(key, &config)?,
            }
        }
    }

    Ok(())
}

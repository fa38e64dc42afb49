//! Rigging CLI
//!
//! Developer tool for composing and inspecting build pipelines.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::ffi::OsString;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

/// Rigging - build pipeline composition for front-end applications
#[derive(Parser)]
#[command(name = "rigging")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file or project directory
    #[arg(short, long, default_value = "rigging.yaml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Build mode: development or production
    #[arg(short, long, env = "NODE_ENV", default_value = "development", global = true)]
    mode: String,

    /// Extra module search directories, separated like PATH
    #[arg(long, env = "NODE_PATH", global = true)]
    node_path: Option<OsString>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new project
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,

        /// Project name (defaults to directory name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Print the composed pipeline description
    Compose {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },

    /// Show which pipeline handles module paths
    Route {
        /// Module paths, relative to the project directory
        #[arg(required = true)]
        paths: Vec<String>,

        /// Route as modules of an async chunk
        #[arg(long = "async")]
        is_async: bool,
    },

    /// Route every file under the application sources
    Scan,

    /// Validate configuration without emitting anything
    Validate,

    /// Interpolate the HTML template with the client environment
    Html {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Output format for the compose command
#[derive(Clone, Copy, ValueEnum)]
pub enum Format {
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout is reserved for command output
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let ctx = commands::Context {
        config_path: cli.config,
        mode: cli.mode,
        node_path: cli.node_path,
    };

    match cli.command {
        Commands::Init { path, name } => {
            commands::init::run(&path, name.as_deref())?;
        }
        Commands::Compose { format } => {
            commands::compose::run(&ctx, format)?;
        }
        Commands::Route { paths, is_async } => {
            commands::route::run(&ctx, &paths, is_async)?;
        }
        Commands::Scan => {
            commands::scan::run(&ctx)?;
        }
        Commands::Validate => {
            commands::validate::run(&ctx)?;
        }
        Commands::Html { output } => {
            commands::html::run(&ctx, output.as_deref())?;
        }
    }

    Ok(())
}

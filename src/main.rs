//! crudpath – inspect the endpoints and filter grammars of the models in a
//! settings file, and decode list request paths against them.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crudpath::endpoint::{Endpoint, list_segments};
use crudpath::settings::Settings;
use crudpath::{CrudpathError, Result};

/// Positional filter grammars for REST list endpoints
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file with the model schemas
    #[arg(short, long, default_value = "crudpath.toml")]
    settings: PathBuf,

    /// Log level, overriding the settings file (RUST_LOG takes precedence)
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the CRUD endpoints of every model
    Endpoints,

    /// Show the filter grammar of a model
    Grammar {
        /// Model name
        model: String,
    },

    /// Decode a list request path into filter criteria, printed as JSON
    Decode {
        /// Model name
        model: String,

        /// Request path, e.g. /people/age/lessThan/30
        path: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(&cli.settings)?;

    let level = cli.log_level.as_deref().unwrap_or(&settings.log_level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    debug!(settings = %cli.settings.display(), "settings loaded");

    let keeper = settings.keeper()?;
    match cli.command {
        Commands::Endpoints => {
            for model in keeper.iter() {
                for endpoint in Endpoint::for_model(&model) {
                    println!("{}", endpoint);
                }
            }
        }
        Commands::Grammar { model } => {
            let model = keeper.lookup(&model)?;
            println!("{}", model);
            println!("{}", model.grammar());
        }
        Commands::Decode { model, path } => {
            let model = keeper.lookup(&model)?;
            let segments = list_segments(&model, &path).ok_or_else(|| {
                CrudpathError::Path(format!("{} is not a list path of {}", path, model.name()))
            })?;
            let result = model.grammar().decode(segments.as_slice());
            if let Some(error) = result.error() {
                warn!(%error, "partial decode");
            }
            let json = serde_json::to_string_pretty(&result)
                .map_err(|e| CrudpathError::Invariant(e.to_string()))?;
            println!("{}", json);
        }
    }
    Ok(())
}

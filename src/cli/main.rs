//! CLI binary entry point for models-repository-cli

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use models_repository_sdk::cli::commands::export::{ExportArgs, handle_export};
#[cfg(feature = "cli")]
use models_repository_sdk::cli::commands::import::{ImportArgs, handle_import};
#[cfg(feature = "cli")]
use models_repository_sdk::cli::commands::validate::{ValidateArgs, handle_validate};
#[cfg(feature = "cli")]
use models_repository_sdk::resolver::{DEFAULT_REPOSITORY, DependencyResolution};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "models-repository-cli")]
#[command(about = "CLI wrapper for the Models Repository SDK")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Resolve a model and export it with its dependencies as a JSON array
    Export {
        /// Model identifier to export, e.g. dtmi:com:example:Thermostat;1
        dtmi: String,
        /// Repository location (local directory or HTTP(S) base URL)
        #[arg(short, long, default_value = DEFAULT_REPOSITORY)]
        repository: String,
        /// Output file path; prints to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Dependency resolution mode
        #[arg(long, value_enum, default_value_t = ResolutionArg::Enabled)]
        resolution: ResolutionArg,
    },
    /// Import model files into a local repository tree
    Import {
        /// Model files to import (single models or arrays of models)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Local repository root directory
        #[arg(short, long, default_value = ".")]
        repository: PathBuf,
    },
    /// Validate model files against identifier and reference conventions
    Validate {
        /// Model file to validate
        input: PathBuf,
        /// Repository used to resolve dependency references
        #[arg(short, long)]
        repository: Option<String>,
        /// Skip resolving dependency references
        #[arg(long)]
        no_resolve: bool,
    },
}

#[cfg(feature = "cli")]
#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ResolutionArg {
    Disabled,
    Enabled,
    TryFromExpanded,
}

#[cfg(feature = "cli")]
impl From<ResolutionArg> for DependencyResolution {
    fn from(value: ResolutionArg) -> Self {
        match value {
            ResolutionArg::Disabled => DependencyResolution::Disabled,
            ResolutionArg::Enabled => DependencyResolution::Enabled,
            ResolutionArg::TryFromExpanded => DependencyResolution::TryFromExpanded,
        }
    }
}

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            dtmi,
            repository,
            output,
            resolution,
        } => {
            handle_export(ExportArgs {
                dtmi,
                repository,
                output,
                resolution: resolution.into(),
            })
            .await?;
        }
        Commands::Import { inputs, repository } => {
            handle_import(ImportArgs { inputs, repository }).await?;
        }
        Commands::Validate {
            input,
            repository,
            no_resolve,
        } => {
            handle_validate(ValidateArgs {
                input,
                repository,
                no_resolve,
            })
            .await?;
        }
    }

    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("models-repository-cli was built without the 'cli' feature");
}

//! Import command handlers

use crate::cli::error::CliError;
use crate::import::{ImportOutcome, ModelImporter};
use std::path::PathBuf;

/// Arguments for the import operation
#[derive(Debug, Clone)]
pub struct ImportArgs {
    /// Model files to import (each a single model or an array of models).
    pub inputs: Vec<PathBuf>,
    /// Local repository root to import into.
    pub repository: PathBuf,
}

/// Import model files into a local repository tree, one file per model at
/// its conventional path.
pub async fn handle_import(args: ImportArgs) -> Result<(), CliError> {
    let importer = ModelImporter::new(&args.repository);

    for input in &args.inputs {
        let content = std::fs::read_to_string(input)
            .map_err(|error| CliError::FileReadError(input.clone(), error.to_string()))?;

        for outcome in importer.import(&content).await? {
            match outcome {
                ImportOutcome::Imported(path) => {
                    println!("Imported model to {}", path.display());
                }
                ImportOutcome::SkippedExisting(path) => {
                    println!("Skipped {}: model file already exists", path.display());
                }
            }
        }
    }

    Ok(())
}

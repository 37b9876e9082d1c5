//! Export command handlers

use crate::cli::error::CliError;
use crate::dtmi::Dtmi;
use crate::resolver::{DependencyResolution, ModelResolver};
use serde_json::Value;
use std::path::PathBuf;

/// Arguments for the export operation
#[derive(Debug, Clone)]
pub struct ExportArgs {
    /// Root model identifier to export.
    pub dtmi: String,
    /// Repository location (local path or HTTP(S) base URL).
    pub repository: String,
    /// Output file; stdout when absent.
    pub output: Option<PathBuf>,
    pub resolution: DependencyResolution,
}

/// Resolve a model and emit its closure as a JSON array, root first and
/// dependencies ordered by DTMI.
pub async fn handle_export(args: ExportArgs) -> Result<(), CliError> {
    let resolver = ModelResolver::with_resolution(&args.repository, args.resolution)?;
    let root = Dtmi::new(&args.dtmi)?;
    let mut resolved = resolver.resolve(&args.dtmi).await?;

    let root_definition = resolved.remove(&root).ok_or_else(|| {
        CliError::InvalidArgument(format!("resolution result does not contain '{root}'"))
    })?;

    let mut ordered: Vec<(Dtmi, String)> = Vec::with_capacity(resolved.len() + 1);
    ordered.push((root, root_definition));
    let mut dependencies: Vec<(Dtmi, String)> = resolved.into_iter().collect();
    dependencies.sort_by(|(a, _), (b, _)| a.cmp(b));
    ordered.extend(dependencies);

    let mut values = Vec::with_capacity(ordered.len());
    for (dtmi, definition) in &ordered {
        let value: Value = crate::query::parse_lenient(definition).map_err(|error| {
            CliError::Serialization(format!("definition of '{dtmi}' is not valid JSON: {error}"))
        })?;
        values.push(value);
    }

    let payload = serde_json::to_string_pretty(&Value::Array(values))
        .map_err(|error| CliError::Serialization(error.to_string()))?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, payload)
                .map_err(|error| CliError::FileWriteError(path.clone(), error.to_string()))?;
            println!("Exported {} model(s) to {}", ordered.len(), path.display());
        }
        None => println!("{payload}"),
    }

    Ok(())
}

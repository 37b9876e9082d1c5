//! Validate command handlers

use crate::cli::error::CliError;
use crate::dtmi::Dtmi;
use crate::query::{self, ModelQuery};
use crate::resolver::ModelResolver;
use std::path::PathBuf;

/// Arguments for the validate operation
#[derive(Debug, Clone)]
pub struct ValidateArgs {
    /// Model file to validate (a single model or an array of models).
    pub input: PathBuf,
    /// Repository used to resolve dependency references.
    pub repository: Option<String>,
    /// Skip the dependency-resolution pass.
    pub no_resolve: bool,
}

/// Structurally validate model documents: each must parse as JSON, declare
/// a grammar-valid `@id`, and (unless disabled) have resolvable
/// dependencies in the given repository.
pub async fn handle_validate(args: ValidateArgs) -> Result<(), CliError> {
    let content = std::fs::read_to_string(&args.input)
        .map_err(|error| CliError::FileReadError(args.input.clone(), error.to_string()))?;

    let (documents, _) = query::extract_documents(&content)?;
    if documents.is_empty() {
        return Err(CliError::InvalidArgument(format!(
            "{} contains no model documents",
            args.input.display()
        )));
    }

    let resolver = match (&args.repository, args.no_resolve) {
        (Some(repository), false) => Some(ModelResolver::new(repository)?),
        _ => None,
    };

    for document in &documents {
        let metadata = ModelQuery::new(document).parse_model().map_err(|error| {
            CliError::InvalidArgument(format!(
                "{}: failed to parse model document: {error}",
                args.input.display()
            ))
        })?;

        if metadata.id().is_empty() {
            return Err(CliError::InvalidArgument(format!(
                "{}: model document has no '@id'",
                args.input.display()
            )));
        }
        let dtmi = Dtmi::new(metadata.id())?;

        if let Some(resolver) = &resolver {
            let references: Result<Vec<Dtmi>, _> = metadata
                .dependencies()
                .iter()
                .map(|reference| Dtmi::new(reference))
                .collect();
            let references = references?;

            if !references.is_empty() {
                resolver.resolve_references(&references).await?;
            }
        }

        println!("Validated '{dtmi}'");
    }

    Ok(())
}

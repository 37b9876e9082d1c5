//! Importing model definitions into a local repository tree
//!
//! Each model document is written to the conventional path derived from its
//! own `@id` (all-lowercase `dtmi/<segments...>/<name>-<version>.json`
//! under the repository root). Existing files are never overwritten.

use crate::dtmi::Dtmi;
use crate::error::ResolverError;
use crate::query::{self, ModelQuery};
use std::path::PathBuf;
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};

/// Error during import
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Model content has no usable '@id' field")]
    MissingId,

    #[error("Resolver error: {0}")]
    Resolver(#[from] ResolverError),

    #[error("Failed to write {0}: {1}")]
    Io(PathBuf, String),
}

/// Outcome of importing one model document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Written to the given repository path.
    Imported(PathBuf),
    /// A model file already exists at the target path; nothing was written.
    SkippedExisting(PathBuf),
}

/// Writes model definitions into a local repository tree.
pub struct ModelImporter {
    repository_root: PathBuf,
}

impl ModelImporter {
    pub fn new(repository_root: impl Into<PathBuf>) -> Self {
        Self {
            repository_root: repository_root.into(),
        }
    }

    /// Import every model document in `content`.
    ///
    /// The input may be a single model object or an array of models; each
    /// document must declare a grammar-valid `@id`. Returns one outcome per
    /// document, in input order.
    pub async fn import(&self, content: &str) -> Result<Vec<ImportOutcome>, ImportError> {
        let (documents, _) = query::extract_documents(content)?;

        let mut outcomes = Vec::with_capacity(documents.len());
        for document in &documents {
            outcomes.push(self.import_document(document).await?);
        }
        Ok(outcomes)
    }

    async fn import_document(&self, document: &str) -> Result<ImportOutcome, ImportError> {
        let metadata = ModelQuery::new(document).parse_model().map_err(|error| {
            ImportError::Resolver(ResolverError::InvalidModelContent {
                context: "import".to_owned(),
                message: error.to_string(),
            })
        })?;

        if metadata.id().is_empty() {
            return Err(ImportError::MissingId);
        }
        let dtmi = Dtmi::new(metadata.id()).map_err(ImportError::Resolver)?;

        let base_path = self.repository_root.to_string_lossy();
        let target = PathBuf::from(dtmi.to_qualified_path(&base_path, false));

        let exists = fs::try_exists(&target)
            .await
            .map_err(|error| ImportError::Io(target.clone(), error.to_string()))?;
        if exists {
            warn!(
                "Skipping '{}': model file already exists at {}",
                dtmi,
                target.display()
            );
            return Ok(ImportOutcome::SkippedExisting(target));
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|error| ImportError::Io(parent.to_path_buf(), error.to_string()))?;
        }
        fs::write(&target, document)
            .await
            .map_err(|error| ImportError::Io(target.clone(), error.to_string()))?;

        info!("Imported '{}' to {}", dtmi, target.display());
        Ok(ImportOutcome::Imported(target))
    }
}

//! Local directory repository backend

use super::{FetchedModel, RepositoryBackend};
use crate::dtmi::Dtmi;
use crate::error::ResolverError;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

/// Reads model artifacts from a repository directory tree on local disk.
#[derive(Debug, Clone)]
pub struct FileSystemRepositoryBackend {
    root: PathBuf,
}

impl FileSystemRepositoryBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The repository root directory.
    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

#[async_trait]
impl RepositoryBackend for FileSystemRepositoryBackend {
    async fn fetch(&self, dtmi: &Dtmi, expanded: bool) -> Result<FetchedModel, ResolverError> {
        // A missing root means a misconfigured repository, not a missing
        // model; fail before attempting any read.
        if !self.root.is_dir() {
            return Err(ResolverError::RepositoryNotFound(self.root.clone()));
        }

        let path = self.model_path(dtmi, expanded);
        debug!("Attempting to retrieve model content from '{}'", path);

        match fs::read_to_string(&path).await {
            Ok(definition) => Ok(FetchedModel {
                definition,
                path,
                from_expanded: expanded,
            }),
            Err(error) if error.kind() == ErrorKind::NotFound => {
                Err(ResolverError::ModelNotFound {
                    dtmi: dtmi.to_string(),
                    path,
                })
            }
            Err(error) => Err(ResolverError::Transport {
                path,
                message: error.to_string(),
            }),
        }
    }

    fn model_path(&self, dtmi: &Dtmi, expanded: bool) -> String {
        dtmi.to_qualified_path(&self.root.to_string_lossy(), expanded)
    }
}

//! Remote HTTP repository backend

use super::{FetchedModel, RepositoryBackend};
use crate::dtmi::Dtmi;
use crate::error::ResolverError;
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

/// Fetches model artifacts from a remote repository over HTTP(S).
///
/// Holds one shared `reqwest::Client`; the backend is safely reusable
/// across concurrent resolution calls since it carries no per-call state.
#[derive(Debug, Clone)]
pub struct HttpRepositoryBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRepositoryBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// The repository base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl RepositoryBackend for HttpRepositoryBackend {
    async fn fetch(&self, dtmi: &Dtmi, expanded: bool) -> Result<FetchedModel, ResolverError> {
        let path = self.model_path(dtmi, expanded);
        debug!("Attempting to retrieve model content from '{}'", path);

        let response = self
            .client
            .get(&path)
            .send()
            .await
            .map_err(|error| ResolverError::Transport {
                path: path.clone(),
                message: error.to_string(),
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ResolverError::ModelNotFound {
                dtmi: dtmi.to_string(),
                path,
            });
        }
        if !status.is_success() {
            return Err(ResolverError::Transport {
                path,
                message: format!("unexpected HTTP status {status}"),
            });
        }

        let definition = response
            .text()
            .await
            .map_err(|error| ResolverError::Transport {
                path: path.clone(),
                message: error.to_string(),
            })?;

        Ok(FetchedModel {
            definition,
            path,
            from_expanded: expanded,
        })
    }

    fn model_path(&self, dtmi: &Dtmi, expanded: bool) -> String {
        dtmi.to_qualified_path(&self.base_url, expanded)
    }
}

//! Repository content retrieval
//!
//! Backends map one DTMI to one raw model document, against either a local
//! directory tree or a remote HTTP endpoint. Backends hold no traversal
//! state and know nothing about dependency graphs; the resolution engine
//! owns fallback and traversal policy.

pub mod filesystem;
#[cfg(feature = "remote")]
pub mod http;

pub use filesystem::FileSystemRepositoryBackend;
#[cfg(feature = "remote")]
pub use http::HttpRepositoryBackend;

use crate::dtmi::Dtmi;
use crate::error::ResolverError;
use async_trait::async_trait;
use std::path::PathBuf;

/// Where a models repository lives. Chosen once per resolver and fixed for
/// its lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryLocation {
    /// Root directory of a local repository tree.
    FileSystem(PathBuf),
    /// Base URL of a remote repository endpoint.
    Remote(String),
}

impl RepositoryLocation {
    /// Classify a location string by scheme: `http://` and `https://` are
    /// remote, a `file://` prefix is stripped to a local path, and anything
    /// else is treated as a local path (absolute or relative).
    pub fn parse(location: &str) -> Result<Self, ResolverError> {
        let trimmed = location.trim();
        if trimmed.is_empty() {
            return Err(ResolverError::RepositoryNotFound(PathBuf::new()));
        }

        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Ok(Self::Remote(trimmed.to_owned()))
        } else if let Some(path) = trimmed.strip_prefix("file://") {
            Ok(Self::FileSystem(PathBuf::from(path)))
        } else {
            Ok(Self::FileSystem(PathBuf::from(trimmed)))
        }
    }
}

/// One successfully fetched model artifact.
#[derive(Debug, Clone)]
pub struct FetchedModel {
    /// Verbatim definition text as stored in the repository.
    pub definition: String,
    /// Path or URL the content was read from.
    pub path: String,
    /// Whether the artifact is a pre-expanded dependency bundle.
    pub from_expanded: bool,
}

/// Retrieval of raw model content for a single DTMI.
#[async_trait]
pub trait RepositoryBackend: Send + Sync {
    /// Fetch the artifact for `dtmi`. With `expanded` set, the pre-expanded
    /// bundle artifact is requested instead of the plain definition; a
    /// missing bundle surfaces as [`ResolverError::ModelNotFound`] and the
    /// caller decides whether to fall back. Exactly one artifact is
    /// attempted per call.
    async fn fetch(&self, dtmi: &Dtmi, expanded: bool) -> Result<FetchedModel, ResolverError>;

    /// Fully qualified path of the artifact for `dtmi`.
    fn model_path(&self, dtmi: &Dtmi, expanded: bool) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_classifies_by_scheme() {
        assert_eq!(
            RepositoryLocation::parse("https://devicemodels.azure.com").unwrap(),
            RepositoryLocation::Remote("https://devicemodels.azure.com".to_owned())
        );
        assert_eq!(
            RepositoryLocation::parse("file:///var/models").unwrap(),
            RepositoryLocation::FileSystem(PathBuf::from("/var/models"))
        );
        assert_eq!(
            RepositoryLocation::parse("./local-repo").unwrap(),
            RepositoryLocation::FileSystem(PathBuf::from("./local-repo"))
        );
    }

    #[test]
    fn test_parse_rejects_empty_location() {
        assert!(RepositoryLocation::parse("   ").is_err());
    }
}

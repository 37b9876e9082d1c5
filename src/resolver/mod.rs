//! Dependency resolution over a models repository
//!
//! [`ModelResolver`] is the public entry point: given one or more DTMIs it
//! returns the full model definitions plus the transitive closure of their
//! dependencies, as a map from DTMI to verbatim definition text.
//!
//! The repository location (local directory or remote HTTP endpoint) is
//! bound at construction and selects the backend; the dependency-resolution
//! mode controls whether references are followed and whether pre-expanded
//! bundle artifacts are preferred.

mod engine;

use crate::dtmi::Dtmi;
use crate::error::ResolverError;
use crate::repository::{
    FileSystemRepositoryBackend, RepositoryBackend, RepositoryLocation,
};
#[cfg(feature = "remote")]
use crate::repository::HttpRepositoryBackend;
use engine::ResolutionEngine;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Well-known public models repository endpoint.
pub const DEFAULT_REPOSITORY: &str = "https://devicemodels.azure.com";

/// Result of one resolution call: DTMI to verbatim definition text.
///
/// Contains exactly the transitive closure reachable from the requested
/// roots; keys are unique and unordered.
pub type ResolutionResult = HashMap<Dtmi, String>;

/// How discovered dependencies are handled during resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DependencyResolution {
    /// Fetch only the requested models; do not follow references.
    Disabled,
    /// Follow `extends` and component schema references transitively.
    #[default]
    Enabled,
    /// Prefer pre-expanded bundle artifacts; fall back to full per-model
    /// traversal for any model whose bundle is absent.
    TryFromExpanded,
}

/// Resolves DTMIs into model definitions plus their transitive dependencies.
pub struct ModelResolver {
    backend: Box<dyn RepositoryBackend>,
    location: RepositoryLocation,
    resolution: DependencyResolution,
}

impl ModelResolver {
    /// Create a resolver over `location` with dependency resolution enabled.
    pub fn new(location: &str) -> Result<Self, ResolverError> {
        Self::with_resolution(location, DependencyResolution::default())
    }

    /// Create a resolver over `location` with an explicit resolution mode.
    ///
    /// The location string is classified by scheme and the matching backend
    /// is constructed once, for the resolver's lifetime.
    pub fn with_resolution(
        location: &str,
        resolution: DependencyResolution,
    ) -> Result<Self, ResolverError> {
        let location = RepositoryLocation::parse(location)?;
        let backend: Box<dyn RepositoryBackend> = match &location {
            RepositoryLocation::FileSystem(root) => {
                debug!("Resolver initialized with filesystem backend");
                Box::new(FileSystemRepositoryBackend::new(root.clone()))
            }
            #[cfg(feature = "remote")]
            RepositoryLocation::Remote(base_url) => {
                debug!("Resolver initialized with HTTP backend");
                Box::new(HttpRepositoryBackend::new(base_url.clone()))
            }
            #[cfg(not(feature = "remote"))]
            RepositoryLocation::Remote(base_url) => {
                return Err(ResolverError::Transport {
                    path: base_url.clone(),
                    message: "remote repositories require the 'remote' feature".to_owned(),
                });
            }
        };

        Ok(Self {
            backend,
            location,
            resolution,
        })
    }

    /// Create a resolver over a caller-supplied backend.
    pub fn from_backend(
        backend: Box<dyn RepositoryBackend>,
        location: RepositoryLocation,
        resolution: DependencyResolution,
    ) -> Self {
        Self {
            backend,
            location,
            resolution,
        }
    }

    /// Resolve one DTMI and its transitive dependencies.
    pub async fn resolve(&self, dtmi: &str) -> Result<ResolutionResult, ResolverError> {
        self.resolve_many(&[dtmi]).await
    }

    /// Resolve several DTMIs into one combined closure. Duplicate roots are
    /// deduplicated before any fetching, so `[a, a]` behaves like `[a]`.
    pub async fn resolve_many<S: AsRef<str>>(
        &self,
        dtmis: &[S],
    ) -> Result<ResolutionResult, ResolverError> {
        self.resolve_internal(dtmis, None).await
    }

    /// Like [`resolve_many`](Self::resolve_many), but checks `cancel` at
    /// the top of every traversal step. A cancelled call returns
    /// [`ResolverError::Cancelled`]; no partial closure is returned.
    pub async fn resolve_with_cancellation<S: AsRef<str>>(
        &self,
        dtmis: &[S],
        cancel: &CancellationToken,
    ) -> Result<ResolutionResult, ResolverError> {
        self.resolve_internal(dtmis, Some(cancel)).await
    }

    async fn resolve_internal<S: AsRef<str>>(
        &self,
        dtmis: &[S],
        cancel: Option<&CancellationToken>,
    ) -> Result<ResolutionResult, ResolverError> {
        // Validate every root before any disk or network access.
        let mut roots: Vec<Dtmi> = Vec::with_capacity(dtmis.len());
        for raw in dtmis {
            let dtmi = Dtmi::new(raw.as_ref())?;
            if !roots.contains(&dtmi) {
                roots.push(dtmi);
            }
        }

        let engine = ResolutionEngine::new(self.backend.as_ref(), self.resolution);
        let resolved = engine.process(roots, cancel).await?;

        info!("Resolved {} model definition(s)", resolved.len());
        Ok(resolved)
    }

    /// Definition texts for `dtmis`, in the same relative order.
    ///
    /// Shaped for use as the external-reference resolution callback of a
    /// DTDL semantic parser: the parser hands over unresolved identifiers
    /// and receives their raw definitions back.
    pub async fn resolve_references(
        &self,
        dtmis: &[Dtmi],
    ) -> Result<Vec<String>, ResolverError> {
        let requested: Vec<&str> = dtmis.iter().map(Dtmi::as_str).collect();
        let resolved = self.resolve_many(&requested).await?;

        dtmis
            .iter()
            .map(|dtmi| {
                resolved
                    .get(dtmi)
                    .cloned()
                    .ok_or_else(|| ResolverError::ModelNotFound {
                        dtmi: dtmi.to_string(),
                        path: self.backend.model_path(dtmi, false),
                    })
            })
            .collect()
    }

    /// The root definition followed by its transitive dependencies, ordered
    /// by DTMI — the layout of a pre-expanded bundle artifact.
    pub async fn expand(&self, dtmi: &str) -> Result<Vec<String>, ResolverError> {
        let root = Dtmi::new(dtmi)?;
        let mut resolved = self.resolve(dtmi).await?;

        let root_definition =
            resolved
                .remove(&root)
                .ok_or_else(|| ResolverError::ModelNotFound {
                    dtmi: root.to_string(),
                    path: self.backend.model_path(&root, false),
                })?;

        let mut dependencies: Vec<(Dtmi, String)> = resolved.into_iter().collect();
        dependencies.sort_by(|(a, _), (b, _)| a.cmp(b));

        let mut expanded = Vec::with_capacity(dependencies.len() + 1);
        expanded.push(root_definition);
        expanded.extend(dependencies.into_iter().map(|(_, definition)| definition));
        Ok(expanded)
    }

    /// Fully qualified artifact path for `dtmi` under this resolver's
    /// repository location.
    pub fn model_path(&self, dtmi: &str, expanded: bool) -> Result<String, ResolverError> {
        Ok(self.backend.model_path(&Dtmi::new(dtmi)?, expanded))
    }

    /// The repository location this resolver was constructed over.
    pub fn location(&self) -> &RepositoryLocation {
        &self.location
    }

    /// The configured dependency-resolution mode.
    pub fn dependency_resolution(&self) -> DependencyResolution {
        self.resolution
    }
}

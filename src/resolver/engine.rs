//! Breadth-first traversal building the dependency closure

use super::{DependencyResolution, ResolutionResult};
use crate::dtmi::Dtmi;
use crate::error::ResolverError;
use crate::query::ModelQuery;
use crate::repository::{FetchedModel, RepositoryBackend};
use std::collections::{HashMap, VecDeque};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// One resolution call's traversal. All state (`processed` accumulator and
/// FIFO worklist) is local to [`process`](Self::process), so concurrent
/// calls over the same backend never share mutable state.
pub(super) struct ResolutionEngine<'a> {
    backend: &'a dyn RepositoryBackend,
    resolution: DependencyResolution,
}

impl<'a> ResolutionEngine<'a> {
    pub(super) fn new(
        backend: &'a dyn RepositoryBackend,
        resolution: DependencyResolution,
    ) -> Self {
        Self {
            backend,
            resolution,
        }
    }

    /// Drain the worklist, fetching each identifier at most once.
    ///
    /// Membership in `processed` is checked before any fetch, which bounds
    /// the work to the finite set of reachable identifiers and guarantees
    /// termination on cyclic or diamond-shaped dependency graphs.
    pub(super) async fn process(
        &self,
        roots: Vec<Dtmi>,
        cancel: Option<&CancellationToken>,
    ) -> Result<ResolutionResult, ResolverError> {
        let mut processed: ResolutionResult = HashMap::new();
        let mut worklist: VecDeque<Dtmi> = roots.into();

        while let Some(target) = worklist.pop_front() {
            if let Some(token) = cancel {
                if token.is_cancelled() {
                    return Err(ResolverError::Cancelled(target.to_string()));
                }
            }

            if processed.contains_key(&target) {
                trace!("Already processed '{}', skipping", target);
                continue;
            }
            debug!("Processing '{}'", target);

            let fetched = self.fetch(&target).await?;

            if fetched.from_expanded {
                // The bundle is authoritative for its own closure: merge
                // every entry and do not enqueue its dependencies.
                self.merge_expanded(&target, &fetched, &mut processed)?;
                continue;
            }

            let metadata = ModelQuery::new(&fetched.definition)
                .parse_model()
                .map_err(|error| ResolverError::InvalidModelContent {
                    context: target.to_string(),
                    message: error.to_string(),
                })?;

            if metadata.id() != target.as_str() {
                return Err(ResolverError::IncorrectDtmiCasing {
                    requested: target.to_string(),
                    parsed: metadata.id().to_owned(),
                });
            }

            if self.resolution != DependencyResolution::Disabled {
                let dependencies = metadata.dependencies();
                if !dependencies.is_empty() {
                    debug!(
                        "Discovered dependencies of '{}': {}",
                        target,
                        dependencies.join(", ")
                    );
                }
                for reference in dependencies {
                    worklist.push_back(Dtmi::new(&reference)?);
                }
            }

            processed.insert(target, fetched.definition);
        }

        Ok(processed)
    }

    /// Fetch one artifact, preferring the expanded bundle when configured.
    ///
    /// A missing bundle falls back to the plain definition for this one
    /// identifier; every other failure propagates unchanged.
    async fn fetch(&self, target: &Dtmi) -> Result<FetchedModel, ResolverError> {
        if self.resolution == DependencyResolution::TryFromExpanded {
            match self.backend.fetch(target, true).await {
                Ok(fetched) => return Ok(fetched),
                Err(ResolverError::ModelNotFound { .. }) => {
                    warn!(
                        "No expanded bundle for '{}', falling back to per-model traversal",
                        target
                    );
                }
                Err(error) => return Err(error),
            }
        }

        self.backend.fetch(target, false).await
    }

    fn merge_expanded(
        &self,
        target: &Dtmi,
        fetched: &FetchedModel,
        processed: &mut ResolutionResult,
    ) -> Result<(), ResolverError> {
        let bundle = ModelQuery::new(&fetched.definition)
            .list_to_map()
            .map_err(|error| ResolverError::InvalidModelContent {
                context: target.to_string(),
                message: error.to_string(),
            })?;

        for (id, definition) in bundle {
            let dtmi = Dtmi::new(&id)?;
            processed.entry(dtmi).or_insert(definition);
        }
        Ok(())
    }
}

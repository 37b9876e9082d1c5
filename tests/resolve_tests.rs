//! Resolution engine integration tests against the fixture repository

use async_trait::async_trait;
use models_repository_sdk::dtmi::Dtmi;
use models_repository_sdk::error::ResolverError;
use models_repository_sdk::repository::{
    FetchedModel, FileSystemRepositoryBackend, RepositoryBackend, RepositoryLocation,
};
use models_repository_sdk::resolver::{DependencyResolution, ModelResolver};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;

const TEMP_CONTROLLER: &str = "dtmi:com:example:TemperatureController;1";
const THERMOSTAT: &str = "dtmi:com:example:Thermostat;1";
const DEVICE_INFO: &str = "dtmi:azure:DeviceManagement:DeviceInformation;1";
const CONFERENCE_ROOM: &str = "dtmi:com:example:ConferenceRoom;1";
const ROOM: &str = "dtmi:com:example:Room;1";

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/TestModelRepo")
}

fn repo_location() -> String {
    repo_root().to_string_lossy().into_owned()
}

fn resolver(resolution: DependencyResolution) -> ModelResolver {
    ModelResolver::with_resolution(&repo_location(), resolution)
        .expect("fixture repository resolver")
}

/// Counts backend fetch calls so tests can observe how many artifacts a
/// traversal actually requested.
struct CountingBackend {
    inner: FileSystemRepositoryBackend,
    fetches: Arc<AtomicUsize>,
}

impl CountingBackend {
    fn create(resolution: DependencyResolution) -> (ModelResolver, Arc<AtomicUsize>) {
        let fetches = Arc::new(AtomicUsize::new(0));
        let backend = CountingBackend {
            inner: FileSystemRepositoryBackend::new(repo_root()),
            fetches: Arc::clone(&fetches),
        };
        let resolver = ModelResolver::from_backend(
            Box::new(backend),
            RepositoryLocation::FileSystem(repo_root()),
            resolution,
        );
        (resolver, fetches)
    }
}

#[async_trait]
impl RepositoryBackend for CountingBackend {
    async fn fetch(&self, dtmi: &Dtmi, expanded: bool) -> Result<FetchedModel, ResolverError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(dtmi, expanded).await
    }

    fn model_path(&self, dtmi: &Dtmi, expanded: bool) -> String {
        self.inner.model_path(dtmi, expanded)
    }
}

fn contains(resolved: &models_repository_sdk::ResolutionResult, dtmi: &str) -> bool {
    resolved.contains_key(&Dtmi::new(dtmi).unwrap())
}

mod traversal_tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_builds_transitive_closure() {
        let resolved = resolver(DependencyResolution::Enabled)
            .resolve(TEMP_CONTROLLER)
            .await
            .unwrap();

        assert_eq!(resolved.len(), 3);
        assert!(contains(&resolved, TEMP_CONTROLLER));
        assert!(contains(&resolved, THERMOSTAT));
        assert!(contains(&resolved, DEVICE_INFO));
    }

    #[tokio::test]
    async fn test_resolved_content_is_verbatim() {
        let resolved = resolver(DependencyResolution::Enabled)
            .resolve(TEMP_CONTROLLER)
            .await
            .unwrap();

        let on_disk = std::fs::read_to_string(
            repo_root().join("dtmi/com/example/temperaturecontroller-1.json"),
        )
        .unwrap();
        assert_eq!(resolved[&Dtmi::new(TEMP_CONTROLLER).unwrap()], on_disk);
    }

    #[tokio::test]
    async fn test_duplicate_roots_resolve_once() {
        let resolved = resolver(DependencyResolution::Enabled)
            .resolve_many(&[DEVICE_INFO, DEVICE_INFO])
            .await
            .unwrap();

        assert_eq!(resolved.len(), 1);
        assert!(contains(&resolved, DEVICE_INFO));
    }

    #[tokio::test]
    async fn test_disabled_mode_fetches_roots_only() {
        let resolved = resolver(DependencyResolution::Disabled)
            .resolve(TEMP_CONTROLLER)
            .await
            .unwrap();

        assert_eq!(resolved.len(), 1);
        assert!(contains(&resolved, TEMP_CONTROLLER));
    }

    #[tokio::test]
    async fn test_multiple_roots_share_one_closure() {
        let resolved = resolver(DependencyResolution::Enabled)
            .resolve_many(&[TEMP_CONTROLLER, CONFERENCE_ROOM])
            .await
            .unwrap();

        assert_eq!(resolved.len(), 5);
        assert!(contains(&resolved, CONFERENCE_ROOM));
        assert!(contains(&resolved, ROOM));
    }

    #[tokio::test]
    async fn test_inline_interface_yields_reference_but_no_extra_key() {
        let resolved = resolver(DependencyResolution::Enabled)
            .resolve(CONFERENCE_ROOM)
            .await
            .unwrap();

        // The inline base interface has no independent identifier; only the
        // reference it carries becomes part of the closure.
        assert_eq!(resolved.len(), 2);
        assert!(contains(&resolved, CONFERENCE_ROOM));
        assert!(contains(&resolved, ROOM));
    }

    #[tokio::test]
    async fn test_resolution_is_deterministic() {
        let resolver = resolver(DependencyResolution::Enabled);
        let first = resolver.resolve(TEMP_CONTROLLER).await.unwrap();
        let second = resolver.resolve(TEMP_CONTROLLER).await.unwrap();
        assert_eq!(first, second);
    }
}

mod invariant_tests {
    use super::*;

    #[tokio::test]
    async fn test_wrong_casing_is_a_hard_error() {
        // Path lookup is case-insensitive (canonical-lowercase layout), so
        // the file is found; the declared @id exposes the mismatch.
        let error = resolver(DependencyResolution::Enabled)
            .resolve("dtmi:com:example:thermostat;1")
            .await
            .unwrap_err();

        match error {
            ResolverError::IncorrectDtmiCasing { requested, parsed } => {
                assert_eq!(requested, "dtmi:com:example:thermostat;1");
                assert_eq!(parsed, THERMOSTAT);
            }
            other => panic!("expected casing error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_dtmi_rejected_before_any_io() {
        // A resolver over a nonexistent root would fail with
        // RepositoryNotFound if it ever attempted a fetch.
        let resolver =
            ModelResolver::new("/nonexistent/models-repo").expect("location parses");
        let error = resolver
            .resolve("dtmi:com:example:Thermostat")
            .await
            .unwrap_err();
        assert!(matches!(error, ResolverError::InvalidDtmiFormat(_)));
    }

    #[tokio::test]
    async fn test_missing_repository_root_fails_fast() {
        let resolver =
            ModelResolver::new("/nonexistent/models-repo").expect("location parses");
        let error = resolver.resolve(THERMOSTAT).await.unwrap_err();
        assert!(matches!(error, ResolverError::RepositoryNotFound(_)));
    }

    #[tokio::test]
    async fn test_unknown_model_fails_resolution() {
        let error = resolver(DependencyResolution::Enabled)
            .resolve("dtmi:com:example:Missing;1")
            .await
            .unwrap_err();

        match error {
            ResolverError::ModelNotFound { dtmi, .. } => {
                assert_eq!(dtmi, "dtmi:com:example:Missing;1");
            }
            other => panic!("expected not-found error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cancellation_aborts_resolution() {
        let token = CancellationToken::new();
        token.cancel();

        let error = resolver(DependencyResolution::Enabled)
            .resolve_with_cancellation(&[TEMP_CONTROLLER], &token)
            .await
            .unwrap_err();
        assert!(matches!(error, ResolverError::Cancelled(_)));
    }
}

mod expanded_tests {
    use super::*;

    #[tokio::test]
    async fn test_expanded_bundle_short_circuits_traversal() {
        let (resolver, fetches) = CountingBackend::create(DependencyResolution::TryFromExpanded);
        let resolved = resolver.resolve(TEMP_CONTROLLER).await.unwrap();

        assert_eq!(resolved.len(), 3);
        assert!(contains(&resolved, TEMP_CONTROLLER));
        assert!(contains(&resolved, THERMOSTAT));
        assert!(contains(&resolved, DEVICE_INFO));
        // One bundle fetch covered the entire closure.
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expanded_bundle_matches_full_traversal() {
        let from_bundle = resolver(DependencyResolution::TryFromExpanded)
            .resolve(TEMP_CONTROLLER)
            .await
            .unwrap();
        let from_traversal = resolver(DependencyResolution::Enabled)
            .resolve(TEMP_CONTROLLER)
            .await
            .unwrap();

        let bundle_keys: std::collections::BTreeSet<_> = from_bundle.keys().collect();
        let traversal_keys: std::collections::BTreeSet<_> = from_traversal.keys().collect();
        assert_eq!(bundle_keys, traversal_keys);

        for (dtmi, definition) in &from_bundle {
            let bundled: serde_json::Value = serde_json::from_str(definition).unwrap();
            let fetched: serde_json::Value =
                serde_json::from_str(&from_traversal[dtmi]).unwrap();
            assert_eq!(bundled, fetched, "definition mismatch for {dtmi}");
        }
    }

    #[tokio::test]
    async fn test_missing_bundle_falls_back_per_model() {
        // No .expanded.json exists for the thermostat chain; every node is
        // tried expanded first, then fetched plain.
        let (resolver, fetches) = CountingBackend::create(DependencyResolution::TryFromExpanded);
        let resolved = resolver.resolve(THERMOSTAT).await.unwrap();

        assert_eq!(resolved.len(), 2);
        assert!(contains(&resolved, THERMOSTAT));
        assert!(contains(&resolved, DEVICE_INFO));
        assert_eq!(fetches.load(Ordering::SeqCst), 4);
    }
}

mod facade_tests {
    use super::*;

    #[tokio::test]
    async fn test_reference_texts_keep_request_order() {
        let requested = vec![
            Dtmi::new(THERMOSTAT).unwrap(),
            Dtmi::new(DEVICE_INFO).unwrap(),
        ];
        let definitions = resolver(DependencyResolution::Enabled)
            .resolve_references(&requested)
            .await
            .unwrap();

        assert_eq!(definitions.len(), 2);
        assert!(definitions[0].contains(THERMOSTAT));
        assert!(definitions[1].contains(DEVICE_INFO));
    }

    #[tokio::test]
    async fn test_expand_puts_root_first() {
        let expanded = resolver(DependencyResolution::Enabled)
            .expand(TEMP_CONTROLLER)
            .await
            .unwrap();

        assert_eq!(expanded.len(), 3);
        assert!(expanded[0].contains(TEMP_CONTROLLER));
    }

    #[tokio::test]
    async fn test_model_path_reflects_repository_location() {
        let resolver = resolver(DependencyResolution::Enabled);
        let path = resolver.model_path(THERMOSTAT, false).unwrap();
        assert!(path.ends_with("dtmi/com/example/thermostat-1.json"));

        let expanded = resolver.model_path(THERMOSTAT, true).unwrap();
        assert!(expanded.ends_with("dtmi/com/example/thermostat-1.expanded.json"));
    }

    #[tokio::test]
    async fn test_location_classification() {
        let local = ModelResolver::new(&repo_location()).unwrap();
        assert!(matches!(
            local.location(),
            RepositoryLocation::FileSystem(_)
        ));

        let remote = ModelResolver::new("https://devicemodels.azure.com").unwrap();
        assert!(matches!(remote.location(), RepositoryLocation::Remote(_)));
    }
}

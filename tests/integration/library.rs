use pants_launcher::artifact::ArtifactLocator;
use pants_launcher::constants::{PANTS_LEGACY_INDEX_URL, PANTS_RAW_CONTENT_URL, PANTS_TAG_MAPPING_URL, PANTS_VERSION_FILE};
use pants_launcher::fetch::Fetcher;
use pants_launcher::resolver::{VersionResolver, VersionSpec};
use pants_launcher::test_utils::{FetchKind, StubFetcher, init_test_logging};
use pants_launcher::utils::PlatformTag;
use std::sync::Arc;

const COMMIT: &str = "b4c218ba0820e4673f8d9ad72b80e0285f4d5604";

fn resolver(stub: &Arc<StubFetcher>) -> VersionResolver {
    let fetcher: Arc<dyn Fetcher> = stub.clone();
    VersionResolver::new(fetcher.clone(), ArtifactLocator::new(fetcher))
}

#[tokio::test]
async fn test_shipped_tag_resolves_through_embedded_index() {
    init_test_logging(None);
    let version_url = format!("{PANTS_RAW_CONTENT_URL}/{COMMIT}/{PANTS_VERSION_FILE}");
    let index_url = format!("{PANTS_LEGACY_INDEX_URL}/{COMMIT}/2.25.0.dev1%2Bgitb4c218ba/index.html");
    let stub = Arc::new(StubFetcher::new().with_text(version_url.clone(), "2.25.0.dev1\n").with_probe(index_url.clone()));

    let info = resolver(&stub)
        .resolve(&VersionSpec::SourceRef("release_2.25.0.dev1".to_string()), &PlatformTag::new("linux", "x86_64"))
        .await
        .unwrap();

    assert_eq!(info.runtime_id, "cpython311");
    assert_eq!(info.selected_version().to_string(), "2.25.0.dev1+gitb4c218ba");
    assert_eq!(info.legacy_index_url.as_deref(), Some(index_url.as_str()));
    assert!(!stub.was_called_with_prefix(PANTS_TAG_MAPPING_URL));
    assert_eq!(stub.urls_of(FetchKind::Text), vec![version_url]);
}

#[tokio::test]
async fn test_unreachable_artifacts_fail_resolution() {
    init_test_logging(None);
    let stub = Arc::new(StubFetcher::new());

    let result = resolver(&stub)
        .resolve(&VersionSpec::Explicit("2.18.0".to_string()), &PlatformTag::new("darwin", "arm64"))
        .await;

    assert!(result.is_err());
    let checked = stub.urls_of(FetchKind::Probe);
    assert!(!checked.is_empty());
    assert!(checked.iter().all(|url| url.ends_with("-darwin_arm64.pex")));
}

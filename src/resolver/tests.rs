use super::*;
use crate::constants::PANTS_RELEASE_DOWNLOAD_URL;
use crate::test_utils::{FetchCall, FetchKind, StubFetcher, init_test_logging};
use serde_json::json;

const COMMIT: &str = "558d843549204bbe49c351d00cdf23402da262c1";
const TAG_OBJECT: &str = "0f1e2d3c4b5a69788796a5b4c3d2e1f00f1e2d3c";

fn v(s: &str) -> PantsVersion {
    s.parse().unwrap()
}

fn linux() -> PlatformTag {
    PlatformTag::new("linux", "x86_64")
}

fn resolver(stub: &Arc<StubFetcher>) -> VersionResolver {
    let fetcher: Arc<dyn Fetcher> = stub.clone();
    VersionResolver::new(fetcher.clone(), ArtifactLocator::new(fetcher))
        .with_tag_index(ReleaseTagIndex::default())
}

fn pex_url(version: &str, runtime: &str) -> String {
    format!(
        "{PANTS_RELEASE_DOWNLOAD_URL}/release_{version}/pants.{version}-{runtime}-linux_x86_64.pex"
    )
}

fn legacy_url(commit: &str, sha_version: &str) -> String {
    format!("{PANTS_LEGACY_INDEX_URL}/{commit}/{}/index.html", sha_version.replace('+', "%2B"))
}

fn mapping_url(tag: &str) -> String {
    format!("{PANTS_TAG_MAPPING_URL}/{tag}")
}

fn api_ref_url(tag: &str) -> String {
    format!("{PANTS_API_BASE_URL}/git/refs/tags/{tag}")
}

#[tokio::test]
async fn test_two_component_versions_fail_before_any_fetch() {
    init_test_logging(None);
    let stub = Arc::new(StubFetcher::new());
    let resolver = resolver(&stub);

    for version in ["2.18", "1.30", "2.19rc1", "3"] {
        let err = resolver.resolve_explicit(version, &linux()).await.unwrap_err();
        assert!(
            matches!(err, LauncherError::VersionPrecision { .. }),
            "{version} gave {err:?}"
        );
    }
    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn test_malformed_version_fails_before_any_fetch() {
    init_test_logging(None);
    let stub = Arc::new(StubFetcher::new());
    let err = resolver(&stub).resolve_explicit("two.eighteen", &linux()).await.unwrap_err();
    assert!(matches!(err, LauncherError::InvalidVersion { .. }));
    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn test_artifact_versions_never_consult_commit_tiers() {
    init_test_logging(None);
    let stub = Arc::new(
        StubFetcher::new()
            .with_probe(pex_url("2.18.0", "cp39"))
            .with_text(mapping_url("release_2.18.0"), COMMIT),
    );

    let info = resolver(&stub).resolve_explicit("2.18.0", &linux()).await.unwrap();
    assert_eq!(info.artifact_url.as_deref(), Some(pex_url("2.18.0", "cp39").as_str()));
    assert_eq!(info.runtime_id, "cpython39");
    assert!(!info.is_legacy());
    assert!(!stub.was_called_with_prefix(PANTS_TAG_MAPPING_URL));
    assert!(!stub.was_called_with_prefix(PANTS_API_BASE_URL));
    assert_eq!(stub.urls_of(FetchKind::Probe), vec![pex_url("2.18.0", "cp39")]);
}

#[tokio::test]
async fn test_threshold_pre_release_uses_artifacts() {
    init_test_logging(None);
    let stub = Arc::new(StubFetcher::new().with_probe(pex_url("2.0.0.dev0", "cp38")));
    let info = resolver(&stub).resolve_explicit("2.0.0.dev0", &linux()).await.unwrap();
    assert_eq!(info.runtime_id, "cpython38");
    assert!(!stub.was_called_with_prefix(PANTS_TAG_MAPPING_URL));
}

#[tokio::test]
async fn test_indexed_tag_resolves_without_network() {
    init_test_logging(None);
    let stub = Arc::new(StubFetcher::new());
    let index = ReleaseTagIndex::from_pairs([("release_1.30.5", COMMIT)]).unwrap();
    let resolver = resolver(&stub).with_tag_index(index);

    assert_eq!(resolver.resolve_commit("release_1.30.5").await.unwrap(), COMMIT);
    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn test_embedded_index_answers_shipped_tags() {
    init_test_logging(None);
    let stub = Arc::new(StubFetcher::new());
    let fetcher: Arc<dyn Fetcher> = stub.clone();
    let resolver = VersionResolver::new(fetcher.clone(), ArtifactLocator::new(fetcher));

    let commit = resolver.resolve_commit("release_2.25.0.dev1").await.unwrap();
    assert_eq!(commit, "b4c218ba0820e4673f8d9ad72b80e0285f4d5604");
    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn test_mapping_endpoint_short_circuits_api() {
    init_test_logging(None);
    let stub = Arc::new(
        StubFetcher::new()
            .with_text(mapping_url("release_1.30.5"), format!("{COMMIT}\n"))
            .with_json(api_ref_url("release_1.30.5"), json!({"object": {"sha": TAG_OBJECT, "type": "commit"}})),
    );

    let commit = resolver(&stub).resolve_commit("release_1.30.5").await.unwrap();
    assert_eq!(commit, COMMIT);
    assert_eq!(stub.urls(), vec![mapping_url("release_1.30.5")]);
}

#[tokio::test]
async fn test_api_tier_for_lightweight_tag() {
    init_test_logging(None);
    let stub = Arc::new(
        StubFetcher::new()
            .with_failure(mapping_url("release_1.29.0"))
            .with_json(api_ref_url("release_1.29.0"), json!({"object": {"sha": COMMIT, "type": "commit"}})),
    );

    let commit = resolver(&stub).resolve_commit("release_1.29.0").await.unwrap();
    assert_eq!(commit, COMMIT);
    assert_eq!(stub.urls(), vec![mapping_url("release_1.29.0"), api_ref_url("release_1.29.0")]);
}

#[tokio::test]
async fn test_api_tier_dereferences_annotated_tag() {
    init_test_logging(None);
    let tag_url = format!("{PANTS_API_BASE_URL}/git/tags/{TAG_OBJECT}");
    let stub = Arc::new(
        StubFetcher::new()
            .with_json(api_ref_url("release_1.28.0"), json!({"object": {"sha": TAG_OBJECT, "type": "tag"}}))
            .with_json(tag_url.clone(), json!({"object": {"sha": COMMIT, "type": "commit"}})),
    );

    let resolver = resolver(&stub).with_github_token(Some("gh-token".to_string()));
    let commit = resolver.resolve_commit("release_1.28.0").await.unwrap();
    assert_eq!(commit, COMMIT);

    let api_calls: Vec<FetchCall> =
        stub.calls().into_iter().filter(|call| call.kind == FetchKind::Json).collect();
    assert_eq!(api_calls.len(), 2);
    assert_eq!(api_calls[1].url, tag_url);
    assert!(api_calls.iter().all(|call| call.headers.get("Authorization") == Some("Bearer gh-token")));
}

#[tokio::test]
async fn test_mapping_garbage_falls_through() {
    init_test_logging(None);
    let stub = Arc::new(
        StubFetcher::new()
            .with_text(mapping_url("release_1.27.0"), "<html>Not Found</html>")
            .with_json(api_ref_url("release_1.27.0"), json!({"object": {"sha": COMMIT, "type": "commit"}})),
    );
    assert_eq!(resolver(&stub).resolve_commit("release_1.27.0").await.unwrap(), COMMIT);
}

#[tokio::test]
async fn test_all_tiers_exhausted() {
    init_test_logging(None);
    let stub = Arc::new(StubFetcher::new());
    let err = resolver(&stub).resolve_commit("release_0.0.1").await.unwrap_err();
    match err {
        LauncherError::CommitNotFound {
            reference,
            attempts,
        } => {
            assert_eq!(reference, "release_0.0.1");
            assert_eq!(attempts.len(), 3);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_explicit_legacy_version() {
    init_test_logging(None);
    let sha_version = "1.30.5+git558d8435";
    let stub = Arc::new(StubFetcher::new().with_probe(legacy_url(COMMIT, sha_version)));
    let index = ReleaseTagIndex::from_pairs([("release_1.30.5", COMMIT)]).unwrap();

    let info = resolver(&stub).with_tag_index(index).resolve_explicit("1.30.5", &linux()).await.unwrap();
    assert_eq!(info.version, v("1.30.5"));
    assert_eq!(info.sha_version, None);
    assert_eq!(info.runtime_id, "cpython38");
    assert_eq!(info.legacy_index_url.as_deref(), Some(legacy_url(COMMIT, sha_version).as_str()));
    assert_eq!(info.artifact_url, None);
    assert_eq!(info.find_links_option(info.selected_version()), format!(
        "--python-repos-repos=-['{}']",
        legacy_url(COMMIT, sha_version)
    ));
}

#[tokio::test]
async fn test_legacy_index_must_be_reachable() {
    init_test_logging(None);
    let stub = Arc::new(StubFetcher::new());
    let index = ReleaseTagIndex::from_pairs([("release_1.30.5", COMMIT)]).unwrap();
    let err = resolver(&stub).with_tag_index(index).resolve_explicit("1.30.5", &linux()).await.unwrap_err();
    assert!(matches!(err, LauncherError::ArtifactNotFound { .. }));
}

#[tokio::test]
async fn test_source_ref_commit() {
    init_test_logging(None);
    let version_url = format!("{PANTS_RAW_CONTENT_URL}/{COMMIT}/{PANTS_VERSION_FILE}");
    let sha_version = "2.17.0.dev3+git558d8435";
    let stub = Arc::new(
        StubFetcher::new()
            .with_text(version_url.clone(), "2.17.0.dev3\n")
            .with_probe(legacy_url(COMMIT, sha_version)),
    );

    let info = resolver(&stub).resolve_source_ref(COMMIT, &linux()).await.unwrap();
    assert_eq!(info.version, v("2.17.0.dev3"));
    assert_eq!(info.sha_version.as_ref().map(ToString::to_string).as_deref(), Some(sha_version));
    assert_eq!(info.runtime_id, "cpython39");
    assert!(!stub.was_called_with_prefix(PANTS_TAG_MAPPING_URL));
    assert_eq!(stub.urls()[0], version_url);

    let mut env = Vec::new();
    info.write_env(&mut env).unwrap();
    let env = String::from_utf8(env).unwrap();
    let url = legacy_url(COMMIT, sha_version);
    assert_eq!(
        env,
        format!(
            "FIND_LINKS={url}\nPANTS_SHA_FIND_LINKS=--python-repos-find-links=+['{url}']\n\
             PANTS_VERSION={sha_version}\nPYTHON=cpython39\n"
        )
    );
}

#[tokio::test]
async fn test_source_ref_tag_goes_through_tiers() {
    init_test_logging(None);
    let version_url = format!("{PANTS_RAW_CONTENT_URL}/{COMMIT}/{PANTS_VERSION_FILE}");
    let stub = Arc::new(
        StubFetcher::new()
            .with_text(mapping_url("release_2.1.0"), COMMIT)
            .with_text(version_url, "2.1.0")
            .with_probe(legacy_url(COMMIT, "2.1.0+git558d8435")),
    );

    let info = resolver(&stub).resolve_source_ref("release_2.1.0", &linux()).await.unwrap();
    assert!(info.is_legacy());
    assert_eq!(info.selected_version().to_string(), "2.1.0+git558d8435");
}

#[tokio::test]
async fn test_source_ref_without_version_file() {
    init_test_logging(None);
    let stub = Arc::new(StubFetcher::new());
    let err = resolver(&stub).resolve_source_ref(COMMIT, &linux()).await.unwrap_err();
    assert!(matches!(err, LauncherError::CommitVersionUnavailable { .. }));
}

#[tokio::test]
async fn test_latest_stable() {
    init_test_logging(None);
    let stub = Arc::new(
        StubFetcher::new()
            .with_json(PANTS_LATEST_RELEASE_URL, json!({"tag_name": "release_2.24.1"}))
            .with_probe(pex_url("2.24.1", "cp39")),
    );

    let info = resolver(&stub).resolve(&VersionSpec::Latest, &linux()).await.unwrap();
    assert_eq!(info.version, v("2.24.1"));
    assert_eq!(stub.calls()[0].headers.get("Accept"), Some("application/json"));
}

#[tokio::test]
async fn test_latest_stable_unexpected_tag() {
    init_test_logging(None);
    for tag in ["v2.24.1", "release_", "release_notaversion"] {
        let stub = Arc::new(StubFetcher::new().with_json(PANTS_LATEST_RELEASE_URL, json!({"tag_name": tag})));
        let err = resolver(&stub).resolve_latest_stable(&linux()).await.unwrap_err();
        assert!(matches!(err, LauncherError::UnexpectedReleaseTag { .. }), "{tag} gave {err:?}");
        assert_eq!(stub.calls().len(), 1);
    }
}

#[tokio::test]
async fn test_latest_stable_unavailable() {
    init_test_logging(None);
    let stub = Arc::new(StubFetcher::new().with_failure(PANTS_LATEST_RELEASE_URL));
    let err = resolver(&stub).resolve_latest_stable(&linux()).await.unwrap_err();
    assert!(matches!(err, LauncherError::LatestReleaseUnavailable { .. }));
}

#[tokio::test]
async fn test_end_to_end_fallback_runtime() {
    init_test_logging(None);
    let stub = Arc::new(StubFetcher::new().with_probe(pex_url("2.18.0", "cp310")));
    let table = RuntimeTable::new(
        vec![RuntimeThreshold {
            minimum: v("0"),
            runtime: "cp311".to_string(),
        }],
        RuntimeTable::default().fallback().to_vec(),
    );

    let info = resolver(&stub)
        .with_runtime_table(table)
        .resolve(&VersionSpec::Explicit("2.18.0".to_string()), &linux())
        .await
        .unwrap();

    assert_eq!(info.version, v("2.18.0"));
    assert_eq!(info.runtime_id, "cpython310");
    assert!(info.artifact_url.as_deref().is_some_and(|url| url.ends_with("/pants.2.18.0-cp310-linux_x86_64.pex")));
    assert_eq!(stub.urls_of(FetchKind::Probe)[0], pex_url("2.18.0", "cp311"));
    assert_eq!(stub.urls_of(FetchKind::Probe).last(), Some(&pex_url("2.18.0", "cp310")));

    let mut env = Vec::new();
    info.write_env(&mut env).unwrap();
    assert_eq!(
        String::from_utf8(env).unwrap(),
        format!("PANTS_PEX_URL={}\nPANTS_VERSION=2.18.0\nPYTHON=cpython310\n", pex_url("2.18.0", "cp310"))
    );
}

#[test]
fn test_find_links_option_naming() {
    let info = |version: &str| ResolveInfo {
        version: v(version),
        sha_version: None,
        runtime_id: "cpython39".to_string(),
        artifact_url: None,
        legacy_index_url: None,
    };

    assert_eq!(info("2.13.2").find_links_option(&v("2.13.2")), "--python-repos-repos=-[]");
    assert_eq!(info("2.14.0rc1").find_links_option(&v("2.14.0rc1")), "--python-repos-find-links=-[]");
    assert_eq!(info("2.14.0").find_links_option(&v("2.14.0+gitdeadbeef")), "--python-repos-find-links=+[]");
}

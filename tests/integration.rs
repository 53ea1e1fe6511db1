//! End-to-end acquisition scenarios
//!
//! Each test loads a real manifest file from a sandbox directory and drives
//! the full loop against a mock HTTP server: dispatch, fallback, digest
//! verification, and sidecar recording.

use fetch_assets::fetch::firmware::FirmwareLocator;
use fetch_assets::fetch::http::HttpClient;
use fetch_assets::fetch::strategy::{SourceRules, SpecialSource};
use fetch_assets::manifest::Manifest;
use fetch_assets::{FetchContext, FetchError, run};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// SHA256 of "kernel bundle" / "release asset" / "dsp firmware"
const BUNDLE_SHA256: &str = "43264ea7323216a51674082d7ff0c8b5476c01c9e8d84b4eb3228de0344e4c78";
const ASSET_SHA256: &str = "e6abe9df7db8513616674b02b5edb26c37bf3b2f81daeec1e3c6fc8c9a802850";
const DSP_SHA256: &str = "7a803150563a77995748c47c5a2f9dbe5fb8b4394dcb5843d3ab1cebef332a00";

/// Create a sandbox and write a manifest into it.
fn write_manifest(content: &str) -> (TempDir, Manifest) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("assets-manifest.json");
    std::fs::write(&path, content).unwrap();
    let manifest = Manifest::load(&path).unwrap();
    (dir, manifest)
}

/// A context wired for tests: no host firmware roots, no package fallback.
fn test_ctx(root: &Path, api_base: &str) -> FetchContext {
    FetchContext {
        root: root.to_path_buf(),
        client: HttpClient::new(),
        locator: FirmwareLocator::host_only(Vec::new()),
        rules: SourceRules::default(),
        github_api_base: api_base.to_string(),
    }
}

#[tokio::test]
async fn test_kernel_firmware_end_to_end_with_sidecar() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/plain/realtek/rtl8125.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"kernel bundle".to_vec()))
        .mount(&server)
        .await;

    let (dir, manifest) = write_manifest(&format!(
        r#"{{
            "artifacts": [{{
                "name": "rtl8125",
                "type": "kernel_firmware",
                "url": "{}/plain/realtek/rtl8125.bin",
                "destination": "firmware/rtl8125.bin",
                "sha256": "{}"
            }}]
        }}"#,
        server.uri(),
        BUNDLE_SHA256
    ));
    let ctx = test_ctx(dir.path(), "http://unused.invalid");

    let processed = run(&ctx, &manifest, &[]).unwrap();

    assert_eq!(processed, 1);
    let dest = dir.path().join("firmware/rtl8125.bin");
    assert_eq!(std::fs::read(&dest).unwrap(), b"kernel bundle");
    assert_eq!(
        std::fs::read_to_string(dir.path().join("firmware/rtl8125.bin.sha256")).unwrap(),
        format!("{}  rtl8125.bin\n", BUNDLE_SHA256)
    );
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/plain/realtek/rtl8125.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"kernel bundle".to_vec()))
        .mount(&server)
        .await;

    let (dir, manifest) = write_manifest(&format!(
        r#"{{
            "artifacts": [{{
                "name": "rtl8125",
                "type": "kernel_firmware",
                "url": "{}/plain/realtek/rtl8125.bin",
                "destination": "firmware/rtl8125.bin",
                "sha256": "{}"
            }}]
        }}"#,
        server.uri(),
        BUNDLE_SHA256
    ));
    let ctx = test_ctx(dir.path(), "http://unused.invalid");
    let sidecar = dir.path().join("firmware/rtl8125.bin.sha256");

    run(&ctx, &manifest, &[]).unwrap();
    let first = std::fs::read_to_string(&sidecar).unwrap();
    run(&ctx, &manifest, &[]).unwrap();
    let second = std::fs::read_to_string(&sidecar).unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_github_release_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/example/arm-tf/releases/tags/v2.10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "assets": [{
                "name": "bl31.bin",
                "browser_download_url": format!("{}/dl/bl31.bin", server.uri())
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dl/bl31.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"release asset".to_vec()))
        .mount(&server)
        .await;

    let (dir, manifest) = write_manifest(&format!(
        r#"{{
            "artifacts": [{{
                "name": "bl31",
                "type": "github",
                "repo": "example/arm-tf",
                "tag": "v2.10",
                "asset": "bl31.bin",
                "destination": "boot/bl31.bin",
                "sha256": "{}"
            }}]
        }}"#,
        ASSET_SHA256
    ));
    let ctx = test_ctx(dir.path(), &server.uri());

    let processed = run(&ctx, &manifest, &[]).unwrap();

    assert_eq!(processed, 1);
    assert_eq!(
        std::fs::read(dir.path().join("boot/bl31.bin")).unwrap(),
        b"release asset"
    );
}

#[tokio::test]
async fn test_final_digest_mismatch_is_fatal_and_removes_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dl/u-boot.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"tampered bytes".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/example/u-boot/releases/tags/v1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "assets": [{
                "name": "u-boot.bin",
                "browser_download_url": format!("{}/dl/u-boot.bin", server.uri())
            }]
        })))
        .mount(&server)
        .await;

    let (dir, manifest) = write_manifest(&format!(
        r#"{{
            "artifacts": [{{
                "name": "u-boot",
                "type": "github",
                "repo": "example/u-boot",
                "tag": "v1",
                "asset": "u-boot.bin",
                "destination": "boot/u-boot.bin",
                "sha256": "{}"
            }}]
        }}"#,
        ASSET_SHA256
    ));
    let ctx = test_ctx(dir.path(), &server.uri());

    let err = run(&ctx, &manifest, &[]).unwrap_err();

    assert!(matches!(err, FetchError::DigestMismatch { .. }));
    // A destination never holds content that failed verification.
    assert!(!dir.path().join("boot/u-boot.bin").exists());
    assert!(!dir.path().join("boot/u-boot.bin.sha256").exists());
}

#[tokio::test]
async fn test_type_filter_skips_other_artifacts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/plain/realtek/rtl8125.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"kernel bundle".to_vec()))
        .expect(1)
        .mount(&server)
        .await;
    // The filtered-out github artifact must never reach the API.
    Mock::given(method("GET"))
        .and(path("/repos/example/arm-tf/releases/tags/v2.10"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (dir, manifest) = write_manifest(&format!(
        r#"{{
            "artifacts": [
                {{
                    "name": "bl31",
                    "type": "github",
                    "repo": "example/arm-tf",
                    "tag": "v2.10",
                    "asset": "bl31.bin",
                    "destination": "boot/bl31.bin",
                    "sha256": "{}"
                }},
                {{
                    "name": "rtl8125",
                    "type": "kernel_firmware",
                    "url": "{}/plain/realtek/rtl8125.bin",
                    "destination": "firmware/rtl8125.bin",
                    "sha256": "{}"
                }}
            ]
        }}"#,
        ASSET_SHA256,
        server.uri(),
        BUNDLE_SHA256
    ));
    let ctx = test_ctx(dir.path(), &server.uri());

    let processed = run(&ctx, &manifest, &["KERNEL_FIRMWARE".to_string()]).unwrap();

    assert_eq!(processed, 1);
    assert!(dir.path().join("firmware/rtl8125.bin").exists());
    assert!(!dir.path().join("boot/bl31.bin").exists());
}

#[tokio::test]
async fn test_mt7996_dsp_exhaustion_aborts_with_resolution_error() {
    let server = MockServer::start().await;
    // Both upstream layout candidates 404 and there is no host or package
    // fallback available.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (dir, manifest) = write_manifest(&format!(
        r#"{{
            "artifacts": [{{
                "name": "mt7996_dsp",
                "type": "kernel_firmware",
                "url": "{}/plain/mediatek/mt7996/mt7996_dsp.bin",
                "destination": "firmware/mt7996_dsp.bin",
                "sha256": "{}"
            }}]
        }}"#,
        server.uri(),
        DSP_SHA256
    ));

    let mut ctx = test_ctx(dir.path(), "http://unused.invalid");
    ctx.rules.specials = vec![SpecialSource {
        artifact: "mt7996_dsp".to_string(),
        candidates: vec![
            format!("{}/plain/mediatek/mt7996/mt7996_dsp.bin", server.uri()),
            format!("{}/plain/mediatek/mt7996_dsp.bin", server.uri()),
        ],
        host_patterns: vec![
            "mediatek/mt7996/mt7996_dsp.bin".to_string(),
            "mediatek/mt7996_dsp.bin".to_string(),
        ],
    }];

    let err = run(&ctx, &manifest, &[]).unwrap_err();

    match err {
        FetchError::Resolution { artifact, .. } => assert_eq!(artifact, "mt7996_dsp"),
        other => panic!("wrong error: {:?}", other),
    }
    assert!(!dir.path().join("firmware/mt7996_dsp.bin").exists());
}

#[tokio::test]
async fn test_host_firmware_beats_package_and_network() {
    // No mock server at all: the artifact must come from the host root.
    let host_root = TempDir::new().unwrap();
    std::fs::create_dir_all(host_root.path().join("mediatek/mt7996")).unwrap();
    std::fs::write(
        host_root.path().join("mediatek/mt7996/mt7996_dsp.bin"),
        b"dsp firmware",
    )
    .unwrap();

    let (dir, manifest) = write_manifest(&format!(
        r#"{{
            "artifacts": [{{
                "name": "mt7996_dsp",
                "type": "kernel_firmware",
                "url": "http://unused.invalid/mt7996_dsp.bin",
                "destination": "firmware/mt7996_dsp.bin",
                "sha256": "{}"
            }}]
        }}"#,
        DSP_SHA256
    ));

    let mut ctx = test_ctx(dir.path(), "http://unused.invalid");
    ctx.locator = FirmwareLocator::host_only(vec![host_root.path().to_path_buf()]);
    // Upstream candidates point nowhere reachable; the host copy must win.
    ctx.rules.specials = vec![SpecialSource {
        artifact: "mt7996_dsp".to_string(),
        candidates: vec!["http://127.0.0.1:1/mt7996_dsp.bin".to_string()],
        host_patterns: vec![
            "mediatek/mt7996/mt7996_dsp.bin".to_string(),
            "mediatek/mt7996_dsp.bin".to_string(),
        ],
    }];

    let processed = run(&ctx, &manifest, &[]).unwrap();

    assert_eq!(processed, 1);
    assert_eq!(
        std::fs::read(dir.path().join("firmware/mt7996_dsp.bin")).unwrap(),
        b"dsp firmware"
    );
}

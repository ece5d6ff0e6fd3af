//! Download Tests
//!
//! Streaming files from a mock data mirror into temporary directories.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use kemono_client::domain::{Creator, File, ServiceType};
use kemono_client::shared::ClientError;

use crate::common::{api, digest_path, post, profile, sha256_hex, TestApp};

const BODY: &[u8] = b"not really a png";

async fn mount_file(app: &TestApp, file_path: &str, body: &[u8], hits: u64) {
    Mock::given(method("GET"))
        .and(path(file_path))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(body.to_vec()),
        )
        .expect(hits)
        .mount(&app.server)
        .await;
}

#[tokio::test]
async fn test_save_verifies_digest() {
    let app = TestApp::spawn().await;
    let digest = sha256_hex(BODY);
    let file_path = digest_path(&digest, ".png");
    mount_file(&app, &file_path, BODY, 1).await;

    let dir = tempfile::tempdir().unwrap();
    let file = File::data("cover.png", file_path.as_str(), &app.endpoints);

    let outcome = app.downloader().save(&file, dir.path(), false).await.unwrap();

    assert!(outcome.written);
    assert_eq!(outcome.path, dir.path().join("cover.png"));
    assert_eq!(outcome.bytes, BODY.len() as u64);
    assert_eq!(outcome.content_type.as_deref(), Some("image/png"));
    assert_eq!(std::fs::read(&outcome.path).unwrap(), BODY);
}

#[tokio::test]
async fn test_digest_mismatch_removes_file() {
    let app = TestApp::spawn().await;
    let digest = sha256_hex(b"something else");
    let file_path = digest_path(&digest, ".png");
    mount_file(&app, &file_path, BODY, 1).await;

    let dir = tempfile::tempdir().unwrap();
    let file = File::data("cover.png", file_path.as_str(), &app.endpoints);

    let err = app.downloader().save(&file, dir.path(), false).await.unwrap_err();

    match err {
        ClientError::DigestMismatch { expected, actual } => {
            assert_eq!(expected, digest);
            assert_eq!(actual, sha256_hex(BODY));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_existing_file_is_kept_unless_overwrite() {
    let app = TestApp::spawn().await;
    mount_file(&app, "/data/plain/notes.txt", BODY, 1).await;

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("notes.txt");
    std::fs::write(&target, b"local").unwrap();
    let file = File::data("notes.txt", "/data/plain/notes.txt", &app.endpoints);
    let downloader = app.downloader();

    let kept = downloader.save(&file, &target, false).await.unwrap();
    assert!(!kept.written);
    assert_eq!(std::fs::read(&target).unwrap(), b"local");

    let replaced = downloader.save(&file, &target, true).await.unwrap();
    assert!(replaced.written);
    assert_eq!(std::fs::read(&target).unwrap(), BODY);
}

#[tokio::test]
async fn test_missing_file_is_an_error() {
    let app = TestApp::spawn().await;
    let dir = tempfile::tempdir().unwrap();
    let file = File::data("gone.png", "/data/gone.png", &app.endpoints);

    let err = app.downloader().save(&file, dir.path(), false).await.unwrap_err();
    assert!(matches!(err, ClientError::UnexpectedStatus { .. }));
}

#[tokio::test]
async fn test_save_post_writes_preview_and_attachments() {
    let app = TestApp::spawn().await;
    let preview = sha256_hex(b"preview");
    let attachment = sha256_hex(b"attachment");

    let mut record = post("fanbox", "77", 5);
    record["file"] = json!({"name": "preview.png", "path": digest_path(&preview, ".png").trim_start_matches("/data")});
    record["attachments"] = json!([
        {"name": "full.png", "path": digest_path(&attachment, ".png").trim_start_matches("/data")}
    ]);

    Mock::given(method("GET"))
        .and(path(api("/fanbox/user/77/profile")))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile("fanbox", "77")))
        .mount(&app.server)
        .await;
    Mock::given(method("GET"))
        .and(path(api("/fanbox/user/77/post/5")))
        .respond_with(ResponseTemplate::new(200).set_body_json(record))
        .mount(&app.server)
        .await;
    mount_file(&app, &digest_path(&preview, ".png"), b"preview", 1).await;
    mount_file(&app, &digest_path(&attachment, ".png"), b"attachment", 1).await;

    let creator = Creator::from_profile(&app.client, ServiceType::Fanbox, "77")
        .await
        .unwrap()
        .map(Arc::new)
        .unwrap();
    let post = creator.get_post("5").await.unwrap().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("5");
    let complete = app.downloader().save_post(&post, &target, false).await.unwrap();

    assert!(complete);
    assert_eq!(std::fs::read(target.join("preview.png")).unwrap(), b"preview");
    assert_eq!(std::fs::read(target.join("full.png")).unwrap(), b"attachment");
}

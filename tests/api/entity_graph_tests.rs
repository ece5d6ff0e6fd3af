//! Entity Graph Tests
//!
//! Lazy sub-resources and back-references over HTTP.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use kemono_client::application::services::ArchiveService;
use kemono_client::domain::{MessageQuery, ServiceType};
use kemono_client::shared::ClientError;

use crate::common::{api, digest_path, post, profile, sha256_hex, TestApp};

async fn mount_json(app: &TestApp, resource: &str, body: serde_json::Value, hits: u64) {
    Mock::given(method("GET"))
        .and(path(api(resource)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(hits)
        .mount(&app.server)
        .await;
}

#[tokio::test]
async fn test_post_lazy_fields_fetch_once() {
    let app = TestApp::spawn().await;

    mount_json(&app, "/fanbox/user/77/profile", profile("fanbox", "77"), 1).await;
    mount_json(&app, "/fanbox/user/77/post/5", json!({ "post": post("fanbox", "77", 5) }), 1).await;
    mount_json(
        &app,
        "/fanbox/user/77/post/5/comments",
        json!([
            {"id": "c1", "commenter": "u1", "commenter_name": "fan", "content": "nice", "published": "2024-01-02T00:00:00.123456"},
            {"id": "c2", "parent_id": "c1", "commenter": "77", "content": "thanks", "published": "2024-01-02T01:00:00"}
        ]),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path(api("/fanbox/user/77/post/5/flag")))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&app.server)
        .await;

    let creator = app
        .archive
        .get_creator(ServiceType::Fanbox, "77")
        .await
        .unwrap()
        .unwrap();
    let post = creator.get_post("5").await.unwrap().unwrap();
    assert!(Arc::ptr_eq(post.creator().unwrap(), &creator));

    let first = post.comments().await.unwrap();
    let second = post.comments().await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.len(), 2);
    assert!(first[1].is_reply());
    assert!(Arc::ptr_eq(&first[0].post().unwrap(), &post));

    assert!(!post.flagged().await.unwrap());
    assert!(!post.flagged().await.unwrap());
}

#[tokio::test]
async fn test_discord_channel_messages() {
    let app = TestApp::spawn().await;

    mount_json(&app, "/discord/user/555/profile", profile("discord", "555"), 1).await;
    mount_json(
        &app,
        "/discord/channel/lookup/555",
        json!([{"id": "900", "name": "art"}, {"id": "901", "name": "chat"}]),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path(api("/discord/channel/900")))
        .and(query_param("o", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "m1",
                "server": "555",
                "content": "hello",
                "published": "2024-02-01T10:00:00.000000",
                "author": {"id": "42", "username": "painter", "avatar": "abc"}
            }
        ])))
        .expect(1)
        .mount(&app.server)
        .await;
    Mock::given(method("GET"))
        .and(path(api("/discord/channel/900")))
        .and(query_param("o", "150"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&app.server)
        .await;

    let creator = app
        .archive
        .get_creator(ServiceType::Discord, "555")
        .await
        .unwrap()
        .unwrap();

    let channels = creator.channels().await.unwrap();
    assert_eq!(channels.len(), 2);
    assert!(Arc::ptr_eq(&creator.channels().await.unwrap(), &channels));

    let channel = Arc::clone(&channels[0]);
    assert!(Arc::ptr_eq(&channel.creator().unwrap(), &creator));

    let messages = channel.messages(&MessageQuery::default()).await.unwrap();
    assert_eq!(messages.len(), 1);
    let author = messages[0].author.as_ref().unwrap();
    assert_eq!(author.display_name(), "painter");
    assert_eq!(
        author.avatar.as_ref().unwrap().url(),
        format!("{}/avatars/42/abc", app.server.uri())
    );
}

#[tokio::test]
async fn test_channels_of_non_discord_creator_need_no_request() {
    let app = TestApp::spawn().await;
    mount_json(&app, "/patreon/user/10/profile", profile("patreon", "10"), 1).await;

    let creator = app
        .archive
        .get_creator(ServiceType::Patreon, "10")
        .await
        .unwrap()
        .unwrap();

    assert!(creator.channels().await.unwrap().is_empty());
    let err = creator.get_channel("900").await.unwrap_err();
    assert!(matches!(err, ClientError::IncorrectService { .. }));
    assert_eq!(app.server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_file_hash_lookup() {
    let app = TestApp::spawn().await;
    let digest = sha256_hex(b"picture");

    mount_json(
        &app,
        &format!("/search_hash/{}", digest),
        json!({
            "hash": digest,
            "ext": ".png",
            "mime": "image/png",
            "posts": [post("fanbox", "77", 5)],
            "discord_posts": []
        }),
        1,
    )
    .await;
    mount_json(&app, "/fanbox/user/77/profile", profile("fanbox", "77"), 1).await;

    let result = app.archive.get_file_hash(&digest).await.unwrap();

    let file = result.file.unwrap();
    assert_eq!(file.path(), digest_path(&digest, ".png"));
    assert_eq!(file.content_hash(), Some(digest.as_str()));
    assert_eq!(result.posts.len(), 1);
    assert!(result.messages.is_empty());
}

#[tokio::test]
async fn test_unknown_hash_is_empty() {
    let app = TestApp::spawn().await;

    let result = app.archive.get_file_hash(&"0".repeat(64)).await.unwrap();
    assert!(result.is_empty());
}

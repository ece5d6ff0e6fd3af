//! Pagination Tests
//!
//! Offset walks over HTTP, sequential and batched.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use test_case::test_case;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use kemono_client::application::services::{ArchiveService, GlobalPostQuery};
use kemono_client::domain::{Creator, PostQuery, ServiceType};
use kemono_client::infrastructure::pagination::{BatchConfig, FetchMode};
use kemono_client::shared::ClientError;

use crate::common::{api, posts, profile, TestApp};

async fn mount_page(app: &TestApp, resource: &str, offset: usize, body: Value) {
    Mock::given(method("GET"))
        .and(path(api(resource)))
        .and(query_param("o", offset.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&app.server)
        .await;
}

async fn fanbox_creator(app: &TestApp) -> Arc<Creator> {
    Mock::given(method("GET"))
        .and(path(api("/fanbox/user/77/profile")))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile("fanbox", "77")))
        .mount(&app.server)
        .await;

    let creator = Creator::from_profile(&app.client, ServiceType::Fanbox, "77")
        .await
        .unwrap()
        .unwrap();
    Arc::new(creator)
}

/// A cap of 100 with pages of 50 reads offsets 0, 50 and 100.
#[test_case(FetchMode::Sequential ; "sequential")]
#[test_case(FetchMode::Concurrent(BatchConfig { window: 2, concurrency: 2 }) ; "concurrent")]
#[tokio::test]
async fn test_creator_posts_bounded_walk(mode: FetchMode) {
    let app = TestApp::spawn().await;
    let creator = fanbox_creator(&app).await;

    mount_page(&app, "/fanbox/user/77", 0, posts("fanbox", "77", 0, 50)).await;
    mount_page(&app, "/fanbox/user/77", 50, posts("fanbox", "77", 50, 100)).await;
    mount_page(&app, "/fanbox/user/77", 100, json!([])).await;

    let query = PostQuery {
        max_posts: Some(100),
        mode,
        ..PostQuery::default()
    };
    let found = creator.posts(&query).await.unwrap();

    let ids: Vec<String> = found.iter().map(|post| post.id.clone()).collect();
    let expected: Vec<String> = (0..100).map(|id| id.to_string()).collect();
    assert_eq!(ids, expected);
    assert!(found
        .iter()
        .all(|post| post.creator().map(|c| c.id.as_str()) == Some("77")));
}

#[tokio::test]
async fn test_unbounded_walk_stops_at_empty_page() {
    let app = TestApp::spawn().await;
    let creator = fanbox_creator(&app).await;

    mount_page(&app, "/fanbox/user/77", 0, posts("fanbox", "77", 0, 50)).await;
    mount_page(&app, "/fanbox/user/77", 50, posts("fanbox", "77", 50, 70)).await;
    mount_page(&app, "/fanbox/user/77", 100, json!([])).await;

    let found = creator.posts(&PostQuery::default()).await.unwrap();
    assert_eq!(found.len(), 70);
}

#[tokio::test]
async fn test_search_query_is_forwarded() {
    let app = TestApp::spawn().await;

    Mock::given(method("GET"))
        .and(path(api("/posts")))
        .and(query_param("q", "sketch"))
        .and(query_param("o", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(posts("fanbox", "77", 0, 3)))
        .expect(1)
        .mount(&app.server)
        .await;
    Mock::given(method("GET"))
        .and(path(api("/fanbox/user/77/profile")))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile("fanbox", "77")))
        .expect(1)
        .mount(&app.server)
        .await;

    let query = GlobalPostQuery {
        query: Some("sketch".to_string()),
        max_posts: 10,
        ..GlobalPostQuery::default()
    };
    let found = app.archive.get_posts(&query).await.unwrap();

    assert_eq!(found.len(), 3);
    // One profile lookup serves every post of the same creator.
    let first = found[0].creator().unwrap();
    assert!(found
        .iter()
        .all(|post| Arc::ptr_eq(post.creator().unwrap(), first)));
}

#[test_case(0 ; "zero")]
#[test_case(1001 ; "above limit")]
#[tokio::test]
async fn test_global_cap_out_of_range(max_posts: usize) {
    let app = TestApp::spawn().await;

    let query = GlobalPostQuery {
        max_posts,
        ..GlobalPostQuery::default()
    };
    let err = app.archive.get_posts(&query).await.unwrap_err();

    assert!(matches!(err, ClientError::InvalidItemCap { value, limit: 1000 } if value == max_posts));
    assert!(app.server.received_requests().await.unwrap().is_empty());
}

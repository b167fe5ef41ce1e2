//! Integration tests for metadata push, account linking and schema registration.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::Duration;
use linked_roles_discord::environment::Clock;
use linked_roles_discord::metadata::default_schema;
use linked_roles_discord::mocks::{test_clock, InMemoryTokenStore, StaticMetadataSource};
use linked_roles_discord::{
    DiscordConfig, LinkedProfile, LinkedRoleError, LinkedRoles, MetadataDocument, MetadataPusher,
    OAuthClient, Operation, SchemaRegistrar, TokenRecord, UserId,
};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ROLE_CONNECTION_PATH: &str = "/users/@me/applications/1234/role-connection";

fn config(server: &MockServer) -> DiscordConfig {
    DiscordConfig::new(
        "1234".to_string(),
        "shh".to_string(),
        "http://localhost:3000/discord-oauth-callback".to_string(),
    )
    .with_api_base(server.uri())
}

fn oauth(server: &MockServer) -> Arc<OAuthClient> {
    Arc::new(
        OAuthClient::new(config(server))
            .unwrap()
            .with_clock(Arc::new(test_clock())),
    )
}

fn fresh_record(access_token: &str) -> TokenRecord {
    TokenRecord {
        access_token: access_token.to_string(),
        refresh_token: "RT1".to_string(),
        expires_at: test_clock().now() + Duration::minutes(10),
    }
}

fn level_document() -> MetadataDocument {
    LinkedProfile {
        profile_visible: true,
        connected: true,
        connected_date: Some("2024-06-01".to_string()),
        level: Some(42),
    }
    .to_document()
}

#[tokio::test]
async fn test_push_nests_document_under_metadata() {
    let server = MockServer::start().await;
    let pusher = MetadataPusher::new(oauth(&server));
    let user = UserId::from("42");
    let store = InMemoryTokenStore::new();

    Mock::given(method("PUT"))
        .and(path(ROLE_CONNECTION_PATH))
        .and(header("Authorization", "Bearer AT1"))
        .and(body_json(json!({
            "platform_name": "MIYABI",
            "metadata": {
                "viewprofile": "1",
                "zzzconnect": "1",
                "zzzdate": "2024-06-01",
                "zzzlevel": "42"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    pusher
        .push(&store, &user, &fresh_record("AT1"), &level_document())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_push_then_fetch_returns_same_document() {
    let server = MockServer::start().await;
    let pusher = MetadataPusher::new(oauth(&server));
    let user = UserId::from("42");
    let store = InMemoryTokenStore::new();
    let record = fresh_record("AT1");

    Mock::given(method("PUT"))
        .and(path(ROLE_CONNECTION_PATH))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(ROLE_CONNECTION_PATH))
        .and(header("Authorization", "Bearer AT1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "platform_name": "MIYABI",
            "platform_username": null,
            "metadata": {
                "viewprofile": "1",
                "zzzconnect": "1",
                "zzzdate": "2024-06-01",
                "zzzlevel": "42"
            }
        })))
        .mount(&server)
        .await;

    pusher.push(&store, &user, &record, &level_document()).await.unwrap();
    let fetched = pusher.fetch(&store, &user, &record).await.unwrap();

    assert_eq!(fetched, level_document());
}

#[tokio::test]
async fn test_push_refreshes_expired_token_first() {
    let server = MockServer::start().await;
    let pusher = MetadataPusher::new(oauth(&server));
    let user = UserId::from("42");
    let expired = TokenRecord {
        access_token: "AT1".to_string(),
        refresh_token: "RT1".to_string(),
        expires_at: test_clock().now() - Duration::seconds(1),
    };
    let store = InMemoryTokenStore::new().with_record(&user, expired.clone());

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "AT2",
            "refresh_token": "RT2",
            "expires_in": 604_800
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(ROLE_CONNECTION_PATH))
        .and(header("Authorization", "Bearer AT2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    pusher
        .push(&store, &user, &expired, &level_document())
        .await
        .unwrap();

    assert_eq!(store.record(&user).unwrap().access_token, "AT2");
}

#[tokio::test]
async fn test_push_failure_is_not_retried() {
    let server = MockServer::start().await;
    let pusher = MetadataPusher::new(oauth(&server));

    Mock::given(method("PUT"))
        .and(path(ROLE_CONNECTION_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .expect(1)
        .mount(&server)
        .await;

    let err = pusher
        .push(
            &InMemoryTokenStore::new(),
            &UserId::from("42"),
            &fresh_record("AT1"),
            &level_document(),
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        LinkedRoleError::Provider {
            operation: Operation::MetadataPush,
            status: 500,
            status_text: "Internal Server Error".to_string(),
        }
    );
}

#[tokio::test]
async fn test_complete_authorization_links_and_pushes() {
    let server = MockServer::start().await;
    let user = UserId::from("80351110224678912");
    let service = LinkedRoles::new(
        oauth(&server),
        InMemoryTokenStore::new(),
        StaticMetadataSource::new().with_document(&user, level_document()),
    );

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(body_string_contains("code=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "AT1",
            "refresh_token": "RT1",
            "expires_in": 600
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/oauth2/@me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "scopes": ["role_connections.write", "identify"],
            "user": {"id": "80351110224678912", "username": "nelly", "global_name": "Nelly"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(ROLE_CONNECTION_PATH))
        .and(header("Authorization", "Bearer AT1"))
        .and(body_json(json!({
            "platform_name": "MIYABI",
            "metadata": {
                "viewprofile": "1",
                "zzzconnect": "1",
                "zzzdate": "2024-06-01",
                "zzzlevel": "42"
            }
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let linked = service.complete_authorization("abc123").await.unwrap();

    assert_eq!(linked.display_name(), "Nelly");
    let stored = service.tokens().record(&user).unwrap();
    assert_eq!(stored.access_token, "AT1");
    assert_eq!(stored.expires_at, test_clock().now() + Duration::milliseconds(600_000));
}

#[tokio::test]
async fn test_identity_failure_stores_nothing() {
    let server = MockServer::start().await;
    let service = LinkedRoles::new(
        oauth(&server),
        InMemoryTokenStore::new(),
        StaticMetadataSource::new(),
    );

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "AT1",
            "refresh_token": "RT1",
            "expires_in": 600
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/oauth2/@me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = service.complete_authorization("abc123").await.unwrap_err();

    assert!(matches!(
        err,
        LinkedRoleError::Provider { operation: Operation::Identity, status: 401, .. }
    ));
    assert_eq!(service.tokens().put_count(), 0);
}

#[tokio::test]
async fn test_update_metadata_for_unlinked_user() {
    let server = MockServer::start().await;
    let service = LinkedRoles::new(
        oauth(&server),
        InMemoryTokenStore::new(),
        StaticMetadataSource::new(),
    );

    let err = service
        .update_metadata(&UserId::from("nobody"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        LinkedRoleError::NotLinked {
            user_id: "nobody".to_string()
        }
    );
}

#[tokio::test]
async fn test_update_metadata_pushes_empty_profile_document() {
    let server = MockServer::start().await;
    let user = UserId::from("42");
    let service = LinkedRoles::new(
        oauth(&server),
        InMemoryTokenStore::new().with_record(&user, fresh_record("AT1")),
        StaticMetadataSource::new(),
    );

    Mock::given(method("PUT"))
        .and(path(ROLE_CONNECTION_PATH))
        .and(body_json(json!({
            "platform_name": "MIYABI",
            "metadata": {
                "viewprofile": "0",
                "zzzconnect": "0",
                "zzzdate": "0",
                "zzzlevel": "0"
            }
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    service.update_metadata(&user).await.unwrap();
}

#[tokio::test]
async fn test_register_schema_as_bot() {
    let server = MockServer::start().await;
    let registrar = SchemaRegistrar::new(config(&server)).unwrap();

    Mock::given(method("PUT"))
        .and(path("/applications/1234/role-connections/metadata"))
        .and(header("Authorization", "Bot bot-token"))
        .and(body_json(json!([
            {"key": "viewprofile", "name": "Public profile", "description": "Profile is publicly visible", "type": 7},
            {"key": "zzzconnect", "name": "Game linked", "description": "Game account is connected", "type": 7},
            {"key": "zzzdate", "name": "Linked since", "description": "Days since the game account was connected", "type": 6},
            {"key": "zzzlevel", "name": "Level", "description": "In-game level is at least", "type": 2}
        ])))
        .respond_with(ResponseTemplate::new(200).set_body_json(default_schema()))
        .expect(1)
        .mount(&server)
        .await;

    let accepted = registrar.register("bot-token", &default_schema()).await.unwrap();
    assert_eq!(accepted, default_schema());
}

#[tokio::test]
async fn test_register_schema_rejected() {
    let server = MockServer::start().await;
    let registrar = SchemaRegistrar::new(config(&server)).unwrap();

    Mock::given(method("PUT"))
        .and(path("/applications/1234/role-connections/metadata"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"code": 50035, "message": "Invalid Form Body"})),
        )
        .mount(&server)
        .await;

    let err = registrar
        .register("bot-token", &default_schema())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        LinkedRoleError::Provider {
            operation: Operation::SchemaRegistration,
            status: 400,
            status_text: "Bad Request".to_string(),
        }
    );
}

#![allow(missing_docs)]

mod support;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use demise_bot::{
    DEMISE_INGRESS_SECRET_HEADER, DISCORD_SIGNATURE_HEADER, DISCORD_TIMESTAMP_HEADER,
    DemiseRuntimeConfig, GuildId, HostPlatform, IngressAuth, InteractionRouter,
    InteractionVerifier, NOT_READY_REPLY, RoleRef, UserId, WidgetStore, build_interactions_app,
};
use ed25519_dalek::{Signer, SigningKey};
use serde_json::{Value, json};
use tower::util::ServiceExt;

use support::MockPlatform;

const PATH: &str = "/discord/interactions";
const MODERATOR: u64 = 55;
const MEMBER: u64 = 42;

struct Ingress {
    app: Router,
    platform: Arc<MockPlatform>,
    store: Arc<WidgetStore>,
}

fn ingress(platform: MockPlatform, config: DemiseRuntimeConfig, secret: Option<&str>) -> Ingress {
    ingress_with_auth(
        platform,
        config,
        IngressAuth {
            secret_token: secret.map(ToString::to_string),
            ..IngressAuth::default()
        },
    )
}

fn ingress_with_auth(
    platform: MockPlatform,
    config: DemiseRuntimeConfig,
    auth: IngressAuth,
) -> Ingress {
    let platform = Arc::new(platform);
    let store = Arc::new(WidgetStore::new());
    let host: Arc<dyn HostPlatform> = platform.clone();
    let router = Arc::new(InteractionRouter::new(host, Arc::clone(&store), config));
    let built = build_interactions_app(router, PATH, auth);
    assert_eq!(built.path, PATH);
    Ingress {
        app: built.app,
        platform,
        store,
    }
}

fn guild_platform() -> MockPlatform {
    MockPlatform::new()
        .with_roles(&[
            (11, "Red"),
            (12, "Blue"),
            (21, "Tiny"),
            (24, "Giantess"),
            (25, "Dead"),
        ])
        .with_moderator(UserId(MODERATOR))
        .with_member(UserId(MEMBER), &[])
}

async fn post(app: Router, payload: &Value, secret: Option<&str>) -> Result<(StatusCode, Value)> {
    let headers = secret
        .map(|secret| vec![(DEMISE_INGRESS_SECRET_HEADER, secret.to_string())])
        .unwrap_or_default();
    send(app, payload.to_string(), &headers).await
}

async fn send(
    app: Router,
    body: String,
    headers: &[(&str, String)],
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(PATH)
        .header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, value);
    }
    let response = app.oneshot(builder.body(Body::from(body))?).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    Ok((status, body))
}

fn signing_key() -> SigningKey {
    SigningKey::from_bytes(&[7; 32])
}

fn signature_headers(timestamp: &str, body: &str) -> Vec<(&'static str, String)> {
    let signature = signing_key().sign(format!("{timestamp}{body}").as_bytes());
    vec![
        (DISCORD_SIGNATURE_HEADER, hex::encode(signature.to_bytes())),
        (DISCORD_TIMESTAMP_HEADER, timestamp.to_string()),
    ]
}

/// Adds the application id and token Discord sends with every interaction.
fn with_token(mut payload: Value, token: &str) -> Value {
    payload["application_id"] = json!("777");
    payload["token"] = json!(token);
    payload
}

fn command(name: &str, user: u64, options: &Value) -> Value {
    json!({
        "type": 2,
        "guild_id": "1",
        "channel_id": "10",
        "member": {"user": {"id": user.to_string()}},
        "data": {"name": name, "options": options}
    })
}

fn selection(values: &[&str]) -> Value {
    json!({
        "type": 3,
        "guild_id": "1",
        "channel_id": "10",
        "member": {"user": {"id": MEMBER.to_string()}, "roles": []},
        "message": {
            "id": "100",
            "components": [{"type": 1, "components": [{
                "type": 3,
                "custom_id": "rsel:2:x:abc123",
                "options": [
                    {"label": "Red", "value": "11"},
                    {"label": "Blue", "value": "12"}
                ]
            }]}]
        },
        "data": {"component_type": 3, "custom_id": "rsel:2:x:abc123", "values": values}
    })
}

#[tokio::test]
async fn invalid_secret_is_rejected() -> Result<()> {
    let ingress = ingress(guild_platform(), DemiseRuntimeConfig::default(), Some("expected"));

    let (status, _) = post(ingress.app.clone(), &json!({"type": 1}), Some("wrong")).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = post(ingress.app, &json!({"type": 1}), Some("expected")).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"type": 1}));
    Ok(())
}

#[tokio::test]
async fn only_requests_signed_with_the_application_key_are_accepted() -> Result<()> {
    let verifier =
        InteractionVerifier::from_hex(&hex::encode(signing_key().verifying_key().to_bytes()))?;
    let ingress = ingress_with_auth(
        guild_platform(),
        DemiseRuntimeConfig::default(),
        IngressAuth {
            verifier: Some(verifier),
            secret_token: None,
        },
    );
    let ping = json!({"type": 1}).to_string();

    let (status, body) = send(
        ingress.app.clone(),
        ping.clone(),
        &signature_headers("1700000000", &ping),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"type": 1}));

    // Signed body swapped for a command claiming to be the owner.
    let forged = command("cleanup_role_selectors", MODERATOR, &json!([])).to_string();
    let (status, _) = send(
        ingress.app.clone(),
        forged.clone(),
        &signature_headers("1700000000", &ping),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let mut wrong_timestamp = signature_headers("1700000000", &forged);
    wrong_timestamp[1].1 = "1700000001".to_string();
    let (status, _) = send(ingress.app.clone(), forged.clone(), &wrong_timestamp).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(ingress.app, forged, &[]).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(ingress.platform.platform_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn selector_commands_with_a_token_are_deferred_immediately() -> Result<()> {
    let ingress = ingress(
        guild_platform().with_held_authorization(),
        DemiseRuntimeConfig::default(),
        None,
    );
    let options = json!([
        {"name": "type", "value": "single"},
        {"name": "message", "value": "Pick"},
        {"name": "roles", "value": "<@&11> <@&12>"}
    ]);
    let payload = with_token(command("create_role_selector", MODERATOR, &options), "tok-1");

    // The authorization check is still pending, so an inline reply would hang.
    let (status, body) = tokio::time::timeout(
        Duration::from_secs(1),
        post(ingress.app, &payload, None),
    )
    .await??;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"type": 5, "data": {"flags": 64}}));
    assert!(ingress.platform.sent().await.is_empty());

    ingress.platform.release_authorization();
    let followups = ingress.platform.wait_for_followups(1).await;
    assert_eq!(followups.len(), 1);
    let (handle, content) = &followups[0];
    assert_eq!(handle.application_id, "777");
    assert_eq!(handle.token, "tok-1");
    assert!(content.starts_with("✅ Role selector created!"));
    assert_eq!(ingress.store.len().await, 1);
    Ok(())
}

#[tokio::test]
async fn selections_with_a_token_reply_through_the_followup() -> Result<()> {
    let ingress = ingress(guild_platform(), DemiseRuntimeConfig::default(), None);
    ingress.store.mark_ready();

    let (_, body) = post(ingress.app, &with_token(selection(&["12"]), "tok-2"), None).await?;

    assert_eq!(body, json!({"type": 5, "data": {"flags": 64}}));
    let followups = ingress.platform.wait_for_followups(1).await;
    assert_eq!(followups.len(), 1);
    assert_eq!(followups[0].1, "✅ Added: <@&12>");
    assert!(
        ingress
            .platform
            .roles_of(UserId(MEMBER))
            .await
            .contains(&RoleRef(12))
    );
    Ok(())
}

#[tokio::test]
async fn size_commands_answer_inline_even_with_a_token() -> Result<()> {
    let platform = guild_platform()
        .with_member(UserId(70), &[24])
        .with_member(UserId(71), &[21]);
    let ingress = ingress(platform, DemiseRuntimeConfig::default(), None);
    let payload = with_token(
        command("poke", 70, &json!([{"name": "user", "value": "71"}])),
        "tok-3",
    );

    let (_, body) = post(ingress.app, &payload, None).await?;

    assert_eq!(body["type"], 4);
    assert_eq!(body["data"]["content"], "👉 <@70> has poked <@71>!");
    assert!(ingress.platform.followups().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn payload_without_required_fields_is_a_bad_request() -> Result<()> {
    let ingress = ingress(guild_platform(), DemiseRuntimeConfig::default(), None);
    let (status, _) = post(ingress.app, &json!({"type": 2, "data": {}}), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn selector_commands_require_a_moderator() -> Result<()> {
    let ingress = ingress(guild_platform(), DemiseRuntimeConfig::default(), None);
    let options = json!([
        {"name": "type", "value": "single"},
        {"name": "message", "value": "Pick"},
        {"name": "roles", "value": "<@&11> <@&12>"}
    ]);

    let (_, denied) = post(
        ingress.app.clone(),
        &command("create_role_selector", MEMBER, &options),
        None,
    )
    .await?;
    assert_eq!(denied["type"], 4);
    assert_eq!(denied["data"]["flags"], 64);
    assert!(
        denied["data"]["content"]
            .as_str()
            .unwrap_or_default()
            .contains("Only the server owner or administrators")
    );
    assert!(ingress.platform.sent().await.is_empty());

    let (_, created) = post(
        ingress.app,
        &command("create_role_selector", MODERATOR, &options),
        None,
    )
    .await?;
    assert!(
        created["data"]["content"]
            .as_str()
            .unwrap_or_default()
            .starts_with("✅ Role selector created!")
    );
    assert_eq!(ingress.platform.sent().await.len(), 1);
    assert_eq!(ingress.store.len().await, 1);
    Ok(())
}

#[tokio::test]
async fn selection_before_recovery_gets_loading_reply() -> Result<()> {
    let ingress = ingress(guild_platform(), DemiseRuntimeConfig::default(), None);

    let (status, body) = post(ingress.app, &selection(&["11"]), None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["content"], NOT_READY_REPLY);
    assert_eq!(body["data"]["flags"], 64);
    assert!(ingress.platform.role_calls().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn selection_after_recovery_updates_roles() -> Result<()> {
    let ingress = ingress(guild_platform(), DemiseRuntimeConfig::default(), None);
    ingress.store.mark_ready();

    let (_, body) = post(ingress.app, &selection(&["12"]), None).await?;

    assert_eq!(body["data"]["content"], "✅ Added: <@&12>");
    assert!(
        ingress
            .platform
            .roles_of(UserId(MEMBER))
            .await
            .contains(&RoleRef(12))
    );
    Ok(())
}

#[tokio::test]
async fn interactions_from_unserved_guilds_are_refused() -> Result<()> {
    let config = DemiseRuntimeConfig {
        allowed_guilds: vec![GuildId(99)],
        ..DemiseRuntimeConfig::default()
    };
    let ingress = ingress(guild_platform(), config, None);
    ingress.store.mark_ready();

    let (_, body) = post(ingress.app, &selection(&["12"]), None).await?;

    assert_eq!(
        body["data"]["content"],
        "❌ This server is not configured for this bot."
    );
    assert!(ingress.platform.role_calls().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn size_commands_reply_publicly() -> Result<()> {
    let platform = guild_platform()
        .with_member(UserId(70), &[24])
        .with_member(UserId(71), &[21]);
    let ingress = ingress(platform, DemiseRuntimeConfig::default(), None);

    let (_, body) = post(
        ingress.app,
        &command("devour", 70, &json!([{"name": "user", "value": "71"}])),
        None,
    )
    .await?;

    assert_eq!(body["data"]["content"], "👄 <@70> has devoured <@71>!");
    assert!(body["data"].get("flags").is_none());
    assert!(
        ingress
            .platform
            .roles_of(UserId(71))
            .await
            .contains(&RoleRef(25))
    );
    Ok(())
}

#[tokio::test]
async fn unknown_commands_are_reported() -> Result<()> {
    let ingress = ingress(guild_platform(), DemiseRuntimeConfig::default(), None);
    let (_, body) = post(ingress.app, &command("dance", MEMBER, &json!([])), None).await?;
    assert_eq!(body["data"]["content"], "❌ Unknown command `dance`.");
    Ok(())
}

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use serde_json::Value;

use super::config::DEFAULT_INGRESS_PATH;
use super::dispatch::InteractionRouter;
use super::parsing::{interaction_handle, parse_interaction};
use super::signature::{DISCORD_SIGNATURE_HEADER, DISCORD_TIMESTAMP_HEADER, InteractionVerifier};

pub const DEMISE_INGRESS_SECRET_HEADER: &str = "x-demise-ingress-token";

/// Checks applied to every request before it is parsed.
#[derive(Debug, Clone, Default)]
pub struct IngressAuth {
    /// Discord signature check; `None` only in tests and behind trusted proxies.
    pub verifier: Option<InteractionVerifier>,
    /// Extra shared secret expected in [`DEMISE_INGRESS_SECRET_HEADER`].
    pub secret_token: Option<String>,
}

/// Built ingress components for handler testing and runtime wiring.
pub struct DemiseIngressApp {
    /// Axum router serving the interactions endpoint.
    pub app: Router,
    /// Normalized ingress route path.
    pub path: String,
}

/// Build the interactions ingress app.
pub fn build_interactions_app(
    router: Arc<InteractionRouter>,
    ingress_path: &str,
    auth: IngressAuth,
) -> DemiseIngressApp {
    let state = IngressState {
        router,
        verifier: auth.verifier,
        secret_token: auth.secret_token.filter(|token| !token.trim().is_empty()),
    };
    let path = normalize_ingress_path(ingress_path);
    let app = Router::new()
        .route(&path, post(interactions_handler))
        .with_state(state);
    DemiseIngressApp { app, path }
}

#[derive(Clone)]
struct IngressState {
    router: Arc<InteractionRouter>,
    verifier: Option<InteractionVerifier>,
    secret_token: Option<String>,
}

fn normalize_ingress_path(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        DEFAULT_INGRESS_PATH.to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

async fn interactions_handler(
    State(state): State<IngressState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, (StatusCode, String)> {
    if let Some(verifier) = &state.verifier {
        let verified = match (
            header(&headers, DISCORD_SIGNATURE_HEADER),
            header(&headers, DISCORD_TIMESTAMP_HEADER),
        ) {
            (Some(signature), Some(timestamp)) => verifier.verify(timestamp, &body, signature),
            _ => false,
        };
        if !verified {
            tracing::warn!(
                event = "discord.ingress.bad_signature",
                "rejected interaction with missing or invalid signature"
            );
            return Err((
                StatusCode::UNAUTHORIZED,
                "invalid request signature".to_string(),
            ));
        }
    }

    if let Some(expected) = state.secret_token.as_deref()
        && header(&headers, DEMISE_INGRESS_SECRET_HEADER).unwrap_or_default() != expected
    {
        tracing::warn!(
            event = "discord.ingress.unauthorized",
            "rejected interaction with invalid ingress token"
        );
        return Err((
            StatusCode::UNAUTHORIZED,
            "invalid ingress secret token".to_string(),
        ));
    }

    let Some((interaction, event)) = serde_json::from_slice::<Value>(&body)
        .ok()
        .and_then(|event| parse_interaction(&event).map(|interaction| (interaction, event)))
    else {
        tracing::debug!(
            event = "discord.ingress.malformed",
            "interaction payload missing required fields"
        );
        return Err((
            StatusCode::BAD_REQUEST,
            "unsupported interaction payload".to_string(),
        ));
    };
    let handle = interaction_handle(&event);
    Ok(Json(state.router.handle(interaction, handle).await))
}

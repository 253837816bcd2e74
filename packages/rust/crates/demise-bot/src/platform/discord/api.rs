use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::platform::PlatformError;

use super::constants::ERROR_BODY_PREVIEW_CHARS;
use super::platform::DiscordPlatform;

impl DiscordPlatform {
    pub(super) fn api_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub(super) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.api_url(path))
            .header("Authorization", format!("Bot {}", self.bot_token))
    }

    /// Send once and map non-success statuses onto [`PlatformError`].
    pub(super) async fn execute(
        &self,
        request: RequestBuilder,
        operation: &str,
    ) -> Result<Response, PlatformError> {
        let response = request.send().await.map_err(|error| {
            PlatformError::Transport(format!("discord {operation} request failed: {error}"))
        })?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let preview = body.chars().take(ERROR_BODY_PREVIEW_CHARS).collect::<String>();
        tracing::debug!(
            event = "discord.api.request.failed",
            operation,
            status = status.as_u16(),
            body = %preview,
            "discord api request failed"
        );
        Err(match status {
            StatusCode::FORBIDDEN => PlatformError::Forbidden(format!("{operation}: {preview}")),
            StatusCode::NOT_FOUND => PlatformError::NotFound(format!("{operation}: {preview}")),
            _ => PlatformError::Http {
                status: status.as_u16(),
                body: preview,
            },
        })
    }

    pub(super) async fn execute_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        operation: &str,
    ) -> Result<T, PlatformError> {
        let response = self.execute(request, operation).await?;
        response.json::<T>().await.map_err(|error| {
            PlatformError::Decode(format!("discord {operation} response: {error}"))
        })
    }
}

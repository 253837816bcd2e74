use crate::selector::{DEFAULT_HISTORY_LIMIT, GuildId, MAX_HISTORY_LIMIT};

use super::signature::InteractionVerifier;

pub const DEFAULT_INGRESS_BIND: &str = "0.0.0.0:8082";
pub const DEFAULT_INGRESS_PATH: &str = "/discord/interactions";

/// Resolved runtime configuration for the interaction ingress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemiseRuntimeConfig {
    pub bind_addr: String,
    pub ingress_path: String,
    /// Discord signature check on every request.
    pub verifier: Option<InteractionVerifier>,
    pub secret_token: Option<String>,
    /// Guilds served and scanned; empty means every guild the bot is in.
    pub allowed_guilds: Vec<GuildId>,
    pub history_limit: usize,
}

impl DemiseRuntimeConfig {
    pub fn with_history_limit(mut self, history_limit: usize) -> Self {
        self.history_limit = history_limit.clamp(1, MAX_HISTORY_LIMIT);
        self
    }

    pub fn allows_guild(&self, guild: GuildId) -> bool {
        self.allowed_guilds.is_empty() || self.allowed_guilds.contains(&guild)
    }
}

impl Default for DemiseRuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_INGRESS_BIND.to_string(),
            ingress_path: DEFAULT_INGRESS_PATH.to_string(),
            verifier: None,
            secret_token: None,
            allowed_guilds: Vec::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

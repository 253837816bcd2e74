//! Create / update / list / cleanup for role selectors.
//!
//! Callers check moderator authorization before invoking any of these.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;

use crate::platform::{HostPlatform, OutboundMessage, PlatformError};

use super::codec::{SELECTOR_TITLE, new_marker_tag, render_widget};
use super::error::SelectorError;
use super::recovery::{ChannelScan, MAX_HISTORY_LIMIT, scan_channel};
use super::request::SelectorRequest;
use super::store::{Registration, WidgetStore};
use super::types::{ChannelId, GuildId, MessageId, RoleRef, SelectorConfig, WidgetRecord};

/// What a create or update published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorSummary {
    pub record: WidgetRecord,
    /// Requested roles the guild does not know; left out of the widget.
    pub dropped_roles: Vec<RoleRef>,
    #[serde(skip)]
    pub registration: Registration,
}

impl SelectorSummary {
    pub fn reply(&self, verb: &str) -> String {
        let mut reply = format!(
            "✅ Role selector {verb}! ({} choice, {} role{})",
            self.record.config.mode(),
            self.record.config.offered_roles().len(),
            if self.record.config.offered_roles().len() == 1 {
                ""
            } else {
                "s"
            }
        );
        if !self.dropped_roles.is_empty() {
            let dropped = self
                .dropped_roles
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            reply.push_str(&format!("\nℹ️ Ignored unknown roles: {dropped}"));
        }
        reply
    }
}

/// Totals for a cleanup pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub inspected: usize,
    pub kept: usize,
    pub deleted: usize,
    pub failed: usize,
}

impl CleanupReport {
    pub fn reply(&self) -> String {
        let mut reply = if self.deleted == 0 {
            format!(
                "ℹ️ No broken role selectors found in the last {} messages.",
                self.inspected
            )
        } else {
            format!(
                "🗑️ Deleted {} broken role selector{}.",
                self.deleted,
                if self.deleted == 1 { "" } else { "s" }
            )
        };
        if self.failed > 0 {
            reply.push_str(&format!(
                "\n⚠️ {} could not be deleted (missing permissions?).",
                self.failed
            ));
        }
        reply
    }
}

/// Reply text for `list_role_selectors`.
pub fn render_selector_list(records: &[WidgetRecord]) -> String {
    if records.is_empty() {
        return "ℹ️ No role selectors in this channel.".to_string();
    }
    let mut lines = vec![format!("📋 {} role selector(s):", records.len())];
    for record in records {
        let roles = record
            .config
            .offered_roles()
            .iter()
            .map(|role| role.mention())
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(format!(
            "• `{}` ({}): {roles}",
            record.message_id,
            record.config.mode()
        ));
    }
    lines.join("\n")
}

/// Build the embed + widget message for a config.
pub fn render_selector_message(
    config: &SelectorConfig,
    description: &str,
    tag: &str,
    role_names: &HashMap<RoleRef, String>,
) -> OutboundMessage {
    OutboundMessage {
        title: SELECTOR_TITLE.to_string(),
        description: description.to_string(),
        footer: Some(format!("{} choice", config.mode())),
        widget: Some(render_widget(config, tag, |role| {
            role_names
                .get(&role)
                .cloned()
                .unwrap_or_else(|| role.to_string())
        })),
    }
}

/// Orchestrates selector operations against the store and the platform.
pub struct SelectorLifecycle {
    platform: Arc<dyn HostPlatform>,
    store: Arc<WidgetStore>,
    history_limit: usize,
}

impl SelectorLifecycle {
    pub fn new(
        platform: Arc<dyn HostPlatform>,
        store: Arc<WidgetStore>,
        history_limit: usize,
    ) -> Self {
        Self {
            platform,
            store,
            history_limit: history_limit.clamp(1, MAX_HISTORY_LIMIT),
        }
    }

    pub async fn create(
        &self,
        guild: GuildId,
        channel: ChannelId,
        request: &SelectorRequest,
    ) -> Result<SelectorSummary, SelectorError> {
        let (config, role_names, dropped_roles) = self.resolve_config(guild, request).await?;
        let message =
            render_selector_message(&config, &request.description, &new_marker_tag(), &role_names);
        let message_id = self.platform.send_message(channel, &message).await?;
        let record = WidgetRecord::new(message_id, channel, config);
        let registration = self.store.register(record.clone()).await;
        tracing::info!(
            event = "selector.lifecycle.created",
            channel_id = %channel,
            message_id = %message_id,
            mode = %record.config.mode(),
            roles = record.config.offered_roles().len(),
            "role selector created"
        );
        Ok(SelectorSummary {
            record,
            dropped_roles,
            registration,
        })
    }

    /// Re-render an existing selector in place with a new config.
    pub async fn update(
        &self,
        guild: GuildId,
        channel: ChannelId,
        message_id: MessageId,
        request: &SelectorRequest,
    ) -> Result<SelectorSummary, SelectorError> {
        let (config, role_names, dropped_roles) = self.resolve_config(guild, request).await?;
        if !self.is_known_selector(channel, message_id).await? {
            return Err(SelectorError::UnknownSelector(message_id));
        }
        let message =
            render_selector_message(&config, &request.description, &new_marker_tag(), &role_names);
        match self
            .platform
            .edit_message(channel, message_id, &message)
            .await
        {
            Ok(()) => {}
            Err(PlatformError::NotFound(reason)) => {
                self.store.forget(message_id).await;
                tracing::info!(
                    event = "selector.lifecycle.forgotten",
                    channel_id = %channel,
                    message_id = %message_id,
                    reason = %reason,
                    "selector message is gone; dropped its record"
                );
                return Err(SelectorError::UnknownSelector(message_id));
            }
            Err(error) => return Err(error.into()),
        }
        let record = WidgetRecord::new(message_id, channel, config);
        let registration = self.store.register(record.clone()).await;
        tracing::info!(
            event = "selector.lifecycle.updated",
            channel_id = %channel,
            message_id = %message_id,
            registration = ?registration,
            "role selector updated"
        );
        Ok(SelectorSummary {
            record,
            dropped_roles,
            registration,
        })
    }

    /// Selectors in `channel`, reconciled against recent history.
    ///
    /// Records whose message fell inside the scanned window but was not found
    /// there are forgotten. Records older than the window are kept.
    pub async fn list(&self, channel: ChannelId) -> Result<Vec<WidgetRecord>, SelectorError> {
        let scan = self.rescan(channel).await?;
        let live = scan
            .selectors
            .iter()
            .filter(|selector| selector.decoded.is_ok())
            .map(|selector| selector.message_id)
            .collect::<HashSet<_>>();
        for record in self.store.records_in_channel(channel).await {
            if scan.covers(record.message_id) && !live.contains(&record.message_id) {
                self.store.forget(record.message_id).await;
                tracing::info!(
                    event = "selector.lifecycle.forgotten",
                    channel_id = %channel,
                    message_id = %record.message_id,
                    "selector message no longer in history; dropped its record"
                );
            }
        }
        Ok(self.store.records_in_channel(channel).await)
    }

    /// Delete own selector messages whose marker is missing or no longer
    /// decodes. Valid selectors found on the way are registered.
    pub async fn cleanup(&self, channel: ChannelId) -> Result<CleanupReport, SelectorError> {
        let own_id = self.platform.current_user_id().await?;
        let scan = scan_channel(self.platform.as_ref(), own_id, channel, self.history_limit).await?;
        let mut report = CleanupReport {
            inspected: scan.inspected,
            ..CleanupReport::default()
        };
        for selector in scan.selectors {
            let decode_error = match selector.decoded {
                Ok(config) => {
                    self.store
                        .register(WidgetRecord::new(selector.message_id, channel, config))
                        .await;
                    report.kept += 1;
                    continue;
                }
                Err(error) => error,
            };
            match self
                .platform
                .delete_message(channel, selector.message_id)
                .await
            {
                Ok(()) => {
                    self.store.forget(selector.message_id).await;
                    report.deleted += 1;
                    tracing::info!(
                        event = "selector.lifecycle.cleanup.deleted",
                        channel_id = %channel,
                        message_id = %selector.message_id,
                        reason = %decode_error,
                        "deleted broken role selector"
                    );
                }
                Err(error) => {
                    report.failed += 1;
                    tracing::warn!(
                        event = "selector.lifecycle.cleanup.failed",
                        channel_id = %channel,
                        message_id = %selector.message_id,
                        error = %error,
                        "failed to delete broken role selector"
                    );
                }
            }
        }
        Ok(report)
    }

    async fn rescan(&self, channel: ChannelId) -> Result<ChannelScan, SelectorError> {
        let own_id = self.platform.current_user_id().await?;
        let scan = scan_channel(self.platform.as_ref(), own_id, channel, self.history_limit).await?;
        for selector in &scan.selectors {
            if let Ok(config) = &selector.decoded {
                self.store
                    .register(WidgetRecord::new(
                        selector.message_id,
                        channel,
                        config.clone(),
                    ))
                    .await;
            }
        }
        Ok(scan)
    }

    async fn is_known_selector(
        &self,
        channel: ChannelId,
        message_id: MessageId,
    ) -> Result<bool, SelectorError> {
        if let Some(record) = self.store.lookup(message_id).await {
            return Ok(record.channel_id == channel);
        }
        self.rescan(channel).await?;
        Ok(self
            .store
            .lookup(message_id)
            .await
            .is_some_and(|record| record.channel_id == channel))
    }

    /// Keep only roles the guild knows, then validate.
    async fn resolve_config(
        &self,
        guild: GuildId,
        request: &SelectorRequest,
    ) -> Result<(SelectorConfig, HashMap<RoleRef, String>, Vec<RoleRef>), SelectorError> {
        // Shape errors are reported before touching the platform.
        SelectorConfig::new(request.roles.clone(), request.mode)?;
        let role_names = self
            .platform
            .guild_roles(guild)
            .await?
            .into_iter()
            .map(|role| (role.id, role.name))
            .collect::<HashMap<_, _>>();
        let (known, dropped): (Vec<RoleRef>, Vec<RoleRef>) = request
            .roles
            .iter()
            .partition(|role| role_names.contains_key(role));
        let config = SelectorConfig::new(known, request.mode)?;
        Ok((config, role_names, dropped))
    }
}

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;

use crate::platform::{HostPlatform, InteractionHandle};
use crate::selector::{
    ChannelId, GuildId, SelectionHandler, SelectorError, SelectorLifecycle, SelectorRequest,
    UserId, WidgetStore, parse_message_id, render_selector_list,
};
use crate::size::{SizeAction, SizeActor, SizeCommands, SizeReply};

use super::config::DemiseRuntimeConfig;
use super::parsing::{CommandInvocation, InboundInteraction};
use super::reply::{InteractionReply, InteractionResponse};

const NOT_MODERATOR_REPLY: &str =
    "❌ Only the server owner or administrators can manage role selectors.";
const GUILD_ONLY_REPLY: &str = "❌ This command only works inside a server.";
const GUILD_NOT_SERVED_REPLY: &str = "❌ This server is not configured for this bot.";
const SELECTOR_COMMANDS: [&str; 4] = [
    "create_role_selector",
    "update_role_selector",
    "list_role_selectors",
    "cleanup_role_selectors",
];

#[derive(Debug, Clone, Copy)]
enum SizeCommand<'a> {
    Interact(SizeAction),
    Revive,
    ChangeSize(&'a str),
}

/// Routes parsed interactions to the selector and size handlers.
///
/// Selector commands and selections may need several platform round trips.
/// When the interaction carries a token they are acknowledged with a deferred
/// ephemeral response and finished in a spawned task that edits it.
pub struct InteractionRouter {
    platform: Arc<dyn HostPlatform>,
    lifecycle: SelectorLifecycle,
    selection: SelectionHandler,
    size: SizeCommands,
    config: DemiseRuntimeConfig,
}

impl InteractionRouter {
    pub fn new(
        platform: Arc<dyn HostPlatform>,
        store: Arc<WidgetStore>,
        config: DemiseRuntimeConfig,
    ) -> Self {
        Self {
            lifecycle: SelectorLifecycle::new(
                Arc::clone(&platform),
                Arc::clone(&store),
                config.history_limit,
            ),
            selection: SelectionHandler::new(Arc::clone(&platform), store),
            size: SizeCommands::new(Arc::clone(&platform)),
            platform,
            config,
        }
    }

    /// Interaction response body for `interaction`.
    pub async fn handle(
        self: &Arc<Self>,
        interaction: InboundInteraction,
        handle: Option<InteractionHandle>,
    ) -> Value {
        let response = match interaction {
            InboundInteraction::Ping => InteractionResponse::Pong,
            InboundInteraction::Command(command) => self.handle_command(command, handle).await,
            InboundInteraction::Selection(submission) => {
                if !self.config.allows_guild(submission.guild_id) {
                    return InteractionResponse::from(InteractionReply::ephemeral(
                        GUILD_NOT_SERVED_REPLY,
                    ))
                    .to_json();
                }
                let router = Arc::clone(self);
                self.respond(handle, async move {
                    let reply = router.selection.handle(&submission).await;
                    InteractionReply::ephemeral(reply.content)
                })
                .await
            }
            InboundInteraction::Ignored { kind } => {
                tracing::debug!(
                    event = "discord.ingress.ignored",
                    kind,
                    "ignoring unsupported interaction"
                );
                InteractionReply::ephemeral("ℹ️ Nothing to do here.").into()
            }
        };
        response.to_json()
    }

    /// Run `work` inline, or defer and deliver its reply through `handle`.
    async fn respond<F>(&self, handle: Option<InteractionHandle>, work: F) -> InteractionResponse
    where
        F: Future<Output = InteractionReply> + Send + 'static,
    {
        let Some(handle) = handle else {
            return work.await.into();
        };
        let platform = Arc::clone(&self.platform);
        tokio::spawn(async move {
            let reply = work.await;
            if let Err(error) = platform.edit_original_response(&handle, &reply.content).await {
                tracing::warn!(
                    event = "discord.ingress.followup.failed",
                    application_id = %handle.application_id,
                    error = %error,
                    "failed to deliver deferred interaction reply"
                );
            }
        });
        InteractionResponse::Deferred { ephemeral: true }
    }

    async fn handle_command(
        self: &Arc<Self>,
        command: CommandInvocation,
        handle: Option<InteractionHandle>,
    ) -> InteractionResponse {
        let Some(guild) = command.guild_id else {
            return InteractionReply::ephemeral(GUILD_ONLY_REPLY).into();
        };
        if !self.config.allows_guild(guild) {
            return InteractionReply::ephemeral(GUILD_NOT_SERVED_REPLY).into();
        }
        tracing::info!(
            event = "discord.ingress.command",
            command = %command.name,
            guild_id = %guild,
            channel_id = %command.channel_id,
            user_id = %command.user_id,
            "handling slash command"
        );

        if SELECTOR_COMMANDS.contains(&command.name.as_str()) {
            let router = Arc::clone(self);
            return self
                .respond(handle, async move {
                    router.selector_command(guild, &command).await
                })
                .await;
        }
        let reply = if let Ok(action) = command.name.parse::<SizeAction>() {
            self.size_command(guild, &command, SizeCommand::Interact(action))
                .await
        } else {
            match command.name.as_str() {
                "revive" => {
                    self.size_command(guild, &command, SizeCommand::Revive)
                        .await
                }
                "change_size" => {
                    let size_role = command.option("size_role").unwrap_or_default();
                    self.size_command(guild, &command, SizeCommand::ChangeSize(size_role))
                        .await
                }
                other => InteractionReply::ephemeral(format!("❌ Unknown command `{other}`.")),
            }
        };
        reply.into()
    }

    async fn selector_command(
        &self,
        guild: GuildId,
        command: &CommandInvocation,
    ) -> InteractionReply {
        match self.platform.is_authorized(guild, command.user_id).await {
            Ok(true) => {}
            Ok(false) => return InteractionReply::ephemeral(NOT_MODERATOR_REPLY),
            Err(error) => {
                return InteractionReply::ephemeral(SelectorError::from(error).user_message());
            }
        }
        let channel = command.channel_id;
        let result = match command.name.as_str() {
            "create_role_selector" => self.create_selector(guild, channel, command).await,
            "update_role_selector" => self.update_selector(guild, channel, command).await,
            "list_role_selectors" => self
                .lifecycle
                .list(channel)
                .await
                .map(|records| render_selector_list(&records)),
            _ => self
                .lifecycle
                .cleanup(channel)
                .await
                .map(|report| report.reply()),
        };
        match result {
            Ok(content) => InteractionReply::ephemeral(content),
            Err(error) => {
                tracing::warn!(
                    event = "discord.ingress.command.failed",
                    command = %command.name,
                    channel_id = %channel,
                    error = %error,
                    "role selector command failed"
                );
                InteractionReply::ephemeral(error.user_message())
            }
        }
    }

    async fn create_selector(
        &self,
        guild: GuildId,
        channel: ChannelId,
        command: &CommandInvocation,
    ) -> Result<String, SelectorError> {
        let request = selector_request(command)?;
        let summary = self.lifecycle.create(guild, channel, &request).await?;
        Ok(summary.reply("created"))
    }

    async fn update_selector(
        &self,
        guild: GuildId,
        channel: ChannelId,
        command: &CommandInvocation,
    ) -> Result<String, SelectorError> {
        let message_id = parse_message_id(command.option("message_id").unwrap_or_default())?;
        let request = selector_request(command)?;
        let summary = self
            .lifecycle
            .update(guild, channel, message_id, &request)
            .await?;
        Ok(summary.reply("updated"))
    }

    async fn size_command(
        &self,
        guild: GuildId,
        command: &CommandInvocation,
        size_command: SizeCommand<'_>,
    ) -> InteractionReply {
        let Some(target) = command
            .option("user")
            .and_then(|raw| raw.parse::<UserId>().ok())
        else {
            return InteractionReply::ephemeral("❌ Pick a member to target.");
        };
        let actor = SizeActor {
            guild_id: guild,
            user_id: command.user_id,
            roles: command.member_roles.clone(),
        };
        let result = match size_command {
            SizeCommand::Interact(action) => self.size.interact(&actor, target, action).await,
            SizeCommand::Revive => self.size.revive(&actor, target).await,
            SizeCommand::ChangeSize(size_role) => {
                self.size.change_size(&actor, target, size_role).await
            }
        };
        match result {
            Ok(SizeReply {
                content,
                ephemeral: true,
            }) => InteractionReply::ephemeral(content),
            Ok(SizeReply { content, .. }) => InteractionReply::public(content),
            Err(error) => {
                tracing::warn!(
                    event = "discord.ingress.size.failed",
                    command = %command.name,
                    guild_id = %guild,
                    error = %error,
                    "size command failed"
                );
                InteractionReply::ephemeral(format!(
                    "❌ Discord rejected the request: {}.",
                    error.reason()
                ))
            }
        }
    }
}

fn selector_request(command: &CommandInvocation) -> Result<SelectorRequest, SelectorError> {
    Ok(SelectorRequest::parse(
        command.option("type").unwrap_or_default(),
        command.option("message").unwrap_or_default(),
        command.option("roles").unwrap_or_default(),
    )?)
}

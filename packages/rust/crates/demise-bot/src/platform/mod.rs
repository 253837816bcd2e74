//! Host platform abstraction consumed by the selector core and size commands.
//!
//! The trait mirrors the handful of Discord REST calls the bot needs. The
//! rendered message + widget on the platform is the only durable state.

mod discord;
mod error;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::selector::{ChannelId, GuildId, MemberRoleSet, MessageId, RoleRef, UserId};

pub use discord::{DISCORD_DEFAULT_API_BASE, DISCORD_MAX_HISTORY_PAGE, DiscordPlatform};
pub(crate) use discord::parse_select_widgets;
pub use error::PlatformError;

/// One choice inside a select widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetOption {
    pub label: String,
    pub value: String,
}

/// A string select menu attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectWidget {
    pub custom_id: String,
    pub placeholder: Option<String>,
    pub min_values: u8,
    pub max_values: u8,
    pub options: Vec<WidgetOption>,
}

/// Message content the bot publishes or edits in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub title: String,
    pub description: String,
    pub footer: Option<String>,
    pub widget: Option<SelectWidget>,
}

/// A message read back from channel history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryMessage {
    pub id: MessageId,
    pub author_id: UserId,
    pub content: String,
    /// Title of the first embed, if any.
    pub embed_title: Option<String>,
    pub widgets: Vec<SelectWidget>,
}

/// Addresses the original response of one interaction.
#[derive(Clone, PartialEq, Eq)]
pub struct InteractionHandle {
    pub application_id: String,
    /// Interaction token; valid for 15 minutes after the interaction.
    pub token: String,
}

impl std::fmt::Debug for InteractionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionHandle")
            .field("application_id", &self.application_id)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Guild role metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildRole {
    pub id: RoleRef,
    pub name: String,
    pub permissions: u64,
}

/// Minimum operations the bot needs from the chat platform.
#[async_trait]
pub trait HostPlatform: Send + Sync {
    /// Identity the bot posts as; used to recognise its own selectors.
    async fn current_user_id(&self) -> Result<UserId, PlatformError>;

    async fn send_message(
        &self,
        channel: ChannelId,
        message: &OutboundMessage,
    ) -> Result<MessageId, PlatformError>;

    async fn edit_message(
        &self,
        channel: ChannelId,
        message_id: MessageId,
        message: &OutboundMessage,
    ) -> Result<(), PlatformError>;

    async fn delete_message(
        &self,
        channel: ChannelId,
        message_id: MessageId,
    ) -> Result<(), PlatformError>;

    /// One page of history, newest first, strictly older than `before` when set.
    ///
    /// Callers paginate; `limit` is clamped to the platform page size.
    async fn fetch_messages(
        &self,
        channel: ChannelId,
        before: Option<MessageId>,
        limit: usize,
    ) -> Result<Vec<HistoryMessage>, PlatformError>;

    async fn get_member_roles(
        &self,
        guild: GuildId,
        member: UserId,
    ) -> Result<MemberRoleSet, PlatformError>;

    async fn add_role(
        &self,
        guild: GuildId,
        member: UserId,
        role: RoleRef,
    ) -> Result<(), PlatformError>;

    async fn remove_role(
        &self,
        guild: GuildId,
        member: UserId,
        role: RoleRef,
    ) -> Result<(), PlatformError>;

    async fn guild_roles(&self, guild: GuildId) -> Result<Vec<GuildRole>, PlatformError>;

    /// Owner-or-admin predicate for moderator commands.
    async fn is_authorized(&self, guild: GuildId, member: UserId) -> Result<bool, PlatformError>;

    async fn list_guilds(&self) -> Result<Vec<GuildId>, PlatformError>;

    async fn list_text_channels(&self, guild: GuildId) -> Result<Vec<ChannelId>, PlatformError>;

    /// Replace the content of a deferred interaction response.
    async fn edit_original_response(
        &self,
        interaction: &InteractionHandle,
        content: &str,
    ) -> Result<(), PlatformError>;
}

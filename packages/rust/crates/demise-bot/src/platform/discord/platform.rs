//! Discord-backed host platform.

use async_trait::async_trait;
use reqwest::Method;
use tokio::sync::OnceCell;

use crate::platform::{
    GuildRole, HistoryMessage, HostPlatform, InteractionHandle, OutboundMessage, PlatformError,
};
use crate::selector::{ChannelId, GuildId, MemberRoleSet, MessageId, RoleRef, UserId};

use super::client::build_discord_http_client;
use super::constants::{
    DISCORD_DEFAULT_API_BASE, DISCORD_MAX_HISTORY_PAGE, PERMISSION_ADMINISTRATOR,
};
use super::wire::{
    WireChannel, WireGuild, WireId, WireMember, WireMessage, WireRole, guild_id_list,
    outbound_payload, response_edit_payload,
};

/// Discord REST client implementing [`HostPlatform`].
///
/// `is_authorized` grants moderator commands to configured admin users, the
/// guild owner, and members holding a role with the `ADMINISTRATOR` bit.
pub struct DiscordPlatform {
    pub(super) bot_token: String,
    pub(super) api_base_url: String,
    pub(super) client: reqwest::Client,
    admin_users: Vec<UserId>,
    current_user: OnceCell<UserId>,
}

impl DiscordPlatform {
    pub fn new(bot_token: String) -> Self {
        Self::new_with_base_url(bot_token, DISCORD_DEFAULT_API_BASE.to_string())
    }

    /// Custom API base URL (tests, proxies).
    pub fn new_with_base_url(bot_token: String, api_base_url: String) -> Self {
        Self::new_with_base_url_and_client(bot_token, api_base_url, build_discord_http_client())
    }

    #[doc(hidden)]
    pub fn new_with_base_url_and_client(
        bot_token: String,
        api_base_url: String,
        client: reqwest::Client,
    ) -> Self {
        Self {
            bot_token,
            api_base_url,
            client,
            admin_users: Vec::new(),
            current_user: OnceCell::new(),
        }
    }

    /// Users always allowed to run moderator commands.
    #[must_use]
    pub fn with_admin_users(mut self, admin_users: Vec<UserId>) -> Self {
        self.admin_users = admin_users;
        self
    }

    async fn guild_owner(&self, guild: GuildId) -> Result<UserId, PlatformError> {
        let wire: WireGuild = self
            .execute_json(
                self.request(Method::GET, &format!("guilds/{guild}")),
                "get guild",
            )
            .await?;
        Ok(UserId(wire.owner_id))
    }
}

#[async_trait]
impl HostPlatform for DiscordPlatform {
    async fn current_user_id(&self) -> Result<UserId, PlatformError> {
        self.current_user
            .get_or_try_init(|| async {
                let wire: WireId = self
                    .execute_json(self.request(Method::GET, "users/@me"), "get current user")
                    .await?;
                Ok(UserId(wire.id))
            })
            .await
            .copied()
    }

    async fn send_message(
        &self,
        channel: ChannelId,
        message: &OutboundMessage,
    ) -> Result<MessageId, PlatformError> {
        let request = self
            .request(Method::POST, &format!("channels/{channel}/messages"))
            .json(&outbound_payload(message));
        let wire: WireId = self.execute_json(request, "send message").await?;
        Ok(MessageId(wire.id))
    }

    async fn edit_message(
        &self,
        channel: ChannelId,
        message_id: MessageId,
        message: &OutboundMessage,
    ) -> Result<(), PlatformError> {
        let request = self
            .request(
                Method::PATCH,
                &format!("channels/{channel}/messages/{message_id}"),
            )
            .json(&outbound_payload(message));
        self.execute(request, "edit message").await.map(|_| ())
    }

    async fn delete_message(
        &self,
        channel: ChannelId,
        message_id: MessageId,
    ) -> Result<(), PlatformError> {
        let request = self.request(
            Method::DELETE,
            &format!("channels/{channel}/messages/{message_id}"),
        );
        self.execute(request, "delete message").await.map(|_| ())
    }

    async fn fetch_messages(
        &self,
        channel: ChannelId,
        before: Option<MessageId>,
        limit: usize,
    ) -> Result<Vec<HistoryMessage>, PlatformError> {
        let limit = limit.clamp(1, DISCORD_MAX_HISTORY_PAGE);
        let mut query = vec![("limit", limit.to_string())];
        if let Some(before) = before {
            query.push(("before", before.to_string()));
        }
        let request = self
            .request(Method::GET, &format!("channels/{channel}/messages"))
            .query(&query);
        let wire: Vec<WireMessage> = self.execute_json(request, "fetch messages").await?;
        Ok(wire.into_iter().map(HistoryMessage::from).collect())
    }

    async fn get_member_roles(
        &self,
        guild: GuildId,
        member: UserId,
    ) -> Result<MemberRoleSet, PlatformError> {
        let wire: WireMember = self
            .execute_json(
                self.request(Method::GET, &format!("guilds/{guild}/members/{member}")),
                "get member",
            )
            .await?;
        Ok(wire.roles.into_iter().map(RoleRef).collect())
    }

    async fn add_role(
        &self,
        guild: GuildId,
        member: UserId,
        role: RoleRef,
    ) -> Result<(), PlatformError> {
        let request = self.request(
            Method::PUT,
            &format!("guilds/{guild}/members/{member}/roles/{role}"),
        );
        self.execute(request, "add member role").await.map(|_| ())
    }

    async fn remove_role(
        &self,
        guild: GuildId,
        member: UserId,
        role: RoleRef,
    ) -> Result<(), PlatformError> {
        let request = self.request(
            Method::DELETE,
            &format!("guilds/{guild}/members/{member}/roles/{role}"),
        );
        self.execute(request, "remove member role").await.map(|_| ())
    }

    async fn guild_roles(&self, guild: GuildId) -> Result<Vec<GuildRole>, PlatformError> {
        let wire: Vec<WireRole> = self
            .execute_json(
                self.request(Method::GET, &format!("guilds/{guild}/roles")),
                "list guild roles",
            )
            .await?;
        Ok(wire.into_iter().map(GuildRole::from).collect())
    }

    async fn is_authorized(&self, guild: GuildId, member: UserId) -> Result<bool, PlatformError> {
        if self.admin_users.contains(&member) {
            return Ok(true);
        }
        if self.guild_owner(guild).await? == member {
            return Ok(true);
        }
        let held = self.get_member_roles(guild, member).await?;
        let roles = self.guild_roles(guild).await?;
        // The @everyone role shares the guild id and applies to every member.
        Ok(roles.iter().any(|role| {
            (held.contains(&role.id) || role.id.get() == guild.get())
                && role.permissions & PERMISSION_ADMINISTRATOR != 0
        }))
    }

    async fn list_guilds(&self) -> Result<Vec<GuildId>, PlatformError> {
        let wire: Vec<WireId> = self
            .execute_json(
                self.request(Method::GET, "users/@me/guilds"),
                "list current user guilds",
            )
            .await?;
        Ok(guild_id_list(wire))
    }

    async fn list_text_channels(&self, guild: GuildId) -> Result<Vec<ChannelId>, PlatformError> {
        let wire: Vec<WireChannel> = self
            .execute_json(
                self.request(Method::GET, &format!("guilds/{guild}/channels")),
                "list guild channels",
            )
            .await?;
        Ok(wire
            .iter()
            .filter_map(WireChannel::message_channel_id)
            .collect())
    }

    async fn edit_original_response(
        &self,
        interaction: &InteractionHandle,
        content: &str,
    ) -> Result<(), PlatformError> {
        let request = self
            .request(
                Method::PATCH,
                &format!(
                    "webhooks/{}/{}/messages/@original",
                    interaction.application_id, interaction.token
                ),
            )
            .json(&response_edit_payload(content));
        self.execute(request, "edit interaction response")
            .await
            .map(|_| ())
    }
}

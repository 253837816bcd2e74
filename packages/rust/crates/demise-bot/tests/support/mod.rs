//! In-memory `HostPlatform` double shared by integration tests.

#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use demise_bot::{
    ChannelId, GuildId, GuildRole, HistoryMessage, HostPlatform, InteractionHandle, MessageId,
    OutboundMessage, PlatformError, RoleRef, SELECTOR_TITLE, SelectWidget, UserId, WidgetOption,
};
use tokio::sync::{Mutex, Notify};

pub const BOT_ID: UserId = UserId(900);
pub const GUILD: GuildId = GuildId(1);
pub const CHANNEL: ChannelId = ChannelId(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleCall {
    Add(UserId, RoleRef),
    Remove(UserId, RoleRef),
}

pub struct MockPlatform {
    own_id: UserId,
    next_message_id: AtomicU64,
    /// Oldest first per channel.
    history: Mutex<HashMap<ChannelId, Vec<HistoryMessage>>>,
    member_roles: Mutex<HashMap<UserId, BTreeSet<RoleRef>>>,
    guild_roles: Vec<GuildRole>,
    moderators: BTreeSet<UserId>,
    guilds: Vec<GuildId>,
    channels: HashMap<GuildId, Vec<ChannelId>>,
    unreadable_channels: BTreeSet<ChannelId>,
    failing_adds: BTreeSet<RoleRef>,
    undeletable: BTreeSet<MessageId>,
    role_calls: Mutex<Vec<RoleCall>>,
    fetch_calls: Mutex<Vec<(ChannelId, Option<MessageId>, usize)>>,
    sent: Mutex<Vec<(ChannelId, OutboundMessage)>>,
    followups: Mutex<Vec<(InteractionHandle, String)>>,
    hold_authorization: bool,
    authorization_release: Notify,
    platform_calls: AtomicU64,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            own_id: BOT_ID,
            next_message_id: AtomicU64::new(5_000),
            history: Mutex::new(HashMap::new()),
            member_roles: Mutex::new(HashMap::new()),
            guild_roles: Vec::new(),
            moderators: BTreeSet::new(),
            guilds: vec![GUILD],
            channels: HashMap::from([(GUILD, vec![CHANNEL])]),
            unreadable_channels: BTreeSet::new(),
            failing_adds: BTreeSet::new(),
            undeletable: BTreeSet::new(),
            role_calls: Mutex::new(Vec::new()),
            fetch_calls: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            followups: Mutex::new(Vec::new()),
            hold_authorization: false,
            authorization_release: Notify::new(),
            platform_calls: AtomicU64::new(0),
        }
    }

    /// Guild roles named `name` with ids `id`.
    pub fn with_roles(mut self, roles: &[(u64, &str)]) -> Self {
        self.guild_roles = roles
            .iter()
            .map(|(id, name)| GuildRole {
                id: RoleRef(*id),
                name: (*name).to_string(),
                permissions: 0,
            })
            .collect();
        self
    }

    pub fn with_moderator(mut self, user: UserId) -> Self {
        self.moderators.insert(user);
        self
    }

    pub fn with_channels(mut self, guild: GuildId, channels: &[ChannelId]) -> Self {
        if !self.guilds.contains(&guild) {
            self.guilds.push(guild);
        }
        self.channels.insert(guild, channels.to_vec());
        self
    }

    pub fn with_unreadable_channel(mut self, channel: ChannelId) -> Self {
        self.unreadable_channels.insert(channel);
        self
    }

    pub fn with_failing_add(mut self, role: RoleRef) -> Self {
        self.failing_adds.insert(role);
        self
    }

    pub fn with_undeletable(mut self, message: MessageId) -> Self {
        self.undeletable.insert(message);
        self
    }

    /// `is_authorized` waits for [`Self::release_authorization`].
    pub fn with_held_authorization(mut self) -> Self {
        self.hold_authorization = true;
        self
    }

    pub fn release_authorization(&self) {
        self.authorization_release.notify_one();
    }

    pub fn with_member(mut self, user: UserId, roles: &[u64]) -> Self {
        self.member_roles
            .get_mut()
            .insert(user, roles.iter().copied().map(RoleRef).collect());
        self
    }

    /// Append a message to `channel` history (newest last).
    pub fn with_history(mut self, channel: ChannelId, message: HistoryMessage) -> Self {
        self.history.get_mut().entry(channel).or_default().push(message);
        self
    }

    pub async fn roles_of(&self, user: UserId) -> BTreeSet<RoleRef> {
        self.member_roles
            .lock()
            .await
            .get(&user)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn role_calls(&self) -> Vec<RoleCall> {
        self.role_calls.lock().await.clone()
    }

    pub async fn fetch_calls(&self) -> Vec<(ChannelId, Option<MessageId>, usize)> {
        self.fetch_calls.lock().await.clone()
    }

    pub async fn sent(&self) -> Vec<(ChannelId, OutboundMessage)> {
        self.sent.lock().await.clone()
    }

    /// Delete a message the way a moderator would in the client.
    pub async fn remove_message(&self, channel: ChannelId, message_id: MessageId) {
        if let Some(messages) = self.history.lock().await.get_mut(&channel) {
            messages.retain(|message| message.id != message_id);
        }
    }

    pub async fn followups(&self) -> Vec<(InteractionHandle, String)> {
        self.followups.lock().await.clone()
    }

    /// Poll until `count` deferred replies were delivered (or a second passed).
    pub async fn wait_for_followups(&self, count: usize) -> Vec<(InteractionHandle, String)> {
        for _ in 0..100 {
            let followups = self.followups().await;
            if followups.len() >= count {
                return followups;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.followups().await
    }

    pub async fn history_of(&self, channel: ChannelId) -> Vec<HistoryMessage> {
        self.history
            .lock()
            .await
            .get(&channel)
            .cloned()
            .unwrap_or_default()
    }

    pub fn platform_calls(&self) -> u64 {
        self.platform_calls.load(Ordering::SeqCst)
    }

    fn count(&self) {
        self.platform_calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// A bot-authored (or other) message carrying one select widget.
pub fn widget_message(
    id: u64,
    author: UserId,
    custom_id: &str,
    role_values: &[&str],
) -> HistoryMessage {
    HistoryMessage {
        id: MessageId(id),
        author_id: author,
        content: String::new(),
        embed_title: None,
        widgets: vec![SelectWidget {
            custom_id: custom_id.to_string(),
            placeholder: None,
            min_values: 1,
            max_values: 1,
            options: role_values
                .iter()
                .map(|value| WidgetOption {
                    label: format!("role {value}"),
                    value: (*value).to_string(),
                })
                .collect(),
        }],
    }
}

pub fn plain_message(id: u64, author: UserId) -> HistoryMessage {
    HistoryMessage {
        id: MessageId(id),
        author_id: author,
        content: "hello".to_string(),
        embed_title: None,
        widgets: Vec::new(),
    }
}

/// A selector embed whose widget row was stripped.
pub fn orphaned_selector_message(id: u64, author: UserId) -> HistoryMessage {
    HistoryMessage {
        id: MessageId(id),
        author_id: author,
        content: String::new(),
        embed_title: Some(SELECTOR_TITLE.to_string()),
        widgets: Vec::new(),
    }
}

#[async_trait]
impl HostPlatform for MockPlatform {
    async fn current_user_id(&self) -> Result<UserId, PlatformError> {
        self.count();
        Ok(self.own_id)
    }

    async fn send_message(
        &self,
        channel: ChannelId,
        message: &OutboundMessage,
    ) -> Result<MessageId, PlatformError> {
        self.count();
        let id = MessageId(self.next_message_id.fetch_add(1, Ordering::SeqCst));
        self.sent.lock().await.push((channel, message.clone()));
        self.history
            .lock()
            .await
            .entry(channel)
            .or_default()
            .push(HistoryMessage {
                id,
                author_id: self.own_id,
                content: message.description.clone(),
                embed_title: Some(message.title.clone()),
                widgets: message.widget.clone().into_iter().collect(),
            });
        Ok(id)
    }

    async fn edit_message(
        &self,
        channel: ChannelId,
        message_id: MessageId,
        message: &OutboundMessage,
    ) -> Result<(), PlatformError> {
        self.count();
        let mut history = self.history.lock().await;
        let existing = history
            .get_mut(&channel)
            .and_then(|messages| messages.iter_mut().find(|m| m.id == message_id))
            .ok_or_else(|| PlatformError::NotFound(format!("message {message_id}")))?;
        existing.content = message.description.clone();
        existing.embed_title = Some(message.title.clone());
        existing.widgets = message.widget.clone().into_iter().collect();
        Ok(())
    }

    async fn delete_message(
        &self,
        channel: ChannelId,
        message_id: MessageId,
    ) -> Result<(), PlatformError> {
        self.count();
        if self.undeletable.contains(&message_id) {
            return Err(PlatformError::Forbidden("missing permissions".to_string()));
        }
        if let Some(messages) = self.history.lock().await.get_mut(&channel) {
            messages.retain(|message| message.id != message_id);
        }
        Ok(())
    }

    async fn fetch_messages(
        &self,
        channel: ChannelId,
        before: Option<MessageId>,
        limit: usize,
    ) -> Result<Vec<HistoryMessage>, PlatformError> {
        self.count();
        self.fetch_calls.lock().await.push((channel, before, limit));
        if self.unreadable_channels.contains(&channel) {
            return Err(PlatformError::Forbidden("missing access".to_string()));
        }
        let history = self.history.lock().await;
        let Some(messages) = history.get(&channel) else {
            return Ok(Vec::new());
        };
        Ok(messages
            .iter()
            .rev()
            .filter(|message| before.is_none_or(|before| message.id < before))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn get_member_roles(
        &self,
        _guild: GuildId,
        member: UserId,
    ) -> Result<BTreeSet<RoleRef>, PlatformError> {
        self.count();
        Ok(self.roles_of(member).await)
    }

    async fn add_role(
        &self,
        _guild: GuildId,
        member: UserId,
        role: RoleRef,
    ) -> Result<(), PlatformError> {
        self.count();
        self.role_calls.lock().await.push(RoleCall::Add(member, role));
        if self.failing_adds.contains(&role) {
            return Err(PlatformError::Forbidden("role above bot".to_string()));
        }
        self.member_roles
            .lock()
            .await
            .entry(member)
            .or_default()
            .insert(role);
        Ok(())
    }

    async fn remove_role(
        &self,
        _guild: GuildId,
        member: UserId,
        role: RoleRef,
    ) -> Result<(), PlatformError> {
        self.count();
        self.role_calls
            .lock()
            .await
            .push(RoleCall::Remove(member, role));
        if let Some(roles) = self.member_roles.lock().await.get_mut(&member) {
            roles.remove(&role);
        }
        Ok(())
    }

    async fn guild_roles(&self, _guild: GuildId) -> Result<Vec<GuildRole>, PlatformError> {
        self.count();
        Ok(self.guild_roles.clone())
    }

    async fn is_authorized(&self, _guild: GuildId, member: UserId) -> Result<bool, PlatformError> {
        self.count();
        if self.hold_authorization {
            self.authorization_release.notified().await;
        }
        Ok(self.moderators.contains(&member))
    }

    async fn list_guilds(&self) -> Result<Vec<GuildId>, PlatformError> {
        self.count();
        Ok(self.guilds.clone())
    }

    async fn list_text_channels(&self, guild: GuildId) -> Result<Vec<ChannelId>, PlatformError> {
        self.count();
        self.channels
            .get(&guild)
            .cloned()
            .ok_or_else(|| PlatformError::NotFound(format!("guild {guild}")))
    }

    async fn edit_original_response(
        &self,
        interaction: &InteractionHandle,
        content: &str,
    ) -> Result<(), PlatformError> {
        self.count();
        self.followups
            .lock()
            .await
            .push((interaction.clone(), content.to_string()));
        Ok(())
    }
}

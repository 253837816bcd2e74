//! Size interactions and the Spellcaster commands.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::platform::{HostPlatform, PlatformError};
use crate::selector::{GuildId, RoleRef, UserId};

use super::actions::SizeAction;
use super::rank::{DEAD_ROLE, SPELLCASTER_ROLE, SizeRank, SizeRoles};

/// Reply for a size command; refusals are private to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeReply {
    pub content: String,
    pub ephemeral: bool,
}

impl SizeReply {
    fn public(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: false,
        }
    }

    fn private(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: true,
        }
    }
}

/// Who invoked a size command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeActor {
    pub guild_id: GuildId,
    pub user_id: UserId,
    /// Roles from the interaction payload, when it carried them.
    pub roles: Option<BTreeSet<RoleRef>>,
}

pub struct SizeCommands {
    platform: Arc<dyn HostPlatform>,
}

impl SizeCommands {
    pub fn new(platform: Arc<dyn HostPlatform>) -> Self {
        Self { platform }
    }

    /// The bigger member wins; a deadly win marks the target `Dead`.
    pub async fn interact(
        &self,
        actor: &SizeActor,
        target: UserId,
        action: SizeAction,
    ) -> Result<SizeReply, PlatformError> {
        if actor.user_id == target {
            return Ok(SizeReply::private("😒 You can’t target yourself, silly."));
        }
        let roles = self.roles(actor.guild_id).await?;
        let actor_roles = self.actor_roles(actor).await?;
        let target_roles = self
            .platform
            .get_member_roles(actor.guild_id, target)
            .await?;

        let (Some(actor_rank), Some(target_rank)) =
            (roles.rank_of(&actor_roles), roles.rank_of(&target_roles))
        else {
            return Ok(SizeReply::private("❌ Both users must have size roles first."));
        };

        if actor_rank <= target_rank {
            return Ok(SizeReply::public(format!(
                "😬 {} tried to {} {}... embarrassing.",
                actor.user_id.mention(),
                action.action_word(),
                target.mention()
            )));
        }

        if action.is_deadly() {
            match roles.role(DEAD_ROLE) {
                Some(dead) => self.platform.add_role(actor.guild_id, target, dead).await?,
                None => tracing::warn!(
                    event = "size.dead_role.missing",
                    guild_id = %actor.guild_id,
                    "guild has no Dead role; outcome not recorded"
                ),
            }
        }
        tracing::info!(
            event = "size.interaction.won",
            guild_id = %actor.guild_id,
            actor_id = %actor.user_id,
            target_id = %target,
            action = action.command_name(),
            "size interaction won"
        );
        Ok(SizeReply::public(format!(
            "{} {} {} {}!",
            action.emoji(),
            actor.user_id.mention(),
            action.success_verb(),
            target.mention()
        )))
    }

    pub async fn revive(&self, actor: &SizeActor, target: UserId) -> Result<SizeReply, PlatformError> {
        let roles = self.roles(actor.guild_id).await?;
        if !roles.holds(&self.actor_roles(actor).await?, SPELLCASTER_ROLE) {
            return Ok(SizeReply::private("❌ Only Spellcasters can revive!"));
        }
        if let Some(dead) = roles.role(DEAD_ROLE) {
            self.platform.remove_role(actor.guild_id, target, dead).await?;
        }
        Ok(SizeReply::public(format!(
            "💫 {} has been revived!",
            target.mention()
        )))
    }

    /// Replace every size role the target holds with `size_role`.
    pub async fn change_size(
        &self,
        actor: &SizeActor,
        target: UserId,
        size_role: &str,
    ) -> Result<SizeReply, PlatformError> {
        let roles = self.roles(actor.guild_id).await?;
        if !roles.holds(&self.actor_roles(actor).await?, SPELLCASTER_ROLE) {
            return Ok(SizeReply::private("❌ Only Spellcasters can do that!"));
        }
        let Ok(rank) = size_role.parse::<SizeRank>() else {
            return Ok(SizeReply::private("⚠️ Invalid size role."));
        };

        let held = self
            .platform
            .get_member_roles(actor.guild_id, target)
            .await?;
        let new_role = roles.size_role(rank);
        for role in roles.size_roles() {
            if held.contains(&role) && Some(role) != new_role {
                self.platform
                    .remove_role(actor.guild_id, target, role)
                    .await?;
            }
        }
        if let Some(role) = new_role
            && !held.contains(&role)
        {
            self.platform.add_role(actor.guild_id, target, role).await?;
        }
        Ok(SizeReply::public(format!(
            "✨ {} is now {rank} sized!",
            target.mention()
        )))
    }

    async fn roles(&self, guild: GuildId) -> Result<SizeRoles, PlatformError> {
        let guild_roles = self.platform.guild_roles(guild).await?;
        Ok(SizeRoles::from_guild_roles(&guild_roles))
    }

    async fn actor_roles(&self, actor: &SizeActor) -> Result<BTreeSet<RoleRef>, PlatformError> {
        match &actor.roles {
            Some(roles) => Ok(roles.clone()),
            None => {
                self.platform
                    .get_member_roles(actor.guild_id, actor.user_id)
                    .await
            }
        }
    }
}

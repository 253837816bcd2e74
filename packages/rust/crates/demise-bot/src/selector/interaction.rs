//! Serves a member's submission on a selector widget.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::platform::{HostPlatform, PlatformError, SelectWidget};

use super::codec::decode_widget;
use super::engine::{RoleDelta, resolve_delta};
use super::store::WidgetStore;
use super::types::{ChannelId, GuildId, MemberRoleSet, MessageId, RoleRef, UserId, WidgetRecord};

pub const NOT_READY_REPLY: &str = "⏳ Role selectors are still loading, try again in a moment.";
pub const INACTIVE_REPLY: &str = "❌ This role selector is no longer active.";

/// A member's submission on a select widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSubmission {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub message_id: MessageId,
    pub member_id: UserId,
    /// Roles from the interaction payload, when it carried them.
    pub member_roles: Option<MemberRoleSet>,
    pub custom_id: String,
    pub values: Vec<String>,
    /// Widgets rendered on the message the member interacted with.
    pub message_widgets: Vec<SelectWidget>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    NotReady,
    Inactive,
    NoChanges,
    Applied,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionReply {
    pub outcome: SelectionOutcome,
    pub content: String,
}

impl SelectionReply {
    fn new(outcome: SelectionOutcome, content: impl Into<String>) -> Self {
        Self {
            outcome,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Mutation {
    Add(RoleRef),
    Remove(RoleRef),
}

pub struct SelectionHandler {
    platform: Arc<dyn HostPlatform>,
    store: Arc<WidgetStore>,
}

impl SelectionHandler {
    pub fn new(platform: Arc<dyn HostPlatform>, store: Arc<WidgetStore>) -> Self {
        Self { platform, store }
    }

    pub async fn handle(&self, submission: &SelectionSubmission) -> SelectionReply {
        if !self.store.is_ready() {
            return SelectionReply::new(SelectionOutcome::NotReady, NOT_READY_REPLY);
        }
        let record = match self.store.lookup(submission.message_id).await {
            Some(record) => Some(record),
            None => self.register_from_message(submission).await,
        };
        let Some(record) = record else {
            return SelectionReply::new(SelectionOutcome::Inactive, INACTIVE_REPLY);
        };

        let current = match &submission.member_roles {
            Some(roles) => roles.clone(),
            None => match self
                .platform
                .get_member_roles(submission.guild_id, submission.member_id)
                .await
            {
                Ok(roles) => roles,
                Err(error) => return failure_reply(submission, &error),
            },
        };

        let submitted = submitted_roles(&record, submission);
        let delta = resolve_delta(&record.config, &current, &submitted);
        if delta.is_empty() {
            return SelectionReply::new(SelectionOutcome::NoChanges, delta.summary());
        }

        match self.apply(submission, &delta).await {
            Ok(()) => {
                tracing::info!(
                    event = "selector.interaction.applied",
                    message_id = %submission.message_id,
                    member_id = %submission.member_id,
                    added = delta.to_add.len(),
                    removed = delta.to_remove.len(),
                    "role selection applied"
                );
                SelectionReply::new(SelectionOutcome::Applied, delta.summary())
            }
            Err(error) => failure_reply(submission, &error),
        }
    }

    /// The interaction carries the message, so a selector missed by recovery
    /// can still be decoded and registered on first use.
    async fn register_from_message(&self, submission: &SelectionSubmission) -> Option<WidgetRecord> {
        let widget = submission
            .message_widgets
            .iter()
            .find(|widget| widget.custom_id == submission.custom_id)?;
        match decode_widget(widget) {
            Ok(config) => {
                let record = WidgetRecord::new(submission.message_id, submission.channel_id, config);
                self.store.register(record.clone()).await;
                tracing::info!(
                    event = "selector.interaction.registered_from_message",
                    message_id = %submission.message_id,
                    "registered role selector from interaction message"
                );
                Some(record)
            }
            Err(error) => {
                tracing::debug!(
                    event = "selector.interaction.decode_failed",
                    message_id = %submission.message_id,
                    custom_id = %submission.custom_id,
                    error = %error,
                    "interaction widget is not a readable role selector"
                );
                None
            }
        }
    }

    /// Removals first, then additions; one attempt each. On failure, revert
    /// what this call already applied and report the original error.
    async fn apply(
        &self,
        submission: &SelectionSubmission,
        delta: &RoleDelta,
    ) -> Result<(), PlatformError> {
        let plan = delta
            .to_remove
            .iter()
            .map(|role| Mutation::Remove(*role))
            .chain(delta.to_add.iter().map(|role| Mutation::Add(*role)))
            .collect::<Vec<_>>();
        let mut applied = Vec::with_capacity(plan.len());
        for mutation in plan {
            if let Err(error) = self.run(submission, mutation).await {
                self.revert(submission, &applied).await;
                return Err(error);
            }
            applied.push(mutation);
        }
        Ok(())
    }

    async fn revert(&self, submission: &SelectionSubmission, applied: &[Mutation]) {
        for mutation in applied.iter().rev() {
            let inverse = match *mutation {
                Mutation::Add(role) => Mutation::Remove(role),
                Mutation::Remove(role) => Mutation::Add(role),
            };
            if let Err(error) = self.run(submission, inverse).await {
                tracing::warn!(
                    event = "selector.interaction.revert_failed",
                    message_id = %submission.message_id,
                    member_id = %submission.member_id,
                    mutation = ?inverse,
                    error = %error,
                    "failed to revert role mutation"
                );
            }
        }
    }

    async fn run(
        &self,
        submission: &SelectionSubmission,
        mutation: Mutation,
    ) -> Result<(), PlatformError> {
        match mutation {
            Mutation::Add(role) => {
                self.platform
                    .add_role(submission.guild_id, submission.member_id, role)
                    .await
            }
            Mutation::Remove(role) => {
                self.platform
                    .remove_role(submission.guild_id, submission.member_id, role)
                    .await
            }
        }
    }
}

fn submitted_roles(record: &WidgetRecord, submission: &SelectionSubmission) -> BTreeSet<RoleRef> {
    submission
        .values
        .iter()
        .filter_map(|value| match value.parse::<RoleRef>() {
            Ok(role) if record.config.offers(role) => Some(role),
            _ => {
                tracing::warn!(
                    event = "selector.interaction.value_ignored",
                    message_id = %submission.message_id,
                    value = %value,
                    "submitted value is not an offered role"
                );
                None
            }
        })
        .collect()
}

fn failure_reply(submission: &SelectionSubmission, error: &PlatformError) -> SelectionReply {
    tracing::warn!(
        event = "selector.interaction.failed",
        message_id = %submission.message_id,
        member_id = %submission.member_id,
        error = %error,
        "role selection failed"
    );
    SelectionReply::new(
        SelectionOutcome::Failed,
        format!("❌ Could not update your roles: {}.", error.reason()),
    )
}

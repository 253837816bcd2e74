//! Interaction payload parsing.

use std::collections::HashMap;

use serde_json::Value;

use crate::platform::{InteractionHandle, parse_select_widgets};
use crate::selector::{ChannelId, GuildId, MemberRoleSet, MessageId, SelectionSubmission, UserId};

const INTERACTION_PING: u64 = 1;
const INTERACTION_APPLICATION_COMMAND: u64 = 2;
const INTERACTION_MESSAGE_COMPONENT: u64 = 3;
const COMPONENT_STRING_SELECT: u64 = 3;

/// A slash command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    pub name: String,
    /// Missing for commands invoked in DMs.
    pub guild_id: Option<GuildId>,
    pub channel_id: ChannelId,
    pub user_id: UserId,
    pub member_roles: Option<MemberRoleSet>,
    /// Option values rendered as strings, keyed by option name.
    pub options: HashMap<String, String>,
}

impl CommandInvocation {
    pub fn option(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundInteraction {
    Ping,
    Command(CommandInvocation),
    Selection(SelectionSubmission),
    /// Well-formed, but nothing this bot handles (buttons, DM components, ...).
    Ignored { kind: u64 },
}

/// Parse a Discord interaction payload.
///
/// Expected shape (subset):
/// - `type`: 1 ping, 2 application command, 3 message component
/// - `guild_id`, `channel_id`
/// - `member.user.id` + `member.roles` in guilds, `user.id` in DMs
/// - commands: `data.name`, `data.options[] { name, value }`
/// - components: `data.component_type`, `data.custom_id`, `data.values`,
///   and the interacted `message` with its `components`
///
/// Returns `None` for payloads missing required fields.
pub fn parse_interaction(event: &Value) -> Option<InboundInteraction> {
    let kind = event.get("type").and_then(Value::as_u64)?;
    match kind {
        INTERACTION_PING => Some(InboundInteraction::Ping),
        INTERACTION_APPLICATION_COMMAND => parse_command(event).map(InboundInteraction::Command),
        INTERACTION_MESSAGE_COMPONENT => parse_component(event),
        other => Some(InboundInteraction::Ignored { kind: other }),
    }
}

/// Application id and token used to edit the response after deferring.
///
/// `None` when the payload carries no token.
pub fn interaction_handle(event: &Value) -> Option<InteractionHandle> {
    let application_id = event.get("application_id").and_then(Value::as_str)?;
    let token = event.get("token").and_then(Value::as_str)?;
    if application_id.is_empty() || token.is_empty() {
        return None;
    }
    Some(InteractionHandle {
        application_id: application_id.to_string(),
        token: token.to_string(),
    })
}

fn parse_command(event: &Value) -> Option<CommandInvocation> {
    let data = event.get("data")?;
    let name = data.get("name").and_then(Value::as_str)?.to_string();
    let options = data
        .get("options")
        .and_then(Value::as_array)
        .map(|options| {
            options
                .iter()
                .filter_map(|option| {
                    let name = option.get("name").and_then(Value::as_str)?;
                    let value = option_value(option.get("value")?)?;
                    Some((name.to_string(), value))
                })
                .collect()
        })
        .unwrap_or_default();
    Some(CommandInvocation {
        name,
        guild_id: snowflake(event, "guild_id"),
        channel_id: snowflake(event, "channel_id")?,
        user_id: invoking_user(event)?,
        member_roles: member_roles(event),
        options,
    })
}

fn parse_component(event: &Value) -> Option<InboundInteraction> {
    let data = event.get("data")?;
    let component_type = data.get("component_type").and_then(Value::as_u64)?;
    let custom_id = data.get("custom_id").and_then(Value::as_str)?;
    let Some(guild_id) = snowflake(event, "guild_id") else {
        return Some(InboundInteraction::Ignored {
            kind: INTERACTION_MESSAGE_COMPONENT,
        });
    };
    if component_type != COMPONENT_STRING_SELECT {
        return Some(InboundInteraction::Ignored {
            kind: INTERACTION_MESSAGE_COMPONENT,
        });
    }
    let message = event.get("message")?;
    let values = data
        .get("values")
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    Some(InboundInteraction::Selection(SelectionSubmission {
        guild_id,
        channel_id: snowflake(event, "channel_id")?,
        message_id: message.get("id").and_then(Value::as_str)?.parse::<MessageId>().ok()?,
        member_id: invoking_user(event)?,
        member_roles: member_roles(event),
        custom_id: custom_id.to_string(),
        values,
        message_widgets: parse_select_widgets(message),
    }))
}

fn snowflake<T: std::str::FromStr>(value: &Value, key: &str) -> Option<T> {
    value.get(key).and_then(Value::as_str)?.parse().ok()
}

fn invoking_user(event: &Value) -> Option<UserId> {
    event
        .get("member")
        .and_then(|member| member.get("user"))
        .or_else(|| event.get("user"))
        .and_then(|user| snowflake(user, "id"))
}

fn member_roles(event: &Value) -> Option<MemberRoleSet> {
    let roles = event.get("member")?.get("roles")?.as_array()?;
    Some(
        roles
            .iter()
            .filter_map(Value::as_str)
            .filter_map(|raw| raw.parse().ok())
            .collect(),
    )
}

fn option_value(value: &Value) -> Option<String> {
    match value {
        Value::String(raw) => Some(raw.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

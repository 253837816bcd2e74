//! Discord JSON payload shapes (subset) and conversions to platform types.

use serde::{Deserialize, Deserializer};
use serde_json::{Value, json};

use crate::platform::{GuildRole, HistoryMessage, OutboundMessage, SelectWidget, WidgetOption};
use crate::selector::{ChannelId, GuildId, MessageId, RoleRef, UserId};

use super::constants::{MESSAGE_CHANNEL_TYPES, SELECTOR_EMBED_COLOR};

const COMPONENT_ACTION_ROW: u8 = 1;
const COMPONENT_STRING_SELECT: u8 = 3;

/// Discord encodes snowflakes (and permission bitsets) as decimal strings.
fn string_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }
    match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
        Raw::Number(number) => Ok(number),
    }
}

fn string_u64_vec<'de, D>(deserializer: D) -> Result<Vec<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<String>::deserialize(deserializer)?;
    raw.iter()
        .map(|entry| entry.trim().parse().map_err(serde::de::Error::custom))
        .collect()
}

#[derive(Debug, Deserialize)]
pub(super) struct WireId {
    #[serde(deserialize_with = "string_u64")]
    pub(super) id: u64,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireGuild {
    #[serde(deserialize_with = "string_u64")]
    pub(super) owner_id: u64,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireMember {
    #[serde(default, deserialize_with = "string_u64_vec")]
    pub(super) roles: Vec<u64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireRole {
    #[serde(deserialize_with = "string_u64")]
    id: u64,
    name: String,
    #[serde(default, deserialize_with = "string_u64")]
    permissions: u64,
}

impl From<WireRole> for GuildRole {
    fn from(role: WireRole) -> Self {
        Self {
            id: RoleRef(role.id),
            name: role.name,
            permissions: role.permissions,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct WireChannel {
    #[serde(deserialize_with = "string_u64")]
    id: u64,
    #[serde(rename = "type")]
    kind: u8,
}

impl WireChannel {
    pub(super) fn message_channel_id(&self) -> Option<ChannelId> {
        MESSAGE_CHANNEL_TYPES
            .contains(&self.kind)
            .then_some(ChannelId(self.id))
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct WireMessage {
    #[serde(deserialize_with = "string_u64")]
    id: u64,
    author: WireId,
    #[serde(default)]
    content: String,
    #[serde(default)]
    embeds: Vec<WireEmbed>,
    #[serde(default)]
    components: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct WireEmbed {
    #[serde(default)]
    title: Option<String>,
}

impl From<WireMessage> for HistoryMessage {
    fn from(message: WireMessage) -> Self {
        let widgets = collect_select_widgets(&message.components);
        Self {
            id: MessageId(message.id),
            author_id: UserId(message.author.id),
            content: message.content,
            embed_title: message.embeds.into_iter().find_map(|embed| embed.title),
            widgets,
        }
    }
}

pub(super) fn guild_id_list(entries: Vec<WireId>) -> Vec<GuildId> {
    entries.into_iter().map(|entry| GuildId(entry.id)).collect()
}

/// Extract every string select menu from a message payload's `components`.
///
/// Action rows are flattened; buttons and other component kinds are ignored.
pub(crate) fn parse_select_widgets(message: &Value) -> Vec<SelectWidget> {
    message
        .get("components")
        .and_then(Value::as_array)
        .map(|components| collect_select_widgets(components))
        .unwrap_or_default()
}

fn collect_select_widgets(components: &[Value]) -> Vec<SelectWidget> {
    let mut widgets = Vec::new();
    for component in components {
        match component_kind(component) {
            Some(COMPONENT_ACTION_ROW) => {
                if let Some(children) = component.get("components").and_then(Value::as_array) {
                    widgets.extend(collect_select_widgets(children));
                }
            }
            Some(COMPONENT_STRING_SELECT) => {
                if let Some(widget) = parse_select_widget(component) {
                    widgets.push(widget);
                }
            }
            _ => {}
        }
    }
    widgets
}

fn component_kind(component: &Value) -> Option<u8> {
    component
        .get("type")
        .and_then(Value::as_u64)
        .and_then(|kind| u8::try_from(kind).ok())
}

fn parse_select_widget(component: &Value) -> Option<SelectWidget> {
    let custom_id = component.get("custom_id").and_then(Value::as_str)?;
    let options = component
        .get("options")
        .and_then(Value::as_array)
        .map(|options| {
            options
                .iter()
                .filter_map(|option| {
                    Some(WidgetOption {
                        label: option.get("label").and_then(Value::as_str)?.to_string(),
                        value: option.get("value").and_then(Value::as_str)?.to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    let count = |key: &str, fallback: u8| {
        component
            .get(key)
            .and_then(Value::as_u64)
            .and_then(|value| u8::try_from(value).ok())
            .unwrap_or(fallback)
    };
    Some(SelectWidget {
        custom_id: custom_id.to_string(),
        placeholder: component
            .get("placeholder")
            .and_then(Value::as_str)
            .map(ToString::to_string),
        min_values: count("min_values", 1),
        max_values: count("max_values", 1),
        options,
    })
}

/// JSON body for `Create Message` / `Edit Message`.
pub(crate) fn outbound_payload(message: &OutboundMessage) -> Value {
    let mut embed = json!({
        "title": message.title,
        "description": message.description,
        "color": SELECTOR_EMBED_COLOR,
    });
    if let Some(footer) = &message.footer {
        embed["footer"] = json!({ "text": footer });
    }
    let components = message
        .widget
        .as_ref()
        .map(|widget| {
            vec![json!({
                "type": COMPONENT_ACTION_ROW,
                "components": [{
                    "type": COMPONENT_STRING_SELECT,
                    "custom_id": widget.custom_id,
                    "placeholder": widget.placeholder,
                    "min_values": widget.min_values,
                    "max_values": widget.max_values,
                    "options": widget.options,
                }],
            })]
        })
        .unwrap_or_default();
    json!({
        "embeds": [embed],
        "components": components,
    })
}

/// JSON body for `Edit Original Interaction Response`.
pub(crate) fn response_edit_payload(content: &str) -> Value {
    json!({ "content": content })
}

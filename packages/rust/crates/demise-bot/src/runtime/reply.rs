use serde_json::{Value, json};

const RESPONSE_PONG: u8 = 1;
const RESPONSE_CHANNEL_MESSAGE: u8 = 4;
const RESPONSE_DEFERRED_CHANNEL_MESSAGE: u8 = 5;
const FLAG_EPHEMERAL: u64 = 1 << 6;

/// Message sent back as the interaction response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionReply {
    pub content: String,
    pub ephemeral: bool,
}

impl InteractionReply {
    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: true,
        }
    }

    pub fn public(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: false,
        }
    }
}

/// Body of the HTTP response to an interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionResponse {
    Pong,
    Message(InteractionReply),
    /// Acknowledged now; the content follows by editing the original response.
    Deferred { ephemeral: bool },
}

impl InteractionResponse {
    pub fn to_json(&self) -> Value {
        match self {
            Self::Pong => json!({ "type": RESPONSE_PONG }),
            Self::Message(reply) => {
                let mut data = json!({ "content": reply.content });
                if reply.ephemeral {
                    data["flags"] = json!(FLAG_EPHEMERAL);
                }
                json!({ "type": RESPONSE_CHANNEL_MESSAGE, "data": data })
            }
            Self::Deferred { ephemeral } => {
                let data = if *ephemeral {
                    json!({ "flags": FLAG_EPHEMERAL })
                } else {
                    json!({})
                };
                json!({ "type": RESPONSE_DEFERRED_CHANNEL_MESSAGE, "data": data })
            }
        }
    }
}

impl From<InteractionReply> for InteractionResponse {
    fn from(reply: InteractionReply) -> Self {
        Self::Message(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deferred_ephemeral_response_sets_flags() {
        assert_eq!(
            InteractionResponse::Deferred { ephemeral: true }.to_json(),
            json!({"type": 5, "data": {"flags": 64}})
        );
    }

    #[test]
    fn public_message_has_no_flags() {
        let body = InteractionResponse::from(InteractionReply::public("hi")).to_json();
        assert_eq!(body, json!({"type": 4, "data": {"content": "hi"}}));
    }
}

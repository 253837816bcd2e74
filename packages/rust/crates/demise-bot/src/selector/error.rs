//! Selector error taxonomy.

use thiserror::Error;

use crate::platform::PlatformError;

use super::types::RoleRef;

/// Rejected input; raised before any platform call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("you must mention at least one valid role")]
    NoRoles,
    #[error("a selector can offer at most {max} roles (got {count})")]
    TooManyRoles { count: usize, max: usize },
    #[error("role {0} is listed more than once")]
    DuplicateRole(RoleRef),
    #[error("type must be `single` or `multiple` (got `{0}`)")]
    UnknownMode(String),
    #[error("message id `{0}` is not valid")]
    InvalidMessageId(String),
}

/// A widget marker this process cannot turn back into a config.
///
/// Recovery, listing and cleanup treat every variant as "not a valid selector"
/// and move on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("custom id is not a role selector marker")]
    NotAMarker,
    #[error("unsupported marker version `{0}`")]
    UnsupportedVersion(String),
    #[error("malformed marker: {0}")]
    Malformed(String),
    #[error("unknown selection mode `{0}`")]
    UnknownMode(String),
    #[error("option value `{0}` is not a role id")]
    InvalidOption(String),
    #[error("decoded config is invalid: {0}")]
    InvalidConfig(#[from] ValidationError),
    #[error("selector message has no widget")]
    MissingWidget,
}

/// Failure of a caller-facing selector operation.
#[derive(Debug, Error)]
pub enum SelectorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("platform call failed: {0}")]
    External(#[from] PlatformError),
    #[error("message {0} is not a role selector in this channel")]
    UnknownSelector(super::types::MessageId),
}

impl SelectorError {
    /// Single human-readable failure line for the invoking user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(error) => format!("❌ {error}."),
            Self::External(error) => format!("❌ Discord rejected the request: {}.", error.reason()),
            Self::UnknownSelector(message_id) => {
                format!("❌ Message {message_id} is not a role selector in this channel.")
            }
        }
    }
}

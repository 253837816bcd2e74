//! Core selector data model: snowflake ids, selection mode, validated config.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ValidationError;

/// Discord enumerates at most 25 options per select menu.
pub const MAX_OFFERED_ROLES: usize = 25;

macro_rules! snowflake_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Raw snowflake value.
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                raw.trim().parse::<u64>().map(Self)
            }
        }
    };
}

snowflake_id!(
    /// Opaque role identifier. Equality is identifier based.
    RoleRef
);
snowflake_id!(
    /// Identifier of the message that anchors a widget.
    MessageId
);
snowflake_id!(
    /// Text channel identifier.
    ChannelId
);
snowflake_id!(
    /// Guild (community) identifier.
    GuildId
);
snowflake_id!(
    /// User / member identifier.
    UserId
);

impl RoleRef {
    /// Discord role mention markup (`<@&id>`).
    pub fn mention(self) -> String {
        format!("<@&{}>", self.0)
    }
}

impl UserId {
    /// Discord user mention markup (`<@id>`).
    pub fn mention(self) -> String {
        format!("<@{}>", self.0)
    }
}

/// Live set of roles a member holds. Owned by the platform; read-only here.
pub type MemberRoleSet = BTreeSet<RoleRef>;

/// How the roles offered by one widget relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Selecting one offered role clears every other offered role.
    Exclusive,
    /// Any subset of the offered roles may be held at once.
    Inclusive,
}

impl SelectionMode {
    /// Label shown to moderators and in the embed footer.
    pub fn user_label(self) -> &'static str {
        match self {
            Self::Exclusive => "single",
            Self::Inclusive => "multiple",
        }
    }
}

impl Display for SelectionMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.user_label())
    }
}

impl FromStr for SelectionMode {
    type Err = ValidationError;

    /// Accepts `single`/`radio`/`exclusive` and `multiple`/`checkbox`/`inclusive`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "single" | "radio" | "exclusive" => Ok(Self::Exclusive),
            "multiple" | "checkbox" | "inclusive" => Ok(Self::Inclusive),
            _ => Err(ValidationError::UnknownMode(raw.trim().to_string())),
        }
    }
}

/// Offered roles plus selection mode for one selector.
///
/// Always non-empty, duplicate-free and at most [`MAX_OFFERED_ROLES`] long.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorConfig {
    offered_roles: Vec<RoleRef>,
    mode: SelectionMode,
}

impl SelectorConfig {
    /// Validate and build a config; role order is preserved.
    pub fn new(offered_roles: Vec<RoleRef>, mode: SelectionMode) -> Result<Self, ValidationError> {
        if offered_roles.is_empty() {
            return Err(ValidationError::NoRoles);
        }
        if offered_roles.len() > MAX_OFFERED_ROLES {
            return Err(ValidationError::TooManyRoles {
                count: offered_roles.len(),
                max: MAX_OFFERED_ROLES,
            });
        }
        let mut seen = BTreeSet::new();
        for role in &offered_roles {
            if !seen.insert(*role) {
                return Err(ValidationError::DuplicateRole(*role));
            }
        }
        Ok(Self {
            offered_roles,
            mode,
        })
    }

    pub fn offered_roles(&self) -> &[RoleRef] {
        &self.offered_roles
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn offers(&self, role: RoleRef) -> bool {
        self.offered_roles.contains(&role)
    }

    pub fn offered_set(&self) -> BTreeSet<RoleRef> {
        self.offered_roles.iter().copied().collect()
    }
}

/// A live selector known to this process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidgetRecord {
    pub message_id: MessageId,
    pub channel_id: ChannelId,
    pub config: SelectorConfig,
}

impl WidgetRecord {
    pub fn new(message_id: MessageId, channel_id: ChannelId, config: SelectorConfig) -> Self {
        Self {
            message_id,
            channel_id,
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_mode_parses_aliases() {
        assert_eq!("Single".parse::<SelectionMode>(), Ok(SelectionMode::Exclusive));
        assert_eq!("radio".parse::<SelectionMode>(), Ok(SelectionMode::Exclusive));
        assert_eq!(
            " multiple ".parse::<SelectionMode>(),
            Ok(SelectionMode::Inclusive)
        );
        assert!("both".parse::<SelectionMode>().is_err());
    }

    #[test]
    fn config_rejects_duplicates_and_overflow() {
        let dup = SelectorConfig::new(vec![RoleRef(1), RoleRef(1)], SelectionMode::Inclusive);
        assert_eq!(dup, Err(ValidationError::DuplicateRole(RoleRef(1))));

        let many = (0..26).map(RoleRef).collect::<Vec<_>>();
        assert!(matches!(
            SelectorConfig::new(many, SelectionMode::Inclusive),
            Err(ValidationError::TooManyRoles { count: 26, .. })
        ));
        assert_eq!(
            SelectorConfig::new(Vec::new(), SelectionMode::Exclusive),
            Err(ValidationError::NoRoles)
        );
    }
}

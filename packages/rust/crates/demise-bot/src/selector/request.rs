//! Moderator command arguments for creating or updating a selector.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use super::error::ValidationError;
use super::types::{MessageId, RoleRef, SelectionMode};

fn compile_regex(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(_pattern_err) => match Regex::new(r"$^") {
            Ok(fallback) => fallback,
            Err(fallback_err) => panic!("hardcoded fallback regex must compile: {fallback_err}"),
        },
    }
}

// `<@&123>` mention or a bare id.
static ROLE_TOKEN: LazyLock<Regex> = LazyLock::new(|| compile_regex(r"^(?:<@&(\d+)>|(\d+))$"));

/// Validated-at-parse arguments of `create_role_selector` / `update_role_selector`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorRequest {
    pub mode: SelectionMode,
    pub description: String,
    pub roles: Vec<RoleRef>,
}

impl SelectorRequest {
    pub fn parse(mode: &str, description: &str, roles: &str) -> Result<Self, ValidationError> {
        let roles = parse_role_tokens(roles);
        if roles.is_empty() {
            return Err(ValidationError::NoRoles);
        }
        Ok(Self {
            mode: mode.parse()?,
            description: description.trim().to_string(),
            roles,
        })
    }
}

/// Role ids from whitespace-separated mentions or ids, first occurrence kept.
///
/// Tokens that are neither are ignored.
pub fn parse_role_tokens(raw: &str) -> Vec<RoleRef> {
    let mut seen = BTreeSet::new();
    raw.split_whitespace()
        .filter_map(|token| {
            let captures = ROLE_TOKEN.captures(token)?;
            let digits = captures.get(1).or_else(|| captures.get(2))?;
            digits.as_str().parse::<RoleRef>().ok()
        })
        .filter(|role| seen.insert(*role))
        .collect()
}

pub fn parse_message_id(raw: &str) -> Result<MessageId, ValidationError> {
    raw.parse::<MessageId>()
        .map_err(|_| ValidationError::InvalidMessageId(raw.trim().to_string()))
}

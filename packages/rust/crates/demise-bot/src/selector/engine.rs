//! Pure add/remove decision for a selection submitted on a widget.

use std::collections::BTreeSet;

use serde::Serialize;

use super::types::{MemberRoleSet, RoleRef, SelectionMode, SelectorConfig};

/// Role mutations needed to reflect a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoleDelta {
    pub to_add: BTreeSet<RoleRef>,
    pub to_remove: BTreeSet<RoleRef>,
}

impl RoleDelta {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// Apply to a role set (what the member should hold afterwards).
    pub fn apply_to(&self, current: &MemberRoleSet) -> MemberRoleSet {
        current
            .difference(&self.to_remove)
            .copied()
            .chain(self.to_add.iter().copied())
            .collect()
    }

    /// Reply text for the member; never empty.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        if !self.to_add.is_empty() {
            lines.push(format!("✅ Added: {}", mention_list(&self.to_add)));
        }
        if !self.to_remove.is_empty() {
            lines.push(format!("❌ Removed: {}", mention_list(&self.to_remove)));
        }
        if lines.is_empty() {
            return "No changes.".to_string();
        }
        lines.join("\n")
    }
}

fn mention_list(roles: &BTreeSet<RoleRef>) -> String {
    roles
        .iter()
        .map(|role| role.mention())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Compute the delta for `submitted` given what the member holds now.
///
/// Roles outside the offered set are never touched. In exclusive mode the
/// widget limits submissions to one value; this function does not enforce it.
pub fn resolve_delta(
    config: &SelectorConfig,
    current: &MemberRoleSet,
    submitted: &BTreeSet<RoleRef>,
) -> RoleDelta {
    let offered = config.offered_set();
    match config.mode() {
        SelectionMode::Exclusive => RoleDelta {
            to_add: submitted.difference(current).copied().collect(),
            to_remove: offered
                .intersection(current)
                .filter(|role| !submitted.contains(role))
                .copied()
                .collect(),
        },
        SelectionMode::Inclusive => {
            let mut delta = RoleDelta::default();
            for role in offered {
                let held = current.contains(&role);
                let wanted = submitted.contains(&role);
                if wanted && !held {
                    delta.to_add.insert(role);
                } else if held && !wanted {
                    delta.to_remove.insert(role);
                }
            }
            delta
        }
    }
}

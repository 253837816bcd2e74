use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::platform::GuildRole;
use crate::selector::RoleRef;

pub const DEAD_ROLE: &str = "Dead";
pub const SPELLCASTER_ROLE: &str = "Spellcaster";

/// Size roles, smallest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SizeRank {
    Tiny,
    Normal,
    Giant,
    Giantess,
}

impl SizeRank {
    pub const ORDER: [Self; 4] = [Self::Tiny, Self::Normal, Self::Giant, Self::Giantess];

    pub const fn role_name(self) -> &'static str {
        match self {
            Self::Tiny => "Tiny",
            Self::Normal => "Normal",
            Self::Giant => "Giant",
            Self::Giantess => "Giantess",
        }
    }
}

impl fmt::Display for SizeRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.role_name())
    }
}

impl FromStr for SizeRank {
    type Err = String;

    /// Role names match exactly, as guild role names do.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ORDER
            .into_iter()
            .find(|rank| rank.role_name() == value.trim())
            .ok_or_else(|| value.to_string())
    }
}

/// Guild role ids by name for the roles the size commands care about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeRoles {
    by_name: HashMap<String, RoleRef>,
}

impl SizeRoles {
    /// First role wins when a guild has several with the same name.
    pub fn from_guild_roles(roles: &[GuildRole]) -> Self {
        let mut by_name = HashMap::new();
        for role in roles {
            by_name.entry(role.name.clone()).or_insert(role.id);
        }
        Self { by_name }
    }

    pub fn role(&self, name: &str) -> Option<RoleRef> {
        self.by_name.get(name).copied()
    }

    pub fn size_role(&self, rank: SizeRank) -> Option<RoleRef> {
        self.role(rank.role_name())
    }

    /// Size role ids present in the guild, smallest first.
    pub fn size_roles(&self) -> Vec<RoleRef> {
        SizeRank::ORDER
            .into_iter()
            .filter_map(|rank| self.size_role(rank))
            .collect()
    }

    /// The smallest size role the member holds.
    pub fn rank_of(&self, held: &BTreeSet<RoleRef>) -> Option<SizeRank> {
        SizeRank::ORDER.into_iter().find(|rank| {
            self.size_role(*rank)
                .is_some_and(|role| held.contains(&role))
        })
    }

    pub fn holds(&self, held: &BTreeSet<RoleRef>, name: &str) -> bool {
        self.role(name).is_some_and(|role| held.contains(&role))
    }
}

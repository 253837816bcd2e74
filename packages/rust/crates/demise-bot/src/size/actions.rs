use std::str::FromStr;

/// Size interactions one member performs on another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeAction {
    Step,
    Squish,
    Devour,
    Crush,
    PickUp,
    Poke,
}

impl SizeAction {
    pub const ALL: [Self; 6] = [
        Self::Step,
        Self::Squish,
        Self::Devour,
        Self::Crush,
        Self::PickUp,
        Self::Poke,
    ];

    pub const fn command_name(self) -> &'static str {
        match self {
            Self::Step => "step",
            Self::Squish => "squish",
            Self::Devour => "devour",
            Self::Crush => "crush",
            Self::PickUp => "pick_up",
            Self::Poke => "poke",
        }
    }

    /// Used in the failure line: "tried to {word}".
    pub const fn action_word(self) -> &'static str {
        match self {
            Self::Step => "step on",
            Self::Squish => "squish",
            Self::Devour => "devour",
            Self::Crush => "crush",
            Self::PickUp => "pick up",
            Self::Poke => "poke",
        }
    }

    pub const fn success_verb(self) -> &'static str {
        match self {
            Self::Step => "has stepped on",
            Self::Squish => "has squished",
            Self::Devour => "has devoured",
            Self::Crush => "has crushed",
            Self::PickUp => "has picked up",
            Self::Poke => "has poked",
        }
    }

    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Step => "👠",
            Self::Squish => "🫠",
            Self::Devour => "👄",
            Self::Crush => "💥",
            Self::PickUp => "✋",
            Self::Poke => "👉",
        }
    }

    /// Deadly actions mark a losing target as dead.
    pub const fn is_deadly(self) -> bool {
        matches!(self, Self::Step | Self::Squish | Self::Devour | Self::Crush)
    }
}

impl FromStr for SizeAction {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.command_name() == value)
            .ok_or_else(|| value.to_string())
    }
}

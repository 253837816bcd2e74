//! Size roleplay: members ranked by their size role act on each other.

mod actions;
mod rank;
mod service;

pub use actions::SizeAction;
pub use rank::{DEAD_ROLE, SPELLCASTER_ROLE, SizeRank, SizeRoles};
pub use service::{SizeActor, SizeCommands, SizeReply};

//! Discord REST implementation of [`HostPlatform`](super::HostPlatform).

mod api;
mod client;
mod constants;
mod platform;
mod wire;

pub use constants::{DISCORD_DEFAULT_API_BASE, DISCORD_MAX_HISTORY_PAGE};
pub use platform::DiscordPlatform;
pub(crate) use wire::parse_select_widgets;

//! Discord REST constants.

/// Discord REST API base URL.
pub const DISCORD_DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// Largest page `GET /channels/{id}/messages` returns.
pub const DISCORD_MAX_HISTORY_PAGE: usize = 100;

/// Embed accent colour for selector messages (blurple).
pub(super) const SELECTOR_EMBED_COLOR: u32 = 0x5865_F2;

/// `ADMINISTRATOR` permission bit.
pub(super) const PERMISSION_ADMINISTRATOR: u64 = 1 << 3;

/// Channel types that can carry selector messages (text, announcement).
pub(super) const MESSAGE_CHANNEL_TYPES: [u8; 2] = [0, 5];

/// Error bodies are truncated to this many characters in errors and logs.
pub(super) const ERROR_BODY_PREVIEW_CHARS: usize = 256;

//! Discord bot library: persistent role selectors and size roleplay.
//!
//! - **Selectors**: a moderator publishes a message with a role select widget;
//!   the widget's `custom_id` and options carry its whole config, so the
//!   in-memory store can be rebuilt from channel history after a restart.
//! - **Size**: members ranked by size role act on each other.

#![allow(missing_docs)]

mod config;
mod platform;
mod runtime;
mod selector;
mod size;

pub use config::{
    DemiseSettings, DiscordSettings, SelectorSettings, load_runtime_settings,
    load_runtime_settings_from_paths, runtime_settings_paths, set_config_home_override,
};
pub use platform::{
    DISCORD_DEFAULT_API_BASE, DISCORD_MAX_HISTORY_PAGE, DiscordPlatform, GuildRole,
    HistoryMessage, HostPlatform, InteractionHandle, OutboundMessage, PlatformError, SelectWidget,
    WidgetOption,
};
pub use runtime::{
    CommandInvocation, DEFAULT_INGRESS_BIND, DEFAULT_INGRESS_PATH, DEMISE_INGRESS_SECRET_HEADER,
    DISCORD_SIGNATURE_HEADER, DISCORD_TIMESTAMP_HEADER, DemiseIngressApp, DemiseRuntimeConfig,
    InboundInteraction, IngressAuth, InteractionReply, InteractionResponse, InteractionRouter,
    InteractionVerifier, PublicKeyError, build_interactions_app, interaction_handle,
    parse_interaction, run_discord_ingress, run_recovery_scan,
};
pub use selector::{
    CURRENT_MARKER_VERSION, ChannelId, CleanupReport, DEFAULT_HISTORY_LIMIT, DecodeError,
    GuildId, INACTIVE_REPLY, LEGACY_MARKER_PREFIX, MARKER_PREFIX, MAX_CUSTOM_ID_LEN,
    MAX_HISTORY_LIMIT, MAX_OFFERED_ROLES, MemberRoleSet, MessageId, NOT_READY_REPLY,
    RecoveryReport, RecoveryScanner, Registration, RoleDelta, RoleRef, SELECTOR_TITLE, ScanFailure,
    SelectionHandler, SelectionMode, SelectionOutcome, SelectionReply, SelectionSubmission,
    SelectorConfig, SelectorError, SelectorLifecycle, SelectorRequest, SelectorSummary, UserId,
    ValidationError, WidgetRecord, WidgetStore, decode, decode_widget, encode_marker,
    is_own_widget_marker, new_marker_tag, parse_message_id, parse_role_tokens,
    render_selector_list, render_selector_message, render_widget, resolve_delta,
};
pub use size::{
    DEAD_ROLE, SPELLCASTER_ROLE, SizeAction, SizeActor, SizeCommands, SizeRank, SizeReply,
    SizeRoles,
};

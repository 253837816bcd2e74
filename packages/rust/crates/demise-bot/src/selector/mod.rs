//! Persistent role selectors.
//!
//! The rendered message is the source of truth; [`WidgetStore`] is a cache
//! that [`RecoveryScanner`] rebuilds from channel history after a restart.

mod codec;
mod engine;
mod error;
mod interaction;
mod lifecycle;
mod recovery;
mod request;
mod store;
mod types;

pub use codec::{
    CURRENT_MARKER_VERSION, LEGACY_MARKER_PREFIX, MARKER_PREFIX, MAX_CUSTOM_ID_LEN,
    SELECTOR_TITLE, decode, decode_widget, encode_marker, is_own_widget_marker, new_marker_tag,
    render_widget,
};
pub use engine::{RoleDelta, resolve_delta};
pub use error::{DecodeError, SelectorError, ValidationError};
pub use interaction::{
    INACTIVE_REPLY, NOT_READY_REPLY, SelectionHandler, SelectionOutcome, SelectionReply,
    SelectionSubmission,
};
pub use lifecycle::{
    CleanupReport, SelectorLifecycle, SelectorSummary, render_selector_list,
    render_selector_message,
};
pub use recovery::{
    DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT, RecoveryReport, RecoveryScanner, ScanFailure,
};
pub use request::{SelectorRequest, parse_message_id, parse_role_tokens};
pub use store::{Registration, WidgetStore};
pub use types::{
    ChannelId, GuildId, MAX_OFFERED_ROLES, MemberRoleSet, MessageId, RoleRef, SelectionMode,
    SelectorConfig, UserId, WidgetRecord,
};

//! Selector marker encoding.
//!
//! The widget's `custom_id` only carries a version, the selection mode and a
//! random tag. Offered roles are read back from the widget's rendered option
//! list, so the marker never approaches Discord's 100 character ceiling no
//! matter how many roles are offered.
//!
//! Marker versions:
//! - `2`: `rsel:2:<x|i>:<tag>` (current)
//! - `1`: `role_dropdown_<single|multiple>_<id>_<id>...` (first release; the id
//!   tail is ignored on decode)

use crate::platform::{SelectWidget, WidgetOption};

use super::error::DecodeError;
use super::types::{RoleRef, SelectionMode, SelectorConfig};

/// Prefix shared by all versioned markers.
pub const MARKER_PREFIX: &str = "rsel:";
/// Prefix of the unversioned first-release marker.
pub const LEGACY_MARKER_PREFIX: &str = "role_dropdown_";
/// Version written by [`encode_marker`].
pub const CURRENT_MARKER_VERSION: &str = "2";
/// Discord limit for component custom ids.
pub const MAX_CUSTOM_ID_LEN: usize = 100;
/// Embed title of every published selector message.
pub const SELECTOR_TITLE: &str = "Role Selector";

const TAG_LEN: usize = 12;
const MAX_OPTION_LABEL_CHARS: usize = 100;

/// Whether a component custom id looks like one of ours (any version).
pub fn is_own_widget_marker(custom_id: &str) -> bool {
    custom_id.starts_with(MARKER_PREFIX) || custom_id.starts_with(LEGACY_MARKER_PREFIX)
}

fn mode_code(mode: SelectionMode) -> char {
    match mode {
        SelectionMode::Exclusive => 'x',
        SelectionMode::Inclusive => 'i',
    }
}

/// Build a current-version marker with an explicit tag.
pub fn encode_marker(mode: SelectionMode, tag: &str) -> String {
    format!(
        "{MARKER_PREFIX}{CURRENT_MARKER_VERSION}:{}:{tag}",
        mode_code(mode)
    )
}

/// Fresh random tag so two selectors never share a custom id.
pub fn new_marker_tag() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..TAG_LEN].to_string()
}

/// Render the select widget for a config. `label_for` names each role.
pub fn render_widget(
    config: &SelectorConfig,
    tag: &str,
    label_for: impl Fn(RoleRef) -> String,
) -> SelectWidget {
    let max_values = match config.mode() {
        SelectionMode::Exclusive => 1,
        // At most 25 roles, always fits.
        SelectionMode::Inclusive => u8::try_from(config.offered_roles().len()).unwrap_or(u8::MAX),
    };
    let placeholder = match config.mode() {
        SelectionMode::Exclusive => "Select one role...",
        SelectionMode::Inclusive => "Select your roles...",
    };
    SelectWidget {
        custom_id: encode_marker(config.mode(), tag),
        placeholder: Some(placeholder.to_string()),
        min_values: 1,
        max_values,
        options: config
            .offered_roles()
            .iter()
            .map(|role| WidgetOption {
                label: truncate_label(&label_for(*role), *role),
                value: role.to_string(),
            })
            .collect(),
    }
}

fn truncate_label(label: &str, role: RoleRef) -> String {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return role.to_string();
    }
    trimmed.chars().take(MAX_OPTION_LABEL_CHARS).collect()
}

/// Decode a rendered widget back into its config.
pub fn decode_widget(widget: &SelectWidget) -> Result<SelectorConfig, DecodeError> {
    decode(&widget.custom_id, &widget.options)
}

/// Decode a marker plus the widget's rendered options.
pub fn decode(custom_id: &str, options: &[WidgetOption]) -> Result<SelectorConfig, DecodeError> {
    if let Some(rest) = custom_id.strip_prefix(MARKER_PREFIX) {
        let mut parts = rest.splitn(2, ':');
        let version = parts.next().unwrap_or_default();
        let body = parts.next().unwrap_or_default();
        return match version {
            CURRENT_MARKER_VERSION => decode_v2(body, options),
            other => Err(DecodeError::UnsupportedVersion(other.to_string())),
        };
    }
    if let Some(rest) = custom_id.strip_prefix(LEGACY_MARKER_PREFIX) {
        return decode_v1(rest, options);
    }
    Err(DecodeError::NotAMarker)
}

fn decode_v2(body: &str, options: &[WidgetOption]) -> Result<SelectorConfig, DecodeError> {
    let Some((mode, tag)) = body.split_once(':') else {
        return Err(DecodeError::Malformed(format!("missing tag in `{body}`")));
    };
    let mode = match mode {
        "x" => SelectionMode::Exclusive,
        "i" => SelectionMode::Inclusive,
        other => return Err(DecodeError::UnknownMode(other.to_string())),
    };
    if tag.is_empty() || !tag.chars().all(|ch| ch.is_ascii_alphanumeric()) {
        return Err(DecodeError::Malformed(format!("invalid tag `{tag}`")));
    }
    Ok(SelectorConfig::new(roles_from_options(options)?, mode)?)
}

fn decode_v1(body: &str, options: &[WidgetOption]) -> Result<SelectorConfig, DecodeError> {
    let mut segments = body.split('_');
    let mode = match segments.next().unwrap_or_default() {
        "single" => SelectionMode::Exclusive,
        "multiple" => SelectionMode::Inclusive,
        other => return Err(DecodeError::UnknownMode(other.to_string())),
    };
    if let Some(bad) = segments.find(|segment| segment.parse::<u64>().is_err()) {
        return Err(DecodeError::Malformed(format!(
            "legacy role id segment `{bad}`"
        )));
    }
    Ok(SelectorConfig::new(roles_from_options(options)?, mode)?)
}

fn roles_from_options(options: &[WidgetOption]) -> Result<Vec<RoleRef>, DecodeError> {
    options
        .iter()
        .map(|option| {
            option
                .value
                .parse::<RoleRef>()
                .map_err(|_| DecodeError::InvalidOption(option.value.clone()))
        })
        .collect()
}

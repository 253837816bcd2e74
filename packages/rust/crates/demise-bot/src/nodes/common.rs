use std::str::FromStr;

pub(super) fn parse_comma_separated_ids<T: FromStr>(kind: &str, raw: &str) -> Vec<T> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| match entry.parse::<T>() {
            Ok(id) => Some(id),
            Err(_) => {
                tracing::warn!(kind, entry, "ignoring invalid snowflake id");
                None
            }
        })
        .collect()
}

pub(super) fn non_empty_string(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

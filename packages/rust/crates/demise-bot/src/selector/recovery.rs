//! Startup recovery: rebuild the widget store from recent channel history.

use std::sync::Arc;

use serde::Serialize;

use crate::platform::{DISCORD_MAX_HISTORY_PAGE, HistoryMessage, HostPlatform, PlatformError};

use super::codec::{SELECTOR_TITLE, decode_widget, is_own_widget_marker};
use super::error::DecodeError;
use super::store::{Registration, WidgetStore};
use super::types::{ChannelId, GuildId, MessageId, SelectorConfig, UserId, WidgetRecord};

/// Default number of recent messages inspected per channel.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;
/// Hard ceiling on messages inspected per channel.
pub const MAX_HISTORY_LIMIT: usize = 1000;

/// A bot-authored message that carries an own-looking widget, or the selector
/// embed with its widget gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ScannedSelector {
    pub(crate) message_id: MessageId,
    pub(crate) decoded: Result<SelectorConfig, DecodeError>,
}

/// Result of scanning one channel.
#[derive(Debug, Clone, Default)]
pub(crate) struct ChannelScan {
    pub(crate) inspected: usize,
    pub(crate) selectors: Vec<ScannedSelector>,
    /// Oldest message inspected.
    pub(crate) oldest: Option<MessageId>,
    /// History ended before the limit was reached.
    pub(crate) exhausted: bool,
}

impl ChannelScan {
    /// Whether `message_id` would have been inspected had it still existed.
    pub(crate) fn covers(&self, message_id: MessageId) -> bool {
        self.exhausted || self.oldest.is_some_and(|oldest| message_id >= oldest)
    }
}

/// One channel (or guild) the pass could not read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanFailure {
    pub scope: String,
    pub error: String,
}

/// Totals for a recovery pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecoveryReport {
    pub channels_scanned: usize,
    pub channels_failed: usize,
    pub messages_inspected: usize,
    pub widgets_recovered: usize,
    pub widgets_skipped: usize,
    pub failures: Vec<ScanFailure>,
}

/// Walks bounded history and registers every decodable selector.
pub struct RecoveryScanner {
    platform: Arc<dyn HostPlatform>,
    store: Arc<WidgetStore>,
}

impl RecoveryScanner {
    pub fn new(platform: Arc<dyn HostPlatform>, store: Arc<WidgetStore>) -> Self {
        Self { platform, store }
    }

    /// Channels to scan: text channels of `guilds`, or of every guild the bot
    /// is in when `guilds` is empty. Guild listing failures are recorded in
    /// `report` and skipped.
    pub async fn discover_channels(
        &self,
        guilds: &[GuildId],
        report: &mut RecoveryReport,
    ) -> Result<Vec<ChannelId>, PlatformError> {
        let guilds = if guilds.is_empty() {
            self.platform.list_guilds().await?
        } else {
            guilds.to_vec()
        };
        let mut channels = Vec::new();
        for guild in guilds {
            match self.platform.list_text_channels(guild).await {
                Ok(found) => channels.extend(found),
                Err(error) => {
                    tracing::warn!(
                        event = "selector.recovery.guild.failed",
                        guild_id = %guild,
                        error = %error,
                        "failed to list guild channels; skipping guild"
                    );
                    report.failures.push(ScanFailure {
                        scope: format!("guild:{guild}"),
                        error: error.to_string(),
                    });
                }
            }
        }
        Ok(channels)
    }

    /// Discover channels and recover them in one pass.
    pub async fn recover_guilds(
        &self,
        guilds: &[GuildId],
        history_limit: usize,
    ) -> Result<RecoveryReport, PlatformError> {
        let mut report = RecoveryReport::default();
        let channels = self.discover_channels(guilds, &mut report).await?;
        let channel_report = self.recover(&channels, history_limit).await?;
        report.channels_scanned = channel_report.channels_scanned;
        report.channels_failed = channel_report.channels_failed;
        report.messages_inspected = channel_report.messages_inspected;
        report.widgets_recovered = channel_report.widgets_recovered;
        report.widgets_skipped = channel_report.widgets_skipped;
        report.failures.extend(channel_report.failures);
        Ok(report)
    }

    /// Scan each channel's most recent `history_limit` messages.
    ///
    /// Only the bot identity lookup is fatal. A channel that cannot be read
    /// is logged, counted and skipped; undecodable markers are skipped.
    pub async fn recover(
        &self,
        channels: &[ChannelId],
        history_limit: usize,
    ) -> Result<RecoveryReport, PlatformError> {
        let own_id = self.platform.current_user_id().await?;
        let history_limit = history_limit.clamp(1, MAX_HISTORY_LIMIT);
        let mut report = RecoveryReport::default();

        for &channel in channels {
            let scan = match scan_channel(self.platform.as_ref(), own_id, channel, history_limit)
                .await
            {
                Ok(scan) => scan,
                Err(error) => {
                    tracing::warn!(
                        event = "selector.recovery.channel.failed",
                        channel_id = %channel,
                        error = %error,
                        "failed to scan channel history; continuing"
                    );
                    report.channels_failed += 1;
                    report.failures.push(ScanFailure {
                        scope: format!("channel:{channel}"),
                        error: error.to_string(),
                    });
                    continue;
                }
            };
            report.channels_scanned += 1;
            report.messages_inspected += scan.inspected;
            for selector in scan.selectors {
                match selector.decoded {
                    Ok(config) => {
                        let record = WidgetRecord::new(selector.message_id, channel, config);
                        if self.store.register(record).await != Registration::Unchanged {
                            tracing::debug!(
                                event = "selector.recovery.widget.registered",
                                channel_id = %channel,
                                message_id = %selector.message_id,
                                "recovered role selector"
                            );
                        }
                        report.widgets_recovered += 1;
                    }
                    Err(error) => {
                        tracing::debug!(
                            event = "selector.recovery.widget.skipped",
                            channel_id = %channel,
                            message_id = %selector.message_id,
                            error = %error,
                            "skipping undecodable role selector"
                        );
                        report.widgets_skipped += 1;
                    }
                }
            }
        }

        tracing::info!(
            event = "selector.recovery.completed",
            channels_scanned = report.channels_scanned,
            channels_failed = report.channels_failed,
            widgets_recovered = report.widgets_recovered,
            widgets_skipped = report.widgets_skipped,
            "role selector recovery completed"
        );
        Ok(report)
    }
}

/// Page backwards through `channel` until `history_limit` messages were seen.
pub(crate) async fn scan_channel(
    platform: &dyn HostPlatform,
    own_id: UserId,
    channel: ChannelId,
    history_limit: usize,
) -> Result<ChannelScan, PlatformError> {
    let mut scan = ChannelScan::default();
    let mut before = None;

    while scan.inspected < history_limit {
        let page_size = (history_limit - scan.inspected).min(DISCORD_MAX_HISTORY_PAGE);
        let page = platform.fetch_messages(channel, before, page_size).await?;
        let page_len = page.len();
        for message in page.into_iter().take(page_size) {
            before = Some(message.id);
            scan.oldest = Some(message.id);
            scan.inspected += 1;
            if let Some(selector) = own_selector(&message, own_id) {
                scan.selectors.push(selector);
            }
        }
        if page_len < page_size {
            scan.exhausted = true;
            break;
        }
    }
    Ok(scan)
}

fn own_selector(message: &HistoryMessage, own_id: UserId) -> Option<ScannedSelector> {
    if message.author_id != own_id {
        return None;
    }
    let mut first_error = None;
    for widget in message
        .widgets
        .iter()
        .filter(|widget| is_own_widget_marker(&widget.custom_id))
    {
        match decode_widget(widget) {
            Ok(config) => {
                return Some(ScannedSelector {
                    message_id: message.id,
                    decoded: Ok(config),
                });
            }
            Err(error) => {
                first_error.get_or_insert(error);
            }
        }
    }
    if first_error.is_none() && message.embed_title.as_deref() == Some(SELECTOR_TITLE) {
        first_error = Some(DecodeError::MissingWidget);
    }
    first_error.map(|error| ScannedSelector {
        message_id: message.id,
        decoded: Err(error),
    })
}

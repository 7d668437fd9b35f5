use tracing::{debug, warn};

use shared_config::AppConfig;

use crate::models::{DispatchResult, NotificationError};
use crate::services::channels::{Channel, SimulationChannel, SmsChannel, WhatsAppChannel};
use crate::services::phone::normalize_phone;

/// Attempts delivery through an ordered channel preference chain.
///
/// Unconfigured channels are skipped without a network attempt; a transport
/// failure falls through to the next channel and is never retried on the
/// same channel within one `send`. The simulation channel at the end of the
/// default chain makes credential-less environments succeed loudly instead
/// of failing silently.
pub struct NotificationDispatcher {
    channels: Vec<Box<dyn Channel>>,
    country_code: String,
}

impl NotificationDispatcher {
    /// Default chain in preference order. Providers without credentials are
    /// left out entirely; simulation closes the chain so the dispatcher
    /// always has somewhere to land.
    pub fn new(config: &AppConfig) -> Self {
        let mut channels: Vec<Box<dyn Channel>> = Vec::new();
        if config.is_sms_configured() {
            channels.push(Box::new(SmsChannel::new(config)));
        }
        if config.is_whatsapp_configured() {
            channels.push(Box::new(WhatsAppChannel::new(config)));
        }
        channels.push(Box::new(SimulationChannel));

        Self {
            channels,
            country_code: config.country_code.clone(),
        }
    }

    /// Override the channel chain; used by tests and callers with a
    /// non-default preference order.
    pub fn with_channels(channels: Vec<Box<dyn Channel>>, country_code: &str) -> Self {
        Self {
            channels,
            country_code: country_code.to_string(),
        }
    }

    /// Send one message to one recipient. Phone validation happens before
    /// any network attempt; provider failures are absorbed into the result
    /// rather than propagated.
    pub async fn send(&self, recipient: &str, body: &str) -> Result<DispatchResult, NotificationError> {
        let number = normalize_phone(recipient, &self.country_code)?;

        let mut last_error = None;

        for channel in &self.channels {
            if !channel.is_configured() {
                debug!("Channel {} not configured, skipping", channel.kind());
                continue;
            }

            match channel.deliver(&number, body).await {
                Ok(()) => {
                    return Ok(DispatchResult {
                        recipient: number,
                        success: true,
                        channel_used: Some(channel.kind()),
                        error: None,
                    });
                }
                Err(e) => {
                    warn!("Channel {} failed for {}: {}", channel.kind(), number, e);
                    last_error = Some(e.to_string());
                }
            }
        }

        Ok(DispatchResult {
            recipient: number,
            success: false,
            channel_used: None,
            error: Some(
                last_error.unwrap_or_else(|| "no notification channel configured".to_string()),
            ),
        })
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// One concrete way of delivering a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Sms,
    Whatsapp,
    Simulation,
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelKind::Sms => write!(f, "sms"),
            ChannelKind::Whatsapp => write!(f, "whatsapp"),
            ChannelKind::Simulation => write!(f, "simulation"),
        }
    }
}

/// Ephemeral result of one dispatch attempt. Consumed immediately by the
/// caller to decide whether to set a sent flag; never persisted here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchResult {
    pub recipient: String,
    pub success: bool,
    pub channel_used: Option<ChannelKind>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TestSendRequest {
    pub phone: String,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    #[error("Provider error: {0}")]
    ProviderError(String),
}

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use shared_config::AppConfig;

use crate::models::{ChannelKind, NotificationError};

const DEFAULT_SMS_BASE_URL: &str = "https://sms.api.example.com";
const DEFAULT_WHATSAPP_BASE_URL: &str = "https://wa.api.example.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(12);

/// One concrete delivery mechanism. Implementations must not retry
/// internally; the dispatcher owns the fallback chain.
#[async_trait]
pub trait Channel: Send + Sync {
    fn kind(&self) -> ChannelKind;

    /// Fast local credential check; no network involved. An unconfigured
    /// channel is skipped by the dispatcher without an attempt.
    fn is_configured(&self) -> bool;

    /// Deliver `body` to the normalized recipient number. Transport
    /// failures (non-2xx, network error, malformed response) surface as
    /// `ProviderError` so the dispatcher can fall through.
    async fn deliver(&self, to: &str, body: &str) -> Result<(), NotificationError>;
}

fn http_client() -> Client {
    // Static settings only; construction cannot fail at runtime.
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .expect("provider HTTP client")
}

/// Primary transactional SMS provider.
pub struct SmsChannel {
    client: Client,
    api_key: String,
    sender_id: String,
    base_url: String,
}

impl SmsChannel {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: http_client(),
            api_key: config.sms_api_key.clone(),
            sender_id: config.sms_sender_id.clone(),
            base_url: DEFAULT_SMS_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }
}

#[async_trait]
impl Channel for SmsChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Sms
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn deliver(&self, to: &str, body: &str) -> Result<(), NotificationError> {
        let url = format!("{}/v2/send", self.base_url);
        debug!("Sending SMS via {}", url);

        let request_body = json!({
            "sender_id": self.sender_id,
            "numbers": to,
            "message": body,
        });

        let response = self
            .client
            .post(&url)
            .header("authorization", &self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| NotificationError::ProviderError(format!("sms transport: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| NotificationError::ProviderError(format!("sms body: {}", e)))?;

        if !status.is_success() {
            error!("SMS provider error ({}): {}", status, text);
            return Err(NotificationError::ProviderError(format!(
                "sms HTTP {}: {}",
                status, text
            )));
        }

        let parsed: Value = serde_json::from_str(&text)
            .map_err(|e| NotificationError::ProviderError(format!("sms malformed body: {}", e)))?;

        if parsed["return"].as_bool() != Some(true) {
            return Err(NotificationError::ProviderError(format!(
                "sms rejected: {}",
                text
            )));
        }

        info!("SMS delivered to {}", to);
        Ok(())
    }
}

/// Secondary provider delivering over WhatsApp.
pub struct WhatsAppChannel {
    client: Client,
    api_key: String,
    base_url: String,
}

impl WhatsAppChannel {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: http_client(),
            api_key: config.whatsapp_api_key.clone(),
            base_url: DEFAULT_WHATSAPP_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }
}

#[async_trait]
impl Channel for WhatsAppChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Whatsapp
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn deliver(&self, to: &str, body: &str) -> Result<(), NotificationError> {
        let url = format!("{}/wa/send", self.base_url);
        debug!("Sending WhatsApp message via {}", url);

        let request_body = json!({
            "to": to,
            "body": body,
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| NotificationError::ProviderError(format!("whatsapp transport: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| NotificationError::ProviderError(format!("whatsapp body: {}", e)))?;

        if !status.is_success() {
            error!("WhatsApp provider error ({}): {}", status, text);
            return Err(NotificationError::ProviderError(format!(
                "whatsapp HTTP {}: {}",
                status, text
            )));
        }

        let parsed: Value = serde_json::from_str(&text).map_err(|e| {
            NotificationError::ProviderError(format!("whatsapp malformed body: {}", e))
        })?;

        if parsed["status"].as_str() != Some("success") {
            return Err(NotificationError::ProviderError(format!(
                "whatsapp rejected: {}",
                text
            )));
        }

        info!("WhatsApp message delivered to {}", to);
        Ok(())
    }
}

/// No-op channel for environments without provider credentials. Always
/// configured, always reports success.
pub struct SimulationChannel;

#[async_trait]
impl Channel for SimulationChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Simulation
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn deliver(&self, to: &str, body: &str) -> Result<(), NotificationError> {
        info!("[simulation] would send to {}: {}", to, body);
        Ok(())
    }
}

use std::env;
use tracing::warn;

/// Application configuration loaded from the environment.
///
/// Notification provider credentials are optional: an absent key is a
/// normal, checked state that routes sends to the next channel in the
/// preference chain (ultimately the simulation channel).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_role_key: String,
    pub sms_api_key: String,
    pub whatsapp_api_key: String,
    pub sms_sender_id: String,
    pub country_code: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL").unwrap_or_else(|_| {
                warn!("SUPABASE_URL not set, using empty value");
                String::new()
            }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY").unwrap_or_else(|_| {
                warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                String::new()
            }),
            supabase_service_role_key: env::var("SUPABASE_SERVICE_ROLE_KEY").unwrap_or_else(|_| {
                warn!("SUPABASE_SERVICE_ROLE_KEY not set, using empty value");
                String::new()
            }),
            sms_api_key: env::var("SMS_API_KEY").unwrap_or_default(),
            whatsapp_api_key: env::var("WHATSAPP_API_KEY").unwrap_or_default(),
            sms_sender_id: env::var("SMS_SENDER_ID").unwrap_or_else(|_| "CLINIC".to_string()),
            country_code: env::var("PHONE_COUNTRY_CODE").unwrap_or_else(|_| "91".to_string()),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }

    pub fn is_sms_configured(&self) -> bool {
        !self.sms_api_key.is_empty()
    }

    pub fn is_whatsapp_configured(&self) -> bool {
        !self.whatsapp_api_key.is_empty()
    }
}

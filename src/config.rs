use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;
use crate::message::is_valid_email;

pub const DEFAULT_CONFIG_PATH: &str = "resend-relay.toml";

pub const DEFAULT_SEND_ENDPOINT: &str = "https://api.resend.com/emails";
pub const DEFAULT_DOMAIN_LIST_ENDPOINT: &str = "https://api.resend.com/domains";

/// Timeout for real sends, in seconds.
pub const DEFAULT_SEND_TIMEOUT_SECS: u64 = 30;
/// Timeout for the domain-list health check, in seconds.
pub const DEFAULT_CHECK_TIMEOUT_SECS: u64 = 15;

/// Where the provider lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub send_endpoint: String,
    pub domain_list_endpoint: String,
    pub timeout_secs: u64,
    pub check_timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            send_endpoint: DEFAULT_SEND_ENDPOINT.to_string(),
            domain_list_endpoint: DEFAULT_DOMAIN_LIST_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_SEND_TIMEOUT_SECS,
            check_timeout_secs: DEFAULT_CHECK_TIMEOUT_SECS,
        }
    }
}

/// Operator-facing settings: API key, sender identity and the two switches.
///
/// Loaded once and then treated as read-only for the whole send cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MailerSettings {
    pub api_key: String,
    pub from_email: String,
    pub from_name: String,
    pub enabled: bool,
    pub fallback_enabled: bool,
    pub provider: ProviderSettings,
}

/// Immutable per-call view handed to the Delivery Client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub api_key: String,
    pub send_endpoint: String,
    pub domain_list_endpoint: String,
    pub timeout: Duration,
    pub check_timeout: Duration,
}

impl ProviderConfig {
    /// Default Resend endpoints and timeouts with the given key.
    pub fn new(api_key: impl Into<String>) -> Self {
        ProviderSettings::default().with_key(api_key.into())
    }
}

impl ProviderSettings {
    fn with_key(&self, api_key: String) -> ProviderConfig {
        ProviderConfig {
            api_key,
            send_endpoint: self.send_endpoint.clone(),
            domain_list_endpoint: self.domain_list_endpoint.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            check_timeout: Duration::from_secs(self.check_timeout_secs),
        }
    }
}

impl MailerSettings {
    /// Read settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        Self::from_toml_str(&raw).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        let settings: Self = toml::from_str(raw)?;
        Ok(settings.normalized())
    }

    /// Strip stray whitespace from the key and sender identity.
    pub fn normalized(mut self) -> Self {
        self.api_key = self.api_key.trim().to_string();
        self.from_email = self.from_email.trim().to_string();
        self.from_name = self.from_name.trim().to_string();
        self
    }

    /// Build settings from the host's flat option store.
    ///
    /// Missing keys keep their defaults; booleans accept "true" or "1".
    pub fn from_map(options: &HashMap<String, String>) -> Self {
        let get = |key: &str| options.get(key).map(|v| v.trim().to_string()).unwrap_or_default();
        let get_bool = |key: &str| {
            options
                .get(key)
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false)
        };

        let mut provider = ProviderSettings::default();
        if let Some(v) = options.get("resend_send_endpoint").filter(|v| !v.is_empty()) {
            provider.send_endpoint = v.clone();
        }
        if let Some(v) = options.get("resend_domain_list_endpoint").filter(|v| !v.is_empty()) {
            provider.domain_list_endpoint = v.clone();
        }

        Self {
            api_key: get("resend_api_key"),
            from_email: get("resend_from_email"),
            from_name: get("resend_from_name"),
            enabled: get_bool("resend_enabled"),
            fallback_enabled: get_bool("resend_fallback_enabled"),
            provider,
        }
    }

    /// Check the sender address and endpoint URLs.
    ///
    /// An empty sender is accepted here; sends reject it later.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.from_email.is_empty() && !is_valid_email(&self.from_email) {
            return Err(ConfigError::InvalidFromEmail(self.from_email.clone()));
        }
        for endpoint in [&self.provider.send_endpoint, &self.provider.domain_list_endpoint] {
            url::Url::parse(endpoint).map_err(|source| ConfigError::InvalidEndpoint {
                url: endpoint.clone(),
                source,
            })?;
        }
        Ok(())
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn provider_config(&self) -> ProviderConfig {
        self.provider.with_key(self.api_key.trim().to_string())
    }
}

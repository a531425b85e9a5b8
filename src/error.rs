use thiserror::Error;

/// Everything that can stop a message from reaching the provider.
///
/// The `Display` text is the human-readable reason carried by
/// `DeliveryOutcome::Failure`, so provider errors render as the provider's
/// own message rather than a status line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("missing api key")]
    MissingApiKey,

    #[error("invalid sender address: {0:?}")]
    InvalidSender(String),

    #[error("message has no recipients")]
    NoRecipients,

    #[error("{0}")]
    Transport(String),

    #[error("invalid API key")]
    InvalidApiKey,

    #[error("{message}")]
    Provider { status: u16, message: String },

    #[error("attachment {path}: {reason}")]
    AttachmentRead { path: String, reason: String },
}

impl DeliveryError {
    /// True for errors detected before any network call.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingApiKey | Self::InvalidSender(_) | Self::NoRecipients
        )
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("\"From Email Address\" is invalid: {0:?}")]
    InvalidFromEmail(String),

    #[error("invalid endpoint {url:?}: {source}")]
    InvalidEndpoint {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

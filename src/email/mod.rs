pub mod payload;
pub mod resend;
pub mod transport;

pub use resend::{check_connection, send, try_send};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};

/// Result of one provider call. Consumed immediately, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Success,
    Failure(String),
}

impl DeliveryOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Success => None,
            Self::Failure(r) => Some(r),
        }
    }
}

/// What the domain list says about the sender's domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionCheck {
    Verified { domain: String },
    Unverified { domain: String, status: String },
    DomainNotFound { domain: String },
}

impl ConnectionCheck {
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified { .. })
    }

    pub fn message(&self) -> String {
        match self {
            Self::Verified { domain } => format!(
                "Connection successful. Domain {} is verified and ready to send.",
                domain
            ),
            Self::Unverified { domain, status } => format!(
                "API key is valid, but domain {} is not verified yet (status: {}).",
                domain, status
            ),
            Self::DomainNotFound { domain } => format!(
                "API key is valid, but domain {} was not found in your Resend account.",
                domain
            ),
        }
    }
}

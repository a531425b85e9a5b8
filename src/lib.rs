//! Relay outgoing transactional mail through the Resend HTTP API.
//!
//! The host hands its in-flight message to [`MailInterceptor::handle`] from
//! its "about to send" hook. The message is captured, cleared, and sent with
//! one synchronous provider call. On failure it is either restored for the
//! host's native mailer or dropped, depending on the fallback setting.

pub mod admin;
pub mod config;
pub mod email;
pub mod error;
pub mod host;
pub mod interceptor;
pub mod message;


pub use config::{MailerSettings, ProviderConfig};
pub use email::{DeliveryOutcome, HttpTransport, ReqwestTransport};
pub use error::{ConfigError, DeliveryError};
pub use host::{CapturedState, MailHost, PendingMail, Transmission};
pub use interceptor::{Decision, MailInterceptor, SendFailure};
pub use message::{Attachment, CustomHeader, OutboundMessage, Recipient};

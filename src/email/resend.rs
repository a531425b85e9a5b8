use serde_json::Value;

use super::payload;
use super::transport::HttpTransport;
use super::{ConnectionCheck, DeliveryOutcome};
use crate::config::ProviderConfig;
use crate::error::DeliveryError;
use crate::message::{email_domain, is_valid_email, OutboundMessage};

/// Send one message through the Resend API
/// (https://resend.com/docs/api-reference/emails/send-email).
///
/// Never panics and never returns an error to the caller: every failure is
/// logged and folded into `DeliveryOutcome::Failure`.
pub fn send(
    config: &ProviderConfig,
    message: &OutboundMessage,
    transport: &dyn HttpTransport,
) -> DeliveryOutcome {
    match try_send(config, message, transport) {
        Ok(()) => DeliveryOutcome::Success,
        Err(e) => {
            log_failure(&e, message);
            DeliveryOutcome::Failure(e.to_string())
        }
    }
}

/// Same as `send`, keeping the typed error for callers that branch on it.
pub fn try_send(
    config: &ProviderConfig,
    message: &OutboundMessage,
    transport: &dyn HttpTransport,
) -> Result<(), DeliveryError> {
    if config.api_key.is_empty() {
        return Err(DeliveryError::MissingApiKey);
    }
    if !is_valid_email(&message.from_email) {
        return Err(DeliveryError::InvalidSender(message.from_email.clone()));
    }
    if message.to.is_empty() {
        return Err(DeliveryError::NoRecipients);
    }

    let body = payload::build(message);

    let resp = transport
        .post_json(&config.send_endpoint, &config.api_key, &body, config.timeout)
        .map_err(DeliveryError::Transport)?;

    if resp.status >= 400 {
        return Err(DeliveryError::Provider {
            status: resp.status,
            message: error_message(&resp.body),
        });
    }

    Ok(())
}

fn log_failure(err: &DeliveryError, message: &OutboundMessage) {
    let to: Vec<&str> = message.to.iter().map(|r| r.email.as_str()).collect();
    match err {
        DeliveryError::Provider { status, message: text } => log::error!(
            "[resend] API status {}: {} (to: {}, subject: {:?})",
            status,
            text,
            to.join(", "),
            message.subject
        ),
        DeliveryError::Transport(text) => log::error!(
            "[resend] Request failed: {} (to: {}, subject: {:?})",
            text,
            to.join(", "),
            message.subject
        ),
        other => log::error!(
            "[resend] Not sent: {} (to: {}, subject: {:?})",
            other,
            to.join(", "),
            message.subject
        ),
    }
}

/// Pull a readable message out of an error body: `message`, then
/// `error.message`, then "Unknown error".
pub fn error_message(body: &str) -> String {
    let json: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => return "Unknown error".to_string(),
    };
    json.get("message")
        .and_then(|m| m.as_str())
        .or_else(|| {
            json.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
        })
        .unwrap_or("Unknown error")
        .to_string()
}

/// Health check: list the account's domains and look for the sender's.
///
/// A valid key with a missing or unverified sender domain is still `Ok`;
/// the returned `ConnectionCheck` carries the warning text.
pub fn check_connection(
    config: &ProviderConfig,
    sender_email: &str,
    transport: &dyn HttpTransport,
) -> Result<ConnectionCheck, DeliveryError> {
    if config.api_key.is_empty() {
        return Err(DeliveryError::MissingApiKey);
    }
    let domain = email_domain(sender_email)
        .ok_or_else(|| DeliveryError::InvalidSender(sender_email.to_string()))?;

    let resp = transport
        .get(&config.domain_list_endpoint, &config.api_key, config.check_timeout)
        .map_err(|e| {
            log::error!("[resend] Health check request failed: {}", e);
            DeliveryError::Transport(e)
        })?;

    if resp.status == 401 {
        log::warn!("[resend] Health check rejected the API key");
        return Err(DeliveryError::InvalidApiKey);
    }
    if !resp.is_success() {
        let message = error_message(&resp.body);
        log::error!("[resend] Health check API status {}: {}", resp.status, message);
        return Err(DeliveryError::Provider {
            status: resp.status,
            message,
        });
    }

    let json: Value = serde_json::from_str(&resp.body).unwrap_or(Value::Null);
    let found = json
        .get("data")
        .and_then(|d| d.as_array())
        .into_iter()
        .flatten()
        .find(|d| {
            d.get("name")
                .and_then(|n| n.as_str())
                .map(|n| n.eq_ignore_ascii_case(&domain))
                .unwrap_or(false)
        });

    let check = match found {
        None => ConnectionCheck::DomainNotFound { domain },
        Some(d) => {
            let status = d
                .get("status")
                .and_then(|s| s.as_str())
                .unwrap_or("unknown")
                .to_string();
            if status == "verified" {
                ConnectionCheck::Verified { domain }
            } else {
                ConnectionCheck::Unverified { domain, status }
            }
        }
    };
    log::info!("[resend] Health check: {}", check.message());
    Ok(check)
}

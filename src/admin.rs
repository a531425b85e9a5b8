use serde::Serialize;

use crate::config::MailerSettings;
use crate::email::{self, HttpTransport};
use crate::error::DeliveryError;
use crate::message::{is_valid_email, OutboundMessage, Recipient};

/// Result of an admin action, ready to render or serialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolResult {
    pub ok: bool,
    pub message: String,
    pub details: Option<String>,
}

impl ToolResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
            details: None,
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Send a fixed test message to `to` with the configured sender.
pub fn send_test_email(
    settings: &MailerSettings,
    to: &str,
    site_name: &str,
    transport: &dyn HttpTransport,
) -> ToolResult {
    let to = to.trim();
    if !is_valid_email(to) {
        return ToolResult::err("Please provide a valid email address.");
    }
    if !settings.has_api_key() {
        return ToolResult::err("Resend API key is not set. Please configure it in the settings.");
    }
    if !is_valid_email(&settings.from_email) {
        return ToolResult::err(
            "\"From Email Address\" is not configured or invalid. Please check the settings.",
        );
    }

    let message = OutboundMessage {
        from_email: settings.from_email.clone(),
        from_name: settings.from_name.clone(),
        to: vec![Recipient::bare(to)],
        subject: format!("Test Email from {}", site_name),
        html_body: format!(
            "<p>This is a test email sent from {} via Resend.</p>\
             <p>If you received this, your Resend API configuration is working.</p>",
            site_name
        ),
        ..Default::default()
    };

    let outcome = email::send(&settings.provider_config(), &message, transport);
    match outcome.reason() {
        None => {
            log::info!("[admin] Test email sent to {}", to);
            ToolResult::ok(format!("Test email sent successfully to {}!", to))
        }
        Some(reason) => ToolResult::err(
            "Failed to send test email. Please check the settings and the error log for more details.",
        )
        .with_details(reason),
    }
}

/// Verify the API key and report on the sender domain.
pub fn check_connection(settings: &MailerSettings, transport: &dyn HttpTransport) -> ToolResult {
    match email::check_connection(&settings.provider_config(), &settings.from_email, transport) {
        Ok(check) => ToolResult::ok(check.message()),
        Err(DeliveryError::MissingApiKey) => {
            ToolResult::err("Resend API key is not set. Please configure it in the settings.")
        }
        Err(DeliveryError::InvalidSender(addr)) => ToolResult::err(
            "\"From Email Address\" is not configured or invalid. Please check the settings.",
        )
        .with_details(addr),
        Err(DeliveryError::InvalidApiKey) => {
            ToolResult::err("Invalid API key. Please check your Resend API key.")
        }
        Err(DeliveryError::Provider { status, message }) => {
            ToolResult::err(format!("Resend API error (status {}): {}", status, message))
        }
        Err(e) => ToolResult::err(format!("Could not reach Resend: {}", e)),
    }
}

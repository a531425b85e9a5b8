//! The host mailer's side of the hook.
//!
//! `MailHost` is the mutable message object the host passes to its
//! "about to send" extension point. The interceptor only ever reads it
//! through [`CapturedState::capture`] and writes it through [`crate::interceptor::apply`].

use serde::{Deserialize, Serialize};

use crate::message::{Attachment, CustomHeader, OutboundMessage, Recipient};

/// Which path the host takes after the hook returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Transmission {
    /// The host's own mailer (mail, sendmail, SMTP) sends the message.
    #[default]
    Native,
    /// Already handled by the relay; the host's send step is a no-op.
    Routed,
}

/// Operations the interceptor needs on the host's in-flight message.
pub trait MailHost {
    fn to_addresses(&self) -> Vec<Recipient>;
    fn cc_addresses(&self) -> Vec<Recipient>;
    fn bcc_addresses(&self) -> Vec<Recipient>;
    fn reply_to_addresses(&self) -> Vec<Recipient>;
    fn subject(&self) -> String;
    fn body(&self) -> String;
    fn alt_body(&self) -> String;
    fn custom_headers(&self) -> Vec<CustomHeader>;
    fn attachments(&self) -> Vec<Attachment>;
    fn sender(&self) -> String;
    fn transmission(&self) -> Transmission;

    fn add_address(&mut self, recipient: &Recipient);
    fn add_cc(&mut self, recipient: &Recipient);
    fn add_bcc(&mut self, recipient: &Recipient);
    fn add_reply_to(&mut self, recipient: &Recipient);
    fn add_custom_header(&mut self, header: &CustomHeader);
    /// Hosts may refuse an attachment (e.g. the file vanished).
    fn add_attachment(&mut self, attachment: &Attachment) -> Result<(), String>;

    /// Clears to, cc and bcc.
    fn clear_all_recipients(&mut self);
    fn clear_reply_tos(&mut self);
    fn clear_custom_headers(&mut self);
    fn clear_attachments(&mut self);

    fn set_subject(&mut self, subject: &str);
    fn set_body(&mut self, body: &str);
    fn set_alt_body(&mut self, alt_body: &str);
    fn set_sender(&mut self, sender: &str);
    fn set_transmission(&mut self, transmission: Transmission);
}

/// In-memory host message. Host adapters can build one from their own
/// message type, run the hook on it, and copy the result back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingMail {
    pub to: Vec<Recipient>,
    pub cc: Vec<Recipient>,
    pub bcc: Vec<Recipient>,
    pub reply_to: Vec<Recipient>,
    pub subject: String,
    pub body: String,
    pub alt_body: String,
    pub headers: Vec<CustomHeader>,
    pub attachments: Vec<Attachment>,
    pub sender: String,
    pub transmission: Transmission,
}

impl PendingMail {
    /// Whether the host's own send step would transmit anything.
    pub fn will_send_natively(&self) -> bool {
        self.transmission == Transmission::Native && !self.to.is_empty()
    }
}

impl MailHost for PendingMail {
    fn to_addresses(&self) -> Vec<Recipient> {
        self.to.clone()
    }
    fn cc_addresses(&self) -> Vec<Recipient> {
        self.cc.clone()
    }
    fn bcc_addresses(&self) -> Vec<Recipient> {
        self.bcc.clone()
    }
    fn reply_to_addresses(&self) -> Vec<Recipient> {
        self.reply_to.clone()
    }
    fn subject(&self) -> String {
        self.subject.clone()
    }
    fn body(&self) -> String {
        self.body.clone()
    }
    fn alt_body(&self) -> String {
        self.alt_body.clone()
    }
    fn custom_headers(&self) -> Vec<CustomHeader> {
        self.headers.clone()
    }
    fn attachments(&self) -> Vec<Attachment> {
        self.attachments.clone()
    }
    fn sender(&self) -> String {
        self.sender.clone()
    }
    fn transmission(&self) -> Transmission {
        self.transmission
    }

    fn add_address(&mut self, recipient: &Recipient) {
        self.to.push(recipient.clone());
    }
    fn add_cc(&mut self, recipient: &Recipient) {
        self.cc.push(recipient.clone());
    }
    fn add_bcc(&mut self, recipient: &Recipient) {
        self.bcc.push(recipient.clone());
    }
    fn add_reply_to(&mut self, recipient: &Recipient) {
        self.reply_to.push(recipient.clone());
    }
    fn add_custom_header(&mut self, header: &CustomHeader) {
        self.headers.push(header.clone());
    }
    fn add_attachment(&mut self, attachment: &Attachment) -> Result<(), String> {
        self.attachments.push(attachment.clone());
        Ok(())
    }

    fn clear_all_recipients(&mut self) {
        self.to.clear();
        self.cc.clear();
        self.bcc.clear();
    }
    fn clear_reply_tos(&mut self) {
        self.reply_to.clear();
    }
    fn clear_custom_headers(&mut self) {
        self.headers.clear();
    }
    fn clear_attachments(&mut self) {
        self.attachments.clear();
    }

    fn set_subject(&mut self, subject: &str) {
        self.subject = subject.to_string();
    }
    fn set_body(&mut self, body: &str) {
        self.body = body.to_string();
    }
    fn set_alt_body(&mut self, alt_body: &str) {
        self.alt_body = alt_body.to_string();
    }
    fn set_sender(&mut self, sender: &str) {
        self.sender = sender.to_string();
    }
    fn set_transmission(&mut self, transmission: Transmission) {
        self.transmission = transmission;
    }
}

/// Snapshot of the host message taken before any mutation. Owned by the
/// interceptor for exactly one send attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedState {
    pub to: Vec<Recipient>,
    pub cc: Vec<Recipient>,
    pub bcc: Vec<Recipient>,
    pub reply_to: Vec<Recipient>,
    pub subject: String,
    pub body: String,
    pub alt_body: String,
    pub headers: Vec<CustomHeader>,
    pub attachments: Vec<Attachment>,
    pub sender: String,
}

impl CapturedState {
    pub fn capture(host: &dyn MailHost) -> Self {
        Self {
            to: host.to_addresses(),
            cc: host.cc_addresses(),
            bcc: host.bcc_addresses(),
            reply_to: host.reply_to_addresses(),
            subject: host.subject(),
            body: host.body(),
            alt_body: host.alt_body(),
            headers: host.custom_headers(),
            attachments: host.attachments(),
            sender: host.sender(),
        }
    }

    /// The provider-facing message, with the configured sender identity.
    pub fn to_outbound(&self, from_email: &str, from_name: &str) -> OutboundMessage {
        OutboundMessage {
            from_email: from_email.to_string(),
            from_name: from_name.to_string(),
            to: self.to.clone(),
            cc: self.cc.clone(),
            bcc: self.bcc.clone(),
            reply_to: self.reply_to.clone(),
            subject: self.subject.clone(),
            html_body: self.body.clone(),
            text_body: Some(self.alt_body.clone()).filter(|t| !t.is_empty()),
            headers: self.headers.clone(),
            attachments: self.attachments.clone(),
        }
    }
}

/// Empty every field the host would transmit and mark it routed.
pub fn suppress(host: &mut dyn MailHost) {
    host.clear_all_recipients();
    host.clear_attachments();
    host.clear_custom_headers();
    host.clear_reply_tos();
    host.set_body("");
    host.set_alt_body("");
    host.set_subject("");
    host.set_sender("");
    host.set_transmission(Transmission::Routed);
}

/// Drop the message: keep it routed and make sure nothing is left to send.
pub fn block(host: &mut dyn MailHost) {
    host.set_transmission(Transmission::Routed);
    host.clear_all_recipients();
    host.set_body("");
}

/// Replay a snapshot onto the host and hand it back to the native path.
///
/// Recipients are re-added one by one so (address, name) pairs survive.
/// An attachment the host refuses is logged and skipped.
pub fn restore(host: &mut dyn MailHost, state: &CapturedState) {
    host.clear_all_recipients();
    for r in &state.to {
        host.add_address(r);
    }
    for r in &state.cc {
        host.add_cc(r);
    }
    for r in &state.bcc {
        host.add_bcc(r);
    }

    host.clear_reply_tos();
    for r in &state.reply_to {
        host.add_reply_to(r);
    }

    host.set_subject(&state.subject);
    host.set_body(&state.body);
    host.set_alt_body(&state.alt_body);

    host.clear_custom_headers();
    for h in &state.headers {
        host.add_custom_header(h);
    }

    host.clear_attachments();
    for a in &state.attachments {
        if let Err(e) = host.add_attachment(a) {
            log::error!(
                "[mailer] Fallback could not re-attach {}: {}",
                a.display_filename(),
                e
            );
        }
    }

    host.set_sender(&state.sender);
    host.set_transmission(Transmission::Native);
}

use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single address with an optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub email: String,
    #[serde(default)]
    pub name: String,
}

impl Recipient {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
        }
    }

    pub fn bare(email: impl Into<String>) -> Self {
        Self::new(email, "")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomHeader {
    pub name: String,
    pub value: String,
}

impl CustomHeader {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An attachment as the host mailer holds it: a file on disk plus the
/// metadata needed to re-attach it unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub file_path: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default = "default_encoding")]
    pub encoding: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default = "default_disposition")]
    pub disposition: String,
}

fn default_encoding() -> String {
    "base64".to_string()
}

fn default_disposition() -> String {
    "attachment".to_string()
}

impl Attachment {
    /// Attachment with the host's usual defaults (base64, "attachment").
    pub fn from_path(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            filename: String::new(),
            encoding: default_encoding(),
            mime_type: String::new(),
            disposition: default_disposition(),
        }
    }

    /// The name the provider sees: the captured filename, or the last
    /// component of the path when none was given.
    pub fn display_filename(&self) -> String {
        if !self.filename.is_empty() {
            return self.filename.clone();
        }
        Path::new(&self.file_path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file_path.clone())
    }
}

/// One outgoing email, normalized for the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub from_email: String,
    pub from_name: String,
    pub to: Vec<Recipient>,
    pub cc: Vec<Recipient>,
    pub bcc: Vec<Recipient>,
    pub reply_to: Vec<Recipient>,
    pub subject: String,
    pub html_body: String,
    pub text_body: Option<String>,
    pub headers: Vec<CustomHeader>,
    pub attachments: Vec<Attachment>,
}

impl OutboundMessage {
    /// `"Name <addr>"` when a display name is set, otherwise the bare address.
    pub fn from_header(&self) -> String {
        if self.from_name.is_empty() {
            self.from_email.clone()
        } else {
            format!("{} <{}>", self.from_name, self.from_email)
        }
    }

    /// Plain-text body, if one was given and is non-empty.
    pub fn text(&self) -> Option<&str> {
        self.text_body.as_deref().filter(|t| !t.is_empty())
    }
}

/// Syntactic address check. Anything lettre accepts as an `Address` passes;
/// surrounding whitespace does not.
pub fn is_valid_email(addr: &str) -> bool {
    !addr.is_empty() && addr.trim() == addr && addr.parse::<lettre::Address>().is_ok()
}

/// Domain part of an address, lowercased.
pub fn email_domain(addr: &str) -> Option<String> {
    let (_, domain) = addr.trim().rsplit_once('@')?;
    if domain.is_empty() {
        None
    } else {
        Some(domain.to_ascii_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_header_with_name() {
        let msg = OutboundMessage {
            from_email: "news@acme.test".into(),
            from_name: "Acme".into(),
            ..Default::default()
        };
        assert_eq!(msg.from_header(), "Acme <news@acme.test>");
    }

    #[test]
    fn test_from_header_bare() {
        let msg = OutboundMessage {
            from_email: "news@acme.test".into(),
            ..Default::default()
        };
        assert_eq!(msg.from_header(), "news@acme.test");
    }

    #[test]
    fn test_empty_text_body_is_none() {
        let mut msg = OutboundMessage::default();
        assert!(msg.text().is_none());
        msg.text_body = Some(String::new());
        assert!(msg.text().is_none());
        msg.text_body = Some("plain".into());
        assert_eq!(msg.text(), Some("plain"));
    }

    #[test]
    fn test_display_filename_falls_back_to_path() {
        let a = Attachment::from_path("/var/uploads/2024/invoice.pdf");
        assert_eq!(a.display_filename(), "invoice.pdf");
        let named = Attachment {
            filename: "Invoice March.pdf".into(),
            ..a
        };
        assert_eq!(named.display_filename(), "Invoice March.pdf");
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("user.name+tag@sub.example.org"));
        assert!(!is_valid_email(" a@x.com"));
        assert!(!is_valid_email("a@x.com\n"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("not-an-address"));
        assert!(!is_valid_email("two@@x.com"));
    }

    #[test]
    fn test_email_domain() {
        assert_eq!(email_domain("a@Example.COM"), Some("example.com".into()));
        assert_eq!(email_domain("nobody"), None);
        assert_eq!(email_domain("trailing@"), None);
    }
}

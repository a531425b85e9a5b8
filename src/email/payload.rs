use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Map, Value};

use crate::error::DeliveryError;
use crate::message::{Attachment, OutboundMessage, Recipient};

/// Build the JSON body for `POST /emails`.
///
/// Display names on to/cc/bcc are dropped and only the first reply-to
/// address is sent; the provider request takes bare address strings.
/// Unreadable attachments are logged and left out, and the `attachments`
/// key is omitted when none survive.
pub fn build(message: &OutboundMessage) -> Value {
    let mut data = Map::new();
    data.insert("from".into(), json!(message.from_header()));
    data.insert("to".into(), json!(addresses(&message.to)));
    data.insert("subject".into(), json!(message.subject));
    data.insert("html".into(), json!(message.html_body));

    if let Some(text) = message.text() {
        data.insert("text".into(), json!(text));
    }
    if !message.cc.is_empty() {
        data.insert("cc".into(), json!(addresses(&message.cc)));
    }
    if !message.bcc.is_empty() {
        data.insert("bcc".into(), json!(addresses(&message.bcc)));
    }
    if let Some(first) = message.reply_to.first() {
        data.insert("reply_to".into(), json!(first.email));
    }

    if !message.headers.is_empty() {
        let headers: Map<String, Value> = message
            .headers
            .iter()
            .map(|h| (h.name.clone(), json!(h.value)))
            .collect();
        data.insert("headers".into(), Value::Object(headers));
    }

    let attachments: Vec<Value> = message
        .attachments
        .iter()
        .filter_map(|a| match encode_attachment(a) {
            Ok(v) => Some(v),
            Err(e) => {
                log::error!("[resend] Skipping attachment: {}", e);
                None
            }
        })
        .collect();
    if !attachments.is_empty() {
        data.insert("attachments".into(), Value::Array(attachments));
    }

    Value::Object(data)
}

fn addresses(list: &[Recipient]) -> Vec<&str> {
    list.iter().map(|r| r.email.as_str()).collect()
}

/// Read and base64 the file behind one attachment.
pub fn encode_attachment(attachment: &Attachment) -> Result<Value, DeliveryError> {
    let path = std::path::Path::new(&attachment.file_path);
    if !path.is_file() {
        return Err(DeliveryError::AttachmentRead {
            path: attachment.file_path.clone(),
            reason: "file not found".into(),
        });
    }
    let content = std::fs::read(path).map_err(|e| DeliveryError::AttachmentRead {
        path: attachment.file_path.clone(),
        reason: format!("could not read file: {}", e),
    })?;

    Ok(json!({
        "filename": attachment.display_filename(),
        "content": STANDARD.encode(content),
    }))
}

use std::time::SystemTime;

use chrono::{DateTime, Utc};
use lettre::Message;
use lettre::message::{
    Attachment as MimeAttachment, Mailbox, MultiPart, SinglePart, header::ContentType,
};
use uuid::Uuid;

use crate::domain::{
    errors::DomainError,
    models::{Attachment, AttachmentFraming, EmailDraft, MessagePayload},
};

pub const LINKS_SEPARATOR: &str = "\n\nAdditional Links:\n";

const OCTET_STREAM: &str = "application/octet-stream";

/// Frames an [`EmailDraft`] into the single payload reused for every target.
pub struct MessageBuilder;

impl MessageBuilder {
    pub fn build(sender: &Mailbox, draft: &EmailDraft) -> Result<MessagePayload, DomainError> {
        Self::build_at(sender, draft, Utc::now())
    }

    /// Same inputs and timestamp give byte-identical output: the boundary and
    /// Message-ID are derived from the content.
    pub fn build_at(
        sender: &Mailbox,
        draft: &EmailDraft,
        created_at: DateTime<Utc>,
    ) -> Result<MessagePayload, DomainError> {
        let body = append_links(&draft.body, &draft.embedded_links);
        let fingerprint = fingerprint(&sender.to_string(), draft, &body, created_at);

        let mut builder = Message::builder()
            .from(sender.clone())
            .subject(draft.subject.clone())
            .date(SystemTime::from(created_at))
            .message_id(Some(format!(
                "<{}@{}>",
                fingerprint.simple(),
                sender.email.domain()
            )));

        for address in &draft.recipients {
            builder = builder.to(parse_mailbox(address)?);
        }
        for address in &draft.cc {
            builder = builder.cc(parse_mailbox(address)?);
        }
        for address in &draft.bcc {
            builder = builder.bcc(parse_mailbox(address)?);
        }

        let mut parts = MultiPart::mixed()
            .boundary(format!("mailer-{}", fingerprint.simple()))
            .singlepart(SinglePart::html(body.clone()));
        for attachment in &draft.attachments {
            parts = parts.singlepart(frame_attachment(attachment)?);
        }

        let message = builder
            .multipart(parts)
            .map_err(|e| DomainError::Framing(e.to_string()))?;

        Ok(MessagePayload::new(
            sender.email.clone(),
            draft.subject.clone(),
            body,
            draft.attachments.clone(),
            draft.recipients.clone(),
            draft.cc.clone(),
            draft.bcc.clone(),
            created_at,
            message.formatted(),
        ))
    }
}

pub fn append_links(body: &str, links: &[String]) -> String {
    if links.is_empty() {
        return body.to_string();
    }

    let mut out = String::with_capacity(body.len() + LINKS_SEPARATOR.len() + links.len() * 32);
    out.push_str(body);
    out.push_str(LINKS_SEPARATOR);
    out.push_str(&links.join("\n"));
    out
}

fn parse_mailbox(address: &str) -> Result<Mailbox, DomainError> {
    address
        .parse::<Mailbox>()
        .map_err(|e| DomainError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

/// Only `image/*` types are kept as declared; everything else, including
/// types that do not parse, is framed as `application/octet-stream`.
fn frame_attachment(attachment: &Attachment) -> Result<SinglePart, DomainError> {
    let declared = match attachment.framing() {
        AttachmentFraming::Image => ContentType::parse(&attachment.mime_type).ok(),
        AttachmentFraming::Binary => None,
    };
    let content_type = match declared {
        Some(content_type) => content_type,
        None => ContentType::parse(OCTET_STREAM)
            .map_err(|e| DomainError::Framing(e.to_string()))?,
    };

    Ok(MimeAttachment::new(attachment.filename.clone())
        .body(attachment.content.clone(), content_type))
}

fn fingerprint(sender: &str, draft: &EmailDraft, body: &str, created_at: DateTime<Utc>) -> Uuid {
    let mut material = Vec::new();
    for field in [sender, draft.subject.as_str(), body] {
        material.extend_from_slice(field.as_bytes());
        material.push(0);
    }
    for list in [&draft.recipients, &draft.cc, &draft.bcc] {
        for address in list {
            material.extend_from_slice(address.as_bytes());
            material.push(0);
        }
        material.push(0x1e);
    }
    for attachment in &draft.attachments {
        material.extend_from_slice(attachment.filename.as_bytes());
        material.push(0);
        material.extend_from_slice(attachment.mime_type.as_bytes());
        material.push(0);
        material.extend_from_slice(&attachment.content);
        material.push(0x1e);
    }
    material.extend_from_slice(created_at.to_rfc3339().as_bytes());

    Uuid::new_v5(&Uuid::NAMESPACE_OID, &material)
}

use chrono::{DateTime, Utc};
use lettre::Address;

use super::attachment::Attachment;

/// The framed message shared read-only by every send of a batch.
///
/// Only the message builder constructs it; there are no setters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePayload {
    sender: Address,
    subject: String,
    body: String,
    attachments: Vec<Attachment>,
    to: Vec<String>,
    cc: Vec<String>,
    bcc: Vec<String>,
    created_at: DateTime<Utc>,
    formatted: Vec<u8>,
}

impl MessagePayload {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        sender: Address,
        subject: String,
        body: String,
        attachments: Vec<Attachment>,
        to: Vec<String>,
        cc: Vec<String>,
        bcc: Vec<String>,
        created_at: DateTime<Utc>,
        formatted: Vec<u8>,
    ) -> Self {
        Self {
            sender,
            subject,
            body,
            attachments,
            to,
            cc,
            bcc,
            created_at,
            formatted,
        }
    }

    pub fn sender(&self) -> &Address {
        &self.sender
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Body as sent, embedded links included.
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    pub fn to(&self) -> &[String] {
        &self.to
    }

    pub fn cc(&self) -> &[String] {
        &self.cc
    }

    pub fn bcc(&self) -> &[String] {
        &self.bcc
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// RFC 5322 bytes handed to the transport. The Bcc header is not part of them.
    pub fn formatted(&self) -> &[u8] {
        &self.formatted
    }
}

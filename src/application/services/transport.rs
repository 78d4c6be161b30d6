use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{models::MessagePayload, value_objects::RecipientTarget};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid transport configuration: {0}")]
    Configuration(String),
    #[error("invalid target address {address:?}: {reason}")]
    InvalidTarget { address: String, reason: String },
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Delivers one framed payload to one target.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(
        &self,
        payload: &MessagePayload,
        target: &RecipientTarget,
    ) -> Result<(), TransportError>;
}

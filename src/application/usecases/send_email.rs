use std::sync::Arc;

use lettre::message::Mailbox;
use tracing::info;

use crate::{
    application::{
        handlers::dispatcher::{DispatchError, Dispatcher},
        services::message_builder::MessageBuilder,
    },
    domain::{
        errors::DomainError,
        models::{DispatchSummary, EmailDraft},
        value_objects::RecipientTarget,
    },
};

pub struct SendEmailConfig {
    pub sender: Mailbox,
}

pub struct SendEmailUseCase {
    dispatcher: Arc<Dispatcher>,
    config: SendEmailConfig,
}

pub struct SendEmailResponse {
    pub recipients_count: usize,
    pub summary: DispatchSummary,
}

impl SendEmailUseCase {
    pub fn new(dispatcher: Arc<Dispatcher>, config: SendEmailConfig) -> Self {
        Self { dispatcher, config }
    }

    pub async fn execute(&self, draft: EmailDraft) -> Result<SendEmailResponse, DispatchError> {
        Self::ensure_shape(&draft)?;

        let payload = MessageBuilder::build(&self.config.sender, &draft)?;
        let targets = RecipientTarget::collect(&draft.recipients, &draft.cc, &draft.bcc);

        info!(
            subject = %draft.subject,
            targets = targets.len(),
            attachments = draft.attachments.len(),
            "Dispatching email"
        );

        let recipients_count = draft.recipients.len();
        let summary = self
            .dispatcher
            .dispatch_all(Arc::new(payload), targets)
            .await;

        Ok(SendEmailResponse {
            recipients_count,
            summary,
        })
    }

    fn ensure_shape(draft: &EmailDraft) -> Result<(), DomainError> {
        if draft.recipients.is_empty() {
            return Err(DomainError::Validation(
                "At least one recipient is required".to_string(),
            ));
        }
        if draft.subject.trim().is_empty() {
            return Err(DomainError::Validation("subject is empty".to_string()));
        }
        Ok(())
    }
}

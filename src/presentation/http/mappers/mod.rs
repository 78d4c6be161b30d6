use poem_openapi::types::Base64;

use crate::{
    application::usecases::send_email::SendEmailResponse,
    domain::models::{Attachment, EmailDraft, FailedTarget},
    presentation::http::{
        requests::SendEmailRequestDto,
        responses::{FailedRecipientDto, SendEmailResponseDto, UploadedAttachmentDto},
    },
};

pub fn map_draft(request: SendEmailRequestDto) -> EmailDraft {
    EmailDraft {
        subject: request.subject,
        body: request.body,
        recipients: request.recipients,
        attachments: request
            .attachments
            .unwrap_or_default()
            .into_iter()
            .map(|a| Attachment::new(a.filename, a.content.0, a.mime_type))
            .collect(),
        embedded_links: request.embedded_links.unwrap_or_default(),
        cc: request.cc.unwrap_or_default(),
        bcc: request.bcc.unwrap_or_default(),
    }
}

pub fn map_send_response(response: &SendEmailResponse) -> SendEmailResponseDto {
    let summary = &response.summary;
    SendEmailResponseDto {
        message: format!(
            "Email sent to {} of {} addresses",
            summary.successful,
            summary.total()
        ),
        recipients_count: response.recipients_count as u32,
        successful: summary.successful as u32,
        failed: summary.failed as u32,
        failures: summary.failures.iter().map(map_failure).collect(),
    }
}

fn map_failure(failure: &FailedTarget) -> FailedRecipientDto {
    FailedRecipientDto {
        address: failure.address.clone(),
        kind: failure.kind.into(),
        reason: failure.reason.clone(),
    }
}

pub fn map_uploaded(attachment: Attachment) -> UploadedAttachmentDto {
    UploadedAttachmentDto {
        size: attachment.content.len() as u64,
        filename: attachment.filename,
        mime_type: attachment.mime_type,
        content: Base64(attachment.content),
    }
}

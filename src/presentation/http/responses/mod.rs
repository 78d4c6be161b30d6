use poem_openapi::{Object, types::Base64};

use crate::presentation::models::RecipientKindDto;

#[derive(Object)]
pub struct FailedRecipientDto {
    pub address: String,
    pub kind: RecipientKindDto,
    pub reason: String,
}

#[derive(Object)]
pub struct SendEmailResponseDto {
    pub message: String,
    pub recipients_count: u32,
    pub successful: u32,
    pub failed: u32,
    pub failures: Vec<FailedRecipientDto>,
}

#[derive(Object)]
pub struct UploadedAttachmentDto {
    pub filename: String,
    pub mime_type: String,
    pub size: u64,
    pub content: Base64<Vec<u8>>,
}

#[derive(Object)]
pub struct UploadAttachmentsResponseDto {
    pub message: String,
    pub attachments: Vec<UploadedAttachmentDto>,
}

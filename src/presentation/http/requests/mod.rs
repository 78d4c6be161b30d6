use poem_openapi::{
    Multipart, Object,
    types::{Base64, multipart::Upload},
};

pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

fn default_mime_type() -> String {
    DEFAULT_MIME_TYPE.to_string()
}

#[derive(Object, Debug)]
pub struct AttachmentDto {
    #[oai(validator(min_length = 1))]
    pub filename: String,
    /// Base64 encoded file content.
    pub content: Base64<Vec<u8>>,
    #[oai(default = "default_mime_type")]
    pub mime_type: String,
}

#[derive(Object, Debug)]
pub struct SendEmailRequestDto {
    #[oai(validator(min_length = 1))]
    pub subject: String,
    #[oai(validator(min_length = 1))]
    pub body: String,
    pub recipients: Vec<String>,
    pub attachments: Option<Vec<AttachmentDto>>,
    pub embedded_links: Option<Vec<String>>,
    pub cc: Option<Vec<String>>,
    pub bcc: Option<Vec<String>>,
}

#[derive(Multipart)]
pub struct UploadAttachmentsForm {
    pub files: Vec<Upload>,
}

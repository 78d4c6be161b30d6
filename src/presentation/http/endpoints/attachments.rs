use poem::{Result as PoemResult, http::StatusCode};
use poem_openapi::{OpenApi, payload::Json};
use tracing::info;

use crate::{
    domain::models::Attachment,
    presentation::http::{
        endpoints::root::EndpointsTags,
        mappers::map_uploaded,
        requests::{DEFAULT_MIME_TYPE, UploadAttachmentsForm},
        responses::UploadAttachmentsResponseDto,
    },
};

pub struct AttachmentEndpoints;

#[OpenApi]
impl AttachmentEndpoints {
    /// Turn uploaded files into attachments that `send-email` accepts.
    #[oai(
        path = "/upload-attachments",
        method = "post",
        tag = EndpointsTags::Attachments,
    )]
    pub async fn upload_attachments(
        &self,
        form: UploadAttachmentsForm,
    ) -> PoemResult<Json<UploadAttachmentsResponseDto>> {
        if form.files.is_empty() {
            return Err(poem::Error::from_string(
                "At least one file is required",
                StatusCode::BAD_REQUEST,
            ));
        }

        let mut attachments = Vec::with_capacity(form.files.len());
        for file in form.files {
            let filename = file.file_name().unwrap_or("attachment").to_string();
            let mime_type = file.content_type().unwrap_or(DEFAULT_MIME_TYPE).to_string();
            let content = file
                .into_vec()
                .await
                .map_err(|e| poem::Error::from_string(e.to_string(), StatusCode::BAD_REQUEST))?;
            attachments.push(Attachment::new(filename, content, mime_type));
        }

        info!(count = attachments.len(), "Uploaded attachments");

        Ok(Json(UploadAttachmentsResponseDto {
            message: format!("Successfully uploaded {} files", attachments.len()),
            attachments: attachments.into_iter().map(map_uploaded).collect(),
        }))
    }
}

use serde::{Deserialize, Serialize};

/// How an attachment's bytes are framed inside the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentFraming {
    /// Kept under its declared `image/*` content type.
    Image,
    /// Sent as `application/octet-stream`.
    Binary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub content: Vec<u8>,
    pub mime_type: String,
}

impl Attachment {
    pub fn new(
        filename: impl Into<String>,
        content: impl Into<Vec<u8>>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Decided by the declared type only, the content is never sniffed.
    pub fn framing(&self) -> AttachmentFraming {
        if self.mime_type.starts_with("image/") {
            AttachmentFraming::Image
        } else {
            AttachmentFraming::Binary
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_types_use_image_framing() {
        let attachment = Attachment::new("logo.png", vec![1, 2, 3], "image/png");
        assert_eq!(attachment.framing(), AttachmentFraming::Image);
    }

    #[test]
    fn everything_else_is_binary() {
        for mime in ["application/pdf", "text/plain", "application/octet-stream", "IMAGE/png"] {
            let attachment = Attachment::new("file", Vec::new(), mime);
            assert_eq!(attachment.framing(), AttachmentFraming::Binary, "{mime}");
        }
    }
}

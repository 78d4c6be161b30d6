pub mod attachment;
pub mod draft;
pub mod outcome;
pub mod payload;

pub use attachment::{Attachment, AttachmentFraming};
pub use draft::EmailDraft;
pub use outcome::{DispatchSummary, FailedTarget, SendOutcome};
pub use payload::MessagePayload;

pub mod attachments;
pub mod emails;
pub mod root;

use std::sync::Arc;

use self::{
    attachments::AttachmentEndpoints,
    emails::EmailEndpoints,
    root::{ApiState, Endpoints},
};

/// Every endpoint group, ready for `OpenApiService::new`.
pub fn api(state: Arc<ApiState>) -> (Endpoints, EmailEndpoints, AttachmentEndpoints) {
    (Endpoints, EmailEndpoints::new(state), AttachmentEndpoints)
}

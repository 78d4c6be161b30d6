use std::sync::Arc;

use poem_openapi::{OpenApi, Tags, payload::PlainText};

use crate::{
    application::usecases::send_email::SendEmailUseCase,
    infrastructure::rate_limit::ClientRateLimiter,
};

#[derive(Clone)]
pub struct ApiState {
    pub send_email_usecase: Arc<SendEmailUseCase>,
    pub rate_limiter: Arc<ClientRateLimiter>,
}

/// Enum of API sections (tags)
#[derive(Tags)]
pub enum EndpointsTags {
    Health,
    Emails,
    Attachments,
}

/// Stateless endpoints.
pub struct Endpoints;

#[OpenApi]
impl Endpoints {
    /// Liveness probe; does not touch the mail relay.
    #[oai(path = "/health", method = "get", tag = EndpointsTags::Health)]
    pub async fn health(&self) -> PlainText<&'static str> {
        PlainText("OK")
    }
}

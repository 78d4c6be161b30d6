use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use poem::{Result as PoemResult, http::StatusCode, web::RemoteAddr};
use poem_openapi::{OpenApi, payload::Json};
use tracing::{error, warn};

use crate::{
    application::handlers::dispatcher::DispatchError,
    presentation::http::{
        endpoints::root::{ApiState, EndpointsTags},
        mappers::{map_draft, map_send_response},
        requests::SendEmailRequestDto,
        responses::SendEmailResponseDto,
    },
};

#[derive(Clone)]
pub struct EmailEndpoints {
    state: Arc<ApiState>,
}

impl EmailEndpoints {
    pub fn new(state: Arc<ApiState>) -> Self {
        Self { state }
    }
}

#[OpenApi]
impl EmailEndpoints {
    /// Send one message to every recipient, CC and BCC address.
    #[oai(path = "/send-email", method = "post", tag = EndpointsTags::Emails)]
    pub async fn send_email(
        &self,
        remote_addr: &RemoteAddr,
        request: Json<SendEmailRequestDto>,
    ) -> PoemResult<Json<SendEmailResponseDto>> {
        let client = client_ip(remote_addr);
        if let Err(wait) = self.state.rate_limiter.check(client).await {
            warn!(%client, "Rejecting send request over rate limit");
            return Err(poem::Error::from_string(
                format!("rate limit exceeded, retry in {}s", wait.as_secs().max(1)),
                StatusCode::TOO_MANY_REQUESTS,
            ));
        }

        if request.recipients.is_empty() {
            return Err(poem::Error::from_string(
                "At least one recipient is required",
                StatusCode::BAD_REQUEST,
            ));
        }

        let response = self
            .state
            .send_email_usecase
            .execute(map_draft(request.0))
            .await
            .map_err(dispatch_error)?;

        Ok(Json(map_send_response(&response)))
    }
}

fn client_ip(remote_addr: &RemoteAddr) -> IpAddr {
    remote_addr
        .0
        .as_socket_addr()
        .map(|addr| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

fn dispatch_error(err: DispatchError) -> poem::Error {
    match err {
        DispatchError::Construction(_) => {
            poem::Error::from_string(err.to_string(), StatusCode::BAD_REQUEST)
        }
        DispatchError::Configuration(_) => {
            error!(error = %err, "Email sending error");
            poem::Error::from_string(err.to_string(), StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

use std::sync::Arc;

use poem::{EndpointExt, Route, Server, listener::TcpListener, middleware::Cors};
use poem_openapi::OpenApiService;
use tokio::main;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mailer::{
    application::{
        handlers::dispatcher::Dispatcher,
        usecases::send_email::{SendEmailConfig, SendEmailUseCase},
    },
    config::Config,
    infrastructure::{rate_limit::ClientRateLimiter, smtp::SmtpMailTransport},
    presentation::http::endpoints::{api, root::ApiState},
};

#[main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::try_parse()?;

    let transport = SmtpMailTransport::new(&config.smtp)?;
    let dispatcher = Dispatcher::new(Arc::new(transport), config.dispatch.clone())?;
    info!(
        smtp_host = %config.smtp.host,
        smtp_port = config.smtp.port,
        max_concurrency = dispatcher.config().max_concurrency,
        "Mail transport ready"
    );

    let state = Arc::new(ApiState {
        send_email_usecase: Arc::new(SendEmailUseCase::new(
            Arc::new(dispatcher),
            SendEmailConfig {
                sender: config.sender,
            },
        )),
        rate_limiter: Arc::new(ClientRateLimiter::per_minute(config.rate_limit_per_minute)),
    });

    let server_url = format!("{}://{}:{}", config.scheme, config.host, config.port);

    info!(%server_url, "Starting server");

    let api_service = OpenApiService::new(api(state), "Email Sending API", "0.1.0")
        .server(format!("{}/api", server_url));
    let ui = api_service.swagger_ui();
    let app = Route::new()
        .nest("/api", api_service)
        .nest("/", ui)
        .with(Cors::new().allow_credentials(true));

    Server::new(TcpListener::bind(format!("{}:{}", config.host, config.port)))
        .run(app)
        .await?;

    Ok(())
}

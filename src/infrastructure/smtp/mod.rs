use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    Address, AsyncSmtpTransport, AsyncTransport, Tokio1Executor, address::Envelope,
    message::Mailbox, transport::smtp::authentication::Credentials,
};
use tracing::debug;

use crate::{
    application::services::transport::{MailTransport, TransportError},
    domain::{models::MessagePayload, value_objects::RecipientTarget},
};

pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_SMTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TlsMode {
    /// Plain connection upgraded with STARTTLS, which must succeed.
    #[default]
    StartTls,
    /// TLS from the first byte (usually port 465).
    Tls,
    /// No encryption, for local relays only.
    None,
}

impl FromStr for TlsMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "starttls" => Ok(TlsMode::StartTls),
            "tls" => Ok(TlsMode::Tls),
            "none" => Ok(TlsMode::None),
            other => Err(format!("unknown TLS mode {other:?}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl SmtpConfig {
    pub fn validate(&self) -> Result<(), TransportError> {
        if self.host.trim().is_empty() {
            return Err(TransportError::Configuration(
                "SMTP host is not set".to_string(),
            ));
        }
        if self.port == 0 {
            return Err(TransportError::Configuration(
                "SMTP port must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    fn credentials(&self) -> Option<Credentials> {
        if self.username.is_empty() {
            None
        } else {
            Some(Credentials::new(
                self.username.clone(),
                self.password.clone(),
            ))
        }
    }
}

/// Relays payloads through an SMTP server, one envelope per target.
pub struct SmtpMailTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailTransport {
    pub fn new(config: &SmtpConfig) -> Result<Self, TransportError> {
        config.validate()?;

        let builder = match config.tls {
            TlsMode::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| TransportError::Configuration(e.to_string()))?,
            TlsMode::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| TransportError::Configuration(e.to_string()))?,
            TlsMode::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host),
        };

        let mut builder = builder.port(config.port).timeout(Some(config.timeout));
        if let Some(credentials) = config.credentials() {
            builder = builder.credentials(credentials);
        }

        Ok(Self {
            transport: builder.build(),
        })
    }

    fn envelope(
        payload: &MessagePayload,
        target: &RecipientTarget,
    ) -> Result<Envelope, TransportError> {
        let invalid = |reason: String| TransportError::InvalidTarget {
            address: target.address.clone(),
            reason,
        };

        let recipient: Address = target
            .address
            .parse::<Mailbox>()
            .map_err(|e| invalid(e.to_string()))?
            .email;

        Envelope::new(Some(payload.sender().clone()), vec![recipient])
            .map_err(|e| invalid(e.to_string()))
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(
        &self,
        payload: &MessagePayload,
        target: &RecipientTarget,
    ) -> Result<(), TransportError> {
        let envelope = Self::envelope(payload, target)?;
        debug!(recipient = %target.address, "Relaying message");

        self.transport
            .send_raw(&envelope, payload.formatted())
            .await
            .map_err(|e| TransportError::Delivery(e.to_string()))?;

        Ok(())
    }
}

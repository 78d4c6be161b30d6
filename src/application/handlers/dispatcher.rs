use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::{
    sync::Semaphore,
    task::JoinSet,
    time::{Instant, timeout_at},
};
use tracing::{error, info};

use crate::{
    application::services::transport::{MailTransport, TransportError},
    domain::{
        errors::DomainError,
        models::{DispatchSummary, MessagePayload, SendOutcome},
        value_objects::RecipientTarget,
    },
};

pub const DEFAULT_MAX_CONCURRENCY: usize = 10;
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub max_concurrency: usize,
    pub send_timeout: Duration,
    pub batch_timeout: Option<Duration>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            send_timeout: DEFAULT_SEND_TIMEOUT,
            batch_timeout: None,
        }
    }
}

impl DispatchConfig {
    pub fn validate(&self) -> Result<(), DispatchError> {
        if self.max_concurrency == 0 {
            return Err(DispatchError::Configuration(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.max_concurrency > Semaphore::MAX_PERMITS {
            return Err(DispatchError::Configuration(format!(
                "max_concurrency must not exceed {}",
                Semaphore::MAX_PERMITS
            )));
        }
        if self.send_timeout.is_zero() {
            return Err(DispatchError::Configuration(
                "send_timeout must be positive".to_string(),
            ));
        }
        if self.batch_timeout.is_some_and(|t| t.is_zero()) {
            return Err(DispatchError::Configuration(
                "batch_timeout must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Failures that stop a batch before any send begins.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Construction(#[from] DomainError),
    #[error("invalid dispatch configuration: {0}")]
    Configuration(String),
}

/// Why a single target was not delivered.
#[derive(Debug, Error)]
enum SendFailure {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("send timed out after {0:?}")]
    TimedOut(Duration),
    #[error("batch deadline exceeded")]
    DeadlineExceeded,
    #[error("admission gate closed")]
    GateClosed,
    #[error("send task aborted: {0}")]
    Aborted(String),
}

/// Fans one payload out to every target, at most `max_concurrency` at a time.
pub struct Dispatcher {
    transport: Arc<dyn MailTransport>,
    config: DispatchConfig,
}

impl Dispatcher {
    pub fn new(
        transport: Arc<dyn MailTransport>,
        config: DispatchConfig,
    ) -> Result<Self, DispatchError> {
        config.validate()?;
        Ok(Self { transport, config })
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub async fn dispatch_all(
        &self,
        payload: Arc<MessagePayload>,
        targets: Vec<RecipientTarget>,
    ) -> DispatchSummary {
        let outcomes = self.dispatch(payload, targets).await;
        let summary = DispatchSummary::from_outcomes(&outcomes);

        info!(
            successful = summary.successful,
            failed = summary.failed,
            "Email send summary"
        );

        summary
    }

    /// One outcome per target, in completion order.
    pub async fn dispatch(
        &self,
        payload: Arc<MessagePayload>,
        targets: Vec<RecipientTarget>,
    ) -> Vec<SendOutcome> {
        if targets.is_empty() {
            return Vec::new();
        }

        let gate = Arc::new(Semaphore::new(self.config.max_concurrency));
        let deadline = self.config.batch_timeout.map(|t| Instant::now() + t);
        let send_timeout = self.config.send_timeout;

        let mut tasks = JoinSet::new();
        let mut pending = HashMap::with_capacity(targets.len());

        for target in targets {
            let gate = Arc::clone(&gate);
            let transport = Arc::clone(&self.transport);
            let payload = Arc::clone(&payload);
            let task_target = target.clone();

            let handle = tasks.spawn(async move {
                let result = deliver(
                    gate,
                    transport.as_ref(),
                    &payload,
                    &task_target,
                    send_timeout,
                    deadline,
                )
                .await;
                match result {
                    Ok(()) => SendOutcome::succeeded(task_target),
                    Err(err) => SendOutcome::failed(task_target, err),
                }
            });
            pending.insert(handle.id(), target);
        }

        let mut outcomes = Vec::with_capacity(pending.len());
        while let Some(joined) = tasks.join_next_with_id().await {
            let outcome = match joined {
                Ok((id, outcome)) => {
                    pending.remove(&id);
                    outcome
                }
                Err(err) => match pending.remove(&err.id()) {
                    Some(target) => {
                        SendOutcome::failed(target, SendFailure::Aborted(err.to_string()))
                    }
                    None => continue,
                },
            };
            log_outcome(&outcome);
            outcomes.push(outcome);
        }

        outcomes
    }
}

async fn deliver(
    gate: Arc<Semaphore>,
    transport: &dyn MailTransport,
    payload: &MessagePayload,
    target: &RecipientTarget,
    send_timeout: Duration,
    deadline: Option<Instant>,
) -> Result<(), SendFailure> {
    let admission = match deadline {
        Some(deadline) => timeout_at(deadline, gate.acquire_owned())
            .await
            .map_err(|_| SendFailure::DeadlineExceeded)?,
        None => gate.acquire_owned().await,
    };
    // Held until this function returns, whichever way it returns.
    let _permit = admission.map_err(|_| SendFailure::GateClosed)?;

    let send_deadline = Instant::now() + send_timeout;
    let (until, on_elapsed) = match deadline {
        Some(batch) if batch < send_deadline => (batch, SendFailure::DeadlineExceeded),
        _ => (send_deadline, SendFailure::TimedOut(send_timeout)),
    };

    match timeout_at(until, transport.send(payload, target)).await {
        Ok(result) => result.map_err(SendFailure::from),
        Err(_) => Err(on_elapsed),
    }
}

fn log_outcome(outcome: &SendOutcome) {
    match &outcome.error {
        None => info!(
            recipient = %outcome.target.address,
            kind = outcome.target.kind.as_str(),
            "Email sent successfully"
        ),
        Some(reason) => error!(
            recipient = %outcome.target.address,
            kind = outcome.target.kind.as_str(),
            error = %reason,
            "Failed to send email"
        ),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::{
        application::services::message_builder::MessageBuilder,
        domain::{models::EmailDraft, value_objects::RecipientKind},
    };

    struct AlwaysOk;

    #[async_trait]
    impl MailTransport for AlwaysOk {
        async fn send(&self, _: &MessagePayload, _: &RecipientTarget) -> Result<(), TransportError> {
            Ok(())
        }
    }

    struct Hangs;

    #[async_trait]
    impl MailTransport for Hangs {
        async fn send(&self, _: &MessagePayload, _: &RecipientTarget) -> Result<(), TransportError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    struct PanicsOn(&'static str);

    #[async_trait]
    impl MailTransport for PanicsOn {
        async fn send(&self, _: &MessagePayload, target: &RecipientTarget) -> Result<(), TransportError> {
            if target.address == self.0 {
                panic!("transport blew up");
            }
            Ok(())
        }
    }

    fn payload() -> Arc<MessagePayload> {
        let draft = EmailDraft::new("Hi", "Body", vec!["a@x.com".to_string()]);
        Arc::new(MessageBuilder::build(&"sender@x.com".parse().unwrap(), &draft).unwrap())
    }

    fn targets(addresses: &[&str]) -> Vec<RecipientTarget> {
        addresses
            .iter()
            .map(|a| RecipientTarget::new(*a, RecipientKind::To))
            .collect()
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let config = DispatchConfig {
            max_concurrency: 0,
            ..DispatchConfig::default()
        };
        assert!(matches!(
            Dispatcher::new(Arc::new(AlwaysOk), config),
            Err(DispatchError::Configuration(_))
        ));
    }

    #[test]
    fn concurrency_beyond_semaphore_capacity_is_rejected() {
        let config = DispatchConfig {
            max_concurrency: usize::MAX,
            ..DispatchConfig::default()
        };
        assert!(matches!(
            Dispatcher::new(Arc::new(AlwaysOk), config),
            Err(DispatchError::Configuration(_))
        ));

        let at_limit = DispatchConfig {
            max_concurrency: Semaphore::MAX_PERMITS,
            ..DispatchConfig::default()
        };
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn defaults_allow_ten_in_flight() {
        assert_eq!(DispatchConfig::default().max_concurrency, 10);
    }

    #[tokio::test]
    async fn empty_target_list_gives_zero_counts() {
        let dispatcher = Dispatcher::new(Arc::new(AlwaysOk), DispatchConfig::default()).unwrap();

        let summary = dispatcher.dispatch_all(payload(), Vec::new()).await;

        assert_eq!(summary, DispatchSummary::default());
    }

    #[tokio::test]
    async fn slow_send_becomes_a_timeout_failure() {
        let config = DispatchConfig {
            send_timeout: Duration::from_millis(50),
            ..DispatchConfig::default()
        };
        let dispatcher = Dispatcher::new(Arc::new(Hangs), config).unwrap();

        let summary = dispatcher
            .dispatch_all(payload(), targets(&["a@x.com", "b@x.com"]))
            .await;

        assert_eq!(summary.successful, 0);
        assert_eq!(summary.failed, 2);
        assert!(summary.failures.iter().all(|f| f.reason.contains("timed out")));
    }

    #[tokio::test]
    async fn batch_deadline_fails_queued_and_in_flight_targets() {
        let config = DispatchConfig {
            max_concurrency: 1,
            send_timeout: Duration::from_secs(60),
            batch_timeout: Some(Duration::from_millis(50)),
        };
        let dispatcher = Dispatcher::new(Arc::new(Hangs), config).unwrap();

        let outcomes = dispatcher
            .dispatch(payload(), targets(&["a@x.com", "b@x.com", "c@x.com"]))
            .await;

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes.iter().all(|o| {
            o.error.as_deref() == Some("batch deadline exceeded")
        }));
    }

    #[tokio::test]
    async fn panicking_send_only_fails_its_own_target() {
        let dispatcher = Dispatcher::new(
            Arc::new(PanicsOn("b@x.com")),
            DispatchConfig::default(),
        )
        .unwrap();

        let summary = dispatcher
            .dispatch_all(payload(), targets(&["a@x.com", "b@x.com", "c@x.com"]))
            .await;

        assert_eq!(summary.successful, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failures[0].address, "b@x.com");
        assert!(summary.failures[0].reason.starts_with("send task aborted"));
    }
}

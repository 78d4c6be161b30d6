use serde::Serialize;

use crate::domain::value_objects::{RecipientKind, RecipientTarget};

/// Result of delivering the payload to a single target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    pub target: RecipientTarget,
    pub error: Option<String>,
}

impl SendOutcome {
    pub fn succeeded(target: RecipientTarget) -> Self {
        Self {
            target,
            error: None,
        }
    }

    pub fn failed(target: RecipientTarget, error: impl ToString) -> Self {
        Self {
            target,
            error: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedTarget {
    pub address: String,
    pub kind: RecipientKind,
    pub reason: String,
}

/// Counts over one batch, plus which targets failed and why.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
    pub successful: usize,
    pub failed: usize,
    pub failures: Vec<FailedTarget>,
}

impl DispatchSummary {
    pub fn from_outcomes(outcomes: &[SendOutcome]) -> Self {
        outcomes
            .iter()
            .fold(Self::default(), |mut summary, outcome| {
                match &outcome.error {
                    None => summary.successful += 1,
                    Some(reason) => {
                        summary.failed += 1;
                        summary.failures.push(FailedTarget {
                            address: outcome.target.address.clone(),
                            kind: outcome.target.kind,
                            reason: reason.clone(),
                        });
                    }
                }
                summary
            })
    }

    pub fn total(&self) -> usize {
        self.successful + self.failed
    }
}

// ABOUTME: Error types for deployment orchestration with the SNAFU pattern.
// ABOUTME: Each variant maps to a kind that decides exit handling and notification.

use snafu::Snafu;

use crate::rancher::{ApiError, IndexError};
use crate::retry::{Attempt, RetryError};
use crate::types::ServiceTarget;

/// Errors that end a deployment run.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DeployError {
    #[snafu(display("unable to retrieve the list of stacks from rancher: {source}"))]
    ListEnvironments { source: RetryError<ApiError> },

    #[snafu(display("unable to retrieve the list of services from rancher: {source}"))]
    ListServices { source: RetryError<ApiError> },

    #[snafu(display("inconsistent service listing: {source}"))]
    Index { source: IndexError },

    #[snafu(display("no stack exists with the name {stack}"))]
    StackNotFound { stack: String },

    #[snafu(display("no service exists with the name {service} in stack {stack}"))]
    ServiceNotFound { stack: String, service: String },

    #[snafu(display("upgrade not available for {target}. Current status: {state}"))]
    UpgradeUnavailable { target: ServiceTarget, state: String },

    #[snafu(display("upgrade command failed for service {target}: {source}"))]
    Upgrade {
        target: ServiceTarget,
        source: RetryError<ApiError>,
    },

    #[snafu(display("timeout while waiting for the upgrade of {target} to complete: {source}"))]
    AwaitUpgraded {
        target: ServiceTarget,
        source: RetryError<PollError>,
    },

    #[snafu(display("finish-upgrade command failed for service {target}: {source}"))]
    FinishUpgrade {
        target: ServiceTarget,
        source: RetryError<ApiError>,
    },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployErrorKind {
    /// Target missing or not eligible for upgrade.
    Precondition,
    /// Rancher returned data that contradicts itself.
    Consistency,
    /// A retry budget ran out.
    Timeout,
    /// Rancher rejected a request outright.
    Api,
}

impl DeployError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> DeployErrorKind {
        match self {
            DeployError::StackNotFound { .. }
            | DeployError::ServiceNotFound { .. }
            | DeployError::UpgradeUnavailable { .. } => DeployErrorKind::Precondition,
            DeployError::Index { .. } => DeployErrorKind::Consistency,
            DeployError::ListEnvironments { source }
            | DeployError::ListServices { source }
            | DeployError::Upgrade { source, .. }
            | DeployError::FinishUpgrade { source, .. } => retry_kind(source),
            DeployError::AwaitUpgraded { source, .. } => retry_kind(source),
        }
    }

    /// Whether the failure blocks the pipeline in a way operators must act on.
    ///
    /// True from the eligibility check onwards: once the target was found, any
    /// failure leaves the service needing attention. Discovery failures are
    /// reported only through the exit status.
    pub fn notifies_blocked(&self) -> bool {
        matches!(
            self,
            DeployError::UpgradeUnavailable { .. }
                | DeployError::Upgrade { .. }
                | DeployError::AwaitUpgraded { .. }
                | DeployError::FinishUpgrade { .. }
        )
    }
}

fn retry_kind<E>(err: &RetryError<E>) -> DeployErrorKind {
    if err.is_timeout() {
        DeployErrorKind::Timeout
    } else {
        DeployErrorKind::Api
    }
}

/// Why a poll for the `upgraded` state did not succeed yet.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("not upgraded yet (state: {0})")]
    NotUpgraded(String),
}

/// Tag an API failure for the retry engine.
pub(crate) fn classify(err: ApiError) -> Attempt<ApiError> {
    if err.is_retriable() {
        Attempt::Retriable(err)
    } else {
        Attempt::Fatal(err)
    }
}

// ABOUTME: Generic deployment struct parameterized by state.
// ABOUTME: State types carry their own service snapshot for compile-time guarantees.

use crate::config::Config;
use crate::rancher::Service;
use crate::types::ServiceTarget;

use super::state::HasService;

/// A deployment in progress, parameterized by its current state.
///
/// Transitions consume the deployment and return it in the next state, so a
/// finish-upgrade can only be issued after the service was seen `upgraded`,
/// and an upgrade only after the action was found on the service.
#[derive(Debug)]
pub struct Deployment<S> {
    pub(crate) config: Config,
    pub(crate) state: S,
}

impl<S> Deployment<S> {
    pub(crate) fn with_state<T>(self, state: T) -> Deployment<T> {
        Deployment {
            config: self.config,
            state,
        }
    }
}

impl<S: HasService> Deployment<S> {
    /// Latest snapshot of the target service.
    pub fn service(&self) -> &Service {
        self.state.service()
    }
}

/// How a run ended successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Upgrade submitted; rollout was not waited for.
    Unconfirmed(ServiceTarget),
    /// Upgrade rolled out and finished.
    Completed(ServiceTarget),
}

impl Outcome {
    pub fn target(&self) -> &ServiceTarget {
        match self {
            Outcome::Unconfirmed(t) | Outcome::Completed(t) => t,
        }
    }

    /// Text for the success notification.
    pub fn notification_message(&self) -> String {
        match self {
            Outcome::Unconfirmed(t) => format!("Deployment to {t} initiated but unconfirmed"),
            Outcome::Completed(t) => format!("Deployment to {t} completed"),
        }
    }

    /// Text for the console.
    pub fn summary(&self) -> String {
        match self {
            Outcome::Unconfirmed(_) => "Upgrade issued but not confirmed".to_string(),
            Outcome::Completed(t) => format!("Finished {t} deployment"),
        }
    }
}

/// Text for the blocked-pipeline notification.
pub fn blocked_message(target: &ServiceTarget) -> String {
    format!("CD pipeline blocked on deployment to {target}")
}

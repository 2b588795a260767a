// ABOUTME: Deployment state types for the type state pattern.
// ABOUTME: Each state carries the latest service snapshot seen at that step.

use crate::rancher::Service;

/// Target located in the stack/service index.
/// Available actions: `authorize()`
#[derive(Debug, Clone)]
pub struct Discovered {
    pub(crate) service: Service,
    pub(crate) collapsed: Vec<String>,
}

/// Service advertises the `upgrade` action.
/// Available actions: `upgrade()`
#[derive(Debug, Clone)]
pub struct Authorized {
    pub(crate) service: Service,
}

/// Upgrade accepted by Rancher, rollout in progress.
/// Available actions: `await_upgraded()`, `unconfirmed()`
#[derive(Debug, Clone)]
pub struct UpgradeIssued {
    pub(crate) service: Service,
}

/// Service reports the `upgraded` state.
/// Available actions: `finalize()`
#[derive(Debug, Clone)]
pub struct Upgraded {
    pub(crate) service: Service,
}

/// Upgrade finished; old containers are gone.
/// Available actions: `finish()`
#[derive(Debug, Clone)]
pub struct Finished {
    pub(crate) service: Service,
}

/// Implemented by every state; gives uniform access to the snapshot.
pub trait HasService {
    fn service(&self) -> &Service;
}

macro_rules! has_service {
    ($($state:ty),*) => {
        $(impl HasService for $state {
            fn service(&self) -> &Service {
                &self.service
            }
        })*
    };
}

has_service!(Discovered, Authorized, UpgradeIssued, Upgraded, Finished);

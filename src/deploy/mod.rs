// ABOUTME: Deployment orchestration using the type state pattern.
// ABOUTME: Discover, authorize, upgrade, then optionally await and finalize the rollout.

mod deployment;
mod error;
mod state;
mod transitions;

pub use deployment::{Deployment, Outcome, blocked_message};
pub use error::{DeployError, DeployErrorKind, PollError};
pub use state::{Authorized, Discovered, Finished, HasService, UpgradeIssued, Upgraded};

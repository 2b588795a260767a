// ABOUTME: Application-wide error types for drone-rancher.
// ABOUTME: Uses thiserror; maps every failure onto a kind for exit handling.

use thiserror::Error;

use crate::deploy::{DeployError, DeployErrorKind};
use crate::rancher::ApiError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("invalid {field} specification: {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    #[error("cannot specify stack by both field and prefix")]
    ConflictingStack,

    #[error("failed to create rancher client: {0}")]
    Client(#[from] ApiError),

    #[error(transparent)]
    Deploy(#[from] DeployError),
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing settings; nothing was sent to Rancher.
    Config,
    /// Target missing or not eligible for upgrade.
    Precondition,
    /// Rancher returned inconsistent data.
    Consistency,
    /// A retry budget ran out.
    Timeout,
    /// Rancher rejected a request.
    Api,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingParameter(_)
            | Error::InvalidParameter { .. }
            | Error::ConflictingStack
            | Error::Client(_) => ErrorKind::Config,
            Error::Deploy(e) => match e.kind() {
                DeployErrorKind::Precondition => ErrorKind::Precondition,
                DeployErrorKind::Consistency => ErrorKind::Consistency,
                DeployErrorKind::Timeout => ErrorKind::Timeout,
                DeployErrorKind::Api => ErrorKind::Api,
            },
        }
    }

    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::Config => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

// ABOUTME: Deployment target resolution from stack and service settings.
// ABOUTME: Splits the combined `<stack>/<service>` form at the first slash.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("service name cannot be empty")]
    EmptyService,

    #[error("stack name cannot be empty")]
    EmptyStack,

    #[error("cannot specify stack by both field and prefix")]
    ConflictingStack,
}

/// The stack (Rancher environment) and service a deployment is aimed at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceTarget {
    stack: String,
    service: String,
}

impl ServiceTarget {
    pub fn new(stack: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            stack: stack.into(),
            service: service.into(),
        }
    }

    /// Resolve the target from the service setting and an optional stack setting.
    ///
    /// `service` may be `<stack>/<service>`, in which case `stack` must be absent.
    pub fn resolve(service: &str, stack: Option<&str>) -> Result<Self, TargetError> {
        let stack = stack.map(str::trim).filter(|s| !s.is_empty());

        let (stack, service) = match (service.split_once('/'), stack) {
            (Some(_), Some(_)) => return Err(TargetError::ConflictingStack),
            (Some((prefix, name)), None) => (prefix, name),
            (None, Some(stack)) => (stack, service),
            (None, None) => return Err(TargetError::EmptyStack),
        };

        if stack.is_empty() {
            return Err(TargetError::EmptyStack);
        }
        if service.is_empty() {
            return Err(TargetError::EmptyService);
        }

        Ok(Self {
            stack: stack.to_string(),
            service: service.to_string(),
        })
    }

    pub fn stack(&self) -> &str {
        &self.stack
    }

    pub fn service(&self) -> &str {
        &self.service
    }
}

impl fmt::Display for ServiceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.stack, self.service)
    }
}

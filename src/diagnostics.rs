// ABOUTME: Non-fatal problems noticed during a run.
// ABOUTME: Reported after the outcome; none of them change the exit status.

use std::fmt;

/// Warnings gathered over one deployment run, in the order they occurred.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning and log it immediately.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!(kind = warning.kind.as_str(), "{}", warning.message);
        self.warnings.push(warning);
    }

    /// One warning per `stack/service` name the index collapsed.
    pub fn duplicate_services<'a>(&mut self, names: impl IntoIterator<Item = &'a String>) {
        for name in names {
            self.warn(Warning::duplicate_service(name));
        }
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// The webhook could not be reached or refused the message.
    pub fn notify_delivery(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::NotifyDelivery,
            message: message.into(),
        }
    }

    pub fn duplicate_service(name: &str) -> Self {
        Self {
            kind: WarningKind::DuplicateService,
            message: format!("service {name} is listed more than once; using the last entry"),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    NotifyDelivery,
    /// Two services shared a stack and name; the index kept the later one.
    DuplicateService,
}

impl WarningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningKind::NotifyDelivery => "notify-delivery",
            WarningKind::DuplicateService => "duplicate-service",
        }
    }
}

// ABOUTME: Console reporting of a deployment run.
// ABOUTME: Prints steps, warnings and the outcome as text or as JSON lines.

use serde::Serialize;
use std::time::Instant;

use crate::deploy::Outcome;
use crate::diagnostics::Warning;
use crate::types::{ImageUuid, ServiceTarget};

/// How much the plugin prints, and in which format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// One line per step, then the outcome with elapsed time.
    Normal,
    /// Only the outcome (and warnings or errors on stderr).
    Quiet,
    /// JSON lines: steps and outcome on stdout, warnings and errors on stderr.
    Json,
}

/// A step of the upgrade lifecycle, as reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step<'a> {
    Discover,
    Authorize { state: &'a str },
    Upgrade,
    AwaitUpgraded,
    Finalize,
}

impl Step<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Discover => "discover",
            Step::Authorize { .. } => "authorize",
            Step::Upgrade => "upgrade",
            Step::AwaitUpgraded => "await-upgraded",
            Step::Finalize => "finalize",
        }
    }

    fn describe(&self) -> String {
        match self {
            Step::Discover => "Discovering stacks and services...".to_string(),
            Step::Authorize { state } => {
                format!("Checking upgrade availability (state: {state})...")
            }
            Step::Upgrade => "Issuing upgrade...".to_string(),
            Step::AwaitUpgraded => "Waiting for upgrade to complete...".to_string(),
            Step::Finalize => "Finishing upgrade...".to_string(),
        }
    }
}

/// Reporter for one run.
pub struct Output {
    mode: OutputMode,
    started: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            started: None,
        }
    }

    /// Announce the deployment and start the clock.
    pub fn begin(&mut self, image: &ImageUuid, target: &ServiceTarget) {
        self.started = Some(Instant::now());
        match self.mode {
            OutputMode::Normal => println!("Deploying {} to {target}", image.image()),
            OutputMode::Quiet => {}
            OutputMode::Json => self.emit(
                Stream::Stdout,
                Event::new("start", &format!("Deploying {} to {target}", image.image()))
                    .target(target),
            ),
        }
    }

    /// Seconds since [`begin`](Self::begin), zero before it.
    pub fn elapsed_secs(&self) -> f64 {
        self.started
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    pub fn step(&self, step: Step<'_>) {
        match self.mode {
            OutputMode::Normal => println!("  → {}", step.describe()),
            OutputMode::Quiet => {}
            OutputMode::Json => self.emit(
                Stream::Stdout,
                Event::new("step", &step.describe()).step(step.name()),
            ),
        }
    }

    /// Report how the run ended.
    pub fn finished(&self, outcome: &Outcome) {
        let summary = outcome.summary();
        match self.mode {
            OutputMode::Normal => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    println!("{summary} ({elapsed:.1}s)");
                } else {
                    println!("{summary}");
                }
            }
            OutputMode::Quiet => println!("{summary}"),
            OutputMode::Json => {
                let mut event = Event::new("success", &summary).target(outcome.target());
                event.confirmed = Some(matches!(outcome, Outcome::Completed(_)));
                self.emit(Stream::Stdout, event);
            }
        }
    }

    pub fn warning(&self, warning: &Warning) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => eprintln!("Warning: {}", warning.message),
            OutputMode::Json => {
                let mut event = Event::new("warning", &warning.message);
                event.kind = Some(warning.kind.as_str());
                self.emit(Stream::Stderr, event);
            }
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => eprintln!("Error: {message}"),
            OutputMode::Json => self.emit(Stream::Stderr, Event::new("error", message)),
        }
    }

    fn emit(&self, stream: Stream, mut event: Event<'_>) {
        event.duration_secs = self.started.map(|_| self.elapsed_secs());
        let Ok(line) = serde_json::to_string(&event) else {
            return;
        };
        match stream {
            Stream::Stdout => println!("{line}"),
            Stream::Stderr => eprintln!("{line}"),
        }
    }
}

enum Stream {
    Stdout,
    Stderr,
}

#[derive(Debug, Serialize)]
struct Event<'a> {
    event: &'a str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    step: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    confirmed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

impl<'a> Event<'a> {
    fn new(event: &'a str, message: &str) -> Self {
        Self {
            event,
            message: message.to_string(),
            step: None,
            target: None,
            kind: None,
            confirmed: None,
            duration_secs: None,
        }
    }

    fn step(mut self, name: &'a str) -> Self {
        self.step = Some(name);
        self
    }

    fn target(mut self, target: &ServiceTarget) -> Self {
        self.target = Some(target.to_string());
        self
    }
}

// ABOUTME: Test support utilities.
// ABOUTME: In-memory Rancher API and recording notifier for orchestration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use drone_rancher::config::{Config, NotifyConfig};
use drone_rancher::notify::{Notification, Notifier, NotifyError};
use drone_rancher::rancher::{
    ApiError, Environment, LaunchConfig, RancherApi, Service, ServiceUpgrade, action,
};
use drone_rancher::types::{EnvironmentId, ServiceId};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, Once};
use std::time::Duration;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("drone_rancher=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub fn environment(id: &str, name: &str) -> Environment {
    Environment {
        id: EnvironmentId::new(id),
        name: name.to_string(),
    }
}

pub fn service(id: &str, name: &str, environment_id: &str, state: &str) -> Service {
    Service {
        id: ServiceId::new(id),
        name: name.to_string(),
        environment_id: EnvironmentId::new(environment_id),
        state: state.to_string(),
        actions: HashMap::new(),
        launch_config: Some(LaunchConfig {
            image_uuid: Some("docker:myapp:v1".to_string()),
            extra: serde_json::Map::new(),
        }),
        secondary_launch_configs: vec![],
    }
}

/// An `active` service that advertises the upgrade action.
pub fn upgradable(id: &str, name: &str, environment_id: &str) -> Service {
    let mut s = service(id, name, environment_id, "active");
    s.actions.insert(
        action::UPGRADE.to_string(),
        format!("http://rancher.local/v1/services/{id}/?action=upgrade"),
    );
    s
}

/// Config aimed at `prod/web` with fast, jitter-free retries.
pub fn config(confirm: bool) -> Config {
    let mut config = Config::template();
    config.confirm = confirm;
    config.image = drone_rancher::types::ImageUuid::parse("myapp:v2").unwrap();
    config.timeout = Duration::from_secs(10);
    config.retry_interval = Duration::from_secs(1);
    config.retry_jitter = Duration::ZERO;
    config.notify = NotifyConfig {
        webhook: Some("http://hooks.local/x".to_string()),
        success_channel: "deploys".to_string(),
        blocked_channel: "alerts".to_string(),
        success_emoji: "rocket".to_string(),
        blocked_emoji: "warning".to_string(),
    };
    config
}

pub fn server_error(url: &str) -> ApiError {
    status_error(url, 503)
}

pub fn status_error(url: &str, code: u16) -> ApiError {
    ApiError::Status {
        url: url.to_string(),
        status: reqwest::StatusCode::from_u16(code).unwrap(),
        body: String::new(),
    }
}

/// A call received by [`FakeRancher`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListEnvironments,
    ListServices,
    ServiceById(String),
    Upgrade(String, ServiceUpgrade),
    FinishUpgrade(String),
}

/// Scripted in-memory Rancher.
#[derive(Default)]
pub struct FakeRancher {
    pub environments: Vec<Environment>,
    pub services: Vec<Service>,
    /// Listing calls that fail with 503 before succeeding.
    pub list_failures: Mutex<u32>,
    /// Status code every upgrade call fails with.
    pub upgrade_error: Option<u16>,
    /// Status code every finish-upgrade call fails with.
    pub finish_error: Option<u16>,
    /// States reported by successive `service_by_id` calls; the last repeats.
    pub poll_states: Mutex<VecDeque<String>>,
    pub calls: Mutex<Vec<Call>>,
}

impl FakeRancher {
    pub fn new(environments: Vec<Environment>, services: Vec<Service>) -> Self {
        Self {
            environments,
            services,
            ..Default::default()
        }
    }

    pub fn with_poll_states(self, states: &[&str]) -> Self {
        *self.poll_states.lock().unwrap() = states.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_list_failures(self, n: u32) -> Self {
        *self.list_failures.lock().unwrap() = n;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn upgrades(&self) -> Vec<ServiceUpgrade> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Upgrade(_, body) => Some(body),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn listing_fails(&self) -> bool {
        let mut remaining = self.list_failures.lock().unwrap();
        if *remaining > 0 {
            *remaining -= 1;
            true
        } else {
            false
        }
    }

    fn find(&self, id: &str) -> Option<Service> {
        self.services.iter().find(|s| s.id.as_str() == id).cloned()
    }
}

#[async_trait]
impl RancherApi for FakeRancher {
    async fn list_environments(&self) -> Result<Vec<Environment>, ApiError> {
        self.record(Call::ListEnvironments);
        if self.listing_fails() {
            return Err(server_error("environments"));
        }
        Ok(self.environments.clone())
    }

    async fn list_services(&self) -> Result<Vec<Service>, ApiError> {
        self.record(Call::ListServices);
        if self.listing_fails() {
            return Err(server_error("services"));
        }
        Ok(self.services.clone())
    }

    async fn service_by_id(&self, id: &ServiceId) -> Result<Service, ApiError> {
        self.record(Call::ServiceById(id.to_string()));
        let mut service = self
            .find(id.as_str())
            .ok_or_else(|| status_error("services", 404))?;

        let mut states = self.poll_states.lock().unwrap();
        let state = if states.len() > 1 {
            states.pop_front()
        } else {
            states.front().cloned()
        };
        if let Some(state) = state {
            service.state = state;
        }
        if service.state == "upgraded" {
            service.actions.insert(
                action::FINISH_UPGRADE.to_string(),
                format!("http://rancher.local/v1/services/{id}/?action=finishupgrade"),
            );
        }
        Ok(service)
    }

    async fn upgrade(
        &self,
        service: &Service,
        request: &ServiceUpgrade,
    ) -> Result<Service, ApiError> {
        self.record(Call::Upgrade(service.id.to_string(), request.clone()));
        if let Some(code) = self.upgrade_error {
            return Err(status_error("upgrade", code));
        }
        let mut updated = service.clone();
        updated.state = "upgrading".to_string();
        Ok(updated)
    }

    async fn finish_upgrade(&self, service: &Service) -> Result<Service, ApiError> {
        self.record(Call::FinishUpgrade(service.id.to_string()));
        if let Some(code) = self.finish_error {
            return Err(status_error("finishupgrade", code));
        }
        let mut finished = service.clone();
        finished.state = "finishing-upgrade".to_string();
        Ok(finished)
    }
}

/// Notifier that records what it was asked to send.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Notification>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(notification.clone());
        if self.fail {
            return Err(NotifyError::Status(
                reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            ));
        }
        Ok(())
    }
}

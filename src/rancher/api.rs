// ABOUTME: Rancher API trait used by the deployment state machine.
// ABOUTME: Lets the orchestrator run against the HTTP client or an in-memory fake.

use super::error::ApiError;
use super::model::{Environment, Service, ServiceUpgrade};
use crate::types::ServiceId;
use async_trait::async_trait;

/// Operations the deployer needs from the orchestration platform.
#[async_trait]
pub trait RancherApi: Send + Sync {
    /// List every environment (stack) visible to the API key.
    async fn list_environments(&self) -> Result<Vec<Environment>, ApiError>;

    /// List every service visible to the API key.
    async fn list_services(&self) -> Result<Vec<Service>, ApiError>;

    /// Fetch a fresh snapshot of one service.
    async fn service_by_id(&self, id: &ServiceId) -> Result<Service, ApiError>;

    /// Submit an in-service upgrade for `service`.
    async fn upgrade(&self, service: &Service, request: &ServiceUpgrade)
    -> Result<Service, ApiError>;

    /// Complete an upgrade that has reached the `upgraded` state.
    async fn finish_upgrade(&self, service: &Service) -> Result<Service, ApiError>;
}

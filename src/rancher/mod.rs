// ABOUTME: Rancher orchestration API surface consumed by the deployer.
// ABOUTME: Exports the RancherApi trait, wire model, HTTP client and service index.

mod api;
mod client;
mod deserialize;
mod error;
mod index;
mod model;

pub use api::RancherApi;
pub use client::RancherClient;
pub use error::{ApiError, IndexError};
pub use index::ServiceIndex;
pub use model::{
    Environment, InServiceStrategy, LaunchConfig, Service, ServiceUpgrade, ToServiceStrategy,
    action,
};

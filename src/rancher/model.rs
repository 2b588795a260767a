// ABOUTME: Wire model for Rancher environments, services and upgrade actions.
// ABOUTME: Launch configs are carried through opaquely apart from the image UUID.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::deserialize::null_as_default;
use crate::types::{EnvironmentId, ImageUuid, ServiceId};

/// Action names advertised in a resource's `actions` map.
pub mod action {
    pub const UPGRADE: &str = "upgrade";
    pub const FINISH_UPGRADE: &str = "finishupgrade";
}

/// Lifecycle state a service reports once an upgrade has rolled out.
pub const STATE_UPGRADED: &str = "upgraded";

/// A paginated Rancher collection response.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Collection<T> {
    #[serde(default = "Vec::new", deserialize_with = "null_as_default")]
    pub data: Vec<T>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl<T> Collection<T> {
    /// URL of the next page, if the server reported one.
    pub fn next_page(&self) -> Option<&str> {
        self.pagination
            .as_ref()
            .and_then(|p| p.next.as_deref())
            .filter(|next| !next.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub next: Option<String>,
}

/// A Rancher environment, shown to users as a stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub id: EnvironmentId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// A Rancher service snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: ServiceId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub environment_id: EnvironmentId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: String,
    /// Permitted action name → action URL.
    #[serde(default, deserialize_with = "null_as_default")]
    pub actions: HashMap<String, String>,
    #[serde(default)]
    pub launch_config: Option<LaunchConfig>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub secondary_launch_configs: Vec<LaunchConfig>,
}

impl Service {
    pub fn can(&self, action: &str) -> bool {
        self.actions.contains_key(action)
    }

    pub fn action_url(&self, action: &str) -> Option<&str> {
        self.actions.get(action).map(String::as_str)
    }

    pub fn is_upgraded(&self) -> bool {
        self.state == STATE_UPGRADED
    }
}

/// Container launch configuration.
///
/// Only `imageUuid` is interpreted; every other field round-trips unchanged so
/// the upgrade keeps ports, env, labels and the rest of the existing config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uuid: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl LaunchConfig {
    pub fn with_image(mut self, image: &ImageUuid) -> Self {
        self.image_uuid = Some(image.as_str().to_string());
        self
    }
}

/// Body of the `upgrade` action.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceUpgrade {
    pub in_service_strategy: InServiceStrategy,
    pub to_service_strategy: ToServiceStrategy,
}

/// Batched rolling upgrade of a service in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InServiceStrategy {
    pub batch_size: i64,
    pub interval_millis: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch_config: Option<LaunchConfig>,
    pub secondary_launch_configs: Vec<LaunchConfig>,
    pub start_first: bool,
}

/// Upgrade-to-another-service strategy; always empty for in-service upgrades.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ToServiceStrategy {}

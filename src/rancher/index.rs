// ABOUTME: Stack name → service name → service lookup table.
// ABOUTME: Built once from the environment and service listings of a run.

use std::collections::HashMap;

use super::error::IndexError;
use super::model::{Environment, Service};
use crate::types::{EnvironmentId, ServiceTarget};

/// Services keyed by the human-facing stack and service names.
#[derive(Debug, Default)]
pub struct ServiceIndex {
    stacks: HashMap<String, HashMap<String, Service>>,
    collapsed: Vec<String>,
}

impl ServiceIndex {
    /// Build the index from one snapshot of environments and services.
    ///
    /// Services without an environment are skipped. A service whose
    /// environment id is not in `environments` means the snapshot is
    /// inconsistent, and the whole build fails. When two services share a
    /// stack and name, the later one wins and the pair is recorded in
    /// [`collapsed`](Self::collapsed).
    pub fn build(
        environments: &[Environment],
        services: impl IntoIterator<Item = Service>,
    ) -> Result<Self, IndexError> {
        let names: HashMap<&EnvironmentId, &str> = environments
            .iter()
            .map(|e| (&e.id, e.name.as_str()))
            .collect();

        let mut index = Self::default();
        for service in services {
            if service.environment_id.is_empty() {
                continue;
            }

            let stack = names.get(&service.environment_id).ok_or_else(|| {
                IndexError::DanglingEnvironment {
                    service: service.name.clone(),
                    environment_id: service.environment_id.clone(),
                }
            })?;

            let key = format!("{}/{}", stack, service.name);
            let previous = index
                .stacks
                .entry((*stack).to_string())
                .or_default()
                .insert(service.name.clone(), service);

            if previous.is_some() {
                index.collapsed.push(key);
            }
        }

        Ok(index)
    }

    /// Look up the service a deployment targets.
    pub fn get(&self, target: &ServiceTarget) -> Option<&Service> {
        self.stack(target.stack())?.get(target.service())
    }

    /// All services in a stack, or `None` if no service references the stack.
    pub fn stack(&self, name: &str) -> Option<&HashMap<String, Service>> {
        self.stacks.get(name)
    }

    /// Number of distinct (stack, service) entries.
    pub fn len(&self) -> usize {
        self.stacks.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `stack/service` names that appeared more than once in the listing.
    pub fn collapsed(&self) -> &[String] {
        &self.collapsed
    }
}

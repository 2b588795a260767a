// ABOUTME: State transition methods for deployment orchestration.
// ABOUTME: Each method consumes self and returns the next state on success.

use snafu::{OptionExt, ResultExt, ensure};

use crate::config::Config;
use crate::rancher::{
    InServiceStrategy, RancherApi, Service, ServiceIndex, ServiceUpgrade, ToServiceStrategy,
    action,
};
use crate::retry::{poll_until, retry};

use super::Deployment;
use super::deployment::Outcome;
use super::error::{
    AwaitUpgradedSnafu, DeployError, FinishUpgradeSnafu, IndexSnafu, ListEnvironmentsSnafu,
    ListServicesSnafu, PollError, ServiceNotFoundSnafu, StackNotFoundSnafu, UpgradeSnafu,
    UpgradeUnavailableSnafu, classify,
};
use super::state::{Authorized, Discovered, Finished, UpgradeIssued, Upgraded};

// =============================================================================
// Discovery
// =============================================================================

impl Deployment<Discovered> {
    /// Locate the target service from fresh environment and service listings.
    ///
    /// # Errors
    ///
    /// Fails if either listing can't be fetched within the retry budget, the
    /// listing references an unknown environment, or the target is missing.
    pub async fn discover<A: RancherApi>(config: Config, api: &A) -> Result<Self, DeployError> {
        let policy = config.retry_policy();

        let environments = retry(&policy, || async move {
            api.list_environments().await.map_err(classify)
        })
        .await
        .context(ListEnvironmentsSnafu)?;

        let services = retry(&policy, || async move {
            api.list_services().await.map_err(classify)
        })
        .await
        .context(ListServicesSnafu)?;

        tracing::debug!(
            environments = environments.len(),
            services = services.len(),
            "fetched rancher listings"
        );

        let index = ServiceIndex::build(&environments, services).context(IndexSnafu)?;
        let target = &config.target;

        let stack = index.stack(target.stack()).context(StackNotFoundSnafu {
            stack: target.stack(),
        })?;
        let service = stack
            .get(target.service())
            .cloned()
            .context(ServiceNotFoundSnafu {
                stack: target.stack(),
                service: target.service(),
            })?;

        tracing::info!(%target, id = %service.id, state = %service.state, "located service");

        Ok(Deployment {
            state: Discovered {
                service,
                collapsed: index.collapsed().to_vec(),
            },
            config,
        })
    }

    /// `stack/service` names that were listed more than once during discovery.
    pub fn collapsed(&self) -> &[String] {
        &self.state.collapsed
    }

    /// Check that the service currently permits an upgrade.
    ///
    /// # Errors
    ///
    /// Returns `UpgradeUnavailable` with the service's current state otherwise.
    pub fn authorize(self) -> Result<Deployment<Authorized>, DeployError> {
        let service = self.state.service;
        ensure!(
            service.can(action::UPGRADE),
            UpgradeUnavailableSnafu {
                target: self.config.target.clone(),
                state: service.state.clone(),
            }
        );

        Ok(Deployment {
            config: self.config,
            state: Authorized { service },
        })
    }
}

// =============================================================================
// Authorized -> UpgradeIssued
// =============================================================================

impl Deployment<Authorized> {
    /// The upgrade body: the service's launch config with only the image
    /// replaced, plus its secondary launch configs unchanged.
    pub fn upgrade_request(&self) -> ServiceUpgrade {
        let service = &self.state.service;
        let launch_config = service
            .launch_config
            .clone()
            .unwrap_or_default()
            .with_image(&self.config.image);

        ServiceUpgrade {
            in_service_strategy: InServiceStrategy {
                batch_size: self.config.batch_size,
                interval_millis: self.config.batch_interval_millis(),
                launch_config: Some(launch_config),
                secondary_launch_configs: service.secondary_launch_configs.clone(),
                start_first: self.config.start_first,
            },
            to_service_strategy: ToServiceStrategy::default(),
        }
    }

    /// Submit the upgrade.
    ///
    /// # Errors
    ///
    /// Returns `Upgrade` if Rancher rejects it or keeps failing past the budget.
    pub async fn upgrade<A: RancherApi>(
        self,
        api: &A,
    ) -> Result<Deployment<UpgradeIssued>, DeployError> {
        let request = self.upgrade_request();
        let policy = self.config.retry_policy();
        let service = &self.state.service;
        let request = &request;

        let updated = retry(&policy, || async move {
            api.upgrade(service, request).await.map_err(classify)
        })
        .await
        .context(UpgradeSnafu {
            target: self.config.target.clone(),
        })?;

        tracing::info!(
            target = %self.config.target,
            image = %self.config.image,
            state = %updated.state,
            "upgrade issued"
        );

        Ok(self.with_state(UpgradeIssued { service: updated }))
    }
}

// =============================================================================
// UpgradeIssued -> Upgraded
// =============================================================================

impl Deployment<UpgradeIssued> {
    /// Stop here without waiting for the rollout.
    pub fn unconfirmed(self) -> Outcome {
        Outcome::Unconfirmed(self.config.target)
    }

    /// Poll the service until it reports `upgraded`.
    ///
    /// # Errors
    ///
    /// Returns `AwaitUpgraded` when the budget runs out first.
    pub async fn await_upgraded<A: RancherApi>(
        self,
        api: &A,
    ) -> Result<Deployment<Upgraded>, DeployError> {
        let policy = self.config.retry_policy();
        let id = &self.state.service.id;

        let service = poll_until(
            &policy,
            || async move { api.service_by_id(id).await.map_err(PollError::from) },
            Service::is_upgraded,
            |s: &Service| PollError::NotUpgraded(s.state.clone()),
        )
        .await
        .context(AwaitUpgradedSnafu {
            target: self.config.target.clone(),
        })?;

        tracing::info!(target = %self.config.target, "service upgraded");
        Ok(self.with_state(Upgraded { service }))
    }
}

// =============================================================================
// Upgraded -> Finished
// =============================================================================

impl Deployment<Upgraded> {
    /// Complete the upgrade so Rancher removes the previous containers.
    ///
    /// # Errors
    ///
    /// Returns `FinishUpgrade` if the action keeps failing past the budget.
    pub async fn finalize<A: RancherApi>(
        self,
        api: &A,
    ) -> Result<Deployment<Finished>, DeployError> {
        let policy = self.config.retry_policy();
        let service = &self.state.service;

        let finished = retry(&policy, || async move {
            api.finish_upgrade(service).await.map_err(classify)
        })
        .await
        .context(FinishUpgradeSnafu {
            target: self.config.target.clone(),
        })?;

        tracing::info!(target = %self.config.target, state = %finished.state, "upgrade finished");
        Ok(self.with_state(Finished { service: finished }))
    }
}

impl Deployment<Finished> {
    pub fn finish(self) -> Outcome {
        Outcome::Completed(self.config.target)
    }
}

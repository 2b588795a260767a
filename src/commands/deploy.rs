// ABOUTME: Deploy command implementation.
// ABOUTME: Runs the deployment state machine and dispatches success or blocked notifications.

use crate::config::Config;
use crate::deploy::{DeployError, Deployment, Outcome, blocked_message};
use crate::diagnostics::{Diagnostics, Warning};
use crate::error::Result;
use crate::notify::{Notification, Notifier};
use crate::output::{Output, Step};
use crate::rancher::RancherApi;

/// Upgrade the configured service and report the result.
///
/// Success (confirmed or not) is announced on the success channel. Failures
/// from the eligibility check onwards are announced on the blocked channel
/// before the error is returned.
pub async fn deploy<A, N>(
    config: Config,
    api: &A,
    notifier: &N,
    output: &mut Output,
) -> Result<Outcome>
where
    A: RancherApi,
    N: Notifier,
{
    let mut diag = Diagnostics::default();
    let notify = config.notify.clone();
    let target = config.target.clone();

    output.begin(&config.image, &target);

    let result = run_deployment(config, api, output, &mut diag).await;

    let notification = match &result {
        Ok(outcome) => Some(Notification::success(
            &notify,
            outcome.notification_message(),
        )),
        Err(e) if e.notifies_blocked() => {
            Some(Notification::blocked(&notify, blocked_message(&target)))
        }
        Err(_) => None,
    };

    if let Some(notification) = notification
        && let Err(e) = notifier.notify(&notification).await
    {
        diag.warn(Warning::notify_delivery(format!(
            "failed to send notification: {e}"
        )));
    }

    for warning in diag.warnings() {
        output.warning(warning);
    }

    let outcome = result?;
    output.finished(&outcome);
    Ok(outcome)
}

/// Run the deployment state machine.
async fn run_deployment<A: RancherApi>(
    config: Config,
    api: &A,
    output: &Output,
    diag: &mut Diagnostics,
) -> std::result::Result<Outcome, DeployError> {
    let confirm = config.confirm;

    output.step(Step::Discover);
    let deployment = Deployment::discover(config, api).await?;
    diag.duplicate_services(deployment.collapsed());

    output.step(Step::Authorize {
        state: &deployment.service().state,
    });
    let deployment = deployment.authorize()?;

    output.step(Step::Upgrade);
    let deployment = deployment.upgrade(api).await?;

    if !confirm {
        return Ok(deployment.unconfirmed());
    }

    output.step(Step::AwaitUpgraded);
    let deployment = deployment.await_upgraded(api).await?;

    output.step(Step::Finalize);
    let deployment = deployment.finalize(api).await?;

    Ok(deployment.finish())
}

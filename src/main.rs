// ABOUTME: Entry point for the drone-rancher pipeline plugin.
// ABOUTME: Loads PLUGIN_* settings, runs one upgrade, and maps failures to the exit status.

mod cli;

use clap::Parser;
use cli::Cli;
use drone_rancher::commands;
use drone_rancher::config::Config;
use drone_rancher::error::Result;
use drone_rancher::notify::WebhookNotifier;
use drone_rancher::output::Output;
use drone_rancher::rancher::RancherClient;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise the verbose flag picks the level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("drone_rancher=debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mut output = Output::new(cli.output_mode());

    if let Err(e) = run(&mut output).await {
        tracing::debug!(kind = ?e.kind(), "deployment failed");
        output.error(&e.to_string());
        std::process::exit(e.exit_code());
    }
}

async fn run(output: &mut Output) -> Result<()> {
    let config = Config::from_env()?;
    tracing::debug!(?config, "loaded configuration");

    let api = RancherClient::new(&config.endpoint, &config.access_key, &config.secret_key)?;
    let notifier = WebhookNotifier::new(config.notify.webhook.clone());

    commands::deploy(config, &api, &notifier, output).await?;
    Ok(())
}

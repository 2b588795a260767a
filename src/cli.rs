// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Deployment settings come from PLUGIN_* variables; flags only shape output.

use clap::Parser;
use drone_rancher::output::OutputMode;

#[derive(Parser)]
#[command(name = "drone-rancher")]
#[command(about = "Rolling service upgrades on Rancher, configured through PLUGIN_* variables")]
#[command(version)]
pub struct Cli {
    /// Log retry attempts and API calls
    #[arg(short, long, env = "PLUGIN_DEBUG", value_parser = clap::builder::FalseyValueParser::new())]
    pub verbose: bool,

    /// Only print the final result
    #[arg(short, long, conflicts_with = "json")]
    pub quiet: bool,

    /// Print results as JSON lines
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else if self.quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Normal
        }
    }
}

// ABOUTME: Command module aggregator for the drone-rancher CLI.
// ABOUTME: Re-exports the deploy command handler.

mod deploy;

pub use deploy::deploy;

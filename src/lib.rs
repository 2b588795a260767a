// ABOUTME: Library root for drone-rancher - exposes the deployer for the binary and tests.
// ABOUTME: The main binary is in main.rs.

pub mod commands;
pub mod config;
pub mod deploy;
pub mod diagnostics;
pub mod error;
pub mod notify;
pub mod output;
pub mod rancher;
pub mod retry;
pub mod types;

//! CLI subcommand implementations.

pub mod replay;
pub mod run;
pub mod snapshot;

use std::path::Path;

use anyhow::Context;

use signal_graph_core::Config;

/// Load configuration: an explicit file when given, otherwise the layered
/// default (config/ directory + environment).
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(p) => Config::from_file(p).with_context(|| format!("loading config {}", p.display())),
        None => Config::load().context("loading layered configuration"),
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! `ActionFlow` inspector.
//!
//! Prints the port descriptors of the built-in behavior-tree nodes. Settings
//! are read from the path given as the first argument, or `actionflow.ron` in
//! the working directory.

mod report;
mod settings;

use actionflow_graph::TypeMetadataRegistry;
use settings::{InspectSettings, SettingsError, SETTINGS_FILE_NAME};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() -> ExitCode {
    let path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(SETTINGS_FILE_NAME), PathBuf::from);

    let settings = match InspectSettings::load_or_default(&path) {
        Ok(settings) => settings,
        Err(e) => {
            init_tracing(&InspectSettings::default().log_filter);
            tracing::error!("Failed to load settings from {:?}: {}", path, e);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&settings.log_filter);

    match run(&settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(default_filter: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(settings: &InspectSettings) -> Result<(), SettingsError> {
    tracing::info!("ActionFlow inspector v{}", env!("CARGO_PKG_VERSION"));

    let mut registry = TypeMetadataRegistry::new();
    let reports = report::collect(&mut registry, &settings.nodes)?;
    tracing::debug!("Built {} descriptors", registry.len());

    let output = report::render(&reports, settings.format)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{output}")?;
    Ok(())
}

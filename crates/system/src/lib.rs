// SPDX-FileCopyrightText: 2024-2026 MathSwe Ops contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Context;

pub mod batch;
pub mod catalog;
pub mod cli;
pub mod download;
pub mod image;
pub mod os;
pub mod package;
pub mod plan;
pub mod profile;
pub mod site;
pub mod version;

/// Init logging from `SYSTEM_LOG`, `info` by default
///
/// # Errors
///
/// Will return `Err` if failed to initialize logging
pub fn trace_init() -> anyhow::Result<()> {
    use tracing::Level;
    use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt};

    let env_filter =
        EnvFilter::try_from_env("SYSTEM_LOG").unwrap_or_else(|_| EnvFilter::from("info"));
    let is_debug_log_level = env_filter
        .max_level_hint()
        .map_or_else(|| false, |level| level >= Level::DEBUG);

    let output = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(is_debug_log_level)
        .with_file(is_debug_log_level)
        .with_line_number(is_debug_log_level);

    let output = if is_debug_log_level {
        output.pretty().boxed()
    } else {
        output.boxed()
    };

    let subscriber = tracing_subscriber::registry().with(output.with_filter(env_filter));

    tracing::subscriber::set_global_default(subscriber)
        .context("tracing shouldn't already have been set up")?;
    Ok(())
}

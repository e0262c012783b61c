// SPDX-FileCopyrightText: 2024-2026 MathSwe Ops contributors
// SPDX-License-Identifier: Apache-2.0

use std::process::ExitCode;

use clap::Parser;
use console::style;
use system::cli::Cli;
use tracing::debug;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = system::trace_init() {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    let cli = Cli::parse();
    debug!("CLI is {cli:#?}");

    match cli.handle().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", style(format!("{err:#}")).red());
            ExitCode::FAILURE
        }
    }
}

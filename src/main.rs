//! Pants launcher entry point.
//!
//! Parses the command line, runs the command, and renders failures with
//! [`user_friendly_error`] before exiting non-zero.
//!
//! When started with `PANTS_LAUNCHER_BOOT=version` the binary only prints its own
//! version. A self-update uses this to confirm that a freshly installed binary runs.

use anyhow::Result;
use clap::Parser;
use pants_launcher::cli;
use pants_launcher::constants::{REPORT_VERSION_ENV, REPORT_VERSION_VALUE};
use pants_launcher::core::user_friendly_error;

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::var(REPORT_VERSION_ENV).is_ok_and(|value| value == REPORT_VERSION_VALUE) {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}

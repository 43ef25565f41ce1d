//! Command-line interface for the Pants launcher.
//!
//! # Available Commands
//!
//! - `resolve` - Resolve a Pants version and print the installer environment
//! - `self-update` - Replace the launcher binary with another release
//! - `rollback` - Restore the binary saved by a failed self-update
//! - `platform` - Print the platform tag artifacts are looked up with
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug output
//! - `--quiet` - Only log errors
//!
//! Logs go to stderr; `resolve` writes its `KEY=value` lines to stdout or an env file.
//!
//! # Example
//!
//! ```bash
//! pants-launcher resolve 2.18.0
//! pants-launcher resolve --sha release_2.17.0 --env-file "$GITHUB_ENV"
//! pants-launcher self-update
//! ```

mod platform;
mod resolve;
mod upgrade;


use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

pub use platform::PlatformCommand;
pub use resolve::ResolveCommand;
pub use upgrade::{RollbackCommand, SelfUpdateCommand};

#[derive(Parser)]
#[command(
    name = "pants-launcher",
    about = "Bootstrap Pants and keep the launcher up to date",
    version,
    long_about = "Resolves which Pants version to install, where to install it from and which \
                  interpreter it needs, and updates the launcher binary itself."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a Pants version to its install location
    Resolve(ResolveCommand),

    /// Update the launcher binary
    SelfUpdate(SelfUpdateCommand),

    /// Restore the launcher binary from its backup
    Rollback(RollbackCommand),

    /// Print this machine's platform tag
    Platform(PlatformCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        self.init_logging();

        match self.command {
            Commands::Resolve(cmd) => cmd.execute().await,
            Commands::SelfUpdate(cmd) => cmd.execute().await,
            Commands::Rollback(cmd) => cmd.execute().await,
            Commands::Platform(cmd) => cmd.execute(),
        }
    }

    /// Log level implied by the global flags. `RUST_LOG` takes precedence when set.
    #[must_use]
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        }
    }

    fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.log_level()));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .try_init();
    }
}

use crate::utils::PlatformTag;
use anyhow::Result;
use clap::Parser;

/// Print the platform tag of the running machine, e.g. `linux_x86_64`.
#[derive(Parser, Debug)]
pub struct PlatformCommand {}

impl PlatformCommand {
    pub fn execute(self) -> Result<()> {
        println!("{}", PlatformTag::current());
        Ok(())
    }
}


use crate::evswap::Result;
use clap::Parser;
use std::path::PathBuf;

/// Swaps mouse buttons between left and right handed layouts.
///
/// Pressing the back button toggles the layout.
#[derive(Parser, Debug)]
#[command(name = "evswap", version)]
pub struct Args {
    /// Event file to grab (/dev/input/event*)
    #[arg(short, long, value_name = "FILE")]
    pub event: PathBuf,

    /// Fork into background
    #[arg(short, long)]
    pub fork: bool,
}

impl Args {
    /// Parse errors, including requests for help, come back as
    /// `Error::Argument`.
    pub fn parse_from_env() -> Result<Args> {
        Ok(Args::try_parse()?)
    }
}

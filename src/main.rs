
mod cli;
mod daemon;
mod evdev;
mod evswap;
mod foreign;
mod muxer;
mod signals;

use cli::Args;
use evswap::{Error, Evswap, Result};
use log::error;
use std::process;
use std::thread::sleep;
use std::time::Duration;

/// Keeps the key release that launched us from reaching the grabbed device.
const STARTUP_DELAY: Duration = Duration::from_secs(1);

fn main() {
    let args = match Args::parse_from_env() {
        Ok(args) => args,
        Err(Error::Argument(e)) => {
            // nowhere left to report a failed write to stdout/stderr
            let _ = e.print();
            process::exit(if e.use_stderr() { 1 } else { 0 });
        },
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        },
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    if let Err(e) = run(args) {
        error!("{}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    if args.fork {
        daemon::detach()?;
    }

    sleep(STARTUP_DELAY);

    let mut app = Evswap::open(&args.event)?;

    if args.fork {
        daemon::redirect_stdio()?;
    }

    let outcome = app.run();
    app.shutdown();
    outcome
}

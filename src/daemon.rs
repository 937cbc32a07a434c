
use crate::evswap::{Error, Result};
use nix::fcntl::OFlag;
use nix::sys::stat::Mode;
use nix::unistd::{dup2, fork, setsid, ForkResult};
use std::os::unix::io::RawFd;

/// Forks into the background. Only the child returns.
pub fn detach() -> Result<()> {
    // no other threads exist yet
    match unsafe { fork() }.map_err(Error::Fork)? {
        ForkResult::Parent { child } => {
            log::debug!("forked into background as pid {}", child);
            std::process::exit(0);
        },
        ForkResult::Child => {
            setsid().map_err(Error::Fork)?;
            Ok(())
        },
    }
}

/// Points stdin, stdout and stderr at /dev/null.
pub fn redirect_stdio() -> Result<()> {
    let null = nix::fcntl::open("/dev/null", OFlag::O_RDWR, Mode::empty())?;

    for stdfd in 0..=2 as RawFd {
        dup2(null, stdfd)?;
    }

    if null > 2 {
        nix::unistd::close(null)?;
    }

    Ok(())
}

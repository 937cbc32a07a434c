
use nix::sys::signal::{SigSet, Signal};
use nix::sys::signalfd::{SfdFlags, SignalFd};
use std::os::unix::io::{AsRawFd, RawFd};

type Result<T> = std::result::Result<T, nix::Error>;

/// Delivers the given signals through a descriptor instead of a handler, so
/// they can be waited on alongside input devices.
pub struct Signals {
    mask: SigSet,
    sfd: SignalFd,
}

impl Signals {
    pub fn new(signals: &[Signal]) -> Result<Signals> {
        let mut mask = SigSet::empty();
        for &signal in signals {
            mask.add(signal);
        }

        mask.thread_block()?;
        let sfd = match SignalFd::with_flags(&mask, SfdFlags::SFD_CLOEXEC | SfdFlags::SFD_NONBLOCK) {
            Ok(sfd) => sfd,
            Err(e) => {
                let _ = mask.thread_unblock();
                return Err(e);
            }
        };

        Ok(Signals { mask, sfd })
    }

    pub fn fd(&self) -> RawFd {
        self.sfd.as_raw_fd()
    }

    /// Returns the next delivered signal, or `None` if nothing is queued.
    pub fn pending(&mut self) -> Result<Option<Signal>> {
        let info = self.sfd.read_signal()?;
        Ok(info.and_then(|info| Signal::try_from(info.ssi_signo as i32).ok()))
    }
}

impl Drop for Signals {
    fn drop(&mut self) {
        let _ = self.mask.thread_unblock();
    }
}


use crate::evdev::{Device, ReadFlag, ReadStatus};
use super::event::{Event, EventSource};
use super::{Error, Result};
use log::{debug, info, warn};
use nix::errno::Errno;
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::{Path, PathBuf};

/// Consecutive unexpected read errors tolerated before giving up.
const MAX_READ_FAILURES: u32 = 32;

/// A physical input device, grabbed exclusively for as long as it is open.
pub struct SourceDevice {
    path: PathBuf,
    dev: Device,
    failures: ReadFailures,
}

impl SourceDevice {
    pub fn open<P: AsRef<Path>>(devpath: P) -> Result<SourceDevice> {
        use nix::fcntl::OFlag;
        use nix::sys::stat::Mode;

        let path = devpath.as_ref().to_path_buf();
        let fd = nix::fcntl::open(
            &path,
            OFlag::O_RDONLY | OFlag::O_CLOEXEC | OFlag::O_NONBLOCK,
            Mode::empty()
        ).map_err(|source| Error::DeviceOpen { path: path.clone(), source })?;

        let dev = device_from_fd(fd, &path)?;

        // dropping `dev` on failure releases both the handle and the fd
        dev.grab(true)
            .map_err(|source| Error::Grab { path: path.clone(), source })?;

        info!("grabbed {} ({})", path.display(), dev.name());

        Ok(SourceDevice { path, dev, failures: ReadFailures::default() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(super) fn device(&self) -> &Device {
        &self.dev
    }
}

/// Wraps `fd` in a libevdev handle, closing `fd` if that fails.
fn device_from_fd(fd: RawFd, path: &Path) -> Result<Device> {
    Device::new_from_fd(fd).map_err(|source| {
        let _ = nix::unistd::close(fd);
        Error::DeviceInit { path: path.to_path_buf(), source }
    })
}

impl AsRawFd for SourceDevice {
    fn as_raw_fd(&self) -> RawFd {
        // libevdev keeps the fd it was created from
        self.dev.fd().unwrap_or(-1)
    }
}

impl EventSource for SourceDevice {
    fn read_event(&mut self) -> Result<Option<Event>> {
        loop {
            match self.dev.next_event(ReadFlag::Normal) {
                Ok(ReadStatus::Success(ev)) => {
                    self.failures.reset();
                    return Ok(Some(Event::from(&ev)));
                },
                Ok(ReadStatus::Sync(_)) => {
                    debug!("{}: events dropped, skipping resync", self.path.display());
                    continue;
                },
                Ok(ReadStatus::TryAgain) => return Ok(None),
                Err(Errno::EINTR) => continue,
                Err(Errno::ENODEV) => {
                    return Err(Error::msg(format!("{} disconnected", self.path.display())));
                },
                Err(e) => {
                    warn!("{}: read failed: {}", self.path.display(), e);
                    self.failures.record(e)?;
                    return Ok(None);
                },
            }
        }
    }
}

/// Counts unexpected read errors in a row.
#[derive(Default)]
struct ReadFailures {
    count: u32,
}

impl ReadFailures {
    fn reset(&mut self) {
        self.count = 0;
    }

    fn record(&mut self, errno: Errno) -> Result<()> {
        self.count += 1;
        if self.count >= MAX_READ_FAILURES {
            return Err(Error::msg(format!("giving up after {} read failures: {}", self.count, errno)));
        }
        Ok(())
    }
}


use crate::evdev::UInputDevice;
use super::event::{Event, EventSink};
use super::srcdev::SourceDevice;
use super::{Error, Result};
use log::info;
use std::os::unix::io::RawFd;
use std::path::Path;

pub const UINPUT_PATH: &str = "/dev/uinput";

/// A uinput device advertising the same capabilities as the device it was
/// created from.
pub struct DestinationDevice {
    uidev: UInputDevice,
}

impl DestinationDevice {
    pub fn create_from<P: AsRef<Path>>(srcdev: &SourceDevice, uinput_path: P) -> Result<DestinationDevice> {
        let fd = open_uinput(uinput_path.as_ref())?;

        let uidev = match UInputDevice::create_from_device(srcdev.device(), fd) {
            Ok(uidev) => uidev,
            Err(e) => {
                let _ = nix::unistd::close(fd);
                return Err(Error::SinkCreate(e));
            }
        };

        info!("mirroring {} to {}",
            srcdev.path().display(),
            uidev.devnode().as_deref().unwrap_or("unknown device node"));

        Ok(DestinationDevice { uidev })
    }
}

fn open_uinput(uinput_path: &Path) -> Result<RawFd> {
    use nix::fcntl::OFlag;
    use nix::sys::stat::Mode;

    nix::fcntl::open(
        uinput_path,
        OFlag::O_RDWR | OFlag::O_CLOEXEC,
        Mode::empty()
    ).map_err(|source| Error::SinkOpen { path: uinput_path.to_path_buf(), source })
}

impl EventSink for DestinationDevice {
    fn write_event(&mut self, event: &Event) -> Result<()> {
        let target = event.target();
        Ok(self.uidev.write_event(target.type_(), target.code(), event.value())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::errno::Errno;

    #[test]
    fn missing_uinput_node_is_a_sink_open_error() {
        match open_uinput(Path::new("/nonexistent/uinput")) {
            Err(Error::SinkOpen { path, source }) => {
                assert_eq!(path, std::path::PathBuf::from("/nonexistent/uinput"));
                assert_eq!(source, Errno::ENOENT);
            },
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("opened a missing uinput node"),
        }
    }
}

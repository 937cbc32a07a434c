
use nix::errno::Errno;
use nix::sys::epoll::*;
use std::os::unix::io::RawFd;
use std::time::Duration;

type Result<T> = std::result::Result<T, nix::Error>;

// one device and one signalfd are watched at most
const MAX_EVENTS: usize = 4;

pub struct Muxer {
    epfd: RawFd,
}

/// Readiness reported by one `Muxer::wait` call.
pub struct MuxerEvents {
    events: [MuxerEvent; MAX_EVENTS],
    len: usize,
}

#[derive(Clone, Copy)]
pub struct MuxerEvent(EpollEvent);

impl Muxer {
    pub fn new() -> Result<Muxer> {
        Ok(Muxer {
            epfd: epoll_create1(EpollCreateFlags::EPOLL_CLOEXEC)?,
        })
    }

    pub fn watch_input(&self, fd: RawFd) -> Result<()> {
        let mut epev = EpollEvent::new(EpollFlags::EPOLLIN, fd as u64);
        epoll_ctl(self.epfd, EpollOp::EpollCtlAdd, fd, &mut epev)?;
        Ok(())
    }

    /// Blocks until a watched descriptor is ready. `None` waits forever.
    pub fn wait(&self, timeout: Option<Duration>) -> Result<MuxerEvents> {
        let timeout_ms = match timeout {
            Some(dur) => dur.as_millis() as isize,
            None => -1,
        };

        let mut buffer = [EpollEvent::empty(); MAX_EVENTS];
        let len = match epoll_wait(self.epfd, &mut buffer, timeout_ms) {
            Ok(len) => len,
            Err(Errno::EINTR) => 0,
            Err(e) => return Err(e),
        };

        Ok(MuxerEvents { events: buffer.map(MuxerEvent), len })
    }
}

impl Drop for Muxer {
    fn drop(&mut self) {
        let _ = nix::unistd::close(self.epfd);
    }
}

impl IntoIterator for MuxerEvents {
    type Item = MuxerEvent;
    type IntoIter = std::iter::Take<std::array::IntoIter<MuxerEvent, MAX_EVENTS>>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter().take(self.len)
    }
}

impl MuxerEvent {
    pub fn fd(&self) -> RawFd {
        self.0.data() as RawFd
    }

    pub fn readable(&self) -> bool {
        self.0.events().contains(EpollFlags::EPOLLIN)
    }

    pub fn hungup(&self) -> bool {
        self.0.events().intersects(EpollFlags::EPOLLHUP | EpollFlags::EPOLLERR)
    }
}


use crate::muxer::Muxer;
use crate::signals::Signals;
use super::{Error, Result};
use super::destdev::{DestinationDevice, UINPUT_PATH};
use super::event::{EventSink, EventSource};
use super::remap::Remapper;
use super::srcdev::SourceDevice;
use log::{debug, info, warn};
use nix::sys::signal::Signal;
use std::os::unix::io::AsRawFd;
use std::path::Path;

enum State {
    Running,
    ShuttingDown(Signal),
}

/// One remapping session: a grabbed source, its virtual mirror and the
/// toggle state between them.
///
/// Fields drop in declaration order, so the source is released before the
/// virtual device.
pub struct Evswap<S = SourceDevice, D = DestinationDevice> {
    srcdev: S,
    destdev: D,
    signals: Signals,
    muxer: Muxer,
    remapper: Remapper,
}

impl Evswap<SourceDevice, DestinationDevice> {
    pub fn open<P: AsRef<Path>>(devpath: P) -> Result<Self> {
        let srcdev = SourceDevice::open(devpath)?;
        let destdev = DestinationDevice::create_from(&srcdev, UINPUT_PATH)?;

        let signals = Signals::new(&[Signal::SIGINT, Signal::SIGTERM])
            .map_err(Error::SignalSetup)?;

        Evswap::new(srcdev, destdev, signals)
    }
}

impl<S, D> Evswap<S, D>
    where S: EventSource + AsRawFd,
          D: EventSink,
{
    pub fn new(srcdev: S, destdev: D, signals: Signals) -> Result<Self> {
        let muxer = Muxer::new()?;
        muxer.watch_input(srcdev.as_raw_fd())?;
        muxer.watch_input(signals.fd())?;

        let remapper = Remapper::new();
        info!("button orientation: {:?}", remapper.state());

        Ok(Evswap {
            srcdev,
            destdev,
            signals,
            muxer,
            remapper,
        })
    }

    /// Forwards events until one of the watched signals arrives.
    pub fn run(&mut self) -> Result<()> {
        let mut state = State::Running;

        while let State::Running = state {
            for mux_ev in self.muxer.wait(None)? {
                if mux_ev.fd() == self.signals.fd() {
                    if let Some(signal) = self.signals.pending()? {
                        state = State::ShuttingDown(signal);
                    }
                    continue;
                }

                if let State::ShuttingDown(_) = state {
                    break;
                }

                if mux_ev.readable() {
                    forward_pending(&mut self.srcdev, &mut self.remapper, &mut self.destdev)?;
                }

                if mux_ev.hungup() {
                    return Err(Error::msg(format!("input device (fd {}) hung up", mux_ev.fd())));
                }
            }
        }

        if let State::ShuttingDown(signal) = state {
            info!("received {}, shutting down", signal.as_str());
        }

        Ok(())
    }

    /// Releases the source device, then the virtual device.
    pub fn shutdown(self) {
        let Evswap { srcdev, destdev, .. } = self;

        debug!("releasing input device");
        drop(srcdev);
        debug!("destroying virtual device");
        drop(destdev);
    }
}

/// Drains every event `source` has available through `remapper` into `sink`.
/// Returns the number of events read.
pub fn forward_pending<S, D>(source: &mut S, remapper: &mut Remapper, sink: &mut D) -> Result<usize>
    where S: EventSource,
          D: EventSink,
{
    let mut count = 0;

    while let Some(event) = source.read_event()? {
        count += 1;
        let out = remapper.translate(event);

        if let Err(e) = sink.write_event(&out) {
            let target = out.target();
            warn!("passthru failure (type={} code={} value={}): {}",
                target.type_(), target.code(), out.value(), e);
        }
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evswap::event::Event;
    use crate::evswap::remap::{ToggleState, TOGGLE_BUTTON};
    use crate::foreign::*;
    use nix::errno::Errno;
    use nix::fcntl::OFlag;
    use nix::sys::signal::raise;
    use nix::unistd::{close, pipe2, read, write};
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::os::unix::io::RawFd;
    use std::rc::Rc;

    struct FakeSource(VecDeque<Result<Option<Event>>>);

    impl FakeSource {
        fn new(events: &[Event]) -> Self {
            FakeSource(events.iter().map(|&ev| Ok(Some(ev))).collect())
        }
    }

    impl EventSource for FakeSource {
        fn read_event(&mut self) -> Result<Option<Event>> {
            self.0.pop_front().unwrap_or(Ok(None))
        }
    }

    #[derive(Default)]
    struct FakeSink {
        written: Vec<Event>,
        fail_on: Option<Event>,
    }

    impl EventSink for FakeSink {
        fn write_event(&mut self, event: &Event) -> Result<()> {
            if self.fail_on == Some(*event) {
                return Err(Errno::EIO.into());
            }
            self.written.push(*event);
            Ok(())
        }
    }

    fn key(code: u32, value: i32) -> Event {
        Event::new(EV_KEY, code, value)
    }

    fn syn() -> Event {
        Event::new(EV_SYN, SYN_REPORT, 0)
    }

    #[test]
    fn forwards_in_order_with_sync_markers() {
        let input = [
            Event::new(EV_REL, REL_X, 3),
            Event::new(EV_REL, REL_Y, -2),
            syn(),
            Event::new(EV_MSC, MSC_SCAN, 0x90001),
            key(BTN_LEFT, 1),
            syn(),
        ];
        let mut source = FakeSource::new(&input);
        let mut sink = FakeSink::default();
        let mut remapper = Remapper::new();

        let count = forward_pending(&mut source, &mut remapper, &mut sink).unwrap();
        assert_eq!(count, input.len());
        assert_eq!(sink.written, input.to_vec());
    }

    #[test]
    fn toggle_applies_to_following_events() {
        let input = [
            key(BTN_LEFT, 1), syn(), key(BTN_LEFT, 0), syn(),
            key(TOGGLE_BUTTON, 1), syn(), key(TOGGLE_BUTTON, 0), syn(),
            key(BTN_LEFT, 1), syn(), key(BTN_LEFT, 0), syn(),
            Event::new(EV_REL, REL_X, -5), syn(),
        ];
        let mut source = FakeSource::new(&input);
        let mut sink = FakeSink::default();
        let mut remapper = Remapper::new();

        forward_pending(&mut source, &mut remapper, &mut sink).unwrap();

        assert_eq!(sink.written, vec![
            key(BTN_LEFT, 1), syn(), key(BTN_LEFT, 0), syn(),
            key(TOGGLE_BUTTON, 1), syn(), key(BTN_EXTRA, 0), syn(),
            key(BTN_RIGHT, 1), syn(), key(BTN_RIGHT, 0), syn(),
            Event::new(EV_REL, REL_X, -5), syn(),
        ]);
        assert_eq!(remapper.state(), ToggleState::Switched);
    }

    #[test]
    fn state_survives_between_drains() {
        let mut remapper = Remapper::new();
        let mut sink = FakeSink::default();

        forward_pending(&mut FakeSource::new(&[key(TOGGLE_BUTTON, 1)]), &mut remapper, &mut sink).unwrap();
        forward_pending(&mut FakeSource::new(&[key(BTN_SIDE, 1)]), &mut remapper, &mut sink).unwrap();

        assert_eq!(sink.written.last(), Some(&key(BTN_FORWARD, 1)));
    }

    #[test]
    fn stops_when_source_is_empty() {
        let mut source = FakeSource(VecDeque::new());
        source.0.push_back(Ok(Some(key(BTN_LEFT, 1))));
        source.0.push_back(Ok(None));
        source.0.push_back(Ok(Some(key(BTN_LEFT, 0))));

        let mut sink = FakeSink::default();
        let mut remapper = Remapper::new();

        assert_eq!(forward_pending(&mut source, &mut remapper, &mut sink).unwrap(), 1);
        assert_eq!(forward_pending(&mut source, &mut remapper, &mut sink).unwrap(), 1);
        assert_eq!(sink.written, vec![key(BTN_LEFT, 1), key(BTN_LEFT, 0)]);
    }

    #[test]
    fn write_failure_is_not_fatal() {
        let input = [key(BTN_LEFT, 1), syn(), key(BTN_LEFT, 0), syn()];
        let mut source = FakeSource::new(&input);
        let mut sink = FakeSink {
            fail_on: Some(key(BTN_LEFT, 1)),
            ..Default::default()
        };
        let mut remapper = Remapper::new();

        assert_eq!(forward_pending(&mut source, &mut remapper, &mut sink).unwrap(), 4);
        assert_eq!(sink.written, vec![syn(), key(BTN_LEFT, 0), syn()]);
    }

    #[test]
    fn read_failure_propagates() {
        let mut source = FakeSource::new(&[key(BTN_LEFT, 1)]);
        source.0.push_back(Err(Error::msg("disconnected")));
        source.0.push_back(Ok(Some(key(BTN_LEFT, 0))));

        let mut sink = FakeSink::default();
        let mut remapper = Remapper::new();

        assert!(forward_pending(&mut source, &mut remapper, &mut sink).is_err());
        assert_eq!(sink.written, vec![key(BTN_LEFT, 1)]);
    }

    type Releases = Rc<RefCell<Vec<&'static str>>>;

    /// Turns every byte written to a pipe into a BTN_LEFT event with that
    /// byte as its value.
    struct PipeSource {
        fd: RawFd,
        releases: Releases,
    }

    impl EventSource for PipeSource {
        fn read_event(&mut self) -> Result<Option<Event>> {
            let mut buf = [0u8; 1];
            match read(self.fd, &mut buf) {
                Ok(1) => Ok(Some(key(BTN_LEFT, buf[0] as i32))),
                Ok(_) | Err(Errno::EAGAIN) => Ok(None),
                Err(e) => Err(e.into()),
            }
        }
    }

    impl AsRawFd for PipeSource {
        fn as_raw_fd(&self) -> RawFd {
            self.fd
        }
    }

    impl Drop for PipeSource {
        fn drop(&mut self) {
            let _ = close(self.fd);
            self.releases.borrow_mut().push("source");
        }
    }

    struct RecordingSink {
        written: Rc<RefCell<Vec<Event>>>,
        releases: Releases,
    }

    impl EventSink for RecordingSink {
        fn write_event(&mut self, event: &Event) -> Result<()> {
            self.written.borrow_mut().push(*event);
            Ok(())
        }
    }

    impl Drop for RecordingSink {
        fn drop(&mut self) {
            self.releases.borrow_mut().push("sink");
        }
    }

    struct Session {
        app: Evswap<PipeSource, RecordingSink>,
        wfd: RawFd,
        written: Rc<RefCell<Vec<Event>>>,
        releases: Releases,
    }

    fn session(signal: Signal) -> Session {
        let (rfd, wfd) = pipe2(OFlag::O_NONBLOCK | OFlag::O_CLOEXEC).unwrap();
        let releases = Releases::default();
        let written = Rc::new(RefCell::new(Vec::new()));

        let source = PipeSource { fd: rfd, releases: Rc::clone(&releases) };
        let sink = RecordingSink { written: Rc::clone(&written), releases: Rc::clone(&releases) };
        let signals = Signals::new(&[signal]).unwrap();

        Session {
            app: Evswap::new(source, sink, signals).unwrap(),
            wfd,
            written,
            releases,
        }
    }

    #[test]
    fn termination_signal_ends_run() {
        let mut s = session(Signal::SIGTERM);

        raise(Signal::SIGTERM).unwrap();
        write(s.wfd, &[1]).unwrap();

        assert!(s.app.run().is_ok());
        assert!(s.written.borrow().is_empty());
        close(s.wfd).unwrap();
    }

    #[test]
    fn pending_events_are_forwarded_before_shutdown() {
        let mut s = session(Signal::SIGTERM);

        write(s.wfd, &[1, 0]).unwrap();
        raise(Signal::SIGTERM).unwrap();

        assert!(s.app.run().is_ok());
        assert_eq!(*s.written.borrow(), vec![key(BTN_LEFT, 1), key(BTN_LEFT, 0)]);
        close(s.wfd).unwrap();
    }

    #[test]
    fn hangup_is_fatal() {
        let mut s = session(Signal::SIGUSR1);

        close(s.wfd).unwrap();

        let err = s.app.run().unwrap_err();
        assert!(err.to_string().contains("hung up"));
    }

    #[test]
    fn shutdown_releases_source_before_sink() {
        let s = session(Signal::SIGUSR1);
        let releases = Rc::clone(&s.releases);

        s.app.shutdown();
        assert_eq!(*releases.borrow(), vec!["source", "sink"]);
        close(s.wfd).unwrap();
    }
}


use nix::errno::Errno;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Argument(#[from] clap::Error),

    #[error("couldn't open {}: {source}", .path.display())]
    DeviceOpen { path: PathBuf, source: Errno },

    #[error("couldn't create libevdev struct for {}: {source}", .path.display())]
    DeviceInit { path: PathBuf, source: Errno },

    #[error("couldn't grab {}: {source}", .path.display())]
    Grab { path: PathBuf, source: Errno },

    #[error("couldn't open {}: {source}", .path.display())]
    SinkOpen { path: PathBuf, source: Errno },

    #[error("couldn't create uinput device: {0}")]
    SinkCreate(Errno),

    #[error("couldn't set up signal handling: {0}")]
    SignalSetup(Errno),

    #[error("couldn't fork into background: {0}")]
    Fork(Errno),

    #[error(transparent)]
    Errno(#[from] Errno),

    #[error("{0}")]
    Message(String),
}

impl Error {
    pub fn msg<S: Into<String>>(msg: S) -> Self {
        Self::Message(msg.into())
    }
}

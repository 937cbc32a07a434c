
mod evswap;
mod error;
mod event;
mod remap;
mod srcdev;
mod destdev;

pub use evswap::Evswap;
pub use error::Error;

pub type Result<T> = std::result::Result<T, Error>;

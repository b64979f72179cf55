mod connection;
mod cursor;
pub mod error;
pub mod fs;
mod options;
mod session;
#[cfg(test)]
pub(crate) mod testing;

pub use connection::{Connection, TransferMode};
pub use options::{ConnectOptions, Credentials};
pub use session::{FtpSession, SessionState};

pub(crate) use session::SessionInner;

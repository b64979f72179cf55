//! Filesystem-like operations over an FTP control connection.
//!
//! [`FtpSession`](client::FtpSession) drives any [`Connection`](client::Connection)
//! through connect and login, then offers recursive listings, directory
//! queries, tree creation and removal, and mirrored uploads. The wire
//! protocol itself belongs to the connection.

#[macro_use]
extern crate log;
#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate async_trait;

/// Session and filesystem operations
pub mod client;
pub mod error;
/// Detailed listing parser
pub mod listing;
mod utils;

pub use client::{ConnectOptions, Connection, Credentials, FtpSession, SessionState, TransferMode};
pub use listing::{Entry, EntryKinds, EntryType};

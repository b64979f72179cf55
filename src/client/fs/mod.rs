//! Filesystem-like operations built from single FTP commands.
//!
//! Everything here is implemented on the locked session state, so an
//! operation owns the connection from its first command to its last.
//! Operations that move the working directory restore it before returning.

mod dir;
mod file;
mod local;
mod mirror;
mod tree;
mod walk;

pub use local::{LocalEntry, LocalFs, TokioFs};
pub use walk::ListOrder;

//! The lintd Library
//!
//! This crate contains all the moving parts of lintd, an HTTP service that
//! analyses source code uploaded as `multipart/form-data` and returns the
//! diagnostics as plain text. The application itself, via `main.rs` is
//! only a very tiny frontend.

pub use self::config::Config;
pub use self::error::{ExitError, Failed};
pub use self::process::Process;
pub use self::server::Server;

pub mod config;
pub mod error;
pub mod http;
pub mod lint;
pub mod multipart;
pub mod process;
pub mod server;
pub mod utils;

#[cfg(test)]
mod test;

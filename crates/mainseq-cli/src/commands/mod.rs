//! Subcommand implementations.

pub mod analyse;
pub mod init;
pub mod output;

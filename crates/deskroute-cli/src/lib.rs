//! deskroute CLI
//!
//! Command implementations behind the `deskroute` binary. Each command
//! returns a summary value; printing happens in `main`.

pub mod cli;
pub mod commands;

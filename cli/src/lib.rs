//! Library side of the `covenant` tool, split out so the command flows can
//! be driven from integration tests.

pub mod commands;
pub mod config;
pub mod devnet;

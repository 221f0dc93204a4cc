//! CLI subcommands. Each `run` returns a printable error string.

pub mod ask;
pub mod config;
pub mod encode;
pub mod schema;

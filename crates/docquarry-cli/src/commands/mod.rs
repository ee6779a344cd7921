//! CLI command handlers

pub mod init;
pub mod query;
pub mod reindex;
pub mod status;

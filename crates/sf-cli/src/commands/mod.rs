//! CLI command implementations

pub(crate) mod common;
pub(crate) mod init;
pub(crate) mod migrate_down;
pub(crate) mod migrate_up;
pub(crate) mod seed;
pub(crate) mod setup;
pub(crate) mod status;

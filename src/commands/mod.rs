//! Command implementations dispatched from main
//!
//! Install and verify return whether every attempted component succeeded;
//! main maps that to the process exit code (0 all good, 1 some failed,
//! 2 configuration error before anything was attempted).

pub mod completions;
pub mod install;
pub mod list;
pub mod verify;
pub mod version;

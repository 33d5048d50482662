//! Error types and handling for printkit
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! Two error classes matter for control flow:
//! - configuration/environment errors abort before any component is
//!   attempted (exit code 2),
//! - component install errors are caught at the orchestrator boundary and
//!   recorded as a FAILURE outcome; sibling components keep running.

use std::path::Path;

use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PrintkitError>;

/// Main error type for printkit operations
#[derive(Error, Diagnostic, Debug)]
pub enum PrintkitError {
    // Configuration errors (fatal before orchestration)
    #[error("Unknown component: {name}")]
    #[diagnostic(
        code(printkit::config::unknown_component),
        help("Run `printkit list` to see the available components")
    )]
    UnknownComponent { name: String },

    #[error("No components matched the requested selection")]
    #[diagnostic(code(printkit::config::empty_selection))]
    EmptySelection,

    #[error("This installer must be run as root (use sudo)")]
    #[diagnostic(
        code(printkit::config::not_root),
        help("Re-run with sudo, or use --dry-run to preview the changes")
    )]
    NotRoot,

    #[error("Assets directory not found: {path}")]
    #[diagnostic(
        code(printkit::config::assets_not_found),
        help("Run from the repository checkout or set PRINTKIT_ASSETS_DIR")
    )]
    AssetsNotFound { path: String },

    // Component install errors (recovered at the orchestrator)
    #[error("Source file not found: {path}")]
    #[diagnostic(code(printkit::install::source_not_found))]
    SourceNotFound { path: String },

    #[error("Source directory not found: {path}")]
    #[diagnostic(code(printkit::install::source_dir_not_found))]
    SourceDirNotFound { path: String },

    #[error("Patch target not found: {path}")]
    #[diagnostic(
        code(printkit::install::patch_target_missing),
        help("The target file is part of the stock firmware; check the printer's filesystem layout")
    )]
    PatchTargetMissing { path: String },

    #[error("Expected pattern not found in {path}")]
    #[diagnostic(code(printkit::install::pattern_not_found))]
    PatternNotFound { path: String },

    #[error("Failed to read {path}: {reason}")]
    #[diagnostic(code(printkit::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write {path}: {reason}")]
    #[diagnostic(code(printkit::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("Failed to copy {src} to {dst}: {reason}")]
    #[diagnostic(code(printkit::fs::copy_failed))]
    CopyFailed {
        src: String,
        dst: String,
        reason: String,
    },

    #[error("Required tool not found: {tool}")]
    #[diagnostic(
        code(printkit::env::tool_not_found),
        help("Install the tool via the board's package manager (opkg) first")
    )]
    ToolNotFound { tool: String },

    #[error("Command failed: {command}: {reason}")]
    #[diagnostic(code(printkit::install::command_failed))]
    CommandFailed { command: String, reason: String },

    #[error("Failed to clone {url}: {reason}")]
    #[diagnostic(code(printkit::install::clone_failed))]
    CloneFailed { url: String, reason: String },

    #[error("Failed to restart service: {service}")]
    #[diagnostic(code(printkit::install::service_restart_failed))]
    ServiceRestartFailed { service: String },
}

impl PrintkitError {
    /// Whether this error is fatal before orchestration begins
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnknownComponent { .. }
                | Self::EmptySelection
                | Self::NotRoot
                | Self::AssetsNotFound { .. }
        )
    }
}

pub fn source_not_found(path: &Path) -> PrintkitError {
    PrintkitError::SourceNotFound {
        path: path.display().to_string(),
    }
}

pub fn source_dir_not_found(path: &Path) -> PrintkitError {
    PrintkitError::SourceDirNotFound {
        path: path.display().to_string(),
    }
}

pub fn patch_target_missing(path: &Path) -> PrintkitError {
    PrintkitError::PatchTargetMissing {
        path: path.display().to_string(),
    }
}

pub fn read_failed(path: &Path, e: std::io::Error) -> PrintkitError {
    PrintkitError::FileReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

pub fn write_failed(path: &Path, e: std::io::Error) -> PrintkitError {
    PrintkitError::FileWriteFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

pub fn copy_failed(src: &Path, dst: &Path, e: std::io::Error) -> PrintkitError {
    PrintkitError::CopyFailed {
        src: src.display().to_string(),
        dst: dst.display().to_string(),
        reason: e.to_string(),
    }
}

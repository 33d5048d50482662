//! CLI definitions using clap derive API

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand, ValueEnum};

/// printkit - preset installer for Klipper printer boards
///
/// Copies preset configuration files, service definitions, and patched
/// scripts onto a printer control board running a Klipper/Moonraker stack.
#[derive(Parser, Debug)]
#[command(
    name = "printkit",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Preset config and patch installer for Klipper/Moonraker printer boards",
    long_about = "printkit installs preset configuration files, an init.d service, and \
                  patched scripts onto a 3D-printer control board running a \
                  Klipper/Moonraker firmware stack. It has no runtime component of its \
                  own: after a run completes, the printer runs unmodified third-party \
                  software plus the installed files.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  printkit install\n    \
                  printkit install --dry-run\n    \
                  printkit install --components kamp overrides cleanup\n    \
                  printkit install --components timelapse --encoder h264\n    \
                  printkit verify\n    \
                  printkit list"
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install components onto the printer board
    Install(InstallArgs),

    /// Verify that installed components are in place
    Verify(VerifyArgs),

    /// List the available components
    List,

    /// Show version information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the install command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                   Install everything:\n    printkit install\n\n\
                   Preview without touching the filesystem:\n    printkit install --dry-run\n\n\
                   Install selected components only:\n    printkit install --components kamp cleanup\n\n\
                   Timelapse with H.264 encoding:\n    printkit install --components timelapse --encoder h264\n\n\
                   Machine-readable summary:\n    printkit install --json")]
pub struct InstallArgs {
    /// Report intended changes without applying any of them
    #[arg(long)]
    pub dry_run: bool,

    /// Restrict the run to the named components (default: all)
    #[arg(long, num_args = 1.., value_name = "NAME")]
    pub components: Vec<String>,

    /// Video encoder patched into the timelapse component
    #[arg(long, value_enum, default_value_t = Encoder::Mjpeg)]
    pub encoder: Encoder,

    /// Render the summary as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the verify command
#[derive(Parser, Debug)]
pub struct VerifyArgs {
    /// Restrict verification to the named components (default: all)
    #[arg(long, num_args = 1.., value_name = "NAME")]
    pub components: Vec<String>,

    /// Render the summary as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the completions command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for (bash, elvish, fish, powershell, zsh)
    pub shell: String,
}

/// Timelapse video encoder selection
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encoder {
    /// MJPEG: cheap to encode on the board's CPU
    Mjpeg,
    /// H.264 via libx264: smaller files, heavier encode
    H264,
}

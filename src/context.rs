//! Run configuration and filesystem layout for an install run
//!
//! Everything the unit install routines touch flows through an explicit
//! [`InstallContext`]: target paths on the printer, the payload assets
//! shipped with this repository, and the dry-run/verbose flags. There is no
//! ambient global state; tests build a context pointing at a temp tree.
//!
//! Every target path has a `PRINTKIT_*` environment override so the full
//! binary can be exercised against a scratch directory.

use std::path::{Path, PathBuf};
use std::process::Command;

use console::Style;

use crate::cli::Encoder;
use crate::error::{PrintkitError, Result};

/// Filesystem locations written to on the printer board
#[derive(Debug, Clone)]
pub struct TargetPaths {
    /// Printer config directory (printer.cfg, moonraker.conf, KAMP)
    pub config_dir: PathBuf,
    /// User config directory under the config dir (main.cfg and friends)
    pub custom_config_dir: PathBuf,
    /// Klipper extras directory (bed_mesh.py, resonance_tester.py)
    pub klipper_extras_dir: PathBuf,
    /// init.d directory for service scripts
    pub init_d_dir: PathBuf,
    /// Moonraker allowed-services file
    pub moonraker_asvc: PathBuf,
    /// Moonraker components directory (timelapse.py)
    pub moonraker_components_dir: PathBuf,
    /// Mainsail web root on persistent storage
    pub mainsail_dir: PathBuf,
    /// Symlink location the web server serves mainsail from
    pub mainsail_link: PathBuf,
    /// nginx configuration file
    pub nginx_conf: PathBuf,
    /// Installed ustreamer binary location
    pub ustreamer_bin: PathBuf,
}

impl Default for TargetPaths {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("/mnt/UDISK/printer_data/config"),
            custom_config_dir: PathBuf::from("/mnt/UDISK/printer_data/config/custom"),
            klipper_extras_dir: PathBuf::from("/usr/share/klipper/klippy/extras"),
            init_d_dir: PathBuf::from("/etc/init.d"),
            moonraker_asvc: PathBuf::from("/mnt/UDISK/printer_data/moonraker.asvc"),
            moonraker_components_dir: PathBuf::from(
                "/mnt/UDISK/root/moonraker/moonraker/components",
            ),
            mainsail_dir: PathBuf::from("/mnt/UDISK/root/mainsail"),
            mainsail_link: PathBuf::from("/usr/share/mainsail"),
            nginx_conf: PathBuf::from("/etc/nginx/nginx.conf"),
            ustreamer_bin: PathBuf::from("/usr/local/bin/ustreamer"),
        }
    }
}

fn env_path(var: &str, default: PathBuf) -> PathBuf {
    std::env::var_os(var).map_or(default, PathBuf::from)
}

impl TargetPaths {
    /// Build target paths from the printer defaults plus env overrides
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            config_dir: env_path("PRINTKIT_CONFIG_DIR", defaults.config_dir),
            custom_config_dir: env_path("PRINTKIT_CUSTOM_CONFIG_DIR", defaults.custom_config_dir),
            klipper_extras_dir: env_path(
                "PRINTKIT_KLIPPER_EXTRAS_DIR",
                defaults.klipper_extras_dir,
            ),
            init_d_dir: env_path("PRINTKIT_INIT_D_DIR", defaults.init_d_dir),
            moonraker_asvc: env_path("PRINTKIT_MOONRAKER_ASVC", defaults.moonraker_asvc),
            moonraker_components_dir: env_path(
                "PRINTKIT_MOONRAKER_COMPONENTS_DIR",
                defaults.moonraker_components_dir,
            ),
            mainsail_dir: env_path("PRINTKIT_MAINSAIL_DIR", defaults.mainsail_dir),
            mainsail_link: env_path("PRINTKIT_MAINSAIL_LINK", defaults.mainsail_link),
            nginx_conf: env_path("PRINTKIT_NGINX_CONF", defaults.nginx_conf),
            ustreamer_bin: env_path("PRINTKIT_USTREAMER_BIN", defaults.ustreamer_bin),
        }
    }

    pub fn printer_cfg(&self) -> PathBuf {
        self.config_dir.join("printer.cfg")
    }

    pub fn moonraker_conf(&self) -> PathBuf {
        self.config_dir.join("moonraker.conf")
    }

    pub fn custom_main_cfg(&self) -> PathBuf {
        self.custom_config_dir.join("main.cfg")
    }
}

/// Payload shipped with the repository checkout
#[derive(Debug, Clone)]
pub struct AssetPaths {
    pub root: PathBuf,
}

impl AssetPaths {
    /// Resolve the assets directory: `PRINTKIT_ASSETS_DIR` or `./assets`
    pub fn from_env() -> Self {
        Self {
            root: env_path("PRINTKIT_ASSETS_DIR", PathBuf::from("assets")),
        }
    }

    pub fn configs(&self) -> PathBuf {
        self.root.join("configs")
    }

    pub fn services(&self) -> PathBuf {
        self.root.join("services")
    }

    pub fn patches(&self) -> PathBuf {
        self.root.join("patches")
    }

    pub fn binaries(&self) -> PathBuf {
        self.root.join("binaries")
    }
}

/// Everything a unit install routine needs for one run
#[derive(Debug, Clone)]
pub struct InstallContext {
    pub paths: TargetPaths,
    pub assets: AssetPaths,
    pub dry_run: bool,
    pub verbose: bool,
    /// Encoder the timelapse component patches into timelapse.py
    pub encoder: Encoder,
    /// Local moonraker-timelapse checkout to use instead of a network clone
    pub timelapse_source: Option<PathBuf>,
}

impl InstallContext {
    pub fn from_env(dry_run: bool, verbose: bool, encoder: Encoder) -> Self {
        Self {
            paths: TargetPaths::from_env(),
            assets: AssetPaths::from_env(),
            dry_run,
            verbose,
            encoder,
            timelapse_source: std::env::var_os("PRINTKIT_TIMELAPSE_SOURCE").map(PathBuf::from),
        }
    }

    /// Log a status line, prefixed when running in dry-run mode
    pub fn log(&self, message: &str) {
        if self.dry_run {
            println!(
                "{} {}",
                Style::new().yellow().apply_to("[DRY RUN]"),
                message
            );
        } else {
            println!("{message}");
        }
    }

    /// Log only under --verbose
    pub fn log_verbose(&self, message: &str) {
        if self.verbose {
            self.log(&Style::new().dim().apply_to(message).to_string());
        }
    }

    /// Run an external command, capturing output
    pub fn run_command(&self, program: &Path, args: &[&str], cwd: Option<&Path>) -> Result<()> {
        let rendered = format!("{} {}", program.display(), args.join(" "));
        self.log_verbose(&format!("Running: {rendered}"));

        let mut command = Command::new(program);
        command.args(args);
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }

        let output = command
            .output()
            .map_err(|e| PrintkitError::CommandFailed {
                command: rendered.clone(),
                reason: e.to_string(),
            })?;

        if self.verbose && !output.stdout.is_empty() {
            self.log_verbose(&String::from_utf8_lossy(&output.stdout));
        }

        if !output.status.success() {
            return Err(PrintkitError::CommandFailed {
                command: rendered,
                reason: format!(
                    "exit status {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(())
    }

    /// Restart an init.d service; honored as a no-op under dry-run
    pub fn restart_service(&self, service: &str) -> Result<()> {
        if self.dry_run {
            self.log(&format!("Would restart service: {service}"));
            return Ok(());
        }

        let script = self.paths.init_d_dir.join(service);
        self.run_command(&script, &["restart"], None)
            .map_err(|_| PrintkitError::ServiceRestartFailed {
                service: service.to_string(),
            })?;
        self.log(&format!("Restarted service: {service}"));
        Ok(())
    }

    /// Stop an init.d service, ignoring failures (service may not exist yet)
    pub fn stop_service_best_effort(&self, service: &str) {
        if self.dry_run {
            return;
        }
        let script = self.paths.init_d_dir.join(service);
        if script.exists() {
            let _ = self.run_command(&script, &["stop"], None);
        }
    }
}

/// Check that the process runs with root privilege
///
/// Skipped under `PRINTKIT_ALLOW_UNPRIVILEGED=1` so the integration tests
/// can drive the binary against a temp tree.
pub fn require_root() -> Result<()> {
    if std::env::var_os("PRINTKIT_ALLOW_UNPRIVILEGED").is_some_and(|v| v == "1") {
        return Ok(());
    }

    // SAFETY: geteuid has no preconditions and never fails
    let euid = unsafe { libc::geteuid() };
    if euid != 0 {
        return Err(PrintkitError::NotRoot);
    }
    Ok(())
}

//! Mainsail web interface
//!
//! Downloads the latest mainsail release onto persistent storage, links it
//! into the web root, swaps in the bundled nginx config, registers the
//! update manager with Moonraker, and restarts nginx. The download and
//! unpack go through the board's wget/unzip (entware installs live under
//! /opt/bin, which is preferred over PATH).

use std::path::{Path, PathBuf};

use crate::context::InstallContext;
use crate::error::{self, PrintkitError, Result};
use crate::fsops;
use crate::orchestrator::StepOutcome;
use crate::patch;

const RELEASE_URL: &str =
    "https://github.com/mainsail-crew/mainsail/releases/latest/download/mainsail.zip";

const UPDATE_MANAGER_HEADER: &str = "[update_manager mainsail]";
const UPDATE_MANAGER_BODY: &str =
    "type: web\nchannel: stable\nrepo: mainsail-crew/mainsail\npath: ~root/mainsail";

pub fn install(ctx: &InstallContext) -> Result<StepOutcome> {
    if ctx.dry_run {
        ctx.log(&format!(
            "Would download and unpack mainsail into {}",
            ctx.paths.mainsail_dir.display()
        ));
        ctx.log(&format!(
            "Would link {} to {}",
            ctx.paths.mainsail_dir.display(),
            ctx.paths.mainsail_link.display()
        ));
        ctx.log("Would install nginx.conf and register the Moonraker update manager");
        ctx.log("Would restart service: nginx");
        return Ok(StepOutcome::Changed("would install".to_string()));
    }

    download_and_unpack(ctx)?;
    link_web_root(ctx)?;

    super::copy_file_step(
        ctx,
        &ctx.assets.patches().join("nginx.conf"),
        &ctx.paths.nginx_conf,
    )?;

    super::patch_file_step(
        ctx,
        &ctx.paths.moonraker_conf(),
        "register mainsail update manager",
        |content| patch::ensure_section(content, UPDATE_MANAGER_HEADER, UPDATE_MANAGER_BODY),
    )?;

    ctx.restart_service("nginx")?;

    Ok(StepOutcome::Changed("installed".to_string()))
}

/// Recreate the mainsail dir from a fresh release zip
fn download_and_unpack(ctx: &InstallContext) -> Result<()> {
    let dir = &ctx.paths.mainsail_dir;
    if dir.exists() {
        std::fs::remove_dir_all(dir).map_err(|e| error::write_failed(dir, e))?;
    }
    fsops::ensure_dir(dir)?;

    let wget = find_tool("wget")?;
    ctx.log("Downloading mainsail...");
    ctx.run_command(&wget, &["-q", "-O", "mainsail.zip", RELEASE_URL], Some(dir))?;

    let unzip = find_tool("unzip")?;
    ctx.log("Extracting mainsail...");
    ctx.run_command(&unzip, &["-o", "-q", "mainsail.zip"], Some(dir))?;

    let zip = dir.join("mainsail.zip");
    std::fs::remove_file(&zip).map_err(|e| error::write_failed(&zip, e))?;
    Ok(())
}

/// Locate a tool, preferring the entware install over PATH
fn find_tool(name: &str) -> Result<PathBuf> {
    let entware = Path::new("/opt/bin").join(name);
    if entware.is_file() {
        return Ok(entware);
    }
    which::which(name).map_err(|_| PrintkitError::ToolNotFound {
        tool: name.to_string(),
    })
}

/// Point the web root symlink at the mainsail dir, replacing whatever is there
fn link_web_root(ctx: &InstallContext) -> Result<()> {
    let link = &ctx.paths.mainsail_link;
    if let Ok(meta) = link.symlink_metadata() {
        if meta.is_symlink() || meta.is_file() {
            std::fs::remove_file(link).map_err(|e| error::write_failed(link, e))?;
        } else {
            std::fs::remove_dir_all(link).map_err(|e| error::write_failed(link, e))?;
        }
    }
    if let Some(parent) = link.parent() {
        fsops::ensure_dir(parent)?;
    }
    std::os::unix::fs::symlink(&ctx.paths.mainsail_dir, link)
        .map_err(|e| error::write_failed(link, e))?;
    ctx.log(&format!(
        "Linked {} to {}",
        ctx.paths.mainsail_dir.display(),
        link.display()
    ));
    Ok(())
}

pub fn verify(ctx: &InstallContext) -> Result<StepOutcome> {
    super::check_dir(&ctx.paths.mainsail_dir, "mainsail directory")?;

    let link = &ctx.paths.mainsail_link;
    let link_ok = link
        .symlink_metadata()
        .is_ok_and(|m| m.is_symlink() || m.is_dir());
    if !link_ok {
        return Err(PrintkitError::PatchTargetMissing {
            path: format!("mainsail web root link: {}", link.display()),
        });
    }

    super::check_contains(
        &ctx.paths.moonraker_conf(),
        UPDATE_MANAGER_HEADER,
        "moonraker.conf update manager",
    )?;
    Ok(super::verified())
}

//! moonraker-timelapse component
//!
//! Fetches the upstream moonraker-timelapse sources (shallow git clone, or
//! a local checkout when `PRINTKIT_TIMELAPSE_SOURCE` is set), installs the
//! Moonraker component and the Klipper macro config, rewrites the ffmpeg
//! invocation for the selected encoder, wires up the includes, and restarts
//! the affected services.
//!
//! Ordering: the include goes at the very FIRST line of custom/main.cfg so
//! the timelapse macros are defined before anything that may reference them.

use std::path::Path;

use crate::cli::Encoder;
use crate::context::InstallContext;
use crate::error::{self, PrintkitError, Result};
use crate::fsops;
use crate::orchestrator::StepOutcome;
use crate::patch;

const UPSTREAM_URL: &str = "https://github.com/mainsail-crew/moonraker-timelapse.git";
const INCLUDE_LINE: &str = "[include timelapse.cfg]";
const OUTPUT_PATH_LINE: &str = "output_path: /mnt/UDISK/root/timelapse";

pub fn install(ctx: &InstallContext) -> Result<StepOutcome> {
    if ctx.dry_run {
        ctx.log("Would clone moonraker-timelapse and install timelapse.py");
        ctx.log(&format!(
            "Would patch timelapse.py for {} encoding",
            encoder_name(ctx.encoder)
        ));
        ctx.log("Would install timelapse.cfg and include it first in custom/main.cfg");
        ctx.log("Would ensure [timelapse] output_path in moonraker.conf");
        ctx.log("Would restart services: moonraker, klipper");
        return Ok(StepOutcome::Changed("would install".to_string()));
    }

    // Hold the temp clone alive for the whole install
    let mut _clone_guard = None;
    let source = match &ctx.timelapse_source {
        Some(path) => {
            if !path.is_dir() {
                return Err(error::source_dir_not_found(path));
            }
            path.clone()
        }
        None => {
            let temp = tempfile::tempdir().map_err(|e| PrintkitError::CloneFailed {
                url: UPSTREAM_URL.to_string(),
                reason: e.to_string(),
            })?;
            let path = temp.path().join("moonraker-timelapse");
            clone_upstream(&path)?;
            ctx.log("Cloned moonraker-timelapse");
            _clone_guard = Some(temp);
            path
        }
    };

    let mut changed = false;

    // Moonraker component, patched for the selected encoder
    let component_dst = ctx.paths.moonraker_components_dir.join("timelapse.py");
    changed |= super::copy_file_step(
        ctx,
        &source.join("component/timelapse.py"),
        &component_dst,
    )?;
    changed |= patch_encoder(ctx, &component_dst)?;

    // Klipper macro config; the custom dir is created by the overrides
    // component and must already exist
    if !ctx.paths.custom_config_dir.is_dir() {
        return Err(error::source_dir_not_found(&ctx.paths.custom_config_dir));
    }
    changed |= super::copy_file_step(
        ctx,
        &source.join("klipper_macro/timelapse.cfg"),
        &ctx.paths.custom_config_dir.join("timelapse.cfg"),
    )?;

    changed |= super::patch_file_step(
        ctx,
        &ctx.paths.custom_main_cfg(),
        "timelapse include as first line of main.cfg",
        |content| patch::ensure_first_line(content, INCLUDE_LINE),
    )?;

    changed |= super::patch_file_step(
        ctx,
        &ctx.paths.moonraker_conf(),
        "[timelapse] output_path in moonraker.conf",
        |content| {
            patch::ensure_section_key(content, "[timelapse]", "output_path", OUTPUT_PATH_LINE)
        },
    )?;

    if changed {
        ctx.restart_service("moonraker")?;
        ctx.restart_service("klipper")?;
    }

    Ok(super::outcome(changed))
}

fn clone_upstream(target: &Path) -> Result<()> {
    let mut fetch_options = git2::FetchOptions::new();
    fetch_options.depth(1);
    git2::build::RepoBuilder::new()
        .fetch_options(fetch_options)
        .clone(UPSTREAM_URL, target)
        .map_err(|e| PrintkitError::CloneFailed {
            url: UPSTREAM_URL.to_string(),
            reason: e.message().to_string(),
        })?;
    Ok(())
}

fn encoder_name(encoder: Encoder) -> &'static str {
    match encoder {
        Encoder::Mjpeg => "MJPEG",
        Encoder::H264 => "H.264",
    }
}

/// Rewrite the installed component's ffmpeg flags for the selected encoder
fn patch_encoder(ctx: &InstallContext, component: &Path) -> Result<bool> {
    let content = fsops::read_text(component)?;
    let (patched, changed) = match ctx.encoder {
        Encoder::Mjpeg => apply_mjpeg_patch(&content),
        Encoder::H264 => apply_h264_patch(&content),
    };

    if !changed {
        ctx.log_verbose("timelapse.py contains no codec strings to patch");
        return Ok(false);
    }

    fsops::write_text(component, &patched)?;
    ctx.log(&format!(
        "Patched timelapse.py to use {} encoding",
        encoder_name(ctx.encoder)
    ));
    Ok(true)
}

/// Prefer MJPEG over libx264: cheap to encode on the board's CPU
fn apply_mjpeg_patch(content: &str) -> (String, bool) {
    let mut patched = content.to_string();

    patched = patched.replace("-vcodec libx264", "-vcodec mjpeg");
    patched = patched.replace("-c:v libx264", "-c:v mjpeg");

    // Map CRF (x264) to q:v (mjpeg quality), keeping the numeric value
    patched = patched.replace(" -crf ", " -q:v ");

    // GOP size does not apply to MJPEG
    patched = patched.replace(" -threads 2 -g 5", " -threads 2");
    patched = patched.replace(" -g 5", "");

    // Faster MP4 playback start without a re-encode; guard keeps the
    // rewrite stable when the component was patched before
    if !patched.contains("-movflags +faststart") {
        patched = patched.replace(" -an", " -an -movflags +faststart");
    }

    let changed = patched != content;
    (patched, changed)
}

/// Normalize codec flags to libx264 tuned for still-image frames
fn apply_h264_patch(content: &str) -> (String, bool) {
    let mut patched = content.to_string();

    patched = patched.replace("-vcodec mjpeg", "-vcodec libx264");
    patched = patched.replace("-c:v mjpeg", "-c:v libx264");
    patched = patched.replace("-vcodec libx264", "-c:v libx264");

    if !patched.contains("-preset ultrafast") {
        patched = patched.replace(
            "-c:v libx264",
            "-c:v libx264 -preset ultrafast -tune stillimage",
        );
    }

    // Drop the hard-coded GOP; the component derives it from fps at runtime
    patched = patched.replace(" -g 5", "");

    // CRF stays CRF for h264
    patched = patched.replace(" -q:v ", " -crf ");

    let changed = patched != content;
    (patched, changed)
}

pub fn verify(ctx: &InstallContext) -> Result<StepOutcome> {
    super::check_file(
        &ctx.paths.moonraker_components_dir.join("timelapse.py"),
        "timelapse.py component",
    )?;
    super::check_file(
        &ctx.paths.custom_config_dir.join("timelapse.cfg"),
        "timelapse.cfg",
    )?;

    let main_cfg = fsops::read_text(&ctx.paths.custom_main_cfg())?;
    if main_cfg.lines().next().map(str::trim) != Some(INCLUDE_LINE) {
        return Err(PrintkitError::PatternNotFound {
            path: ctx.paths.custom_main_cfg().display().to_string(),
        });
    }

    super::check_contains(&ctx.paths.moonraker_conf(), "[timelapse]", "moonraker.conf")?;
    Ok(super::verified())
}

#[cfg(test)]
mod tests {
    use super::*;

    const UPSTREAM_CMD: &str = "cmd = \"ffmpeg -r 30 -i frames%6d.jpg -vcodec libx264 -threads 2 -g 5 -crf 23 -pix_fmt yuv420p -an out.mp4\"";

    #[test]
    fn test_mjpeg_patch_rewrites_codec_flags() {
        let (patched, changed) = apply_mjpeg_patch(UPSTREAM_CMD);
        assert!(changed);
        assert!(patched.contains("-vcodec mjpeg"));
        assert!(patched.contains(" -q:v 23"));
        assert!(!patched.contains("-g 5"));
        assert!(patched.contains(" -an -movflags +faststart"));
    }

    #[test]
    fn test_mjpeg_patch_is_stable() {
        let (patched, _) = apply_mjpeg_patch(UPSTREAM_CMD);
        let (again, changed) = apply_mjpeg_patch(&patched);
        assert!(!changed);
        assert_eq!(patched, again);
    }

    #[test]
    fn test_h264_patch_normalizes_to_libx264() {
        let (patched, changed) = apply_h264_patch(UPSTREAM_CMD);
        assert!(changed);
        assert!(patched.contains("-c:v libx264 -preset ultrafast -tune stillimage"));
        assert!(patched.contains(" -crf 23"));
        assert!(!patched.contains("-g 5"));
        assert!(!patched.contains("-vcodec"));
    }

    #[test]
    fn test_h264_patch_is_stable() {
        let (patched, _) = apply_h264_patch(UPSTREAM_CMD);
        let (again, changed) = apply_h264_patch(&patched);
        assert!(!changed);
        assert_eq!(patched, again);
    }

    #[test]
    fn test_h264_patch_converts_mjpeg_back() {
        let (mjpeg, _) = apply_mjpeg_patch(UPSTREAM_CMD);
        let (patched, changed) = apply_h264_patch(&mjpeg);
        assert!(changed);
        assert!(patched.contains("-c:v libx264 -preset ultrafast -tune stillimage"));
        assert!(patched.contains(" -crf 23"));
    }

    #[test]
    fn test_no_codec_strings_means_no_change() {
        let content = "def render(self):\n    pass\n";
        let (_, changed) = apply_mjpeg_patch(content);
        assert!(!changed);
        let (_, changed) = apply_h264_patch(content);
        assert!(!changed);
    }
}

//! Common test utilities for printkit integration tests
//!
//! Builds a complete fake printer tree (target paths plus payload assets)
//! under a temp directory and drives the real binary against it through
//! `PRINTKIT_*` environment overrides.

use std::collections::BTreeMap;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

pub const STOCK_PRINTER_CFG: &str =
    "[include base.cfg]\n[include fans.cfg]\n\n[printer]\nkinematics: corexy\n";

pub const STOCK_MOONRAKER_CONF: &str = "[server]\nhost: 0.0.0.0\nport: 7125\n";

pub const STOCK_BED_MESH: &str = "        self.move_check_distance = config.getfloat(\n            'move_check_distance', 5., minval=3.)\n";

pub const UPSTREAM_TIMELAPSE_PY: &str = "cmd = \"ffmpeg -r 30 -i frames%6d.jpg -vcodec libx264 -threads 2 -g 5 -crf 23 -pix_fmt yuv420p -an out.mp4\"\n";

/// A fake printer board plus repository assets
#[allow(dead_code)]
pub struct TestEnv {
    #[allow(dead_code)]
    pub temp: TempDir,
    pub root: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().to_path_buf();
        let env = Self { temp, root };
        env.seed_assets();
        env.seed_target();
        env
    }

    fn seed_assets(&self) {
        self.write_file("assets/configs/KAMP/Adaptive_Meshing.cfg", "[gcode_macro BED_MESH_CALIBRATE]\ngcode:\n    _BED_MESH_CALIBRATE\n");
        self.write_file("assets/configs/KAMP_Settings.cfg", "[include KAMP/Adaptive_Meshing.cfg]\n");
        self.write_file("assets/configs/macros.cfg", "[gcode_macro M600]\ngcode:\n    PAUSE\n");
        self.write_file("assets/configs/start_print.cfg", "[gcode_macro START_PRINT]\ngcode:\n    G28\n");
        self.write_file("assets/configs/overrides.cfg", "[printer]\nmax_accel: 12000\n");
        self.write_file(
            "assets/services/cleanup_printer_backups",
            "#!/bin/sh\n# prune old backups\nexit 0\n",
        );
        self.write_file("assets/patches/resonance_tester.py", "# patched tester\n");
        self.write_file("assets/patches/nginx.conf", "user root;\n");
        self.write_executable(
            "assets/binaries/ustreamer_static_arm32",
            "#!/bin/sh\necho usage\nexit 0\n",
        );
    }

    fn seed_target(&self) {
        self.write_file("target/config/printer.cfg", STOCK_PRINTER_CFG);
        self.write_file("target/config/moonraker.conf", STOCK_MOONRAKER_CONF);
        self.write_file("target/config/custom/main.cfg", "[include macros.cfg]\n");
        self.write_file("target/moonraker.asvc", "klipper\nmoonraker\n");
        self.write_file("target/extras/bed_mesh.py", STOCK_BED_MESH);
        std::fs::create_dir_all(self.root.join("target/components"))
            .expect("Failed to create components dir");
        std::fs::create_dir_all(self.root.join("target/www"))
            .expect("Failed to create www dir");

        // Fake init.d services so restarts succeed
        for service in ["moonraker", "klipper", "nginx"] {
            self.write_executable(&format!("target/init.d/{service}"), "#!/bin/sh\nexit 0\n");
        }

        // Local moonraker-timelapse checkout instead of a network clone
        self.write_file("timelapse-src/component/timelapse.py", UPSTREAM_TIMELAPSE_PY);
        self.write_file(
            "timelapse-src/klipper_macro/timelapse.cfg",
            "[gcode_macro TIMELAPSE_TAKE_FRAME]\ngcode:\n    _TIMELAPSE_NEW_FRAME\n",
        );
    }

    /// Command for the printkit binary with all paths pointed at this env
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("printkit").expect("binary built");
        cmd.env("PRINTKIT_ALLOW_UNPRIVILEGED", "1")
            .env("PRINTKIT_ASSETS_DIR", self.root.join("assets"))
            .env("PRINTKIT_CONFIG_DIR", self.root.join("target/config"))
            .env(
                "PRINTKIT_CUSTOM_CONFIG_DIR",
                self.root.join("target/config/custom"),
            )
            .env("PRINTKIT_KLIPPER_EXTRAS_DIR", self.root.join("target/extras"))
            .env("PRINTKIT_INIT_D_DIR", self.root.join("target/init.d"))
            .env(
                "PRINTKIT_MOONRAKER_ASVC",
                self.root.join("target/moonraker.asvc"),
            )
            .env(
                "PRINTKIT_MOONRAKER_COMPONENTS_DIR",
                self.root.join("target/components"),
            )
            .env("PRINTKIT_MAINSAIL_DIR", self.root.join("target/mainsail"))
            .env(
                "PRINTKIT_MAINSAIL_LINK",
                self.root.join("target/www/mainsail"),
            )
            .env("PRINTKIT_NGINX_CONF", self.root.join("target/nginx.conf"))
            .env(
                "PRINTKIT_USTREAMER_BIN",
                self.root.join("target/bin/ustreamer"),
            )
            .env(
                "PRINTKIT_TIMELAPSE_SOURCE",
                self.root.join("timelapse-src"),
            );
        cmd
    }

    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.root.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    pub fn write_executable(&self, path: &str, content: &str) {
        self.write_file(path, content);
        let file_path = self.root.join(path);
        std::fs::set_permissions(&file_path, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to chmod file");
    }

    pub fn read_file(&self, path: &str) -> String {
        std::fs::read_to_string(self.root.join(path)).expect("Failed to read file")
    }

    pub fn file_exists(&self, path: &str) -> bool {
        self.root.join(path).exists()
    }

    pub fn remove(&self, path: &str) {
        let target = self.root.join(path);
        if target.is_dir() {
            std::fs::remove_dir_all(&target).expect("Failed to remove dir");
        } else {
            std::fs::remove_file(&target).expect("Failed to remove file");
        }
    }

    /// Byte snapshot of the whole target tree, for dry-run comparisons
    pub fn snapshot_target(&self) -> BTreeMap<PathBuf, Vec<u8>> {
        let mut snapshot = BTreeMap::new();
        collect_files(&self.root.join("target"), &mut snapshot);
        snapshot
    }
}

fn collect_files(dir: &Path, out: &mut BTreeMap<PathBuf, Vec<u8>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, out);
        } else if path.is_file() {
            let bytes = std::fs::read(&path).expect("Failed to read file");
            out.insert(path, bytes);
        }
    }
}

//! Verify command tests

mod common;

use common::TestEnv;
use predicates::prelude::*;

#[test]
fn test_verify_passes_after_install() {
    let env = TestEnv::new();
    let components = [
        "kamp",
        "overrides",
        "cleanup",
        "resonance",
        "bed_mesh",
        "timelapse",
        "ustreamer",
    ];

    let mut install = vec!["install", "--components"];
    install.extend(components);
    env.cmd().args(&install).assert().success();

    let mut verify = vec!["verify", "--components"];
    verify.extend(components);
    env.cmd()
        .args(&verify)
        .assert()
        .success()
        .stdout(predicate::str::contains("verified"));
}

#[test]
fn test_verify_fails_on_fresh_tree() {
    let env = TestEnv::new();
    env.cmd()
        .args(["verify", "--components", "kamp"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("FAILURE"));
}

#[test]
fn test_verify_detects_missing_include() {
    let env = TestEnv::new();
    env.cmd()
        .args(["install", "--components", "kamp"])
        .assert()
        .success();

    // Revert the include but keep the files
    env.write_file("target/config/printer.cfg", common::STOCK_PRINTER_CFG);

    env.cmd()
        .args(["verify", "--components", "kamp"])
        .assert()
        .code(1);
}

#[test]
fn test_verify_detects_unpatched_bed_mesh() {
    let env = TestEnv::new();
    env.cmd()
        .args(["verify", "--components", "bed_mesh"])
        .assert()
        .code(1);

    env.cmd()
        .args(["install", "--components", "bed_mesh"])
        .assert()
        .success();

    env.cmd()
        .args(["verify", "--components", "bed_mesh"])
        .assert()
        .success();
}

#[test]
fn test_verify_unknown_component_is_configuration_error() {
    let env = TestEnv::new();
    env.cmd()
        .args(["verify", "--components", "webcam"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown component"));
}

//! Integration tests for pie-export
//!
//! Drives the full pipeline: manifest + OBJ files on disk -> .pie text
//! output, verified against the exact expected documents.

use std::fs;
use std::path::Path;

use tempfile::tempdir;

use pie_export::manifest;

const TRIANGLE_OBJ: &str = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
vt 1 0
vt 0 1
f 1/1 2/2 3/3
";

const CANNON_MANIFEST: &str = r#"
output = "out"

[[objects]]
name = "blcannon"
version = "3"
interpolate = true
texture = "page-17-sub-droids.png"
event1 = "fire.pie"

[objects.flags]
adr_off = true

[[objects]]
name = "body"
parent = "blcannon"
role = "level"
mesh = "body.obj"

[[objects]]
name = "muzzle"
parent = "body"
role = "connector"
location = [0.01, 0.02, 0.03]
"#;

const ANIMATED_MANIFEST: &str = r#"
output = "out"

[[objects]]
name = "mount"
version = "3"

[[objects.curves]]
data_path = 'pose.bones["gun"].location'
index = 2
keyframes = [[0.0, 0.0], [24.0, 0.5]]

[[objects]]
name = "gun"
parent = "mount"
role = "level"
mesh = "body.obj"
time = 100
cycles = 1
"#;

fn write_scene(dir: &Path, manifest_text: &str) {
    fs::write(dir.join("scene.toml"), manifest_text).expect("write manifest");
    fs::write(dir.join("body.obj"), TRIANGLE_OBJ).expect("write obj");
}

#[test]
fn build_writes_the_expected_document() {
    let dir = tempdir().expect("tempdir");
    write_scene(dir.path(), CANNON_MANIFEST);

    let config = manifest::load_manifest(&dir.path().join("scene.toml")).expect("load");
    let written = manifest::build_all(&config, dir.path(), None).expect("build");
    assert_eq!(written.len(), 1);
    assert!(written[0].ends_with("out/blcannon.pie"));

    let text = fs::read_to_string(&written[0]).expect("read output");
    let expected = "PIE 3\n\
        TYPE 1\n\
        INTERPOLATE 1\n\
        TEXTURE 0 page-17-sub-droids.png 0 0\n\
        EVENT 1 fire.pie\n\
        LEVELS 1\n\
        LEVEL 1\n\
        POINTS 3\n\
        \t0 0 0\n\
        \t100 0 0\n\
        \t0 0 100\n\
        POLYGONS 1\n\
        \t200 3 0 2 1 0.0 1.0 0.0 0.0 1.0 1.0\n\
        CONNECTORS 1\n\
        \t1 2 3";
    assert_eq!(text, expected);
}

#[test]
fn animated_level_gets_a_full_animobject_block() {
    let dir = tempdir().expect("tempdir");
    write_scene(dir.path(), ANIMATED_MANIFEST);

    let config = manifest::load_manifest(&dir.path().join("scene.toml")).expect("load");
    let written = manifest::build_all(&config, dir.path(), None).expect("build");
    let text = fs::read_to_string(&written[0]).expect("read output");
    let lines: Vec<&str> = text.lines().collect();

    let header = lines
        .iter()
        .position(|line| *line == "ANIMOBJECT 100 1 25")
        .expect("ANIMOBJECT header");
    let samples = &lines[header + 1..];
    assert_eq!(samples.len(), 25);
    assert!(samples[0].trim_start().starts_with('0'));
    assert!(samples[24].contains("50000"));
}

#[test]
fn output_override_redirects_the_build() {
    let dir = tempdir().expect("tempdir");
    write_scene(dir.path(), CANNON_MANIFEST);
    let elsewhere = dir.path().join("elsewhere");

    let config = manifest::load_manifest(&dir.path().join("scene.toml")).expect("load");
    let written = manifest::build_all(&config, dir.path(), Some(&elsewhere)).expect("build");
    assert_eq!(written[0], elsewhere.join("blcannon.pie"));
    assert!(written[0].exists());
}

#[test]
fn export_object_rejects_non_roots() {
    let dir = tempdir().expect("tempdir");
    write_scene(dir.path(), CANNON_MANIFEST);

    let config = manifest::load_manifest(&dir.path().join("scene.toml")).expect("load");
    assert!(manifest::export_object(&config, dir.path(), "body", None).is_err());
    assert!(manifest::export_object(&config, dir.path(), "blcannon", None).is_ok());
}

#[test]
fn missing_mesh_file_fails_with_context() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("scene.toml"), CANNON_MANIFEST).expect("write manifest");

    let config = manifest::load_manifest(&dir.path().join("scene.toml")).expect("load");
    let err = manifest::build_all(&config, dir.path(), None).unwrap_err();
    assert!(err.chain().any(|e| e.to_string().contains("body")));
}

// Helper to run the pie-export binary
fn pie_export_build(manifest_path: &Path, output: &Path) {
    let status = std::process::Command::new(env!("CARGO_BIN_EXE_pie-export"))
        .args([
            "build",
            manifest_path.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .status()
        .expect("Failed to run pie-export");
    assert!(status.success(), "pie-export build command failed");
}

#[test]
fn cli_build_smoke() {
    let dir = tempdir().expect("tempdir");
    write_scene(dir.path(), CANNON_MANIFEST);
    let out = dir.path().join("cli-out");

    pie_export_build(&dir.path().join("scene.toml"), &out);

    let text = fs::read_to_string(out.join("blcannon.pie")).expect("read output");
    assert!(text.starts_with("PIE 3"));
}

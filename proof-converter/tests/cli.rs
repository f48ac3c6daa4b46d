// Integration tests for the groth16-convert binary

use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn fixture(name: &str) -> PathBuf {
    Path::new(FIXTURES).join(name)
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("{name}-{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn cli() -> Command {
    Command::cargo_bin("groth16-convert").unwrap()
}

#[test]
fn integration_test_convert_writes_artifacts() {
    let out_dir = scratch_dir("cli-convert").join("converted_circuit");

    let result = cli()
        .arg("convert")
        .arg("--proof")
        .arg(fixture("proof.json"))
        .arg("--public")
        .arg(fixture("public.json"))
        .arg("--vk")
        .arg(fixture("verification_key.json"))
        .arg("--out-dir")
        .arg(&out_dir)
        .ok();
    assert!(result.is_ok());

    let stdout = String::from_utf8(result.unwrap().stdout).unwrap();
    assert!(stdout.contains("ic0-ic5 from 6 points"), "{stdout}");

    let proof: Value =
        serde_json::from_str(&fs::read_to_string(out_dir.join("proof.json")).unwrap()).unwrap();
    let vk: Value =
        serde_json::from_str(&fs::read_to_string(out_dir.join("vk.json")).unwrap()).unwrap();

    assert_eq!(
        proof["negA"]["y"],
        "9246055344554692392952556343732099087438922650801384056647489138037459835432"
    );
    assert_eq!(proof["pi5"], "42");
    assert!(vk.get("ic5").is_some());
    assert!(vk.get("w27").is_some());
}

#[test]
fn integration_test_convert_explicit_paths() {
    let dir = scratch_dir("cli-explicit");
    let proof_out = dir.join("out").join("o1js_proof.json");
    let vk_out = dir.join("o1js_vk.json");

    cli()
        .arg("convert")
        .arg("--proof")
        .arg(fixture("proof.json"))
        .arg("--public")
        .arg(fixture("public.json"))
        .arg("--vk")
        .arg(fixture("verification_key.json"))
        .arg("--proof-out")
        .arg(&proof_out)
        .arg("--vk-out")
        .arg(&vk_out)
        .assert()
        .success();

    assert!(proof_out.exists());
    assert!(vk_out.exists());
}

#[test]
fn integration_test_mismatch_writes_nothing() {
    let dir = scratch_dir("cli-mismatch");
    let public = dir.join("public.json");
    fs::write(&public, r#"["1", "2", "3"]"#).unwrap();
    let out_dir = dir.join("converted_circuit");

    let assert = cli()
        .arg("convert")
        .arg("--proof")
        .arg(fixture("proof.json"))
        .arg("--public")
        .arg(&public)
        .arg("--vk")
        .arg(fixture("verification_key.json"))
        .arg("--out-dir")
        .arg(&out_dir)
        .assert()
        .failure();

    let stderr = String::from_utf8(assert.get_output().stderr.clone()).unwrap();
    assert!(stderr.contains("nPublic (5)"), "{stderr}");
    assert!(stderr.contains("public inputs (3)"), "{stderr}");
    assert!(!out_dir.exists());
}

#[test]
fn integration_test_missing_input_file() {
    let dir = scratch_dir("cli-missing");

    let assert = cli()
        .arg("validate")
        .arg("--proof")
        .arg(dir.join("proof.json"))
        .arg("--public")
        .arg(fixture("public.json"))
        .arg("--vk")
        .arg(fixture("verification_key.json"))
        .assert()
        .failure();

    let stderr = String::from_utf8(assert.get_output().stderr.clone()).unwrap();
    assert!(stderr.contains("Missing input file"), "{stderr}");
}

#[test]
fn integration_test_validate() {
    let result = cli()
        .arg("validate")
        .arg("--proof")
        .arg(fixture("proof.json"))
        .arg("--public")
        .arg(fixture("public.json"))
        .arg("--vk")
        .arg(fixture("verification_key.json"))
        .ok();
    assert!(result.is_ok());

    let output = String::from_utf8(result.unwrap().stdout).unwrap();
    assert_eq!(output, "Valid: 5 public inputs, 6 IC points\n");
}

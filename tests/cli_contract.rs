use std::fs;
use std::path::Path;
use std::process::Command;

use serde_json::Value;
use tempfile::tempdir;

fn run_neoncap(cwd: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_neoncap"))
        .current_dir(cwd)
        .args(args)
        .output()
        .expect("neoncap command should run")
}

#[test]
fn explain_json_output_is_stable() {
    let dir = tempdir().expect("tempdir should create");
    let args = [
        "explain",
        "GOAL!",
        "--color",
        "red",
        "--style",
        "clean-split",
        "--json",
    ];

    let first = run_neoncap(dir.path(), &args);
    assert!(first.status.success(), "explain --json should succeed");
    let second = run_neoncap(dir.path(), &args);
    assert!(second.status.success(), "explain --json should succeed");
    assert_eq!(first.stdout, second.stdout, "json output should be stable");

    let parsed: Value = serde_json::from_slice(&first.stdout).expect("json should parse");
    assert_eq!(parsed["style"], "clean-split");
    assert_eq!(parsed["font_size"], 80);
    assert_eq!(parsed["audio_label"], "0:a");
    let descriptor = parsed["descriptor"].as_str().expect("descriptor string");
    assert!(descriptor.contains("gblur=sigma=15"));
    assert!(!descriptor.ends_with(';'));
    let statements = parsed["statements"].as_array().expect("statements array");
    assert_eq!(statements.len(), descriptor.split(';').count());
}

#[test]
fn explain_positions_flow_into_the_descriptor() {
    let dir = tempdir().expect("tempdir should create");
    let output = run_neoncap(
        dir.path(),
        &["explain", "NEWS", "--x", "0.3", "--y", "0.4", "--json"],
    );
    assert!(output.status.success());
    let parsed: Value = serde_json::from_slice(&output.stdout).expect("json should parse");
    let descriptor = parsed["descriptor"].as_str().expect("descriptor string");
    assert!(descriptor.contains("x=w*0.3-text_w/2"));
    assert!(descriptor.contains("y=h*0.4-text_h/2"));
}

#[test]
fn empty_text_fails_with_exit_code_one() {
    let dir = tempdir().expect("tempdir should create");
    let output = run_neoncap(dir.path(), &["explain", ""]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("caption text"), "stderr: {stderr}");
}

#[test]
fn out_of_range_position_fails_with_exit_code_one() {
    let dir = tempdir().expect("tempdir should create");
    let output = run_neoncap(dir.path(), &["explain", "GOAL!", "--x", "1.5"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn unknown_style_fails_with_exit_code_one() {
    let dir = tempdir().expect("tempdir should create");
    let output = run_neoncap(dir.path(), &["explain", "GOAL!", "--style", "plasma"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown glow style"), "stderr: {stderr}");
}

#[test]
fn unknown_color_warns_unless_strict() {
    let dir = tempdir().expect("tempdir should create");

    let permissive = run_neoncap(dir.path(), &["explain", "GOAL!", "--color", "chartreuse"]);
    assert!(permissive.status.success());
    let stderr = String::from_utf8_lossy(&permissive.stderr);
    assert!(stderr.contains("chartreuse"), "stderr: {stderr}");

    let strict = run_neoncap(
        dir.path(),
        &["explain", "GOAL!", "--color", "chartreuse", "--strict"],
    );
    assert_eq!(strict.status.code(), Some(1));
}

#[test]
fn render_rejects_missing_input() {
    let dir = tempdir().expect("tempdir should create");
    let output = run_neoncap(
        dir.path(),
        &["render", "missing.mp4", "out.mp4", "GOAL!", "--dry-run"],
    );
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does not exist"), "stderr: {stderr}");
}

#[test]
fn render_dry_run_prints_the_engine_command() {
    let dir = tempdir().expect("tempdir should create");
    fs::write(dir.path().join("clip.mp4"), b"not a real video").expect("input should write");

    let output = run_neoncap(
        dir.path(),
        &[
            "render",
            "clip.mp4",
            "styled.mp4",
            "GOAL!",
            "--color",
            "red",
            "--dry-run",
        ],
    );
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("-filter_complex"), "stdout: {stdout}");
    assert!(stdout.contains("-map"));
    assert!(stdout.contains("libx264"));
    assert!(stdout.contains("styled.mp4"));
}

#[test]
fn job_dry_run_uses_the_job_fields() {
    let dir = tempdir().expect("tempdir should create");
    fs::write(dir.path().join("clip.mp4"), b"not a real video").expect("input should write");
    fs::write(
        dir.path().join("job.json"),
        r#"{
            "input": "clip.mp4",
            "output": "styled.mp4",
            "text": "BREAKING",
            "color": "blue",
            "style": "enhanced",
            "blur_background": false
        }"#,
    )
    .expect("job should write");

    let output = run_neoncap(dir.path(), &["job", "job.json", "--dry-run"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("BREAKING"));
    assert!(stdout.contains("styled.mp4"));
}

#[test]
fn job_with_unknown_field_fails() {
    let dir = tempdir().expect("tempdir should create");
    fs::write(
        dir.path().join("job.json"),
        r#"{ "input": "clip.mp4", "text": "X", "colour": "red" }"#,
    )
    .expect("job should write");

    let output = run_neoncap(dir.path(), &["job", "job.json"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn colors_lists_palette_entries() {
    let dir = tempdir().expect("tempdir should create");
    let output = run_neoncap(dir.path(), &["colors", "--palette", "studio"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("studio"));
    assert!(stdout.contains("#FFAAAA"), "stdout: {stdout}");
}

mod common;

use anyhow::Result;
use common::TestEnvironment;
use serial_test::serial;

const EDIT: &str = r#"
[transition]
type = "fade"
duration = 0.5

[[clips]]
source = "intro.mp4"
duration = 3.0

[[clips]]
source = "main.mp4"
start_time = 2.0
end_time = 6.0

[output]
path = "out/final.mp4"
platform = "tiktok"
"#;

const SRT: &str = "1\n00:00:00,000 --> 00:00:01,500\nHello there\n\n2\n00:00:01,500 --> 00:00:03,000\nGeneral Kenobi\n";

#[test]
#[serial]
fn first_run_writes_default_config() -> Result<()> {
    let env = TestEnvironment::new()?;
    assert!(!env.config_path().exists());

    let output = env.run(&["presets"])?;
    assert_eq!(output.exit_code, 0, "presets failed: {}", output.stderr);
    assert!(env.config_path().exists());

    let written = std::fs::read_to_string(env.config_path())?;
    assert!(written.contains("music_volume"));
    Ok(())
}

#[test]
#[serial]
fn render_dry_run_prints_the_command() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write("edit.toml", EDIT)?;

    let output = env.run(&["render", "edit.toml", "--dry-run"])?;
    assert_eq!(output.exit_code, 0, "render failed: {}", output.stderr);
    assert!(output.stdout.contains("-filter_complex"));
    assert!(output.stdout.contains("xfade=transition=fade"));
    assert!(output.stdout.contains("[outv]"));
    assert!(output.stdout.contains("final.mp4"));
    assert!(!env.path().join("out").exists(), "dry run must not create output");
    Ok(())
}

#[test]
#[serial]
fn render_out_flag_overrides_document_path() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write("edit.toml", EDIT)?;

    let output = env.run(&["render", "edit.toml", "--dry-run", "-o", "elsewhere.mp4"])?;
    assert_eq!(output.exit_code, 0, "render failed: {}", output.stderr);
    assert!(output.stdout.contains("elsewhere.mp4"));
    assert!(!output.stdout.contains("final.mp4"));
    Ok(())
}

#[test]
#[serial]
fn check_reports_valid_edit() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write("edit.toml", EDIT)?;

    let output = env.run(&["--output", "json", "check", "edit.toml"])?;
    assert_eq!(output.exit_code, 0, "check failed: {}", output.stderr);

    // the pretty report follows the one-line status event
    let start = output.stdout.find("\n{\n").map(|i| i + 1).unwrap_or(0);
    let report: serde_json::Value = serde_json::from_str(&output.stdout[start..])?;
    assert_eq!(report["clip_count"], 2);
    // 3 + 4 - 0.5 fade
    let duration = report["estimated_duration"].as_f64().unwrap();
    assert!((duration - 6.5).abs() < 1e-6, "got {duration}");
    Ok(())
}

#[test]
#[serial]
fn check_rejects_invalid_clips() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write(
        "broken.toml",
        "[[clips]]\nsource = \"a.mp4\"\nstart_time = 5.0\nend_time = 2.0\n\n[output]\npath = \"o.mp4\"\n",
    )?;

    let output = env.run(&["check", "broken.toml"])?;
    assert_ne!(output.exit_code, 0);
    assert!(output.stderr.contains("Invalid clips"), "stderr: {}", output.stderr);
    Ok(())
}

#[test]
#[serial]
fn subtitles_convert_srt_to_vtt() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.write("captions.srt", SRT)?;

    let output = env.run(&["subtitles", "convert", "captions.srt", "captions.vtt"])?;
    assert_eq!(output.exit_code, 0, "convert failed: {}", output.stderr);

    let vtt = std::fs::read_to_string(env.path().join("captions.vtt"))?;
    assert!(vtt.starts_with("WEBVTT"));
    assert!(vtt.contains("00:00:01.500"));
    assert!(vtt.contains("General Kenobi"));
    Ok(())
}

#[test]
#[serial]
fn transitions_list_as_json() -> Result<()> {
    let env = TestEnvironment::new()?;

    let output = env.run(&["--output", "json", "transitions", "--category", "zoom"])?;
    assert_eq!(output.exit_code, 0, "transitions failed: {}", output.stderr);

    let rows: serde_json::Value = serde_json::from_str(&output.stdout)?;
    let rows = rows.as_array().expect("array of transitions");
    assert!(!rows.is_empty());
    assert!(rows.iter().all(|row| row["category"] == "zoom"));
    Ok(())
}

#[test]
#[serial]
fn unknown_transition_category_fails() -> Result<()> {
    let env = TestEnvironment::new()?;

    let output = env.run(&["transitions", "--category", "sparkly"])?;
    assert_ne!(output.exit_code, 0);
    assert!(output.stderr.contains("Unknown transition category"));
    Ok(())
}

#[test]
#[serial]
fn concat_dry_run_uses_short_form_settings() -> Result<()> {
    let env = TestEnvironment::new()?;

    let output = env.run(&[
        "concat", "a.mp4", "b.mp4", "-o", "joined.mp4", "--durations", "2,3", "--dry-run",
    ])?;
    assert_eq!(output.exit_code, 0, "concat failed: {}", output.stderr);
    assert!(output.stdout.contains("xfade=transition=fade:duration=0.2"));
    assert!(output.stdout.contains("1080:1920"));
    assert!(output.stdout.contains("joined.mp4"));
    Ok(())
}

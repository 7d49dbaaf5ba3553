use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "lottogen-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_scenarios_writes_output() {
    let exe = env!("CARGO_BIN_EXE_lottogen-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-scenarios", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available scenarios"));
    assert!(content.contains("privacy-timeout"));
    assert!(content.contains("option-sum-range"));
}

#[test]
fn cli_runs_all_scenarios_offline_with_markdown_report() {
    let exe = env!("CARGO_BIN_EXE_lottogen-tester");
    let output_path = temp_path("markdown");
    let output = Command::new(exe)
        .args([
            "--mode",
            "offline",
            "--scenarios",
            "all",
            "--seed",
            "42",
            "--report",
            "markdown",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stdout: {stdout}");
    assert!(stdout.contains("Lottogen Scenario Tester"));
    let report = std::fs::read_to_string(output_path).expect("read report");
    assert!(report.contains("# Lottogen Scenario Results"));
    assert!(report.contains("| stale-response | offline | 42 | ✅ |"));
    assert!(!report.contains("## Failures"));
}

#[test]
fn cli_json_report_for_selected_scenarios() {
    let exe = env!("CARGO_BIN_EXE_lottogen-tester");
    let output_path = temp_path("json");
    let status = Command::new(exe)
        .args([
            "--scenarios",
            "smoke, ad-gate",
            "--report",
            "json",
            "--output",
        ])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    let parsed: serde_json::Value = serde_json::from_str(&content).expect("valid json");
    let names: Vec<&str> = parsed
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|r| r["scenario_name"].as_str())
        .collect();
    assert_eq!(names, vec!["smoke", "ad-gate"]);
}

#[test]
fn cli_live_mode_against_closed_port_fails() {
    let exe = env!("CARGO_BIN_EXE_lottogen-tester");
    let output = Command::new(exe)
        .args([
            "--mode",
            "live",
            "--base-url",
            "http://127.0.0.1:9",
            "--timeout-ms",
            "500",
            "--scenarios",
            "smoke",
            "--report",
            "json",
        ])
        .output()
        .expect("run cli");
    assert_eq!(output.status.code(), Some(1));
}

//! Runs the `tou-billing` binary against generated CSV files.

mod common;

use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tou-billing"))
        .args(args)
        .output()
        .expect("tou-billing process should run")
}

fn stdout_of(output: &Output) -> String {
    assert!(
        output.status.success(),
        "run failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).expect("stdout should be valid UTF-8")
}

fn two_month_input(name: &str) -> String {
    let csv = common::hourly_csv(common::ts(2024, 1, 1, 0, 0), 24 * 60, "1", "5");
    common::scratch_file(name, &csv)
        .to_string_lossy()
        .into_owned()
}

#[test]
fn prints_summary_for_every_cycle() {
    let input = two_month_input("summary.csv");
    let stdout = stdout_of(&run(&["--input", &input]));

    assert!(stdout.contains("Bill for: 01-01-2024 to 01-31-2024 (31 billing day(s))"));
    assert!(stdout.contains("Bill for: 02-01-2024 to 02-29-2024 (29 billing day(s))"));
    // 59.63519 * 31 = 1848.69
    assert!(stdout.contains("Customer Charge: $1,848.69"));
}

#[test]
fn detail_flag_prints_breakdown() {
    let input = two_month_input("detail.csv");
    let stdout = stdout_of(&run(&["--input", &input, "--detail", "02-2024"]));
    assert!(stdout.contains("Detailed Bill Information"));
    assert!(stdout.contains("Billing Days: 29 days (Summer Days: 0, Winter Days: 29)"));
}

#[test]
fn unknown_detail_key_fails() {
    let input = two_month_input("missing-detail.csv");
    let output = run(&["--input", &input, "--detail", "07-2024"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no billing cycle found for 07-2024"));
}

#[test]
fn bills_out_writes_csv() {
    let input = two_month_input("export.csv");
    let out_path = common::scratch_file("export-bills.csv", "");
    let out = out_path.to_string_lossy().into_owned();

    stdout_of(&run(&["--input", &input, "--bills-out", &out]));

    let written = std::fs::read_to_string(&out_path).expect("export exists");
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("cycle,start_date,end_date"));
    assert!(lines[1].starts_with("01-2024,2024-01-01,2024-01-31,31,0,31,1848.69,"));
}

#[test]
fn config_file_overrides_layout_and_rates() {
    let csv = "ts,kwh,kw\n2024-07-01 12:00,1,1\n2024-07-01 13:00,1,1\n";
    let input = common::scratch_file("custom-layout.csv", csv);
    let config = common::scratch_file(
        "custom.toml",
        r#"
[tariff]
customer_per_day = "10"

[input]
timestamp_column = "ts"
usage_column = "kwh"
demand_column = "kw"
timestamp_format = "%Y-%m-%d %H:%M"
"#,
    );

    let stdout = stdout_of(&run(&[
        "--input",
        &input.to_string_lossy(),
        "--config",
        &config.to_string_lossy(),
    ]));
    assert!(stdout.contains("Bill for: 07-01-2024 to 07-01-2024 (1 billing day(s))"));
    assert!(stdout.contains("Customer Charge: $10.00"));
}

#[test]
fn invalid_config_exits_with_error() {
    let input = two_month_input("bad-config.csv");
    let config = common::scratch_file(
        "negative.toml",
        "[tariff.energy.summer]\npeak = \"-1\"\n",
    );
    let output = run(&["--input", &input, "--config", &config.to_string_lossy()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("tariff.energy.summer.peak"));
}

#[test]
fn malformed_csv_reports_line() {
    let input = common::scratch_file(
        "bad-row.csv",
        "Start Date Time,Usage,Peak Demand\n01-01-2024 00:00,1,1\n01-01-2024 01:00,x,1\n",
    );
    let output = run(&["--input", &input.to_string_lossy()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("line 2"));
}

#[test]
fn preset_and_config_are_exclusive() {
    let output = run(&["--input", "x.csv", "--preset", "b19", "--config", "x.toml"]);
    assert!(!output.status.success());
}

#[test]
fn oversized_demand_reports_line() {
    let input = common::scratch_file(
        "huge-demand.csv",
        "Start Date Time,Usage,Peak Demand\n07-02-2024 17:00,1,10\n07-02-2024 18:00,1,1000000000000000000000000000\n",
    );
    let output = run(&["--input", &input.to_string_lossy()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("line 2: demand value"));
    assert!(stderr.contains("out of range"));
}

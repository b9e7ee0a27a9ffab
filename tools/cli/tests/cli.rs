//! cputest 端到端测试

use std::process::{Command, Output};

fn cputest(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cputest"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to spawn cputest")
}

/// 结果行最后一个 `=` 之后的指标值
fn metric_value(line: &str) -> f64 {
    let (_, value) = line.rsplit_once('=').expect("result line has a metric");
    value.parse().expect("metric is a number")
}

fn assert_valid_metric(line: &str) {
    let value = metric_value(line);
    assert!(value.is_finite() && value >= 0.0, "{line}");
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_owned)
        .collect()
}

#[test]
fn help_lists_every_benchmark() {
    let output = cputest(&["--help"]);
    assert!(output.status.success());
    let lines = stdout_lines(&output);
    assert_eq!(lines.len(), 30);
    assert!(lines[0].trim_start().starts_with("--alu_latency\t"));
    assert!(lines.iter().all(|line| !line.contains("resulthash")));
}

#[test]
fn empty_arguments_print_help() {
    let output = cputest(&[]);
    assert!(output.status.success());
    assert_eq!(stdout_lines(&output).len(), 30);
}

#[test]
fn btb_capacity_prints_one_line() {
    let output = cputest(&["--btbcapacity", "4"]);
    assert!(output.status.success());
    let lines = stdout_lines(&output);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("btb_capacity(logsize=4)"));
    assert!(lines[0].contains("\tresulthash="));
    assert!(lines[0].contains("Billion_Branches_per_sec="));
    if cfg!(any(target_arch = "x86_64", target_arch = "aarch64")) {
        assert_valid_metric(&lines[0]);
    }
}

#[test]
fn unknown_benchmark_fails_without_output() {
    let output = cputest(&["--nonexistent_test"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--nonexistent_test"));
}

#[test]
fn rep_movs_reports_or_declines() {
    let output = cputest(&["--max_rep_movs", "8", "64", "0", "0", "0"]);
    assert!(output.status.success());
    let lines = stdout_lines(&output);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("max_rep_movs(dsize: 8, cpsize: 64,\tsrcalign: 0, dstalign: 0, df: 0)"));
    if cfg!(target_arch = "x86_64") {
        assert!(lines[0].contains("GBPS="));
        assert!(!lines[0].contains("NOT APPLICABLE"));
        assert_valid_metric(&lines[0]);
    } else {
        assert!(lines[0].contains("NOT APPLICABLE on Current Platform"));
        assert!(lines[0].ends_with("GBPS=nan"));
    }
}

#[test]
fn chained_benchmarks_run_in_order() {
    let output = cputest(&["--alu_latency", "--shl_imm_latency", "1"]);
    assert!(output.status.success());
    let lines = stdout_lines(&output);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("alu_latency"));
    assert!(lines[1].starts_with("shl_imm_latency(nonzero)"));
    if cfg!(any(target_arch = "x86_64", target_arch = "aarch64")) {
        lines.iter().for_each(|line| assert_valid_metric(line));
    }
}

#[test]
fn out_of_domain_parameter_is_fatal() {
    let output = cputest(&["--btbcapacity", "17"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn malformed_argument_is_fatal() {
    let output = cputest(&["--btbcapacity", "four"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("four"));
}

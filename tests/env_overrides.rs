// Test intent: PLANFFT_* variables are honored at first use, runtime
// overrides win over them, and bad values fall back to the defaults.
// Each case re-runs this test binary so the variables are read fresh.
use std::process::Command;

use planfft::config::{DEFAULT_DIT_MAX, DEFAULT_SIX_STEP_MAX, DEFAULT_STOCKHAM_MAX};
use planfft::{auto_thresholds, features, set_auto_thresholds, AutoThresholds};

#[test]
fn print_config() {
    let t = auto_thresholds();
    println!(
        "bands: {} {} {} {}",
        t.dit_max,
        t.stockham_max,
        t.six_step_max,
        features::is_forced_generic()
    );
}

fn child(vars: &[(&str, &str)]) -> (usize, usize, usize, bool) {
    let exe = std::env::current_exe().unwrap();
    let mut cmd = Command::new(&exe);
    for name in [
        "PLANFFT_DIT_MAX",
        "PLANFFT_STOCKHAM_MAX",
        "PLANFFT_SIX_STEP_MAX",
        "PLANFFT_FORCE_GENERIC",
    ] {
        cmd.env_remove(name);
    }
    let output = cmd
        .envs(vars.iter().copied())
        .args(["--exact", "print_config", "--nocapture", "--test-threads=1"])
        .output()
        .expect("run config test");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    // libtest prints the test name on the same line as our output
    let line = stdout
        .lines()
        .rev()
        .find_map(|l| l.rsplit_once("bands: ").map(|(_, rest)| rest.trim()))
        .expect("bands line");
    let f: Vec<&str> = line.split_whitespace().collect();
    (
        f[0].parse().unwrap(),
        f[1].parse().unwrap(),
        f[2].parse().unwrap(),
        f[3] == "true",
    )
}

#[test]
fn defaults_without_environment() {
    assert_eq!(
        child(&[]),
        (DEFAULT_DIT_MAX, DEFAULT_STOCKHAM_MAX, DEFAULT_SIX_STEP_MAX, false)
    );
}

#[test]
fn environment_moves_bands_and_hides_simd() {
    let got = child(&[
        ("PLANFFT_DIT_MAX", "64"),
        ("PLANFFT_SIX_STEP_MAX", "4096"),
        ("PLANFFT_FORCE_GENERIC", "1"),
    ]);
    assert_eq!(got, (64, DEFAULT_STOCKHAM_MAX, 4096, true));
}

#[test]
fn unparsable_values_are_ignored() {
    let got = child(&[
        ("PLANFFT_DIT_MAX", "lots"),
        ("PLANFFT_STOCKHAM_MAX", "0"),
        ("PLANFFT_FORCE_GENERIC", "maybe"),
    ]);
    assert_eq!(
        got,
        (DEFAULT_DIT_MAX, DEFAULT_STOCKHAM_MAX, DEFAULT_SIX_STEP_MAX, false)
    );
}

#[test]
fn runtime_override_wins_over_environment() {
    // Runs in-process; the override is restored before returning.
    let before = auto_thresholds();
    set_auto_thresholds(AutoThresholds {
        dit_max: 32,
        stockham_max: 0,
        six_step_max: 0,
    });
    let t = auto_thresholds();
    planfft::reset_auto_thresholds();
    assert_eq!(t.dit_max, 32);
    assert_eq!(t.stockham_max, before.stockham_max);
    assert_eq!(auto_thresholds(), before);
}

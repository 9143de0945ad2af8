// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::io::Write;

use approx::assert_abs_diff_eq;
use indoc::writedoc;
use tempfile::TempDir;

use delaycal::{terms::InitState, TermKind, TermSolutions};

use crate::{delaycal, get_cmd_output};

fn read_json_solutions(path: &std::path::Path) -> TermSolutions {
    let contents = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&contents).unwrap()
}

#[test]
fn test_simulate_writes_estimated_delays() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let sols = tmp_dir.path().join("sols.json");

    #[rustfmt::skip]
    let cmd = delaycal()
        .args([
            "simulate",
            "--delays", "0", "50", "120",
            "--num-channels", "32",
            "--num-timesteps", "2",
            "--output", &format!("{}", sols.display()),
        ])
        .ok();
    assert!(cmd.is_ok(), "simulate failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("delay_XX [ns]"), "{stdout}");

    let solutions = read_json_solutions(&sols);
    assert_eq!(solutions.kind, TermKind::Delay);
    assert_eq!(solutions.state, InitState::Estimated);
    assert_eq!(solutions.params.dim(), (2, 1, 3, 1, 4));
    assert_eq!(
        solutions.param_labels,
        ["phase_offset_XX", "delay_XX", "phase_offset_YY", "delay_YY"]
    );
    let eps = 0.5 / (32768.0 * 1e6) + 1e-15;
    assert_abs_diff_eq!(solutions.params[(1, 0, 1, 0, 1)], 50e-9, epsilon = eps);
    assert_abs_diff_eq!(solutions.params[(0, 0, 2, 0, 3)], 120e-9, epsilon = eps);
}

#[test]
fn test_simulate_toml_output() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let sols = tmp_dir.path().join("sols.toml");

    #[rustfmt::skip]
    let cmd = delaycal()
        .args([
            "simulate",
            "--delays", "0", "10",
            "--num-channels", "8",
            "--output", &format!("{}", sols.display()),
        ])
        .ok();
    assert!(cmd.is_ok(), "simulate failed: {}", cmd.err().unwrap());
    let contents = std::fs::read_to_string(&sols).unwrap();
    assert!(contents.contains("delay_XX"));
}

#[test]
fn test_simulate_with_arg_file() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let sols = tmp_dir.path().join("sols.json");
    let args_file = tmp_dir.path().join("args.toml");
    let mut f = std::fs::File::create(&args_file).unwrap();
    writedoc!(
        f,
        r#"
            [simulate]
            delays = [0.0, 30.0]
            num-channels = 16
            output = "{}"

            [term]
            freq-interval = "4"
        "#,
        sols.display()
    )
    .unwrap();
    drop(f);

    let cmd = delaycal()
        .args(["simulate", &format!("{}", args_file.display())])
        .ok();
    assert!(cmd.is_ok(), "simulate failed: {}", cmd.err().unwrap());

    let solutions = read_json_solutions(&sols);
    // 16 channels in groups of 4.
    assert_eq!(solutions.params.dim(), (1, 4, 2, 1, 4));
    assert_eq!(solutions.param_freqs.len(), 4);
    assert_eq!(solutions.gain_freqs.len(), 16);
}

#[test]
fn test_simulate_complex_term() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let sols = tmp_dir.path().join("sols.json");

    #[rustfmt::skip]
    let cmd = delaycal()
        .args([
            "simulate",
            "--delays", "0", "50",
            "--kind", "complex",
            "--output", &format!("{}", sols.display()),
        ])
        .ok();
    assert!(cmd.is_ok(), "simulate failed: {}", cmd.err().unwrap());

    let solutions = read_json_solutions(&sols);
    assert_eq!(solutions.kind, TermKind::Complex);
    assert_eq!(solutions.state, InitState::NotLoaded);
    assert_eq!(solutions.params.len(), 0);
}

#[test]
fn test_simulate_dry_run_writes_nothing() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let sols = tmp_dir.path().join("sols.json");
    let saved = tmp_dir.path().join("saved.toml");

    #[rustfmt::skip]
    let cmd = delaycal()
        .args([
            "simulate",
            "--delays", "0", "50",
            "--output", &format!("{}", sols.display()),
            "--dry-run",
            "--save-toml", &format!("{}", saved.display()),
        ])
        .ok();
    assert!(cmd.is_ok(), "simulate failed: {}", cmd.err().unwrap());
    assert!(!sols.exists());

    let saved = std::fs::read_to_string(&saved).unwrap();
    assert!(saved.contains("[simulate]"), "{saved}");
    assert!(saved.contains("delays"), "{saved}");
}

#[test]
fn test_simulate_bad_reference_antenna() {
    #[rustfmt::skip]
    let cmd = delaycal()
        .args([
            "simulate",
            "--delays", "0", "50",
            "--ref-ant", "5",
            "--dry-run",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("Reference antenna 5"), "{stderr}");
}

#[test]
fn test_simulate_needs_delays() {
    let cmd = delaycal().args(["simulate", "--dry-run"]).ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("No antenna delays"), "{stderr}");
}

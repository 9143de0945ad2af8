// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::io::Write;

use approx::assert_abs_diff_eq;
use indoc::indoc;
use tempfile::Builder;

use super::*;
use crate::terms::{InitState, TermKind};

fn get_args(delays: &[f64]) -> SimulateArgs {
    SimulateArgs {
        simulate_args: SimulateCliArgs {
            delays: Some(delays.to_vec()),
            ..Default::default()
        },
        ..Default::default()
    }
}

#[test]
fn test_parse_defaults() {
    let params = get_args(&[0.0, 50.0]).parse().unwrap();
    assert_eq!(params.sim.delays.len(), 2);
    assert_abs_diff_eq!(params.sim.delays[1], 50e-9);
    assert_eq!(params.sim.num_chans, DEFAULT_NUM_CHANNELS);
    assert_abs_diff_eq!(params.sim.freq_res, 1e6);
    assert_abs_diff_eq!(params.sim.first_freq, 150e6);
    assert_eq!(params.sim.num_timesteps, 1);
    assert!(!params.sim.include_autos);
    assert_eq!(params.corr_map.num_corrs(), 4);
    assert_eq!(params.ref_ant, 0);
    assert_eq!(params.output, PathBuf::from(DEFAULT_OUTPUT_FILENAME));
    assert_eq!(params.output_type, ArgFileTypes::Json);
    assert_eq!(params.term_params, TermParams::default());
}

#[test]
fn test_parse_errors() {
    let result = SimulateArgs::default().parse();
    assert!(matches!(result, Err(DelayCalError::Simulate(_))));

    let mut args = get_args(&[0.0, 50.0]);
    args.simulate_args.ref_ant = Some(2);
    assert!(matches!(args.parse(), Err(DelayCalError::Simulate(_))));

    let mut args = get_args(&[0.0, 50.0]);
    args.simulate_args.output = Some(PathBuf::from("sols.fits"));
    assert!(matches!(args.parse(), Err(DelayCalError::Simulate(_))));

    let mut args = get_args(&[0.0, 50.0]);
    args.simulate_args.correlations = Some(vec!["XX".to_string(), "QQ".to_string()]);
    assert!(matches!(args.parse(), Err(DelayCalError::Correlation(_))));

    let mut args = get_args(&[0.0, 50.0]);
    args.term_args.freq_interval = Some("-2".to_string());
    assert!(matches!(args.parse(), Err(DelayCalError::Interval(_))));
}

#[test]
fn test_merge_prefers_cli() {
    let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(
        indoc! {r#"
            [simulate]
            delays = [0.0, 10.0, 20.0]
            num-channels = 32
            ref-ant = 1
            autos = true

            [term]
            freq-interval = "8"
            pad-factor = 16
        "#}
        .as_bytes(),
    )
    .unwrap();

    let cli = SimulateArgs {
        args_file: Some(file.path().to_path_buf()),
        simulate_args: SimulateCliArgs {
            num_channels: Some(16),
            ..Default::default()
        },
        ..Default::default()
    };
    let merged = cli.merge().unwrap();
    assert_eq!(merged.args_file, None);
    assert_eq!(merged.simulate_args.delays, Some(vec![0.0, 10.0, 20.0]));
    assert_eq!(merged.simulate_args.num_channels, Some(16));
    assert_eq!(merged.simulate_args.ref_ant, Some(1));
    assert!(merged.simulate_args.autos);
    assert_eq!(merged.term_args.freq_interval.as_deref(), Some("8"));

    let params = merged.parse().unwrap();
    assert_eq!(params.sim.num_chans, 16);
    assert_eq!(params.ref_ant, 1);
    assert_eq!(params.term_params.pad_factor.map(|p| p.get()), Some(16));
}

#[test]
fn test_merge_json_file() {
    let mut file = Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(
        indoc! {r#"
            {
                "simulate": { "delays": [0.0, 5.0] },
                "term": { "kind": "complex" }
            }
        "#}
        .as_bytes(),
    )
    .unwrap();

    let cli = SimulateArgs {
        args_file: Some(file.path().to_path_buf()),
        ..Default::default()
    };
    let params = cli.merge().unwrap().parse().unwrap();
    assert_eq!(params.sim.delays.len(), 2);
    assert_eq!(params.term_params.kind, TermKind::Complex);
}

#[test]
fn test_merge_bad_file() {
    let file = Builder::new().suffix(".yaml").tempfile().unwrap();
    let cli = SimulateArgs {
        args_file: Some(file.path().to_path_buf()),
        ..Default::default()
    };
    assert!(matches!(cli.merge(), Err(DelayCalError::ArgFile(_))));

    let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(b"[simulate]\nnum-channels = \"lots\"\n").unwrap();
    let cli = SimulateArgs {
        args_file: Some(file.path().to_path_buf()),
        ..Default::default()
    };
    assert!(matches!(cli.merge(), Err(DelayCalError::ArgFile(_))));
}

#[test]
fn test_run_recovers_delays() {
    let mut args = get_args(&[0.0, 50.0, 120.0, 75.0]);
    args.simulate_args.num_channels = Some(32);
    args.simulate_args.num_timesteps = Some(2);
    let params = args.parse().unwrap();
    let solutions = params.run().unwrap();

    assert_eq!(solutions.state, InitState::Estimated);
    assert_eq!(solutions.params.dim(), (2, 1, 4, 1, 4));
    // With 32 channels of 1 MHz, the transform has 32768 samples.
    let eps = 0.5 / (32768.0 * 1e6) + 1e-15;
    for (i_ant, &delay) in params.sim.delays.iter().enumerate() {
        for t in 0..2 {
            assert_abs_diff_eq!(solutions.params[(t, 0, i_ant, 0, 1)], delay, epsilon = eps);
            assert_abs_diff_eq!(solutions.params[(t, 0, i_ant, 0, 3)], delay, epsilon = eps);
        }
    }
}

#[test]
fn test_write_solutions() {
    let dir = tempfile::tempdir().unwrap();
    let mut args = get_args(&[0.0, 50.0]);
    args.simulate_args.num_channels = Some(8);
    args.simulate_args.output = Some(dir.path().join("sols.json"));
    let params = args.parse().unwrap();
    let solutions = params.run().unwrap();
    params.write(&solutions).unwrap();

    let contents = std::fs::read_to_string(&params.output).unwrap();
    let from_disk: TermSolutions = serde_json::from_str(&contents).unwrap();
    assert_eq!(from_disk.state, InitState::Estimated);
    assert_eq!(from_disk.param_labels, solutions.param_labels);
    assert_abs_diff_eq!(from_disk.params, solutions.params);
}

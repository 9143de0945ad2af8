// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use vec1::vec1;

use super::*;

fn freqs_and_widths(num_chans: usize, width: f64) -> (Vec<f64>, Vec<f64>) {
    let freqs = (0..num_chans)
        .map(|i| 150e6 + i as f64 * width)
        .collect();
    (freqs, vec![width; num_chans])
}

#[test]
fn test_parameterised_freq_map_by_bandwidth() {
    let (freqs, widths) = freqs_and_widths(5, 1e6);
    let map = FrequencyMap::parameterised(&freqs, &widths, FreqInterval::Bandwidth(2e6));
    assert_eq!(map.gain_map().to_vec(), [0, 1, 2, 3, 4]);
    // The channel that reaches the threshold belongs to the bin being closed.
    assert_eq!(map.param_map().to_vec(), [0, 0, 1, 1, 2]);
    assert_eq!(map.num_gain_bins(), 5);
    assert_eq!(map.num_param_bins(), 3);
    assert_eq!(map.view().dim(), (2, 5));
}

#[test]
fn test_freq_map_bandwidth_uneven_widths() {
    let freqs = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    let widths = [0.5, 0.5, 3.0, 0.25, 0.25, 0.25];
    let map = FrequencyMap::parameterised(&freqs, &widths, FreqInterval::Bandwidth(1.0));
    assert_eq!(map.param_map().to_vec(), [0, 0, 1, 2, 2, 2]);
}

#[test]
fn test_freq_map_bandwidth_is_monotonic() {
    let widths: Vec<f64> = (0..64).map(|i| 1.0 + (i % 7) as f64 * 0.3).collect();
    let freqs: Vec<f64> = (0..64).map(|i| i as f64).collect();
    for threshold in [0.1, 1.0, 2.5, 7.0, 1000.0] {
        let map = FrequencyMap::parameterised(&freqs, &widths, FreqInterval::Bandwidth(threshold));
        let bins = map.param_map();
        assert_eq!(bins[0], 0);
        for pair in bins.to_vec().windows(2) {
            assert!(pair[1] >= pair[0]);
            assert!(pair[1] - pair[0] <= 1);
        }
    }
}

#[test]
fn test_freq_map_by_channel_count() {
    let (freqs, widths) = freqs_and_widths(11, 40e3);
    for num in 1..=12 {
        let map = FrequencyMap::parameterised(&freqs, &widths, FreqInterval::Channels(num));
        for (i_chan, &bin) in map.param_map().iter().enumerate() {
            assert_eq!(bin, i_chan / num);
        }
        assert_eq!(map.gain_map().to_vec(), (0..11).collect::<Vec<_>>());
    }

    // 0 means all channels.
    let map = FrequencyMap::parameterised(&freqs, &widths, FreqInterval::Channels(0));
    assert!(map.param_map().iter().all(|&b| b == 0));
    assert_eq!(map.num_param_bins(), 1);
}

#[test]
fn test_freq_map_with_no_channels() {
    let map = FrequencyMap::parameterised(&[], &[], FreqInterval::Bandwidth(1e6));
    assert_eq!(map.view().dim(), (2, 0));
    assert_eq!(map.num_gain_bins(), 0);
    assert_eq!(map.num_param_bins(), 0);

    let map = FrequencyMap::parameterised(&[], &[], FreqInterval::Channels(0));
    assert_eq!(map.view().dim(), (2, 0));
}

#[test]
fn test_unparameterised_freq_map() {
    let (_, widths) = freqs_and_widths(6, 1e6);
    let map = FrequencyMap::unparameterised(&widths, FreqInterval::Channels(4));
    assert_eq!(map.gain_map().to_vec(), [0, 0, 0, 0, 1, 1]);
    assert_eq!(map.param_map(), map.gain_map());
}

#[test]
fn test_bin_freqs() {
    let (freqs, widths) = freqs_and_widths(4, 1e6);
    let map = FrequencyMap::parameterised(&freqs, &widths, FreqInterval::Channels(2));
    assert_eq!(map.gain_freqs(&freqs), freqs);
    let param_freqs = map.param_freqs(&freqs);
    assert_eq!(param_freqs.len(), 2);
    assert_abs_diff_eq!(param_freqs[0], 150.5e6);
    assert_abs_diff_eq!(param_freqs[1], 152.5e6);
}

#[test]
fn test_freq_map_is_deterministic() {
    let widths: Vec<f64> = (0..32).map(|i| 1.0 + (i as f64).sin().abs()).collect();
    let freqs: Vec<f64> = (0..32).map(|i| i as f64).collect();
    let a = FrequencyMap::parameterised(&freqs, &widths, FreqInterval::Bandwidth(3.3));
    let b = FrequencyMap::parameterised(&freqs, &widths, FreqInterval::Bandwidth(3.3));
    assert_eq!(a, b);
}

fn timestamps(num: usize) -> Vec<Epoch> {
    (0..num)
        .map(|i| Epoch::from_gpst_seconds(1090008640.0 + 2.0 * i as f64))
        .collect()
}

#[test]
fn test_time_map_by_timesteps() {
    let unique = timestamps(5);
    // Three baselines per timestamp.
    let rows: Vec<Epoch> = unique.iter().flat_map(|&t| [t, t, t]).collect();
    let time_res = Duration::from_seconds(2.0);

    let time_map = TimeMap::new(&rows, time_res, TimeInterval::Timesteps(2));
    assert_eq!(time_map.num_bins(), 3);
    assert_eq!(
        time_map.row_to_bin,
        [0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 2, 2, 2]
    );
    assert_eq!(time_map.bins[0].timestamps.len(), 2);
    assert_eq!(time_map.bins[2].timestamps.len(), 1);
    assert_abs_diff_eq!(
        time_map.bins[0].average.to_gpst_seconds(),
        1090008641.0,
        epsilon = 1e-6
    );
    assert_abs_diff_eq!(
        time_map.bin_gps_seconds()[2],
        1090008648.0,
        epsilon = 1e-6
    );

    let time_map = TimeMap::new(&rows, time_res, TimeInterval::Timesteps(0));
    assert_eq!(time_map.num_bins(), 1);
    assert!(time_map.row_to_bin.iter().all(|&b| b == 0));
}

#[test]
fn test_time_map_by_duration() {
    let unique = timestamps(7);
    let time_res = Duration::from_seconds(2.0);
    let time_map = TimeMap::new(
        &unique,
        time_res,
        TimeInterval::Duration(Duration::from_seconds(6.0)),
    );
    assert_eq!(time_map.row_to_bin, [0, 0, 0, 1, 1, 1, 2]);
    assert_eq!(time_map.num_bins(), 3);
}

#[test]
fn test_time_map_unordered_rows() {
    let unique = timestamps(4);
    let rows = vec![unique[3], unique[0], unique[2], unique[0], unique[1]];
    let time_map = TimeMap::new(&rows, Duration::from_seconds(2.0), TimeInterval::Timesteps(1));
    assert_eq!(time_map.row_to_bin, [3, 0, 2, 0, 1]);
    for (i, bin) in time_map.bins.iter().enumerate() {
        assert_eq!(bin.index, i);
        assert_eq!(bin.timestamps, vec1![unique[i]]);
    }
}

#[test]
fn test_parse_freq_interval() {
    assert_eq!(parse_freq_interval("4").unwrap(), FreqInterval::Channels(4));
    assert_eq!(parse_freq_interval("0").unwrap(), FreqInterval::Channels(0));
    assert_eq!(
        parse_freq_interval("2MHz").unwrap(),
        FreqInterval::Bandwidth(2e6)
    );
    assert_eq!(
        parse_freq_interval("80kHz").unwrap(),
        FreqInterval::Bandwidth(80e3)
    );
    assert!(matches!(
        parse_freq_interval("2.5"),
        Err(IntervalError::NotInteger(_))
    ));
    assert!(matches!(
        parse_freq_interval("-1"),
        Err(IntervalError::Negative(_))
    ));
    assert!(matches!(
        parse_freq_interval("0Hz"),
        Err(IntervalError::NotPositive(_))
    ));
    assert!(matches!(
        parse_freq_interval("many"),
        Err(IntervalError::Parse(_))
    ));
}

#[test]
fn test_parse_time_interval() {
    assert_eq!(parse_time_interval("3").unwrap(), TimeInterval::Timesteps(3));
    assert_eq!(
        parse_time_interval("8s").unwrap(),
        TimeInterval::Duration(Duration::from_seconds(8.0))
    );
    assert_eq!(
        parse_time_interval("2min").unwrap(),
        TimeInterval::Duration(Duration::from_seconds(120.0))
    );
    assert!(matches!(
        parse_time_interval("1.5"),
        Err(IntervalError::NotInteger(_))
    ));
}

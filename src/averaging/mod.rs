// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to group time samples and channels into solution intervals.

mod error;
#[cfg(test)]
mod tests;

pub use error::IntervalError;

use std::cmp::Ordering;

use hifitime::{Duration, Epoch};
use log::trace;
use ndarray::prelude::*;
use vec1::Vec1;

use crate::unit_parsing::{parse_freq, parse_time};

/// How channels are grouped into a solution interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FreqInterval {
    /// Group this many consecutive channels together. 0 means that all
    /// channels share a single interval.
    Channels(usize),

    /// Walk the channels in order and close an interval as soon as the
    /// accumulated channel width reaches this bandwidth \[Hz\].
    Bandwidth(f64),
}

/// How time samples are grouped into a solution interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeInterval {
    /// Group this many consecutive unique timestamps together. 0 means that
    /// all timestamps share a single interval.
    Timesteps(usize),

    /// Walk the unique timestamps in order and close an interval as soon as
    /// the accumulated integration time reaches this duration.
    Duration(Duration),
}

/// A mapping from each channel to a frequency bin, at both gain and parameter
/// resolution. This is a 2 x `num_chans` table; the first row is the gain map,
/// the second the parameter map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyMap {
    map: Array2<usize>,
}

impl FrequencyMap {
    pub(crate) fn new(gain_map: Array1<usize>, param_map: Array1<usize>) -> FrequencyMap {
        assert_eq!(
            gain_map.len(),
            param_map.len(),
            "gain and parameter maps must cover the same channels; this is a programmer error"
        );
        let mut map = Array2::zeros((2, gain_map.len()));
        map.row_mut(0).assign(&gain_map);
        map.row_mut(1).assign(&param_map);
        FrequencyMap { map }
    }

    /// Build the map used by parameterised gain terms. Gains are kept at full
    /// channel resolution (the first row is the identity map) while the
    /// parameters are binned according to `freq_interval`. Only the number of
    /// channels is taken from `chan_freqs`.
    pub fn parameterised(
        chan_freqs: &[f64],
        chan_widths: &[f64],
        freq_interval: FreqInterval,
    ) -> FrequencyMap {
        let num_chans = chan_freqs.len();
        debug_assert_eq!(num_chans, chan_widths.len());
        FrequencyMap::new(
            Array1::from_iter(0..num_chans),
            bin_channels(chan_widths, freq_interval),
        )
    }

    /// Build the map used by unparameterised gain terms; both rows are binned
    /// according to `freq_interval`.
    pub fn unparameterised(chan_widths: &[f64], freq_interval: FreqInterval) -> FrequencyMap {
        let bins = bin_channels(chan_widths, freq_interval);
        FrequencyMap::new(bins.clone(), bins)
    }

    /// The whole 2 x `num_chans` table.
    pub fn view(&self) -> ArrayView2<usize> {
        self.map.view()
    }

    pub fn num_chans(&self) -> usize {
        self.map.len_of(Axis(1))
    }

    /// Channel to gain frequency bin.
    pub fn gain_map(&self) -> ArrayView1<usize> {
        self.map.row(0)
    }

    /// Channel to parameter frequency bin.
    pub fn param_map(&self) -> ArrayView1<usize> {
        self.map.row(1)
    }

    pub fn num_gain_bins(&self) -> usize {
        num_bins(self.gain_map())
    }

    pub fn num_param_bins(&self) -> usize {
        num_bins(self.param_map())
    }

    /// The mean channel frequency of each gain frequency bin \[Hz\].
    pub fn gain_freqs(&self, chan_freqs: &[f64]) -> Vec<f64> {
        bin_means(self.gain_map(), chan_freqs)
    }

    /// The mean channel frequency of each parameter frequency bin \[Hz\].
    pub fn param_freqs(&self, chan_freqs: &[f64]) -> Vec<f64> {
        bin_means(self.param_map(), chan_freqs)
    }
}

/// Assign each channel a bin index. Bin indices are non-decreasing and start
/// at 0.
///
/// When binning by bandwidth, the channel whose width makes the accumulated
/// bandwidth reach the threshold still belongs to the bin being closed; the
/// next channel starts a new bin with an empty accumulator.
pub(crate) fn bin_channels(chan_widths: &[f64], freq_interval: FreqInterval) -> Array1<usize> {
    let num_chans = chan_widths.len();
    match freq_interval {
        FreqInterval::Bandwidth(threshold) => {
            let mut bins = Array1::zeros(num_chans);
            let mut net_bandwidth = 0.0;
            let mut bin = 0;
            for (out, &width) in bins.iter_mut().zip(chan_widths) {
                *out = bin;
                net_bandwidth += width;
                if net_bandwidth >= threshold {
                    net_bandwidth = 0.0;
                    bin += 1;
                }
            }
            bins
        }

        FreqInterval::Channels(num) => {
            let num = if num == 0 { num_chans.max(1) } else { num };
            Array1::from_iter((0..num_chans).map(|i_chan| i_chan / num))
        }
    }
}

fn num_bins(map: ArrayView1<usize>) -> usize {
    map.iter().last().map(|&last| last + 1).unwrap_or(0)
}

fn bin_means(map: ArrayView1<usize>, values: &[f64]) -> Vec<f64> {
    let mut sums = vec![0.0; num_bins(map)];
    let mut counts = vec![0_usize; sums.len()];
    for (&bin, &v) in map.iter().zip(values) {
        sums[bin] += v;
        counts[bin] += 1;
    }
    sums.into_iter()
        .zip(counts)
        .map(|(s, c)| if c == 0 { f64::NAN } else { s / c as f64 })
        .collect()
}

/// A collection of unique timestamps sharing a solution interval.
#[derive(Debug, Clone)]
pub struct TimeBin {
    /// The time bin index. The first bin is 0.
    pub index: usize,

    /// The unique timestamps comprising this bin, ascendingly sorted.
    pub timestamps: Vec1<Epoch>,

    /// The mean of `timestamps`.
    pub average: Epoch,
}

/// A mapping from each row of visibilities to a time bin.
#[derive(Debug, Clone)]
pub struct TimeMap {
    /// The time bin of each row.
    pub row_to_bin: Vec<usize>,

    /// The time bins, in ascending time order.
    pub bins: Vec<TimeBin>,
}

impl TimeMap {
    /// Given the timestamp of each row of visibilities, the integration time
    /// of each timestamp and a [`TimeInterval`], group the unique timestamps
    /// into bins and map each row to its bin. Rows may appear in any order;
    /// bin indices follow time order.
    pub fn new(row_timestamps: &[Epoch], time_res: Duration, time_interval: TimeInterval) -> TimeMap {
        let mut unique = row_timestamps.to_vec();
        unique.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        unique.dedup();

        let unique_to_bin: Vec<usize> = match time_interval {
            TimeInterval::Duration(threshold) => {
                let mut net_time = Duration::ZERO;
                let mut bin = 0;
                unique
                    .iter()
                    .map(|_| {
                        let this_bin = bin;
                        net_time = net_time + time_res;
                        if net_time >= threshold {
                            net_time = Duration::ZERO;
                            bin += 1;
                        }
                        this_bin
                    })
                    .collect()
            }

            TimeInterval::Timesteps(num) => {
                let num = if num == 0 { unique.len().max(1) } else { num };
                (0..unique.len()).map(|i| i / num).collect()
            }
        };

        let mut bins: Vec<TimeBin> = vec![];
        for (&timestamp, &bin) in unique.iter().zip(unique_to_bin.iter()) {
            match bins.last_mut() {
                Some(time_bin) if time_bin.index == bin => time_bin.timestamps.push(timestamp),
                _ => bins.push(TimeBin {
                    index: bin,
                    timestamps: Vec1::new(timestamp),
                    average: timestamp,
                }),
            }
        }
        for time_bin in bins.iter_mut() {
            time_bin.average = average_epoch(&time_bin.timestamps);
        }

        let row_to_bin = row_timestamps
            .iter()
            .map(|t| {
                let i_unique = unique
                    .binary_search_by(|u| u.partial_cmp(t).unwrap_or(Ordering::Equal))
                    .unwrap_or_else(|i| i);
                unique_to_bin[i_unique]
            })
            .collect();
        trace!(
            "{} rows over {} unique timestamps mapped into {} time bins",
            row_timestamps.len(),
            unique.len(),
            bins.len()
        );

        TimeMap { row_to_bin, bins }
    }

    pub fn num_bins(&self) -> usize {
        self.bins.len()
    }

    /// The average timestamp of each bin as GPS seconds.
    pub fn bin_gps_seconds(&self) -> Vec<f64> {
        self.bins
            .iter()
            .map(|b| b.average.to_gpst_seconds())
            .collect()
    }
}

pub(crate) fn average_epoch(timestamps: &Vec1<Epoch>) -> Epoch {
    let first = *timestamps.first();
    let offset = timestamps
        .iter()
        .map(|&t| (t - first).to_seconds())
        .sum::<f64>()
        / timestamps.len() as f64;
    first + Duration::from_seconds(offset)
}

/// Parse a user-supplied frequency interval. A naked integer is a number of
/// channels (0 means all channels), whereas a quantity with a unit (e.g.
/// "2MHz") is a bandwidth.
pub fn parse_freq_interval(s: &str) -> Result<FreqInterval, IntervalError> {
    match parse_freq(s)? {
        (number, None) => {
            if number < 0.0 {
                return Err(IntervalError::Negative(s.to_string()));
            }
            // Reject non-integer floats.
            if (number - number.round()).abs() > 1e-6 {
                return Err(IntervalError::NotInteger(s.to_string()));
            }
            Ok(FreqInterval::Channels(number.round() as usize))
        }

        (quantity, Some(freq_format)) => {
            if quantity <= 0.0 {
                return Err(IntervalError::NotPositive(s.to_string()));
            }
            Ok(FreqInterval::Bandwidth(quantity * freq_format.to_hz()))
        }
    }
}

/// Parse a user-supplied time interval. A naked integer is a number of
/// timesteps (0 means all timesteps), whereas a quantity with a unit (e.g.
/// "8s") is a duration.
pub fn parse_time_interval(s: &str) -> Result<TimeInterval, IntervalError> {
    match parse_time(s)? {
        (number, None) => {
            if number < 0.0 {
                return Err(IntervalError::Negative(s.to_string()));
            }
            if (number - number.round()).abs() > 1e-6 {
                return Err(IntervalError::NotInteger(s.to_string()));
            }
            Ok(TimeInterval::Timesteps(number.round() as usize))
        }

        (quantity, Some(time_format)) => {
            if quantity <= 0.0 {
                return Err(IntervalError::NotPositive(s.to_string()));
            }
            Ok(TimeInterval::Duration(Duration::from_seconds(
                quantity * time_format.to_seconds(),
            )))
        }
    }
}

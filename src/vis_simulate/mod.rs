// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Generate visibilities of a flat-spectrum point source at the phase centre,
//! corrupted only by per-antenna delays.
//!
//! The gain of antenna `a` for each parallel-hand correlation is
//! `exp(2 pi i tau_a f)` and visibilities are `g_p conj(g_q)`, so a baseline
//! (p, q) has the phase `2 pi (tau_p - tau_q) f`. Cross-hand correlations are
//! zero.

mod error;

pub use error::SimulateError;

use hifitime::{Duration, Epoch};
use log::debug;
use ndarray::prelude::*;

use crate::{
    c64,
    constants::TAU,
    context::CorrelationMap,
    math::{baseline_pairs, cexp},
};

/// Parameters needed to simulate delay-corrupted visibilities.
#[derive(Debug, Clone)]
pub struct SimulationParams {
    /// The delay of each antenna \[seconds\].
    pub delays: Vec<f64>,

    pub num_chans: usize,

    /// The centre frequency of the first channel \[Hz\].
    pub first_freq: f64,

    /// \[Hz\]
    pub freq_res: f64,

    pub num_timesteps: usize,

    /// The centroid of the first timestep.
    pub first_timestamp: Epoch,

    pub time_res: Duration,

    /// Should each antenna's auto-correlation be included?
    pub include_autos: bool,
}

/// Visibilities in a measurement-set-like layout: rows are ordered by
/// timestep, then by baseline.
#[derive(Debug, Clone)]
pub struct SimulatedVis {
    /// Dimensions are (row, channel, correlation).
    pub data: Array3<c64>,

    /// Dimensions are (row, channel). Nothing is flagged.
    pub flags: Array2<i8>,

    pub ant1: Vec<usize>,
    pub ant2: Vec<usize>,

    /// The timestamp of each row.
    pub timestamps: Vec<Epoch>,

    pub time_res: Duration,

    /// \[Hz\]
    pub chan_freqs: Vec<f64>,

    /// \[Hz\]
    pub chan_widths: Vec<f64>,

    pub num_ants: usize,
}

pub fn simulate_delays(
    params: &SimulationParams,
    corr_map: &CorrelationMap,
) -> Result<SimulatedVis, SimulateError> {
    let num_ants = params.delays.len();
    if num_ants < 2 {
        return Err(SimulateError::TooFewAntennas(num_ants));
    }
    if params.num_chans == 0 {
        return Err(SimulateError::NoChannels);
    }
    if params.num_timesteps == 0 {
        return Err(SimulateError::NoTimesteps);
    }
    if params.freq_res <= 0.0 || !params.freq_res.is_finite() {
        return Err(SimulateError::FreqRes(params.freq_res));
    }
    if params.time_res <= Duration::ZERO {
        return Err(SimulateError::TimeRes(params.time_res));
    }

    let chan_freqs: Vec<f64> = (0..params.num_chans)
        .map(|i_chan| params.first_freq + i_chan as f64 * params.freq_res)
        .collect();
    let baselines = baseline_pairs(num_ants, params.include_autos);

    // Every timestep sees the same baseline visibilities.
    let mut baseline_vis = Array3::zeros((baselines.len(), params.num_chans, corr_map.num_corrs()));
    for (&(p, q), mut vis) in baselines.iter().zip(baseline_vis.outer_iter_mut()) {
        let delay = params.delays[p] - params.delays[q];
        for (&freq, mut vis) in chan_freqs.iter().zip(vis.outer_iter_mut()) {
            let v = cexp(TAU * delay * freq);
            for pc in corr_map.parameterised() {
                vis[pc.gain_slot] = v;
            }
        }
    }

    let num_rows = baselines.len() * params.num_timesteps;
    let mut data = Array3::zeros((num_rows, params.num_chans, corr_map.num_corrs()));
    let mut ant1 = Vec::with_capacity(num_rows);
    let mut ant2 = Vec::with_capacity(num_rows);
    let mut timestamps = Vec::with_capacity(num_rows);
    for (i_timestep, mut data) in data
        .axis_chunks_iter_mut(Axis(0), baselines.len())
        .enumerate()
    {
        data.assign(&baseline_vis);
        let timestamp = params.first_timestamp + params.time_res * i_timestep as i64;
        for &(p, q) in &baselines {
            ant1.push(p);
            ant2.push(q);
            timestamps.push(timestamp);
        }
    }
    debug!(
        "Simulated {num_rows} rows: {} baselines x {} timesteps x {} channels",
        baselines.len(),
        params.num_timesteps,
        params.num_chans
    );

    Ok(SimulatedVis {
        data,
        flags: Array2::zeros((num_rows, params.num_chans)),
        ant1,
        ant2,
        timestamps,
        time_res: params.time_res,
        chan_freqs,
        chan_widths: vec![params.freq_res; params.num_chans],
        num_ants,
    })
}

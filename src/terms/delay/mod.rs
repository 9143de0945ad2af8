// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A gain term parameterised by a phase offset and a delay per parallel-hand
//! correlation.
//!
//! The gain of antenna `a` at frequency `f` for a parameterised correlation is
//! `exp(i(phi_a + 2 pi tau_a f))`. The delays are bootstrapped from the data:
//! each antenna's visibilities with a reference antenna are averaged, zero
//! padded, transformed into the delay domain, and the location of the peak is
//! used as the initial delay. Phase offsets start at zero.

mod estimate;
mod reference;

pub use estimate::DelayEstimator;
pub use reference::{average_to_reference, BaselineOrientation, ReferenceAverage};

use log::{debug, trace, warn};
use ndarray::{prelude::*, Zip};

use super::{
    validate_inputs, ChunkLayout, GainTerm, InitInputs, InitState, TermError, TermKind,
    TermParams, TermSolutions,
};
use crate::{
    averaging::FrequencyMap,
    constants::TAU,
    context::{CorrelationMap, ParameterisedCorrelation},
    math::cexp,
};

#[derive(Debug, Clone)]
pub struct DelayTerm {
    name: String,
    params: TermParams,
}

impl DelayTerm {
    pub fn new(name: &str, params: TermParams) -> DelayTerm {
        DelayTerm {
            name: name.to_string(),
            params,
        }
    }

    fn pad_factor(&self, num_chans: usize) -> usize {
        self.params
            .pad_factor
            .map(|p| p.get())
            .unwrap_or_else(|| DelayEstimator::default_pad_factor(num_chans))
    }
}

impl GainTerm for DelayTerm {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> TermKind {
        TermKind::Delay
    }

    fn params(&self) -> &TermParams {
        &self.params
    }

    fn num_params(&self, corr_map: &CorrelationMap) -> usize {
        corr_map.num_params()
    }

    fn param_labels(&self, corr_map: &CorrelationMap) -> Vec<String> {
        corr_map.param_labels()
    }

    /// Gains are per channel, whereas parameters are binned.
    fn build_frequency_map(&self, chan_freqs: &[f64], chan_widths: &[f64]) -> FrequencyMap {
        FrequencyMap::parameterised(chan_freqs, chan_widths, self.params.freq_interval)
    }

    fn initialise(
        &self,
        mut solutions: TermSolutions,
        layout: &ChunkLayout,
        inputs: &InitInputs,
        prior: Option<&TermSolutions>,
    ) -> Result<TermSolutions, TermError> {
        solutions.validate()?;

        if let Some(prior) = prior {
            solutions.load_from(prior)?;
            return Ok(solutions);
        }
        if !self.params.initial_estimate {
            debug!(
                "Initial estimation disabled for term '{}'; leaving gains at identity",
                self.name
            );
            return Ok(solutions);
        }
        validate_inputs(layout, inputs)?;

        let pad_factor = self.pad_factor(inputs.chan_freqs.len());
        let estimator = DelayEstimator::new(inputs.chan_freqs, pad_factor);
        let averages = average_to_reference(
            inputs.data,
            inputs.flags,
            inputs.ant1,
            inputs.ant2,
            inputs.time_bins,
            inputs.ref_ant,
            layout.num_ants,
        );
        if averages.is_empty() {
            warn!(
                "No baselines with reference antenna {}; delays for term '{}' will be zero",
                inputs.ref_ant, self.name
            );
        }

        let param_corrs = layout.corr_map.parameterised();
        for (&time_bin, average) in &averages {
            let delays = estimator.estimate(average.vis.view(), layout.corr_map);
            for (i_ant, orientation) in average.orientations.iter().enumerate() {
                let Some(orientation) = orientation else {
                    continue;
                };
                for (p, &delay) in param_corrs.iter().zip(delays.row(i_ant)) {
                    // The estimate seeds every parameter frequency bin, and
                    // only the first direction.
                    solutions
                        .params
                        .slice_mut(s![time_bin, .., i_ant, 0, p.delay_slot])
                        .fill(orientation.sign() * delay);
                }
            }
            trace!(
                "Time bin {time_bin}: params {}",
                solutions.params.slice(s![time_bin, 0, .., 0, ..])
            );
        }

        synthesise_gains(
            &mut solutions,
            layout.freq_map,
            inputs.chan_freqs,
            param_corrs,
        );
        solutions.state = InitState::Estimated;
        Ok(solutions)
    }
}

/// Set the gains of parameterised correlations to `exp(2 pi i tau f)` using
/// the delays in the parameter array. Other correlations are untouched.
fn synthesise_gains(
    solutions: &mut TermSolutions,
    freq_map: &FrequencyMap,
    chan_freqs: &[f64],
    param_corrs: &[ParameterisedCorrelation],
) {
    let TermSolutions { gains, params, .. } = solutions;
    let gain_map = freq_map.gain_map();
    let param_map = freq_map.param_map();
    for (i_chan, &freq) in chan_freqs.iter().enumerate() {
        for p in param_corrs {
            let delays = params.slice(s![.., param_map[i_chan], .., .., p.delay_slot]);
            let gains = gains.slice_mut(s![.., gain_map[i_chan], .., .., p.gain_slot]);
            Zip::from(gains)
                .and(delays)
                .for_each(|gain, &delay| *gain = cexp(TAU * delay * freq));
        }
    }
}

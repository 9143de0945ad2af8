// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! An unparameterised complex gain term.

use log::debug;

use super::{
    validate_inputs, ChunkLayout, GainTerm, InitInputs, TermError, TermKind, TermParams,
    TermSolutions,
};
use crate::{averaging::FrequencyMap, context::CorrelationMap};

/// A free complex gain per correlation. There are no parameters, so gains and
/// parameters share the same frequency resolution.
#[derive(Debug, Clone)]
pub struct ComplexTerm {
    name: String,
    params: TermParams,
}

impl ComplexTerm {
    pub fn new(name: &str, params: TermParams) -> ComplexTerm {
        ComplexTerm {
            name: name.to_string(),
            params,
        }
    }
}

impl GainTerm for ComplexTerm {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> TermKind {
        TermKind::Complex
    }

    fn params(&self) -> &TermParams {
        &self.params
    }

    fn num_params(&self, _: &CorrelationMap) -> usize {
        0
    }

    fn param_labels(&self, _: &CorrelationMap) -> Vec<String> {
        vec![]
    }

    fn build_frequency_map(&self, _chan_freqs: &[f64], chan_widths: &[f64]) -> FrequencyMap {
        FrequencyMap::unparameterised(chan_widths, self.params.freq_interval)
    }

    fn initialise(
        &self,
        mut solutions: TermSolutions,
        layout: &ChunkLayout,
        inputs: &InitInputs,
        prior: Option<&TermSolutions>,
    ) -> Result<TermSolutions, TermError> {
        solutions.validate()?;
        validate_inputs(layout, inputs)?;
        match prior {
            Some(prior) => solutions.load_from(prior)?,
            None => debug!(
                "No prior for term '{}'; leaving gains at identity",
                self.name
            ),
        }
        Ok(solutions)
    }
}

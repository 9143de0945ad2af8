// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Metadata on the correlation products present in some visibilities.

The correlation axis of visibility and gain arrays is ordered however the input
data ordered it. Rather than assuming that parallel-hand correlations occupy the
first and last slots, a [`CorrelationMap`] is built once from the data's labels
and handed to anything that needs to know which slot holds what.
 */

mod error;

pub use error::CorrelationError;

use std::str::FromStr;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use vec1::Vec1;

use crate::constants::PARAMETERISABLE_CORRELATIONS;

/// A correlation product of two (linear or circular) feeds.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum Correlation {
    XX,
    XY,
    YX,
    YY,
    RR,
    RL,
    LR,
    LL,
}

impl Correlation {
    /// Can the gain of this correlation be expressed with a phase offset and a
    /// delay?
    pub fn is_parameterisable(self) -> bool {
        PARAMETERISABLE_CORRELATIONS.contains(&self)
    }
}

/// A correlation whose gain is expressed with a phase offset and a delay, and
/// where those things live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterisedCorrelation {
    pub corr: Correlation,

    /// The index into the correlation axis of gain (and data) arrays.
    pub gain_slot: usize,

    /// The index into the parameter axis of parameter arrays holding the phase
    /// offset.
    pub phase_offset_slot: usize,

    /// The index into the parameter axis of parameter arrays holding the delay
    /// \[seconds\].
    pub delay_slot: usize,
}

/// A validated mapping between correlation labels and array slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationMap {
    corrs: Vec1<Correlation>,
    parameterised: Vec<ParameterisedCorrelation>,
}

impl CorrelationMap {
    /// Build a map from correlation labels (e.g. `["XX", "XY", "YX", "YY"]`) in
    /// the order they appear on the data's correlation axis.
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Result<CorrelationMap, CorrelationError> {
        let corrs = labels
            .iter()
            .map(|l| {
                let l = l.as_ref();
                Correlation::from_str(l.trim())
                    .map_err(|_| CorrelationError::Unknown(l.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(corrs)
    }

    pub fn new(corrs: Vec<Correlation>) -> Result<CorrelationMap, CorrelationError> {
        let corrs = Vec1::try_from_vec(corrs).map_err(|_| CorrelationError::Empty)?;
        if let Some(dup) = corrs.iter().duplicates().next() {
            return Err(CorrelationError::Duplicate(*dup));
        }

        let parameterised = corrs
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_parameterisable())
            .enumerate()
            .map(|(i_param_corr, (gain_slot, &corr))| ParameterisedCorrelation {
                corr,
                gain_slot,
                phase_offset_slot: 2 * i_param_corr,
                delay_slot: 2 * i_param_corr + 1,
            })
            .collect();

        Ok(CorrelationMap {
            corrs,
            parameterised,
        })
    }

    pub fn correlations(&self) -> &[Correlation] {
        &self.corrs
    }

    pub fn num_corrs(&self) -> usize {
        self.corrs.len()
    }

    /// Which slot does this correlation occupy?
    pub fn slot(&self, corr: Correlation) -> Option<usize> {
        self.corrs.iter().position(|&c| c == corr)
    }

    /// The correlations eligible for phase offset and delay parameterisation,
    /// in data order.
    pub fn parameterised(&self) -> &[ParameterisedCorrelation] {
        &self.parameterised
    }

    /// Two parameters (phase offset, delay) per parameterised correlation.
    pub fn num_params(&self) -> usize {
        2 * self.parameterised.len()
    }

    /// Labels for the parameter axis, e.g. `["phase_offset_XX", "delay_XX",
    /// "phase_offset_YY", "delay_YY"]`.
    pub fn param_labels(&self) -> Vec<String> {
        self.parameterised
            .iter()
            .flat_map(|p| [format!("phase_offset_{}", p.corr), format!("delay_{}", p.corr)])
            .collect()
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Gain terms.
//!
//! A gain term describes how a per-antenna, per-time, per-frequency complex
//! correction is parameterised, how its solution intervals are laid out, and
//! how it gets an initial value before any iterative solving happens. The set
//! of terms is closed; [`Term`] enumerates them and each kind implements
//! [`GainTerm`].

mod complex;
pub(crate) mod delay;
mod error;
mod options;

pub use complex::ComplexTerm;
pub use delay::{
    average_to_reference, BaselineOrientation, DelayEstimator, DelayTerm, ReferenceAverage,
};
pub use error::TermError;
pub use options::{TermOptions, TermParams};

use hifitime::{Duration, Epoch};
use log::debug;
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    averaging::{FrequencyMap, TimeMap},
    c64,
    context::{Correlation, CorrelationMap},
};

/// The axes of gain arrays.
pub const GAIN_AXES: [&str; 5] = ["gain_t", "gain_f", "ant", "dir", "corr"];

/// The axes of parameter arrays.
pub const PARAM_AXES: [&str; 5] = ["param_t", "param_f", "ant", "dir", "param"];

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TermKind {
    /// An unparameterised complex gain.
    Complex,

    /// A gain parameterised by a phase offset and a delay per parallel-hand
    /// correlation.
    Delay,
}

/// The shape of the gain or parameter arrays of a term for one chunk of data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkSpec {
    pub num_time_bins: usize,
    pub num_freq_bins: usize,
    pub num_ants: usize,
    pub num_dirs: usize,
    /// The number of correlations (gains) or parameters (parameters).
    pub num_elems: usize,
}

impl ChunkSpec {
    pub fn shape(&self) -> (usize, usize, usize, usize, usize) {
        (
            self.num_time_bins,
            self.num_freq_bins,
            self.num_ants,
            self.num_dirs,
            self.num_elems,
        )
    }
}

/// Metadata describing a chunk of data that a term is laid out over.
#[derive(Debug, Clone, Copy)]
pub struct ChunkLayout<'a> {
    pub corr_map: &'a CorrelationMap,
    pub time_map: &'a TimeMap,
    pub freq_map: &'a FrequencyMap,
    /// The centre frequency of each channel \[Hz\].
    pub chan_freqs: &'a [f64],
    pub num_ants: usize,
    pub num_dirs: usize,
}

/// Where a term's initialisation ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitState {
    /// Nothing was loaded or estimated; gains are at their default (identity)
    /// values.
    NotLoaded,

    /// Gains and parameters were copied from a prior result.
    Loaded,

    /// Gains and parameters were estimated from the data.
    Estimated,
}

/// Inputs used when estimating initial gains from data.
#[derive(Debug, Clone, Copy)]
pub struct InitInputs<'a> {
    /// Visibilities with dimensions (row, channel, correlation).
    pub data: ArrayView3<'a, c64>,

    /// Flags with dimensions (row, channel). Anything non-zero is flagged.
    pub flags: ArrayView2<'a, i8>,

    /// The first antenna of each row.
    pub ant1: &'a [usize],

    /// The second antenna of each row.
    pub ant2: &'a [usize],

    /// The time bin of each row.
    pub time_bins: &'a [usize],

    /// The centre frequency of each channel \[Hz\].
    pub chan_freqs: &'a [f64],

    /// The antenna that all others are referenced to.
    pub ref_ant: usize,
}

/// The gains and parameters of a term for one chunk of data, along with the
/// coordinates needed to interpret them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermSolutions {
    pub name: String,
    pub kind: TermKind,
    pub state: InitState,

    /// Dimensions are [`GAIN_AXES`].
    pub gains: Array5<c64>,

    /// Dimensions are [`PARAM_AXES`].
    pub params: Array5<f64>,

    pub gain_spec: ChunkSpec,
    pub param_spec: ChunkSpec,
    pub gain_axes: Vec<String>,
    pub param_axes: Vec<String>,

    /// GPS seconds of each gain time bin.
    pub gain_times: Vec<f64>,

    /// GPS seconds of each parameter time bin.
    pub param_times: Vec<f64>,

    /// \[Hz\]
    pub gain_freqs: Vec<f64>,

    /// \[Hz\]
    pub param_freqs: Vec<f64>,

    pub corrs: Vec<Correlation>,
    pub param_labels: Vec<String>,
}

impl TermSolutions {
    /// Allocate gains at identity and parameters at zero.
    pub(crate) fn new(
        name: &str,
        kind: TermKind,
        gain_spec: ChunkSpec,
        param_spec: ChunkSpec,
        layout: &ChunkLayout,
        param_labels: Vec<String>,
    ) -> TermSolutions {
        let corr_map = layout.corr_map;
        let mut gains = Array5::zeros(gain_spec.shape());
        for p in corr_map.parameterised() {
            gains
                .slice_mut(s![.., .., .., .., p.gain_slot])
                .fill(c64::new(1.0, 0.0));
        }
        let times = layout.time_map.bin_gps_seconds();

        TermSolutions {
            name: name.to_string(),
            kind,
            state: InitState::NotLoaded,
            gains,
            params: Array5::zeros(param_spec.shape()),
            gain_spec,
            param_spec,
            gain_axes: GAIN_AXES.iter().map(|s| s.to_string()).collect(),
            param_axes: PARAM_AXES.iter().map(|s| s.to_string()).collect(),
            gain_times: times.clone(),
            param_times: times,
            gain_freqs: layout.freq_map.gain_freqs(layout.chan_freqs),
            param_freqs: layout.freq_map.param_freqs(layout.chan_freqs),
            corrs: corr_map.correlations().to_vec(),
            param_labels,
        }
    }

    /// Copy the gains and parameters of a prior result into these solutions.
    pub(crate) fn load_from(&mut self, prior: &TermSolutions) -> Result<(), TermError> {
        if prior.kind != self.kind {
            return Err(TermError::PriorKind {
                expected: self.kind,
                got: prior.kind,
            });
        }
        if prior.gains.dim() != self.gains.dim() {
            return Err(TermError::PriorShape {
                array: "gains",
                expected: self.gains.dim(),
                got: prior.gains.dim(),
            });
        }
        if prior.params.dim() != self.params.dim() {
            return Err(TermError::PriorShape {
                array: "params",
                expected: self.params.dim(),
                got: prior.params.dim(),
            });
        }
        self.gains.assign(&prior.gains);
        self.params.assign(&prior.params);
        self.state = InitState::Loaded;
        debug!("Loaded prior gains for term '{}'", self.name);
        Ok(())
    }

    /// Check that the arrays still have the shapes described by the specs.
    pub fn validate(&self) -> Result<(), TermError> {
        if self.gains.dim() != self.gain_spec.shape() {
            return Err(TermError::ShapeMismatch {
                array: "gains",
                expected: self.gain_spec.shape(),
                got: self.gains.dim(),
            });
        }
        if self.params.dim() != self.param_spec.shape() {
            return Err(TermError::ShapeMismatch {
                array: "params",
                expected: self.param_spec.shape(),
                got: self.params.dim(),
            });
        }
        Ok(())
    }
}

/// The lifecycle hooks every gain term provides.
pub trait GainTerm {
    fn name(&self) -> &str;

    fn kind(&self) -> TermKind;

    fn params(&self) -> &TermParams;

    /// The number of parameters per antenna per solution interval.
    fn num_params(&self, corr_map: &CorrelationMap) -> usize;

    /// The labels of the parameter axis.
    fn param_labels(&self, corr_map: &CorrelationMap) -> Vec<String>;

    /// Map channels to gain and parameter frequency bins.
    fn build_frequency_map(&self, chan_freqs: &[f64], chan_widths: &[f64]) -> FrequencyMap;

    /// Map rows of visibilities to time bins. Gains and parameters share the
    /// same time bins.
    fn build_time_map(&self, row_timestamps: &[Epoch], time_res: Duration) -> TimeMap {
        TimeMap::new(row_timestamps, time_res, self.params().time_interval)
    }

    /// The shape of the gain array over a chunk.
    fn gain_spec(&self, layout: &ChunkLayout) -> ChunkSpec {
        ChunkSpec {
            num_time_bins: layout.time_map.num_bins(),
            num_freq_bins: layout.freq_map.num_gain_bins(),
            num_ants: layout.num_ants,
            num_dirs: layout.num_dirs,
            num_elems: layout.corr_map.num_corrs(),
        }
    }

    /// The shape of the parameter array over a chunk.
    fn param_spec(&self, layout: &ChunkLayout) -> ChunkSpec {
        ChunkSpec {
            num_time_bins: layout.time_map.num_bins(),
            num_freq_bins: layout.freq_map.num_param_bins(),
            num_ants: layout.num_ants,
            num_dirs: layout.num_dirs,
            num_elems: self.num_params(layout.corr_map),
        }
    }

    /// Allocate the gains and parameters of this term over a chunk, with
    /// coordinates attached.
    fn build_result_container(&self, layout: &ChunkLayout) -> TermSolutions {
        TermSolutions::new(
            self.name(),
            self.kind(),
            self.gain_spec(layout),
            self.param_spec(layout),
            layout,
            self.param_labels(layout.corr_map),
        )
    }

    /// Give the solutions their initial values. The solutions are consumed and
    /// handed back once initialisation is complete; nothing else may look at
    /// them in the meantime.
    fn initialise(
        &self,
        solutions: TermSolutions,
        layout: &ChunkLayout,
        inputs: &InitInputs,
        prior: Option<&TermSolutions>,
    ) -> Result<TermSolutions, TermError>;
}

/// All of the gain terms.
#[derive(Debug, Clone)]
pub enum Term {
    Complex(ComplexTerm),
    Delay(DelayTerm),
}

impl Term {
    pub fn new(name: &str, params: TermParams) -> Term {
        match params.kind {
            TermKind::Complex => Term::Complex(ComplexTerm::new(name, params)),
            TermKind::Delay => Term::Delay(DelayTerm::new(name, params)),
        }
    }

    fn inner(&self) -> &dyn GainTerm {
        match self {
            Term::Complex(t) => t,
            Term::Delay(t) => t,
        }
    }
}

impl GainTerm for Term {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn kind(&self) -> TermKind {
        self.inner().kind()
    }

    fn params(&self) -> &TermParams {
        self.inner().params()
    }

    fn num_params(&self, corr_map: &CorrelationMap) -> usize {
        self.inner().num_params(corr_map)
    }

    fn param_labels(&self, corr_map: &CorrelationMap) -> Vec<String> {
        self.inner().param_labels(corr_map)
    }

    fn build_frequency_map(&self, chan_freqs: &[f64], chan_widths: &[f64]) -> FrequencyMap {
        self.inner().build_frequency_map(chan_freqs, chan_widths)
    }

    fn build_time_map(&self, row_timestamps: &[Epoch], time_res: Duration) -> TimeMap {
        self.inner().build_time_map(row_timestamps, time_res)
    }

    fn gain_spec(&self, layout: &ChunkLayout) -> ChunkSpec {
        self.inner().gain_spec(layout)
    }

    fn param_spec(&self, layout: &ChunkLayout) -> ChunkSpec {
        self.inner().param_spec(layout)
    }

    fn build_result_container(&self, layout: &ChunkLayout) -> TermSolutions {
        self.inner().build_result_container(layout)
    }

    fn initialise(
        &self,
        solutions: TermSolutions,
        layout: &ChunkLayout,
        inputs: &InitInputs,
        prior: Option<&TermSolutions>,
    ) -> Result<TermSolutions, TermError> {
        self.inner().initialise(solutions, layout, inputs, prior)
    }
}

/// Check that the initialisation inputs agree with each other and the layout.
pub(crate) fn validate_inputs(layout: &ChunkLayout, inputs: &InitInputs) -> Result<(), TermError> {
    let (num_rows, num_chans, num_corrs) = inputs.data.dim();
    let check = |what: &'static str, expected: usize, got: usize| {
        if expected == got {
            Ok(())
        } else {
            Err(TermError::DataShape {
                what,
                expected,
                got,
            })
        }
    };
    check("flag rows", num_rows, inputs.flags.len_of(Axis(0)))?;
    check("flag channels", num_chans, inputs.flags.len_of(Axis(1)))?;
    check("ANTENNA1 rows", num_rows, inputs.ant1.len())?;
    check("ANTENNA2 rows", num_rows, inputs.ant2.len())?;
    check("time map rows", num_rows, inputs.time_bins.len())?;
    check("channel frequencies", num_chans, inputs.chan_freqs.len())?;
    check("frequency map channels", num_chans, layout.freq_map.num_chans())?;
    check("correlations", layout.corr_map.num_corrs(), num_corrs)?;
    if inputs.ref_ant >= layout.num_ants {
        return Err(TermError::RefAntOutOfRange {
            ref_ant: inputs.ref_ant,
            num_ants: layout.num_ants,
        });
    }
    if layout.num_dirs == 0 {
        return Err(TermError::NoDirections);
    }
    let num_bins = layout.time_map.num_bins();
    for (row, ((&a1, &a2), &time_bin)) in inputs
        .ant1
        .iter()
        .zip(inputs.ant2)
        .zip(inputs.time_bins)
        .enumerate()
    {
        if let Some(ant) = [a1, a2].into_iter().find(|&a| a >= layout.num_ants) {
            return Err(TermError::AntennaOutOfRange {
                row,
                ant,
                num_ants: layout.num_ants,
            });
        }
        if time_bin >= num_bins {
            return Err(TermError::TimeBinOutOfRange {
                row,
                time_bin,
                num_bins,
            });
        }
    }
    Ok(())
}

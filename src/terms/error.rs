// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use super::TermKind;

type Shape = (usize, usize, usize, usize, usize);

#[derive(Error, Debug)]
pub enum TermError {
    #[error("Expected {expected} {what}, but got {got}")]
    DataShape {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("The {array} array has shape {got:?}, but its chunk spec says {expected:?}; this is a programmer error")]
    ShapeMismatch {
        array: &'static str,
        expected: Shape,
        got: Shape,
    },

    #[error("Reference antenna {ref_ant} is out of range; there are only {num_ants} antennas")]
    RefAntOutOfRange { ref_ant: usize, num_ants: usize },

    #[error("Row {row} refers to antenna {ant}, but there are only {num_ants} antennas")]
    AntennaOutOfRange {
        row: usize,
        ant: usize,
        num_ants: usize,
    },

    #[error("Row {row} is in time bin {time_bin}, but there are only {num_bins} time bins")]
    TimeBinOutOfRange {
        row: usize,
        time_bin: usize,
        num_bins: usize,
    },

    #[error("Terms need at least one direction")]
    NoDirections,

    #[error("Tried to load prior solutions of a {got} term into a {expected} term")]
    PriorKind { expected: TermKind, got: TermKind },

    #[error("Prior {array} have shape {got:?}, but this term's {array} have shape {expected:?}")]
    PriorShape {
        array: &'static str,
        expected: Shape,
        got: Shape,
    },

    #[error(transparent)]
    Interval(#[from] crate::averaging::IntervalError),

    #[error(transparent)]
    Correlation(#[from] crate::context::CorrelationError),
}

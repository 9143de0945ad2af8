// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all delaycal-related errors. This should be the *only*
//! error enum that is publicly visible.

use thiserror::Error;

use super::simulate::SimulateArgsError;
use crate::{
    averaging::IntervalError, context::CorrelationError, terms::TermError,
    vis_simulate::SimulateError,
};

/// The *only* publicly visible error from delaycal.
#[derive(Error, Debug)]
pub enum DelayCalError {
    /// An error related to the simulate subcommand.
    #[error("{0}")]
    Simulate(String),

    /// An error related to setting up or initialising a gain term.
    #[error("{0}")]
    Term(String),

    /// An error related to solution intervals.
    #[error("{0}\n\nIntervals are either a plain integer (e.g. 4) or a quantity with a unit (e.g. 8s, 2MHz)")]
    Interval(String),

    /// An error related to correlation labels.
    #[error("{0}\n\nSupported correlations: XX, XY, YX, YY, RR, RL, LR, LL")]
    Correlation(String),

    /// An error related to argument files.
    #[error("{0}")]
    ArgFile(String),

    /// A generic error that can't be clarified further, e.g. IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

impl From<SimulateArgsError> for DelayCalError {
    fn from(e: SimulateArgsError) -> Self {
        Self::Simulate(e.to_string())
    }
}

impl From<SimulateError> for DelayCalError {
    fn from(e: SimulateError) -> Self {
        Self::Simulate(e.to_string())
    }
}

impl From<TermError> for DelayCalError {
    fn from(e: TermError) -> Self {
        match e {
            TermError::Interval(e) => Self::from(e),
            TermError::Correlation(e) => Self::from(e),
            TermError::DataShape { .. }
            | TermError::ShapeMismatch { .. }
            | TermError::RefAntOutOfRange { .. }
            | TermError::AntennaOutOfRange { .. }
            | TermError::TimeBinOutOfRange { .. }
            | TermError::NoDirections
            | TermError::PriorKind { .. }
            | TermError::PriorShape { .. } => Self::Term(e.to_string()),
        }
    }
}

impl From<IntervalError> for DelayCalError {
    fn from(e: IntervalError) -> Self {
        Self::Interval(e.to_string())
    }
}

impl From<CorrelationError> for DelayCalError {
    fn from(e: CorrelationError) -> Self {
        Self::Correlation(e.to_string())
    }
}

impl From<std::io::Error> for DelayCalError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}

impl From<serde_json::Error> for DelayCalError {
    fn from(e: serde_json::Error) -> Self {
        Self::Generic(e.to_string())
    }
}

impl From<toml::ser::Error> for DelayCalError {
    fn from(e: toml::ser::Error) -> Self {
        Self::Generic(e.to_string())
    }
}

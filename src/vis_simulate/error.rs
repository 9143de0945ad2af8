// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with simulating visibilities.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimulateError {
    #[error("Need at least 2 antennas to form a baseline, but got {0}")]
    TooFewAntennas(usize),

    #[error("Got {got} antenna delays, but there are {num_ants} antennas")]
    DelayCount { num_ants: usize, got: usize },

    #[error("Need at least one channel")]
    NoChannels,

    #[error("Need at least one timestep")]
    NoTimesteps,

    #[error("The frequency resolution must be positive, but got {0} Hz")]
    FreqRes(f64),

    #[error("The time resolution must be positive, but got {0}")]
    TimeRes(hifitime::Duration),
}

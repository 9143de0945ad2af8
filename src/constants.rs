// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision.
 */

pub use std::f64::consts::TAU;

use crate::context::Correlation;

/// The number of samples the zero-padded delay transform aims for when no pad
/// factor is supplied. The pad factor becomes `ceil(DEFAULT_FFT_LENGTH /
/// num_chans)`.
pub const DEFAULT_FFT_LENGTH: usize = 1 << 15;

/// Correlations whose gains may be expressed with a phase offset and a delay.
/// Cross-hand correlations are never parameterised.
pub const PARAMETERISABLE_CORRELATIONS: [Correlation; 4] = [
    Correlation::XX,
    Correlation::YY,
    Correlation::RR,
    Correlation::LL,
];

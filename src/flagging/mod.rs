// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to prepare flags for calibration.
//!
//! Calibration code works with a single flag per (row, channel), stored as an
//! `i8`. 0 is unflagged, 1 is flagged and -1 is a temporary flag raised during
//! calibration that should not be written back out.


use log::debug;
use ndarray::prelude::*;

use crate::{c64, context::CorrelationMap};

/// Initialise the (row, channel) flags used by calibration.
///
/// A sample is flagged if any of its correlations are flagged in `flags`, if
/// its row is flagged in `flag_rows`, or if any parallel-hand correlation has
/// exactly-zero data or a zero weight. If there are no parallel-hand
/// correlations, all correlations are checked for missing data or weights.
pub fn initialise_flags(
    data: ArrayView3<c64>,
    weights: ArrayView3<f64>,
    flags: ArrayView3<bool>,
    flag_rows: ArrayView1<bool>,
    corr_map: &CorrelationMap,
) -> Array2<i8> {
    let (num_rows, num_chans, num_corrs) = data.dim();
    assert_eq!(weights.dim(), data.dim());
    assert_eq!(flags.dim(), data.dim());
    assert_eq!(flag_rows.len(), num_rows);
    assert_eq!(corr_map.num_corrs(), num_corrs);

    let check_slots: Vec<usize> = if corr_map.parameterised().is_empty() {
        (0..num_corrs).collect()
    } else {
        corr_map.parameterised().iter().map(|p| p.gain_slot).collect()
    };

    let mut out = Array2::zeros((num_rows, num_chans));
    for (i_row, mut out) in out.outer_iter_mut().enumerate() {
        if flag_rows[i_row] {
            out.fill(1);
            continue;
        }

        for (i_chan, out) in out.iter_mut().enumerate() {
            let data = data.slice(s![i_row, i_chan, ..]);
            let weights = weights.slice(s![i_row, i_chan, ..]);
            let flagged = flags.slice(s![i_row, i_chan, ..]).iter().any(|&f| f);
            let missing = check_slots
                .iter()
                .any(|&i| data[i] == c64::default() || weights[i] == 0.0);
            if flagged || missing {
                *out = 1;
            }
        }
    }

    debug!(
        "Initialised flags: {}/{} samples flagged",
        out.iter().filter(|&&f| f != 0).count(),
        out.len()
    );
    out
}

/// Convert calibration flags back into per-correlation boolean flags, along
/// with row flags that are consistent with them. Temporary flags (-1) are
/// discarded. A row is flagged only if all of its samples are flagged.
pub fn finalise_flags(flags: ArrayView2<i8>, num_corrs: usize) -> (Array3<bool>, Array1<bool>) {
    let (num_rows, num_chans) = flags.dim();
    let mut out = Array3::from_elem((num_rows, num_chans, num_corrs), false);
    for (mut out, &flag) in out.lanes_mut(Axis(2)).into_iter().zip(flags.iter()) {
        out.fill(flag == 1);
    }
    let flag_rows = out
        .outer_iter()
        .map(|row| row.iter().all(|&f| f))
        .collect::<Array1<bool>>();
    (out, flag_rows)
}

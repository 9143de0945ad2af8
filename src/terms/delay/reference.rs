// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Average visibilities over the baselines formed with a reference antenna.

use indexmap::IndexMap;
use ndarray::{prelude::*, Zip};

use crate::c64;

/// Which end of a baseline the reference antenna is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaselineOrientation {
    /// The reference antenna is ANTENNA1 ("p").
    RefFirst,

    /// The reference antenna is ANTENNA2 ("q").
    RefSecond,
}

impl BaselineOrientation {
    /// The sign of a delay estimated from a baseline with this orientation. The
    /// phase of p relative to q is the negative of q relative to p.
    pub fn sign(self) -> f64 {
        match self {
            BaselineOrientation::RefFirst => -1.0,
            BaselineOrientation::RefSecond => 1.0,
        }
    }
}

/// Visibilities of one time bin, averaged per antenna over all baselines that
/// antenna forms with the reference antenna.
#[derive(Debug, Clone)]
pub struct ReferenceAverage {
    /// Dimensions are (antenna, channel, correlation). The reference
    /// antenna's own slot, and the slots of antennas without any unflagged
    /// reference baselines, are zero.
    pub vis: Array3<c64>,

    /// The number of unflagged samples that went into each (antenna, channel)
    /// average.
    pub counts: Array2<u32>,

    /// The orientation of the last reference baseline seen for each antenna,
    /// or `None` if the antenna didn't form a baseline with the reference
    /// antenna in this time bin.
    pub orientations: Vec<Option<BaselineOrientation>>,
}

impl ReferenceAverage {
    fn new(num_ants: usize, num_chans: usize, num_corrs: usize) -> ReferenceAverage {
        ReferenceAverage {
            vis: Array3::zeros((num_ants, num_chans, num_corrs)),
            counts: Array2::zeros((num_ants, num_chans)),
            orientations: vec![None; num_ants],
        }
    }
}

/// For each time bin present in `time_bins`, average the visibilities of each
/// antenna's baselines with `ref_ant`. Auto-correlations and baselines not
/// involving `ref_ant` are ignored, and flagged samples (non-zero flags) don't
/// contribute. Where no unflagged samples contribute, the average is zero.
///
/// The returned map is ordered by ascending time bin.
pub fn average_to_reference(
    data: ArrayView3<c64>,
    flags: ArrayView2<i8>,
    ant1: &[usize],
    ant2: &[usize],
    time_bins: &[usize],
    ref_ant: usize,
    num_ants: usize,
) -> IndexMap<usize, ReferenceAverage> {
    let (_, num_chans, num_corrs) = data.dim();
    let mut averages: IndexMap<usize, ReferenceAverage> = IndexMap::new();

    for (i_row, ((&a1, &a2), &time_bin)) in ant1.iter().zip(ant2).zip(time_bins).enumerate() {
        if a1 == a2 || (a1 != ref_ant && a2 != ref_ant) {
            continue;
        }
        let (other_ant, orientation) = if a1 == ref_ant {
            (a2, BaselineOrientation::RefFirst)
        } else {
            (a1, BaselineOrientation::RefSecond)
        };

        let average = averages
            .entry(time_bin)
            .or_insert_with(|| ReferenceAverage::new(num_ants, num_chans, num_corrs));
        average.orientations[other_ant] = Some(orientation);

        let mut vis = average.vis.index_axis_mut(Axis(0), other_ant);
        let mut counts = average.counts.index_axis_mut(Axis(0), other_ant);
        for (((mut vis, count), row_vis), &flag) in vis
            .outer_iter_mut()
            .zip(counts.iter_mut())
            .zip(data.index_axis(Axis(0), i_row).outer_iter())
            .zip(flags.index_axis(Axis(0), i_row).iter())
        {
            if flag == 0 {
                vis += &row_vis;
                *count += 1;
            }
        }
    }

    averages.sort_keys();
    for average in averages.values_mut() {
        Zip::from(average.vis.lanes_mut(Axis(2)))
            .and(&average.counts)
            .for_each(|mut vis, &count| {
                if count > 0 {
                    let count = count as f64;
                    vis.mapv_inplace(|v| v / count);
                }
            });
    }

    averages
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Some helper mathematics.


use crate::c64;

/// Complex exponential. The argument is assumed to be purely imaginary.
///
/// This function doesn't actually use complex numbers; it just returns the real
/// and imag components from Euler's formula (i.e. e^{ix} = cos{x} + i sin{x}).
///
/// # Examples
///
/// `assert_abs_diff_eq!(cexp(PI), c64::new(-1.0, 0.0));`
#[inline]
pub(crate) fn cexp(x: f64) -> c64 {
    let (im, re) = x.sin_cos();
    c64::new(re, im)
}

/// The antenna pairs of all cross-correlation baselines, ordered the way
/// measurement sets usually order them, i.e. (0, 1), (0, 2), ..., (1, 2), ...
/// If `include_autos` is true, each antenna's auto-correlation leads its
/// baselines.
pub(crate) fn baseline_pairs(num_ants: usize, include_autos: bool) -> Vec<(usize, usize)> {
    let offset = usize::from(!include_autos);
    (0..num_ants)
        .flat_map(|a1| (a1 + offset..num_ants).map(move |a2| (a1, a2)))
        .collect()
}

/// If the values are evenly spaced (to a relative tolerance of `1e-6` of the
/// first spacing), return the spacing. `None` is returned for fewer than two
/// values.
pub(crate) fn regular_spacing(values: &[f64]) -> Option<f64> {
    let spacing = match values {
        [first, second, ..] => second - first,
        _ => return None,
    };
    let tol = spacing.abs() * 1e-6;
    values
        .windows(2)
        .all(|w| ((w[1] - w[0]) - spacing).abs() <= tol)
        .then_some(spacing)
}

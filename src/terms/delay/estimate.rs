// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Estimate delays from the peak of zero-padded spectra transformed into the
//! delay domain.

use std::sync::Arc;

use log::{debug, warn};
use ndarray::prelude::*;
use rustfft::{Fft, FftPlanner};

use crate::{c64, constants::DEFAULT_FFT_LENGTH, context::CorrelationMap, math::regular_spacing};

/// Transforms spectra with a fixed channel layout into the delay domain.
///
/// Zero padding doesn't add any information, but it interpolates the transform
/// so that the peak can be located more finely than the inverse of the
/// bandwidth.
pub struct DelayEstimator {
    num_chans: usize,

    /// The length of the padded transform.
    fft_len: usize,

    /// The delay of each sample of the transform, after it has been shifted so
    /// that delays ascend \[seconds\].
    delays: Vec<f64>,

    /// `None` if there are too few channels to define a delay axis.
    fft: Option<Arc<dyn Fft<f64>>>,
}

impl std::fmt::Debug for DelayEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelayEstimator")
            .field("num_chans", &self.num_chans)
            .field("fft_len", &self.fft_len)
            .finish()
    }
}

impl DelayEstimator {
    /// The pad factor used when none is specified; it makes the transform at
    /// least [`DEFAULT_FFT_LENGTH`] samples long.
    pub fn default_pad_factor(num_chans: usize) -> usize {
        DEFAULT_FFT_LENGTH.div_ceil(num_chans.max(1))
    }

    /// `chan_freqs` must be regularly spaced; only the spacing of the first two
    /// channels is used.
    pub fn new(chan_freqs: &[f64], pad_factor: usize) -> DelayEstimator {
        let num_chans = chan_freqs.len();
        if num_chans < 2 {
            warn!("Can't estimate delays with {num_chans} channel(s); delays will be zero");
            return DelayEstimator {
                num_chans,
                fft_len: 0,
                delays: vec![],
                fft: None,
            };
        }

        let fft_len = num_chans * pad_factor.max(1);
        let delta_freq = chan_freqs[1] - chan_freqs[0];
        if regular_spacing(chan_freqs).is_none() {
            warn!("Channel frequencies are not evenly spaced; delays assume a spacing of {delta_freq} Hz");
        }
        let half = (fft_len / 2) as f64;
        let delays = (0..fft_len)
            .map(|i| (i as f64 - half) / (fft_len as f64 * delta_freq))
            .collect();
        let fft = FftPlanner::new().plan_fft_forward(fft_len);
        debug!(
            "Delay transform: {num_chans} channels, pad factor {pad_factor}, {fft_len} samples, resolution {:e} s",
            1.0 / (fft_len as f64 * delta_freq)
        );

        DelayEstimator {
            num_chans,
            fft_len,
            delays,
            fft: Some(fft),
        }
    }

    pub fn fft_len(&self) -> usize {
        self.fft_len
    }

    /// The spacing between delay samples \[seconds\]. Zero if no delays can be
    /// estimated.
    pub fn resolution(&self) -> f64 {
        match self.delays.as_slice() {
            [first, second, ..] => second - first,
            _ => 0.0,
        }
    }

    /// The delay axis of the shifted transform \[seconds\].
    pub fn delays(&self) -> &[f64] {
        &self.delays
    }

    /// Estimate a delay for each antenna and parameterised correlation. `vis`
    /// has dimensions (antenna, channel, correlation); the result has
    /// dimensions (antenna, parameterised correlation). An all-zero spectrum
    /// gives a delay of zero.
    pub fn estimate(&self, vis: ArrayView3<c64>, corr_map: &CorrelationMap) -> Array2<f64> {
        let param_corrs = corr_map.parameterised();
        let mut out = Array2::zeros((vis.len_of(Axis(0)), param_corrs.len()));
        let Some(fft) = &self.fft else {
            return out;
        };
        assert_eq!(vis.len_of(Axis(1)), self.num_chans);

        let mut buffer = vec![c64::default(); self.fft_len];
        let mut scratch = vec![c64::default(); fft.get_inplace_scratch_len()];
        for (ant_vis, mut out) in vis.outer_iter().zip(out.outer_iter_mut()) {
            for (p, out) in param_corrs.iter().zip(out.iter_mut()) {
                *out = self.peak_delay(
                    ant_vis.column(p.gain_slot),
                    fft.as_ref(),
                    &mut buffer,
                    &mut scratch,
                );
            }
        }
        out
    }

    fn peak_delay(
        &self,
        spectrum: ArrayView1<c64>,
        fft: &dyn Fft<f64>,
        buffer: &mut [c64],
        scratch: &mut [c64],
    ) -> f64 {
        buffer.fill(c64::default());
        for (b, &s) in buffer.iter_mut().zip(spectrum.iter()) {
            *b = s;
        }
        fft.process_with_scratch(buffer, scratch);

        // Walk the transform in shifted order so that the first of equal
        // peaks is the one with the most negative delay.
        let n = self.fft_len;
        let half = n / 2;
        let mut peak = 0.0;
        let mut i_peak = None;
        for i in 0..n {
            let mag = buffer[(i + n - half) % n].norm();
            if mag > peak {
                peak = mag;
                i_peak = Some(i);
            }
        }
        i_peak.map(|i| self.delays[i]).unwrap_or(0.0)
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! User-facing options for a gain term, and their parsed form.
//!
//! All booleans must have `#[serde(default)]` annotated, and anything that
//! isn't a boolean must be optional. This allows all options to be optional
//! *and* usable in an arguments file.

use std::num::NonZeroUsize;

use clap::Args;
use serde::{Deserialize, Serialize};

use super::{TermError, TermKind};
use crate::averaging::{parse_freq_interval, parse_time_interval, FreqInterval, TimeInterval};

const DEFAULT_TIME_INTERVAL: &str = "1";
const DEFAULT_FREQ_INTERVAL: &str = "0";

#[derive(Args, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TermOptions {
    /// The kind of gain term. Supported kinds: complex, delay. Default: delay
    #[clap(long, help_heading = "GAIN TERM")]
    pub kind: Option<TermKind>,

    /// The number of timesteps in each solution interval. Also supports a
    /// duration (e.g. 8s). If this is 0, then all timesteps share an interval.
    /// Default: 1
    #[clap(long, help_heading = "GAIN TERM")]
    pub time_interval: Option<String>,

    /// The number of channels in each parameter solution interval. Also
    /// supports a bandwidth (e.g. 2MHz). If this is 0, then all channels share
    /// an interval. Default: 0
    #[clap(long, help_heading = "GAIN TERM")]
    pub freq_interval: Option<String>,

    /// Don't estimate initial delays from the data; leave the gains at
    /// identity unless a prior is loaded.
    #[clap(long, help_heading = "GAIN TERM")]
    #[serde(default)]
    pub no_initial_estimate: bool,

    /// The factor by which spectra are zero padded before transforming them
    /// into the delay domain. Default: enough to make the transform 32768
    /// samples long.
    #[clap(long, help_heading = "GAIN TERM")]
    pub pad_factor: Option<NonZeroUsize>,
}

impl TermOptions {
    /// Merge two sets of options, preferring `self` where it is specified.
    pub fn merge(self, other: Self) -> Self {
        Self {
            kind: self.kind.or(other.kind),
            time_interval: self.time_interval.or(other.time_interval),
            freq_interval: self.freq_interval.or(other.freq_interval),
            no_initial_estimate: self.no_initial_estimate || other.no_initial_estimate,
            pad_factor: self.pad_factor.or(other.pad_factor),
        }
    }

    /// Make sense of the options.
    pub fn parse(self) -> Result<TermParams, TermError> {
        let TermOptions {
            kind,
            time_interval,
            freq_interval,
            no_initial_estimate,
            pad_factor,
        } = self;

        Ok(TermParams {
            kind: kind.unwrap_or(TermKind::Delay),
            time_interval: parse_time_interval(
                time_interval.as_deref().unwrap_or(DEFAULT_TIME_INTERVAL),
            )?,
            freq_interval: parse_freq_interval(
                freq_interval.as_deref().unwrap_or(DEFAULT_FREQ_INTERVAL),
            )?,
            initial_estimate: !no_initial_estimate,
            pad_factor,
        })
    }
}

/// Parsed [`TermOptions`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TermParams {
    pub kind: TermKind,
    pub time_interval: TimeInterval,
    pub freq_interval: FreqInterval,
    pub initial_estimate: bool,
    pub pad_factor: Option<NonZeroUsize>,
}

impl Default for TermParams {
    fn default() -> Self {
        TermParams {
            kind: TermKind::Delay,
            time_interval: TimeInterval::Timesteps(1),
            freq_interval: FreqInterval::Channels(0),
            initial_estimate: true,
            pad_factor: None,
        }
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Initial delay-term estimation and solution-interval mapping for
//! radio-interferometric gain calibration.
//!
//! Gains are laid out over solution intervals in time and frequency
//! ([`averaging`]), per correlation ([`context`]), and described by gain terms
//! ([`terms`]). The delay term bootstraps its delays from the data by
//! transforming reference-antenna baselines into the delay domain.

pub mod averaging;
mod cli;
pub mod constants;
pub mod context;
pub mod flagging;
pub(crate) mod math;
pub mod terms;
pub mod unit_parsing;
pub mod vis_simulate;

// Re-exports.
pub use cli::{Delaycal, DelayCalError};
pub use terms::{GainTerm, Term, TermKind, TermSolutions};

#[allow(non_camel_case_types)]
pub type c64 = num_complex::Complex64;

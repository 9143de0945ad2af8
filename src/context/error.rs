// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use super::Correlation;

#[derive(Error, Debug)]
pub enum CorrelationError {
    #[error("No correlation labels were supplied")]
    Empty,

    #[error("Unrecognised correlation label '{0}'")]
    Unknown(String),

    #[error("Correlation {0} appears more than once")]
    Duplicate(Correlation),
}

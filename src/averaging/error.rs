// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntervalError {
    #[error("The interval '{0}' is negative; this is not permitted")]
    Negative(String),

    #[error("The interval '{0}' has a unit but isn't positive; this is not permitted")]
    NotPositive(String),

    #[error("The interval '{0}' has no units and isn't an integer; this is not permitted")]
    NotInteger(String),

    #[error(transparent)]
    Parse(#[from] crate::unit_parsing::UnitParseError),
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Common error-handling support.
//!
//! Every micro-op in this crate returns a `Result<T, Status>` rather than
//! raising an exception: a failing op is a local, recoverable event, not a
//! fatal one. `Status` implements `Display` to produce the single-line
//! `PIM-Error: …` diagnostic the original simulator prints to standard
//! error; callers that want that behaviour can print the error themselves,
//! and the controller does so at the point of failure (see
//! [`crate::controller::SubarrayController`]).

use std::fmt;

/// The error taxonomy for the PIM subarray core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// A row or column index was `>=` the corresponding dimension.
    OutOfBounds {
        what: &'static str,
        index: usize,
        bound: usize,
        /// The label the donor simulator prints for `bound`: `"numRows"`
        /// for row-indexed accesses, `"numCols"` for column-indexed ones.
        dimension: &'static str,
    },
    /// A caller-supplied vector's length did not match the expected
    /// dimension.
    SizeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    /// `readMultiRows`/`writeMultiRows` was given a list whose shape is not
    /// valid for the requested operation (e.g. an even-sized majority list).
    InvalidShape { what: &'static str },
    /// A multi-row read was issued while the bitline capacitor model was
    /// armed from a prior APP op.
    UndefinedAfterApp,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::OutOfBounds {
                what,
                index,
                bound,
                dimension,
            } => write!(
                f,
                "PIM-Error: Out-of-boundary subarray {what}: index = {index}, {dimension} = {bound}"
            ),
            Status::SizeMismatch {
                what,
                expected,
                actual,
            } => write!(
                f,
                "PIM-Error: Size mismatch on {what}: expected = {expected}, actual = {actual}"
            ),
            Status::InvalidShape { what } => {
                write!(f, "PIM-Error: Invalid shape for {what}")
            }
            Status::UndefinedAfterApp => write!(
                f,
                "PIM-Error: Multi-row read is undefined while the bitline capacitor model is armed"
            ),
        }
    }
}

impl std::error::Error for Status {}

/// Shorthand used throughout the crate.
pub type Result<T> = std::result::Result<T, Status>;

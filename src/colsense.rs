// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Column sense amplifiers: a per-row 1-bit vector used only by the
//! column-oriented micro-ops. Unlike the row register file, this register
//! never interacts with the bitline capacitor model — that model is
//! defined in terms of row activations only.

use crate::error::{Result, Status};

/// A single 1-bit-per-row register, populated by `readCol` and drained by
/// `writeCol`.
#[derive(Debug, Clone)]
pub struct ColumnSenseAmps {
    bits: Vec<bool>,
}

impl ColumnSenseAmps {
    pub fn new(rows: usize) -> Self {
        ColumnSenseAmps {
            bits: vec![false; rows],
        }
    }

    pub fn get(&self) -> &[bool] {
        &self.bits
    }

    pub fn set_bits(&mut self, bits: &[bool]) -> Result<()> {
        if bits.len() != self.bits.len() {
            return Err(Status::SizeMismatch {
                what: "column sense amp write",
                expected: self.bits.len(),
                actual: bits.len(),
            });
        }
        self.bits.copy_from_slice(bits);
        Ok(())
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The raw `R x C` array of single-bit DRAM cells.
//!
//! `BitPlane` is deliberately naive: one `bool` per cell, stored row-major.
//! The component contracts are stated purely in terms of logical bit
//! values, so a future implementation is free to pack columns into machine
//! words; this one doesn't bother, since the subarrays this simulator
//! models are small enough that the naive representation is not a
//! bottleneck.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{Result, Status};

/// How a freshly constructed [`BitPlane`] should seed its cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitPolicy {
    /// Every cell starts at logical 0. The default.
    Zero,
    /// Every cell is drawn independently from a seeded PRNG, for
    /// reproducible randomized testing.
    Random(u64),
}

impl Default for InitPolicy {
    fn default() -> Self {
        InitPolicy::Zero
    }
}

/// A two-dimensional array of single-bit cells.
#[derive(Debug, Clone)]
pub struct BitPlane {
    rows: usize,
    cols: usize,
    cells: Vec<Vec<bool>>,
}

impl BitPlane {
    /// Builds a new plane of `rows` x `cols` cells, seeded per `policy`.
    pub fn new(rows: usize, cols: usize, policy: InitPolicy) -> Self {
        let cells = match policy {
            InitPolicy::Zero => vec![vec![false; cols]; rows],
            InitPolicy::Random(seed) => {
                let mut rng = StdRng::seed_from_u64(seed);
                (0..rows)
                    .map(|_| (0..cols).map(|_| rng.gen_bool(0.5)).collect())
                    .collect()
            }
        };
        BitPlane { rows, cols, cells }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    fn check_row(&self, row: usize, what: &'static str) -> Result<()> {
        if row >= self.rows {
            return Err(Status::OutOfBounds {
                what,
                index: row,
                bound: self.rows,
                dimension: "numRows",
            });
        }
        Ok(())
    }

    fn check_col(&self, col: usize, what: &'static str) -> Result<()> {
        if col >= self.cols {
            return Err(Status::OutOfBounds {
                what,
                index: col,
                bound: self.cols,
                dimension: "numCols",
            });
        }
        Ok(())
    }

    /// Like [`BitPlane::read`], but reports out-of-bounds indices under a
    /// caller-chosen label (e.g. `"multi-row read"` rather than `"row
    /// read"`).
    pub fn read_labeled(&self, row: usize, what: &'static str) -> Result<Vec<bool>> {
        self.check_row(row, what)?;
        Ok(self.cells[row].clone())
    }

    /// Returns a copy of row `row`.
    pub fn read(&self, row: usize) -> Result<Vec<bool>> {
        self.read_labeled(row, "row read")
    }

    /// Replaces row `row` with `bits`, which must be exactly `cols` long.
    pub fn write(&mut self, row: usize, bits: &[bool]) -> Result<()> {
        self.check_row(row, "row write")?;
        if bits.len() != self.cols {
            return Err(Status::SizeMismatch {
                what: "row write",
                expected: self.cols,
                actual: bits.len(),
            });
        }
        self.cells[row].copy_from_slice(bits);
        Ok(())
    }

    /// Returns a copy of column `col`, one bit per row.
    pub fn read_col(&self, col: usize) -> Result<Vec<bool>> {
        self.check_col(col, "column read")?;
        Ok(self.cells.iter().map(|row| row[col]).collect())
    }

    /// Replaces column `col` with `bits`, which must be exactly `rows` long.
    pub fn write_col(&mut self, col: usize, bits: &[bool]) -> Result<()> {
        self.check_col(col, "column write")?;
        if bits.len() != self.rows {
            return Err(Status::SizeMismatch {
                what: "column write",
                expected: self.rows,
                actual: bits.len(),
            });
        }
        for (row, &bit) in self.cells.iter_mut().zip(bits.iter()) {
            row[col] = bit;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_init_is_all_false() {
        let plane = BitPlane::new(4, 8, InitPolicy::Zero);
        for r in 0..4 {
            assert_eq!(plane.read(r).unwrap(), vec![false; 8]);
        }
    }

    #[test]
    fn random_init_is_reproducible() {
        let a = BitPlane::new(4, 8, InitPolicy::Random(42));
        let b = BitPlane::new(4, 8, InitPolicy::Random(42));
        for r in 0..4 {
            assert_eq!(a.read(r).unwrap(), b.read(r).unwrap());
        }
    }

    #[test]
    fn row_round_trip() {
        let mut plane = BitPlane::new(4, 8, InitPolicy::Zero);
        let bits = vec![true, false, true, false, true, false, true, false];
        plane.write(0, &bits).unwrap();
        assert_eq!(plane.read(0).unwrap(), bits);
    }

    #[test]
    fn out_of_bounds_row_read() {
        let plane = BitPlane::new(4, 8, InitPolicy::Zero);
        assert_eq!(
            plane.read(4),
            Err(Status::OutOfBounds {
                what: "row read",
                index: 4,
                bound: 4,
                dimension: "numRows",
            })
        );
    }

    #[test]
    fn size_mismatch_on_write() {
        let mut plane = BitPlane::new(4, 8, InitPolicy::Zero);
        assert_eq!(
            plane.write(0, &[true, false]),
            Err(Status::SizeMismatch {
                what: "row write",
                expected: 8,
                actual: 2
            })
        );
    }

    #[test]
    fn column_round_trip() {
        let mut plane = BitPlane::new(4, 8, InitPolicy::Zero);
        let bits = vec![true, false, true, false];
        plane.write_col(3, &bits).unwrap();
        assert_eq!(plane.read_col(3).unwrap(), bits);
    }
}

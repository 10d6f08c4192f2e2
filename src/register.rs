// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The row register file: the sense-amplifier register (`Sa`) plus a fixed
//! set of auxiliary 1-bit-per-column registers used by micro-ops to
//! synthesise bit-serial arithmetic.
//!
//! Registers are keyed by the [`RegisterName`] enum rather than a runtime
//! map, so there is no registration step and no possibility of an unknown
//! register name at runtime.

use serde::{Deserialize, Serialize};

use crate::error::{Result, Status};

/// Symbolic identity of a row register. `Sa` is the sense-amplifier
/// register that every `read_row`/`write_row` goes through; `R1..R8` are
/// auxiliary scratch registers used to synthesise bit-serial logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegisterName {
    Sa,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
    R8,
}

impl RegisterName {
    const ALL: [RegisterName; 9] = [
        RegisterName::Sa,
        RegisterName::R1,
        RegisterName::R2,
        RegisterName::R3,
        RegisterName::R4,
        RegisterName::R5,
        RegisterName::R6,
        RegisterName::R7,
        RegisterName::R8,
    ];

    fn index(self) -> usize {
        Self::ALL.iter().position(|&r| r == self).expect("RegisterName::ALL is exhaustive")
    }
}

const NUM_REGISTERS: usize = RegisterName::ALL.len();

/// The fixed set of named 1-bit-per-column registers.
#[derive(Debug, Clone)]
pub struct RowRegisterFile {
    cols: usize,
    regs: [Vec<bool>; NUM_REGISTERS],
}

impl RowRegisterFile {
    /// Builds a zero-initialized register file with `cols` bits per
    /// register.
    pub fn new(cols: usize) -> Self {
        RowRegisterFile {
            cols,
            regs: std::array::from_fn(|_| vec![false; cols]),
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the contents of `reg`.
    pub fn get(&self, reg: RegisterName) -> &[bool] {
        &self.regs[reg.index()]
    }

    /// Overwrites `reg` with `bits`, which must be exactly `cols` long.
    pub fn set_bits(&mut self, reg: RegisterName, bits: &[bool]) -> Result<()> {
        if bits.len() != self.cols {
            return Err(Status::SizeMismatch {
                what: "register write",
                expected: self.cols,
                actual: bits.len(),
            });
        }
        self.regs[reg.index()].copy_from_slice(bits);
        Ok(())
    }

    /// Broadcasts `val` across every column of `reg`.
    pub fn set(&mut self, reg: RegisterName, val: bool) {
        self.regs[reg.index()].iter_mut().for_each(|b| *b = val);
    }

    /// Copies `src` into `dst`.
    pub fn move_reg(&mut self, dst: RegisterName, src: RegisterName) {
        if dst == src {
            return;
        }
        let src_bits = self.regs[src.index()].clone();
        self.regs[dst.index()].copy_from_slice(&src_bits);
    }

    fn combine(&mut self, dst: RegisterName, a: RegisterName, b: RegisterName, f: impl Fn(bool, bool) -> bool) {
        let a_bits = self.regs[a.index()].clone();
        let b_bits = self.regs[b.index()].clone();
        let out = &mut self.regs[dst.index()];
        for c in 0..self.cols {
            out[c] = f(a_bits[c], b_bits[c]);
        }
    }

    /// `dst[c] = !(a[c] || b[c])`.
    pub fn nor(&mut self, dst: RegisterName, a: RegisterName, b: RegisterName) {
        self.combine(dst, a, b, |x, y| !(x || y));
    }

    /// `dst[c] = a[c] ^ b[c]`.
    pub fn xor(&mut self, dst: RegisterName, a: RegisterName, b: RegisterName) {
        self.combine(dst, a, b, |x, y| x ^ y);
    }

    /// `dst[c] = !(a[c] ^ b[c])`.
    pub fn xnor(&mut self, dst: RegisterName, a: RegisterName, b: RegisterName) {
        self.combine(dst, a, b, |x, y| !(x ^ y));
    }

    /// `dst[c] = a[c] && b[c]`.
    pub fn and(&mut self, dst: RegisterName, a: RegisterName, b: RegisterName) {
        self.combine(dst, a, b, |x, y| x && y);
    }

    /// `dst[c] = a[c] || b[c]`.
    pub fn or(&mut self, dst: RegisterName, a: RegisterName, b: RegisterName) {
        self.combine(dst, a, b, |x, y| x || y);
    }

    /// `dst[c] = if cond[c] { a[c] } else { b[c] }`.
    pub fn sel(&mut self, cond: RegisterName, a: RegisterName, b: RegisterName, dst: RegisterName) {
        let cond_bits = self.regs[cond.index()].clone();
        let a_bits = self.regs[a.index()].clone();
        let b_bits = self.regs[b.index()].clone();
        let out = &mut self.regs[dst.index()];
        for c in 0..self.cols {
            out[c] = if cond_bits[c] { a_bits[c] } else { b_bits[c] };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_broadcasts() {
        let mut regs = RowRegisterFile::new(4);
        regs.set(RegisterName::R1, true);
        assert_eq!(regs.get(RegisterName::R1), &[true, true, true, true]);
    }

    #[test]
    fn move_copies() {
        let mut regs = RowRegisterFile::new(4);
        regs.set_bits(RegisterName::Sa, &[true, false, true, false]).unwrap();
        regs.move_reg(RegisterName::R1, RegisterName::Sa);
        assert_eq!(regs.get(RegisterName::R1), regs.get(RegisterName::Sa));
    }

    #[test]
    fn nor_xor_and_or() {
        let mut regs = RowRegisterFile::new(2);
        regs.set_bits(RegisterName::R1, &[true, false]).unwrap();
        regs.set_bits(RegisterName::R2, &[true, true]).unwrap();
        regs.nor(RegisterName::R3, RegisterName::R1, RegisterName::R2);
        assert_eq!(regs.get(RegisterName::R3), &[false, false]);
        regs.xor(RegisterName::R4, RegisterName::R1, RegisterName::R2);
        assert_eq!(regs.get(RegisterName::R4), &[false, true]);
        regs.and(RegisterName::R5, RegisterName::R1, RegisterName::R2);
        assert_eq!(regs.get(RegisterName::R5), &[true, false]);
        regs.or(RegisterName::R6, RegisterName::R1, RegisterName::R2);
        assert_eq!(regs.get(RegisterName::R6), &[true, true]);
    }

    #[test]
    fn sel_chooses_per_column() {
        let mut regs = RowRegisterFile::new(3);
        regs.set_bits(RegisterName::Sa, &[true, false, true]).unwrap();
        regs.set_bits(RegisterName::R1, &[true, true, true]).unwrap();
        regs.set_bits(RegisterName::R2, &[false, false, false]).unwrap();
        regs.sel(RegisterName::Sa, RegisterName::R1, RegisterName::R2, RegisterName::R3);
        assert_eq!(regs.get(RegisterName::R3), &[true, false, true]);
    }
}

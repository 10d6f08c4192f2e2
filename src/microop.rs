// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The primitive micro-ops: the smallest units of work the subarray
//! understands. Everything the [`crate::controller::SubarrayController`]
//! exposes as a composite AP/AAP/APP operation is built by sequencing these.
//!
//! Every primitive here appends exactly one entry to the [`AccessLog`],
//! whether it succeeds or fails, and every primitive that touches
//! `BitPlane` interacts with the [`BitlineCapacitorModel`]'s `enabled` flag
//! according to the state-machine rules in the crate's top-level docs.

use serde::{Deserialize, Serialize};

use crate::accesslog::AccessLog;
use crate::bitplane::BitPlane;
use crate::capacitor::BitlineCapacitorModel;
use crate::colsense::ColumnSenseAmps;
use crate::error::{Result, Status};
use crate::register::{RegisterName, RowRegisterFile};

/// Boundary policy for `colGrpShiftR`/`colGrpShiftL`.
///
/// The source leaves this implementation-defined, relying on the data-type
/// layout carried by the caller's object; this crate makes the policy an
/// explicit parameter instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShiftPolicy {
    /// Shift the whole SA register, filling vacated columns with 0.
    ZeroFill,
    /// Shift independently within each fixed-width column group, wrapping
    /// around the group's own boundary.
    WrapWithin(usize),
}

impl Default for ShiftPolicy {
    fn default() -> Self {
        ShiftPolicy::ZeroFill
    }
}

fn negate(bits: &[bool], dcc: bool) -> Vec<bool> {
    if dcc {
        bits.iter().map(|b| !b).collect()
    } else {
        bits.to_vec()
    }
}

/// Executes the primitive micro-ops against a subarray's component state.
///
/// `MicroOpEngine` itself is stateless aside from its shift policy; all
/// mutable state lives in the `BitPlane`/`RowRegisterFile`/
/// `BitlineCapacitorModel`/`ColumnSenseAmps`/`AccessLog` references passed
/// into each call.
#[derive(Debug, Clone, Copy)]
pub struct MicroOpEngine {
    shift_policy: ShiftPolicy,
}

impl Default for MicroOpEngine {
    fn default() -> Self {
        MicroOpEngine {
            shift_policy: ShiftPolicy::default(),
        }
    }
}

impl MicroOpEngine {
    pub fn new(shift_policy: ShiftPolicy) -> Self {
        MicroOpEngine { shift_policy }
    }

    pub fn shift_policy(&self) -> ShiftPolicy {
        self.shift_policy
    }

    fn log_result<T>(log: &mut AccessLog, op: impl std::fmt::Display, result: &Result<T>) {
        match result {
            Ok(_) => log.record_ok(op),
            Err(e) => log.record_failed(op, e),
        }
    }

    /// `readRow(r, dcc)`. Copies row `r` into SA, applying DCC negation and
    /// any armed capacitor override, and clears the capacitor's `enabled`
    /// flag on success. A failing access leaves `enabled` untouched, per the
    /// out-of-bounds-is-a-pure-no-op contract.
    pub fn read_row(
        &self,
        plane: &BitPlane,
        regs: &mut RowRegisterFile,
        cap: &mut BitlineCapacitorModel,
        log: &mut AccessLog,
        row: usize,
        dcc: bool,
    ) -> Result<()> {
        let result = (|| {
            let raw = plane.read(row)?;
            let effective = negate(&raw, dcc);
            let final_bits = if cap.is_enabled() {
                cap.resolve(&effective)
            } else {
                effective
            };
            regs.set_bits(RegisterName::Sa, &final_bits)
        })();
        if result.is_ok() {
            cap.clear();
        }
        Self::log_result(log, format!("readRow({row}, dcc={dcc})"), &result);
        result
    }

    /// `writeRow(r, dcc)`. Copies SA into row `r`, applying DCC negation,
    /// and clears the capacitor's `enabled` flag on success, leaving it
    /// untouched on failure.
    pub fn write_row(
        &self,
        plane: &mut BitPlane,
        regs: &RowRegisterFile,
        cap: &mut BitlineCapacitorModel,
        log: &mut AccessLog,
        row: usize,
        dcc: bool,
    ) -> Result<()> {
        let effective = negate(regs.get(RegisterName::Sa), dcc);
        let result = plane.write(row, &effective);
        if result.is_ok() {
            cap.clear();
        }
        Self::log_result(log, format!("writeRow({row}, dcc={dcc})"), &result);
        result
    }

    /// `readCol(c)`. Populates the column sense amps from column `c`. Does
    /// not interact with the capacitor model.
    pub fn read_col(
        &self,
        plane: &BitPlane,
        csa: &mut ColumnSenseAmps,
        log: &mut AccessLog,
        col: usize,
    ) -> Result<()> {
        let result = plane.read_col(col).and_then(|bits| csa.set_bits(&bits));
        Self::log_result(log, format!("readCol({col})"), &result);
        result
    }

    /// `writeCol(c)`. Writes the column sense amps back into column `c`.
    pub fn write_col(
        &self,
        plane: &mut BitPlane,
        csa: &ColumnSenseAmps,
        log: &mut AccessLog,
        col: usize,
    ) -> Result<()> {
        let result = plane.write_col(col, csa.get());
        Self::log_result(log, format!("writeCol({col})"), &result);
        result
    }

    /// `readMultiRows(list)`. Computes the column-wise majority over an
    /// odd-sized list of `(row, dcc)` pairs, overwriting every listed row
    /// and SA with the result.
    pub fn read_multi_rows(
        &self,
        plane: &mut BitPlane,
        regs: &mut RowRegisterFile,
        cap: &mut BitlineCapacitorModel,
        log: &mut AccessLog,
        list: &[(usize, bool)],
    ) -> Result<()> {
        let result = self.read_multi_rows_inner(plane, regs, cap, list);
        Self::log_result(log, format!("readMultiRows({list:?})"), &result);
        result
    }

    fn read_multi_rows_inner(
        &self,
        plane: &mut BitPlane,
        regs: &mut RowRegisterFile,
        cap: &mut BitlineCapacitorModel,
        list: &[(usize, bool)],
    ) -> Result<()> {
        if list.is_empty() || list.len() % 2 == 0 {
            return Err(Status::InvalidShape {
                what: "readMultiRows (list must be odd-sized)",
            });
        }
        if list.len() > 1 && cap.is_enabled() {
            return Err(Status::UndefinedAfterApp);
        }

        let mut effective_rows = Vec::with_capacity(list.len());
        for &(row, dcc) in list {
            let raw = plane.read_labeled(row, "multi-row read")?;
            effective_rows.push(negate(&raw, dcc));
        }

        let cols = plane.cols();
        let mut majority = vec![false; cols];
        for c in 0..cols {
            let ones = effective_rows.iter().filter(|row| row[c]).count();
            majority[c] = ones * 2 > effective_rows.len();
        }

        // `majority` is in the "effective" (DCC-adjusted) domain shared by
        // the bitline; each row's own contact un-negates it back to that
        // row's physical storage domain on write-back, while SA observes
        // the effective value directly.
        let majority = if list.len() == 1 && cap.is_enabled() {
            cap.resolve(&majority)
        } else {
            cap.clear();
            majority
        };

        for &(row, dcc) in list {
            let physical = negate(&majority, dcc);
            plane.write(row, &physical)?;
        }
        regs.set_bits(RegisterName::Sa, &majority)?;
        Ok(())
    }

    /// `writeMultiRows(list)`. Validates every index before writing
    /// anything, then writes SA, optionally per-row negated, into every
    /// listed row. Clears the capacitor's `enabled` flag on success; an
    /// out-of-bounds index leaves both the plane and `enabled` untouched.
    pub fn write_multi_rows(
        &self,
        plane: &mut BitPlane,
        regs: &RowRegisterFile,
        cap: &mut BitlineCapacitorModel,
        log: &mut AccessLog,
        list: &[(usize, bool)],
    ) -> Result<()> {
        let result = (|| {
            for &(row, _dcc) in list {
                if row >= plane.rows() {
                    return Err(Status::OutOfBounds {
                        what: "row write",
                        index: row,
                        bound: plane.rows(),
                        dimension: "numRows",
                    });
                }
            }
            for &(row, dcc) in list {
                let effective = negate(regs.get(RegisterName::Sa), dcc);
                plane.write(row, &effective)?;
            }
            Ok(())
        })();
        if result.is_ok() {
            cap.clear();
        }
        Self::log_result(log, format!("writeMultiRows({list:?})"), &result);
        result
    }

    /// `APP_AP(r, dcc)`. One activate + one precharge of a single row: a
    /// functional refresh, and the building block inside `APP_GND`/`APP_VDD`.
    pub fn app_ap(
        &self,
        plane: &mut BitPlane,
        regs: &mut RowRegisterFile,
        cap: &mut BitlineCapacitorModel,
        log: &mut AccessLog,
        row: usize,
        dcc: bool,
    ) -> Result<()> {
        self.read_row(plane, regs, cap, log, row, dcc)?;
        self.write_row(plane, regs, cap, log, row, dcc)
    }

    /// `APP_GND(r, dcc)`. Refreshes row `r`, then arms the capacitor model
    /// so the next single-row read observes the logical OR with the
    /// refreshed row.
    pub fn app_gnd(
        &self,
        plane: &mut BitPlane,
        regs: &mut RowRegisterFile,
        cap: &mut BitlineCapacitorModel,
        log: &mut AccessLog,
        row: usize,
        dcc: bool,
    ) -> Result<()> {
        let result = self.app_ap(plane, regs, cap, log, row, dcc);
        if result.is_ok() {
            let refreshed = regs.get(RegisterName::Sa).to_vec();
            cap.arm_gnd(&refreshed);
        }
        Self::log_result(log, format!("APP_GND({row}, dcc={dcc})"), &result);
        result
    }

    /// `APP_VDD(r, dcc)`. Refreshes row `r`, then arms the capacitor model
    /// so the next single-row read observes the logical AND with the
    /// refreshed row.
    pub fn app_vdd(
        &self,
        plane: &mut BitPlane,
        regs: &mut RowRegisterFile,
        cap: &mut BitlineCapacitorModel,
        log: &mut AccessLog,
        row: usize,
        dcc: bool,
    ) -> Result<()> {
        let result = self.app_ap(plane, regs, cap, log, row, dcc);
        if result.is_ok() {
            let refreshed = regs.get(RegisterName::Sa).to_vec();
            cap.arm_vdd(&refreshed);
        }
        Self::log_result(log, format!("APP_VDD({row}, dcc={dcc})"), &result);
        result
    }

    /// `set(reg, bit)`. Broadcasts `bit` across `reg`.
    pub fn reg_set(&self, regs: &mut RowRegisterFile, log: &mut AccessLog, reg: RegisterName, bit: bool) {
        regs.set(reg, bit);
        log.record_ok(format!("set({reg:?}, {bit})"));
    }

    /// `move(dst, src)`.
    pub fn reg_move(
        &self,
        regs: &mut RowRegisterFile,
        log: &mut AccessLog,
        dst: RegisterName,
        src: RegisterName,
    ) {
        regs.move_reg(dst, src);
        log.record_ok(format!("move({dst:?}, {src:?})"));
    }

    /// `nor(dst, a, b)`.
    pub fn reg_nor(
        &self,
        regs: &mut RowRegisterFile,
        log: &mut AccessLog,
        dst: RegisterName,
        a: RegisterName,
        b: RegisterName,
    ) {
        regs.nor(dst, a, b);
        log.record_ok(format!("nor({dst:?}, {a:?}, {b:?})"));
    }

    /// `xor(dst, a, b)`.
    pub fn reg_xor(
        &self,
        regs: &mut RowRegisterFile,
        log: &mut AccessLog,
        dst: RegisterName,
        a: RegisterName,
        b: RegisterName,
    ) {
        regs.xor(dst, a, b);
        log.record_ok(format!("xor({dst:?}, {a:?}, {b:?})"));
    }

    /// `xnor(dst, a, b)`.
    pub fn reg_xnor(
        &self,
        regs: &mut RowRegisterFile,
        log: &mut AccessLog,
        dst: RegisterName,
        a: RegisterName,
        b: RegisterName,
    ) {
        regs.xnor(dst, a, b);
        log.record_ok(format!("xnor({dst:?}, {a:?}, {b:?})"));
    }

    /// `and(dst, a, b)`.
    pub fn reg_and(
        &self,
        regs: &mut RowRegisterFile,
        log: &mut AccessLog,
        dst: RegisterName,
        a: RegisterName,
        b: RegisterName,
    ) {
        regs.and(dst, a, b);
        log.record_ok(format!("and({dst:?}, {a:?}, {b:?})"));
    }

    /// `or(dst, a, b)`.
    pub fn reg_or(
        &self,
        regs: &mut RowRegisterFile,
        log: &mut AccessLog,
        dst: RegisterName,
        a: RegisterName,
        b: RegisterName,
    ) {
        regs.or(dst, a, b);
        log.record_ok(format!("or({dst:?}, {a:?}, {b:?})"));
    }

    /// `sel(cond, a, b, dst)`.
    pub fn reg_sel(
        &self,
        regs: &mut RowRegisterFile,
        log: &mut AccessLog,
        cond: RegisterName,
        a: RegisterName,
        b: RegisterName,
        dst: RegisterName,
    ) {
        regs.sel(cond, a, b, dst);
        log.record_ok(format!("sel({cond:?}, {a:?}, {b:?}, {dst:?})"));
    }

    /// `colGrpShiftR(n)`. Shifts SA right (towards higher column indices) by
    /// `n`, per this engine's [`ShiftPolicy`].
    pub fn col_grp_shift_r(&self, regs: &mut RowRegisterFile, log: &mut AccessLog, n: usize) {
        let src = regs.get(RegisterName::Sa).to_vec();
        let shifted = self.shift_right(&src, n);
        regs.set_bits(RegisterName::Sa, &shifted)
            .expect("shift preserves register width");
        log.record_ok(format!("colGrpShiftR({n})"));
    }

    /// `colGrpShiftL(n)`. Shifts SA left (towards lower column indices) by
    /// `n`, per this engine's [`ShiftPolicy`].
    pub fn col_grp_shift_l(&self, regs: &mut RowRegisterFile, log: &mut AccessLog, n: usize) {
        let src = regs.get(RegisterName::Sa).to_vec();
        let shifted = self.shift_left(&src, n);
        regs.set_bits(RegisterName::Sa, &shifted)
            .expect("shift preserves register width");
        log.record_ok(format!("colGrpShiftL({n})"));
    }

    fn shift_right(&self, src: &[bool], n: usize) -> Vec<bool> {
        match self.shift_policy {
            ShiftPolicy::ZeroFill => {
                let len = src.len();
                (0..len).map(|c| if c >= n { src[c - n] } else { false }).collect()
            }
            ShiftPolicy::WrapWithin(group_width) if group_width > 0 => {
                Self::shift_groups(src, group_width, |c, w| (c + w - (n % w)) % w)
            }
            ShiftPolicy::WrapWithin(_) => src.to_vec(),
        }
    }

    fn shift_left(&self, src: &[bool], n: usize) -> Vec<bool> {
        match self.shift_policy {
            ShiftPolicy::ZeroFill => {
                let len = src.len();
                (0..len)
                    .map(|c| if c + n < len { src[c + n] } else { false })
                    .collect()
            }
            ShiftPolicy::WrapWithin(group_width) if group_width > 0 => {
                Self::shift_groups(src, group_width, |c, w| (c + n) % w)
            }
            ShiftPolicy::WrapWithin(_) => src.to_vec(),
        }
    }

    fn shift_groups(src: &[bool], group_width: usize, src_index: impl Fn(usize, usize) -> usize) -> Vec<bool> {
        let mut out = vec![false; src.len()];
        for (g, chunk) in src.chunks(group_width).enumerate() {
            let base = g * group_width;
            let w = chunk.len();
            for c in 0..w {
                out[base + c] = chunk[src_index(c, w)];
            }
        }
        out
    }
}

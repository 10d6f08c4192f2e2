// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The subarray controller: owns every other component and exposes the
//! stable, public API that the (out-of-scope) device façade and the tests
//! in this crate drive.
//!
//! `SubarrayController` is also where the primitive micro-ops of
//! [`crate::microop`] are assembled into the composite `AP`/`AAP` timing
//! sequences SIMDRAM/BitSIMD programs actually issue.

use std::fmt::Write as _;

use crate::accesslog::AccessLog;
use crate::bitplane::{BitPlane, InitPolicy};
use crate::capacitor::BitlineCapacitorModel;
use crate::colsense::ColumnSenseAmps;
use crate::error::Result;
use crate::microop::{MicroOpEngine, ShiftPolicy};
use crate::register::{RegisterName, RowRegisterFile};

/// One subarray: bit-plane storage, its register file, column sense amps,
/// bitline capacitor model, access log, and the micro-op engine that drives
/// them all. This is the `Core` of the outward-facing device API.
#[derive(Debug, Clone)]
pub struct SubarrayController {
    plane: BitPlane,
    regs: RowRegisterFile,
    csa: ColumnSenseAmps,
    cap: BitlineCapacitorModel,
    log: AccessLog,
    engine: MicroOpEngine,
}

/// Alias matching the external-interface name used by callers of this
/// crate's core (`new(rows, cols) -> Core`, etc).
pub type Core = SubarrayController;

impl SubarrayController {
    /// Builds a zero-initialized `rows` x `cols` subarray with the default
    /// (zero-fill) shift policy.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::with_init_policy(rows, cols, InitPolicy::Zero)
    }

    /// Builds a subarray with an explicit cell-initialization policy.
    pub fn with_init_policy(rows: usize, cols: usize, policy: InitPolicy) -> Self {
        Self::build(rows, cols, policy, ShiftPolicy::default())
    }

    /// Builds a subarray with explicit initialization and column-group
    /// shift policies.
    pub fn with_policies(rows: usize, cols: usize, init: InitPolicy, shift: ShiftPolicy) -> Self {
        Self::build(rows, cols, init, shift)
    }

    fn build(rows: usize, cols: usize, init: InitPolicy, shift: ShiftPolicy) -> Self {
        SubarrayController {
            plane: BitPlane::new(rows, cols, init),
            regs: RowRegisterFile::new(cols),
            csa: ColumnSenseAmps::new(rows),
            cap: BitlineCapacitorModel::new(cols),
            log: AccessLog::new(),
            engine: MicroOpEngine::new(shift),
        }
    }

    pub fn rows(&self) -> usize {
        self.plane.rows()
    }

    pub fn cols(&self) -> usize {
        self.plane.cols()
    }

    /// Prints the `PIM-Error: …` diagnostic for a failed op to standard
    /// error, mirroring the donor kernel's `klog!` diagnostic macro.
    fn report<T>(&self, result: &Result<T>) {
        if let Err(status) = result {
            eprintln!("{status}");
        }
    }

    // ---- row/column primitives ----------------------------------------

    pub fn read_row(&mut self, row: usize, dcc: bool) -> Result<()> {
        let result = self
            .engine
            .read_row(&self.plane, &mut self.regs, &mut self.cap, &mut self.log, row, dcc);
        self.report(&result);
        result
    }

    pub fn write_row(&mut self, row: usize, dcc: bool) -> Result<()> {
        let result = self
            .engine
            .write_row(&mut self.plane, &self.regs, &mut self.cap, &mut self.log, row, dcc);
        self.report(&result);
        result
    }

    pub fn read_col(&mut self, col: usize) -> Result<()> {
        let result = self.engine.read_col(&self.plane, &mut self.csa, &mut self.log, col);
        self.report(&result);
        result
    }

    pub fn write_col(&mut self, col: usize) -> Result<()> {
        let result = self.engine.write_col(&mut self.plane, &self.csa, &mut self.log, col);
        self.report(&result);
        result
    }

    pub fn read_multi_rows(&mut self, list: &[(usize, bool)]) -> Result<()> {
        let result = self
            .engine
            .read_multi_rows(&mut self.plane, &mut self.regs, &mut self.cap, &mut self.log, list);
        self.report(&result);
        result
    }

    pub fn write_multi_rows(&mut self, list: &[(usize, bool)]) -> Result<()> {
        let result = self
            .engine
            .write_multi_rows(&mut self.plane, &self.regs, &mut self.cap, &mut self.log, list);
        self.report(&result);
        result
    }

    // ---- APP family ------------------------------------------------------

    pub fn app_ap(&mut self, row: usize, dcc: bool) -> Result<()> {
        let result = self
            .engine
            .app_ap(&mut self.plane, &mut self.regs, &mut self.cap, &mut self.log, row, dcc);
        self.report(&result);
        result
    }

    pub fn app_gnd(&mut self, row: usize, dcc: bool) -> Result<()> {
        let result = self
            .engine
            .app_gnd(&mut self.plane, &mut self.regs, &mut self.cap, &mut self.log, row, dcc);
        self.report(&result);
        result
    }

    pub fn app_vdd(&mut self, row: usize, dcc: bool) -> Result<()> {
        let result = self
            .engine
            .app_vdd(&mut self.plane, &mut self.regs, &mut self.cap, &mut self.log, row, dcc);
        self.report(&result);
        result
    }

    /// Whether the bitline capacitor model is currently armed.
    pub fn capacitor_armed(&self) -> bool {
        self.cap.is_enabled()
    }

    // ---- composite AP / AAP ----------------------------------------------

    /// `AP(r1, …, rk)`: activate k rows simultaneously, then precharge.
    pub fn ap(&mut self, rows: &[usize]) -> Result<()> {
        if rows.len() == 1 {
            return self.app_ap(rows[0], false);
        }
        let list: Vec<(usize, bool)> = rows.iter().map(|&r| (r, false)).collect();
        self.read_multi_rows(&list)?;
        self.write_multi_rows(&list)
    }

    /// `AAP(r1, …, rj; d1, …, dm)`: activate the source set, leaving SA
    /// equal to the source majority, then write SA into every destination
    /// row and precharge.
    pub fn aap(&mut self, sources: &[usize], dests: &[usize]) -> Result<()> {
        if sources.len() == 1 && dests.len() == 1 {
            self.read_row(sources[0], false)?;
            return self.write_row(dests[0], false);
        }
        if sources.len() == 1 {
            self.read_row(sources[0], false)?;
        } else {
            let src_list: Vec<(usize, bool)> = sources.iter().map(|&r| (r, false)).collect();
            self.read_multi_rows(&src_list)?;
        }
        let dest_list: Vec<(usize, bool)> = dests.iter().map(|&r| (r, false)).collect();
        self.write_multi_rows(&dest_list)
    }

    // ---- register-file ops -------------------------------------------------

    pub fn set_sa_row(&mut self, bits: &[bool]) -> Result<()> {
        let result = self.regs.set_bits(RegisterName::Sa, bits);
        match &result {
            Ok(_) => self.log.record_ok(format!("setSaRow({})", render_bits(bits))),
            Err(e) => self.log.record_failed("setSaRow", e),
        }
        self.report(&result);
        result
    }

    pub fn set_sa_col(&mut self, bits: &[bool]) -> Result<()> {
        let result = self.csa.set_bits(bits);
        match &result {
            Ok(_) => self.log.record_ok(format!("setSaCol({})", render_bits(bits))),
            Err(e) => self.log.record_failed("setSaCol", e),
        }
        self.report(&result);
        result
    }

    pub fn reg_set(&mut self, reg: RegisterName, bit: bool) {
        self.engine.reg_set(&mut self.regs, &mut self.log, reg, bit);
    }

    pub fn reg_move(&mut self, dst: RegisterName, src: RegisterName) {
        self.engine.reg_move(&mut self.regs, &mut self.log, dst, src);
    }

    pub fn reg_nor(&mut self, dst: RegisterName, a: RegisterName, b: RegisterName) {
        self.engine.reg_nor(&mut self.regs, &mut self.log, dst, a, b);
    }

    pub fn reg_xor(&mut self, dst: RegisterName, a: RegisterName, b: RegisterName) {
        self.engine.reg_xor(&mut self.regs, &mut self.log, dst, a, b);
    }

    pub fn reg_xnor(&mut self, dst: RegisterName, a: RegisterName, b: RegisterName) {
        self.engine.reg_xnor(&mut self.regs, &mut self.log, dst, a, b);
    }

    pub fn reg_and(&mut self, dst: RegisterName, a: RegisterName, b: RegisterName) {
        self.engine.reg_and(&mut self.regs, &mut self.log, dst, a, b);
    }

    pub fn reg_or(&mut self, dst: RegisterName, a: RegisterName, b: RegisterName) {
        self.engine.reg_or(&mut self.regs, &mut self.log, dst, a, b);
    }

    pub fn reg_sel(&mut self, cond: RegisterName, a: RegisterName, b: RegisterName, dst: RegisterName) {
        self.engine.reg_sel(&mut self.regs, &mut self.log, cond, a, b, dst);
    }

    pub fn col_grp_shift_r(&mut self, n: usize) {
        self.engine.col_grp_shift_r(&mut self.regs, &mut self.log, n);
    }

    pub fn col_grp_shift_l(&mut self, n: usize) {
        self.engine.col_grp_shift_l(&mut self.regs, &mut self.log, n);
    }

    // ---- inspection --------------------------------------------------------

    /// Reads the register `reg` without going through a micro-op (no log
    /// entry, cannot fail). Intended for tests and diagnostics.
    pub fn register(&self, reg: RegisterName) -> &[bool] {
        self.regs.get(reg)
    }

    /// Shorthand for `register(RegisterName::Sa)`.
    pub fn sa(&self) -> &[bool] {
        self.regs.get(RegisterName::Sa)
    }

    /// Reads a raw bit-plane row without going through SA or the capacitor
    /// model. Intended for tests and diagnostics.
    pub fn row(&self, row: usize) -> Result<Vec<bool>> {
        self.plane.read(row)
    }

    pub fn access_log(&self) -> &AccessLog {
        &self.log
    }

    pub fn print_access_log(&self) -> String {
        let mut out = String::new();
        out.push_str("\nRecorded Memory Accesses:\n");
        for entry in self.log.entries() {
            out.push_str(entry);
            out.push('\n');
        }
        out.push('\n');
        out
    }

    /// Renders the subarray contents in the stable dump format: one line
    /// per row (5-digit index, column-SA bit, row contents), bracketed by a
    /// `+`-every-8-columns header/footer rule, and a trailing `SA` line.
    pub fn print(&self) -> String {
        let cols = self.cols();
        let mut out = String::new();

        out.push_str("  Row S ");
        out.push_str(&rule(cols));
        out.push('\n');

        for row in 0..self.rows() {
            let bits = self.plane.read(row).expect("row index in range");
            let sa_bit = self.csa.get()[row];
            let _ = write!(out, "{row:>5} {} {}", bit_char(sa_bit), render_bits(&bits));
            out.push('\n');
        }

        out.push_str("        ");
        out.push_str(&rule(cols));
        out.push('\n');

        out.push_str("     SA ");
        out.push_str(&render_bits(self.sa()));
        out.push('\n');

        out
    }
}

fn rule(cols: usize) -> String {
    (0..cols).map(|c| if c % 8 == 0 { '+' } else { '-' }).collect()
}

fn bit_char(b: bool) -> char {
    if b {
        '1'
    } else {
        '0'
    }
}

fn render_bits(bits: &[bool]) -> String {
    bits.iter().map(|&b| bit_char(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(s: &str) -> Vec<bool> {
        s.chars().map(|c| c == '1').collect()
    }

    #[test]
    fn s1_read_after_write_row() {
        let mut core = SubarrayController::new(4, 8);
        core.set_sa_row(&bits("10101010")).unwrap();
        core.write_row(0, false).unwrap();
        core.set_sa_row(&bits("00000000")).unwrap();
        core.write_row(1, false).unwrap();
        core.read_row(0, false).unwrap();
        assert_eq!(core.sa(), bits("10101010"));
    }

    #[test]
    fn s2_or_via_app_gnd() {
        let mut core = SubarrayController::new(4, 8);
        core.set_sa_row(&bits("11001100")).unwrap();
        core.write_row(0, false).unwrap();
        core.set_sa_row(&bits("10101010")).unwrap();
        core.write_row(1, false).unwrap();
        core.app_gnd(0, false).unwrap();
        core.read_row(1, false).unwrap();
        assert_eq!(core.sa(), bits("11101110"));
    }

    #[test]
    fn s3_and_via_app_vdd() {
        let mut core = SubarrayController::new(4, 8);
        core.set_sa_row(&bits("11001100")).unwrap();
        core.write_row(0, false).unwrap();
        core.set_sa_row(&bits("10101010")).unwrap();
        core.write_row(1, false).unwrap();
        core.app_vdd(0, false).unwrap();
        core.read_row(1, false).unwrap();
        assert_eq!(core.sa(), bits("10001000"));
    }

    #[test]
    fn s4_majority_of_three() {
        let mut core = SubarrayController::new(4, 8);
        core.set_sa_row(&bits("10101010")).unwrap();
        core.write_row(0, false).unwrap();
        core.set_sa_row(&bits("11001100")).unwrap();
        core.write_row(1, false).unwrap();
        core.set_sa_row(&bits("11110000")).unwrap();
        core.write_row(2, false).unwrap();
        core.read_multi_rows(&[(0, false), (1, false), (2, false)]).unwrap();
        let expected = bits("11101000");
        assert_eq!(core.sa(), expected);
        assert_eq!(core.row(0).unwrap(), expected);
        assert_eq!(core.row(1).unwrap(), expected);
        assert_eq!(core.row(2).unwrap(), expected);
    }

    #[test]
    fn s5_even_count_multi_row_read_fails() {
        let mut core = SubarrayController::new(4, 8);
        let result = core.read_multi_rows(&[(0, false), (1, false)]);
        assert!(matches!(
            result,
            Err(crate::error::Status::InvalidShape { .. })
        ));
        assert_eq!(core.access_log().len(), 1);
        assert!(core.access_log().entries()[0].starts_with("Failed"));
    }

    #[test]
    fn ap_single_row_is_a_refresh() {
        let mut core = SubarrayController::new(4, 8);
        core.set_sa_row(&bits("11001100")).unwrap();
        core.write_row(0, false).unwrap();
        let before = core.row(0).unwrap();
        core.ap(&[0]).unwrap();
        assert_eq!(core.row(0).unwrap(), before);
    }

    #[test]
    fn aap_one_to_one_is_read_then_write() {
        let mut core = SubarrayController::new(4, 8);
        core.set_sa_row(&bits("11001100")).unwrap();
        core.write_row(0, false).unwrap();
        core.aap(&[0], &[1]).unwrap();
        assert_eq!(core.row(1).unwrap(), bits("11001100"));
    }

    #[test]
    fn aap_majority_to_multiple_destinations() {
        let mut core = SubarrayController::new(6, 4);
        core.set_sa_row(&bits("1010")).unwrap();
        core.write_row(0, false).unwrap();
        core.set_sa_row(&bits("1100")).unwrap();
        core.write_row(1, false).unwrap();
        core.set_sa_row(&bits("1111")).unwrap();
        core.write_row(2, false).unwrap();
        core.aap(&[0, 1, 2], &[3, 4]).unwrap();
        let expected = bits("1110");
        assert_eq!(core.row(3).unwrap(), expected);
        assert_eq!(core.row(4).unwrap(), expected);
    }

    #[test]
    fn out_of_bounds_is_a_pure_no_op() {
        let mut core = SubarrayController::new(4, 8);
        core.set_sa_row(&bits("11001100")).unwrap();
        core.write_row(0, false).unwrap();
        let before = core.row(0).unwrap();
        assert!(core.read_row(9, false).is_err());
        assert_eq!(core.row(0).unwrap(), before);
    }

    #[test]
    fn print_has_stable_header_and_sa_line() {
        let mut core = SubarrayController::new(2, 8);
        core.set_sa_row(&bits("10101010")).unwrap();
        core.write_row(0, false).unwrap();
        let dump = core.print();
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines[0], "  Row S +-------");
        assert!(lines[1].starts_with("    0 0 10101010"));
        assert_eq!(lines.last().unwrap(), &"     SA 10101010");
    }

    #[test]
    fn print_access_log_wraps_entries() {
        let mut core = SubarrayController::new(2, 4);
        core.set_sa_row(&bits("1010")).unwrap();
        core.write_row(0, false).unwrap();
        let rendered = core.print_access_log();
        assert!(rendered.contains("Recorded Memory Accesses:"));
        assert!(rendered.contains("setSaRow"));
        assert!(rendered.contains("writeRow"));
    }
}

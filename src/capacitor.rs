// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The bitline-capacitor model: the piece of state that makes SIMDRAM's APP
//! (activate-pseudo-precharge) trick work.
//!
//! A real activation drives a bitline fully to VDD or GND; a
//! *pseudo*-precharge only drives one of the two rails back to VDD_HALF,
//! leaving the other rail's charge in place. The next activation of a
//! *different* row is then dominated by that residual charge rather than by
//! the freshly activated cell, which is what makes the bitline settle to
//! the logical OR or AND of the two rows. This module is exactly that
//! residual-charge bookkeeping, decoupled from the row-activation logic
//! that drives it (see [`crate::microop`]).

/// Per-column residual charge state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapState {
    Gnd,
    VddHalf,
    Vdd,
}

/// Tracks residual bitline charge across an APP and the activation that
/// follows it.
#[derive(Debug, Clone)]
pub struct BitlineCapacitorModel {
    cap: Vec<CapState>,
    enabled: bool,
}

impl BitlineCapacitorModel {
    /// Every column starts at `VDD_HALF`, disarmed.
    pub fn new(cols: usize) -> Self {
        BitlineCapacitorModel {
            cap: vec![CapState::VddHalf; cols],
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Clears the armed state without touching the per-column charge. This
    /// is what every non-APP op that touches `BitPlane` does.
    pub fn clear(&mut self) {
        self.enabled = false;
    }

    /// Arms the model after an `APP_GND`: the refreshed row's 1-columns are
    /// left fully charged, its 0-columns released to half.
    pub fn arm_gnd(&mut self, refreshed: &[bool]) {
        for (c, &v) in refreshed.iter().enumerate() {
            self.cap[c] = if v { CapState::Vdd } else { CapState::VddHalf };
        }
        self.enabled = true;
    }

    /// Arms the model after an `APP_VDD`: the refreshed row's 0-columns are
    /// left fully discharged, its 1-columns released to half.
    pub fn arm_vdd(&mut self, refreshed: &[bool]) {
        for (c, &v) in refreshed.iter().enumerate() {
            self.cap[c] = if v { CapState::VddHalf } else { CapState::Gnd };
        }
        self.enabled = true;
    }

    /// Computes the bits a subsequent single-row activation observes while
    /// the model is armed, then disarms it. `effective` is the row being
    /// activated with any DCC negation already applied by the caller — a
    /// half-released column observes `effective` as-is, while a
    /// fully-charged/discharged column is dominated by the residual charge
    /// and ignores `effective` (and therefore `dcc`) entirely.
    pub fn resolve(&mut self, effective: &[bool]) -> Vec<bool> {
        let out = self
            .cap
            .iter()
            .zip(effective.iter())
            .map(|(&state, &v)| match state {
                CapState::VddHalf => v,
                CapState::Vdd => true,
                CapState::Gnd => false,
            })
            .collect();
        self.enabled = false;
        out
    }
}

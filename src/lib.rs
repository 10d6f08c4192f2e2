// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Functional PIM subarray core.
//!
//! This crate models one DRAM subarray configured for processing-in-memory
//! (PIM): a bit-plane array of cells, a row register file fed through a
//! sense amplifier, and the micro-ops that hardware like SIMDRAM/BitSIMD
//! issue against them to get logic and arithmetic out of plain DRAM
//! activation and precharge cycles.
//!
//! Currently, this is intended to run anywhere the host Rust toolchain
//! does, for testing and simulation purposes; it does not model timing,
//! only the functional result of each micro-op.
//!
//! # Algorithm Naivety Principles
//!
//! This implementation uses *really naive algorithms*. This is deliberate.
//! The intent is:
//!
//! 1. To use safe Rust for as much as possible.
//! 2. To use easily understood and debugged algorithms.
//! 3. To revisit these decisions if they become performance problems.
//!
//! Assumptions enabling our naivete:
//!
//! - Subarrays modeled here are small enough (at most a few thousand rows
//!   and columns) that a row-major `Vec<Vec<bool>>` is not a bottleneck.
//! - We are not attempting to model bitline timing or power, only the
//!   logical result of each activation.
//!
//! # Module map
//!
//! - [`bitplane`]: the raw cell array.
//! - [`register`]: the sense-amp register file (`Sa`, `R1..R8`).
//! - [`colsense`]: the column-oriented sense amp register.
//! - [`capacitor`]: the bitline residual-charge model behind `APP_GND`/`APP_VDD`.
//! - [`accesslog`]: the append-only micro-op trace.
//! - [`microop`]: the primitive micro-ops, built on the above.
//! - [`controller`]: [`controller::SubarrayController`] (aliased as [`Core`]), which
//!   assembles the primitives into the composite `AP`/`AAP` operations and
//!   owns all per-subarray state.
//! - [`error`]: the `Status`/`Result` error taxonomy shared by every op.

pub mod accesslog;
pub mod bitplane;
pub mod capacitor;
pub mod colsense;
pub mod controller;
pub mod error;
pub mod microop;
pub mod register;

pub use accesslog::AccessLog;
pub use bitplane::{BitPlane, InitPolicy};
pub use capacitor::{BitlineCapacitorModel, CapState};
pub use colsense::ColumnSenseAmps;
pub use controller::{Core, SubarrayController};
pub use error::{Result, Status};
pub use microop::{MicroOpEngine, ShiftPolicy};
pub use register::{RegisterName, RowRegisterFile};

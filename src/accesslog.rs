// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The access log: an append-only, human-readable trace of every micro-op
//! attempted against a subarray, whether it succeeded or failed.
//!
//! This plays the same structural role as the donor kernel's `ringbuf!`
//! instrumentation — a compact, always-on record of what happened, for
//! post-hoc inspection — but it does not dedupe repeated entries or wrap at
//! a fixed capacity the way a ring buffer does, since the spec calls for an
//! unbounded FIFO that preserves real-time causality exactly.

/// An ordered, append-only sequence of human-readable micro-op records.
#[derive(Debug, Clone, Default)]
pub struct AccessLog {
    entries: Vec<String>,
}

impl AccessLog {
    pub fn new() -> Self {
        AccessLog {
            entries: Vec::new(),
        }
    }

    /// Appends one entry. Called for every micro-op, successful or not.
    pub fn record(&mut self, entry: impl Into<String>) {
        self.entries.push(entry.into());
    }

    /// Records a successful micro-op.
    pub fn record_ok(&mut self, op: impl std::fmt::Display) {
        self.record(format!("{op}"));
    }

    /// Records a failed micro-op.
    pub fn record_failed(&mut self, op: impl std::fmt::Display, status: &crate::error::Status) {
        self.record(format!("Failed {op}: {status}"));
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the log as one record per line, in invocation order.
    pub fn render(&self) -> String {
        self.entries.join("\n")
    }
}

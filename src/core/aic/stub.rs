// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut

//! AIC stub: a degenerate interrupt aggregator.
//!
//! Where a board variant does not wire a full arbiter, this stub stands
//! in: it latches up to 32 request lines and drives a single output that
//! is the OR of all of them. No priorities, no vectoring, no registers.

/// Interrupt-OR stub with a single output line
#[derive(Debug, Default)]
pub struct AicStub {
    /// Raw input line levels
    line_state: u32,
}

impl AicStub {
    /// Create a stub with all lines low
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all lines
    pub fn reset(&mut self) {
        self.line_state = 0;
    }

    /// Record a logic-level transition on a line
    ///
    /// Returns the new output level.
    ///
    /// # Panics
    ///
    /// Panics if `line` is 32 or greater.
    pub fn post(&mut self, line: usize, level: bool) -> bool {
        assert!(line < 32, "interrupt line out of range: {}", line);

        self.line_state = (self.line_state & !(1 << line)) | ((level as u32) << line);
        log::trace!("aicstub: line {} -> {}, state=0x{:08X}", line, level as u32, self.line_state);

        self.output()
    }

    /// Current output level: high while any line is high
    #[inline(always)]
    pub fn output(&self) -> bool {
        self.line_state != 0
    }
}

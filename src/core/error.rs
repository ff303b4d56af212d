// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut

//! Error types for the emulator core.
//!
//! All fallible operations return [`Result<T>`], an alias for
//! `Result<T, EmulatorError>`.
//!
//! Every variant here is a *fatal* condition: the emulated firmware has
//! violated the hardware contract in a way the real chip leaves undefined
//! (bad register decode, interrupt stack overflow, illegal half-duplex
//! enable). There is no recovery path; the host is expected to stop the
//! simulation run and surface the diagnostic. Benign edge cases (spurious
//! vectoring, end-of-interrupt on an empty stack, disabling an already
//! disabled channel) are defined no-ops and never produce an error.

use thiserror::Error;

/// Errors that can occur during emulation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmulatorError {
    /// Read access decoded to no register of the component
    #[error("{component}: illegal read access at offset 0x{offset:03X}")]
    InvalidRegister {
        /// Component name (e.g. "at91.aic")
        component: &'static str,
        /// Offset relative to the component's register window
        offset: u32,
    },

    /// Write access decoded to no register of the component
    #[error("{component}: illegal write access at offset 0x{offset:03X} [value: 0x{value:08X}]")]
    InvalidRegisterWrite {
        /// Component name (e.g. "at91.pdc")
        component: &'static str,
        /// Offset relative to the component's register window
        offset: u32,
        /// Value the guest attempted to write
        value: u32,
    },

    /// Access with a width the component does not decode
    #[error("{component}: illegal access at offset 0x{offset:03X} with size 0x{size:02X}")]
    InvalidAccessSize {
        /// Component name
        component: &'static str,
        /// Offset relative to the component's register window
        offset: u32,
        /// Access width in bytes
        size: u32,
    },

    /// More nested interrupts than the hardware stack can hold
    #[error("at91.aic: too many nested interrupts (depth {depth})")]
    InterruptStackOverflow {
        /// Stack depth at the time of the rejected push
        depth: usize,
    },

    /// ISR read while no interrupt is in service
    #[error("at91.aic: read access to ISR while no interrupt is active")]
    NoActiveInterrupt,

    /// ISR read while the spurious placeholder is in service
    #[error("at91.aic: read access to ISR while handling spurious interrupt")]
    SpuriousInterruptActive,

    /// PTCR write enabling both directions of a half-duplex channel
    #[error("at91.pdc: cannot set both RXTEN and TXTEN on half-duplex device [value: 0x{value:08X}]")]
    HalfDuplexConflict {
        /// The offending PTCR value
        value: u32,
    },
}

/// Result type alias for emulator operations
pub type Result<T> = std::result::Result<T, EmulatorError>;

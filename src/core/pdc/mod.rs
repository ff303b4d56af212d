// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! AT91 Peripheral DMA Controller (PDC)
//!
//! The PDC is a generic double-buffered descriptor engine embedded in
//! every DMA-capable serial peripheral (USART, SPI, TWI, MCI, ...). Each
//! instance manages a receive and a transmit channel, each with a current
//! and a next buffer descriptor (pointer + count), so a transfer can roll
//! over into a staged buffer without CPU intervention.
//!
//! The PDC itself moves no bytes: byte timing is peripheral-specific, so
//! the owning peripheral implements [`ChannelOwner`] and the controller
//! calls back into it to start and stop its transfer machinery and to
//! recompute its interrupt state. Completion is reported through four
//! flag bits that live in the *peripheral's* status register; the
//! controller only knows their positions.
//!
//! ## Registers
//!
//! The register block occupies a fixed 40-byte window that peripherals
//! map at the tail of their own register file:
//!
//! ```text
//! Offset | Register | Access | Description
//! -------|----------|--------|----------------------------------
//! 0x100  | RPR      | R/W    | Receive pointer
//! 0x104  | RCR      | R/W    | Receive count (16 bit)
//! 0x108  | TPR      | R/W    | Transmit pointer
//! 0x10C  | TCR      | R/W    | Transmit count (16 bit)
//! 0x110  | RNPR     | R/W    | Receive next pointer
//! 0x114  | RNCR     | R/W    | Receive next count (16 bit)
//! 0x118  | TNPR     | R/W    | Transmit next pointer
//! 0x11C  | TNCR     | R/W    | Transmit next count (16 bit)
//! 0x120  | PTCR     | W      | Transfer control (enable/disable)
//! 0x124  | PTSR     | R      | Transfer status
//! ```
//!
//! A count of zero means the channel is idle or exhausted. Writing a
//! non-zero count to RCR/TCR while the direction is enabled starts a
//! transfer; writing zero stops it.
//!
//! ## Half duplex
//!
//! Peripherals that cannot receive and transmit at the same time (e.g.
//! the two-wire interface) use [`Pdc::set_register_hd`]: both directions
//! alias the same descriptor storage and PTCR enforces mutual exclusion
//! of RXTEN and TXTEN.

use bitflags::bitflags;

use crate::core::error::{EmulatorError, Result};

/// Register offsets within the PDC window
pub mod regs {
    /// First PDC offset (RPR)
    pub const PDC_START: u32 = 0x100;
    /// Last PDC offset (PTSR)
    pub const PDC_END: u32 = 0x124;

    /// Receive pointer register
    pub const RPR: u32 = 0x100;
    /// Receive counter register
    pub const RCR: u32 = 0x104;
    /// Transmit pointer register
    pub const TPR: u32 = 0x108;
    /// Transmit counter register
    pub const TCR: u32 = 0x10C;
    /// Receive next pointer register
    pub const RNPR: u32 = 0x110;
    /// Receive next counter register
    pub const RNCR: u32 = 0x114;
    /// Transmit next pointer register
    pub const TNPR: u32 = 0x118;
    /// Transmit next counter register
    pub const TNCR: u32 = 0x11C;
    /// Transfer control register (write-only)
    pub const PTCR: u32 = 0x120;
    /// Transfer status register (read-only)
    pub const PTSR: u32 = 0x124;
}

bitflags! {
    /// PTCR command bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PtcrCommand: u32 {
        /// Enable receiver transfer requests
        const RXTEN  = 1 << 0;
        /// Disable receiver transfer requests (wins over RXTEN)
        const RXTDIS = 1 << 1;
        /// Enable transmitter transfer requests
        const TXTEN  = 1 << 8;
        /// Disable transmitter transfer requests (wins over TXTEN)
        const TXTDIS = 1 << 9;
    }

    /// PTSR state bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ChannelEnable: u32 {
        /// Receiver transfer requests enabled
        const RXTEN = 1 << 0;
        /// Transmitter transfer requests enabled
        const TXTEN = 1 << 8;
    }
}

/// Positions of the four completion flags in the owner's status register
///
/// These are peripheral-specific (CSR for the USART, SR for the TWI, ...);
/// the controller sets and clears them through [`ChannelOwner::status_mut`].
#[derive(Debug, Clone, Copy)]
pub struct StatusFlags {
    /// End of receive: current receive buffer exhausted
    pub end_rx: u32,
    /// End of transmit: current transmit buffer exhausted
    pub end_tx: u32,
    /// Receive buffers full: current and next both exhausted
    pub rx_buff_full: u32,
    /// Transmit buffers empty: current and next both exhausted
    pub tx_buff_empty: u32,
}

/// Callback contract between the PDC and its owning peripheral
///
/// The controller borrows the owner only for the duration of a single
/// register-write call; nothing is retained. Start/stop notifications
/// are idempotent from the controller's point of view: an owner may be
/// asked to start a direction that is already running.
pub trait ChannelOwner {
    /// Begin (or continue) moving receive data into the current buffer
    fn start_rx(&mut self);

    /// Halt receive data movement
    fn stop_rx(&mut self);

    /// Begin (or continue) draining the current transmit buffer
    fn start_tx(&mut self);

    /// Halt transmit data movement
    fn stop_tx(&mut self);

    /// Recompute the peripheral's interrupt output from its status register
    fn update_irq(&mut self);

    /// Completion-flag bit positions in this peripheral's status register
    fn status_flags(&self) -> StatusFlags;

    /// The peripheral's status register
    fn status_mut(&mut self) -> &mut u32;
}

/// Transfer action resolved from a register write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdcAction {
    /// Pure configuration write, no transfer-state change
    None,
    /// PTCR write: both directions re-evaluated against the new state
    State,
    /// Receive transfer started (non-zero count while enabled)
    StartRx,
    /// Receive transfer stopped (zero count while enabled)
    StopRx,
    /// Transmit transfer started
    StartTx,
    /// Transmit transfer stopped
    StopTx,
}

/// One PDC channel pair (receive + transmit)
///
/// # Example
///
/// ```
/// use at91rx::core::pdc::{regs, ChannelOwner, Pdc, StatusFlags};
///
/// struct Owner { status: u32, running: bool }
///
/// impl ChannelOwner for Owner {
///     fn start_rx(&mut self) {}
///     fn stop_rx(&mut self) {}
///     fn start_tx(&mut self) { self.running = true; }
///     fn stop_tx(&mut self) { self.running = false; }
///     fn update_irq(&mut self) {}
///     fn status_flags(&self) -> StatusFlags {
///         StatusFlags { end_rx: 1 << 3, end_tx: 1 << 4, rx_buff_full: 1 << 8, tx_buff_empty: 1 << 9 }
///     }
///     fn status_mut(&mut self) -> &mut u32 { &mut self.status }
/// }
///
/// let mut pdc = Pdc::new();
/// let mut owner = Owner { status: 0, running: false };
///
/// pdc.set_register(&mut owner, regs::TPR, 0x2000_0000).unwrap();
/// pdc.set_register(&mut owner, regs::PTCR, 1 << 8).unwrap(); // TXTEN
/// pdc.set_register(&mut owner, regs::TCR, 64).unwrap();
/// assert!(owner.running);
/// ```
#[derive(Debug, Default)]
pub struct Pdc {
    /// PTSR: which directions currently accept transfer requests
    ptsr: ChannelEnable,

    /// Current and next receive descriptor
    rpr: u32,
    rcr: u16,
    rnpr: u32,
    rncr: u16,

    /// Current and next transmit descriptor
    tpr: u32,
    tcr: u16,
    tnpr: u32,
    tncr: u16,
}

impl Pdc {
    /// Create a channel pair with all descriptors cleared
    pub fn new() -> Self {
        Self::default()
    }

    /// Hardware reset: zero all descriptors and disable both directions
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// True if receiver transfer requests are enabled
    #[inline(always)]
    pub fn rx_enabled(&self) -> bool {
        self.ptsr.contains(ChannelEnable::RXTEN)
    }

    /// True if transmitter transfer requests are enabled
    #[inline(always)]
    pub fn tx_enabled(&self) -> bool {
        self.ptsr.contains(ChannelEnable::TXTEN)
    }

    /// Current receive descriptor (pointer, remaining count)
    pub fn rx_descriptor(&self) -> (u32, u16) {
        (self.rpr, self.rcr)
    }

    /// Current transmit descriptor (pointer, remaining count)
    pub fn tx_descriptor(&self) -> (u32, u16) {
        (self.tpr, self.tcr)
    }

    /// Read a register by window offset
    ///
    /// PTCR is write-only; reading it, or any offset outside the window,
    /// is a fatal decode error.
    pub fn read_register(&self, offset: u32) -> Result<u32> {
        match offset {
            regs::RPR => Ok(self.rpr),
            regs::RCR => Ok(self.rcr as u32),
            regs::TPR => Ok(self.tpr),
            regs::TCR => Ok(self.tcr as u32),
            regs::RNPR => Ok(self.rnpr),
            regs::RNCR => Ok(self.rncr as u32),
            regs::TNPR => Ok(self.tnpr),
            regs::TNCR => Ok(self.tncr as u32),
            regs::PTSR => Ok(self.ptsr.bits()),
            _ => Err(EmulatorError::InvalidRegister {
                component: "at91.pdc",
                offset,
            }),
        }
    }

    /// Write a register by window offset (full-duplex peripherals)
    ///
    /// Side effects within the call happen in this order: field mutation,
    /// transfer-action callback, completion-flag recomputation, and
    /// finally [`ChannelOwner::update_irq`]. Callbacks therefore observe
    /// the updated descriptor fields. Pure pointer and next-descriptor
    /// writes trigger no callbacks at all.
    pub fn set_register(
        &mut self,
        owner: &mut dyn ChannelOwner,
        offset: u32,
        value: u32,
    ) -> Result<PdcAction> {
        let action = self.apply_write(offset, value)?;
        self.finish_write(owner, offset, value, action);
        Ok(action)
    }

    /// Write a register by window offset (half-duplex peripherals)
    ///
    /// Receive and transmit aliases share one descriptor store, and PTCR
    /// enforces mutual exclusion: enabling one direction disables the
    /// other, disabling either disables both, and a command enabling both
    /// at once is a fatal configuration error.
    pub fn set_register_hd(
        &mut self,
        owner: &mut dyn ChannelOwner,
        offset: u32,
        value: u32,
    ) -> Result<PdcAction> {
        let action = self.apply_write_hd(offset, value)?;
        self.finish_write(owner, offset, value, action);
        Ok(action)
    }

    /// Consume `len` bytes of the current receive descriptor
    ///
    /// Called from the owner's transfer loop as data lands in memory.
    /// `len` must not exceed the remaining count.
    pub fn advance_rx(&mut self, len: u16) {
        self.rpr = self.rpr.wrapping_add(len as u32);
        self.rcr -= len;
    }

    /// Consume `len` bytes of the current transmit descriptor
    ///
    /// `len` must not exceed the remaining count.
    pub fn advance_tx(&mut self, len: u16) {
        self.tpr = self.tpr.wrapping_add(len as u32);
        self.tcr -= len;
    }

    /// Promote the next receive descriptor once the current is exhausted
    ///
    /// Returns true if the rollover happened (current count was zero and
    /// a next buffer was staged). The owner re-runs its transfer loop and
    /// then [`Pdc::recompute_rx_flags`] for the newly current buffer.
    pub fn rollover_rx(&mut self) -> bool {
        if self.rcr == 0 && self.rncr != 0 {
            self.rpr = self.rnpr;
            self.rnpr = 0;
            self.rcr = self.rncr;
            self.rncr = 0;

            log::trace!("pdc: rx rollover, {} bytes at 0x{:08X}", self.rcr, self.rpr);
            true
        } else {
            false
        }
    }

    /// Promote the next transmit descriptor once the current is exhausted
    pub fn rollover_tx(&mut self) -> bool {
        if self.tcr == 0 && self.tncr != 0 {
            self.tpr = self.tnpr;
            self.tnpr = 0;
            self.tcr = self.tncr;
            self.tncr = 0;

            log::trace!("pdc: tx rollover, {} bytes at 0x{:08X}", self.tcr, self.tpr);
            true
        } else {
            false
        }
    }

    /// Recompute the receive completion flags from the current counters
    ///
    /// Run by the generic write path, and again by the owner after its
    /// transfer loop drains the current descriptor.
    pub fn recompute_rx_flags(&self, owner: &mut dyn ChannelOwner) {
        let flags = owner.status_flags();

        if self.rx_enabled() && self.rcr == 0 {
            *owner.status_mut() |= flags.end_rx;

            if self.rncr == 0 {
                *owner.status_mut() |= flags.rx_buff_full;
            }
        }
    }

    /// Recompute the transmit completion flags from the current counters
    pub fn recompute_tx_flags(&self, owner: &mut dyn ChannelOwner) {
        let flags = owner.status_flags();

        if self.tx_enabled() && self.tcr == 0 {
            *owner.status_mut() |= flags.end_tx;

            if self.tncr == 0 {
                *owner.status_mut() |= flags.tx_buff_empty;
            }
        }
    }

    /// Field mutation and action resolution, full-duplex layout
    fn apply_write(&mut self, offset: u32, value: u32) -> Result<PdcAction> {
        match offset {
            regs::RPR => {
                self.rpr = value;
                Ok(PdcAction::None)
            }

            regs::RCR => {
                self.rcr = value as u16;

                if self.rx_enabled() {
                    Ok(if value != 0 { PdcAction::StartRx } else { PdcAction::StopRx })
                } else {
                    Ok(PdcAction::None)
                }
            }

            regs::TPR => {
                self.tpr = value;
                Ok(PdcAction::None)
            }

            regs::TCR => {
                self.tcr = value as u16;

                if self.tx_enabled() {
                    Ok(if value != 0 { PdcAction::StartTx } else { PdcAction::StopTx })
                } else {
                    Ok(PdcAction::None)
                }
            }

            regs::RNPR => {
                self.rnpr = value;
                Ok(PdcAction::None)
            }

            regs::RNCR => {
                self.rncr = value as u16;
                Ok(PdcAction::None)
            }

            regs::TNPR => {
                self.tnpr = value;
                Ok(PdcAction::None)
            }

            regs::TNCR => {
                self.tncr = value as u16;
                Ok(PdcAction::None)
            }

            regs::PTCR => {
                let cmd = PtcrCommand::from_bits_truncate(value);

                if cmd.contains(PtcrCommand::RXTEN) && !cmd.contains(PtcrCommand::RXTDIS) {
                    self.ptsr.insert(ChannelEnable::RXTEN);
                }
                if cmd.contains(PtcrCommand::RXTDIS) {
                    self.ptsr.remove(ChannelEnable::RXTEN);
                }
                if cmd.contains(PtcrCommand::TXTEN) && !cmd.contains(PtcrCommand::TXTDIS) {
                    self.ptsr.insert(ChannelEnable::TXTEN);
                }
                if cmd.contains(PtcrCommand::TXTDIS) {
                    self.ptsr.remove(ChannelEnable::TXTEN);
                }

                log::debug!("pdc: transfer state now {:?}", self.ptsr);
                Ok(PdcAction::State)
            }

            _ => Err(EmulatorError::InvalidRegisterWrite {
                component: "at91.pdc",
                offset,
                value,
            }),
        }
    }

    /// Field mutation and action resolution, half-duplex layout
    ///
    /// Both direction aliases write the same storage. Count writes
    /// resolve to the transmit action when the transmitter is enabled,
    /// else to the receive action.
    fn apply_write_hd(&mut self, offset: u32, value: u32) -> Result<PdcAction> {
        match offset {
            regs::RPR | regs::TPR => {
                self.rpr = value;
                self.tpr = value;
                Ok(PdcAction::None)
            }

            regs::RCR | regs::TCR => {
                self.rcr = value as u16;
                self.tcr = value as u16;

                if self.tx_enabled() {
                    Ok(if value != 0 { PdcAction::StartTx } else { PdcAction::StopTx })
                } else if self.rx_enabled() {
                    Ok(if value != 0 { PdcAction::StartRx } else { PdcAction::StopRx })
                } else {
                    Ok(PdcAction::None)
                }
            }

            regs::RNPR | regs::TNPR => {
                self.rnpr = value;
                self.tnpr = value;
                Ok(PdcAction::None)
            }

            regs::RNCR | regs::TNCR => {
                self.rncr = value as u16;
                self.tncr = value as u16;
                Ok(PdcAction::None)
            }

            regs::PTCR => {
                let cmd = PtcrCommand::from_bits_truncate(value);

                if cmd.contains(PtcrCommand::RXTEN) && cmd.contains(PtcrCommand::TXTEN) {
                    // forbidden on half-duplex peripherals
                    return Err(EmulatorError::HalfDuplexConflict { value });
                }

                if cmd.contains(PtcrCommand::RXTEN) && !cmd.contains(PtcrCommand::RXTDIS) {
                    // enabling the receiver disables the transmitter
                    self.ptsr = ChannelEnable::RXTEN;
                }
                if cmd.contains(PtcrCommand::RXTDIS) {
                    // disabling the receiver disables both directions
                    self.ptsr = ChannelEnable::empty();
                }
                if cmd.contains(PtcrCommand::TXTEN) && !cmd.contains(PtcrCommand::TXTDIS) {
                    // the transmitter only comes up while the receiver is down
                    if !self.rx_enabled() {
                        self.ptsr.insert(ChannelEnable::TXTEN);
                    }
                }
                if cmd.contains(PtcrCommand::TXTDIS) {
                    self.ptsr = ChannelEnable::empty();
                }

                log::debug!("pdc: half-duplex transfer state now {:?}", self.ptsr);
                Ok(PdcAction::State)
            }

            _ => Err(EmulatorError::InvalidRegisterWrite {
                component: "at91.pdc",
                offset,
                value,
            }),
        }
    }

    /// Callback dispatch and flag recomputation after a successful write
    fn finish_write(
        &mut self,
        owner: &mut dyn ChannelOwner,
        offset: u32,
        value: u32,
        action: PdcAction,
    ) {
        match action {
            PdcAction::None => {}

            PdcAction::State => {
                // re-evaluate both directions against the new enable state
                if self.rx_enabled() {
                    owner.start_rx();
                } else {
                    owner.stop_rx();
                }

                if self.tx_enabled() {
                    owner.start_tx();
                } else {
                    owner.stop_tx();
                }
            }

            PdcAction::StartRx => owner.start_rx(),
            PdcAction::StopRx => owner.stop_rx(),
            PdcAction::StartTx => owner.start_tx(),
            PdcAction::StopTx => owner.stop_tx(),
        }

        match offset {
            regs::RCR | regs::RNCR => {
                if value != 0 {
                    let flags = owner.status_flags();
                    *owner.status_mut() &= !(flags.end_rx | flags.rx_buff_full);
                }

                self.recompute_rx_flags(owner);
                owner.update_irq();
            }

            regs::TCR | regs::TNCR => {
                if value != 0 {
                    let flags = owner.status_flags();
                    *owner.status_mut() &= !(flags.end_tx | flags.tx_buff_empty);
                }

                self.recompute_tx_flags(owner);
                owner.update_irq();
            }

            regs::PTCR => owner.update_irq(),

            _ => {}
        }
    }
}

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

//! at91rx: an AT91 interrupt and DMA fabric emulator
//!
//! This crate emulates the two components at the heart of the AT91
//! system-on-chip's interrupt and data-movement fabric:
//!
//! - [`core::aic`]: the Advanced Interrupt Controller, which arbitrates
//!   32 interrupt sources by priority, tracks nested interrupts, and
//!   drives the CPU's nIRQ/nFIQ lines.
//! - [`core::pdc`]: the Peripheral DMA Controller, the double-buffered
//!   descriptor engine that serial peripherals (USART, SPI, TWI, MCI)
//!   embed to move data without CPU intervention.
//!
//! Peripheral register files, board assembly, and the CPU model are host
//! concerns; they drive these components through [`core::memory::IODevice`]
//! and the [`core::pdc::ChannelOwner`] callback contract.
//!
//! # Example
//!
//! ```
//! use at91rx::core::aic::{regs, Aic};
//!
//! let mut aic = Aic::new();
//!
//! // priority 6, vector 0x1000, enable source 1
//! aic.write_register(regs::SMR0 + 4, 6).unwrap();
//! aic.write_register(regs::SVR0 + 4, 0x1000).unwrap();
//! aic.write_register(regs::IECR, 1 << 1).unwrap();
//!
//! aic.post(1, true);
//! assert!(aic.irq_line());
//! # Ok::<(), at91rx::EmulatorError>(())
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`core::error::Result<T>`], an alias
//! for `Result<T, EmulatorError>`. Every error marks a fatal contract
//! violation by the emulated firmware; see [`core::error`] for the
//! taxonomy.

pub mod core;

// Re-export commonly used types
pub use core::error::{EmulatorError, Result};

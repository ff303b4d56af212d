// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut

//! Memory-mapped device abstraction.
//!
//! The bus that routes guest accesses lives with the board assembly, in
//! the host integration; this module only defines the [`IODevice`]
//! contract those accesses arrive through.

pub mod io_device;

pub use io_device::IODevice;

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

//! nv4-core: a cycle-level command-processing and rasterization core
//! for the NV4 (RIVA TNT) GPU.
//!
//! This crate emulates the chip's register-level behavior, not a full
//! graphics card: PCI config space, legacy VGA/CRTC text mode, VBIOS
//! loading, and outer system timing/audio/input are left to a host
//! emulator. What lives here is everything downstream of a 24-bit MMIO
//! aperture — the interrupt arbiter, the object-submission FIFO, RAMIN's
//! hash table and context storage, and the 13-class PGRAPH dispatcher
//! that ultimately drives the rasterizer.
//!
//! # Architecture
//!
//! - [`core::device`]: top-level wiring — owns every subsystem, decodes
//!   the MMIO aperture, and drains PFIFO into PGRAPH.
//! - [`core::mmio`]: the address-range table and the `IODevice` trait
//!   every subsystem implements.
//! - [`core::pmc`]: interrupt aggregation and subsystem enable gating.
//! - [`core::pbus`]: the real-mode-access (RMA) byte-wide backdoor.
//! - [`core::pfb`] / [`core::pextdev`]: memory configuration and straps.
//! - [`core::ptimer`] / [`core::pramdac`]: timer/alarm and display timing.
//! - [`core::ramin`]: RAMHT/RAMAU/RAMFC/RAMRO and grobj storage.
//! - [`core::pfifo`]: the two-cache object submission engine.
//! - [`core::pgraph`]: the 13-class method dispatcher and its rasterizer
//!   backend ([`core::rasterizer`]).
//! - [`core::pme`] / [`core::pvideo`]: interrupt-only stubs for
//!   subsystems whose data paths (mediaport MPEG, overlay scaling) are
//!   out of scope.
//!
//! # Example
//!
//! ```no_run
//! use nv4_core::core::config::DeviceConfig;
//! use nv4_core::core::device::Device;
//!
//! let mut device = Device::new(DeviceConfig::default())?;
//! device.write32(0x000200, 0xFFFF_FFFF); // PMC.ENABLE
//! device.step(1_000_000);
//! # Ok::<(), nv4_core::Nv4Error>(())
//! ```
//!
//! # Error Handling
//!
//! Fallible host-side operations (config loading, malformed register
//! offsets reached through a bug rather than guest behavior) return
//! [`core::error::Result<T>`], an alias for `Result<T, Nv4Error>`.
//! Protocol-level errors a real guest driver would see — a RAMHT hash
//! miss, a RAMRO runout entry, an asserted interrupt bit — are data,
//! not `Err`: they surface through [`core::pfifo::PullOutcome`] and the
//! subsystems' own register state, exactly as they would to guest code
//! polling real hardware.

pub mod core;

pub use core::error::{Nv4Error, Result};

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

//! Crate-wide error type.
//!
//! Protocol-level faults that real NV4 hardware reports to its driver
//! (reserved-method access, cache exhaustion, hash misses, ...) are
//! represented as data — RAMRO entries and interrupt bits — not as
//! `Nv4Error`. This type is reserved for host-side misuse: addressing
//! VRAM outside its configured size, malformed configuration, or a
//! register-map query for a completely unrecognized address.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Nv4Error {
    #[error("VRAM access out of bounds: offset 0x{offset:08X} exceeds installed size 0x{size:08X}")]
    VramOutOfBounds { offset: u32, size: u32 },

    #[error("RAMIN access out of bounds: offset 0x{offset:08X} exceeds RAMIN size 0x{size:08X}")]
    RaminOutOfBounds { offset: u32, size: u32 },

    #[error("register map has no entry for MMIO address 0x{address:06X}")]
    UnknownRegister { address: u32 },

    #[error("invalid pixel format code 0x{code:02X}")]
    InvalidPixelFormat { code: u8 },

    #[error("invalid class id 0x{class_id:02X}")]
    InvalidClassId { class_id: u8 },

    #[error("invalid device configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("failed to load configuration: {0}")]
    ConfigLoad(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Nv4Error>;

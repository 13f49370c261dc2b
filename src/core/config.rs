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

//! Device configuration: chip revision, VRAM size, straps.
//!
//! These are the knobs real NV4 board variants differed on. Everything
//! else (cache sizes, RAMHT/RAMRO/RAMFC partitioning) is derived from
//! [`ChipRevision`] rather than independently configurable.

use crate::core::error::{Nv4Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Silicon revision. Changes `PMC.BOOT` identity and CACHE1 depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChipRevision {
    A00,
    B00,
    C00,
}

impl ChipRevision {
    /// Value PMC.BOOT reads back as, per revision.
    pub fn boot_value(self) -> u32 {
        match self {
            ChipRevision::A00 => 0x00,
            ChipRevision::B00 => 0x10,
            ChipRevision::C00 => 0x20,
        }
    }

    /// CACHE1 depth in entries: 32 for rev A/B, 64 for rev C.
    pub fn cache1_size(self) -> usize {
        match self {
            ChipRevision::A00 | ChipRevision::B00 => 32,
            ChipRevision::C00 => 64,
        }
    }
}

impl Default for ChipRevision {
    fn default() -> Self {
        ChipRevision::C00
    }
}

/// Read-only strap bits PEXTDEV reports (bus type, RAM type, crystal, TV-out).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Straps {
    pub bus_type_agp: bool,
    pub ram_type_sgram: bool,
    pub crystal_alt: bool,
    pub tv_out_present: bool,
}

impl Default for Straps {
    fn default() -> Self {
        Self {
            bus_type_agp: true,
            ram_type_sgram: true,
            crystal_alt: false,
            tv_out_present: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub revision: ChipRevision,
    /// Installed VRAM size in bytes. Must be a power of two, 4 MiB..=16 MiB.
    pub vram_size: u32,
    pub straps: Straps,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            revision: ChipRevision::default(),
            vram_size: 16 * 1024 * 1024,
            straps: Straps::default(),
        }
    }
}

impl DeviceConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.vram_size.is_power_of_two() || !(4 * 1024 * 1024..=16 * 1024 * 1024).contains(&self.vram_size)
        {
            return Err(Nv4Error::InvalidConfig {
                reason: format!(
                    "vram_size 0x{:08X} must be a power of two in [4MiB, 16MiB]",
                    self.vram_size
                ),
            });
        }
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(DeviceConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_non_power_of_two_vram() {
        let mut cfg = DeviceConfig::default();
        cfg.vram_size = 5 * 1024 * 1024;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn revision_c00_has_64_slot_cache1() {
        assert_eq!(ChipRevision::C00.cache1_size(), 64);
        assert_eq!(ChipRevision::A00.cache1_size(), 32);
    }
}

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

//! PEXTDEV — straps.
//!
//! Read-only chip configuration bits sampled at reset time: bus type,
//! RAM type, crystal selection, TV-out presence. Entirely derived from
//! [`Straps`](crate::core::config::Straps); nothing here is writable.

use crate::core::config::Straps;
use crate::core::mmio::IODevice;

const REG_STRAPS: u32 = 0x000;

pub struct Pextdev {
    value: u32,
}

impl Pextdev {
    pub fn new(straps: Straps) -> Self {
        let mut value = 0u32;
        if straps.bus_type_agp {
            value |= 1 << 0;
        }
        if straps.ram_type_sgram {
            value |= 1 << 2;
        }
        if straps.crystal_alt {
            value |= 1 << 6;
        }
        if straps.tv_out_present {
            value |= 1 << 8;
        }
        Self { value }
    }
}

impl IODevice for Pextdev {
    fn read_register(&mut self, offset: u32) -> u32 {
        match offset & !0x3 {
            REG_STRAPS => self.value,
            _ => 0,
        }
    }

    fn write_register(&mut self, _offset: u32, _value: u32) {
        // entirely read-only
    }

    fn name(&self) -> &str {
        "PEXTDEV"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straps_are_read_only() {
        let mut pextdev = Pextdev::new(Straps::default());
        let before = pextdev.read_register(REG_STRAPS);
        pextdev.write_register(REG_STRAPS, 0);
        assert_eq!(pextdev.read_register(REG_STRAPS), before);
    }

    #[test]
    fn agp_bus_strap_bit_set() {
        let mut straps = Straps::default();
        straps.bus_type_agp = true;
        let mut pextdev = Pextdev::new(straps);
        assert_ne!(pextdev.read_register(REG_STRAPS) & 1, 0);
    }
}

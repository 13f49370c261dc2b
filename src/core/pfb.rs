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

//! PFB — framebuffer controller.
//!
//! Reports installed VRAM size and bank configuration and holds a pair
//! of hint registers (width/bpp) the driver uses to describe its
//! current mode; the device does not itself act on them (mode changes
//! are driven through PRAMDAC's CRT timing registers).

use crate::core::mmio::IODevice;

const REG_BOOT: u32 = 0x000;
const REG_CONFIG_0: u32 = 0x200;
const REG_DEBUG_0: u32 = 0x204;

/// Bank count encoding as reported by `PFB_BOOT`: 1, 2, or 4 banks.
fn bank_count_code(vram_size: u32) -> u32 {
    match vram_size {
        n if n <= 4 * 1024 * 1024 => 0,
        n if n <= 8 * 1024 * 1024 => 1,
        _ => 2,
    }
}

pub struct Pfb {
    vram_size: u32,
    config_0: u32,
    debug_0: u32,
}

impl Pfb {
    pub fn new(vram_size: u32) -> Self {
        Self {
            vram_size,
            config_0: 0,
            debug_0: 0,
        }
    }

    pub fn reset(&mut self) {
        self.config_0 = 0;
        self.debug_0 = 0;
    }

    pub fn vram_size(&self) -> u32 {
        self.vram_size
    }

    fn boot_value(&self) -> u32 {
        (bank_count_code(self.vram_size) << 4) | (self.vram_size.trailing_zeros())
    }
}

impl IODevice for Pfb {
    fn read_register(&mut self, offset: u32) -> u32 {
        match offset & !0x3 {
            REG_BOOT => self.boot_value(),
            REG_CONFIG_0 => self.config_0,
            REG_DEBUG_0 => self.debug_0,
            _ => 0,
        }
    }

    fn write_register(&mut self, offset: u32, value: u32) {
        match offset & !0x3 {
            REG_BOOT => {}
            REG_CONFIG_0 => self.config_0 = value,
            REG_DEBUG_0 => self.debug_0 = value,
            _ => log::trace!("PFB: write to reserved offset 0x{:03X}", offset),
        }
    }

    fn name(&self) -> &str {
        "PFB"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boot_reflects_vram_size() {
        let mut pfb = Pfb::new(16 * 1024 * 1024);
        assert_eq!(bank_count_code(pfb.vram_size()), 2);
        assert_ne!(pfb.read_register(REG_BOOT), 0);
    }

    #[test]
    fn config_register_is_read_write() {
        let mut pfb = Pfb::new(8 * 1024 * 1024);
        pfb.write_register(REG_CONFIG_0, 0x1234);
        assert_eq!(pfb.read_register(REG_CONFIG_0), 0x1234);
    }
}

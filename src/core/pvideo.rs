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

//! PVIDEO — video overlay interrupt surface.
//!
//! The overlay scaler itself is out of scope; this is only a
//! pending/enable pair so PMC's nine-subsystem aggregation has a real
//! bit for PVIDEO instead of a hardcoded zero.

use crate::core::mmio::IODevice;
use crate::core::pmc::InterruptSource;

const REG_INTR: u32 = 0x100;
const REG_INTR_EN: u32 = 0x140;

#[derive(Default)]
pub struct Pvideo {
    intr: u32,
    intr_en: u32,
}

impl Pvideo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl InterruptSource for Pvideo {
    fn pending(&self) -> u32 {
        self.intr
    }
    fn enable(&self) -> u32 {
        self.intr_en
    }
}

impl IODevice for Pvideo {
    fn read_register(&mut self, offset: u32) -> u32 {
        match offset & !0x3 {
            REG_INTR => self.intr,
            REG_INTR_EN => self.intr_en,
            _ => 0,
        }
    }

    fn write_register(&mut self, offset: u32, value: u32) {
        match offset & !0x3 {
            REG_INTR => self.intr &= !value,
            REG_INTR_EN => self.intr_en = value,
            _ => log::trace!("PVIDEO: write to reserved offset 0x{:03X}", offset),
        }
    }

    fn name(&self) -> &str {
        "PVIDEO"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_1_to_clear() {
        let mut pvideo = Pvideo::new();
        pvideo.intr = 1;
        pvideo.write_register(REG_INTR, 1);
        assert_eq!(pvideo.pending(), 0);
    }

    #[test]
    fn not_asserting_when_disabled() {
        let pvideo = Pvideo::new();
        assert!(!pvideo.is_asserting());
    }
}

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

//! PTIMER — 64-bit nanosecond counter.
//!
//! ## Register layout
//!
//! ```text
//! 0x000: INTR      interrupt pending (bit 0 = ALARM), write-1-to-clear
//! 0x140: INTR_EN    interrupt enable
//! 0x200: NUMERATOR
//! 0x210: DENOMINATOR
//! 0x400: TIME_LO    low 32 bits of the 64-bit ns counter
//! 0x410: TIME_HI    high 32 bits
//! 0x420: ALARM      alarm comparison value (low 32 bits of the ns counter)
//! ```
//!
//! Each external wall-clock tick of `delta_ns` advances the counter by
//! `delta_ns * numerator / denominator`. If `alarm` is nonzero and the
//! counter crosses it during that advance, `ALARM` fires.

use crate::core::mmio::IODevice;
use crate::core::pmc::InterruptSource;

const REG_INTR: u32 = 0x000;
const REG_INTR_EN: u32 = 0x140;
const REG_NUMERATOR: u32 = 0x200;
const REG_DENOMINATOR: u32 = 0x210;
const REG_TIME_LO: u32 = 0x400;
const REG_TIME_HI: u32 = 0x410;
const REG_ALARM: u32 = 0x420;

pub const INTR_ALARM: u32 = 1 << 0;

pub struct Ptimer {
    time_ns: u64,
    numerator: u32,
    denominator: u32,
    alarm: u32,
    interrupt_status: u32,
    interrupt_enable: u32,
}

impl Ptimer {
    pub fn new() -> Self {
        Self {
            time_ns: 0,
            numerator: 1,
            denominator: 1,
            alarm: 0,
            interrupt_status: 0,
            interrupt_enable: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn time_ns(&self) -> u64 {
        self.time_ns
    }

    /// Advance the counter by `delta_ns * numerator / denominator`,
    /// firing `ALARM` if the counter crosses a nonzero alarm value.
    pub fn tick(&mut self, delta_ns: u64) {
        if self.denominator == 0 {
            return;
        }
        let scaled = (delta_ns as u128 * self.numerator as u128) / self.denominator as u128;
        let before = self.time_ns;
        self.time_ns = self.time_ns.wrapping_add(scaled as u64);

        if self.alarm != 0 {
            let alarm = self.alarm as u64;
            let crossed = if self.time_ns >= before {
                before < alarm && self.time_ns >= alarm
            } else {
                // wrapped
                true
            };
            if crossed {
                self.interrupt_status |= INTR_ALARM;
            }
        }
    }
}

impl Default for Ptimer {
    fn default() -> Self {
        Self::new()
    }
}

impl InterruptSource for Ptimer {
    fn pending(&self) -> u32 {
        self.interrupt_status
    }
    fn enable(&self) -> u32 {
        self.interrupt_enable
    }
}

impl IODevice for Ptimer {
    fn read_register(&mut self, offset: u32) -> u32 {
        match offset & !0x3 {
            REG_INTR => self.interrupt_status,
            REG_INTR_EN => self.interrupt_enable,
            REG_NUMERATOR => self.numerator,
            REG_DENOMINATOR => self.denominator,
            REG_TIME_LO => self.time_ns as u32,
            REG_TIME_HI => (self.time_ns >> 32) as u32,
            REG_ALARM => self.alarm,
            _ => 0,
        }
    }

    fn write_register(&mut self, offset: u32, value: u32) {
        match offset & !0x3 {
            REG_INTR => self.interrupt_status &= !value,
            REG_INTR_EN => self.interrupt_enable = value,
            REG_NUMERATOR => self.numerator = value,
            REG_DENOMINATOR => self.denominator = value,
            REG_TIME_LO => self.time_ns = (self.time_ns & 0xFFFF_FFFF_0000_0000) | value as u64,
            REG_TIME_HI => {
                self.time_ns = (self.time_ns & 0x0000_0000_FFFF_FFFF) | ((value as u64) << 32)
            }
            REG_ALARM => self.alarm = value,
            _ => log::trace!("PTIMER: write to reserved offset 0x{:03X}", offset),
        }
    }

    fn name(&self) -> &str {
        "PTIMER"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_scales_by_rational_factor() {
        let mut timer = Ptimer::new();
        timer.write_register(REG_NUMERATOR, 2);
        timer.write_register(REG_DENOMINATOR, 1);
        timer.tick(1000);
        assert_eq!(timer.time_ns(), 2000);
    }

    #[test]
    fn alarm_fires_on_crossing() {
        let mut timer = Ptimer::new();
        timer.write_register(REG_ALARM, 1500);
        timer.tick(1000);
        assert_eq!(timer.pending() & INTR_ALARM, 0);
        timer.tick(1000);
        assert_ne!(timer.pending() & INTR_ALARM, 0);
    }

    #[test]
    fn write_1_to_clear_alarm() {
        let mut timer = Ptimer::new();
        timer.write_register(REG_ALARM, 100);
        timer.tick(200);
        assert_ne!(timer.pending() & INTR_ALARM, 0);
        timer.write_register(REG_INTR, INTR_ALARM);
        assert_eq!(timer.pending() & INTR_ALARM, 0);
    }

    #[test]
    fn time_hi_lo_round_trip() {
        let mut timer = Ptimer::new();
        timer.write_register(REG_TIME_LO, 0x1234_5678);
        timer.write_register(REG_TIME_HI, 0x0000_0001);
        assert_eq!(timer.time_ns(), 0x0000_0001_1234_5678);
    }
}

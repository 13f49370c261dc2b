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

//! `Device` — top-level wiring. Owns every subsystem directly (no
//! `Rc<RefCell<_>>`: NV4's single-threaded cooperative model has none
//! of PSX's GPU/DMA/CDROM cross-referencing, so plain ownership and
//! `&mut self` borrows are enough), decodes the 24-bit MMIO aperture
//! per [`mmio::decode`], and drives the push → pull → dispatch data
//! flow between PFIFO and PGRAPH.

use crate::core::config::DeviceConfig;
use crate::core::error::Result;
use crate::core::mmio::{self, IODevice, MmioRange};
use crate::core::pbus::Pbus;
use crate::core::pextdev::Pextdev;
use crate::core::pfb::Pfb;
use crate::core::pfifo::{Pfifo, PullOutcome};
use crate::core::pgraph::Pgraph;
use crate::core::pmc::{intr0_bits, InterruptSource, Pmc};
use crate::core::pme::Pme;
use crate::core::pramdac::Pramdac;
use crate::core::ptimer::Ptimer;
use crate::core::pvideo::Pvideo;
use crate::core::ramin::{RamInLayout, Ramin, RamhtContext};

const BASE_PMC: u32 = 0x000000;
const BASE_PBUS: u32 = 0x001000;
const BASE_PFIFO: u32 = 0x002000;
const BASE_PTIMER: u32 = 0x009000;
const BASE_PFB: u32 = 0x100000;
const BASE_PEXTDEV: u32 = 0x101000;
const BASE_PME: u32 = 0x200000;
const BASE_PGRAPH: u32 = 0x400000;
const BASE_PVIDEO: u32 = 0x680000;
const BASE_PNVM: u32 = 0x1000000;
const BASE_RAMIN: u32 = 0x1C00000;

pub struct Device {
    pub config: DeviceConfig,
    vram: Vec<u8>,
    pub pmc: Pmc,
    pub pbus: Pbus,
    pub pfb: Pfb,
    pub pextdev: Pextdev,
    pub ptimer: Ptimer,
    pub pramdac: Pramdac,
    pub ramin: Ramin,
    pub pfifo: Pfifo,
    pub pgraph: Pgraph,
    pub pme: Pme,
    pub pvideo: Pvideo,
}

impl Device {
    pub fn new(config: DeviceConfig) -> Result<Self> {
        config.validate()?;
        let cache1_size = config.revision.cache1_size() as u8;
        Ok(Self {
            pmc: Pmc::new(config.revision.boot_value()),
            pbus: Pbus::new(),
            pfb: Pfb::new(config.vram_size),
            pextdev: Pextdev::new(config.straps),
            ptimer: Ptimer::new(),
            pramdac: Pramdac::new(),
            ramin: Ramin::new(RamInLayout::default()),
            pfifo: Pfifo::new(cache1_size),
            pgraph: Pgraph::new(),
            pme: Pme::new(),
            pvideo: Pvideo::new(),
            vram: vec![0u8; config.vram_size as usize],
            config,
        })
    }

    /// Reset every subsystem to its power-on state. VRAM contents are
    /// not cleared (real hardware doesn't scrub RAM on reset either).
    pub fn reset(&mut self) {
        self.pmc.reset(self.config.revision.boot_value());
        self.pbus.reset();
        self.pfb.reset();
        self.ptimer.reset();
        self.pramdac.reset();
        self.ramin.reset();
        self.pfifo.reset();
        self.pgraph.reset();
        self.pme.reset();
        self.pvideo.reset();
        log::info!("Device: reset complete ({:?})", self.config.revision);
    }

    pub fn vram(&self) -> &[u8] {
        &self.vram
    }

    pub fn display_size(&self) -> crate::core::pramdac::DisplaySize {
        self.pramdac.display_size()
    }

    fn range_base(range: MmioRange) -> u32 {
        match range {
            MmioRange::Pmc => BASE_PMC,
            MmioRange::Pbus => BASE_PBUS,
            MmioRange::Pfifo => BASE_PFIFO,
            MmioRange::Ptimer => BASE_PTIMER,
            MmioRange::Pfb => BASE_PFB,
            MmioRange::Pextdev => BASE_PEXTDEV,
            MmioRange::Pme => BASE_PME,
            MmioRange::Pgraph => BASE_PGRAPH,
            MmioRange::Pvideo => BASE_PVIDEO,
            MmioRange::Pnvm => BASE_PNVM,
            MmioRange::Ramin => BASE_RAMIN,
            _ => 0,
        }
    }

    /// 32-bit MMIO read. `address` is the full 24-bit aperture offset.
    pub fn read32(&mut self, address: u32) -> u32 {
        let range = mmio::decode(address);
        let offset = (address & 0x00FF_FFFF).wrapping_sub(Self::range_base(range));
        match range {
            MmioRange::Pmc => self.pmc.read_register(offset),
            MmioRange::Pbus => self.pbus.read_register(offset),
            MmioRange::Pfifo => self.pfifo.read_register(offset),
            MmioRange::Ptimer => self.ptimer.read_register(offset),
            MmioRange::Pfb => self.pfb.read_register(offset),
            MmioRange::Pextdev => self.pextdev.read_register(offset),
            MmioRange::Pme => self.pme.read_register(offset),
            MmioRange::Pgraph => self.pgraph.read_register(offset),
            MmioRange::Pvideo => self.pvideo.read_register(offset),
            MmioRange::Pnvm => self.read_vram_u32(offset),
            MmioRange::Ramin => self.read_ramin_u32(offset),
            MmioRange::NvUser => {
                log::trace!("NV_USER: read at 0x{:06X} has no defined effect", address);
                0
            }
            MmioRange::Prm | MmioRange::Prmio | MmioRange::Prmcio => {
                log::trace!("{:?}: read forwarded to external VGA collaborator, out of scope", range);
                0
            }
            MmioRange::Prom => 0,
            MmioRange::Unmapped => {
                log::trace!("MMIO: read from unmapped offset 0x{:06X}", address);
                0
            }
        }
    }

    /// 32-bit MMIO write. NV_USER writes push into PFIFO and immediately
    /// drain whatever becomes pullable; PBUS's RMA shift registers are
    /// driven one byte at a time and are handled by [`Device::write8`]
    /// instead.
    pub fn write32(&mut self, address: u32, value: u32) {
        let range = mmio::decode(address);
        let offset = (address & 0x00FF_FFFF).wrapping_sub(Self::range_base(range));
        match range {
            MmioRange::Pmc => self.pmc.write_register(offset, value),
            MmioRange::Pbus => self.pbus.write_register(offset, value),
            MmioRange::Pfifo => self.pfifo.write_register(offset, value),
            MmioRange::Ptimer => self.ptimer.write_register(offset, value),
            MmioRange::Pfb => self.pfb.write_register(offset, value),
            MmioRange::Pextdev => self.pextdev.write_register(offset, value),
            MmioRange::Pme => self.pme.write_register(offset, value),
            MmioRange::Pgraph => self.pgraph.write_register(offset, value),
            MmioRange::Pvideo => self.pvideo.write_register(offset, value),
            MmioRange::Pnvm => self.write_vram_u32(offset, value),
            MmioRange::Ramin => self.write_ramin_u32(offset, value),
            MmioRange::NvUser => {
                let masked = address & 0x00FF_FFFF;
                let outcome = self.pfifo.push(&mut self.ramin, masked, value);
                log::debug!("NV_USER: push at 0x{:06X} -> {:?}", masked, outcome);
                self.drain_fifo();
            }
            MmioRange::Prm | MmioRange::Prmio | MmioRange::Prmcio => {
                log::trace!("{:?}: write forwarded to external VGA collaborator, out of scope", range);
            }
            MmioRange::Prom => {}
            MmioRange::Unmapped => {
                log::trace!("MMIO: write to unmapped offset 0x{:06X}", address);
            }
        }
        self.recompute_interrupts();
    }

    pub fn read16(&mut self, address: u32) -> u16 {
        let range = mmio::decode(address);
        let offset = (address & 0x00FF_FFFF).wrapping_sub(Self::range_base(range));
        match range {
            MmioRange::Pmc => self.pmc.read_register16(offset),
            MmioRange::Pbus => self.pbus.read_register16(offset),
            MmioRange::Pfifo => self.pfifo.read_register16(offset),
            MmioRange::Ptimer => self.ptimer.read_register16(offset),
            MmioRange::Pfb => self.pfb.read_register16(offset),
            MmioRange::Pextdev => self.pextdev.read_register16(offset),
            MmioRange::Pme => self.pme.read_register16(offset),
            MmioRange::Pgraph => self.pgraph.read_register16(offset),
            MmioRange::Pvideo => self.pvideo.read_register16(offset),
            MmioRange::Ramin => {
                u16::from_le_bytes([self.ramin.read_byte(offset), self.ramin.read_byte(offset + 1)])
            }
            MmioRange::Pnvm => {
                let o = offset as usize;
                if o + 2 <= self.vram.len() {
                    u16::from_le_bytes(self.vram[o..o + 2].try_into().unwrap())
                } else {
                    0
                }
            }
            _ => (self.read32(address) & 0xFFFF) as u16,
        }
    }

    pub fn write16(&mut self, address: u32, value: u16) {
        let range = mmio::decode(address);
        let offset = (address & 0x00FF_FFFF).wrapping_sub(Self::range_base(range));
        match range {
            MmioRange::Pmc => self.pmc.write_register16(offset, value),
            MmioRange::Pbus => self.pbus.write_register16(offset, value),
            MmioRange::Pfifo => self.pfifo.write_register16(offset, value),
            MmioRange::Ptimer => self.ptimer.write_register16(offset, value),
            MmioRange::Pfb => self.pfb.write_register16(offset, value),
            MmioRange::Pextdev => self.pextdev.write_register16(offset, value),
            MmioRange::Pme => self.pme.write_register16(offset, value),
            MmioRange::Pgraph => self.pgraph.write_register16(offset, value),
            MmioRange::Pvideo => self.pvideo.write_register16(offset, value),
            MmioRange::Ramin => {
                for (i, byte) in value.to_le_bytes().into_iter().enumerate() {
                    self.ramin.write_byte(offset + i as u32, byte);
                }
            }
            MmioRange::Pnvm => {
                let o = offset as usize;
                if o + 2 <= self.vram.len() {
                    self.vram[o..o + 2].copy_from_slice(&value.to_le_bytes());
                }
            }
            _ => self.write32(address, value as u32),
        }
    }

    /// 8-bit MMIO read/write. PBUS's RMA shift registers are the one
    /// place an 8-bit access means something different from a
    /// read-modify-write of the 32-bit register: each byte feeds one
    /// stage of the shift register, and a completed data-byte write
    /// replays as an ordinary 32-bit MMIO write to the assembled target.
    pub fn read8(&mut self, address: u32) -> u8 {
        let range = mmio::decode(address);
        let offset = (address & 0x00FF_FFFF).wrapping_sub(Self::range_base(range));
        match range {
            MmioRange::Pmc => self.pmc.read_register8(offset),
            MmioRange::Pbus => self.pbus.read_register8(offset),
            MmioRange::Pfifo => self.pfifo.read_register8(offset),
            MmioRange::Ptimer => self.ptimer.read_register8(offset),
            MmioRange::Pfb => self.pfb.read_register8(offset),
            MmioRange::Pextdev => self.pextdev.read_register8(offset),
            MmioRange::Pme => self.pme.read_register8(offset),
            MmioRange::Pgraph => self.pgraph.read_register8(offset),
            MmioRange::Pvideo => self.pvideo.read_register8(offset),
            MmioRange::Ramin => self.ramin.read_byte(offset),
            _ => (self.read32(address) & 0xFF) as u8,
        }
    }

    pub fn write8(&mut self, address: u32, value: u8) {
        let range = mmio::decode(address);
        let offset = (address & 0x00FF_FFFF).wrapping_sub(Self::range_base(range));
        if range == MmioRange::Pbus {
            match offset & !0x3 {
                crate::core::pbus::REG_RMA_TARGET => {
                    self.pbus.rma_push_target_byte(value);
                    return;
                }
                crate::core::pbus::REG_RMA_DATA => {
                    if let Some(write) = self.pbus.rma_push_data_byte(value) {
                        log::debug!(
                            "PBUS RMA: replaying assembled write to 0x{:06X} = 0x{:08X}",
                            write.address,
                            write.value
                        );
                        self.write32(write.address, write.value);
                    }
                    return;
                }
                _ => {}
            }
        }
        match range {
            MmioRange::Pmc => self.pmc.write_register8(offset, value),
            MmioRange::Pbus => self.pbus.write_register8(offset, value),
            MmioRange::Pfifo => self.pfifo.write_register8(offset, value),
            MmioRange::Ptimer => self.ptimer.write_register8(offset, value),
            MmioRange::Pfb => self.pfb.write_register8(offset, value),
            MmioRange::Pextdev => self.pextdev.write_register8(offset, value),
            MmioRange::Pme => self.pme.write_register8(offset, value),
            MmioRange::Pgraph => self.pgraph.write_register8(offset, value),
            MmioRange::Pvideo => self.pvideo.write_register8(offset, value),
            MmioRange::Ramin => self.ramin.write_byte(offset, value),
            _ => self.write32(address, value as u32),
        }
    }

    fn read_vram_u32(&self, offset: u32) -> u32 {
        let o = offset as usize;
        if o + 4 > self.vram.len() {
            return 0;
        }
        u32::from_le_bytes(self.vram[o..o + 4].try_into().unwrap())
    }

    fn write_vram_u32(&mut self, offset: u32, value: u32) {
        let o = offset as usize;
        if o + 4 <= self.vram.len() {
            self.vram[o..o + 4].copy_from_slice(&value.to_le_bytes());
        }
    }

    fn read_ramin_u32(&self, offset: u32) -> u32 {
        u32::from_le_bytes([
            self.ramin.read_byte(offset),
            self.ramin.read_byte(offset + 1),
            self.ramin.read_byte(offset + 2),
            self.ramin.read_byte(offset + 3),
        ])
    }

    fn write_ramin_u32(&mut self, offset: u32, value: u32) {
        for (i, byte) in value.to_le_bytes().into_iter().enumerate() {
            self.ramin.write_byte(offset + i as u32, byte);
        }
    }

    /// Drain every ready PFIFO entry into PGRAPH, stopping at the first
    /// empty/error/software-method outcome (those require host
    /// intervention: servicing a software method, or waiting on a hash
    /// miss the driver must resolve by rebuilding the RAMHT entry).
    fn drain_fifo(&mut self) {
        loop {
            match self.pfifo.pull(&self.ramin) {
                PullOutcome::Empty | PullOutcome::HashMiss | PullOutcome::SoftwareMethod { .. } => {
                    break;
                }
                PullOutcome::Bound { subchannel } => {
                    log::debug!("PFIFO: bound subchannel {}", subchannel);
                }
                PullOutcome::Submit {
                    param,
                    method,
                    subchannel,
                    class_id,
                    context_word,
                    ..
                } => {
                    let ctx = RamhtContext::decode(context_word);
                    let grobj = self.ramin.read_grobj(ctx.ramin_offset);
                    log::debug!(
                        "PGRAPH: submit subchannel {} class 0x{:02X} method 0x{:04X}",
                        subchannel,
                        class_id,
                        method
                    );
                    let timestamp_ns = self.ptimer.time_ns();
                    self.pgraph
                        .submit(&mut self.vram, grobj, method, param, class_id, timestamp_ns);
                }
            }
        }
    }

    /// Advance PTIMER by `delta_ns` and recompute interrupt state. The
    /// rasterizer and PFIFO have no notion of elapsed time; only PTIMER
    /// and its alarm do.
    pub fn step(&mut self, delta_ns: u64) {
        self.ptimer.tick(delta_ns);
        self.recompute_interrupts();
    }

    /// Fold every subsystem's `(assigned_bit, is_asserting)` pair into
    /// PMC and return whether the host IRQ line is now asserted.
    /// PGRAPH's second interrupt pair (`INTR_1`) is read directly since
    /// PMC only aggregates one bit per subsystem and `INTR_1` conditions
    /// already latch into `INTR_0`'s PGRAPH bits via this fold.
    pub fn recompute_interrupts(&mut self) -> bool {
        let pgraph1_asserting =
            (self.pgraph.interrupt_status_1 & self.pgraph.interrupt_enable_1) != 0;
        self.pmc.recompute_intr0(&[
            (intr0_bits::PME, self.pme.is_asserting()),
            (intr0_bits::PFIFO, self.pfifo.is_asserting()),
            (intr0_bits::PGRAPH0, self.pgraph.is_asserting()),
            (intr0_bits::PGRAPH1, pgraph1_asserting),
            (intr0_bits::PVIDEO, self.pvideo.is_asserting()),
            (intr0_bits::PTIMER, self.ptimer.is_asserting()),
            (intr0_bits::PBUS, self.pbus.is_asserting()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ramin::RamhtContext;

    fn device() -> Device {
        Device::new(DeviceConfig::default()).unwrap()
    }

    #[test]
    fn reset_restores_boot_identity() {
        let mut dev = device();
        dev.pmc.write_register(0x200, 0); // clobber ENABLE
        dev.reset();
        assert_eq!(dev.pmc.read_register(0x000), dev.config.revision.boot_value());
    }

    #[test]
    fn pnvm_round_trips_through_vram() {
        let mut dev = device();
        dev.write32(BASE_PNVM, 0xDEAD_BEEF);
        assert_eq!(dev.read32(BASE_PNVM), 0xDEAD_BEEF);
    }

    #[test]
    fn ramin_window_round_trips() {
        let mut dev = device();
        dev.write32(BASE_RAMIN, 0x1122_3344);
        assert_eq!(dev.read32(BASE_RAMIN), 0x1122_3344);
    }

    #[test]
    fn nv_user_push_drains_into_pgraph() {
        let mut dev = device();
        dev.ramin.ramht_insert(
            0x1000,
            0,
            RamhtContext {
                ramin_offset: 0,
                class_id: 0x12, // Beta
                is_hardware: true,
                channel: 0,
            },
        );
        dev.write32(0x800000, 0x1000); // bind subchannel 0
        dev.write32(0x800300, 0x4000_0000); // Beta SET (method 0x300), ~0.5 in 1.30 fixed-point
        assert_eq!(dev.pgraph.beta_factor, 0x4000_0000);
    }

    #[test]
    fn rma_byte_writes_replay_as_32_bit_write() {
        let mut dev = device();
        let target_offset = BASE_PBUS + 0x204;
        let data_offset = BASE_PBUS + 0x208;
        for b in BASE_PMC.to_le_bytes() {
            dev.write8(target_offset, b);
        }
        for b in &0xABCDu32.to_le_bytes() {
            dev.write8(data_offset, *b);
        }
        // PMC.BOOT is read-only; the replayed write lands there and is a no-op.
        assert_eq!(dev.pmc.read_register(0x000), dev.config.revision.boot_value());
    }

    #[test]
    fn interrupts_aggregate_from_ptimer_alarm() {
        let mut dev = device();
        dev.write32(BASE_PTIMER + 0x420, 100); // ALARM
        dev.write32(BASE_PTIMER + 0x140, 1); // INTR_EN
        dev.pmc.write_register(0x200, 0xFFFF_FFFF); // ENABLE
        dev.step(200);
        assert!(dev.pmc.irq_asserted());
    }
}

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

//! PFIFO — the object submission engine. The hardest subsystem: two
//! caches (CACHE0: 1 slot, software; CACHE1: 32/64 slots, hardware),
//! gray-coded put/get pointers, a runout/error path, context switching
//! among channels, and a DMA pusher.
//!
//! Push and pull are driven by [`crate::core::device::Device`], which
//! owns the shared [`Ramin`](crate::core::ramin::Ramin) that RAMHT
//! lookups and RAMFC context switches read and write.

pub mod gray;

use crate::core::mmio::IODevice;
use crate::core::pmc::InterruptSource;
use crate::core::ramin::{RamFcEntry, Ramin, RunoutReason};

pub mod intr {
    pub const CACHE_ERROR: u32 = 1 << 0;
    pub const RUNOUT: u32 = 1 << 4;
    pub const RUNOUT_OVERFLOW: u32 = 1 << 8;
    pub const DMA_PUSHER: u32 = 1 << 12;
    pub const DMA_PTE: u32 = 1 << 16;
}

const REG_INTR: u32 = 0x100;
const REG_INTR_EN: u32 = 0x140;
const REG_RUNOUT_PUT: u32 = 0x400;
const REG_RUNOUT_GET: u32 = 0x404;
const REG_CACHE1_PUSH0: u32 = 0x1200;
const REG_CACHE1_PULL0: u32 = 0x1204;
const REG_CACHE1_CHANNEL: u32 = 0x1208;
const REG_CACHE1_REASSIGNMENT: u32 = 0x120C;
const REG_CACHE1_PUT: u32 = 0x1210;
const REG_CACHE1_GET: u32 = 0x1214;
const REG_CACHE1_DMA_STATE: u32 = 0x1220;
const REG_CACHE1_DMA_LENGTH: u32 = 0x1224;
const REG_CACHE1_DMA_ADDRESS: u32 = 0x1228;
const REG_CACHE1_DMA_TARGET_NODE: u32 = 0x122C;
const REG_CONFIG_RAMHT: u32 = 0x1300;
const REG_CONFIG_RAMFC: u32 = 0x1304;
const REG_CONFIG_RAMRO: u32 = 0x1308;
const REG_CACHE0_PULL0: u32 = 0x1400;

/// Address bits embedding the target of a NV_USER push:
/// `[22:16] = channel`, `[15:13] = subchannel`, `[12:2] = method/4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submission {
    pub channel: u8,
    pub subchannel: u8,
    pub method_offset: u16,
}

pub fn decode_submission(addr: u32) -> Submission {
    Submission {
        channel: ((addr >> 16) & 0x7F) as u8,
        subchannel: ((addr >> 13) & 0x7) as u8,
        method_offset: (addr & 0x1FFC) as u16,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheEntry {
    pub method: u16,
    pub subchannel: u8,
    pub data: u32,
}

/// Result of a push attempt against CACHE1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Stored,
    ContextSwitchedThenStored { from: u8, to: u8 },
    Runout(RunoutReason),
}

/// Result of a pull attempt against either cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
    Empty,
    /// Method 0 resolved and bound into a subchannel context.
    Bound { subchannel: u8 },
    /// The bound object is a hash miss.
    HashMiss,
    /// The bound object is software-backed; host must service.
    SoftwareMethod { subchannel: u8 },
    /// Ready to submit to PGRAPH.
    Submit {
        param: u32,
        method: u16,
        channel: u8,
        subchannel: u8,
        class_id: u8,
        context_word: u32,
    },
}

struct Cache0 {
    push_enabled: bool,
    pull_enabled: bool,
    channel: u8,
    subchannel_context: [u32; 8],
    entry: Option<CacheEntry>,
    software_method_pending: bool,
}

impl Cache0 {
    fn new() -> Self {
        Self {
            push_enabled: true,
            pull_enabled: true,
            channel: 0,
            subchannel_context: [0; 8],
            entry: None,
            software_method_pending: false,
        }
    }

    fn push(&mut self, entry: CacheEntry) -> bool {
        if !self.push_enabled || self.entry.is_some() {
            return false;
        }
        self.entry = Some(entry);
        true
    }

    fn pull(&mut self, ramin: &Ramin) -> PullOutcome {
        if !self.pull_enabled {
            return PullOutcome::Empty;
        }
        let Some(entry) = self.entry else {
            return PullOutcome::Empty;
        };

        if entry.method == 0 {
            self.entry = None;
            return match ramin.ramht_lookup(entry.data, self.channel) {
                Some(ctx) => {
                    self.subchannel_context[entry.subchannel as usize] = ctx.encode();
                    PullOutcome::Bound {
                        subchannel: entry.subchannel,
                    }
                }
                None => PullOutcome::HashMiss,
            };
        }

        let ctx_word = self.subchannel_context[entry.subchannel as usize];
        let ctx = crate::core::ramin::RamhtContext::decode(ctx_word);
        if !ctx.is_hardware {
            self.pull_enabled = false;
            self.software_method_pending = true;
            return PullOutcome::SoftwareMethod {
                subchannel: entry.subchannel,
            };
        }

        self.entry = None;
        PullOutcome::Submit {
            param: entry.data,
            method: entry.method,
            channel: self.channel,
            subchannel: entry.subchannel,
            class_id: ctx.class_id & 0x1F,
            context_word: ctx_word,
        }
    }
}

struct Cache1 {
    size: u8, // 32 or 64
    push_enabled: bool,
    pull_enabled: bool,
    cache_reassignment: bool,
    channel: u8,
    put_gray: u8,
    get_gray: u8,
    entries: Vec<CacheEntry>,
    subchannel_context: [u32; 8],
    software_method_pending: bool,
    dma_state: u32,
    dma_length: u32,
    dma_address: u32,
    dma_target_node: u8,
}

impl Cache1 {
    fn new(size: u8) -> Self {
        Self {
            size,
            push_enabled: true,
            pull_enabled: true,
            cache_reassignment: false,
            channel: 0,
            put_gray: 0,
            get_gray: 0,
            entries: vec![CacheEntry::default(); size as usize],
            subchannel_context: [0; 8],
            software_method_pending: false,
            dma_state: 0,
            dma_length: 0,
            dma_address: 0,
            dma_target_node: 0,
        }
    }

    fn put_index(&self) -> u8 {
        gray::decode(self.put_gray)
    }

    fn get_index(&self) -> u8 {
        gray::decode(self.get_gray)
    }

    fn is_empty(&self) -> bool {
        self.put_gray == self.get_gray
    }

    /// `(decoded_get - decoded_put - 1) mod size`.
    fn free_spaces(&self) -> u8 {
        let get = self.get_index() as i16;
        let put = self.put_index() as i16;
        let size = self.size as i16;
        (((get - put - 1) % size + size) % size) as u8
    }

    fn advance_put(&mut self) {
        let next = (self.put_index() + 1) % self.size;
        self.put_gray = gray::encode(next);
    }

    fn advance_get(&mut self) {
        let next = (self.get_index() + 1) % self.size;
        self.get_gray = gray::encode(next);
    }

    fn save_to_ramfc(&self) -> RamFcEntry {
        RamFcEntry {
            put: self.put_gray as u32,
            get: self.get_gray as u32,
            subchannel_context: self.subchannel_context,
            push_enabled: self.push_enabled,
            pull_enabled: self.pull_enabled,
            dma_state: self.dma_state,
        }
    }

    fn load_from_ramfc(&mut self, entry: RamFcEntry) {
        self.put_gray = entry.put as u8;
        self.get_gray = entry.get as u8;
        self.subchannel_context = entry.subchannel_context;
        self.push_enabled = entry.push_enabled;
        self.pull_enabled = entry.pull_enabled;
        self.dma_state = entry.dma_state;
    }
}

pub struct Pfifo {
    cache0: Cache0,
    cache1: Cache1,
    interrupt_status: u32,
    interrupt_enable: u32,
}

impl Pfifo {
    pub fn new(cache1_size: u8) -> Self {
        debug_assert!(gray::validate(cache1_size));
        Self {
            cache0: Cache0::new(),
            cache1: Cache1::new(cache1_size),
            interrupt_status: 0,
            interrupt_enable: intr::CACHE_ERROR | intr::RUNOUT | intr::RUNOUT_OVERFLOW,
        }
    }

    pub fn reset(&mut self) {
        let size = self.cache1.size;
        *self = Self::new(size);
    }

    /// Push a host write at `addr` with payload `param` (NV_USER),
    /// checking cache availability, runout backlog, free space, and
    /// reserved-method access in that order. Runout writes go through
    /// `ramin`; errors fire `RUNOUT`/`RUNOUT_OVERFLOW`.
    pub fn push(&mut self, ramin: &mut Ramin, addr: u32, param: u32) -> PushOutcome {
        let sub = decode_submission(addr);

        let reason = if !self.cache1.push_enabled {
            Some(RunoutReason::NoCacheAvailable)
        } else if ramin.runout_is_pending() {
            Some(RunoutReason::CacheRanOut)
        } else if self.cache1.free_spaces() == 0 {
            Some(RunoutReason::FreeCountOverrun)
        } else if sub.method_offset > 0 && sub.method_offset < 0x100 {
            Some(RunoutReason::ReservedAccess)
        } else if sub.channel != self.cache1.channel
            && (!self.cache1.cache_reassignment || !self.cache1.is_empty())
        {
            // A context switch is only legal against an empty CACHE1:
            // RAMFC only saves put/get/subchannel contexts, not the
            // pending entries[] array, so switching with entries still
            // queued would silently drop them.
            Some(RunoutReason::NoCacheAvailable)
        } else {
            None
        };

        if let Some(reason) = reason {
            let addr_word = (sub.subchannel as u32) << 13
                | (sub.method_offset as u32)
                | (sub.channel as u32) << 16;
            let result = ramin.runout_write(addr_word, reason, param);
            self.interrupt_status |= if result.overflow {
                intr::RUNOUT_OVERFLOW
            } else {
                intr::RUNOUT
            };
            return PushOutcome::Runout(reason);
        }

        let switched = if sub.channel != self.cache1.channel {
            let from = self.cache1.channel;
            ramin.ramfc_save(from, &self.cache1.save_to_ramfc());
            let loaded = ramin.ramfc_load(sub.channel);
            self.cache1.load_from_ramfc(loaded);
            self.cache1.channel = sub.channel;
            Some((from, sub.channel))
        } else {
            None
        };

        let slot = self.cache1.put_index() as usize;
        self.cache1.entries[slot] = CacheEntry {
            method: sub.method_offset,
            subchannel: sub.subchannel,
            data: param,
        };
        self.cache1.advance_put();

        match switched {
            Some((from, to)) => PushOutcome::ContextSwitchedThenStored { from, to },
            None => PushOutcome::Stored,
        }
    }

    /// Pull one entry, CACHE0 first (software preempts hardware on
    /// ties), then CACHE1.
    pub fn pull(&mut self, ramin: &Ramin) -> PullOutcome {
        let outcome = self.cache0.pull(ramin);
        if !matches!(outcome, PullOutcome::Empty) {
            self.note_pull_errors(&outcome);
            return outcome;
        }

        if self.cache1.pull_enabled && !self.cache1.is_empty() {
            let slot = self.cache1.get_index() as usize;
            let entry = self.cache1.entries[slot];

            let outcome = if entry.method == 0 {
                match ramin.ramht_lookup(entry.data, self.cache1.channel) {
                    Some(ctx) => {
                        self.cache1.subchannel_context[entry.subchannel as usize] = ctx.encode();
                        self.cache1.advance_get();
                        PullOutcome::Bound {
                            subchannel: entry.subchannel,
                        }
                    }
                    None => PullOutcome::HashMiss,
                }
            } else {
                let ctx_word = self.cache1.subchannel_context[entry.subchannel as usize];
                let ctx = crate::core::ramin::RamhtContext::decode(ctx_word);
                if !ctx.is_hardware {
                    self.cache1.pull_enabled = false;
                    self.cache1.software_method_pending = true;
                    PullOutcome::SoftwareMethod {
                        subchannel: entry.subchannel,
                    }
                } else {
                    self.cache1.advance_get();
                    PullOutcome::Submit {
                        param: entry.data,
                        method: entry.method,
                        channel: self.cache1.channel,
                        subchannel: entry.subchannel,
                        class_id: ctx.class_id & 0x1F,
                        context_word: ctx_word,
                    }
                }
            };
            self.note_pull_errors(&outcome);
            return outcome;
        }

        PullOutcome::Empty
    }

    fn note_pull_errors(&mut self, outcome: &PullOutcome) {
        if matches!(
            outcome,
            PullOutcome::HashMiss | PullOutcome::SoftwareMethod { .. }
        ) {
            self.interrupt_status |= intr::CACHE_ERROR;
        }
    }

    pub fn cache1_channel(&self) -> u8 {
        self.cache1.channel
    }

    /// Stream the DMA pusher's command buffer into CACHE1. `host_mem` is
    /// the flat byte range `dma_target_node` addresses (2 = PCI-style,
    /// 3 = AGP-style host memory); this core does not model the TLB
    /// translation beyond that flat read, per spec.md §9's DMA-pusher
    /// note. The buffer is `dma_length` bytes of little-endian `(header,
    /// data)` 32-bit word pairs starting at `dma_address`; each pair is
    /// enqueued exactly as if it had arrived via [`Pfifo::push`] at the
    /// `header` address, so it passes through the same runout checks.
    /// Returns the number of pairs successfully consumed. A no-op when
    /// `dma_state` is 0 (pusher idle).
    pub fn dma_pump(&mut self, ramin: &mut Ramin, host_mem: &[u8]) -> usize {
        if self.cache1.dma_state == 0 {
            return 0;
        }
        let base = self.cache1.dma_address as usize;
        let len = self.cache1.dma_length as usize;
        let mut consumed = 0usize;
        let mut offset = 0usize;
        while offset + 8 <= len {
            let pair_base = base + offset;
            let Some(header_bytes) = host_mem.get(pair_base..pair_base + 4) else {
                self.interrupt_status |= intr::DMA_PTE;
                break;
            };
            let Some(data_bytes) = host_mem.get(pair_base + 4..pair_base + 8) else {
                self.interrupt_status |= intr::DMA_PTE;
                break;
            };
            let header = u32::from_le_bytes(header_bytes.try_into().unwrap());
            let data = u32::from_le_bytes(data_bytes.try_into().unwrap());
            if matches!(self.push(ramin, header, data), PushOutcome::Runout(_)) {
                self.interrupt_status |= intr::DMA_PUSHER;
                break;
            }
            consumed += 1;
            offset += 8;
        }
        self.cache1.dma_state = 0;
        consumed
    }
}

impl InterruptSource for Pfifo {
    fn pending(&self) -> u32 {
        self.interrupt_status
    }
    fn enable(&self) -> u32 {
        self.interrupt_enable
    }
}

impl IODevice for Pfifo {
    fn read_register(&mut self, offset: u32) -> u32 {
        match offset & !0x3 {
            REG_INTR => self.interrupt_status,
            REG_INTR_EN => self.interrupt_enable,
            REG_CACHE1_PUSH0 => self.cache1.push_enabled as u32,
            REG_CACHE1_PULL0 => {
                (self.cache1.pull_enabled as u32)
                    | ((self.cache1.software_method_pending as u32) << 4)
            }
            REG_CACHE1_CHANNEL => self.cache1.channel as u32,
            REG_CACHE1_REASSIGNMENT => self.cache1.cache_reassignment as u32,
            REG_CACHE1_PUT => (self.cache1.put_gray as u32) << 2,
            REG_CACHE1_GET => (self.cache1.get_gray as u32) << 2,
            REG_CACHE1_DMA_STATE => self.cache1.dma_state,
            REG_CACHE1_DMA_LENGTH => self.cache1.dma_length,
            REG_CACHE1_DMA_ADDRESS => self.cache1.dma_address,
            REG_CACHE1_DMA_TARGET_NODE => self.cache1.dma_target_node as u32,
            REG_CACHE0_PULL0 => {
                (self.cache0.pull_enabled as u32)
                    | ((self.cache0.software_method_pending as u32) << 4)
            }
            _ => 0,
        }
    }

    fn write_register(&mut self, offset: u32, value: u32) {
        match offset & !0x3 {
            REG_INTR => self.interrupt_status &= !value,
            REG_INTR_EN => self.interrupt_enable = value,
            REG_CACHE1_PUSH0 => self.cache1.push_enabled = value & 1 != 0,
            REG_CACHE1_PULL0 => {
                self.cache1.pull_enabled = value & 1 != 0;
                if self.cache1.pull_enabled {
                    self.cache1.software_method_pending = false;
                }
            }
            REG_CACHE1_CHANNEL => self.cache1.channel = (value & 0x7F) as u8,
            REG_CACHE1_REASSIGNMENT => self.cache1.cache_reassignment = value & 1 != 0,
            REG_CACHE1_PUT => self.cache1.put_gray = ((value >> 2) & 0x3F) as u8,
            REG_CACHE1_GET => self.cache1.get_gray = ((value >> 2) & 0x3F) as u8,
            REG_CACHE1_DMA_STATE => self.cache1.dma_state = value,
            REG_CACHE1_DMA_LENGTH => self.cache1.dma_length = value,
            REG_CACHE1_DMA_ADDRESS => self.cache1.dma_address = value,
            REG_CACHE1_DMA_TARGET_NODE => self.cache1.dma_target_node = value as u8,
            REG_CACHE0_PULL0 => {
                self.cache0.pull_enabled = value & 1 != 0;
                if self.cache0.pull_enabled {
                    self.cache0.software_method_pending = false;
                }
            }
            REG_CONFIG_RAMHT | REG_CONFIG_RAMFC | REG_CONFIG_RAMRO => {
                // Sizing lives on Ramin's layout, fixed at Device
                // construction from DeviceConfig; not runtime-rewritable.
            }
            _ => log::trace!(
                "PFIFO: write to {} (0x{:04X})",
                crate::core::regnames::pfifo(offset),
                offset
            ),
        }
    }

    fn name(&self) -> &str {
        "PFIFO"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ramin::{RamInLayout, RamhtContext};

    fn bind(ramin: &mut Ramin, pfifo: &mut Pfifo, name: u32, subchannel: u8, class_id: u8) {
        ramin.ramht_insert(
            name,
            pfifo.cache1_channel(),
            RamhtContext {
                ramin_offset: 0,
                class_id,
                is_hardware: true,
                channel: pfifo.cache1_channel(),
            },
        );
        let addr = (subchannel as u32) << 13;
        pfifo.push(ramin, addr, name);
        assert!(matches!(pfifo.pull(ramin), PullOutcome::Bound { .. }));
    }

    #[test]
    fn push_pull_preserves_order() {
        let mut ramin = Ramin::new(RamInLayout::default());
        let mut pfifo = Pfifo::new(32);
        bind(&mut ramin, &mut pfifo, 0x1000, 0, 0x5E);

        let addr0 = (0u32) << 13 | 0x300;
        let addr1 = (0u32) << 13 | 0x400;
        pfifo.push(&mut ramin, addr0, 0xAAAA);
        pfifo.push(&mut ramin, addr1, 0xBBBB);

        let first = pfifo.pull(&ramin);
        let second = pfifo.pull(&ramin);
        match (first, second) {
            (
                PullOutcome::Submit { param: p0, .. },
                PullOutcome::Submit { param: p1, .. },
            ) => {
                assert_eq!(p0, 0xAAAA);
                assert_eq!(p1, 0xBBBB);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn reserved_method_window_diverts_to_runout() {
        let mut ramin = Ramin::new(RamInLayout::default());
        let mut pfifo = Pfifo::new(32);
        let addr = 0x80; // method offset 0x80, within (0, 0x100)
        let outcome = pfifo.push(&mut ramin, addr, 0x1234);
        assert_eq!(outcome, PushOutcome::Runout(RunoutReason::ReservedAccess));
        assert_ne!(pfifo.pending() & intr::RUNOUT, 0);
        assert_eq!(ramin.runout_put(), 8);
    }

    #[test]
    fn free_count_overrun_on_full_cache() {
        let mut ramin = Ramin::new(RamInLayout::default());
        let mut pfifo = Pfifo::new(32);
        // 31 succeed, 32nd fails (one slot always reserved by the free-space test)
        for i in 0..31 {
            let outcome = pfifo.push(&mut ramin, 0x400, i);
            assert_eq!(outcome, PushOutcome::Stored, "push {} should succeed", i);
        }
        let outcome = pfifo.push(&mut ramin, 0x400, 999);
        assert_eq!(
            outcome,
            PushOutcome::Runout(RunoutReason::FreeCountOverrun)
        );

        // pre-bind subchannel 0 to a hardware class (bypassing push, since
        // the cache has no room left to accept a bind entry either) so the
        // next pull actually consumes a slot, freeing room for one push.
        pfifo.cache1.subchannel_context[0] = RamhtContext {
            ramin_offset: 0,
            class_id: 0x5E,
            is_hardware: true,
            channel: 0,
        }
        .encode();
        assert!(matches!(pfifo.pull(&ramin), PullOutcome::Submit { .. }));
        let outcome = pfifo.push(&mut ramin, 0x400, 1000);
        assert_eq!(outcome, PushOutcome::Stored);
    }

    #[test]
    fn context_switch_round_trips_through_ramfc() {
        let mut ramin = Ramin::new(RamInLayout::default());
        let mut pfifo = Pfifo::new(32);
        pfifo.write_register(REG_CACHE1_REASSIGNMENT, 1);
        bind(&mut ramin, &mut pfifo, 0x1000, 0, 0x5E);

        // A context switch is only legal against an empty CACHE1, so the
        // pushed entry must be drained before switching channels.
        pfifo.push(&mut ramin, 0x400, 0x1111);
        assert!(matches!(pfifo.pull(&ramin), PullOutcome::Submit { .. }));
        let put_before = pfifo.cache1.put_gray;

        let addr_channel_2 = (2u32) << 16 | 0x400;
        let outcome = pfifo.push(&mut ramin, addr_channel_2, 0x2222);
        assert!(matches!(
            outcome,
            PushOutcome::ContextSwitchedThenStored { from: 0, to: 2 }
        ));

        // Channel 2's resident subchannel context starts unbound; seed it
        // directly (as `free_count_overrun_on_full_cache` does) so the
        // entry just pushed can actually drain before switching back.
        pfifo.cache1.subchannel_context[0] = RamhtContext {
            ramin_offset: 0,
            class_id: 0x5E,
            is_hardware: true,
            channel: 2,
        }
        .encode();
        assert!(matches!(pfifo.pull(&ramin), PullOutcome::Submit { .. }));

        // switch back to channel 0
        let outcome = pfifo.push(&mut ramin, 0x400, 0x3333);
        assert!(matches!(
            outcome,
            PushOutcome::ContextSwitchedThenStored { from: 2, to: 0 }
        ));
        // put pointer for channel 0 should have advanced by one more slot
        // than before the round trip (one entry was pushed before leaving).
        assert_ne!(pfifo.cache1.put_gray, put_before);
    }

    /// A channel switch attempted while CACHE1 still holds pending
    /// entries diverts to runout instead of silently dropping them
    /// (RAMFC only saves put/get/subchannel contexts, not `entries[]`).
    #[test]
    fn context_switch_with_nonempty_cache_diverts_to_runout() {
        let mut ramin = Ramin::new(RamInLayout::default());
        let mut pfifo = Pfifo::new(32);
        pfifo.write_register(REG_CACHE1_REASSIGNMENT, 1);
        pfifo.push(&mut ramin, 0x400, 0x1111); // left pending, not pulled
        let addr_channel_2 = (2u32) << 16 | 0x400;
        let outcome = pfifo.push(&mut ramin, addr_channel_2, 0x2222);
        assert_eq!(
            outcome,
            PushOutcome::Runout(RunoutReason::NoCacheAvailable)
        );
        assert_eq!(pfifo.cache1.channel, 0);
    }

    #[test]
    fn gray_code_free_slot_arithmetic_matches_scenario_6() {
        let mut ramin = Ramin::new(RamInLayout::default());
        let mut pfifo = Pfifo::new(32);
        for i in 0..31u32 {
            assert_eq!(pfifo.push(&mut ramin, 0x400, i), PushOutcome::Stored);
        }
        assert_eq!(
            pfifo.push(&mut ramin, 0x400, 999),
            PushOutcome::Runout(RunoutReason::FreeCountOverrun)
        );
    }

    #[test]
    fn dma_pump_enqueues_header_data_pairs() {
        let mut ramin = Ramin::new(RamInLayout::default());
        let mut pfifo = Pfifo::new(32);
        bind(&mut ramin, &mut pfifo, 0x1000, 0, 0x5E);

        pfifo.cache1.dma_state = 1;
        pfifo.cache1.dma_length = 16; // two (header, data) pairs
        pfifo.cache1.dma_address = 0;

        let mut host_mem = vec![0u8; 32];
        host_mem[0..4].copy_from_slice(&0x400u32.to_le_bytes());
        host_mem[4..8].copy_from_slice(&0xAAAAu32.to_le_bytes());
        host_mem[8..12].copy_from_slice(&0x400u32.to_le_bytes());
        host_mem[12..16].copy_from_slice(&0xBBBBu32.to_le_bytes());

        let consumed = pfifo.dma_pump(&mut ramin, &host_mem);
        assert_eq!(consumed, 2);
        assert_eq!(pfifo.cache1.dma_state, 0);

        let first = pfifo.pull(&ramin);
        let second = pfifo.pull(&ramin);
        match (first, second) {
            (
                PullOutcome::Submit { param: p0, .. },
                PullOutcome::Submit { param: p1, .. },
            ) => {
                assert_eq!(p0, 0xAAAA);
                assert_eq!(p1, 0xBBBB);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn dma_pump_is_noop_when_idle() {
        let mut ramin = Ramin::new(RamInLayout::default());
        let mut pfifo = Pfifo::new(32);
        assert_eq!(pfifo.dma_pump(&mut ramin, &[]), 0);
    }

    #[test]
    fn dma_pump_out_of_range_fires_dma_pte() {
        let mut ramin = Ramin::new(RamInLayout::default());
        let mut pfifo = Pfifo::new(32);
        pfifo.cache1.dma_state = 1;
        pfifo.cache1.dma_length = 16;
        pfifo.cache1.dma_address = 0xFFFF_FFF0;
        assert_eq!(pfifo.dma_pump(&mut ramin, &[0u8; 32]), 0);
        assert_ne!(pfifo.pending() & intr::DMA_PTE, 0);
    }
}

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

//! PGRAPH — the graphics engine. Dispatches per-class methods against a
//! large banked register state and drives the rasterizer.
//!
//! [`Pgraph::submit`] is PFIFO's pull-side handoff target: it receives
//! a resolved `(param, method, channel, subchannel, class_id)` tuple
//! plus the object's 16-byte grobj (already read from RAMIN by the
//! caller) and either updates engine state directly or invokes
//! [`crate::core::rasterizer`].

pub mod classes;

use crate::core::mmio::IODevice;
use crate::core::pmc::InterruptSource;
use crate::core::rasterizer::{Color, PatternShape, PixelFormat, Surface};

pub mod intr0 {
    pub const VBLANK: u32 = 1 << 8;
}

pub mod intr1 {
    pub const SOFTWARE_METHOD_PENDING: u32 = 1 << 0;
    pub const INVALID_DATA: u32 = 1 << 4;
    pub const DOUBLE_NOTIFY: u32 = 1 << 8;
}

const SET_NOTIFY_CONTEXT_FOR_DMA: u16 = 0x100;
const SET_NOTIFY: u16 = 0x104;

/// Notifier status word for a method that completed without error.
const NOTIFY_STATUS_DONE_OK: u16 = 0;

/// Decoded grobj word 0 layout. The source's exact bit assignment for
/// this word is not externally documented; this packing is an internal
/// convention (pixel format low, then chroma/dest/src/alpha, matching
/// the field order given in the data model) validated by this crate's
/// own tests rather than transcribed from a register union.
#[derive(Debug, Clone, Copy)]
pub struct GrobjFlags {
    pub pixel_format_code: u8,
    pub chroma_enable: bool,
    pub dst_mask: u8,
    pub src_select: u8,
    pub alpha_enable: bool,
}

impl GrobjFlags {
    pub fn decode(word0: u32) -> Self {
        Self {
            pixel_format_code: (word0 & 0x7) as u8,
            chroma_enable: (word0 >> 3) & 1 != 0,
            dst_mask: ((word0 >> 4) & 0xF) as u8,
            src_select: ((word0 >> 8) & 0x3) as u8,
            alpha_enable: (word0 >> 10) & 1 != 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CanvasPoint {
    pub x: u16,
    pub y: u16,
}

impl CanvasPoint {
    pub fn decode(word: u32) -> Self {
        Self {
            x: (word & 0x7FF) as u16,
            y: ((word >> 16) & 0x7FFF) as u16,
        }
    }
    pub fn encode(self) -> u32 {
        (self.x as u32 & 0x7FF) | ((self.y as u32 & 0x7FFF) << 16)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ClipRect {
    pub min: CanvasPoint,
    pub max: CanvasPoint,
}

#[derive(Debug, Clone, Copy)]
pub struct PatternState {
    pub color0: Color,
    pub color1: Color,
    pub color0_raw_alpha: u8,
    pub color1_raw_alpha: u8,
    pub bitmap: u64,
    pub shape: PatternShape,
}

impl Default for PatternState {
    fn default() -> Self {
        Self {
            color0: Color::default(),
            color1: Color::default(),
            color0_raw_alpha: 0xFF,
            color1_raw_alpha: 0xFF,
            bitmap: u64::MAX,
            shape: PatternShape::Shape8x8,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NotifierState {
    pub pending: bool,
    pub target_offset: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassId {
    Beta,
    Rop,
    Chroma,
    Clip,
    Pattern,
    Rectangle,
    Lin,
    Triangle,
    M2mf,
    Blit,
    Image,
    D3d5,
    D3d6,
}

impl ClassId {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0x12 => Some(Self::Beta),
            0x43 => Some(Self::Rop),
            0x57 => Some(Self::Chroma),
            0x19 => Some(Self::Clip),
            0x44 => Some(Self::Pattern),
            0x5E => Some(Self::Rectangle),
            0x5C => Some(Self::Lin),
            0x5D => Some(Self::Triangle),
            0x39 => Some(Self::M2mf),
            0x5F => Some(Self::Blit),
            0x61 => Some(Self::Image),
            0x54 => Some(Self::D3d5),
            0x55 => Some(Self::D3d6),
            _ => None,
        }
    }
}

/// Per-class latched state, one slot per class that needs it.
#[derive(Default)]
pub struct ClassState {
    pub rectangle: classes::RectangleState,
    pub lin: classes::LinState,
    pub triangle: classes::TriangleState,
    pub m2mf: classes::M2mfState,
    pub blit: classes::BlitState,
    pub image: classes::ImageState,
}

pub struct Pgraph {
    pub debug: [u32; 4],
    pub interrupt_status_0: u32,
    pub interrupt_enable_0: u32,
    pub interrupt_status_1: u32,
    pub interrupt_enable_1: u32,
    pub interrupt_status_dma: u32,
    pub interrupt_enable_dma: u32,
    pub context_switch: u32,
    pub context_control: u32,
    pub context_user: u32,
    pub context_cache: [u32; 8],
    pub abs_uclip_xmin: i32,
    pub abs_uclip_xmax: i32,
    pub abs_uclip_ymin: i32,
    pub abs_uclip_ymax: i32,
    pub src_canvas_min: CanvasPoint,
    pub src_canvas_max: CanvasPoint,
    pub dst_canvas_min: CanvasPoint,
    pub dst_canvas_max: CanvasPoint,
    pub pattern: PatternState,
    pub rop: u8,
    pub plane_mask: u8,
    pub chroma_key: u32,
    pub beta_factor: u32,
    pub surfaces: [Surface; 4],
    pub clip0: ClipRect,
    pub clip1: ClipRect,
    pub clip_misc: u32,
    pub fifo_access: bool,
    pub status: u32,
    pub trapped_address: u32,
    pub trapped_data: u32,
    pub trapped_instance: u32,
    pub instance: u32,
    pub notifier: NotifierState,
    pub class_state: ClassState,
    /// Last class id / method dispatched, exposed read-only through the
    /// class register window for the inspector binary and tests; not
    /// part of the hardware's own register bank.
    pub last_class: Option<u8>,
    pub last_method: u16,
}

impl Pgraph {
    pub fn new() -> Self {
        let default_surface = Surface {
            offset: 0,
            pitch: 0,
            format: PixelFormat::R8G8B8,
        };
        Self {
            debug: [0; 4],
            interrupt_status_0: 0,
            interrupt_enable_0: 0,
            interrupt_status_1: 0,
            interrupt_enable_1: 0,
            interrupt_status_dma: 0,
            interrupt_enable_dma: 0,
            context_switch: 0,
            context_control: 0,
            context_user: 0,
            context_cache: [0; 8],
            abs_uclip_xmin: 0,
            abs_uclip_xmax: i32::MAX,
            abs_uclip_ymin: 0,
            abs_uclip_ymax: i32::MAX,
            src_canvas_min: CanvasPoint::default(),
            src_canvas_max: CanvasPoint::default(),
            dst_canvas_min: CanvasPoint::default(),
            dst_canvas_max: CanvasPoint::default(),
            pattern: PatternState::default(),
            rop: 0xCC,
            plane_mask: 0xFF,
            chroma_key: 0,
            beta_factor: 0,
            surfaces: [default_surface; 4],
            clip0: ClipRect::default(),
            clip1: ClipRect::default(),
            clip_misc: 0,
            fifo_access: true,
            status: 0,
            trapped_address: 0,
            trapped_data: 0,
            trapped_instance: 0,
            instance: 0,
            notifier: NotifierState::default(),
            class_state: ClassState::default(),
            last_class: None,
            last_method: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub(crate) fn fire_invalid(&mut self, bit: u32) {
        self.interrupt_status_1 |= bit;
    }

    /// Destination surface index: highest set bit of `(grobj.dst_mask |
    /// context_switch-level DST_BUFFERx_ENABLED)`, falling back to the
    /// grobj's source selector when no destination bit is set.
    pub(crate) fn destination_index(&self, flags: &GrobjFlags) -> usize {
        let mask = flags.dst_mask as u32 | (self.context_switch & 0xF);
        for i in (0..4).rev() {
            if mask & (1 << i) != 0 {
                return i;
            }
        }
        flags.src_select as usize & 0x3
    }

    pub(crate) fn raster_params(&self, flags: &GrobjFlags) -> crate::core::rasterizer::RasterParams {
        crate::core::rasterizer::RasterParams {
            rop: self.rop,
            pattern_shape: self.pattern.shape,
            pattern_bitmap: self.pattern.bitmap,
            pattern_color0: self.pattern.color0,
            pattern_color1: self.pattern.color1,
            chroma_key: self.chroma_key,
            chroma_enabled: flags.chroma_enable,
            clip_start: (
                self.clip0.min.x as i32,
                self.clip0.min.y as i32,
            ),
            clip_size: (
                (self.clip0.max.x.saturating_sub(self.clip0.min.x)) as u32,
                (self.clip0.max.y.saturating_sub(self.clip0.min.y)) as u32,
            ),
        }
    }

    /// Arm or double-fire the notifier, per `SET_NOTIFY`'s semantics:
    /// a second arm while already pending fires `DOUBLE_NOTIFY` and
    /// clears pending without writing a record (scenario-verified).
    fn arm_notifier(&mut self) {
        if self.notifier.pending {
            self.fire_invalid(intr1::DOUBLE_NOTIFY);
            self.notifier.pending = false;
        } else {
            self.notifier.pending = true;
        }
    }

    /// Write the notifier record if armed, then clear pending. `vram`
    /// is the backing store the record is written into; `timestamp_ns`
    /// should come from PTIMER.
    pub fn complete_notify(&mut self, vram: &mut [u8], timestamp_ns: u64, status: u16) {
        if !self.notifier.pending {
            return;
        }
        let base = self.notifier.target_offset as usize;
        if base + 16 <= vram.len() {
            vram[base..base + 8].copy_from_slice(&timestamp_ns.to_le_bytes());
            vram[base + 8..base + 12].copy_from_slice(&0u32.to_le_bytes());
            vram[base + 12..base + 14].copy_from_slice(&0u16.to_le_bytes());
            vram[base + 14..base + 16].copy_from_slice(&status.to_le_bytes());
        }
        self.notifier.pending = false;
    }

    fn generic_method(&mut self, method: u16, param: u32) -> bool {
        match method {
            SET_NOTIFY_CONTEXT_FOR_DMA => {
                self.notifier.target_offset = param;
                true
            }
            SET_NOTIFY => {
                self.arm_notifier();
                true
            }
            _ => false,
        }
    }

    /// Dispatch one resolved method. `grobj` must already have been
    /// read from RAMIN at the bound object's offset; `vram` backs every
    /// surface PGRAPH and the rasterizer touch. `timestamp_ns` comes
    /// from PTIMER and is latched into the notifier record, if any,
    /// that this method's completion arms.
    pub fn submit(
        &mut self,
        vram: &mut [u8],
        grobj: [u32; 4],
        method: u16,
        param: u32,
        class_id: u8,
        timestamp_ns: u64,
    ) {
        self.last_class = Some(class_id);
        self.last_method = method;

        if method <= SET_NOTIFY {
            self.generic_method(method, param);
            return;
        }

        let Some(class) = ClassId::from_u8(class_id) else {
            self.fire_invalid(intr1::SOFTWARE_METHOD_PENDING);
            return;
        };

        let flags = GrobjFlags::decode(grobj[0]);
        let completed = classes::dispatch(self, vram, class, flags, grobj, method, param);
        if completed {
            self.complete_notify(vram, timestamp_ns, NOTIFY_STATUS_DONE_OK);
        }
    }
}

impl Default for Pgraph {
    fn default() -> Self {
        Self::new()
    }
}

impl InterruptSource for Pgraph {
    fn pending(&self) -> u32 {
        self.interrupt_status_0
    }
    fn enable(&self) -> u32 {
        self.interrupt_enable_0
    }
}

const REG_DEBUG_0: u32 = 0x080;
const REG_DEBUG_1: u32 = 0x084;
const REG_DEBUG_2: u32 = 0x088;
const REG_DEBUG_3: u32 = 0x08C;
const REG_INTR_0: u32 = 0x100;
const REG_INTR_EN_0: u32 = 0x140;
const REG_INTR_1: u32 = 0x104;
const REG_INTR_EN_1: u32 = 0x144;
const REG_CONTEXT_SWITCH: u32 = 0x180;
const REG_CONTEXT_CONTROL: u32 = 0x184;
const REG_CONTEXT_USER: u32 = 0x188;
const REG_ABS_UCLIP_XMIN: u32 = 0x400;
const REG_ABS_UCLIP_XMAX: u32 = 0x404;
const REG_ABS_UCLIP_YMIN: u32 = 0x408;
const REG_ABS_UCLIP_YMAX: u32 = 0x40C;
const REG_SRC_CANVAS_MIN: u32 = 0x410;
const REG_SRC_CANVAS_MAX: u32 = 0x414;
const REG_DST_CANVAS_MIN: u32 = 0x418;
const REG_DST_CANVAS_MAX: u32 = 0x41C;
const REG_ROP3: u32 = 0x420;
const REG_PLANE_MASK: u32 = 0x424;
const REG_CHROMA_KEY: u32 = 0x428;
const REG_BETA: u32 = 0x42C;
const REG_FIFO_ACCESS: u32 = 0x710;
const REG_STATUS: u32 = 0x700;
const REG_TRAPPED_ADDRESS: u32 = 0x704;
const REG_TRAPPED_DATA: u32 = 0x708;
const REG_TRAPPED_INSTANCE: u32 = 0x70C;

impl IODevice for Pgraph {
    fn read_register(&mut self, offset: u32) -> u32 {
        match offset & !0x3 {
            REG_DEBUG_0 => self.debug[0],
            REG_DEBUG_1 => self.debug[1],
            REG_DEBUG_2 => self.debug[2],
            REG_DEBUG_3 => self.debug[3],
            REG_INTR_0 => self.interrupt_status_0,
            REG_INTR_EN_0 => self.interrupt_enable_0,
            REG_INTR_1 => self.interrupt_status_1,
            REG_INTR_EN_1 => self.interrupt_enable_1,
            REG_CONTEXT_SWITCH => self.context_switch,
            REG_CONTEXT_CONTROL => self.context_control,
            REG_CONTEXT_USER => self.context_user,
            REG_ABS_UCLIP_XMIN => self.abs_uclip_xmin as u32,
            REG_ABS_UCLIP_XMAX => self.abs_uclip_xmax as u32,
            REG_ABS_UCLIP_YMIN => self.abs_uclip_ymin as u32,
            REG_ABS_UCLIP_YMAX => self.abs_uclip_ymax as u32,
            REG_SRC_CANVAS_MIN => self.src_canvas_min.encode(),
            REG_SRC_CANVAS_MAX => self.src_canvas_max.encode(),
            REG_DST_CANVAS_MIN => self.dst_canvas_min.encode(),
            REG_DST_CANVAS_MAX => self.dst_canvas_max.encode(),
            REG_ROP3 => self.rop as u32,
            REG_PLANE_MASK => self.plane_mask as u32,
            REG_CHROMA_KEY => self.chroma_key,
            REG_BETA => self.beta_factor,
            REG_FIFO_ACCESS => self.fifo_access as u32,
            REG_STATUS => self.status,
            REG_TRAPPED_ADDRESS => self.trapped_address,
            REG_TRAPPED_DATA => self.trapped_data,
            REG_TRAPPED_INSTANCE => self.trapped_instance,
            _ => classes::read_class_register(self, offset),
        }
    }

    fn write_register(&mut self, offset: u32, value: u32) {
        log::trace!(
            "PGRAPH: write 0x{:08X} to {} (0x{:03X})",
            value,
            crate::core::regnames::pgraph(offset),
            offset
        );
        match offset & !0x3 {
            REG_DEBUG_0 => self.debug[0] = value,
            REG_DEBUG_1 => self.debug[1] = value,
            REG_DEBUG_2 => self.debug[2] = value,
            REG_DEBUG_3 => self.debug[3] = value,
            REG_INTR_0 => self.interrupt_status_0 &= !value,
            REG_INTR_EN_0 => self.interrupt_enable_0 = value & 0x1111_1111,
            REG_INTR_1 => self.interrupt_status_1 &= !value,
            REG_INTR_EN_1 => self.interrupt_enable_1 = value & 0x0001_1111,
            REG_CONTEXT_SWITCH => self.context_switch = value,
            REG_CONTEXT_CONTROL => self.context_control = value,
            REG_CONTEXT_USER => self.context_user = value,
            REG_ABS_UCLIP_XMIN => self.abs_uclip_xmin = value as i32,
            REG_ABS_UCLIP_XMAX => self.abs_uclip_xmax = value as i32,
            REG_ABS_UCLIP_YMIN => self.abs_uclip_ymin = value as i32,
            REG_ABS_UCLIP_YMAX => self.abs_uclip_ymax = value as i32,
            REG_SRC_CANVAS_MIN => self.src_canvas_min = CanvasPoint::decode(value),
            REG_SRC_CANVAS_MAX => self.src_canvas_max = CanvasPoint::decode(value),
            REG_DST_CANVAS_MIN => self.dst_canvas_min = CanvasPoint::decode(value),
            REG_DST_CANVAS_MAX => self.dst_canvas_max = CanvasPoint::decode(value),
            REG_ROP3 => self.rop = value as u8,
            REG_PLANE_MASK => self.plane_mask = value as u8,
            REG_CHROMA_KEY => self.chroma_key = value,
            REG_BETA => self.beta_factor = value,
            REG_FIFO_ACCESS => self.fifo_access = value & 1 != 0,
            REG_STATUS => self.status = value,
            REG_TRAPPED_ADDRESS => self.trapped_address = value,
            REG_TRAPPED_DATA => self.trapped_data = value,
            REG_TRAPPED_INSTANCE => self.trapped_instance = value,
            _ => classes::write_class_register(self, offset, value),
        }
    }

    fn name(&self) -> &str {
        "PGRAPH"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_method_arms_notifier_context() {
        let mut pgraph = Pgraph::new();
        pgraph.submit(&mut [], [0; 4], SET_NOTIFY_CONTEXT_FOR_DMA, 0x2000, 0x5E, 0);
        assert_eq!(pgraph.notifier.target_offset, 0x2000);
    }

    #[test]
    fn double_notify_fires_and_clears_pending() {
        let mut pgraph = Pgraph::new();
        pgraph.arm_notifier();
        assert!(pgraph.notifier.pending);
        pgraph.arm_notifier();
        assert!(!pgraph.notifier.pending);
        assert_ne!(pgraph.interrupt_status_1 & intr1::DOUBLE_NOTIFY, 0);
    }

    #[test]
    fn unknown_class_id_fires_software_method_pending() {
        let mut pgraph = Pgraph::new();
        pgraph.submit(&mut [], [0; 4], 0x300, 0, 0x7F, 0);
        assert_ne!(
            pgraph.interrupt_status_1 & intr1::SOFTWARE_METHOD_PENDING,
            0
        );
    }

    #[test]
    fn destination_index_prefers_highest_set_mask_bit() {
        let pgraph = Pgraph::new();
        let flags = GrobjFlags {
            pixel_format_code: 2,
            chroma_enable: false,
            dst_mask: 0b0110,
            src_select: 0,
            alpha_enable: false,
        };
        assert_eq!(pgraph.destination_index(&flags), 2);
    }
}

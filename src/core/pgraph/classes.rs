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

//! Per-class method handlers. Each of the thirteen object classes gets
//! its own latched state (held in [`super::ClassState`]) and a set of
//! method offsets it understands; everything else falls through to
//! [`super::Pgraph::generic_method`] or fires `SOFTWARE_METHOD_PENDING`
//! (an unrecognized method offset, not bad parameter data).
//!
//! [`dispatch`] returns whether the method it just ran is the one that
//! completes the operation the class represents (so `Pgraph::submit`
//! knows whether to fire the armed notifier). Classes with no natural
//! "done" method (Beta, Rop, Chroma, Clip, Pattern) never complete one.

use super::{CanvasPoint, ClassId, GrobjFlags, Pgraph};
use crate::core::rasterizer::{self, Color, PixelFormat, Surface};

const SET_COLOR: u16 = 0x304;
const POSITION: u16 = 0x400;
const SIZE: u16 = 0x404;
const POSITION_STRIDE: u16 = 0x008;
const POSITION_SIZE_PAIRS: u16 = 16;

const LIN_POINT: u16 = 0x400;

const TRIANGLE_VERTEX: u16 = 0x400;
const TRIANGLE_CAPACITY: usize = 128;

const M2MF_OFFSET_IN: u16 = 0x30C;
const M2MF_OFFSET_OUT: u16 = 0x310;
const M2MF_PITCH_IN: u16 = 0x314;
const M2MF_PITCH_OUT: u16 = 0x318;
const M2MF_LINE_LENGTH: u16 = 0x31C;
const M2MF_LINE_COUNT: u16 = 0x320;
const M2MF_FORMAT: u16 = 0x324;
const M2MF_BUFFER_NOTIFY: u16 = 0x328;

const BLIT_POINT_IN: u16 = 0x300;
const BLIT_POINT_OUT: u16 = 0x304;
const BLIT_SIZE: u16 = 0x308;

const IMAGE_POINT: u16 = 0x300;
const IMAGE_SIZE_IN: u16 = 0x304;
const IMAGE_SIZE_OUT: u16 = 0x308;
const IMAGE_COLOR: u16 = 0x400;

/// `SET_COLOR` + repeated `(POSITION, SIZE)` pairs, one `fill_rect` per
/// `SIZE` write. Matches scenario 4's "draw N rectangles from one bound
/// object" usage.
#[derive(Default)]
pub struct RectangleState {
    pub color: Color,
    pub positions: [CanvasPoint; POSITION_SIZE_PAIRS as usize],
}

/// A sequence of line segments between successively pushed endpoints;
/// the first `POINT` after a reset only latches `current`, every
/// subsequent one also draws.
#[derive(Default)]
pub struct LinState {
    pub color: Color,
    pub current: Option<CanvasPoint>,
}

/// Shared by Triangle, D3D5 and D3D6: a vertex buffer filled three at a
/// time, flushed as a flat-shaded triangle on every third push. The two
/// D3D classes add texture/alpha state that this crate does not sample
/// (per-texel shading is out of scope); they still rasterize the
/// triangle's footprint flat-shaded so their draw calls are visible.
pub struct TriangleState {
    pub color: Color,
    pub vertices: [CanvasPoint; TRIANGLE_CAPACITY],
    pub count: usize,
    pub texture_format: u32,
    pub texture_filter: u32,
    pub control_out: u32,
    pub alpha_control: u32,
}

impl Default for TriangleState {
    fn default() -> Self {
        Self {
            color: Color::default(),
            vertices: [CanvasPoint::default(); TRIANGLE_CAPACITY],
            count: 0,
            texture_format: 0,
            texture_filter: 0,
            control_out: 0,
            alpha_control: 0,
        }
    }
}

#[derive(Default)]
pub struct M2mfState {
    pub offset_in: u32,
    pub offset_out: u32,
    pub pitch_in: u32,
    pub pitch_out: u32,
    pub line_length: u32,
    pub line_count: u32,
    pub format: u32,
}

#[derive(Default)]
pub struct BlitState {
    pub point_in: CanvasPoint,
    pub point_out: CanvasPoint,
}

#[derive(Default)]
pub struct ImageState {
    pub point: CanvasPoint,
    pub size_in: CanvasPoint,
    pub size_out: CanvasPoint,
    pub cursor: u32,
}

/// Width/height words (rectangle, blit, and image `SIZE*` methods) are
/// full 16-bit fields, unlike [`CanvasPoint::decode`]'s coordinate
/// packing (x masked to 11 bits) used for positions and vertices.
fn decode_size(word: u32) -> CanvasPoint {
    CanvasPoint {
        x: (word & 0xFFFF) as u16,
        y: ((word >> 16) & 0xFFFF) as u16,
    }
}

fn dst_surface<'a>(pgraph: &'a Pgraph, flags: &GrobjFlags) -> &'a Surface {
    &pgraph.surfaces[pgraph.destination_index(flags)]
}

fn src_surface<'a>(pgraph: &'a Pgraph, flags: &GrobjFlags) -> &'a Surface {
    &pgraph.surfaces[flags.src_select as usize & 0x3]
}

/// Dispatch one method against the class it targets. Returns `true`
/// when this call performs the operation the class exists for (the
/// point at which an armed notifier should fire).
pub fn dispatch(
    pgraph: &mut Pgraph,
    vram: &mut [u8],
    class: ClassId,
    flags: GrobjFlags,
    grobj: [u32; 4],
    method: u16,
    param: u32,
) -> bool {
    match class {
        ClassId::Beta => {
            if method == 0x300 {
                // Fixed-point 1.30: a set sign bit clamps to zero rather
                // than wrapping, and only the fraction bits are kept.
                pgraph.beta_factor = if param & 0x8000_0000 != 0 {
                    0
                } else {
                    param & 0x7F80_0000
                };
            } else {
                pgraph.fire_invalid(super::intr1::SOFTWARE_METHOD_PENDING);
            }
            false
        }
        ClassId::Rop => {
            if method == 0x300 {
                pgraph.rop = param as u8;
            } else {
                pgraph.fire_invalid(super::intr1::SOFTWARE_METHOD_PENDING);
            }
            false
        }
        ClassId::Chroma => {
            if method == 0x300 {
                pgraph.chroma_key = param;
            } else {
                pgraph.fire_invalid(super::intr1::SOFTWARE_METHOD_PENDING);
            }
            false
        }
        ClassId::Clip => {
            match method {
                0x300 => pgraph.clip0.min = CanvasPoint::decode(param),
                0x304 => pgraph.clip0.max = CanvasPoint::decode(param),
                _ => pgraph.fire_invalid(super::intr1::SOFTWARE_METHOD_PENDING),
            }
            false
        }
        ClassId::Pattern => {
            dispatch_pattern(pgraph, method, param);
            false
        }
        ClassId::Rectangle => dispatch_rectangle(pgraph, vram, flags, method, param),
        ClassId::Lin => dispatch_lin(pgraph, vram, flags, method, param),
        ClassId::Triangle => dispatch_triangle(pgraph, vram, flags, method, param, false),
        ClassId::D3d5 | ClassId::D3d6 => dispatch_d3d(pgraph, vram, flags, method, param),
        ClassId::M2mf => dispatch_m2mf(pgraph, vram, method, param),
        ClassId::Blit => dispatch_blit(pgraph, vram, flags, method, param),
        ClassId::Image => dispatch_image(pgraph, vram, flags, grobj, method, param),
    }
}

fn dispatch_pattern(pgraph: &mut Pgraph, method: u16, param: u32) {
    match method {
        0x300 => {
            pgraph.pattern.shape = rasterizer::PatternShape::from_code(param);
        }
        0x304 => {
            pgraph.pattern.color0_raw_alpha = (param >> 24) as u8;
            pgraph.pattern.color0 =
                rasterizer::expand_color(param, PixelFormat::R8G8B8, true);
        }
        0x308 => {
            pgraph.pattern.color1_raw_alpha = (param >> 24) as u8;
            pgraph.pattern.color1 =
                rasterizer::expand_color(param, PixelFormat::R8G8B8, true);
        }
        0x30C => {
            let lo = param as u64;
            pgraph.pattern.bitmap = (pgraph.pattern.bitmap & !0xFFFF_FFFF) | lo;
        }
        0x310 => {
            let hi = (param as u64) << 32;
            pgraph.pattern.bitmap = (pgraph.pattern.bitmap & 0xFFFF_FFFF) | hi;
        }
        _ => pgraph.fire_invalid(super::intr1::SOFTWARE_METHOD_PENDING),
    }
}

fn dispatch_rectangle(
    pgraph: &mut Pgraph,
    vram: &mut [u8],
    flags: GrobjFlags,
    method: u16,
    param: u32,
) -> bool {
    if method == SET_COLOR {
        pgraph.class_state.rectangle.color =
            rasterizer::expand_color(param, PixelFormat::R8G8B8, flags.alpha_enable);
        return false;
    }
    if method < POSITION || method >= POSITION + POSITION_SIZE_PAIRS * POSITION_STRIDE {
        pgraph.fire_invalid(super::intr1::SOFTWARE_METHOD_PENDING);
        return false;
    }
    let rel = method - POSITION;
    let index = (rel / POSITION_STRIDE) as usize;
    let is_position = rel % POSITION_STRIDE == 0;

    if is_position {
        pgraph.class_state.rectangle.positions[index] = CanvasPoint::decode(param);
        false
    } else {
        debug_assert_eq!(method, POSITION + index as u16 * POSITION_STRIDE + (SIZE - POSITION));
        let pos = pgraph.class_state.rectangle.positions[index];
        let size = decode_size(param);
        let color = pgraph.class_state.rectangle.color;
        let params = pgraph.raster_params(&flags);
        let dst = *dst_surface(pgraph, &flags);
        rasterizer::fill_rect(
            vram,
            &dst,
            (pos.x as u32, pos.y as u32),
            (size.x as u32, size.y as u32),
            color,
            &params,
        );
        true
    }
}

fn dispatch_lin(
    pgraph: &mut Pgraph,
    vram: &mut [u8],
    flags: GrobjFlags,
    method: u16,
    param: u32,
) -> bool {
    if method == SET_COLOR {
        pgraph.class_state.lin.color =
            rasterizer::expand_color(param, PixelFormat::R8G8B8, flags.alpha_enable);
        return false;
    }
    if method != LIN_POINT {
        pgraph.fire_invalid(super::intr1::SOFTWARE_METHOD_PENDING);
        return false;
    }
    let point = CanvasPoint::decode(param);
    let completed = if let Some(prev) = pgraph.class_state.lin.current {
        let color = pgraph.class_state.lin.color;
        let params = pgraph.raster_params(&flags);
        let dst = *dst_surface(pgraph, &flags);
        rasterizer::draw_line(
            vram,
            &dst,
            (prev.x as i32, prev.y as i32),
            (point.x as i32, point.y as i32),
            color,
            &params,
        );
        true
    } else {
        false
    };
    pgraph.class_state.lin.current = Some(point);
    completed
}

fn push_triangle_vertex(state: &mut TriangleState, point: CanvasPoint) -> bool {
    state.vertices[state.count % TRIANGLE_CAPACITY] = point;
    state.count += 1;
    state.count % 3 == 0
}

fn flush_triangle(
    pgraph: &mut Pgraph,
    vram: &mut [u8],
    flags: GrobjFlags,
    color: Color,
) {
    let tri = &pgraph.class_state.triangle;
    let base = tri.count - 3;
    let verts = [
        tri.vertices[base % TRIANGLE_CAPACITY],
        tri.vertices[(base + 1) % TRIANGLE_CAPACITY],
        tri.vertices[(base + 2) % TRIANGLE_CAPACITY],
    ]
    .map(|p| (p.x as i32, p.y as i32));
    let params = pgraph.raster_params(&flags);
    let dst = *dst_surface(pgraph, &flags);
    rasterizer::fill_triangle(vram, &dst, verts, color, &params);
}

fn dispatch_triangle(
    pgraph: &mut Pgraph,
    vram: &mut [u8],
    flags: GrobjFlags,
    method: u16,
    param: u32,
    _is_d3d: bool,
) -> bool {
    if method == SET_COLOR {
        pgraph.class_state.triangle.color =
            rasterizer::expand_color(param, PixelFormat::R8G8B8, flags.alpha_enable);
        return false;
    }
    if method != TRIANGLE_VERTEX {
        pgraph.fire_invalid(super::intr1::SOFTWARE_METHOD_PENDING);
        return false;
    }
    let point = CanvasPoint::decode(param);
    let completed = push_triangle_vertex(&mut pgraph.class_state.triangle, point);
    if completed {
        let color = pgraph.class_state.triangle.color;
        flush_triangle(pgraph, vram, flags, color);
    }
    completed
}

const D3D_TEXTURE_FORMAT: u16 = 0x308;
const D3D_TEXTURE_FILTER: u16 = 0x30C;
const D3D_CONTROL_OUT: u16 = 0x310;
const D3D_ALPHA_CONTROL: u16 = 0x314;

fn dispatch_d3d(
    pgraph: &mut Pgraph,
    vram: &mut [u8],
    flags: GrobjFlags,
    method: u16,
    param: u32,
) -> bool {
    match method {
        D3D_TEXTURE_FORMAT => {
            pgraph.class_state.triangle.texture_format = param;
            false
        }
        D3D_TEXTURE_FILTER => {
            pgraph.class_state.triangle.texture_filter = param;
            false
        }
        D3D_CONTROL_OUT => {
            pgraph.class_state.triangle.control_out = param;
            false
        }
        D3D_ALPHA_CONTROL => {
            pgraph.class_state.triangle.alpha_control = param;
            false
        }
        _ => dispatch_triangle(pgraph, vram, flags, method, param, true),
    }
}

fn dispatch_m2mf(pgraph: &mut Pgraph, vram: &mut [u8], method: u16, param: u32) -> bool {
    let m2mf = &mut pgraph.class_state.m2mf;
    match method {
        M2MF_OFFSET_IN => {
            m2mf.offset_in = param;
            false
        }
        M2MF_OFFSET_OUT => {
            m2mf.offset_out = param;
            false
        }
        M2MF_PITCH_IN => {
            m2mf.pitch_in = param;
            false
        }
        M2MF_PITCH_OUT => {
            m2mf.pitch_out = param;
            false
        }
        M2MF_LINE_LENGTH => {
            m2mf.line_length = param;
            false
        }
        M2MF_LINE_COUNT => {
            m2mf.line_count = param;
            false
        }
        M2MF_FORMAT => {
            m2mf.format = param;
            false
        }
        M2MF_BUFFER_NOTIFY => {
            let m2mf = &pgraph.class_state.m2mf;
            let (offset_in, offset_out, pitch_in, pitch_out, line_length, line_count) = (
                m2mf.offset_in as usize,
                m2mf.offset_out as usize,
                m2mf.pitch_in as usize,
                m2mf.pitch_out as usize,
                m2mf.line_length as usize,
                m2mf.line_count as usize,
            );
            for line in 0..line_count {
                let src_base = offset_in + line * pitch_in;
                let dst_base = offset_out + line * pitch_out;
                if src_base + line_length > vram.len() || dst_base + line_length > vram.len() {
                    continue;
                }
                let mut buf = vec![0u8; line_length];
                buf.copy_from_slice(&vram[src_base..src_base + line_length]);
                vram[dst_base..dst_base + line_length].copy_from_slice(&buf);
            }
            true
        }
        _ => {
            pgraph.fire_invalid(super::intr1::SOFTWARE_METHOD_PENDING);
            false
        }
    }
}

fn dispatch_blit(
    pgraph: &mut Pgraph,
    vram: &mut [u8],
    flags: GrobjFlags,
    method: u16,
    param: u32,
) -> bool {
    match method {
        BLIT_POINT_IN => {
            pgraph.class_state.blit.point_in = CanvasPoint::decode(param);
            false
        }
        BLIT_POINT_OUT => {
            pgraph.class_state.blit.point_out = CanvasPoint::decode(param);
            false
        }
        BLIT_SIZE => {
            let size = decode_size(param);
            let blit = &pgraph.class_state.blit;
            let (point_in, point_out) = (blit.point_in, blit.point_out);
            let params = pgraph.raster_params(&flags);
            let src = *src_surface(pgraph, &flags);
            let dst = *dst_surface(pgraph, &flags);
            rasterizer::blit_rect(
                vram,
                &src,
                &dst,
                (point_in.x as u32, point_in.y as u32),
                (point_out.x as u32, point_out.y as u32),
                (size.x as u32, size.y as u32),
                &params,
            );
            true
        }
        _ => {
            pgraph.fire_invalid(super::intr1::SOFTWARE_METHOD_PENDING);
            false
        }
    }
}

/// Image streams pixels in row-major order starting at `IMAGE_POINT`
/// over a `IMAGE_SIZE_IN`-wide source rect, writing `IMAGE_SIZE_OUT`
/// pixels at the destination; every `IMAGE_COLOR` write unpacks and
/// stores one more pixel until the rect is full.
fn dispatch_image(
    pgraph: &mut Pgraph,
    vram: &mut [u8],
    flags: GrobjFlags,
    grobj: [u32; 4],
    method: u16,
    param: u32,
) -> bool {
    match method {
        IMAGE_POINT => {
            pgraph.class_state.image.point = CanvasPoint::decode(param);
            pgraph.class_state.image.cursor = 0;
            false
        }
        IMAGE_SIZE_IN => {
            pgraph.class_state.image.size_in = decode_size(param);
            false
        }
        IMAGE_SIZE_OUT => {
            pgraph.class_state.image.size_out = decode_size(param);
            pgraph.class_state.image.cursor = 0;
            false
        }
        IMAGE_COLOR => {
            let bpp = match PixelFormat::from_code(grobj[0] as u8 & 0x7) {
                Ok(PixelFormat::R5G5B5) => 16,
                Ok(PixelFormat::Y8) => 8,
                _ => 32,
            };
            let pixels = rasterizer::unpack_host_words(&[param], bpp);
            let image = &mut pgraph.class_state.image;
            let width = image.size_out.x.max(1) as u32;
            let total = image.size_out.x as u32 * image.size_out.y as u32;
            let dst = *dst_surface(pgraph, &flags);
            let params = pgraph.raster_params(&flags);
            let mut completed = false;
            for packed in pixels {
                if image.cursor >= total {
                    break;
                }
                let x = image.point.x as u32 + image.cursor % width;
                let y = image.point.y as u32 + image.cursor / width;
                let color = rasterizer::expand_color(packed, dst.format, flags.alpha_enable);
                rasterizer::fill_rect(vram, &dst, (x, y), (1, 1), color, &params);
                image.cursor += 1;
                if image.cursor >= total {
                    completed = true;
                }
            }
            completed
        }
        _ => {
            pgraph.fire_invalid(super::intr1::SOFTWARE_METHOD_PENDING);
            false
        }
    }
}

/// Fallback read for PGRAPH's per-class register window mirror
/// (`0x410000 + class_index * 0x10000`, per the MMIO decode table).
/// Real hardware exposes this mostly as a write-only method-push
/// surface; the one thing worth reading back here is which class/method
/// PGRAPH last actually dispatched, which the inspector binary and
/// tests use for introspection.
pub fn read_class_register(pgraph: &Pgraph, offset: u32) -> u32 {
    match offset & !0x3 {
        0x000 => pgraph.last_class.map(u32::from).unwrap_or(0xFFFF_FFFF),
        0x004 => pgraph.last_method as u32,
        _ => 0,
    }
}

pub fn write_class_register(pgraph: &mut Pgraph, offset: u32, _value: u32) {
    log::trace!(
        "PGRAPH: write to unmapped class register offset 0x{:03X}",
        offset
    );
    let _ = pgraph;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pgraph::Pgraph;

    fn grobj(pixel_format_code: u8) -> [u32; 4] {
        [pixel_format_code as u32, 0, 0, 0]
    }

    fn grobj_chroma_enabled(pixel_format_code: u8) -> [u32; 4] {
        [pixel_format_code as u32 | (1 << 3), 0, 0, 0]
    }

    /// A chroma-keyed object whose fill color matches the chroma key
    /// draws nothing.
    #[test]
    fn chroma_key_suppresses_matching_rectangle_fill() {
        let mut pgraph = Pgraph::new();
        pgraph.surfaces[0] = Surface {
            offset: 0,
            pitch: 256,
            format: PixelFormat::R8G8B8,
        };
        pgraph.chroma_key = 0x80FF_0000; // alpha bit + red
        let mut vram = vec![0u8; 256 * 64];
        pgraph.submit(
            &mut vram,
            grobj_chroma_enabled(2),
            SET_COLOR,
            0x00FF_0000,
            0x5E,
            0,
        );
        pgraph.submit(
            &mut vram,
            grobj_chroma_enabled(2),
            POSITION,
            CanvasPoint { x: 16, y: 16 }.encode(),
            0x5E,
            0,
        );
        pgraph.submit(
            &mut vram,
            grobj_chroma_enabled(2),
            SIZE,
            CanvasPoint { x: 32, y: 32 }.encode(),
            0x5E,
            0,
        );
        let pixel = rasterizer::read_pixel(&vram, &pgraph.surfaces[0], 20, 20);
        assert_eq!(pixel & 0x00FF_FFFF, 0);
    }

    #[test]
    fn rectangle_fills_on_size_write() {
        let mut pgraph = Pgraph::new();
        pgraph.surfaces[0] = Surface {
            offset: 0,
            pitch: 256,
            format: PixelFormat::R8G8B8,
        };
        let mut vram = vec![0u8; 256 * 64];
        pgraph.submit(&mut vram, grobj(2), SET_COLOR, 0x00FF_0000, 0x5E, 0);
        pgraph.submit(&mut vram, grobj(2), POSITION, CanvasPoint { x: 4, y: 4 }.encode(), 0x5E, 0);
        pgraph.submit(&mut vram, grobj(2), SIZE, CanvasPoint { x: 8, y: 8 }.encode(), 0x5E, 0);
        let pixel = rasterizer::read_pixel(
            &vram,
            &Surface {
                offset: 0,
                pitch: 256,
                format: PixelFormat::R8G8B8,
            },
            6,
            6,
        );
        assert_eq!(pixel & 0x00FF_FFFF, 0x00FF_0000);
    }

    #[test]
    fn lin_draws_only_from_second_point_onward() {
        let mut pgraph = Pgraph::new();
        pgraph.surfaces[0] = Surface {
            offset: 0,
            pitch: 256,
            format: PixelFormat::R8G8B8,
        };
        let mut vram = vec![0u8; 256 * 64];
        pgraph.submit(&mut vram, grobj(2), SET_COLOR, 0x0000_FF00, 0x5C, 0);
        pgraph.submit(&mut vram, grobj(2), LIN_POINT, CanvasPoint { x: 0, y: 0 }.encode(), 0x5C, 0);
        assert_eq!(rasterizer::read_pixel(&vram, &pgraph.surfaces[0], 5, 0) & 0x00FF_FFFF, 0);
        pgraph.submit(&mut vram, grobj(2), LIN_POINT, CanvasPoint { x: 10, y: 0 }.encode(), 0x5C, 0);
        assert_eq!(
            rasterizer::read_pixel(&vram, &pgraph.surfaces[0], 5, 0) & 0x00FF_FFFF,
            0x0000_FF00
        );
    }

    #[test]
    fn triangle_flushes_every_third_vertex() {
        let mut pgraph = Pgraph::new();
        pgraph.surfaces[0] = Surface {
            offset: 0,
            pitch: 256,
            format: PixelFormat::R8G8B8,
        };
        let mut vram = vec![0u8; 256 * 64];
        pgraph.submit(&mut vram, grobj(2), SET_COLOR, 0x00FF_0000, 0x5D, 0);
        pgraph.submit(&mut vram, grobj(2), TRIANGLE_VERTEX, CanvasPoint { x: 0, y: 0 }.encode(), 0x5D, 0);
        pgraph.submit(&mut vram, grobj(2), TRIANGLE_VERTEX, CanvasPoint { x: 40, y: 0 }.encode(), 0x5D, 0);
        assert_eq!(rasterizer::read_pixel(&vram, &pgraph.surfaces[0], 5, 2) & 0x00FF_FFFF, 0);
        pgraph.submit(&mut vram, grobj(2), TRIANGLE_VERTEX, CanvasPoint { x: 0, y: 40 }.encode(), 0x5D, 0);
        assert_eq!(
            rasterizer::read_pixel(&vram, &pgraph.surfaces[0], 5, 2) & 0x00FF_FFFF,
            0x00FF_0000
        );
    }

    #[test]
    fn m2mf_copies_lines_and_completes() {
        let mut pgraph = Pgraph::new();
        let mut vram = vec![0u8; 4096];
        for (i, byte) in vram.iter_mut().take(64).enumerate() {
            *byte = i as u8;
        }
        pgraph.submit(&mut vram, grobj(2), M2MF_OFFSET_IN, 0, 0x39, 0);
        pgraph.submit(&mut vram, grobj(2), M2MF_OFFSET_OUT, 1024, 0x39, 0);
        pgraph.submit(&mut vram, grobj(2), M2MF_PITCH_IN, 64, 0x39, 0);
        pgraph.submit(&mut vram, grobj(2), M2MF_PITCH_OUT, 64, 0x39, 0);
        pgraph.submit(&mut vram, grobj(2), M2MF_LINE_LENGTH, 64, 0x39, 0);
        let completed_before = pgraph.notifier.pending;
        pgraph.submit(&mut vram, grobj(2), M2MF_LINE_COUNT, 1, 0x39, 0);
        pgraph.arm_notifier();
        pgraph.submit(&mut vram, grobj(2), M2MF_BUFFER_NOTIFY, 0, 0x39, 0);
        assert_eq!(&vram[1024..1088], &vram[0..64]);
        assert!(!completed_before);
        assert!(!pgraph.notifier.pending);
    }

    #[test]
    fn blit_stages_then_copies() {
        let mut pgraph = Pgraph::new();
        pgraph.surfaces[0] = Surface {
            offset: 0,
            pitch: 256,
            format: PixelFormat::R8G8B8,
        };
        let mut vram = vec![0u8; 256 * 64];
        rasterizer::write_pixel(&mut vram, &pgraph.surfaces[0], 0, 0, 0x00AA_BBCC);
        pgraph.submit(&mut vram, grobj(2), BLIT_POINT_IN, CanvasPoint { x: 0, y: 0 }.encode(), 0x5F, 0);
        pgraph.submit(&mut vram, grobj(2), BLIT_POINT_OUT, CanvasPoint { x: 4, y: 0 }.encode(), 0x5F, 0);
        pgraph.submit(&mut vram, grobj(2), BLIT_SIZE, CanvasPoint { x: 1, y: 1 }.encode(), 0x5F, 0);
        let pixel = rasterizer::read_pixel(&vram, &pgraph.surfaces[0], 4, 0);
        assert_eq!(pixel & 0x00FF_FFFF, 0x00AA_BBCC & 0x00FF_FFFF);
    }

    #[test]
    fn image_streams_pixels_until_rect_full() {
        let mut pgraph = Pgraph::new();
        pgraph.surfaces[0] = Surface {
            offset: 0,
            pitch: 256,
            format: PixelFormat::R8G8B8,
        };
        let mut vram = vec![0u8; 256 * 64];
        pgraph.submit(&mut vram, grobj(2), IMAGE_POINT, CanvasPoint { x: 0, y: 0 }.encode(), 0x61, 0);
        pgraph.submit(&mut vram, grobj(2), IMAGE_SIZE_OUT, CanvasPoint { x: 2, y: 1 }.encode(), 0x61, 0);
        pgraph.submit(&mut vram, grobj(2), IMAGE_COLOR, 0x00FF_0000, 0x61, 0);
        assert_eq!(
            rasterizer::read_pixel(&vram, &pgraph.surfaces[0], 0, 0) & 0x00FF_FFFF,
            0x00FF_0000
        );
        pgraph.submit(&mut vram, grobj(2), IMAGE_COLOR, 0x0000_FF00, 0x61, 0);
        assert_eq!(
            rasterizer::read_pixel(&vram, &pgraph.surfaces[0], 1, 0) & 0x00FF_FFFF,
            0x0000_FF00
        );
    }

    #[test]
    fn unknown_method_on_known_class_fires_software_method_pending() {
        let mut pgraph = Pgraph::new();
        let mut vram = vec![0u8; 64];
        pgraph.submit(&mut vram, grobj(2), 0x500, 0, 0x12, 0);
        assert_ne!(
            pgraph.interrupt_status_1 & super::super::intr1::SOFTWARE_METHOD_PENDING,
            0
        );
    }
}

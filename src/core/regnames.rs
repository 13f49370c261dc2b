// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut

//! Register-name tables for trace/debug logging only. Never consulted
//! for dispatch — every subsystem still matches on the raw offset
//! constant; these tables exist purely so a `trace!` line reads
//! `PGRAPH.BETA` instead of `PGRAPH offset 0x42C`.

pub fn pmc(offset: u32) -> &'static str {
    match offset & !0x3 {
        0x000 => "PMC.BOOT",
        0x100 => "PMC.INTR_0",
        0x140 => "PMC.INTR_EN_0",
        0x200 => "PMC.ENABLE",
        _ => "PMC.<reserved>",
    }
}

pub fn pbus(offset: u32) -> &'static str {
    match offset & !0x3 {
        0x100 => "PBUS.INTR",
        0x140 => "PBUS.INTR_EN",
        0x200 => "PBUS.RMA_MODE",
        0x204 => "PBUS.RMA_TARGET",
        0x208 => "PBUS.RMA_DATA",
        o if o >= 0x1800 && o < 0x1900 => "PBUS.PCI_CONFIG_MIRROR",
        _ => "PBUS.<reserved>",
    }
}

pub fn pfifo(offset: u32) -> &'static str {
    match offset & !0x3 {
        0x100 => "PFIFO.INTR",
        0x140 => "PFIFO.INTR_EN",
        0x400 => "PFIFO.RUNOUT_PUT",
        0x404 => "PFIFO.RUNOUT_GET",
        0x1200 => "PFIFO.CACHE1_PUSH0",
        0x1204 => "PFIFO.CACHE1_PULL0",
        0x1208 => "PFIFO.CACHE1_CHANNEL",
        0x120C => "PFIFO.CACHE1_REASSIGNMENT",
        0x1210 => "PFIFO.CACHE1_PUT",
        0x1214 => "PFIFO.CACHE1_GET",
        0x1220 => "PFIFO.CACHE1_DMA_STATE",
        0x1224 => "PFIFO.CACHE1_DMA_LENGTH",
        0x1228 => "PFIFO.CACHE1_DMA_ADDRESS",
        0x122C => "PFIFO.CACHE1_DMA_TARGET_NODE",
        0x1300 => "PFIFO.CONFIG_RAMHT",
        0x1304 => "PFIFO.CONFIG_RAMFC",
        0x1308 => "PFIFO.CONFIG_RAMRO",
        0x1400 => "PFIFO.CACHE0_PULL0",
        _ => "PFIFO.<reserved>",
    }
}

pub fn pgraph(offset: u32) -> &'static str {
    match offset & !0x3 {
        0x080 => "PGRAPH.DEBUG_0",
        0x084 => "PGRAPH.DEBUG_1",
        0x088 => "PGRAPH.DEBUG_2",
        0x08C => "PGRAPH.DEBUG_3",
        0x100 => "PGRAPH.INTR_0",
        0x104 => "PGRAPH.INTR_1",
        0x140 => "PGRAPH.INTR_EN_0",
        0x144 => "PGRAPH.INTR_EN_1",
        0x180 => "PGRAPH.CONTEXT_SWITCH",
        0x184 => "PGRAPH.CONTEXT_CONTROL",
        0x188 => "PGRAPH.CONTEXT_USER",
        0x400 => "PGRAPH.ABS_UCLIP_XMIN",
        0x404 => "PGRAPH.ABS_UCLIP_XMAX",
        0x408 => "PGRAPH.ABS_UCLIP_YMIN",
        0x40C => "PGRAPH.ABS_UCLIP_YMAX",
        0x410 => "PGRAPH.SRC_CANVAS_MIN",
        0x414 => "PGRAPH.SRC_CANVAS_MAX",
        0x418 => "PGRAPH.DST_CANVAS_MIN",
        0x41C => "PGRAPH.DST_CANVAS_MAX",
        0x42C => "PGRAPH.BETA",
        _ => "PGRAPH.<reserved>",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_offsets_resolve_to_distinct_names() {
        assert_eq!(pmc(0x000), "PMC.BOOT");
        assert_eq!(pbus(0x204), "PBUS.RMA_TARGET");
        assert_eq!(pfifo(0x1300), "PFIFO.CONFIG_RAMHT");
        assert_eq!(pgraph(0x42C), "PGRAPH.BETA");
    }

    #[test]
    fn unknown_offsets_fall_back_to_reserved() {
        assert_eq!(pmc(0xFFF), "PMC.<reserved>");
        assert_eq!(pgraph(0xFFF), "PGRAPH.<reserved>");
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nv4_core::core::pfifo::Pfifo;
use nv4_core::core::ramin::{Ramin, RamInLayout, RamhtContext};

fn bound_pfifo() -> (Pfifo, Ramin) {
    let mut ramin = Ramin::new(RamInLayout::default());
    let mut pfifo = Pfifo::new(64);
    ramin.ramht_insert(
        0xCAFE,
        0,
        RamhtContext {
            ramin_offset: 0,
            class_id: 0x5E, // Rectangle
            is_hardware: true,
            channel: 0,
        },
    );
    pfifo.push(&mut ramin, 0x800000, 0xCAFE); // bind subchannel 0
    pfifo.pull(&ramin); // resolve the bind
    (pfifo, ramin)
}

fn push_pull_round_trip(c: &mut Criterion) {
    c.bench_function("pfifo_push_pull_round_trip", |b| {
        b.iter(|| {
            let (mut pfifo, mut ramin) = bound_pfifo();
            for i in 0..32u32 {
                pfifo.push(&mut ramin, black_box(0x800300), black_box(i));
                black_box(pfifo.pull(&ramin));
            }
        });
    });
}

fn sustained_fill(c: &mut Criterion) {
    c.bench_function("pfifo_cache1_sustained_fill", |b| {
        b.iter(|| {
            let (mut pfifo, mut ramin) = bound_pfifo();
            for i in 0..63u32 {
                black_box(pfifo.push(&mut ramin, 0x800300, i));
            }
            for _ in 0..63 {
                black_box(pfifo.pull(&ramin));
            }
        });
    });
}

criterion_group!(benches, push_pull_round_trip, sustained_fill);
criterion_main!(benches);

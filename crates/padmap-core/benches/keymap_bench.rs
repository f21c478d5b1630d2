//! Criterion benchmarks for key code translation.
//!
//! Run with:
//! ```bash
//! cargo bench --package padmap-core --bench keymap_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use padmap_core::KeyCode;

/// VK codes covering letters, digits, F-keys, navigation and one unmapped code.
const BENCH_VK_CODES: &[u8] = &[
    0x41, // 'A'
    0x5A, // 'Z'
    0x30, // '0'
    0x0D, // VK_RETURN
    0x20, // VK_SPACE
    0x70, // VK_F1
    0x7B, // VK_F12
    0x25, // VK_LEFT
    0x22, // VK_NEXT (PageDown)
    0x69, // VK_NUMPAD9
    0xFF, // No mapping
];

fn bench_vk_to_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("keymap_windows_vk");

    group.bench_function("vk_to_key_single", |b| {
        b.iter(|| KeyCode::from_vk(black_box(0x41)))
    });

    group.bench_function("vk_to_key_batch_11", |b| {
        b.iter(|| {
            BENCH_VK_CODES
                .iter()
                .map(|&vk| KeyCode::from_vk(black_box(vk)))
                .collect::<Vec<_>>()
        })
    });

    group.bench_function("key_to_vk_all", |b| {
        b.iter(|| {
            KeyCode::ALL
                .iter()
                .map(|&k| (black_box(k).vk(), k.is_extended()))
                .collect::<Vec<_>>()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_vk_to_key);
criterion_main!(benches);

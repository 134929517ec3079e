//! Criterion benchmarks for the per-keystroke hot path.
//!
//! Every key-down seen by the hook goes through a virtual-key translation and,
//! in play mode, a registry lookup. Both must stay table-lookup cheap.
//!
//! Run with:
//! ```bash
//! cargo bench --package clickmap-core --bench lookup_bench
//! ```

use clickmap_core::keymap::windows_vk::vk_to_key;
use clickmap_core::{CanvasGeometry, CanvasPoint, Key, TargetRegistry};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Virtual-key codes a typical layout binds, plus one unmapped code.
const BENCH_VK_CODES: &[u8] = &[
    0x41, // 'A'
    0x51, // 'Q'
    0x31, // '1'
    0x20, // VK_SPACE
    0x0D, // VK_RETURN
    0x70, // VK_F1
    0x61, // VK_NUMPAD1
    0xA0, // VK_LSHIFT
    0xFF, // unmapped
];

fn populated_registry(targets: usize) -> TargetRegistry {
    let mut registry = TargetRegistry::new();
    for (i, &key) in Key::ALL.iter().take(targets).enumerate() {
        if let Ok(id) = registry.add(CanvasPoint::default().cascade(i)) {
            registry.assign_key(id, key).ok();
        }
    }
    registry
}

fn bench_vk_to_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("vk_to_key");

    group.bench_function("single", |b| {
        b.iter(|| vk_to_key(black_box(0x41), black_box(false)))
    });

    group.bench_function("batch", |b| {
        b.iter(|| {
            for &vk in BENCH_VK_CODES {
                black_box(vk_to_key(black_box(vk), false));
            }
        })
    });

    group.finish();
}

fn bench_lookup_by_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_lookup");
    let geometry = CanvasGeometry::default();

    for size in [1usize, 10, 50] {
        let registry = populated_registry(size);
        group.bench_with_input(BenchmarkId::new("hit_and_resolve", size), &registry, |b, r| {
            b.iter(|| {
                r.lookup_by_key(black_box(Key::KeyA))
                    .and_then(|id| r.get(id))
                    .map(|t| geometry.click_point(t.position))
            })
        });
        group.bench_with_input(BenchmarkId::new("miss", size), &registry, |b, r| {
            b.iter(|| r.lookup_by_key(black_box(Key::MetaRight)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_vk_to_key, bench_lookup_by_key);
criterion_main!(benches);

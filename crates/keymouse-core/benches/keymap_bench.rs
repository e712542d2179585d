//! Criterion benchmarks for key classification.
//!
//! `KeyClassifier::classify` runs inside the event tap callback for every key
//! event on the system, so it must stay a table lookup.
//!
//! Run with:
//! ```bash
//! cargo bench --package keymouse-core --bench keymap_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use keymouse_core::keymap::macos_vk as vk;
use keymouse_core::{Action, KeyClassifier, KeyMap, MediaKey};

// ── Representative key codes for benchmarking ─────────────────────────────────

/// A mix of role keys, mapped keys, and ordinary typing keys.
const BENCH_KEY_CODES: &[u16] = &[
    vk::F13,
    vk::BACKSLASH,
    vk::GRAVE,
    vk::SLASH,
    vk::UP_ARROW,
    vk::DOWN_ARROW,
    vk::LEFT_ARROW,
    vk::RIGHT_ARROW,
    vk::PAGE_UP,
    vk::END,
    vk::ANSI_1,
    vk::ANSI_0,
    vk::KEYPAD_PLUS,
    vk::KEYPAD_DECIMAL,
    0x00, // kVK_ANSI_A
    0x0D, // kVK_ANSI_W
    0x31, // kVK_Space
    0x24, // kVK_Return
    0x38, // kVK_Shift
    0x7F, // unassigned
];

/// A key map the size of a typical configuration.
fn typical_key_map() -> KeyMap {
    let mut map = KeyMap::new();
    for (i, &code) in vk::NUMBER_ROW.iter().enumerate() {
        map.insert(code, Action::Launch(vec!["-a".into(), format!("App{i}")]));
    }
    for (code, key) in [
        (vk::KEYPAD_PLUS, MediaKey::VolumeUp),
        (vk::KEYPAD_MINUS, MediaKey::VolumeDown),
        (vk::KEYPAD_DECIMAL, MediaKey::Mute),
        (vk::KEYPAD_MULTIPLY, MediaKey::PlayPause),
        (vk::KEYPAD_DIVIDE, MediaKey::Next),
        (vk::KEYPAD_EQUALS, MediaKey::Previous),
    ] {
        map.insert(code, Action::MediaSignal(key));
    }
    map
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

fn bench_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("keymap_classify");
    let map = typical_key_map();

    // Fixed-table hit (arrow key) vs. map hit vs. full miss
    for (label, code) in [
        ("fixed_role", vk::UP_ARROW),
        ("mapped_action", vk::KEYPAD_PLUS),
        ("passthrough", 0x00u16),
    ] {
        group.bench_with_input(BenchmarkId::new("classify", label), &code, |b, &code| {
            b.iter(|| KeyClassifier::classify(black_box(code), &map))
        });
    }

    // Batch of 20 diverse codes (simulates a burst of typing)
    group.bench_function("classify_batch_20", |b| {
        b.iter(|| {
            BENCH_KEY_CODES
                .iter()
                .map(|&code| KeyClassifier::classify(black_box(code), &map))
                .collect::<Vec<_>>()
        })
    });

    group.finish();
}

fn bench_key_names(c: &mut Criterion) {
    let mut group = c.benchmark_group("keymap_names");

    group.bench_function("key_code_for_name_last", |b| {
        b.iter(|| vk::key_code_for_name(black_box("f19")))
    });

    group.bench_function("key_code_for_name_miss", |b| {
        b.iter(|| vk::key_code_for_name(black_box("hyper")))
    });

    group.finish();
}

criterion_group!(benches, bench_classify, bench_key_names);
criterion_main!(benches);

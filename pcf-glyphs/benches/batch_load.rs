use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use pcf_glyphs::{Font, FontSettings};
use pcf_test_data::{PcfBuilder, TestGlyph};
use rand::seq::SliceRandom;

const FIRST_CODE_POINT: u32 = 0x4E00;
const GLYPH_COUNT: u32 = 4096;

/// A double byte font of 16x16 glyphs, like a CJK bitmap font.
fn synthetic_font() -> Vec<u8> {
    let glyphs = (0..GLYPH_COUNT).map(|i| {
        let rows: Vec<[u8; 2]> = (0..16u8)
            .map(|y| [(i as u8).wrapping_mul(y), y.rotate_left(i % 8)])
            .collect();
        TestGlyph::new(FIRST_CODE_POINT + i, 0, 16, 16, 14, 2).rows(rows)
    });
    PcfBuilder::new().metrics_format(0x10E).glyphs(glyphs).build()
}

fn random_text(len: usize) -> Vec<u32> {
    let mut rng = rand::thread_rng();
    let mut code_points: Vec<u32> = (FIRST_CODE_POINT..FIRST_CODE_POINT + GLYPH_COUNT).collect();
    code_points.shuffle(&mut rng);
    code_points.truncate(len);
    code_points
}

fn open(data: &[u8], capacity: usize) -> Font<Cursor<Vec<u8>>> {
    Font::with_settings(
        Cursor::new(data.to_vec()),
        FontSettings::default().cache_capacity(capacity),
    )
    .unwrap()
}

pub fn load_benchmark(c: &mut Criterion) {
    let data = synthetic_font();
    for len in [16, 128, 1024] {
        let text = random_text(len);
        c.bench_with_input(BenchmarkId::new("per_glyph", len), &text, |b, text| {
            b.iter_batched(
                || open(&data, len),
                |mut font| {
                    for code_point in text {
                        black_box(font.glyph(*code_point).unwrap());
                    }
                },
                BatchSize::SmallInput,
            )
        });
        c.bench_with_input(BenchmarkId::new("batch", len), &text, |b, text| {
            b.iter_batched(
                || open(&data, len),
                |mut font| {
                    font.load_glyphs(text.iter().copied());
                    for code_point in text {
                        black_box(font.glyph(*code_point).unwrap());
                    }
                },
                BatchSize::SmallInput,
            )
        });
    }
}

criterion_group!(benches, load_benchmark);
criterion_main!(benches);

use criterion::{criterion_group, criterion_main, Criterion};
use deptheval::metrics::ssim;
use deptheval::{align_to_reference, compute_metrics, AlignParams, DepthMap, SsimParams};
use std::hint::black_box;

fn make_depth(width: usize, height: usize, scale: f32) -> DepthMap {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let value = if (x * 7 + y * 3) % 97 == 0 {
                0.0
            } else {
                (1000 + (((x * 13) ^ (y * 7) ^ (x * y)) & 0x3FF)) as f32
            };
            data.push(value * scale);
        }
    }
    DepthMap::new(data, width, height).unwrap()
}

fn bench_pipeline(c: &mut Criterion) {
    let reference = make_depth(640, 480, 1.0);
    let candidate = make_depth(320, 240, 0.01);

    c.bench_function("align_320_to_640", |b| {
        b.iter(|| {
            align_to_reference(
                black_box(&candidate),
                black_box(&reference),
                AlignParams::default(),
            )
            .unwrap()
        })
    });

    let alignment = align_to_reference(&candidate, &reference, AlignParams::default()).unwrap();
    c.bench_function("metrics_640x480", |b| {
        b.iter(|| {
            compute_metrics(
                black_box(&reference),
                black_box(&alignment.aligned),
                &alignment.mask,
                SsimParams::default(),
            )
            .unwrap()
        })
    });

    c.bench_function("ssim_640x480", |b| {
        b.iter(|| {
            ssim(
                black_box(reference.view()),
                black_box(alignment.aligned.view()),
                1024.0,
                SsimParams::default(),
            )
            .unwrap()
        })
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use crater_detect::synthetic::render_rims;
use crater_detect::{Circle, CircleExtractor, CircleMatcher, ExtractParams, MatchParams};

fn crater_field() -> Vec<Circle> {
    let mut out = Vec::new();
    for j in 0..4 {
        for i in 0..4 {
            let r = 6.0 + ((i * 4 + j) % 7) as f32 * 2.0;
            out.push(Circle::new(32.0 + i as f32 * 62.0, 32.0 + j as f32 * 62.0, r));
        }
    }
    out
}

fn bench_extract(c: &mut Criterion) {
    let truth = crater_field();
    let mask = render_rims(256, &truth, 2.0).expect("mask");
    let extractor = CircleExtractor::new(ExtractParams::default());
    c.bench_function("extract_256_16_rims", |b| {
        b.iter(|| extractor.extract(black_box(&mask.view())))
    });

    let found = extractor.extract(&mask.view());
    let matcher = CircleMatcher::new(MatchParams::default());
    c.bench_function("match_16_vs_16", |b| {
        b.iter(|| matcher.match_circles(black_box(&found), black_box(&truth)))
    });
}

criterion_group!(benches, bench_extract);
criterion_main!(benches);

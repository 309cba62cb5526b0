use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn sample_text() -> String {
    let para = "Generative AI is going to reinvent virtually every customer \
                experience we know, and enable altogether new ones about which \
                we've only fantasized. ";
    para.repeat(40)
}

fn bench_wrap(c: &mut Criterion) {
    let text = sample_text();
    c.bench_function("wrap_text_80_cols", |b| {
        b.iter(|| core_text::wrap_text(black_box(&text), black_box(80)))
    });
    c.bench_function("wrapped_line_count_40_cols", |b| {
        b.iter(|| core_text::wrapped_line_count(black_box(&text), black_box(40)))
    });
}

criterion_group!(benches, bench_wrap);
criterion_main!(benches);

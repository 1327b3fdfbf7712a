use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trailglow_animation::ParticleField;
use trailglow_core::{RecordingContext, Size};

fn filled_field(spawns: usize) -> ParticleField {
    let mut field = ParticleField::new(0x5eed);
    for i in 0..spawns {
        let t = i as f32 * 0.1;
        field.spawn(400.0 + 300.0 * t.sin(), 300.0 + 200.0 * (2.0 * t).cos());
    }
    field
}

fn bench_spawn(c: &mut Criterion) {
    c.bench_function("spawn_at_cap", |b| {
        let mut field = filled_field(100);
        b.iter(|| field.spawn(black_box(200.0), black_box(150.0)));
    });
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");
    for spawns in [10, 40, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(spawns), &spawns, |b, &spawns| {
            let mut ctx = RecordingContext::new(Size::new(800.0, 600.0));
            b.iter_batched_ref(
                || filled_field(spawns),
                |field| {
                    ctx.take_commands();
                    field.tick(&mut ctx)
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_spawn, bench_tick);
criterion_main!(benches);

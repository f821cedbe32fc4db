use ant_core::{Layout, Location, Registration, Shape};
use ant_render::{Palette, SkiaRenderer};
use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};

fn harness() -> (SkiaRenderer, Layout, Vec<u8>) {
    let (width, height) = (1280u32, 720u32);
    let layout = Layout::new((width, height), 40.0);
    let mut r = SkiaRenderer::new(width, height, &layout.geometry, Palette::default(), None)
        .expect("renderer");
    let mut fb = vec![0u8; (width * height * 4) as usize];
    // First copy is a full frame; measure the steady state.
    r.copy_to(&mut fb).expect("copy");
    (r, layout, fb)
}

fn draw_target_frame(r: &mut SkiaRenderer, layout: &Layout) {
    r.fill();
    r.draw_shape(Shape::Fixation, Registration::Center, layout.center);
    r.draw_shape(Shape::RightArrow, Registration::Center, layout.above);
    for pos in layout.flanker_positions(Location::Above) {
        r.draw_shape(Shape::LeftArrow, Registration::Center, pos);
    }
}

pub fn bench_frames(c: &mut Criterion) {
    let mut g = c.benchmark_group("render_frame");
    g.sample_size(40);

    g.bench_function("target_frame", |b| {
        b.iter_batched(
            harness,
            |(mut r, layout, mut fb)| {
                draw_target_frame(&mut r, &layout);
                black_box(r.copy_to(&mut fb).expect("copy"));
            },
            BatchSize::SmallInput,
        )
    });

    g.bench_function("fixation_frame_steady", |b| {
        let (mut r, layout, mut fb) = harness();
        b.iter(|| {
            r.fill();
            r.draw_shape(Shape::Fixation, Registration::Center, layout.center);
            black_box(r.copy_to(&mut fb).expect("copy"));
        })
    });

    g.bench_function("full_copy", |b| {
        let (mut r, _, mut fb) = harness();
        b.iter(|| {
            r.resize(1280, 720).expect("resize");
            black_box(r.copy_to(&mut fb).expect("copy"));
        })
    });

    g.finish();
}

criterion_group!(benches, bench_frames);
criterion_main!(benches);

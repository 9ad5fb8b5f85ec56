use coread_engine::{GridLayout, LayoutTrigger, MarkerPositioner, Section, SectionId, resolve_section};
use criterion::{Criterion, criterion_group, criterion_main};
mod common;

fn section(paragraphs: usize) -> Section {
    Section {
        section_id: SectionId::from("s1"),
        title: "Bench".to_string(),
        content: common::generate_section_content(paragraphs),
        order: 0,
    }
}

fn bench_resolve_section(c: &mut Criterion) {
    let mut group = c.benchmark_group("segments");
    group.sample_size(20);

    for paragraphs in [10, 100, 500] {
        let section = section(paragraphs);
        let threads = common::generate_threads(paragraphs);

        group.bench_function(format!("resolve_section_{paragraphs}"), |b| {
            b.iter(|| {
                let render = resolve_section(
                    std::hint::black_box(&section),
                    std::hint::black_box(&threads),
                    None,
                );
                std::hint::black_box(render);
            });
        });
    }

    group.finish();
}

fn bench_layout_and_markers(c: &mut Criterion) {
    let mut group = c.benchmark_group("markers");
    group.sample_size(20);

    let section = section(100);
    let threads = common::generate_threads(100);
    let render = resolve_section(&section, &threads, None);

    group.bench_function("wrap_and_refresh_100", |b| {
        let mut positioner = MarkerPositioner::new();
        b.iter(|| {
            let grid = GridLayout::wrap(&section.content, &render.segments, 72);
            positioner.refresh(LayoutTrigger::Resized, &render.segments, &grid);
            std::hint::black_box(positioner.placements().len());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_resolve_section, bench_layout_and_markers);
criterion_main!(benches);

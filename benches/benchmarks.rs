//! Benchmarks for the pager core

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mini_pager::document::{Document, SplitIdGenerator};
use mini_pager::layout::{measure_blocks, paginate, NoSplit};
use mini_pager::{
    recombine, recombine_markup, InMemoryTree, LiveTree, MetricsOracle, PagerConfig,
    PaginationPolicy, RepaginationController, Splitter,
};

fn medium_document() -> String {
    // ~10 pages of mixed content
    let mut markup = String::new();
    for i in 0..50 {
        if i % 10 == 0 {
            markup.push_str(&format!("<h2>Section {}</h2>", i / 10));
        }
        markup.push_str(&format!(
            "<p>Paragraph {} contains enough text to span multiple lines and test the line breaking algorithm. \
             It keeps going with <b>bold</b> and <i>italic</i> runs so the splitter has inline formatting to cut.</p>",
            i
        ));
        if i % 7 == 0 {
            markup.push_str("<ul><li>first item</li><li>second item</li><li>third item</li></ul>");
        }
    }
    markup
}

fn oracle(config: &PagerConfig) -> MetricsOracle {
    MetricsOracle::new(config.font.clone(), config.constraints().content_width())
}

fn bench_measure(c: &mut Criterion) {
    c.bench_function("measure_medium_document", |b| {
        let config = PagerConfig::default();
        let oracle = oracle(&config);
        let doc = Document::from_markup(&medium_document()).unwrap_or_default();

        b.iter(|| {
            black_box(measure_blocks(doc.blocks(), &oracle));
        });
    });
}

fn bench_paginate_no_split(c: &mut Criterion) {
    c.bench_function("paginate_no_split", |b| {
        let config = PagerConfig::default();
        let oracle = oracle(&config);
        let doc = Document::from_markup(&medium_document()).unwrap_or_default();
        let measured = measure_blocks(doc.blocks(), &oracle);
        let height = config.constraints().content_height();

        b.iter(|| {
            black_box(paginate(
                measured.clone(),
                height,
                &NoSplit,
                &PaginationPolicy::default(),
            ));
        });
    });
}

fn bench_paginate_with_split(c: &mut Criterion) {
    c.bench_function("paginate_with_split", |b| {
        let config = PagerConfig::default();
        let oracle = oracle(&config);
        let doc = Document::from_markup(&medium_document()).unwrap_or_default();
        let measured = measure_blocks(doc.blocks(), &oracle);
        let height = config.constraints().content_height();
        let ids = SplitIdGenerator::new(1);

        b.iter(|| {
            let splitter = Splitter::new(&oracle, &ids);
            black_box(paginate(
                measured.clone(),
                height,
                &splitter,
                &config.policy(),
            ));
        });
    });
}

fn bench_recombine(c: &mut Criterion) {
    c.bench_function("recombine_fragments", |b| {
        let config = PagerConfig::default();
        let mut tree = InMemoryTree::new();
        let mut controller = RepaginationController::new(oracle(&config), config.controller_settings());
        let _ = controller.load(&medium_document(), &mut tree);
        let blocks = tree.blocks();

        b.iter(|| {
            black_box(recombine(&blocks));
        });
    });
}

fn bench_recombine_markup(c: &mut Criterion) {
    c.bench_function("recombine_markup", |b| {
        let config = PagerConfig::default();
        let mut tree = InMemoryTree::new();
        let mut controller = RepaginationController::new(oracle(&config), config.controller_settings());
        let _ = controller.load(&medium_document(), &mut tree);
        let fragments = controller.cached_markup().to_vec();

        b.iter(|| {
            black_box(recombine_markup(&fragments));
        });
    });
}

fn bench_repagination_pass(c: &mut Criterion) {
    c.bench_function("repagination_pass", |b| {
        let config = PagerConfig::default();
        let mut tree = InMemoryTree::new();
        let mut controller = RepaginationController::new(oracle(&config), config.controller_settings());
        let _ = controller.load(&medium_document(), &mut tree);

        b.iter(|| {
            black_box(controller.flush(&mut tree));
        });
    });
}

criterion_group!(
    benches,
    bench_measure,
    bench_paginate_no_split,
    bench_paginate_with_split,
    bench_recombine,
    bench_recombine_markup,
    bench_repagination_pass,
);

criterion_main!(benches);

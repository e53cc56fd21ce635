//! Cross-module properties of pagination, splitting and recombination

#![cfg(not(target_arch = "wasm32"))]

use mini_pager::document::markup::parse_block;
use mini_pager::document::{ContentNode, Document, SplitIdGenerator, SplitMarker, SplitStrategy};
use mini_pager::layout::{
    measure_blocks, paginate, FontMetrics, Measurement, MeasurementOracle, MeasuredBlock,
    MetricsOracle, NoSplit, PaginationPolicy, PaginationResult, TextProbe, EPSILON,
};
use mini_pager::split::{recombine, recombine_markup, Splitter};
use mini_pager::{InMemoryTree, LiveTree, PassOutcome, RepaginationController};
use std::rc::Rc;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Fixed grid: `chars_per_line` chars per line, `line_height` per line, no margins
struct GridOracle {
    chars_per_line: usize,
    line_height: f32,
}

impl MeasurementOracle for GridOracle {
    fn measure(&self, node: &ContentNode) -> Measurement {
        let height = if !node.has_direct_text() && node.elements().next().is_some() {
            node.elements().map(|el| self.measure(el).outer_height()).sum()
        } else {
            node.text_len().div_ceil(self.chars_per_line) as f32 * self.line_height
        };
        Measurement {
            height,
            break_before: node.break_before(),
            break_after: node.break_after(),
            ..Measurement::default()
        }
    }

    fn probe_position(&self, node: &ContentNode, run: usize, offset: usize) -> TextProbe {
        let before: usize = node.text_runs()[..run]
            .iter()
            .map(|r| r.chars().count())
            .sum();
        let top = ((before + offset) / self.chars_per_line) as f32 * self.line_height;
        TextProbe {
            top,
            bottom: top + self.line_height,
        }
    }
}

fn block(index: usize, height: f32) -> MeasuredBlock {
    MeasuredBlock {
        index,
        height,
        break_before: false,
        break_after: false,
        node: Rc::new(ContentNode::new("p").with_text(&format!("block {index}"))),
    }
}

fn indices(result: &PaginationResult) -> Vec<Vec<usize>> {
    result
        .pages
        .iter()
        .map(|page| page.block_indices().to_vec())
        .collect()
}

fn words(n: usize) -> String {
    const WORDS: [&str; 8] = [
        "lorem",
        "ipsum",
        "dolor",
        "sit",
        "amet",
        "consectetur",
        "adipiscing",
        "elit",
    ];
    (0..n)
        .map(|i| WORDS[i % WORDS.len()])
        .collect::<Vec<_>>()
        .join(" ")
}

fn sample_markup() -> String {
    let mut markup = String::new();
    for i in 0..12 {
        match i % 4 {
            0 => markup.push_str(&format!("<h2>Heading {i}</h2>")),
            1 => markup.push_str(&format!("<p>{}</p>", words(i * 7 + 30))),
            2 => markup.push_str(&format!(
                "<ul><li>{}</li><li>{}</li><li>{}</li></ul>",
                words(8),
                words(25),
                words(12)
            )),
            _ => markup.push_str(&format!(
                "<div class=\"box\">\n<p>{}</p>\n<p>one <b>{}</b> two</p>\n</div>",
                words(20),
                words(15)
            )),
        }
    }
    // single-child wrappers taller than any tested page
    markup.push_str(&format!("<div><p>{}</p></div>", words(220)));
    markup.push_str(&format!(
        "<blockquote class=\"quote\"><p>{}</p></blockquote>",
        words(220)
    ));
    markup.push_str("<img src=\"x.png\" height=\"120\">");
    markup.push_str(&format!(
        "<p style=\"break-before: page\">{}</p>",
        words(10)
    ));
    markup.push_str(&format!("<p style=\"break-after: page\">{}</p>", words(10)));
    markup.push_str(&format!("<p>{}</p>", words(5)));
    markup
}

fn metrics_oracle() -> MetricsOracle {
    // 20 chars per 20px line
    MetricsOracle::new(FontMetrics::monospace(20.0, 8.0), 160.0)
}

fn paginate_sample(content_height: f32) -> (Document, PaginationResult) {
    let doc = Document::from_markup(&sample_markup()).unwrap();
    let oracle = metrics_oracle();
    let ids = SplitIdGenerator::new(1);
    let splitter = Splitter::new(&oracle, &ids);
    let measured = measure_blocks(doc.blocks(), &oracle);
    let result = paginate(
        measured,
        content_height,
        &splitter,
        &PaginationPolicy::default(),
    );
    (doc, result)
}

const HEIGHTS: [f32; 4] = [120.0, 200.0, 333.0, 931.0];

#[test]
fn test_content_preservation() {
    init_logging();
    for height in HEIGHTS {
        let (doc, result) = paginate_sample(height);
        let restored = recombine(&result.flatten());
        assert_eq!(restored, doc.blocks().to_vec(), "content lost at {height}px");

        let markup: Vec<String> = result.flatten().iter().map(|n| n.to_markup()).collect();
        assert_eq!(recombine_markup(&markup), doc.to_markup());
    }
}

#[test]
fn test_splits_happen_on_small_pages() {
    let (doc, result) = paginate_sample(120.0);
    assert!(result.block_count() > doc.block_count());
    assert!(result
        .flatten()
        .iter()
        .any(|node| SplitMarker::read(node).is_some()));
}

#[test]
fn test_idempotent_repagination() {
    for height in HEIGHTS {
        let (_, first) = paginate_sample(height);
        let oracle = metrics_oracle();
        let ids = SplitIdGenerator::new(2);
        let splitter = Splitter::new(&oracle, &ids);
        let recombined = recombine(&first.flatten());
        let second = paginate(
            measure_blocks(&recombined, &oracle),
            height,
            &splitter,
            &PaginationPolicy::default(),
        );
        assert_eq!(first.block_counts(), second.block_counts());
    }
}

#[test]
fn test_height_bound() {
    for height in HEIGHTS {
        let (_, result) = paginate_sample(height);
        for page in &result.pages {
            assert!(
                page.len() == 1 || page.height <= height + EPSILON,
                "page of {} blocks is {}px on a {height}px page",
                page.len(),
                page.height
            );
        }
    }
}

#[test]
fn test_text_splits_land_on_whitespace() {
    for height in HEIGHTS {
        let (_, result) = paginate_sample(height);
        let flat = result.flatten();
        for pair in flat.windows(2) {
            let (Some(a), Some(b)) = (SplitMarker::read(&pair[0]), SplitMarker::read(&pair[1]))
            else {
                continue;
            };
            if a.split_id != b.split_id
                || a.split_id.strategy() != Some(SplitStrategy::TextBoundary)
            {
                continue;
            }
            let next = pair[1].text();
            assert!(
                next.starts_with(char::is_whitespace),
                "fragment starts mid-word: {next:?}"
            );
        }
    }
}

#[test]
fn test_break_hints_enforced() {
    for height in HEIGHTS {
        let (_, result) = paginate_sample(height);
        for (page_idx, page) in result.pages.iter().enumerate() {
            for (slot, placed) in page.blocks.iter().enumerate() {
                if placed.node.break_before() && SplitMarker::read(&placed.node).is_none() {
                    assert_eq!(slot, 0, "break-before block not first on page {page_idx}");
                }
                let is_last_piece = SplitMarker::read(&placed.node).is_none()
                    || result
                        .flatten()
                        .iter()
                        .filter(|n| {
                            SplitMarker::read(n).map(|m| m.split_id)
                                == SplitMarker::read(&placed.node).map(|m| m.split_id)
                        })
                        .last()
                        .is_some_and(|n| Rc::ptr_eq(n, &placed.node));
                if placed.node.break_after() && is_last_piece {
                    assert_eq!(
                        slot,
                        page.len() - 1,
                        "break-after block not last on page {page_idx}"
                    );
                }
            }
        }
    }
}

#[test]
fn test_atomic_blocks_are_never_split() {
    let (_, result) = paginate_sample(100.0);
    let images: Vec<_> = result
        .flatten()
        .into_iter()
        .filter(|node| node.tag() == "img")
        .collect();
    assert_eq!(images.len(), 1);
    assert!(SplitMarker::read(&images[0]).is_none());
}

#[test]
fn test_scenario_blocks_fill_pages() {
    let blocks = vec![block(0, 300.0), block(1, 400.0), block(2, 500.0)];
    let result = paginate(blocks, 1000.0, &NoSplit, &PaginationPolicy::default());
    assert_eq!(indices(&result), vec![vec![0, 1], vec![2]]);
}

#[test]
fn test_scenario_oversized_block_without_split() {
    let result = paginate(
        vec![block(0, 1500.0)],
        1000.0,
        &NoSplit,
        &PaginationPolicy::default(),
    );
    assert_eq!(indices(&result), vec![vec![0]]);
    assert_eq!(result.page_count, 1);
}

#[test]
fn test_scenario_split_backs_up_to_space() {
    let oracle = GridOracle {
        chars_per_line: 47,
        line_height: 10.0,
    };
    let ids = SplitIdGenerator::new(0);
    let splitter = Splitter::new(&oracle, &ids);
    let text = format!("{} {}", "x".repeat(42), "y".repeat(20));
    let node = ContentNode::new("p").with_text(&text);

    // char 47 is the first on the second line
    let (first, second) = splitter.split_node(&node, 10.0).unwrap();
    assert_eq!(first.text_len(), 42);
    assert_eq!(second.text(), format!(" {}", "y".repeat(20)));
}

#[test]
fn test_scenario_break_after_ends_page() {
    let mut blocks = vec![block(0, 100.0), block(1, 100.0), block(2, 100.0)];
    blocks[1].break_after = true;
    let result = paginate(blocks, 1000.0, &NoSplit, &PaginationPolicy::default());
    assert_eq!(indices(&result), vec![vec![0, 1], vec![2]]);
}

#[test]
fn test_scenario_recombine_child_split_parent() {
    let fragments = vec![
        "<p>before</p>".to_string(),
        "<section class=\"s\" split-id=\"c1-4\" split-part=\"0\"><p>A</p><p>B</p></section>"
            .to_string(),
        "<section class=\"s\" split-id=\"c1-4\" split-part=\"1\"><p>C</p></section>".to_string(),
        "<p>after</p>".to_string(),
    ];
    assert_eq!(
        recombine_markup(&fragments),
        vec![
            "<p>before</p>".to_string(),
            "<section class=\"s\"><p>A</p><p>B</p><p>C</p></section>".to_string(),
            "<p>after</p>".to_string(),
        ]
    );

    let nodes: Vec<Rc<ContentNode>> = fragments
        .iter()
        .map(|f| Rc::new(parse_block(f).unwrap()))
        .collect();
    let merged = recombine(&nodes);
    assert_eq!(merged.len(), 3);
    assert!(SplitMarker::read(&merged[1]).is_none());
    assert_eq!(merged[1].text(), "ABC");
}

#[test]
fn test_controller_pass_is_stable() {
    init_logging();
    let oracle = metrics_oracle();
    let mut controller = RepaginationController::new(
        oracle,
        mini_pager::controller::ControllerSettings {
            content_height: 200.0,
            ..Default::default()
        },
    );
    let mut tree = InMemoryTree::new();
    let loaded = controller.load(&sample_markup(), &mut tree).unwrap();
    assert!(loaded.is_committed());

    let pages = tree.page_count();
    let outcome = controller.flush(&mut tree);
    assert_eq!(outcome, PassOutcome::Unchanged { page_count: pages });

    let doc = Document::from_markup(&sample_markup()).unwrap();
    assert_eq!(recombine(&tree.blocks()), doc.blocks().to_vec());
}

#[test]
fn test_wrapped_paragraphs_split_within_pages() {
    for height in HEIGHTS {
        let (_, result) = paginate_sample(height);
        for tag in ["div", "blockquote"] {
            let wrapped: Vec<_> = result
                .pages
                .iter()
                .flat_map(|page| &page.blocks)
                .filter(|placed| placed.node.tag() == tag && !placed.node.is_blank())
                .filter(|placed| placed.node.attr("class") != Some("box"))
                .collect();
            assert!(wrapped.len() > 1, "<{tag}> was not split at {height}px");
            for placed in wrapped {
                assert!(
                    placed.height <= height + EPSILON,
                    "<{tag}> fragment is {}px on a {height}px page",
                    placed.height
                );
            }
        }
    }
}

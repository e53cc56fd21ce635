//! Layout: measurement, page constraints and pagination

mod engine;
mod flow;
pub mod font;
mod line_break;
mod oracle;
mod pagination;

pub use engine::{measure_blocks, LayoutConstraints, MeasuredBlock};
pub use flow::{FlowLayout, LineSpan, MetricsOracle, RunPlacement};
pub use font::FontMetrics;
pub use line_break::{LineBox, LineBreaker};
pub use oracle::{Measurement, MeasurementOracle, TextProbe};
pub use pagination::{
    paginate, BlockReport, NoSplit, Page, PageReport, PaginationPolicy, PaginationReport,
    PaginationResult, PlacedBlock, SplitBlock, SplitPair, EPSILON,
};

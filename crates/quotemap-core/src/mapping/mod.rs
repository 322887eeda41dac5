pub mod engine;
pub mod locator;
pub mod outcome;

pub use engine::apply_template;
pub use outcome::{ExtractionResult, ExtractionTotals, Record, RowError, RowOutcome};

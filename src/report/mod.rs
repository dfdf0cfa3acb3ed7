pub mod format;
pub mod widths;
pub mod tabular;

pub use tabular::{emit_tabular, TabularLayout};

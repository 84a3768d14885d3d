//! Adjustment suggestion: prompt assembly, pipeline orchestration and journal export

pub mod journal;
pub mod pipeline;
pub mod prompt;

pub use journal::*;
pub use pipeline::*;
pub use prompt::*;

//! Utility modules

pub mod canned_generation;
pub mod csv_loader;
pub mod validation;

pub use canned_generation::*;
pub use csv_loader::*;
pub use validation::*;

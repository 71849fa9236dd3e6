//! Error types

mod history;

pub use history::*;

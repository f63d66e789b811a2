//! Command implementations.

mod check;

pub use check::CheckCommand;

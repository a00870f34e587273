//! Command implementations.

mod build;
mod check;

pub use build::execute as build_execute;
pub use check::execute as check_execute;

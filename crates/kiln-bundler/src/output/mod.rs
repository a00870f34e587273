//! Bundle assembly and output writing.

pub mod rewrite;
pub mod runtime;
pub mod writer;

pub use runtime::assemble;
pub use writer::write_atomic;

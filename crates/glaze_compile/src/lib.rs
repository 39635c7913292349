//! # glaze-compile
//!
//! Orchestration of the glaze front-end pipeline: one
//! [`CompilerInvocation`] wires source management, preprocessing, parsing
//! and semantic attribution into a single run and returns a
//! [`CompilerResult`].
//!
//! Preambles - the built-in declarations plus a tool-supplied prelude - can
//! be compiled once into a [`PrecompiledPreamble`] and shared, immutably,
//! across any number of later invocations.

pub mod invocation;
pub mod preamble;
pub mod result;
mod stdlib;

pub use invocation::{CompileMode, CompilerInvocation};
pub use preamble::PrecompiledPreamble;
pub use result::{CompileStatistics, CompilerResult};

//! # glaze-base
//!
//! Foundational types for the glaze GLSL front-end.
//!
//! This crate provides the infrastructure shared by every stage of the
//! pipeline:
//!
//! - [`AtomTable`]/[`Atom`] - interned token text with O(1) equality
//! - [`FileId`], [`TextPosition`], [`TextRange`] - source locations
//! - [`SyntaxTokenId`], [`SyntaxRange`] - indices into the post-preprocess
//!   token stream
//! - [`DiagnosticSink`]/[`Diagnostic`] - error and warning collection
//!
//! # Design Principles
//!
//! This crate has **no knowledge of GLSL grammar or I/O**. It provides only
//! the generic machinery that the language and compile crates build upon.

pub mod atom;
pub mod diag;
pub mod source;
pub mod syntax;

pub use atom::{Atom, AtomTable};
pub use diag::{Diagnostic, DiagnosticSink};
pub use source::{FileId, TextPosition, TextRange};
pub use syntax::{SyntaxRange, SyntaxTokenId};

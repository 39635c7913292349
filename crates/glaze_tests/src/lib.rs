//! Integration test suite for the glaze front-end.
//!
//! This crate exists only to run integration tests from the `tests/`
//! directory; all actual test code lives in `tests/*.rs` files.
//!
//! # Test Organization
//!
//! | File | Topic |
//! |------|-------|
//! | `pipeline.rs` | End-to-end invocations, preamble sharing, statistics |
//! | `preprocessing.rs` | Macros, conditionals, includes through the full pipeline |
//! | `parsing.rs` | Error recovery, AST shape and range invariants |
//! | `semantics.rs` | Overload resolution, swizzles, implicit casts, const folding |
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p glaze-tests
//! ```

//! Shared helpers for the integration tests.
//!
//! Each test binary compiles this module separately and uses a different
//! subset of the helpers.
#![allow(dead_code)]

use glaze_compile::{CompileMode, CompilerInvocation, CompilerResult};

/// Compiles a shader without the system preamble; most tests declare
/// everything they use.
pub fn compile(source: &str) -> CompilerResult {
    let mut invocation = CompilerInvocation::new();
    invocation.language_config_mut().no_stdlib = true;
    invocation.set_main_from_buffer(source);
    invocation.compile_main(CompileMode::Full, None)
}

/// Compiles a shader with the built-in system preamble available.
pub fn compile_with_stdlib(source: &str) -> CompilerResult {
    let mut invocation = CompilerInvocation::new();
    invocation.set_main_from_buffer(source);
    invocation.compile_main(CompileMode::Full, None)
}

/// The token texts of the main file, EOF excluded.
pub fn token_texts(result: &CompilerResult) -> Vec<String> {
    result
        .tokens
        .iter()
        .filter(|t| t.klass != glaze_language::TokenKlass::Eof)
        .map(|t| result.atoms.text(t.text).to_string())
        .collect()
}

//! End-to-end invocation behavior: result shape, preamble sharing, modes
//! and statistics.

mod common;

use common::{compile, compile_with_stdlib};
use glaze_compile::{CompileMode, CompilerInvocation};
use glaze_language::TokenKlass;

#[test]
fn empty_main_yields_single_eof_and_no_decls() {
    let result = compile("");
    assert!(result.succeeded(), "errors: {:?}", result.errors);
    assert_eq!(result.tokens.len(), 1);
    assert_eq!(result.tokens[0].klass, TokenKlass::Eof);
    assert!(result.tokens[0].spelled_range.is_empty());

    let unit = result.main_translation_unit().unwrap();
    assert!(unit.decls.is_empty());
    assert!(result.warnings.is_empty());
}

#[test]
fn result_reports_failure_through_error_list() {
    let ok = compile("void main() {}");
    assert!(ok.succeeded());

    let bad = compile("void main() { undefined_name; }");
    assert!(!bad.succeeded());
    assert!(!bad.errors.is_empty());
}

#[test]
fn statistics_are_populated() {
    let result = compile("void main() {}");
    assert!(result.statistics.total_compile_ns > 0);
    assert!(result.statistics.main_lex_ns > 0);
    assert!(result.statistics.main_parse_ns > 0);
}

#[test]
fn preprocess_only_skips_parsing() {
    let mut invocation = CompilerInvocation::new();
    invocation.language_config_mut().no_stdlib = true;
    invocation.set_main_from_buffer("int x = 1;");
    let result = invocation.compile_main(CompileMode::PreprocessOnly, None);

    assert!(result.translation_units.is_empty());
    // `int x = 1 ;` plus the EOF marker.
    assert_eq!(result.tokens.len(), 6);
    assert_eq!(result.statistics.main_parse_ns, 0);
}

#[test]
fn stdlib_preamble_provides_builtins() {
    let result = compile_with_stdlib(
        "void main() { gl_Position = vec4(1.0, 0.0, 0.0, 1.0); float s = sin(0.5); }",
    );
    assert!(result.succeeded(), "errors: {:?}", result.errors);
}

#[test]
fn no_stdlib_hides_builtins() {
    let result = compile("void main() { float s = sin(0.5); }");
    assert!(!result.succeeded());
}

#[test]
fn precompiled_preamble_is_shared_across_invocations() {
    let mut preamble_invocation = CompilerInvocation::new();
    preamble_invocation.set_user_preamble("float shared_helper(float x);\n#define FROM_PREAMBLE 7\n");
    let preamble = preamble_invocation.compile_preamble(None).shared();

    for source in [
        "void main() { float a = shared_helper(1.0); }",
        "int x = FROM_PREAMBLE;",
    ] {
        let mut invocation = CompilerInvocation::new();
        invocation.set_precompiled_preamble(preamble.clone());
        invocation.set_main_from_buffer(source);
        let result = invocation.compile_main(CompileMode::Full, None);
        assert!(result.succeeded(), "{source}: {:?}", result.errors);
    }
}

#[test]
fn preamble_shares_across_threads() {
    let mut preamble_invocation = CompilerInvocation::new();
    preamble_invocation.set_user_preamble("float shared_helper(float x);\n");
    let preamble = preamble_invocation.compile_preamble(None).shared();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let preamble = preamble.clone();
            std::thread::spawn(move || {
                let mut invocation = CompilerInvocation::new();
                invocation.set_precompiled_preamble(preamble);
                invocation
                    .set_main_from_buffer(&format!("float v{i} = shared_helper({i}.0);"));
                invocation.compile_main(CompileMode::Full, None).succeeded()
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}

#[test]
fn version_scan_sets_language_before_compilation() {
    let mut invocation = CompilerInvocation::new();
    invocation.language_config_mut().no_stdlib = true;
    invocation.set_main_from_buffer("#version 310 es\nvoid main() {}");
    let result = invocation.compile_main(CompileMode::Full, None);

    assert!(result.succeeded(), "errors: {:?}", result.errors);
    assert_eq!(
        invocation.language_config().version,
        glaze_language::GlslVersion::V310
    );
    assert_eq!(
        invocation.language_config().profile,
        glaze_language::GlslProfile::Es
    );
}

#[test]
fn atom_interning_is_idempotent_across_result() {
    let mut result = compile("int abc; int abc_2;");
    let a = result.atoms.atom("abc");
    let b = result.atoms.atom("abc");
    assert_eq!(a, b);
    // Already-interned identifiers resolve to the same handle.
    assert_eq!(result.atoms.atom_readonly("abc"), a);
}

#[test]
fn token_monotonicity_holds_for_any_compiled_stream() {
    let result = compile(
        "#define PAIR(t, n) t n\nPAIR(int, a);\nPAIR(float, b);\nvoid main() { a = 1; b = 2.0; }",
    );
    for pair in result.tokens.windows(2) {
        assert!(pair[0].expanded_range.start <= pair[1].expanded_range.start);
        if pair[0].spelled_file == pair[1].spelled_file {
            assert!(pair[0].spelled_range.start <= pair[1].spelled_range.start);
        }
    }
}

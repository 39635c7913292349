//! Preprocessing observed through the full pipeline: macro expansion into
//! the AST, conditional skipping, includes.

mod common;

use common::{compile, token_texts};
use glaze_language::ast::{AstDeclKind, AstExprKind};
use glaze_language::{ConstValue, TokenKlass};

#[test]
fn object_macro_expands_into_typed_literal() {
    let result = compile("#define N 42\nint x = N;");
    assert!(result.succeeded(), "errors: {:?}", result.errors);

    // The token stream sees the literal at the use site of N.
    let forty_two = result
        .tokens
        .iter()
        .find(|t| result.atoms.text(t.text) == "42")
        .unwrap();
    assert_eq!(forty_two.klass, TokenKlass::IntegerConstant);
    assert_eq!(forty_two.expanded_range.start.line, 1);

    // The AST sees one variable `x` of type int initialized to const 42.
    let unit = result.main_translation_unit().unwrap();
    assert_eq!(unit.decls.len(), 1);
    let AstDeclKind::Variable { declarators, .. } = &result.ast.decl(unit.decls[0]).kind else {
        panic!("expected a variable declaration");
    };
    assert_eq!(declarators.len(), 1);
    assert_eq!(result.atoms.text(declarators[0].name), "x");

    let init = declarators[0].init.unwrap();
    let init_expr = result.ast.expr(init);
    assert!(matches!(init_expr.kind, AstExprKind::Literal));
    assert_eq!(init_expr.value, Some(ConstValue::from_i32(42)));
}

#[test]
fn pasted_identifier_declares_variable() {
    let result = compile("#define CAT(a,b) a##b\nint CAT(foo,42) = 0;");
    assert!(result.succeeded(), "errors: {:?}", result.errors);

    assert!(result
        .tokens
        .iter()
        .any(|t| t.klass == TokenKlass::Identifier && result.atoms.text(t.text) == "foo42"));

    let unit = result.main_translation_unit().unwrap();
    let AstDeclKind::Variable { declarators, .. } = &result.ast.decl(unit.decls[0]).kind else {
        panic!("expected a variable declaration");
    };
    assert_eq!(result.atoms.text(declarators[0].name), "foo42");
}

#[test]
fn skipped_conditional_swallows_garbage() {
    let result = compile("#if 0\n  this is garbage !!! @@@\n#endif\nint y;");
    assert!(result.succeeded(), "errors: {:?}", result.errors);
    assert_eq!(token_texts(&result), vec!["int", "y", ";"]);

    let unit = result.main_translation_unit().unwrap();
    let AstDeclKind::Variable { declarators, .. } = &result.ast.decl(unit.decls[0]).kind else {
        panic!("expected a variable declaration");
    };
    assert_eq!(result.atoms.text(declarators[0].name), "y");
}

#[test]
fn active_conditional_surfaces_the_errors() {
    let result = compile("#if 1\n  this is garbage !!! @@@\n#endif\nint y;");
    assert!(!result.succeeded());
}

#[test]
fn macro_recursion_is_hygienic() {
    let result = compile("#define M X\n#define X M\nint a = 1;\nM\n");
    // Exactly one identifier token comes out of the M expansion chain.
    let expanded: Vec<_> = result
        .tokens
        .iter()
        .filter(|t| t.expanded_range.start.line == 3)
        .collect();
    assert_eq!(expanded.len(), 1);
    assert_eq!(expanded[0].klass, TokenKlass::Identifier);
}

#[test]
fn include_provides_declarations() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("lighting.glsl"),
        "float attenuation(float d);\n",
    )
    .unwrap();

    let mut invocation = glaze_compile::CompilerInvocation::new();
    invocation.language_config_mut().no_stdlib = true;
    invocation
        .compiler_config_mut()
        .include_paths
        .push(dir.path().to_path_buf());
    invocation.set_main_from_buffer(
        "#include \"lighting.glsl\"\nvoid main() { float a = attenuation(2.0); }",
    );
    let result = invocation.compile_main(glaze_compile::CompileMode::Full, None);
    assert!(result.succeeded(), "errors: {:?}", result.errors);
}

#[test]
fn version_macro_expands_to_configured_version() {
    let result = compile("#version 450\nint v = __VERSION__;");
    assert!(result.succeeded(), "errors: {:?}", result.errors);

    let unit = result.main_translation_unit().unwrap();
    let AstDeclKind::Variable { declarators, .. } = &result.ast.decl(unit.decls[0]).kind else {
        panic!("expected a variable declaration");
    };
    let init = result.ast.expr(declarators[0].init.unwrap());
    assert_eq!(init.value, Some(ConstValue::from_i32(450)));
}

#[test]
fn line_macro_is_usable_in_expressions() {
    let result = compile("int first = __LINE__;\nint second = __LINE__;");
    assert!(result.succeeded(), "errors: {:?}", result.errors);

    let unit = result.main_translation_unit().unwrap();
    let values: Vec<i32> = unit
        .decls
        .iter()
        .map(|&d| {
            let AstDeclKind::Variable { declarators, .. } = &result.ast.decl(d).kind else {
                panic!("expected variables");
            };
            result
                .ast
                .expr(declarators[0].init.unwrap())
                .value
                .as_ref()
                .and_then(|v| v.as_i32())
                .unwrap()
        })
        .collect();
    assert_eq!(values, vec![1, 2]);
}

#[test]
fn function_macro_without_invocation_stays_identifier() {
    let result = compile("#define F(x) x\nint F = 3;");
    assert!(result.succeeded(), "errors: {:?}", result.errors);
    assert_eq!(token_texts(&result), vec!["int", "F", "=", "3", ";"]);
}

#[test]
fn conditional_on_version_selects_declarations() {
    let result = compile(
        "#version 430\n#if __VERSION__ >= 430\nint modern;\n#else\nint legacy;\n#endif",
    );
    assert!(result.succeeded(), "errors: {:?}", result.errors);
    assert_eq!(token_texts(&result), vec!["int", "modern", ";"]);
}

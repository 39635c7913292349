//! Parser structure, error recovery and the AST range invariant.

mod common;

use common::compile;
use glaze_language::ast::{AstDeclKind, AstStmtKind, NodeRef, VisitPolicy};
use glaze_language::TokenKlass;

fn function_names(result: &glaze_compile::CompilerResult) -> Vec<String> {
    let unit = result.main_translation_unit().unwrap();
    unit.decls
        .iter()
        .filter_map(|&d| match &result.ast.decl(d).kind {
            AstDeclKind::Function { name, .. } => Some(result.atoms.text(*name).to_string()),
            _ => None,
        })
        .collect()
}

#[test]
fn unclosed_parens_recover_at_semicolon() {
    let result = compile("void foo((((((\n;\nvoid bar();");

    // Both functions survive; foo has no body; at least one diagnostic.
    assert_eq!(function_names(&result), vec!["foo", "bar"]);
    assert!(!result.errors.is_empty());

    let unit = result.main_translation_unit().unwrap();
    for &decl in &unit.decls {
        if let AstDeclKind::Function { body, .. } = &result.ast.decl(decl).kind {
            assert!(body.is_none());
        }
    }

    // No tokens are lost from the stream.
    let lparens = result
        .tokens
        .iter()
        .filter(|t| t.klass == TokenKlass::LParen)
        .count();
    assert_eq!(lparens, 7);
}

#[test]
fn garbage_statement_recovers_inside_block() {
    let result = compile("void main() { int a = 1; ??? ; int b = 2; a + b; }");
    assert!(!result.succeeded());

    let unit = result.main_translation_unit().unwrap();
    let AstDeclKind::Function { body: Some(body), .. } = &result.ast.decl(unit.decls[0]).kind
    else {
        panic!("expected main with a body");
    };
    let AstStmtKind::Compound { stmts } = &result.ast.stmt(*body).kind else {
        panic!("expected a compound body");
    };
    // The declarations on either side of the garbage both parsed.
    assert!(stmts.len() >= 3);
}

#[test]
fn missing_semicolon_is_inferred() {
    let result = compile("int a = 1\nint b = 2;");
    assert!(!result.succeeded());

    let unit = result.main_translation_unit().unwrap();
    assert_eq!(unit.decls.len(), 2);
}

#[test]
fn statements_parse_into_expected_shapes() {
    let result = compile(
        r#"
void main() {
    int i = 0;
    for (int k = 0; k < 4; k++) { i += k; }
    while (i > 0) { i--; }
    do { i++; } while (i < 2);
    if (i == 2) { i = 3; } else { i = 4; }
    switch (i) {
        case 3:
            break;
        default:
            break;
    }
    return;
}
"#,
    );
    assert!(result.succeeded(), "errors: {:?}", result.errors);

    let unit = result.main_translation_unit().unwrap();
    let AstDeclKind::Function { body: Some(body), .. } = &result.ast.decl(unit.decls[0]).kind
    else {
        panic!("expected main with a body");
    };
    let AstStmtKind::Compound { stmts } = &result.ast.stmt(*body).kind else {
        panic!("expected a compound body");
    };

    let kinds: Vec<&str> = stmts
        .iter()
        .map(|&s| match &result.ast.stmt(s).kind {
            AstStmtKind::Decl { .. } => "decl",
            AstStmtKind::For { .. } => "for",
            AstStmtKind::While { .. } => "while",
            AstStmtKind::DoWhile { .. } => "dowhile",
            AstStmtKind::If { .. } => "if",
            AstStmtKind::Switch { .. } => "switch",
            AstStmtKind::Return { .. } => "return",
            _ => "other",
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["decl", "for", "while", "dowhile", "if", "switch", "return"]
    );
}

#[test]
fn struct_and_interface_block_declarations() {
    let result = compile(
        r#"
struct Light {
    vec3 position;
    float intensity;
};

uniform Scene {
    int light_count;
} scene;

Light picked;
void main() { float x = picked.intensity; int n = scene.light_count; }
"#,
    );
    assert!(result.succeeded(), "errors: {:?}", result.errors);
}

#[test]
fn ast_ranges_cover_children() {
    let result = compile(
        r#"
#define HALF(x) ((x) * 0.5)
struct Light { vec3 position; };
uniform float strength;
float falloff(float d) {
    float s = HALF(d + strength);
    if (s > 1.0) { return 1.0; }
    for (int i = 0; i < 4; i++) { s += float(i); }
    return s;
}
"#,
    );
    assert!(result.succeeded(), "errors: {:?}", result.errors);

    let unit = result.main_translation_unit().unwrap();
    let mut checked = 0usize;
    for &decl in &unit.decls {
        result.ast.walk(NodeRef::Decl(decl), &mut |node| {
            let range = result.ast.node_range(node);
            for child in result.ast.children_of(node) {
                let child_range = result.ast.node_range(child);
                assert!(
                    range.covers(child_range),
                    "{node:?} {range:?} does not cover {child:?} {child_range:?}"
                );
                checked += 1;
            }
            VisitPolicy::Traverse
        });
    }
    assert!(checked > 10, "expected a deep tree, checked {checked}");
}

#[test]
fn parser_terminates_on_arbitrary_inputs() {
    let nasty = [
        "((((((((((",
        ")))))",
        "{{{{{",
        "}}}}}",
        "= = = = =",
        "int int int int",
        "a.b.c.d.e.f(((",
        "case case case",
        "for for for (",
        "struct { struct { struct {",
        "x[[[[[1]]",
        "void f( , , , );",
        "#define X X\nX X X",
        "?:?:?:",
        "1 + + + + 2",
        "\u{00e9}\u{00e9}\u{00e9} @@@ $$$",
    ];
    for source in nasty {
        // Termination with a result is the property; diagnostics vary.
        let result = compile(source);
        assert_eq!(
            result.tokens.last().map(|t| t.klass),
            Some(TokenKlass::Eof),
            "{source}"
        );
        assert!(result.main_translation_unit().is_some(), "{source}");
    }
}

#[test]
fn constructor_call_statement_is_an_expression() {
    let result = compile("void main() { vec3 v = vec3(1.0, 2.0, 3.0); vec3(0.0); }");
    assert!(result.succeeded(), "errors: {:?}", result.errors);
}

#[test]
fn length_method_parses_on_arrays_and_vectors() {
    let result = compile(
        "float arr[4];\nvec3 v;\nvoid main() { int a = arr.length(); int b = v.length(); }",
    );
    assert!(result.succeeded(), "errors: {:?}", result.errors);
}

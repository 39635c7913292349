//! Semantic attribution: overload resolution, swizzle typing, implicit
//! casts and constant folding.

mod common;

use common::compile;
use glaze_language::ast::{AstDeclKind, AstExprKind, AstStmtKind, ExprId};
use glaze_language::types::TypeKind;
use glaze_language::{ConstValue, ScalarKind};

/// Initializer expression of the variable named `name`.
fn init_of(result: &glaze_compile::CompilerResult, name: &str) -> ExprId {
    let unit = result.main_translation_unit().unwrap();
    for &decl in &unit.decls {
        if let AstDeclKind::Variable { declarators, .. } = &result.ast.decl(decl).kind {
            for d in declarators {
                if result.atoms.text(d.name) == name {
                    return d.init.expect("declarator has no initializer");
                }
            }
        }
    }
    panic!("no variable named {name}");
}

/// The statements of the sole function's body.
fn body_stmts(result: &glaze_compile::CompilerResult) -> Vec<glaze_language::ast::StmtId> {
    let unit = result.main_translation_unit().unwrap();
    for &decl in &unit.decls {
        if let AstDeclKind::Function { body: Some(body), .. } = &result.ast.decl(decl).kind {
            if let AstStmtKind::Compound { stmts } = &result.ast.stmt(*body).kind {
                return stmts.clone();
            }
        }
    }
    panic!("no function body found");
}

#[test]
fn exact_overload_beats_conversion() {
    let source = "void f(int);\nvoid f(float);\nvoid g() { f(1); }";
    let result = compile(source);
    assert!(result.succeeded(), "errors: {:?}", result.errors);

    // The int argument is not cast: exact match wins.
    let stmts = body_stmts(&result);
    let AstStmtKind::Expr { expr } = &result.ast.stmt(stmts[0]).kind else {
        panic!("expected a call statement");
    };
    let AstExprKind::FunctionCall { args, .. } = &result.ast.expr(*expr).kind else {
        panic!("expected a function call");
    };
    assert!(matches!(
        result.ast.expr(args[0]).kind,
        AstExprKind::Literal
    ));
}

#[test]
fn float_literal_selects_float_overload() {
    let result = compile("void f(int);\nvoid f(float);\nvoid g() { f(1.0); }");
    assert!(result.succeeded(), "errors: {:?}", result.errors);
}

#[test]
fn exact_match_survives_more_overloads() {
    let result = compile("void f(int);\nvoid f(float);\nvoid f(uint);\nvoid g() { f(1); }");
    assert!(result.succeeded(), "errors: {:?}", result.errors);

    let stmts = body_stmts(&result);
    let AstStmtKind::Expr { expr } = &result.ast.stmt(stmts[0]).kind else {
        panic!("expected a call statement");
    };
    // Still no implicit cast on the argument.
    let AstExprKind::FunctionCall { args, .. } = &result.ast.expr(*expr).kind else {
        panic!("expected a function call");
    };
    assert!(matches!(result.ast.expr(args[0]).kind, AstExprKind::Literal));
}

#[test]
fn convertible_argument_gets_an_implicit_cast() {
    let result = compile("void f(float);\nvoid g() { f(1); }");
    assert!(result.succeeded(), "errors: {:?}", result.errors);

    let stmts = body_stmts(&result);
    let AstStmtKind::Expr { expr } = &result.ast.stmt(stmts[0]).kind else {
        panic!("expected a call statement");
    };
    let AstExprKind::FunctionCall { args, .. } = &result.ast.expr(*expr).kind else {
        panic!("expected a function call");
    };
    assert!(matches!(
        result.ast.expr(args[0]).kind,
        AstExprKind::ImplicitCast { .. }
    ));
}

#[test]
fn ambiguous_call_is_reported() {
    let result = compile(
        "void f(uint, float);\nvoid f(float, uint);\nvoid g() { f(1, 1); }",
    );
    assert!(!result.succeeded());
    assert!(result
        .errors
        .iter()
        .any(|d| d.message.contains("ambiguous")));
}

#[test]
fn swizzle_types_follow_component_count() {
    let result = compile("vec3 v;\nfloat a = v.x;\nvec2 b = v.xy;");
    assert!(result.succeeded(), "errors: {:?}", result.errors);

    let a = result.ast.expr(init_of(&result, "a"));
    assert_eq!(*result.types.kind(a.ty), TypeKind::Scalar(ScalarKind::F32));

    let b = result.ast.expr(init_of(&result, "b"));
    assert_eq!(
        *result.types.kind(b.ty),
        TypeKind::Vector {
            elem: ScalarKind::F32,
            size: 2
        }
    );
}

#[test]
fn out_of_range_swizzle_is_error_typed() {
    let result = compile("vec3 v;\nvec4 c = v.xyzw;");
    assert!(!result.succeeded());

    let c = result.ast.expr(init_of(&result, "c"));
    // The swizzle node itself carries the error type; the initializer check
    // stays quiet about it.
    let inner = match &c.kind {
        AstExprKind::SwizzleAccess { .. } => c,
        AstExprKind::ImplicitCast { operand } => result.ast.expr(*operand),
        _ => c,
    };
    assert!(result.types.is_error(inner.ty));
}

#[test]
fn rgba_and_stpq_sets_swizzle_too() {
    let result = compile("vec4 color;\nvec3 rgb = color.rgb;\nvec2 st = color.st;");
    assert!(result.succeeded(), "errors: {:?}", result.errors);
}

#[test]
fn mixed_swizzle_sets_are_rejected() {
    let result = compile("vec4 v;\nvec2 bad = v.xg;");
    assert!(!result.succeeded());
}

#[test]
fn literal_fold_round_trips() {
    let result = compile("int a = +41;\nint b = 41 + 0;\nfloat c = +1.5;\nfloat d = 1.5 + 0.0;");
    assert!(result.succeeded(), "errors: {:?}", result.errors);

    for name in ["a", "b"] {
        let expr = result.ast.expr(init_of(&result, name));
        assert_eq!(expr.value, Some(ConstValue::from_i32(41)), "{name}");
    }
    for name in ["c", "d"] {
        let expr = result.ast.expr(init_of(&result, name));
        assert_eq!(expr.value, Some(ConstValue::from_f32(1.5)), "{name}");
    }
}

#[test]
fn const_expressions_fold_through_operators() {
    let result = compile(
        "int a = 2 + 3 * 4;\nint b = (1 << 4) | 1;\nbool c = 3 < 5;\nfloat d = 1.0 / 2.0;\nint e = true ? 7 : 8;",
    );
    assert!(result.succeeded(), "errors: {:?}", result.errors);

    assert_eq!(result.ast.expr(init_of(&result, "a")).value, Some(ConstValue::from_i32(14)));
    assert_eq!(result.ast.expr(init_of(&result, "b")).value, Some(ConstValue::from_i32(17)));
    assert_eq!(result.ast.expr(init_of(&result, "c")).value, Some(ConstValue::from_bool(true)));
    assert_eq!(result.ast.expr(init_of(&result, "d")).value, Some(ConstValue::from_f32(0.5)));
    assert_eq!(result.ast.expr(init_of(&result, "e")).value, Some(ConstValue::from_i32(7)));
}

#[test]
fn constructor_folding() {
    let result = compile("vec2 v = vec2(1.0, 2.0);\nvec3 s = vec3(0.5);");
    assert!(result.succeeded(), "errors: {:?}", result.errors);

    let v = result.ast.expr(init_of(&result, "v"));
    assert!(v.value.is_some());
    let s = result.ast.expr(init_of(&result, "s"));
    let cells = s.value.as_ref().unwrap().cells().len();
    assert_eq!(cells, 3);
}

#[test]
fn array_sizes_use_folded_constants() {
    let result = compile("#define COUNT 4\nfloat weights[COUNT * 2];\nint n = weights.length();");
    assert!(result.succeeded(), "errors: {:?}", result.errors);

    let n = result.ast.expr(init_of(&result, "n"));
    assert_eq!(n.value, Some(ConstValue::from_i32(8)));
}

#[test]
fn non_constant_array_size_is_reported() {
    let result = compile("int k;\nfloat weights[k];");
    assert!(!result.succeeded());
    assert!(result
        .errors
        .iter()
        .any(|d| d.message.contains("constant")));
}

#[test]
fn incompatible_initializer_is_reported() {
    let result = compile("vec3 v;\nint bad = v;");
    assert!(!result.succeeded());
}

#[test]
fn down_rank_conversion_is_rejected() {
    let result = compile("float f_value;\nvoid g() { int x = 0; x = f_value; }");
    assert!(!result.succeeded());
    assert!(result.errors.iter().any(|d| d.message.contains("assign")));
}

#[test]
fn binary_operands_unify_with_casts() {
    let result = compile("int i;\nfloat f_value;\nfloat r = i + f_value;");
    assert!(result.succeeded(), "errors: {:?}", result.errors);

    let r = result.ast.expr(init_of(&result, "r"));
    let AstExprKind::Binary { lhs, .. } = &r.kind else {
        panic!("expected a binary expression");
    };
    assert!(matches!(
        result.ast.expr(*lhs).kind,
        AstExprKind::ImplicitCast { .. }
    ));
    assert_eq!(*result.types.kind(r.ty), TypeKind::Scalar(ScalarKind::F32));
}

#[test]
fn vector_scalar_arithmetic_broadcasts() {
    let result = compile("vec3 v;\nvec3 doubled = v * 2.0;");
    assert!(result.succeeded(), "errors: {:?}", result.errors);
}

#[test]
fn unknown_identifier_errors_do_not_cascade() {
    let result = compile("float a = mystery;\nfloat b = a + 1.0;");
    // Exactly one unknown-identifier error; the follow-on expression types
    // against the sentinel without a second report.
    let unknown: Vec<_> = result
        .errors
        .iter()
        .filter(|d| d.message.contains("unknown identifier"))
        .collect();
    assert_eq!(unknown.len(), 1);
    let incompat: Vec<_> = result
        .errors
        .iter()
        .filter(|d| d.message.contains("incompatible"))
        .collect();
    assert!(incompat.is_empty());
}

#[test]
fn struct_field_types_resolve() {
    let result = compile(
        "struct Material { vec3 albedo; float rough; };\nMaterial m;\nfloat r = m.rough;\nvec3 a = m.albedo;",
    );
    assert!(result.succeeded(), "errors: {:?}", result.errors);

    let r = result.ast.expr(init_of(&result, "r"));
    assert_eq!(*result.types.kind(r.ty), TypeKind::Scalar(ScalarKind::F32));
}

#[test]
fn missing_struct_field_is_reported() {
    let result = compile("struct S { int a; };\nS s;\nint b = s.missing;");
    assert!(!result.succeeded());
    assert!(result.errors.iter().any(|d| d.message.contains("missing")));
}

#[test]
fn indexing_reduces_rank() {
    let result = compile(
        "mat3 m;\nvec3 column = m[0];\nfloat cell = m[0][1];\nvec4 v;\nfloat comp = v[2];\nfloat arr[3];\nfloat elem = arr[1];",
    );
    assert!(result.succeeded(), "errors: {:?}", result.errors);

    let column = result.ast.expr(init_of(&result, "column"));
    assert_eq!(
        *result.types.kind(column.ty),
        TypeKind::Vector {
            elem: ScalarKind::F32,
            size: 3
        }
    );
    let cell = result.ast.expr(init_of(&result, "cell"));
    assert_eq!(*result.types.kind(cell.ty), TypeKind::Scalar(ScalarKind::F32));
}

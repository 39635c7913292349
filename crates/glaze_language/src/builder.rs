//! AST construction with semantic attribution.
//!
//! The parser describes syntax; the builder owns everything semantic that
//! happens while nodes are created: resolving names against the scope stack,
//! deducing expression types, inserting [`AstExprKind::ImplicitCast`] nodes
//! where values convert, folding constant subexpressions through
//! [`ConstValue`], and resolving call sites against the overload map.
//!
//! Failures never abort: an ill-typed expression gets the error type, a
//! diagnostic is recorded, and downstream nodes keep building. The error
//! type converts to nothing, so one mistake does not cascade into a wall of
//! diagnostics.

use glaze_base::{Atom, AtomTable, DiagnosticSink, SyntaxRange, SyntaxTokenId};

use crate::ast::{
    AstContext, AstDecl, AstDeclKind, AstExpr, AstExprKind, AstQualType, AstStmt, AstStmtKind,
    AstTranslationUnit, BinaryOp, DeclId, Declarator, ExprId, JumpKind, QualTypeId, QualifierSet,
    StmtId, Swizzle, TranslationUnitKind, UnaryOp,
};
use crate::consts::{parse_number_literal, ConstValue, ScalarKind};
use crate::symbol::{
    DeclView, FunctionEntry, FunctionResolution, ScopeKind, SymbolKind, SymbolTable,
};
use crate::token::{SyntaxToken, TokenKlass};
use crate::types::{StructField, TypeContext, TypeId, TypeKind};

/// Builds AST nodes into the shared compilation state.
pub struct AstBuilder<'c> {
    pub ast: &'c mut AstContext,
    pub types: &'c mut TypeContext,
    pub symbols: &'c mut SymbolTable,
    pub diags: &'c mut DiagnosticSink,
    pub atoms: &'c AtomTable,
}

impl<'c> AstBuilder<'c> {
    pub fn new(
        ast: &'c mut AstContext,
        types: &'c mut TypeContext,
        symbols: &'c mut SymbolTable,
        diags: &'c mut DiagnosticSink,
        atoms: &'c AtomTable,
    ) -> AstBuilder<'c> {
        AstBuilder {
            ast,
            types,
            symbols,
            diags,
            atoms,
        }
    }

    // Scope bracketing, called by the parser around function and block
    // structure.

    pub fn enter_function_scope(&mut self) {
        self.symbols.push_scope(ScopeKind::FunctionParams);
    }

    pub fn leave_function_scope(&mut self) {
        self.symbols.pop_scope();
    }

    pub fn enter_block_scope(&mut self) {
        self.symbols.push_scope(ScopeKind::Block);
    }

    pub fn leave_block_scope(&mut self) {
        self.symbols.pop_scope();
    }

    /// Expression-vs-declaration disambiguation support.
    pub fn is_type_name(&self, name: Atom) -> bool {
        self.symbols.is_type_name(name)
    }

    fn error_ty(&self) -> TypeId {
        self.types.error_type()
    }

    fn expr_ty(&self, id: ExprId) -> TypeId {
        self.ast.expr(id).ty
    }

    fn expr_value(&self, id: ExprId) -> Option<&ConstValue> {
        self.ast.expr(id).value.as_ref()
    }

    // Expressions.

    pub fn error_expr(&mut self, range: SyntaxRange) -> ExprId {
        let ty = self.error_ty();
        self.ast.alloc_expr(AstExpr {
            range,
            ty,
            value: None,
            kind: AstExprKind::Error,
        })
    }

    pub fn literal_expr(&mut self, range: SyntaxRange, token: SyntaxToken) -> ExprId {
        let value = match token.klass {
            TokenKlass::KwTrue => ConstValue::from_bool(true),
            TokenKlass::KwFalse => ConstValue::from_bool(false),
            TokenKlass::IntegerConstant | TokenKlass::FloatConstant => {
                parse_number_literal(self.atoms.text(token.text))
            }
            _ => ConstValue::error(),
        };

        let ty = if value.is_error() {
            self.diags.error(range, "malformed literal");
            self.error_ty()
        } else {
            self.types.scalar(value.scalar_kind())
        };

        self.ast.alloc_expr(AstExpr {
            range,
            ty,
            value: (!value.is_error()).then_some(value),
            kind: AstExprKind::Literal,
        })
    }

    pub fn name_expr(&mut self, range: SyntaxRange, token: SyntaxToken) -> ExprId {
        let ty = match self.symbols.find(token.text) {
            Some(DeclView { ty, .. }) => ty,
            None => {
                let name = self.atoms.text(token.text);
                self.diags.error(range, format!("unknown identifier '{name}'"));
                self.error_ty()
            }
        };

        self.ast.alloc_expr(AstExpr {
            range,
            ty,
            value: None,
            kind: AstExprKind::NameAccess {
                name: token.text,
                token: token.id,
            },
        })
    }

    /// `expr.name`: struct field access or vector swizzle.
    pub fn member_expr(&mut self, range: SyntaxRange, lhs: ExprId, name_token: SyntaxToken) -> ExprId {
        let lhs_ty = self.expr_ty(lhs);
        let name = name_token.text;

        if self.types.is_error(lhs_ty) {
            return self.ast.alloc_expr(AstExpr {
                range,
                ty: self.types.error_type(),
                value: None,
                kind: AstExprKind::FieldAccess {
                    lhs,
                    name,
                    token: name_token.id,
                },
            });
        }

        match self.types.kind(lhs_ty).clone() {
            TypeKind::Vector { elem, size } => {
                let text = self.atoms.text(name);
                match Swizzle::parse(text) {
                    Some(swizzle) => {
                        let ty = if swizzle.max_component() >= size {
                            self.diags.error(
                                range,
                                format!("swizzle '{text}' selects components beyond vec{size}"),
                            );
                            self.error_ty()
                        } else if swizzle.len == 1 {
                            self.types.scalar(elem)
                        } else {
                            self.types.vector(elem, swizzle.len)
                        };
                        self.ast.alloc_expr(AstExpr {
                            range,
                            ty,
                            value: None,
                            kind: AstExprKind::SwizzleAccess { lhs, swizzle },
                        })
                    }
                    None => {
                        self.diags
                            .error(range, format!("invalid swizzle '{text}'"));
                        let ty = self.error_ty();
                        self.ast.alloc_expr(AstExpr {
                            range,
                            ty,
                            value: None,
                            kind: AstExprKind::FieldAccess {
                                lhs,
                                name,
                                token: name_token.id,
                            },
                        })
                    }
                }
            }
            TypeKind::Struct { .. } => {
                let ty = match self.types.find_field(lhs_ty, name) {
                    Some(field_ty) => field_ty,
                    None => {
                        let text = self.atoms.text(name);
                        let shown = self.types.display(lhs_ty, self.atoms);
                        self.diags
                            .error(range, format!("no field '{text}' in {shown}"));
                        self.error_ty()
                    }
                };
                self.ast.alloc_expr(AstExpr {
                    range,
                    ty,
                    value: None,
                    kind: AstExprKind::FieldAccess {
                        lhs,
                        name,
                        token: name_token.id,
                    },
                })
            }
            _ => {
                let shown = self.types.display(lhs_ty, self.atoms);
                self.diags
                    .error(range, format!("{shown} has no fields"));
                let ty = self.error_ty();
                self.ast.alloc_expr(AstExpr {
                    range,
                    ty,
                    value: None,
                    kind: AstExprKind::FieldAccess {
                        lhs,
                        name,
                        token: name_token.id,
                    },
                })
            }
        }
    }

    /// `expr.length()`.
    pub fn length_expr(&mut self, range: SyntaxRange, operand: ExprId) -> ExprId {
        let operand_ty = self.expr_ty(operand);
        let int = self.types.scalar(ScalarKind::I32);

        let value = match self.types.kind(operand_ty) {
            TypeKind::Array { size: Some(n), .. } => Some(ConstValue::from_i32(*n as i32)),
            TypeKind::Vector { size, .. } => Some(ConstValue::from_i32(*size as i32)),
            TypeKind::Matrix { cols, .. } => Some(ConstValue::from_i32(*cols as i32)),
            TypeKind::Array { size: None, .. } => None,
            TypeKind::Error => None,
            _ => {
                let shown = self.types.display(operand_ty, self.atoms);
                self.diags
                    .error(range, format!("'.length()' is not defined for {shown}"));
                None
            }
        };

        self.ast.alloc_expr(AstExpr {
            range,
            ty: int,
            value,
            kind: AstExprKind::Unary {
                op: UnaryOp::Length,
                operand,
            },
        })
    }

    pub fn index_expr(&mut self, range: SyntaxRange, lhs: ExprId, index: ExprId) -> ExprId {
        let lhs_ty = self.expr_ty(lhs);
        let index_ty = self.expr_ty(index);

        let index_is_integral = matches!(
            self.types.kind(index_ty),
            TypeKind::Scalar(kind) if kind.is_integral()
        );
        if !index_is_integral && !self.types.is_error(index_ty) {
            self.diags.error(range, "array index must be an integer");
        }

        let ty = match self.types.kind(lhs_ty).clone() {
            TypeKind::Array { element, .. } => element,
            TypeKind::Vector { elem, .. } => self.types.scalar(elem),
            TypeKind::Matrix { elem, rows, .. } => self.types.vector(elem, rows),
            TypeKind::Error => self.error_ty(),
            _ => {
                let shown = self.types.display(lhs_ty, self.atoms);
                self.diags
                    .error(range, format!("{shown} cannot be indexed"));
                self.error_ty()
            }
        };

        self.ast.alloc_expr(AstExpr {
            range,
            ty,
            value: None,
            kind: AstExprKind::IndexAccess { lhs, index },
        })
    }

    pub fn unary_expr(&mut self, range: SyntaxRange, op: UnaryOp, operand: ExprId) -> ExprId {
        let operand_ty = self.expr_ty(operand);
        let elem = self.types.element_kind(operand_ty);

        let ty = if self.types.is_error(operand_ty) {
            self.error_ty()
        } else {
            let valid = match op {
                UnaryOp::Plus | UnaryOp::Minus => elem.is_some_and(|k| k != ScalarKind::Bool),
                UnaryOp::LogicalNot => elem == Some(ScalarKind::Bool),
                UnaryOp::BitNot => elem.is_some_and(|k| k.is_integral()),
                UnaryOp::PrefixInc | UnaryOp::PrefixDec | UnaryOp::PostfixInc
                | UnaryOp::PostfixDec => elem.is_some_and(|k| k != ScalarKind::Bool),
                UnaryOp::Length => true,
            };
            if valid {
                operand_ty
            } else {
                let shown = self.types.display(operand_ty, self.atoms);
                self.diags
                    .error(range, format!("unary operator not defined for {shown}"));
                self.error_ty()
            }
        };

        let value = if self.types.is_error(ty) {
            None
        } else {
            self.expr_value(operand).and_then(|v| {
                let folded = match op {
                    UnaryOp::Plus => v.identity(),
                    UnaryOp::Minus => v.negate(),
                    UnaryOp::LogicalNot => v.logical_not(),
                    UnaryOp::BitNot => v.bit_not(),
                    _ => ConstValue::error(),
                };
                (!folded.is_error()).then_some(folded)
            })
        };

        self.ast.alloc_expr(AstExpr {
            range,
            ty,
            value,
            kind: AstExprKind::Unary { op, operand },
        })
    }

    /// Converts `expr` to `target`, inserting an implicit cast node when the
    /// types differ. `None` when the conversion is not allowed.
    fn coerce(&mut self, expr: ExprId, target: TypeId) -> Option<ExprId> {
        let from = self.expr_ty(expr);
        if from == target {
            return Some(expr);
        }
        if !self.types.implicit_convertible(from, target) {
            return None;
        }

        let value = match (self.expr_value(expr), self.types.element_kind(target)) {
            (Some(v), Some(kind)) => {
                let converted = v.convert(kind);
                (!converted.is_error()).then_some(converted)
            }
            _ => None,
        };
        let range = self.ast.expr(expr).range;
        Some(self.ast.alloc_expr(AstExpr {
            range,
            ty: target,
            value,
            kind: AstExprKind::ImplicitCast { operand: expr },
        }))
    }

    /// Brings two operands to a common type, allowing scalar-with-vector and
    /// scalar-with-matrix mixes the way GLSL arithmetic does.
    fn unify_arithmetic(&mut self, lhs: ExprId, rhs: ExprId) -> Option<(ExprId, ExprId, TypeId)> {
        let lt = self.expr_ty(lhs);
        let rt = self.expr_ty(rhs);
        if lt == rt {
            return Some((lhs, rhs, lt));
        }

        if self.types.implicit_convertible(lt, rt) {
            let lhs = self.coerce(lhs, rt)?;
            return Some((lhs, rhs, rt));
        }
        if self.types.implicit_convertible(rt, lt) {
            let rhs = self.coerce(rhs, lt)?;
            return Some((lhs, rhs, lt));
        }

        // Scalar broadcast against a vector or matrix operand.
        let broadcast = |types: &mut TypeContext, scalar_ty: TypeId, shaped_ty: TypeId| {
            let elem = types.element_kind(shaped_ty)?;
            let scalar_kind = match types.kind(scalar_ty) {
                TypeKind::Scalar(kind) => *kind,
                _ => return None,
            };
            (scalar_kind.rank() <= elem.rank()).then(|| types.scalar(elem))
        };

        match (self.types.kind(lt).clone(), self.types.kind(rt).clone()) {
            (TypeKind::Scalar(_), TypeKind::Vector { .. } | TypeKind::Matrix { .. }) => {
                let target = broadcast(self.types, lt, rt)?;
                let lhs = self.coerce(lhs, target)?;
                Some((lhs, rhs, rt))
            }
            (TypeKind::Vector { .. } | TypeKind::Matrix { .. }, TypeKind::Scalar(_)) => {
                let target = broadcast(self.types, rt, lt)?;
                let rhs = self.coerce(rhs, target)?;
                Some((lhs, rhs, lt))
            }
            _ => None,
        }
    }

    pub fn binary_expr(&mut self, range: SyntaxRange, op: BinaryOp, lhs: ExprId, rhs: ExprId) -> ExprId {
        let lt = self.expr_ty(lhs);
        let rt = self.expr_ty(rhs);

        if self.types.is_error(lt) || self.types.is_error(rt) {
            let ty = self.error_ty();
            return self.ast.alloc_expr(AstExpr {
                range,
                ty,
                value: None,
                kind: AstExprKind::Binary { op, lhs, rhs },
            });
        }

        if op.is_assignment() {
            let (rhs, ty) = match self.coerce(rhs, lt) {
                Some(rhs) => (rhs, lt),
                None => {
                    let from = self.types.display(rt, self.atoms);
                    let to = self.types.display(lt, self.atoms);
                    self.diags
                        .error(range, format!("cannot assign {from} to {to}"));
                    (rhs, self.error_ty())
                }
            };
            return self.ast.alloc_expr(AstExpr {
                range,
                ty,
                value: None,
                kind: AstExprKind::Binary { op, lhs, rhs },
            });
        }

        if op == BinaryOp::Comma {
            return self.ast.alloc_expr(AstExpr {
                range,
                ty: rt,
                value: None,
                kind: AstExprKind::Binary { op, lhs, rhs },
            });
        }

        let bool_ty = self.types.scalar(ScalarKind::Bool);
        let (lhs, rhs, ty) = match op {
            BinaryOp::LogicalAnd | BinaryOp::LogicalOr | BinaryOp::LogicalXor => {
                if lt == bool_ty && rt == bool_ty {
                    (lhs, rhs, bool_ty)
                } else {
                    self.diags
                        .error(range, "logical operators require bool operands");
                    (lhs, rhs, self.error_ty())
                }
            }
            BinaryOp::Equal | BinaryOp::NotEqual => match self.unify_arithmetic(lhs, rhs) {
                Some((l, r, _)) => (l, r, bool_ty),
                None => {
                    self.report_operand_mismatch(range, lt, rt);
                    (lhs, rhs, self.error_ty())
                }
            },
            BinaryOp::Less | BinaryOp::LessEq | BinaryOp::Greater | BinaryOp::GreaterEq => {
                match self.unify_arithmetic(lhs, rhs) {
                    Some((l, r, ty)) if matches!(self.types.kind(ty), TypeKind::Scalar(k) if *k != ScalarKind::Bool) => {
                        (l, r, bool_ty)
                    }
                    _ => {
                        self.report_operand_mismatch(range, lt, rt);
                        (lhs, rhs, self.error_ty())
                    }
                }
            }
            BinaryOp::Mod
            | BinaryOp::BitAnd
            | BinaryOp::BitOr
            | BinaryOp::BitXor
            | BinaryOp::LShift
            | BinaryOp::RShift => match self.unify_arithmetic(lhs, rhs) {
                Some((l, r, ty))
                    if self
                        .types
                        .element_kind(ty)
                        .is_some_and(|k| k.is_integral()) =>
                {
                    (l, r, ty)
                }
                _ => {
                    self.report_operand_mismatch(range, lt, rt);
                    (lhs, rhs, self.error_ty())
                }
            },
            _ => match self.unify_arithmetic(lhs, rhs) {
                Some((l, r, ty))
                    if self
                        .types
                        .element_kind(ty)
                        .is_some_and(|k| k != ScalarKind::Bool) =>
                {
                    (l, r, ty)
                }
                _ => {
                    self.report_operand_mismatch(range, lt, rt);
                    (lhs, rhs, self.error_ty())
                }
            },
        };

        let value = if self.types.is_error(ty) {
            None
        } else {
            self.fold_binary(op, lhs, rhs)
        };

        self.ast.alloc_expr(AstExpr {
            range,
            ty,
            value,
            kind: AstExprKind::Binary { op, lhs, rhs },
        })
    }

    fn report_operand_mismatch(&mut self, range: SyntaxRange, lt: TypeId, rt: TypeId) {
        let left = self.types.display(lt, self.atoms);
        let right = self.types.display(rt, self.atoms);
        self.diags.error(
            range,
            format!("incompatible operand types {left} and {right}"),
        );
    }

    fn fold_binary(&self, op: BinaryOp, lhs: ExprId, rhs: ExprId) -> Option<ConstValue> {
        let a = self.expr_value(lhs)?;
        let b = self.expr_value(rhs)?;

        // Composite equality reduces to one bool: all components equal.
        if matches!(op, BinaryOp::Equal | BinaryOp::NotEqual) {
            let eq = a.compare_eq(b);
            if eq.is_error() {
                return None;
            }
            let all_equal = eq
                .cells()
                .iter()
                .all(|cell| matches!(cell, crate::consts::ScalarCell::Bool(true)));
            return Some(ConstValue::from_bool(
                (op == BinaryOp::Equal) == all_equal,
            ));
        }

        let folded = match op {
            BinaryOp::Plus => a.plus(b),
            BinaryOp::Minus => a.minus(b),
            BinaryOp::Mul => a.mul(b),
            BinaryOp::Div => a.div(b),
            BinaryOp::Mod => a.rem(b),
            BinaryOp::BitAnd => a.bit_and(b),
            BinaryOp::BitOr => a.bit_or(b),
            BinaryOp::BitXor => a.bit_xor(b),
            BinaryOp::LShift => a.shift_left(b),
            BinaryOp::RShift => a.shift_right(b),
            BinaryOp::LogicalAnd => a.logical_and(b),
            BinaryOp::LogicalOr => a.logical_or(b),
            BinaryOp::LogicalXor => a.logical_xor(b),
            BinaryOp::Less => a.compare_lt(b),
            BinaryOp::LessEq => a.compare_le(b),
            BinaryOp::Greater => a.compare_gt(b),
            BinaryOp::GreaterEq => a.compare_ge(b),
            _ => ConstValue::error(),
        };
        (!folded.is_error()).then_some(folded)
    }

    pub fn select_expr(
        &mut self,
        range: SyntaxRange,
        cond: ExprId,
        when_true: ExprId,
        when_false: ExprId,
    ) -> ExprId {
        let bool_ty = self.types.scalar(ScalarKind::Bool);
        let cond_ty = self.expr_ty(cond);
        if cond_ty != bool_ty && !self.types.is_error(cond_ty) {
            self.diags
                .error(range, "condition of '?:' must be a bool");
        }

        let tt = self.expr_ty(when_true);
        let ft = self.expr_ty(when_false);
        let (when_true, when_false, ty) = if self.types.is_error(tt) || self.types.is_error(ft) {
            (when_true, when_false, self.error_ty())
        } else if tt == ft {
            (when_true, when_false, tt)
        } else if self.types.implicit_convertible(tt, ft) {
            match self.coerce(when_true, ft) {
                Some(t) => (t, when_false, ft),
                None => (when_true, when_false, self.error_ty()),
            }
        } else if self.types.implicit_convertible(ft, tt) {
            match self.coerce(when_false, tt) {
                Some(f) => (when_true, f, tt),
                None => (when_true, when_false, self.error_ty()),
            }
        } else {
            self.report_operand_mismatch(range, tt, ft);
            (when_true, when_false, self.error_ty())
        };

        let value = if self.types.is_error(ty) {
            None
        } else {
            match (
                self.expr_value(cond).and_then(|c| c.as_bool()),
                self.expr_value(when_true),
                self.expr_value(when_false),
            ) {
                (Some(true), Some(v), Some(_)) => Some(v.clone()),
                (Some(false), Some(_), Some(v)) => Some(v.clone()),
                _ => None,
            }
        };

        self.ast.alloc_expr(AstExpr {
            range,
            ty,
            value,
            kind: AstExprKind::Select {
                cond,
                when_true,
                when_false,
            },
        })
    }

    pub fn call_expr(
        &mut self,
        range: SyntaxRange,
        name_token: SyntaxToken,
        args: Vec<ExprId>,
    ) -> ExprId {
        let arg_types: Vec<TypeId> = args.iter().map(|&a| self.expr_ty(a)).collect();

        if arg_types.iter().any(|&t| self.types.is_error(t)) {
            let ty = self.error_ty();
            return self.ast.alloc_expr(AstExpr {
                range,
                ty,
                value: None,
                kind: AstExprKind::FunctionCall {
                    name: name_token.text,
                    token: name_token.id,
                    args,
                },
            });
        }

        let (args, ty) = match self.symbols.find_function(name_token.text, &arg_types, self.types)
        {
            FunctionResolution::Found(entry) => {
                let mut coerced = Vec::with_capacity(args.len());
                for (&arg, &param) in args.iter().zip(&entry.params) {
                    coerced.push(self.coerce(arg, param).unwrap_or(arg));
                }
                (coerced, entry.return_type)
            }
            FunctionResolution::Ambiguous => {
                let name = self.atoms.text(name_token.text);
                self.diags
                    .error(range, format!("ambiguous call to '{name}'"));
                (args, self.error_ty())
            }
            FunctionResolution::NotFound => {
                let name = self.atoms.text(name_token.text);
                self.diags
                    .error(range, format!("no matching function for call to '{name}'"));
                (args, self.error_ty())
            }
        };

        self.ast.alloc_expr(AstExpr {
            range,
            ty,
            value: None,
            kind: AstExprKind::FunctionCall {
                name: name_token.text,
                token: name_token.id,
                args,
            },
        })
    }

    pub fn constructor_expr(
        &mut self,
        range: SyntaxRange,
        constructed: TypeId,
        args: Vec<ExprId>,
    ) -> ExprId {
        let value = self.fold_constructor(range, constructed, &args);
        self.ast.alloc_expr(AstExpr {
            range,
            ty: constructed,
            value,
            kind: AstExprKind::ConstructorCall { constructed, args },
        })
    }

    /// Folds `vecN(...)` / `matN(...)` / scalar constructors over constant
    /// arguments: exact element count, or a single scalar that splats
    /// (diagonal for matrices).
    fn fold_constructor(
        &mut self,
        range: SyntaxRange,
        constructed: TypeId,
        args: &[ExprId],
    ) -> Option<ConstValue> {
        let (elem, rows, cols) = match self.types.kind(constructed) {
            TypeKind::Scalar(kind) => (*kind, 1u8, 1u8),
            TypeKind::Vector { elem, size } => (*elem, *size, 1),
            TypeKind::Matrix { elem, rows, cols } => (*elem, *rows, *cols),
            _ => return None,
        };
        let needed = rows as usize * cols as usize;

        let mut cells = Vec::new();
        for &arg in args {
            let value = self.expr_value(arg)?.convert(elem);
            if value.is_error() {
                return None;
            }
            cells.extend(value.cells().iter().copied());
        }

        if cells.len() == needed {
            return match (rows, cols) {
                (1, 1) => Some(ConstValue::scalar(cells[0])),
                (_, 1) => Some(ConstValue::vector(cells)),
                _ => Some(ConstValue::matrix(rows, cols, cells)),
            };
        }

        if cells.len() == 1 {
            let cell = cells[0];
            return match (rows, cols) {
                (1, 1) => Some(ConstValue::scalar(cell)),
                (_, 1) => Some(ConstValue::vector(vec![cell; rows as usize])),
                _ => {
                    // A single scalar fills the diagonal.
                    let one = ConstValue::scalar(cell);
                    let zero = one.minus(&one);
                    let zero_cell = *zero.cells().first()?;
                    let mut diag = vec![zero_cell; needed];
                    for i in 0..rows.min(cols) {
                        diag[(i as usize) * rows as usize + i as usize] = cell;
                    }
                    Some(ConstValue::matrix(rows, cols, diag))
                }
            };
        }

        self.diags.error(
            range,
            format!("constructor expects {needed} components, got {}", cells.len()),
        );
        None
    }

    pub fn initializer_list_expr(
        &mut self,
        range: SyntaxRange,
        items: Vec<ExprId>,
        target: Option<TypeId>,
    ) -> ExprId {
        let ty = target.unwrap_or_else(|| self.error_ty());
        self.ast.alloc_expr(AstExpr {
            range,
            ty,
            value: None,
            kind: AstExprKind::InitializerList { items },
        })
    }

    // Qualified types.

    /// Resolves a type specifier into a [`QualTypeId`].
    pub fn qual_type(
        &mut self,
        range: SyntaxRange,
        quals: QualifierSet,
        struct_decl: Option<DeclId>,
        type_token: Option<(SyntaxTokenId, TokenKlass, Atom)>,
        array: Vec<Option<ExprId>>,
    ) -> QualTypeId {
        let base = if let Some(decl) = struct_decl {
            match &self.ast.decl(decl).kind {
                AstDeclKind::Struct { ty, .. } => *ty,
                _ => self.error_ty(),
            }
        } else if let Some((_, klass, text)) = type_token {
            if klass == TokenKlass::Identifier {
                match self.symbols.find(text) {
                    Some(DeclView {
                        kind: SymbolKind::Struct,
                        ty,
                        ..
                    }) => ty,
                    _ => {
                        let name = self.atoms.text(text);
                        self.diags
                            .error(range, format!("unknown type name '{name}'"));
                        self.error_ty()
                    }
                }
            } else {
                match self.types.builtin(klass) {
                    Some(ty) => ty,
                    None => {
                        self.diags.error(range, "expected a type name");
                        self.error_ty()
                    }
                }
            }
        } else {
            self.error_ty()
        };

        let resolved = self.apply_array_dims(base, &array);
        self.ast.alloc_qual_type(AstQualType {
            range,
            quals,
            struct_decl,
            type_token,
            array,
            resolved,
        })
    }

    /// Applies array dimensions, outermost first, evaluating sizes as
    /// constant expressions.
    fn apply_array_dims(&mut self, base: TypeId, dims: &[Option<ExprId>]) -> TypeId {
        if self.types.is_error(base) {
            return base;
        }
        let mut ty = base;
        for dim in dims.iter().rev() {
            let size = match dim {
                None => None,
                Some(expr) => match self.eval_array_size(*expr) {
                    Some(n) => Some(n),
                    None => return self.error_ty(),
                },
            };
            ty = self.types.array(ty, size);
        }
        ty
    }

    fn eval_array_size(&mut self, expr: ExprId) -> Option<u32> {
        let range = self.ast.expr(expr).range;
        match self.expr_value(expr).and_then(|v| v.as_index()) {
            Some(n) if n > 0 => Some(n as u32),
            Some(_) => {
                self.diags.error(range, "array size must be positive");
                None
            }
            None => {
                self.diags
                    .error(range, "array size must be a constant integer expression");
                None
            }
        }
    }

    // Declarations.

    pub fn error_decl(&mut self, range: SyntaxRange) -> DeclId {
        self.ast.alloc_decl(AstDecl {
            range,
            kind: AstDeclKind::Error,
        })
    }

    pub fn empty_decl(&mut self, range: SyntaxRange) -> DeclId {
        self.ast.alloc_decl(AstDecl {
            range,
            kind: AstDeclKind::Empty,
        })
    }

    pub fn precision_decl(&mut self, range: SyntaxRange, qual_type: QualTypeId) -> DeclId {
        self.ast.alloc_decl(AstDecl {
            range,
            kind: AstDeclKind::Precision { qual_type },
        })
    }

    /// Resolves a declarator's own array suffix against the declared base
    /// type.
    pub fn finish_declarator(&mut self, base: TypeId, mut declarator: Declarator) -> Declarator {
        let array = std::mem::take(&mut declarator.array);
        declarator.resolved = self.apply_array_dims(base, &array);
        declarator.array = array;
        declarator
    }

    /// Converts an initializer to the declared type, reporting when the
    /// conversion is not allowed. Initializer lists are typed by their
    /// context and pass through unchecked.
    pub fn check_initializer(&mut self, declared: TypeId, init: ExprId) -> ExprId {
        let init_ty = self.expr_ty(init);
        let is_ilist = matches!(self.ast.expr(init).kind, AstExprKind::InitializerList { .. });
        if is_ilist || self.types.is_error(init_ty) || self.types.is_error(declared) {
            return init;
        }

        match self.coerce(init, declared) {
            Some(coerced) => coerced,
            None => {
                let from = self.types.display(init_ty, self.atoms);
                let to = self.types.display(declared, self.atoms);
                let range = self.ast.expr(init).range;
                self.diags
                    .error(range, format!("cannot initialize {to} with {from}"));
                init
            }
        }
    }

    pub fn variable_decl(
        &mut self,
        range: SyntaxRange,
        qual_type: QualTypeId,
        declarators: Vec<Declarator>,
    ) -> DeclId {
        let decl = self.ast.alloc_decl(AstDecl {
            range,
            kind: AstDeclKind::Variable {
                qual_type,
                declarators,
            },
        });
        if let AstDeclKind::Variable { declarators, .. } = &self.ast.decl(decl).kind {
            let views: Vec<(Atom, DeclView)> = declarators
                .iter()
                .map(|d| {
                    (
                        d.name,
                        DeclView {
                            decl,
                            ty: d.resolved,
                            kind: SymbolKind::Variable,
                        },
                    )
                })
                .collect();
            for (name, view) in views {
                self.declare_symbol(range, name, view);
            }
        }
        decl
    }

    fn declare_symbol(&mut self, range: SyntaxRange, name: Atom, view: DeclView) {
        if !self.symbols.add_symbol(name, view) {
            let text = self.atoms.text(name);
            self.diags
                .error(range, format!("redefinition of '{text}'"));
        }
    }

    pub fn struct_field_decl(
        &mut self,
        range: SyntaxRange,
        qual_type: QualTypeId,
        declarators: Vec<Declarator>,
        in_block: bool,
    ) -> DeclId {
        let kind = if in_block {
            AstDeclKind::BlockField {
                qual_type,
                declarators,
            }
        } else {
            AstDeclKind::StructField {
                qual_type,
                declarators,
            }
        };
        self.ast.alloc_decl(AstDecl { range, kind })
    }

    fn collect_fields(&self, field_decls: &[DeclId]) -> Vec<StructField> {
        let mut fields = Vec::new();
        for &decl in field_decls {
            match &self.ast.decl(decl).kind {
                AstDeclKind::StructField { declarators, .. }
                | AstDeclKind::BlockField { declarators, .. } => {
                    for d in declarators {
                        fields.push(StructField {
                            name: d.name,
                            ty: d.resolved,
                        });
                    }
                }
                _ => {}
            }
        }
        fields
    }

    pub fn struct_decl(
        &mut self,
        range: SyntaxRange,
        name: Option<SyntaxToken>,
        field_decls: Vec<DeclId>,
    ) -> DeclId {
        let fields = self.collect_fields(&field_decls);
        let ty = self
            .types
            .declare_struct(name.map(|t| t.text), fields);

        let decl = self.ast.alloc_decl(AstDecl {
            range,
            kind: AstDeclKind::Struct {
                name: name.map(|t| t.text),
                name_token: name.map(|t| t.id),
                fields: field_decls,
                ty,
            },
        });

        if let Some(name) = name {
            self.declare_symbol(
                range,
                name.text,
                DeclView {
                    decl,
                    ty,
                    kind: SymbolKind::Struct,
                },
            );
        }
        decl
    }

    pub fn interface_block_decl(
        &mut self,
        range: SyntaxRange,
        quals: QualifierSet,
        name: SyntaxToken,
        field_decls: Vec<DeclId>,
        instance: Option<Declarator>,
    ) -> DeclId {
        let fields = self.collect_fields(&field_decls);
        let ty = self.types.declare_struct(Some(name.text), fields.clone());

        let instance = instance.map(|d| self.finish_declarator(ty, d));

        let decl = self.ast.alloc_decl(AstDecl {
            range,
            kind: AstDeclKind::InterfaceBlock {
                quals,
                name: name.text,
                name_token: name.id,
                fields: field_decls,
                instance: instance.clone(),
                ty,
            },
        });

        match instance {
            Some(instance) => {
                self.declare_symbol(
                    range,
                    instance.name,
                    DeclView {
                        decl,
                        ty: instance.resolved,
                        kind: SymbolKind::BlockInstance,
                    },
                );
            }
            None => {
                // Members of an anonymous block land in the enclosing scope.
                for field in fields {
                    self.declare_symbol(
                        range,
                        field.name,
                        DeclView {
                            decl,
                            ty: field.ty,
                            kind: SymbolKind::Variable,
                        },
                    );
                }
            }
        }
        decl
    }

    pub fn param_decl(
        &mut self,
        range: SyntaxRange,
        qual_type: QualTypeId,
        declarator: Option<Declarator>,
    ) -> DeclId {
        let base = self.ast.qual_type(qual_type).resolved;
        let declarator = declarator.map(|d| self.finish_declarator(base, d));

        let decl = self.ast.alloc_decl(AstDecl {
            range,
            kind: AstDeclKind::Param {
                qual_type,
                declarator: declarator.clone(),
            },
        });

        if let Some(declarator) = declarator {
            self.declare_symbol(
                range,
                declarator.name,
                DeclView {
                    decl,
                    ty: declarator.resolved,
                    kind: SymbolKind::Parameter,
                },
            );
        }
        decl
    }

    /// Allocates the function node (body absent) and registers the overload,
    /// so calls inside the body already resolve against this signature.
    pub fn function_decl(
        &mut self,
        range: SyntaxRange,
        return_type: QualTypeId,
        name: SyntaxToken,
        params: Vec<DeclId>,
    ) -> DeclId {
        let ret = self.ast.qual_type(return_type).resolved;
        let param_types: Vec<TypeId> = params
            .iter()
            .map(|&p| match &self.ast.decl(p).kind {
                AstDeclKind::Param { declarator, qual_type } => declarator
                    .as_ref()
                    .map(|d| d.resolved)
                    .unwrap_or_else(|| self.ast.qual_type(*qual_type).resolved),
                _ => self.types.error_type(),
            })
            .collect();

        let decl = self.ast.alloc_decl(AstDecl {
            range,
            kind: AstDeclKind::Function {
                return_type,
                name: name.text,
                name_token: name.id,
                params,
                body: None,
            },
        });

        self.symbols.add_function(
            name.text,
            FunctionEntry {
                decl,
                params: param_types,
                return_type: ret,
            },
        );
        decl
    }

    pub fn attach_function_body(&mut self, decl: DeclId, body: StmtId, range: SyntaxRange) {
        self.ast.set_function_body(decl, body);
        self.ast.set_decl_range(decl, range);
    }

    pub fn set_decl_range(&mut self, decl: DeclId, range: SyntaxRange) {
        self.ast.set_decl_range(decl, range);
    }

    // Statements.

    pub fn error_stmt(&mut self, range: SyntaxRange) -> StmtId {
        self.ast.alloc_stmt(AstStmt {
            range,
            kind: AstStmtKind::Error,
        })
    }

    pub fn empty_stmt(&mut self, range: SyntaxRange) -> StmtId {
        self.ast.alloc_stmt(AstStmt {
            range,
            kind: AstStmtKind::Empty,
        })
    }

    pub fn compound_stmt(&mut self, range: SyntaxRange, stmts: Vec<StmtId>) -> StmtId {
        self.ast.alloc_stmt(AstStmt {
            range,
            kind: AstStmtKind::Compound { stmts },
        })
    }

    pub fn expr_stmt(&mut self, range: SyntaxRange, expr: ExprId) -> StmtId {
        self.ast.alloc_stmt(AstStmt {
            range,
            kind: AstStmtKind::Expr { expr },
        })
    }

    pub fn decl_stmt(&mut self, range: SyntaxRange, decl: DeclId) -> StmtId {
        self.ast.alloc_stmt(AstStmt {
            range,
            kind: AstStmtKind::Decl { decl },
        })
    }

    pub fn if_stmt(
        &mut self,
        range: SyntaxRange,
        cond: ExprId,
        then_stmt: StmtId,
        else_stmt: Option<StmtId>,
    ) -> StmtId {
        self.ast.alloc_stmt(AstStmt {
            range,
            kind: AstStmtKind::If {
                cond,
                then_stmt,
                else_stmt,
            },
        })
    }

    pub fn while_stmt(&mut self, range: SyntaxRange, cond: ExprId, body: StmtId) -> StmtId {
        self.ast.alloc_stmt(AstStmt {
            range,
            kind: AstStmtKind::While { cond, body },
        })
    }

    pub fn do_while_stmt(&mut self, range: SyntaxRange, body: StmtId, cond: ExprId) -> StmtId {
        self.ast.alloc_stmt(AstStmt {
            range,
            kind: AstStmtKind::DoWhile { body, cond },
        })
    }

    pub fn for_stmt(
        &mut self,
        range: SyntaxRange,
        init: Option<StmtId>,
        cond: Option<ExprId>,
        iter: Option<ExprId>,
        body: StmtId,
    ) -> StmtId {
        self.ast.alloc_stmt(AstStmt {
            range,
            kind: AstStmtKind::For {
                init,
                cond,
                iter,
                body,
            },
        })
    }

    pub fn switch_stmt(&mut self, range: SyntaxRange, test: ExprId, body: StmtId) -> StmtId {
        self.ast.alloc_stmt(AstStmt {
            range,
            kind: AstStmtKind::Switch { test, body },
        })
    }

    pub fn label_stmt(&mut self, range: SyntaxRange, case_expr: Option<ExprId>) -> StmtId {
        self.ast.alloc_stmt(AstStmt {
            range,
            kind: AstStmtKind::Label { case_expr },
        })
    }

    pub fn jump_stmt(&mut self, range: SyntaxRange, kind: JumpKind) -> StmtId {
        self.ast.alloc_stmt(AstStmt {
            range,
            kind: AstStmtKind::Jump { kind },
        })
    }

    pub fn return_stmt(&mut self, range: SyntaxRange, expr: Option<ExprId>) -> StmtId {
        self.ast.alloc_stmt(AstStmt {
            range,
            kind: AstStmtKind::Return { expr },
        })
    }

    pub fn translation_unit(
        &mut self,
        kind: TranslationUnitKind,
        range: SyntaxRange,
        decls: Vec<DeclId>,
    ) -> AstTranslationUnit {
        AstTranslationUnit { kind, range, decls }
    }
}

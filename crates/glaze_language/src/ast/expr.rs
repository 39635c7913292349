//! Expression nodes.

use glaze_base::{Atom, SyntaxRange, SyntaxTokenId};

use crate::consts::ConstValue;
use crate::types::TypeId;

use super::{ExprId, NodeRef};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum UnaryOp {
    /// Unary `+`.
    Plus,
    /// Unary `-`.
    Minus,
    /// `!`
    LogicalNot,
    /// `~`
    BitNot,
    PrefixInc,
    PrefixDec,
    PostfixInc,
    PostfixDec,
    /// `.length()`
    Length,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BinaryOp {
    Comma,
    Assign,
    PlusAssign,
    MinusAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    LShiftAssign,
    RShiftAssign,
    AndAssign,
    XorAssign,
    OrAssign,
    LogicalOr,
    LogicalXor,
    LogicalAnd,
    BitOr,
    BitXor,
    BitAnd,
    Equal,
    NotEqual,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    LShift,
    RShift,
    Plus,
    Minus,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            BinaryOp::Assign
                | BinaryOp::PlusAssign
                | BinaryOp::MinusAssign
                | BinaryOp::MulAssign
                | BinaryOp::DivAssign
                | BinaryOp::ModAssign
                | BinaryOp::LShiftAssign
                | BinaryOp::RShiftAssign
                | BinaryOp::AndAssign
                | BinaryOp::XorAssign
                | BinaryOp::OrAssign
        )
    }
}

/// A parsed component-selection suffix like `.xyz`.
///
/// Components are stored as indices 0..=3; `len` is the number selected.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Swizzle {
    pub components: [u8; 4],
    pub len: u8,
}

impl Swizzle {
    /// Parses `xyzw` / `rgba` / `stpq` selections. Returns `None` when the
    /// text is not a swizzle: too long, unknown letters, or letters from
    /// mixed sets.
    pub fn parse(text: &str) -> Option<Swizzle> {
        const SETS: [&[u8; 4]; 3] = [b"xyzw", b"rgba", b"stpq"];

        if text.is_empty() || text.len() > 4 {
            return None;
        }

        for set in SETS {
            let mut components = [0u8; 4];
            let mut ok = true;
            for (i, byte) in text.bytes().enumerate() {
                match set.iter().position(|&c| c == byte) {
                    Some(idx) => components[i] = idx as u8,
                    None => {
                        ok = false;
                        break;
                    }
                }
            }
            if ok {
                return Some(Swizzle {
                    components,
                    len: text.len() as u8,
                });
            }
        }
        None
    }

    pub fn components(&self) -> &[u8] {
        &self.components[..self.len as usize]
    }

    /// Largest selected component index.
    pub fn max_component(&self) -> u8 {
        self.components().iter().copied().max().unwrap_or(0)
    }
}

/// An expression node with its deduced type and, when const-foldable, its
/// value.
#[derive(Clone, Debug)]
pub struct AstExpr {
    pub range: SyntaxRange,
    pub ty: TypeId,
    pub value: Option<ConstValue>,
    pub kind: AstExprKind,
}

#[derive(Clone, Debug)]
pub enum AstExprKind {
    /// Placeholder produced during error recovery.
    Error,
    /// A literal; the value lives in [`AstExpr::value`].
    Literal,
    NameAccess {
        name: Atom,
        token: SyntaxTokenId,
    },
    FieldAccess {
        lhs: ExprId,
        name: Atom,
        token: SyntaxTokenId,
    },
    SwizzleAccess {
        lhs: ExprId,
        swizzle: Swizzle,
    },
    IndexAccess {
        lhs: ExprId,
        index: ExprId,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    Binary {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    Select {
        cond: ExprId,
        when_true: ExprId,
        when_false: ExprId,
    },
    /// Inserted by the builder where a value converts to a target type; the
    /// target is the node's own `ty`.
    ImplicitCast {
        operand: ExprId,
    },
    FunctionCall {
        name: Atom,
        token: SyntaxTokenId,
        args: Vec<ExprId>,
    },
    ConstructorCall {
        constructed: TypeId,
        args: Vec<ExprId>,
    },
    InitializerList {
        items: Vec<ExprId>,
    },
}

impl AstExprKind {
    pub(super) fn collect_children(&self, out: &mut Vec<NodeRef>) {
        match self {
            AstExprKind::Error | AstExprKind::Literal | AstExprKind::NameAccess { .. } => {}
            AstExprKind::FieldAccess { lhs, .. } | AstExprKind::SwizzleAccess { lhs, .. } => {
                out.push(NodeRef::Expr(*lhs));
            }
            AstExprKind::IndexAccess { lhs, index } => {
                out.push(NodeRef::Expr(*lhs));
                out.push(NodeRef::Expr(*index));
            }
            AstExprKind::Unary { operand, .. } | AstExprKind::ImplicitCast { operand } => {
                out.push(NodeRef::Expr(*operand));
            }
            AstExprKind::Binary { lhs, rhs, .. } => {
                out.push(NodeRef::Expr(*lhs));
                out.push(NodeRef::Expr(*rhs));
            }
            AstExprKind::Select {
                cond,
                when_true,
                when_false,
            } => {
                out.push(NodeRef::Expr(*cond));
                out.push(NodeRef::Expr(*when_true));
                out.push(NodeRef::Expr(*when_false));
            }
            AstExprKind::FunctionCall { args, .. }
            | AstExprKind::ConstructorCall { args, .. } => {
                out.extend(args.iter().map(|&a| NodeRef::Expr(a)));
            }
            AstExprKind::InitializerList { items } => {
                out.extend(items.iter().map(|&i| NodeRef::Expr(i)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swizzle_parses_all_three_sets() {
        for text in ["x", "xy", "xyz", "xyzw", "rgba", "stpq", "wzyx", "rrr"] {
            assert!(Swizzle::parse(text).is_some(), "{text}");
        }
    }

    #[test]
    fn swizzle_component_indices() {
        let s = Swizzle::parse("xz").unwrap();
        assert_eq!(s.components(), &[0, 2]);
        let s = Swizzle::parse("bg").unwrap();
        assert_eq!(s.components(), &[2, 1]);
        assert_eq!(s.max_component(), 2);
    }

    #[test]
    fn swizzle_rejects_mixed_sets_and_junk() {
        assert!(Swizzle::parse("xr").is_none());
        assert!(Swizzle::parse("xyzwx").is_none());
        assert!(Swizzle::parse("").is_none());
        assert!(Swizzle::parse("foo").is_none());
    }

    #[test]
    fn assignment_classification() {
        assert!(BinaryOp::Assign.is_assignment());
        assert!(BinaryOp::PlusAssign.is_assignment());
        assert!(!BinaryOp::Plus.is_assignment());
        assert!(!BinaryOp::Comma.is_assignment());
    }
}

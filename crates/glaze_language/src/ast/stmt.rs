//! Statement nodes.

use glaze_base::SyntaxRange;

use super::{DeclId, ExprId, NodeRef, StmtId};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum JumpKind {
    Break,
    Continue,
    Discard,
}

#[derive(Clone, Debug)]
pub struct AstStmt {
    pub range: SyntaxRange,
    pub kind: AstStmtKind,
}

#[derive(Clone, Debug)]
pub enum AstStmtKind {
    /// Placeholder produced during error recovery.
    Error,
    /// A lone `;`.
    Empty,
    Compound {
        stmts: Vec<StmtId>,
    },
    Expr {
        expr: ExprId,
    },
    Decl {
        decl: DeclId,
    },
    If {
        cond: ExprId,
        then_stmt: StmtId,
        else_stmt: Option<StmtId>,
    },
    While {
        cond: ExprId,
        body: StmtId,
    },
    DoWhile {
        body: StmtId,
        cond: ExprId,
    },
    For {
        init: Option<StmtId>,
        cond: Option<ExprId>,
        iter: Option<ExprId>,
        body: StmtId,
    },
    Switch {
        test: ExprId,
        body: StmtId,
    },
    /// `case expr:` or, with no expression, `default:`.
    Label {
        case_expr: Option<ExprId>,
    },
    Jump {
        kind: JumpKind,
    },
    Return {
        expr: Option<ExprId>,
    },
}

impl AstStmtKind {
    pub(super) fn collect_children(&self, out: &mut Vec<NodeRef>) {
        match self {
            AstStmtKind::Error | AstStmtKind::Empty | AstStmtKind::Jump { .. } => {}
            AstStmtKind::Compound { stmts } => {
                out.extend(stmts.iter().map(|&s| NodeRef::Stmt(s)));
            }
            AstStmtKind::Expr { expr } => out.push(NodeRef::Expr(*expr)),
            AstStmtKind::Decl { decl } => out.push(NodeRef::Decl(*decl)),
            AstStmtKind::If {
                cond,
                then_stmt,
                else_stmt,
            } => {
                out.push(NodeRef::Expr(*cond));
                out.push(NodeRef::Stmt(*then_stmt));
                if let Some(else_stmt) = else_stmt {
                    out.push(NodeRef::Stmt(*else_stmt));
                }
            }
            AstStmtKind::While { cond, body } => {
                out.push(NodeRef::Expr(*cond));
                out.push(NodeRef::Stmt(*body));
            }
            AstStmtKind::DoWhile { body, cond } => {
                out.push(NodeRef::Stmt(*body));
                out.push(NodeRef::Expr(*cond));
            }
            AstStmtKind::For {
                init,
                cond,
                iter,
                body,
            } => {
                if let Some(init) = init {
                    out.push(NodeRef::Stmt(*init));
                }
                if let Some(cond) = cond {
                    out.push(NodeRef::Expr(*cond));
                }
                if let Some(iter) = iter {
                    out.push(NodeRef::Expr(*iter));
                }
                out.push(NodeRef::Stmt(*body));
            }
            AstStmtKind::Switch { test, body } => {
                out.push(NodeRef::Expr(*test));
                out.push(NodeRef::Stmt(*body));
            }
            AstStmtKind::Label { case_expr } => {
                if let Some(case_expr) = case_expr {
                    out.push(NodeRef::Expr(*case_expr));
                }
            }
            AstStmtKind::Return { expr } => {
                if let Some(expr) = expr {
                    out.push(NodeRef::Expr(*expr));
                }
            }
        }
    }
}

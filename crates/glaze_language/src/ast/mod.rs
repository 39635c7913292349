//! The abstract syntax tree.
//!
//! Nodes are tagged variants stored in per-kind vectors inside an
//! [`AstContext`] and referenced by typed 32-bit ids. Ids keep the tree
//! movable (into compiler results) and shareable (inside precompiled
//! preambles) even though nodes reference each other and interned types
//! freely.
//!
//! Every node carries a [`SyntaxRange`] - the half-open interval of token
//! stream ids it was parsed from. A node's range always covers its
//! children's ranges.

pub mod decl;
pub mod expr;
pub mod stmt;

pub use decl::{AstDecl, AstDeclKind, AstQualType, Declarator, LayoutItem, QualifierSet};
pub use expr::{AstExpr, AstExprKind, BinaryOp, Swizzle, UnaryOp};
pub use stmt::{AstStmt, AstStmtKind, JumpKind};

use glaze_base::SyntaxRange;

macro_rules! ast_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        pub struct $name(pub u32);

        impl $name {
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

ast_id!(
    /// Id of an expression node.
    ExprId
);
ast_id!(
    /// Id of a statement node.
    StmtId
);
ast_id!(
    /// Id of a declaration node.
    DeclId
);
ast_id!(
    /// Id of a qualified-type node.
    QualTypeId
);

/// Which translation unit an AST belongs to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TranslationUnitKind {
    SystemPreamble,
    UserPreamble,
    MainFile,
}

/// Root of one translation unit.
#[derive(Clone, Debug)]
pub struct AstTranslationUnit {
    pub kind: TranslationUnitKind,
    pub range: SyntaxRange,
    pub decls: Vec<DeclId>,
}

/// Node storage for a compilation. One context may hold several translation
/// units (preambles plus the main file).
#[derive(Clone, Default, Debug)]
pub struct AstContext {
    exprs: Vec<AstExpr>,
    stmts: Vec<AstStmt>,
    decls: Vec<AstDecl>,
    qual_types: Vec<AstQualType>,
}

impl AstContext {
    pub fn new() -> AstContext {
        AstContext::default()
    }

    pub fn alloc_expr(&mut self, expr: AstExpr) -> ExprId {
        let id = ExprId(self.exprs.len() as u32);
        self.exprs.push(expr);
        id
    }

    pub fn alloc_stmt(&mut self, stmt: AstStmt) -> StmtId {
        let id = StmtId(self.stmts.len() as u32);
        self.stmts.push(stmt);
        id
    }

    pub fn alloc_decl(&mut self, decl: AstDecl) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        self.decls.push(decl);
        id
    }

    pub fn alloc_qual_type(&mut self, qual_type: AstQualType) -> QualTypeId {
        let id = QualTypeId(self.qual_types.len() as u32);
        self.qual_types.push(qual_type);
        id
    }

    pub fn expr(&self, id: ExprId) -> &AstExpr {
        &self.exprs[id.index()]
    }

    pub fn stmt(&self, id: StmtId) -> &AstStmt {
        &self.stmts[id.index()]
    }

    pub fn decl(&self, id: DeclId) -> &AstDecl {
        &self.decls[id.index()]
    }

    pub fn qual_type(&self, id: QualTypeId) -> &AstQualType {
        &self.qual_types[id.index()]
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    pub fn decl_count(&self) -> usize {
        self.decls.len()
    }

    /// Attaches the body to a function declared ahead of its body, so the
    /// overload map can already see the signature while the body parses.
    pub fn set_function_body(&mut self, id: DeclId, body: StmtId) {
        if let AstDeclKind::Function { body: slot, .. } = &mut self.decls[id.index()].kind {
            *slot = Some(body);
        }
    }

    /// Widens a declaration's range once trailing tokens are known.
    pub fn set_decl_range(&mut self, id: DeclId, range: SyntaxRange) {
        self.decls[id.index()].range = range;
    }
}

/// Reference to any node kind, for generic traversal.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NodeRef {
    Expr(ExprId),
    Stmt(StmtId),
    Decl(DeclId),
}

/// Return policy of a visitor callback.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum VisitPolicy {
    /// Descend into the node's children.
    Traverse,
    /// Skip the children.
    Leave,
}

impl AstContext {
    pub fn node_range(&self, node: NodeRef) -> SyntaxRange {
        match node {
            NodeRef::Expr(id) => self.expr(id).range,
            NodeRef::Stmt(id) => self.stmt(id).range,
            NodeRef::Decl(id) => self.decl(id).range,
        }
    }

    /// Direct children of a node, in source order.
    pub fn children_of(&self, node: NodeRef) -> Vec<NodeRef> {
        let mut out = Vec::new();
        match node {
            NodeRef::Expr(id) => self.expr(id).kind.collect_children(&mut out),
            NodeRef::Stmt(id) => self.stmt(id).kind.collect_children(&mut out),
            NodeRef::Decl(id) => self.decl(id).kind.collect_children(self, &mut out),
        }
        out
    }

    /// Pre-order walk from `root`. The callback decides per node whether its
    /// children are visited.
    pub fn walk(&self, root: NodeRef, visit: &mut impl FnMut(NodeRef) -> VisitPolicy) {
        if visit(root) == VisitPolicy::Leave {
            return;
        }
        for child in self.children_of(root) {
            self.walk(child, &mut *visit);
        }
    }
}

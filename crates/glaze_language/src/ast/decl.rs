//! Declaration nodes, qualifiers and declarators.

use glaze_base::{Atom, SyntaxRange, SyntaxTokenId};

use crate::token::TokenKlass;
use crate::types::TypeId;

use super::{AstContext, DeclId, ExprId, NodeRef, QualTypeId, StmtId};

/// One `layout(...)` item: a bare name or `name = expr`.
#[derive(Clone, Debug)]
pub struct LayoutItem {
    pub name: Atom,
    pub value: Option<ExprId>,
}

/// The non-layout qualifiers of a declaration, as a bitset.
#[derive(Clone, Default, Debug)]
pub struct QualifierSet {
    bits: u32,
    pub layout: Vec<LayoutItem>,
}

macro_rules! qualifier_bits {
    ($($name:ident = $bit:expr, $klass:ident;)*) => {
        impl QualifierSet {
            $(pub const $name: u32 = 1 << $bit;)*

            /// Maps a qualifier keyword to its bit.
            pub fn bit_for(klass: TokenKlass) -> Option<u32> {
                match klass {
                    $(TokenKlass::$klass => Some(Self::$name),)*
                    _ => None,
                }
            }
        }
    };
}

qualifier_bits! {
    CONST = 0, KwConst;
    UNIFORM = 1, KwUniform;
    BUFFER = 2, KwBuffer;
    SHARED = 3, KwShared;
    IN = 4, KwIn;
    OUT = 5, KwOut;
    INOUT = 6, KwInout;
    ATTRIBUTE = 7, KwAttribute;
    VARYING = 8, KwVarying;
    CENTROID = 9, KwCentroid;
    SAMPLE = 10, KwSample;
    PATCH = 11, KwPatch;
    FLAT = 12, KwFlat;
    SMOOTH = 13, KwSmooth;
    NOPERSPECTIVE = 14, KwNoperspective;
    INVARIANT = 15, KwInvariant;
    PRECISE = 16, KwPrecise;
    COHERENT = 17, KwCoherent;
    VOLATILE = 18, KwVolatile;
    RESTRICT = 19, KwRestrict;
    READONLY = 20, KwReadonly;
    WRITEONLY = 21, KwWriteonly;
    HIGHP = 22, KwHighp;
    MEDIUMP = 23, KwMediump;
    LOWP = 24, KwLowp;
    SUBROUTINE = 25, KwSubroutine;
}

impl QualifierSet {
    pub fn new() -> QualifierSet {
        QualifierSet::default()
    }

    pub fn add(&mut self, bit: u32) {
        self.bits |= bit;
    }

    pub fn has(&self, bit: u32) -> bool {
        self.bits & bit != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0 && self.layout.is_empty()
    }
}

/// A qualified type specifier: qualifiers plus either a named type token or
/// an inline struct declaration, with an optional array suffix.
#[derive(Clone, Debug)]
pub struct AstQualType {
    pub range: SyntaxRange,
    pub quals: QualifierSet,
    /// Inline `struct ... { ... }` declaration, when present.
    pub struct_decl: Option<DeclId>,
    /// The type name token: id, klass and text.
    pub type_token: Option<(SyntaxTokenId, TokenKlass, Atom)>,
    /// Array dimensions on the type itself; `None` entries are unsized.
    pub array: Vec<Option<ExprId>>,
    /// The resolved type, error-typed when resolution failed.
    pub resolved: TypeId,
}

/// `name [array] [= initializer]` inside a declaration.
#[derive(Clone, Debug)]
pub struct Declarator {
    pub name: Atom,
    pub name_token: SyntaxTokenId,
    pub array: Vec<Option<ExprId>>,
    pub init: Option<ExprId>,
    /// Declared type of this declarator, with its array dimensions applied.
    pub resolved: TypeId,
}

#[derive(Clone, Debug)]
pub struct AstDecl {
    pub range: SyntaxRange,
    pub kind: AstDeclKind,
}

#[derive(Clone, Debug)]
pub enum AstDeclKind {
    /// A lone `;` at file scope.
    Empty,
    /// Placeholder produced during error recovery.
    Error,
    /// `precision highp float;`
    Precision { qual_type: QualTypeId },
    Variable {
        qual_type: QualTypeId,
        declarators: Vec<Declarator>,
    },
    /// A member of a `struct` body.
    StructField {
        qual_type: QualTypeId,
        declarators: Vec<Declarator>,
    },
    /// A member of an interface block body.
    BlockField {
        qual_type: QualTypeId,
        declarators: Vec<Declarator>,
    },
    Struct {
        name: Option<Atom>,
        name_token: Option<SyntaxTokenId>,
        fields: Vec<DeclId>,
        ty: TypeId,
    },
    /// `uniform Block { ... } instance;`
    InterfaceBlock {
        quals: QualifierSet,
        name: Atom,
        name_token: SyntaxTokenId,
        fields: Vec<DeclId>,
        instance: Option<Declarator>,
        ty: TypeId,
    },
    /// One function parameter.
    Param {
        qual_type: QualTypeId,
        declarator: Option<Declarator>,
    },
    Function {
        return_type: QualTypeId,
        name: Atom,
        name_token: SyntaxTokenId,
        params: Vec<DeclId>,
        body: Option<StmtId>,
    },
}

impl AstDeclKind {
    pub(super) fn collect_children(&self, ctx: &AstContext, out: &mut Vec<NodeRef>) {
        let push_qual_type = |ctx: &AstContext, id: QualTypeId, out: &mut Vec<NodeRef>| {
            let qual_type = ctx.qual_type(id);
            for item in &qual_type.quals.layout {
                if let Some(value) = item.value {
                    out.push(NodeRef::Expr(value));
                }
            }
            if let Some(decl) = qual_type.struct_decl {
                out.push(NodeRef::Decl(decl));
            }
            for dim in qual_type.array.iter().flatten() {
                out.push(NodeRef::Expr(*dim));
            }
        };
        let push_declarator = |declarator: &Declarator, out: &mut Vec<NodeRef>| {
            for dim in declarator.array.iter().flatten() {
                out.push(NodeRef::Expr(*dim));
            }
            if let Some(init) = declarator.init {
                out.push(NodeRef::Expr(init));
            }
        };

        match self {
            AstDeclKind::Empty | AstDeclKind::Error => {}
            AstDeclKind::Precision { qual_type } => push_qual_type(ctx, *qual_type, out),
            AstDeclKind::Variable {
                qual_type,
                declarators,
            }
            | AstDeclKind::StructField {
                qual_type,
                declarators,
            }
            | AstDeclKind::BlockField {
                qual_type,
                declarators,
            } => {
                push_qual_type(ctx, *qual_type, out);
                for declarator in declarators {
                    push_declarator(declarator, out);
                }
            }
            AstDeclKind::Struct { fields, .. } => {
                out.extend(fields.iter().map(|&f| NodeRef::Decl(f)));
            }
            AstDeclKind::InterfaceBlock {
                quals,
                fields,
                instance,
                ..
            } => {
                for item in &quals.layout {
                    if let Some(value) = item.value {
                        out.push(NodeRef::Expr(value));
                    }
                }
                out.extend(fields.iter().map(|&f| NodeRef::Decl(f)));
                if let Some(instance) = instance {
                    push_declarator(instance, out);
                }
            }
            AstDeclKind::Param {
                qual_type,
                declarator,
            } => {
                push_qual_type(ctx, *qual_type, out);
                if let Some(declarator) = declarator {
                    push_declarator(declarator, out);
                }
            }
            AstDeclKind::Function {
                return_type,
                params,
                body,
                ..
            } => {
                push_qual_type(ctx, *return_type, out);
                out.extend(params.iter().map(|&p| NodeRef::Decl(p)));
                if let Some(body) = body {
                    out.push(NodeRef::Stmt(*body));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualifier_bits_round_trip() {
        let mut quals = QualifierSet::new();
        assert!(quals.is_empty());

        let uniform = QualifierSet::bit_for(TokenKlass::KwUniform).unwrap();
        quals.add(uniform);
        assert!(quals.has(QualifierSet::UNIFORM));
        assert!(!quals.has(QualifierSet::CONST));
        assert!(!quals.is_empty());
    }

    #[test]
    fn non_qualifier_keywords_have_no_bit() {
        assert!(QualifierSet::bit_for(TokenKlass::KwVoid).is_none());
        assert!(QualifierSet::bit_for(TokenKlass::Identifier).is_none());
        assert!(QualifierSet::bit_for(TokenKlass::KwLayout).is_none());
    }
}

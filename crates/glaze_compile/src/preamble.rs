//! Precompiled preamble sharing.

use std::sync::Arc;

use glaze_base::AtomTable;
use glaze_language::ast::{AstContext, AstTranslationUnit};
use glaze_language::token::{RawComment, RawSyntaxToken};
use glaze_language::types::TypeContext;
use glaze_language::{MacroTable, SymbolTable};

/// Token artifacts of one preamble translation unit.
#[derive(Clone, Debug)]
pub struct PreambleTokens {
    pub tokens: Vec<RawSyntaxToken>,
    pub comments: Vec<RawComment>,
}

/// The system and user preambles compiled once, for reuse across
/// invocations.
///
/// A preamble is immutable after creation; share it with `Arc` and as many
/// concurrent invocations as needed. An importing invocation starts from a
/// clone of these tables - atoms keep their handles (the clone imports into
/// a fresh table), so identifiers interned here compare equal everywhere the
/// preamble is used.
#[derive(Debug)]
pub struct PrecompiledPreamble {
    pub atoms: AtomTable,
    pub macros: MacroTable,
    pub types: TypeContext,
    /// Global level and overload map populated by the preamble decls.
    pub symbols: SymbolTable,
    pub ast: AstContext,
    pub translation_units: Vec<AstTranslationUnit>,
    pub token_artifacts: Vec<PreambleTokens>,
}

impl PrecompiledPreamble {
    pub fn shared(self) -> Arc<PrecompiledPreamble> {
        Arc::new(self)
    }
}

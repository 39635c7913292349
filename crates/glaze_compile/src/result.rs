//! The in-memory output of one compiler invocation.

use glaze_base::Diagnostic;
use glaze_language::ast::{AstContext, AstTranslationUnit};
use glaze_language::token::{RawComment, RawSyntaxToken};
use glaze_language::types::TypeContext;
use glaze_language::SymbolTable;
use glaze_base::AtomTable;

/// Elapsed nanoseconds per pipeline phase.
#[derive(Clone, Copy, Default, Debug)]
pub struct CompileStatistics {
    pub total_compile_ns: u64,
    pub version_scan_ns: u64,
    pub preamble_lex_ns: u64,
    pub main_lex_ns: u64,
    pub main_parse_ns: u64,
}

/// Everything a consumer can read back after a compilation.
///
/// Nothing is persisted; the result owns its tables outright (or shares a
/// preamble's through the clone taken at import). A non-empty error list is
/// what "failed" means - an AST is present either way.
#[derive(Debug)]
pub struct CompilerResult {
    /// Post-preprocess tokens of the main file, EOF-terminated.
    pub tokens: Vec<RawSyntaxToken>,
    /// Comment sidecar of the main file.
    pub comments: Vec<RawComment>,
    /// AST node storage; also holds imported preamble nodes.
    pub ast: AstContext,
    /// Translation units parsed by this invocation (main file last).
    pub translation_units: Vec<AstTranslationUnit>,
    /// Interned types.
    pub types: TypeContext,
    /// Interned token text.
    pub atoms: AtomTable,
    /// Final scope table (global level populated).
    pub symbols: SymbolTable,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    pub statistics: CompileStatistics,
}

impl CompilerResult {
    /// True when no errors were reported.
    pub fn succeeded(&self) -> bool {
        self.errors.is_empty()
    }

    /// The main file's translation unit, when parsing ran.
    pub fn main_translation_unit(&self) -> Option<&AstTranslationUnit> {
        self.translation_units.last()
    }
}

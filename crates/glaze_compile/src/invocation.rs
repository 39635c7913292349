//! Compiler invocation orchestration.
//!
//! One [`CompilerInvocation`] owns the source manager and both configs,
//! and runs the pipeline end to end: an optional version scan over the main
//! file, the preambles (inline, or imported from a [`PrecompiledPreamble`]),
//! then preprocessing and parsing of the main file. Phase timings are
//! collected in nanoseconds and the dump flags trace tokens and AST through
//! the `log` crate.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, trace};

use glaze_base::{AtomTable, DiagnosticSink, FileId};
use glaze_language::ast::{AstContext, AstTranslationUnit, TranslationUnitKind};
use glaze_language::preprocessor::{register_predefined_macros, PpContext, PpStateMachine};
use glaze_language::token::{RawSyntaxToken, TokenStream};
use glaze_language::types::TypeContext;
use glaze_language::{
    AstBuilder, CompilerConfig, LanguageConfig, MacroTable, Parser, PpCallback, SourceError,
    SourceManager, SymbolTable,
};

use crate::preamble::{PreambleTokens, PrecompiledPreamble};
use crate::result::{CompileStatistics, CompilerResult};
use crate::stdlib::SYSTEM_PREAMBLE;

/// How much of the pipeline to run for the main file.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CompileMode {
    /// Stop after preprocessing; the result carries tokens but no AST.
    PreprocessOnly,
    /// Preprocess and parse the main file without compiling any preamble.
    ParseOnly,
    /// The whole pipeline, preambles included.
    Full,
}

/// One reusable compiler run configuration.
pub struct CompilerInvocation {
    compiler_config: CompilerConfig,
    language_config: LanguageConfig,
    sources: SourceManager,
    preamble: Option<Arc<PrecompiledPreamble>>,
}

impl CompilerInvocation {
    pub fn new() -> CompilerInvocation {
        let mut sources = SourceManager::new();
        sources.set_system_preamble(SYSTEM_PREAMBLE);
        CompilerInvocation {
            compiler_config: CompilerConfig::default(),
            language_config: LanguageConfig::default(),
            sources,
            preamble: None,
        }
    }

    pub fn compiler_config(&self) -> &CompilerConfig {
        &self.compiler_config
    }

    pub fn compiler_config_mut(&mut self) -> &mut CompilerConfig {
        &mut self.compiler_config
    }

    pub fn language_config(&self) -> &LanguageConfig {
        &self.language_config
    }

    pub fn language_config_mut(&mut self) -> &mut LanguageConfig {
        &mut self.language_config
    }

    pub fn set_main_from_buffer(&mut self, text: &str) {
        self.sources.set_main_from_buffer(text);
    }

    pub fn set_main_from_file(&mut self, path: &Path) -> Result<(), SourceError> {
        self.sources.set_main_from_file(path)
    }

    pub fn set_user_preamble(&mut self, text: &str) {
        self.sources.set_user_preamble(text);
    }

    /// Injects a preamble compiled by an earlier invocation; its tables are
    /// imported instead of compiling the preambles inline.
    pub fn set_precompiled_preamble(&mut self, preamble: Arc<PrecompiledPreamble>) {
        self.preamble = Some(preamble);
    }

    /// Compiles the system and user preambles into a shareable object.
    pub fn compile_preamble(
        &mut self,
        mut callback: Option<&mut dyn PpCallback>,
    ) -> PrecompiledPreamble {
        let mut atoms = AtomTable::new();
        let mut macros = MacroTable::new();
        let mut types = TypeContext::new();
        let mut symbols = SymbolTable::new();
        let mut ast = AstContext::new();
        let mut diags = DiagnosticSink::new();
        let mut units = Vec::new();
        let mut artifacts = Vec::new();

        register_predefined_macros(&mut atoms, &mut macros, &self.language_config);

        let mut files = Vec::new();
        if !self.language_config.no_stdlib {
            files.push((FileId::SYSTEM_PREAMBLE, TranslationUnitKind::SystemPreamble));
        }
        files.push((FileId::USER_PREAMBLE, TranslationUnitKind::UserPreamble));

        for (file, kind) in files {
            let stream = self.preprocess_unit(
                &mut atoms,
                &mut macros,
                &mut diags,
                callback.as_deref_mut(),
                file,
                false,
            );
            let (tokens, comments) = stream.export();
            let unit = parse_unit(
                &mut ast,
                &mut types,
                &mut symbols,
                &mut diags,
                &atoms,
                &tokens,
                kind,
            );
            units.push(unit);
            artifacts.push(PreambleTokens { tokens, comments });
        }

        PrecompiledPreamble {
            atoms,
            macros,
            types,
            symbols,
            ast,
            translation_units: units,
            token_artifacts: artifacts,
        }
    }

    /// Runs the pipeline over the main file.
    pub fn compile_main(
        &mut self,
        mode: CompileMode,
        mut callback: Option<&mut dyn PpCallback>,
    ) -> CompilerResult {
        let total_start = Instant::now();
        let mut statistics = CompileStatistics::default();

        // Version scan: pick up `#version` / `#extension` before anything
        // else so stdlib selection and typing see the right dialect. Scratch
        // tables; its diagnostics are re-reported by the real run.
        let scan_start = Instant::now();
        {
            let mut atoms = AtomTable::new();
            let mut macros = MacroTable::new();
            let mut diags = DiagnosticSink::new();
            self.preprocess_unit(
                &mut atoms,
                &mut macros,
                &mut diags,
                callback.as_deref_mut(),
                FileId::MAIN,
                true,
            );
        }
        statistics.version_scan_ns = scan_start.elapsed().as_nanos() as u64;

        // Table setup: import the precompiled preamble or start fresh.
        let (mut atoms, mut macros, mut types, mut symbols, mut ast, mut units) =
            match &self.preamble {
                Some(preamble) => (
                    preamble.atoms.clone(),
                    preamble.macros.clone(),
                    preamble.types.clone(),
                    preamble.symbols.clone(),
                    preamble.ast.clone(),
                    preamble.translation_units.clone(),
                ),
                None => (
                    AtomTable::new(),
                    MacroTable::new(),
                    TypeContext::new(),
                    SymbolTable::new(),
                    AstContext::new(),
                    Vec::new(),
                ),
            };
        let mut diags = DiagnosticSink::new();
        register_predefined_macros(&mut atoms, &mut macros, &self.language_config);

        // Inline preamble compilation, unless one was imported.
        if self.preamble.is_none() && mode == CompileMode::Full {
            let preamble_start = Instant::now();

            let mut files = Vec::new();
            if !self.language_config.no_stdlib {
                files.push((FileId::SYSTEM_PREAMBLE, TranslationUnitKind::SystemPreamble));
            }
            if !self.sources.text(FileId::USER_PREAMBLE).is_empty() {
                files.push((FileId::USER_PREAMBLE, TranslationUnitKind::UserPreamble));
            }

            for (file, kind) in files {
                let stream = self.preprocess_unit(
                    &mut atoms,
                    &mut macros,
                    &mut diags,
                    callback.as_deref_mut(),
                    file,
                    false,
                );
                let (tokens, _comments) = stream.export();
                units.push(parse_unit(
                    &mut ast,
                    &mut types,
                    &mut symbols,
                    &mut diags,
                    &atoms,
                    &tokens,
                    kind,
                ));
            }
            statistics.preamble_lex_ns = preamble_start.elapsed().as_nanos() as u64;
        }

        // Main file: preprocess.
        let lex_start = Instant::now();
        let stream = self.preprocess_unit(
            &mut atoms,
            &mut macros,
            &mut diags,
            callback.as_deref_mut(),
            FileId::MAIN,
            false,
        );
        let (tokens, comments) = stream.export();
        statistics.main_lex_ns = lex_start.elapsed().as_nanos() as u64;

        if self.compiler_config.dump_tokens {
            for (index, token) in tokens.iter().enumerate() {
                trace!(
                    "token[{index}] {:?} '{}' @{}:{}",
                    token.klass,
                    atoms.text(token.text),
                    token.expanded_range.start.line,
                    token.expanded_range.start.column,
                );
            }
        }

        // Main file: parse.
        if mode != CompileMode::PreprocessOnly {
            let parse_start = Instant::now();
            let unit = parse_unit(
                &mut ast,
                &mut types,
                &mut symbols,
                &mut diags,
                &atoms,
                &tokens,
                TranslationUnitKind::MainFile,
            );
            statistics.main_parse_ns = parse_start.elapsed().as_nanos() as u64;

            if self.compiler_config.dump_ast {
                trace!(
                    "ast: {} top-level decls, {} expr nodes",
                    unit.decls.len(),
                    ast.expr_count()
                );
            }
            units.push(unit);
        }

        statistics.total_compile_ns = total_start.elapsed().as_nanos() as u64;
        debug!(
            "compiled main file: {} tokens, {} errors, {} warnings in {}ns",
            tokens.len(),
            diags.errors().len(),
            diags.warnings().len(),
            statistics.total_compile_ns,
        );

        let (errors, warnings) = diags.take();
        CompilerResult {
            tokens,
            comments,
            ast,
            translation_units: units,
            types,
            atoms,
            symbols,
            errors,
            warnings,
            statistics,
        }
    }

    fn preprocess_unit(
        &mut self,
        atoms: &mut AtomTable,
        macros: &mut MacroTable,
        diags: &mut DiagnosticSink,
        callback: Option<&mut dyn PpCallback>,
        file: FileId,
        version_scan: bool,
    ) -> TokenStream {
        let mut stream = TokenStream::new();
        let mut pp = PpStateMachine::new(version_scan);
        let mut ctx = PpContext {
            atoms,
            macros,
            diags,
            sources: &mut self.sources,
            compiler_config: &self.compiler_config,
            language: &mut self.language_config,
            stream: &mut stream,
            callback,
        };
        pp.preprocess_file(&mut ctx, file);
        stream
    }
}

impl Default for CompilerInvocation {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_unit(
    ast: &mut AstContext,
    types: &mut TypeContext,
    symbols: &mut SymbolTable,
    diags: &mut DiagnosticSink,
    atoms: &AtomTable,
    tokens: &[RawSyntaxToken],
    kind: TranslationUnitKind,
) -> AstTranslationUnit {
    let builder = AstBuilder::new(ast, types, symbols, diags, atoms);
    let mut parser = Parser::new(builder, tokens);
    parser.parse_translation_unit(kind)
}

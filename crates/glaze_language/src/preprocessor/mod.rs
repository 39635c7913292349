//! The preprocessor state machine.
//!
//! The machine consumes PP tokens pushed by the scanner and transforms them
//! according to its state: ordinary tokens flow through macro expansion into
//! the token stream, `#` at the start of a line opens a directive, and
//! conditional directives gate regions in and out of the stream.
//!
//! States:
//!
//! - `Default` - normal lexing; tokens feed the expansion processor.
//! - `Inactive` - inside a skipped conditional branch; everything except
//!   directives is discarded.
//! - `ExpectDirective` - a line-initial `#` was seen.
//! - `ExpectDefaultDirectiveTail` / `ExpectIncludeDirectiveTail` - buffering
//!   the directive's argument tokens up to end of line. The include variant
//!   arms header-name lexing in the scanner.
//! - `Halt` - version-scan mode saw its first non-directive token; lexing
//!   stops.
//!
//! `#include` descends by running a fresh state machine over the included
//! file against the same shared tables and output stream, with every emitted
//! token's expanded range pinned to the include site.

pub mod eval;
pub mod expansion;

use std::path::PathBuf;

use glaze_base::{AtomTable, DiagnosticSink, FileId, SyntaxRange, TextRange};

use crate::callback::PpCallback;
use crate::config::{
    CompilerConfig, ExtensionBehavior, ExtensionId, GlslProfile, GlslVersion, LanguageConfig,
};
use crate::keywords::keyword_klass;
use crate::macros::{DefineOutcome, MacroTable, UndefOutcome};
use crate::scanner::Scanner;
use crate::token::{PPToken, TokenKlass, TokenStream};
use crate::source_manager::SourceManager;
use expansion::{ExpandedToken, ExpansionEnv, MacroExpansionProcessor};

/// Shared compilation state the preprocessor works against. One context
/// serves the whole `#include` tree of a translation unit.
pub struct PpContext<'c, 'cb> {
    pub atoms: &'c mut AtomTable,
    pub macros: &'c mut MacroTable,
    pub diags: &'c mut DiagnosticSink,
    pub sources: &'c mut SourceManager,
    pub compiler_config: &'c CompilerConfig,
    pub language: &'c mut LanguageConfig,
    pub stream: &'c mut TokenStream,
    pub callback: Option<&'cb mut dyn PpCallback>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum PpState {
    Default,
    Halt,
    Inactive,
    ExpectDirective,
    ExpectDefaultDirectiveTail,
    ExpectIncludeDirectiveTail,
}

/// One `#if`/`#ifdef`/`#ifndef` frame.
#[derive(Clone, Copy, Debug)]
struct ConditionalFrame {
    active: bool,
    seen_active_branch: bool,
    seen_else: bool,
}

/// Token-driven preprocessing engine for one source file. Reentrancy for
/// `#include` creates a child machine sharing the same [`PpContext`].
pub struct PpStateMachine {
    state: PpState,
    version_scan_mode: bool,
    /// Expanded range forced on every emitted token while inside an included
    /// file; `None` in the main file.
    include_expansion_range: Option<TextRange>,
    include_depth: usize,
    conditional_stack: Vec<ConditionalFrame>,
    /// Depth of conditionals opened inside an outer inactive region; they
    /// track nesting but never select branches.
    skipped_inactive_conditionals: usize,
    directive_token: Option<PPToken>,
    directive_args: Vec<PPToken>,
    expansion: MacroExpansionProcessor,
    expansion_issues: Vec<String>,
}

impl PpStateMachine {
    pub fn new(version_scan_mode: bool) -> PpStateMachine {
        PpStateMachine::nested(version_scan_mode, None, 0)
    }

    fn nested(
        version_scan_mode: bool,
        include_expansion_range: Option<TextRange>,
        include_depth: usize,
    ) -> PpStateMachine {
        PpStateMachine {
            state: PpState::Default,
            version_scan_mode,
            include_expansion_range,
            include_depth,
            conditional_stack: Vec::new(),
            skipped_inactive_conditionals: 0,
            directive_token: None,
            directive_args: Vec::new(),
            expansion: MacroExpansionProcessor::new(),
            expansion_issues: Vec::new(),
        }
    }

    /// Scanner handshake: lex `<...>` / `"..."` as header names.
    fn should_lex_header_name(&self) -> bool {
        self.state == PpState::ExpectIncludeDirectiveTail
    }

    /// Scanner handshake: stop producing tokens.
    fn should_halt_lexing(&self) -> bool {
        self.state == PpState::Halt
    }

    /// Drives the scanner over `file`, feeding every token through the
    /// machine. Returns when the file is exhausted or lexing halts.
    pub fn preprocess_file(&mut self, ctx: &mut PpContext<'_, '_>, file: FileId) {
        let text = ctx.sources.text(file);
        let mut scanner = Scanner::new(&text, file, ctx.compiler_config.count_utf16_characters);

        loop {
            let token = scanner.next_token(ctx.atoms, self.should_lex_header_name());
            for issue in scanner.take_issues() {
                self.report_error(ctx, issue);
            }

            let is_eof = token.klass == TokenKlass::Eof;
            self.feed(ctx, token);
            if is_eof {
                break;
            }
            if self.should_halt_lexing() {
                self.feed(ctx, scanner.eof_token());
                break;
            }
        }
    }

    /// Issues one PP token to the machine.
    pub fn feed(&mut self, ctx: &mut PpContext<'_, '_>, token: PPToken) {
        if token.klass == TokenKlass::Eof && self.state == PpState::Halt {
            // The scanner was halted; close the unit directly.
            self.finish_translation_unit(ctx, token);
            return;
        }
        self.dispatch(ctx, token);
    }

    fn dispatch(&mut self, ctx: &mut PpContext<'_, '_>, token: PPToken) {
        match self.state {
            PpState::Default => self.accept_default(ctx, token),
            PpState::Halt => {}
            PpState::Inactive => self.accept_inactive(ctx, token),
            PpState::ExpectDirective => self.accept_expect_directive(ctx, token),
            PpState::ExpectDefaultDirectiveTail | PpState::ExpectIncludeDirectiveTail => {
                self.accept_directive_tail(ctx, token)
            }
        }
    }

    fn accept_default(&mut self, ctx: &mut PpContext<'_, '_>, token: PPToken) {
        match token.klass {
            TokenKlass::Eof => self.finish_translation_unit(ctx, token),
            TokenKlass::Hash if token.is_first_token_of_line => {
                self.state = PpState::ExpectDirective;
            }
            TokenKlass::Comment => self.run_expansion(ctx, token),
            _ if self.version_scan_mode => {
                // First token that belongs to the program proper; version
                // scanning has learned everything it can.
                self.state = PpState::Halt;
            }
            _ => self.run_expansion(ctx, token),
        }
    }

    fn accept_inactive(&mut self, ctx: &mut PpContext<'_, '_>, token: PPToken) {
        match token.klass {
            TokenKlass::Hash if token.is_first_token_of_line => {
                self.state = PpState::ExpectDirective;
            }
            TokenKlass::Eof => self.finish_translation_unit(ctx, token),
            _ => {}
        }
    }

    fn accept_expect_directive(&mut self, ctx: &mut PpContext<'_, '_>, token: PPToken) {
        if token.klass == TokenKlass::Eof || token.is_first_token_of_line {
            // Empty directive: a lone `#` on its line.
            self.redirect(ctx, token);
            return;
        }

        match token.klass {
            TokenKlass::Comment => {}
            TokenKlass::Identifier => {
                let text = ctx.atoms.text(token.text);
                if self.in_active_branch() {
                    self.directive_token = Some(token);
                    self.state = if text == "include" {
                        PpState::ExpectIncludeDirectiveTail
                    } else {
                        PpState::ExpectDefaultDirectiveTail
                    };
                } else if matches!(text, "if" | "ifdef" | "ifndef" | "elif" | "else" | "endif") {
                    // Conditional directives still steer the stack while the
                    // region is skipped.
                    self.directive_token = Some(token);
                    self.state = PpState::ExpectDefaultDirectiveTail;
                } else {
                    self.directive_token = None;
                    self.state = PpState::Inactive;
                }
            }
            _ => {
                if self.in_active_branch() {
                    self.report_error(ctx, "expected a preprocessing directive name");
                }
                self.directive_token = None;
                self.state = PpState::ExpectDefaultDirectiveTail;
            }
        }
    }

    fn accept_directive_tail(&mut self, ctx: &mut PpContext<'_, '_>, token: PPToken) {
        if token.klass == TokenKlass::Eof || token.is_first_token_of_line {
            if let Some(directive) = self.directive_token.take() {
                let args = std::mem::take(&mut self.directive_args);
                self.handle_directive(ctx, directive, &args);
            }
            self.directive_args.clear();
            self.redirect(ctx, token);
            return;
        }

        if token.klass != TokenKlass::Comment {
            self.directive_args.push(token);
        }
    }

    /// Leaves directive handling, then re-dispatches `token` in the state the
    /// conditional stack calls for.
    fn redirect(&mut self, ctx: &mut PpContext<'_, '_>, token: PPToken) {
        self.state = if self.in_active_branch() {
            PpState::Default
        } else {
            PpState::Inactive
        };
        self.dispatch(ctx, token);
    }

    fn in_active_branch(&self) -> bool {
        self.conditional_stack.last().map_or(true, |frame| frame.active)
    }

    /// EOF bookkeeping for this file's machine.
    fn finish_translation_unit(&mut self, ctx: &mut PpContext<'_, '_>, token: PPToken) {
        let mut out = Vec::new();
        let mut issues = std::mem::take(&mut self.expansion_issues);
        {
            let mut env = ExpansionEnv {
                atoms: &mut *ctx.atoms,
                macros: &mut *ctx.macros,
                version_number: ctx.language.version.number(),
                issues: &mut issues,
                callback: ctx.callback.as_deref_mut(),
            };
            self.expansion.finalize(&mut env, &mut out);
        }
        self.expansion_issues = issues;
        self.emit_expanded(ctx, out);
        self.drain_issues(ctx);

        if !self.conditional_stack.is_empty() {
            self.report_error(ctx, "unterminated conditional directive");
            self.conditional_stack.clear();
        }

        if self.include_depth == 0 {
            ctx.stream.add_eof(&token, token.spelled_range);
        }
    }

    /// Feeds one ordinary token through macro expansion and emits the
    /// products.
    fn run_expansion(&mut self, ctx: &mut PpContext<'_, '_>, token: PPToken) {
        let mut out = Vec::new();
        let mut issues = std::mem::take(&mut self.expansion_issues);
        {
            let mut env = ExpansionEnv {
                atoms: &mut *ctx.atoms,
                macros: &mut *ctx.macros,
                version_number: ctx.language.version.number(),
                issues: &mut issues,
                callback: ctx.callback.as_deref_mut(),
            };
            self.expansion.feed(token, &mut env, &mut out);
        }
        self.expansion_issues = issues;
        self.emit_expanded(ctx, out);
        self.drain_issues(ctx);
    }

    fn emit_expanded(&mut self, ctx: &mut PpContext<'_, '_>, out: Vec<ExpandedToken>) {
        for expanded in out {
            let expanded_range = if let Some(range) = self.include_expansion_range {
                range
            } else if let Some(site) = expanded.expansion_site {
                TextRange::empty_at(site)
            } else {
                expanded.token.spelled_range
            };
            self.output_token(ctx, expanded.token, expanded_range);
        }
    }

    /// Final classification: identifiers that spell keywords are retagged
    /// before they reach the stream.
    fn output_token(&mut self, ctx: &mut PpContext<'_, '_>, token: PPToken, expanded_range: TextRange) {
        let klass = if token.klass == TokenKlass::Identifier {
            keyword_klass(ctx.atoms.text(token.text)).unwrap_or(TokenKlass::Identifier)
        } else {
            token.klass
        };
        ctx.stream.add_token(&token, klass, expanded_range);
    }

    fn drain_issues(&mut self, ctx: &mut PpContext<'_, '_>) {
        for issue in std::mem::take(&mut self.expansion_issues) {
            self.report_error(ctx, issue);
        }
    }

    fn report_error(&self, ctx: &mut PpContext<'_, '_>, message: impl Into<String>) {
        ctx.diags
            .error(SyntaxRange::empty_at(ctx.stream.next_id()), message);
    }

    fn report_warning(&self, ctx: &mut PpContext<'_, '_>, message: impl Into<String>) {
        ctx.diags
            .warning(SyntaxRange::empty_at(ctx.stream.next_id()), message);
    }

    fn handle_directive(&mut self, ctx: &mut PpContext<'_, '_>, directive: PPToken, args: &[PPToken]) {
        let mut scanner = DirectiveScanner::new(args);
        let name = ctx.atoms.text(directive.text).to_string();
        match name.as_str() {
            "include" => self.handle_include(ctx, directive, &mut scanner),
            "define" => self.handle_define(ctx, &mut scanner),
            "undef" => self.handle_undef(ctx, &mut scanner),
            "if" => self.handle_if(ctx, &mut scanner),
            "ifdef" => self.handle_ifdef(ctx, &mut scanner, false),
            "ifndef" => self.handle_ifdef(ctx, &mut scanner, true),
            "elif" => self.handle_elif(ctx, &mut scanner),
            "else" => self.handle_else(ctx, &mut scanner),
            "endif" => self.handle_endif(ctx, &mut scanner),
            "version" => self.handle_version(ctx, directive, &mut scanner),
            "extension" => self.handle_extension(ctx, &mut scanner),
            "pragma" => self.handle_pragma(ctx, &mut scanner),
            "line" => self.handle_line(ctx, &mut scanner),
            "error" => {
                let text: Vec<&str> = args.iter().map(|t| ctx.atoms.text(t.text)).collect();
                let message = format!("#error: {}", text.join(" "));
                self.report_error(ctx, message);
            }
            _ => {
                self.report_error(ctx, format!("unknown preprocessing directive '#{name}'"));
            }
        }
    }

    fn handle_include(
        &mut self,
        ctx: &mut PpContext<'_, '_>,
        directive: PPToken,
        scanner: &mut DirectiveScanner<'_>,
    ) {
        let Some(header) = scanner.try_consume2(TokenKlass::AngleString, TokenKlass::QuotedString)
        else {
            self.report_error(ctx, "expected a header name after #include");
            return;
        };
        if !scanner.at_end() {
            self.report_warning(ctx, "extra tokens after header name");
        }

        if self.include_depth >= ctx.compiler_config.max_include_depth {
            self.report_error(ctx, "include depth limit exceeded");
            return;
        }

        let header_text = ctx.atoms.text(header.text);
        let header_name: String = header_text[1..header_text.len() - 1].to_string();

        let mut resolved: Option<(FileId, PathBuf)> = None;
        for dir in &ctx.compiler_config.include_paths {
            let candidate = dir.join(&header_name);
            if let Ok(file) = ctx.sources.open_from_file(&candidate) {
                let path = ctx.sources.path(file).map(|p| p.to_path_buf()).unwrap_or(candidate);
                resolved = Some((file, path));
                break;
            }
        }

        if let Some(callback) = ctx.callback.as_deref_mut() {
            callback.on_include_directive(&header, resolved.as_ref().map(|(_, p)| p.as_path()));
        }

        let Some((file, _)) = resolved else {
            self.report_error(ctx, format!("cannot open include file '{header_name}'"));
            return;
        };

        if let Some(callback) = ctx.callback.as_deref_mut() {
            callback.on_enter_included_file(file);
        }

        let pinned = self
            .include_expansion_range
            .unwrap_or_else(|| TextRange::empty_at(directive.spelled_range.start));
        let mut child =
            PpStateMachine::nested(self.version_scan_mode, Some(pinned), self.include_depth + 1);
        child.preprocess_file(ctx, file);

        if let Some(callback) = ctx.callback.as_deref_mut() {
            callback.on_exit_included_file();
        }
    }

    fn handle_define(&mut self, ctx: &mut PpContext<'_, '_>, scanner: &mut DirectiveScanner<'_>) {
        let Some(name) = scanner.try_consume(TokenKlass::Identifier) else {
            self.report_error(ctx, "expected a macro name after #define");
            return;
        };

        let mut is_function_like = false;
        let mut params: Vec<PPToken> = Vec::new();

        // A `(` spelled immediately after the name opens a parameter list.
        if scanner
            .peek()
            .is_some_and(|t| t.klass == TokenKlass::LParen && !t.has_leading_whitespace)
        {
            is_function_like = true;
            scanner.consume();

            if scanner.try_consume(TokenKlass::RParen).is_none() {
                loop {
                    if let Some(param) = scanner.try_consume(TokenKlass::Identifier) {
                        params.push(param);
                    } else if scanner.peek().is_some_and(|t| t.klass == TokenKlass::Dot) {
                        self.report_error(ctx, "variadic macros are not supported");
                        return;
                    } else {
                        self.report_error(ctx, "expected a macro parameter name");
                        return;
                    }

                    if scanner.try_consume(TokenKlass::Comma).is_some() {
                        continue;
                    }
                    if scanner.try_consume(TokenKlass::RParen).is_some() {
                        break;
                    }
                    self.report_error(ctx, "expected ',' or ')' in macro parameter list");
                    return;
                }
            }
        }

        let replacement: Vec<PPToken> = scanner.rest().to_vec();

        if let Some(callback) = ctx.callback.as_deref_mut() {
            callback.on_define_directive(&name, &params, &replacement, is_function_like);
        }

        let outcome = if is_function_like {
            ctx.macros.define_function_like(name.text, params, replacement)
        } else {
            ctx.macros.define_object_like(name.text, replacement)
        };
        match outcome {
            DefineOutcome::Defined => {}
            DefineOutcome::Redefined => {
                let text = ctx.atoms.text(name.text).to_string();
                self.report_warning(ctx, format!("macro '{text}' redefined"));
            }
            DefineOutcome::Protected => {
                let text = ctx.atoms.text(name.text).to_string();
                self.report_error(ctx, format!("cannot redefine builtin macro '{text}'"));
            }
        }
    }

    fn handle_undef(&mut self, ctx: &mut PpContext<'_, '_>, scanner: &mut DirectiveScanner<'_>) {
        let Some(name) = scanner.try_consume(TokenKlass::Identifier) else {
            self.report_error(ctx, "expected a macro name after #undef");
            return;
        };
        if !scanner.at_end() {
            self.report_warning(ctx, "extra tokens after macro name");
        }

        if let Some(callback) = ctx.callback.as_deref_mut() {
            callback.on_undef_directive(&name);
        }

        match ctx.macros.undef(name.text) {
            UndefOutcome::Removed | UndefOutcome::NotDefined => {}
            UndefOutcome::Protected => {
                let text = ctx.atoms.text(name.text).to_string();
                self.report_error(ctx, format!("cannot undefine builtin macro '{text}'"));
            }
        }
    }

    fn handle_if(&mut self, ctx: &mut PpContext<'_, '_>, scanner: &mut DirectiveScanner<'_>) {
        if !self.in_active_branch() {
            self.skipped_inactive_conditionals += 1;
            return;
        }

        let active = self.evaluate_condition(ctx, scanner);
        if let Some(callback) = ctx.callback.as_deref_mut() {
            callback.on_if_directive(active);
        }
        self.conditional_stack.push(ConditionalFrame {
            active,
            seen_active_branch: active,
            seen_else: false,
        });
    }

    fn handle_ifdef(
        &mut self,
        ctx: &mut PpContext<'_, '_>,
        scanner: &mut DirectiveScanner<'_>,
        is_ndef: bool,
    ) {
        if !self.in_active_branch() {
            self.skipped_inactive_conditionals += 1;
            return;
        }

        let Some(name) = scanner.try_consume(TokenKlass::Identifier) else {
            self.report_error(ctx, "expected a macro name");
            return;
        };
        if !scanner.at_end() {
            self.report_warning(ctx, "extra tokens after macro name");
        }

        if let Some(callback) = ctx.callback.as_deref_mut() {
            callback.on_ifdef_directive(&name, is_ndef);
        }

        let active = ctx.macros.is_defined(name.text) != is_ndef;
        self.conditional_stack.push(ConditionalFrame {
            active,
            seen_active_branch: active,
            seen_else: false,
        });
    }

    fn handle_elif(&mut self, ctx: &mut PpContext<'_, '_>, scanner: &mut DirectiveScanner<'_>) {
        if self.skipped_inactive_conditionals > 0 {
            return;
        }

        let value = self.evaluate_condition(ctx, scanner);

        let Some(frame) = self.conditional_stack.last_mut() else {
            self.report_warning(ctx, "#elif without matching #if");
            return;
        };
        if frame.seen_else {
            self.report_error(ctx, "#elif after #else");
            return;
        }

        frame.active = !frame.seen_active_branch && value;
        frame.seen_active_branch |= frame.active;

        if let Some(callback) = ctx.callback.as_deref_mut() {
            callback.on_elif_directive(value);
        }
    }

    fn handle_else(&mut self, ctx: &mut PpContext<'_, '_>, scanner: &mut DirectiveScanner<'_>) {
        if self.skipped_inactive_conditionals > 0 {
            return;
        }
        if !scanner.at_end() {
            self.report_warning(ctx, "extra tokens after #else");
        }

        let Some(frame) = self.conditional_stack.last_mut() else {
            self.report_warning(ctx, "#else without matching #if");
            return;
        };
        if frame.seen_else {
            self.report_error(ctx, "#else after #else");
            return;
        }

        frame.active = !frame.seen_active_branch;
        frame.seen_active_branch = true;
        frame.seen_else = true;

        if let Some(callback) = ctx.callback.as_deref_mut() {
            callback.on_else_directive();
        }
    }

    fn handle_endif(&mut self, ctx: &mut PpContext<'_, '_>, scanner: &mut DirectiveScanner<'_>) {
        if self.skipped_inactive_conditionals > 0 {
            self.skipped_inactive_conditionals -= 1;
            return;
        }
        if !scanner.at_end() {
            self.report_warning(ctx, "extra tokens after #endif");
        }

        if self.conditional_stack.pop().is_none() {
            self.report_warning(ctx, "#endif without matching #if");
            return;
        }

        if let Some(callback) = ctx.callback.as_deref_mut() {
            callback.on_endif_directive();
        }
    }

    /// Expands the remaining directive tokens (handling `defined`) and
    /// evaluates the resulting integer expression. Malformed input counts as
    /// false.
    fn evaluate_condition(
        &mut self,
        ctx: &mut PpContext<'_, '_>,
        scanner: &mut DirectiveScanner<'_>,
    ) -> bool {
        let mut processor = MacroExpansionProcessor::new();
        let mut expanded: Vec<ExpandedToken> = Vec::new();
        let mut issues = std::mem::take(&mut self.expansion_issues);
        let mut malformed = false;

        {
            let mut env = ExpansionEnv {
                atoms: &mut *ctx.atoms,
                macros: &mut *ctx.macros,
                version_number: ctx.language.version.number(),
                issues: &mut issues,
                callback: ctx.callback.as_deref_mut(),
            };

            while let Some(token) = scanner.peek() {
                // `defined X` / `defined(X)` resolves before expansion.
                if token.klass == TokenKlass::Identifier && env.atoms.text(token.text) == "defined"
                {
                    scanner.consume();
                    let name = if let Some(name) = scanner.try_consume(TokenKlass::Identifier) {
                        Some(name)
                    } else if scanner.peek().is_some_and(|t| t.klass == TokenKlass::LParen)
                        && scanner.peek_at(1).is_some_and(|t| t.klass == TokenKlass::Identifier)
                        && scanner.peek_at(2).is_some_and(|t| t.klass == TokenKlass::RParen)
                    {
                        scanner.consume();
                        let name = scanner.consume().unwrap();
                        scanner.consume();
                        Some(name)
                    } else {
                        None
                    };

                    let Some(name) = name else {
                        env.issues
                            .push("expected a macro name after 'defined'".to_string());
                        malformed = true;
                        break;
                    };

                    let is_defined = env.macros.is_defined(name.text);
                    if let Some(callback) = env.callback.as_deref_mut() {
                        callback.on_defined_operator(&name, is_defined);
                    }

                    processor.feed(
                        PPToken {
                            klass: if is_defined {
                                TokenKlass::DefinedYes
                            } else {
                                TokenKlass::DefinedNo
                            },
                            ..token
                        },
                        &mut env,
                        &mut expanded,
                    );
                } else {
                    let token = scanner.consume().unwrap();
                    processor.feed(token, &mut env, &mut expanded);
                }
            }
            processor.finalize(&mut env, &mut expanded);
        }

        self.expansion_issues = issues;
        self.drain_issues(ctx);
        if malformed {
            return false;
        }

        let tokens: Vec<PPToken> = expanded.into_iter().map(|e| e.token).collect();
        eval::evaluate(&tokens, ctx.atoms).unwrap_or(false)
    }

    fn handle_version(
        &mut self,
        ctx: &mut PpContext<'_, '_>,
        directive: PPToken,
        scanner: &mut DirectiveScanner<'_>,
    ) {
        let Some(number_tok) = scanner.try_consume(TokenKlass::IntegerConstant) else {
            self.report_error(ctx, "expected a version number after #version");
            return;
        };
        let version = ctx
            .atoms
            .text(number_tok.text)
            .parse::<u32>()
            .ok()
            .and_then(GlslVersion::from_number);
        let Some(version) = version else {
            self.report_error(ctx, "unrecognized GLSL version");
            return;
        };

        let mut profile: Option<GlslProfile> = None;
        if let Some(profile_tok) = scanner.try_consume(TokenKlass::Identifier) {
            profile = GlslProfile::from_name(ctx.atoms.text(profile_tok.text));
            if profile.is_none() {
                self.report_error(ctx, "unrecognized GLSL profile");
                return;
            }
        }
        if !scanner.at_end() {
            self.report_warning(ctx, "extra tokens after #version");
        }

        ctx.language.set_version(version, profile);
        if let Some(callback) = ctx.callback.as_deref_mut() {
            callback.on_version_directive(
                directive.spelled_file,
                directive.spelled_range,
                version,
                ctx.language.profile,
            );
        }
    }

    fn handle_extension(&mut self, ctx: &mut PpContext<'_, '_>, scanner: &mut DirectiveScanner<'_>) {
        let Some(name_tok) = scanner.try_consume(TokenKlass::Identifier) else {
            self.report_error(ctx, "expected an extension name after #extension");
            return;
        };
        if scanner.try_consume(TokenKlass::Colon).is_none() {
            self.report_error(ctx, "expected ':' in #extension directive");
            return;
        }
        let Some(behavior_tok) = scanner.try_consume(TokenKlass::Identifier) else {
            self.report_error(ctx, "expected an extension behavior");
            return;
        };

        let behavior = ExtensionBehavior::from_name(ctx.atoms.text(behavior_tok.text));
        let Some(behavior) = behavior else {
            self.report_error(ctx, "extension behavior must be enable, require, warn or disable");
            return;
        };

        let name_text = ctx.atoms.text(name_tok.text).to_string();
        match ExtensionId::from_name(&name_text) {
            Some(extension) => {
                ctx.language.apply_extension(extension, behavior);
                if let Some(callback) = ctx.callback.as_deref_mut() {
                    callback.on_extension_directive(
                        name_tok.spelled_file,
                        name_tok.spelled_range,
                        extension,
                        behavior,
                    );
                }
            }
            None if behavior == ExtensionBehavior::Require => {
                self.report_error(ctx, format!("required extension '{name_text}' is not supported"));
            }
            None => {
                self.report_warning(ctx, format!("unknown extension '{name_text}'"));
            }
        }
    }

    fn handle_pragma(&mut self, ctx: &mut PpContext<'_, '_>, scanner: &mut DirectiveScanner<'_>) {
        if scanner.at_end() {
            self.report_warning(ctx, "empty #pragma directive");
            return;
        }
        if let Some(callback) = ctx.callback.as_deref_mut() {
            callback.on_pragma_directive(scanner.rest());
        }
    }

    /// `#line` is recognized and validated; reported positions are not
    /// remapped.
    fn handle_line(&mut self, ctx: &mut PpContext<'_, '_>, scanner: &mut DirectiveScanner<'_>) {
        if scanner.try_consume(TokenKlass::IntegerConstant).is_none() {
            self.report_error(ctx, "expected a line number after #line");
            return;
        }
        let _ = scanner.try_consume(TokenKlass::IntegerConstant);
        if !scanner.at_end() {
            self.report_warning(ctx, "extra tokens after #line");
        }
    }
}

/// Cursor over a directive's buffered argument tokens.
pub struct DirectiveScanner<'t> {
    tokens: &'t [PPToken],
    cursor: usize,
}

impl<'t> DirectiveScanner<'t> {
    pub fn new(tokens: &'t [PPToken]) -> DirectiveScanner<'t> {
        DirectiveScanner { tokens, cursor: 0 }
    }

    pub fn at_end(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    pub fn peek(&self) -> Option<PPToken> {
        self.tokens.get(self.cursor).copied()
    }

    pub fn peek_at(&self, offset: usize) -> Option<PPToken> {
        self.tokens.get(self.cursor + offset).copied()
    }

    pub fn consume(&mut self) -> Option<PPToken> {
        let token = self.peek()?;
        self.cursor += 1;
        Some(token)
    }

    pub fn try_consume(&mut self, klass: TokenKlass) -> Option<PPToken> {
        match self.peek() {
            Some(token) if token.klass == klass => self.consume(),
            _ => None,
        }
    }

    pub fn try_consume2(&mut self, a: TokenKlass, b: TokenKlass) -> Option<PPToken> {
        match self.peek() {
            Some(token) if token.klass == a || token.klass == b => self.consume(),
            _ => None,
        }
    }

    pub fn rest(&self) -> &'t [PPToken] {
        &self.tokens[self.cursor.min(self.tokens.len())..]
    }
}

/// Registers the compiler-predefined macros for a compilation.
///
/// `__LINE__`, `__FILE__` and `__VERSION__` are substituted by the expansion
/// processor itself; they are registered here so `defined(...)` sees them and
/// `#undef`/`#define` on them is refused. `GL_core_profile` is always `1`;
/// `GL_es_profile` joins it under the ES profile.
pub fn register_predefined_macros(
    atoms: &mut AtomTable,
    macros: &mut MacroTable,
    language: &LanguageConfig,
) {
    let one = |atoms: &mut AtomTable| PPToken {
        klass: TokenKlass::IntegerConstant,
        spelled_file: FileId::SYSTEM_PREAMBLE,
        spelled_range: TextRange::default(),
        text: atoms.atom("1"),
        is_first_token_of_line: false,
        has_leading_whitespace: true,
    };

    for name in ["__LINE__", "__FILE__", "__VERSION__"] {
        let atom = atoms.atom(name);
        macros.define_predefined(atom, Vec::new());
    }

    let token = one(atoms);
    let core = atoms.atom("GL_core_profile");
    macros.define_predefined(core, vec![token]);

    if language.profile == GlslProfile::Es {
        let token = one(atoms);
        let es = atoms.atom("GL_es_profile");
        macros.define_predefined(es, vec![token]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_manager::SourceManager;

    struct PpFixture {
        atoms: AtomTable,
        macros: MacroTable,
        diags: DiagnosticSink,
        sources: SourceManager,
        compiler_config: CompilerConfig,
        language: LanguageConfig,
        stream: TokenStream,
    }

    impl PpFixture {
        fn new() -> PpFixture {
            PpFixture {
                atoms: AtomTable::new(),
                macros: MacroTable::new(),
                diags: DiagnosticSink::new(),
                sources: SourceManager::new(),
                compiler_config: CompilerConfig::default(),
                language: LanguageConfig::default(),
                stream: TokenStream::new(),
            }
        }

        fn run(&mut self, source: &str) {
            self.run_mode(source, false)
        }

        fn run_mode(&mut self, source: &str, version_scan: bool) {
            self.sources.set_main_from_buffer(source);
            let mut pp = PpStateMachine::new(version_scan);
            let mut ctx = PpContext {
                atoms: &mut self.atoms,
                macros: &mut self.macros,
                diags: &mut self.diags,
                sources: &mut self.sources,
                compiler_config: &self.compiler_config,
                language: &mut self.language,
                stream: &mut self.stream,
                callback: None,
            };
            pp.preprocess_file(&mut ctx, FileId::MAIN);
        }

        fn texts(&self) -> Vec<String> {
            self.stream
                .tokens()
                .iter()
                .filter(|t| t.klass != TokenKlass::Eof)
                .map(|t| self.atoms.text(t.text).to_string())
                .collect()
        }
    }

    #[test]
    fn empty_main_is_one_eof() {
        let mut fx = PpFixture::new();
        fx.run("");
        assert_eq!(fx.stream.len(), 1);
        assert_eq!(fx.stream.tokens()[0].klass, TokenKlass::Eof);
        assert!(!fx.diags.has_errors());
    }

    #[test]
    fn keywords_are_classified_on_emission() {
        let mut fx = PpFixture::new();
        fx.run("void main() {}");
        let klasses: Vec<TokenKlass> = fx.stream.tokens().iter().map(|t| t.klass).collect();
        assert_eq!(
            klasses,
            vec![
                TokenKlass::KwVoid,
                TokenKlass::Identifier,
                TokenKlass::LParen,
                TokenKlass::RParen,
                TokenKlass::LBrace,
                TokenKlass::RBrace,
                TokenKlass::Eof,
            ]
        );
    }

    #[test]
    fn object_macro_expands_at_use_site() {
        let mut fx = PpFixture::new();
        fx.run("#define N 42\nint x = N;");
        assert_eq!(fx.texts(), vec!["int", "x", "=", "42", ";"]);

        let forty_two = &fx.stream.tokens()[3];
        assert_eq!(forty_two.klass, TokenKlass::IntegerConstant);
        // The expanded range pins to the use site of N on line 1.
        assert_eq!(forty_two.expanded_range.start.line, 1);
        assert!(forty_two.expanded_range.is_empty());
        // The token ordering invariant holds across the expansion.
        let tokens = fx.stream.tokens();
        for pair in tokens.windows(2) {
            assert!(pair[0].expanded_range.start <= pair[1].expanded_range.start);
        }
    }

    #[test]
    fn function_macro_with_pasting_emits_joined_identifier() {
        let mut fx = PpFixture::new();
        fx.run("#define CAT(a,b) a##b\nint CAT(foo,42) = 0;");
        assert_eq!(fx.texts(), vec!["int", "foo42", "=", "0", ";"]);
        assert_eq!(fx.stream.tokens()[1].klass, TokenKlass::Identifier);
        assert!(!fx.diags.has_errors());
    }

    #[test]
    fn inactive_region_is_skipped_without_lex_errors() {
        let mut fx = PpFixture::new();
        fx.run("#if 0\nthis is garbage !!! @@@\n#endif\nint y;");
        assert_eq!(fx.texts(), vec!["int", "y", ";"]);
        assert!(!fx.diags.has_errors());
    }

    #[test]
    fn active_region_keeps_tokens() {
        let mut fx = PpFixture::new();
        fx.run("#if 1\nint y;\n#endif");
        assert_eq!(fx.texts(), vec!["int", "y", ";"]);
    }

    #[test]
    fn elif_and_else_branch_selection() {
        let mut fx = PpFixture::new();
        fx.run("#if 0\nint a;\n#elif 1\nint b;\n#else\nint c;\n#endif");
        assert_eq!(fx.texts(), vec!["int", "b", ";"]);

        let mut fx = PpFixture::new();
        fx.run("#if 0\nint a;\n#elif 0\nint b;\n#else\nint c;\n#endif");
        assert_eq!(fx.texts(), vec!["int", "c", ";"]);
    }

    #[test]
    fn nested_conditionals_inside_inactive_region() {
        let mut fx = PpFixture::new();
        fx.run("#if 0\n#if 1\nint a;\n#endif\nint b;\n#endif\nint c;");
        assert_eq!(fx.texts(), vec!["int", "c", ";"]);
        assert!(!fx.diags.has_errors());
    }

    #[test]
    fn ifdef_and_defined_operator() {
        let mut fx = PpFixture::new();
        fx.run("#define FOO\n#ifdef FOO\nint a;\n#endif\n#ifndef FOO\nint b;\n#endif");
        assert_eq!(fx.texts(), vec!["int", "a", ";"]);

        let mut fx = PpFixture::new();
        fx.run("#define FOO\n#if defined(FOO) && !defined(BAR)\nint ok;\n#endif");
        assert_eq!(fx.texts(), vec!["int", "ok", ";"]);
    }

    #[test]
    fn undef_removes_definition() {
        let mut fx = PpFixture::new();
        fx.run("#define FOO 1\n#undef FOO\n#ifdef FOO\nint a;\n#endif\nint b;");
        assert_eq!(fx.texts(), vec!["int", "b", ";"]);
    }

    #[test]
    fn undef_of_builtin_is_reported() {
        let mut fx = PpFixture::new();
        register_predefined_macros(&mut fx.atoms, &mut fx.macros, &fx.language.clone());
        fx.run("#undef __VERSION__\nint x;");
        assert!(fx.diags.has_errors());
        assert_eq!(fx.texts(), vec!["int", "x", ";"]);
    }

    #[test]
    fn elif_after_else_is_an_error() {
        let mut fx = PpFixture::new();
        fx.run("#if 1\n#else\n#elif 1\n#endif\nint x;");
        assert!(fx.diags.errors().iter().any(|d| d.message.contains("#elif")));
    }

    #[test]
    fn unterminated_conditional_is_reported() {
        let mut fx = PpFixture::new();
        fx.run("#if 1\nint x;");
        assert!(fx
            .diags
            .errors()
            .iter()
            .any(|d| d.message.contains("unterminated conditional")));
    }

    #[test]
    fn version_directive_updates_language_config() {
        let mut fx = PpFixture::new();
        fx.run("#version 330\nvoid main() {}");
        assert_eq!(fx.language.version, GlslVersion::V330);
        assert_eq!(fx.language.profile, GlslProfile::Core);

        let mut fx = PpFixture::new();
        fx.run("#version 310 es\nvoid main() {}");
        assert_eq!(fx.language.version, GlslVersion::V310);
        assert_eq!(fx.language.profile, GlslProfile::Es);
    }

    #[test]
    fn extension_directive_updates_extension_set() {
        let mut fx = PpFixture::new();
        fx.run("#extension GL_EXT_ray_tracing : enable\nint x;");
        assert!(fx.language.is_extension_enabled(ExtensionId::ExtRayTracing));

        let mut fx = PpFixture::new();
        fx.run("#extension GL_EXT_made_up : require\nint x;");
        assert!(fx.diags.has_errors());
    }

    #[test]
    fn error_directive_reports_text() {
        let mut fx = PpFixture::new();
        fx.run("#error unsupported target\nint x;");
        assert!(fx
            .diags
            .errors()
            .iter()
            .any(|d| d.message.contains("unsupported target")));
    }

    #[test]
    fn unknown_directive_is_reported() {
        let mut fx = PpFixture::new();
        fx.run("#frobnicate\nint x;");
        assert!(fx.diags.has_errors());
        assert_eq!(fx.texts(), vec!["int", "x", ";"]);
    }

    #[test]
    fn version_scan_halts_at_first_program_token() {
        let mut fx = PpFixture::new();
        fx.run_mode("#version 450\n// comment\nvoid main() {}", true);
        assert_eq!(fx.language.version, GlslVersion::V450);
        // Halted: only the EOF marker (plus nothing from the body).
        assert!(fx.texts().is_empty());
        assert_eq!(fx.stream.tokens().last().unwrap().klass, TokenKlass::Eof);
    }

    #[test]
    fn comments_collect_in_sidecar() {
        let mut fx = PpFixture::new();
        fx.run("// leading\nint x; /* trailing */");
        assert_eq!(fx.texts(), vec!["int", "x", ";"]);
        assert_eq!(fx.stream.comments().len(), 2);
        assert_eq!(fx.stream.comments()[0].next_token_index, 0);
        assert_eq!(fx.stream.comments()[1].next_token_index, 3);
    }

    #[test]
    fn include_inlines_tokens_with_pinned_expansion() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("common.glsl"), "float helper();\n").unwrap();

        let mut fx = PpFixture::new();
        fx.compiler_config.include_paths.push(dir.path().to_path_buf());
        fx.run("#include \"common.glsl\"\nvoid main() {}");

        assert_eq!(
            fx.texts(),
            vec!["float", "helper", "(", ")", ";", "void", "main", "(", ")", "{", "}"]
        );
        assert!(!fx.diags.has_errors());

        // Included tokens expand to the include site in the main file.
        let helper = &fx.stream.tokens()[1];
        assert!(helper.spelled_file.is_include());
        assert_eq!(helper.expanded_range.start.line, 0);
        assert!(helper.expanded_range.is_empty());
        // Main-file tokens after the include keep their own ranges.
        let main_kw = &fx.stream.tokens()[5];
        assert_eq!(main_kw.spelled_file, FileId::MAIN);
        assert_eq!(main_kw.expanded_range.start.line, 1);
    }

    #[test]
    fn missing_include_is_reported() {
        let mut fx = PpFixture::new();
        fx.run("#include \"nope.glsl\"\nint x;");
        assert!(fx.diags.has_errors());
        assert_eq!(fx.texts(), vec!["int", "x", ";"]);
    }

    #[test]
    fn include_depth_limit() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("loop.glsl"), "#include \"loop.glsl\"\n").unwrap();

        let mut fx = PpFixture::new();
        fx.compiler_config.include_paths.push(dir.path().to_path_buf());
        fx.compiler_config.max_include_depth = 4;
        fx.run("#include \"loop.glsl\"\nint x;");
        assert!(fx
            .diags
            .errors()
            .iter()
            .any(|d| d.message.contains("depth")));
        assert_eq!(fx.texts(), vec!["int", "x", ";"]);
    }

    #[test]
    fn conditional_skip_hides_includes_and_defines() {
        let mut fx = PpFixture::new();
        fx.run("#if 0\n#include \"missing.glsl\"\n#define FOO 1\n#endif\n#ifdef FOO\nint a;\n#endif\nint b;");
        assert_eq!(fx.texts(), vec!["int", "b", ";"]);
        assert!(!fx.diags.has_errors());
    }

    #[test]
    fn pragma_reaches_callback() {
        struct Recorder {
            pragmas: Vec<Vec<String>>,
        }
        impl crate::callback::PpCallback for Recorder {
            fn on_pragma_directive(&mut self, args: &[PPToken]) {
                self.pragmas.push(vec![String::new(); args.len()]);
            }
        }

        let mut fx = PpFixture::new();
        let mut recorder = Recorder { pragmas: Vec::new() };
        fx.sources.set_main_from_buffer("#pragma optimize(off)\nint x;");
        let mut pp = PpStateMachine::new(false);
        let mut ctx = PpContext {
            atoms: &mut fx.atoms,
            macros: &mut fx.macros,
            diags: &mut fx.diags,
            sources: &mut fx.sources,
            compiler_config: &fx.compiler_config,
            language: &mut fx.language,
            stream: &mut fx.stream,
            callback: Some(&mut recorder),
        };
        pp.preprocess_file(&mut ctx, FileId::MAIN);

        assert_eq!(recorder.pragmas.len(), 1);
        assert_eq!(recorder.pragmas[0].len(), 4);
    }

    #[test]
    fn line_directive_is_accepted() {
        let mut fx = PpFixture::new();
        fx.run("#line 100\nint x;");
        assert!(!fx.diags.has_errors());
        assert_eq!(fx.texts(), vec!["int", "x", ";"]);
    }

    #[test]
    fn token_monotonicity_under_macros_and_includes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("inc.glsl"), "int from_include;\n").unwrap();

        let mut fx = PpFixture::new();
        fx.compiler_config.include_paths.push(dir.path().to_path_buf());
        fx.run("#define TWICE(x) x x\n#include \"inc.glsl\"\nTWICE(int) a;\nint b;");

        let tokens = fx.stream.tokens();
        for pair in tokens.windows(2) {
            assert!(
                pair[0].expanded_range.start <= pair[1].expanded_range.start,
                "expanded ranges must be non-decreasing"
            );
            if pair[0].spelled_file == pair[1].spelled_file {
                assert!(
                    pair[0].spelled_range.start <= pair[1].spelled_range.start,
                    "spelled ranges must be non-decreasing within a file"
                );
            }
        }
    }
}

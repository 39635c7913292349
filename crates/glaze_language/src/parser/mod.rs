//! Recursive-descent parser with permissive error recovery.
//!
//! The parser consumes the post-preprocess token stream and produces AST
//! nodes through the [`AstBuilder`]. It never backtracks beyond three tokens
//! of lookahead and never aborts: a missing required token switches the
//! parser into **Recovery**, in which placeholder nodes are produced while
//! tokens are skipped up to a mode-specific synchronizing set (a closing
//! bracket, a comma at the right depth, a statement boundary). If the
//! expected terminator is found it is consumed and parsing resumes;
//! otherwise recovery propagates one frame up.
//!
//! Bracket balance is tracked in three counters updated by `consume`, which
//! is what lets the synchronizing sets say "the `)` that closes *our* `(`"
//! on arbitrarily malformed input.

mod decl;
mod expr;
mod stmt;

use glaze_base::{SyntaxRange, SyntaxTokenId};

use crate::ast::{AstTranslationUnit, TranslationUnitKind};
use crate::builder::AstBuilder;
use crate::token::{RawSyntaxToken, SyntaxToken, TokenKlass};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum ParsingState {
    Parsing,
    Recovery,
}

/// Token-skipping targets for [`Parser::recover_from_error`]. Each variant
/// carries the bracket depth that identifies "our" closing token.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum RecoveryMode {
    /// After a `(`: stop at its `)`, a `,` at its depth, or a statement
    /// boundary.
    Comma(usize),
    /// After a `(`: stop at its `)` or a statement boundary.
    Paren(usize),
    /// After a `[`: stop at its `]` or a statement boundary.
    Bracket(usize),
    /// After a `{`: stop only at its `}`.
    Brace(usize),
    /// After the `{` of an initializer list: stop at its `}`, or rebalance
    /// at a stray `;`.
    IListBrace(usize),
    /// No pending bracket: stop at `;` in this scope or the `}` closing it.
    Semi,
}

/// Parser over one translation unit's tokens.
pub struct Parser<'c> {
    pub(crate) builder: AstBuilder<'c>,
    tokens: &'c [RawSyntaxToken],
    cursor: usize,
    state: ParsingState,
    pub(crate) paren_depth: usize,
    pub(crate) bracket_depth: usize,
    pub(crate) brace_depth: usize,
}

impl<'c> Parser<'c> {
    /// `tokens` must end with an EOF token.
    pub fn new(builder: AstBuilder<'c>, tokens: &'c [RawSyntaxToken]) -> Parser<'c> {
        debug_assert!(matches!(tokens.last(), Some(t) if t.klass == TokenKlass::Eof));
        Parser {
            builder,
            tokens,
            cursor: 0,
            state: ParsingState::Parsing,
            paren_depth: 0,
            bracket_depth: 0,
            brace_depth: 0,
        }
    }

    /// Parses every top-level declaration up to EOF.
    pub fn parse_translation_unit(&mut self, kind: TranslationUnitKind) -> AstTranslationUnit {
        let start = self.current_id();
        let mut decls = Vec::new();

        while !self.eof() {
            let before = self.cursor;
            decls.push(self.parse_decl_and_try_recover(true));

            if self.cursor == before {
                // The declaration parser is required to make progress on any
                // input; skip one token if it could not.
                self.consume();
            }
        }

        let range = self.range_from(start);
        self.builder.translation_unit(kind, range, decls)
    }

    // Cursor primitives.

    pub(crate) fn peek(&self) -> &RawSyntaxToken {
        &self.tokens[self.cursor.min(self.tokens.len() - 1)]
    }

    /// Lookahead clamps to the trailing EOF.
    pub(crate) fn peek_at(&self, lookahead: usize) -> &RawSyntaxToken {
        let idx = (self.cursor + lookahead).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    pub(crate) fn current_id(&self) -> SyntaxTokenId {
        SyntaxTokenId(self.cursor.min(self.tokens.len() - 1) as u32)
    }

    pub(crate) fn current_token(&self) -> SyntaxToken {
        let tok = self.peek();
        SyntaxToken {
            id: self.current_id(),
            klass: tok.klass,
            text: tok.text,
        }
    }

    pub(crate) fn at(&self, klass: TokenKlass) -> bool {
        self.peek().klass == klass
    }

    pub(crate) fn at_ahead(&self, klass: TokenKlass, lookahead: usize) -> bool {
        self.peek_at(lookahead).klass == klass
    }

    pub(crate) fn eof(&self) -> bool {
        self.at(TokenKlass::Eof)
    }

    /// Advances past the current token, maintaining bracket depths. The
    /// cursor never moves past the EOF token.
    pub(crate) fn consume(&mut self) {
        match self.peek().klass {
            TokenKlass::LParen => self.paren_depth += 1,
            TokenKlass::RParen => self.paren_depth = self.paren_depth.saturating_sub(1),
            TokenKlass::LBracket => self.bracket_depth += 1,
            TokenKlass::RBracket => self.bracket_depth = self.bracket_depth.saturating_sub(1),
            TokenKlass::LBrace => self.brace_depth += 1,
            TokenKlass::RBrace => self.brace_depth = self.brace_depth.saturating_sub(1),
            _ => {}
        }
        if self.cursor < self.tokens.len() - 1 {
            self.cursor += 1;
        }
    }

    pub(crate) fn try_consume(&mut self, klass: TokenKlass) -> bool {
        if self.at(klass) {
            self.consume();
            true
        } else {
            false
        }
    }

    pub(crate) fn range_from(&self, start: SyntaxTokenId) -> SyntaxRange {
        SyntaxRange::new(start, self.current_id())
    }

    // Parsing/Recovery state.

    pub(crate) fn in_parsing(&self) -> bool {
        self.state == ParsingState::Parsing
    }

    pub(crate) fn in_recovery(&self) -> bool {
        self.state == ParsingState::Recovery
    }

    pub(crate) fn enter_recovery(&mut self) {
        self.state = ParsingState::Recovery;
    }

    pub(crate) fn exit_recovery(&mut self) {
        self.state = ParsingState::Parsing;
    }

    pub(crate) fn report_error(&mut self, message: impl Into<String>) {
        let range = SyntaxRange::single(self.current_id());
        self.builder.diags.error(range, message);
    }

    /// Skips tokens up to the synchronizing set of `mode`. The stopping
    /// token itself is not consumed.
    pub(crate) fn recover_from_error(&mut self, mode: RecoveryMode) {
        let scope_brace = self.brace_depth;

        loop {
            let klass = self.peek().klass;
            if klass == TokenKlass::Eof {
                return;
            }

            let stop = match mode {
                RecoveryMode::Comma(paren) => {
                    (klass == TokenKlass::RParen && self.paren_depth == paren)
                        || (klass == TokenKlass::Comma && self.paren_depth == paren)
                        || (matches!(klass, TokenKlass::Semicolon | TokenKlass::RBrace)
                            && self.brace_depth <= scope_brace)
                }
                RecoveryMode::Paren(paren) => {
                    (klass == TokenKlass::RParen && self.paren_depth == paren)
                        || (matches!(klass, TokenKlass::Semicolon | TokenKlass::RBrace)
                            && self.brace_depth <= scope_brace)
                }
                RecoveryMode::Bracket(bracket) => {
                    (klass == TokenKlass::RBracket && self.bracket_depth == bracket)
                        || (matches!(klass, TokenKlass::Semicolon | TokenKlass::RBrace)
                            && self.brace_depth <= scope_brace)
                }
                RecoveryMode::Brace(brace) => {
                    klass == TokenKlass::RBrace && self.brace_depth == brace
                }
                RecoveryMode::IListBrace(brace) => {
                    if klass == TokenKlass::Semicolon {
                        // A `;` cannot occur inside an initializer list; the
                        // brace balance is lost, so force it back.
                        self.brace_depth = brace.saturating_sub(1);
                        return;
                    }
                    klass == TokenKlass::RBrace && self.brace_depth == brace
                }
                RecoveryMode::Semi => {
                    (klass == TokenKlass::Semicolon && self.brace_depth <= scope_brace)
                        || (klass == TokenKlass::RBrace && self.brace_depth <= scope_brace)
                }
            };

            if stop {
                return;
            }
            self.consume();
        }
    }

    // Shared helpers for bracket closing and separators.

    /// Consumes a `;`, or reports and *infers* one so statement parsing can
    /// continue.
    pub(crate) fn parse_or_infer_semicolon(&mut self) {
        if !self.try_consume(TokenKlass::Semicolon) {
            self.report_error("expected ';'");
        }
    }

    /// Closes the `(` that was consumed at `left_paren_depth`.
    pub(crate) fn parse_closing_paren(&mut self, left_paren_depth: usize) {
        if self.at(TokenKlass::RParen) && self.paren_depth == left_paren_depth {
            self.consume();
            self.exit_recovery_if_needed();
            return;
        }

        if self.in_parsing() {
            self.report_error("expected ')'");
            self.enter_recovery();
        }
        self.recover_from_error(RecoveryMode::Paren(left_paren_depth));
        if self.at(TokenKlass::RParen) && self.paren_depth == left_paren_depth {
            self.consume();
            self.exit_recovery_if_needed();
        }
    }

    /// Closes the `[` that was consumed at `left_bracket_depth`.
    pub(crate) fn parse_closing_bracket(&mut self, left_bracket_depth: usize) {
        if self.at(TokenKlass::RBracket) && self.bracket_depth == left_bracket_depth {
            self.consume();
            self.exit_recovery_if_needed();
            return;
        }

        if self.in_parsing() {
            self.report_error("expected ']'");
            self.enter_recovery();
        }
        self.recover_from_error(RecoveryMode::Bracket(left_bracket_depth));
        if self.at(TokenKlass::RBracket) && self.bracket_depth == left_bracket_depth {
            self.consume();
            self.exit_recovery_if_needed();
        }
    }

    fn exit_recovery_if_needed(&mut self) {
        if self.in_recovery() {
            self.exit_recovery();
        }
    }

    /// Parses one declaration; whatever recovery it leaves behind is
    /// resolved here so the next declaration starts clean.
    pub(crate) fn parse_decl_and_try_recover(&mut self, at_global: bool) -> crate::ast::DeclId {
        let decl = self.parse_declaration(at_global);
        if self.in_recovery() {
            self.recover_from_error(RecoveryMode::Semi);
            self.try_consume(TokenKlass::Semicolon);
            self.exit_recovery();
        }
        decl
    }
}

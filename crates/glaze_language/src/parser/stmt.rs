//! Statement parsing, including the declaration-vs-expression split in
//! statement position.

use crate::ast::{JumpKind, QualifierSet, StmtId};
use crate::token::TokenKlass;

use super::{Parser, RecoveryMode};

impl<'c> Parser<'c> {
    pub(crate) fn parse_stmt(&mut self) -> StmtId {
        let start = self.current_id();
        match self.peek().klass {
            TokenKlass::LBrace => self.parse_compound_stmt(),
            TokenKlass::KwIf => self.parse_if_stmt(),
            TokenKlass::KwWhile => self.parse_while_stmt(),
            TokenKlass::KwDo => self.parse_do_while_stmt(),
            TokenKlass::KwFor => self.parse_for_stmt(),
            TokenKlass::KwSwitch => self.parse_switch_stmt(),
            TokenKlass::KwCase | TokenKlass::KwDefault => self.parse_label_stmt(),
            TokenKlass::KwBreak | TokenKlass::KwContinue | TokenKlass::KwDiscard
            | TokenKlass::KwReturn => self.parse_jump_stmt(),
            TokenKlass::Semicolon => {
                self.consume();
                self.builder.empty_stmt(self.range_from(start))
            }
            _ => self.parse_decl_or_expr_stmt(),
        }
    }

    /// Parses one statement and resolves any recovery it leaves behind, so
    /// the enclosing block can continue.
    pub(crate) fn parse_stmt_and_try_recover(&mut self) -> StmtId {
        if self.in_recovery() {
            self.recover_from_error(RecoveryMode::Semi);
            self.try_consume(TokenKlass::Semicolon);
            self.exit_recovery();
        }

        let stmt = self.parse_stmt();
        if self.in_recovery() {
            self.recover_from_error(RecoveryMode::Semi);
            self.try_consume(TokenKlass::Semicolon);
            self.exit_recovery();
        }
        stmt
    }

    /// `{ stmt... }` in a fresh lexical scope.
    pub(crate) fn parse_compound_stmt(&mut self) -> StmtId {
        debug_assert!(self.at(TokenKlass::LBrace));
        let start = self.current_id();
        self.consume();
        let brace_depth = self.brace_depth;

        self.builder.enter_block_scope();
        let mut stmts = Vec::new();
        while !self.eof() {
            if self.brace_depth < brace_depth
                || (self.at(TokenKlass::RBrace) && self.brace_depth == brace_depth)
            {
                break;
            }
            let before = self.cursor;
            stmts.push(self.parse_stmt_and_try_recover());
            if self.cursor == before {
                self.consume();
            }
        }
        self.builder.leave_block_scope();

        if !self.try_consume(TokenKlass::RBrace) {
            self.report_error("expected '}'");
        }
        self.builder.compound_stmt(self.range_from(start), stmts)
    }

    fn parse_if_stmt(&mut self) -> StmtId {
        let start = self.current_id();
        self.consume();

        let cond = self.parse_paren_wrapped_expr_or_error();
        if self.in_recovery() {
            self.recover_from_error(RecoveryMode::Semi);
            self.try_consume(TokenKlass::Semicolon);
            self.exit_recovery();
        }

        let then_stmt = self.parse_stmt_and_try_recover();
        let else_stmt = if self.try_consume(TokenKlass::KwElse) {
            Some(self.parse_stmt_and_try_recover())
        } else {
            None
        };

        self.builder
            .if_stmt(self.range_from(start), cond, then_stmt, else_stmt)
    }

    fn parse_while_stmt(&mut self) -> StmtId {
        let start = self.current_id();
        self.consume();

        let cond = self.parse_paren_wrapped_expr_or_error();
        if self.in_recovery() {
            self.recover_from_error(RecoveryMode::Semi);
            self.try_consume(TokenKlass::Semicolon);
            self.exit_recovery();
        }

        let body = self.parse_stmt_and_try_recover();
        self.builder.while_stmt(self.range_from(start), cond, body)
    }

    fn parse_do_while_stmt(&mut self) -> StmtId {
        let start = self.current_id();
        self.consume();

        let body = self.parse_stmt_and_try_recover();

        let cond = if self.try_consume(TokenKlass::KwWhile) {
            let cond = self.parse_paren_wrapped_expr_or_error();
            if self.in_parsing() {
                self.parse_or_infer_semicolon();
            }
            cond
        } else {
            self.report_error("expected 'while' after do-statement body");
            self.enter_recovery();
            self.builder.error_expr(self.range_from(self.current_id()))
        };

        self.builder.do_while_stmt(self.range_from(start), body, cond)
    }

    /// `for '(' (decl_stmt | expr_stmt | ';') [expr] ';' [expr] ')' stmt`.
    /// The loop variable lives in a scope that wraps the whole statement.
    fn parse_for_stmt(&mut self) -> StmtId {
        let start = self.current_id();
        self.consume();

        self.builder.enter_block_scope();

        if !self.at(TokenKlass::LParen) {
            self.report_error("expected '(' after 'for'");
            self.enter_recovery();
            let body = self.builder.error_stmt(self.range_from(self.current_id()));
            self.builder.leave_block_scope();
            return self
                .builder
                .for_stmt(self.range_from(start), None, None, None, body);
        }
        self.consume();
        let paren_depth = self.paren_depth;

        let init = if self.try_consume(TokenKlass::Semicolon) {
            None
        } else {
            Some(self.parse_decl_or_expr_stmt())
        };

        let cond = if self.in_parsing() && !self.at(TokenKlass::Semicolon) {
            Some(self.parse_expr())
        } else {
            None
        };
        if self.in_parsing() {
            self.parse_or_infer_semicolon();
        }

        let iter = if self.in_parsing() && !self.at(TokenKlass::RParen) {
            Some(self.parse_expr())
        } else {
            None
        };

        self.parse_closing_paren(paren_depth);
        if self.in_recovery() {
            self.recover_from_error(RecoveryMode::Semi);
            self.try_consume(TokenKlass::Semicolon);
            self.exit_recovery();
        }

        let body = self.parse_stmt_and_try_recover();
        self.builder.leave_block_scope();

        self.builder
            .for_stmt(self.range_from(start), init, cond, iter, body)
    }

    fn parse_switch_stmt(&mut self) -> StmtId {
        let start = self.current_id();
        self.consume();

        let test = self.parse_paren_wrapped_expr_or_error();
        if self.in_recovery() {
            self.recover_from_error(RecoveryMode::Semi);
            self.try_consume(TokenKlass::Semicolon);
            self.exit_recovery();
        }

        let body = if self.at(TokenKlass::LBrace) {
            self.parse_compound_stmt()
        } else {
            self.report_error("expected '{' after switch condition");
            self.builder.error_stmt(self.range_from(self.current_id()))
        };

        self.builder.switch_stmt(self.range_from(start), test, body)
    }

    /// `case expr :` or `default :`.
    fn parse_label_stmt(&mut self) -> StmtId {
        let start = self.current_id();
        let is_case = self.at(TokenKlass::KwCase);
        self.consume();

        let case_expr = if is_case {
            Some(self.parse_expr())
        } else {
            None
        };

        if self.in_parsing() && !self.try_consume(TokenKlass::Colon) {
            self.report_error("expected ':' after label");
        }
        self.builder.label_stmt(self.range_from(start), case_expr)
    }

    fn parse_jump_stmt(&mut self) -> StmtId {
        let start = self.current_id();
        let klass = self.peek().klass;
        self.consume();

        let stmt = match klass {
            TokenKlass::KwReturn => {
                let expr = if self.at(TokenKlass::Semicolon) {
                    None
                } else {
                    Some(self.parse_expr())
                };
                self.builder.return_stmt(self.range_from(start), expr)
            }
            TokenKlass::KwBreak => self
                .builder
                .jump_stmt(self.range_from(start), JumpKind::Break),
            TokenKlass::KwContinue => self
                .builder
                .jump_stmt(self.range_from(start), JumpKind::Continue),
            _ => self
                .builder
                .jump_stmt(self.range_from(start), JumpKind::Discard),
        };

        if self.in_parsing() {
            self.parse_or_infer_semicolon();
        }
        stmt
    }

    /// Statement starting with neither a keyword nor `{`: decide between a
    /// declaration and an expression statement.
    ///
    /// Qualifier keywords and `struct` always open a declaration. A type
    /// specifier followed by `(` is a constructor call and therefore an
    /// expression statement; bare identifiers are classified through the
    /// symbol table's struct names.
    fn parse_decl_or_expr_stmt(&mut self) -> StmtId {
        let start = self.current_id();
        let klass = self.peek().klass;

        let starts_qualified_decl = klass == TokenKlass::KwStruct
            || klass == TokenKlass::KwPrecision
            || klass == TokenKlass::KwLayout
            || QualifierSet::bit_for(klass).is_some();
        if starts_qualified_decl {
            let decl = self.parse_declaration(false);
            return self.builder.decl_stmt(self.range_from(start), decl);
        }

        let is_type_start = self.builder.types.builtin(klass).is_some()
            || (klass == TokenKlass::Identifier && self.builder.is_type_name(self.peek().text));

        if is_type_start {
            // Parse the type specifier first, then decide: a following `(`
            // makes this a constructor call in an expression statement.
            let qual_type = self.parse_type_spec(QualifierSet::new());
            if self.in_recovery() {
                let decl = self.builder.error_decl(self.range_from(start));
                return self.builder.decl_stmt(self.range_from(start), decl);
            }

            if self.at(TokenKlass::LParen) {
                let expr = self.parse_constructor_call(start, qual_type);
                let expr = if self.in_parsing() {
                    let expr = self.parse_postfix_suffixes(start, expr);
                    let expr = if self.in_parsing() {
                        self.parse_assignment_expr_with_unary(start, expr)
                    } else {
                        expr
                    };
                    self.parse_comma_expr_with_first(start, expr)
                } else {
                    expr
                };
                if self.in_parsing() {
                    self.parse_or_infer_semicolon();
                }
                return self.builder.expr_stmt(self.range_from(start), expr);
            }

            let decl = self.parse_declaration_with_type_spec(start, qual_type);
            return self.builder.decl_stmt(self.range_from(start), decl);
        }

        let expr = self.parse_expr();
        if self.in_parsing() {
            self.parse_or_infer_semicolon();
        }
        self.builder.expr_stmt(self.range_from(start), expr)
    }
}

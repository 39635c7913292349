//! Expression parsing: precedence-climbed binary expressions, assignment,
//! ternary selection and postfix suffixes.

use glaze_base::SyntaxTokenId;

use crate::ast::{BinaryOp, ExprId, QualifierSet, UnaryOp};
use crate::token::TokenKlass;

use super::{Parser, RecoveryMode};

/// Binary operator and its precedence; higher binds tighter. The comma
/// operator is handled separately because it is statement-only.
fn binary_op_of(klass: TokenKlass) -> Option<(BinaryOp, u8)> {
    Some(match klass {
        TokenKlass::Or => (BinaryOp::LogicalOr, 1),
        TokenKlass::Xor => (BinaryOp::LogicalXor, 2),
        TokenKlass::And => (BinaryOp::LogicalAnd, 3),
        TokenKlass::VerticalBar => (BinaryOp::BitOr, 4),
        TokenKlass::Caret => (BinaryOp::BitXor, 5),
        TokenKlass::Ampersand => (BinaryOp::BitAnd, 6),
        TokenKlass::Equal => (BinaryOp::Equal, 7),
        TokenKlass::NotEqual => (BinaryOp::NotEqual, 7),
        TokenKlass::LAngle => (BinaryOp::Less, 8),
        TokenKlass::RAngle => (BinaryOp::Greater, 8),
        TokenKlass::LessEq => (BinaryOp::LessEq, 8),
        TokenKlass::GreaterEq => (BinaryOp::GreaterEq, 8),
        TokenKlass::LShift => (BinaryOp::LShift, 9),
        TokenKlass::RShift => (BinaryOp::RShift, 9),
        TokenKlass::Plus => (BinaryOp::Plus, 10),
        TokenKlass::Dash => (BinaryOp::Minus, 10),
        TokenKlass::Star => (BinaryOp::Mul, 11),
        TokenKlass::Slash => (BinaryOp::Div, 11),
        TokenKlass::Percent => (BinaryOp::Mod, 11),
        _ => return None,
    })
}

fn assign_op_of(klass: TokenKlass) -> Option<BinaryOp> {
    Some(match klass {
        TokenKlass::Assign => BinaryOp::Assign,
        TokenKlass::PlusAssign => BinaryOp::PlusAssign,
        TokenKlass::MinusAssign => BinaryOp::MinusAssign,
        TokenKlass::MulAssign => BinaryOp::MulAssign,
        TokenKlass::DivAssign => BinaryOp::DivAssign,
        TokenKlass::ModAssign => BinaryOp::ModAssign,
        TokenKlass::LShiftAssign => BinaryOp::LShiftAssign,
        TokenKlass::RShiftAssign => BinaryOp::RShiftAssign,
        TokenKlass::AndAssign => BinaryOp::AndAssign,
        TokenKlass::XorAssign => BinaryOp::XorAssign,
        TokenKlass::OrAssign => BinaryOp::OrAssign,
        _ => return None,
    })
}

impl<'c> Parser<'c> {
    /// Full expression, comma operator included.
    pub(crate) fn parse_expr(&mut self) -> ExprId {
        let start = self.current_id();
        let first = self.parse_assignment_expr();
        self.parse_comma_expr_with_first(start, first)
    }

    pub(crate) fn parse_comma_expr_with_first(
        &mut self,
        start: SyntaxTokenId,
        mut expr: ExprId,
    ) -> ExprId {
        while self.in_parsing() && self.at(TokenKlass::Comma) {
            self.consume();
            let rhs = self.parse_assignment_expr();
            expr = self
                .builder
                .binary_expr(self.range_from(start), BinaryOp::Comma, expr, rhs);
        }
        expr
    }

    /// Expression without the comma operator; the element grammar of
    /// argument lists and initializers.
    pub(crate) fn parse_assignment_expr(&mut self) -> ExprId {
        let start = self.current_id();
        let unary = self.parse_unary_expr();
        if self.in_recovery() {
            return unary;
        }
        self.parse_assignment_expr_with_unary(start, unary)
    }

    /// Continues after a parsed unary expression: either an assignment or
    /// the tail of a conditional expression.
    pub(crate) fn parse_assignment_expr_with_unary(
        &mut self,
        start: SyntaxTokenId,
        unary: ExprId,
    ) -> ExprId {
        if let Some(op) = assign_op_of(self.peek().klass) {
            self.consume();
            let rhs = self.parse_assignment_expr();
            return self.builder.binary_expr(self.range_from(start), op, unary, rhs);
        }
        self.parse_conditional_expr(start, unary)
    }

    /// `binary_expr ['?' expr ':' assignment_expr]`, with the first unary
    /// term already parsed.
    fn parse_conditional_expr(&mut self, start: SyntaxTokenId, first_unary: ExprId) -> ExprId {
        let cond = self.parse_binary_expr(start, first_unary, 0);

        if !self.in_parsing() || !self.try_consume(TokenKlass::Question) {
            return cond;
        }

        let when_true = self.parse_expr();
        let when_false = if self.try_consume(TokenKlass::Colon) {
            self.parse_assignment_expr()
        } else {
            self.report_error("expected ':' in conditional expression");
            self.enter_recovery();
            self.builder.error_expr(self.range_from(self.current_id()))
        };

        self.builder
            .select_expr(self.range_from(start), cond, when_true, when_false)
    }

    /// Precedence climbing over the binary operator ladder.
    fn parse_binary_expr(
        &mut self,
        start: SyntaxTokenId,
        mut lhs: ExprId,
        min_precedence: u8,
    ) -> ExprId {
        while self.in_parsing() {
            let Some((op, precedence)) = binary_op_of(self.peek().klass) else {
                break;
            };
            if precedence < min_precedence {
                break;
            }
            self.consume();

            let rhs_start = self.current_id();
            let rhs_unary = self.parse_unary_expr();
            // Climb while the next operator binds tighter than `op`.
            let rhs = if self.in_parsing() {
                self.parse_binary_expr(rhs_start, rhs_unary, precedence + 1)
            } else {
                rhs_unary
            };

            lhs = self.builder.binary_expr(self.range_from(start), op, lhs, rhs);
        }
        lhs
    }

    pub(crate) fn parse_unary_expr(&mut self) -> ExprId {
        let start = self.current_id();
        let op = match self.peek().klass {
            TokenKlass::Plus => Some(UnaryOp::Plus),
            TokenKlass::Dash => Some(UnaryOp::Minus),
            TokenKlass::Bang => Some(UnaryOp::LogicalNot),
            TokenKlass::Tilde => Some(UnaryOp::BitNot),
            TokenKlass::Increment => Some(UnaryOp::PrefixInc),
            TokenKlass::Decrement => Some(UnaryOp::PrefixDec),
            _ => None,
        };

        match op {
            Some(op) => {
                self.consume();
                let operand = self.parse_unary_expr();
                self.builder.unary_expr(self.range_from(start), op, operand)
            }
            None => self.parse_postfix_expr(),
        }
    }

    fn parse_postfix_expr(&mut self) -> ExprId {
        let start = self.current_id();
        let primary = self.parse_primary_expr();
        if self.in_recovery() {
            return primary;
        }
        self.parse_postfix_suffixes(start, primary)
    }

    /// `.field`, `.length()`, `[index]`, `++`, `--` suffixes.
    pub(crate) fn parse_postfix_suffixes(
        &mut self,
        start: SyntaxTokenId,
        mut expr: ExprId,
    ) -> ExprId {
        loop {
            if self.in_recovery() {
                return expr;
            }
            match self.peek().klass {
                TokenKlass::Dot => {
                    self.consume();
                    let name = self.current_token();
                    if !name.klass.is_identifier_like() {
                        self.report_error("expected a member name after '.'");
                        self.enter_recovery();
                        return self.builder.error_expr(self.range_from(start));
                    }

                    // `.length()` is syntactic, not a field of that name.
                    if self.builder.atoms.text(name.text) == "length"
                        && self.at_ahead(TokenKlass::LParen, 1)
                        && self.at_ahead(TokenKlass::RParen, 2)
                    {
                        self.consume();
                        self.consume();
                        self.consume();
                        expr = self.builder.length_expr(self.range_from(start), expr);
                    } else {
                        self.consume();
                        expr = self.builder.member_expr(self.range_from(start), expr, name);
                    }
                }
                TokenKlass::LBracket => {
                    self.consume();
                    let bracket_depth = self.bracket_depth;
                    let index = self.parse_expr();
                    self.parse_closing_bracket(bracket_depth);
                    expr = self.builder.index_expr(self.range_from(start), expr, index);
                }
                TokenKlass::Increment => {
                    self.consume();
                    expr = self
                        .builder
                        .unary_expr(self.range_from(start), UnaryOp::PostfixInc, expr);
                }
                TokenKlass::Decrement => {
                    self.consume();
                    expr = self
                        .builder
                        .unary_expr(self.range_from(start), UnaryOp::PostfixDec, expr);
                }
                _ => return expr,
            }
        }
    }

    fn parse_primary_expr(&mut self) -> ExprId {
        let start = self.current_id();
        let token = self.current_token();
        let type_spec_start = self.is_type_spec_start(token.klass);

        match token.klass {
            TokenKlass::IntegerConstant
            | TokenKlass::FloatConstant
            | TokenKlass::KwTrue
            | TokenKlass::KwFalse => {
                self.consume();
                self.builder.literal_expr(self.range_from(start), token)
            }
            TokenKlass::Identifier => {
                if self.at_ahead(TokenKlass::LParen, 1) {
                    if self.builder.is_type_name(token.text) {
                        // A struct name in call position is a constructor.
                        let qual_type = self.parse_type_spec(QualifierSet::new());
                        return self.parse_constructor_call(start, qual_type);
                    }
                    self.consume();
                    let args = self.parse_function_argument_list();
                    return self
                        .builder
                        .call_expr(self.range_from(start), token, args);
                }
                self.consume();
                self.builder.name_expr(self.range_from(start), token)
            }
            TokenKlass::LParen => self.parse_paren_wrapped_expr(),
            _ if type_spec_start => {
                let qual_type = self.parse_type_spec(QualifierSet::new());
                self.parse_constructor_call(start, qual_type)
            }
            _ => {
                // No token is consumed; the caller owns recovery.
                self.report_error("expected an expression");
                self.enter_recovery();
                self.builder.error_expr(self.range_from(start))
            }
        }
    }

    pub(crate) fn parse_paren_wrapped_expr(&mut self) -> ExprId {
        debug_assert!(self.at(TokenKlass::LParen));
        self.consume();
        let paren_depth = self.paren_depth;
        let expr = self.parse_expr();
        self.parse_closing_paren(paren_depth);
        expr
    }

    /// `(expr)` where the grammar requires parentheses (`if`, `while`, ...);
    /// a missing `(` yields an error expression in recovery.
    pub(crate) fn parse_paren_wrapped_expr_or_error(&mut self) -> ExprId {
        if self.at(TokenKlass::LParen) {
            return self.parse_paren_wrapped_expr();
        }
        self.report_error("expected '('");
        self.enter_recovery();
        self.builder.error_expr(self.range_from(self.current_id()))
    }

    /// Constructor invocation with the type specifier already parsed.
    pub(crate) fn parse_constructor_call(
        &mut self,
        start: SyntaxTokenId,
        qual_type: crate::ast::QualTypeId,
    ) -> ExprId {
        let constructed = self.builder.ast.qual_type(qual_type).resolved;
        if !self.at(TokenKlass::LParen) {
            self.report_error("expected '(' in constructor call");
            self.enter_recovery();
            return self.builder.error_expr(self.range_from(start));
        }
        let args = self.parse_function_argument_list();
        self.builder
            .constructor_expr(self.range_from(start), constructed, args)
    }

    /// `( [assignment_expr {',' assignment_expr}] )`, also accepting the
    /// `(void)` spelling.
    pub(crate) fn parse_function_argument_list(&mut self) -> Vec<ExprId> {
        debug_assert!(self.at(TokenKlass::LParen));
        self.consume();
        let paren_depth = self.paren_depth;
        let mut args = Vec::new();

        if self.try_consume(TokenKlass::RParen) {
            return args;
        }
        if self.at(TokenKlass::KwVoid) && self.at_ahead(TokenKlass::RParen, 1) {
            self.consume();
            self.consume();
            return args;
        }

        loop {
            args.push(self.parse_assignment_expr());

            if self.in_recovery() {
                self.recover_from_error(RecoveryMode::Comma(paren_depth));
                if self.at(TokenKlass::Comma) && self.paren_depth == paren_depth {
                    self.consume();
                    self.exit_recovery();
                    continue;
                }
                break;
            }

            if self.at(TokenKlass::Comma) && self.paren_depth == paren_depth {
                self.consume();
                continue;
            }
            break;
        }

        self.parse_closing_paren(paren_depth);
        args
    }

    pub(crate) fn is_type_spec_start(&mut self, klass: TokenKlass) -> bool {
        klass == TokenKlass::KwStruct || self.builder.types.builtin(klass).is_some()
    }
}

//! Integer expression evaluation for `#if` / `#elif`.
//!
//! The input token sequence has already been macro-expanded and has had
//! `defined X` / `defined(X)` replaced by `DefinedYes` / `DefinedNo` tokens.
//! Evaluation runs a two-stack shunting yard: unary operators are
//! right-associative, binary operators left-associative, with the precedence
//! ladder of GLSL preprocessor expressions.
//!
//! Arithmetic is on `i64` with wrapping overflow. Division and modulo by zero
//! yield 0 rather than faulting. Shift counts are masked to `0..=63` and
//! right shift is arithmetic, so negative left operands keep their sign.
//! Remaining identifiers (unknown macros) evaluate to 0.
//!
//! [`evaluate`] returns `None` on syntactic imbalance; the preprocessor maps
//! that to *false*.

use glaze_base::AtomTable;

use crate::consts::parse_pp_integer;
use crate::token::{PPToken, TokenKlass};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum PpOperator {
    // Precedence 1 (highest): grouping only.
    LParen,
    // Precedence 2, unary.
    Identity,
    Negate,
    BitNot,
    LogicalNot,
    // Precedence 3..12, binary.
    Multiply,
    Divide,
    Modulo,
    Add,
    Subtract,
    ShiftLeft,
    ShiftRight,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    Equal,
    NotEqual,
    BitAnd,
    BitXor,
    BitOr,
    LogicalAnd,
    LogicalOr,
}

#[derive(Clone, Copy, Debug)]
struct OperatorInfo {
    op: PpOperator,
    precedence: u8,
    is_unary: bool,
}

fn unary_operator(klass: TokenKlass) -> Option<OperatorInfo> {
    let op = match klass {
        TokenKlass::Plus => PpOperator::Identity,
        TokenKlass::Dash => PpOperator::Negate,
        TokenKlass::Tilde => PpOperator::BitNot,
        TokenKlass::Bang => PpOperator::LogicalNot,
        _ => return None,
    };
    Some(OperatorInfo { op, precedence: 2, is_unary: true })
}

fn binary_operator(klass: TokenKlass) -> Option<OperatorInfo> {
    let (op, precedence) = match klass {
        TokenKlass::Star => (PpOperator::Multiply, 3),
        TokenKlass::Slash => (PpOperator::Divide, 3),
        TokenKlass::Percent => (PpOperator::Modulo, 3),
        TokenKlass::Plus => (PpOperator::Add, 4),
        TokenKlass::Dash => (PpOperator::Subtract, 4),
        TokenKlass::LShift => (PpOperator::ShiftLeft, 5),
        TokenKlass::RShift => (PpOperator::ShiftRight, 5),
        TokenKlass::LAngle => (PpOperator::Less, 6),
        TokenKlass::LessEq => (PpOperator::LessEq, 6),
        TokenKlass::RAngle => (PpOperator::Greater, 6),
        TokenKlass::GreaterEq => (PpOperator::GreaterEq, 6),
        TokenKlass::Equal => (PpOperator::Equal, 7),
        TokenKlass::NotEqual => (PpOperator::NotEqual, 7),
        TokenKlass::Ampersand => (PpOperator::BitAnd, 8),
        TokenKlass::Caret => (PpOperator::BitXor, 9),
        TokenKlass::VerticalBar => (PpOperator::BitOr, 10),
        TokenKlass::And => (PpOperator::LogicalAnd, 11),
        TokenKlass::Or => (PpOperator::LogicalOr, 12),
        _ => return None,
    };
    Some(OperatorInfo { op, precedence, is_unary: false })
}

/// Applies an operator. For unary operators `rhs` is unused.
fn apply(op: PpOperator, lhs: i64, rhs: i64) -> i64 {
    match op {
        PpOperator::LParen => 0,
        PpOperator::Identity => lhs,
        PpOperator::Negate => lhs.wrapping_neg(),
        PpOperator::BitNot => !lhs,
        PpOperator::LogicalNot => (lhs == 0) as i64,
        PpOperator::Multiply => lhs.wrapping_mul(rhs),
        PpOperator::Divide => {
            if rhs != 0 {
                lhs.wrapping_div(rhs)
            } else {
                0
            }
        }
        PpOperator::Modulo => {
            if rhs != 0 {
                lhs.wrapping_rem(rhs)
            } else {
                0
            }
        }
        PpOperator::Add => lhs.wrapping_add(rhs),
        PpOperator::Subtract => lhs.wrapping_sub(rhs),
        PpOperator::ShiftLeft => lhs.wrapping_shl(rhs as u32),
        PpOperator::ShiftRight => lhs.wrapping_shr(rhs as u32),
        PpOperator::Less => (lhs < rhs) as i64,
        PpOperator::LessEq => (lhs <= rhs) as i64,
        PpOperator::Greater => (lhs > rhs) as i64,
        PpOperator::GreaterEq => (lhs >= rhs) as i64,
        PpOperator::Equal => (lhs == rhs) as i64,
        PpOperator::NotEqual => (lhs != rhs) as i64,
        PpOperator::BitAnd => lhs & rhs,
        PpOperator::BitXor => lhs ^ rhs,
        PpOperator::BitOr => lhs | rhs,
        PpOperator::LogicalAnd => (lhs != 0 && rhs != 0) as i64,
        PpOperator::LogicalOr => (lhs != 0 || rhs != 0) as i64,
    }
}

/// Evaluates a preprocessed `#if` argument stream.
///
/// `None` means the expression was malformed (unbalanced parentheses, missing
/// operand, stray token); the caller treats that as false.
pub fn evaluate(tokens: &[PPToken], atoms: &AtomTable) -> Option<bool> {
    let mut expect_binary = false;
    let mut values: Vec<i64> = Vec::new();
    let mut operators: Vec<OperatorInfo> = Vec::new();

    fn reduce_top(values: &mut Vec<i64>, operators: &mut Vec<OperatorInfo>) -> bool {
        let Some(info) = operators.last().copied() else {
            return false;
        };
        if info.op == PpOperator::LParen {
            return false;
        }

        if info.is_unary {
            let Some(operand) = values.pop() else { return false };
            values.push(apply(info.op, operand, 0));
        } else {
            let Some(rhs) = values.pop() else { return false };
            let Some(lhs) = values.pop() else { return false };
            values.push(apply(info.op, lhs, rhs));
        }
        operators.pop();
        true
    }

    fn push_operator(
        info: OperatorInfo,
        values: &mut Vec<i64>,
        operators: &mut Vec<OperatorInfo>,
    ) -> bool {
        // Unary operators are right-associative, binary left-associative.
        let left_assoc = !info.is_unary;
        while let Some(top) = operators.last() {
            let reduce = if left_assoc {
                top.precedence <= info.precedence && top.op != PpOperator::LParen
            } else {
                top.precedence < info.precedence && top.op != PpOperator::LParen
            };
            if !reduce {
                break;
            }
            if !reduce_top(values, operators) {
                return false;
            }
        }
        operators.push(info);
        true
    }

    for token in tokens {
        if expect_binary {
            if token.klass == TokenKlass::RParen {
                while operators.last().is_some_and(|top| top.op != PpOperator::LParen) {
                    if !reduce_top(&mut values, &mut operators) {
                        return None;
                    }
                }
                if operators.pop().is_none() {
                    return None;
                }
            } else {
                let info = binary_operator(token.klass)?;
                if !push_operator(info, &mut values, &mut operators) {
                    return None;
                }
                expect_binary = false;
            }
        } else {
            match token.klass {
                TokenKlass::IntegerConstant => {
                    values.push(parse_pp_integer(atoms.text(token.text))?);
                    expect_binary = true;
                }
                TokenKlass::DefinedYes => {
                    values.push(1);
                    expect_binary = true;
                }
                // Macros were already expanded; a surviving identifier is an
                // unknown macro and evaluates to 0.
                TokenKlass::DefinedNo | TokenKlass::Identifier => {
                    values.push(0);
                    expect_binary = true;
                }
                TokenKlass::LParen => {
                    operators.push(OperatorInfo {
                        op: PpOperator::LParen,
                        precedence: 1,
                        is_unary: false,
                    });
                }
                _ => {
                    let info = unary_operator(token.klass)?;
                    if !push_operator(info, &mut values, &mut operators) {
                        return None;
                    }
                }
            }
        }
    }

    while !operators.is_empty() {
        if !reduce_top(&mut values, &mut operators) {
            return None;
        }
    }

    if values.len() == 1 {
        Some(values[0] != 0)
    } else {
        None
    }
}

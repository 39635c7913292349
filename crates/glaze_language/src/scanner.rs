//! Byte-level scanner producing preprocessor tokens.
//!
//! The scanner walks raw source bytes and produces [`PPToken`]s with spelled
//! ranges. Keywords are not distinguished here; every word is an
//! [`TokenKlass::Identifier`] until the preprocessor classifies it on
//! emission.
//!
//! Line continuations (`\` immediately before a newline) are invisible to
//! token formation: they may occur anywhere, including inside identifiers and
//! numbers. A continuation advances the line counter but does not mark the
//! following token as first-of-line.
//!
//! Column counting advances by one per UTF-8 byte by default; in UTF-16 mode
//! each decoded code point advances the column by its UTF-16 code unit count,
//! matching editor protocols.
//!
//! Header names (`<file>` / `"file"`) are valid tokens only while the
//! preprocessor is handling an `#include` tail; the driver signals this
//! through the `header_name_mode` argument. Elsewhere `"` is an `Unknown`
//! token, as GLSL has no strings.

use glaze_base::{Atom, AtomTable, FileId, TextPosition, TextRange};

use crate::token::{PPToken, TokenKlass};

fn is_ident_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_'
}

fn is_ident_continue(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Scanner state over one source buffer.
pub struct Scanner<'s> {
    bytes: &'s [u8],
    file: FileId,
    pos: usize,
    line: u32,
    column: u32,
    count_utf16: bool,
    /// True until the first token of the current line is produced. Line
    /// continuations do not reset this.
    fresh_line: bool,
    /// Whitespace seen since the previous token.
    pending_whitespace: bool,
    /// Lexical problems found while forming the most recent tokens. The
    /// preprocessor drains these and reports them with stream positions.
    issues: Vec<String>,
}

impl<'s> Scanner<'s> {
    pub fn new(source: &'s str, file: FileId, count_utf16: bool) -> Scanner<'s> {
        Scanner {
            bytes: source.as_bytes(),
            file,
            pos: 0,
            line: 0,
            column: 0,
            count_utf16,
            fresh_line: true,
            pending_whitespace: false,
            issues: Vec::new(),
        }
    }

    /// Drains lexical issues recorded since the last call.
    pub fn take_issues(&mut self) -> Vec<String> {
        std::mem::take(&mut self.issues)
    }

    /// An EOF token pinned at the current cursor position, used when the
    /// preprocessor halts lexing before the buffer ends.
    pub fn eof_token(&self) -> PPToken {
        PPToken {
            klass: TokenKlass::Eof,
            spelled_file: self.file,
            spelled_range: TextRange::empty_at(self.position()),
            text: Atom::EMPTY,
            is_first_token_of_line: self.fresh_line,
            has_leading_whitespace: self.pending_whitespace,
        }
    }

    fn position(&self) -> TextPosition {
        TextPosition::new(self.line, self.column)
    }

    fn at_eof(&mut self) -> bool {
        self.skip_line_continuations();
        self.pos >= self.bytes.len()
    }

    /// Consumes `\` + newline sequences at the cursor. They are invisible to
    /// token formation and do not mark a fresh line.
    fn skip_line_continuations(&mut self) {
        loop {
            if self.bytes.get(self.pos) != Some(&b'\\') {
                return;
            }
            match self.bytes.get(self.pos + 1) {
                Some(b'\n') => {
                    self.pos += 2;
                }
                Some(b'\r') if self.bytes.get(self.pos + 2) == Some(&b'\n') => {
                    self.pos += 3;
                }
                _ => return,
            }
            self.line += 1;
            self.column = 0;
        }
    }

    fn peek_byte(&mut self) -> Option<u8> {
        self.skip_line_continuations();
        self.bytes.get(self.pos).copied()
    }

    fn peek_byte_at(&mut self, offset: usize) -> Option<u8> {
        // Lookahead does not cross a line continuation; callers only use it
        // for short punctuator sequences where that is acceptable.
        self.skip_line_continuations();
        self.bytes.get(self.pos + offset).copied()
    }

    /// Consumes one ASCII byte.
    fn bump_ascii(&mut self) {
        debug_assert!(self.bytes[self.pos].is_ascii());
        if self.bytes[self.pos] == b'\n' {
            self.line += 1;
            self.column = 0;
            self.fresh_line = true;
        } else {
            self.column += 1;
        }
        self.pos += 1;
    }

    /// Consumes one code point, advancing the column per the configured
    /// counting mode.
    fn bump_char(&mut self) {
        let byte = self.bytes[self.pos];
        if byte.is_ascii() {
            self.bump_ascii();
            return;
        }

        let rest = &self.bytes[self.pos..];
        let len = utf8_len(byte).min(rest.len());
        let utf16_units = match std::str::from_utf8(&rest[..len]) {
            Ok(s) => s.chars().next().map_or(1, |c| c.len_utf16()),
            Err(_) => 1,
        };
        self.pos += len;
        self.column += if self.count_utf16 {
            utf16_units as u32
        } else {
            len as u32
        };
    }

    /// Skips whitespace, recording whether any was seen.
    fn skip_whitespace(&mut self) {
        loop {
            match self.peek_byte() {
                Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') | Some(0x0b) | Some(0x0c) => {
                    self.pending_whitespace = true;
                    self.bump_ascii();
                }
                _ => return,
            }
        }
    }

    /// Produces the next PP token. At end of input returns an EOF token with
    /// a zero-width range.
    pub fn next_token(&mut self, atoms: &mut AtomTable, header_name_mode: bool) -> PPToken {
        self.skip_whitespace();

        let start = self.position();
        let first_of_line = self.fresh_line;
        let leading_ws = self.pending_whitespace;

        if self.at_eof() {
            return PPToken {
                klass: TokenKlass::Eof,
                spelled_file: self.file,
                spelled_range: TextRange::empty_at(start),
                text: Atom::EMPTY,
                is_first_token_of_line: first_of_line,
                has_leading_whitespace: leading_ws,
            };
        }

        let text_start = self.pos;
        let byte = self.peek_byte().unwrap();

        let klass = if byte == b'/' && self.peek_byte_at(1) == Some(b'/') {
            self.scan_line_comment()
        } else if byte == b'/' && self.peek_byte_at(1) == Some(b'*') {
            self.scan_block_comment()
        } else if byte.is_ascii_digit()
            || (byte == b'.' && self.peek_byte_at(1).is_some_and(|b| b.is_ascii_digit()))
        {
            self.scan_number()
        } else if is_ident_start(byte) {
            self.scan_identifier()
        } else if header_name_mode && byte == b'<' {
            self.scan_header_name(b'<', b'>', TokenKlass::AngleString)
        } else if header_name_mode && byte == b'"' {
            self.scan_header_name(b'"', b'"', TokenKlass::QuotedString)
        } else if byte.is_ascii() {
            self.scan_punctuation()
        } else {
            // Non-ASCII outside comments: not part of any GLSL token.
            self.bump_char();
            TokenKlass::Unknown
        };

        // The spelled text is reassembled without line continuations so that
        // macro bodies and pasted tokens see contiguous text.
        let raw = &self.bytes[text_start..self.pos];
        let text = if raw.contains(&b'\\') {
            let cleaned = strip_line_continuations(raw);
            atoms.atom(&cleaned)
        } else {
            atoms.atom(std::str::from_utf8(raw).unwrap_or(""))
        };

        self.fresh_line = false;
        self.pending_whitespace = false;

        PPToken {
            klass,
            spelled_file: self.file,
            spelled_range: TextRange::new(start, self.position()),
            text,
            is_first_token_of_line: first_of_line,
            has_leading_whitespace: leading_ws,
        }
    }

    fn scan_line_comment(&mut self) -> TokenKlass {
        // "//" up to but not including the newline. Line continuations extend
        // the comment, which peek_byte handles transparently.
        self.bump_ascii();
        self.bump_ascii();
        while let Some(byte) = self.peek_byte() {
            if byte == b'\n' {
                break;
            }
            self.bump_char();
        }
        TokenKlass::Comment
    }

    fn scan_block_comment(&mut self) -> TokenKlass {
        self.bump_ascii();
        self.bump_ascii();
        loop {
            match self.peek_byte() {
                None => {
                    self.issues.push("unterminated block comment".to_string());
                    return TokenKlass::Comment;
                }
                Some(b'*') if self.peek_byte_at(1) == Some(b'/') => {
                    self.bump_ascii();
                    self.bump_ascii();
                    return TokenKlass::Comment;
                }
                Some(_) => {
                    self.bump_char();
                }
            }
        }
    }

    fn scan_identifier(&mut self) -> TokenKlass {
        while let Some(byte) = self.peek_byte() {
            if is_ident_continue(byte) {
                self.bump_ascii();
            } else if !byte.is_ascii() {
                // Non-ASCII in identifier position poisons the token.
                self.bump_char();
                while let Some(b) = self.peek_byte() {
                    if is_ident_continue(b) || !b.is_ascii() {
                        self.bump_char();
                    } else {
                        break;
                    }
                }
                return TokenKlass::Unknown;
            } else {
                break;
            }
        }
        TokenKlass::Identifier
    }

    /// Scans a numeric literal: decimal/hex/octal integers with optional
    /// `u`/`U` suffix, floats with optional exponent and `f`/`F`/`lf`/`LF`
    /// suffix. The maximal run of number-shaped text is consumed; if it does
    /// not form a valid literal the token is `Unknown`.
    fn scan_number(&mut self) -> TokenKlass {
        let start = self.pos;
        let mut text = Vec::new();

        let is_hex = |text: &[u8]| text.starts_with(b"0x") || text.starts_with(b"0X");

        let mut seen_dot = false;
        let mut seen_exp = false;
        while let Some(byte) = self.peek_byte() {
            match byte {
                b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                    // Sign after an exponent marker belongs to the number.
                    if (byte == b'e' || byte == b'E') && !is_hex(&text) {
                        seen_exp = true;
                        text.push(byte);
                        self.bump_ascii();
                        if let Some(sign @ (b'+' | b'-')) = self.peek_byte() {
                            text.push(sign);
                            self.bump_ascii();
                        }
                        continue;
                    }
                    text.push(byte);
                    self.bump_ascii();
                }
                b'.' if !seen_dot && !seen_exp => {
                    seen_dot = true;
                    text.push(byte);
                    self.bump_ascii();
                }
                _ => break,
            }
        }

        debug_assert!(self.pos > start);
        match classify_number(&text) {
            Some(klass) => klass,
            None => {
                self.issues.push(format!(
                    "malformed numeric literal '{}'",
                    String::from_utf8_lossy(&text)
                ));
                TokenKlass::Unknown
            }
        }
    }

    fn scan_header_name(&mut self, open: u8, close: u8, klass: TokenKlass) -> TokenKlass {
        debug_assert!(self.peek_byte() == Some(open));
        self.bump_ascii();
        loop {
            match self.peek_byte() {
                None | Some(b'\n') => {
                    self.issues.push("unterminated header name".to_string());
                    return TokenKlass::Unknown;
                }
                Some(byte) if byte == close => {
                    self.bump_ascii();
                    return klass;
                }
                Some(_) => {
                    self.bump_char();
                }
            }
        }
    }

    fn scan_punctuation(&mut self) -> TokenKlass {
        for &(klass, spelling) in crate::keywords::PUNCTUATIONS {
            let bytes = spelling.as_bytes();
            let matches = bytes
                .iter()
                .enumerate()
                .all(|(i, &b)| self.peek_byte_at(i) == Some(b));
            if matches {
                for _ in 0..bytes.len() {
                    self.bump_ascii();
                }
                return klass;
            }
        }

        // A stray character like `@` or `$`.
        self.bump_ascii();
        TokenKlass::Unknown
    }
}

fn utf8_len(first: u8) -> usize {
    match first {
        0x00..=0x7f => 1,
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        _ => 4,
    }
}

fn strip_line_continuations(raw: &[u8]) -> String {
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        if raw[i] == b'\\' && raw.get(i + 1) == Some(&b'\n') {
            i += 2;
        } else if raw[i] == b'\\' && raw.get(i + 1) == Some(&b'\r') && raw.get(i + 2) == Some(&b'\n') {
            i += 3;
        } else {
            out.push(raw[i]);
            i += 1;
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Validates a number-shaped byte run. Returns the token klass for valid
/// literals (`IntegerConstant`/`FloatConstant`), `None` when malformed.
fn classify_number(text: &[u8]) -> Option<TokenKlass> {
    let s = std::str::from_utf8(text).ok()?;

    // Integer suffix u/U; float suffixes f/F/lf/LF.
    if let Some(body) = s.strip_suffix(['u', 'U']) {
        return classify_int_body(body).then_some(TokenKlass::IntegerConstant);
    }
    if let Some(body) = s.strip_suffix("lf").or_else(|| s.strip_suffix("LF")) {
        return classify_float_body(body, true).then_some(TokenKlass::FloatConstant);
    }
    if let Some(body) = s.strip_suffix(['f', 'F']) {
        if classify_float_body(body, true) {
            return Some(TokenKlass::FloatConstant);
        }
        // "0xf" parses as hex integer, not a float suffix.
        return classify_int_body(s).then_some(TokenKlass::IntegerConstant);
    }

    if classify_int_body(s) {
        return Some(TokenKlass::IntegerConstant);
    }
    classify_float_body(s, false).then_some(TokenKlass::FloatConstant)
}

fn classify_int_body(s: &str) -> bool {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit());
    }
    if s.starts_with('0') && s.len() > 1 {
        return s.bytes().all(|b| (b'0'..=b'7').contains(&b));
    }
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Accepts `digits`, `digits.`, `digits.digits`, `.digits`, each with an
/// optional exponent; a bare digit run needs an exponent or dot unless it is
/// suffixed (`allow_plain`).
fn classify_float_body(s: &str, allow_plain: bool) -> bool {
    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(idx) => (&s[..idx], Some(&s[idx + 1..])),
        None => (s, None),
    };

    let mantissa_ok = match mantissa.find('.') {
        Some(idx) => {
            let (int_part, frac) = (&mantissa[..idx], &mantissa[idx + 1..]);
            (!int_part.is_empty() || !frac.is_empty())
                && int_part.bytes().all(|b| b.is_ascii_digit())
                && frac.bytes().all(|b| b.is_ascii_digit())
        }
        None => {
            !mantissa.is_empty()
                && mantissa.bytes().all(|b| b.is_ascii_digit())
                && (exponent.is_some() || allow_plain)
        }
    };
    if !mantissa_ok {
        return false;
    }

    match exponent {
        None => true,
        Some(exp) => {
            let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
        }
    }
}

/// Retokenizes text produced by token pasting.
///
/// Returns the single token the text forms, or `None` if the text lexes to
/// zero or multiple tokens (a paste failure).
pub fn tokenize_once(text: &str, atoms: &mut AtomTable) -> Option<(TokenKlass, Atom)> {
    let mut scanner = Scanner::new(text, FileId::MAIN, false);
    let first = scanner.next_token(atoms, false);
    if first.klass == TokenKlass::Eof || first.klass == TokenKlass::Unknown {
        return None;
    }
    let second = scanner.next_token(atoms, false);
    if second.klass != TokenKlass::Eof || !scanner.take_issues().is_empty() {
        return None;
    }
    Some((first.klass, first.text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(source: &str) -> Vec<(TokenKlass, String)> {
        let mut atoms = AtomTable::new();
        let mut scanner = Scanner::new(source, FileId::MAIN, false);
        let mut out = Vec::new();
        loop {
            let tok = scanner.next_token(&mut atoms, false);
            if tok.klass == TokenKlass::Eof {
                break;
            }
            out.push((tok.klass, atoms.text(tok.text).to_string()));
        }
        out
    }

    fn kinds(source: &str) -> Vec<TokenKlass> {
        lex_all(source).into_iter().map(|(k, _)| k).collect()
    }

    #[test]
    fn empty_source_is_just_eof() {
        let mut atoms = AtomTable::new();
        let mut scanner = Scanner::new("", FileId::MAIN, false);
        let tok = scanner.next_token(&mut atoms, false);
        assert_eq!(tok.klass, TokenKlass::Eof);
        assert!(tok.spelled_range.is_empty());
    }

    #[test]
    fn identifiers_and_punctuation() {
        assert_eq!(
            kinds("foo = bar;"),
            vec![
                TokenKlass::Identifier,
                TokenKlass::Assign,
                TokenKlass::Identifier,
                TokenKlass::Semicolon,
            ]
        );
    }

    #[test]
    fn keywords_stay_identifiers_at_pp_stage() {
        assert_eq!(kinds("void"), vec![TokenKlass::Identifier]);
    }

    #[test]
    fn compound_punctuators_match_greedily() {
        assert_eq!(kinds("<<="), vec![TokenKlass::LShiftAssign]);
        assert_eq!(kinds("<< ="), vec![TokenKlass::LShift, TokenKlass::Assign]);
        assert_eq!(kinds("##"), vec![TokenKlass::HashHash]);
        assert_eq!(kinds("# #"), vec![TokenKlass::Hash, TokenKlass::Hash]);
        assert_eq!(kinds("^^"), vec![TokenKlass::Xor]);
    }

    #[test]
    fn integer_literal_forms() {
        for src in ["0", "42", "0x1F", "0X1f", "0755", "42u", "0xFFU"] {
            assert_eq!(kinds(src), vec![TokenKlass::IntegerConstant], "{src}");
        }
    }

    #[test]
    fn float_literal_forms() {
        for src in ["1.0", "1.", ".5", "1e5", "1.5e-3", "2.0f", "3.lf", "4.0LF", "1F"] {
            assert_eq!(kinds(src), vec![TokenKlass::FloatConstant], "{src}");
        }
    }

    #[test]
    fn malformed_numbers_are_unknown() {
        let mut atoms = AtomTable::new();
        let mut scanner = Scanner::new("0x 1e+ 1.0q", FileId::MAIN, false);
        for _ in 0..3 {
            let tok = scanner.next_token(&mut atoms, false);
            assert_eq!(tok.klass, TokenKlass::Unknown);
        }
        assert_eq!(scanner.take_issues().len(), 3);
    }

    #[test]
    fn hex_f_digit_is_integer_not_float_suffix() {
        assert_eq!(kinds("0xf"), vec![TokenKlass::IntegerConstant]);
    }

    #[test]
    fn line_comment_runs_to_end_of_line() {
        let toks = lex_all("a // rest of line\nb");
        assert_eq!(toks[0].0, TokenKlass::Identifier);
        assert_eq!(toks[1].0, TokenKlass::Comment);
        assert_eq!(toks[1].1, "// rest of line");
        assert_eq!(toks[2].0, TokenKlass::Identifier);
    }

    #[test]
    fn block_comment_spans_lines() {
        let toks = lex_all("/* a\n b */ x");
        assert_eq!(toks[0].0, TokenKlass::Comment);
        assert_eq!(toks[1].1, "x");
    }

    #[test]
    fn unterminated_block_comment_reports_issue() {
        let mut atoms = AtomTable::new();
        let mut scanner = Scanner::new("/* never closed", FileId::MAIN, false);
        let tok = scanner.next_token(&mut atoms, false);
        assert_eq!(tok.klass, TokenKlass::Comment);
        assert_eq!(scanner.take_issues(), vec!["unterminated block comment"]);
        assert_eq!(scanner.next_token(&mut atoms, false).klass, TokenKlass::Eof);
    }

    #[test]
    fn line_continuation_joins_identifier() {
        let toks = lex_all("ab\\\ncd");
        assert_eq!(toks, vec![(TokenKlass::Identifier, "abcd".to_string())]);
    }

    #[test]
    fn line_continuation_does_not_mark_fresh_line() {
        let mut atoms = AtomTable::new();
        let mut scanner = Scanner::new("a \\\n b", FileId::MAIN, false);
        let a = scanner.next_token(&mut atoms, false);
        let b = scanner.next_token(&mut atoms, false);
        assert!(a.is_first_token_of_line);
        assert!(!b.is_first_token_of_line);
        assert!(b.has_leading_whitespace);
        assert_eq!(b.spelled_range.start.line, 1);
    }

    #[test]
    fn first_token_of_line_flags() {
        let mut atoms = AtomTable::new();
        let mut scanner = Scanner::new("a b\nc", FileId::MAIN, false);
        assert!(scanner.next_token(&mut atoms, false).is_first_token_of_line);
        assert!(!scanner.next_token(&mut atoms, false).is_first_token_of_line);
        assert!(scanner.next_token(&mut atoms, false).is_first_token_of_line);
    }

    #[test]
    fn spelled_ranges_track_lines_and_columns() {
        let mut atoms = AtomTable::new();
        let mut scanner = Scanner::new("ab\n  cd", FileId::MAIN, false);
        let first = scanner.next_token(&mut atoms, false);
        assert_eq!(first.spelled_range.start, TextPosition::new(0, 0));
        assert_eq!(first.spelled_range.end, TextPosition::new(0, 2));
        let second = scanner.next_token(&mut atoms, false);
        assert_eq!(second.spelled_range.start, TextPosition::new(1, 2));
        assert_eq!(second.spelled_range.end, TextPosition::new(1, 4));
    }

    #[test]
    fn non_ascii_identifier_is_unknown() {
        let toks = lex_all("ab\u{00e9}c d");
        assert_eq!(toks[0].0, TokenKlass::Unknown);
        assert_eq!(toks[1].1, "d");
    }

    #[test]
    fn utf16_column_counting() {
        let mut atoms = AtomTable::new();
        // '你' is 3 UTF-8 bytes but 1 UTF-16 unit.
        let source = "// 你x\nv";
        let mut utf8 = Scanner::new(source, FileId::MAIN, false);
        let c8 = utf8.next_token(&mut atoms, false);
        assert_eq!(c8.spelled_range.end.column, 7);

        let mut utf16 = Scanner::new(source, FileId::MAIN, true);
        let c16 = utf16.next_token(&mut atoms, false);
        assert_eq!(c16.spelled_range.end.column, 5);
    }

    #[test]
    fn header_names_only_in_header_mode() {
        let mut atoms = AtomTable::new();
        let mut scanner = Scanner::new("<foo/bar.h> \"baz.h\"", FileId::MAIN, false);
        let angle = scanner.next_token(&mut atoms, true);
        assert_eq!(angle.klass, TokenKlass::AngleString);
        assert_eq!(atoms.text(angle.text), "<foo/bar.h>");
        let quoted = scanner.next_token(&mut atoms, true);
        assert_eq!(quoted.klass, TokenKlass::QuotedString);
        assert_eq!(atoms.text(quoted.text), "\"baz.h\"");

        let mut plain = Scanner::new("\"baz.h\"", FileId::MAIN, false);
        assert_eq!(plain.next_token(&mut atoms, false).klass, TokenKlass::Unknown);
    }

    #[test]
    fn unterminated_header_name_is_unknown_with_issue() {
        let mut atoms = AtomTable::new();
        let mut scanner = Scanner::new("<foo\n", FileId::MAIN, false);
        let tok = scanner.next_token(&mut atoms, true);
        assert_eq!(tok.klass, TokenKlass::Unknown);
        assert_eq!(scanner.take_issues(), vec!["unterminated header name"]);
    }

    #[test]
    fn tokenize_once_accepts_single_tokens() {
        let mut atoms = AtomTable::new();
        let (klass, text) = tokenize_once("foo42", &mut atoms).unwrap();
        assert_eq!(klass, TokenKlass::Identifier);
        assert_eq!(atoms.text(text), "foo42");

        let (klass, _) = tokenize_once("123", &mut atoms).unwrap();
        assert_eq!(klass, TokenKlass::IntegerConstant);
    }

    #[test]
    fn tokenize_once_rejects_multi_token_text() {
        let mut atoms = AtomTable::new();
        assert!(tokenize_once("a b", &mut atoms).is_none());
        assert!(tokenize_once("12ab.", &mut atoms).is_none());
        assert!(tokenize_once("", &mut atoms).is_none());
    }
}

//! Token model for the GLSL front-end.
//!
//! Two token representations flow through the pipeline:
//!
//! - [`PPToken`] - produced by the scanner, consumed by the preprocessor. At
//!   this stage every keyword is still tagged [`TokenKlass::Identifier`].
//! - [`RawSyntaxToken`] - the post-preprocess token appended to the
//!   [`TokenStream`]. Keywords have been classified and every token carries
//!   both its *spelled* location (where its characters live) and its
//!   *expanded* location (where it appears in the main file after macro and
//!   `#include` expansion).
//!
//! Comments never enter the primary token vector; they are collected in a
//! sidecar list, each entry carrying the index of the next non-comment token
//! so editor services can re-attach them.

use glaze_base::{Atom, FileId, SyntaxRange, SyntaxTokenId, TextRange};

/// The closed set of token kinds.
///
/// `DefinedYes`/`DefinedNo` exist only inside `#if`/`#elif` argument streams,
/// where the preprocessor substitutes them for applications of the `defined`
/// operator before macro expansion; they never reach the token stream.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TokenKlass {
    Invalid,
    Unknown,
    Eof,
    Comment,
    /// `#`
    Hash,
    /// `##`
    HashHash,
    /// `<header>` in `#include` position.
    AngleString,
    /// `"header"` in `#include` position.
    QuotedString,
    IntegerConstant,
    FloatConstant,
    Identifier,
    /// Result of `defined X` inside a PP expression: macro is defined.
    DefinedYes,
    /// Result of `defined X` inside a PP expression: macro is not defined.
    DefinedNo,

    // Keywords. In preprocessing these are all Identifier; the preprocessor
    // retags them on emission into the token stream.
    KwVoid,
    KwBool,
    KwInt,
    KwUint,
    KwFloat,
    KwDouble,
    KwTrue,
    KwFalse,
    KwVec2,
    KwVec3,
    KwVec4,
    KwBvec2,
    KwBvec3,
    KwBvec4,
    KwIvec2,
    KwIvec3,
    KwIvec4,
    KwUvec2,
    KwUvec3,
    KwUvec4,
    KwDvec2,
    KwDvec3,
    KwDvec4,
    KwMat2,
    KwMat3,
    KwMat4,
    KwMat2x2,
    KwMat2x3,
    KwMat2x4,
    KwMat3x2,
    KwMat3x3,
    KwMat3x4,
    KwMat4x2,
    KwMat4x3,
    KwMat4x4,
    KwSampler1D,
    KwSampler2D,
    KwSampler3D,
    KwSamplerCube,
    KwSampler1DArray,
    KwSampler2DArray,
    KwSamplerCubeArray,
    KwSampler2DShadow,
    KwSamplerCubeShadow,
    KwIsampler2D,
    KwIsampler3D,
    KwUsampler2D,
    KwUsampler3D,
    KwImage2D,
    KwImage3D,
    KwAtomicUint,
    KwStruct,
    KwIf,
    KwElse,
    KwFor,
    KwWhile,
    KwDo,
    KwSwitch,
    KwCase,
    KwDefault,
    KwBreak,
    KwContinue,
    KwReturn,
    KwDiscard,
    KwConst,
    KwUniform,
    KwBuffer,
    KwShared,
    KwIn,
    KwOut,
    KwInout,
    KwAttribute,
    KwVarying,
    KwCentroid,
    KwSample,
    KwPatch,
    KwFlat,
    KwSmooth,
    KwNoperspective,
    KwInvariant,
    KwPrecise,
    KwCoherent,
    KwVolatile,
    KwRestrict,
    KwReadonly,
    KwWriteonly,
    KwLayout,
    KwPrecision,
    KwHighp,
    KwMediump,
    KwLowp,
    KwSubroutine,

    // Punctuators.
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Semicolon,
    Comma,
    Dot,
    Colon,
    Question,
    /// `=`
    Assign,
    PlusAssign,
    MinusAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    LShiftAssign,
    RShiftAssign,
    AndAssign,
    XorAssign,
    OrAssign,
    Plus,
    Dash,
    Star,
    Slash,
    Percent,
    Increment,
    Decrement,
    /// `&&`
    And,
    /// `||`
    Or,
    /// `^^`
    Xor,
    Bang,
    Tilde,
    Ampersand,
    VerticalBar,
    Caret,
    /// `<`
    LAngle,
    /// `>`
    RAngle,
    LessEq,
    GreaterEq,
    Equal,
    NotEqual,
    LShift,
    RShift,
}

impl TokenKlass {
    pub fn is_keyword(self) -> bool {
        crate::keywords::keyword_text(self).is_some()
    }

    /// Identifier or keyword; the set that can appear in identifier position.
    pub fn is_identifier_like(self) -> bool {
        self == TokenKlass::Identifier || self.is_keyword()
    }

    pub fn is_eof(self) -> bool {
        self == TokenKlass::Eof
    }
}

/// Output of the scanner; input to the preprocessor.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PPToken {
    pub klass: TokenKlass,
    /// File in which the token's characters live.
    pub spelled_file: FileId,
    /// Range the token's characters occupy in `spelled_file`.
    pub spelled_range: TextRange,
    /// Interned token text.
    pub text: Atom,
    /// True if no other token precedes this one on its line. A line ended by
    /// a line continuation does not reset this flag.
    pub is_first_token_of_line: bool,
    /// True if whitespace separates this token from the previous one.
    pub has_leading_whitespace: bool,
}

/// A fully preprocessed token as stored in the token stream.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RawSyntaxToken {
    pub klass: TokenKlass,
    pub spelled_file: FileId,
    /// Where the token is spelled. Zero-width at the use site for tokens
    /// synthesized by macro expansion.
    pub spelled_range: TextRange,
    /// Where the token appears to originate when reading the main file after
    /// preprocessing. Zero-width at the `#include` directive for tokens from
    /// included files and at the macro name for tokens from expansions.
    pub expanded_range: TextRange,
    pub text: Atom,
}

/// A comment extracted from the token stream.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RawComment {
    pub spelled_file: FileId,
    pub spelled_range: TextRange,
    pub text: Atom,
    /// Index of the first non-comment token following this comment.
    pub next_token_index: u32,
}

/// A token reference handed to the parser: stream index plus the fields the
/// parser actually consults.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SyntaxToken {
    pub id: SyntaxTokenId,
    pub klass: TokenKlass,
    pub text: Atom,
}

impl SyntaxToken {
    pub fn invalid(id: SyntaxTokenId) -> SyntaxToken {
        SyntaxToken {
            id,
            klass: TokenKlass::Invalid,
            text: Atom::EMPTY,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.klass != TokenKlass::Invalid
    }

    pub fn is_identifier(&self) -> bool {
        self.klass == TokenKlass::Identifier
    }

    pub fn range(&self) -> SyntaxRange {
        SyntaxRange::single(self.id)
    }
}

/// Ordered storage of post-preprocess tokens plus the comment sidecar.
///
/// Token ids are 32-bit indices into the primary vector; these are the values
/// embedded in AST syntax ranges and diagnostics.
#[derive(Default, Debug)]
pub struct TokenStream {
    tokens: Vec<RawSyntaxToken>,
    comments: Vec<RawComment>,
}

impl TokenStream {
    pub fn new() -> TokenStream {
        TokenStream::default()
    }

    /// Appends a non-EOF token. Comments divert into the sidecar.
    pub fn add_token(&mut self, token: &PPToken, klass: TokenKlass, expanded_range: TextRange) {
        debug_assert!(klass != TokenKlass::Eof);

        if klass == TokenKlass::Comment {
            self.comments.push(RawComment {
                spelled_file: token.spelled_file,
                spelled_range: token.spelled_range,
                text: token.text,
                next_token_index: self.tokens.len() as u32,
            });
        } else {
            self.tokens.push(RawSyntaxToken {
                klass,
                spelled_file: token.spelled_file,
                spelled_range: token.spelled_range,
                expanded_range,
                text: token.text,
            });
        }
    }

    /// Appends the EOF marker ending a translation unit.
    pub fn add_eof(&mut self, token: &PPToken, expanded_range: TextRange) {
        debug_assert!(token.klass == TokenKlass::Eof);
        self.tokens.push(RawSyntaxToken {
            klass: TokenKlass::Eof,
            spelled_file: token.spelled_file,
            spelled_range: token.spelled_range,
            expanded_range,
            text: token.text,
        });
    }

    /// Id the next appended token will receive.
    pub fn next_id(&self) -> SyntaxTokenId {
        SyntaxTokenId(self.tokens.len() as u32)
    }

    pub fn tokens(&self) -> &[RawSyntaxToken] {
        &self.tokens
    }

    pub fn comments(&self) -> &[RawComment] {
        &self.comments
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn export(self) -> (Vec<RawSyntaxToken>, Vec<RawComment>) {
        (self.tokens, self.comments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glaze_base::{AtomTable, TextPosition};

    fn pp_token(klass: TokenKlass, atoms: &mut AtomTable, text: &str) -> PPToken {
        PPToken {
            klass,
            spelled_file: FileId::MAIN,
            spelled_range: TextRange::new(TextPosition::new(0, 0), TextPosition::new(0, 1)),
            text: atoms.atom(text),
            is_first_token_of_line: false,
            has_leading_whitespace: false,
        }
    }

    #[test]
    fn comments_divert_to_sidecar() {
        let mut atoms = AtomTable::new();
        let mut stream = TokenStream::new();

        stream.add_token(
            &pp_token(TokenKlass::Comment, &mut atoms, "// hi"),
            TokenKlass::Comment,
            TextRange::default(),
        );
        stream.add_token(
            &pp_token(TokenKlass::Identifier, &mut atoms, "x"),
            TokenKlass::Identifier,
            TextRange::default(),
        );

        assert_eq!(stream.len(), 1);
        assert_eq!(stream.comments().len(), 1);
        assert_eq!(stream.comments()[0].next_token_index, 0);
    }

    #[test]
    fn comment_after_tokens_points_past_them() {
        let mut atoms = AtomTable::new();
        let mut stream = TokenStream::new();

        stream.add_token(
            &pp_token(TokenKlass::Identifier, &mut atoms, "a"),
            TokenKlass::Identifier,
            TextRange::default(),
        );
        stream.add_token(
            &pp_token(TokenKlass::Comment, &mut atoms, "/* tail */"),
            TokenKlass::Comment,
            TextRange::default(),
        );

        assert_eq!(stream.comments()[0].next_token_index, 1);
    }

    #[test]
    fn next_id_tracks_primary_vector() {
        let mut atoms = AtomTable::new();
        let mut stream = TokenStream::new();
        assert_eq!(stream.next_id(), SyntaxTokenId(0));

        stream.add_token(
            &pp_token(TokenKlass::Identifier, &mut atoms, "a"),
            TokenKlass::Identifier,
            TextRange::default(),
        );
        assert_eq!(stream.next_id(), SyntaxTokenId(1));
    }

    #[test]
    fn keyword_classification_queries() {
        assert!(TokenKlass::KwVoid.is_keyword());
        assert!(!TokenKlass::Identifier.is_keyword());
        assert!(TokenKlass::Identifier.is_identifier_like());
        assert!(TokenKlass::KwUniform.is_identifier_like());
        assert!(!TokenKlass::Semicolon.is_identifier_like());
    }
}

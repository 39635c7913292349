//! Keyword and punctuation tables.
//!
//! Keywords are spelled as identifiers during preprocessing; the preprocessor
//! retags them through [`keyword_klass`] when emitting into the token stream.
//! The scanner matches punctuators longest-first via [`PUNCTUATIONS`].

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use crate::token::TokenKlass;

/// Every GLSL keyword paired with its spelling.
pub static KEYWORDS: &[(TokenKlass, &str)] = &[
    (TokenKlass::KwVoid, "void"),
    (TokenKlass::KwBool, "bool"),
    (TokenKlass::KwInt, "int"),
    (TokenKlass::KwUint, "uint"),
    (TokenKlass::KwFloat, "float"),
    (TokenKlass::KwDouble, "double"),
    (TokenKlass::KwTrue, "true"),
    (TokenKlass::KwFalse, "false"),
    (TokenKlass::KwVec2, "vec2"),
    (TokenKlass::KwVec3, "vec3"),
    (TokenKlass::KwVec4, "vec4"),
    (TokenKlass::KwBvec2, "bvec2"),
    (TokenKlass::KwBvec3, "bvec3"),
    (TokenKlass::KwBvec4, "bvec4"),
    (TokenKlass::KwIvec2, "ivec2"),
    (TokenKlass::KwIvec3, "ivec3"),
    (TokenKlass::KwIvec4, "ivec4"),
    (TokenKlass::KwUvec2, "uvec2"),
    (TokenKlass::KwUvec3, "uvec3"),
    (TokenKlass::KwUvec4, "uvec4"),
    (TokenKlass::KwDvec2, "dvec2"),
    (TokenKlass::KwDvec3, "dvec3"),
    (TokenKlass::KwDvec4, "dvec4"),
    (TokenKlass::KwMat2, "mat2"),
    (TokenKlass::KwMat3, "mat3"),
    (TokenKlass::KwMat4, "mat4"),
    (TokenKlass::KwMat2x2, "mat2x2"),
    (TokenKlass::KwMat2x3, "mat2x3"),
    (TokenKlass::KwMat2x4, "mat2x4"),
    (TokenKlass::KwMat3x2, "mat3x2"),
    (TokenKlass::KwMat3x3, "mat3x3"),
    (TokenKlass::KwMat3x4, "mat3x4"),
    (TokenKlass::KwMat4x2, "mat4x2"),
    (TokenKlass::KwMat4x3, "mat4x3"),
    (TokenKlass::KwMat4x4, "mat4x4"),
    (TokenKlass::KwSampler1D, "sampler1D"),
    (TokenKlass::KwSampler2D, "sampler2D"),
    (TokenKlass::KwSampler3D, "sampler3D"),
    (TokenKlass::KwSamplerCube, "samplerCube"),
    (TokenKlass::KwSampler1DArray, "sampler1DArray"),
    (TokenKlass::KwSampler2DArray, "sampler2DArray"),
    (TokenKlass::KwSamplerCubeArray, "samplerCubeArray"),
    (TokenKlass::KwSampler2DShadow, "sampler2DShadow"),
    (TokenKlass::KwSamplerCubeShadow, "samplerCubeShadow"),
    (TokenKlass::KwIsampler2D, "isampler2D"),
    (TokenKlass::KwIsampler3D, "isampler3D"),
    (TokenKlass::KwUsampler2D, "usampler2D"),
    (TokenKlass::KwUsampler3D, "usampler3D"),
    (TokenKlass::KwImage2D, "image2D"),
    (TokenKlass::KwImage3D, "image3D"),
    (TokenKlass::KwAtomicUint, "atomic_uint"),
    (TokenKlass::KwStruct, "struct"),
    (TokenKlass::KwIf, "if"),
    (TokenKlass::KwElse, "else"),
    (TokenKlass::KwFor, "for"),
    (TokenKlass::KwWhile, "while"),
    (TokenKlass::KwDo, "do"),
    (TokenKlass::KwSwitch, "switch"),
    (TokenKlass::KwCase, "case"),
    (TokenKlass::KwDefault, "default"),
    (TokenKlass::KwBreak, "break"),
    (TokenKlass::KwContinue, "continue"),
    (TokenKlass::KwReturn, "return"),
    (TokenKlass::KwDiscard, "discard"),
    (TokenKlass::KwConst, "const"),
    (TokenKlass::KwUniform, "uniform"),
    (TokenKlass::KwBuffer, "buffer"),
    (TokenKlass::KwShared, "shared"),
    (TokenKlass::KwIn, "in"),
    (TokenKlass::KwOut, "out"),
    (TokenKlass::KwInout, "inout"),
    (TokenKlass::KwAttribute, "attribute"),
    (TokenKlass::KwVarying, "varying"),
    (TokenKlass::KwCentroid, "centroid"),
    (TokenKlass::KwSample, "sample"),
    (TokenKlass::KwPatch, "patch"),
    (TokenKlass::KwFlat, "flat"),
    (TokenKlass::KwSmooth, "smooth"),
    (TokenKlass::KwNoperspective, "noperspective"),
    (TokenKlass::KwInvariant, "invariant"),
    (TokenKlass::KwPrecise, "precise"),
    (TokenKlass::KwCoherent, "coherent"),
    (TokenKlass::KwVolatile, "volatile"),
    (TokenKlass::KwRestrict, "restrict"),
    (TokenKlass::KwReadonly, "readonly"),
    (TokenKlass::KwWriteonly, "writeonly"),
    (TokenKlass::KwLayout, "layout"),
    (TokenKlass::KwPrecision, "precision"),
    (TokenKlass::KwHighp, "highp"),
    (TokenKlass::KwMediump, "mediump"),
    (TokenKlass::KwLowp, "lowp"),
    (TokenKlass::KwSubroutine, "subroutine"),
];

/// Every punctuator paired with its spelling, longest spellings first so the
/// scanner can match greedily.
pub static PUNCTUATIONS: &[(TokenKlass, &str)] = &[
    (TokenKlass::LShiftAssign, "<<="),
    (TokenKlass::RShiftAssign, ">>="),
    (TokenKlass::Increment, "++"),
    (TokenKlass::Decrement, "--"),
    (TokenKlass::And, "&&"),
    (TokenKlass::Or, "||"),
    (TokenKlass::Xor, "^^"),
    (TokenKlass::LessEq, "<="),
    (TokenKlass::GreaterEq, ">="),
    (TokenKlass::Equal, "=="),
    (TokenKlass::NotEqual, "!="),
    (TokenKlass::LShift, "<<"),
    (TokenKlass::RShift, ">>"),
    (TokenKlass::PlusAssign, "+="),
    (TokenKlass::MinusAssign, "-="),
    (TokenKlass::MulAssign, "*="),
    (TokenKlass::DivAssign, "/="),
    (TokenKlass::ModAssign, "%="),
    (TokenKlass::AndAssign, "&="),
    (TokenKlass::XorAssign, "^="),
    (TokenKlass::OrAssign, "|="),
    (TokenKlass::HashHash, "##"),
    (TokenKlass::LParen, "("),
    (TokenKlass::RParen, ")"),
    (TokenKlass::LBracket, "["),
    (TokenKlass::RBracket, "]"),
    (TokenKlass::LBrace, "{"),
    (TokenKlass::RBrace, "}"),
    (TokenKlass::Semicolon, ";"),
    (TokenKlass::Comma, ","),
    (TokenKlass::Dot, "."),
    (TokenKlass::Colon, ":"),
    (TokenKlass::Question, "?"),
    (TokenKlass::Assign, "="),
    (TokenKlass::Plus, "+"),
    (TokenKlass::Dash, "-"),
    (TokenKlass::Star, "*"),
    (TokenKlass::Slash, "/"),
    (TokenKlass::Percent, "%"),
    (TokenKlass::Bang, "!"),
    (TokenKlass::Tilde, "~"),
    (TokenKlass::Ampersand, "&"),
    (TokenKlass::VerticalBar, "|"),
    (TokenKlass::Caret, "^"),
    (TokenKlass::LAngle, "<"),
    (TokenKlass::RAngle, ">"),
    (TokenKlass::Hash, "#"),
];

static KEYWORD_LOOKUP: Lazy<FxHashMap<&'static str, TokenKlass>> =
    Lazy::new(|| KEYWORDS.iter().map(|&(klass, text)| (text, klass)).collect());

static KEYWORD_TEXT: Lazy<FxHashMap<TokenKlass, &'static str>> =
    Lazy::new(|| KEYWORDS.iter().map(|&(klass, text)| (klass, text)).collect());

/// Returns the keyword klass for `text`, or `None` for ordinary identifiers.
pub fn keyword_klass(text: &str) -> Option<TokenKlass> {
    KEYWORD_LOOKUP.get(text).copied()
}

/// Returns the spelling of a keyword klass, or `None` for non-keywords.
pub fn keyword_text(klass: TokenKlass) -> Option<&'static str> {
    KEYWORD_TEXT.get(&klass).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_lookup_round_trips() {
        for &(klass, text) in KEYWORDS {
            assert_eq!(keyword_klass(text), Some(klass));
            assert_eq!(keyword_text(klass), Some(text));
        }
    }

    #[test]
    fn non_keyword_misses() {
        assert_eq!(keyword_klass("myVariable"), None);
        assert_eq!(keyword_klass("Void"), None);
        assert_eq!(keyword_text(TokenKlass::Identifier), None);
    }

    #[test]
    fn punctuation_spellings_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for &(_, text) in PUNCTUATIONS {
            assert!(seen.insert(text), "duplicate punctuator {text}");
        }
    }

    #[test]
    fn punctuations_sorted_for_greedy_matching() {
        // No spelling may be preceded by one of its own prefixes.
        for (i, &(_, text)) in PUNCTUATIONS.iter().enumerate() {
            for &(_, earlier) in &PUNCTUATIONS[..i] {
                assert!(
                    !text.starts_with(earlier),
                    "{earlier} listed before longer {text}"
                );
            }
        }
    }
}

//! # glaze-language
//!
//! GLSL preprocessing, parsing and typed AST construction.
//!
//! This crate is the front-end core: source text goes in, a token stream
//! with dual position tracking and a position-annotated, type-attributed AST
//! come out. Everything is built for tooling - the pipeline never aborts on
//! ill-formed input, recovering locally and reporting through the
//! diagnostic sink instead.
//!
//! ## Pipeline
//!
//! ```text
//! SourceManager -> Scanner -> PpStateMachine -> TokenStream -> Parser -> AST
//!                               |    |
//!                        MacroTable  PpCallback
//! ```
//!
//! - [`scanner::Scanner`] turns bytes into PP tokens with spelled ranges.
//! - [`preprocessor::PpStateMachine`] interprets directives, expands macros
//!   and emits classified tokens carrying both spelled and expanded ranges.
//! - [`parser::Parser`] is a recursive-descent parser with bracket-balanced
//!   error recovery, producing AST nodes through [`builder::AstBuilder`],
//!   which attributes types, inserts implicit casts and folds constants.
//!
//! The compile crate wires these stages together per invocation.

pub mod ast;
pub mod builder;
pub mod callback;
pub mod config;
pub mod consts;
pub mod keywords;
pub mod macros;
pub mod parser;
pub mod preprocessor;
pub mod scanner;
pub mod source_manager;
pub mod symbol;
pub mod token;
pub mod types;

pub use ast::{AstContext, AstTranslationUnit, TranslationUnitKind};
pub use builder::AstBuilder;
pub use callback::{NullCallback, PpCallback};
pub use config::{
    CompilerConfig, ExtensionBehavior, ExtensionId, GlslProfile, GlslVersion, LanguageConfig,
    ShaderStage,
};
pub use consts::{ConstValue, ScalarKind};
pub use macros::MacroTable;
pub use parser::Parser;
pub use preprocessor::{PpContext, PpStateMachine};
pub use scanner::Scanner;
pub use source_manager::{SourceError, SourceManager};
pub use symbol::SymbolTable;
pub use token::{PPToken, RawComment, RawSyntaxToken, SyntaxToken, TokenKlass, TokenStream};
pub use types::{TypeContext, TypeId};

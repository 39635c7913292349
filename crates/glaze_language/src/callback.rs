//! Host hooks into preprocessing.
//!
//! Editor services and build tools observe preprocessing through this trait:
//! every directive, macro expansion and `defined` query reports here as it is
//! handled. All methods default to no-ops, so hosts implement only what they
//! need.

use std::path::Path;

use glaze_base::{FileId, TextRange};

use crate::config::{ExtensionBehavior, ExtensionId, GlslProfile, GlslVersion};
use crate::token::PPToken;

#[allow(unused_variables)]
pub trait PpCallback {
    /// A macro use is about to expand.
    fn on_macro_expansion(&mut self, macro_use: &PPToken) {}

    /// An `#include` directive resolved (or failed to resolve) its header.
    fn on_include_directive(&mut self, header_name: &PPToken, resolved_path: Option<&Path>) {}

    fn on_enter_included_file(&mut self, file: FileId) {}

    fn on_exit_included_file(&mut self) {}

    fn on_define_directive(&mut self, name: &PPToken, params: &[PPToken], body: &[PPToken], is_function_like: bool) {}

    fn on_undef_directive(&mut self, name: &PPToken) {}

    fn on_if_directive(&mut self, evaluated_to: bool) {}

    fn on_elif_directive(&mut self, evaluated_to: bool) {}

    fn on_ifdef_directive(&mut self, name: &PPToken, is_ndef: bool) {}

    fn on_else_directive(&mut self) {}

    fn on_endif_directive(&mut self) {}

    fn on_version_directive(&mut self, file: FileId, range: TextRange, version: GlslVersion, profile: GlslProfile) {}

    fn on_extension_directive(
        &mut self,
        file: FileId,
        range: TextRange,
        extension: ExtensionId,
        behavior: ExtensionBehavior,
    ) {
    }

    /// A `#pragma` directive with all of its argument tokens.
    fn on_pragma_directive(&mut self, args: &[PPToken]) {}

    /// A `defined X` / `defined(X)` query inside `#if`/`#elif`.
    fn on_defined_operator(&mut self, name: &PPToken, is_defined: bool) {}
}

/// Callback that ignores every event; useful as a default.
pub struct NullCallback;

impl PpCallback for NullCallback {}

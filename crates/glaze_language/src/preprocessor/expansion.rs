//! Streaming macro expansion.
//!
//! Tokens are pushed in one at a time with [`MacroExpansionProcessor::feed`];
//! produced tokens accumulate in the caller's output buffer. The processor
//! has two modes:
//!
//! - **No context** - identifiers are checked against the macro table. An
//!   enabled object-like macro expands immediately; a function-like macro
//!   name is *withheld* until the next token shows whether a `(` follows. The
//!   predefined `__LINE__` / `__FILE__` / `__VERSION__` macros substitute
//!   here directly.
//! - **Argument collection** - after `name (`, tokens are collected into
//!   arguments, splitting on commas at depth 1 and balancing nested
//!   parentheses. The matching `)` triggers substitution.
//!
//! Substitution walks the replacement list: `##` pastes operand text and
//! retokenizes it once, parameter names are replaced by their pre-expanded
//! argument tokens, `#param` stringification is not part of GLSL and is
//! dropped with a diagnostic. The substituted stream is rescanned through a
//! fresh nested processor while the macro itself is disabled, which bounds
//! recursion.
//!
//! Each produced token records whether it came out of an expansion, and for
//! the outermost expansion, the use-site position; the preprocessor derives
//! expanded ranges from that marker.

use glaze_base::{Atom, AtomTable, TextPosition, TextRange};

use crate::callback::PpCallback;
use crate::macros::{MacroDefinition, MacroTable};
use crate::scanner::tokenize_once;
use crate::token::{PPToken, TokenKlass};

/// Shared tables and hooks the processor works against.
pub struct ExpansionEnv<'e, 'cb> {
    pub atoms: &'e mut AtomTable,
    pub macros: &'e mut MacroTable,
    /// Numeric GLSL version substituted for `__VERSION__`.
    pub version_number: u32,
    /// Problems found during expansion; drained by the preprocessor.
    pub issues: &'e mut Vec<String>,
    pub callback: Option<&'cb mut dyn PpCallback>,
}

impl ExpansionEnv<'_, '_> {
    fn notify_expansion(&mut self, macro_use: &PPToken) {
        if let Some(callback) = self.callback.as_deref_mut() {
            callback.on_macro_expansion(macro_use);
        }
    }
}

/// A token produced by expansion, tagged with its provenance.
#[derive(Clone, Copy, Debug)]
pub struct ExpandedToken {
    pub token: PPToken,
    /// `Some(start of the outermost macro use)` for tokens that came out of
    /// an expansion; `None` for directly spelled tokens.
    pub expansion_site: Option<TextPosition>,
}

/// Info about one collected invocation argument.
#[derive(Clone, Copy, Default, Debug)]
struct ArgInfo {
    /// Range of this argument's pre-expanded tokens in `expanded_args`.
    expanded_start: usize,
    expanded_end: usize,
    /// Number of raw (unexpanded) tokens spelled in the argument.
    raw_count: usize,
    /// The single raw token, when `raw_count == 1`; used by `##`.
    paste_token: Option<PPToken>,
}

/// One level of the rescan pipeline. See the module docs.
#[derive(Default)]
pub struct MacroExpansionProcessor {
    /// Raw tokens held back while an invocation is still undecided or being
    /// collected: the macro name, then `(`, commas and argument tokens.
    withheld: Vec<PPToken>,
    /// The withheld function-like macro's name.
    pending_macro: Option<Atom>,
    /// Parenthesis balance inside the argument list; 0 before `(` is seen.
    paren_depth: u32,
    args: Vec<ArgInfo>,
    /// Pre-expanded argument tokens, indexed by `ArgInfo` ranges.
    expanded_args: Vec<PPToken>,
    /// Nested processor pre-expanding argument tokens.
    arg_processor: Option<Box<MacroExpansionProcessor>>,
}

impl MacroExpansionProcessor {
    pub fn new() -> MacroExpansionProcessor {
        MacroExpansionProcessor::default()
    }

    pub fn feed(&mut self, token: PPToken, env: &mut ExpansionEnv<'_, '_>, out: &mut Vec<ExpandedToken>) {
        debug_assert!(token.klass != TokenKlass::Eof);
        if self.pending_macro.is_some() {
            self.feed_with_context(token, env, out);
        } else {
            self.feed_no_context(token, env, out);
        }
    }

    /// Flushes a withheld invocation. An argument list left open at this
    /// point is unterminated and is reported.
    pub fn finalize(&mut self, env: &mut ExpansionEnv<'_, '_>, out: &mut Vec<ExpandedToken>) {
        if self.pending_macro.is_some() {
            if self.paren_depth > 0 {
                env.issues.push("unterminated macro argument list".to_string());
            }
            self.revoke(out);
        }
    }

    fn yield_token(out: &mut Vec<ExpandedToken>, token: PPToken) {
        out.push(ExpandedToken {
            token,
            expansion_site: None,
        });
    }

    /// Abandons the pending invocation, emitting everything withheld as
    /// plain tokens.
    fn revoke(&mut self, out: &mut Vec<ExpandedToken>) {
        for token in self.withheld.drain(..) {
            Self::yield_token(out, token);
        }
        self.pending_macro = None;
        self.paren_depth = 0;
        self.args.clear();
        self.expanded_args.clear();
        self.arg_processor = None;
    }

    fn feed_no_context(
        &mut self,
        token: PPToken,
        env: &mut ExpansionEnv<'_, '_>,
        out: &mut Vec<ExpandedToken>,
    ) {
        debug_assert!(self.withheld.is_empty() && self.paren_depth == 0);

        if token.klass != TokenKlass::Identifier {
            Self::yield_token(out, token);
            return;
        }

        let text = env.atoms.text(token.text);
        let builtin = match text {
            "__LINE__" => Some((token.spelled_range.start.line + 1).to_string()),
            "__FILE__" => Some(token.spelled_file.raw().to_string()),
            "__VERSION__" => Some(env.version_number.to_string()),
            _ => None,
        };
        if let Some(value) = builtin {
            env.notify_expansion(&token);
            let substituted = PPToken {
                klass: TokenKlass::IntegerConstant,
                spelled_file: token.spelled_file,
                spelled_range: TextRange::empty_at(token.spelled_range.start),
                text: env.atoms.atom(&value),
                is_first_token_of_line: false,
                has_leading_whitespace: false,
            };
            out.push(ExpandedToken {
                token: substituted,
                expansion_site: Some(token.spelled_range.start),
            });
            return;
        }

        match env.macros.find_enabled(token.text) {
            Some(def) if def.is_function_like() => {
                self.pending_macro = Some(token.text);
                self.withheld.push(token);
            }
            Some(def) => {
                let def = def.clone();
                self.expand(token, &def, &[], &[], env, out);
            }
            None => Self::yield_token(out, token),
        }
    }

    fn feed_with_context(
        &mut self,
        token: PPToken,
        env: &mut ExpansionEnv<'_, '_>,
        out: &mut Vec<ExpandedToken>,
    ) {
        if self.paren_depth == 0 {
            // Only the macro name is withheld; a `(` decides invocation.
            if token.klass == TokenKlass::LParen {
                self.withheld.push(token);
                self.paren_depth = 1;
                self.start_argument();
                self.arg_processor = Some(Box::<MacroExpansionProcessor>::default());
            } else {
                self.revoke(out);
                self.feed_no_context(token, env, out);
            }
            return;
        }

        match token.klass {
            TokenKlass::LParen => {
                self.paren_depth += 1;
                self.collect_argument_token(token, env);
            }
            TokenKlass::RParen => {
                self.paren_depth -= 1;
                if self.paren_depth == 0 {
                    self.finish_invocation(token, env, out);
                } else {
                    self.collect_argument_token(token, env);
                }
            }
            TokenKlass::Comma if self.paren_depth == 1 => {
                self.finish_argument(env);
                self.start_argument();
                self.withheld.push(token);
            }
            _ => self.collect_argument_token(token, env),
        }
    }

    fn start_argument(&mut self) {
        let start = self.expanded_args.len();
        self.args.push(ArgInfo {
            expanded_start: start,
            expanded_end: start,
            raw_count: 0,
            paste_token: None,
        });
    }

    fn collect_argument_token(&mut self, token: PPToken, env: &mut ExpansionEnv<'_, '_>) {
        self.withheld.push(token);
        let arg = self.args.last_mut().unwrap();
        if arg.raw_count == 0 {
            arg.paste_token = Some(token);
        }
        arg.raw_count += 1;

        let mut buffer = Vec::new();
        self.arg_processor
            .as_mut()
            .unwrap()
            .feed(token, env, &mut buffer);
        self.expanded_args.extend(buffer.into_iter().map(|t| t.token));
        self.args.last_mut().unwrap().expanded_end = self.expanded_args.len();
    }

    fn finish_argument(&mut self, env: &mut ExpansionEnv<'_, '_>) {
        let mut buffer = Vec::new();
        self.arg_processor
            .as_mut()
            .unwrap()
            .finalize(env, &mut buffer);
        self.expanded_args.extend(buffer.into_iter().map(|t| t.token));
        self.args.last_mut().unwrap().expanded_end = self.expanded_args.len();
        self.arg_processor = Some(Box::<MacroExpansionProcessor>::default());
    }

    fn finish_invocation(
        &mut self,
        _rparen: PPToken,
        env: &mut ExpansionEnv<'_, '_>,
        out: &mut Vec<ExpandedToken>,
    ) {
        self.finish_argument(env);

        let name = self.pending_macro.take().unwrap();
        let def = env.macros.find(name).cloned();
        let Some(def) = def else {
            self.revoke(out);
            return;
        };

        let params = def.params.as_deref().unwrap_or(&[]);
        // `M()` with no parameters collects one empty argument; drop it so
        // the arity check sees zero.
        if params.is_empty() && self.args.len() == 1 && self.args[0].raw_count == 0 {
            self.args.clear();
        }

        if self.args.len() != params.len() {
            env.issues.push(format!(
                "macro '{}' invoked with {} arguments, expected {}",
                env.atoms.text(def.name),
                self.args.len(),
                params.len()
            ));
            self.revoke(out);
            return;
        }

        let name_token = self.withheld[0];
        let args = std::mem::take(&mut self.args);
        let expanded_args = std::mem::take(&mut self.expanded_args);
        self.withheld.clear();
        self.paren_depth = 0;
        self.arg_processor = None;

        self.expand(name_token, &def, &args, &expanded_args, env, out);
    }

    /// Substitutes the replacement list of `def` and rescans the result.
    fn expand(
        &mut self,
        name_token: PPToken,
        def: &MacroDefinition,
        args: &[ArgInfo],
        expanded_args: &[PPToken],
        env: &mut ExpansionEnv<'_, '_>,
        out: &mut Vec<ExpandedToken>,
    ) {
        env.notify_expansion(&name_token);
        env.macros.disable(def.name);

        let params = def.params.as_deref().unwrap_or(&[]);
        let param_index =
            |text: Atom| params.iter().position(|param| param.text == text);

        let use_site = name_token.spelled_range.start;
        let rewrite = |tok: &PPToken| PPToken {
            klass: tok.klass,
            spelled_file: name_token.spelled_file,
            spelled_range: TextRange::empty_at(use_site),
            text: tok.text,
            is_first_token_of_line: false,
            has_leading_whitespace: false,
        };

        let mut nested = MacroExpansionProcessor::new();
        let mut nested_out = Vec::new();

        let replacement = &def.replacement;
        let mut i = 0;
        while i < replacement.len() {
            let tok = &replacement[i];

            // `#param` stringification has no meaning in GLSL.
            if tok.klass == TokenKlass::Hash
                && replacement.get(i + 1).is_some_and(|t| t.klass == TokenKlass::Identifier)
            {
                env.issues
                    .push("'#' stringification is not supported".to_string());
                i += 2;
                continue;
            }

            // Token pasting: a ## b ## c ...
            if replacement.get(i + 1).is_some_and(|t| t.klass == TokenKlass::HashHash) {
                let mut failed = false;
                let mut pasted = String::new();
                let mut push_operand = |tok: &PPToken, env: &ExpansionEnv<'_, '_>, failed: &mut bool| {
                    if tok.klass == TokenKlass::Identifier {
                        if let Some(idx) = param_index(tok.text) {
                            match args[idx].raw_count {
                                0 => {}
                                1 => pasted.push_str(
                                    env.atoms.text(args[idx].paste_token.unwrap().text),
                                ),
                                _ => *failed = true,
                            }
                            return;
                        }
                    }
                    pasted.push_str(env.atoms.text(tok.text));
                };

                push_operand(tok, env, &mut failed);
                i += 1;
                while replacement.get(i).is_some_and(|t| t.klass == TokenKlass::HashHash) {
                    i += 1;
                    match replacement.get(i) {
                        Some(operand) => {
                            push_operand(operand, env, &mut failed);
                            i += 1;
                        }
                        None => failed = true,
                    }
                }
                match (failed, tokenize_once(&pasted, env.atoms)) {
                    (false, Some((klass, text))) => {
                        let mut pasted_tok = rewrite(tok);
                        pasted_tok.klass = klass;
                        pasted_tok.text = text;
                        nested.feed(pasted_tok, env, &mut nested_out);
                    }
                    _ => env
                        .issues
                        .push(format!("token pasting produced invalid token '{pasted}'")),
                }
                continue;
            }

            // Parameter substitution with the pre-expanded argument.
            if tok.klass == TokenKlass::Identifier {
                if let Some(idx) = param_index(tok.text) {
                    let arg = &args[idx];
                    for arg_tok in &expanded_args[arg.expanded_start..arg.expanded_end] {
                        nested.feed(*arg_tok, env, &mut nested_out);
                    }
                    i += 1;
                    continue;
                }
            }

            nested.feed(rewrite(tok), env, &mut nested_out);
            i += 1;
        }

        nested.finalize(env, &mut nested_out);
        env.macros.enable(def.name);

        // The outermost expansion claims every produced token.
        out.extend(nested_out.into_iter().map(|mut expanded| {
            expanded.expansion_site = Some(use_site);
            expanded
        }));
    }
}

//! Declaration parsing: qualifiers, type specifiers, declarators, structs,
//! interface blocks, functions.

use glaze_base::SyntaxTokenId;

use crate::ast::{DeclId, Declarator, ExprId, LayoutItem, QualTypeId, QualifierSet};
use crate::token::TokenKlass;

use super::{Parser, RecoveryMode};

impl<'c> Parser<'c> {
    /// One declaration at file or statement scope.
    pub(crate) fn parse_declaration(&mut self, at_global: bool) -> DeclId {
        let start = self.current_id();

        if self.try_consume(TokenKlass::Semicolon) {
            return self.builder.empty_decl(self.range_from(start));
        }
        if self.at(TokenKlass::KwPrecision) {
            return self.parse_precision_decl();
        }

        let quals = self.parse_type_qualifier_seq();
        if self.in_recovery() {
            return self.builder.error_decl(self.range_from(start));
        }

        // `layout(...) in;` and friends: qualifiers with no declaration.
        if self.try_consume(TokenKlass::Semicolon) {
            let qual_type = self
                .builder
                .qual_type(self.range_from(start), quals, None, None, Vec::new());
            return self
                .builder
                .variable_decl(self.range_from(start), qual_type, Vec::new());
        }

        // `uniform Block { ... } instance;`
        if at_global
            && self.at(TokenKlass::Identifier)
            && self.at_ahead(TokenKlass::LBrace, 1)
        {
            return self.parse_interface_block(start, quals);
        }

        let qual_type = self.parse_type_spec(quals);
        if self.in_recovery() {
            return self.builder.error_decl(self.range_from(start));
        }
        self.parse_declaration_with_type_spec(start, qual_type)
    }

    /// The rest of a declaration once its type specifier is known: a
    /// function, a declarator list, or a bare `type;`.
    pub(crate) fn parse_declaration_with_type_spec(
        &mut self,
        start: SyntaxTokenId,
        qual_type: QualTypeId,
    ) -> DeclId {
        if self.try_consume(TokenKlass::Semicolon) {
            // A bare type spec, e.g. `struct S { ... };`.
            return self
                .builder
                .variable_decl(self.range_from(start), qual_type, Vec::new());
        }

        if self.at(TokenKlass::Identifier) {
            if self.at_ahead(TokenKlass::LParen, 1) {
                return self.parse_function_tail(start, qual_type);
            }

            let base = self.builder.ast.qual_type(qual_type).resolved;
            let declarators = self.parse_declarator_list(base, true);
            if self.in_parsing() {
                self.parse_or_infer_semicolon();
            }
            return self
                .builder
                .variable_decl(self.range_from(start), qual_type, declarators);
        }

        self.report_error("expected a declarator name");
        self.enter_recovery();
        self.builder.error_decl(self.range_from(start))
    }

    /// `[qualifier]...` including `layout(...)` groups.
    pub(crate) fn parse_type_qualifier_seq(&mut self) -> QualifierSet {
        let mut quals = QualifierSet::new();
        loop {
            let klass = self.peek().klass;
            if klass == TokenKlass::KwLayout {
                self.parse_layout_qualifier(&mut quals);
                if self.in_recovery() {
                    return quals;
                }
                continue;
            }
            match QualifierSet::bit_for(klass) {
                Some(bit) => {
                    quals.add(bit);
                    self.consume();
                }
                None => return quals,
            }
        }
    }

    /// `layout ( item [, item]... )` where an item is `name` or
    /// `name = assignment_expr`. A bare `layout` with no parentheses is
    /// accepted.
    fn parse_layout_qualifier(&mut self, quals: &mut QualifierSet) {
        debug_assert!(self.at(TokenKlass::KwLayout));
        self.consume();

        if !self.at(TokenKlass::LParen) {
            return;
        }
        self.consume();
        let paren_depth = self.paren_depth;

        if self.try_consume(TokenKlass::RParen) {
            return;
        }

        loop {
            let token = self.current_token();
            if token.klass.is_identifier_like() {
                self.consume();
                let value = if self.try_consume(TokenKlass::Assign) {
                    Some(self.parse_assignment_expr())
                } else {
                    None
                };
                quals.layout.push(LayoutItem {
                    name: token.text,
                    value,
                });
            } else {
                self.report_error("expected a layout qualifier name");
                self.enter_recovery();
            }

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
    }

    /// A type specifier: an inline struct definition, a built-in type
    /// keyword, or a (struct) type name - optionally with an array suffix.
    pub(crate) fn parse_type_spec(&mut self, quals: QualifierSet) -> QualTypeId {
        let start = self.current_id();

        if self.at(TokenKlass::KwStruct) {
            let struct_decl = self.parse_struct_definition();
            let array = self.parse_optional_array_spec();
            return self
                .builder
                .qual_type(self.range_from(start), quals, Some(struct_decl), None, array);
        }

        let token = self.current_token();
        let is_type = token.klass == TokenKlass::Identifier
            || self.builder.types.builtin(token.klass).is_some();
        if is_type {
            self.consume();
            let array = self.parse_optional_array_spec();
            return self.builder.qual_type(
                self.range_from(start),
                quals,
                None,
                Some((token.id, token.klass, token.text)),
                array,
            );
        }

        self.report_error("expected a type specifier");
        self.enter_recovery();
        self.builder
            .qual_type(self.range_from(start), quals, None, None, Vec::new())
    }

    /// `struct [name] { field... }`.
    fn parse_struct_definition(&mut self) -> DeclId {
        debug_assert!(self.at(TokenKlass::KwStruct));
        let start = self.current_id();
        self.consume();

        let name = if self.at(TokenKlass::Identifier) {
            let token = self.current_token();
            self.consume();
            Some(token)
        } else {
            None
        };

        if !self.at(TokenKlass::LBrace) {
            self.report_error("expected '{' in struct definition");
            self.enter_recovery();
            return self.builder.struct_decl(self.range_from(start), name, Vec::new());
        }
        self.consume();
        let brace_depth = self.brace_depth;

        let fields = self.parse_field_decl_seq(brace_depth, false);

        if !(self.at(TokenKlass::RBrace) && self.brace_depth == brace_depth) {
            self.report_error("expected '}'");
        }
        self.try_consume(TokenKlass::RBrace);

        self.builder.struct_decl(self.range_from(start), name, fields)
    }

    /// Member declarations up to the `}` at `brace_depth`.
    fn parse_field_decl_seq(&mut self, brace_depth: usize, in_block: bool) -> Vec<DeclId> {
        let mut fields = Vec::new();
        while !self.eof() {
            if self.brace_depth < brace_depth
                || (self.at(TokenKlass::RBrace) && self.brace_depth == brace_depth)
            {
                break;
            }

            let before = self.cursor;
            fields.push(self.parse_field_decl(in_block));
            if self.in_recovery() {
                self.recover_from_error(RecoveryMode::Semi);
                self.try_consume(TokenKlass::Semicolon);
                self.exit_recovery();
            }
            if self.cursor == before {
                self.consume();
            }
        }
        fields
    }

    /// One `qual_seq type_spec declarator_list_no_init ;` member.
    fn parse_field_decl(&mut self, in_block: bool) -> DeclId {
        let start = self.current_id();

        let quals = self.parse_type_qualifier_seq();
        let qual_type = self.parse_type_spec(quals);
        if self.in_recovery() {
            return self
                .builder
                .struct_field_decl(self.range_from(start), qual_type, Vec::new(), in_block);
        }

        let base = self.builder.ast.qual_type(qual_type).resolved;
        let declarators = self.parse_declarator_list(base, false);
        if self.in_parsing() {
            self.parse_or_infer_semicolon();
        }
        self.builder
            .struct_field_decl(self.range_from(start), qual_type, declarators, in_block)
    }

    /// `declarator [, declarator]...`.
    fn parse_declarator_list(&mut self, base: crate::types::TypeId, allow_init: bool) -> Vec<Declarator> {
        let mut declarators = Vec::new();
        loop {
            if !self.at(TokenKlass::Identifier) {
                self.report_error("expected a declarator name");
                self.enter_recovery();
                break;
            }
            declarators.push(self.parse_declarator(base, allow_init));
            if self.in_recovery() {
                break;
            }
            if !self.try_consume(TokenKlass::Comma) {
                break;
            }
        }
        declarators
    }

    /// `name [array_spec] ['=' initializer]`.
    fn parse_declarator(&mut self, base: crate::types::TypeId, allow_init: bool) -> Declarator {
        debug_assert!(self.at(TokenKlass::Identifier));
        let token = self.current_token();
        self.consume();

        let array = self.parse_optional_array_spec();
        let declarator = Declarator {
            name: token.text,
            name_token: token.id,
            array,
            init: None,
            resolved: self.builder.types.error_type(),
        };
        let mut declarator = self.builder.finish_declarator(base, declarator);

        if allow_init && self.try_consume(TokenKlass::Assign) {
            let init = self.parse_initializer(declarator.resolved);
            declarator.init = Some(self.builder.check_initializer(declarator.resolved, init));
        }
        declarator
    }

    /// `('[' [assignment_expr] ']')...`; empty when no `[` follows.
    pub(crate) fn parse_optional_array_spec(&mut self) -> Vec<Option<ExprId>> {
        let mut dims = Vec::new();
        while self.in_parsing() && self.at(TokenKlass::LBracket) {
            self.consume();
            let bracket_depth = self.bracket_depth;

            if self.try_consume(TokenKlass::RBracket) {
                dims.push(None);
                continue;
            }

            let size = self.parse_assignment_expr();
            self.parse_closing_bracket(bracket_depth);
            dims.push(Some(size));
        }
        dims
    }

    /// An initializer: a braced list or an assignment expression.
    fn parse_initializer(&mut self, target: crate::types::TypeId) -> ExprId {
        if self.at(TokenKlass::LBrace) {
            self.parse_initializer_list(Some(target))
        } else {
            self.parse_assignment_expr()
        }
    }

    /// `{ [initializer {',' initializer} [',']] }`.
    fn parse_initializer_list(&mut self, target: Option<crate::types::TypeId>) -> ExprId {
        debug_assert!(self.at(TokenKlass::LBrace));
        let start = self.current_id();
        self.consume();
        let brace_depth = self.brace_depth;

        let mut items = Vec::new();
        if !self.at(TokenKlass::RBrace) {
            loop {
                let item = if self.at(TokenKlass::LBrace) {
                    self.parse_initializer_list(None)
                } else {
                    self.parse_assignment_expr()
                };
                items.push(item);

                if self.in_recovery() {
                    self.recover_from_error(RecoveryMode::IListBrace(brace_depth));
                    break;
                }

                if !self.try_consume(TokenKlass::Comma) {
                    break;
                }
                // Trailing comma.
                if self.at(TokenKlass::RBrace) {
                    break;
                }
            }
        }

        if self.at(TokenKlass::RBrace) && self.brace_depth == brace_depth {
            self.consume();
            if self.in_recovery() {
                self.exit_recovery();
            }
        } else if self.in_parsing() {
            self.report_error("expected '}'");
            self.enter_recovery();
            self.recover_from_error(RecoveryMode::IListBrace(brace_depth));
            if self.at(TokenKlass::RBrace) && self.brace_depth == brace_depth {
                self.consume();
                self.exit_recovery();
            }
        }

        self.builder
            .initializer_list_expr(self.range_from(start), items, target)
    }

    /// `name ( params ) (';' | compound_stmt)` with the return type already
    /// parsed.
    fn parse_function_tail(&mut self, start: SyntaxTokenId, return_type: QualTypeId) -> DeclId {
        debug_assert!(self.at(TokenKlass::Identifier));
        let name = self.current_token();
        self.consume();

        self.builder.enter_function_scope();
        let params = self.parse_function_param_list();
        let decl = self
            .builder
            .function_decl(self.range_from(start), return_type, name, params);

        if self.try_consume(TokenKlass::Semicolon) {
            // Prototype only; the `;` resynchronizes whatever the parameter
            // list left behind.
            if self.in_recovery() {
                self.exit_recovery();
            }
            self.builder.leave_function_scope();
            self.builder.set_decl_range(decl, self.range_from(start));
            return decl;
        }

        if self.in_parsing() && self.at(TokenKlass::LBrace) {
            let body = self.parse_compound_stmt();
            self.builder
                .attach_function_body(decl, body, self.range_from(start));
            self.builder.leave_function_scope();
            return decl;
        }

        if self.in_parsing() {
            self.report_error("expected ';' or a function body");
            self.enter_recovery();
        }
        self.builder.leave_function_scope();
        self.builder.set_decl_range(decl, self.range_from(start));
        decl
    }

    /// `( ')' | 'void' ')' | param [, param]... ')'`.
    fn parse_function_param_list(&mut self) -> Vec<DeclId> {
        if !self.at(TokenKlass::LParen) {
            self.report_error("expected '('");
            self.enter_recovery();
            return Vec::new();
        }
        self.consume();
        let paren_depth = self.paren_depth;

        if self.try_consume(TokenKlass::RParen) {
            return Vec::new();
        }
        if self.at(TokenKlass::KwVoid) && self.at_ahead(TokenKlass::RParen, 1) {
            self.consume();
            self.consume();
            return Vec::new();
        }

        let mut params = Vec::new();
        loop {
            let param_start = self.current_id();
            let quals = self.parse_type_qualifier_seq();
            let qual_type = if self.in_parsing() {
                self.parse_type_spec(quals)
            } else {
                self.builder
                    .qual_type(self.range_from(param_start), quals, None, None, Vec::new())
            };

            let declarator = if self.in_parsing() && self.at(TokenKlass::Identifier) {
                let token = self.current_token();
                self.consume();
                let array = self.parse_optional_array_spec();
                Some(Declarator {
                    name: token.text,
                    name_token: token.id,
                    array,
                    init: None,
                    resolved: self.builder.types.error_type(),
                })
            } else {
                None
            };

            params.push(
                self.builder
                    .param_decl(self.range_from(param_start), qual_type, declarator),
            );

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
        params
    }

    /// `qual_seq ID { field... } [declarator_no_init] ;`
    fn parse_interface_block(&mut self, start: SyntaxTokenId, quals: QualifierSet) -> DeclId {
        debug_assert!(self.at(TokenKlass::Identifier) && self.at_ahead(TokenKlass::LBrace, 1));
        let name = self.current_token();
        self.consume();
        self.consume();
        let brace_depth = self.brace_depth;

        let fields = self.parse_field_decl_seq(brace_depth, true);

        if !(self.at(TokenKlass::RBrace) && self.brace_depth == brace_depth) {
            self.report_error("expected '}'");
        }
        self.try_consume(TokenKlass::RBrace);

        let instance = if self.at(TokenKlass::Identifier) {
            let token = self.current_token();
            self.consume();
            let array = self.parse_optional_array_spec();
            Some(Declarator {
                name: token.text,
                name_token: token.id,
                array,
                init: None,
                resolved: self.builder.types.error_type(),
            })
        } else {
            None
        };

        if self.in_parsing() {
            self.parse_or_infer_semicolon();
        }

        self.builder
            .interface_block_decl(self.range_from(start), quals, name, fields, instance)
    }

    /// `precision precision-qual type ;`
    fn parse_precision_decl(&mut self) -> DeclId {
        debug_assert!(self.at(TokenKlass::KwPrecision));
        let start = self.current_id();
        self.consume();

        let quals = self.parse_type_qualifier_seq();
        let qual_type = self.parse_type_spec(quals);
        if self.in_parsing() {
            self.parse_or_infer_semicolon();
        }
        self.builder
            .precision_decl(self.range_from(start), qual_type)
    }
}

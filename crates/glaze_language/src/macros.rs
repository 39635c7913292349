//! Macro definitions and the macro table.
//!
//! A macro is either *object-like* (`#define N 42`) or *function-like*
//! (`#define F(a, b) a + b`). Each definition carries an *enabled* flag that
//! the expansion processor clears while the macro's own expansion is being
//! rescanned, which is what stops `#define M X` / `#define X M` from looping.
//!
//! Compiler-predefined macros (`__LINE__`, `__FILE__`, `__VERSION__` and the
//! profile feature macros) are registered as protected entries: they answer
//! `defined(...)` queries but cannot be `#undef`ed or redefined.

use rustc_hash::FxHashMap;

use glaze_base::Atom;

use crate::token::PPToken;

/// One `#define` entry.
#[derive(Clone, Debug)]
pub struct MacroDefinition {
    pub name: Atom,
    /// Parameter name tokens; `None` for object-like macros.
    pub params: Option<Vec<PPToken>>,
    /// Replacement list, as spelled after the name (and parameter list).
    pub replacement: Vec<PPToken>,
    /// Cleared while this macro's expansion is being rescanned.
    pub enabled: bool,
    /// Compiler-predefined; protected from `#undef` and redefinition.
    pub predefined: bool,
}

impl MacroDefinition {
    pub fn is_function_like(&self) -> bool {
        self.params.is_some()
    }
}

/// Result of a `#define`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DefineOutcome {
    Defined,
    /// An existing user macro was replaced; reported as a warning.
    Redefined,
    /// The name is compiler-predefined; the definition is ignored.
    Protected,
}

/// Result of an `#undef`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum UndefOutcome {
    Removed,
    NotDefined,
    /// The name is compiler-predefined; the directive is ignored.
    Protected,
}

/// Mapping from macro name to definition.
#[derive(Clone, Default, Debug)]
pub struct MacroTable {
    macros: FxHashMap<Atom, MacroDefinition>,
}

impl MacroTable {
    pub fn new() -> MacroTable {
        MacroTable::default()
    }

    pub fn define_object_like(&mut self, name: Atom, replacement: Vec<PPToken>) -> DefineOutcome {
        self.define(MacroDefinition {
            name,
            params: None,
            replacement,
            enabled: true,
            predefined: false,
        })
    }

    pub fn define_function_like(
        &mut self,
        name: Atom,
        params: Vec<PPToken>,
        replacement: Vec<PPToken>,
    ) -> DefineOutcome {
        self.define(MacroDefinition {
            name,
            params: Some(params),
            replacement,
            enabled: true,
            predefined: false,
        })
    }

    /// Registers a compiler-predefined macro. The name becomes protected.
    pub fn define_predefined(&mut self, name: Atom, replacement: Vec<PPToken>) {
        self.macros.insert(
            name,
            MacroDefinition {
                name,
                params: None,
                replacement,
                enabled: true,
                predefined: true,
            },
        );
    }

    fn define(&mut self, definition: MacroDefinition) -> DefineOutcome {
        match self.macros.get(&definition.name) {
            Some(existing) if existing.predefined => DefineOutcome::Protected,
            Some(_) => {
                self.macros.insert(definition.name, definition);
                DefineOutcome::Redefined
            }
            None => {
                self.macros.insert(definition.name, definition);
                DefineOutcome::Defined
            }
        }
    }

    pub fn undef(&mut self, name: Atom) -> UndefOutcome {
        match self.macros.get(&name) {
            Some(existing) if existing.predefined => UndefOutcome::Protected,
            Some(_) => {
                self.macros.remove(&name);
                UndefOutcome::Removed
            }
            None => UndefOutcome::NotDefined,
        }
    }

    pub fn is_defined(&self, name: Atom) -> bool {
        self.macros.contains_key(&name)
    }

    pub fn find(&self, name: Atom) -> Option<&MacroDefinition> {
        self.macros.get(&name)
    }

    /// Finds a macro that is not currently being expanded.
    pub fn find_enabled(&self, name: Atom) -> Option<&MacroDefinition> {
        self.macros.get(&name).filter(|def| def.enabled)
    }

    /// Marks `name` as being expanded so rescans cannot re-enter it.
    pub fn disable(&mut self, name: Atom) {
        if let Some(def) = self.macros.get_mut(&name) {
            def.enabled = false;
        }
    }

    pub fn enable(&mut self, name: Atom) {
        if let Some(def) = self.macros.get_mut(&name) {
            def.enabled = true;
        }
    }

    /// Bulk-adds every entry of `other`, used when importing a precompiled
    /// preamble's table.
    pub fn import(&mut self, other: &MacroTable) {
        for (name, def) in &other.macros {
            self.macros.insert(*name, def.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}

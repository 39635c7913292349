//! Scope stack and name resolution.
//!
//! Level 0 is the global scope; functions open a parameter level and blocks
//! open lexical levels. Each level maps a name to at most one non-function
//! declaration; shadowing across levels is allowed. Functions live in a
//! separate overload map that exists only at the global level, since GLSL has
//! no nested functions.

use rustc_hash::FxHashMap;

use glaze_base::Atom;

use crate::ast::DeclId;
use crate::types::{TypeContext, TypeId};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ScopeKind {
    Global,
    FunctionParams,
    Block,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SymbolKind {
    Variable,
    Parameter,
    Struct,
    InterfaceBlock,
    BlockInstance,
}

/// What a name resolves to.
#[derive(Clone, Copy, Debug)]
pub struct DeclView {
    pub decl: DeclId,
    pub ty: TypeId,
    pub kind: SymbolKind,
}

/// One function declaration in the overload map.
#[derive(Clone, Debug)]
pub struct FunctionEntry {
    pub decl: DeclId,
    pub params: Vec<TypeId>,
    pub return_type: TypeId,
}

/// Outcome of overload resolution at a call site.
#[derive(Clone, Debug)]
pub enum FunctionResolution {
    Found(FunctionEntry),
    Ambiguous,
    NotFound,
}

#[derive(Clone, Debug)]
struct Level {
    kind: ScopeKind,
    symbols: FxHashMap<Atom, DeclView>,
}

/// The scope stack of one compilation.
#[derive(Clone, Debug)]
pub struct SymbolTable {
    levels: Vec<Level>,
    functions: FxHashMap<Atom, Vec<FunctionEntry>>,
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable {
            levels: vec![Level {
                kind: ScopeKind::Global,
                symbols: FxHashMap::default(),
            }],
            functions: FxHashMap::default(),
        }
    }

    pub fn push_scope(&mut self, kind: ScopeKind) {
        debug_assert!(kind != ScopeKind::Global);
        self.levels.push(Level {
            kind,
            symbols: FxHashMap::default(),
        });
    }

    pub fn pop_scope(&mut self) {
        debug_assert!(self.levels.len() > 1, "cannot pop the global scope");
        self.levels.pop();
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn at_global_scope(&self) -> bool {
        self.levels.len() == 1
    }

    /// Adds a non-function symbol to the innermost level. Returns `false` if
    /// the level already binds the name.
    pub fn add_symbol(&mut self, name: Atom, view: DeclView) -> bool {
        if name.is_empty() {
            return true;
        }
        let level = self.levels.last_mut().unwrap();
        if level.symbols.contains_key(&name) {
            return false;
        }
        level.symbols.insert(name, view);
        true
    }

    /// Innermost binding of `name`.
    pub fn find(&self, name: Atom) -> Option<DeclView> {
        self.levels
            .iter()
            .rev()
            .find_map(|level| level.symbols.get(&name).copied())
    }

    /// Whether `name` is a struct (or interface block) type name; the parser
    /// uses this to split declarations from expressions.
    pub fn is_type_name(&self, name: Atom) -> bool {
        matches!(
            self.find(name),
            Some(DeclView {
                kind: SymbolKind::Struct,
                ..
            })
        )
    }

    /// Registers a function overload. Functions always live at the global
    /// level.
    pub fn add_function(&mut self, name: Atom, entry: FunctionEntry) {
        if name.is_empty() {
            return;
        }
        self.functions.entry(name).or_default().push(entry);
    }

    pub fn overloads(&self, name: Atom) -> &[FunctionEntry] {
        self.functions.get(&name).map_or(&[], |v| v.as_slice())
    }

    /// Overload resolution against argument types.
    ///
    /// An exact structural match (id equality on interned types) wins
    /// outright. Otherwise candidates reachable through implicit conversions
    /// are ranked by a partial order: a candidate is better when it is no
    /// worse at every argument and strictly better at one. A unique
    /// undominated candidate is selected; several mean ambiguity.
    pub fn find_function(
        &self,
        name: Atom,
        args: &[TypeId],
        types: &TypeContext,
    ) -> FunctionResolution {
        let overloads = self.overloads(name);

        for entry in overloads {
            if entry.params == args {
                return FunctionResolution::Found(entry.clone());
            }
        }

        let candidates: Vec<&FunctionEntry> = overloads
            .iter()
            .filter(|entry| {
                entry.params.len() == args.len()
                    && args
                        .iter()
                        .zip(&entry.params)
                        .all(|(&arg, &param)| types.implicit_convertible(arg, param))
            })
            .collect();

        match candidates.len() {
            0 => return FunctionResolution::NotFound,
            1 => return FunctionResolution::Found(candidates[0].clone()),
            _ => {}
        }

        let better_than = |a: &FunctionEntry, b: &FunctionEntry| {
            let mut strictly = false;
            for ((&arg, &pa), &pb) in args.iter().zip(&a.params).zip(&b.params) {
                if types.better_conversion(arg, pb, pa) {
                    return false;
                }
                if types.better_conversion(arg, pa, pb) {
                    strictly = true;
                }
            }
            strictly
        };

        let undominated: Vec<&FunctionEntry> = candidates
            .iter()
            .filter(|c| !candidates.iter().any(|o| better_than(o, c)))
            .copied()
            .collect();

        if undominated.len() == 1 {
            FunctionResolution::Found(undominated[0].clone())
        } else {
            FunctionResolution::Ambiguous
        }
    }

    /// Copies another table's global level and overloads into this one, used
    /// when importing a precompiled preamble.
    pub fn import_global(&mut self, other: &SymbolTable) {
        let globals = &other.levels[0];
        for (&name, &view) in &globals.symbols {
            self.levels[0].symbols.entry(name).or_insert(view);
        }
        for (&name, entries) in &other.functions {
            self.functions
                .entry(name)
                .or_default()
                .extend(entries.iter().cloned());
        }
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::ScalarKind;
    use glaze_base::AtomTable;

    fn view(ty: TypeId) -> DeclView {
        DeclView {
            decl: DeclId(0),
            ty,
            kind: SymbolKind::Variable,
        }
    }

    fn entry(params: Vec<TypeId>, ret: TypeId) -> FunctionEntry {
        FunctionEntry {
            decl: DeclId(0),
            params,
            return_type: ret,
        }
    }

    #[test]
    fn shadowing_across_levels() {
        let mut atoms = AtomTable::new();
        let mut types = TypeContext::new();
        let mut table = SymbolTable::new();
        let name = atoms.atom("x");
        let int = types.scalar(ScalarKind::I32);
        let float = types.scalar(ScalarKind::F32);

        assert!(table.add_symbol(name, view(int)));
        table.push_scope(ScopeKind::Block);
        assert!(table.add_symbol(name, view(float)));
        assert_eq!(table.find(name).unwrap().ty, float);
        table.pop_scope();
        assert_eq!(table.find(name).unwrap().ty, int);
    }

    #[test]
    fn duplicate_in_same_level_is_rejected() {
        let mut atoms = AtomTable::new();
        let mut types = TypeContext::new();
        let mut table = SymbolTable::new();
        let name = atoms.atom("x");
        let int = types.scalar(ScalarKind::I32);

        assert!(table.add_symbol(name, view(int)));
        assert!(!table.add_symbol(name, view(int)));
    }

    #[test]
    fn exact_overload_wins() {
        let mut atoms = AtomTable::new();
        let mut types = TypeContext::new();
        let mut table = SymbolTable::new();
        let f = atoms.atom("f");
        let int = types.scalar(ScalarKind::I32);
        let float = types.scalar(ScalarKind::F32);
        let void = types.void_type();

        table.add_function(f, entry(vec![int], void));
        table.add_function(f, entry(vec![float], void));

        match table.find_function(f, &[int], &types) {
            FunctionResolution::Found(e) => assert_eq!(e.params, vec![int]),
            other => panic!("expected exact match, got {other:?}"),
        }
        match table.find_function(f, &[float], &types) {
            FunctionResolution::Found(e) => assert_eq!(e.params, vec![float]),
            other => panic!("expected exact match, got {other:?}"),
        }
    }

    #[test]
    fn exact_match_wins_over_convertible() {
        let mut atoms = AtomTable::new();
        let mut types = TypeContext::new();
        let mut table = SymbolTable::new();
        let f = atoms.atom("f");
        let int = types.scalar(ScalarKind::I32);
        let uint = types.scalar(ScalarKind::U32);
        let float = types.scalar(ScalarKind::F32);
        let void = types.void_type();

        table.add_function(f, entry(vec![int], void));
        table.add_function(f, entry(vec![float], void));
        table.add_function(f, entry(vec![uint], void));

        match table.find_function(f, &[int], &types) {
            FunctionResolution::Found(e) => assert_eq!(e.params, vec![int]),
            other => panic!("expected f(int), got {other:?}"),
        }
    }

    #[test]
    fn best_convertible_candidate_is_chosen() {
        let mut atoms = AtomTable::new();
        let mut types = TypeContext::new();
        let mut table = SymbolTable::new();
        let f = atoms.atom("f");
        let int = types.scalar(ScalarKind::I32);
        let uint = types.scalar(ScalarKind::U32);
        let float = types.scalar(ScalarKind::F32);
        let void = types.void_type();

        table.add_function(f, entry(vec![uint], void));
        table.add_function(f, entry(vec![float], void));

        // int converts to both; uint is the closer rank.
        match table.find_function(f, &[int], &types) {
            FunctionResolution::Found(e) => assert_eq!(e.params, vec![uint]),
            other => panic!("expected f(uint), got {other:?}"),
        }
    }

    #[test]
    fn ambiguity_is_reported() {
        let mut atoms = AtomTable::new();
        let mut types = TypeContext::new();
        let mut table = SymbolTable::new();
        let f = atoms.atom("f");
        let int = types.scalar(ScalarKind::I32);
        let uint = types.scalar(ScalarKind::U32);
        let float = types.scalar(ScalarKind::F32);
        let void = types.void_type();

        // (uint, float) vs (float, uint): neither dominates for (int, int).
        table.add_function(f, entry(vec![uint, float], void));
        table.add_function(f, entry(vec![float, uint], void));

        assert!(matches!(
            table.find_function(f, &[int, int], &types),
            FunctionResolution::Ambiguous
        ));
    }

    #[test]
    fn arity_mismatch_is_not_found() {
        let mut atoms = AtomTable::new();
        let mut types = TypeContext::new();
        let mut table = SymbolTable::new();
        let f = atoms.atom("f");
        let int = types.scalar(ScalarKind::I32);
        let void = types.void_type();

        table.add_function(f, entry(vec![int, int], void));
        assert!(matches!(
            table.find_function(f, &[int], &types),
            FunctionResolution::NotFound
        ));
    }

    #[test]
    fn import_copies_globals_and_overloads() {
        let mut atoms = AtomTable::new();
        let mut types = TypeContext::new();
        let mut preamble = SymbolTable::new();
        let sin = atoms.atom("sin");
        let float = types.scalar(ScalarKind::F32);
        preamble.add_function(sin, entry(vec![float], float));
        let pos = atoms.atom("gl_Position");
        let vec4 = types.vector(ScalarKind::F32, 4);
        preamble.add_symbol(pos, view(vec4));

        let mut main = SymbolTable::new();
        main.import_global(&preamble);
        assert!(main.find(pos).is_some());
        assert_eq!(main.overloads(sin).len(), 1);
    }
}

//! Token text interning for O(1) equality comparison.
//!
//! Atoms are lightweight integer handles into an [`AtomTable`]. Each unique
//! string is stored exactly once in a bump arena owned by the table, so
//! identifier comparisons on hot paths are single integer compares and the
//! text of every token in a compilation lives in one allocation region.
//!
//! ## Example
//!
//! ```
//! use glaze_base::AtomTable;
//!
//! let mut table = AtomTable::new();
//!
//! let a1 = table.atom("vec3");
//! let a2 = table.atom("vec3");   // Same string
//! let a3 = table.atom("vec4");   // Different string
//!
//! assert_eq!(a1, a2);
//! assert_ne!(a1, a3);
//! assert_eq!(table.text(a1), "vec3");
//! ```
//!
//! ## Sharing across compilations
//!
//! A precompiled preamble owns its own table. A later invocation calls
//! [`AtomTable::import`] on a freshly created table before interning anything
//! else; imported atoms keep their handles, so atoms minted by the preamble
//! compare equal in every importing compilation.

use bumpalo::Bump;
use rustc_hash::FxHashMap;

/// A lightweight handle to interned text.
///
/// Atoms are `Copy` and compare in O(1) regardless of text length. Two atoms
/// from the same table (or from a table and one that imported it) are equal
/// exactly when their text is equal. Use [`AtomTable::text`] to read the
/// original string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Atom(u32);

impl Atom {
    /// The empty string, always present in every table.
    pub const EMPTY: Atom = Atom(0);

    /// Returns the internal index of this atom.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns `true` if this is the empty atom.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl Default for Atom {
    fn default() -> Self {
        Atom::EMPTY
    }
}

/// Interner for token and identifier text.
///
/// Text is copied once into a bump arena owned by the table; handles stay
/// valid for the table's lifetime. The table is append-only: atoms are never
/// freed before the table itself is dropped.
pub struct AtomTable {
    storage: Bump,
    map: FxHashMap<&'static str, Atom>,
    entries: Vec<&'static str>,
}

impl AtomTable {
    /// Creates a table with only the empty string pre-interned.
    pub fn new() -> Self {
        let mut table = AtomTable {
            storage: Bump::new(),
            map: FxHashMap::default(),
            entries: Vec::new(),
        };
        table.atom("");
        table
    }

    /// Interns `text`, returning its atom.
    ///
    /// Returns the existing atom if the text was already interned.
    pub fn atom(&mut self, text: &str) -> Atom {
        if let Some(&atom) = self.map.get(text) {
            return atom;
        }

        let stored = self.storage.alloc_str(text);
        // SAFETY: `stored` points into `self.storage`, which is never reset
        // and is dropped only together with `map` and `entries`. The
        // `'static` lifetime never escapes this struct: `text()` reborrows
        // at `&self`.
        let stored: &'static str = unsafe { std::mem::transmute::<&str, &'static str>(stored) };

        let atom = Atom(self.entries.len() as u32);
        self.entries.push(stored);
        self.map.insert(stored, atom);
        atom
    }

    /// Looks up `text` without creating a new entry.
    ///
    /// Returns the empty atom on miss, mirroring read-only access to a shared
    /// preamble table.
    pub fn atom_readonly(&self, text: &str) -> Atom {
        self.map.get(text).copied().unwrap_or(Atom::EMPTY)
    }

    /// Returns the text for the given atom.
    ///
    /// # Panics
    ///
    /// Panics if `atom` was not created by this table or a table it imported.
    pub fn text(&self, atom: Atom) -> &str {
        self.entries[atom.0 as usize]
    }

    /// Bulk-adds every entry of `other`, in handle order.
    ///
    /// When `self` is freshly constructed the imported atoms keep their
    /// handles, which is how preamble atoms stay comparable across
    /// compilations. Importing into a table that already interned other text
    /// still adds the entries but cannot preserve handles.
    pub fn import(&mut self, other: &AtomTable) {
        for text in &other.entries {
            self.atom(text);
        }
    }

    /// Number of interned strings, including the empty string.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if only the empty string is present.
    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }
}

impl Default for AtomTable {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for AtomTable {
    /// Clones by importing into a fresh table, so every handle stays valid
    /// in the clone.
    fn clone(&self) -> AtomTable {
        let mut table = AtomTable::new();
        table.import(self);
        table
    }
}

// SAFETY: every `&self` method only reads `map` and `entries`; the bump
// arena is touched exclusively through `&mut self` (in `atom`). Shared
// references therefore never race on the allocator, which is what makes a
// finished table shareable across threads inside a precompiled preamble.
unsafe impl Sync for AtomTable {}

impl std::fmt::Debug for AtomTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtomTable")
            .field("len", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atom_is_idempotent() {
        let mut table = AtomTable::new();
        let a1 = table.atom("uniform");
        let a2 = table.atom("uniform");
        assert_eq!(a1, a2);
    }

    #[test]
    fn different_text_different_atoms() {
        let mut table = AtomTable::new();
        assert_ne!(table.atom("in"), table.atom("out"));
    }

    #[test]
    fn text_round_trips() {
        let mut table = AtomTable::new();
        let atom = table.atom("gl_Position");
        assert_eq!(table.text(atom), "gl_Position");
    }

    #[test]
    fn empty_atom_is_preinterned() {
        let mut table = AtomTable::new();
        assert_eq!(table.atom(""), Atom::EMPTY);
        assert_eq!(table.text(Atom::EMPTY), "");
        assert!(Atom::EMPTY.is_empty());
    }

    #[test]
    fn readonly_lookup_misses_to_empty() {
        let mut table = AtomTable::new();
        table.atom("vec2");
        assert_eq!(table.atom_readonly("vec2"), table.atom_readonly("vec2"));
        assert_eq!(table.atom_readonly("never_seen"), Atom::EMPTY);
    }

    #[test]
    fn import_into_fresh_table_preserves_handles() {
        let mut preamble = AtomTable::new();
        let sin = preamble.atom("sin");
        let cos = preamble.atom("cos");

        let mut main = AtomTable::new();
        main.import(&preamble);
        assert_eq!(main.atom("sin"), sin);
        assert_eq!(main.atom("cos"), cos);
        assert_eq!(main.text(sin), "sin");
    }

    #[test]
    fn handles_stay_valid_across_growth() {
        let mut table = AtomTable::new();
        let first = table.atom("first");
        for i in 0..10_000 {
            table.atom(&format!("ident_{i}"));
        }
        assert_eq!(table.text(first), "first");
    }
}

//! Source identities and text positions.
//!
//! A compilation reads from several source units: the built-in system
//! preamble, a tool-supplied user preamble, the main file, and any number of
//! included files. [`FileId`] names one unit; [`TextPosition`] and
//! [`TextRange`] locate text inside a unit as 0-based `(line, column)` pairs.
//!
//! Column counting is a property of the scanner (UTF-8 or UTF-16 code units,
//! selected by compiler configuration), not of these types.

/// Identifier for one source unit.
///
/// Three values are distinguished: the system preamble, the user preamble and
/// the main file. Further ids are allocated by the source manager for each
/// resolved `#include`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct FileId(u32);

impl FileId {
    /// Built-in declarations compiled ahead of user code.
    pub const SYSTEM_PREAMBLE: FileId = FileId(0);
    /// Tool-supplied prelude compiled after the system preamble.
    pub const USER_PREAMBLE: FileId = FileId(1);
    /// The main translation unit.
    pub const MAIN: FileId = FileId(2);

    /// First id handed out to included files.
    pub(crate) const FIRST_INCLUDE: u32 = 3;

    pub fn from_raw(raw: u32) -> FileId {
        FileId(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn is_system_preamble(self) -> bool {
        self == FileId::SYSTEM_PREAMBLE
    }

    pub fn is_user_preamble(self) -> bool {
        self == FileId::USER_PREAMBLE
    }

    pub fn is_main(self) -> bool {
        self == FileId::MAIN
    }

    /// Returns `true` for ids allocated by `#include` resolution.
    pub fn is_include(self) -> bool {
        self.0 >= FileId::FIRST_INCLUDE
    }
}

/// A 0-based `(line, column)` position.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct TextPosition {
    pub line: u32,
    pub column: u32,
}

impl TextPosition {
    pub fn new(line: u32, column: u32) -> TextPosition {
        TextPosition { line, column }
    }

    /// The start of the source unit.
    pub fn start() -> TextPosition {
        TextPosition::default()
    }
}

/// Half-open `[start, end)` range of positions.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct TextRange {
    pub start: TextPosition,
    pub end: TextPosition,
}

impl TextRange {
    pub fn new(start: TextPosition, end: TextPosition) -> TextRange {
        TextRange { start, end }
    }

    /// A zero-width range pinned to `pos`.
    pub fn empty_at(pos: TextPosition) -> TextRange {
        TextRange { start: pos, end: pos }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn contains(&self, pos: TextPosition) -> bool {
        self.start <= pos && pos < self.end
    }
}

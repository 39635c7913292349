//! Resolved GLSL types.
//!
//! Types are interned in a [`TypeContext`]: requesting the same structure
//! twice returns the same [`TypeId`], so structural equality on resolved
//! types is id equality. Struct types are the exception - each declaration
//! mints a fresh nominal type. AST nodes and symbols refer to types by id,
//! which keeps the context movable and shareable across preamble imports.
//!
//! The *error* type is a first-class type attached to expressions that failed
//! checking; it is equality-distinct from every real type and converts to
//! nothing.

use rustc_hash::FxHashMap;

use glaze_base::{Atom, AtomTable};

use crate::consts::ScalarKind;
use crate::token::TokenKlass;

/// Interned handle to a resolved type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TypeId(u32);

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct StructField {
    pub name: Atom,
    pub ty: TypeId,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TypeKind {
    /// Sentinel attached to ill-typed expressions.
    Error,
    Void,
    Scalar(ScalarKind),
    /// Column vector of 2-4 components.
    Vector { elem: ScalarKind, size: u8 },
    /// `rows x cols` matrix; GLSL spells it `matCxR` (columns first).
    Matrix { elem: ScalarKind, rows: u8, cols: u8 },
    /// One array dimension; multidimensional arrays nest.
    Array { element: TypeId, size: Option<u32> },
    /// Nominal struct type; a fresh type per declaration.
    Struct { name: Option<Atom>, fields: Vec<StructField> },
    /// Samplers, images and other opaque builtins, keyed by their keyword.
    Opaque { klass: TokenKlass },
}

/// Interner for types.
#[derive(Clone, Debug)]
pub struct TypeContext {
    kinds: Vec<TypeKind>,
    scalars: FxHashMap<ScalarKind, TypeId>,
    vectors: FxHashMap<(ScalarKind, u8), TypeId>,
    matrices: FxHashMap<(ScalarKind, u8, u8), TypeId>,
    arrays: FxHashMap<(TypeId, Option<u32>), TypeId>,
    opaques: FxHashMap<TokenKlass, TypeId>,
}

impl TypeContext {
    pub fn new() -> TypeContext {
        let mut ctx = TypeContext {
            kinds: Vec::new(),
            scalars: FxHashMap::default(),
            vectors: FxHashMap::default(),
            matrices: FxHashMap::default(),
            arrays: FxHashMap::default(),
            opaques: FxHashMap::default(),
        };
        // Ids 0 and 1 are fixed so the error and void types are constant.
        ctx.kinds.push(TypeKind::Error);
        ctx.kinds.push(TypeKind::Void);
        ctx
    }

    pub fn error_type(&self) -> TypeId {
        TypeId(0)
    }

    pub fn void_type(&self) -> TypeId {
        TypeId(1)
    }

    fn push(&mut self, kind: TypeKind) -> TypeId {
        let id = TypeId(self.kinds.len() as u32);
        self.kinds.push(kind);
        id
    }

    pub fn kind(&self, id: TypeId) -> &TypeKind {
        &self.kinds[id.index()]
    }

    pub fn is_error(&self, id: TypeId) -> bool {
        id == self.error_type()
    }

    pub fn scalar(&mut self, kind: ScalarKind) -> TypeId {
        if let Some(&id) = self.scalars.get(&kind) {
            return id;
        }
        let id = self.push(TypeKind::Scalar(kind));
        self.scalars.insert(kind, id);
        id
    }

    pub fn vector(&mut self, elem: ScalarKind, size: u8) -> TypeId {
        if let Some(&id) = self.vectors.get(&(elem, size)) {
            return id;
        }
        let id = self.push(TypeKind::Vector { elem, size });
        self.vectors.insert((elem, size), id);
        id
    }

    pub fn matrix(&mut self, elem: ScalarKind, rows: u8, cols: u8) -> TypeId {
        if let Some(&id) = self.matrices.get(&(elem, rows, cols)) {
            return id;
        }
        let id = self.push(TypeKind::Matrix { elem, rows, cols });
        self.matrices.insert((elem, rows, cols), id);
        id
    }

    /// Arrays are interned keyed on element type and extent.
    pub fn array(&mut self, element: TypeId, size: Option<u32>) -> TypeId {
        if let Some(&id) = self.arrays.get(&(element, size)) {
            return id;
        }
        let id = self.push(TypeKind::Array { element, size });
        self.arrays.insert((element, size), id);
        id
    }

    pub fn opaque(&mut self, klass: TokenKlass) -> TypeId {
        if let Some(&id) = self.opaques.get(&klass) {
            return id;
        }
        let id = self.push(TypeKind::Opaque { klass });
        self.opaques.insert(klass, id);
        id
    }

    /// Mints a fresh nominal struct type.
    pub fn declare_struct(&mut self, name: Option<Atom>, fields: Vec<StructField>) -> TypeId {
        self.push(TypeKind::Struct { name, fields })
    }

    /// Maps a built-in type keyword to its type.
    pub fn builtin(&mut self, klass: TokenKlass) -> Option<TypeId> {
        use ScalarKind::*;
        use TokenKlass::*;
        Some(match klass {
            KwVoid => self.void_type(),
            KwBool => self.scalar(Bool),
            KwInt => self.scalar(I32),
            KwUint => self.scalar(U32),
            KwFloat => self.scalar(F32),
            KwDouble => self.scalar(F64),
            KwVec2 => self.vector(F32, 2),
            KwVec3 => self.vector(F32, 3),
            KwVec4 => self.vector(F32, 4),
            KwBvec2 => self.vector(Bool, 2),
            KwBvec3 => self.vector(Bool, 3),
            KwBvec4 => self.vector(Bool, 4),
            KwIvec2 => self.vector(I32, 2),
            KwIvec3 => self.vector(I32, 3),
            KwIvec4 => self.vector(I32, 4),
            KwUvec2 => self.vector(U32, 2),
            KwUvec3 => self.vector(U32, 3),
            KwUvec4 => self.vector(U32, 4),
            KwDvec2 => self.vector(F64, 2),
            KwDvec3 => self.vector(F64, 3),
            KwDvec4 => self.vector(F64, 4),
            KwMat2 => self.matrix(F32, 2, 2),
            KwMat3 => self.matrix(F32, 3, 3),
            KwMat4 => self.matrix(F32, 4, 4),
            // GLSL spells matrices columns-first: matCxR.
            KwMat2x2 => self.matrix(F32, 2, 2),
            KwMat2x3 => self.matrix(F32, 3, 2),
            KwMat2x4 => self.matrix(F32, 4, 2),
            KwMat3x2 => self.matrix(F32, 2, 3),
            KwMat3x3 => self.matrix(F32, 3, 3),
            KwMat3x4 => self.matrix(F32, 4, 3),
            KwMat4x2 => self.matrix(F32, 2, 4),
            KwMat4x3 => self.matrix(F32, 3, 4),
            KwMat4x4 => self.matrix(F32, 4, 4),
            KwSampler1D | KwSampler2D | KwSampler3D | KwSamplerCube | KwSampler1DArray
            | KwSampler2DArray | KwSamplerCubeArray | KwSampler2DShadow | KwSamplerCubeShadow
            | KwIsampler2D | KwIsampler3D | KwUsampler2D | KwUsampler3D | KwImage2D
            | KwImage3D | KwAtomicUint => self.opaque(klass),
            _ => return None,
        })
    }

    /// Implicit conversion legality: identical types, or an elementwise
    /// up-rank across matching shapes.
    pub fn implicit_convertible(&self, from: TypeId, to: TypeId) -> bool {
        self.conversion_distance(from, to).is_some()
    }

    /// Rank distance of an implicit conversion; 0 for identity, `None` when
    /// not convertible.
    pub fn conversion_distance(&self, from: TypeId, to: TypeId) -> Option<u32> {
        if from == to {
            return if self.is_error(from) { None } else { Some(0) };
        }
        if self.is_error(from) || self.is_error(to) {
            return None;
        }

        let (from_elem, to_elem) = match (self.kind(from), self.kind(to)) {
            (TypeKind::Scalar(a), TypeKind::Scalar(b)) => (*a, *b),
            (
                TypeKind::Vector { elem: a, size: sa },
                TypeKind::Vector { elem: b, size: sb },
            ) if sa == sb => (*a, *b),
            (
                TypeKind::Matrix { elem: a, rows: ra, cols: ca },
                TypeKind::Matrix { elem: b, rows: rb, cols: cb },
            ) if ra == rb && ca == cb => (*a, *b),
            _ => return None,
        };

        if from_elem.rank() < to_elem.rank() {
            Some((to_elem.rank() - from_elem.rank()) as u32)
        } else {
            None
        }
    }

    /// Whether converting `from` to `to1` is better than to `to2`.
    pub fn better_conversion(&self, from: TypeId, to1: TypeId, to2: TypeId) -> bool {
        match (self.conversion_distance(from, to1), self.conversion_distance(from, to2)) {
            (Some(d1), Some(d2)) => d1 < d2,
            (Some(_), None) => true,
            _ => false,
        }
    }

    /// Element scalar kind of scalars, vectors and matrices.
    pub fn element_kind(&self, id: TypeId) -> Option<ScalarKind> {
        match self.kind(id) {
            TypeKind::Scalar(kind) => Some(*kind),
            TypeKind::Vector { elem, .. } => Some(*elem),
            TypeKind::Matrix { elem, .. } => Some(*elem),
            _ => None,
        }
    }

    /// Human-readable type name for diagnostics.
    pub fn display(&self, id: TypeId, atoms: &AtomTable) -> String {
        match self.kind(id) {
            TypeKind::Error => "<error>".to_string(),
            TypeKind::Void => "void".to_string(),
            TypeKind::Scalar(kind) => scalar_name(*kind).to_string(),
            TypeKind::Vector { elem, size } => match elem {
                ScalarKind::F32 => format!("vec{size}"),
                ScalarKind::F64 => format!("dvec{size}"),
                ScalarKind::I32 => format!("ivec{size}"),
                ScalarKind::U32 => format!("uvec{size}"),
                ScalarKind::Bool => format!("bvec{size}"),
                other => format!("vec{size}<{}>", scalar_name(*other)),
            },
            TypeKind::Matrix { rows, cols, .. } => {
                if rows == cols {
                    format!("mat{cols}")
                } else {
                    format!("mat{cols}x{rows}")
                }
            }
            TypeKind::Array { element, size } => {
                let elem = self.display(*element, atoms);
                match size {
                    Some(n) => format!("{elem}[{n}]"),
                    None => format!("{elem}[]"),
                }
            }
            TypeKind::Struct { name, .. } => match name {
                Some(name) => format!("struct {}", atoms.text(*name)),
                None => "struct <anonymous>".to_string(),
            },
            TypeKind::Opaque { klass } => crate::keywords::keyword_text(*klass)
                .unwrap_or("<opaque>")
                .to_string(),
        }
    }

    /// Looks up a field of a struct type.
    pub fn find_field(&self, id: TypeId, name: Atom) -> Option<TypeId> {
        match self.kind(id) {
            TypeKind::Struct { fields, .. } => {
                fields.iter().find(|f| f.name == name).map(|f| f.ty)
            }
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl Default for TypeContext {
    fn default() -> Self {
        Self::new()
    }
}

fn scalar_name(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::Bool => "bool",
        ScalarKind::I8 => "int8_t",
        ScalarKind::I16 => "int16_t",
        ScalarKind::I32 => "int",
        ScalarKind::I64 => "int64_t",
        ScalarKind::U8 => "uint8_t",
        ScalarKind::U16 => "uint16_t",
        ScalarKind::U32 => "uint",
        ScalarKind::U64 => "uint64_t",
        ScalarKind::F16 => "float16_t",
        ScalarKind::F32 => "float",
        ScalarKind::F64 => "double",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_returns_same_id() {
        let mut types = TypeContext::new();
        assert_eq!(types.scalar(ScalarKind::I32), types.scalar(ScalarKind::I32));
        assert_eq!(types.vector(ScalarKind::F32, 3), types.vector(ScalarKind::F32, 3));
        assert_ne!(types.vector(ScalarKind::F32, 3), types.vector(ScalarKind::F32, 4));
    }

    #[test]
    fn arrays_intern_on_element_and_extent() {
        let mut types = TypeContext::new();
        let float = types.scalar(ScalarKind::F32);
        let a = types.array(float, Some(4));
        let b = types.array(float, Some(4));
        let c = types.array(float, Some(5));
        let d = types.array(float, None);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn structs_are_nominal() {
        let mut types = TypeContext::new();
        let a = types.declare_struct(None, Vec::new());
        let b = types.declare_struct(None, Vec::new());
        assert_ne!(a, b);
    }

    #[test]
    fn scalar_conversions_follow_rank() {
        let mut types = TypeContext::new();
        let int = types.scalar(ScalarKind::I32);
        let uint = types.scalar(ScalarKind::U32);
        let float = types.scalar(ScalarKind::F32);
        let boolean = types.scalar(ScalarKind::Bool);

        assert!(types.implicit_convertible(int, float));
        assert!(types.implicit_convertible(int, uint));
        assert!(!types.implicit_convertible(float, int));
        assert!(!types.implicit_convertible(int, boolean));
        assert!(types.implicit_convertible(int, int));
    }

    #[test]
    fn vector_conversions_need_matching_size() {
        let mut types = TypeContext::new();
        let ivec3 = types.vector(ScalarKind::I32, 3);
        let vec3 = types.vector(ScalarKind::F32, 3);
        let vec4 = types.vector(ScalarKind::F32, 4);

        assert!(types.implicit_convertible(ivec3, vec3));
        assert!(!types.implicit_convertible(ivec3, vec4));
    }

    #[test]
    fn error_type_converts_to_nothing() {
        let mut types = TypeContext::new();
        let err = types.error_type();
        let int = types.scalar(ScalarKind::I32);
        assert!(!types.implicit_convertible(err, int));
        assert!(!types.implicit_convertible(int, err));
        assert!(!types.implicit_convertible(err, err));
    }

    #[test]
    fn better_conversion_prefers_exact_then_closer() {
        let mut types = TypeContext::new();
        let int = types.scalar(ScalarKind::I32);
        let uint = types.scalar(ScalarKind::U32);
        let float = types.scalar(ScalarKind::F32);

        // Identity beats any widening.
        assert!(types.better_conversion(int, int, float));
        // Closer rank beats farther rank.
        assert!(types.better_conversion(int, uint, float));
        assert!(!types.better_conversion(int, float, uint));
    }

    #[test]
    fn field_lookup() {
        let mut atoms = AtomTable::new();
        let mut types = TypeContext::new();
        let float = types.scalar(ScalarKind::F32);
        let x = atoms.atom("x");
        let s = types.declare_struct(
            Some(atoms.atom("Light")),
            vec![StructField { name: x, ty: float }],
        );
        assert_eq!(types.find_field(s, x), Some(float));
        assert_eq!(types.find_field(s, atoms.atom("y")), None);
    }

    #[test]
    fn display_names() {
        let mut atoms = AtomTable::new();
        let mut types = TypeContext::new();
        let vec3 = types.vector(ScalarKind::F32, 3);
        assert_eq!(types.display(vec3, &atoms), "vec3");
        let float = types.scalar(ScalarKind::F32);
        let arr = types.array(float, Some(4));
        assert_eq!(types.display(arr, &atoms), "float[4]");
        let mat23 = types.matrix(ScalarKind::F32, 3, 2);
        assert_eq!(types.display(mat23, &atoms), "mat2x3");
    }
}

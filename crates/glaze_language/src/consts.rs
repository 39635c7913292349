//! Compile-time constant values.
//!
//! A [`ConstValue`] is a shape-and-kind-tagged cell: a scalar, vector, matrix
//! or array of one scalar kind. Elementwise operators are defined wherever
//! GLSL defines them for the kind; anything else (mismatched kinds or shapes,
//! arithmetic on booleans, integer division by zero) yields the distinguished
//! *error* value, which has zero shape and compares unequal to everything but
//! itself. Folding never faults.
//!
//! Integer arithmetic wraps. `f16` values are computed in `f32` precision and
//! tagged with their own kind.

use std::fmt;

/// Scalar kinds, ordered by implicit-conversion rank.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum ScalarKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F16,
    F32,
    F64,
}

impl ScalarKind {
    /// Position in the implicit conversion ladder
    /// `bool < i8 < … < u64 < f16 < f32 < f64`.
    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            ScalarKind::I8
                | ScalarKind::I16
                | ScalarKind::I32
                | ScalarKind::I64
                | ScalarKind::U8
                | ScalarKind::U16
                | ScalarKind::U32
                | ScalarKind::U64
        )
    }

    pub fn is_floating(self) -> bool {
        matches!(self, ScalarKind::F16 | ScalarKind::F32 | ScalarKind::F64)
    }
}

/// One element of a constant, tagged with its kind.
#[derive(Clone, Copy, Debug)]
pub enum ScalarCell {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    /// Computed in f32 precision.
    F16(f32),
    F32(f32),
    F64(f64),
}

impl ScalarCell {
    pub fn kind(self) -> ScalarKind {
        match self {
            ScalarCell::Bool(_) => ScalarKind::Bool,
            ScalarCell::I8(_) => ScalarKind::I8,
            ScalarCell::I16(_) => ScalarKind::I16,
            ScalarCell::I32(_) => ScalarKind::I32,
            ScalarCell::I64(_) => ScalarKind::I64,
            ScalarCell::U8(_) => ScalarKind::U8,
            ScalarCell::U16(_) => ScalarKind::U16,
            ScalarCell::U32(_) => ScalarKind::U32,
            ScalarCell::U64(_) => ScalarKind::U64,
            ScalarCell::F16(_) => ScalarKind::F16,
            ScalarCell::F32(_) => ScalarKind::F32,
            ScalarCell::F64(_) => ScalarKind::F64,
        }
    }

    fn bits_eq(self, other: ScalarCell) -> bool {
        use ScalarCell::*;
        match (self, other) {
            (Bool(a), Bool(b)) => a == b,
            (I8(a), I8(b)) => a == b,
            (I16(a), I16(b)) => a == b,
            (I32(a), I32(b)) => a == b,
            (I64(a), I64(b)) => a == b,
            (U8(a), U8(b)) => a == b,
            (U16(a), U16(b)) => a == b,
            (U32(a), U32(b)) => a == b,
            (U64(a), U64(b)) => a == b,
            (F16(a), F16(b)) | (F32(a), F32(b)) => a.to_bits() == b.to_bits(),
            (F64(a), F64(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

macro_rules! cell_arith {
    ($a:expr, $b:expr, $int:ident, $fop:tt) => {{
        use ScalarCell::*;
        match ($a, $b) {
            (I8(x), I8(y)) => Some(I8(x.$int(y))),
            (I16(x), I16(y)) => Some(I16(x.$int(y))),
            (I32(x), I32(y)) => Some(I32(x.$int(y))),
            (I64(x), I64(y)) => Some(I64(x.$int(y))),
            (U8(x), U8(y)) => Some(U8(x.$int(y))),
            (U16(x), U16(y)) => Some(U16(x.$int(y))),
            (U32(x), U32(y)) => Some(U32(x.$int(y))),
            (U64(x), U64(y)) => Some(U64(x.$int(y))),
            (F16(x), F16(y)) => Some(F16(x $fop y)),
            (F32(x), F32(y)) => Some(F32(x $fop y)),
            (F64(x), F64(y)) => Some(F64(x $fop y)),
            _ => None,
        }
    }};
}

macro_rules! cell_int_op {
    ($a:expr, $b:expr, $op:tt) => {{
        use ScalarCell::*;
        match ($a, $b) {
            (I8(x), I8(y)) => Some(I8(x $op y)),
            (I16(x), I16(y)) => Some(I16(x $op y)),
            (I32(x), I32(y)) => Some(I32(x $op y)),
            (I64(x), I64(y)) => Some(I64(x $op y)),
            (U8(x), U8(y)) => Some(U8(x $op y)),
            (U16(x), U16(y)) => Some(U16(x $op y)),
            (U32(x), U32(y)) => Some(U32(x $op y)),
            (U64(x), U64(y)) => Some(U64(x $op y)),
            _ => None,
        }
    }};
}

macro_rules! cell_int_method {
    ($a:expr, $b:expr, $method:ident) => {{
        use ScalarCell::*;
        match ($a, $b) {
            (I8(x), I8(y)) => Some(I8(x.$method(y))),
            (I16(x), I16(y)) => Some(I16(x.$method(y))),
            (I32(x), I32(y)) => Some(I32(x.$method(y))),
            (I64(x), I64(y)) => Some(I64(x.$method(y))),
            (U8(x), U8(y)) => Some(U8(x.$method(y))),
            (U16(x), U16(y)) => Some(U16(x.$method(y))),
            (U32(x), U32(y)) => Some(U32(x.$method(y))),
            (U64(x), U64(y)) => Some(U64(x.$method(y))),
            _ => None,
        }
    }};
}

macro_rules! cell_shift {
    ($a:expr, $amount:expr, $method:ident) => {{
        use ScalarCell::*;
        match $a {
            I8(x) => Some(I8(x.$method($amount))),
            I16(x) => Some(I16(x.$method($amount))),
            I32(x) => Some(I32(x.$method($amount))),
            I64(x) => Some(I64(x.$method($amount))),
            U8(x) => Some(U8(x.$method($amount))),
            U16(x) => Some(U16(x.$method($amount))),
            U32(x) => Some(U32(x.$method($amount))),
            U64(x) => Some(U64(x.$method($amount))),
            _ => None,
        }
    }};
}

macro_rules! cell_compare {
    ($a:expr, $b:expr, $op:tt) => {{
        use ScalarCell::*;
        match ($a, $b) {
            (I8(x), I8(y)) => Some(Bool(x $op y)),
            (I16(x), I16(y)) => Some(Bool(x $op y)),
            (I32(x), I32(y)) => Some(Bool(x $op y)),
            (I64(x), I64(y)) => Some(Bool(x $op y)),
            (U8(x), U8(y)) => Some(Bool(x $op y)),
            (U16(x), U16(y)) => Some(Bool(x $op y)),
            (U32(x), U32(y)) => Some(Bool(x $op y)),
            (U64(x), U64(y)) => Some(Bool(x $op y)),
            (F16(x), F16(y)) => Some(Bool(x $op y)),
            (F32(x), F32(y)) => Some(Bool(x $op y)),
            (F64(x), F64(y)) => Some(Bool(x $op y)),
            _ => None,
        }
    }};
}

/// A constant value, or the error value.
#[derive(Clone, Debug)]
pub struct ConstValue {
    kind: ScalarKind,
    /// Array element count; 0 when the value is not an array.
    array_size: u32,
    rows: u8,
    cols: u8,
    cells: Vec<ScalarCell>,
}

impl ConstValue {
    /// The error value: zero shape, no cells.
    pub fn error() -> ConstValue {
        ConstValue {
            kind: ScalarKind::Bool,
            array_size: 0,
            rows: 0,
            cols: 0,
            cells: Vec::new(),
        }
    }

    pub fn scalar(cell: ScalarCell) -> ConstValue {
        ConstValue {
            kind: cell.kind(),
            array_size: 0,
            rows: 1,
            cols: 1,
            cells: vec![cell],
        }
    }

    pub fn from_bool(value: bool) -> ConstValue {
        ConstValue::scalar(ScalarCell::Bool(value))
    }

    pub fn from_i32(value: i32) -> ConstValue {
        ConstValue::scalar(ScalarCell::I32(value))
    }

    pub fn from_u32(value: u32) -> ConstValue {
        ConstValue::scalar(ScalarCell::U32(value))
    }

    pub fn from_f32(value: f32) -> ConstValue {
        ConstValue::scalar(ScalarCell::F32(value))
    }

    pub fn from_f64(value: f64) -> ConstValue {
        ConstValue::scalar(ScalarCell::F64(value))
    }

    /// A column vector of `cells.len()` components.
    pub fn vector(cells: Vec<ScalarCell>) -> ConstValue {
        if cells.is_empty() || cells.iter().any(|c| c.kind() != cells[0].kind()) {
            return ConstValue::error();
        }
        ConstValue {
            kind: cells[0].kind(),
            array_size: 0,
            rows: cells.len() as u8,
            cols: 1,
            cells,
        }
    }

    /// A matrix in column-major cell order.
    pub fn matrix(rows: u8, cols: u8, cells: Vec<ScalarCell>) -> ConstValue {
        if cells.len() != rows as usize * cols as usize
            || cells.is_empty()
            || cells.iter().any(|c| c.kind() != cells[0].kind())
        {
            return ConstValue::error();
        }
        ConstValue {
            kind: cells[0].kind(),
            array_size: 0,
            rows,
            cols,
            cells,
        }
    }

    pub fn is_error(&self) -> bool {
        self.rows == 0
    }

    pub fn is_scalar(&self) -> bool {
        self.array_size == 0 && self.rows == 1 && self.cols == 1
    }

    pub fn scalar_kind(&self) -> ScalarKind {
        self.kind
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn cols(&self) -> u8 {
        self.cols
    }

    pub fn cells(&self) -> &[ScalarCell] {
        &self.cells
    }

    fn shape(&self) -> (u32, u8, u8) {
        (self.array_size, self.rows, self.cols)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.cells.as_slice() {
            [ScalarCell::Bool(v)] if self.is_scalar() => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self.cells.as_slice() {
            [ScalarCell::I32(v)] if self.is_scalar() => Some(*v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self.cells.as_slice() {
            [ScalarCell::U32(v)] if self.is_scalar() => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self.cells.as_slice() {
            [ScalarCell::F32(v)] if self.is_scalar() => Some(*v),
            _ => None,
        }
    }

    /// Scalar integer of any signedness, widened; used for array sizes.
    pub fn as_index(&self) -> Option<i64> {
        if !self.is_scalar() {
            return None;
        }
        match self.cells[0] {
            ScalarCell::I8(v) => Some(v as i64),
            ScalarCell::I16(v) => Some(v as i64),
            ScalarCell::I32(v) => Some(v as i64),
            ScalarCell::I64(v) => Some(v),
            ScalarCell::U8(v) => Some(v as i64),
            ScalarCell::U16(v) => Some(v as i64),
            ScalarCell::U32(v) => Some(v as i64),
            ScalarCell::U64(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    fn map(&self, f: impl Fn(ScalarCell) -> Option<ScalarCell>) -> ConstValue {
        if self.is_error() {
            return ConstValue::error();
        }
        let mut cells = Vec::with_capacity(self.cells.len());
        for &cell in &self.cells {
            match f(cell) {
                Some(mapped) => cells.push(mapped),
                None => return ConstValue::error(),
            }
        }
        let kind = cells[0].kind();
        let mut out = self.clone_shape(cells);
        out.kind = kind;
        out
    }

    fn zip_map(
        &self,
        other: &ConstValue,
        f: impl Fn(ScalarCell, ScalarCell) -> Option<ScalarCell>,
    ) -> ConstValue {
        if self.is_error()
            || other.is_error()
            || self.kind != other.kind
            || self.shape() != other.shape()
        {
            return ConstValue::error();
        }
        let mut cells = Vec::with_capacity(self.cells.len());
        for (&a, &b) in self.cells.iter().zip(&other.cells) {
            match f(a, b) {
                Some(mapped) => cells.push(mapped),
                None => return ConstValue::error(),
            }
        }
        let kind = cells[0].kind();
        let mut out = self.clone_shape(cells);
        out.kind = kind;
        out
    }

    fn clone_shape(&self, cells: Vec<ScalarCell>) -> ConstValue {
        ConstValue {
            kind: self.kind,
            array_size: self.array_size,
            rows: self.rows,
            cols: self.cols,
            cells,
        }
    }

    /// Elementwise numeric conversion to `target`, used when folding through
    /// implicit casts. Conversions from `bool` and to `bool` are not implicit
    /// in GLSL and yield the error value.
    pub fn convert(&self, target: ScalarKind) -> ConstValue {
        if self.is_error() || self.kind == ScalarKind::Bool || target == ScalarKind::Bool {
            return if !self.is_error() && self.kind == target {
                self.clone()
            } else {
                ConstValue::error()
            };
        }
        if self.kind == target {
            return self.clone();
        }

        self.map(|cell| {
            use ScalarCell::*;
            let wide: f64 = match cell {
                I8(v) => v as f64,
                I16(v) => v as f64,
                I32(v) => v as f64,
                I64(v) => v as f64,
                U8(v) => v as f64,
                U16(v) => v as f64,
                U32(v) => v as f64,
                U64(v) => v as f64,
                F16(v) | F32(v) => v as f64,
                F64(v) => v,
                Bool(_) => return None,
            };
            let int: i64 = match cell {
                I8(v) => v as i64,
                I16(v) => v as i64,
                I32(v) => v as i64,
                I64(v) => v,
                U8(v) => v as i64,
                U16(v) => v as i64,
                U32(v) => v as i64,
                U64(v) => v as i64,
                F16(v) | F32(v) => v as i64,
                F64(v) => v as i64,
                Bool(_) => return None,
            };
            Some(match target {
                ScalarKind::I8 => I8(int as i8),
                ScalarKind::I16 => I16(int as i16),
                ScalarKind::I32 => I32(int as i32),
                ScalarKind::I64 => I64(int),
                ScalarKind::U8 => U8(int as u8),
                ScalarKind::U16 => U16(int as u16),
                ScalarKind::U32 => U32(int as u32),
                ScalarKind::U64 => U64(int as u64),
                ScalarKind::F16 => F16(wide as f32),
                ScalarKind::F32 => F32(wide as f32),
                ScalarKind::F64 => F64(wide),
                ScalarKind::Bool => return None,
            })
        })
    }

    // Unary operators.

    /// Unary `+`: the identity.
    pub fn identity(&self) -> ConstValue {
        if self.is_error() || self.kind == ScalarKind::Bool {
            return ConstValue::error();
        }
        self.clone()
    }

    pub fn negate(&self) -> ConstValue {
        self.map(|cell| {
            use ScalarCell::*;
            match cell {
                I8(v) => Some(I8(v.wrapping_neg())),
                I16(v) => Some(I16(v.wrapping_neg())),
                I32(v) => Some(I32(v.wrapping_neg())),
                I64(v) => Some(I64(v.wrapping_neg())),
                U8(v) => Some(U8(v.wrapping_neg())),
                U16(v) => Some(U16(v.wrapping_neg())),
                U32(v) => Some(U32(v.wrapping_neg())),
                U64(v) => Some(U64(v.wrapping_neg())),
                F16(v) => Some(F16(-v)),
                F32(v) => Some(F32(-v)),
                F64(v) => Some(F64(-v)),
                Bool(_) => None,
            }
        })
    }

    pub fn bit_not(&self) -> ConstValue {
        self.map(|cell| {
            use ScalarCell::*;
            match cell {
                I8(v) => Some(I8(!v)),
                I16(v) => Some(I16(!v)),
                I32(v) => Some(I32(!v)),
                I64(v) => Some(I64(!v)),
                U8(v) => Some(U8(!v)),
                U16(v) => Some(U16(!v)),
                U32(v) => Some(U32(!v)),
                U64(v) => Some(U64(!v)),
                _ => None,
            }
        })
    }

    pub fn logical_not(&self) -> ConstValue {
        self.map(|cell| match cell {
            ScalarCell::Bool(v) => Some(ScalarCell::Bool(!v)),
            _ => None,
        })
    }

    /// `.length()`: the component or element count as an `int`.
    pub fn length(&self) -> ConstValue {
        if self.is_error() {
            return ConstValue::error();
        }
        let count = if self.array_size > 0 {
            self.array_size as i32
        } else if self.cols > 1 {
            self.cols as i32
        } else {
            self.rows as i32
        };
        ConstValue::from_i32(count)
    }

    // Binary operators.

    pub fn plus(&self, other: &ConstValue) -> ConstValue {
        self.zip_map(other, |a, b| cell_arith!(a, b, wrapping_add, +))
    }

    pub fn minus(&self, other: &ConstValue) -> ConstValue {
        self.zip_map(other, |a, b| cell_arith!(a, b, wrapping_sub, -))
    }

    pub fn mul(&self, other: &ConstValue) -> ConstValue {
        self.zip_map(other, |a, b| cell_arith!(a, b, wrapping_mul, *))
    }

    pub fn div(&self, other: &ConstValue) -> ConstValue {
        self.zip_map(other, |a, b| {
            use ScalarCell::*;
            match (a, b) {
                (I8(_), I8(0))
                | (I16(_), I16(0))
                | (I32(_), I32(0))
                | (I64(_), I64(0))
                | (U8(_), U8(0))
                | (U16(_), U16(0))
                | (U32(_), U32(0))
                | (U64(_), U64(0)) => None,
                _ => cell_arith!(a, b, wrapping_div, /),
            }
        })
    }

    pub fn rem(&self, other: &ConstValue) -> ConstValue {
        self.zip_map(other, |a, b| {
            use ScalarCell::*;
            match (a, b) {
                (I8(_), I8(0))
                | (I16(_), I16(0))
                | (I32(_), I32(0))
                | (I64(_), I64(0))
                | (U8(_), U8(0))
                | (U16(_), U16(0))
                | (U32(_), U32(0))
                | (U64(_), U64(0)) => None,
                (F16(_), _) | (F32(_), _) | (F64(_), _) => None,
                _ => cell_int_method!(a, b, wrapping_rem),
            }
        })
    }

    pub fn bit_and(&self, other: &ConstValue) -> ConstValue {
        self.zip_map(other, |a, b| cell_int_op!(a, b, &))
    }

    pub fn bit_or(&self, other: &ConstValue) -> ConstValue {
        self.zip_map(other, |a, b| cell_int_op!(a, b, |))
    }

    pub fn bit_xor(&self, other: &ConstValue) -> ConstValue {
        self.zip_map(other, |a, b| cell_int_op!(a, b, ^))
    }

    /// Shift counts are masked by the left operand's bit width.
    pub fn shift_left(&self, other: &ConstValue) -> ConstValue {
        self.zip_map(other, |a, b| {
            let shift = cell_shift_amount(b)?;
            cell_shift!(a, shift, wrapping_shl)
        })
    }

    /// Arithmetic for signed kinds, logical for unsigned; counts are masked
    /// by the left operand's bit width.
    pub fn shift_right(&self, other: &ConstValue) -> ConstValue {
        self.zip_map(other, |a, b| {
            let shift = cell_shift_amount(b)?;
            cell_shift!(a, shift, wrapping_shr)
        })
    }

    pub fn logical_and(&self, other: &ConstValue) -> ConstValue {
        self.zip_map(other, |a, b| match (a, b) {
            (ScalarCell::Bool(x), ScalarCell::Bool(y)) => Some(ScalarCell::Bool(x && y)),
            _ => None,
        })
    }

    pub fn logical_or(&self, other: &ConstValue) -> ConstValue {
        self.zip_map(other, |a, b| match (a, b) {
            (ScalarCell::Bool(x), ScalarCell::Bool(y)) => Some(ScalarCell::Bool(x || y)),
            _ => None,
        })
    }

    pub fn logical_xor(&self, other: &ConstValue) -> ConstValue {
        self.zip_map(other, |a, b| match (a, b) {
            (ScalarCell::Bool(x), ScalarCell::Bool(y)) => Some(ScalarCell::Bool(x != y)),
            _ => None,
        })
    }

    // Comparisons yield elementwise booleans; on scalars that is the scalar
    // bool the language expects.

    pub fn compare_eq(&self, other: &ConstValue) -> ConstValue {
        self.zip_map(other, |a, b| {
            if a.kind() == ScalarKind::Bool {
                match (a, b) {
                    (ScalarCell::Bool(x), ScalarCell::Bool(y)) => Some(ScalarCell::Bool(x == y)),
                    _ => None,
                }
            } else {
                cell_compare!(a, b, ==)
            }
        })
    }

    pub fn compare_ne(&self, other: &ConstValue) -> ConstValue {
        let eq = self.compare_eq(other);
        eq.logical_not()
    }

    pub fn compare_lt(&self, other: &ConstValue) -> ConstValue {
        self.zip_map(other, |a, b| cell_compare!(a, b, <))
    }

    pub fn compare_le(&self, other: &ConstValue) -> ConstValue {
        self.zip_map(other, |a, b| cell_compare!(a, b, <=))
    }

    pub fn compare_gt(&self, other: &ConstValue) -> ConstValue {
        self.zip_map(other, |a, b| cell_compare!(a, b, >))
    }

    pub fn compare_ge(&self, other: &ConstValue) -> ConstValue {
        self.zip_map(other, |a, b| cell_compare!(a, b, >=))
    }
}

fn cell_shift_amount(cell: ScalarCell) -> Option<u32> {
    use ScalarCell::*;
    let amount = match cell {
        I8(v) => v as i64,
        I16(v) => v as i64,
        I32(v) => v as i64,
        I64(v) => v,
        U8(v) => v as i64,
        U16(v) => v as i64,
        U32(v) => v as i64,
        U64(v) => v.min(u32::MAX as u64) as i64,
        _ => return None,
    };
    if amount < 0 {
        return None;
    }
    Some(amount as u32)
}

impl PartialEq for ConstValue {
    fn eq(&self, other: &ConstValue) -> bool {
        self.kind == other.kind
            && self.shape() == other.shape()
            && self
                .cells
                .iter()
                .zip(&other.cells)
                .all(|(&a, &b)| a.bits_eq(b))
    }
}

impl Eq for ConstValue {}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_error() {
            return write!(f, "<error>");
        }
        let cell = |c: &ScalarCell, f: &mut fmt::Formatter<'_>| -> fmt::Result {
            use ScalarCell::*;
            match c {
                Bool(v) => write!(f, "{v}"),
                I8(v) => write!(f, "{v}"),
                I16(v) => write!(f, "{v}"),
                I32(v) => write!(f, "{v}"),
                I64(v) => write!(f, "{v}"),
                U8(v) => write!(f, "{v}"),
                U16(v) => write!(f, "{v}"),
                U32(v) => write!(f, "{v}u"),
                U64(v) => write!(f, "{v}"),
                F16(v) | F32(v) => write!(f, "{v}"),
                F64(v) => write!(f, "{v}"),
            }
        };
        if self.cells.len() == 1 {
            cell(&self.cells[0], f)
        } else {
            write!(f, "{{")?;
            for (i, c) in self.cells.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                cell(c, f)?;
            }
            write!(f, "}}")
        }
    }
}

/// Parses an integer literal for preprocessor expressions: decimal, hex or
/// octal, optional `u`/`U` suffix, wrapped into `i64`.
pub fn parse_pp_integer(text: &str) -> Option<i64> {
    let body = text.strip_suffix(['u', 'U']).unwrap_or(text);
    let value = if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()?
    } else if body.len() > 1 && body.starts_with('0') {
        u64::from_str_radix(&body[1..], 8).ok()?
    } else {
        body.parse::<u64>().ok()?
    };
    Some(value as i64)
}

/// Parses a GLSL numeric literal into its constant value.
///
/// Integer literals produce `int` or, with a `u`/`U` suffix, `uint`. Float
/// literals produce `float`, or `double` with the `lf`/`LF` suffix. Returns
/// the error value for malformed text.
pub fn parse_number_literal(text: &str) -> ConstValue {
    if let Some(body) = text.strip_suffix(['u', 'U']) {
        return match parse_integer_body(body) {
            Some(value) => ConstValue::from_u32(value as u32),
            None => ConstValue::error(),
        };
    }

    if let Some(body) = text.strip_suffix("lf").or_else(|| text.strip_suffix("LF")) {
        return match body.parse::<f64>() {
            Ok(value) => ConstValue::from_f64(value),
            Err(_) => ConstValue::error(),
        };
    }

    if let Some(body) = text.strip_suffix(['f', 'F']) {
        // "0xf" falls through to the hex integer path below.
        if let Ok(value) = body.parse::<f32>() {
            return ConstValue::from_f32(value);
        }
    }

    if let Some(value) = parse_integer_body(text) {
        return ConstValue::from_i32(value as i32);
    }

    match text.parse::<f32>() {
        Ok(value) => ConstValue::from_f32(value),
        Err(_) => ConstValue::error(),
    }
}

fn parse_integer_body(body: &str) -> Option<u64> {
    if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        return u64::from_str_radix(hex, 16).ok().or(Some(u64::MAX));
    }
    if body.len() > 1 && body.starts_with('0') {
        if !body.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
            return None;
        }
        return u64::from_str_radix(&body[1..], 8).ok().or(Some(u64::MAX));
    }
    if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    body.parse::<u64>().ok().or(Some(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_value_has_zero_shape() {
        let err = ConstValue::error();
        assert!(err.is_error());
        assert_eq!(err, ConstValue::error());
        assert_ne!(err, ConstValue::from_i32(0));
    }

    #[test]
    fn identity_round_trips_every_numeric_kind() {
        let values = [
            ConstValue::from_i32(-7),
            ConstValue::from_u32(7),
            ConstValue::from_f32(1.25),
            ConstValue::from_f64(2.5),
        ];
        for v in values {
            assert_eq!(v.identity(), v);
        }
    }

    #[test]
    fn plus_zero_round_trips() {
        let v = ConstValue::from_i32(41);
        assert_eq!(v.plus(&ConstValue::from_i32(0)), v);
        let f = ConstValue::from_f32(1.5);
        assert_eq!(f.plus(&ConstValue::from_f32(0.0)), f);
    }

    #[test]
    fn integer_arithmetic_wraps() {
        let max = ConstValue::from_i32(i32::MAX);
        assert_eq!(max.plus(&ConstValue::from_i32(1)), ConstValue::from_i32(i32::MIN));
    }

    #[test]
    fn division_by_zero_is_error() {
        let one = ConstValue::from_i32(1);
        assert!(one.div(&ConstValue::from_i32(0)).is_error());
        assert!(one.rem(&ConstValue::from_i32(0)).is_error());
    }

    #[test]
    fn float_division_by_zero_is_not_error() {
        let v = ConstValue::from_f32(1.0).div(&ConstValue::from_f32(0.0));
        assert!(!v.is_error());
        assert!(v.as_f32().unwrap().is_infinite());
    }

    #[test]
    fn mismatched_kinds_are_error() {
        let i = ConstValue::from_i32(1);
        let u = ConstValue::from_u32(1);
        assert!(i.plus(&u).is_error());
    }

    #[test]
    fn bool_arithmetic_is_error() {
        let t = ConstValue::from_bool(true);
        assert!(t.plus(&t).is_error());
        assert!(t.negate().is_error());
        assert!(t.identity().is_error());
    }

    #[test]
    fn logical_ops_are_bool_only() {
        let t = ConstValue::from_bool(true);
        let f = ConstValue::from_bool(false);
        assert_eq!(t.logical_and(&f), ConstValue::from_bool(false));
        assert_eq!(t.logical_or(&f), ConstValue::from_bool(true));
        assert_eq!(t.logical_xor(&t), ConstValue::from_bool(false));
        assert!(ConstValue::from_i32(1).logical_and(&ConstValue::from_i32(1)).is_error());
    }

    #[test]
    fn comparisons_yield_bool() {
        let a = ConstValue::from_i32(3);
        let b = ConstValue::from_i32(5);
        assert_eq!(a.compare_lt(&b), ConstValue::from_bool(true));
        assert_eq!(a.compare_ge(&b), ConstValue::from_bool(false));
        assert_eq!(a.compare_eq(&a), ConstValue::from_bool(true));
        assert_eq!(a.compare_ne(&a), ConstValue::from_bool(false));
    }

    #[test]
    fn vectors_operate_elementwise() {
        let a = ConstValue::vector(vec![ScalarCell::F32(1.0), ScalarCell::F32(2.0)]);
        let b = ConstValue::vector(vec![ScalarCell::F32(10.0), ScalarCell::F32(20.0)]);
        let sum = a.plus(&b);
        assert_eq!(
            sum,
            ConstValue::vector(vec![ScalarCell::F32(11.0), ScalarCell::F32(22.0)])
        );
    }

    #[test]
    fn shape_mismatch_is_error() {
        let v2 = ConstValue::vector(vec![ScalarCell::F32(1.0), ScalarCell::F32(2.0)]);
        let v3 = ConstValue::vector(vec![
            ScalarCell::F32(1.0),
            ScalarCell::F32(2.0),
            ScalarCell::F32(3.0),
        ]);
        assert!(v2.plus(&v3).is_error());
    }

    #[test]
    fn length_of_vector_and_scalar() {
        let v3 = ConstValue::vector(vec![
            ScalarCell::F32(0.0),
            ScalarCell::F32(0.0),
            ScalarCell::F32(0.0),
        ]);
        assert_eq!(v3.length(), ConstValue::from_i32(3));
    }

    #[test]
    fn bitwise_ops() {
        let a = ConstValue::from_i32(0b1100);
        let b = ConstValue::from_i32(0b1010);
        assert_eq!(a.bit_and(&b), ConstValue::from_i32(0b1000));
        assert_eq!(a.bit_or(&b), ConstValue::from_i32(0b1110));
        assert_eq!(a.bit_xor(&b), ConstValue::from_i32(0b0110));
        assert_eq!(a.bit_not(), ConstValue::from_i32(!0b1100));
        assert!(ConstValue::from_f32(1.0).bit_and(&ConstValue::from_f32(1.0)).is_error());
    }

    #[test]
    fn negation() {
        assert_eq!(ConstValue::from_i32(5).negate(), ConstValue::from_i32(-5));
        assert_eq!(ConstValue::from_f32(5.0).negate(), ConstValue::from_f32(-5.0));
        // Unsigned negation wraps.
        assert_eq!(ConstValue::from_u32(1).negate(), ConstValue::from_u32(u32::MAX));
    }

    #[test]
    fn pp_integer_parsing() {
        assert_eq!(parse_pp_integer("42"), Some(42));
        assert_eq!(parse_pp_integer("0x10"), Some(16));
        assert_eq!(parse_pp_integer("010"), Some(8));
        assert_eq!(parse_pp_integer("42u"), Some(42));
        assert_eq!(parse_pp_integer("0"), Some(0));
        assert_eq!(parse_pp_integer("abc"), None);
    }

    #[test]
    fn number_literal_kinds() {
        assert_eq!(parse_number_literal("42"), ConstValue::from_i32(42));
        assert_eq!(parse_number_literal("42u"), ConstValue::from_u32(42));
        assert_eq!(parse_number_literal("0x1F"), ConstValue::from_i32(31));
        assert_eq!(parse_number_literal("010"), ConstValue::from_i32(8));
        assert_eq!(parse_number_literal("1.5"), ConstValue::from_f32(1.5));
        assert_eq!(parse_number_literal("1.5f"), ConstValue::from_f32(1.5));
        assert_eq!(parse_number_literal("1e2"), ConstValue::from_f32(100.0));
        assert_eq!(parse_number_literal("2.5lf"), ConstValue::from_f64(2.5));
        assert_eq!(parse_number_literal("0xf"), ConstValue::from_i32(15));
        assert!(parse_number_literal("garbage").is_error());
    }

    #[test]
    fn scalar_kind_ranks_are_ordered() {
        let order = [
            ScalarKind::Bool,
            ScalarKind::I8,
            ScalarKind::I16,
            ScalarKind::I32,
            ScalarKind::I64,
            ScalarKind::U8,
            ScalarKind::U16,
            ScalarKind::U32,
            ScalarKind::U64,
            ScalarKind::F16,
            ScalarKind::F32,
            ScalarKind::F64,
        ];
        for pair in order.windows(2) {
            assert!(pair[0].rank() < pair[1].rank());
        }
    }
}

//! Value types and type masks as seen by call-shape checks.
//!
//! The evaluator owns the actual value representation; this module only
//! needs to know a value's type and how many elements it holds.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::rc::Rc;

/// Runtime type of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Null,
    Logical,
    Int,
    Float,
    String,
    Object,
    /// No value at all; only meaningful as a return.
    Void,
}

impl ValueType {
    /// Mask bit of this type.
    #[must_use]
    pub const fn mask(self) -> ValueMask {
        match self {
            Self::Null => ValueMask::NULL,
            Self::Logical => ValueMask::LOGICAL,
            Self::Int => ValueMask::INT,
            Self::Float => ValueMask::FLOAT,
            Self::String => ValueMask::STRING,
            Self::Object => ValueMask::OBJECT,
            Self::Void => ValueMask::VOID,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Null => "NULL",
            Self::Logical => "logical",
            Self::Int => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Object => "object",
            Self::Void => "void",
        })
    }
}

/// Set of acceptable types plus the singleton and optional qualifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ValueMask(u16);

impl ValueMask {
    pub const NONE: Self = Self(0);
    pub const NULL: Self = Self(1 << 0);
    pub const LOGICAL: Self = Self(1 << 1);
    pub const INT: Self = Self(1 << 2);
    pub const FLOAT: Self = Self(1 << 3);
    pub const STRING: Self = Self(1 << 4);
    pub const OBJECT: Self = Self(1 << 5);
    pub const VOID: Self = Self(1 << 6);

    pub const NUMERIC: Self = Self(Self::INT.0 | Self::FLOAT.0);
    pub const LOGICAL_EQUIV: Self = Self(Self::LOGICAL.0 | Self::NUMERIC.0);
    pub const ANY_BASE: Self = Self(Self::NULL.0 | Self::LOGICAL_EQUIV.0 | Self::STRING.0);
    pub const ANY: Self = Self(Self::ANY_BASE.0 | Self::OBJECT.0);

    /// Value must have exactly one element.
    pub const SINGLETON: Self = Self(1 << 14);
    /// Argument may be omitted.
    pub const OPTIONAL: Self = Self(1 << 15);

    const TYPE_BITS: u16 = Self::ANY.0 | Self::VOID.0;

    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub const fn accepts(self, ty: ValueType) -> bool {
        self.contains(ty.mask())
    }

    #[must_use]
    pub const fn is_singleton(self) -> bool {
        self.contains(Self::SINGLETON)
    }

    #[must_use]
    pub const fn is_optional(self) -> bool {
        self.contains(Self::OPTIONAL)
    }

    /// The mask with its qualifiers removed.
    #[must_use]
    pub const fn types(self) -> Self {
        Self(self.0 & Self::TYPE_BITS)
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Bits of `self` not in `other`.
    #[must_use]
    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl BitOr for ValueMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for ValueMask {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

/// Type names in prototype notation: `integer$`, `numeric`, `+`, `*`.
impl fmt::Display for ValueMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let types = self.types();
        let name = match types {
            Self::ANY => "*".to_string(),
            Self::ANY_BASE => "+".to_string(),
            Self::LOGICAL_EQUIV => "lif".to_string(),
            Self::NUMERIC => "numeric".to_string(),
            Self::VOID => "void".to_string(),
            Self::NONE => "?".to_string(),
            _ => [
                ValueType::Null,
                ValueType::Logical,
                ValueType::Int,
                ValueType::Float,
                ValueType::String,
                ValueType::Object,
                ValueType::Void,
            ]
            .into_iter()
            .filter(|ty| types.accepts(*ty))
            .map(|ty| ty.to_string())
            .collect::<Vec<_>>()
            .join("|"),
        };
        f.write_str(&name)?;
        if self.is_singleton() {
            f.write_str("$")?;
        }
        Ok(())
    }
}

/// What a call-shape check needs to know about a value.
pub trait Shaped {
    fn value_type(&self) -> ValueType;
    /// Number of elements.
    fn count(&self) -> usize;
    /// Element class of an object value, if the host knows it.
    fn class_name(&self) -> Option<&str> {
        None
    }
}

impl<T: Shaped + ?Sized> Shaped for &T {
    fn value_type(&self) -> ValueType {
        (**self).value_type()
    }

    fn count(&self) -> usize {
        (**self).count()
    }

    fn class_name(&self) -> Option<&str> {
        (**self).class_name()
    }
}

impl<T: Shaped + ?Sized> Shaped for Box<T> {
    fn value_type(&self) -> ValueType {
        (**self).value_type()
    }

    fn count(&self) -> usize {
        (**self).count()
    }

    fn class_name(&self) -> Option<&str> {
        (**self).class_name()
    }
}

impl<T: Shaped + ?Sized> Shaped for Rc<T> {
    fn value_type(&self) -> ValueType {
        (**self).value_type()
    }

    fn count(&self) -> usize {
        (**self).count()
    }

    fn class_name(&self) -> Option<&str> {
        (**self).class_name()
    }
}

/// Plain type-and-count description of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueShape {
    pub value_type: ValueType,
    pub count: usize,
    pub class: Option<&'static str>,
}

impl ValueShape {
    #[must_use]
    pub const fn new(value_type: ValueType, count: usize) -> Self {
        Self {
            value_type,
            count,
            class: None,
        }
    }

    /// `count` objects of element class `class`.
    #[must_use]
    pub const fn objects(class: &'static str, count: usize) -> Self {
        Self {
            value_type: ValueType::Object,
            count,
            class: Some(class),
        }
    }

    #[must_use]
    pub const fn singleton(value_type: ValueType) -> Self {
        Self::new(value_type, 1)
    }

    #[must_use]
    pub const fn null() -> Self {
        Self::new(ValueType::Null, 0)
    }

    #[must_use]
    pub const fn void() -> Self {
        Self::new(ValueType::Void, 0)
    }
}

impl Shaped for ValueShape {
    fn value_type(&self) -> ValueType {
        self.value_type
    }

    fn count(&self) -> usize {
        self.count
    }

    fn class_name(&self) -> Option<&str> {
        self.class
    }
}

//! Call signatures for host-registered functions and methods.
//!
//! A [`Signature`] describes the shape of a callable: what it returns and
//! what each positional argument may hold. Evaluators check actual
//! argument lists against it before dispatching into host code, and may
//! check the host's result on the way back.
//!
//! ```
//! use eidos_syntax::{Signature, ValueMask, ValueShape, ValueType};
//!
//! let sig = Signature::build("sample")
//!     .returns(ValueMask::ANY)
//!     .add_any("x")
//!     .add_int_s("size")
//!     .add_logical_os("replace")
//!     .finish();
//!
//! assert_eq!(sig.to_string(), "(*)sample(* x, integer$ size, [logical$ replace])");
//!
//! let args = [
//!     ValueShape::new(ValueType::Float, 10),
//!     ValueShape::singleton(ValueType::Int),
//! ];
//! assert!(sig.check_arguments("function", &args).is_ok());
//! ```
//!
//! The builder tracks where it is in the argument list with a type
//! parameter, so a required argument after an optional one, or anything
//! after the ellipsis, does not compile.

use std::fmt;
use std::marker::PhantomData;

use crate::value::{Shaped, ValueMask, ValueType};

/// Value an optional argument takes when the caller omits it.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Null,
    Logical(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Logical(true) => f.write_str("T"),
            Self::Logical(false) => f.write_str("F"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:?}"),
            Self::Str(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<bool> for DefaultValue {
    fn from(v: bool) -> Self {
        Self::Logical(v)
    }
}

impl From<i64> for DefaultValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for DefaultValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for DefaultValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for DefaultValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

/// One positional parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: String,
    /// Accepted types, with the `SINGLETON` and `OPTIONAL` qualifiers.
    pub mask: ValueMask,
    /// Required element class when an object is passed.
    pub class: Option<String>,
    pub default: Option<DefaultValue>,
}

impl Argument {
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.mask.is_optional()
    }

    #[must_use]
    pub const fn is_singleton(&self) -> bool {
        self.mask.is_singleton()
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_optional() {
            f.write_str("[")?;
        }
        write_type(f, self.mask, self.class.as_deref())?;
        write!(f, " {}", self.name)?;
        if let Some(default) = &self.default {
            write!(f, " = {default}")?;
        }
        if self.is_optional() {
            f.write_str("]")?;
        }
        Ok(())
    }
}

/// `integer|object<Class>$`: the type names, the element class, then the
/// singleton marker.
fn write_type(f: &mut fmt::Formatter<'_>, mask: ValueMask, class: Option<&str>) -> fmt::Result {
    write!(f, "{}", mask.types())?;
    if let Some(class) = class {
        write!(f, "<{class}>")?;
    }
    if mask.is_singleton() {
        f.write_str("$")?;
    }
    Ok(())
}

/// Frozen description of a callable's return and argument shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    name: String,
    identity: u32,
    return_mask: ValueMask,
    return_class: Option<String>,
    arguments: Vec<Argument>,
    has_ellipsis: bool,
}

impl Signature {
    /// Start building a signature. The return mask defaults to `void`.
    #[must_use]
    pub fn build(name: impl Into<String>) -> SignatureBuilder<Required> {
        SignatureBuilder {
            signature: Self {
                name: name.into(),
                identity: 0,
                return_mask: ValueMask::VOID,
                return_class: None,
                arguments: Vec::new(),
                has_ellipsis: false,
            },
            state: PhantomData,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Host-chosen tag for fast dispatch.
    #[must_use]
    pub const fn identity(&self) -> u32 {
        self.identity
    }

    #[must_use]
    pub const fn return_mask(&self) -> ValueMask {
        self.return_mask
    }

    /// Element class promised for an object return.
    #[must_use]
    pub fn return_class(&self) -> Option<&str> {
        self.return_class.as_deref()
    }

    #[must_use]
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    #[must_use]
    pub const fn has_ellipsis(&self) -> bool {
        self.has_ellipsis
    }

    /// Number of leading arguments that must be supplied.
    #[must_use]
    pub fn required_count(&self) -> usize {
        self.arguments.iter().filter(|a| !a.is_optional()).count()
    }

    /// Largest accepted argument count, or `None` with an ellipsis.
    #[must_use]
    pub fn max_count(&self) -> Option<usize> {
        (!self.has_ellipsis).then_some(self.arguments.len())
    }

    /// Check an argument list against this signature.
    ///
    /// `call_kind` labels the call in error messages, usually
    /// `"function"` or `"method"`. Arguments past the declared ones (with
    /// an ellipsis) are not checked.
    ///
    /// # Errors
    ///
    /// Returns `TypeError` for the first problem found: a missing
    /// required argument, too many arguments, an argument of a type not
    /// in its mask, a non-singleton where a singleton is required, or an
    /// object of the wrong element class.
    pub fn check_arguments<V: Shaped>(&self, call_kind: &str, args: &[V]) -> Result<(), TypeError> {
        let required = self.required_count();
        if args.len() < required {
            let missing = &self.arguments[args.len()];
            return Err(self.error(
                call_kind,
                TypeErrorKind::MissingArgument {
                    position: args.len() + 1,
                    name: missing.name.clone(),
                },
            ));
        }

        if let Some(max) = self.max_count().filter(|&max| args.len() > max) {
            return Err(self.error(
                call_kind,
                TypeErrorKind::TooManyArguments {
                    max,
                    supplied: args.len(),
                },
            ));
        }

        for (index, (param, value)) in self.arguments.iter().zip(args).enumerate() {
            let found = value.value_type();
            if !param.mask.accepts(found) {
                return Err(self.error(
                    call_kind,
                    TypeErrorKind::ArgumentType {
                        position: index + 1,
                        name: param.name.clone(),
                        expected: param.mask,
                        found,
                    },
                ));
            }
            if !cardinality_ok(param.mask, value) {
                return Err(self.error(
                    call_kind,
                    TypeErrorKind::ArgumentNotSingleton {
                        position: index + 1,
                        name: param.name.clone(),
                        count: value.count(),
                    },
                ));
            }
            if let Some((expected, found)) = wrong_class(param.class.as_deref(), value) {
                return Err(self.error(
                    call_kind,
                    TypeErrorKind::ArgumentClass {
                        position: index + 1,
                        name: param.name.clone(),
                        expected,
                        found,
                    },
                ));
            }
        }

        Ok(())
    }

    /// Check a value produced by the host implementation against the
    /// return mask.
    ///
    /// # Errors
    ///
    /// Returns `TypeError` when the value's type is not in the return
    /// mask, it is not a singleton where one was promised, or it holds
    /// objects of another class than promised.
    pub fn check_return(&self, call_kind: &str, value: &impl Shaped) -> Result<(), TypeError> {
        let found = value.value_type();
        if !self.return_mask.accepts(found) {
            return Err(self.error(
                call_kind,
                TypeErrorKind::ReturnType {
                    expected: self.return_mask,
                    found,
                },
            ));
        }
        if !cardinality_ok(self.return_mask, value) {
            return Err(self.error(
                call_kind,
                TypeErrorKind::ReturnNotSingleton {
                    count: value.count(),
                },
            ));
        }
        if let Some((expected, found)) = wrong_class(self.return_class.as_deref(), value) {
            return Err(self.error(
                call_kind,
                TypeErrorKind::ReturnClass { expected, found },
            ));
        }
        Ok(())
    }

    fn error(&self, call_kind: &str, kind: TypeErrorKind) -> TypeError {
        TypeError {
            call_kind: call_kind.to_string(),
            callee: self.name.clone(),
            kind,
        }
    }
}

/// A singleton mask demands exactly one element, except that an accepted
/// `NULL` or `void` is let through as it is.
fn cardinality_ok(mask: ValueMask, value: &impl Shaped) -> bool {
    if !mask.is_singleton() || value.count() == 1 {
        return true;
    }
    matches!(value.value_type(), ValueType::Null | ValueType::Void)
}

/// Expected and found class of an object value of the wrong class.
/// Values whose class the host does not report are let through.
fn wrong_class(expected: Option<&str>, value: &impl Shaped) -> Option<(String, String)> {
    let expected = expected?;
    if value.value_type() != ValueType::Object {
        return None;
    }
    let found = value.class_name().filter(|found| *found != expected)?;
    Some((expected.to_string(), found.to_string()))
}

/// Prototype form: `(integer$)name(integer x, [string$ y], ...)`.
impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        write_type(f, self.return_mask, self.return_class.as_deref())?;
        write!(f, "){}(", self.name)?;
        if self.arguments.is_empty() && !self.has_ellipsis {
            f.write_str("void")?;
        }
        for (i, arg) in self.arguments.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        if self.has_ellipsis {
            if !self.arguments.is_empty() {
                f.write_str(", ")?;
            }
            f.write_str("...")?;
        }
        f.write_str(")")
    }
}

/// Builder state: only required arguments so far.
#[derive(Debug)]
pub struct Required;

/// Builder state: an optional argument has been added.
#[derive(Debug)]
pub struct Optional;

/// Builder state: the ellipsis has been added; only `finish` remains.
#[derive(Debug)]
pub struct Variadic;

mod sealed {
    pub trait Open {}
    impl Open for super::Required {}
    impl Open for super::Optional {}
}

/// Fluent constructor for [`Signature`], consumed by every call.
#[derive(Debug)]
#[must_use]
pub struct SignatureBuilder<S> {
    signature: Signature,
    state: PhantomData<S>,
}

impl<S> SignatureBuilder<S> {
    /// Set the dispatch tag.
    pub const fn identity(mut self, identity: u32) -> Self {
        self.signature.identity = identity;
        self
    }

    /// Set the return mask.
    pub const fn returns(mut self, mask: ValueMask) -> Self {
        self.signature.return_mask = mask;
        self
    }

    /// Promise objects of element class `class` from an object return.
    pub fn returns_class(mut self, class: impl Into<String>) -> Self {
        self.signature.return_class = Some(class.into());
        self
    }

    /// Freeze the signature.
    #[must_use]
    pub fn finish(self) -> Signature {
        self.signature
    }

    fn push<T>(
        mut self,
        mask: ValueMask,
        name: impl Into<String>,
        class: Option<String>,
    ) -> SignatureBuilder<T> {
        self.signature.arguments.push(Argument {
            name: name.into(),
            mask,
            class,
            default: None,
        });
        SignatureBuilder {
            signature: self.signature,
            state: PhantomData,
        }
    }
}

impl SignatureBuilder<Required> {
    /// Add a required argument with an arbitrary mask. An `OPTIONAL` bit
    /// in `mask` is dropped; use [`Self::add_arg_o`] for that.
    pub fn add_arg(self, mask: ValueMask, name: impl Into<String>) -> Self {
        self.push(mask.difference(ValueMask::OPTIONAL), name, None)
    }

    /// Add a required argument whose objects must be of element class
    /// `class`.
    pub fn add_arg_class(
        self,
        mask: ValueMask,
        name: impl Into<String>,
        class: impl Into<String>,
    ) -> Self {
        self.push(mask.difference(ValueMask::OPTIONAL), name, Some(class.into()))
    }
}

impl<S: sealed::Open> SignatureBuilder<S> {
    /// Add an optional argument with an arbitrary mask. Every later
    /// argument must be optional too.
    pub fn add_arg_o(self, mask: ValueMask, name: impl Into<String>) -> SignatureBuilder<Optional> {
        self.push(mask | ValueMask::OPTIONAL, name, None)
    }

    /// Optional counterpart of [`SignatureBuilder::add_arg_class`].
    pub fn add_arg_class_o(
        self,
        mask: ValueMask,
        name: impl Into<String>,
        class: impl Into<String>,
    ) -> SignatureBuilder<Optional> {
        self.push(mask | ValueMask::OPTIONAL, name, Some(class.into()))
    }

    /// Accept any number of further arguments.
    pub fn add_ellipsis(mut self) -> SignatureBuilder<Variadic> {
        self.signature.has_ellipsis = true;
        SignatureBuilder {
            signature: self.signature,
            state: PhantomData,
        }
    }
}

impl SignatureBuilder<Optional> {
    /// Set the value the last added argument takes when omitted.
    pub fn defaults_to(mut self, value: impl Into<DefaultValue>) -> Self {
        if let Some(last) = self.signature.arguments.last_mut() {
            last.default = Some(value.into());
        }
        self
    }
}

macro_rules! typed_arguments {
    ($($ty:literal => $mask:expr, $add:ident, $add_s:ident, $add_o:ident, $add_os:ident, $add_osn:ident;)*) => {
        impl SignatureBuilder<Required> {
            $(
                #[doc = concat!("Add a required `", $ty, "` argument.")]
                pub fn $add(self, name: impl Into<String>) -> Self {
                    self.add_arg($mask, name)
                }

                #[doc = concat!("Add a required singleton `", $ty, "` argument.")]
                pub fn $add_s(self, name: impl Into<String>) -> Self {
                    self.add_arg($mask | ValueMask::SINGLETON, name)
                }
            )*
        }

        impl<S: sealed::Open> SignatureBuilder<S> {
            $(
                #[doc = concat!("Add an optional `", $ty, "` argument.")]
                pub fn $add_o(self, name: impl Into<String>) -> SignatureBuilder<Optional> {
                    self.add_arg_o($mask, name)
                }

                #[doc = concat!("Add an optional singleton `", $ty, "` argument.")]
                pub fn $add_os(self, name: impl Into<String>) -> SignatureBuilder<Optional> {
                    self.add_arg_o($mask | ValueMask::SINGLETON, name)
                }

                #[doc = concat!("Add an optional singleton `", $ty, "` argument that also takes `NULL`, its default.")]
                pub fn $add_osn(self, name: impl Into<String>) -> SignatureBuilder<Optional> {
                    self.add_arg_o($mask | ValueMask::NULL | ValueMask::SINGLETON, name)
                        .defaults_to(DefaultValue::Null)
                }
            )*
        }
    };
}

macro_rules! class_arguments {
    ($($ty:literal => $mask:expr, $add:ident, $add_s:ident, $add_o:ident, $add_os:ident, $add_osn:ident;)*) => {
        impl SignatureBuilder<Required> {
            $(
                #[doc = concat!("Add a required `", $ty, "` argument whose objects are of class `class`.")]
                pub fn $add(self, name: impl Into<String>, class: impl Into<String>) -> Self {
                    self.add_arg_class($mask, name, class)
                }

                #[doc = concat!("Add a required singleton `", $ty, "` argument whose objects are of class `class`.")]
                pub fn $add_s(self, name: impl Into<String>, class: impl Into<String>) -> Self {
                    self.add_arg_class($mask | ValueMask::SINGLETON, name, class)
                }
            )*
        }

        impl<S: sealed::Open> SignatureBuilder<S> {
            $(
                #[doc = concat!("Add an optional `", $ty, "` argument whose objects are of class `class`.")]
                pub fn $add_o(
                    self,
                    name: impl Into<String>,
                    class: impl Into<String>,
                ) -> SignatureBuilder<Optional> {
                    self.add_arg_class_o($mask, name, class)
                }

                #[doc = concat!("Add an optional singleton `", $ty, "` argument whose objects are of class `class`.")]
                pub fn $add_os(
                    self,
                    name: impl Into<String>,
                    class: impl Into<String>,
                ) -> SignatureBuilder<Optional> {
                    self.add_arg_class_o($mask | ValueMask::SINGLETON, name, class)
                }

                #[doc = concat!("Add an optional singleton `", $ty, "` argument of class `class` that also takes `NULL`, its default.")]
                pub fn $add_osn(
                    self,
                    name: impl Into<String>,
                    class: impl Into<String>,
                ) -> SignatureBuilder<Optional> {
                    self.add_arg_class_o($mask | ValueMask::NULL | ValueMask::SINGLETON, name, class)
                        .defaults_to(DefaultValue::Null)
                }
            )*
        }
    };
}

typed_arguments! {
    "logical" => ValueMask::LOGICAL, add_logical, add_logical_s, add_logical_o, add_logical_os, add_logical_osn;
    "integer" => ValueMask::INT, add_int, add_int_s, add_int_o, add_int_os, add_int_osn;
    "float" => ValueMask::FLOAT, add_float, add_float_s, add_float_o, add_float_os, add_float_osn;
    "string" => ValueMask::STRING, add_string, add_string_s, add_string_o, add_string_os, add_string_osn;
    "object" => ValueMask::OBJECT, add_object, add_object_s, add_object_o, add_object_os, add_object_osn;
    "numeric" => ValueMask::NUMERIC, add_numeric, add_numeric_s, add_numeric_o, add_numeric_os, add_numeric_osn;
    "lif" => ValueMask::LOGICAL_EQUIV, add_logical_equiv, add_logical_equiv_s, add_logical_equiv_o, add_logical_equiv_os, add_logical_equiv_osn;
    "+" => ValueMask::ANY_BASE, add_any_base, add_any_base_s, add_any_base_o, add_any_base_os, add_any_base_osn;
    "*" => ValueMask::ANY, add_any, add_any_s, add_any_o, add_any_os, add_any_osn;
}

class_arguments! {
    "object" => ValueMask::OBJECT, add_object_of, add_object_of_s, add_object_of_o, add_object_of_os, add_object_of_osn;
    "integer|object" => ValueMask::INT.union(ValueMask::OBJECT), add_int_object_of, add_int_object_of_s, add_int_object_of_o, add_int_object_of_os, add_int_object_of_osn;
}

/// Classifies a call-shape error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeErrorKind {
    /// Fewer arguments than required; `position` is 1-based.
    MissingArgument { position: usize, name: String },
    TooManyArguments { max: usize, supplied: usize },
    ArgumentType {
        position: usize,
        name: String,
        expected: ValueMask,
        found: ValueType,
    },
    ArgumentNotSingleton {
        position: usize,
        name: String,
        count: usize,
    },
    /// An object argument of another element class than declared.
    ArgumentClass {
        position: usize,
        name: String,
        expected: String,
        found: String,
    },
    ReturnType { expected: ValueMask, found: ValueType },
    ReturnNotSingleton { count: usize },
    ReturnClass { expected: String, found: String },
}

impl fmt::Display for TypeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingArgument { position, name } => {
                write!(f, "missing required argument {position} ({name})")
            }
            Self::TooManyArguments { max, supplied } => {
                write!(f, "too many arguments supplied ({supplied} given, at most {max})")
            }
            Self::ArgumentType {
                position,
                name,
                expected,
                found,
            } => {
                write!(
                    f,
                    "argument {position} ({name}) cannot be type {found}; expected {expected}"
                )
            }
            Self::ArgumentNotSingleton {
                position,
                name,
                count,
            } => {
                write!(
                    f,
                    "argument {position} ({name}) must be a singleton (size() == 1), but size() == {count}"
                )
            }
            Self::ArgumentClass {
                position,
                name,
                expected,
                found,
            } => {
                write!(
                    f,
                    "argument {position} ({name}) cannot be object element type {found}; expected object element type {expected}"
                )
            }
            Self::ReturnType { expected, found } => {
                write!(f, "return value cannot be type {found}; expected {expected}")
            }
            Self::ReturnNotSingleton { count } => {
                write!(
                    f,
                    "return value must be a singleton (size() == 1), but size() == {count}"
                )
            }
            Self::ReturnClass { expected, found } => {
                write!(
                    f,
                    "return value cannot be object element type {found}; expected object element type {expected}"
                )
            }
        }
    }
}

/// Error produced by a call-shape check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} in {call_kind} {callee}()")]
pub struct TypeError {
    pub call_kind: String,
    pub callee: String,
    pub kind: TypeErrorKind,
}

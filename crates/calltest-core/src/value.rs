//! Runtime-tagged values exchanged between the engine and callables.
//!
//! Every argument and every returned value crosses the engine boundary as a
//! [`Value`]. The tag is nominal: an `int` never matches a `uint`, even when
//! the numbers coincide.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Runtime type tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Nil,
    Bool,
    Int,
    UInt,
    Float,
    #[serde(rename = "string")]
    Str,
    List,
    Map,
    Error,
}

impl ValueType {
    /// Stable label used in diagnostics and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Float => "float",
            Self::Str => "string",
            Self::List => "list",
            Self::Map => "map",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared type of a parameter or return slot, including element types.
///
/// Renders as `list<float>` or `map<uint>` so a signature line shows what a
/// collection holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeShape {
    Scalar(ValueType),
    List(Box<TypeShape>),
    Map(Box<TypeShape>),
}

impl TypeShape {
    #[must_use]
    pub fn list(element: Self) -> Self {
        Self::List(Box::new(element))
    }

    #[must_use]
    pub fn map(element: Self) -> Self {
        Self::Map(Box::new(element))
    }

    /// Top-level tag, the part argument validation compares.
    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        match self {
            Self::Scalar(ty) => *ty,
            Self::List(_) => ValueType::List,
            Self::Map(_) => ValueType::Map,
        }
    }
}

impl From<ValueType> for TypeShape {
    fn from(ty: ValueType) -> Self {
        Self::Scalar(ty)
    }
}

impl fmt::Display for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(ty) => f.write_str(ty.as_str()),
            Self::List(element) => write!(f, "list<{element}>"),
            Self::Map(element) => write!(f, "map<{element}>"),
        }
    }
}

impl Serialize for TypeShape {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Why a [`Value`] does not convert to a typed parameter.
///
/// Messages are predicates meant to follow a subject, as in
/// `parameter 0 element 1 is int, expected float`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("is {given}, expected {expected}")]
    Type { expected: ValueType, given: ValueType },
    #[error("is {value}, out of range for {target}")]
    Range { value: String, target: &'static str },
    #[error("element {index} {inner}")]
    Element {
        index: usize,
        inner: Box<ConversionError>,
    },
    #[error("entry {key:?} {inner}")]
    Entry {
        key: String,
        inner: Box<ConversionError>,
    },
}

impl ConversionError {
    fn mismatch(expected: ValueType, value: &Value) -> Self {
        Self::Type {
            expected,
            given: value.value_type(),
        }
    }

    fn range<T>(value: impl fmt::Display) -> Self {
        Self::Range {
            value: value.to_string(),
            target: std::any::type_name::<T>(),
        }
    }
}

/// An opaque value with a runtime type tag.
///
/// Serializes to its natural JSON form. `Error` carries only its message and
/// is never produced by deserialization; use [`Value::coerce`] with an
/// `error` hint to obtain one from data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    #[serde(skip_deserializing)]
    Error(String),
}

impl Value {
    /// Build an error value from anything printable.
    #[must_use]
    pub fn error(message: impl fmt::Display) -> Self {
        Self::Error(message.to_string())
    }

    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        match self {
            Self::Nil => ValueType::Nil,
            Self::Bool(_) => ValueType::Bool,
            Self::Int(_) => ValueType::Int,
            Self::UInt(_) => ValueType::UInt,
            Self::Float(_) => ValueType::Float,
            Self::Str(_) => ValueType::Str,
            Self::List(_) => ValueType::List,
            Self::Map(_) => ValueType::Map,
            Self::Error(_) => ValueType::Error,
        }
    }

    /// True for a non-nil value that represents a failure outcome.
    #[must_use]
    pub const fn is_error_like(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Message of an error-like value.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Losslessly reinterpret a data-sourced value under a declared shape.
    ///
    /// JSON has no nominal integer or error types, so values loaded from
    /// fixtures are nudged toward the callable's declared types, element by
    /// element for lists and maps. Conversions that would lose information
    /// leave the value untouched, so a real mismatch still surfaces as a type
    /// failure.
    #[must_use]
    pub fn coerce(self, shape: &TypeShape) -> Self {
        match (self, shape) {
            (Self::List(items), TypeShape::List(element)) => {
                Self::List(items.into_iter().map(|item| item.coerce(element)).collect())
            }
            (Self::Map(entries), TypeShape::Map(element)) => Self::Map(
                entries
                    .into_iter()
                    .map(|(key, item)| (key, item.coerce(element)))
                    .collect(),
            ),
            (value, shape) => value.coerce_scalar(shape.value_type()),
        }
    }

    fn coerce_scalar(self, hint: ValueType) -> Self {
        match (self, hint) {
            (Self::Int(n), ValueType::UInt) => u64::try_from(n).map_or(Self::Int(n), Self::UInt),
            (Self::Int(n), ValueType::Float) => {
                #[allow(clippy::cast_precision_loss)]
                let widened = n as f64;
                if widened as i64 == n { Self::Float(widened) } else { Self::Int(n) }
            }
            (Self::UInt(n), ValueType::Float) => {
                #[allow(clippy::cast_precision_loss)]
                let widened = n as f64;
                if widened as u64 == n { Self::Float(widened) } else { Self::UInt(n) }
            }
            (Self::Str(message), ValueType::Error) => Self::Error(message),
            (other, _) => other,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::UInt(a), Self::UInt(b)) => a == b,
            // NaN is reflexive here so a NaN-producing callable can be asserted on.
            (Self::Float(a), Self::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Self::Str(a), Self::Str(b)) | (Self::Error(a), Self::Error(b)) => a == b,
            (Self::List(a), Self::List(b)) => a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y),
            (Self::Map(a), Self::Map(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|((ka, va), (kb, vb))| ka == kb && va == vb)
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::format::format_value(self))
    }
}

/// Extraction of a typed parameter from a [`Value`].
pub trait FromValue: Sized {
    /// Declared parameter type.
    const TYPE: ValueType;

    /// Declared shape, with element types for collections.
    fn shape() -> TypeShape {
        TypeShape::Scalar(Self::TYPE)
    }

    fn from_value(value: &Value) -> Result<Self, ConversionError>;
}

/// Conversion of a typed return value into a [`Value`].
pub trait IntoValue {
    /// Declared return type.
    const TYPE: ValueType;

    /// Declared shape, with element types for collections.
    fn shape() -> TypeShape {
        TypeShape::Scalar(Self::TYPE)
    }

    fn into_value(self) -> Value;
}

macro_rules! impl_signed {
    ($($t:ty),*) => {$(
        impl FromValue for $t {
            const TYPE: ValueType = ValueType::Int;

            fn from_value(value: &Value) -> Result<Self, ConversionError> {
                match value {
                    Value::Int(n) => Self::try_from(*n).map_err(|_| ConversionError::range::<Self>(n)),
                    other => Err(ConversionError::mismatch(<Self as FromValue>::TYPE, other)),
                }
            }
        }

        impl IntoValue for $t {
            const TYPE: ValueType = ValueType::Int;

            fn into_value(self) -> Value {
                Value::Int(i64::from(self))
            }
        }
    )*};
}

macro_rules! impl_unsigned {
    ($($t:ty),*) => {$(
        impl FromValue for $t {
            const TYPE: ValueType = ValueType::UInt;

            fn from_value(value: &Value) -> Result<Self, ConversionError> {
                match value {
                    Value::UInt(n) => Self::try_from(*n).map_err(|_| ConversionError::range::<Self>(n)),
                    other => Err(ConversionError::mismatch(<Self as FromValue>::TYPE, other)),
                }
            }
        }

        impl IntoValue for $t {
            const TYPE: ValueType = ValueType::UInt;

            fn into_value(self) -> Value {
                Value::UInt(u64::from(self))
            }
        }
    )*};
}

impl_signed!(i8, i16, i32, i64);
impl_unsigned!(u8, u16, u32, u64);

impl FromValue for usize {
    const TYPE: ValueType = ValueType::UInt;

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::UInt(n) => Self::try_from(*n).map_err(|_| ConversionError::range::<Self>(n)),
            other => Err(ConversionError::mismatch(<Self as FromValue>::TYPE, other)),
        }
    }
}

impl IntoValue for usize {
    const TYPE: ValueType = ValueType::UInt;

    fn into_value(self) -> Value {
        Value::UInt(u64::try_from(self).unwrap_or(u64::MAX))
    }
}

impl FromValue for f64 {
    const TYPE: ValueType = ValueType::Float;

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Float(x) => Ok(*x),
            other => Err(ConversionError::mismatch(<Self as FromValue>::TYPE, other)),
        }
    }
}

impl IntoValue for f64 {
    const TYPE: ValueType = ValueType::Float;

    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl FromValue for f32 {
    const TYPE: ValueType = ValueType::Float;

    #[allow(clippy::cast_possible_truncation)]
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Float(x) => Ok(*x as Self),
            other => Err(ConversionError::mismatch(<Self as FromValue>::TYPE, other)),
        }
    }
}

impl IntoValue for f32 {
    const TYPE: ValueType = ValueType::Float;

    fn into_value(self) -> Value {
        Value::Float(f64::from(self))
    }
}

impl FromValue for bool {
    const TYPE: ValueType = ValueType::Bool;

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => Err(ConversionError::mismatch(<Self as FromValue>::TYPE, other)),
        }
    }
}

impl IntoValue for bool {
    const TYPE: ValueType = ValueType::Bool;

    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl FromValue for String {
    const TYPE: ValueType = ValueType::Str;

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Str(s) => Ok(s.clone()),
            other => Err(ConversionError::mismatch(<Self as FromValue>::TYPE, other)),
        }
    }
}

impl IntoValue for String {
    const TYPE: ValueType = ValueType::Str;

    fn into_value(self) -> Value {
        Value::Str(self)
    }
}

impl IntoValue for &str {
    const TYPE: ValueType = ValueType::Str;

    fn into_value(self) -> Value {
        Value::Str(self.to_owned())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    const TYPE: ValueType = ValueType::List;

    fn shape() -> TypeShape {
        TypeShape::list(T::shape())
    }

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::List(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    T::from_value(item).map_err(|inner| ConversionError::Element {
                        index,
                        inner: Box::new(inner),
                    })
                })
                .collect(),
            other => Err(ConversionError::mismatch(<Self as FromValue>::TYPE, other)),
        }
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    const TYPE: ValueType = ValueType::List;

    fn shape() -> TypeShape {
        TypeShape::list(T::shape())
    }

    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: FromValue> FromValue for BTreeMap<String, T> {
    const TYPE: ValueType = ValueType::Map;

    fn shape() -> TypeShape {
        TypeShape::map(T::shape())
    }

    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Map(entries) => entries
                .iter()
                .map(|(key, item)| {
                    T::from_value(item)
                        .map(|converted| (key.clone(), converted))
                        .map_err(|inner| ConversionError::Entry {
                            key: key.clone(),
                            inner: Box::new(inner),
                        })
                })
                .collect(),
            other => Err(ConversionError::mismatch(<Self as FromValue>::TYPE, other)),
        }
    }
}

impl<T: IntoValue> IntoValue for BTreeMap<String, T> {
    const TYPE: ValueType = ValueType::Map;

    fn shape() -> TypeShape {
        TypeShape::map(T::shape())
    }

    fn into_value(self) -> Value {
        Value::Map(self.into_iter().map(|(k, v)| (k, v.into_value())).collect())
    }
}

impl<T: IntoValue> From<T> for Value {
    fn from(value: T) -> Self {
        value.into_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_and_uint_are_distinct_types() {
        assert_ne!(Value::Int(3).value_type(), Value::UInt(3).value_type());
        assert_ne!(Value::Int(3), Value::UInt(3));
    }

    #[test]
    fn float_equality_treats_nan_as_equal() {
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_ne!(Value::Float(1.0), Value::Float(1.5));
    }

    #[test]
    fn list_and_map_compare_structurally() {
        let a = Value::from(vec![1_i64, 2, 3]);
        let b = Value::from(vec![1_i64, 2, 3]);
        let c = Value::from(vec![3_i64, 2, 1]);
        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut left = BTreeMap::new();
        left.insert(String::from("go"), 2_u64);
        let mut right = left.clone();
        assert_eq!(Value::from(left.clone()), Value::from(right.clone()));
        right.insert(String::from("rust"), 1);
        assert_ne!(Value::from(left), Value::from(right));
    }

    #[test]
    fn json_deserialization_picks_natural_variants() {
        let values: Vec<Value> =
            serde_json::from_str(r#"[null, true, -4, 18446744073709551615, 2.5, "x", [1], {"k": 1}]"#)
                .expect("valid json");
        let types: Vec<ValueType> = values.iter().map(Value::value_type).collect();
        assert_eq!(
            types,
            vec![
                ValueType::Nil,
                ValueType::Bool,
                ValueType::Int,
                ValueType::UInt,
                ValueType::Float,
                ValueType::Str,
                ValueType::List,
                ValueType::Map,
            ]
        );
    }

    #[test]
    fn coerce_is_lossless() {
        let uint = TypeShape::from(ValueType::UInt);
        assert_eq!(Value::Int(7).coerce(&uint), Value::UInt(7));
        assert_eq!(Value::Int(-7).coerce(&uint), Value::Int(-7));
        assert_eq!(Value::Int(2).coerce(&ValueType::Float.into()), Value::Float(2.0));
        assert_eq!(
            Value::Str(String::from("boom")).coerce(&ValueType::Error.into()),
            Value::error("boom")
        );
        assert_eq!(Value::Float(1.5).coerce(&ValueType::Int.into()), Value::Float(1.5));
    }

    #[test]
    fn coerce_reaches_list_and_map_elements() {
        let floats: Value = serde_json::from_str("[1, 2.5, -3]").expect("valid json");
        assert_eq!(
            floats.coerce(&<Vec<f64> as FromValue>::shape()),
            Value::List(vec![Value::Float(1.0), Value::Float(2.5), Value::Float(-3.0)])
        );

        let counts: Value = serde_json::from_str(r#"{"a": 2, "b": -1}"#).expect("valid json");
        let coerced = counts.coerce(&<BTreeMap<String, u64> as FromValue>::shape());
        let Value::Map(entries) = coerced else {
            panic!("map stays a map");
        };
        assert_eq!(entries["a"], Value::UInt(2));
        assert_eq!(entries["b"], Value::Int(-1), "negative stays int");

        let nested: Value = serde_json::from_str("[[1], [2, 3]]").expect("valid json");
        assert_eq!(
            nested.coerce(&<Vec<Vec<u8>> as FromValue>::shape()),
            Value::from(vec![vec![1_u64], vec![2, 3]])
        );
    }

    #[test]
    fn shapes_render_element_types() {
        assert_eq!(<Vec<f64> as FromValue>::shape().to_string(), "list<float>");
        assert_eq!(<BTreeMap<String, Vec<i8>> as FromValue>::shape().to_string(), "map<list<int>>");
        assert_eq!(<u32 as FromValue>::shape(), TypeShape::Scalar(ValueType::UInt));
        assert_eq!(<Vec<bool> as FromValue>::shape().value_type(), ValueType::List);
    }

    #[test]
    fn error_values_are_error_like_and_nil_is_not() {
        assert!(Value::error("bad").is_error_like());
        assert!(!Value::Nil.is_error_like());
        assert_eq!(Value::error("bad").error_message(), Some("bad"));
    }

    #[test]
    fn narrow_integers_reject_out_of_range_values() {
        let err = i8::from_value(&Value::Int(300)).unwrap_err();
        assert_eq!(err.to_string(), "is 300, out of range for i8");
        assert_eq!(i32::from_value(&Value::Int(-5)), Ok(-5));
        assert_eq!(
            u8::from_value(&Value::Int(5)),
            Err(ConversionError::Type {
                expected: ValueType::UInt,
                given: ValueType::Int,
            })
        );
    }

    #[test]
    fn collection_errors_point_at_the_bad_element() {
        let floats = Value::List(vec![Value::Float(1.0), Value::Int(2)]);
        let err = Vec::<f64>::from_value(&floats).unwrap_err();
        assert_eq!(err.to_string(), "element 1 is int, expected float");

        let mut entries = BTreeMap::new();
        entries.insert(String::from("ok"), Value::UInt(1));
        entries.insert(String::from("big"), Value::UInt(1_000));
        let err = BTreeMap::<String, u8>::from_value(&Value::Map(entries)).unwrap_err();
        assert_eq!(err.to_string(), "entry \"big\" is 1000, out of range for u8");
    }
}

//! Invocation adapter: typed Rust functions behind a dynamic call interface.
//!
//! A [`Function`] wraps any `Fn` of arity 0-5 whose parameters implement
//! [`FromValue`] and whose return implements [`IntoReturn`]. The declared
//! parameter and return types come from the Rust signature, so the engine can
//! validate runtime-tagged arguments against them before calling.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use serde::Serialize;

use crate::error::Failure;
use crate::value::{ConversionError, FromValue, IntoValue, TypeShape, Value, ValueType};

/// Signature of a callable, derived at call time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallableDescriptor {
    /// Human-readable name used in every report line.
    pub name: String,
    /// Declared parameter shapes, in order.
    pub params: Vec<TypeShape>,
    /// Declared return shapes, in order.
    pub returns: Vec<TypeShape>,
}

impl fmt::Display for CallableDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |shapes: &[TypeShape]| {
            shapes
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        write!(f, "{}({})", self.name, join(&self.params))?;
        match self.returns.len() {
            0 => Ok(()),
            1 => write!(f, " -> {}", self.returns[0]),
            _ => write!(f, " -> ({})", join(&self.returns)),
        }
    }
}

/// Anything the engine can invoke dynamically.
pub trait Callable {
    fn descriptor(&self) -> CallableDescriptor;

    /// Perform exactly one call.
    ///
    /// Returns one value per declared return type. Panics raised by the
    /// underlying function propagate unchanged.
    fn call(&self, args: &[Value]) -> Result<Vec<Value>, Failure>;
}

/// Return shapes a wrapped function may have.
///
/// A `Result<T, E>` declares `T`'s slots plus one trailing `error` slot. `Ok`
/// fills the trailing slot with `nil`; `Err` fills `T`'s slots with `nil` and
/// the trailing slot with the error message.
pub trait IntoReturn {
    fn return_types() -> Vec<TypeShape>;

    fn into_values(self) -> Vec<Value>;
}

impl IntoReturn for () {
    fn return_types() -> Vec<TypeShape> {
        Vec::new()
    }

    fn into_values(self) -> Vec<Value> {
        Vec::new()
    }
}

macro_rules! impl_single_return {
    ($($t:ty),*) => {$(
        impl IntoReturn for $t {
            fn return_types() -> Vec<TypeShape> {
                vec![<$t as IntoValue>::shape()]
            }

            fn into_values(self) -> Vec<Value> {
                vec![self.into_value()]
            }
        }
    )*};
}

impl_single_return!(i8, i16, i32, i64, u8, u16, u32, u64, usize, f32, f64, bool, String, &str);

impl<T: IntoValue> IntoReturn for Vec<T> {
    fn return_types() -> Vec<TypeShape> {
        vec![<Self as IntoValue>::shape()]
    }

    fn into_values(self) -> Vec<Value> {
        vec![self.into_value()]
    }
}

impl<T: IntoValue> IntoReturn for BTreeMap<String, T> {
    fn return_types() -> Vec<TypeShape> {
        vec![<Self as IntoValue>::shape()]
    }

    fn into_values(self) -> Vec<Value> {
        vec![self.into_value()]
    }
}

macro_rules! impl_tuple_return {
    ($($t:ident => $v:ident),+) => {
        impl<$($t: IntoValue),+> IntoReturn for ($($t,)+) {
            fn return_types() -> Vec<TypeShape> {
                vec![$($t::shape()),+]
            }

            fn into_values(self) -> Vec<Value> {
                let ($($v,)+) = self;
                vec![$($v.into_value()),+]
            }
        }
    };
}

impl_tuple_return!(A => a, B => b);
impl_tuple_return!(A => a, B => b, C => c);
impl_tuple_return!(A => a, B => b, C => c, D => d);

impl<T: IntoReturn, E: fmt::Display> IntoReturn for Result<T, E> {
    fn return_types() -> Vec<TypeShape> {
        let mut types = T::return_types();
        types.push(TypeShape::Scalar(ValueType::Error));
        types
    }

    fn into_values(self) -> Vec<Value> {
        match self {
            Ok(value) => {
                let mut values = value.into_values();
                values.push(Value::Nil);
                values
            }
            Err(err) => {
                let mut values: Vec<Value> = T::return_types().iter().map(|_| Value::Nil).collect();
                values.push(Value::error(err));
                values
            }
        }
    }
}

/// A function whose signature is known through its argument tuple `A`.
pub trait Handler<A> {
    fn param_types() -> Vec<TypeShape>;

    fn return_types() -> Vec<TypeShape>;

    fn invoke(&self, name: &str, args: &[Value]) -> Result<Vec<Value>, Failure>;
}

fn take<T: FromValue>(name: &str, total: usize, slot: Option<(usize, &Value)>) -> Result<T, Failure> {
    let Some((index, value)) = slot else {
        return Err(Failure::InputArity {
            function: name.to_owned(),
            declared: total,
            given: total.saturating_sub(1),
        });
    };
    T::from_value(value).map_err(|detail| match detail {
        ConversionError::Type { expected, given } => Failure::InputType {
            function: name.to_owned(),
            index,
            declared: expected,
            given,
        },
        detail => Failure::InputValue {
            function: name.to_owned(),
            index,
            detail,
        },
    })
}

macro_rules! impl_handler {
    ($($arg:ident => $var:ident),*) => {
        impl<F, R, $($arg,)*> Handler<($($arg,)*)> for F
        where
            F: Fn($($arg),*) -> R,
            R: IntoReturn,
            $($arg: FromValue,)*
        {
            fn param_types() -> Vec<TypeShape> {
                vec![$($arg::shape()),*]
            }

            fn return_types() -> Vec<TypeShape> {
                R::return_types()
            }

            #[allow(unused_mut, unused_variables)]
            fn invoke(&self, name: &str, args: &[Value]) -> Result<Vec<Value>, Failure> {
                let declared = <Self as Handler<($($arg,)*)>>::param_types().len();
                if args.len() != declared {
                    return Err(Failure::InputArity {
                        function: name.to_owned(),
                        declared,
                        given: args.len(),
                    });
                }
                let mut slots = args.iter().enumerate();
                $(let $var: $arg = take(name, declared, slots.next())?;)*
                Ok((self)($($var),*).into_values())
            }
        }
    };
}

impl_handler!();
impl_handler!(A1 => a1);
impl_handler!(A1 => a1, A2 => a2);
impl_handler!(A1 => a1, A2 => a2, A3 => a3);
impl_handler!(A1 => a1, A2 => a2, A3 => a3, A4 => a4);
impl_handler!(A1 => a1, A2 => a2, A3 => a3, A4 => a4, A5 => a5);

/// A typed Rust function exposed through [`Callable`].
pub struct Function<F, A> {
    name: String,
    func: F,
    _args: PhantomData<fn() -> A>,
}

impl<F, A> Function<F, A>
where
    F: Handler<A>,
{
    /// Wrap `func`, naming it after its Rust type path.
    #[must_use]
    pub fn new(func: F) -> Self {
        Self {
            name: std::any::type_name::<F>().to_owned(),
            func,
            _args: PhantomData,
        }
    }

    /// Override the reported name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl<F, A> Callable for Function<F, A>
where
    F: Handler<A>,
{
    fn descriptor(&self) -> CallableDescriptor {
        CallableDescriptor {
            name: self.name.clone(),
            params: F::param_types(),
            returns: F::return_types(),
        }
    }

    fn call(&self, args: &[Value]) -> Result<Vec<Value>, Failure> {
        self.func.invoke(&self.name, args)
    }
}

impl<F, A> fmt::Debug for Function<F, A>
where
    F: Handler<A>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("descriptor", &self.descriptor())
            .finish_non_exhaustive()
    }
}

/// Shorthand for [`Function::new`].
#[must_use]
pub fn function<A, F: Handler<A>>(func: F) -> Function<F, A> {
    Function::new(func)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum(a: i64, b: i64) -> i64 {
        a + b
    }

    #[test]
    fn descriptor_reflects_rust_signature() {
        let callable = function(sum);
        let descriptor = callable.descriptor();
        assert!(descriptor.name.ends_with("sum"), "got {}", descriptor.name);
        assert_eq!(
            descriptor.params,
            vec![TypeShape::from(ValueType::Int), TypeShape::from(ValueType::Int)]
        );
        assert_eq!(descriptor.returns, vec![TypeShape::Scalar(ValueType::Int)]);
    }

    #[test]
    fn result_return_declares_trailing_error_slot() {
        let divide = function(|a: i64, b: i64| -> Result<i64, String> {
            if b == 0 { Err(String::from("division by zero")) } else { Ok(a / b) }
        })
        .named("divide");
        assert_eq!(
            divide.descriptor().returns,
            vec![TypeShape::from(ValueType::Int), TypeShape::from(ValueType::Error)]
        );
        let ok = divide.call(&[Value::Int(8), Value::Int(2)]).expect("call");
        assert_eq!(ok, vec![Value::Int(4), Value::Nil]);
        let err = divide.call(&[Value::Int(8), Value::Int(0)]).expect("call");
        assert_eq!(err, vec![Value::Nil, Value::error("division by zero")]);
    }

    #[test]
    fn tuple_and_unit_returns() {
        let swap = function(|a: String, b: String| (b, a)).named("swap");
        assert_eq!(
            swap.descriptor().returns,
            vec![TypeShape::from(ValueType::Str), TypeShape::from(ValueType::Str)]
        );
        let out = swap
            .call(&[Value::from("x"), Value::from("y")])
            .expect("call");
        assert_eq!(out, vec![Value::from("y"), Value::from("x")]);

        let noop = function(|| ()).named("noop");
        assert!(noop.descriptor().returns.is_empty());
        assert!(noop.call(&[]).expect("call").is_empty());
    }

    #[test]
    fn call_rejects_wrong_shapes_without_running() {
        let callable = function(sum).named("sum");
        assert!(matches!(
            callable.call(&[Value::Int(1)]),
            Err(Failure::InputArity { declared: 2, given: 1, .. })
        ));
        assert!(matches!(
            callable.call(&[Value::Int(1), Value::from("2")]),
            Err(Failure::InputType { index: 1, .. })
        ));
    }

    #[test]
    fn descriptor_display_is_readable() {
        let callable = function(|xs: Vec<i64>| -> Result<(i64, i64), String> {
            Ok((xs.len() as i64, 0))
        })
        .named("stats");
        assert_eq!(
            callable.descriptor().to_string(),
            "stats(list<int>) -> (int, int, error)"
        );
    }

    #[test]
    fn out_of_range_argument_names_the_narrow_type() {
        let narrow = function(|x: i8| x).named("narrow");
        let err = narrow.call(&[Value::Int(300)]).unwrap_err();
        assert_eq!(err.kind(), crate::error::FailureKind::InputValue);
        assert_eq!(err.to_string(), "narrow parameter 0 is 300, out of range for i8");
    }

    #[test]
    fn mistyped_element_is_reported_by_position() {
        let mean = function(|xs: Vec<f64>| xs.iter().sum::<f64>()).named("mean");
        assert_eq!(mean.descriptor().to_string(), "mean(list<float>) -> float");
        let err = mean
            .call(&[Value::List(vec![Value::Float(1.0), Value::Int(2)])])
            .unwrap_err();
        assert_eq!(err.to_string(), "mean parameter 0 element 1 is int, expected float");

        let counts = function(|m: BTreeMap<String, u64>| m.len()).named("counts");
        let mut entries = BTreeMap::new();
        entries.insert(String::from("a"), Value::from("x"));
        let err = counts.call(&[Value::Map(entries)]).unwrap_err();
        assert_eq!(err.to_string(), "counts parameter 0 entry \"a\" is string, expected uint");
    }
}

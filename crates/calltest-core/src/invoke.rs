//! Dynamic invocation of a validated callable.

use crate::callable::Callable;
use crate::error::Failure;
use crate::value::Value;

/// Perform exactly one call and return the ordered results.
///
/// There is no retry, timeout or isolation. A panic inside the callable
/// unwinds straight through to the caller of the engine.
pub fn invoke(callable: &dyn Callable, args: &[Value]) -> Result<Vec<Value>, Failure> {
    callable.call(args)
}

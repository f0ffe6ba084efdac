//! Signature validation: argument count and nominal argument types.

use crate::callable::CallableDescriptor;
use crate::error::Failure;
use crate::value::Value;

/// Check `args` against the declared parameter list.
///
/// Types must be identical to the declared ones; no widening or coercion is
/// applied. The first violation wins.
pub fn validate_call(descriptor: &CallableDescriptor, args: &[Value]) -> Result<(), Failure> {
    if args.len() != descriptor.params.len() {
        return Err(Failure::InputArity {
            function: descriptor.name.clone(),
            declared: descriptor.params.len(),
            given: args.len(),
        });
    }

    for (index, (declared, arg)) in descriptor.params.iter().zip(args).enumerate() {
        let given = arg.value_type();
        if given != declared.value_type() {
            return Err(Failure::InputType {
                function: descriptor.name.clone(),
                index,
                declared: declared.value_type(),
                given,
            });
        }
    }

    Ok(())
}

//! Parameter/argument type compatibility.

use stubble_types::{is_assignable, is_wrapper_of, wrapped_if_primitive, Type, TypeEnv};

/// Identical types, or a primitive kind and its wrapper class (in either order).
pub fn exactly_equivalent(env: &dyn TypeEnv, first: &Type, second: &Type) -> bool {
    first == second
        || matches!(first, Type::Primitive(p) if is_wrapper_of(env, *p, second))
        || matches!(second, Type::Primitive(p) if is_wrapper_of(env, *p, first))
}

/// Whether a parameter of type `param` accepts an argument whose type is `arg`.
pub fn compatible(env: &dyn TypeEnv, param: &Type, arg: &Type) -> bool {
    exactly_equivalent(env, param, arg) || is_assignable(env, param, arg)
}

/// `declared[first..]` is exactly equivalent to `specified`, position by position.
pub(crate) fn matches_parameter_types(
    env: &dyn TypeEnv,
    declared: &[Type],
    specified: &[Type],
    first: usize,
) -> bool {
    declared.len() == specified.len() + first
        && declared[first..]
            .iter()
            .zip(specified)
            .all(|(declared, specified)| exactly_equivalent(env, declared, specified))
}

/// `declared[first..]` accepts `args`, position by position.
pub(crate) fn accepts_argument_types(
    env: &dyn TypeEnv,
    declared: &[Type],
    args: &[Type],
    first: usize,
) -> bool {
    declared.len() == args.len() + first
        && declared[first..]
            .iter()
            .zip(args)
            .all(|(param, arg)| compatible(env, param, arg))
}

/// `true` if `current` is strictly more specific than `previous`.
///
/// Both vectors are compared with primitives replaced by their wrappers. Every position where they
/// differ must have `current`'s type assignable to `previous`'s, and at least one must differ.
/// Vectors of different lengths are unordered.
pub fn has_more_specific_types(env: &dyn TypeEnv, current: &[Type], previous: &[Type]) -> bool {
    if current.len() != previous.len() {
        return false;
    }

    let mut differs = false;
    for (current, previous) in current.iter().zip(previous) {
        let current = wrapped_if_primitive(env, current);
        let previous = wrapped_if_primitive(env, previous);
        if current == previous {
            continue;
        }
        if !is_assignable(env, &previous, &current) {
            return false;
        }
        differs = true;
    }
    differs
}

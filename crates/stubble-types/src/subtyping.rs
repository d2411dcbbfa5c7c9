use std::collections::{HashSet, VecDeque};

use crate::{ClassId, Type, TypeEnv};

/// `true` if `sub` is `sup` or inherits from it through superclasses or interfaces.
pub fn is_subclass(env: &dyn TypeEnv, sub: ClassId, sup: ClassId) -> bool {
    if sub == sup || sup == env.well_known().object {
        return true;
    }

    let mut queue = VecDeque::from([sub]);
    let mut seen = HashSet::new();
    while let Some(current) = queue.pop_front() {
        if current == sup {
            return true;
        }
        if !seen.insert(current) {
            continue;
        }
        let Some(class) = env.class(current) else {
            continue;
        };
        queue.extend(class.super_class);
        queue.extend(class.interfaces.iter().copied());
    }
    false
}

/// Whether a value of type `from` can be stored in a slot of type `to` without conversion.
///
/// Primitive types are only assignable to themselves; boxing is handled by the callers that want
/// it.
pub fn is_assignable(env: &dyn TypeEnv, to: &Type, from: &Type) -> bool {
    if to == from {
        return true;
    }

    let wk = env.well_known();
    match (to, from) {
        (Type::Class(to), Type::Class(from)) => is_subclass(env, *from, *to),
        (Type::Class(to), Type::Array(_)) => {
            *to == wk.object || *to == wk.cloneable || *to == wk.serializable
        }
        (Type::Array(to), Type::Array(from)) => {
            to.is_reference() && from.is_reference() && is_assignable(env, to, from)
        }
        _ => false,
    }
}

//! The fixed primitive ↔ wrapper table.

use crate::{PrimitiveType, Type, TypeEnv};

/// The primitive kind `ty` boxes, if `ty` is one of the eight wrapper classes.
pub fn primitive_of(env: &dyn TypeEnv, ty: &Type) -> Option<PrimitiveType> {
    match ty {
        Type::Class(id) => env.well_known().primitive_of_wrapper(*id),
        _ => None,
    }
}

/// `true` if `other` is the wrapper class of `primitive`.
pub fn is_wrapper_of(env: &dyn TypeEnv, primitive: PrimitiveType, other: &Type) -> bool {
    primitive_of(env, other) == Some(primitive)
}

/// Replace a primitive type by its wrapper class; other types are returned unchanged.
pub fn wrapped_if_primitive(env: &dyn TypeEnv, ty: &Type) -> Type {
    match ty {
        Type::Primitive(p) => Type::Class(env.well_known().wrapper(*p)),
        other => other.clone(),
    }
}

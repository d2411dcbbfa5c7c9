use crate::{ClassId, TypeEnv};

/// The type a generated class stands in for.
///
/// Proxy and mock classes are marked synthetic. Walking from `class`, each synthetic class is
/// replaced by its superclass, or by its first interface when it directly extends the root type
/// (interface-based proxies). Non-synthetic classes are returned unchanged.
pub fn declared_type_of(env: &dyn TypeEnv, class: ClassId) -> ClassId {
    let root = env.well_known().object;
    let mut current = class;

    // Bounded by the number of ancestors; a malformed cyclic chain stops at the start class.
    for _ in 0..64 {
        let Some(info) = env.class(current) else {
            return current;
        };
        if !info.is_synthetic {
            return current;
        }
        current = match info.super_class {
            Some(super_class) if super_class != root => super_class,
            _ => match info.interfaces.first() {
                Some(iface) => *iface,
                None => return current,
            },
        };
    }
    class
}

//! Java-like rendering of types for diagnostics.

use crate::{Type, TypeEnv};

/// Package prefix dropped from rendered names so messages stay short.
pub const JAVA_LANG_PREFIX: &str = "java.lang.";

/// Canonical name of `ty` (`int`, `com.example.Foo`, `java.lang.String[]`).
pub fn type_name(env: &dyn TypeEnv, ty: &Type) -> String {
    match ty {
        Type::Void => "void".to_string(),
        Type::Primitive(p) => p.name().to_string(),
        Type::Class(id) => match env.class(*id) {
            Some(class) => class.name.clone(),
            None => format!("<unknown#{}>", id.to_raw()),
        },
        Type::Array(component) => format!("{}[]", type_name(env, component)),
    }
}

/// Remove every occurrence of `prefix` from `name`.
pub fn trim_package(name: &str, prefix: &str) -> String {
    if prefix.is_empty() {
        return name.to_string();
    }
    name.replace(prefix, "")
}

/// `(int, String, com.example.Foo)`, trimming `prefix` from each name.
pub fn parameter_types_description(env: &dyn TypeEnv, types: &[Type], prefix: &str) -> String {
    let mut out = String::with_capacity(16 * types.len() + 2);
    out.push('(');
    for (idx, ty) in types.iter().enumerate() {
        if idx > 0 {
            out.push_str(", ");
        }
        out.push_str(&trim_package(&type_name(env, ty), prefix));
    }
    out.push(')');
    out
}

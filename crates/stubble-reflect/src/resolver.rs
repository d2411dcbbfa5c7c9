//! Resolution across a class and its ancestors.

use std::collections::HashSet;

use stubble_types::{ClassId, MethodHandle, Type};

use crate::compat::has_more_specific_types;
use crate::matcher::{Candidate, MatchMode};
use crate::{ReflectionError, Reflector};

/// `start`, then each superclass up to (excluding) the root type.
pub(crate) struct ClassChain<'r, 'env> {
    reflector: &'r Reflector<'env>,
    next: Option<ClassId>,
    seen: HashSet<ClassId>,
}

impl Iterator for ClassChain<'_, '_> {
    type Item = ClassId;

    fn next(&mut self) -> Option<ClassId> {
        let current = self.next.take()?;
        if !self.seen.insert(current) {
            return None;
        }
        self.next = self
            .reflector
            .env
            .class(current)
            .and_then(|class| class.super_class)
            .filter(|super_class| *super_class != self.reflector.root);
        Some(current)
    }
}

impl<'env> Reflector<'env> {
    pub(crate) fn class_chain(&self, start: ClassId) -> ClassChain<'_, 'env> {
        ClassChain {
            reflector: self,
            next: Some(start),
            seen: HashSet::new(),
        }
    }

    /// Best candidate for `name(supplied)` over `class` and its ancestors.
    pub fn resolve(
        &self,
        class: ClassId,
        name: &str,
        supplied: &[Type],
        mode: MatchMode,
    ) -> Option<Candidate> {
        let mut best: Option<Candidate> = None;

        for level in self.class_chain(class) {
            let Some(candidate) = self.find_candidate_in_class(level, name, supplied, mode) else {
                continue;
            };
            // A member from an ancestor only displaces a strictly less specific one.
            let replace = match &best {
                None => true,
                Some(current) => has_more_specific_types(
                    self.env,
                    candidate.real_params(),
                    current.real_params(),
                ),
            };
            if replace {
                best = Some(candidate);
            }
        }

        if let Some(found) = &best {
            tracing::debug!(
                target: "stubble.reflect",
                method = %self.method_signature(found.method()),
                declaring = %self.trimmed_type_name(&Type::class(found.declaring_class())),
                ?mode,
                "resolved"
            );
        }
        best
    }

    /// Member declared as `name(param_types)`, allowing primitive/wrapper equivalence.
    pub fn find_specified_method(
        &self,
        class: ClassId,
        name: &str,
        param_types: &[Type],
    ) -> Result<MethodHandle, ReflectionError> {
        self.resolve(class, name, param_types, MatchMode::Exact)
            .map(Candidate::into_method)
            .ok_or_else(|| ReflectionError::SpecifiedMethodNotFound {
                name: name.to_string(),
                params: self.describe_types(param_types),
            })
    }

    /// Most specific member `name` accepting arguments of `arg_types`.
    pub fn find_compatible_method(
        &self,
        class: ClassId,
        name: &str,
        arg_types: &[Type],
    ) -> Result<MethodHandle, ReflectionError> {
        self.find_compatible_method_if_available(class, name, arg_types)
            .ok_or_else(|| ReflectionError::NoCompatibleMethod {
                name: name.to_string(),
                args: self.describe_types(arg_types),
            })
    }

    pub fn find_compatible_method_if_available(
        &self,
        class: ClassId,
        name: &str,
        arg_types: &[Type],
    ) -> Option<MethodHandle> {
        self.resolve(class, name, arg_types, MatchMode::Coercive)
            .map(Candidate::into_method)
    }

    /// Like [`Self::find_compatible_method`], for callers without a receiver: the member found
    /// must be static.
    pub fn find_compatible_static_method(
        &self,
        class: ClassId,
        name: &str,
        arg_types: &[Type],
    ) -> Result<MethodHandle, ReflectionError> {
        let Some(method) = self.find_compatible_method_if_available(class, name, arg_types) else {
            return Err(ReflectionError::NoCompatibleStaticMethod {
                name: name.to_string(),
                args: self.describe_types(arg_types),
            });
        };
        if !method.is_static() {
            return Err(ReflectionError::InstanceMethodWithoutReceiver {
                signature: self.method_signature(&method),
            });
        }
        Ok(method)
    }

    /// Public member with exactly `param_types` (no boxing equivalence), searched on `class`,
    /// all of its superclasses including the root, then its interfaces.
    pub fn find_public_method(
        &self,
        class: ClassId,
        name: &str,
        param_types: &[Type],
    ) -> Option<MethodHandle> {
        let mut interfaces = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(class);

        while let Some(id) = current {
            if !seen.insert(id) {
                break;
            }
            let info = self.env.class(id)?;
            if let Some(found) = public_member(info.methods.iter(), name, param_types) {
                return Some(found);
            }
            interfaces.extend(info.interfaces.iter().copied());
            current = info.super_class;
        }

        let mut idx = 0;
        while let Some(id) = interfaces.get(idx).copied() {
            idx += 1;
            if !seen.insert(id) {
                continue;
            }
            let Some(info) = self.env.class(id) else {
                continue;
            };
            if let Some(found) = public_member(info.methods.iter(), name, param_types) {
                return Some(found);
            }
            interfaces.extend(info.interfaces.iter().copied());
        }

        None
    }
}

fn public_member<'a>(
    mut methods: impl Iterator<Item = &'a MethodHandle>,
    name: &str,
    param_types: &[Type],
) -> Option<MethodHandle> {
    methods
        .find(|m| m.is_public() && m.name() == name && m.params() == param_types)
        .cloned()
}

//! Matching members declared directly on one class.

use stubble_types::{ClassId, MethodHandle, Type, TypeEnv};

use crate::compat::{accepts_argument_types, has_more_specific_types, matches_parameter_types};
use crate::Reflector;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Every parameter type is exactly equivalent to the supplied one. Used for explicit
    /// parameter-type descriptors.
    Exact,
    /// Exactly equivalent or assignable. Used for types derived from argument values.
    Coercive,
}

/// A member that matched, with the index of its first parameter bound from the caller's list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    method: MethodHandle,
    first_real_parameter: usize,
}

impl Candidate {
    pub fn method(&self) -> &MethodHandle {
        &self.method
    }

    pub fn declaring_class(&self) -> ClassId {
        self.method.declaring_class()
    }

    /// `true` when the member takes a leading context parameter that the caller does not supply.
    pub fn takes_context(&self) -> bool {
        self.first_real_parameter == 1
    }

    /// Formal parameters matched against the caller's list.
    pub fn real_params(&self) -> &[Type] {
        &self.method.params()[self.first_real_parameter..]
    }

    pub fn into_method(self) -> MethodHandle {
        self.method
    }
}

/// Offset of the first formal parameter matched against `supplied`.
///
/// `Some(0)` when the counts agree, `Some(1)` when the member declares exactly one extra leading
/// parameter of the context type, `None` otherwise.
pub(crate) fn index_of_first_real_parameter(
    declared: &[Type],
    supplied: &[Type],
    context_type: Option<ClassId>,
) -> Option<usize> {
    match declared.len().checked_sub(supplied.len()) {
        Some(0) => Some(0),
        Some(1) => match (context_type, declared.first()) {
            (Some(context), Some(Type::Class(first))) if *first == context => Some(1),
            _ => None,
        },
        _ => None,
    }
}

/// Whether `challenger` should replace `incumbent`, both declared on the same class.
///
/// A strictly more specific parameter list wins. Between lists of equal specificity (which only
/// happens when they differ by boxing) a list identical to the supplied types wins; any other tie
/// keeps the incumbent.
fn prefers(
    env: &dyn TypeEnv,
    challenger: &Candidate,
    incumbent: &Candidate,
    supplied: &[Type],
) -> bool {
    let (challenger, incumbent) = (challenger.real_params(), incumbent.real_params());
    if has_more_specific_types(env, challenger, incumbent) {
        return true;
    }
    if has_more_specific_types(env, incumbent, challenger) {
        return false;
    }
    challenger == supplied && incumbent != supplied
}

impl Reflector<'_> {
    /// Best member named `name` declared on `class` itself.
    pub(crate) fn find_candidate_in_class(
        &self,
        class: ClassId,
        name: &str,
        supplied: &[Type],
        mode: MatchMode,
    ) -> Option<Candidate> {
        let info = self.env.class(class)?;
        let mut found: Option<Candidate> = None;

        for method in info.methods.iter().filter(|m| m.name() == name) {
            let declared = method.params();
            let Some(first) = index_of_first_real_parameter(declared, supplied, self.context_type)
            else {
                continue;
            };

            let accepted = match mode {
                MatchMode::Exact => matches_parameter_types(self.env, declared, supplied, first),
                MatchMode::Coercive => {
                    matches_parameter_types(self.env, declared, supplied, first)
                        || accepts_argument_types(self.env, declared, supplied, first)
                }
            };
            if !accepted {
                continue;
            }

            let candidate = Candidate {
                method: method.clone(),
                first_real_parameter: first,
            };
            let replace = match &found {
                None => true,
                Some(current) => prefers(self.env, &candidate, current, supplied),
            };
            if replace {
                tracing::trace!(
                    target: "stubble.reflect",
                    class = %info.name,
                    method = %self.method_signature(&candidate.method),
                    "candidate kept"
                );
                found = Some(candidate);
            }
        }

        found
    }
}

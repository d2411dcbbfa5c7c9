//! Binding and invoking a resolved member.

use stubble_types::{
    classify_throwable, is_assignable, is_subclass, ClassId, MethodHandle, ReflectiveAccess,
    StackFrame, ThrowableKind, Thrown, Type, Value,
};

use crate::stack::filter_stack_trace;
use crate::{Raised, ReflectionError, Reflector};

impl Reflector<'_> {
    /// Invoke `method` under the unchecked-wrapping contract.
    ///
    /// Errors and unchecked exceptions raised by the member come back unchanged
    /// ([`ReflectionError::TargetError`], [`ReflectionError::TargetUnchecked`]); a checked
    /// exception is wrapped in [`ReflectionError::UndeclaredChecked`] with the original as its
    /// source.
    pub fn invoke_method(
        &self,
        target: Option<&Value>,
        method: &MethodHandle,
        args: &[Value],
    ) -> Result<Value, ReflectionError> {
        match self.call(target, method, args) {
            Ok(value) => Ok(value),
            Err(Raised::Reflection(err)) => Err(err),
            Err(Raised::Target { thrown, kind }) => {
                tracing::debug!(
                    target: "stubble.reflect",
                    method = %self.method_signature(method),
                    thrown = %thrown,
                    ?kind,
                    "member raised"
                );
                Err(match kind {
                    ThrowableKind::Error => ReflectionError::TargetError(thrown),
                    ThrowableKind::Unchecked => ReflectionError::TargetUnchecked(thrown),
                    ThrowableKind::Checked => ReflectionError::UndeclaredChecked(thrown),
                })
            }
        }
    }

    /// Invoke `method` under the checked-forwarding contract: anything the member raises is
    /// returned as [`Raised::Target`], the same object that was thrown.
    pub fn invoke_method_with_checked_throws(
        &self,
        target: Option<&Value>,
        method: &MethodHandle,
        args: &[Value],
    ) -> Result<Value, Raised> {
        self.call(target, method, args)
    }

    fn call(
        &self,
        target: Option<&Value>,
        method: &MethodHandle,
        args: &[Value],
    ) -> Result<Value, Raised> {
        self.ensure_accessible(method)?;

        let receiver = self.bind_receiver(target, method)?;
        let bound = self.bind_arguments(method, args)?;

        let implementation = match &receiver {
            Some((_, receiver_class)) => self.select_override(*receiver_class, method),
            None => method.clone(),
        };
        let Some(body) = implementation.body() else {
            let thrown = Thrown::new(
                self.env,
                self.env.well_known().abstract_method_error,
                self.qualified_signature(&implementation),
            );
            return Err(Raised::Target {
                thrown,
                kind: ThrowableKind::Error,
            });
        };

        body.call(receiver.as_ref().map(|(value, _)| value), &bound)
            .map_err(|thrown| {
                let kind = classify_throwable(self.env, thrown.class());
                Raised::Target { thrown, kind }
            })
    }

    /// Suppress access checks on `method` unless its class forbids it.
    pub fn ensure_accessible(&self, method: &MethodHandle) -> Result<(), ReflectionError> {
        if method.is_accessible() {
            return Ok(());
        }

        let restricted = self
            .env
            .class(method.declaring_class())
            .is_some_and(|class| class.reflective_access == ReflectiveAccess::Restricted);
        if restricted {
            return Err(ReflectionError::AccessDenied {
                signature: self.qualified_signature(method),
            });
        }

        if method.set_accessible() {
            tracing::trace!(
                target: "stubble.reflect",
                method = %self.qualified_signature(method),
                "access checks suppressed"
            );
        }
        Ok(())
    }

    fn bind_receiver(
        &self,
        target: Option<&Value>,
        method: &MethodHandle,
    ) -> Result<Option<(Value, ClassId)>, ReflectionError> {
        if method.is_static() {
            return Ok(None);
        }

        let Some(receiver) = target.filter(|value| !value.is_null()) else {
            return Err(self.binding_failure(method, "no receiver for instance method".to_string()));
        };
        let Some(receiver_class) = receiver.runtime_class(self.env) else {
            return Err(self.binding_failure(method, "receiver has no class".to_string()));
        };
        if !is_subclass(self.env, receiver_class, method.declaring_class()) {
            return Err(self.binding_failure(
                method,
                "object is not an instance of declaring class".to_string(),
            ));
        }
        Ok(Some((receiver.clone(), receiver_class)))
    }

    fn bind_arguments(
        &self,
        method: &MethodHandle,
        args: &[Value],
    ) -> Result<Vec<Value>, ReflectionError> {
        let params = method.params();
        if params.len() != args.len() {
            return Err(self.binding_failure(
                method,
                format!(
                    "wrong number of arguments: {} expected: {}",
                    args.len(),
                    params.len()
                ),
            ));
        }

        params
            .iter()
            .zip(args)
            .enumerate()
            .map(|(index, (param, arg))| {
                self.bind_value(param, arg).ok_or_else(|| {
                    self.binding_failure(
                        method,
                        format!("argument type mismatch at position {index}"),
                    )
                })
            })
            .collect()
    }

    /// `arg` as passed to a parameter of type `param`: unboxed and widened for primitives,
    /// unchanged for references.
    fn bind_value(&self, param: &Type, arg: &Value) -> Option<Value> {
        match param {
            Type::Void => None,
            Type::Primitive(primitive) => arg.widen_to(*primitive),
            Type::Class(_) | Type::Array(_) => match arg {
                Value::Null => Some(Value::Null),
                Value::Void => None,
                other => {
                    let class = other.runtime_class(self.env)?;
                    is_assignable(self.env, param, &Type::class(class)).then(|| other.clone())
                }
            },
        }
    }

    /// The member actually run for an instance call on a receiver of class `receiver_class`:
    /// the nearest non-private override with identical parameters, or `method` itself.
    fn select_override(&self, receiver_class: ClassId, method: &MethodHandle) -> MethodHandle {
        if method.is_private() {
            return method.clone();
        }

        let mut current = Some(receiver_class);
        let mut remaining = 256;
        while let Some(class) = current {
            if class == method.declaring_class() || remaining == 0 {
                break;
            }
            remaining -= 1;

            let Some(info) = self.env.class(class) else {
                break;
            };
            let found = info.methods.iter().find(|candidate| {
                !candidate.is_static()
                    && !candidate.is_private()
                    && candidate.name() == method.name()
                    && candidate.params() == method.params()
            });
            if let Some(found) = found {
                return found.clone();
            }
            current = info.super_class;
        }
        method.clone()
    }

    fn binding_failure(&self, method: &MethodHandle, detail: String) -> ReflectionError {
        // Innermost first: the member that rejected its arguments, then the host's callers.
        let frames: Vec<StackFrame> = std::iter::once(StackFrame::new(
            self.class_name(method.declaring_class()),
            method.name(),
        ))
        .chain(self.call_site.iter().cloned())
        .collect();

        let cause = Thrown::new(
            self.env,
            self.env.well_known().illegal_argument_exception,
            detail,
        )
        .with_stack(frames);

        ReflectionError::InvalidArguments {
            signature: self.qualified_signature(method),
            cause: filter_stack_trace(cause, &self.internal_frame_prefixes),
        }
    }

    fn class_name(&self, class: ClassId) -> String {
        stubble_types::type_name(self.env, &Type::class(class))
    }

    /// `com.example.Foo.bar(int, String)`.
    pub(crate) fn qualified_signature(&self, method: &MethodHandle) -> String {
        format!(
            "{}.{}",
            self.trimmed_type_name(&Type::class(method.declaring_class())),
            self.method_signature(method)
        )
    }
}

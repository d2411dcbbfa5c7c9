//! Dynamic member resolution and invocation.
//!
//! Given a runtime type, a member name and either argument values or explicit parameter types,
//! [`Reflector`] selects the single best-matching member across the type's ancestor chain,
//! binds arguments to it, invokes it and maps whatever the member raises onto one of two
//! propagation contracts:
//!
//! - unchecked-wrapping ([`Reflector::invoke_method`]): errors and unchecked exceptions are
//!   re-raised unchanged, checked exceptions are wrapped in
//!   [`ReflectionError::UndeclaredChecked`];
//! - checked-forwarding ([`Reflector::invoke_method_with_checked_throws`]): everything the member
//!   raises comes back as [`Raised::Target`], untouched.
//!
//! Every call recomputes its resolution; nothing is cached. The only shared effect is the one-way
//! accessibility flag on [`MethodHandle`]s, so a `Reflector` can be used from many threads at
//! once.

#![forbid(unsafe_code)]

mod args;
mod compat;
mod delegate;
mod error;
mod handler;
mod invoke;
mod matcher;
mod resolver;
mod stack;

use stubble_config::ReflectionConfig;
use stubble_types::{
    parameter_types_description, trim_package, type_name, ClassId, MethodHandle, StackFrame, Type,
    TypeEnv, Value,
};

pub use args::{arguments_with_extra_first_value, AdaptedArguments};
pub use compat::{compatible, exactly_equivalent, has_more_specific_types};
pub use delegate::{DelegateInvoker, InvocationContext};
pub use error::{FailureKind, HandlerKind, Raised, ReflectionError, SetupError};
pub use matcher::{Candidate, MatchMode};
pub use stack::filter_stack_trace;

/// Resolution and invocation over one [`TypeEnv`].
#[derive(Clone)]
pub struct Reflector<'env> {
    env: &'env dyn TypeEnv,
    root: ClassId,
    context_type: Option<ClassId>,
    delegate_type: Option<ClassId>,
    trimmed_prefix: String,
    internal_frame_prefixes: Vec<String>,
    call_site: Vec<StackFrame>,
}

impl std::fmt::Debug for Reflector<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reflector")
            .field("root", &self.root)
            .field("context_type", &self.context_type)
            .field("delegate_type", &self.delegate_type)
            .finish_non_exhaustive()
    }
}

impl<'env> Reflector<'env> {
    /// A reflector using the platform's well-known root, context and delegate types.
    pub fn new(env: &'env dyn TypeEnv) -> Self {
        let wk = env.well_known();
        let defaults = ReflectionConfig::default();
        Self {
            env,
            root: wk.object,
            context_type: Some(wk.invocation),
            delegate_type: Some(wk.delegate),
            trimmed_prefix: defaults.trimmed_package_prefix,
            internal_frame_prefixes: defaults.internal_frame_prefixes,
            call_site: Vec::new(),
        }
    }

    /// A reflector whose special types are looked up by the names in `config`.
    pub fn with_config(
        env: &'env dyn TypeEnv,
        config: &ReflectionConfig,
    ) -> Result<Self, SetupError> {
        let lookup = |name: &str| {
            env.lookup_class(name)
                .ok_or_else(|| SetupError::UnknownType(name.to_string()))
        };

        let root = lookup(&config.root_type)?;
        let context_type = config
            .context_type
            .as_deref()
            .filter(|name| !name.is_empty())
            .map(lookup)
            .transpose()?;
        let delegate_type = lookup(&config.delegate_type)?;

        Ok(Self {
            env,
            root,
            context_type,
            delegate_type: Some(delegate_type),
            trimmed_prefix: config.trimmed_package_prefix.clone(),
            internal_frame_prefixes: config.internal_frame_prefixes.clone(),
            call_site: Vec::new(),
        })
    }

    /// Record the host's stack at the point of the call, innermost frame first.
    ///
    /// Binding failures report these frames below the target member, minus any frame whose
    /// class matches one of the configured internal prefixes.
    pub fn with_call_site(mut self, frames: Vec<StackFrame>) -> Self {
        self.call_site = frames;
        self
    }

    pub fn root_type(&self) -> ClassId {
        self.root
    }

    pub fn context_type(&self) -> Option<ClassId> {
        self.context_type
    }

    /// Resolve by explicit parameter types and invoke, wrapping checked exceptions.
    pub fn invoke(
        &self,
        class: ClassId,
        target: Option<&Value>,
        name: &str,
        param_types: &[Type],
        args: &[Value],
    ) -> Result<Value, ReflectionError> {
        let method = self.find_specified_method(class, name, param_types)?;
        self.invoke_method(target, &method, args)
    }

    /// Resolve by explicit parameter types and invoke, forwarding whatever the member raises.
    pub fn invoke_with_checked_throws(
        &self,
        class: ClassId,
        target: Option<&Value>,
        name: &str,
        param_types: &[Type],
        args: &[Value],
    ) -> Result<Value, Raised> {
        let method = self.find_specified_method(class, name, param_types)?;
        self.invoke_method_with_checked_throws(target, &method, args)
    }

    /// Resolve by the dynamic types of `args` and invoke on `target`.
    pub fn invoke_instance(
        &self,
        class: ClassId,
        target: &Value,
        name: &str,
        args: &[Value],
    ) -> Result<Value, ReflectionError> {
        let adapted = self.argument_types_from_values(args)?;
        let method = self.find_compatible_method(class, name, &adapted.types)?;
        self.invoke_method(Some(target), &method, &adapted.values)
    }

    /// Resolve by the dynamic types of `args` and invoke without a receiver.
    ///
    /// Fails with [`ReflectionError::InstanceMethodWithoutReceiver`] when the best candidate is an
    /// instance member.
    pub fn invoke_static(
        &self,
        class: ClassId,
        name: &str,
        args: &[Value],
    ) -> Result<Value, ReflectionError> {
        let adapted = self.argument_types_from_values(args)?;
        let method = self.find_compatible_static_method(class, name, &adapted.types)?;
        self.invoke_method(None, &method, &adapted.values)
    }

    /// Invoke the public member `name(param_types)` if `class` has one; `Ok(None)` otherwise.
    pub fn invoke_public_if_available(
        &self,
        class: ClassId,
        target: Option<&Value>,
        name: &str,
        param_types: &[Type],
        args: &[Value],
    ) -> Result<Option<Value>, ReflectionError> {
        let Some(method) = self.find_public_method(class, name, param_types) else {
            return Ok(None);
        };
        self.invoke_method(target, &method, args).map(Some)
    }

    pub(crate) fn trimmed_type_name(&self, ty: &Type) -> String {
        trim_package(&type_name(self.env, ty), &self.trimmed_prefix)
    }

    pub(crate) fn describe_types(&self, types: &[Type]) -> String {
        parameter_types_description(self.env, types, &self.trimmed_prefix)
    }

    /// `name(ParamType, ...)` with the configured package prefix trimmed.
    pub fn method_signature(&self, method: &MethodHandle) -> String {
        format!("{}{}", method.name(), self.describe_types(method.params()))
    }
}

/// Number of formal parameters of `method`, including a synthetic context parameter.
pub fn parameter_count(method: &MethodHandle) -> usize {
    method.params().len()
}

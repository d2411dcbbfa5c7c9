//! Dispatch of intercepted calls to a delegate or invocation-handler object.

use std::sync::atomic::{AtomicUsize, Ordering};

use stubble_types::{MethodHandle, ObjectRef, Type, Value};

use crate::args::arguments_with_extra_first_value;
use crate::{Raised, ReflectionError, Reflector};

/// Payload of the context value passed to handlers declaring the context parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationContext {
    /// Rendered signature of the intercepted member.
    pub invoked_member: String,
    /// 1-based count of calls dispatched through the owning invoker, this one included.
    pub invocation_count: usize,
}

/// Calls the unique handler member of `handler` for every intercepted invocation.
#[derive(Debug)]
pub struct DelegateInvoker<'env> {
    reflector: Reflector<'env>,
    handler: Value,
    method: MethodHandle,
    takes_context: bool,
    invocations: AtomicUsize,
}

impl<'env> DelegateInvoker<'env> {
    pub fn new(reflector: Reflector<'env>, handler: Value) -> Result<Self, ReflectionError> {
        let method = reflector.find_non_private_handler_method(&handler)?;
        let takes_context = match (reflector.context_type(), method.params().first()) {
            (Some(context), Some(Type::Class(first))) => *first == context,
            _ => false,
        };
        Ok(Self {
            reflector,
            handler,
            method,
            takes_context,
            invocations: AtomicUsize::new(0),
        })
    }

    pub fn handler_method(&self) -> &MethodHandle {
        &self.method
    }

    pub fn takes_context(&self) -> bool {
        self.takes_context
    }

    pub fn invocation_count(&self) -> usize {
        self.invocations.load(Ordering::Acquire)
    }

    /// Run the handler for one intercepted call to `invoked_member`.
    ///
    /// Whatever the handler raises is returned as it was raised.
    pub fn invoke(&self, invoked_member: &str, args: &[Value]) -> Result<Value, Raised> {
        let count = self.invocations.fetch_add(1, Ordering::AcqRel) + 1;

        let args = match self.reflector.context_type() {
            Some(context) if self.takes_context => {
                let context = Value::Object(ObjectRef::with_payload(
                    context,
                    InvocationContext {
                        invoked_member: invoked_member.to_string(),
                        invocation_count: count,
                    },
                ));
                arguments_with_extra_first_value(args, context)
            }
            _ => args.to_vec(),
        };

        tracing::trace!(
            target: "stubble.reflect",
            invoked = invoked_member,
            handler = %self.reflector.method_signature(&self.method),
            count,
            "dispatching to handler"
        );
        self.reflector
            .invoke_method_with_checked_throws(Some(&self.handler), &self.method, &args)
    }
}

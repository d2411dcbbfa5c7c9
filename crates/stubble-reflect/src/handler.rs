//! Unique-handler search: the one eligible instance member of a handler object's class.

use stubble_types::{is_subclass, ClassId, MethodHandle, Value};

use crate::{HandlerKind, ReflectionError, Reflector};

impl Reflector<'_> {
    /// The single non-private, non-static member declared on the handler's class or, failing
    /// that, the nearest ancestor declaring any.
    ///
    /// Two eligible members on the same level are an [`ReflectionError::AmbiguousHandler`]; an
    /// ancestor is never consulted once a level has produced a member.
    pub fn find_non_private_handler_method(
        &self,
        handler: &Value,
    ) -> Result<MethodHandle, ReflectionError> {
        if handler.is_null() {
            return Err(ReflectionError::NullArgument { index: 0 });
        }
        let Some(class) = handler.runtime_class(self.env) else {
            return Err(ReflectionError::NullArgument { index: 0 });
        };
        let kind = self.handler_kind(class);

        for level in self.class_chain(class) {
            let Some(info) = self.env.class(level) else {
                break;
            };

            let mut eligible = info
                .methods
                .iter()
                .filter(|method| !method.is_private() && !method.is_static());
            let Some(first) = eligible.next() else {
                continue;
            };
            if let Some(second) = eligible.next() {
                return Err(ReflectionError::AmbiguousHandler {
                    kind,
                    first: self.method_signature(first),
                    second: self.method_signature(second),
                });
            }

            tracing::debug!(
                target: "stubble.reflect",
                %kind,
                class = %info.name,
                method = %self.method_signature(first),
                "handler found"
            );
            return Ok(first.clone());
        }

        Err(ReflectionError::NoHandlerFound)
    }

    fn handler_kind(&self, class: ClassId) -> HandlerKind {
        match self.delegate_type {
            Some(delegate) if is_subclass(self.env, class, delegate) => HandlerKind::Delegate,
            _ => HandlerKind::InvocationHandler,
        }
    }
}

//! Failures raised by invoked members.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::{is_subclass, ClassId, TypeEnv};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame {
    pub class_name: String,
    pub method_name: String,
}

impl StackFrame {
    pub fn new(class_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: method_name.into(),
        }
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at {}.{}", self.class_name, self.method_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrowableKind {
    /// Subclass of `java.lang.Error`.
    Error,
    /// Subclass of `java.lang.RuntimeException`.
    Unchecked,
    Checked,
}

pub fn classify_throwable(env: &dyn TypeEnv, class: ClassId) -> ThrowableKind {
    let wk = env.well_known();
    if is_subclass(env, class, wk.error) {
        ThrowableKind::Error
    } else if is_subclass(env, class, wk.runtime_exception) {
        ThrowableKind::Unchecked
    } else {
        ThrowableKind::Checked
    }
}

#[derive(Debug, Clone)]
struct ThrownData {
    class: ClassId,
    class_name: String,
    message: Option<String>,
    cause: Option<Thrown>,
    stack: Vec<StackFrame>,
}

/// A thrown object. Clones share identity: [`Thrown::same_instance`] tells whether two handles
/// refer to the object that was originally raised.
#[derive(Clone)]
pub struct Thrown(Arc<ThrownData>);

impl Thrown {
    pub fn new(env: &dyn TypeEnv, class: ClassId, message: impl Into<String>) -> Self {
        Self::build(env, class, Some(message.into()), None)
    }

    pub fn without_message(env: &dyn TypeEnv, class: ClassId) -> Self {
        Self::build(env, class, None, None)
    }

    pub fn with_cause(
        env: &dyn TypeEnv,
        class: ClassId,
        message: impl Into<String>,
        cause: Thrown,
    ) -> Self {
        Self::build(env, class, Some(message.into()), Some(cause))
    }

    fn build(
        env: &dyn TypeEnv,
        class: ClassId,
        message: Option<String>,
        cause: Option<Thrown>,
    ) -> Self {
        let class_name = env
            .class(class)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| format!("<unknown#{}>", class.to_raw()));
        Self(Arc::new(ThrownData {
            class,
            class_name,
            message,
            cause,
            stack: Vec::new(),
        }))
    }

    /// Attach captured frames, innermost first. Only meaningful before the object is shared.
    pub fn with_stack(mut self, stack: Vec<StackFrame>) -> Self {
        Arc::make_mut(&mut self.0).stack = stack;
        self
    }

    pub fn class(&self) -> ClassId {
        self.0.class
    }

    pub fn class_name(&self) -> &str {
        &self.0.class_name
    }

    pub fn message(&self) -> Option<&str> {
        self.0.message.as_deref()
    }

    pub fn cause(&self) -> Option<&Thrown> {
        self.0.cause.as_ref()
    }

    pub fn stack(&self) -> &[StackFrame] {
        &self.0.stack
    }

    pub fn same_instance(&self, other: &Thrown) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Thrown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thrown")
            .field("class", &self.0.class_name)
            .field("message", &self.0.message)
            .field("cause", &self.0.cause)
            .field("frames", &self.0.stack.len())
            .finish()
    }
}

impl fmt::Display for Thrown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.message {
            Some(message) => write!(f, "{}: {}", self.0.class_name, message),
            None => f.write_str(&self.0.class_name),
        }
    }
}

impl Error for Thrown {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.0.cause.as_ref().map(|cause| cause as &(dyn Error + 'static))
    }
}

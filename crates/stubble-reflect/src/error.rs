use std::fmt;

use stubble_types::{ThrowableKind, Thrown};
use thiserror::Error;

/// Outcome tag of a failed resolution or invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    ArgumentMismatch,
    AmbiguousHandler,
    NoHandlerFound,
    AccessDenied,
    TargetRaisedError,
    TargetRaisedUnchecked,
    TargetRaisedChecked,
}

impl From<ThrowableKind> for FailureKind {
    fn from(kind: ThrowableKind) -> Self {
        match kind {
            ThrowableKind::Error => FailureKind::TargetRaisedError,
            ThrowableKind::Unchecked => FailureKind::TargetRaisedUnchecked,
            ThrowableKind::Checked => FailureKind::TargetRaisedChecked,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    Delegate,
    InvocationHandler,
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HandlerKind::Delegate => "delegate",
            HandlerKind::InvocationHandler => "invocation handler",
        })
    }
}

#[derive(Debug, Error)]
pub enum ReflectionError {
    #[error("Invalid null value passed as argument {index}")]
    NullArgument { index: usize },

    #[error("Specified method not found: {name}{params}")]
    SpecifiedMethodNotFound { name: String, params: String },

    #[error("No compatible method found: {name}{args}")]
    NoCompatibleMethod { name: String, args: String },

    #[error("No compatible static method found: {name}{args}")]
    NoCompatibleStaticMethod { name: String, args: String },

    /// `signature` names the instance member that was found.
    #[error("Attempted to invoke non-static method without an instance to invoke it on")]
    InstanceMethodWithoutReceiver { signature: String },

    /// Native argument binding rejected the receiver or arguments.
    #[error("Failure to invoke method: {signature}")]
    InvalidArguments {
        signature: String,
        #[source]
        cause: Thrown,
    },

    #[error("Cannot make {signature} accessible: its class does not permit reflective access")]
    AccessDenied { signature: String },

    #[error("More than one candidate {kind} method found: {first}, {second}")]
    AmbiguousHandler {
        kind: HandlerKind,
        first: String,
        second: String,
    },

    #[error("No non-private instance method found")]
    NoHandlerFound,

    /// An `Error` raised by the invoked member, unchanged.
    #[error(transparent)]
    TargetError(Thrown),

    /// A `RuntimeException` raised by the invoked member, unchanged.
    #[error(transparent)]
    TargetUnchecked(Thrown),

    /// A checked exception raised by a member invoked under the unchecked contract.
    #[error("Undeclared checked exception thrown: {0}")]
    UndeclaredChecked(#[source] Thrown),
}

impl ReflectionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ReflectionError::NullArgument { .. }
            | ReflectionError::SpecifiedMethodNotFound { .. }
            | ReflectionError::NoCompatibleMethod { .. }
            | ReflectionError::NoCompatibleStaticMethod { .. }
            | ReflectionError::InstanceMethodWithoutReceiver { .. }
            | ReflectionError::InvalidArguments { .. } => FailureKind::ArgumentMismatch,
            ReflectionError::AccessDenied { .. } => FailureKind::AccessDenied,
            ReflectionError::AmbiguousHandler { .. } => FailureKind::AmbiguousHandler,
            ReflectionError::NoHandlerFound => FailureKind::NoHandlerFound,
            ReflectionError::TargetError(_) => FailureKind::TargetRaisedError,
            ReflectionError::TargetUnchecked(_) => FailureKind::TargetRaisedUnchecked,
            ReflectionError::UndeclaredChecked(_) => FailureKind::TargetRaisedChecked,
        }
    }

    /// The object raised by the invoked member, if this failure came from one.
    pub fn thrown(&self) -> Option<&Thrown> {
        match self {
            ReflectionError::TargetError(thrown)
            | ReflectionError::TargetUnchecked(thrown)
            | ReflectionError::UndeclaredChecked(thrown) => Some(thrown),
            _ => None,
        }
    }
}

/// Failure under the checked-forwarding contract: whatever the member raised, as raised.
#[derive(Debug, Error)]
pub enum Raised {
    #[error("{thrown}")]
    Target { thrown: Thrown, kind: ThrowableKind },

    #[error(transparent)]
    Reflection(#[from] ReflectionError),
}

impl Raised {
    pub fn kind(&self) -> FailureKind {
        match self {
            Raised::Target { kind, .. } => FailureKind::from(*kind),
            Raised::Reflection(err) => err.kind(),
        }
    }

    pub fn thrown(&self) -> Option<&Thrown> {
        match self {
            Raised::Target { thrown, .. } => Some(thrown),
            Raised::Reflection(_) => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("unknown type `{0}` in reflection config")]
    UnknownType(String),
}

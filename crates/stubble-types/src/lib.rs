//! Runtime type model for the stubble reflection engine.
//!
//! A [`TypeStore`] plays the part of the host runtime's reflection facility: it owns class
//! metadata and the callable members declared on each class. Resolution code never mutates it and
//! only reads it through [`TypeEnv`], so any other host can plug in by implementing that trait.

#![forbid(unsafe_code)]

mod boxing;
mod format;
mod generated;
mod subtyping;
mod thrown;
mod value;

use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub use boxing::{is_wrapper_of, primitive_of, wrapped_if_primitive};
pub use format::{parameter_types_description, trim_package, type_name, JAVA_LANG_PREFIX};
pub use generated::declared_type_of;
pub use subtyping::{is_assignable, is_subclass};
pub use thrown::{classify_throwable, StackFrame, ThrowableKind, Thrown};
pub use value::{ObjectRef, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ClassId(u32);

impl ClassId {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn to_raw(self) -> u32 {
        self.0
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 8] = [
        PrimitiveType::Boolean,
        PrimitiveType::Byte,
        PrimitiveType::Short,
        PrimitiveType::Char,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Float,
        PrimitiveType::Double,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Char => "char",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }

    /// Binary name of the boxed counterpart.
    pub const fn wrapper_name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "java.lang.Boolean",
            PrimitiveType::Byte => "java.lang.Byte",
            PrimitiveType::Short => "java.lang.Short",
            PrimitiveType::Char => "java.lang.Character",
            PrimitiveType::Int => "java.lang.Integer",
            PrimitiveType::Long => "java.lang.Long",
            PrimitiveType::Float => "java.lang.Float",
            PrimitiveType::Double => "java.lang.Double",
        }
    }

    /// Identity or widening primitive conversion (JLS 5.1.2).
    pub fn widens_to(self, target: PrimitiveType) -> bool {
        use PrimitiveType::*;

        if self == target {
            return true;
        }
        match self {
            Byte => matches!(target, Short | Int | Long | Float | Double),
            Short | Char => matches!(target, Int | Long | Float | Double),
            Int => matches!(target, Long | Float | Double),
            Long => matches!(target, Float | Double),
            Float => matches!(target, Double),
            Double | Boolean => false,
        }
    }

    fn wrapper_slot(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Void,
    Primitive(PrimitiveType),
    Class(ClassId),
    Array(Box<Type>),
}

impl Type {
    pub const fn class(id: ClassId) -> Self {
        Type::Class(id)
    }

    pub fn array(component: Type) -> Self {
        Type::Array(Box::new(component))
    }

    pub const fn int() -> Self {
        Type::Primitive(PrimitiveType::Int)
    }

    pub const fn long() -> Self {
        Type::Primitive(PrimitiveType::Long)
    }

    pub const fn double() -> Self {
        Type::Primitive(PrimitiveType::Double)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Type::Class(_) | Type::Array(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Interface,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    Package,
    Private,
}

/// Whether non-public members of a class may be opened up for reflective calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReflectiveAccess {
    #[default]
    Open,
    Restricted,
}

type NativeFn = dyn Fn(Option<&Value>, &[Value]) -> Result<Value, Thrown> + Send + Sync;

/// Native implementation of a member: receives the receiver (absent for static members) and the
/// bound argument values.
#[derive(Clone)]
pub struct MethodBody(Arc<NativeFn>);

impl MethodBody {
    pub fn new(
        body: impl Fn(Option<&Value>, &[Value]) -> Result<Value, Thrown> + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(body))
    }

    pub fn call(&self, receiver: Option<&Value>, args: &[Value]) -> Result<Value, Thrown> {
        (self.0)(receiver, args)
    }
}

impl fmt::Debug for MethodBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MethodBody(..)")
    }
}

/// A member as declared in source; turned into a [`MethodHandle`] when its class is defined.
#[derive(Debug, Clone)]
pub struct MethodDef {
    pub name: String,
    pub params: Vec<Type>,
    pub return_type: Type,
    pub is_static: bool,
    pub visibility: Visibility,
    /// `None` for abstract members.
    pub body: Option<MethodBody>,
}

impl MethodDef {
    /// A public, abstract instance member.
    pub fn new(name: impl Into<String>, params: Vec<Type>, return_type: Type) -> Self {
        Self {
            name: name.into(),
            params,
            return_type,
            is_static: false,
            visibility: Visibility::Public,
            body: None,
        }
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_body(
        mut self,
        body: impl Fn(Option<&Value>, &[Value]) -> Result<Value, Thrown> + Send + Sync + 'static,
    ) -> Self {
        self.body = Some(MethodBody::new(body));
        self
    }
}

#[derive(Debug, Clone)]
pub struct ClassDef {
    pub name: String,
    pub kind: ClassKind,
    pub super_class: Option<ClassId>,
    pub interfaces: Vec<ClassId>,
    /// Declared members, in declaration order.
    pub methods: Vec<MethodDef>,
    /// Generated classes (proxies, mocks) are hidden behind their declared type.
    pub is_synthetic: bool,
    pub reflective_access: ReflectiveAccess,
}

impl ClassDef {
    pub fn class(name: impl Into<String>, super_class: ClassId) -> Self {
        Self {
            name: name.into(),
            kind: ClassKind::Class,
            super_class: Some(super_class),
            interfaces: Vec::new(),
            methods: Vec::new(),
            is_synthetic: false,
            reflective_access: ReflectiveAccess::Open,
        }
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            kind: ClassKind::Interface,
            super_class: None,
            ..Self::class(name, ClassId(0))
        }
    }

    pub fn with_interfaces(mut self, interfaces: Vec<ClassId>) -> Self {
        self.interfaces = interfaces;
        self
    }

    pub fn with_methods(mut self, methods: Vec<MethodDef>) -> Self {
        self.methods = methods;
        self
    }

    pub fn synthetic(mut self) -> Self {
        self.is_synthetic = true;
        self
    }

    pub fn restricted(mut self) -> Self {
        self.reflective_access = ReflectiveAccess::Restricted;
        self
    }
}

/// A member declared on a defined class.
#[derive(Debug)]
pub struct Method {
    declaring_class: ClassId,
    name: String,
    params: Vec<Type>,
    return_type: Type,
    is_static: bool,
    visibility: Visibility,
    body: Option<MethodBody>,
    accessible: AtomicBool,
}

impl Method {
    pub fn declaring_class(&self) -> ClassId {
        self.declaring_class
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[Type] {
        &self.params
    }

    pub fn return_type(&self) -> &Type {
        &self.return_type
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub fn is_private(&self) -> bool {
        self.visibility == Visibility::Private
    }

    pub fn body(&self) -> Option<&MethodBody> {
        self.body.as_ref()
    }

    /// Whether access checks have been suppressed for this member.
    pub fn is_accessible(&self) -> bool {
        self.accessible.load(Ordering::Acquire)
    }

    /// Suppress access checks for this member. The flag only ever goes from `false` to `true`;
    /// returns `true` for the call that flipped it.
    pub fn set_accessible(&self) -> bool {
        self.accessible
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Shared handle to a declared member. Equality is identity of the declaration.
#[derive(Debug, Clone)]
pub struct MethodHandle(Arc<Method>);

impl MethodHandle {
    fn new(declaring_class: ClassId, def: MethodDef) -> Self {
        let accessible = def.visibility == Visibility::Public;
        Self(Arc::new(Method {
            declaring_class,
            name: def.name,
            params: def.params,
            return_type: def.return_type,
            is_static: def.is_static,
            visibility: def.visibility,
            body: def.body,
            accessible: AtomicBool::new(accessible),
        }))
    }
}

impl Deref for MethodHandle {
    type Target = Method;

    fn deref(&self) -> &Method {
        &self.0
    }
}

impl PartialEq for MethodHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for MethodHandle {}

/// A defined (or placeholder) class as seen by resolution.
#[derive(Debug, Clone)]
pub struct ClassInfo {
    pub id: ClassId,
    pub name: String,
    pub kind: ClassKind,
    pub super_class: Option<ClassId>,
    pub interfaces: Vec<ClassId>,
    pub methods: Vec<MethodHandle>,
    pub is_synthetic: bool,
    pub reflective_access: ReflectiveAccess,
}

impl ClassInfo {
    fn placeholder(id: ClassId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            kind: ClassKind::Class,
            super_class: None,
            interfaces: Vec::new(),
            methods: Vec::new(),
            is_synthetic: false,
            reflective_access: ReflectiveAccess::Open,
        }
    }
}

/// Classes the host runtime always defines.
#[derive(Debug, Clone, Default)]
pub struct WellKnownTypes {
    pub object: ClassId,
    pub string: ClassId,
    pub class: ClassId,
    pub number: ClassId,
    pub char_sequence: ClassId,
    pub comparable: ClassId,
    pub cloneable: ClassId,
    pub serializable: ClassId,
    pub throwable: ClassId,
    pub error: ClassId,
    pub exception: ClassId,
    pub runtime_exception: ClassId,
    pub illegal_argument_exception: ClassId,
    pub illegal_state_exception: ClassId,
    pub abstract_method_error: ClassId,
    pub io_exception: ClassId,
    /// Synthetic leading context parameter of handler members.
    pub invocation: ClassId,
    /// Marker interface implemented by delegate objects.
    pub delegate: ClassId,
    wrappers: [ClassId; 8],
}

impl WellKnownTypes {
    pub fn wrapper(&self, primitive: PrimitiveType) -> ClassId {
        self.wrappers[primitive.wrapper_slot()]
    }

    pub fn primitive_of_wrapper(&self, class: ClassId) -> Option<PrimitiveType> {
        PrimitiveType::ALL
            .into_iter()
            .find(|p| self.wrappers[p.wrapper_slot()] == class)
    }
}

/// Read-only view of the host runtime's type metadata.
pub trait TypeEnv: Send + Sync {
    fn class(&self, id: ClassId) -> Option<&ClassInfo>;

    fn lookup_class(&self, name: &str) -> Option<ClassId>;

    fn well_known(&self) -> &WellKnownTypes;
}

#[derive(Debug, Clone)]
pub struct TypeStore {
    classes: Vec<ClassInfo>,
    by_name: HashMap<String, ClassId>,
    well_known: WellKnownTypes,
}

impl Default for TypeStore {
    fn default() -> Self {
        Self::with_minimal_jdk()
    }
}

impl TypeStore {
    /// A store holding the small set of platform classes resolution depends on.
    pub fn with_minimal_jdk() -> Self {
        let mut store = Self {
            classes: Vec::new(),
            by_name: HashMap::new(),
            well_known: WellKnownTypes::default(),
        };

        let object = store.add_class(ClassDef {
            super_class: None,
            ..ClassDef::class("java.lang.Object", ClassId(0))
        });
        let serializable = store.add_class(ClassDef::interface("java.io.Serializable"));
        let cloneable = store.add_class(ClassDef::interface("java.lang.Cloneable"));
        let comparable = store.add_class(ClassDef::interface("java.lang.Comparable"));
        let char_sequence = store.add_class(ClassDef::interface("java.lang.CharSequence"));
        let string = store.add_class(
            ClassDef::class("java.lang.String", object)
                .with_interfaces(vec![serializable, comparable, char_sequence]),
        );
        let class = store.add_class(
            ClassDef::class("java.lang.Class", object).with_interfaces(vec![serializable]),
        );
        let number = store.add_class(
            ClassDef::class("java.lang.Number", object).with_interfaces(vec![serializable]),
        );

        let mut wrappers = [object; 8];
        for primitive in PrimitiveType::ALL {
            let super_class = match primitive {
                PrimitiveType::Boolean | PrimitiveType::Char => object,
                _ => number,
            };
            wrappers[primitive.wrapper_slot()] = store.add_class(
                ClassDef::class(primitive.wrapper_name(), super_class)
                    .with_interfaces(vec![serializable, comparable]),
            );
        }

        let throwable = store.add_class(
            ClassDef::class("java.lang.Throwable", object).with_interfaces(vec![serializable]),
        );
        let error = store.add_class(ClassDef::class("java.lang.Error", throwable));
        let exception = store.add_class(ClassDef::class("java.lang.Exception", throwable));
        let runtime_exception =
            store.add_class(ClassDef::class("java.lang.RuntimeException", exception));
        let illegal_argument_exception = store.add_class(ClassDef::class(
            "java.lang.IllegalArgumentException",
            runtime_exception,
        ));
        let illegal_state_exception = store.add_class(ClassDef::class(
            "java.lang.IllegalStateException",
            runtime_exception,
        ));
        let abstract_method_error =
            store.add_class(ClassDef::class("java.lang.AbstractMethodError", error));
        let io_exception = store.add_class(ClassDef::class("java.io.IOException", exception));

        let invocation = store.add_class(ClassDef::class("stubble.Invocation", object));
        let delegate = store.add_class(ClassDef::interface("stubble.Delegate"));

        store.well_known = WellKnownTypes {
            object,
            string,
            class,
            number,
            char_sequence,
            comparable,
            cloneable,
            serializable,
            throwable,
            error,
            exception,
            runtime_exception,
            illegal_argument_exception,
            illegal_state_exception,
            abstract_method_error,
            io_exception,
            invocation,
            delegate,
            wrappers,
        };
        store
    }

    /// Reserve an id for `name` without defining the class yet. Idempotent.
    pub fn intern_class_id(&mut self, name: &str) -> ClassId {
        if let Some(id) = self.by_name.get(name) {
            return *id;
        }
        let id = ClassId(self.classes.len() as u32);
        self.classes.push(ClassInfo::placeholder(id, name));
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Define (or redefine) the class behind `id`. Ids must come from [`Self::intern_class_id`].
    pub fn define_class(&mut self, id: ClassId, def: ClassDef) {
        let Some(previous_name) = self.classes.get(id.index()).map(|c| c.name.clone()) else {
            tracing::warn!(
                target: "stubble.types",
                id = id.0,
                name = %def.name,
                "ignoring definition for unknown class id"
            );
            return;
        };
        if previous_name != def.name {
            self.by_name.remove(&previous_name);
        }
        self.by_name.insert(def.name.clone(), id);

        let methods = def
            .methods
            .into_iter()
            .map(|method| MethodHandle::new(id, method))
            .collect();
        self.classes[id.index()] = ClassInfo {
            id,
            name: def.name,
            kind: def.kind,
            super_class: def.super_class,
            interfaces: def.interfaces,
            methods,
            is_synthetic: def.is_synthetic,
            reflective_access: def.reflective_access,
        };
    }

    pub fn add_class(&mut self, def: ClassDef) -> ClassId {
        let id = self.intern_class_id(&def.name);
        self.define_class(id, def);
        id
    }

    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl TypeEnv for TypeStore {
    fn class(&self, id: ClassId) -> Option<&ClassInfo> {
        self.classes.get(id.index())
    }

    fn lookup_class(&self, name: &str) -> Option<ClassId> {
        if let Some(id) = self.by_name.get(name) {
            return Some(*id);
        }
        // Simple names of platform classes resolve implicitly, as they would in source.
        if !name.contains('.') {
            return self.by_name.get(&format!("{JAVA_LANG_PREFIX}{name}")).copied();
        }
        None
    }

    fn well_known(&self) -> &WellKnownTypes {
        &self.well_known
    }
}

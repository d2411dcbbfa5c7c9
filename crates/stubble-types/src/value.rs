use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::{ClassId, PrimitiveType, Type, TypeEnv};

/// A runtime value crossing the reflective call boundary.
///
/// Primitive variants are boxed values: their dynamic type is the wrapper class. `Class` is a type
/// token (a `java.lang.Class` instance).
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Void,
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Char(char),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(Arc<str>),
    Object(ObjectRef),
    Class(Type),
}

impl Value {
    pub fn str(value: impl AsRef<str>) -> Self {
        Value::Str(Arc::from(value.as_ref()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn primitive_type(&self) -> Option<PrimitiveType> {
        Some(match self {
            Value::Boolean(_) => PrimitiveType::Boolean,
            Value::Byte(_) => PrimitiveType::Byte,
            Value::Short(_) => PrimitiveType::Short,
            Value::Char(_) => PrimitiveType::Char,
            Value::Int(_) => PrimitiveType::Int,
            Value::Long(_) => PrimitiveType::Long,
            Value::Float(_) => PrimitiveType::Float,
            Value::Double(_) => PrimitiveType::Double,
            _ => return None,
        })
    }

    /// Dynamic class of the value; `None` for `Null` and `Void`.
    pub fn runtime_class(&self, env: &dyn TypeEnv) -> Option<ClassId> {
        let wk = env.well_known();
        if let Some(primitive) = self.primitive_type() {
            return Some(wk.wrapper(primitive));
        }
        match self {
            Value::Str(_) => Some(wk.string),
            Value::Object(obj) => Some(obj.class()),
            Value::Class(_) => Some(wk.class),
            _ => None,
        }
    }

    /// Unbox and widen to `target`, if the primitive conversion is allowed.
    pub fn widen_to(&self, target: PrimitiveType) -> Option<Value> {
        let source = self.primitive_type()?;
        if !source.widens_to(target) {
            return None;
        }
        if source == target {
            return Some(self.clone());
        }

        let as_i64 = match *self {
            Value::Byte(v) => i64::from(v),
            Value::Short(v) => i64::from(v),
            Value::Char(v) => i64::from(u32::from(v)),
            Value::Int(v) => i64::from(v),
            Value::Long(v) => v,
            Value::Float(v) => return Some(Value::Double(f64::from(v))),
            _ => return None,
        };
        Some(match target {
            PrimitiveType::Short => Value::Short(as_i64 as i16),
            PrimitiveType::Int => Value::Int(as_i64 as i32),
            PrimitiveType::Long => Value::Long(as_i64),
            PrimitiveType::Float => Value::Float(as_i64 as f32),
            PrimitiveType::Double => Value::Double(as_i64 as f64),
            _ => return None,
        })
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) | (Value::Void, Value::Void) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.same_instance(b),
            (Value::Class(a), Value::Class(b)) => a == b,
            _ => false,
        }
    }
}

struct ObjectData {
    class: ClassId,
    payload: Option<Arc<dyn Any + Send + Sync>>,
}

/// Reference to a heap object. Equality is identity.
#[derive(Clone)]
pub struct ObjectRef(Arc<ObjectData>);

impl ObjectRef {
    pub fn new(class: ClassId) -> Self {
        Self(Arc::new(ObjectData {
            class,
            payload: None,
        }))
    }

    /// An object carrying host-side state that member bodies can downcast.
    pub fn with_payload(class: ClassId, payload: impl Any + Send + Sync) -> Self {
        Self(Arc::new(ObjectData {
            class,
            payload: Some(Arc::new(payload)),
        }))
    }

    pub fn class(&self) -> ClassId {
        self.0.class
    }

    pub fn payload<T: Any>(&self) -> Option<&T> {
        self.0.payload.as_deref()?.downcast_ref::<T>()
    }

    pub fn same_instance(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectRef")
            .field("class", &self.0.class)
            .field("has_payload", &self.0.payload.is_some())
            .finish()
    }
}

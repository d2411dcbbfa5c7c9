use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use stubble_types::{
    ClassDef, ClassId, MethodDef, ObjectRef, Thrown, Type, TypeEnv, TypeStore, Value, Visibility,
};

/// A body that always produces `value`.
pub fn returning(value: Value) -> impl Fn(Option<&Value>, &[Value]) -> Result<Value, Thrown> {
    move |_, _| Ok(value.clone())
}

/// A body that always raises `thrown`: the same instance on every call.
pub fn throwing(thrown: Thrown) -> impl Fn(Option<&Value>, &[Value]) -> Result<Value, Thrown> {
    move |_, _| Err(thrown.clone())
}

/// A body that returns its `index`th argument.
pub fn argument(index: usize) -> impl Fn(Option<&Value>, &[Value]) -> Result<Value, Thrown> {
    move |_, args| Ok(args.get(index).cloned().unwrap_or(Value::Void))
}

/// A body returning the string `tag`; handy for telling overloads apart.
pub fn tagged(tag: &str) -> impl Fn(Option<&Value>, &[Value]) -> Result<Value, Thrown> {
    let tag = Value::str(tag);
    move |_, _| Ok(tag.clone())
}

/// A body returning `Int(n)` where `n` counts calls made so far, starting at 1.
pub fn counting(
    calls: Arc<AtomicUsize>,
) -> impl Fn(Option<&Value>, &[Value]) -> Result<Value, Thrown> {
    move |_, _| {
        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Value::Int(i32::try_from(n).unwrap_or(i32::MAX)))
    }
}

/// A public instance member named `name` returning `tag` when called.
///
/// Declared `void`: return types play no part in resolution.
pub fn tagged_method(name: &str, params: Vec<Type>, tag: &str) -> MethodDef {
    MethodDef::new(name, params, Type::Void).with_body(tagged(tag))
}

/// A public static member named `name` returning `tag` when called.
pub fn tagged_static(name: &str, params: Vec<Type>, tag: &str) -> MethodDef {
    tagged_method(name, params, tag).with_static(true)
}

/// A private instance member that is never expected to run.
pub fn private_method(name: &str, params: Vec<Type>) -> MethodDef {
    MethodDef::new(name, params, Type::Void)
        .with_visibility(Visibility::Private)
        .with_body(returning(Value::Void))
}

/// Define `name` as a subclass of `super_class` declaring `methods`.
pub fn define_class(
    store: &mut TypeStore,
    name: &str,
    super_class: ClassId,
    methods: Vec<MethodDef>,
) -> ClassId {
    store.add_class(ClassDef::class(name, super_class).with_methods(methods))
}

/// Define a throwable class `name` extending `super_class` (e.g. `Exception`).
pub fn define_throwable(store: &mut TypeStore, name: &str, super_class: ClassId) -> ClassId {
    store.add_class(ClassDef::class(name, super_class))
}

/// A fresh instance of `class` with no payload.
pub fn instance_of(class: ClassId) -> Value {
    Value::Object(ObjectRef::new(class))
}

/// A thrown object of `class` with `message`.
pub fn thrown(env: &dyn TypeEnv, class: ClassId, message: &str) -> Thrown {
    Thrown::new(env, class, message)
}

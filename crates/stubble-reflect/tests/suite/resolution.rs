use pretty_assertions::assert_eq;
use stubble_reflect::{FailureKind, MatchMode, ReflectionError, Reflector};
use stubble_test_utils::{define_class, instance_of, tagged_method, tagged_static};
use stubble_types::{ClassDef, ObjectRef, PrimitiveType, Type, TypeEnv, TypeStore, Value};

#[test]
fn most_specific_overload_wins_at_any_level() {
    let mut store = TypeStore::default();
    let wk = store.well_known().clone();
    let integer = Type::class(wk.wrapper(PrimitiveType::Int));
    let long = Type::class(wk.wrapper(PrimitiveType::Long));

    let top = define_class(
        &mut store,
        "app.Top",
        wk.object,
        vec![tagged_method("g", vec![Type::class(wk.object)], "top")],
    );
    let middle = define_class(
        &mut store,
        "app.Middle",
        top,
        vec![tagged_method("g", vec![Type::class(wk.number)], "middle")],
    );
    let bottom = define_class(
        &mut store,
        "app.Bottom",
        middle,
        vec![tagged_method("g", vec![integer], "bottom")],
    );
    let receiver = instance_of(bottom);
    let reflector = Reflector::new(&store);

    let call = |arg: Value| reflector.invoke_instance(bottom, &receiver, "g", &[arg]);
    assert_eq!(call(Value::Int(1)).unwrap(), Value::str("bottom"));
    assert_eq!(call(Value::Long(1)).unwrap(), Value::str("middle"));
    assert_eq!(call(Value::str("x")).unwrap(), Value::str("top"));

    let found = reflector.find_compatible_method(bottom, "g", &[long]).unwrap();
    assert_eq!(found.declaring_class(), middle);
}

#[test]
fn most_specific_overload_declared_on_an_ancestor_still_wins() {
    let mut store = TypeStore::default();
    let wk = store.well_known().clone();
    let integer = Type::class(wk.wrapper(PrimitiveType::Int));

    let top = define_class(
        &mut store,
        "app.Top",
        wk.object,
        vec![tagged_method("g", vec![integer], "top")],
    );
    let middle = define_class(
        &mut store,
        "app.Middle",
        top,
        vec![tagged_method("g", vec![Type::class(wk.number)], "middle")],
    );
    let bottom = define_class(
        &mut store,
        "app.Bottom",
        middle,
        vec![tagged_method("g", vec![Type::class(wk.object)], "bottom")],
    );
    let reflector = Reflector::new(&store);

    let value = reflector
        .invoke_instance(bottom, &instance_of(bottom), "g", &[Value::Int(3)])
        .unwrap();
    assert_eq!(value, Value::str("top"));
}

#[test]
fn boxed_argument_selects_the_wrapper_overload() {
    let mut store = TypeStore::default();
    let wk = store.well_known().clone();
    let integer = Type::class(wk.wrapper(PrimitiveType::Int));
    let class = define_class(
        &mut store,
        "app.T",
        wk.object,
        vec![
            tagged_method("f", vec![Type::int()], "primitive"),
            tagged_method("f", vec![integer.clone()], "boxed"),
        ],
    );
    let reflector = Reflector::new(&store);

    let method = reflector
        .find_compatible_method(class, "f", &[integer.clone()])
        .unwrap();
    assert_eq!(method.params(), &[integer.clone()]);

    // Explicit descriptors pick the identical declaration in either order.
    let by_int = reflector
        .find_specified_method(class, "f", &[Type::int()])
        .unwrap();
    assert_eq!(by_int.params(), &[Type::int()]);
    let by_integer = reflector.find_specified_method(class, "f", &[integer]).unwrap();
    assert_eq!(by_integer.params(), &[Type::class(wk.wrapper(PrimitiveType::Int))]);

    let value = reflector
        .invoke_instance(class, &instance_of(class), "f", &[Value::Int(5)])
        .unwrap();
    assert_eq!(value, Value::str("boxed"));
}

#[test]
fn explicit_descriptors_allow_boxing_but_not_subtyping() {
    let mut store = TypeStore::default();
    let wk = store.well_known().clone();
    let class = define_class(
        &mut store,
        "app.Sink",
        wk.object,
        vec![
            tagged_method("put", vec![Type::int()], "int"),
            tagged_method("put", vec![Type::class(wk.number)], "number"),
        ],
    );
    let reflector = Reflector::new(&store);

    let boxed = Type::class(wk.wrapper(PrimitiveType::Int));
    let found = reflector.find_specified_method(class, "put", &[boxed]).unwrap();
    assert_eq!(found.params(), &[Type::int()]);

    let err = reflector
        .find_specified_method(class, "put", &[Type::class(wk.wrapper(PrimitiveType::Long))])
        .unwrap_err();
    assert_eq!(err.kind(), FailureKind::ArgumentMismatch);
    assert_eq!(err.to_string(), "Specified method not found: put(Long)");
}

#[test]
fn unmatched_names_render_the_attempted_call() {
    let mut store = TypeStore::default();
    let wk = store.well_known().clone();
    let class = define_class(&mut store, "app.Empty", wk.object, vec![]);
    let reflector = Reflector::new(&store);

    let err = reflector
        .invoke_instance(
            class,
            &instance_of(class),
            "missing",
            &[Value::str("a"), Value::Int(1)],
        )
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "No compatible method found: missing(String, Integer)"
    );
}

#[test]
fn root_members_are_never_candidates() {
    let mut store = TypeStore::default();
    let wk = store.well_known().clone();
    store.define_class(
        wk.object,
        ClassDef {
            super_class: None,
            ..ClassDef::class("java.lang.Object", wk.object)
                .with_methods(vec![tagged_method("hashCode", vec![], "root")])
        },
    );
    let class = define_class(&mut store, "app.Plain", wk.object, vec![]);
    let reflector = Reflector::new(&store);

    assert!(reflector
        .resolve(class, "hashCode", &[], MatchMode::Coercive)
        .is_none());
    // The starting type itself is always searched.
    assert!(reflector
        .resolve(wk.object, "hashCode", &[], MatchMode::Coercive)
        .is_some());
}

#[test]
fn static_request_against_instance_member_fails_distinctly() {
    let mut store = TypeStore::default();
    let wk = store.well_known().clone();
    let class = define_class(
        &mut store,
        "app.Worker",
        wk.object,
        vec![tagged_method("run", vec![Type::class(wk.string)], "run")],
    );
    let reflector = Reflector::new(&store);

    let err = reflector
        .invoke_static(class, "run", &[Value::str("now")])
        .unwrap_err();
    let ReflectionError::InstanceMethodWithoutReceiver { signature } = &err else {
        panic!("expected a missing receiver failure, got {err:?}");
    };
    assert_eq!(signature, "run(String)");
    assert_eq!(
        err.to_string(),
        "Attempted to invoke non-static method without an instance to invoke it on"
    );

    let err = reflector
        .invoke_static(class, "walk", &[Value::str("now")])
        .unwrap_err();
    assert!(matches!(err, ReflectionError::NoCompatibleStaticMethod { .. }));
    assert_eq!(err.to_string(), "No compatible static method found: walk(String)");
}

#[test]
fn static_lookup_is_idempotent() {
    let mut store = TypeStore::default();
    let wk = store.well_known().clone();
    let class = define_class(
        &mut store,
        "app.Util",
        wk.object,
        vec![tagged_static("doSomething", vec![], "done")],
    );
    let reflector = Reflector::new(&store);

    let first = reflector.find_compatible_static_method(class, "doSomething", &[]).unwrap();
    for _ in 0..5 {
        assert_eq!(
            reflector.invoke_static(class, "doSomething", &[]).unwrap(),
            Value::str("done")
        );
        let again = reflector
            .find_compatible_static_method(class, "doSomething", &[])
            .unwrap();
        assert_eq!(again, first);
    }
}

#[test]
fn context_parameter_is_skipped_when_matching() {
    let mut store = TypeStore::default();
    let wk = store.well_known().clone();
    let class = define_class(
        &mut store,
        "app.Handler",
        wk.object,
        vec![tagged_method(
            "handle",
            vec![Type::class(wk.invocation), Type::class(wk.string)],
            "with-context",
        )],
    );
    let reflector = Reflector::new(&store);

    let candidate = reflector
        .resolve(class, "handle", &[Type::class(wk.string)], MatchMode::Coercive)
        .unwrap();
    assert!(candidate.takes_context());
    assert_eq!(candidate.real_params(), &[Type::class(wk.string)]);
    assert_eq!(stubble_reflect::parameter_count(candidate.method()), 2);

    let without_convention = Reflector::with_config(
        &store,
        &stubble_config::ReflectionConfig {
            context_type: Some(String::new()),
            ..Default::default()
        },
    )
    .unwrap();
    assert!(without_convention
        .resolve(class, "handle", &[Type::class(wk.string)], MatchMode::Coercive)
        .is_none());
}

#[test]
fn type_tokens_and_proxies_feed_argument_types() {
    let mut store = TypeStore::default();
    let wk = store.well_known().clone();
    let service = define_class(&mut store, "app.Service", wk.object, vec![]);
    let mock = store.add_class(ClassDef::class("app.Service$$Mock", service).synthetic());
    let class = define_class(
        &mut store,
        "app.Registry",
        wk.object,
        vec![
            tagged_method("register", vec![Type::class(wk.object)], "object"),
            tagged_method("register", vec![Type::class(service)], "service"),
            tagged_method(
                "register",
                vec![Type::class(wk.string), Type::class(service)],
                "named",
            ),
        ],
    );
    let reflector = Reflector::new(&store);
    let receiver = instance_of(class);

    let mocked = Value::Object(ObjectRef::new(mock));
    assert_eq!(
        reflector
            .invoke_instance(class, &receiver, "register", &[mocked])
            .unwrap(),
        Value::str("service")
    );

    let token = Value::Class(Type::class(wk.string));
    assert_eq!(
        reflector
            .invoke_instance(class, &receiver, "register", &[token, instance_of(service)])
            .unwrap(),
        Value::str("named")
    );
}

#[test]
fn configured_prefix_is_trimmed_from_diagnostics() {
    let mut store = TypeStore::default();
    let wk = store.well_known().clone();
    let widget = define_class(&mut store, "com.acme.Widget", wk.object, vec![]);
    let class = define_class(&mut store, "com.acme.Factory", wk.object, vec![]);
    let reflector = Reflector::with_config(
        &store,
        &stubble_config::ReflectionConfig {
            trimmed_package_prefix: "com.acme.".to_string(),
            ..Default::default()
        },
    )
    .unwrap();

    let err = reflector
        .find_specified_method(class, "build", &[Type::class(widget), Type::int()])
        .unwrap_err();
    assert_eq!(err.to_string(), "Specified method not found: build(Widget, int)");
}

#[test]
fn unknown_configured_types_are_reported() {
    let store = TypeStore::default();
    let err = Reflector::with_config(
        &store,
        &stubble_config::ReflectionConfig {
            delegate_type: "app.Missing".to_string(),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "unknown type `app.Missing` in reflection config"
    );
}

#[test]
fn equally_specific_ancestor_overload_does_not_displace_the_subclass() {
    let mut store = TypeStore::default();
    let wk = store.well_known().clone();
    let integer = Type::class(wk.wrapper(PrimitiveType::Int));

    let base = define_class(
        &mut store,
        "app.Super",
        wk.object,
        vec![tagged_method("f", vec![integer.clone()], "super")],
    );
    let sub = define_class(
        &mut store,
        "app.Sub",
        base,
        vec![tagged_method("f", vec![Type::int()], "sub")],
    );
    let reflector = Reflector::new(&store);

    let value = reflector
        .invoke_instance(sub, &instance_of(sub), "f", &[Value::Int(5)])
        .unwrap();
    assert_eq!(value, Value::str("sub"));

    let found = reflector.find_specified_method(sub, "f", &[integer]).unwrap();
    assert_eq!(found.declaring_class(), sub);
}

#[test]
fn explicit_descriptors_keep_the_nearest_equivalent_declaration() {
    let mut store = TypeStore::default();
    let wk = store.well_known().clone();
    let integer = Type::class(wk.wrapper(PrimitiveType::Int));

    let base = define_class(
        &mut store,
        "app.Super",
        wk.object,
        vec![tagged_method("f", vec![Type::int()], "super")],
    );
    let sub = define_class(
        &mut store,
        "app.Sub",
        base,
        vec![tagged_method("f", vec![integer], "sub")],
    );
    let reflector = Reflector::new(&store);

    let found = reflector.find_specified_method(sub, "f", &[Type::int()]).unwrap();
    assert_eq!(found.declaring_class(), sub);
    assert_eq!(
        reflector
            .invoke(sub, Some(&instance_of(sub)), "f", &[Type::int()], &[Value::Int(1)])
            .unwrap(),
        Value::str("sub")
    );
}

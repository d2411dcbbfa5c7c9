use proptest::prelude::*;
use stubble_types::{is_assignable, PrimitiveType, Type, TypeEnv, TypeStore, Value};

fn primitive() -> impl Strategy<Value = PrimitiveType> {
    proptest::sample::select(PrimitiveType::ALL.to_vec())
}

fn value_of(primitive: PrimitiveType, n: i8) -> Value {
    match primitive {
        PrimitiveType::Boolean => Value::Boolean(n % 2 == 0),
        PrimitiveType::Byte => Value::Byte(n),
        PrimitiveType::Short => Value::Short(i16::from(n)),
        PrimitiveType::Char => Value::Char(char::from(n.unsigned_abs())),
        PrimitiveType::Int => Value::Int(i32::from(n)),
        PrimitiveType::Long => Value::Long(i64::from(n)),
        PrimitiveType::Float => Value::Float(f32::from(n)),
        PrimitiveType::Double => Value::Double(f64::from(n)),
    }
}

proptest! {
    #[test]
    fn widening_is_reflexive_and_transitive(
        a in primitive(),
        b in primitive(),
        c in primitive(),
    ) {
        prop_assert!(a.widens_to(a));
        if a.widens_to(b) && b.widens_to(c) {
            prop_assert!(a.widens_to(c));
        }
        if a != b && a.widens_to(b) {
            prop_assert!(!b.widens_to(a));
        }
    }

    #[test]
    fn booleans_never_widen(p in primitive()) {
        prop_assume!(p != PrimitiveType::Boolean);
        prop_assert!(!PrimitiveType::Boolean.widens_to(p));
        prop_assert!(!p.widens_to(PrimitiveType::Boolean));
    }

    #[test]
    fn value_widening_follows_the_type_rule(
        from in primitive(),
        to in primitive(),
        n in any::<i8>(),
    ) {
        let widened = value_of(from, n).widen_to(to);
        prop_assert_eq!(widened.is_some(), from.widens_to(to));
        if let Some(value) = widened {
            prop_assert_eq!(value.primitive_type(), Some(to));
        }
    }

    #[test]
    fn assignability_is_reflexive(p in primitive()) {
        let store = TypeStore::default();
        let boxed = Type::class(store.well_known().wrapper(p));
        let unboxed = Type::Primitive(p);

        prop_assert!(is_assignable(&store, &unboxed, &unboxed));
        prop_assert!(is_assignable(&store, &boxed, &boxed));
        prop_assert!(is_assignable(&store, &Type::class(store.well_known().object), &boxed));
        prop_assert!(!is_assignable(&store, &boxed, &unboxed));
    }
}

//! Test the #[derive(StableHash)] macro

use trampoline_core::hash::{StableHash, StableHasher, StableId};

#[derive(StableHash)]
struct Named {
    name: String,
    arity: u32,
}

#[derive(StableHash)]
struct Renamed {
    name: String,
    arity: u32,
}

#[derive(StableHash)]
struct WithSkip {
    name: String,
    #[stable_hash(skip)]
    #[allow(dead_code)]
    note: String,
}

#[derive(StableHash)]
struct Tuple(u32, bool);

#[derive(StableHash)]
enum Shape {
    Empty,
    Pair(u32, u32),
    Labelled {
        label: String,
        #[stable_hash(skip)]
        #[allow(dead_code)]
        cached: u64,
    },
}

#[derive(StableHash)]
struct Generic<T> {
    items: Vec<T>,
}

fn named(name: &str, arity: u32) -> Named {
    Named {
        name: name.to_string(),
        arity,
    }
}

#[test]
fn test_equal_values_hash_equally() {
    assert_eq!(StableId::of(&named("a", 1)), StableId::of(&named("a", 1)));
    assert_ne!(StableId::of(&named("a", 1)), StableId::of(&named("a", 2)));
    assert_ne!(StableId::of(&named("a", 1)), StableId::of(&named("b", 1)));
}

#[test]
fn test_type_name_takes_part() {
    let renamed = Renamed {
        name: "a".to_string(),
        arity: 1,
    };
    assert_ne!(StableId::of(&named("a", 1)), StableId::of(&renamed));
}

#[test]
fn test_skipped_fields_are_ignored() {
    let a = WithSkip {
        name: "x".to_string(),
        note: "first".to_string(),
    };
    let b = WithSkip {
        name: "x".to_string(),
        note: "second".to_string(),
    };
    assert_eq!(StableId::of(&a), StableId::of(&b));

    let c = Shape::Labelled {
        label: "l".to_string(),
        cached: 1,
    };
    let d = Shape::Labelled {
        label: "l".to_string(),
        cached: 2,
    };
    assert_eq!(StableId::of(&c), StableId::of(&d));
}

#[test]
fn test_variants_are_distinguished() {
    let ids = [
        StableId::of(&Shape::Empty),
        StableId::of(&Shape::Pair(0, 0)),
        StableId::of(&Shape::Pair(0, 1)),
        StableId::of(&Shape::Labelled {
            label: String::new(),
            cached: 0,
        }),
    ];
    for (i, a) in ids.iter().enumerate() {
        for b in &ids[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn test_tuple_and_generic_structs() {
    assert_ne!(
        StableId::of(&Tuple(1, true)),
        StableId::of(&Tuple(1, false))
    );

    let split = Generic {
        items: vec!["ab".to_string(), "c".to_string()],
    };
    let joined = Generic {
        items: vec!["a".to_string(), "bc".to_string()],
    };
    assert_ne!(StableId::of(&split), StableId::of(&joined));
}

#[test]
fn test_ids_are_stable_across_hashers() {
    let mut first = StableHasher::new();
    named("a", 1).stable_hash(&mut first);
    let mut second = StableHasher::new();
    named("a", 1).stable_hash(&mut second);
    assert_eq!(first.finish(), second.finish());
    assert_eq!(first.finish().to_string().len(), 16);
}

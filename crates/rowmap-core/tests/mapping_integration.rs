//! Integration tests for the mapping engine.

use std::sync::Arc;

use rowmap_core::{
    accumulate, build_mapper, keyed_mapper, mapper, register_bundle, vec_mapper, ColumnCase,
    ConfigError, Error, Field, Mappable, MappingError, Marker, MemCursor, Symbolic,
    TypeDescriptor, TypeMarker, Value, ValueRowMapper,
};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq)]
struct Author {
    id: i64,
    full_name: String,
    email: Option<String>,
    age: i32,
}

impl Mappable for Author {
    fn descriptor() -> Arc<TypeDescriptor> {
        TypeDescriptor::builder::<Author>()
            .with_naming(ColumnCase::Snake)
            .with_map_all_fields()
            .field(Field::new("id", |a: &mut Author, v: i64| a.id = v))
            .field(Field::new("fullName", |a: &mut Author, v: String| {
                a.full_name = v
            }))
            .field(Field::new("email", |a: &mut Author, v: Option<String>| {
                a.email = v
            }))
            .field(Field::new("age", |a: &mut Author, v: i32| a.age = v))
            .build()
    }
}

fn author_rows() -> MemCursor {
    MemCursor::new(
        ["id", "full_name", "email", "age"],
        vec![
            vec![
                Value::Int(1),
                Value::Text("Alice".into()),
                Value::Text("alice@example.com".into()),
                Value::Int(30),
            ],
            vec![
                Value::Int(2),
                Value::Text("Bob".into()),
                Value::Null,
                Value::Int(25),
            ],
        ],
    )
}

// ============== Tests ==============

#[test]
fn test_maps_rows_end_to_end() {
    let mapper = mapper::<Author>().unwrap();
    let mut cursor = author_rows();

    let alice = mapper.map(&mut cursor).unwrap().unwrap();
    assert_eq!(
        alice,
        Author {
            id: 1,
            full_name: "Alice".to_string(),
            email: Some("alice@example.com".to_string()),
            age: 30,
        }
    );

    let bob = mapper.map(&mut cursor).unwrap().unwrap();
    assert_eq!(bob.full_name, "Bob");
    assert_eq!(bob.email, None);

    assert!(mapper.map(&mut cursor).unwrap().is_none());
}

#[test]
fn test_collects_into_vec() {
    let authors = vec_mapper(mapper::<Author>().unwrap());

    let mut cursor = author_rows();
    let all = authors.collect(&mut cursor).unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].full_name, "Alice");
    assert_eq!(all[1].full_name, "Bob");

    let mut empty = MemCursor::empty(["id", "full_name", "email", "age"]);
    assert!(authors.collect(&mut empty).unwrap().is_empty());
}

#[test]
fn test_keyed_collection() {
    let by_id = keyed_mapper(mapper::<Author>().unwrap(), |a| a.id);

    let mut cursor = author_rows();
    let index = by_id.collect(&mut cursor).unwrap();
    assert_eq!(index.len(), 2);
    assert_eq!(index[&2].full_name, "Bob");
}

#[test]
fn test_ancestor_descriptor_contributes_fields() {
    #[derive(Debug, Default, PartialEq)]
    struct Post {
        id: i64,
        title: String,
        created_at_us: i64,
    }

    fn audit_base() -> Arc<TypeDescriptor> {
        TypeDescriptor::builder::<Post>()
            .field(Field::new("createdAtUs", |p: &mut Post, v: i64| {
                p.created_at_us = v
            }))
            .build()
    }

    impl Mappable for Post {
        fn descriptor() -> Arc<TypeDescriptor> {
            TypeDescriptor::builder::<Post>()
                .with_naming(ColumnCase::Snake)
                .with_map_all_fields()
                .with_extends(audit_base())
                .field(Field::new("id", |p: &mut Post, v: i64| p.id = v))
                .field(Field::new("title", |p: &mut Post, v: String| p.title = v))
                .build()
        }
    }

    let mapper = mapper::<Post>().unwrap();
    let mut cursor = MemCursor::new(
        ["id", "title", "created_at_us"],
        vec![vec![
            Value::Int(7),
            Value::Text("On rows".into()),
            Value::Int(1_700_000_000_000_000),
        ]],
    );

    let post = mapper.map(&mut cursor).unwrap().unwrap();
    assert_eq!(post.id, 7);
    assert_eq!(post.title, "On rows");
    assert_eq!(post.created_at_us, 1_700_000_000_000_000);
}

#[test]
fn test_symbolic_field_maps_and_rejects_unknown() {
    #[derive(Debug, Default, PartialEq)]
    enum Status {
        #[default]
        Draft,
        Published,
    }

    impl Symbolic for Status {
        const SYMBOLS: &'static [&'static str] = &["Draft", "Published"];

        fn from_symbol(symbol: &str) -> Option<Self> {
            match symbol {
                "Draft" => Some(Status::Draft),
                "Published" => Some(Status::Published),
                _ => None,
            }
        }

        fn symbol(&self) -> &'static str {
            match self {
                Status::Draft => "Draft",
                Status::Published => "Published",
            }
        }
    }

    #[derive(Debug, Default)]
    struct Article {
        id: i64,
        status: Status,
    }

    impl Mappable for Article {
        fn descriptor() -> Arc<TypeDescriptor> {
            TypeDescriptor::builder::<Article>()
                .with_map_all_fields()
                .field(Field::new("id", |a: &mut Article, v: i64| a.id = v))
                .field(Field::symbolic("status", |a: &mut Article, v: Status| {
                    a.status = v
                }))
                .build()
        }
    }

    let mapper = mapper::<Article>().unwrap();

    let mut cursor = MemCursor::new(
        ["id", "status"],
        vec![vec![Value::Int(1), Value::Text("Published".into())]],
    );
    let article = mapper.map(&mut cursor).unwrap().unwrap();
    assert_eq!(article.status, Status::Published);

    // An unrecognized symbol fails the whole row, naming the column.
    let mut cursor = MemCursor::new(
        ["id", "status"],
        vec![vec![Value::Int(2), Value::Text("Archived".into())]],
    );
    let err = mapper.map(&mut cursor).unwrap_err();
    match err {
        Error::Mapping(MappingError::UnknownSymbol { column, value, .. }) => {
            assert_eq!(column, "status");
            assert_eq!(value, "Archived");
        }
        other => panic!("expected unknown symbol error, got {other:?}"),
    }
}

#[test]
fn test_registry_extension_end_to_end() {
    #[derive(Debug, Default, PartialEq)]
    struct Euros(i64);

    #[derive(Debug, Default)]
    struct Priced {
        amount: Euros,
    }

    impl Mappable for Priced {
        fn descriptor() -> Arc<TypeDescriptor> {
            TypeDescriptor::builder::<Priced>()
                .field(
                    Field::custom("amount", |p: &mut Priced, v: Euros| p.amount = v)
                        .with_column("amount"),
                )
                .build()
        }
    }

    rowmap_core::registry::register(|cursor, index| Ok(Euros(cursor.get_i64(index)?)));

    let mapper = mapper::<Priced>().unwrap();
    let mut cursor = MemCursor::new(["amount"], vec![vec![Value::Int(1299)]]);
    let priced = mapper.map(&mut cursor).unwrap().unwrap();
    assert_eq!(priced.amount, Euros(1299));
}

#[test]
fn test_marker_bundle_configures_type() {
    #[derive(Debug, Default)]
    struct Reading {
        sensor_id: i64,
        raw_value: f64,
    }

    register_bundle(
        "integration_snake_all",
        vec![Marker::Type(
            TypeMarker::new()
                .with_naming(ColumnCase::Snake)
                .with_map_all_fields(),
        )],
    );

    impl Mappable for Reading {
        fn descriptor() -> Arc<TypeDescriptor> {
            TypeDescriptor::builder::<Reading>()
                .with_bundle("integration_snake_all")
                .field(Field::new("sensorId", |r: &mut Reading, v: i64| {
                    r.sensor_id = v
                }))
                .field(Field::new("rawValue", |r: &mut Reading, v: f64| {
                    r.raw_value = v
                }))
                .build()
        }
    }

    let mapper = mapper::<Reading>().unwrap();
    let mut cursor = MemCursor::new(
        ["sensor_id", "raw_value"],
        vec![vec![Value::Int(12), Value::Float(0.75)]],
    );
    let reading = mapper.map(&mut cursor).unwrap().unwrap();
    assert_eq!(reading.sensor_id, 12);
    assert_eq!(reading.raw_value, 0.75);
}

#[test]
fn test_error_families_are_distinguishable() {
    // Config family: a descriptor with nothing to map fails at build.
    #[derive(Debug, Default)]
    struct Blank {
        _id: i64,
    }

    impl Mappable for Blank {
        fn descriptor() -> Arc<TypeDescriptor> {
            TypeDescriptor::builder::<Blank>()
                .field(Field::new("id", |_: &mut Blank, _: i64| {}))
                .build()
        }
    }

    let err = mapper::<Blank>().unwrap_err();
    assert!(matches!(
        err,
        Error::Config(ConfigError::NoMappableFields { .. })
    ));

    // Access family: a cell that cannot coerce fails the row with its
    // column index attached.
    let mapper = mapper::<Author>().unwrap();
    let mut cursor = MemCursor::new(
        ["id", "full_name", "email", "age"],
        vec![vec![
            Value::Text("not a number".into()),
            Value::Text("Mallory".into()),
            Value::Null,
            Value::Int(1),
        ]],
    );
    let err = mapper.map(&mut cursor).unwrap_err();
    match err {
        Error::Access(rowmap_core::AccessError::Coerce { index, .. }) => assert_eq!(index, 0),
        other => panic!("expected coercion error, got {other:?}"),
    }
}

#[test]
fn test_build_mapper_with_custom_supplier() {
    #[derive(Debug)]
    struct Draft {
        id: i64,
        origin: &'static str,
    }

    impl Mappable for Draft {
        fn descriptor() -> Arc<TypeDescriptor> {
            TypeDescriptor::builder::<Draft>()
                .field(Field::new("id", |d: &mut Draft, v: i64| d.id = v).with_column("id"))
                .build()
        }
    }

    let mapper = build_mapper(|| Draft {
        id: -1,
        origin: "supplied",
    })
    .unwrap();

    let mut cursor = MemCursor::new(["id"], vec![vec![Value::Int(6)]]);
    let draft = mapper.map(&mut cursor).unwrap().unwrap();
    assert_eq!(draft.id, 6);
    assert_eq!(draft.origin, "supplied");
}

#[test]
fn test_uuid_and_timestamp_columns() {
    #[derive(Debug, Default)]
    struct Event {
        id: Option<Uuid>,
        at: Option<OffsetDateTime>,
    }

    impl Mappable for Event {
        fn descriptor() -> Arc<TypeDescriptor> {
            TypeDescriptor::builder::<Event>()
                .with_map_all_fields()
                .field(Field::new("id", |e: &mut Event, v: Option<Uuid>| e.id = v))
                .field(Field::new("at", |e: &mut Event, v: Option<OffsetDateTime>| {
                    e.at = v
                }))
                .build()
        }
    }

    let id = Uuid::new_v4();
    let micros = 1_700_000_000_000_000_i64;
    let mapper = mapper::<Event>().unwrap();
    let mut cursor = MemCursor::new(
        ["id", "at"],
        vec![vec![
            Value::Uuid(id.into_bytes()),
            Value::Timestamp(micros),
        ]],
    );

    let event = mapper.map(&mut cursor).unwrap().unwrap();
    assert_eq!(event.id, Some(id));
    let expected = OffsetDateTime::from_unix_timestamp_nanos(i128::from(micros) * 1_000).unwrap();
    assert_eq!(event.at, Some(expected));
}

#[test]
fn test_concurrent_builds_share_one_mapper() {
    let first = mapper::<Author>().unwrap();

    std::thread::scope(|scope| {
        for _ in 0..8 {
            let reference = first.clone();
            scope.spawn(move || {
                let m = mapper::<Author>().unwrap();
                assert!(Arc::ptr_eq(m.raw(), reference.raw()));

                let mut cursor = author_rows();
                let alice = m.map(&mut cursor).unwrap().unwrap();
                assert_eq!(alice.full_name, "Alice");
            });
        }
    });
}

#[test]
fn test_untyped_rows_compose_with_accumulate() {
    let mut cursor = author_rows();
    let names = accumulate(
        &mut cursor,
        &ValueRowMapper::new(),
        Vec::new,
        |names: &mut Vec<Value>, row| names.push(row["full_name"].clone()),
        Vec::new,
    )
    .unwrap();
    assert_eq!(
        names,
        vec![Value::Text("Alice".into()), Value::Text("Bob".into())]
    );
}

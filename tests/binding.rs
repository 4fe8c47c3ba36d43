use pretty_assertions::assert_eq;
use qail_scan::naming::to_title_case;
use qail_scan::{
    nullable, resolve, Binder, Config, ConvertError, Field, Location, MemoryCursor, MemoryError,
    Naming, Record, ScanError, Scanner, Value,
};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default, PartialEq, Record)]
struct Person {
    first: String,
    last: String,
    age: i8,
}

fn text(s: &str) -> Value {
    Value::from(s)
}

// ============================================================================
// Column matching
// ============================================================================

#[test]
fn test_column_names_map_to_title_case_keys() {
    let mut rows = MemoryCursor::new(["first", "last", "age"])
        .row([text("Brett"), text("Jones"), Value::Int(40)])
        .row([text("Fred"), text("Jones"), Value::Int(50)]);

    let people: Vec<Person> = qail_scan::rows(&mut rows).unwrap();
    assert_eq!(
        people,
        vec![
            Person { first: "Brett".into(), last: "Jones".into(), age: 40 },
            Person { first: "Fred".into(), last: "Jones".into(), age: 50 },
        ]
    );
}

#[test]
fn test_column_override() {
    #[derive(Debug, Default, Record)]
    struct Item {
        #[scan(column = "fname")]
        first: String,
        #[scan(rename = "lname")]
        last: String,
    }

    let mut rows = MemoryCursor::new(["fname", "lname"]).row(["Brett", "Jones"]);
    let item: Item = qail_scan::row(&mut rows).unwrap();
    assert_eq!(item.first, "Brett");
    assert_eq!(item.last, "Jones");
}

#[test]
fn test_columns_without_fields_are_dropped() {
    #[derive(Debug, Default, Record)]
    struct Item {
        first: String,
        last: String,
    }

    let mut rows = MemoryCursor::new(["First", "Last", "Age"])
        .row([text("Brett"), text("Jones"), Value::Int(40)])
        .row([text("Fred"), text("Jones"), Value::Int(50)]);
    let items: Vec<Item> = qail_scan::rows(&mut rows).unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].first, "Fred");
    assert_eq!(rows.scan_calls(), 2);
}

#[test]
fn test_fields_without_columns_keep_default() {
    let mut rows = MemoryCursor::new(["first", "age"])
        .row([text("Brett"), Value::Int(40)])
        .row([text("Fred"), Value::Int(50)]);
    let people: Vec<Person> = qail_scan::rows(&mut rows).unwrap();
    assert_eq!(people[0].last, "");
    assert_eq!(people[1].age, 50);
}

#[test]
fn test_skipped_field_is_never_written() {
    #[derive(Debug, Default, Record)]
    struct Item {
        name: String,
        #[scan(skip)]
        secret: String,
    }

    let mut rows = MemoryCursor::new(["name", "secret"]).row(["bob", "hunter2"]);
    let item: Item = qail_scan::row(&mut rows).unwrap();
    assert_eq!(item.name, "bob");
    assert_eq!(item.secret, "");
}

#[test]
fn test_raw_identifier_field() {
    #[derive(Debug, Default, Record)]
    struct Item {
        r#type: String,
    }

    let mut rows = MemoryCursor::new(["type"]).row(["admin"]);
    let item: Item = qail_scan::row(&mut rows).unwrap();
    assert_eq!(item.r#type, "admin");
}

#[test]
fn test_exact_naming() {
    let binder = Binder::new(Config::new().with_naming(Naming::Exact));
    let mut rows = MemoryCursor::new(["first", "Last"]).row(["Brett", "Jones"]);
    let person: Person = binder.row(&mut rows).unwrap();
    assert_eq!(person.first, "");
    assert_eq!(person.last, "Jones");
}

// ============================================================================
// Nested records
// ============================================================================

#[derive(Debug, Default, Record)]
struct Name {
    #[scan(column = "p.First")]
    first: String,
    #[scan(column = "p.Last")]
    last: String,
}

#[test]
fn test_nested_record_overrides() {
    #[derive(Debug, Default, Record)]
    struct Row {
        item: Name,
    }

    let mut rows = MemoryCursor::new(["p.First", "p.Last"]).row(["Brett", "Jones"]);
    let row: Row = qail_scan::row(&mut rows).unwrap();
    assert_eq!(row.item.first, "Brett");
    assert_eq!(row.item.last, "Jones");
}

#[test]
fn test_nested_record_column_is_not_assigned() {
    #[derive(Debug, Default, Record)]
    struct Row {
        id: i64,
        item: Name,
    }

    let mut rows = MemoryCursor::new(["id", "item"]).row([text("7"), text("whole")]);
    let row: Row = qail_scan::row(&mut rows).unwrap();
    assert_eq!(row.id, 7);
    assert_eq!(row.item.first, "");
}

#[test]
fn test_flattened_record() {
    #[derive(Debug, Default, Record)]
    struct Audit {
        created_by: String,
        revision: u32,
    }

    #[derive(Debug, Default, Record)]
    struct Doc {
        title: String,
        #[scan(flatten)]
        audit: Audit,
    }

    let mut rows = MemoryCursor::new(["title", "created_by", "revision"])
        .row([text("Draft"), text("brett"), Value::Int(3)]);
    let doc: Doc = qail_scan::row(&mut rows).unwrap();
    assert_eq!(doc.title, "Draft");
    assert_eq!(doc.audit.created_by, "brett");
    assert_eq!(doc.audit.revision, 3);
}

#[test]
fn test_overrides_reach_any_depth_and_last_sibling_wins() {
    #[derive(Debug, Default, Record)]
    struct Leaf {
        #[scan(column = "deep.x")]
        x: i64,
    }

    #[derive(Debug, Default, Record)]
    struct Mid {
        leaf: Leaf,
        #[scan(column = "same")]
        a: String,
    }

    #[derive(Debug, Default, Record)]
    struct Sibling {
        #[scan(column = "same")]
        b: String,
    }

    #[derive(Debug, Default, Record)]
    struct Top {
        mid: Mid,
        sibling: Sibling,
    }

    let mut rows = MemoryCursor::new(["deep.x", "same"]).row([Value::Int(9), text("s")]);
    let top: Top = qail_scan::row(&mut rows).unwrap();
    assert_eq!(top.mid.leaf.x, 9);
    assert_eq!(top.mid.a, "");
    assert_eq!(top.sibling.b, "s");
}

// ============================================================================
// Primitive targets
// ============================================================================

#[test]
fn test_row_into_primitive() {
    let mut rows = MemoryCursor::new(["name"]).row(["Bob"]);
    let name: String = qail_scan::row(&mut rows).unwrap();
    assert_eq!(name, "Bob");
}

#[test]
fn test_rows_into_dynamic_values() {
    let table = vec![
        vec![Value::Int(1), Value::Int(2), Value::Int(3)],
        vec![text("brett"), text("fred"), text("geoff")],
        vec![Value::Bool(true), Value::Bool(false)],
        vec![Value::Float(1.0), Value::Float(1.1), Value::Float(1.2)],
    ];

    for values in table {
        let mut rows =
            MemoryCursor::new(["a"]).rows(values.iter().cloned().map(|v| vec![v]));
        let scanned: Vec<Value> = qail_scan::rows(&mut rows).unwrap();
        assert_eq!(scanned, values);
    }
}

#[test]
fn test_primitive_with_many_columns() {
    let mut rows = MemoryCursor::new(["fname", "lname"]).row(["a", "b"]);
    let err = qail_scan::rows::<String, _>(&mut rows).unwrap_err();
    assert!(matches!(err, ScanError::TooManyColumns { columns: 2 }));
    assert_eq!(
        err.to_string(),
        "too many columns returned for primitive target: 2 columns"
    );
}

#[test]
fn test_null_into_primitive_keeps_default() {
    let mut rows = MemoryCursor::new(["n"]).row([Value::Null]).row([Value::Int(4)]);
    let values: Vec<i32> = qail_scan::rows(&mut rows).unwrap();
    assert_eq!(values, [0, 4]);
}

// ============================================================================
// Empty results and errors
// ============================================================================

#[test]
fn test_no_columns_binds_nothing() {
    let mut rows = MemoryCursor::new(Vec::<String>::new()).row(Vec::<Value>::new());
    let people: Vec<Person> = qail_scan::rows(&mut rows).unwrap();
    assert!(people.is_empty());
    assert_eq!(rows.scan_calls(), 0);
}

#[test]
fn test_no_rows() {
    let mut rows = MemoryCursor::new(["first"]);
    let people: Vec<Person> = qail_scan::rows(&mut rows).unwrap();
    assert!(people.is_empty());

    let mut rows = MemoryCursor::new(["first"]);
    let err = qail_scan::row::<Person, _>(&mut rows).unwrap_err();
    assert!(err.is_no_rows());
    assert_eq!(err.to_string(), "no rows in result set");

    let mut rows = MemoryCursor::new(["first"]);
    assert!(qail_scan::optional::<Person, _>(&mut rows).unwrap().is_none());
}

#[test]
fn test_cursor_errors_pass_through() {
    let mut rows = MemoryCursor::new(["name"]).fail_columns("columns broken");
    let err = qail_scan::rows::<Person, _>(&mut rows).unwrap_err();
    assert_eq!(
        err.into_cursor(),
        Some(MemoryError::Injected("columns broken".into()))
    );

    let mut rows = MemoryCursor::new(["name"]).row(["x"]).fail_scan("scan broken");
    let err = qail_scan::rows::<Person, _>(&mut rows).unwrap_err();
    assert_eq!(err.to_string(), "scan broken");

    let mut rows = MemoryCursor::new(["name"]).fail_terminal("broken");
    let err = qail_scan::rows::<Person, _>(&mut rows).unwrap_err();
    assert_eq!(err.into_cursor(), Some(MemoryError::Injected("broken".into())));
}

#[test]
fn test_conversion_error_names_column() {
    let mut rows = MemoryCursor::new(["first", "age"]).row([text("Brett"), Value::Int(400)]);
    let err = qail_scan::rows::<Person, _>(&mut rows).unwrap_err();
    match err.into_cursor() {
        Some(MemoryError::Convert { column, source }) => {
            assert_eq!(column, "age");
            assert!(matches!(source, ConvertError::OutOfRange { .. }));
        }
        other => panic!("unexpected {:?}", other),
    }
}

// ============================================================================
// NULL handling and custom scanners
// ============================================================================

#[derive(Debug, Default, PartialEq)]
struct Tags(Vec<String>);

impl Scanner for Tags {
    fn scan(&mut self, value: Value) -> Result<(), ConvertError> {
        self.0 = match value.as_str() {
            Some(s) => s.split(',').map(str::to_string).collect(),
            None if value.is_null() => vec!["<none>".to_string()],
            None => return Err(ConvertError::Incompatible { from: value.kind(), target: "Tags" }),
        };
        Ok(())
    }
}

impl Field for Tags {
    fn location(&mut self) -> Location<'_> {
        Location::Scanner(self)
    }
}

#[derive(Debug, Default, Record)]
struct Post {
    title: String,
    views: i64,
    rating: Option<f64>,
    tags: Tags,
}

#[test]
fn test_nulls_leave_defaults() {
    let mut rows = MemoryCursor::new(["title", "views", "rating", "tags"])
        .row([Value::Null, Value::Null, Value::Null, text("a,b")])
        .row([text("Hi"), Value::Int(3), Value::Float(4.5), text("c")]);
    let posts: Vec<Post> = qail_scan::rows(&mut rows).unwrap();

    assert_eq!(posts[0].title, "");
    assert_eq!(posts[0].views, 0);
    assert_eq!(posts[0].rating, None);
    assert_eq!(posts[0].tags, Tags(vec!["a".into(), "b".into()]));

    assert_eq!(posts[1].rating, Some(4.5));
    assert_eq!(posts[1].tags, Tags(vec!["c".into()]));
}

#[test]
fn test_null_clears_option_on_existing_instance() {
    let mut post = Post {
        title: "kept".into(),
        rating: Some(2.0),
        ..Post::default()
    };
    let columns = vec!["title".to_string(), "rating".to_string()];
    let mut dest: Vec<_> = resolve(&mut post, &columns, &to_title_case)
        .into_iter()
        .map(nullable)
        .collect();
    for slot in dest.iter_mut() {
        slot.set(Value::Null).unwrap();
    }
    drop(dest);

    assert_eq!(post.title, "kept");
    assert_eq!(post.rating, None);
}

#[test]
fn test_scanner_sees_null() {
    let mut rows = MemoryCursor::new(["tags"]).row([Value::Null]);
    let post: Post = qail_scan::row(&mut rows).unwrap();
    assert_eq!(post.tags, Tags(vec!["<none>".into()]));
}

// ============================================================================
// Closing
// ============================================================================

#[test]
fn test_row_closes_cursor() {
    let mut rows = MemoryCursor::new(["name"]).row(["Bob"]).row(["Alice"]);
    let _: String = qail_scan::row(&mut rows).unwrap();
    assert_eq!(rows.close_calls(), 1);
    assert_eq!(rows.remaining(), 0);
}

#[test]
fn test_close_errors_reach_notifier() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let binder = Binder::new(Config::new().on_close_error(move |e| {
        sink.lock().unwrap().push(e.to_string());
    }));

    let mut rows = MemoryCursor::new(["name"]).row(["Bob"]).fail_close("close broken");
    let name: String = binder.row(&mut rows).unwrap();
    assert_eq!(name, "Bob");
    assert_eq!(*seen.lock().unwrap(), ["close broken"]);

    // close still runs when the bind itself fails
    let mut rows = MemoryCursor::new(["a", "b"]).fail_close("again");
    assert!(binder.rows::<String, _>(&mut rows).is_err());
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[test]
fn test_rebinding_same_shape_is_stable() {
    let make = || {
        MemoryCursor::new(["age", "first", "first"])
            .row([Value::Int(1), text("a"), text("b")])
    };
    let first: Person = qail_scan::row(&mut make()).unwrap();
    let second: Person = qail_scan::row(&mut make()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.first, "b");
}

use flatoml_keyset::{Key, KeySet};
use test_case::test_case;

#[test_case("example", include_str!("../../../testdata/example.toml"))]
#[test_case("arrays", include_str!("../../../testdata/arrays.toml"))]
#[test_case("comments", include_str!("../../../testdata/comments.toml"))]
fn parse_valid(name: &str, src: &str) {
    let root = Key::from_name("/").unwrap();
    let mut store = KeySet::new();
    flatoml_parser::read(src, &mut store, &root).expect(name);

    assert!(!store.is_empty());

    // Every emitted order index is unique.
    let mut orders: Vec<u64> = store
        .iter()
        .filter_map(|key| key.meta("order"))
        .map(|order| order.parse().unwrap())
        .collect();
    orders.sort_unstable();
    let before = orders.len();
    orders.dedup();
    assert_eq!(before, orders.len(), "{name}: duplicate order index");
}

#[test]
fn example_values() {
    let root = Key::from_name("/").unwrap();
    let mut store = KeySet::new();
    flatoml_parser::read(
        include_str!("../../../testdata/example.toml"),
        &mut store,
        &root,
    )
    .unwrap();

    assert_eq!(
        store.get("/title").unwrap().string_value().as_deref(),
        Some("TOML Example")
    );
    assert_eq!(
        store.get("/owner/dob").unwrap().string_value().as_deref(),
        Some("1979-05-27T07:32:00-08:00")
    );
    assert_eq!(
        store
            .get("/database/connection_max")
            .unwrap()
            .string_value()
            .as_deref(),
        Some("5000")
    );
    assert_eq!(
        store.get("/database/ports/#2").unwrap().string_value().as_deref(),
        Some("8002")
    );
    assert_eq!(
        store.get("/servers/alpha/ip").unwrap().string_value().as_deref(),
        Some("10.0.0.1")
    );
    assert_eq!(
        store.get("/clients/data/#0/#1").unwrap().string_value().as_deref(),
        Some("delta")
    );
    assert_eq!(
        store.get("/clients/hosts").unwrap().meta("array").as_deref(),
        Some("#1")
    );
}

#[test]
fn arrays_of_tables() {
    let root = Key::from_name("/").unwrap();
    let mut store = KeySet::new();
    flatoml_parser::read(
        include_str!("../../../testdata/arrays.toml"),
        &mut store,
        &root,
    )
    .unwrap();

    assert_eq!(
        store.get("/products").unwrap().meta("array").as_deref(),
        Some("#2")
    );
    assert_eq!(
        store.get("/products/#2/color").unwrap().string_value().as_deref(),
        Some("gray")
    );
    assert_eq!(
        store
            .get("/fruit/#0/variety/#1/name")
            .unwrap()
            .string_value()
            .as_deref(),
        Some("granny smith")
    );
    assert_eq!(
        store
            .get("/fruit/#1/variety/#0/name")
            .unwrap()
            .string_value()
            .as_deref(),
        Some("plantain")
    );
}

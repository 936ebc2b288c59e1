use flatoml_keyset::{Key, KeySet, KeyValue};
use flatoml_parser::read;
use test_case::test_case;

fn parse(source: &str) -> KeySet {
    let root = Key::from_name("/").unwrap();
    let mut store = KeySet::new();
    read(source, &mut store, &root).expect(source);
    store
}

fn render(store: &KeySet) -> String {
    store
        .iter()
        .map(|key| {
            let value = key.string_value().unwrap_or_default();
            let meta = key
                .meta_entries()
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join(" ");
            if meta.is_empty() {
                format!("{key} = {value:?}")
            } else {
                format!("{key} = {value:?} [{meta}]")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn single_key_pair() {
    let store = parse("a = 1");
    assert_eq!(store.len(), 1);

    let key = store.get("/a").unwrap();
    assert_eq!(key.string_value().as_deref(), Some("1"));
    assert_eq!(key.meta("type").as_deref(), Some("long_long"));
    assert_eq!(key.meta("order").as_deref(), Some("0"));
    assert_eq!(key.meta("origvalue"), None);
}

#[test]
fn quoted_key_keeps_the_dot_in_one_segment() {
    let store = parse("\"k.x\" = \"v\"\n");
    let key = store.get("/k.x").unwrap();
    assert_eq!(key.name().segments(), ["k.x"]);
    assert_eq!(key.string_value().as_deref(), Some("v"));
    assert_eq!(key.meta("tomltype").as_deref(), Some("string_basic"));
    assert_eq!(key.meta("type").as_deref(), Some("string"));
    assert_eq!(key.meta("origvalue"), None);
}

#[test]
fn simple_table() {
    let store = parse("[t]\nk = true\n");
    insta::assert_snapshot!(render(&store), @r###"
    /t = "" [order=0 tomltype=simpletable]
    /t/k = "1" [order=1 type=boolean]
    "###);
}

#[test]
fn dotted_keys_nest_without_intermediate_keys() {
    let store = parse("a.b.c = 1\n");
    assert_eq!(store.names(), ["/a/b/c"]);
}

#[test]
fn keys_inside_a_table_are_relative_to_it() {
    let store = parse("[t]\na.b = 1\n");
    assert_eq!(store.names(), ["/t", "/t/a/b"]);
}

#[test]
fn float_shaped_key_splits_into_two_segments() {
    let store = parse("1.2 = \"v\"\n");
    let key = store.get("/1/2").unwrap();
    assert_eq!(key.string_value().as_deref(), Some("v"));

    let store = parse("3.14159 = \"pi\"\n");
    assert!(store.get("/3/14159").is_some());
}

#[test]
fn non_string_keys_store_their_canonical_text() {
    let store = parse("true = 1\n0xFF = 2\n1979-05-27 = 3\n");
    assert_eq!(store.names(), ["/1", "/255", "/1979-05-27"]);
}

#[test_case("i = 1_000\n", "/i", "1000", "1_000"; "decimal separators")]
#[test_case("h = 0xFF\n", "/h", "255", "0xFF"; "hex")]
#[test_case("b = 0b0101\n", "/b", "5", "0b0101"; "binary")]
#[test_case("o = 0o17\n", "/o", "15", "0o17"; "octal")]
#[test_case("f = 6.26E-34\n", "/f", "6.26e-34", "6.26E-34"; "float exponent case")]
#[test_case("p = +10\n", "/p", "10", "+10"; "plus sign")]
#[test_case(
    "d = 1979-05-27t07:32:00z\n",
    "/d",
    "1979-05-27T07:32:00Z",
    "1979-05-27t07:32:00z";
    "datetime separators"
)]
fn origvalue_keeps_the_source_form(source: &str, name: &str, value: &str, original: &str) {
    let store = parse(source);
    let key = store.get(name).unwrap();
    assert_eq!(key.string_value().as_deref(), Some(value));
    assert_eq!(key.meta("origvalue").as_deref(), Some(original));
}

#[test_case("i = 1000\n", "/i"; "decimal")]
#[test_case("f = 1.5\n", "/f"; "float")]
#[test_case("s = \"plain\"\n", "/s"; "basic string")]
#[test_case("d = 1979-05-27T07:32:00Z\n", "/d"; "offset datetime")]
#[test_case("t = 07:32:00\n", "/t"; "local time")]
fn canonical_values_carry_no_origvalue(source: &str, name: &str) {
    let store = parse(source);
    assert_eq!(store.get(name).unwrap().meta("origvalue"), None);
}

#[test]
fn booleans_translate_without_origvalue() {
    let store = parse("yes = true\nno = false\n");
    assert_eq!(store.get("/yes").unwrap().string_value().as_deref(), Some("1"));
    assert_eq!(store.get("/no").unwrap().string_value().as_deref(), Some("0"));
    assert_eq!(store.get("/yes").unwrap().meta("origvalue"), None);
    assert_eq!(
        store.get("/yes").unwrap().meta("type").as_deref(),
        Some("boolean")
    );
}

#[test]
fn float_specials_keep_their_sign() {
    let store = parse("a = inf\nb = +inf\nc = -inf\nd = nan\ne = -nan\n");
    assert_eq!(store.get("/a").unwrap().string_value().as_deref(), Some("inf"));
    assert_eq!(store.get("/b").unwrap().string_value().as_deref(), Some("+inf"));
    assert_eq!(store.get("/c").unwrap().string_value().as_deref(), Some("-inf"));
    assert_eq!(store.get("/d").unwrap().string_value().as_deref(), Some("nan"));
    assert_eq!(store.get("/e").unwrap().string_value().as_deref(), Some("-nan"));
    assert_eq!(store.get("/b").unwrap().meta("type").as_deref(), Some("double"));
}

#[test]
fn string_escapes_are_processed() {
    let store = parse("s = \"a\\tb \\u0041\"\n");
    let key = store.get("/s").unwrap();
    assert_eq!(key.string_value().as_deref(), Some("a\tb A"));
    assert_eq!(key.meta("origvalue").as_deref(), Some("a\\tb \\u0041"));
}

#[test]
fn literal_strings_are_verbatim() {
    let store = parse("s = 'C:\\net\\n'\n");
    let key = store.get("/s").unwrap();
    assert_eq!(key.string_value().as_deref(), Some("C:\\net\\n"));
    assert_eq!(key.meta("tomltype").as_deref(), Some("string_literal"));
    assert_eq!(key.meta("origvalue"), None);
}

#[test]
fn multiline_string_trims_the_first_newline() {
    let store = parse("s = \"\"\"\nline one\nline two\"\"\"\n");
    let key = store.get("/s").unwrap();
    assert_eq!(key.string_value().as_deref(), Some("line one\nline two"));
    assert_eq!(key.meta("tomltype").as_deref(), Some("string_ml_basic"));
    assert_eq!(
        key.meta("origvalue").as_deref(),
        Some("\nline one\nline two")
    );
}

#[test]
fn empty_string_gets_no_type() {
    let store = parse("s = \"\"\n");
    let key = store.get("/s").unwrap();
    assert_eq!(key.string_value().as_deref(), Some(""));
    assert_eq!(key.meta("type"), None);
    assert_eq!(key.meta("tomltype").as_deref(), Some("string_basic"));
}

#[test]
fn null_indicator_becomes_a_binary_key() {
    let store = parse("n = \"@NULL\"\n");
    let key = store.get("/n").unwrap();
    assert_eq!(key.value(), KeyValue::Binary(Vec::new()));
    assert_eq!(key.meta("type").as_deref(), Some("binary"));
}

#[test]
fn base64_payload_stays_for_the_binary_layer() {
    let store = parse("b = \"@BASE64aGVsbG8=\"\n");
    let key = store.get("/b").unwrap();
    assert_eq!(key.string_value().as_deref(), Some("@BASE64aGVsbG8="));
    assert_eq!(key.meta("type"), None);
}

#[test]
fn order_is_monotonic_and_matches_source_appearance() {
    let store = parse("b = 1\na = 2\n[t]\nk = 3\n");
    let orders: Vec<_> = ["/b", "/a", "/t", "/t/k"]
        .into_iter()
        .map(|name| store.get(name).unwrap().meta("order").unwrap())
        .collect();
    assert_eq!(orders, ["0", "1", "2", "3"]);
}

#[test]
fn reading_twice_is_deterministic() {
    let source = "# doc\na = 1\n[t]\nk = \"v\" # inline\narr = [1, 2]\n";
    let first = parse(source);
    let second = parse(source);

    assert_eq!(first.names(), second.names());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.string_value(), b.string_value());
        assert_eq!(a.meta_entries(), b.meta_entries());
    }
}

#[test]
fn crlf_documents_parse() {
    let store = parse("a = 1\r\n[t]\r\nk = 2\r\n");
    assert_eq!(store.names(), ["/a", "/t", "/t/k"]);
}

#[test]
fn read_file_reports_missing_files_as_resource_errors() {
    let root = Key::from_name("/").unwrap();
    let mut store = KeySet::new();
    let error =
        flatoml_parser::read_file("/nonexistent/flatoml.toml", &mut store, &root).unwrap_err();
    assert_eq!(error.kind.class(), flatoml_parser::ErrorClass::Resource);
    assert_eq!(root.meta("error/kind").as_deref(), Some("resource"));
}

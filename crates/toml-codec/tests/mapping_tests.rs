use chrono::NaiveDate;
use indexmap::IndexMap;
use num_bigint::BigInt;
use std::collections::BTreeMap;
use toml_codec::mapping::parse_table;
use toml_codec::{
    array_mapping, decode, decode_table, decode_with, encode, table_mapping, to_toml_string,
    DecodeOptions, Decoded, Decoder, FromValue, Outcome, Table, ToValue, UnknownKeys, Value,
};

#[derive(Debug, Clone, PartialEq)]
struct Fruit {
    color: String,
    shape: String,
}

table_mapping! { Fruit { color, shape } }

#[derive(Debug, PartialEq)]
struct Basket {
    owner: String,
    fruits: Vec<Fruit>,
}

table_mapping! { Basket { owner, fruits } }

#[derive(Debug, PartialEq)]
struct Server {
    host: String,
    port: u16,
    tags: Option<Vec<String>>,
    workers: u32,
    verbose: bool,
}

table_mapping! {
    Server {
        host,
        port,
        #[optional] tags,
        #[default(4)] workers,
        #[default] verbose,
    }
}

#[derive(Debug, PartialEq)]
struct Answer(i64, String);

array_mapping! { Answer(0, 1) }

#[derive(Debug, PartialEq)]
struct Point {
    x: f64,
    y: f64,
}

array_mapping! { Point { x, y } }

fn fruit_value(color: &str, shape: &str) -> Value {
    Value::table([("color", Value::from(color)), ("shape", Value::from(shape))])
}

fn errors<T: std::fmt::Debug>(outcome: &Outcome<T>) -> Vec<String> {
    assert!(!outcome.is_success(), "expected failure, got {:?}", outcome);
    outcome.errors().iter().map(ToString::to_string).collect()
}

fn warnings<T: std::fmt::Debug>(outcome: &Outcome<T>) -> Vec<String> {
    assert!(outcome.is_success(), "expected success, got {:?}", outcome);
    outcome.warnings().iter().map(ToString::to_string).collect()
}

// ============================================================================
// Table mapping
// ============================================================================

#[test]
fn table_mapping_decodes_record() {
    let outcome = decode::<Fruit>(&fruit_value("red", "round"));
    assert_eq!(
        outcome,
        Outcome::Success {
            warnings: vec![],
            value: Fruit {
                color: "red".into(),
                shape: "round".into()
            }
        }
    );
}

#[test]
fn table_mapping_encodes_identical_table() {
    let fruit = Fruit {
        color: "red".into(),
        shape: "round".into(),
    };
    assert_eq!(Value::Table(encode(&fruit)), fruit_value("red", "round"));
    assert_eq!(fruit.to_value(), fruit_value("red", "round"));
}

#[test]
fn table_mapping_encodes_in_declaration_order() {
    let fruit = Fruit {
        color: "red".into(),
        shape: "round".into(),
    };
    let keys: Vec<String> = encode(&fruit).keys().cloned().collect();
    assert_eq!(keys, ["color", "shape"]);
}

#[test]
fn table_mapping_ignores_input_key_order() {
    let value = Value::table([("shape", Value::from("round")), ("color", Value::from("red"))]);
    assert_eq!(
        decode::<Fruit>(&value).value(),
        Some(&Fruit {
            color: "red".into(),
            shape: "round".into()
        })
    );
}

#[test]
fn table_mapping_rejects_non_table() {
    let outcome = decode::<Fruit>(&Value::array([1, 2]));
    assert_eq!(errors(&outcome), ["type error. wanted: table got: array in top"]);
}

#[test]
fn missing_key_is_scoped_under_the_key() {
    let value = Value::table([("color", Value::from("red"))]);
    assert_eq!(errors(&decode::<Fruit>(&value)), ["missing key in top.shape"]);
}

#[test]
fn first_missing_key_stops_decoding() {
    let value = Value::Table(Table::new());
    assert_eq!(errors(&decode::<Fruit>(&value)), ["missing key in top.color"]);
}

#[test]
fn field_type_error_is_scoped_at_field() {
    let value = Value::table([("color", Value::from("red")), ("shape", Value::from(3))]);
    assert_eq!(
        errors(&decode::<Fruit>(&value)),
        ["type error. wanted: string got: integer in top.shape"]
    );
}

#[test]
fn nested_failure_keeps_full_path() {
    let value = Value::table([
        ("owner", Value::from("ann")),
        (
            "fruits",
            Value::array([
                fruit_value("red", "round"),
                Value::table([("color", Value::from("green")), ("shape", Value::from(false))]),
            ]),
        ),
    ]);
    assert_eq!(
        errors(&decode::<Basket>(&value)),
        ["type error. wanted: string got: boolean in top.fruits[1].shape"]
    );
}

#[test]
fn quoted_key_in_path() {
    #[derive(Debug)]
    struct Wrapper {
        inner: BTreeMap<String, Fruit>,
    }
    table_mapping! { Wrapper { inner } }

    let value = Value::table([(
        "inner",
        Value::table([("my fruit", Value::table([("color", Value::from("red"))]))]),
    )]);
    assert_eq!(
        errors(&decode::<Wrapper>(&value)),
        [r#"missing key in top.inner."my fruit".shape"#]
    );
}

// ============================================================================
// Unknown keys
// ============================================================================

fn fruit_with_extra() -> Value {
    Value::table([
        ("color", Value::from("red")),
        ("size", Value::from(3)),
        ("shape", Value::from("round")),
        ("weight", Value::from(1.5)),
    ])
}

#[test]
fn unknown_keys_warn_by_default() {
    let outcome = decode::<Fruit>(&fruit_with_extra());
    assert_eq!(
        warnings(&outcome),
        ["unexpected key in top.size", "unexpected key in top.weight"]
    );
}

#[test]
fn unknown_keys_ignored_when_configured() {
    let options = DecodeOptions {
        unknown_keys: UnknownKeys::Ignore,
    };
    let outcome = decode_with::<Fruit>(options, &fruit_with_extra());
    assert!(warnings(&outcome).is_empty());
}

#[test]
fn unknown_keys_rejected_in_strict_mode() {
    let outcome = decode_with::<Fruit>(DecodeOptions::strict(), &fruit_with_extra());
    assert_eq!(errors(&outcome), ["unexpected key in top.size"]);
}

#[test]
fn unknown_key_warnings_in_nested_tables() {
    let mut inner = fruit_value("red", "round");
    if let Value::Table(table) = &mut inner {
        table.insert("ripe".to_string(), Value::from(true));
    }
    let value = Value::table([
        ("owner", Value::from("ann")),
        ("fruits", Value::Array(vec![inner])),
    ]);
    assert_eq!(
        warnings(&decode::<Basket>(&value)),
        ["unexpected key in top.fruits[0].ripe"]
    );
}

// ============================================================================
// Optional and default fields
// ============================================================================

#[test]
fn optional_and_default_fields_fill_in() {
    let value = Value::table([("host", Value::from("localhost")), ("port", Value::from(8080))]);
    assert_eq!(
        decode::<Server>(&value).value(),
        Some(&Server {
            host: "localhost".into(),
            port: 8080,
            tags: None,
            workers: 4,
            verbose: false,
        })
    );
}

#[test]
fn optional_and_default_fields_read_present_values() {
    let value = Value::table([
        ("host", Value::from("localhost")),
        ("port", Value::from(8080)),
        ("tags", Value::array(["a", "b"])),
        ("workers", Value::from(16)),
        ("verbose", Value::from(true)),
    ]);
    let server = decode::<Server>(&value).value().map(|s| (s.tags.clone(), s.workers, s.verbose));
    assert_eq!(
        server,
        Some((Some(vec!["a".to_string(), "b".to_string()]), 16, true))
    );
}

#[test]
fn optional_present_value_is_still_checked() {
    let value = Value::table([
        ("host", Value::from("localhost")),
        ("port", Value::from(8080)),
        ("tags", Value::from("a")),
    ]);
    assert_eq!(
        errors(&decode::<Server>(&value)),
        ["type error. wanted: array got: string in top.tags"]
    );
}

#[test]
fn none_fields_are_omitted_when_encoding() {
    let server = Server {
        host: "localhost".into(),
        port: 8080,
        tags: None,
        workers: 4,
        verbose: false,
    };
    assert_eq!(
        to_toml_string(&server),
        "host = \"localhost\"\nport = 8080\nworkers = 4\nverbose = false\n"
    );
}

#[test]
fn some_fields_are_encoded() {
    let server = Server {
        host: "h".into(),
        port: 1,
        tags: Some(vec!["x".into()]),
        workers: 2,
        verbose: true,
    };
    let keys: Vec<String> = encode(&server).keys().cloned().collect();
    assert_eq!(keys, ["host", "port", "tags", "workers", "verbose"]);
}

// ============================================================================
// Array mapping
// ============================================================================

#[test]
fn tuple_decodes_positionally() {
    let value = Value::array([Value::from(42), Value::from("forty-two")]);
    let outcome = decode::<(i64, String)>(&value);
    assert_eq!(
        outcome,
        Outcome::Success {
            warnings: vec![],
            value: (42, "forty-two".to_string())
        }
    );
    assert_eq!((42i64, "forty-two".to_string()).to_value(), value);
}

#[test]
fn tuple_struct_array_mapping() {
    let value = Value::array([Value::from(42), Value::from("forty-two")]);
    assert_eq!(
        decode::<Answer>(&value).value(),
        Some(&Answer(42, "forty-two".into()))
    );
    assert_eq!(Answer(42, "forty-two".into()).to_value(), value);
}

#[test]
fn named_struct_array_mapping() {
    let value = Value::array([1.5, 2.0]);
    assert_eq!(decode::<Point>(&value).value(), Some(&Point { x: 1.5, y: 2.0 }));
    assert_eq!(Point { x: 1.5, y: 2.0 }.to_value(), value);
}

#[test]
fn arity_mismatch_fails_at_array() {
    let value = Value::array([1, 2, 3]);
    assert_eq!(
        errors(&decode::<Answer>(&value)),
        ["expected array of length 2, got length 3 in top"]
    );
}

#[test]
fn array_mapping_rejects_non_array() {
    assert_eq!(
        errors(&decode::<Point>(&fruit_value("red", "round"))),
        ["type error. wanted: array got: table in top"]
    );
}

#[test]
fn array_element_failure_is_indexed() {
    let value = Value::array([Value::from("42"), Value::from("forty-two")]);
    assert_eq!(
        errors(&decode::<Answer>(&value)),
        ["type error. wanted: integer got: string in top[0]"]
    );
}

#[test]
fn triple_and_quadruple_tuples() {
    let value = Value::array([Value::from(1), Value::from(true), Value::from("x")]);
    assert_eq!(
        decode::<(u8, bool, String)>(&value).value(),
        Some(&(1, true, "x".to_string()))
    );
    let value = Value::array([1, 2, 3, 4]);
    assert_eq!(decode::<(i32, i32, i32, i32)>(&value).value(), Some(&(1, 2, 3, 4)));
}

// ============================================================================
// Scalars and containers
// ============================================================================

#[test]
fn integer_range_is_checked() {
    assert_eq!(
        errors(&decode::<u8>(&Value::from(300))),
        ["integer out of range for u8 in top"]
    );
    assert_eq!(decode::<u8>(&Value::from(255)).value(), Some(&255));
    assert_eq!(
        errors(&decode::<u32>(&Value::from(-1))),
        ["integer out of range for u32 in top"]
    );
}

#[test]
fn float_accepts_integer() {
    assert_eq!(decode::<f64>(&Value::from(3)).value(), Some(&3.0));
    assert_eq!(decode::<f64>(&Value::from(2.5)).value(), Some(&2.5));
    assert_eq!(
        errors(&decode::<f64>(&Value::from("3"))),
        ["type error. wanted: float got: string in top"]
    );
}

#[test]
fn float_widens_integers_beyond_i64() {
    let big = BigInt::from(1u8) << 70;
    assert_eq!(
        decode::<f64>(&Value::Integer(big)).value(),
        Some(&2f64.powi(70))
    );
    let negative = -(BigInt::from(u64::MAX) * 4u32);
    assert_eq!(
        decode::<f64>(&Value::Integer(negative)).value(),
        Some(&(-(u64::MAX as f64) * 4.0))
    );
}

#[test]
fn float_rejects_integers_beyond_f64() {
    let huge = BigInt::from(1u8) << 1100;
    assert_eq!(
        errors(&decode::<f64>(&Value::Integer(huge))),
        ["integer out of range for f64 in top"]
    );
}

#[test]
fn char_requires_single_character() {
    assert_eq!(decode::<char>(&Value::from("x")).value(), Some(&'x'));
    assert_eq!(
        errors(&decode::<char>(&Value::from("xy"))),
        ["expected single character in top"]
    );
}

#[test]
fn dates_decode_from_matching_variant() {
    let day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    assert_eq!(decode::<NaiveDate>(&Value::from(day)).value(), Some(&day));
    assert_eq!(
        errors(&decode::<NaiveDate>(&Value::from("2024-02-29"))),
        ["type error. wanted: local date got: string in top"]
    );
}

#[test]
fn vec_elements_are_indexed() {
    let value = Value::array([Value::from(1), Value::from(2), Value::from("3")]);
    assert_eq!(
        errors(&decode::<Vec<i64>>(&value)),
        ["type error. wanted: integer got: string in top[2]"]
    );
}

#[test]
fn maps_decode_every_entry() {
    let value = Value::table([("b", Value::from(2)), ("a", Value::from(1))]);
    let ordered = decode::<IndexMap<String, i64>>(&value);
    let keys: Vec<&String> = ordered.value().unwrap().keys().collect();
    assert_eq!(keys, ["b", "a"]);

    let sorted = decode::<BTreeMap<String, i64>>(&value);
    let keys: Vec<&String> = sorted.value().unwrap().keys().collect();
    assert_eq!(keys, ["a", "b"]);
}

#[test]
fn maps_encode_as_tables() {
    let mut map = BTreeMap::new();
    map.insert("z".to_string(), 1);
    map.insert("a".to_string(), 2);
    assert_eq!(to_toml_string(&map), "a = 2\nz = 1\n");
}

#[test]
fn value_passes_through() {
    let value = fruit_value("red", "round");
    assert_eq!(decode::<Value>(&value).value(), Some(&value));
}

#[test]
fn decode_table_entry_point() {
    let Value::Table(table) = fruit_value("red", "round") else {
        unreachable!()
    };
    assert!(decode_table::<Fruit>(&table).is_success());
}

#[test]
fn decode_table_matches_decode_on_value() {
    let Value::Table(table) = fruit_with_extra() else {
        unreachable!()
    };
    let from_table = decode_table::<Fruit>(&table);
    assert_eq!(from_table, decode::<Fruit>(&Value::Table(table.clone())));
    assert_eq!(
        warnings(&from_table),
        ["unexpected key in top.size", "unexpected key in top.weight"]
    );
}

#[test]
fn decode_table_reports_field_paths() {
    let value = Value::table([
        ("owner", Value::from("ann")),
        ("fruits", Value::array([Value::table([("color", Value::from("red"))])])),
    ]);
    let Value::Table(table) = value else {
        unreachable!()
    };
    assert_eq!(
        errors(&decode_table::<Basket>(&table)),
        ["missing key in top.fruits[0].shape"]
    );
}

#[test]
fn decode_table_for_maps_and_hand_written_mappings() {
    let Value::Table(table) = Value::table([("a", Value::from(1)), ("b", Value::from("x"))]) else {
        unreachable!()
    };
    assert_eq!(
        errors(&decode_table::<BTreeMap<String, i64>>(&table)),
        ["type error. wanted: integer got: string in top.b"]
    );

    let Value::Table(legacy) = Value::table([("name", Value::from("new"))]) else {
        unreachable!()
    };
    assert_eq!(
        decode_table::<Legacy>(&legacy).value(),
        Some(&Legacy { name: "new".into() })
    );
}

// ============================================================================
// Hand-written mappings
// ============================================================================

#[derive(Debug, PartialEq)]
enum Port {
    Number(u16),
    Named(String),
}

impl FromValue for Port {
    fn from_value(value: &Value, dec: &mut Decoder) -> Decoded<Self> {
        dec.first_of(
            |dec| u16::from_value(value, dec).map(Port::Number),
            |dec| String::from_value(value, dec).map(Port::Named),
        )
    }
}

#[test]
fn choice_between_representations() {
    assert_eq!(decode::<Port>(&Value::from(80)).value(), Some(&Port::Number(80)));
    assert_eq!(
        decode::<Port>(&Value::from("http")).value(),
        Some(&Port::Named("http".into()))
    );
    assert_eq!(
        errors(&decode::<Port>(&Value::from(true))),
        [
            "type error. wanted: integer got: boolean in top",
            "type error. wanted: string got: boolean in top"
        ]
    );
}

#[derive(Debug, PartialEq)]
struct Legacy {
    name: String,
}

impl FromValue for Legacy {
    fn from_value(value: &Value, dec: &mut Decoder) -> Decoded<Self> {
        parse_table(value, dec, |tp| {
            let name = match tp.opt_key::<String>("title")? {
                Some(title) => {
                    tp.decoder().in_key("title", |dec| {
                        dec.warn("deprecated, use name");
                        Ok(())
                    })?;
                    title
                }
                None => tp.req_key("name")?,
            };
            Ok(Legacy { name })
        })
    }
}

#[test]
fn deprecated_option_warns_and_succeeds() {
    let value = Value::table([("title", Value::from("old"))]);
    let outcome = decode::<Legacy>(&value);
    assert_eq!(outcome.value(), Some(&Legacy { name: "old".into() }));
    assert_eq!(warnings(&outcome), ["deprecated, use name in top.title"]);
}

// ============================================================================
// Encoding to documents
// ============================================================================

#[test]
fn nested_records_render_as_array_of_tables() {
    let basket = Basket {
        owner: "ann".into(),
        fruits: vec![
            Fruit {
                color: "red".into(),
                shape: "round".into(),
            },
            Fruit {
                color: "yellow".into(),
                shape: "long".into(),
            },
        ],
    };
    assert_eq!(
        to_toml_string(&basket),
        "owner = \"ann\"\n\n[[fruits]]\ncolor = \"red\"\nshape = \"round\"\n\n[[fruits]]\ncolor = \"yellow\"\nshape = \"long\"\n"
    );
}

#[test]
fn decode_of_encode_is_identity() {
    let basket = Basket {
        owner: "bob".into(),
        fruits: vec![Fruit {
            color: "green".into(),
            shape: "pear".into(),
        }],
    };
    let outcome = decode::<Basket>(&basket_value(&basket));
    assert_eq!(outcome.value(), Some(&basket));
    assert!(outcome.warnings().is_empty());
}

fn basket_value(basket: &Basket) -> Value {
    basket.to_value()
}

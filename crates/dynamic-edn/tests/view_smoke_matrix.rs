use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use dynamic_edn::{
    deserialize_str, dynamic_object, DynamicObject, Edn, EdnMap, EdnTranslator, Error, FromEdn,
    ReadOptions, Registry, Result, Unknown,
};

const SIMPLE_SCHEMA_EDN: &str =
    "{:str \"expected value\", :i 4, :d 3.14, :f 3.14, :lng 1234567890, :shrt 4}";

dynamic_object! {
    pub struct SimpleSchema {
        shrt: i16,
        i: i32,
        lng: i64,
        f: f32,
        d: f64,
        str: String,
    }
}

dynamic_object! {
    pub struct NestedSchema {
        version: i32,
        simple: SimpleSchema,
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Celsius(i64);

struct CelsiusTranslator;

impl EdnTranslator<Celsius> for CelsiusTranslator {
    fn tag(&self) -> &str {
        "view-smoke/celsius"
    }

    fn read(&self, element: Edn) -> Result<Celsius> {
        i64::from_edn(element).map(Celsius)
    }

    fn write(&self, value: &Celsius) -> Edn {
        Edn::Integer(value.0)
    }
}

fn simple() -> SimpleSchema {
    deserialize_str(SIMPLE_SCHEMA_EDN).expect("simple schema")
}

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn simple_fields_read_typed() {
    let s = simple();
    assert_eq!(s.str().as_deref(), Some("expected value"));
    assert_eq!(s.shrt(), Some(4));
    assert_eq!(s.i(), Some(4));
    assert_eq!(s.lng(), Some(1234567890));
    assert!((s.d().unwrap() - 3.14).abs() < 0.001);
    assert!((s.f().unwrap() - 3.14).abs() < 0.001);
}

#[test]
fn nested_views_compare_equal_to_direct_reads() {
    let nested: NestedSchema =
        deserialize_str(&format!("{{:version 1, :simple {SIMPLE_SCHEMA_EDN}}}")).unwrap();
    assert_eq!(nested.version(), Some(1));
    assert_eq!(nested.simple(), Some(simple()));
}

#[test]
fn view_prints_its_source_text() {
    assert_eq!(simple().to_string(), SIMPLE_SCHEMA_EDN);
}

#[test]
fn backing_map_equals_a_plain_read() {
    let plain = edn_pack::read_str(SIMPLE_SCHEMA_EDN, &ReadOptions::new()).unwrap();
    assert_eq!(Edn::Map(simple().map().clone()), plain);
}

#[test]
fn assoc_then_restore_is_equal() {
    let initial = simple();
    let changed = initial.assoc("str", "new value");
    assert_eq!(changed.str().as_deref(), Some("new value"));
    assert_eq!(changed.assoc("str", "expected value"), initial);
}

#[test]
fn equality_and_hash_follow_the_map() {
    let a = simple();
    let b = simple();
    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));
    assert_ne!(a.assoc("key", "new-value"), b);
}

#[test]
fn unknown_fields_are_kept() {
    let edn = "{:str \"str\", :i 4, :d 3.14, :unknown \"unknown\"}";
    let with_unknowns: SimpleSchema = deserialize_str(edn).unwrap();
    assert_ne!(with_unknowns, simple());
    assert_eq!(
        with_unknowns.map().get_keyword("unknown"),
        Some(&Edn::from("unknown"))
    );
    assert_eq!(with_unknowns.to_string(), edn);
}

#[test]
fn assoc_ex_adds_new_keys_only() {
    let s = simple();
    let assoced = s.assoc_ex("new-field", "new-value").unwrap();
    assert_eq!(
        assoced.map().get_keyword("new-field"),
        Some(&Edn::from("new-value"))
    );
    assert!(matches!(s.assoc_ex("str", "str"), Err(Error::KeyExists(_))));
}

#[test]
fn without_last_field_prints_empty_map() {
    let s: SimpleSchema = deserialize_str("{:str \"value\"}").unwrap();
    assert_eq!(s.without("str").to_string(), "{}");
}

#[test]
fn non_map_input_is_a_type_mismatch() {
    let err = deserialize_str::<SimpleSchema>("[1 2]").unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { found: "vector", .. }));
}

#[test]
fn registered_view_tags_round_trip() {
    let registry = Registry::new();
    registry.register_tag::<SimpleSchema>("test/simple").unwrap();
    assert_eq!(
        registry.view_tag_of::<SimpleSchema>().as_deref(),
        Some("test/simple")
    );

    let text = "#test/simple{:str \"tagged\", :i 7}";
    let view: SimpleSchema = registry.deserialize_str(text).unwrap();
    assert_eq!(view.i(), Some(7));
    assert_eq!(registry.serialize(&view.clone().into_edn()).unwrap(), text);

    let nested: NestedSchema = registry
        .deserialize_str("{:version 2, :simple #test/simple{:i 1}}")
        .unwrap();
    assert_eq!(nested.simple().and_then(|s| s.i()), Some(1));

    registry.deregister_tag::<SimpleSchema>();
    registry.deregister_tag::<SimpleSchema>();
    assert_eq!(registry.view_tag_of::<SimpleSchema>(), None);
    assert_eq!(
        registry.serialize(&view.into_edn()).unwrap(),
        "{:str \"tagged\", :i 7}"
    );
}

#[test]
fn tagged_view_of_the_wrong_type_is_rejected() {
    let registry = Registry::new();
    registry.register_tag::<SimpleSchema>("test/only-simple").unwrap();
    let err = registry
        .deserialize_str::<NestedSchema>("#test/only-simple{}")
        .unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));

    let err = registry
        .deserialize_str::<Edn>("#test/only-simple [1]")
        .unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { found: "vector", .. }));
}

#[test]
fn views_build_from_maps_in_code() {
    let mut map = EdnMap::new();
    map.insert_keyword("version", 3i64);
    let nested = NestedSchema::wrap(map);
    assert_eq!(nested.version(), Some(3));
    assert_eq!(nested.simple(), None);
}

#[test]
fn deregister_type_on_a_view_clears_read_and_write_sides() {
    let registry = Registry::new();
    registry.register_tag::<SimpleSchema>("test/typed-away").unwrap();
    registry.deregister_type::<SimpleSchema>();
    assert_eq!(registry.view_tag_of::<SimpleSchema>(), None);
    assert!(registry.tags().is_empty());

    let read: Edn = registry.deserialize_str("#test/typed-away{:i 1}").unwrap();
    let unknown = Unknown::from_edn(read).unwrap();
    assert_eq!(unknown.tag(), "test/typed-away");

    let view: SimpleSchema = registry.deserialize_str("{:i 1}").unwrap();
    assert_eq!(registry.serialize(&view.into_edn()).unwrap(), "{:i 1}");
}

#[test]
fn display_falls_back_for_values_the_global_registry_cannot_print() {
    let registry = Registry::new();
    registry
        .register_type::<Celsius, _>(CelsiusTranslator)
        .unwrap();
    let text = "{:i 1, :temp #view-smoke/celsius 5}";
    let view: SimpleSchema = registry.deserialize_str(text).unwrap();
    assert_eq!(registry.serialize(&view.clone().into_edn()).unwrap(), text);

    assert!(matches!(view.to_edn_string(), Err(Error::NoPrintMethod(_))));
    let shown = view.to_string();
    assert!(shown.starts_with("{:i 1, :temp #object["), "{shown}");
    assert!(shown.ends_with("Celsius]}"), "{shown}");
}

#[test]
fn views_fill_from_json_and_export_back() {
    let payload = serde_json::json!({"str": "from json", "i": 9, "d": 2.5});
    let view = SimpleSchema::from_edn(edn_pack::json::json_to_edn(&payload)).unwrap();
    assert_eq!(view.str().as_deref(), Some("from json"));
    assert_eq!(view.i(), Some(9));
    assert_eq!(view.to_string(), "{:str \"from json\", :i 9, :d 2.5}");

    let exported = edn_pack::json::edn_to_json(&view.assoc("i", 10i64).into_edn()).unwrap();
    assert_eq!(exported, serde_json::json!({"str": "from json", "i": 10, "d": 2.5}));

    let registry = Registry::new();
    registry
        .register_type::<Celsius, _>(CelsiusTranslator)
        .unwrap();
    let tagged: SimpleSchema = registry
        .deserialize_str("{:temp #view-smoke/celsius 1}")
        .unwrap();
    assert!(edn_pack::json::edn_to_json(&tagged.into_edn()).is_err());
}

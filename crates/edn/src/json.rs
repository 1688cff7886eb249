//! Conversion between [`Edn`] and `serde_json::Value`.

use serde_json::{Map, Number, Value as JsonValue};

use crate::error::EdnError;
use crate::map::EdnMap;
use crate::value::Edn;

/// Convert JSON to EDN. Object keys become keywords.
pub fn json_to_edn(value: &JsonValue) -> Edn {
    match value {
        JsonValue::Null => Edn::Nil,
        JsonValue::Bool(b) => Edn::Bool(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Edn::Integer(i),
            None => Edn::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        JsonValue::String(s) => Edn::Str(s.clone()),
        JsonValue::Array(items) => Edn::Vector(items.iter().map(json_to_edn).collect()),
        JsonValue::Object(fields) => Edn::Map(
            fields
                .iter()
                .map(|(k, v)| (Edn::keyword(k.as_str()), json_to_edn(v)))
                .collect::<EdnMap>(),
        ),
    }
}

/// Convert EDN to JSON.
///
/// Keywords, symbols and characters become strings; lists and sets become
/// arrays; views become objects. Map keys must be strings or keywords.
/// Non-finite floats and objects have no JSON form.
pub fn edn_to_json(value: &Edn) -> Result<JsonValue, EdnError> {
    Ok(match value {
        Edn::Nil => JsonValue::Null,
        Edn::Bool(b) => JsonValue::Bool(*b),
        Edn::Integer(i) => JsonValue::Number((*i).into()),
        Edn::Float(f) => JsonValue::Number(
            Number::from_f64(*f).ok_or(EdnError::NotJson("non-finite float"))?,
        ),
        Edn::Char(c) => JsonValue::String(c.to_string()),
        Edn::Str(s) => JsonValue::String(s.clone()),
        Edn::Keyword(k) => JsonValue::String(k.as_str().to_owned()),
        Edn::Symbol(s) => JsonValue::String(s.as_str().to_owned()),
        Edn::List(items) | Edn::Vector(items) | Edn::Set(items) => {
            JsonValue::Array(items.iter().map(edn_to_json).collect::<Result<_, _>>()?)
        }
        Edn::Map(map) => map_to_json(map)?,
        Edn::View(view) => map_to_json(view.map())?,
        Edn::Object(_) => return Err(EdnError::NotJson("object")),
    })
}

fn map_to_json(map: &EdnMap) -> Result<JsonValue, EdnError> {
    let mut fields = Map::with_capacity(map.len());
    for (key, value) in map.iter() {
        let key = match key {
            Edn::Keyword(k) => k.as_str().to_owned(),
            Edn::Str(s) => s.clone(),
            _ => return Err(EdnError::NotJson("map key")),
        };
        fields.insert(key, edn_to_json(value)?);
    }
    Ok(JsonValue::Object(fields))
}

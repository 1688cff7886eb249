//! The in-memory EDN value.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::map::EdnMap;
use crate::object::{Object, ObjectValue, View};

/// A keyword, stored without its leading `:`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Keyword(String);

impl Keyword {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Full name including the namespace, if any (`ns/name`).
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn namespace(&self) -> Option<&str> {
        split_namespace(&self.0).0
    }

    pub fn name(&self) -> &str {
        split_namespace(&self.0).1
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.0)
    }
}

/// A symbol such as `foo`, `my.ns/bar` or a tag name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn namespace(&self) -> Option<&str> {
        split_namespace(&self.0).0
    }

    pub fn name(&self) -> &str {
        split_namespace(&self.0).1
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn split_namespace(full: &str) -> (Option<&str>, &str) {
    // A lone "/" is a valid symbol with no namespace.
    match full.find('/') {
        Some(idx) if idx > 0 && idx + 1 < full.len() => (Some(&full[..idx]), &full[idx + 1..]),
        _ => (None, full),
    }
}

/// An EDN value.
///
/// `View` and `Object` carry values that only exist in memory: typed views over
/// a map, and application values produced by tag readers. Both print through a
/// [`PrintDispatch`](crate::PrintDispatch).
#[derive(Debug, Clone)]
pub enum Edn {
    Nil,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Char(char),
    Str(String),
    Keyword(Keyword),
    Symbol(Symbol),
    List(Vec<Edn>),
    Vector(Vec<Edn>),
    Map(EdnMap),
    Set(Vec<Edn>),
    View(View),
    Object(Object),
}

impl Edn {
    pub fn keyword(name: impl Into<String>) -> Self {
        Edn::Keyword(Keyword::new(name))
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Edn::Symbol(Symbol::new(name))
    }

    pub fn object<T: ObjectValue>(value: T) -> Self {
        Edn::Object(Object::new(value))
    }

    /// Short name of the value's shape, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Edn::Nil => "nil",
            Edn::Bool(_) => "boolean",
            Edn::Integer(_) => "integer",
            Edn::Float(_) => "float",
            Edn::Char(_) => "character",
            Edn::Str(_) => "string",
            Edn::Keyword(_) => "keyword",
            Edn::Symbol(_) => "symbol",
            Edn::List(_) => "list",
            Edn::Vector(_) => "vector",
            Edn::Map(_) => "map",
            Edn::Set(_) => "set",
            Edn::View(_) => "view",
            Edn::Object(_) => "object",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Edn::Nil)
    }

    pub fn as_map(&self) -> Option<&EdnMap> {
        match self {
            Edn::Map(map) => Some(map),
            Edn::View(view) => Some(view.map()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Edn::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Edn::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Edn::Float(f) => Some(*f),
            Edn::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Elements of a list or vector.
    pub fn as_seq(&self) -> Option<&[Edn]> {
        match self {
            Edn::List(items) | Edn::Vector(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Edn::Object(object) => Some(object),
            _ => None,
        }
    }
}

fn float_eq(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

fn unordered_eq(a: &[Edn], b: &[Edn]) -> bool {
    a.len() == b.len() && a.iter().all(|x| b.contains(x)) && b.iter().all(|y| a.contains(y))
}

impl PartialEq for Edn {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Edn::Nil, Edn::Nil) => true,
            (Edn::Bool(a), Edn::Bool(b)) => a == b,
            (Edn::Integer(a), Edn::Integer(b)) => a == b,
            (Edn::Float(a), Edn::Float(b)) => float_eq(*a, *b),
            (Edn::Char(a), Edn::Char(b)) => a == b,
            (Edn::Str(a), Edn::Str(b)) => a == b,
            (Edn::Keyword(a), Edn::Keyword(b)) => a == b,
            (Edn::Symbol(a), Edn::Symbol(b)) => a == b,
            // Lists and vectors are both sequential and compare equal by element.
            (Edn::List(a) | Edn::Vector(a), Edn::List(b) | Edn::Vector(b)) => a == b,
            (Edn::Map(a), Edn::Map(b)) => a == b,
            (Edn::Set(a), Edn::Set(b)) => unordered_eq(a, b),
            (Edn::View(a), Edn::View(b)) => a == b,
            (Edn::Object(a), Edn::Object(b)) => a == b,
            _ => false,
        }
    }
}

// NaN equals NaN under `float_eq`, so equality is reflexive.
impl Eq for Edn {}

impl Hash for Edn {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Edn::Nil => state.write_u8(0),
            Edn::Bool(b) => {
                state.write_u8(1);
                b.hash(state);
            }
            Edn::Integer(i) => {
                state.write_u8(2);
                i.hash(state);
            }
            Edn::Float(f) => {
                state.write_u8(3);
                let normalized = if *f == 0.0 {
                    0.0f64
                } else if f.is_nan() {
                    f64::NAN
                } else {
                    *f
                };
                normalized.to_bits().hash(state);
            }
            Edn::Char(c) => {
                state.write_u8(4);
                c.hash(state);
            }
            Edn::Str(s) => {
                state.write_u8(5);
                s.hash(state);
            }
            Edn::Keyword(k) => {
                state.write_u8(6);
                k.hash(state);
            }
            Edn::Symbol(s) => {
                state.write_u8(7);
                s.hash(state);
            }
            Edn::List(items) | Edn::Vector(items) => {
                state.write_u8(8);
                items.hash(state);
            }
            Edn::Map(map) => {
                state.write_u8(9);
                map.hash(state);
            }
            Edn::Set(items) => {
                state.write_u8(10);
                state.write_usize(items.len());
                state.write_u64(crate::map::unordered_hash(items.iter()));
            }
            Edn::View(view) => {
                state.write_u8(11);
                view.hash(state);
            }
            Edn::Object(object) => {
                state.write_u8(12);
                object.value_type_id().hash(state);
            }
        }
    }
}

impl From<bool> for Edn {
    fn from(value: bool) -> Self {
        Edn::Bool(value)
    }
}

impl From<i64> for Edn {
    fn from(value: i64) -> Self {
        Edn::Integer(value)
    }
}

impl From<i32> for Edn {
    fn from(value: i32) -> Self {
        Edn::Integer(value.into())
    }
}

impl From<i16> for Edn {
    fn from(value: i16) -> Self {
        Edn::Integer(value.into())
    }
}

impl From<f64> for Edn {
    fn from(value: f64) -> Self {
        Edn::Float(value)
    }
}

impl From<f32> for Edn {
    fn from(value: f32) -> Self {
        Edn::Float(value.into())
    }
}

impl From<char> for Edn {
    fn from(value: char) -> Self {
        Edn::Char(value)
    }
}

impl From<&str> for Edn {
    fn from(value: &str) -> Self {
        Edn::Str(value.to_owned())
    }
}

impl From<String> for Edn {
    fn from(value: String) -> Self {
        Edn::Str(value)
    }
}

impl From<Keyword> for Edn {
    fn from(value: Keyword) -> Self {
        Edn::Keyword(value)
    }
}

impl From<Symbol> for Edn {
    fn from(value: Symbol) -> Self {
        Edn::Symbol(value)
    }
}

impl From<EdnMap> for Edn {
    fn from(value: EdnMap) -> Self {
        Edn::Map(value)
    }
}

impl From<Vec<Edn>> for Edn {
    fn from(value: Vec<Edn>) -> Self {
        Edn::Vector(value)
    }
}

impl<T: Into<Edn>> From<Option<T>> for Edn {
    fn from(value: Option<T>) -> Self {
        value.map_or(Edn::Nil, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_namespace_split() {
        let kw = Keyword::new("some-ns/some-rec");
        assert_eq!(kw.namespace(), Some("some-ns"));
        assert_eq!(kw.name(), "some-rec");
        assert_eq!(Keyword::new("plain").namespace(), None);
        assert_eq!(Symbol::new("/").name(), "/");
        assert_eq!(kw.to_string(), ":some-ns/some-rec");
    }

    #[test]
    fn list_and_vector_compare_equal() {
        let list = Edn::List(vec![Edn::Integer(1), Edn::Integer(2)]);
        let vector = Edn::Vector(vec![Edn::Integer(1), Edn::Integer(2)]);
        assert_eq!(list, vector);
    }

    #[test]
    fn integer_and_float_are_distinct() {
        assert_ne!(Edn::Integer(1), Edn::Float(1.0));
        assert_eq!(Edn::Float(f64::NAN), Edn::Float(f64::NAN));
    }

    #[test]
    fn set_equality_ignores_order() {
        let a = Edn::Set(vec![Edn::keyword("a"), Edn::keyword("b")]);
        let b = Edn::Set(vec![Edn::keyword("b"), Edn::keyword("a")]);
        assert_eq!(a, b);
    }

    #[test]
    fn option_converts_to_nil() {
        assert_eq!(Edn::from(None::<i64>), Edn::Nil);
        assert_eq!(Edn::from(Some("x")), Edn::Str("x".into()));
    }
}

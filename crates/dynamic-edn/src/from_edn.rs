//! Coercion of a read value into the caller's target type.

use edn_pack::{Edn, EdnMap, Keyword, Object, ObjectValue, Symbol, View};

use crate::error::{Error, Result};
use crate::unknown::Unknown;

/// Conversion from a freshly read [`Edn`] value.
///
/// Fails with [`Error::TypeMismatch`] when the value's shape does not fit.
pub trait FromEdn: Sized {
    fn from_edn(value: Edn) -> Result<Self>;
}

impl FromEdn for Edn {
    fn from_edn(value: Edn) -> Result<Self> {
        Ok(value)
    }
}

impl<T: FromEdn> FromEdn for Option<T> {
    fn from_edn(value: Edn) -> Result<Self> {
        match value {
            Edn::Nil => Ok(None),
            other => T::from_edn(other).map(Some),
        }
    }
}

impl FromEdn for bool {
    fn from_edn(value: Edn) -> Result<Self> {
        match value {
            Edn::Bool(b) => Ok(b),
            other => Err(Error::type_mismatch("boolean", &other)),
        }
    }
}

macro_rules! from_edn_int {
    ($($ty:ty),*) => {
        $(
            impl FromEdn for $ty {
                fn from_edn(value: Edn) -> Result<Self> {
                    match value {
                        Edn::Integer(i) => <$ty>::try_from(i)
                            .map_err(|_| Error::type_mismatch(stringify!($ty), &value)),
                        other => Err(Error::type_mismatch(stringify!($ty), &other)),
                    }
                }
            }
        )*
    };
}

from_edn_int!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl FromEdn for f64 {
    fn from_edn(value: Edn) -> Result<Self> {
        value
            .as_f64()
            .ok_or_else(|| Error::type_mismatch("f64", &value))
    }
}

impl FromEdn for f32 {
    fn from_edn(value: Edn) -> Result<Self> {
        f64::from_edn(value).map(|f| f as f32)
    }
}

impl FromEdn for char {
    fn from_edn(value: Edn) -> Result<Self> {
        match value {
            Edn::Char(c) => Ok(c),
            other => Err(Error::type_mismatch("character", &other)),
        }
    }
}

impl FromEdn for String {
    fn from_edn(value: Edn) -> Result<Self> {
        match value {
            Edn::Str(s) => Ok(s),
            other => Err(Error::type_mismatch("string", &other)),
        }
    }
}

impl FromEdn for Keyword {
    fn from_edn(value: Edn) -> Result<Self> {
        match value {
            Edn::Keyword(k) => Ok(k),
            other => Err(Error::type_mismatch("keyword", &other)),
        }
    }
}

impl FromEdn for Symbol {
    fn from_edn(value: Edn) -> Result<Self> {
        match value {
            Edn::Symbol(s) => Ok(s),
            other => Err(Error::type_mismatch("symbol", &other)),
        }
    }
}

impl FromEdn for EdnMap {
    fn from_edn(value: Edn) -> Result<Self> {
        match value {
            Edn::Map(map) => Ok(map),
            Edn::View(view) => Ok(view.into_map()),
            other => Err(Error::type_mismatch("map", &other)),
        }
    }
}

impl FromEdn for Vec<Edn> {
    fn from_edn(value: Edn) -> Result<Self> {
        match value {
            Edn::List(items) | Edn::Vector(items) => Ok(items),
            other => Err(Error::type_mismatch("list or vector", &other)),
        }
    }
}

impl FromEdn for View {
    fn from_edn(value: Edn) -> Result<Self> {
        match value {
            Edn::View(view) => Ok(view),
            other => Err(Error::type_mismatch("view", &other)),
        }
    }
}

impl FromEdn for Object {
    fn from_edn(value: Edn) -> Result<Self> {
        match value {
            Edn::Object(object) => Ok(object),
            other => Err(Error::type_mismatch("object", &other)),
        }
    }
}

impl FromEdn for Unknown {
    fn from_edn(value: Edn) -> Result<Self> {
        Translated::<Unknown>::from_edn(value).map(Translated::into_inner)
    }
}

/// Target type for values produced by a registered translator.
///
/// `deserialize_str::<Translated<Point>>("#geo/point [1 2]")` yields the
/// `Point` the translator read.
#[derive(Debug, Clone, PartialEq)]
pub struct Translated<T>(pub T);

impl<T> Translated<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: ObjectValue + Clone> FromEdn for Translated<T> {
    fn from_edn(value: Edn) -> Result<Self> {
        let expected = std::any::type_name::<T>();
        match value {
            Edn::Object(object) => object.downcast::<T>().map(Translated).map_err(|object| {
                Error::TypeMismatch {
                    expected,
                    found: object.type_name(),
                }
            }),
            other => Err(Error::type_mismatch(expected, &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_are_range_checked() {
        assert_eq!(i16::from_edn(Edn::Integer(4)).unwrap(), 4);
        assert!(matches!(
            i8::from_edn(Edn::Integer(1000)),
            Err(Error::TypeMismatch { expected: "i8", found: "integer" })
        ));
        assert!(u32::from_edn(Edn::Integer(-1)).is_err());
    }

    #[test]
    fn floats_accept_integers() {
        assert_eq!(f64::from_edn(Edn::Integer(2)).unwrap(), 2.0);
        assert!((f32::from_edn(Edn::Float(3.14)).unwrap() - 3.14).abs() < 0.001);
    }

    #[test]
    fn option_maps_nil_to_none() {
        assert_eq!(Option::<String>::from_edn(Edn::Nil).unwrap(), None);
        assert_eq!(
            Option::<String>::from_edn(Edn::Str("x".into())).unwrap(),
            Some("x".to_owned())
        );
    }

    #[test]
    fn translated_reports_the_object_type_on_mismatch() {
        let err = Translated::<String>::from_edn(Edn::object(5u8)).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { found: "u8", .. }));
    }
}

//! Typed views over EDN maps.
//!
//! A [`DynamicObject`] owns the map it was read from and exposes typed
//! accessors that look fields up by keyword on demand. Keys the view does not
//! know about stay in the map, so they still take part in equality and print
//! back out.

use std::marker::PhantomData;

use edn_pack::{BoxError, Edn, EdnMap, Keyword, TagReader, View};

use crate::error::{Error, Result};
use crate::from_edn::FromEdn;
use crate::registry::Registry;

/// A statically-shaped view over an [`EdnMap`].
///
/// Usually declared with [`dynamic_object!`](crate::dynamic_object), which
/// also derives equality, hashing and printing from the backing map.
pub trait DynamicObject: Sized + Send + Sync + 'static {
    /// Materialize the view over `map`.
    fn wrap(map: EdnMap) -> Self;

    /// The backing map, unchanged since it was read.
    fn map(&self) -> &EdnMap;

    fn into_map(self) -> EdnMap;

    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Read the field stored under `:key`. `None` if it is absent or does not
    /// convert to `T`.
    fn get<T: FromEdn>(&self, key: &str) -> Option<T> {
        let value = self.map().get_keyword(key)?.clone();
        T::from_edn(value).ok()
    }

    /// Copy with `:key` set to `value`.
    fn assoc(&self, key: &str, value: impl Into<Edn>) -> Self {
        let mut map = self.map().clone();
        map.insert_keyword(key, value);
        Self::wrap(map)
    }

    /// Like [`assoc`](Self::assoc), but fails with [`Error::KeyExists`] if
    /// `:key` is already present.
    fn assoc_ex(&self, key: &str, value: impl Into<Edn>) -> Result<Self> {
        if self.map().get_keyword(key).is_some() {
            return Err(Error::KeyExists(key.to_owned()));
        }
        Ok(self.assoc(key, value))
    }

    /// Copy without `:key`.
    fn without(&self, key: &str) -> Self {
        let mut map = self.map().clone();
        map.remove(&Edn::Keyword(Keyword::new(key)));
        Self::wrap(map)
    }

    fn to_view(&self) -> View {
        View::new::<Self>(self.map().clone())
    }

    fn into_edn(self) -> Edn {
        Edn::View(View::new::<Self>(self.into_map()))
    }

    /// Serialize through the global registry, tagged if the view type has a
    /// registered tag.
    fn to_edn_string(&self) -> Result<String> {
        Registry::global().serialize(&Edn::View(self.to_view()))
    }

    /// Infallible form of [`to_edn_string`](Self::to_edn_string), used by
    /// `Display`. Values the global registry cannot print come out as
    /// `#object[type]`.
    fn to_edn_string_lenient(&self) -> String {
        Registry::global().serialize_lenient(&Edn::View(self.to_view()))
    }
}

/// Turn a read value into the view `V`.
///
/// A raw map is wrapped. A view is accepted only if it already is a `V`.
pub fn materialize<V: DynamicObject>(value: Edn) -> Result<V> {
    match value {
        Edn::Map(map) => Ok(V::wrap(map)),
        Edn::View(view) if view.is::<V>() => Ok(V::wrap(view.into_map())),
        Edn::View(view) => Err(Error::TypeMismatch {
            expected: V::type_name(),
            found: view.type_name(),
        }),
        other => Err(Error::type_mismatch(V::type_name(), &other)),
    }
}

/// Tag reader for a view type registered with
/// [`Registry::register_tag`].
pub(crate) struct RecordReader<V> {
    _marker: PhantomData<fn() -> V>,
}

impl<V> RecordReader<V> {
    pub(crate) fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<V: DynamicObject> TagReader for RecordReader<V> {
    fn read_tagged(&self, _tag: &str, element: Edn) -> Result<Edn, BoxError> {
        match element {
            Edn::Map(map) => Ok(Edn::View(View::new::<V>(map))),
            other => Err(Box::new(Error::type_mismatch(V::type_name(), &other))),
        }
    }
}

/// Declare a [`DynamicObject`] view type with typed accessors.
///
/// Each field becomes a method returning `Option<T>`, read from the keyword
/// of the same name. The struct derives `Clone`, `PartialEq`, `Eq`, `Hash`
/// and `Debug` from its backing map. `Display` prints it as EDN through the
/// global registry, with `#object[type]` standing in for values it has no
/// print method for.
///
/// ```
/// use dynamic_edn::{deserialize_str, dynamic_object};
///
/// dynamic_object! {
///     pub struct Version {
///         major: i32,
///         label: String,
///     }
/// }
///
/// let v: Version = deserialize_str("{:major 2, :label \"beta\"}").unwrap();
/// assert_eq!(v.major(), Some(2));
/// assert_eq!(v.label().as_deref(), Some("beta"));
/// assert_eq!(v.to_string(), "{:major 2, :label \"beta\"}");
/// ```
#[macro_export]
macro_rules! dynamic_object {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone)]
        $vis struct $name {
            map: $crate::EdnMap,
        }

        impl $name {
            $(
                $(#[$field_meta])*
                pub fn $field(&self) -> ::core::option::Option<$ty> {
                    $crate::DynamicObject::get(self, stringify!($field))
                }
            )*
        }

        impl $crate::DynamicObject for $name {
            fn wrap(map: $crate::EdnMap) -> Self {
                Self { map }
            }

            fn map(&self) -> &$crate::EdnMap {
                &self.map
            }

            fn into_map(self) -> $crate::EdnMap {
                self.map
            }
        }

        impl $crate::FromEdn for $name {
            fn from_edn(value: $crate::Edn) -> $crate::Result<Self> {
                $crate::materialize(value)
            }
        }

        impl ::core::convert::From<$name> for $crate::Edn {
            fn from(value: $name) -> Self {
                $crate::DynamicObject::into_edn(value)
            }
        }

        impl ::core::cmp::PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.map == other.map
            }
        }

        impl ::core::cmp::Eq for $name {}

        impl ::core::hash::Hash for $name {
            fn hash<H: ::core::hash::Hasher>(&self, state: &mut H) {
                ::core::hash::Hash::hash(&self.map, state);
            }
        }

        impl ::core::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.map).finish()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&$crate::DynamicObject::to_edn_string_lenient(self))
            }
        }
    };
}

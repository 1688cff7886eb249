//! Tagged EDN with pluggable translators.
//!
//! `dynamic-edn` layers a process-wide tag registry on top of the
//! [`edn_pack`] reader and printer:
//!
//! - [`EdnTranslator`] codecs turn `#tag element` into application values and
//!   back.
//! - Tags nobody registered are captured as [`Unknown`] and print back
//!   byte-for-byte, unless the default reader is cleared.
//! - [`DynamicObject`] views give typed accessors over a map without
//!   dropping the keys they do not know about.
//!
//! The free functions below act on [`Registry::global`]. Build a separate
//! [`Registry`] to keep registrations isolated.
//!
//! ```
//! use dynamic_edn::{Edn, EdnTranslator, Registry, Result, Translated};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Money(i64);
//!
//! struct Cents;
//!
//! impl EdnTranslator<Money> for Cents {
//!     fn tag(&self) -> &str { "shop/cents" }
//!     fn read(&self, element: Edn) -> Result<Money> {
//!         dynamic_edn::FromEdn::from_edn(element).map(Money)
//!     }
//!     fn write(&self, value: &Money) -> Edn { Edn::Integer(value.0) }
//! }
//!
//! let registry = Registry::new();
//! registry.register_type::<Money, _>(Cents).unwrap();
//!
//! let Translated(price) = registry
//!     .deserialize_str::<Translated<Money>>("#shop/cents 1250")
//!     .unwrap();
//! assert_eq!(price, Money(1250));
//! assert_eq!(registry.serialize_value(&price).unwrap(), "#shop/cents 1250");
//!
//! let foreign: Edn = registry.deserialize_str("#vendor/thing{:a 1}").unwrap();
//! assert_eq!(registry.serialize(&foreign).unwrap(), "#vendor/thing{:a 1}");
//! ```

mod dispatch;
mod dynamic_object;
mod error;
mod from_edn;
mod registry;
mod serialization;
mod translator;
mod unknown;

use std::io::{BufRead, Write};

pub use dynamic_object::{materialize, DynamicObject};
pub use edn_pack::{
    DefaultReader, Edn, EdnMap, EdnReader, Keyword, Object, ObjectValue, ReadOptions, Symbol,
    View,
};
pub use error::{Error, Result};
pub use from_edn::{FromEdn, Translated};
pub use registry::Registry;
pub use serialization::EdnStream;
pub use translator::EdnTranslator;
pub use unknown::Unknown;

pub fn register_type<T, X>(translator: X) -> Result<()>
where
    T: ObjectValue,
    X: EdnTranslator<T>,
{
    Registry::global().register_type(translator)
}

pub fn deregister_type<T: 'static>() {
    Registry::global().deregister_type::<T>()
}

pub fn register_tag<V: DynamicObject>(tag: &str) -> Result<()> {
    Registry::global().register_tag::<V>(tag)
}

pub fn deregister_tag<V: DynamicObject>() {
    Registry::global().deregister_tag::<V>()
}

/// Set or clear the global fallback for unregistered tags.
pub fn set_default_reader(reader: Option<DefaultReader>) {
    Registry::global().set_default_reader(reader)
}

pub fn deserialize<T: FromEdn, R: BufRead>(reader: &mut EdnReader<R>) -> Result<T> {
    Registry::global().deserialize(reader)
}

pub fn deserialize_str<T: FromEdn>(text: &str) -> Result<T> {
    Registry::global().deserialize_str(text)
}

pub fn deserialize_seq<T: FromEdn, R: BufRead>(reader: EdnReader<R>) -> EdnStream<T, R> {
    Registry::global().deserialize_seq(reader)
}

pub fn serialize(value: &Edn) -> Result<String> {
    Registry::global().serialize(value)
}

pub fn serialize_to<W: Write>(value: &Edn, out: &mut W) -> Result<()> {
    Registry::global().serialize_to(value, out)
}

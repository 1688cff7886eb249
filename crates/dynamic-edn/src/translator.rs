//! User codecs for application types.

use std::marker::PhantomData;

use edn_pack::{BoxError, Edn, Object, ObjectValue, TagReader};

use crate::error::Result;

/// A bidirectional codec between `T` and its tagged EDN representation.
///
/// `write` produces the element that follows `#tag`; `read` receives that
/// element back.
///
/// ```
/// use dynamic_edn::{Edn, EdnTranslator, Error, Result};
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct Point { x: i64, y: i64 }
///
/// struct PointTranslator;
///
/// impl EdnTranslator<Point> for PointTranslator {
///     fn tag(&self) -> &str { "geo/point" }
///
///     fn read(&self, element: Edn) -> Result<Point> {
///         match element.as_seq() {
///             Some([Edn::Integer(x), Edn::Integer(y)]) => Ok(Point { x: *x, y: *y }),
///             _ => Err(Error::type_mismatch("[x y]", &element)),
///         }
///     }
///
///     fn write(&self, p: &Point) -> Edn {
///         Edn::Vector(vec![p.x.into(), p.y.into()])
///     }
/// }
/// ```
pub trait EdnTranslator<T>: Send + Sync + 'static {
    fn tag(&self) -> &str;
    fn read(&self, element: Edn) -> Result<T>;
    fn write(&self, value: &T) -> Edn;
}

/// Writer half of a registered translator, with the value type erased.
pub(crate) trait ObjectPrinter: Send + Sync {
    fn tag(&self) -> &str;
    /// `None` when `object` does not hold the translator's type.
    fn write_object(&self, object: &Object) -> Option<Edn>;
}

/// Registry-side wrapper binding a translator to its value type.
pub(crate) struct TranslatorAdapter<T, X> {
    translator: X,
    _marker: PhantomData<fn() -> T>,
}

impl<T, X> TranslatorAdapter<T, X>
where
    T: ObjectValue,
    X: EdnTranslator<T>,
{
    pub(crate) fn new(translator: X) -> Self {
        Self {
            translator,
            _marker: PhantomData,
        }
    }
}

impl<T, X> TagReader for TranslatorAdapter<T, X>
where
    T: ObjectValue,
    X: EdnTranslator<T>,
{
    fn read_tagged(&self, _tag: &str, element: Edn) -> Result<Edn, BoxError> {
        let value = self.translator.read(element)?;
        Ok(Edn::Object(Object::new(value)))
    }
}

impl<T, X> ObjectPrinter for TranslatorAdapter<T, X>
where
    T: ObjectValue,
    X: EdnTranslator<T>,
{
    fn tag(&self) -> &str {
        self.translator.tag()
    }

    fn write_object(&self, object: &Object) -> Option<Edn> {
        object
            .downcast_ref::<T>()
            .map(|value| self.translator.write(value))
    }
}

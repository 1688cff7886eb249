//! In-memory-only values: application [`Object`]s and typed [`View`]s.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::map::EdnMap;

/// Bound for application values that can live inside an [`Edn`](crate::Edn)
/// tree as an [`Object`].
pub trait ObjectValue: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn eq_object(&self, other: &dyn Any) -> bool;
    fn type_name(&self) -> &'static str;
}

impl<T: Any + fmt::Debug + PartialEq + Send + Sync> ObjectValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_object(&self, other: &dyn Any) -> bool {
        other.downcast_ref::<T>().is_some_and(|other| self == other)
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// A shared, type-erased application value.
///
/// Produced by tag readers and printed by looking its runtime type up in a
/// print dispatch table.
#[derive(Clone)]
pub struct Object(Arc<dyn ObjectValue>);

impl Object {
    pub fn new<T: ObjectValue>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// `TypeId` of the wrapped value (not of `Object`).
    pub fn value_type_id(&self) -> TypeId {
        self.0.as_any().type_id()
    }

    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.0.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    /// Clone the wrapped value out, or hand the object back on a type miss.
    pub fn downcast<T: Any + Clone>(self) -> Result<T, Object> {
        if let Some(value) = self.downcast_ref::<T>() {
            return Ok(value.clone());
        }
        Err(self)
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.eq_object(other.0.as_any())
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

/// A type-erased typed view: a backing map plus the identity of the view type
/// it was materialized as.
///
/// Printers recognize views by this wrapper and print the backing map, tagged
/// when the view type has a registered tag.
#[derive(Clone)]
pub struct View {
    type_id: TypeId,
    type_name: &'static str,
    map: EdnMap,
}

impl View {
    pub fn new<V: Any>(map: EdnMap) -> Self {
        Self {
            type_id: TypeId::of::<V>(),
            type_name: std::any::type_name::<V>(),
            map,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Name of the view type. Also serves as its explicit dispatch key.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<V: Any>(&self) -> bool {
        self.type_id == TypeId::of::<V>()
    }

    pub fn map(&self) -> &EdnMap {
        &self.map
    }

    pub fn into_map(self) -> EdnMap {
        self.map
    }
}

impl PartialEq for View {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.map == other.map
    }
}

impl Eq for View {}

impl Hash for View {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.map.hash(state);
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("type", &self.type_name)
            .field("map", &self.map)
            .finish()
    }
}

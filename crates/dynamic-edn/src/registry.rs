//! The tag registry: which tags read into which types, and how those types
//! print back.
//!
//! Both directions are kept as immutable snapshots behind [`ArcSwap`]. Readers
//! and writers load a snapshot once per call and never lock. Structural
//! changes take the writer mutex, build the next snapshot from the current one
//! and publish it.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use arc_swap::{ArcSwap, ArcSwapOption};
use edn_pack::{DefaultReader, ObjectValue, ReadOptions, TagReader, TagTable};
use parking_lot::Mutex;

use crate::dispatch::{initial_print_table, DispatchKey, PrintContext, PrintMethod, PrintTable};
use crate::dynamic_object::{DynamicObject, RecordReader};
use crate::error::{Error, Result};
use crate::translator::{EdnTranslator, TranslatorAdapter};
use crate::unknown::read_unknown;

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Type bound to a tag.
#[derive(Debug, Clone, Copy)]
struct Owner {
    type_id: TypeId,
    type_name: &'static str,
    /// Set for view types, which are also printed by name.
    dispatch_name: Option<&'static str>,
}

impl Owner {
    fn print_keys(&self) -> impl Iterator<Item = DispatchKey> {
        std::iter::once(DispatchKey::Type(self.type_id))
            .chain(self.dispatch_name.map(DispatchKey::Name))
    }
}

/// Bookkeeping for deregistration. Only touched under the writer lock.
#[derive(Default)]
struct Caches {
    owners: HashMap<String, Owner>,
    tag_by_type: HashMap<TypeId, String>,
}

impl Caches {
    /// Claim `tag` for `owner`. Returns the tag `owner` held before, if it was
    /// a different one.
    fn bind(&mut self, tag: &str, owner: Owner) -> Result<Option<String>> {
        if let Some(existing) = self.owners.get(tag) {
            if existing.type_id != owner.type_id {
                return Err(Error::DuplicateRegistration {
                    tag: tag.to_owned(),
                    existing: existing.type_name,
                });
            }
        }
        let previous = self
            .tag_by_type
            .insert(owner.type_id, tag.to_owned())
            .filter(|old| old != tag);
        if let Some(old) = &previous {
            self.owners.remove(old);
        }
        self.owners.insert(tag.to_owned(), owner);
        Ok(previous)
    }

    fn unbind(&mut self, type_id: TypeId) -> Option<(String, Owner)> {
        let tag = self.tag_by_type.remove(&type_id)?;
        let owner = self.owners.remove(&tag)?;
        Some((tag, owner))
    }
}

/// Tag readers, print methods and the unknown-tag fallback.
///
/// Most code uses the process-wide [`Registry::global`] through the crate's
/// free functions. Separate instances are fully independent.
pub struct Registry {
    tags: ArcSwap<TagTable>,
    print_methods: ArcSwap<PrintTable>,
    default_reader: ArcSwapOption<DefaultReader>,
    caches: Mutex<Caches>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// An empty registry with the built-in fallback that captures unknown
    /// tags as [`Unknown`](crate::Unknown).
    pub fn new() -> Self {
        Self {
            tags: ArcSwap::from_pointee(TagTable::new()),
            print_methods: ArcSwap::from_pointee(initial_print_table()),
            default_reader: ArcSwapOption::from_pointee(builtin_default()),
            caches: Mutex::new(Caches::default()),
        }
    }

    pub fn global() -> &'static Registry {
        GLOBAL.get_or_init(Registry::new)
    }

    /// Register `translator` as the codec for `T`.
    ///
    /// Re-registering `T` replaces its codec. If the tag changed, the old tag
    /// stops resolving. Fails with [`Error::DuplicateRegistration`] when the
    /// tag already belongs to another type, leaving the registry unchanged.
    ///
    /// The tag reader is published before the print method. A read running
    /// concurrently can produce a `T` that a concurrent `serialize` does not
    /// print yet; it fails with [`Error::NoPrintMethod`] until this returns.
    pub fn register_type<T, X>(&self, translator: X) -> Result<()>
    where
        T: ObjectValue,
        X: EdnTranslator<T>,
    {
        let tag = translator.tag().to_owned();
        let owner = Owner {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            dispatch_name: None,
        };
        let adapter = Arc::new(TranslatorAdapter::<T, X>::new(translator));
        let reader: Arc<dyn TagReader> = adapter.clone();

        let mut caches = self.caches.lock();
        let previous = caches.bind(&tag, owner)?;
        self.publish_tag(&tag, reader, previous.as_deref());
        self.print_methods.rcu(|table| {
            let mut next = PrintTable::clone(table);
            next.insert(
                DispatchKey::Type(owner.type_id),
                PrintMethod::Translator(adapter.clone()),
            );
            next
        });
        log_binding(&tag, owner, previous.as_deref());
        Ok(())
    }

    /// Remove whatever tag `T` is bound to, translator or view. Does nothing
    /// if `T` has none.
    pub fn deregister_type<T: 'static>(&self) {
        self.unbind(TypeId::of::<T>());
    }

    /// Bind `tag` to the view type `V`.
    ///
    /// `#tag {...}` then reads as a view of `V`, and views of `V` print with
    /// the tag. Duplicate handling matches
    /// [`register_type`](Self::register_type).
    pub fn register_tag<V: DynamicObject>(&self, tag: &str) -> Result<()> {
        let owner = Owner {
            type_id: TypeId::of::<V>(),
            type_name: V::type_name(),
            dispatch_name: Some(V::type_name()),
        };
        let reader: Arc<dyn TagReader> = Arc::new(RecordReader::<V>::new());
        let method = PrintMethod::Record { tag: tag.into() };

        let mut caches = self.caches.lock();
        let previous = caches.bind(tag, owner)?;
        self.publish_tag(tag, reader, previous.as_deref());
        self.print_methods.rcu(|table| {
            let mut next = PrintTable::clone(table);
            next.extend(owner.print_keys().map(|key| (key, method.clone())));
            next
        });
        log_binding(tag, owner, previous.as_deref());
        Ok(())
    }

    /// Remove the tag bound to `V`. Does nothing if `V` has none.
    pub fn deregister_tag<V: DynamicObject>(&self) {
        self.unbind(TypeId::of::<V>());
    }

    /// Replace the fallback for unregistered tags. `None` makes them fail with
    /// [`Error::UnknownTag`].
    pub fn set_default_reader(&self, reader: Option<DefaultReader>) {
        log::debug!("default reader {}", if reader.is_some() { "set" } else { "cleared" });
        self.default_reader.store(reader.map(Arc::new));
    }

    /// Restore the built-in fallback that captures [`Unknown`](crate::Unknown)
    /// values.
    pub fn reset_default_reader(&self) {
        self.set_default_reader(Some(builtin_default()));
    }

    pub fn has_default_reader(&self) -> bool {
        self.default_reader.load().is_some()
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.tags.load().keys().cloned().collect();
        tags.sort_unstable();
        tags
    }

    pub fn is_registered<T: 'static>(&self) -> bool {
        self.caches
            .lock()
            .tag_by_type
            .contains_key(&TypeId::of::<T>())
    }

    /// The tag a translator type is registered under.
    pub fn tag_of<T: 'static>(&self) -> Option<String> {
        self.caches
            .lock()
            .tag_by_type
            .get(&TypeId::of::<T>())
            .cloned()
    }

    /// The tag a view type prints with, as the write path resolves it.
    pub fn view_tag_of<V: DynamicObject>(&self) -> Option<String> {
        let table = self.print_methods.load();
        let method = table
            .get(&DispatchKey::Type(TypeId::of::<V>()))
            .or_else(|| table.get(&DispatchKey::Name(V::type_name())))?;
        match method {
            PrintMethod::Record { tag } => Some(tag.to_string()),
            _ => None,
        }
    }

    /// Snapshot of the read side, fixed for the duration of one read.
    pub fn read_options(&self) -> ReadOptions {
        ReadOptions {
            readers: self.tags.load_full(),
            default: self
                .default_reader
                .load_full()
                .map(|reader| DefaultReader::clone(&reader)),
        }
    }

    pub(crate) fn print_context(&self, lenient: bool) -> PrintContext {
        PrintContext {
            table: self.print_methods.load_full(),
            lenient,
        }
    }

    fn publish_tag(&self, tag: &str, reader: Arc<dyn TagReader>, previous: Option<&str>) {
        self.tags.rcu(|table| {
            let mut next = TagTable::clone(table);
            if let Some(old) = previous {
                next.remove(old);
            }
            next.insert(tag.to_owned(), reader.clone());
            next
        });
    }

    fn unbind(&self, type_id: TypeId) {
        let mut caches = self.caches.lock();
        let Some((tag, owner)) = caches.unbind(type_id) else {
            return;
        };
        self.tags.rcu(|table| {
            let mut next = TagTable::clone(table);
            next.remove(&tag);
            next
        });
        self.print_methods.rcu(|table| {
            let mut next = PrintTable::clone(table);
            for key in owner.print_keys() {
                next.remove(&key);
            }
            next
        });
        log::debug!("deregistered #{tag} ({})", owner.type_name);
    }
}

fn builtin_default() -> DefaultReader {
    Arc::new(read_unknown)
}

fn log_binding(tag: &str, owner: Owner, previous: Option<&str>) {
    if let Some(old) = previous {
        log::warn!("{} moved from #{old} to #{tag}", owner.type_name);
    }
    log::debug!("registered #{tag} ({})", owner.type_name);
}

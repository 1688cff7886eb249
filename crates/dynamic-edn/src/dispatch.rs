//! Write-side dispatch: which printer handles a given runtime type.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use edn_pack::{EdnError, EdnWriter, Object, PrintDispatch, View};

use crate::translator::ObjectPrinter;
use crate::unknown::Unknown;

/// Key a print method is installed under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum DispatchKey {
    /// Exact runtime type.
    Type(TypeId),
    /// Explicit dispatch name, the view type's name.
    Name(&'static str),
}

#[derive(Clone)]
pub(crate) enum PrintMethod {
    /// `#tag <translator output>`.
    Translator(Arc<dyn ObjectPrinter>),
    /// `#tag{backing map}` for a registered view type.
    Record { tag: Arc<str> },
    /// `#tag element` for captured unknown tags.
    Unknown,
}

pub(crate) type PrintTable = HashMap<DispatchKey, PrintMethod>;

/// The print table every registry starts with.
pub(crate) fn initial_print_table() -> PrintTable {
    let mut table = PrintTable::new();
    table.insert(DispatchKey::Type(TypeId::of::<Unknown>()), PrintMethod::Unknown);
    table
}

/// A print table snapshot, as seen by one `serialize` call.
pub(crate) struct PrintContext {
    pub(crate) table: Arc<PrintTable>,
    /// Print objects with no method as `#object[type]` instead of failing.
    pub(crate) lenient: bool,
}

impl PrintContext {
    fn print_method(&self, object: &Object, writer: &mut EdnWriter<'_>) -> Result<(), EdnError> {
        let missing = || EdnError::NoPrintMethod(object.type_name().to_owned());
        match self.table.get(&DispatchKey::Type(object.value_type_id())) {
            Some(PrintMethod::Translator(printer)) => {
                let element = printer.write_object(object).ok_or_else(missing)?;
                writer.write_tagged(printer.tag(), &element)
            }
            Some(PrintMethod::Unknown) => {
                let unknown = object.downcast_ref::<Unknown>().ok_or_else(missing)?;
                writer.write_tagged(unknown.tag(), unknown.element())
            }
            Some(PrintMethod::Record { .. }) | None => Err(missing()),
        }
    }
}

impl PrintDispatch for PrintContext {
    fn print_object(&self, object: &Object, writer: &mut EdnWriter<'_>) -> Result<(), EdnError> {
        match self.print_method(object, writer) {
            Err(EdnError::NoPrintMethod(name)) if self.lenient => {
                writer.raw(&format!("#object[{name}]"));
                Ok(())
            }
            other => other,
        }
    }

    fn view_tag(&self, view: &View) -> Option<Arc<str>> {
        let method = self
            .table
            .get(&DispatchKey::Type(view.type_id()))
            .or_else(|| self.table.get(&DispatchKey::Name(view.type_name())))?;
        match method {
            PrintMethod::Record { tag } => Some(tag.clone()),
            _ => None,
        }
    }
}

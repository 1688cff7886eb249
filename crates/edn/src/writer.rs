//! EDN printer with per-type dispatch for objects and views.

use std::fmt::Write as _;
use std::sync::Arc;

use crate::error::EdnError;
use crate::map::EdnMap;
use crate::object::{Object, View};
use crate::value::Edn;

/// How the writer prints values it has no built-in printer for.
pub trait PrintDispatch {
    /// Print an application object, usually as a tagged literal.
    fn print_object(&self, object: &Object, writer: &mut EdnWriter<'_>) -> Result<(), EdnError>;

    /// Tag to print a view under, if its type has one.
    fn view_tag(&self, view: &View) -> Option<Arc<str>>;
}

/// Dispatch with no registered printers: objects fail, views print untagged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDispatch;

impl PrintDispatch for NoDispatch {
    fn print_object(&self, object: &Object, _: &mut EdnWriter<'_>) -> Result<(), EdnError> {
        Err(EdnError::NoPrintMethod(object.type_name().to_owned()))
    }

    fn view_tag(&self, _: &View) -> Option<Arc<str>> {
        None
    }
}

/// Prints [`Edn`] values to an in-memory buffer.
///
/// Output follows Clojure's `pr`: map entries are separated by `", "`, other
/// collection elements by a single space, floats always carry a decimal point
/// or exponent.
pub struct EdnWriter<'d> {
    out: String,
    dispatch: &'d dyn PrintDispatch,
}

impl EdnWriter<'static> {
    pub fn plain() -> Self {
        Self::new(&NoDispatch)
    }
}

impl<'d> EdnWriter<'d> {
    pub fn new(dispatch: &'d dyn PrintDispatch) -> Self {
        Self {
            out: String::new(),
            dispatch,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    /// Take the printed text, leaving the writer empty.
    pub fn flush(&mut self) -> String {
        std::mem::take(&mut self.out)
    }

    /// Append raw text.
    pub fn raw(&mut self, text: &str) {
        self.out.push_str(text);
    }

    pub fn write(&mut self, value: &Edn) -> Result<(), EdnError> {
        match value {
            Edn::Nil => self.out.push_str("nil"),
            Edn::Bool(b) => self.out.push_str(if *b { "true" } else { "false" }),
            Edn::Integer(i) => {
                let _ = write!(self.out, "{i}");
            }
            Edn::Float(f) => self.write_float(*f),
            Edn::Char(c) => self.write_char(*c),
            Edn::Str(s) => self.write_string(s),
            Edn::Keyword(k) => {
                let _ = write!(self.out, "{k}");
            }
            Edn::Symbol(s) => self.out.push_str(s.as_str()),
            Edn::List(items) => self.write_seq('(', ')', items)?,
            Edn::Vector(items) => self.write_seq('[', ']', items)?,
            Edn::Map(map) => self.write_map(map)?,
            Edn::Set(items) => {
                self.out.push('#');
                self.write_seq('{', '}', items)?;
            }
            Edn::View(view) => self.write_view(view)?,
            Edn::Object(object) => {
                let dispatch = self.dispatch;
                dispatch.print_object(object, self)?;
            }
        }
        Ok(())
    }

    /// Print `#tag element`. A map element follows the tag directly
    /// (`#tag{}`); anything else is separated by one space (`#tag []`).
    pub fn write_tagged(&mut self, tag: &str, element: &Edn) -> Result<(), EdnError> {
        self.out.push('#');
        self.out.push_str(tag);
        let mark = self.out.len();
        self.write(element)?;
        if !self.out[mark..].starts_with('{') {
            self.out.insert(mark, ' ');
        }
        Ok(())
    }

    pub fn write_map(&mut self, map: &EdnMap) -> Result<(), EdnError> {
        self.out.push('{');
        for (idx, (key, value)) in map.iter().enumerate() {
            if idx > 0 {
                self.out.push_str(", ");
            }
            self.write(key)?;
            self.out.push(' ');
            self.write(value)?;
        }
        self.out.push('}');
        Ok(())
    }

    fn write_view(&mut self, view: &View) -> Result<(), EdnError> {
        if let Some(tag) = self.dispatch.view_tag(view) {
            self.out.push('#');
            self.out.push_str(&tag);
        }
        self.write_map(view.map())
    }

    fn write_seq(&mut self, open: char, close: char, items: &[Edn]) -> Result<(), EdnError> {
        self.out.push(open);
        for (idx, item) in items.iter().enumerate() {
            if idx > 0 {
                self.out.push(' ');
            }
            self.write(item)?;
        }
        self.out.push(close);
        Ok(())
    }

    fn write_float(&mut self, f: f64) {
        if f.is_nan() {
            self.out.push_str("##NaN");
        } else if f.is_infinite() {
            self.out.push_str(if f > 0.0 { "##Inf" } else { "##-Inf" });
        } else {
            // `Debug` keeps a trailing `.0` on integral values.
            let _ = write!(self.out, "{f:?}");
        }
    }

    fn write_char(&mut self, c: char) {
        self.out.push('\\');
        match c {
            '\n' => self.out.push_str("newline"),
            ' ' => self.out.push_str("space"),
            '\t' => self.out.push_str("tab"),
            '\r' => self.out.push_str("return"),
            '\u{8}' => self.out.push_str("backspace"),
            '\u{c}' => self.out.push_str("formfeed"),
            c => self.out.push(c),
        }
    }

    fn write_string(&mut self, s: &str) {
        self.out.push('"');
        for c in s.chars() {
            match c {
                '"' => self.out.push_str("\\\""),
                '\\' => self.out.push_str("\\\\"),
                '\n' => self.out.push_str("\\n"),
                '\t' => self.out.push_str("\\t"),
                '\r' => self.out.push_str("\\r"),
                '\u{8}' => self.out.push_str("\\b"),
                '\u{c}' => self.out.push_str("\\f"),
                c => self.out.push(c),
            }
        }
        self.out.push('"');
    }
}

/// Print `value` with the given dispatch.
pub fn print_str(value: &Edn, dispatch: &dyn PrintDispatch) -> Result<String, EdnError> {
    let mut writer = EdnWriter::new(dispatch);
    writer.write(value)?;
    Ok(writer.flush())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Keyword;

    fn print(value: &Edn) -> String {
        print_str(value, &NoDispatch).expect("print")
    }

    #[test]
    fn prints_scalars() {
        assert_eq!(print(&Edn::Nil), "nil");
        assert_eq!(print(&Edn::Integer(-3)), "-3");
        assert_eq!(print(&Edn::Float(3.14)), "3.14");
        assert_eq!(print(&Edn::Float(1.0)), "1.0");
        assert_eq!(print(&Edn::Float(f64::NEG_INFINITY)), "##-Inf");
        assert_eq!(print(&Edn::Char(' ')), "\\space");
        assert_eq!(print(&Edn::Str("a\"b\n".into())), "\"a\\\"b\\n\"");
        assert_eq!(print(&Edn::Keyword(Keyword::new("a/b"))), ":a/b");
    }

    #[test]
    fn prints_collections() {
        let mut map = EdnMap::new();
        map.insert_keyword("key", Edn::keyword("value"));
        map.insert_keyword("n", 1i64);
        assert_eq!(print(&Edn::Map(map)), "{:key :value, :n 1}");
        assert_eq!(
            print(&Edn::Vector(vec![Edn::Integer(1), Edn::Str("x".into())])),
            "[1 \"x\"]"
        );
        assert_eq!(print(&Edn::List(vec![])), "()");
        assert_eq!(print(&Edn::Set(vec![Edn::Integer(1)])), "#{1}");
    }

    #[test]
    fn tagged_spacing_depends_on_element() {
        let mut writer = EdnWriter::plain();
        writer.write_tagged("tag", &Edn::Map(EdnMap::new())).unwrap();
        assert_eq!(writer.flush(), "#tag{}");
        writer.write_tagged("tag", &Edn::Str("asdf".into())).unwrap();
        assert_eq!(writer.flush(), "#tag \"asdf\"");
        writer.write_tagged("tag", &Edn::Vector(vec![])).unwrap();
        assert_eq!(writer.flush(), "#tag []");
    }

    #[test]
    fn objects_need_dispatch() {
        let err = print_str(&Edn::object(5u8), &NoDispatch).unwrap_err();
        assert!(matches!(err, EdnError::NoPrintMethod(name) if name == "u8"));
    }

    #[test]
    fn untagged_view_prints_as_map() {
        struct Shape;
        let mut map = EdnMap::new();
        map.insert_keyword("a", 1i64);
        assert_eq!(print(&Edn::View(View::new::<Shape>(map))), "{:a 1}");
    }
}

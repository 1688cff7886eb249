//! Read and write entry points on [`Registry`].

use std::io::{BufRead, Write};
use std::iter::FusedIterator;
use std::marker::PhantomData;

use edn_pack::{Edn, EdnReader, EdnWriter, ObjectValue, ReadOptions};

use crate::error::{Error, Result};
use crate::from_edn::FromEdn;
use crate::registry::Registry;

impl Registry {
    /// Read the next form from `reader` and convert it to `T`.
    ///
    /// Fails with [`Error::EndOfInput`] when the stream holds no more forms.
    pub fn deserialize<T, R>(&self, reader: &mut EdnReader<R>) -> Result<T>
    where
        T: FromEdn,
        R: BufRead,
    {
        read_one(reader, &self.read_options())
    }

    /// Read a single form from `text`.
    pub fn deserialize_str<T: FromEdn>(&self, text: &str) -> Result<T> {
        let mut reader = EdnReader::new(text.as_bytes());
        self.deserialize(&mut reader)
    }

    /// Lazily read consecutive forms until the stream ends.
    ///
    /// The registry snapshot is taken here, once, and used for every form the
    /// iterator yields.
    pub fn deserialize_seq<T, R>(&self, reader: EdnReader<R>) -> EdnStream<T, R>
    where
        T: FromEdn,
        R: BufRead,
    {
        EdnStream {
            reader,
            opts: self.read_options(),
            done: false,
            _marker: PhantomData,
        }
    }

    pub fn serialize(&self, value: &Edn) -> Result<String> {
        let context = self.print_context(false);
        let mut writer = EdnWriter::new(&context);
        writer.write(value)?;
        Ok(writer.flush())
    }

    /// Like [`serialize`](Self::serialize), but never fails: objects with no
    /// print method come out as `#object[type]`.
    pub fn serialize_lenient(&self, value: &Edn) -> String {
        let context = self.print_context(true);
        let mut writer = EdnWriter::new(&context);
        if let Err(err) = writer.write(value) {
            log::warn!("lenient print stopped early: {err}");
        }
        writer.flush()
    }

    /// Print `value` into `out` and flush it.
    pub fn serialize_to<W: Write>(&self, value: &Edn, out: &mut W) -> Result<()> {
        let text = self.serialize(value)?;
        out.write_all(text.as_bytes()).map_err(Error::Io)?;
        out.flush().map_err(Error::Io)
    }

    /// Print a value of a registered translator type.
    pub fn serialize_value<T: ObjectValue + Clone>(&self, value: &T) -> Result<String> {
        self.serialize(&Edn::object(value.clone()))
    }
}

fn read_one<T: FromEdn, R: BufRead>(reader: &mut EdnReader<R>, opts: &ReadOptions) -> Result<T> {
    match reader.read(opts)? {
        Some(value) => T::from_edn(value),
        None => Err(Error::EndOfInput),
    }
}

/// Iterator over the forms of an EDN stream, from
/// [`Registry::deserialize_seq`].
///
/// Ends at end of input. After the first error it yields nothing more.
pub struct EdnStream<T, R> {
    reader: EdnReader<R>,
    opts: ReadOptions,
    done: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<T, R> EdnStream<T, R> {
    pub fn into_reader(self) -> EdnReader<R> {
        self.reader
    }
}

impl<T: FromEdn, R: BufRead> Iterator for EdnStream<T, R> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match read_one(&mut self.reader, &self.opts) {
            Ok(value) => Some(Ok(value)),
            Err(Error::EndOfInput) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl<T: FromEdn, R: BufRead> FusedIterator for EdnStream<T, R> {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Accepts every write, then fails to flush.
    struct UnflushableSink(Vec<u8>);

    impl Write for UnflushableSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::WriteZero, "device full"))
        }
    }

    #[test]
    fn empty_input_is_end_of_input() {
        let registry = Registry::new();
        let err = registry.deserialize_str::<Edn>("  ; nothing\n").unwrap_err();
        assert!(matches!(err, Error::EndOfInput));
    }

    #[test]
    fn serialize_to_reports_sink_failures() {
        let registry = Registry::new();
        let err = registry
            .serialize_to(&Edn::Integer(1), &mut FailingSink)
            .unwrap_err();
        assert!(matches!(err, Error::Io(e) if e.kind() == io::ErrorKind::BrokenPipe));
    }

    #[test]
    fn serialize_to_reports_flush_failures() {
        let registry = Registry::new();
        let mut sink = UnflushableSink(Vec::new());
        let err = registry
            .serialize_to(&Edn::keyword("k"), &mut sink)
            .unwrap_err();
        assert!(matches!(err, Error::Io(e) if e.kind() == io::ErrorKind::WriteZero));
        assert_eq!(sink.0, b":k");
    }

    #[test]
    fn serialize_to_writes_the_text() {
        let registry = Registry::new();
        let mut out = Vec::new();
        registry
            .serialize_to(&Edn::Vector(vec![1i64.into(), "a".into()]), &mut out)
            .unwrap();
        assert_eq!(out, b"[1 \"a\"]");
    }

    #[test]
    fn stream_stops_after_an_error() {
        let registry = Registry::new();
        let reader = EdnReader::new("1 2 ) 3".as_bytes());
        let items: Vec<Result<i64>> = registry.deserialize_seq(reader).collect();
        assert_eq!(items.len(), 3);
        assert!(matches!(items[0], Ok(1)));
        assert!(matches!(items[1], Ok(2)));
        assert!(items[2].is_err());
    }

    #[test]
    fn stream_hands_back_its_reader() {
        let registry = Registry::new();
        let mut stream = registry.deserialize_seq::<i64, _>(EdnReader::new("1 2 3".as_bytes()));
        assert!(matches!(stream.next(), Some(Ok(1))));
        let mut reader = stream.into_reader();
        assert_eq!(registry.deserialize::<i64, _>(&mut reader).unwrap(), 2);
    }

    #[test]
    fn lenient_print_names_objects_without_a_method() {
        #[derive(Debug, Clone, PartialEq)]
        struct Opaque;

        let registry = Registry::new();
        let value = Edn::Vector(vec![1i64.into(), Edn::object(Opaque)]);
        let text = registry.serialize_lenient(&value);
        assert!(text.starts_with("[1 #object["), "{text}");
        assert!(text.ends_with("Opaque]]"), "{text}");
    }

    #[test]
    fn unregistered_objects_have_no_print_method() {
        #[derive(Debug, Clone, PartialEq)]
        struct Opaque;

        let registry = Registry::new();
        let err = registry.serialize_value(&Opaque).unwrap_err();
        assert!(matches!(err, Error::NoPrintMethod(_)));
    }
}

//! Streaming EDN reader with pluggable tagged-literal handlers.

use std::collections::HashMap;
use std::io::{BufRead, ErrorKind};
use std::sync::Arc;

use crate::error::{BoxError, EdnError};
use crate::map::EdnMap;
use crate::value::{Edn, Keyword, Symbol};

/// Handler for one tag: turns the element following `#tag` into a value.
pub trait TagReader: Send + Sync {
    fn read_tagged(&self, tag: &str, element: Edn) -> Result<Edn, BoxError>;
}

impl<F> TagReader for F
where
    F: Fn(&str, Edn) -> Result<Edn, BoxError> + Send + Sync,
{
    fn read_tagged(&self, tag: &str, element: Edn) -> Result<Edn, BoxError> {
        self(tag, element)
    }
}

/// Fallback invoked for tags with no handler.
pub type DefaultReader = Arc<dyn Fn(&str, Edn) -> Edn + Send + Sync>;

/// Tag handlers keyed by tag text.
pub type TagTable = HashMap<String, Arc<dyn TagReader>>;

/// Read-time options: tag handlers plus the optional unknown-tag fallback.
#[derive(Clone, Default)]
pub struct ReadOptions {
    pub readers: Arc<TagTable>,
    pub default: Option<DefaultReader>,
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `#tag element`: exact handler first, then the default, else
    /// [`EdnError::UnknownTag`].
    pub fn resolve(&self, tag: &str, element: Edn) -> Result<Edn, EdnError> {
        if let Some(reader) = self.readers.get(tag) {
            return reader
                .read_tagged(tag, element)
                .map_err(|source| EdnError::TagRead {
                    tag: tag.to_owned(),
                    source,
                });
        }
        match &self.default {
            Some(default) => Ok(default(tag, element)),
            None => Err(EdnError::UnknownTag(tag.to_owned())),
        }
    }
}

/// Reads EDN forms one at a time from a buffered byte stream.
///
/// The reader keeps at most one character of lookahead, so a single instance
/// can be handed back and forth between calls to read consecutive forms.
pub struct EdnReader<R> {
    input: R,
    peeked: Option<char>,
    pos: usize,
}

impl<R: BufRead> EdnReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            peeked: None,
            pos: 0,
        }
    }

    /// Number of characters consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn into_inner(self) -> R {
        self.input
    }

    /// Read the next form. Returns `Ok(None)` at end of input.
    pub fn read(&mut self, opts: &ReadOptions) -> Result<Option<Edn>, EdnError> {
        loop {
            self.skip_ws()?;
            if self.peek()?.is_none() {
                return Ok(None);
            }
            if let Some(value) = self.read_form(opts)? {
                return Ok(Some(value));
            }
        }
    }

    // --- characters -------------------------------------------------------

    fn read_byte(&mut self) -> Result<Option<u8>, EdnError> {
        loop {
            let buf = match self.input.fill_buf() {
                Ok(buf) => buf,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            };
            let Some(&byte) = buf.first() else {
                return Ok(None);
            };
            self.input.consume(1);
            return Ok(Some(byte));
        }
    }

    fn decode_char(&mut self) -> Result<Option<char>, EdnError> {
        let Some(first) = self.read_byte()? else {
            return Ok(None);
        };
        let width = match first {
            0x00..=0x7f => return Ok(Some(first as char)),
            0xc0..=0xdf => 2,
            0xe0..=0xef => 3,
            0xf0..=0xf7 => 4,
            _ => return Err(EdnError::InvalidUtf8(self.pos)),
        };
        let mut buf = [first, 0, 0, 0];
        for slot in buf.iter_mut().take(width).skip(1) {
            *slot = self.read_byte()?.ok_or(EdnError::InvalidUtf8(self.pos))?;
        }
        std::str::from_utf8(&buf[..width])
            .ok()
            .and_then(|s| s.chars().next())
            .map(Some)
            .ok_or(EdnError::InvalidUtf8(self.pos))
    }

    fn peek(&mut self) -> Result<Option<char>, EdnError> {
        if self.peeked.is_none() {
            self.peeked = self.decode_char()?;
        }
        Ok(self.peeked)
    }

    fn next(&mut self) -> Result<Option<char>, EdnError> {
        let c = match self.peeked.take() {
            Some(c) => Some(c),
            None => self.decode_char()?,
        };
        if c.is_some() {
            self.pos += 1;
        }
        Ok(c)
    }

    fn expect_next(&mut self) -> Result<char, EdnError> {
        self.next()?.ok_or(EdnError::UnexpectedEof(self.pos))
    }

    fn syntax(&self, msg: &'static str) -> EdnError {
        EdnError::Syntax { pos: self.pos, msg }
    }

    fn skip_ws(&mut self) -> Result<(), EdnError> {
        while let Some(c) = self.peek()? {
            if is_whitespace(c) {
                self.next()?;
            } else if c == ';' {
                while let Some(c) = self.next()? {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
        Ok(())
    }

    fn read_token(&mut self, first: Option<char>) -> Result<String, EdnError> {
        let mut token = first.map(String::from).unwrap_or_default();
        while let Some(c) = self.peek()? {
            if is_terminator(c) {
                break;
            }
            token.push(c);
            self.next()?;
        }
        Ok(token)
    }

    // --- forms ------------------------------------------------------------

    /// Read one form. `None` means the form was a `#_` discard.
    fn read_form(&mut self, opts: &ReadOptions) -> Result<Option<Edn>, EdnError> {
        let c = self.expect_next()?;
        let value = match c {
            '(' => Edn::List(self.read_seq(')', opts)?),
            '[' => Edn::Vector(self.read_seq(']', opts)?),
            '{' => Edn::Map(self.read_map(opts)?),
            ')' | ']' | '}' => return Err(self.syntax("unmatched delimiter")),
            '"' => Edn::Str(self.read_string()?),
            '\\' => Edn::Char(self.read_char_literal()?),
            ':' => {
                let name = self.read_token(None)?;
                if name.is_empty() {
                    return Err(self.syntax("empty keyword"));
                }
                Edn::Keyword(Keyword::new(name))
            }
            '#' => return self.read_dispatch(opts),
            '0'..='9' => self.read_number(c)?,
            '+' | '-' if matches!(self.peek()?, Some('0'..='9')) => self.read_number(c)?,
            _ => self.read_symbolic(c)?,
        };
        Ok(Some(value))
    }

    /// Read forms until one is produced, skipping discards.
    fn read_required(&mut self, opts: &ReadOptions) -> Result<Edn, EdnError> {
        loop {
            self.skip_ws()?;
            if self.peek()?.is_none() {
                return Err(EdnError::UnexpectedEof(self.pos));
            }
            if let Some(value) = self.read_form(opts)? {
                return Ok(value);
            }
        }
    }

    fn read_seq(&mut self, close: char, opts: &ReadOptions) -> Result<Vec<Edn>, EdnError> {
        let mut items = Vec::new();
        loop {
            self.skip_ws()?;
            match self.peek()? {
                None => return Err(EdnError::UnexpectedEof(self.pos)),
                Some(c) if c == close => {
                    self.next()?;
                    return Ok(items);
                }
                Some(_) => {
                    if let Some(value) = self.read_form(opts)? {
                        items.push(value);
                    }
                }
            }
        }
    }

    fn read_map(&mut self, opts: &ReadOptions) -> Result<EdnMap, EdnError> {
        let items = self.read_seq('}', opts)?;
        if items.len() % 2 != 0 {
            return Err(self.syntax("map literal must contain an even number of forms"));
        }
        let mut map = EdnMap::with_capacity(items.len() / 2);
        let mut iter = items.into_iter();
        while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
            if map.contains_key(&key) {
                return Err(EdnError::DuplicateKey(format!("{key:?}")));
            }
            map.push_unchecked(key, value);
        }
        Ok(map)
    }

    fn read_dispatch(&mut self, opts: &ReadOptions) -> Result<Option<Edn>, EdnError> {
        match self.peek()? {
            None => Err(EdnError::UnexpectedEof(self.pos)),
            Some('{') => {
                self.next()?;
                let items = self.read_seq('}', opts)?;
                for (idx, item) in items.iter().enumerate() {
                    if items[..idx].contains(item) {
                        return Err(EdnError::DuplicateKey(format!("{item:?}")));
                    }
                }
                Ok(Some(Edn::Set(items)))
            }
            Some('_') => {
                self.next()?;
                self.read_required(opts)?;
                Ok(None)
            }
            Some('#') => {
                self.next()?;
                let value = match self.read_token(None)?.as_str() {
                    "Inf" => f64::INFINITY,
                    "-Inf" => f64::NEG_INFINITY,
                    "NaN" => f64::NAN,
                    _ => return Err(self.syntax("unknown symbolic value")),
                };
                Ok(Some(Edn::Float(value)))
            }
            Some(c) if c.is_alphabetic() => {
                let tag = self.read_token(None)?;
                let element = self.read_required(opts)?;
                opts.resolve(&tag, element).map(Some)
            }
            Some(_) => Err(self.syntax("invalid dispatch character")),
        }
    }

    fn read_number(&mut self, first: char) -> Result<Edn, EdnError> {
        let token = self.read_token(Some(first))?;
        parse_number(&token)
    }

    fn read_symbolic(&mut self, first: char) -> Result<Edn, EdnError> {
        let token = self.read_token(Some(first))?;
        Ok(match token.as_str() {
            "nil" => Edn::Nil,
            "true" => Edn::Bool(true),
            "false" => Edn::Bool(false),
            _ => Edn::Symbol(Symbol::new(token)),
        })
    }

    fn read_string(&mut self) -> Result<String, EdnError> {
        let mut out = String::new();
        loop {
            match self.expect_next()? {
                '"' => return Ok(out),
                '\\' => {
                    let escaped = match self.expect_next()? {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        'b' => '\u{8}',
                        'f' => '\u{c}',
                        '"' => '"',
                        '\\' => '\\',
                        'u' => {
                            let mut hex = String::with_capacity(4);
                            for _ in 0..4 {
                                hex.push(self.expect_next()?);
                            }
                            self.unicode_escape(&hex)?
                        }
                        _ => return Err(self.syntax("unsupported escape sequence")),
                    };
                    out.push(escaped);
                }
                c => out.push(c),
            }
        }
    }

    fn read_char_literal(&mut self) -> Result<char, EdnError> {
        let first = self.expect_next()?;
        let token = self.read_token(Some(first))?;
        let mut chars = token.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Ok(c);
        }
        match token.as_str() {
            "newline" => Ok('\n'),
            "space" => Ok(' '),
            "tab" => Ok('\t'),
            "return" => Ok('\r'),
            "backspace" => Ok('\u{8}'),
            "formfeed" => Ok('\u{c}'),
            _ => match token.strip_prefix('u') {
                Some(hex) if hex.len() == 4 => self.unicode_escape(hex),
                _ => Err(self.syntax("unsupported character literal")),
            },
        }
    }

    fn unicode_escape(&self, hex: &str) -> Result<char, EdnError> {
        u32::from_str_radix(hex, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or(self.syntax("invalid unicode escape"))
    }
}

fn is_whitespace(c: char) -> bool {
    c.is_whitespace() || c == ','
}

fn is_terminator(c: char) -> bool {
    is_whitespace(c) || matches!(c, '(' | ')' | '[' | ']' | '{' | '}' | '"' | ';' | '\\')
}

/// Parse an integer or floating point token.
///
/// Arbitrary precision literals (`N` and `M` suffixes) are rejected.
pub fn parse_number(token: &str) -> Result<Edn, EdnError> {
    let invalid = || EdnError::InvalidNumber(token.to_owned());
    if token.ends_with('N') || token.ends_with('M') {
        return Err(invalid());
    }
    if token.contains(['.', 'e', 'E']) {
        return token.parse::<f64>().map(Edn::Float).map_err(|_| invalid());
    }
    token.parse::<i64>().map(Edn::Integer).map_err(|_| invalid())
}

/// Read exactly one form from `text` with the given options.
pub fn read_str(text: &str, opts: &ReadOptions) -> Result<Edn, EdnError> {
    let mut reader = EdnReader::new(text.as_bytes());
    reader
        .read(opts)?
        .ok_or(EdnError::UnexpectedEof(reader.position()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(text: &str) -> Edn {
        read_str(text, &ReadOptions::new()).expect("read")
    }

    #[test]
    fn reads_scalars() {
        assert_eq!(read("nil"), Edn::Nil);
        assert_eq!(read("true"), Edn::Bool(true));
        assert_eq!(read("-42"), Edn::Integer(-42));
        assert_eq!(read("+7"), Edn::Integer(7));
        assert_eq!(read("3.14"), Edn::Float(3.14));
        assert_eq!(read("1e3"), Edn::Float(1000.0));
        assert_eq!(read("\\a"), Edn::Char('a'));
        assert_eq!(read("\\newline"), Edn::Char('\n'));
        assert_eq!(read("\\u0041"), Edn::Char('A'));
        assert_eq!(read(":ns/kw"), Edn::keyword("ns/kw"));
        assert_eq!(read("sym"), Edn::symbol("sym"));
        assert_eq!(read("-"), Edn::symbol("-"));
    }

    #[test]
    fn reads_symbolic_floats() {
        assert_eq!(read("##Inf"), Edn::Float(f64::INFINITY));
        assert_eq!(read("##-Inf"), Edn::Float(f64::NEG_INFINITY));
        assert!(matches!(read("##NaN"), Edn::Float(f) if f.is_nan()));
    }

    #[test]
    fn reads_string_escapes() {
        assert_eq!(
            read(r#""a\"b\\c\né""#),
            Edn::Str("a\"b\\c\né".into())
        );
    }

    #[test]
    fn skips_comments_commas_and_discards() {
        let value = read("[1, ; comment\n #_ 2 3]");
        assert_eq!(value, Edn::Vector(vec![Edn::Integer(1), Edn::Integer(3)]));
        assert_eq!(read("#_ :gone :kept"), Edn::keyword("kept"));
    }

    #[test]
    fn reads_multibyte_utf8() {
        assert_eq!(read("\"žluťoučký 🎉\""), Edn::Str("žluťoučký 🎉".into()));
    }

    #[test]
    fn consecutive_forms_share_lookahead() {
        let opts = ReadOptions::new();
        let mut reader = EdnReader::new("1 2[3]".as_bytes());
        assert_eq!(reader.read(&opts).unwrap(), Some(Edn::Integer(1)));
        assert_eq!(reader.read(&opts).unwrap(), Some(Edn::Integer(2)));
        assert_eq!(
            reader.read(&opts).unwrap(),
            Some(Edn::Vector(vec![Edn::Integer(3)]))
        );
        assert_eq!(reader.read(&opts).unwrap(), None);
        assert_eq!(reader.read(&opts).unwrap(), None);
    }

    #[test]
    fn rejects_malformed_input() {
        let opts = ReadOptions::new();
        assert!(matches!(
            read_str("{:a}", &opts),
            Err(EdnError::Syntax { .. })
        ));
        assert!(matches!(
            read_str("[1 2", &opts),
            Err(EdnError::UnexpectedEof(_))
        ));
        assert!(matches!(
            read_str("{:a 1 :a 2}", &opts),
            Err(EdnError::DuplicateKey(_))
        ));
        assert!(matches!(read_str("12N", &opts), Err(EdnError::InvalidNumber(_))));
        assert!(matches!(read_str(")", &opts), Err(EdnError::Syntax { .. })));
    }

    #[test]
    fn tag_resolution_order() {
        let mut readers = TagTable::new();
        let handler: Arc<dyn TagReader> = Arc::new(|_: &str, element: Edn| -> Result<Edn, BoxError> {
            Ok(Edn::Vector(vec![element]))
        });
        readers.insert("my/tag".to_owned(), handler);
        let mut opts = ReadOptions {
            readers: Arc::new(readers),
            default: None,
        };

        assert_eq!(
            read_str("#my/tag 1", &opts).unwrap(),
            Edn::Vector(vec![Edn::Integer(1)])
        );
        assert!(matches!(
            read_str("#other 1", &opts),
            Err(EdnError::UnknownTag(tag)) if tag == "other"
        ));

        opts.default = Some(Arc::new(|tag: &str, _: Edn| Edn::symbol(tag)));
        assert_eq!(read_str("#other 1", &opts).unwrap(), Edn::symbol("other"));
    }
}

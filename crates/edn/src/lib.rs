//! EDN value model, reader and printer.
//!
//! This crate knows the textual grammar of EDN but nothing about which tags
//! mean what. Tag handling is delegated in both directions:
//!
//! - [`EdnReader`] resolves `#tag element` through a [`ReadOptions`]: an exact
//!   [`TagReader`] match first, then the optional [`DefaultReader`].
//! - [`EdnWriter`] prints [`Object`] and [`View`] values through a
//!   [`PrintDispatch`].
//!
//! # Example
//!
//! ```
//! use edn_pack::{read_str, print_str, NoDispatch, ReadOptions};
//!
//! let value = read_str("{:a [1 2.5 \"x\"]}", &ReadOptions::new()).unwrap();
//! assert_eq!(print_str(&value, &NoDispatch).unwrap(), "{:a [1 2.5 \"x\"]}");
//! ```

mod error;
mod map;
mod object;
mod reader;
mod value;
mod writer;

pub mod json;

pub use error::{BoxError, EdnError};
pub use map::EdnMap;
pub use object::{Object, ObjectValue, View};
pub use reader::{
    parse_number, read_str, DefaultReader, EdnReader, ReadOptions, TagReader, TagTable,
};
pub use value::{Edn, Keyword, Symbol};
pub use writer::{print_str, EdnWriter, NoDispatch, PrintDispatch};

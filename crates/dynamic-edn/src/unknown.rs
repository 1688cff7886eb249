//! Capture of tagged literals nobody registered a reader for.

use edn_pack::Edn;

/// A tagged literal whose tag had no reader: the tag text plus the element
/// exactly as read.
///
/// Unknowns print back as `#tag element`, so a document full of foreign tags
/// survives a read/write cycle unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Unknown {
    tag: String,
    element: Edn,
}

impl Unknown {
    pub fn new(tag: impl Into<String>, element: Edn) -> Self {
        Self {
            tag: tag.into(),
            element,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn element(&self) -> &Edn {
        &self.element
    }

    pub fn into_parts(self) -> (String, Edn) {
        (self.tag, self.element)
    }
}

impl From<Unknown> for Edn {
    fn from(value: Unknown) -> Self {
        Edn::object(value)
    }
}

/// The built-in default reader.
pub(crate) fn read_unknown(tag: &str, element: Edn) -> Edn {
    log::trace!("capturing unknown tag #{tag}");
    Edn::object(Unknown::new(tag, element))
}

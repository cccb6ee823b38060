//! String values and keys: owned copies in the pool, or linked `'static` text.

use jsonpool_core::{PoolError, StringId};

use crate::slot::Resources;

/// A string as stored in a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StringRef {
    /// Bytes copied into the pool's string region.
    Owned(StringId),
    /// Caller memory referenced without copying. Costs no pool bytes.
    Linked(&'static str),
}

impl StringRef {
    /// Resolve to text. A dangling owned handle reads as `""`.
    pub fn resolve(self, pool: &Resources) -> &str {
        match self {
            Self::Owned(id) => pool.string(id).unwrap_or_default(),
            Self::Linked(text) => text,
        }
    }

    /// Whether the text lives outside the pool.
    pub fn is_linked(self) -> bool {
        matches!(self, Self::Linked(_))
    }

    /// Pool bytes consumed by this string.
    pub fn owned_len(self) -> usize {
        match self {
            Self::Owned(id) => id.len() as usize,
            Self::Linked(_) => 0,
        }
    }
}

/// A string argument on its way into a document.
///
/// Anything that converts from `&str` or `&String` is copied into the pool.
/// [`JsonString::linked`] opts out of the copy for text with a `'static`
/// lifetime; the document then stores only a reference.
///
/// ```
/// use jsonpool_tree::JsonString;
///
/// let copied: JsonString<'_> = "temperature".into();
/// let linked = JsonString::linked("temperature");
/// assert!(!copied.is_linked());
/// assert!(linked.is_linked());
/// assert_eq!(copied.as_str(), linked.as_str());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JsonString<'s> {
    /// Copy the text into the pool.
    Copied(&'s str),
    /// Store a reference to the text.
    Linked(&'static str),
}

impl<'s> JsonString<'s> {
    /// Text to be copied into the pool.
    pub fn copied(text: &'s str) -> Self {
        Self::Copied(text)
    }

    /// Text to be referenced without copying.
    pub fn linked(text: &'static str) -> Self {
        Self::Linked(text)
    }

    /// The text itself.
    pub fn as_str(&self) -> &'s str {
        match *self {
            Self::Copied(text) => text,
            Self::Linked(text) => text,
        }
    }

    /// Whether storing this string skips the copy.
    pub fn is_linked(&self) -> bool {
        matches!(self, Self::Linked(_))
    }

    /// Store the string, copying it into `pool` unless linked.
    pub(crate) fn store(self, pool: &mut Resources) -> Result<StringRef, PoolError> {
        match self {
            Self::Copied(text) => pool.allocate_string(text).map(StringRef::Owned),
            Self::Linked(text) => Ok(StringRef::Linked(text)),
        }
    }
}

impl<'s> From<&'s str> for JsonString<'s> {
    fn from(text: &'s str) -> Self {
        Self::Copied(text)
    }
}

impl<'s> From<&'s String> for JsonString<'s> {
    fn from(text: &'s String) -> Self {
        Self::Copied(text.as_str())
    }
}

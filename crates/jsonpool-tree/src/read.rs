//! Read-only views of a tree.
//!
//! [`VariantRef`] borrows one node and the pool it lives in. Lookups that
//! miss return an *unbound* view rather than an error; an unbound view reads
//! as null and every further lookup on it is unbound too, so chains like
//! `doc.get("a").get("b").at(3)` never fail.

use std::fmt;

use jsonpool_arena::SLOT_SIZE;
use jsonpool_core::VariantKind;
use smallvec::{smallvec, SmallVec};

use crate::convert::FromVariant;
use crate::slot::{Chain, Resources, Slot, VariantData};
use crate::string::{JsonString, StringRef};
use crate::visit::Visitor;

/// A read-only view of one node.
///
/// `Copy`, and borrows the pool for `'a`: the view cannot outlive the
/// document, and the document cannot be mutated while a view exists.
#[derive(Clone, Copy)]
pub struct VariantRef<'a> {
    data: Option<&'a VariantData>,
    pool: &'a Resources,
}

impl<'a> VariantRef<'a> {
    pub(crate) fn new(data: Option<&'a VariantData>, pool: &'a Resources) -> Self {
        Self { data, pool }
    }

    /// View the value held by `slot`, typically a document root.
    pub fn of(slot: &'a Slot, pool: &'a Resources) -> Self {
        Self::new(Some(slot.data()), pool)
    }

    /// The not-found view.
    pub fn unbound(pool: &'a Resources) -> Self {
        Self { data: None, pool }
    }

    /// The raw value, or `None` for an unbound view.
    pub fn data(&self) -> Option<&'a VariantData> {
        self.data
    }

    /// The kind of value, or `None` for an unbound view.
    pub fn kind(&self) -> Option<VariantKind> {
        self.data.map(VariantData::kind)
    }

    /// Whether a lookup failed to find this node.
    pub fn is_unbound(&self) -> bool {
        self.data.is_none()
    }

    /// Whether the node is null or unbound.
    pub fn is_null(&self) -> bool {
        matches!(self.data, None | Some(VariantData::Null))
    }

    /// The string value, if this is a string.
    pub fn as_str(&self) -> Option<&'a str> {
        match self.data? {
            VariantData::String(s) => Some(s.resolve(self.pool)),
            _ => None,
        }
    }

    /// Convert to `T`, falling back to `T`'s documented default.
    pub fn as_<T: FromVariant<'a>>(self) -> T {
        T::from_variant(self)
    }

    /// Whether the value is representable as `T` without loss.
    pub fn is<T: FromVariant<'a>>(self) -> bool {
        T::is_variant(self)
    }

    fn chain(&self) -> Chain<'a> {
        let head = self.data.and_then(|d| d.collection()).and_then(|c| c.head);
        Chain::new(self.pool, head)
    }

    /// Elements of an array. Empty for any other kind.
    pub fn elements(&self) -> Elements<'a> {
        let chain = match self.data {
            Some(VariantData::Array(_)) => self.chain(),
            _ => Chain::new(self.pool, None),
        };
        Elements {
            chain,
            pool: self.pool,
        }
    }

    /// Members of an object in insertion order. Empty for any other kind.
    pub fn members(&self) -> Members<'a> {
        let chain = match self.data {
            Some(VariantData::Object(_)) => self.chain(),
            _ => Chain::new(self.pool, None),
        };
        Members {
            chain,
            pool: self.pool,
        }
    }

    /// Members with their keys as stored, so a copy can keep linked keys
    /// linked.
    pub(crate) fn stored_members(&self) -> impl Iterator<Item = (JsonString<'a>, VariantRef<'a>)> {
        let pool = self.pool;
        self.members().chain.map(move |(_, slot)| {
            let key = match slot.key {
                Some(StringRef::Linked(text)) => JsonString::Linked(text),
                Some(owned) => JsonString::Copied(owned.resolve(pool)),
                None => JsonString::Copied(""),
            };
            (key, VariantRef::new(Some(&slot.data), pool))
        })
    }

    /// The member named `key`, or an unbound view.
    pub fn get(&self, key: &str) -> VariantRef<'a> {
        let data = self
            .members()
            .chain
            .find(|(_, slot)| slot.key.is_some_and(|k| k.resolve(self.pool) == key))
            .map(|(_, slot)| &slot.data);
        Self::new(data, self.pool)
    }

    /// The element at `index`, or an unbound view.
    pub fn at(&self, index: usize) -> VariantRef<'a> {
        self.elements().nth(index).unwrap_or(Self::unbound(self.pool))
    }

    /// Whether this object has a member named `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        !self.get(key).is_unbound()
    }

    /// Number of elements or members; zero for scalars. Walks the chain.
    pub fn size(&self) -> usize {
        self.chain().count()
    }

    /// Depth of the deepest nesting below this node.
    ///
    /// Scalars are 0, a container is one more than its deepest child
    /// (so an empty container is 1). Walks with an explicit stack, so depth
    /// is bounded by memory, not by the call stack.
    pub fn nesting(&self) -> usize {
        let mut deepest = 0;
        let mut pending: SmallVec<[(VariantRef<'a>, usize); 16]> = smallvec![(*self, 0)];
        while let Some((value, depth)) = pending.pop() {
            if !value.is_container() {
                continue;
            }
            deepest = deepest.max(depth + 1);
            pending.extend(
                value
                    .chain()
                    .map(|(_, slot)| (Self::new(Some(&slot.data), value.pool), depth + 1)),
            );
        }
        deepest
    }

    fn is_container(&self) -> bool {
        matches!(
            self.data,
            Some(VariantData::Array(_)) | Some(VariantData::Object(_))
        )
    }

    /// Pool bytes needed to hold a copy of this subtree.
    ///
    /// Counts `SLOT_SIZE` for every descendant slot plus every owned string
    /// (values and keys). The node's own slot is not counted.
    pub fn memory_usage(&self) -> usize {
        let mut total = 0;
        let mut pending: SmallVec<[VariantRef<'a>; 16]> = smallvec![*self];
        while let Some(value) = pending.pop() {
            match value.data {
                Some(VariantData::String(s)) => total += s.owned_len(),
                Some(VariantData::Array(_)) | Some(VariantData::Object(_)) => {
                    for (_, slot) in value.chain() {
                        total += SLOT_SIZE + slot.key.map_or(0, StringRef::owned_len);
                        pending.push(Self::new(Some(&slot.data), value.pool));
                    }
                }
                _ => {}
            }
        }
        total
    }

    /// Walk this subtree depth-first, reporting every value to `visitor`.
    ///
    /// An unbound view is reported as null. Open containers are kept on an
    /// explicit stack, so arbitrarily deep trees are safe to walk.
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        let mut open: SmallVec<[Frame<'a>; 16]> = SmallVec::new();
        open.extend(self.enter(visitor));
        while let Some(frame) = open.last_mut() {
            let next = match frame {
                Frame::Array(elements) => elements.next(),
                Frame::Object(members) => members.next().map(|(key, value)| {
                    visitor.visit_key(key);
                    value
                }),
            };
            match next {
                Some(value) => open.extend(value.enter(visitor)),
                None => match open.pop() {
                    Some(Frame::Array(_)) => visitor.end_array(),
                    Some(Frame::Object(_)) => visitor.end_object(),
                    None => {}
                },
            }
        }
    }

    /// Report a scalar, or open a container and return its frame.
    fn enter<V: Visitor + ?Sized>(&self, visitor: &mut V) -> Option<Frame<'a>> {
        let Some(data) = self.data else {
            visitor.visit_null();
            return None;
        };
        match *data {
            VariantData::Null => visitor.visit_null(),
            VariantData::Bool(b) => visitor.visit_bool(b),
            VariantData::Signed(i) => visitor.visit_signed(i),
            VariantData::Unsigned(u) => visitor.visit_unsigned(u),
            VariantData::Float(f) => visitor.visit_float(f),
            VariantData::String(s) => visitor.visit_str(s.resolve(self.pool)),
            VariantData::Array(_) => {
                visitor.begin_array(self.size());
                return Some(Frame::Array(self.elements()));
            }
            VariantData::Object(_) => {
                visitor.begin_object(self.size());
                return Some(Frame::Object(self.members()));
            }
        }
        None
    }
}

/// A container being walked by [`VariantRef::accept`].
enum Frame<'a> {
    Array(Elements<'a>),
    Object(Members<'a>),
}

/// Renders `{"a": [1, [2]], "s": "text"}`, the same shape as the std debug
/// builders, but without recursing.
impl fmt::Debug for VariantRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unbound() {
            return f.write_str("<unbound>");
        }
        let mut writer = DebugWriter {
            f,
            result: Ok(()),
            first: SmallVec::new(),
        };
        self.accept(&mut writer);
        writer.result
    }
}

struct DebugWriter<'f, 'g> {
    f: &'f mut fmt::Formatter<'g>,
    result: fmt::Result,
    /// One entry per open container: whether the next value is its first.
    first: SmallVec<[bool; 16]>,
}

impl DebugWriter<'_, '_> {
    fn write(&mut self, args: fmt::Arguments<'_>) {
        if self.result.is_ok() {
            self.result = self.f.write_fmt(args);
        }
    }

    fn separate(&mut self) {
        let needs_comma = match self.first.last_mut() {
            Some(first) => !std::mem::replace(first, false),
            None => false,
        };
        if needs_comma {
            self.write(format_args!(", "));
        }
    }
}

impl Visitor for DebugWriter<'_, '_> {
    fn visit_null(&mut self) {
        self.separate();
        self.write(format_args!("null"));
    }

    fn visit_bool(&mut self, value: bool) {
        self.separate();
        self.write(format_args!("{value:?}"));
    }

    fn visit_signed(&mut self, value: i64) {
        self.separate();
        self.write(format_args!("{value:?}"));
    }

    fn visit_unsigned(&mut self, value: u64) {
        self.separate();
        self.write(format_args!("{value:?}"));
    }

    fn visit_float(&mut self, value: f64) {
        self.separate();
        self.write(format_args!("{value:?}"));
    }

    fn visit_str(&mut self, value: &str) {
        self.separate();
        self.write(format_args!("{value:?}"));
    }

    fn begin_array(&mut self, _len: usize) {
        self.separate();
        self.write(format_args!("["));
        self.first.push(true);
    }

    fn end_array(&mut self) {
        self.first.pop();
        self.write(format_args!("]"));
    }

    fn begin_object(&mut self, _len: usize) {
        self.separate();
        self.write(format_args!("{{"));
        self.first.push(true);
    }

    fn visit_key(&mut self, key: &str) {
        self.separate();
        self.write(format_args!("{key:?}: "));
        // The member's value follows the key without a separator.
        if let Some(first) = self.first.last_mut() {
            *first = true;
        }
    }

    fn end_object(&mut self) {
        self.first.pop();
        self.write(format_args!("}}"));
    }
}

/// Iterator over array elements.
pub struct Elements<'a> {
    chain: Chain<'a>,
    pool: &'a Resources,
}

impl<'a> Iterator for Elements<'a> {
    type Item = VariantRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (_, slot) = self.chain.next()?;
        Some(VariantRef::new(Some(&slot.data), self.pool))
    }
}

/// Iterator over object members as `(key, value)`.
pub struct Members<'a> {
    chain: Chain<'a>,
    pool: &'a Resources,
}

impl<'a> Iterator for Members<'a> {
    type Item = (&'a str, VariantRef<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let (_, slot) = self.chain.next()?;
        let key = slot.key.map_or("", |k| k.resolve(self.pool));
        Some((key, VariantRef::new(Some(&slot.data), self.pool)))
    }
}

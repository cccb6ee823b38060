//! Depth-first traversal interface for consumers such as serializers.

/// Receives the values of a subtree in document order.
///
/// Driven by [`VariantRef::accept`](crate::VariantRef::accept). Containers
/// are bracketed by `begin_*`/`end_*` calls; inside an object every value is
/// preceded by [`Visitor::visit_key`].
pub trait Visitor {
    /// A null (or unbound) value.
    fn visit_null(&mut self);
    /// A boolean.
    fn visit_bool(&mut self, value: bool);
    /// A signed integer.
    fn visit_signed(&mut self, value: i64);
    /// An unsigned integer.
    fn visit_unsigned(&mut self, value: u64);
    /// A float.
    fn visit_float(&mut self, value: f64);
    /// A string.
    fn visit_str(&mut self, value: &str);
    /// Start of an array of `len` elements.
    fn begin_array(&mut self, len: usize);
    /// End of the current array.
    fn end_array(&mut self);
    /// Start of an object of `len` members.
    fn begin_object(&mut self, len: usize);
    /// Key of the next member.
    fn visit_key(&mut self, key: &str);
    /// End of the current object.
    fn end_object(&mut self);
}

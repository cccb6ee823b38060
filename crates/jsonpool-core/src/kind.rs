//! The closed set of variant kinds a node can hold.

use std::fmt;

/// Discriminant of a variant node.
///
/// Integers keep their signedness so that round-tripping a `u64` above
/// `i64::MAX` (or a negative `i64`) is lossless.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VariantKind {
    /// JSON `null`, also the state of a freshly allocated node.
    Null,
    /// JSON `true` / `false`.
    Bool,
    /// A signed integer.
    SignedInteger,
    /// An unsigned integer.
    UnsignedInteger,
    /// A double-precision float.
    Float,
    /// A string, owned by the pool or linked to caller memory.
    String,
    /// An ordered list of elements.
    Array,
    /// An insertion-ordered list of key/value members.
    Object,
}

impl VariantKind {
    /// Arrays and objects.
    pub fn is_container(self) -> bool {
        matches!(self, Self::Array | Self::Object)
    }

    /// Integers of either signedness and floats.
    pub fn is_number(self) -> bool {
        matches!(
            self,
            Self::SignedInteger | Self::UnsignedInteger | Self::Float
        )
    }

    /// Integers of either signedness.
    pub fn is_integer(self) -> bool {
        matches!(self, Self::SignedInteger | Self::UnsignedInteger)
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::SignedInteger => "signed integer",
            Self::UnsignedInteger => "unsigned integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        };
        f.write_str(name)
    }
}

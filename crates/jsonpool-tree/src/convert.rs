//! Conversions between Rust values and variants.
//!
//! Reading ([`FromVariant`]) is best effort: a value that cannot be
//! represented as the target type yields that type's default (`0`, `0.0`,
//! `false`, `""`, `None`). Writing ([`IntoVariant`]) stores the value in a
//! node, copying strings into the pool.
//!
//! | target | converts from | `is::<T>()` |
//! |--------|---------------|-------------|
//! | integers | integers in range, floats in range (truncated), `bool` as 0/1, numeric strings | integer in range |
//! | floats | any number, `bool` as 0/1, numeric strings | any number |
//! | `bool` | `bool`; numbers (non-zero); strings and containers are `true` | `bool` only |
//! | `&str`, `String`, `Option<&str>` | strings | strings |

use crate::read::VariantRef;
use crate::slot::VariantData;
use crate::string::JsonString;
use crate::tree::{NodeId, Tree};

/// Types a variant can be read as.
pub trait FromVariant<'a>: Sized {
    /// Convert, falling back to the type's default.
    fn from_variant(variant: VariantRef<'a>) -> Self;

    /// Whether the variant holds a value of this type.
    fn is_variant(variant: VariantRef<'a>) -> bool;
}

/// Types that can be stored in a variant.
pub trait IntoVariant {
    /// Store `self` in `node`. Returns `false` if the pool could not hold it.
    fn write_into(self, tree: &mut Tree<'_>, node: NodeId) -> bool;
}

fn float_to_int<T>(value: f64, min: f64, max: f64, cast: impl FnOnce(f64) -> T) -> Option<T> {
    (value.is_finite() && value >= min && value <= max).then(|| cast(value.trunc()))
}

macro_rules! integer_conversions {
    ($($t:ty),* $(,)?) => {$(
        impl<'a> FromVariant<'a> for $t {
            fn from_variant(variant: VariantRef<'a>) -> Self {
                match variant.data() {
                    Some(&VariantData::Signed(i)) => <$t>::try_from(i).unwrap_or_default(),
                    Some(&VariantData::Unsigned(u)) => <$t>::try_from(u).unwrap_or_default(),
                    Some(&VariantData::Float(f)) => {
                        float_to_int(f, <$t>::MIN as f64, <$t>::MAX as f64, |v| v as $t)
                            .unwrap_or_default()
                    }
                    Some(&VariantData::Bool(b)) => <$t>::from(b),
                    Some(VariantData::String(_)) => {
                        let text = variant.as_str().unwrap_or_default().trim();
                        text.parse::<$t>().ok().or_else(|| {
                            let f = text.parse::<f64>().ok()?;
                            float_to_int(f, <$t>::MIN as f64, <$t>::MAX as f64, |v| v as $t)
                        })
                        .unwrap_or_default()
                    }
                    _ => 0,
                }
            }

            fn is_variant(variant: VariantRef<'a>) -> bool {
                match variant.data() {
                    Some(&VariantData::Signed(i)) => <$t>::try_from(i).is_ok(),
                    Some(&VariantData::Unsigned(u)) => <$t>::try_from(u).is_ok(),
                    _ => false,
                }
            }
        }
    )*};
}

integer_conversions!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! float_conversions {
    ($($t:ty),* $(,)?) => {$(
        impl<'a> FromVariant<'a> for $t {
            fn from_variant(variant: VariantRef<'a>) -> Self {
                match variant.data() {
                    Some(&VariantData::Signed(i)) => i as $t,
                    Some(&VariantData::Unsigned(u)) => u as $t,
                    Some(&VariantData::Float(f)) => f as $t,
                    Some(&VariantData::Bool(b)) => u8::from(b) as $t,
                    Some(VariantData::String(_)) => variant
                        .as_str()
                        .unwrap_or_default()
                        .trim()
                        .parse::<$t>()
                        .unwrap_or_default(),
                    _ => 0.0,
                }
            }

            fn is_variant(variant: VariantRef<'a>) -> bool {
                variant.kind().is_some_and(|k| k.is_number())
            }
        }
    )*};
}

float_conversions!(f32, f64);

impl<'a> FromVariant<'a> for bool {
    fn from_variant(variant: VariantRef<'a>) -> Self {
        match variant.data() {
            Some(&VariantData::Bool(b)) => b,
            Some(&VariantData::Signed(i)) => i != 0,
            Some(&VariantData::Unsigned(u)) => u != 0,
            Some(&VariantData::Float(f)) => f != 0.0,
            Some(VariantData::String(_) | VariantData::Array(_) | VariantData::Object(_)) => true,
            Some(VariantData::Null) | None => false,
        }
    }

    fn is_variant(variant: VariantRef<'a>) -> bool {
        matches!(variant.data(), Some(VariantData::Bool(_)))
    }
}

impl<'a> FromVariant<'a> for &'a str {
    fn from_variant(variant: VariantRef<'a>) -> Self {
        variant.as_str().unwrap_or_default()
    }

    fn is_variant(variant: VariantRef<'a>) -> bool {
        variant.as_str().is_some()
    }
}

impl<'a> FromVariant<'a> for Option<&'a str> {
    fn from_variant(variant: VariantRef<'a>) -> Self {
        variant.as_str()
    }

    fn is_variant(variant: VariantRef<'a>) -> bool {
        variant.as_str().is_some()
    }
}

impl<'a> FromVariant<'a> for String {
    fn from_variant(variant: VariantRef<'a>) -> Self {
        variant.as_str().unwrap_or_default().to_owned()
    }

    fn is_variant(variant: VariantRef<'a>) -> bool {
        variant.as_str().is_some()
    }
}

impl<'a> FromVariant<'a> for VariantRef<'a> {
    fn from_variant(variant: VariantRef<'a>) -> Self {
        variant
    }

    fn is_variant(variant: VariantRef<'a>) -> bool {
        !variant.is_unbound()
    }
}

impl IntoVariant for bool {
    fn write_into(self, tree: &mut Tree<'_>, node: NodeId) -> bool {
        tree.set_bool(node, self)
    }
}

macro_rules! into_signed {
    ($($t:ty),*) => {$(
        impl IntoVariant for $t {
            fn write_into(self, tree: &mut Tree<'_>, node: NodeId) -> bool {
                tree.set_signed(node, self as i64)
            }
        }
    )*};
}

macro_rules! into_unsigned {
    ($($t:ty),*) => {$(
        impl IntoVariant for $t {
            fn write_into(self, tree: &mut Tree<'_>, node: NodeId) -> bool {
                tree.set_unsigned(node, self as u64)
            }
        }
    )*};
}

into_signed!(i8, i16, i32, i64, isize);
into_unsigned!(u8, u16, u32, u64, usize);

impl IntoVariant for f32 {
    fn write_into(self, tree: &mut Tree<'_>, node: NodeId) -> bool {
        tree.set_float(node, f64::from(self))
    }
}

impl IntoVariant for f64 {
    fn write_into(self, tree: &mut Tree<'_>, node: NodeId) -> bool {
        tree.set_float(node, self)
    }
}

impl IntoVariant for JsonString<'_> {
    fn write_into(self, tree: &mut Tree<'_>, node: NodeId) -> bool {
        tree.set_string(node, self)
    }
}

impl IntoVariant for &str {
    fn write_into(self, tree: &mut Tree<'_>, node: NodeId) -> bool {
        tree.set_string(node, JsonString::Copied(self))
    }
}

impl IntoVariant for &String {
    fn write_into(self, tree: &mut Tree<'_>, node: NodeId) -> bool {
        tree.set_string(node, JsonString::Copied(self))
    }
}

impl IntoVariant for String {
    fn write_into(self, tree: &mut Tree<'_>, node: NodeId) -> bool {
        tree.set_string(node, JsonString::Copied(&self))
    }
}

impl IntoVariant for VariantRef<'_> {
    fn write_into(self, tree: &mut Tree<'_>, node: NodeId) -> bool {
        tree.copy_from(node, self)
    }
}

impl<T: IntoVariant> IntoVariant for Option<T> {
    fn write_into(self, tree: &mut Tree<'_>, node: NodeId) -> bool {
        match self {
            Some(value) => value.write_into(tree, node),
            None => tree.set_null(node),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::{Resources, Slot};
    use jsonpool_arena::DefaultAllocator;

    fn with_root<R>(value: impl IntoVariant, check: impl FnOnce(VariantRef<'_>) -> R) -> R {
        let mut root = Slot::default();
        let mut pool = Resources::new(64, DefaultAllocator::instance());
        let mut tree = Tree::new(&mut root, &mut pool);
        assert!(value.write_into(&mut tree, NodeId::Root));
        check(VariantRef::new(Some(root.data()), &pool))
    }

    #[test]
    fn integers_convert_only_in_range() {
        with_root(300, |v| {
            assert_eq!(v.as_::<i32>(), 300);
            assert_eq!(v.as_::<u8>(), 0);
            assert!(v.is::<i16>());
            assert!(!v.is::<i8>());
        });
        with_root(-1i64, |v| {
            assert_eq!(v.as_::<u32>(), 0);
            assert!(!v.is::<u64>());
            assert_eq!(v.as_::<i8>(), -1);
        });
        with_root(u64::MAX, |v| {
            assert_eq!(v.as_::<u64>(), u64::MAX);
            assert_eq!(v.as_::<i64>(), 0);
        });
    }

    #[test]
    fn floats_truncate_into_integers() {
        with_root(3.9, |v| {
            assert_eq!(v.as_::<i32>(), 3);
            assert!(!v.is::<i32>());
            assert!(v.is::<f64>());
        });
        with_root(-2.5f32, |v| assert_eq!(v.as_::<i64>(), -2));
        with_root(1e20, |v| assert_eq!(v.as_::<i32>(), 0));
        with_root(f64::NAN, |v| assert_eq!(v.as_::<u16>(), 0));
    }

    #[test]
    fn integers_widen_to_floats() {
        with_root(7u8, |v| {
            assert_eq!(v.as_::<f64>(), 7.0);
            assert!(v.is::<f32>());
        });
    }

    #[test]
    fn numeric_strings_parse() {
        with_root("42", |v| {
            assert_eq!(v.as_::<i32>(), 42);
            assert!(!v.is::<i32>());
        });
        with_root(" 2.75 ", |v| {
            assert_eq!(v.as_::<f64>(), 2.75);
            assert_eq!(v.as_::<u8>(), 2);
        });
        with_root("abc", |v| assert_eq!(v.as_::<i32>(), 0));
    }

    #[test]
    fn bool_conversions() {
        with_root(true, |v| {
            assert_eq!(v.as_::<i32>(), 1);
            assert_eq!(v.as_::<f32>(), 1.0);
            assert!(v.is::<bool>());
            assert!(!v.is::<i32>());
        });
        with_root(0, |v| assert!(!v.as_::<bool>()));
        with_root(-3, |v| assert!(v.as_::<bool>()));
        with_root("", |v| {
            assert!(v.as_::<bool>());
            assert!(!v.is::<bool>());
        });
    }

    #[test]
    fn strings_read_back() {
        with_root(String::from("owned"), |v| {
            assert_eq!(v.as_::<&str>(), "owned");
            assert_eq!(v.as_::<String>(), "owned");
            assert_eq!(v.as_::<Option<&str>>(), Some("owned"));
            assert!(v.is::<&str>());
        });
        with_root(12, |v| {
            assert_eq!(v.as_::<&str>(), "");
            assert_eq!(v.as_::<Option<&str>>(), None);
            assert!(!v.is::<String>());
        });
    }

    #[test]
    fn none_writes_null() {
        with_root(None::<i32>, |v| {
            assert!(v.is_null());
            assert!(!v.is_unbound());
            assert!(v.is::<VariantRef<'_>>());
        });
    }

    #[test]
    fn null_defaults() {
        with_root(None::<&str>, |v| {
            assert_eq!(v.as_::<i32>(), 0);
            assert_eq!(v.as_::<f64>(), 0.0);
            assert!(!v.as_::<bool>());
            assert_eq!(v.as_::<&str>(), "");
        });
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn i64_reads_back_exactly(x in any::<i64>()) {
                with_root(x, |v| {
                    prop_assert_eq!(v.as_::<i64>(), x);
                    prop_assert_eq!(v.is::<i32>(), i32::try_from(x).is_ok());
                    Ok(())
                })?;
            }

            #[test]
            fn u64_reads_back_exactly(x in any::<u64>()) {
                with_root(x, |v| {
                    prop_assert_eq!(v.as_::<u64>(), x);
                    prop_assert_eq!(v.as_::<i64>(), i64::try_from(x).unwrap_or(0));
                    Ok(())
                })?;
            }
        }
    }
}

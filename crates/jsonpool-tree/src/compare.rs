//! Structural equality.
//!
//! Numbers compare by value across representations (`1 == 1u64 == 1.0`).
//! Arrays compare element-wise in order. Objects compare as key sets with
//! equal values per key; insertion order does not matter. Null and unbound
//! views are equal to each other.

use indexmap::IndexMap;
use smallvec::{smallvec, SmallVec};

use crate::read::VariantRef;
use crate::slot::VariantData;

fn numbers_equal(a: &VariantData, b: &VariantData) -> Option<bool> {
    use VariantData::{Float, Signed, Unsigned};
    Some(match (*a, *b) {
        (Signed(x), Signed(y)) => x == y,
        (Unsigned(x), Unsigned(y)) => x == y,
        (Signed(x), Unsigned(y)) | (Unsigned(y), Signed(x)) => {
            u64::try_from(x).is_ok_and(|x| x == y)
        }
        (Float(x), Float(y)) => x == y,
        (Float(f), Signed(i)) | (Signed(i), Float(f)) => f == i as f64,
        (Float(f), Unsigned(u)) | (Unsigned(u), Float(f)) => f == u as f64,
        _ => return None,
    })
}

fn structurally_equal<'x, 'y>(left: VariantRef<'x>, right: VariantRef<'y>) -> bool {
    let mut pending: SmallVec<[(VariantRef<'x>, VariantRef<'y>); 16]> =
        smallvec![(left, right)];
    while let Some((a, b)) = pending.pop() {
        if a.is_null() || b.is_null() {
            if a.is_null() && b.is_null() {
                continue;
            }
            return false;
        }
        let (Some(x), Some(y)) = (a.data(), b.data()) else {
            return false;
        };
        let equal = match numbers_equal(x, y) {
            Some(eq) => eq,
            None => match (x, y) {
                (VariantData::Bool(p), VariantData::Bool(q)) => p == q,
                (VariantData::String(_), VariantData::String(_)) => a.as_str() == b.as_str(),
                (VariantData::Array(_), VariantData::Array(_)) => {
                    let same_len = a.size() == b.size();
                    if same_len {
                        pending.extend(a.elements().zip(b.elements()));
                    }
                    same_len
                }
                (VariantData::Object(_), VariantData::Object(_)) => {
                    let theirs: IndexMap<&str, VariantRef<'y>> = b.members().collect();
                    let mut count = 0;
                    let mut all_present = true;
                    for (key, value) in a.members() {
                        count += 1;
                        match theirs.get(key) {
                            Some(other) => pending.push((value, *other)),
                            None => {
                                all_present = false;
                                break;
                            }
                        }
                    }
                    all_present && count == theirs.len()
                }
                _ => false,
            },
        };
        if !equal {
            return false;
        }
    }
    true
}

impl<'b> PartialEq<VariantRef<'b>> for VariantRef<'_> {
    fn eq(&self, other: &VariantRef<'b>) -> bool {
        structurally_equal(*self, *other)
    }
}

macro_rules! scalar_eq {
    ($variant:ident as $wide:ty: $($t:ty),*) => {$(
        impl PartialEq<$t> for VariantRef<'_> {
            fn eq(&self, other: &$t) -> bool {
                self.data().is_some_and(|data| {
                    numbers_equal(data, &VariantData::$variant(*other as $wide)).unwrap_or(false)
                })
            }
        }
    )*};
}

scalar_eq!(Signed as i64: i8, i16, i32, i64, isize);
scalar_eq!(Unsigned as u64: u8, u16, u32, u64, usize);
scalar_eq!(Float as f64: f32, f64);

impl PartialEq<bool> for VariantRef<'_> {
    fn eq(&self, other: &bool) -> bool {
        matches!(self.data(), Some(VariantData::Bool(b)) if b == other)
    }
}

impl PartialEq<str> for VariantRef<'_> {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for VariantRef<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

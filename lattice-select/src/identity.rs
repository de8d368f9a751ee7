//! Identity Equality
//!
//! Change detection compares selector outputs by identity, never by
//! structure. Primitives compare by value; shared pointers compare by the
//! allocation they point at. Two `Arc`s holding equal contents are still
//! different values as far as a subscription is concerned.
//!
//! Selections are cached inside listeners that must be `Send`, so only
//! `Arc` is covered among the shared pointers.
//!
//! Floats use same-value semantics: `NaN` is identical to `NaN`, and `0.0`
//! is not identical to `-0.0`. This keeps a selector returning `NaN` from
//! firing on every notification.

use std::sync::Arc;

/// Identity comparison used to decide whether a selected value changed.
pub trait Identical {
    /// Returns `true` if `self` and `other` are the same value.
    fn identical(&self, other: &Self) -> bool;
}

macro_rules! identical_by_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Identical for $ty {
                #[inline]
                fn identical(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

identical_by_value!(
    (), bool, char,
    u8, u16, u32, u64, u128, usize,
    i8, i16, i32, i64, i128, isize,
    String, &'static str,
);

macro_rules! identical_float {
    ($($ty:ty),*) => {
        $(
            impl Identical for $ty {
                #[inline]
                fn identical(&self, other: &Self) -> bool {
                    if self.is_nan() && other.is_nan() {
                        return true;
                    }
                    self.to_bits() == other.to_bits()
                }
            }
        )*
    };
}

identical_float!(f32, f64);

impl<T: ?Sized> Identical for Arc<T> {
    #[inline]
    fn identical(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl<T: Identical> Identical for Option<T> {
    fn identical(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.identical(b),
            (None, None) => true,
            _ => false,
        }
    }
}

macro_rules! identical_tuple {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: Identical),+> Identical for ($($name,)+) {
            fn identical(&self, other: &Self) -> bool {
                $(self.$idx.identical(&other.$idx))&&+
            }
        }
    };
}

identical_tuple!(A: 0);
identical_tuple!(A: 0, B: 1);
identical_tuple!(A: 0, B: 1, C: 2);
identical_tuple!(A: 0, B: 1, C: 2, D: 3);

//! Change detection for selected values.
//!
//! A subscription re-renders only when the selected value "changed". What
//! counts as a change is decided by a [`Comparator`]:
//!
//! - [`Comparator::Identity`]: the value is the same value. Scalars compare
//!   by value, `Arc`s by pointer, and a freshly built composite (a `Vec`,
//!   a tuple, a record) is never the same as another one.
//! - [`Comparator::Shallow`]: one level deep. Two composites are equal when
//!   every element or field is the same under identity.
//!
//! Selectors returning a new record on every call should use `Shallow`,
//! otherwise every write to the slice re-renders the subscriber.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::sync::Arc;

/// Comparison used to decide whether a selected value changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Comparator {
    #[default]
    Identity,
    Shallow,
}

impl Comparator {
    /// Whether `a` and `b` count as equal, i.e. no re-render is needed.
    pub fn equal<T: Selection + ?Sized>(self, a: &T, b: &T) -> bool {
        match self {
            Comparator::Identity => a.same(b),
            Comparator::Shallow => a.shallow_eq(b),
        }
    }
}

/// `true` selects shallow comparison, `false` identity.
impl From<bool> for Comparator {
    fn from(shallow_equal: bool) -> Self {
        if shallow_equal {
            Comparator::Shallow
        } else {
            Comparator::Identity
        }
    }
}

/// A value that can be produced by a selector.
pub trait Selection: Send + Sync + 'static {
    /// Identity comparison.
    fn same(&self, other: &Self) -> bool;

    /// One-level comparison. Defaults to identity for leaf values.
    fn shallow_eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

macro_rules! scalar_selection {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Selection for $ty {
                fn same(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

scalar_selection!(
    (),
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    String,
    &'static str,
);

// Bitwise so that NaN equals itself and 0.0 differs from -0.0.
impl Selection for f32 {
    fn same(&self, other: &Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}

impl Selection for f64 {
    fn same(&self, other: &Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}

// Shared values are compared by pointer under both comparators. To compare
// a record shallowly, select the record rather than its `Arc`.
impl<T: Send + Sync + ?Sized + 'static> Selection for Arc<T> {
    fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl<T: Selection> Selection for Option<T> {
    fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.same(b),
            (None, None) => true,
            _ => false,
        }
    }

    fn shallow_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.shallow_eq(b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: Selection> Selection for Vec<T> {
    fn same(&self, _other: &Self) -> bool {
        false
    }

    fn shallow_eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.same(b))
    }
}

impl<K, V> Selection for BTreeMap<K, V>
where
    K: Ord + Send + Sync + 'static,
    V: Selection,
{
    fn same(&self, _other: &Self) -> bool {
        false
    }

    fn shallow_eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|o| v.same(o)))
    }
}

impl<K, V, S> Selection for HashMap<K, V, S>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Selection,
    S: std::hash::BuildHasher + Send + Sync + 'static,
{
    fn same(&self, _other: &Self) -> bool {
        false
    }

    fn shallow_eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(k, v)| other.get(k).is_some_and(|o| v.same(o)))
    }
}

macro_rules! tuple_selection {
    ($(($($name:ident : $idx:tt),+)),* $(,)?) => {
        $(
            impl<$($name: Selection),+> Selection for ($($name,)+) {
                fn same(&self, _other: &Self) -> bool {
                    false
                }

                fn shallow_eq(&self, other: &Self) -> bool {
                    true $(&& self.$idx.same(&other.$idx))+
                }
            }
        )*
    };
}

tuple_selection!(
    (A: 0),
    (A: 0, B: 1),
    (A: 0, B: 1, C: 2),
    (A: 0, B: 1, C: 2, D: 3),
);

/// Implements [`Selection`] for a record built fresh by a selector.
///
/// Fields are compared with identity under `Shallow`; the record itself
/// is never identical to another one.
///
/// ```
/// use model_store::shallow_record;
///
/// struct CounterView {
///     count: u32,
///     label: String,
/// }
///
/// shallow_record!(CounterView { count, label });
/// ```
#[macro_export]
macro_rules! shallow_record {
    ($ty:ty { $($field:ident),+ $(,)? }) => {
        impl $crate::select::Selection for $ty {
            fn same(&self, _other: &Self) -> bool {
                false
            }

            fn shallow_eq(&self, other: &Self) -> bool {
                true $(&& $crate::select::Selection::same(&self.$field, &other.$field))+
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Pair {
        left: u32,
        right: Arc<String>,
    }

    shallow_record!(Pair { left, right });

    #[test]
    fn bool_flag_maps_to_comparator() {
        assert_eq!(Comparator::from(true), Comparator::Shallow);
        assert_eq!(Comparator::from(false), Comparator::Identity);
        assert_eq!(Comparator::default(), Comparator::Identity);
    }

    #[test]
    fn scalars_compare_by_value_under_both() {
        assert!(Comparator::Identity.equal(&3u32, &3u32));
        assert!(Comparator::Shallow.equal(&"a".to_string(), &"a".to_string()));
        assert!(!Comparator::Identity.equal(&3u32, &4u32));
    }

    #[test]
    fn floats_follow_bit_identity() {
        assert!(Comparator::Identity.equal(&f64::NAN, &f64::NAN));
        assert!(!Comparator::Identity.equal(&0.0f64, &-0.0f64));
    }

    #[test]
    fn fresh_composites_differ_by_identity_but_match_shallowly() {
        let a = (1u32, "x".to_string());
        let b = (1u32, "x".to_string());
        assert!(!Comparator::Identity.equal(&a, &b));
        assert!(Comparator::Shallow.equal(&a, &b));

        assert!(!Comparator::Identity.equal(&vec![1u8, 2], &vec![1u8, 2]));
        assert!(Comparator::Shallow.equal(&vec![1u8, 2], &vec![1u8, 2]));
        assert!(!Comparator::Shallow.equal(&vec![1u8, 2], &vec![1u8]));
    }

    #[test]
    fn shallow_stops_at_one_level() {
        let inner_a = vec![(1u32,)];
        let inner_b = vec![(1u32,)];
        // Elements are tuples: fresh values, so not identical.
        assert!(!Comparator::Shallow.equal(&inner_a, &inner_b));
    }

    #[test]
    fn arcs_compare_by_pointer() {
        let shared = Arc::new("x".to_string());
        let same = Arc::clone(&shared);
        let copy = Arc::new("x".to_string());
        assert!(Comparator::Identity.equal(&shared, &same));
        assert!(!Comparator::Identity.equal(&shared, &copy));
        assert!(!Comparator::Shallow.equal(&shared, &copy));
    }

    #[test]
    fn records_compare_fields_by_identity() {
        let label = Arc::new("n".to_string());
        let a = Pair {
            left: 1,
            right: Arc::clone(&label),
        };
        let b = Pair {
            left: 1,
            right: Arc::clone(&label),
        };
        let c = Pair {
            left: 1,
            right: Arc::new("n".to_string()),
        };
        assert!(!Comparator::Identity.equal(&a, &b));
        assert!(Comparator::Shallow.equal(&a, &b));
        assert!(!Comparator::Shallow.equal(&a, &c));
    }

    #[test]
    fn maps_compare_keys_and_values() {
        let a: BTreeMap<&str, u32> = [("a", 1), ("b", 2)].into_iter().collect();
        let b = a.clone();
        let mut c = a.clone();
        c.insert("b", 3);
        assert!(Comparator::Shallow.equal(&a, &b));
        assert!(!Comparator::Shallow.equal(&a, &c));

        let h: HashMap<String, bool> = [("k".to_string(), true)].into_iter().collect();
        assert!(Comparator::Shallow.equal(&h, &h.clone()));
        assert!(!Comparator::Identity.equal(&h, &h.clone()));
    }

    #[test]
    fn options_delegate_to_inner() {
        assert!(Comparator::Identity.equal(&Some(1u8), &Some(1u8)));
        assert!(Comparator::Identity.equal(&None::<u8>, &None));
        assert!(!Comparator::Shallow.equal(&Some(1u8), &None));
    }
}

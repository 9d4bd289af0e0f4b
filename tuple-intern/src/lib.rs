//! Canonicalizing cache of tuples.
//!
//! A [`Cache`] maps sequences of [values] to [`Tuple`] handles,
//! such that element-wise identical sequences map to the same handle.
//! Handles can then be compared and hashed by identity alone,
//! which makes them suitable as keys for maps and sets.
//!
//! Primitives are compared by value, and objects and tuples
//! are compared by identity. Using a value in a sequence
//! never keeps it alive beyond the handles that contain it,
//! and all bookkeeping for a sequence is released
//! when the last clone of its handle is dropped.
//!
//! # Examples
//!
//! ```
//! # use tuple_intern::{Cache, tuple};
//! let cache = Cache::new();
//! assert_eq!(tuple!(cache; 1, "a", ()), tuple!(cache; 1, "a", ()));
//! assert_ne!(tuple!(cache; 1, 2), tuple!(cache; 1, 2, 3));
//! assert_eq!(tuple!(cache), cache.null());
//! ```
//!
//! [values]: `Value`

#![warn(missing_docs)]

pub use self::{cache::*, tuple::*, value::*};

/// Intern a sequence of values.
///
/// `tuple!(cache; a, b, c)` is short for
/// `cache.intern([Value::from(a), Value::from(b), Value::from(c)])`,
/// and `tuple!(cache)` is short for `cache.null()`.
#[macro_export]
macro_rules! tuple
{
    ($cache:expr $(;)?) => {
        $cache.null()
    };
    ($cache:expr; $($element:expr),+ $(,)?) => {
        $cache.intern([$($crate::Value::from($element)),+])
    };
}

mod cache;
mod trie;
mod tuple;
mod value;

//! Canonical handles to interned sequences.

use {
    crate::{cache::Shared, value::Value},
    smallvec::SmallVec,
    std::{
        any::Any,
        fmt,
        hash::{Hash, Hasher},
        ops::Index,
        slice,
        sync::{Arc, Weak},
    },
    thiserror::Error,
};

/// Inline capacity for the elements of a tuple.
pub (crate) type Elements = SmallVec<[Value; 4]>;

/// Canonical handle to an interned sequence.
///
/// Handles are obtained from [`Cache::intern`].
/// Two handles obtained from the same cache are equal iff
/// they were interned from element-wise identical sequences.
/// Equality and hashing use only the identity of the handle,
/// so they are cheap regardless of the length of the sequence.
///
/// A handle keeps its elements alive.
/// When the last clone of a handle is dropped,
/// the cache forgets about the sequence,
/// and a later call to [`Cache::intern`] creates a new handle.
///
/// [`Cache::intern`]: `crate::Cache::intern`
#[derive(Clone)]
pub struct Tuple
{
    pub (crate) inner: Arc<TupleInner>,
}

pub (crate) struct TupleInner
{
    /// The cache to release the sequence from when dropped.
    ///
    /// This is weak so that handles do not keep the cache alive,
    /// and dangling for the null tuple, which is never released.
    cache: Weak<Shared>,

    elements: Elements,
}

impl Tuple
{
    /// Create a handle that is not yet registered with the trie.
    pub (crate) fn new(cache: Weak<Shared>, elements: Elements) -> Self
    {
        Self{inner: Arc::new(TupleInner{cache, elements})}
    }

    /// The number of elements.
    pub fn len(&self) -> usize
    {
        self.inner.elements.len()
    }

    /// Whether this is the null tuple.
    pub fn is_empty(&self) -> bool
    {
        self.inner.elements.is_empty()
    }

    /// The element at an index, if it exists.
    pub fn get(&self, index: usize) -> Option<&Value>
    {
        self.inner.elements.get(index)
    }

    /// The elements, in order.
    pub fn as_slice(&self) -> &[Value]
    {
        &self.inner.elements
    }

    /// Iterate over the elements, in order.
    pub fn iter(&self) -> slice::Iter<'_, Value>
    {
        self.inner.elements.iter()
    }

    /// Borrow the payload of the object at an index.
    pub fn downcast_ref<T>(&self, index: usize) -> Result<&T, ElementError>
        where T: Any
    {
        let len = self.len();
        let element = self.get(index)
            .ok_or(ElementError::OutOfBounds{index, len})?;
        let object = element.as_object()
            .ok_or(ElementError::NotAnObject{index})?;
        object.downcast_ref()
            .ok_or(ElementError::TypeMismatch{index})
    }

    /// Whether both handles are the same handle.
    ///
    /// This is the same as `==`.
    pub fn ptr_eq(&self, other: &Self) -> bool
    {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Drop for TupleInner
{
    fn drop(&mut self)
    {
        // The cache may be gone already, in which
        // case there is nothing to release from.
        if let Some(cache) = self.cache.upgrade() {
            let this: *const TupleInner = self;
            cache.release(&self.elements, this);
        }
    }
}

impl PartialEq for Tuple
{
    fn eq(&self, other: &Self) -> bool
    {
        self.ptr_eq(other)
    }
}

impl Eq for Tuple
{
}

impl Hash for Tuple
{
    fn hash<H: Hasher>(&self, state: &mut H)
    {
        Arc::as_ptr(&self.inner).hash(state);
    }
}

impl Index<usize> for Tuple
{
    type Output = Value;

    fn index(&self, index: usize) -> &Self::Output
    {
        &self.inner.elements[index]
    }
}

impl<'a> IntoIterator for &'a Tuple
{
    type Item = &'a Value;
    type IntoIter = slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter
    {
        self.iter()
    }
}

impl fmt::Debug for Tuple
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
    {
        write!(f, "Tuple(")?;
        for (i, element) in self.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            match element {
                Value::Primitive(primitive) => write!(f, "{primitive:?}")?,
                Value::Object(object)       => write!(f, "{object:?}")?,
                Value::Tuple(tuple)         => write!(f, "{tuple:?}")?,
            }
        }
        write!(f, ")")
    }
}

/// Returned by [`Tuple::downcast_ref`]
/// when the element cannot be borrowed as the requested type.
#[derive(Debug, Eq, Error, PartialEq)]
pub enum ElementError
{
    /// The index is not less than the length of the tuple.
    #[error("Index {index} is out of bounds for tuple of length {len}")]
    OutOfBounds
    {
        /// The requested index.
        index: usize,
        /// The length of the tuple.
        len: usize,
    },

    /// The element is a primitive or a tuple.
    #[error("Element {index} is not an object")]
    NotAnObject
    {
        /// The requested index.
        index: usize,
    },

    /// The element is an object with a payload of a different type.
    #[error("Element {index} is an object of a different type")]
    TypeMismatch
    {
        /// The requested index.
        index: usize,
    },
}

#[cfg(test)]
mod tests
{
    use {super::*, crate::{Cache, Object}};

    #[test]
    fn accessors()
    {
        let cache = Cache::new();
        let object = Object::new(String::from("payload"));
        let tuple = cache.intern([
            Value::from(1),
            Value::from(&object),
            Value::from("two"),
        ]);

        assert_eq!(tuple.len(), 3);
        assert!(!tuple.is_empty());
        assert_eq!(tuple[0], Value::from(1));
        assert_eq!(tuple.get(1), Some(&Value::Object(object.clone())));
        assert_eq!(tuple.get(3), None);
        assert_eq!(tuple.iter().count(), 3);
        assert_eq!((&tuple).into_iter().count(), 3);
        assert_eq!(tuple.as_slice().len(), 3);
    }

    #[test]
    fn downcast_ref()
    {
        let cache = Cache::new();
        let tuple = cache.intern([
            Value::from(Object::new(7u32)),
            Value::from(7u32),
        ]);

        assert_eq!(tuple.downcast_ref::<u32>(0), Ok(&7));
        assert_eq!(
            tuple.downcast_ref::<i64>(0),
            Err(ElementError::TypeMismatch{index: 0}),
        );
        assert_eq!(
            tuple.downcast_ref::<u32>(1),
            Err(ElementError::NotAnObject{index: 1}),
        );
        assert_eq!(
            tuple.downcast_ref::<u32>(2),
            Err(ElementError::OutOfBounds{index: 2, len: 2}),
        );
    }

    #[test]
    fn error_messages()
    {
        let error = ElementError::OutOfBounds{index: 5, len: 2};
        assert_eq!(
            error.to_string(),
            "Index 5 is out of bounds for tuple of length 2",
        );
    }

    #[test]
    fn debug()
    {
        let cache = Cache::new();
        let inner = cache.intern([Value::null(), Value::undefined()]);
        let outer = cache.intern([
            Value::from(1),
            Value::from("a"),
            Value::from(&inner),
        ]);
        assert_eq!(format!("{:?}", cache.null()), "Tuple()");
        assert_eq!(
            format!("{outer:?}"),
            "Tuple(1, \"a\", Tuple(null, undefined))",
        );
    }
}

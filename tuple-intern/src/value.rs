//! Elements of tuples.
//!
//! Every element is either a [`Primitive`], which has no identity
//! and is compared by its raw value, or an identity-bearing value:
//! an [`Object`] or a previously interned [`Tuple`].
//! Identity-bearing values are compared by the address of their storage.

use {
    crate::{Tuple, tuple::TupleInner},
    std::{
        any::Any,
        fmt,
        hash::{Hash, Hasher},
        sync::Arc,
    },
};

/* -------------------------------------------------------------------------- */
/*                                  Primitive                                 */
/* -------------------------------------------------------------------------- */

/// Value without identity.
///
/// Two primitives are the same key iff they have the same variant
/// and the same payload. No conversions happen between variants:
/// integer `0`, float `0.0`, and string `"0"` are three different keys.
///
/// Floats compare by "same value zero":
/// all NaNs are equal to each other and `-0.0` equals `0.0`.
/// Otherwise floats compare by their bit patterns.
#[derive(Clone)]
pub enum Primitive
{
    /// No value was supplied.
    Undefined,

    /// A value was supplied, and it is empty.
    Null,

    /// Boolean.
    Boolean(bool),

    /// Signed integer.
    Integer(i64),

    /// Floating-point number.
    Float(f64),

    /// Text.
    String(Arc<str>),
}

impl Primitive
{
    /// The bit pattern used to compare and hash floats.
    fn float_bits(value: f64) -> u64
    {
        if value.is_nan() {
            f64::NAN.to_bits()
        } else if value == 0.0 {
            0
        } else {
            value.to_bits()
        }
    }
}

impl PartialEq for Primitive
{
    fn eq(&self, other: &Self) -> bool
    {
        use Primitive::*;
        match (self, other) {
            (Undefined,  Undefined)  => true,
            (Null,       Null)       => true,
            (Boolean(a), Boolean(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (Float(a),   Float(b))   =>
                Self::float_bits(*a) == Self::float_bits(*b),
            (String(a),  String(b))  => a == b,
            _ => false,
        }
    }
}

impl Eq for Primitive
{
}

impl Hash for Primitive
{
    fn hash<H: Hasher>(&self, state: &mut H)
    {
        use Primitive::*;
        std::mem::discriminant(self).hash(state);
        match self {
            Undefined | Null => (),
            Boolean(value) => value.hash(state),
            Integer(value) => value.hash(state),
            Float(value)   => Self::float_bits(*value).hash(state),
            String(value)  => value.hash(state),
        }
    }
}

impl fmt::Debug for Primitive
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
    {
        match self {
            Self::Undefined      => write!(f, "undefined"),
            Self::Null           => write!(f, "null"),
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value)   => write!(f, "{value:?}"),
            Self::String(value)  => write!(f, "{value:?}"),
        }
    }
}

/* -------------------------------------------------------------------------- */
/*                                   Object                                   */
/* -------------------------------------------------------------------------- */

/// Shared, type-erased value with identity.
///
/// Cloning an object yields the same object.
/// [`Object::new`] always yields a new object,
/// even when given a payload equal to that of an existing object.
#[derive(Clone)]
pub struct Object
{
    pub (crate) inner: Arc<ObjectCell>,
}

/// Storage for the payload of an object.
///
/// The trie holds weak references to these.
pub (crate) struct ObjectCell
{
    payload: Box<dyn Any + Send + Sync>,
}

impl Object
{
    /// Create a new object with the given payload.
    pub fn new<T>(payload: T) -> Self
        where T: Any + Send + Sync
    {
        let cell = ObjectCell{payload: Box::new(payload)};
        Self{inner: Arc::new(cell)}
    }

    /// Borrow the payload, if it is of type `T`.
    pub fn downcast_ref<T>(&self) -> Option<&T>
        where T: Any
    {
        self.inner.payload.downcast_ref()
    }

    /// Whether both objects are the same object.
    pub fn ptr_eq(&self, other: &Self) -> bool
    {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Object
{
    fn eq(&self, other: &Self) -> bool
    {
        self.ptr_eq(other)
    }
}

impl Eq for Object
{
}

impl Hash for Object
{
    fn hash<H: Hasher>(&self, state: &mut H)
    {
        Arc::as_ptr(&self.inner).hash(state);
    }
}

impl fmt::Debug for Object
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
    {
        write!(f, "Object({:p})", Arc::as_ptr(&self.inner))
    }
}

/* -------------------------------------------------------------------------- */
/*                                    Value                                   */
/* -------------------------------------------------------------------------- */

/// Element of a tuple.
///
/// # Examples
///
/// ```
/// # use tuple_intern::{Primitive, Value};
/// let value = Value::from(42);
/// assert_eq!(value.as_primitive(), Some(&Primitive::Integer(42)));
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Value
{
    /// Value without identity.
    Primitive(Primitive),

    /// Object, compared by identity.
    Object(Object),

    /// Interned tuple, compared by identity.
    Tuple(Tuple),
}

/// How a value selects an edge in the trie.
pub (crate) enum Key<'a>
{
    Primitive(&'a Primitive),
    Object(&'a Arc<ObjectCell>),
    Tuple(&'a Arc<TupleInner>),
}

impl Value
{
    /// The "no value supplied" sentinel.
    pub fn undefined() -> Self
    {
        Self::Primitive(Primitive::Undefined)
    }

    /// The "empty value" sentinel.
    pub fn null() -> Self
    {
        Self::Primitive(Primitive::Null)
    }

    /// The primitive, if the value is one.
    pub fn as_primitive(&self) -> Option<&Primitive>
    {
        match self {
            Self::Primitive(primitive) => Some(primitive),
            _ => None,
        }
    }

    /// The object, if the value is one.
    pub fn as_object(&self) -> Option<&Object>
    {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// The tuple, if the value is one.
    pub fn as_tuple(&self) -> Option<&Tuple>
    {
        match self {
            Self::Tuple(tuple) => Some(tuple),
            _ => None,
        }
    }

    pub (crate) fn key(&self) -> Key<'_>
    {
        match self {
            Self::Primitive(primitive) => Key::Primitive(primitive),
            Self::Object(object)       => Key::Object(&object.inner),
            Self::Tuple(tuple)         => Key::Tuple(&tuple.inner),
        }
    }
}

impl From<Primitive> for Value
{
    fn from(other: Primitive) -> Self
    {
        Self::Primitive(other)
    }
}

impl From<Object> for Value
{
    fn from(other: Object) -> Self
    {
        Self::Object(other)
    }
}

impl From<Tuple> for Value
{
    fn from(other: Tuple) -> Self
    {
        Self::Tuple(other)
    }
}

impl From<&Tuple> for Value
{
    fn from(other: &Tuple) -> Self
    {
        Self::Tuple(other.clone())
    }
}

impl From<&Object> for Value
{
    fn from(other: &Object) -> Self
    {
        Self::Object(other.clone())
    }
}

impl From<()> for Value
{
    fn from((): ()) -> Self
    {
        Self::null()
    }
}

impl<T> From<Option<T>> for Value
    where T: Into<Value>
{
    /// [`None`] becomes undefined.
    fn from(other: Option<T>) -> Self
    {
        other.map_or_else(Self::undefined, Into::into)
    }
}

macro_rules! from_primitive
{
    ($($ty:ty => |$x:ident| $e:expr),* $(,)?) => {
        $(
            impl From<$ty> for Value
            {
                fn from($x: $ty) -> Self
                {
                    Self::Primitive($e)
                }
            }
        )*
    };
}

from_primitive! {
    bool     => |x| Primitive::Boolean(x),
    i8       => |x| Primitive::Integer(x.into()),
    i16      => |x| Primitive::Integer(x.into()),
    i32      => |x| Primitive::Integer(x.into()),
    i64      => |x| Primitive::Integer(x),
    u8       => |x| Primitive::Integer(x.into()),
    u16      => |x| Primitive::Integer(x.into()),
    u32      => |x| Primitive::Integer(x.into()),
    f32      => |x| Primitive::Float(x.into()),
    f64      => |x| Primitive::Float(x),
    char     => |x| Primitive::String(x.to_string().into()),
    &str     => |x| Primitive::String(x.into()),
    String   => |x| Primitive::String(x.into()),
    Arc<str> => |x| Primitive::String(x),
}

#[cfg(test)]
mod tests
{
    use {super::*, proptest::proptest, std::collections::HashSet};

    #[test]
    fn sentinels_differ()
    {
        assert_ne!(Value::undefined(), Value::null());
        assert_eq!(Value::from(()), Value::null());
        assert_eq!(Value::from(None::<i64>), Value::undefined());
    }

    #[test]
    fn no_conversion_between_variants()
    {
        let keys: HashSet<Primitive> = [
            Primitive::Integer(0),
            Primitive::Float(0.0),
            Primitive::String("0".into()),
            Primitive::Boolean(false),
            Primitive::Null,
            Primitive::Undefined,
        ].into_iter().collect();
        assert_eq!(keys.len(), 6);
    }

    #[test]
    fn same_value_zero()
    {
        assert_eq!(Primitive::Float(f64::NAN), Primitive::Float(-f64::NAN));
        assert_eq!(Primitive::Float(-0.0), Primitive::Float(0.0));
        assert_ne!(Primitive::Float(1.0), Primitive::Float(1.0 + f64::EPSILON));
    }

    #[test]
    fn objects_compare_by_identity()
    {
        let a = Object::new(());
        let b = Object::new(());
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(a.downcast_ref::<()>(), Some(&()));
        assert_eq!(a.downcast_ref::<i32>(), None);
    }

    proptest!
    {
        #[test]
        fn integer_hash_agrees_with_eq(a: i64, b: i64)
        {
            let set: HashSet<Primitive> =
                [Primitive::Integer(a), Primitive::Integer(b)]
                .into_iter().collect();
            assert_eq!(set.len(), if a == b { 1 } else { 2 });
        }

        #[test]
        fn string_keys(a: String)
        {
            assert_eq!(Value::from(a.as_str()), Value::from(a.clone()));
        }
    }
}

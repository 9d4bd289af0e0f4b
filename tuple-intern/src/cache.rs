use {
    crate::{
        trie::Node,
        tuple::{Elements, Tuple, TupleInner},
        value::Value,
    },
    std::{
        fmt,
        sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    },
};

/// Canonicalizing cache of tuples.
///
/// Each cache is its own namespace: handles from different caches
/// are never equal, even for identical sequences.
/// Cloning a cache yields another reference to the same namespace.
/// The cache can be shared across threads.
///
/// # Examples
///
/// ```
/// # use tuple_intern::{Cache, Object, Value};
/// let cache = Cache::new();
/// let object = Object::new("shape");
///
/// let a = cache.intern([Value::from(&object), Value::from(1)]);
/// let b = cache.intern([Value::from(&object), Value::from(1)]);
/// let c = cache.intern([Value::from(Object::new("shape")), Value::from(1)]);
///
/// assert_eq!(a, b);
/// assert_ne!(a, c);
/// ```
#[derive(Clone)]
pub struct Cache
{
    shared: Arc<Shared>,
}

/// State shared by a cache and its clones.
///
/// Handles refer to this weakly, to release their sequence when dropped.
pub (crate) struct Shared
{
    /// Root of the trie; the terminal node of the empty sequence.
    ///
    /// All reads and writes of the trie happen behind this one lock,
    /// including those made when handles are dropped.
    /// Values must not be dropped while the lock is held,
    /// as dropping a nested tuple would take the lock again.
    root: Mutex<Node>,

    /// The handle for the empty sequence.
    ///
    /// This is never released.
    null: Tuple,
}

impl Cache
{
    /// Create an empty cache.
    pub fn new() -> Self
    {
        let null = Tuple::new(Weak::new(), Elements::new());

        let mut root = Node::new();
        root.set_terminal(&null.inner);

        let shared = Shared{root: Mutex::new(root), null};
        Self{shared: Arc::new(shared)}
    }

    /// Obtain the handle for a sequence.
    ///
    /// If a handle for an element-wise identical sequence is live,
    /// that handle is returned. Otherwise, a new handle is created.
    /// Primitives are compared by value, and objects and tuples
    /// are compared by identity.
    pub fn intern<I>(&self, elements: I) -> Tuple
        where I: IntoIterator, I::Item: Into<Value>
    {
        let elements: Elements = elements.into_iter().map(Into::into).collect();

        if elements.is_empty() {
            return self.null();
        }

        let mut root = self.shared.root();

        if let Some(inner) = root.find(&elements).and_then(Node::terminal) {
            // Release the lock before dropping the elements.
            drop(root);
            return Tuple{inner};
        }

        let tuple = Tuple::new(Arc::downgrade(&self.shared), elements);
        root.walk(tuple.as_slice()).set_terminal(&tuple.inner);
        drop(root);

        tracing::trace!(len = tuple.len(), "minted tuple");
        tuple
    }

    /// The handle for the empty sequence.
    ///
    /// This is the same handle for the lifetime of the cache.
    pub fn null(&self) -> Tuple
    {
        self.shared.null.clone()
    }

    /// The number of primitive-keyed nodes in the trie.
    ///
    /// Each primitive-keyed node is retained by at least one live handle,
    /// so once all handles are dropped this is zero again.
    pub fn live_entry_count(&self) -> usize
    {
        self.shared.root().primitive_entries()
    }

    /// Physically remove edges keyed by dropped objects and tuples.
    ///
    /// Such edges are already ignored by lookups,
    /// and are otherwise removed lazily as new edges are inserted.
    /// Returns the number of edges removed.
    pub fn sweep(&self) -> usize
    {
        let removed = self.shared.root().remove_expired();
        tracing::debug!(removed, "swept expired reference edges");
        removed
    }

    /// Whether both caches are the same namespace.
    pub fn ptr_eq(&self, other: &Self) -> bool
    {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl Shared
{
    fn root(&self) -> MutexGuard<'_, Node>
    {
        // The trie is consistent between operations,
        // so a panic elsewhere does not invalidate it.
        self.root.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Release the sequence of a handle that is being dropped.
    ///
    /// See [`Node::release`].
    pub fn release(&self, elements: &[Value], tuple: *const TupleInner)
    {
        let mut root = self.root();
        root.release(elements, tuple);
        drop(root);
        tracing::trace!(len = elements.len(), "reclaimed tuple");
    }
}

impl Default for Cache
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl fmt::Debug for Cache
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
    {
        f.debug_struct("Cache")
            .field("live_entry_count", &self.live_entry_count())
            .finish_non_exhaustive()
    }
}

//! Trie of interned sequences.
//!
//! Each node represents the sequences that start with the path
//! from the root to that node. A node is the terminal node of
//! the sequence that is exactly that path; it refers to
//! the handle for that sequence while the handle is live.
//! Prefixes of a sequence share nodes with the sequence,
//! but end at different nodes, so they get different handles.
//!
//! Every edge on the path of a live handle is kept alive:
//! primitive edges by counting, and reference edges because
//! the handle owns its elements, which are the keys of those edges.

pub (crate) use self::{primitive::*, reference::*};

use {
    crate::{
        tuple::TupleInner,
        value::{Key, ObjectCell, Value},
    },
    std::sync::{Arc, Weak},
};

mod primitive;
mod reference;

/// Cache state reachable after a specific prefix.
pub (crate) struct Node
{
    /// The handle for the sequence ending at this node, if any.
    ///
    /// The handle itself may already be dropping,
    /// in which case it cannot be upgraded.
    terminal: Option<Weak<TupleInner>>,

    primitives: PrimitiveEdges,
    objects: ReferenceEdges<ObjectCell>,
    tuples: ReferenceEdges<TupleInner>,
}

impl Node
{
    pub fn new() -> Self
    {
        Self{
            terminal: None,
            primitives: PrimitiveEdges::default(),
            objects: ReferenceEdges::new(),
            tuples: ReferenceEdges::new(),
        }
    }

    /// The live handle for the sequence ending at this node.
    pub fn terminal(&self) -> Option<Arc<TupleInner>>
    {
        self.terminal.as_ref().and_then(Weak::upgrade)
    }

    pub fn set_terminal(&mut self, tuple: &Arc<TupleInner>)
    {
        self.terminal = Some(Arc::downgrade(tuple));
    }

    /// Whether the node has no handle and no children.
    ///
    /// Vacant nodes are removed from the trie.
    pub fn is_vacant(&self) -> bool
    {
        self.terminal.is_none()
            && self.primitives.is_empty()
            && self.objects.is_empty()
            && self.tuples.is_empty()
    }

    /// Find the terminal node of a sequence, without changing anything.
    pub fn find(&self, elements: &[Value]) -> Option<&Node>
    {
        elements.iter().try_fold(self, Node::step)
    }

    /// Find the child for an element, without changing anything.
    fn step(&self, element: &Value) -> Option<&Node>
    {
        match element.key() {
            Key::Primitive(key) => self.primitives.get(key),
            Key::Object(key)    => self.objects.get(key),
            Key::Tuple(key)     => self.tuples.get(key),
        }
    }

    /// Find or create the terminal node of a sequence.
    ///
    /// Every primitive edge on the way is counted once.
    /// Hence this must be called exactly once for each handle,
    /// and be matched by exactly one call to [`release`][`Self::release`].
    pub fn walk(&mut self, elements: &[Value]) -> &mut Node
    {
        let mut node = self;
        for element in elements {
            node = match element.key() {
                Key::Primitive(key) => node.primitives.get_or_create(key),
                Key::Object(key)    => node.objects.get_or_create(key),
                Key::Tuple(key)     => node.tuples.get_or_create(key),
            };
        }
        node
    }

    /// Undo [`walk`][`Self::walk`] for a handle that is being dropped.
    ///
    /// `tuple` must point to the handle being dropped.
    /// Each primitive edge on the path is uncounted,
    /// and the topmost edge that only this handle keeps
    /// is removed together with everything below it.
    /// If the terminal node survives, it forgets the handle
    /// only if it still refers to it; a new handle for
    /// the same sequence may already have replaced it.
    ///
    /// Missing edges end the walk, so releasing
    /// an already pruned path does nothing.
    pub fn release(&mut self, elements: &[Value], tuple: *const TupleInner)
    {
        let cut = self.release_cut(elements, tuple);

        let mut node = self;
        for (i, element) in elements.iter().enumerate() {
            let key = element.key();

            if cut == Some(i) {
                node.remove_edge(key);
                return;
            }

            let child = match key {
                Key::Primitive(key) => {
                    let released = node.primitives.release(key);
                    debug_assert_ne!(
                        released, Released::Removed,
                        "Released primitive edge above the cut",
                    );
                    node.primitives.get_mut(key)
                },
                Key::Object(key) => node.objects.get_mut(key),
                Key::Tuple(key)  => node.tuples.get_mut(key),
            };

            let Some(child) = child else { return; };
            node = child;
        }

        let is_tuple = node.terminal.as_ref()
            .map_or(false, |terminal| terminal.as_ptr() == tuple);
        if is_tuple {
            node.terminal = None;
        }
    }

    /// Find the topmost edge on the path of a sequence
    /// below which nothing but the handle `tuple` remains.
    ///
    /// This edge and all edges below it on the path
    /// are kept only by that handle.
    fn release_cut(&self, elements: &[Value], tuple: *const TupleInner)
        -> Option<usize>
    {
        let mut cut = None;
        let mut node = self;
        for (i, element) in elements.iter().enumerate() {
            let Some(child) = node.step(element) else { break; };
            let sole = match element.key() {
                Key::Primitive(key) =>
                    node.primitives.count(key) == 1,
                Key::Object(..) | Key::Tuple(..) =>
                    child.kept_only_by(&elements[i + 1 ..], tuple),
            };
            cut = if sole { cut.or(Some(i)) } else { None };
            node = child;
        }
        cut
    }

    /// Whether this node has nothing but the path of `rest`,
    /// and, at the end of that path, the handle `tuple`.
    fn kept_only_by(&self, rest: &[Value], tuple: *const TupleInner) -> bool
    {
        let terminal = match &self.terminal {
            None => true,
            Some(terminal) => rest.is_empty() && terminal.as_ptr() == tuple,
        };
        let next = rest.first().and_then(|element| self.step(element));
        terminal && self.children().take(2).count() == usize::from(next.is_some())
    }

    fn remove_edge(&mut self, key: Key<'_>)
    {
        match key {
            Key::Primitive(key) => {
                let released = self.primitives.release(key);
                debug_assert_eq!(
                    released, Released::Removed,
                    "Cut primitive edge is still counted",
                );
            },
            Key::Object(key) => self.objects.remove(key),
            Key::Tuple(key)  => self.tuples.remove(key),
        }
    }

    /// The number of primitive-keyed nodes in this subtree.
    pub fn primitive_entries(&self) -> usize
    {
        let mut entries = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            entries += node.primitives.nodes().count();
            stack.extend(node.children());
        }
        entries
    }

    /// Remove expired reference edges in this subtree.
    ///
    /// Returns the number of edges removed.
    pub fn remove_expired(&mut self) -> usize
    {
        let mut removed = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            removed += node.objects.remove_expired();
            removed += node.tuples.remove_expired();
            stack.extend(node.children_mut());
        }
        removed
    }

    fn children(&self) -> impl Iterator<Item=&Node>
    {
        self.primitives.nodes()
            .chain(self.objects.nodes())
            .chain(self.tuples.nodes())
    }

    fn children_mut(&mut self) -> impl Iterator<Item=&mut Node>
    {
        self.primitives.nodes_mut()
            .chain(self.objects.nodes_mut())
            .chain(self.tuples.nodes_mut())
    }

    fn drain_children(&mut self, into: &mut Vec<Node>)
    {
        self.primitives.drain_nodes(into);
        self.objects.drain_nodes(into);
        self.tuples.drain_nodes(into);
    }
}

impl Drop for Node
{
    fn drop(&mut self)
    {
        // Long sequences make deep tries, which
        // must not be dropped by recursion.
        let mut stack = Vec::new();
        self.drain_children(&mut stack);
        while let Some(mut node) = stack.pop() {
            node.drain_children(&mut stack);
        }
    }
}

#[cfg(test)]
mod tests
{
    use {
        super::*,
        crate::{
            tuple::Tuple,
            value::{Object, Primitive},
        },
    };

    fn values(xs: &[i64]) -> Vec<Value>
    {
        xs.iter().copied().map(Value::from).collect()
    }

    #[test]
    fn empty_sequence_is_root()
    {
        let mut root = Node::new();
        let root_ptr: *const Node = &root;
        assert!(std::ptr::eq(root.walk(&[]), root_ptr));
        assert!(root.is_vacant());
    }

    #[test]
    fn find_does_not_create()
    {
        let root = Node::new();
        assert!(root.find(&values(&[1, 2])).is_none());
        assert!(root.is_vacant());
    }

    #[test]
    fn walk_shares_prefixes()
    {
        let mut root = Node::new();
        root.walk(&values(&[1, 2, 3]));
        root.walk(&values(&[1, 2]));
        assert_eq!(root.primitive_entries(), 3);
        assert_eq!(root.primitives.count(&Primitive::Integer(1)), 2);
    }

    #[test]
    fn release_prunes_unshared_suffix()
    {
        let mut root = Node::new();
        let long = values(&[1, 2, 3]);
        let short = values(&[1, 9]);
        root.walk(&long);
        root.walk(&short);
        assert_eq!(root.primitive_entries(), 4);

        root.release(&long, std::ptr::null());
        assert_eq!(root.primitive_entries(), 2);
        assert!(root.find(&short).is_some());

        root.release(&short, std::ptr::null());
        assert_eq!(root.primitive_entries(), 0);
        assert!(root.is_vacant());

        // Releasing again is harmless.
        root.release(&short, std::ptr::null());
        assert!(root.is_vacant());
    }

    #[test]
    fn release_prunes_reference_edges()
    {
        let object = Object::new(());
        let sequence = vec![Value::from(&object), Value::from(1)];
        let mut root = Node::new();
        root.walk(&sequence);
        assert!(!root.is_vacant());

        root.release(&sequence, std::ptr::null());
        assert!(root.is_vacant());
    }

    #[test]
    fn dropped_objects_expire()
    {
        let object = Object::new(());
        let mut root = Node::new();
        root.walk(&[Value::from(&object)]);
        assert!(!root.is_vacant());

        drop(object);
        assert!(root.is_vacant());
        assert_eq!(root.remove_expired(), 1);
    }

    #[test]
    fn release_clears_only_matching_terminal()
    {
        let sequence = values(&[1, 2]);
        let a = Tuple::new(Weak::new(), sequence.iter().cloned().collect());
        let b = Tuple::new(Weak::new(), sequence.iter().cloned().collect());

        // B replaces A, as when A was dying while B was interned.
        let mut root = Node::new();
        root.walk(&sequence).set_terminal(&a.inner);
        root.walk(&sequence).set_terminal(&b.inner);

        root.release(&sequence, Arc::as_ptr(&a.inner));
        let terminal = root.find(&sequence).and_then(Node::terminal);
        assert!(terminal.map_or(false, |t| Arc::ptr_eq(&t, &b.inner)));
        assert_eq!(root.primitive_entries(), 2);

        root.release(&sequence, Arc::as_ptr(&b.inner));
        assert!(root.is_vacant());
    }

    #[test]
    fn release_keeps_reference_node_with_other_terminal()
    {
        let object = Object::new(());
        let sequence = vec![Value::from(&object)];
        let a = Tuple::new(Weak::new(), sequence.iter().cloned().collect());
        let b = Tuple::new(Weak::new(), sequence.iter().cloned().collect());

        let mut root = Node::new();
        root.walk(&sequence).set_terminal(&a.inner);
        root.walk(&sequence).set_terminal(&b.inner);

        root.release(&sequence, Arc::as_ptr(&a.inner));
        assert!(root.find(&sequence).and_then(Node::terminal).is_some());

        root.release(&sequence, Arc::as_ptr(&b.inner));
        assert!(root.is_vacant());
    }

    #[test]
    fn deep_paths()
    {
        let object = Object::new(());
        let sequence: Vec<Value> = (0 .. 100_000i64)
            .map(|i| if i % 3 == 0 { Value::from(&object) } else { Value::from(i) })
            .collect();

        let mut root = Node::new();
        root.walk(&sequence);
        assert_eq!(root.primitive_entries(), 66_666);
        assert_eq!(root.remove_expired(), 0);

        root.release(&sequence, std::ptr::null());
        assert!(root.is_vacant());

        // Dropping a deep trie does not recurse.
        root.walk(&sequence);
        drop(root);
    }
}

use {
    super::Node,
    std::sync::{Arc, Weak},
    weak_table::PtrWeakKeyHashMap,
};

/// Edges keyed by the identity of shared values.
///
/// The keys are held weakly, so using a value as a key
/// never keeps it alive. Once a key is dropped everywhere else,
/// its edge expires: it is skipped by lookups and iteration,
/// and is physically removed either on a later insertion
/// or by [`remove_expired`][`Self::remove_expired`].
/// Dropping an expired edge drops the subtree below it.
///
/// Most nodes have no reference edges at all,
/// so the table is only allocated on first insertion.
pub (crate) struct ReferenceEdges<T>
{
    edges: Option<PtrWeakKeyHashMap<Weak<T>, Node>>,
}

impl<T> ReferenceEdges<T>
{
    pub fn new() -> Self
    {
        Self{edges: None}
    }

    /// Find the child for a value.
    pub fn get(&self, key: &Arc<T>) -> Option<&Node>
    {
        self.edges.as_ref()?.get(key)
    }

    /// Find the child for a value.
    pub fn get_mut(&mut self, key: &Arc<T>) -> Option<&mut Node>
    {
        self.edges.as_mut()?.get_mut(key)
    }

    /// Find or create the child for a value.
    pub fn get_or_create(&mut self, key: &Arc<T>) -> &mut Node
    {
        self.edges.get_or_insert_with(PtrWeakKeyHashMap::new)
            .entry(Arc::clone(key))
            .or_insert_with(Node::new)
    }

    /// Remove the child for a value.
    pub fn remove(&mut self, key: &Arc<T>)
    {
        if let Some(edges) = &mut self.edges {
            edges.remove(key);
            if edges.is_empty() {
                self.edges = None;
            }
        }
    }

    /// Whether there are no live edges.
    pub fn is_empty(&self) -> bool
    {
        self.nodes().next().is_none()
    }

    /// Physically remove all expired edges.
    ///
    /// Returns the number of edges removed.
    pub fn remove_expired(&mut self) -> usize
    {
        let Some(edges) = &mut self.edges else { return 0; };
        let before = edges.len();
        edges.remove_expired();
        let removed = before - edges.len();
        if edges.is_empty() {
            self.edges = None;
        }
        removed
    }

    /// The children of live edges, in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item=&Node>
    {
        self.edges.iter().flat_map(|edges| edges.values())
    }

    /// The children of live edges, in no particular order.
    pub fn nodes_mut(&mut self) -> impl Iterator<Item=&mut Node>
    {
        self.edges.iter_mut().flat_map(|edges| edges.values_mut())
    }

    /// Move the children of live edges into `into`, leaving no edges.
    ///
    /// Children of expired edges are dropped in place.
    pub fn drain_nodes(&mut self, into: &mut Vec<Node>)
    {
        if let Some(mut edges) = self.edges.take() {
            into.extend(edges.drain().map(|(_, node)| node));
        }
    }
}

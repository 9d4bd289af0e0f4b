use {
    super::Node,
    crate::value::Primitive,
    non_zero_ext::NonZeroExt,
    std::{
        collections::{HashMap, hash_map::Entry},
        num::NonZeroUsize,
    },
};

/// Edges keyed by primitives.
///
/// Primitives cannot be weakly referenced, so nothing tells us
/// when a primitive is no longer used by any tuple.
/// Instead, each edge counts the handles whose path goes through it.
/// The count is incremented by [`get_or_create`] while minting a handle,
/// and decremented by [`release`] while reclaiming one.
/// When the count drops to zero, the edge is removed.
///
/// [`get_or_create`]: `Self::get_or_create`
/// [`release`]: `Self::release`
#[derive(Default)]
pub (crate) struct PrimitiveEdges
{
    edges: HashMap<Primitive, PrimitiveEdge>,
}

struct PrimitiveEdge
{
    /// The number of handles whose path goes through this edge.
    count: NonZeroUsize,

    node: Node,
}

/// Outcome of [`PrimitiveEdges::release`].
#[derive(Debug, Eq, PartialEq)]
pub (crate) enum Released
{
    /// Other handles still go through the edge.
    Retained,

    /// The edge and its child were removed.
    Removed,

    /// There was no such edge.
    Missing,
}

impl PrimitiveEdges
{
    /// Find the child for a primitive, without counting.
    pub fn get(&self, key: &Primitive) -> Option<&Node>
    {
        self.edges.get(key).map(|edge| &edge.node)
    }

    /// Find the child for a primitive, without counting.
    pub fn get_mut(&mut self, key: &Primitive) -> Option<&mut Node>
    {
        self.edges.get_mut(key).map(|edge| &mut edge.node)
    }

    /// Find or create the child for a primitive, and count it.
    pub fn get_or_create(&mut self, key: &Primitive) -> &mut Node
    {
        const ERR: &str = "Too many tuples through primitive edge";
        let edge = self.edges.entry(key.clone())
            .and_modify(|e| e.count = e.count.checked_succ().expect(ERR))
            .or_insert_with(|| PrimitiveEdge{
                count: NonZeroUsize::ONE,
                node: Node::new(),
            });
        &mut edge.node
    }

    /// Uncount the child for a primitive.
    ///
    /// If this was the last count, the child is removed,
    /// together with the subtree below it.
    pub fn release(&mut self, key: &Primitive) -> Released
    {
        match self.edges.entry(key.clone()) {
            Entry::Occupied(mut entry) =>
                match entry.get().count.checked_pred() {
                    Some(n) => {
                        entry.get_mut().count = n;
                        Released::Retained
                    },
                    None => {
                        entry.remove();
                        tracing::trace!(key = ?key, "pruned primitive edge");
                        Released::Removed
                    },
                },
            Entry::Vacant(..) =>
                Released::Missing,
        }
    }

    pub fn is_empty(&self) -> bool
    {
        self.edges.is_empty()
    }

    /// The children, in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item=&Node>
    {
        self.edges.values().map(|edge| &edge.node)
    }

    /// The children, in no particular order.
    pub fn nodes_mut(&mut self) -> impl Iterator<Item=&mut Node>
    {
        self.edges.values_mut().map(|edge| &mut edge.node)
    }

    /// Move the children into `into`, leaving no edges.
    pub fn drain_nodes(&mut self, into: &mut Vec<Node>)
    {
        into.extend(self.edges.drain().map(|(_, edge)| edge.node));
    }

    /// The number of counted handles going through an edge.
    pub fn count(&self, key: &Primitive) -> usize
    {
        self.edges.get(key).map_or(0, |edge| edge.count.get())
    }
}

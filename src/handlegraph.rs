use crate::error::SnarlError;
use crate::handle::{Edge, Handle, NodeId, NodeSide};

/// Trait encapsulating read access to a bidirected sequence graph.
///
/// `Handle`s are packed (node, orientation) values, so the handle algebra
/// comes with default implementations; implementors supply edge iteration,
/// node enumeration, and sequence access. Overlay graphs that abstract
/// away sequence may refuse `get_length` and `get_sequence`.
pub trait HandleGraph {
    #[inline]
    fn get_handle(&self, id: NodeId, is_reverse: bool) -> Handle {
        Handle::pack(id, is_reverse)
    }

    #[inline]
    fn get_id(&self, handle: Handle) -> NodeId {
        handle.id()
    }

    #[inline]
    fn get_is_reverse(&self, handle: Handle) -> bool {
        handle.is_reverse()
    }

    #[inline]
    fn flip(&self, handle: Handle) -> Handle {
        handle.flip()
    }

    /// The length of the node's sequence.
    fn get_length(&self, handle: Handle) -> Result<usize, SnarlError>;

    /// The node's sequence, in the handle's local forward orientation.
    fn get_sequence(&self, handle: Handle) -> Result<Vec<u8>, SnarlError>;

    /// Invokes `visitor` on each handle adjacent to `handle` on the given
    /// side. A `false` return from the visitor stops iteration early, and
    /// `follow_edges` returns `false` exactly when that happened.
    fn follow_edges(
        &self,
        handle: Handle,
        go_left: bool,
        visitor: &mut dyn FnMut(Handle) -> bool,
    ) -> bool;

    /// Invokes `visitor` on each node of the graph, in forward
    /// orientation, stopping early if the visitor returns `false`.
    fn for_each_handle(&self, visitor: &mut dyn FnMut(Handle) -> bool);

    /// The number of nodes this graph presents.
    fn node_count(&self) -> usize {
        let mut count = 0;
        self.for_each_handle(&mut |_| {
            count += 1;
            true
        });
        count
    }

    /// Every edge incident on a node, from the node's own point of view:
    /// edges off the right side of the forward node first, then edges off
    /// the left side. An edge with both endpoints on the node shows up
    /// once per traversal order.
    fn edges_of_node(&self, id: NodeId) -> Vec<Edge> {
        let mut edges = Vec::new();
        let fwd = self.get_handle(id, false);
        self.follow_edges(fwd, false, &mut |other| {
            edges.push(Edge(fwd, other));
            true
        });
        let rev = self.flip(fwd);
        self.follow_edges(rev, false, &mut |other| {
            edges.push(Edge(rev, other));
            true
        });
        edges
    }

    /// Every node side attached by an edge to the given side.
    fn attached_sides(&self, side: NodeSide) -> Vec<NodeSide> {
        // Exiting through `side` means traversing its node with the side
        // on the right; arriving at a reverse handle means arriving at
        // that node's end.
        let out = self.get_handle(side.id, !side.is_end);
        let mut sides = Vec::new();
        self.follow_edges(out, false, &mut |attached| {
            sides.push(NodeSide::new(
                self.get_id(attached),
                self.get_is_reverse(attached),
            ));
            true
        });
        sides
    }
}

use std::fmt;
use std::ops::Add;

/// A node identifier in a bidirected sequence graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl From<u64> for NodeId {
    fn from(num: u64) -> Self {
        NodeId(num)
    }
}

impl From<NodeId> for u64 {
    fn from(id: NodeId) -> u64 {
        id.0
    }
}

impl Add<u64> for NodeId {
    type Output = Self;

    fn add(self, other: u64) -> Self {
        let NodeId(i) = self;
        NodeId(i + other)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node observed in a specific orientation: the node ID in the upper 63
/// bits, the orientation in the low bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(u64);

impl Handle {
    pub fn as_integer(self) -> u64 {
        let Handle(i) = self;
        i
    }

    pub fn from_integer(i: u64) -> Self {
        Handle(i)
    }

    pub fn unpack_number(self) -> u64 {
        self.as_integer() >> 1
    }

    pub fn unpack_bit(self) -> bool {
        self.as_integer() & 1 != 0
    }

    pub fn new<T: Into<NodeId>>(id: T, is_reverse: bool) -> Handle {
        Handle::pack(id.into(), is_reverse)
    }

    pub fn pack(node_id: NodeId, is_reverse: bool) -> Handle {
        let NodeId(id) = node_id;
        if id < (0x1 << 63) {
            Handle::from_integer((id << 1) | is_reverse as u64)
        } else {
            panic!(
                "Tried to create a handle with a node ID that filled 64 bits"
            )
        }
    }

    pub fn id(&self) -> NodeId {
        NodeId(self.unpack_number())
    }

    pub fn is_reverse(&self) -> bool {
        self.unpack_bit()
    }

    pub fn flip(&self) -> Self {
        Handle(self.as_integer() ^ 1)
    }

    pub fn forward(&self) -> Self {
        Handle(self.as_integer() & !1)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.id(), if self.is_reverse() { "-" } else { "+" })
    }
}

/// An edge between two oriented nodes, in a specific traversal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edge(pub Handle, pub Handle);

impl Edge {
    /// The canonical representative of a bidirected edge, picking
    /// deterministically between the two traversal orders so that sets of
    /// edges never hold both.
    pub fn edge_handle(left: Handle, right: Handle) -> Edge {
        let flipped_right = right.flip();
        let flipped_left = left.flip();

        if left > flipped_right {
            Edge(flipped_right, flipped_left)
        } else if left == flipped_right {
            if right > flipped_left {
                Edge(flipped_right, flipped_left)
            } else {
                Edge(left, right)
            }
        } else {
            Edge(left, right)
        }
    }
}

/// One of the two endpoints of a node; a forward node's right side has
/// `is_end` set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeSide {
    pub id: NodeId,
    pub is_end: bool,
}

impl NodeSide {
    pub fn new<T: Into<NodeId>>(id: T, is_end: bool) -> NodeSide {
        NodeSide {
            id: id.into(),
            is_end,
        }
    }

    /// The other endpoint of the same node.
    pub fn opposite(self) -> NodeSide {
        NodeSide {
            id: self.id,
            is_end: !self.is_end,
        }
    }
}

impl fmt::Display for NodeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.id, if self.is_end { "end" } else { "start" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Handle::pack is an isomorphism; Handle <=> (u63, bool)
    #[test]
    fn handle_is_isomorphism() {
        let u: u64 = 597283742;
        let h = Handle::pack(NodeId(u), true);
        assert_eq!(h.unpack_number(), u);
        assert_eq!(h.unpack_bit(), true);
    }

    // Handle::pack should panic when the provided NodeId is invalid
    // (i.e. uses the 64th bit
    #[test]
    #[should_panic]
    fn handle_pack_panic() {
        Handle::pack(NodeId(std::u64::MAX), true);
    }

    #[test]
    fn handle_flip() {
        let u: u64 = 597283742;
        let h1 = Handle::pack(NodeId(u), true);
        let h2 = h1.flip();

        assert_eq!(h1.unpack_number(), h2.unpack_number());
        assert_eq!(h1.unpack_bit(), true);
        assert_eq!(h2.unpack_bit(), false);
        assert_eq!(h2.forward(), h2);
    }

    #[test]
    fn edge_handle_is_canonical() {
        let h4 = Handle::new(4u64, false);
        let h5 = Handle::new(5u64, false);

        // Both traversal orders of an edge map to one representative.
        assert_eq!(
            Edge::edge_handle(h4, h5),
            Edge::edge_handle(h5.flip(), h4.flip())
        );

        // A reversing self loop is its own canonical form.
        assert_eq!(Edge::edge_handle(h4, h4.flip()), Edge(h4, h4.flip()));
    }

    #[test]
    fn node_side_opposite() {
        let side = NodeSide::new(9u64, false);
        assert_eq!(side.opposite(), NodeSide::new(9u64, true));
        assert_eq!(side.opposite().opposite(), side);
    }
}

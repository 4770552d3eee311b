/*!

Snarl records, visits, and the boundary algebra connecting them.

A snarl is a bubble of variation bounded by two oriented nodes; its
`start` is the boundary crossed when entering and its `end` the boundary
crossed when leaving. A [`Visit`] is one step of a walk at a single level
of the decomposition: either an oriented node, or a whole child snarl
traversed start-to-end (or end-to-start when its `backward` flag is set).

*/

use std::cmp::Ordering;
use std::fmt;

use crate::handle::{Handle, NodeId, NodeSide};

/// Classification assigned to a snarl by the decomposition that produced
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SnarlType {
    Unclassified,
    Ultrabubble,
    Unary,
}

impl Default for SnarlType {
    fn default() -> Self {
        SnarlType::Unclassified
    }
}

/// The canonical identity of a snarl: its oriented boundary pair.
pub type SnarlKey = (Handle, Handle);

/// A snarl record, immutable once loaded into a manager.
#[derive(Debug, Clone, Copy)]
pub struct Snarl {
    /// Boundary crossed when entering the snarl.
    pub start: Handle,
    /// Boundary crossed when leaving the snarl.
    pub end: Handle,
    pub kind: SnarlType,
    /// Boundary key of the enclosing snarl; `None` for a top-level snarl.
    pub parent: Option<SnarlKey>,
    /// Whether the start boundary can reach itself through the interior.
    pub start_self_reachable: bool,
    /// Whether the end boundary can reach itself through the interior.
    pub end_self_reachable: bool,
    /// Whether the start boundary can reach the end boundary.
    pub start_end_reachable: bool,
}

impl Default for Snarl {
    fn default() -> Snarl {
        Snarl::new(
            Handle::from_integer(0),
            Handle::from_integer(0),
            SnarlType::Unclassified,
        )
    }
}

impl Snarl {
    pub fn new(start: Handle, end: Handle, kind: SnarlType) -> Snarl {
        Snarl {
            start,
            end,
            kind,
            parent: None,
            start_self_reachable: false,
            end_self_reachable: false,
            start_end_reachable: false,
        }
    }

    /// The key all of the manager's indexes are built around.
    #[inline]
    pub fn key(&self) -> SnarlKey {
        (self.start, self.end)
    }

    /// True when start and end are the two orientations of one node.
    pub fn is_unary(&self) -> bool {
        self.start.id() == self.end.id()
            && self.start.is_reverse() != self.end.is_reverse()
    }
}

/// Copy the boundary pair of `from` into `to`, leaving everything else
/// alone.
pub fn transfer_boundary_info(from: &Snarl, to: &mut Snarl) {
    to.start = from.start;
    to.end = from.end;
}

// Comparisons look at the kind and the boundaries; the parent key only
// participates when either side carries one, and the connectivity flags
// never do.

impl PartialEq for Snarl {
    fn eq(&self, other: &Self) -> bool {
        if self.kind != other.kind
            || self.start != other.start
            || self.end != other.end
        {
            return false;
        }
        if self.parent.is_some() || other.parent.is_some() {
            return self.parent == other.parent;
        }
        true
    }
}

impl Eq for Snarl {}

impl PartialOrd for Snarl {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Snarl {
    fn cmp(&self, other: &Self) -> Ordering {
        let base = (self.kind, self.start, self.end)
            .cmp(&(other.kind, other.start, other.end));
        if base != Ordering::Equal {
            return base;
        }
        if self.parent.is_none() && other.parent.is_none() {
            Ordering::Equal
        } else {
            self.parent.cmp(&other.parent)
        }
    }
}

impl fmt::Display for Snarl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// One step of a walk: an oriented node, or a whole child snarl.
///
/// The snarl carried by a snarl visit holds boundary info only (see
/// [`transfer_boundary_info`]); resolve it against a manager with
/// `SnarlManager::manage` to get at the canonical record.
#[derive(Debug, Clone, Copy)]
pub enum Visit {
    Node { id: NodeId, backward: bool },
    Snarl { snarl: Snarl, backward: bool },
}

impl Visit {
    pub fn node<T: Into<NodeId>>(id: T, backward: bool) -> Visit {
        Visit::Node {
            id: id.into(),
            backward,
        }
    }

    /// A visit to `snarl`, carrying its boundary info only.
    pub fn snarl(snarl: &Snarl, backward: bool) -> Visit {
        let mut boundary = Snarl::default();
        transfer_boundary_info(snarl, &mut boundary);
        Visit::Snarl {
            snarl: boundary,
            backward,
        }
    }

    #[inline]
    pub fn backward(&self) -> bool {
        match self {
            Visit::Node { backward, .. } => *backward,
            Visit::Snarl { backward, .. } => *backward,
        }
    }

    #[inline]
    pub fn as_snarl(&self) -> Option<&Snarl> {
        match self {
            Visit::Node { .. } => None,
            Visit::Snarl { snarl, .. } => Some(snarl),
        }
    }

    #[inline]
    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            Visit::Node { id, .. } => Some(*id),
            Visit::Snarl { .. } => None,
        }
    }

    /// The same step taken in the opposite direction. For a snarl visit
    /// this swaps the roles of start and end without touching the stored
    /// boundary pair, so canonical key lookups still succeed.
    pub fn reverse(self) -> Visit {
        match self {
            Visit::Node { id, backward } => Visit::Node {
                id,
                backward: !backward,
            },
            Visit::Snarl { snarl, backward } => Visit::Snarl {
                snarl,
                backward: !backward,
            },
        }
    }

    /// The node side this visit exits through.
    pub fn to_right_side(&self) -> NodeSide {
        match *self {
            Visit::Node { id, backward } => NodeSide::new(id, !backward),
            Visit::Snarl {
                snarl,
                backward: false,
            } => NodeSide::new(snarl.end.id(), !snarl.end.is_reverse()),
            Visit::Snarl {
                snarl,
                backward: true,
            } => NodeSide::new(snarl.start.id(), snarl.start.is_reverse()),
        }
    }

    /// The node side this visit is entered through.
    pub fn to_left_side(&self) -> NodeSide {
        match *self {
            Visit::Node { id, backward } => NodeSide::new(id, backward),
            Visit::Snarl {
                snarl,
                backward: false,
            } => NodeSide::new(snarl.start.id(), snarl.start.is_reverse()),
            Visit::Snarl {
                snarl,
                backward: true,
            } => NodeSide::new(snarl.end.id(), !snarl.end.is_reverse()),
        }
    }
}

impl PartialEq for Visit {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Visit::Node { id: a, backward: ab },
                Visit::Node { id: b, backward: bb },
            ) => a == b && ab == bb,
            (
                Visit::Snarl {
                    snarl: a,
                    backward: ab,
                },
                Visit::Snarl {
                    snarl: b,
                    backward: bb,
                },
            ) => ab == bb && a == b,
            _ => false,
        }
    }
}

impl Eq for Visit {}

impl PartialOrd for Visit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Visit {
    fn cmp(&self, other: &Self) -> Ordering {
        // Snarl visits sort under node ID zero, the one ID no real node
        // may use.
        fn sort_key(v: &Visit) -> (NodeId, Option<Snarl>, bool) {
            match *v {
                Visit::Node { id, backward } => (id, None, backward),
                Visit::Snarl { snarl, backward } => {
                    (NodeId::from(0), Some(snarl), backward)
                }
            }
        }
        sort_key(self).cmp(&sort_key(other))
    }
}

impl fmt::Display for Visit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visit::Node { id, .. } => write!(f, "{}", id)?,
            Visit::Snarl { snarl, .. } => write!(f, "{}", snarl)?,
        }
        write!(f, " {}", if self.backward() { "rev" } else { "fwd" })
    }
}

/// An ordered sequence of visits describing one walk through a snarl.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct SnarlTraversal {
    pub visits: Vec<Visit>,
}

impl SnarlTraversal {
    pub fn new(visits: Vec<Visit>) -> SnarlTraversal {
        SnarlTraversal { visits }
    }

    /// The same walk in the opposite direction.
    pub fn reverse(&self) -> SnarlTraversal {
        SnarlTraversal {
            visits: self.visits.iter().rev().map(|v| v.reverse()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use quickcheck::{Arbitrary, Gen, QuickCheck};

    fn snarl(start: (u64, bool), end: (u64, bool)) -> Snarl {
        Snarl::new(
            Handle::new(start.0, start.1),
            Handle::new(end.0, end.1),
            SnarlType::Ultrabubble,
        )
    }

    impl Arbitrary for Visit {
        fn arbitrary(g: &mut Gen) -> Visit {
            let id = u64::arbitrary(g) % 1000 + 1;
            let backward = bool::arbitrary(g);
            if bool::arbitrary(g) {
                Visit::node(id, backward)
            } else {
                let other = u64::arbitrary(g) % 1000 + 1;
                let s = snarl(
                    (id, bool::arbitrary(g)),
                    (other, bool::arbitrary(g)),
                );
                Visit::snarl(&s, backward)
            }
        }
    }

    fn reverse_is_involution(v: Visit) -> bool {
        v.reverse().reverse() == v
    }

    fn reversed_right_side_is_left_side(v: Visit) -> bool {
        v.reverse().to_right_side() == v.to_left_side()
    }

    #[test]
    fn visit_reverse_round_trips() {
        QuickCheck::new()
            .tests(1000)
            .quickcheck(reverse_is_involution as fn(Visit) -> bool);
    }

    #[test]
    fn visit_sides_mirror_under_reverse() {
        QuickCheck::new()
            .tests(1000)
            .quickcheck(reversed_right_side_is_left_side as fn(Visit) -> bool);
    }

    #[test]
    fn node_visit_sides() {
        let fwd = Visit::node(7u64, false);
        assert_eq!(fwd.to_right_side(), NodeSide::new(7u64, true));
        assert_eq!(fwd.to_left_side(), NodeSide::new(7u64, false));

        let rev = Visit::node(7u64, true);
        assert_eq!(rev.to_right_side(), NodeSide::new(7u64, false));
        assert_eq!(rev.to_left_side(), NodeSide::new(7u64, true));
    }

    #[test]
    fn snarl_visit_sides() {
        let s = snarl((2, false), (5, false));

        let fwd = Visit::snarl(&s, false);
        assert_eq!(fwd.to_right_side(), NodeSide::new(5u64, true));
        assert_eq!(fwd.to_left_side(), NodeSide::new(2u64, false));

        let rev = Visit::snarl(&s, true);
        assert_eq!(rev.to_right_side(), NodeSide::new(2u64, false));
        assert_eq!(rev.to_left_side(), NodeSide::new(5u64, true));
    }

    #[test]
    fn transfer_copies_boundaries_only() {
        let mut from = snarl((2, false), (5, true));
        from.kind = SnarlType::Unary;
        from.start_end_reachable = true;

        let mut to = Snarl::default();
        transfer_boundary_info(&from, &mut to);

        assert_eq!(to.start, from.start);
        assert_eq!(to.end, from.end);
        assert_eq!(to.kind, SnarlType::Unclassified);
        assert!(!to.start_end_reachable);
    }

    #[test]
    fn snarl_equality_ignores_connectivity() {
        let a = snarl((2, false), (5, false));
        let mut b = a;
        b.start_end_reachable = true;
        assert_eq!(a, b);
    }

    #[test]
    fn snarl_equality_parent_rule() {
        let a = snarl((2, false), (5, false));
        let mut b = a;
        assert_eq!(a, b);

        // A parent on either side makes parents participate.
        b.parent = Some((Handle::new(1u64, false), Handle::new(8u64, false)));
        assert_ne!(a, b);

        let mut c = a;
        c.parent = b.parent;
        assert_eq!(b, c);
    }

    #[test]
    fn traversal_reverse_round_trips() {
        let s = snarl((3, false), (6, false));
        let walk = SnarlTraversal::new(vec![
            Visit::node(2u64, false),
            Visit::snarl(&s, false),
            Visit::node(7u64, true),
        ]);

        let back = walk.reverse();
        assert_eq!(back.visits[0], Visit::node(7u64, false));
        assert_eq!(back.visits[2], Visit::node(2u64, true));
        assert_eq!(back.reverse(), walk);
    }
}

/*!

The decomposition manager: owns the canonical snarl records and the
indexes over them, and answers the tree, chain, content, and traversal
queries one level of the decomposition at a time.

Records live in an arena `Vec` and every derived index stores positions
into it, keyed by the canonical boundary pair, so records never need to
move and `flip` is a pure re-key operation.

*/

use fnv::{FnvHashMap, FnvHashSet};

use rayon::prelude::*;

use std::collections::VecDeque;

#[allow(unused_imports)]
use log::{debug, trace};

use crate::chain::Chain;
use crate::error::SnarlError;
use crate::handle::{Edge, NodeId};
use crate::handlegraph::HandleGraph;
use crate::netgraph::NetGraph;
use crate::snarl::{Snarl, SnarlKey, Visit};

/// Indexes a precomputed set of snarl records for parent/child, chain,
/// boundary, and content queries.
///
/// After construction every query takes `&self` and is safe to run from
/// multiple threads at once; [`flip`](SnarlManager::flip) is the only
/// mutator and takes `&mut self`.
pub struct SnarlManager {
    snarls: Vec<Snarl>,
    roots: Vec<usize>,
    index_of: FnvHashMap<SnarlKey, usize>,
    parent: FnvHashMap<SnarlKey, Option<usize>>,
    children: FnvHashMap<SnarlKey, Vec<usize>>,
    snarl_into: FnvHashMap<(NodeId, bool), usize>,
}

impl SnarlManager {
    /// Drain a stream of snarl records and index them. The records may
    /// arrive in any order; parent back-pointers are fixed up in a second
    /// pass.
    pub fn new<I>(records: I) -> SnarlManager
    where
        I: IntoIterator<Item = Snarl>,
    {
        let mut manager = SnarlManager {
            snarls: records.into_iter().collect(),
            roots: Vec::new(),
            index_of: FnvHashMap::default(),
            parent: FnvHashMap::default(),
            children: FnvHashMap::default(),
            snarl_into: FnvHashMap::default(),
        };
        manager.build_indexes();
        manager
    }

    fn build_indexes(&mut self) {
        debug!("indexing {} snarls", self.snarls.len());

        self.roots.clear();
        self.index_of.clear();
        self.parent.clear();
        self.children.clear();
        self.snarl_into.clear();

        for i in 0..self.snarls.len() {
            let snarl = self.snarls[i];
            trace!("snarl {}", snarl);

            // Remember where each snarl is.
            self.index_of.insert(snarl.key(), i);

            if let Some(parent_key) = snarl.parent {
                self.children.entry(parent_key).or_default().push(i);
            } else {
                self.roots.push(i);
                self.parent.insert(snarl.key(), None);
            }

            // Both inward-facing boundaries lead into this snarl.
            self.snarl_into
                .insert((snarl.start.id(), snarl.start.is_reverse()), i);
            self.snarl_into
                .insert((snarl.end.id(), !snarl.end.is_reverse()), i);
        }

        for i in 0..self.snarls.len() {
            let key = self.snarls[i].key();
            if let Some(child_ixs) = self.children.get(&key) {
                for &child in child_ixs {
                    self.parent.insert(self.snarls[child].key(), Some(i));
                }
            } else {
                // Every snarl gets a children entry, even an empty one.
                self.children.insert(key, Vec::new());
            }
        }
    }

    /// The children of `snarl`, or the top-level snarls when given `None`.
    pub fn children_of(&self, snarl: Option<&Snarl>) -> Vec<&Snarl> {
        match snarl {
            None => self.roots.iter().map(|&i| &self.snarls[i]).collect(),
            Some(s) => self.children[&s.key()]
                .iter()
                .map(|&i| &self.snarls[i])
                .collect(),
        }
    }

    /// The snarl immediately containing `snarl`, or `None` at the top
    /// level.
    pub fn parent_of(&self, snarl: &Snarl) -> Option<&Snarl> {
        self.parent[&snarl.key()].map(|i| &self.snarls[i])
    }

    pub fn is_leaf(&self, snarl: &Snarl) -> bool {
        self.children[&snarl.key()].is_empty()
    }

    pub fn is_root(&self, snarl: &Snarl) -> bool {
        self.parent[&snarl.key()].is_none()
    }

    pub fn top_level_snarls(&self) -> Vec<&Snarl> {
        self.roots.iter().map(|&i| &self.snarls[i]).collect()
    }

    pub fn for_each_top_level_snarl<F>(&self, mut visitor: F)
    where
        F: FnMut(&Snarl),
    {
        for &ix in &self.roots {
            visitor(&self.snarls[ix]);
        }
    }

    /// Visit every top-level snarl from a worker pool. The visitor must
    /// be callable from multiple threads; callback order is unspecified.
    pub fn for_each_top_level_snarl_parallel<F>(&self, visitor: F)
    where
        F: Fn(&Snarl) + Send + Sync,
    {
        self.roots
            .par_iter()
            .for_each(|&ix| visitor(&self.snarls[ix]));
    }

    /// Visit every snarl, parents before children.
    pub fn for_each_snarl_preorder<F>(&self, mut visitor: F)
    where
        F: FnMut(&Snarl),
    {
        fn process<F: FnMut(&Snarl)>(
            manager: &SnarlManager,
            snarl: &Snarl,
            visitor: &mut F,
        ) {
            visitor(snarl);
            for child in manager.children_of(Some(snarl)) {
                process(manager, child, visitor);
            }
        }

        for &ix in &self.roots {
            process(self, &self.snarls[ix], &mut visitor);
        }
    }

    /// The snarl entered when traversing node `id` in the given
    /// orientation, if any.
    pub fn into_which_snarl<T: Into<NodeId>>(
        &self,
        id: T,
        reverse: bool,
    ) -> Option<&Snarl> {
        self.snarl_into
            .get(&(id.into(), reverse))
            .map(|&i| &self.snarls[i])
    }

    /// The snarl a visit reads into: the canonical record for a snarl
    /// visit, or the boundary lookup for a node visit.
    pub fn into_which_snarl_visit(&self, visit: &Visit) -> Option<&Snarl> {
        match visit {
            Visit::Snarl { snarl, .. } => self.manage(snarl).ok(),
            Visit::Node { id, backward } => {
                self.into_which_snarl(*id, *backward)
            }
        }
    }

    /// Resolve a snarl passed by value (for example one carried in a
    /// visit) to the canonical record owned by this manager.
    pub fn manage(&self, not_owned: &Snarl) -> Result<&Snarl, SnarlError> {
        match self.index_of.get(&not_owned.key()) {
            Some(&ix) => Ok(&self.snarls[ix]),
            None => Err(SnarlError::Misowned {
                start: not_owned.start,
                end: not_owned.end,
            }),
        }
    }

    /// The snarl sharing this snarl's start node from the outside, if
    /// any. A unary snarl looks out its start and sees itself, which does
    /// not count.
    pub fn snarl_sharing_start(&self, here: &Snarl) -> Option<&Snarl> {
        let next =
            self.into_which_snarl(here.start.id(), !here.start.is_reverse())?;
        if next.key() == here.key() {
            None
        } else {
            Some(next)
        }
    }

    /// The snarl sharing this snarl's end node from the outside, if any.
    pub fn snarl_sharing_end(&self, here: &Snarl) -> Option<&Snarl> {
        let next =
            self.into_which_snarl(here.end.id(), here.end.is_reverse())?;
        if next.key() == here.key() {
            None
        } else {
            Some(next)
        }
    }

    pub fn in_nontrivial_chain(&self, here: &Snarl) -> bool {
        self.snarl_sharing_start(here).is_some()
            || self.snarl_sharing_end(here).is_some()
    }

    /// The next visit along the chain, or `None` at the chain's end.
    ///
    /// Panics if `here` is not a snarl visit or references a snarl this
    /// manager does not own.
    pub fn next_in_chain(&self, here: &Visit) -> Option<Visit> {
        let here_snarl = self.canonical(here);

        let next = if here.backward() {
            self.snarl_sharing_start(here_snarl)?
        } else {
            self.snarl_sharing_end(here_snarl)?
        };

        let next_backward = if here.backward() {
            // We came out our start, so the next thing is also backward
            // as long as its end matches our start.
            next.end.id() == here_snarl.start.id()
        } else {
            // We came out our end, so the next thing is backward if its
            // start doesn't match our end.
            next.start.id() != here_snarl.end.id()
        };

        Some(Visit::snarl(next, next_backward))
    }

    /// The previous visit along the chain, or `None` at the chain's
    /// start.
    pub fn prev_in_chain(&self, here: &Visit) -> Option<Visit> {
        self.next_in_chain(&here.reverse()).map(Visit::reverse)
    }

    /// Group the children of `snarl` (or the top-level snarls, for
    /// `None`) into maximal chains. Every child lands in exactly one
    /// chain, and consecutive chain members share a boundary node.
    pub fn chains_of(&self, snarl: Option<&Snarl>) -> Vec<Chain<'_>> {
        // Track chain-traversal visits so each chain is walked once.
        let mut seen: FnvHashSet<SnarlKey> = FnvHashSet::default();
        let mut to_return = Vec::new();

        for child in self.children_of(snarl) {
            if seen.contains(&child.key()) {
                // Already in a chain.
                continue;
            }

            let mut chain: VecDeque<&Snarl> = VecDeque::new();
            chain.push_back(child);
            seen.insert(child.key());

            let here = Visit::snarl(child, false);

            let mut walk = self.prev_in_chain(&here);
            while let Some(visit) = walk {
                let managed = self.canonical(&visit);
                chain.push_front(managed);
                seen.insert(managed.key());
                walk = self.prev_in_chain(&visit);
            }

            let mut walk = self.next_in_chain(&here);
            while let Some(visit) = walk {
                let managed = self.canonical(&visit);
                chain.push_back(managed);
                seen.insert(managed.key());
                walk = self.next_in_chain(&visit);
            }

            to_return.push(chain.into_iter().collect());
        }

        // No chain starts at a snarl inside another chain, and every
        // child is in a chain; since chains are linear, that's all of
        // them.
        to_return
    }

    /// The canonical record behind a chain-walk visit.
    fn canonical(&self, visit: &Visit) -> &Snarl {
        match visit.as_snarl() {
            Some(snarl) => self
                .manage(snarl)
                .unwrap_or_else(|err| panic!("chain walk: {}", err)),
            None => panic!("chain walk requires a snarl visit"),
        }
    }

    /// Reverse the orientation a snarl is stored in: swap and negate its
    /// boundaries, then move the parent, children, and position entries
    /// over to the new key. The boundary index is invariant under this.
    pub fn flip(&mut self, snarl: &Snarl) -> Result<(), SnarlError> {
        let old_key = snarl.key();
        let ix = match self.index_of.get(&old_key) {
            Some(&ix) => ix,
            None => {
                return Err(SnarlError::Misowned {
                    start: snarl.start,
                    end: snarl.end,
                })
            }
        };

        {
            let to_flip = &mut self.snarls[ix];
            let old_start = to_flip.start;
            to_flip.start = to_flip.end.flip();
            to_flip.end = old_start.flip();
        }
        let new_key = self.snarls[ix].key();

        if let Some(entry) = self.parent.remove(&old_key) {
            self.parent.insert(new_key, entry);
        }
        if let Some(entry) = self.children.remove(&old_key) {
            self.children.insert(new_key, entry);
        }
        self.index_of.remove(&old_key);
        self.index_of.insert(new_key, ix);

        Ok(())
    }

    /// The nodes and edges inside `snarl`, hopping over child snarls:
    /// children contribute their boundary nodes but nothing interior.
    /// Edges touching the boundaries are always included; the boundary
    /// nodes themselves only when asked for.
    pub fn shallow_contents<G: HandleGraph>(
        &self,
        snarl: &Snarl,
        graph: &G,
        include_boundary_nodes: bool,
    ) -> (FnvHashSet<NodeId>, FnvHashSet<Edge>) {
        let mut nodes: FnvHashSet<NodeId> = FnvHashSet::default();
        let mut edges: FnvHashSet<Edge> = FnvHashSet::default();

        let mut already_stacked: FnvHashSet<NodeId> = FnvHashSet::default();
        let mut stack: Vec<NodeId> = Vec::new();

        // Paths terminate on the boundary nodes.
        already_stacked.insert(snarl.start.id());
        already_stacked.insert(snarl.end.id());

        if include_boundary_nodes {
            nodes.insert(snarl.start.id());
            nodes.insert(snarl.end.id());
        }

        stack_boundary_edges(
            snarl,
            graph,
            &mut stack,
            &mut already_stacked,
            &mut edges,
        );

        // DFS over the interior, skipping over any child snarls; tips are
        // discovered too since valid walks don't matter here.
        while let Some(node_id) = stack.pop() {
            nodes.insert(node_id);

            let forward_snarl = self.into_which_snarl(node_id, false);
            let backward_snarl = self.into_which_snarl(node_id, true);

            if let Some(child) = forward_snarl {
                // This node points into a child; stack up the node on the
                // opposite side rather than traversing it.
                let other_id = if child.start.id() == node_id {
                    child.end.id()
                } else {
                    child.start.id()
                };
                if already_stacked.insert(other_id) {
                    stack.push(other_id);
                }
            }

            if let Some(child) = backward_snarl {
                let other_id = if child.end.id() == node_id {
                    child.start.id()
                } else {
                    child.end.id()
                };
                if already_stacked.insert(other_id) {
                    stack.push(other_id);
                }
            }

            for Edge(from, to) in graph.edges_of_node(node_id) {
                let (traverse, far_id) = if from.id() == node_id {
                    // Does this edge point away from a child interior?
                    (
                        (from.is_reverse() && backward_snarl.is_none())
                            || (!from.is_reverse()
                                && forward_snarl.is_none()),
                        to.id(),
                    )
                } else {
                    (
                        (to.is_reverse() && forward_snarl.is_none())
                            || (!to.is_reverse()
                                && backward_snarl.is_none()),
                        from.id(),
                    )
                };

                if traverse {
                    edges.insert(Edge::edge_handle(from, to));
                    if already_stacked.insert(far_id) {
                        stack.push(far_id);
                    }
                }
            }
        }

        (nodes, edges)
    }

    /// The nodes and edges inside `snarl`, descendants included.
    pub fn deep_contents<G: HandleGraph>(
        &self,
        snarl: &Snarl,
        graph: &G,
        include_boundary_nodes: bool,
    ) -> (FnvHashSet<NodeId>, FnvHashSet<Edge>) {
        let mut nodes: FnvHashSet<NodeId> = FnvHashSet::default();
        let mut edges: FnvHashSet<Edge> = FnvHashSet::default();

        let mut already_stacked: FnvHashSet<NodeId> = FnvHashSet::default();
        let mut stack: Vec<NodeId> = Vec::new();

        already_stacked.insert(snarl.start.id());
        already_stacked.insert(snarl.end.id());

        if include_boundary_nodes {
            nodes.insert(snarl.start.id());
            nodes.insert(snarl.end.id());
        }

        stack_boundary_edges(
            snarl,
            graph,
            &mut stack,
            &mut already_stacked,
            &mut edges,
        );

        while let Some(node_id) = stack.pop() {
            nodes.insert(node_id);

            for Edge(from, to) in graph.edges_of_node(node_id) {
                edges.insert(Edge::edge_handle(from, to));
                let far_id =
                    if from.id() == node_id { to.id() } else { from.id() };
                if already_stacked.insert(far_id) {
                    stack.push(far_id);
                }
            }
        }

        (nodes, edges)
    }

    /// The immediate successors of `visit` inside `in_snarl`: node visits
    /// for plain neighbors, snarl visits for child boundaries, oriented so
    /// the entering boundary is the attached node.
    pub fn visits_right<G: HandleGraph>(
        &self,
        visit: &Visit,
        graph: &G,
        in_snarl: &Snarl,
    ) -> Result<Vec<Visit>, SnarlError> {
        let mut to_return = Vec::new();

        let right_side = visit.to_right_side();
        trace!("look right from {}", visit);

        if visit.as_snarl().is_some() {
            // Leaving a child snarl: another child may share this
            // boundary node in the direction we're going.
            if let Some(child) =
                self.into_which_snarl(right_side.id, !right_side.is_end)
            {
                let reenters = self
                    .into_which_snarl(right_side.id, right_side.is_end)
                    .map_or(false, |s| s.key() == in_snarl.key());

                if child.key() != in_snarl.key() && !reenters {
                    // We leave the one child and immediately enter
                    // another; don't explore inside it.
                    let backward = if right_side.id == child.end.id() {
                        true
                    } else {
                        assert_eq!(right_side.id, child.start.id());
                        false
                    };
                    to_return.push(Visit::snarl(child, backward));
                    return Ok(to_return);
                }
            }
        }

        for attached in graph.attached_sides(right_side) {
            trace!("\tfound attached side {}", attached);

            let child = self
                .into_which_snarl(attached.id, attached.is_end)
                .filter(|c| {
                    c.key() != in_snarl.key()
                        && self
                            .into_which_snarl(attached.id, !attached.is_end)
                            .map_or(true, |other| {
                                other.key() != in_snarl.key()
                            })
                });

            match child {
                Some(child) => {
                    if attached.id == child.start.id() {
                        // Reading into the start of the child.
                        to_return.push(Visit::snarl(child, false));
                    } else if attached.id == child.end.id() {
                        // Reading into the end of the child.
                        to_return.push(Visit::snarl(child, true));
                    } else {
                        return Err(SnarlError::InvariantViolation {
                            start: child.start,
                            end: child.end,
                        });
                    }
                }
                None => {
                    to_return.push(Visit::node(attached.id, attached.is_end))
                }
            }
        }

        Ok(to_return)
    }

    /// The immediate predecessors of `visit` inside `in_snarl`, oriented
    /// to be read left of it.
    pub fn visits_left<G: HandleGraph>(
        &self,
        visit: &Visit,
        graph: &G,
        in_snarl: &Snarl,
    ) -> Result<Vec<Visit>, SnarlError> {
        let mut to_return =
            self.visits_right(&visit.reverse(), graph, in_snarl)?;
        for v in to_return.iter_mut() {
            *v = v.reverse();
        }
        Ok(to_return)
    }

    /// The net graph of `snarl` over `graph`, with child chains and unary
    /// children collapsed to single nodes.
    pub fn net_graph_of<'a, G: HandleGraph>(
        &self,
        snarl: &Snarl,
        graph: &'a G,
        use_internal_connectivity: bool,
    ) -> NetGraph<'a, G> {
        NetGraph::new(
            Visit::node(snarl.start.id(), snarl.start.is_reverse()),
            Visit::node(snarl.end.id(), snarl.end.is_reverse()),
            &self.chains_of(Some(snarl)),
            graph,
            use_internal_connectivity,
        )
    }

    /// Map from inward-facing boundary, in both orientations, to snarl.
    pub fn snarl_boundary_index(&self) -> FnvHashMap<(NodeId, bool), &Snarl> {
        let mut index = FnvHashMap::default();
        for snarl in &self.snarls {
            index.insert(
                (snarl.start.id(), snarl.start.is_reverse()),
                snarl,
            );
            index.insert((snarl.end.id(), !snarl.end.is_reverse()), snarl);
        }
        index
    }

    /// Map from inward-facing start boundary to snarl.
    pub fn snarl_start_index(&self) -> FnvHashMap<(NodeId, bool), &Snarl> {
        let mut index = FnvHashMap::default();
        for snarl in &self.snarls {
            index.insert(
                (snarl.start.id(), snarl.start.is_reverse()),
                snarl,
            );
        }
        index
    }

    /// Map from inward-facing end boundary to snarl.
    pub fn snarl_end_index(&self) -> FnvHashMap<(NodeId, bool), &Snarl> {
        let mut index = FnvHashMap::default();
        for snarl in &self.snarls {
            index.insert((snarl.end.id(), !snarl.end.is_reverse()), snarl);
        }
        index
    }
}

/// Stack up the nodes one edge inside the snarl from both boundaries,
/// admitting the edges that point in across them.
fn stack_boundary_edges<G: HandleGraph>(
    snarl: &Snarl,
    graph: &G,
    stack: &mut Vec<NodeId>,
    already_stacked: &mut FnvHashSet<NodeId>,
    edges: &mut FnvHashSet<Edge>,
) {
    let start = snarl.start;
    let end = snarl.end;

    for Edge(from, to) in graph.edges_of_node(start.id()) {
        if from.id() == start.id() && from.is_reverse() == start.is_reverse()
        {
            edges.insert(Edge::edge_handle(from, to));
            if already_stacked.insert(to.id()) {
                stack.push(to.id());
            }
        } else if to.id() == start.id()
            && to.is_reverse() != start.is_reverse()
        {
            edges.insert(Edge::edge_handle(from, to));
            if already_stacked.insert(from.id()) {
                stack.push(from.id());
            }
        }
    }

    for Edge(from, to) in graph.edges_of_node(end.id()) {
        if from.id() == end.id() && from.is_reverse() != end.is_reverse() {
            edges.insert(Edge::edge_handle(from, to));
            if already_stacked.insert(to.id()) {
                stack.push(to.id());
            }
        } else if to.id() == end.id() && to.is_reverse() == end.is_reverse()
        {
            edges.insert(Edge::edge_handle(from, to));
            if already_stacked.insert(from.id()) {
                stack.push(from.id());
            }
        }
    }
}

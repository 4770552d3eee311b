/*!

A handle-graph view of one snarl's interior in which each child chain and
each unary child snarl appears as a single node.

Ordinary content nodes pass straight through to the backing graph. A
chain is represented by its inward-facing start handle; any edge arriving
at the chain's tail is rewritten to arrive at its head, and the edges a
chain node offers are derived from its connectivity summary rather than
read from storage. The view is bounded: reading outward through the
snarl's own boundaries finds nothing.

*/

use fnv::{FnvHashMap, FnvHashSet};

use std::collections::VecDeque;

#[allow(unused_imports)]
use log::trace;

use crate::chain::{self, Chain};
use crate::error::SnarlError;
use crate::handle::{Handle, NodeId};
use crate::handlegraph::HandleGraph;
use crate::snarl::{Snarl, SnarlType, Visit};

pub struct NetGraph<'a, G: HandleGraph> {
    graph: &'a G,
    start: Handle,
    end: Handle,
    use_internal_connectivity: bool,
    /// Inward-facing start handles of unary children.
    unary_boundaries: FnvHashSet<Handle>,
    /// Inward-facing start handle of each chain to its inward-facing end
    /// handle.
    chain_ends_by_start: FnvHashMap<Handle, Handle>,
    /// Flipped end handle of each chain to its flipped start handle, for
    /// warping edges that arrive at a chain's tail back to its head.
    chain_end_rewrites: FnvHashMap<Handle, Handle>,
    /// Node ID of each child's start to its traversable connectivity
    /// `(start_start, end_end, start_end)`.
    connectivity: FnvHashMap<NodeId, (bool, bool, bool)>,
}

fn boundary_handle<G: HandleGraph>(graph: &G, visit: &Visit) -> Handle {
    match visit {
        Visit::Node { id, backward } => graph.get_handle(*id, *backward),
        Visit::Snarl { .. } => {
            panic!("net graph boundaries must be node visits")
        }
    }
}

impl<'a, G: HandleGraph> NetGraph<'a, G> {
    /// Build the view of the snarl bounded by `start` and `end`, with
    /// `child_chains_mixed` as produced by `chains_of`: real chains plus
    /// unary children wrapped in single-element chains.
    pub fn new(
        start: Visit,
        end: Visit,
        child_chains_mixed: &[Chain<'_>],
        graph: &'a G,
        use_internal_connectivity: bool,
    ) -> Self {
        let mut net = NetGraph {
            graph,
            start: boundary_handle(graph, &start),
            end: boundary_handle(graph, &end),
            use_internal_connectivity,
            unary_boundaries: FnvHashSet::default(),
            chain_ends_by_start: FnvHashMap::default(),
            chain_end_rewrites: FnvHashMap::default(),
            connectivity: FnvHashMap::default(),
        };

        for chain in child_chains_mixed {
            if chain.len() == 1 && chain[0].kind == SnarlType::Unary {
                net.add_unary_child(chain[0]);
            } else {
                net.add_chain_child(chain);
            }
        }

        net
    }

    fn add_unary_child(&mut self, unary: &Snarl) {
        let snarl_bound = self
            .graph
            .get_handle(unary.start.id(), unary.start.is_reverse());
        let snarl_id = unary.start.id();

        // In and out through the same node, opposite directions.
        assert!(unary.is_unary());

        self.unary_boundaries.insert(snarl_bound);

        if self.use_internal_connectivity {
            self.connectivity.insert(
                snarl_id,
                (
                    unary.start_self_reachable,
                    unary.end_self_reachable,
                    unary.start_end_reachable,
                ),
            );
        } else {
            // An ordinary node whose far side is distinct: no
            // turnarounds.
            self.connectivity.insert(snarl_id, (false, false, false));
        }
    }

    fn add_chain_child(&mut self, chain: &[&Snarl]) {
        let chain_start_handle =
            boundary_handle(self.graph, &chain::get_start(chain));
        let chain_end_handle =
            boundary_handle(self.graph, &chain::get_end(chain));

        // The links that let us cross the chain.
        self.chain_ends_by_start
            .insert(chain_start_handle, chain_end_handle);
        self.chain_end_rewrites.insert(
            self.graph.flip(chain_end_handle),
            self.graph.flip(chain_start_handle),
        );

        let connectivity = if self.use_internal_connectivity {
            let mut connected_left_left = false;
            let mut connected_right_right = false;
            let mut connected_left_right = true;

            for (child, backward) in chain::chain_iter(chain) {
                // Connectivity as seen in the chain's orientation of the
                // child.
                let start_self = if backward {
                    child.end_self_reachable
                } else {
                    child.start_self_reachable
                };

                if start_self {
                    // A turnaround reachable from the left.
                    connected_left_left = true;
                }
                if !child.start_end_reachable {
                    // An impediment to getting through; stop looking for
                    // turnarounds.
                    connected_left_right = false;
                    break;
                }
            }

            for (child, backward) in chain::chain_iter_rev(chain) {
                let end_self = if backward {
                    child.start_self_reachable
                } else {
                    child.end_self_reachable
                };

                if end_self {
                    // A turnaround reachable from the right.
                    connected_right_right = true;
                    break;
                }
                if !child.start_end_reachable {
                    break;
                }
            }

            (
                connected_left_left,
                connected_right_right,
                connected_left_right,
            )
        } else {
            // Act like a normal connected-through node.
            (false, false, true)
        };

        self.connectivity
            .insert(self.graph.get_id(chain_start_handle), connectivity);
    }

    /// Run the backing graph's edges off `from`, rewriting chain tails to
    /// chain heads, deduplicating on the reported handle, and optionally
    /// flipping before reporting.
    fn emit_edges(
        &self,
        from: Handle,
        go_left: bool,
        flip_reported: bool,
        seen: &mut FnvHashSet<Handle>,
        visitor: &mut dyn FnMut(Handle) -> bool,
    ) -> bool {
        self.graph.follow_edges(from, go_left, &mut |other| {
            let mut real_handle = other;
            if let Some(&head) = self.chain_end_rewrites.get(&other) {
                // Reading into the end of a chain: warp to the start.
                real_handle = head;
            } else if let Some(&head) =
                self.chain_end_rewrites.get(&self.graph.flip(other))
            {
                // Backing into the end of a chain: warp to the start.
                real_handle = self.graph.flip(head);
            }

            if flip_reported {
                real_handle = self.graph.flip(real_handle);
            }

            if seen.insert(real_handle) {
                trace!("report {} as {}", other, real_handle);
                visitor(real_handle)
            } else {
                trace!("edge to {} already seen", real_handle);
                true
            }
        })
    }
}

impl<'a, G: HandleGraph> HandleGraph for NetGraph<'a, G> {
    fn get_handle(&self, id: NodeId, is_reverse: bool) -> Handle {
        self.graph.get_handle(id, is_reverse)
    }

    fn get_id(&self, handle: Handle) -> NodeId {
        self.graph.get_id(handle)
    }

    fn get_is_reverse(&self, handle: Handle) -> bool {
        self.graph.get_is_reverse(handle)
    }

    fn flip(&self, handle: Handle) -> Handle {
        self.graph.flip(handle)
    }

    /// The net graph abstracts sequence away.
    fn get_length(&self, _handle: Handle) -> Result<usize, SnarlError> {
        Err(SnarlError::Unsupported("sequence lengths"))
    }

    /// The net graph abstracts sequence away.
    fn get_sequence(&self, _handle: Handle) -> Result<Vec<u8>, SnarlError> {
        Err(SnarlError::Unsupported("sequences"))
    }

    fn follow_edges(
        &self,
        handle: Handle,
        go_left: bool,
        visitor: &mut dyn FnMut(Handle) -> bool,
    ) -> bool {
        trace!(
            "look for edges on {} going {}",
            handle,
            if go_left { "left" } else { "right" }
        );

        // The start and end of a chain can reach the same next node;
        // edges are deduplicated on the handle they get reported as.
        let mut seen: FnvHashSet<Handle> = FnvHashSet::default();

        if (handle == self.end && !go_left)
            || (handle == self.graph.flip(self.end) && go_left)
            || (handle == self.graph.flip(self.start) && !go_left)
            || (handle == self.start && go_left)
        {
            // Reading outside of the snarl: no edges to admit to.
            return true;
        }

        if self.chain_ends_by_start.contains_key(&handle)
            || self
                .chain_ends_by_start
                .contains_key(&self.graph.flip(handle))
        {
            // A chain node; its connectivity decides what to do.
            let (connected_start_start, connected_end_end, connected_start_end) =
                self.connectivity[&self.graph.get_id(handle)];

            if self.chain_ends_by_start.contains_key(&handle) {
                // Visiting the chain forward.
                if go_left {
                    // Predecessors: how could we have left our end?
                    if connected_end_end {
                        // Anything after us, reversed, could precede us;
                        // chains after us get resolved to their heads
                        // before flipping.
                        let far = self.chain_ends_by_start[&handle];
                        if !self.emit_edges(far, false, true, &mut seen, visitor)
                        {
                            return false;
                        }
                    }
                    if connected_start_end {
                        // Straight through: look left out of the start,
                        // which is the handle we really are on.
                        if !self
                            .emit_edges(handle, true, false, &mut seen, visitor)
                        {
                            return false;
                        }
                    }
                } else {
                    // Successors.
                    if connected_start_start {
                        // Anything before us, reversed, could follow us.
                        if !self
                            .emit_edges(handle, true, true, &mut seen, visitor)
                        {
                            return false;
                        }
                    }
                    if connected_start_end {
                        // Straight through: look right out of the end.
                        let far = self.chain_ends_by_start[&handle];
                        if !self
                            .emit_edges(far, false, false, &mut seen, visitor)
                        {
                            return false;
                        }
                    }
                }
            } else {
                // Visiting the chain in reverse: flip the cases above and
                // reverse every emitted orientation.
                let far =
                    self.chain_ends_by_start[&self.graph.flip(handle)];
                if go_left {
                    if connected_start_start
                        && !self
                            .emit_edges(handle, false, true, &mut seen, visitor)
                    {
                        return false;
                    }
                    if connected_start_end
                        && !self.emit_edges(far, false, true, &mut seen, visitor)
                    {
                        return false;
                    }
                } else {
                    if connected_end_end
                        && !self
                            .emit_edges(far, false, false, &mut seen, visitor)
                    {
                        return false;
                    }
                    if connected_start_end
                        && !self
                            .emit_edges(handle, false, false, &mut seen, visitor)
                    {
                        return false;
                    }
                }
            }

            return true;
        }

        if self.unary_boundaries.contains(&handle)
            || self.unary_boundaries.contains(&self.graph.flip(handle))
        {
            // A node standing in for a unary child snarl.
            let (connected_start_start, connected_end_end, connected_start_end) =
                self.connectivity[&self.graph.get_id(handle)];
            let connected_at_all = connected_start_start
                || connected_end_end
                || connected_start_end;

            if self.unary_boundaries.contains(&handle) {
                // Pointing into the unary child.
                if go_left {
                    if !self.use_internal_connectivity
                        && !self
                            .emit_edges(handle, true, false, &mut seen, visitor)
                    {
                        return false;
                    }
                    // With internal connectivity on there is nothing we
                    // can traverse to: a forward unary boundary can't be
                    // read as a predecessor.
                } else {
                    // No real successors, but anything that can reach
                    // this child can also be left backward.
                    if connected_at_all
                        && !self
                            .emit_edges(handle, true, true, &mut seen, visitor)
                    {
                        return false;
                    }
                }
            } else {
                // Pointing out of the unary child.
                if go_left {
                    if connected_at_all
                        && !self
                            .emit_edges(handle, false, false, &mut seen, visitor)
                    {
                        return false;
                    }
                } else if !self.use_internal_connectivity
                    && !self.emit_edges(handle, false, true, &mut seen, visitor)
                {
                    return false;
                }
            }

            return true;
        }

        // An ordinary snarl content node.
        self.emit_edges(handle, go_left, false, &mut seen, visitor)
    }

    fn for_each_handle(&self, visitor: &mut dyn FnMut(Handle) -> bool) {
        // Traverse the backing graph, not this view: with internal child
        // connectivity in play, parts of the snarl can be present but
        // unreachable through the view's own edges.
        //
        // Both the heads and the tails of child chains go into the queue,
        // but only heads reach the visitor.
        let mut queue: VecDeque<Handle> = VecDeque::new();
        let mut queued: FnvHashSet<NodeId> = FnvHashSet::default();

        queue.push_back(self.start);
        queued.insert(self.graph.get_id(self.start));
        queue.push_back(self.end);
        queued.insert(self.graph.get_id(self.end));

        while let Some(mut here) = queue.pop_front() {
            if self.unary_boundaries.contains(&self.graph.flip(here))
                || self
                    .chain_ends_by_start
                    .contains_key(&self.graph.flip(here))
                || self
                    .chain_end_rewrites
                    .contains_key(&self.graph.flip(here))
            {
                // A backward-facing unary boundary, chain head, or chain
                // tail: look at it the other way around.
                here = self.graph.flip(here);
            }

            if !self.chain_end_rewrites.contains_key(&here) {
                // A real contained node or a chain head; emit it in
                // forward orientation.
                let canonical = if self.graph.get_is_reverse(here) {
                    self.graph.flip(here)
                } else {
                    here
                };
                if !visitor(canonical) {
                    break;
                }
            }

            // Backward heads and tails were flipped frontward above, so
            // only the forward memberships need checking below.

            if here != self.end
                && here != self.graph.flip(self.start)
                && !self.unary_boundaries.contains(&here)
                && !self.chain_ends_by_start.contains_key(&here)
                && !self.chain_end_rewrites.contains_key(&here)
            {
                // Normal graph to our right, inside the snarl and outside
                // any child.
                self.enqueue_edges(here, false, &mut queue, &mut queued);
            }

            if here != self.start && here != self.graph.flip(self.end) {
                // Normal graph to our left.
                self.enqueue_edges(here, true, &mut queue, &mut queued);
            }

            if let Some(&reverse_head) = self.chain_end_rewrites.get(&here) {
                // Continue right off the reverse head of this child
                // chain.
                self.enqueue_edges(reverse_head, false, &mut queue, &mut queued);
            }

            if let Some(&tail) = self.chain_ends_by_start.get(&here) {
                // Continue right off the tail of this child chain.
                self.enqueue_edges(tail, false, &mut queue, &mut queued);
            }
        }
    }
}

impl<'a, G: HandleGraph> NetGraph<'a, G> {
    fn enqueue_edges(
        &self,
        from: Handle,
        go_left: bool,
        queue: &mut VecDeque<Handle>,
        queued: &mut FnvHashSet<NodeId>,
    ) {
        self.graph.follow_edges(from, go_left, &mut |other| {
            if queued.insert(self.graph.get_id(other)) {
                queue.push_back(other);
            }
            true
        });
    }
}

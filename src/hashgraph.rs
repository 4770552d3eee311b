/*!

A `HashMap`-backed bidirected graph: fast, does nothing to reduce its
memory footprint, and convenient as the concrete graph behind the
decomposition queries.

*/

use bio::alphabets::dna;

use crate::error::SnarlError;
use crate::handle::Handle;
use crate::handlegraph::HandleGraph;

pub mod graph;
pub mod node;

pub use self::graph::HashGraph;
pub use self::node::Node;

impl HandleGraph for HashGraph {
    fn get_length(&self, handle: Handle) -> Result<usize, SnarlError> {
        Ok(self.get_node_unchecked(&handle.id()).sequence.len())
    }

    fn get_sequence(&self, handle: Handle) -> Result<Vec<u8>, SnarlError> {
        let seq: &[u8] = &self.get_node_unchecked(&handle.id()).sequence;
        if handle.is_reverse() {
            Ok(dna::revcomp(seq))
        } else {
            Ok(seq.into())
        }
    }

    fn follow_edges(
        &self,
        handle: Handle,
        go_left: bool,
        visitor: &mut dyn FnMut(Handle) -> bool,
    ) -> bool {
        let node = self.get_node_unchecked(&handle.id());

        let (neighbors, flip) = match (go_left, handle.is_reverse()) {
            (true, true) => (&node.right_edges, true),
            (true, false) => (&node.left_edges, true),
            (false, true) => (&node.left_edges, false),
            (false, false) => (&node.right_edges, false),
        };

        for &neighbor in neighbors.iter() {
            let neighbor = if flip { neighbor.flip() } else { neighbor };
            if !visitor(neighbor) {
                return false;
            }
        }
        true
    }

    fn for_each_handle(&self, visitor: &mut dyn FnMut(Handle) -> bool) {
        for id in self.graph.keys() {
            if !visitor(Handle::pack(*id, false)) {
                return;
            }
        }
    }

    #[inline]
    fn node_count(&self) -> usize {
        self.graph.len()
    }
}

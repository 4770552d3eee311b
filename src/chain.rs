/*!

Chains: maximal runs of snarls joined at shared boundary nodes, and
oriented iteration over them.

The orientation of each snarl within a chain is implicit: a snarl is
backward in its chain exactly when the node it shares with its neighbor is
not the boundary the forward traversal would lead with. The iterators here
recover that flag while walking.

*/

use crate::snarl::{Snarl, Visit};

/// A chain of snarls, as produced by `SnarlManager::chains_of`. A lone
/// snarl forms a trivial chain of length one.
pub type Chain<'a> = Vec<&'a Snarl>;

/// True when the chain's first snarl is traversed end-to-start, i.e. it
/// shares its start node with the second snarl.
pub fn start_backward(chain: &[&Snarl]) -> bool {
    if chain.len() < 2 {
        return false;
    }
    let first = chain[0];
    let second = chain[1];
    first.start.id() == second.start.id()
        || first.start.id() == second.end.id()
}

/// True when the chain's last snarl is traversed end-to-start, i.e. it
/// shares its end node with the next-to-last snarl.
pub fn end_backward(chain: &[&Snarl]) -> bool {
    if chain.len() < 2 {
        return false;
    }
    let last = chain[chain.len() - 1];
    let next_to_last = chain[chain.len() - 2];
    last.end.id() == next_to_last.start.id()
        || last.end.id() == next_to_last.end.id()
}

/// The visit bounding the chain on its left.
pub fn get_start(chain: &[&Snarl]) -> Visit {
    let first = chain[0];
    if start_backward(chain) {
        Visit::node(first.end.id(), !first.end.is_reverse())
    } else {
        Visit::node(first.start.id(), first.start.is_reverse())
    }
}

/// The visit bounding the chain on its right.
pub fn get_end(chain: &[&Snarl]) -> Visit {
    let last = chain[chain.len() - 1];
    if end_backward(chain) {
        Visit::node(last.start.id(), !last.start.is_reverse())
    } else {
        Visit::node(last.end.id(), last.end.is_reverse())
    }
}

/// Oriented iteration over a chain, yielding each snarl together with a
/// flag for whether the chain traverses it end-to-start. The backward
/// flag of each element is derived on the fly by comparing the current
/// element's trailing boundary node against the next element's leading
/// one.
#[derive(Debug, Clone)]
pub struct ChainIter<'a> {
    chain: &'a [&'a Snarl],
    go_left: bool,
    backward: bool,
    pos: usize,
    done: bool,
}

/// Iterate the chain left to right.
pub fn chain_iter<'a>(chain: &'a [&'a Snarl]) -> ChainIter<'a> {
    ChainIter {
        chain,
        go_left: false,
        backward: start_backward(chain),
        pos: 0,
        done: chain.is_empty(),
    }
}

/// Iterate the chain right to left.
pub fn chain_iter_rev<'a>(chain: &'a [&'a Snarl]) -> ChainIter<'a> {
    ChainIter {
        chain,
        go_left: true,
        backward: end_backward(chain),
        pos: chain.len().saturating_sub(1),
        done: chain.is_empty(),
    }
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = (&'a Snarl, bool);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = (self.chain[self.pos], self.backward);

        // Which node of this snarl the next snarl has to touch.
        let last_leading = if self.go_left != self.backward {
            current.0.start.id()
        } else {
            current.0.end.id()
        };

        if self.go_left {
            if self.pos == 0 {
                self.done = true;
            } else {
                self.pos -= 1;
                // Backward in the chain if its end isn't the shared node.
                self.backward = self.chain[self.pos].end.id() != last_leading;
            }
        } else {
            self.pos += 1;
            if self.pos == self.chain.len() {
                self.done = true;
            } else {
                // Backward in the chain if its start isn't the shared node.
                self.backward =
                    self.chain[self.pos].start.id() != last_leading;
            }
        }

        Some(current)
    }
}

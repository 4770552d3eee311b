/*!
Snarl and chain decomposition of bidirected variation graphs.

# Overview

This crate organizes a precomputed hierarchical decomposition of a
variation graph into nested bubbles (*snarls*) and linear runs of
adjacent bubbles (*chains*), and lets algorithms reason about one level
of that hierarchy at a time:

* [`SnarlManager`](manager::SnarlManager) owns the snarl records,
  exposes the parent/child tree and the chains, enumerates the shallow
  and deep contents of a snarl, and expands visits to their neighbors.
* [`NetGraph`](netgraph::NetGraph) presents one snarl's interior as a
  handle graph in which every child chain and unary child snarl is
  collapsed into a single node, with edges derived from the children's
  connectivity summaries rather than read from storage.

Computing the decomposition is somebody else's job: the manager consumes
a ready-made stream of records and never mutates the graph underneath.

# The graph underneath

The backing graph is abstracted by the
[`HandleGraph`](handlegraph::HandleGraph) trait, whose core types live in
[`handle`]:

* [`NodeId`](handle::NodeId) is a newtype used as a node identifier
* [`Handle`](handle::Handle) represents a specific orientation of a node
* [`Edge`](handle::Edge) is a newtype for edges in a specific order

[`HashGraph`](hashgraph::HashGraph) is a `HashMap`-based implementation,
constructible programmatically or from GFA.

*/

pub mod handle;
pub mod handlegraph;

pub mod hashgraph;

pub mod chain;
pub mod error;
pub mod manager;
pub mod netgraph;
pub mod snarl;

use snarls::error::SnarlError;
use snarls::handle::{Edge, Handle};
use snarls::handlegraph::HandleGraph;
use snarls::hashgraph::HashGraph;
use snarls::manager::SnarlManager;
use snarls::snarl::{Snarl, SnarlType};

fn h(id: u64, is_reverse: bool) -> Handle {
    Handle::new(id, is_reverse)
}

fn snarl(start: (u64, bool), end: (u64, bool)) -> Snarl {
    Snarl::new(
        h(start.0, start.1),
        h(end.0, end.1),
        SnarlType::Ultrabubble,
    )
}

fn graph_from_edges(ids: &[u64], edges: &[(Handle, Handle)]) -> HashGraph {
    let mut graph = HashGraph::new();
    for &id in ids {
        graph.create_handle(b"A", id);
    }
    for &(a, b) in edges {
        graph.create_edge(Edge(a, b));
    }
    graph
}

fn rights<G: HandleGraph>(graph: &G, handle: Handle) -> Vec<Handle> {
    let mut out = Vec::new();
    graph.follow_edges(handle, false, &mut |other| {
        out.push(other);
        true
    });
    out
}

fn lefts<G: HandleGraph>(graph: &G, handle: Handle) -> Vec<Handle> {
    let mut out = Vec::new();
    graph.follow_edges(handle, true, &mut |other| {
        out.push(other);
        true
    });
    out
}

fn all_handles<G: HandleGraph>(graph: &G) -> Vec<Handle> {
    let mut out = Vec::new();
    graph.for_each_handle(&mut |handle| {
        out.push(handle);
        true
    });
    out
}

/// A snarl with no children: the net graph is the interior bubble,
/// bounded at the snarl's own boundaries.
#[test]
fn childless_net_graph_is_bounded() {
    let top = snarl((1, false), (4, false));
    let manager = SnarlManager::new(vec![top]);
    let graph = graph_from_edges(
        &[1, 2, 3, 4],
        &[
            (h(1, false), h(2, false)),
            (h(1, false), h(3, false)),
            (h(2, false), h(4, false)),
            (h(3, false), h(4, false)),
        ],
    );

    let top_ref = *manager.manage(&top).unwrap();
    let net = manager.net_graph_of(&top_ref, &graph, false);

    assert_eq!(rights(&net, h(1, false)), vec![h(2, false), h(3, false)]);
    assert_eq!(rights(&net, h(2, false)), vec![h(4, false)]);
    assert_eq!(lefts(&net, h(4, false)), vec![h(2, false), h(3, false)]);

    // Reading out of the snarl finds nothing.
    assert!(rights(&net, h(4, false)).is_empty());
    assert!(lefts(&net, h(1, false)).is_empty());
    assert!(rights(&net, h(1, true)).is_empty());
    assert!(lefts(&net, h(4, true)).is_empty());

    // All four nodes show, in forward orientation, exactly once.
    let mut handles = all_handles(&net);
    handles.sort();
    assert_eq!(
        handles,
        vec![h(1, false), h(2, false), h(3, false), h(4, false)]
    );
    assert_eq!(net.node_count(), 4);
}

#[test]
fn net_graph_edges_are_symmetric() {
    let top = snarl((1, false), (4, false));
    let manager = SnarlManager::new(vec![top]);
    let graph = graph_from_edges(
        &[1, 2, 3, 4],
        &[
            (h(1, false), h(2, false)),
            (h(1, false), h(3, false)),
            (h(2, false), h(4, false)),
            (h(3, false), h(4, false)),
        ],
    );
    let top_ref = *manager.manage(&top).unwrap();
    let net = manager.net_graph_of(&top_ref, &graph, false);

    // For every edge h -> h' between interior handles, the flipped edge
    // flip(h') -> flip(h) is present too.
    for here in [h(2, false), h(3, false)] {
        for there in rights(&net, here) {
            assert!(
                rights(&net, net.flip(there)).contains(&net.flip(here)),
                "missing mirror of {} -> {}",
                here,
                there
            );
        }
    }
}

#[test]
fn net_graph_refuses_sequences() {
    let top = snarl((1, false), (4, false));
    let manager = SnarlManager::new(vec![top]);
    let graph = graph_from_edges(
        &[1, 2, 3, 4],
        &[(h(1, false), h(2, false)), (h(2, false), h(4, false))],
    );
    let top_ref = *manager.manage(&top).unwrap();
    let net = manager.net_graph_of(&top_ref, &graph, false);

    assert_eq!(
        net.get_length(h(2, false)),
        Err(SnarlError::Unsupported("sequence lengths"))
    );
    assert_eq!(
        net.get_sequence(h(2, false)),
        Err(SnarlError::Unsupported("sequences"))
    );

    // The handle algebra still passes through.
    assert_eq!(net.get_id(h(2, true)), 2u64.into());
    assert!(net.get_is_reverse(h(2, true)));
}

#[test]
fn follow_edges_honors_early_stop() {
    let top = snarl((1, false), (4, false));
    let manager = SnarlManager::new(vec![top]);
    let graph = graph_from_edges(
        &[1, 2, 3, 4],
        &[
            (h(1, false), h(2, false)),
            (h(1, false), h(3, false)),
            (h(2, false), h(4, false)),
            (h(3, false), h(4, false)),
        ],
    );
    let top_ref = *manager.manage(&top).unwrap();
    let net = manager.net_graph_of(&top_ref, &graph, false);

    let mut count = 0;
    let complete = net.follow_edges(h(1, false), false, &mut |_| {
        count += 1;
        false
    });
    assert!(!complete);
    assert_eq!(count, 1);
}

/// Scenario: a chain of two children collapses to its head handle.
///
/// Graph: 1 -> [2 ===bubble=== 3 ===bubble=== 4] -> 5, with the chain
/// [2-3, 3-4] as the outer snarl's only children.
fn chain_fixture(
    passable: bool,
    extra_edges: &[(Handle, Handle)],
) -> (SnarlManager, HashGraph) {
    let outer = snarl((1, false), (5, false));
    let mut a = snarl((2, false), (3, false));
    let mut b = snarl((3, false), (4, false));
    a.parent = Some(outer.key());
    b.parent = Some(outer.key());
    a.start_end_reachable = passable;
    b.start_end_reachable = passable;
    let manager = SnarlManager::new(vec![outer, a, b]);

    let mut edges = vec![
        (h(1, false), h(2, false)),
        // A's interior bubble.
        (h(2, false), h(6, false)),
        (h(2, false), h(7, false)),
        (h(6, false), h(3, false)),
        (h(7, false), h(3, false)),
        // B's interior: a direct edge and a detour.
        (h(3, false), h(4, false)),
        (h(3, false), h(8, false)),
        (h(8, false), h(4, false)),
        (h(4, false), h(5, false)),
    ];
    edges.extend_from_slice(extra_edges);

    let graph = graph_from_edges(&[1, 2, 3, 4, 5, 6, 7, 8], &edges);
    (manager, graph)
}

#[test]
fn chain_collapses_to_head() {
    let (manager, graph) = chain_fixture(true, &[]);
    let outer = *manager.manage(&snarl((1, false), (5, false))).unwrap();
    let net = manager.net_graph_of(&outer, &graph, true);

    // Only the chain's head handle is presented; its tail and interior
    // stay hidden.
    let mut handles = all_handles(&net);
    handles.sort();
    assert_eq!(handles, vec![h(1, false), h(2, false), h(5, false)]);
    assert_eq!(net.node_count(), 3);

    // An edge arriving at the chain's tail in the backing graph reads as
    // arriving at the head.
    assert_eq!(lefts(&net, h(5, false)), vec![h(2, false)]);

    // Traversing the chain node goes straight through to the far side.
    assert_eq!(rights(&net, h(2, false)), vec![h(5, false)]);
    assert_eq!(lefts(&net, h(2, false)), vec![h(1, false)]);

    // Visiting the chain in reverse mirrors everything.
    assert_eq!(rights(&net, h(2, true)), vec![h(1, true)]);
}

#[test]
fn impassable_chain_blocks_traversal() {
    let (manager, graph) = chain_fixture(false, &[]);
    let outer = *manager.manage(&snarl((1, false), (5, false))).unwrap();
    let net = manager.net_graph_of(&outer, &graph, true);

    // No connectivity through the chain and no turnarounds: the chain
    // node has no successors at all.
    assert!(rights(&net, h(2, false)).is_empty());
    assert!(lefts(&net, h(2, false)).is_empty());

    // Without internal connectivity the same chain acts like a plain
    // through-node.
    let plain = manager.net_graph_of(&outer, &graph, false);
    assert_eq!(rights(&plain, h(2, false)), vec![h(5, false)]);
}

#[test]
fn chain_turnaround_uses_connectivity() {
    let outer = snarl((1, false), (5, false));
    let mut a = snarl((2, false), (3, false));
    let mut b = snarl((3, false), (4, false));
    a.parent = Some(outer.key());
    b.parent = Some(outer.key());
    a.start_end_reachable = true;
    b.start_end_reachable = true;
    // The first child can return to its own start.
    a.start_self_reachable = true;
    let manager = SnarlManager::new(vec![outer, a, b]);

    let graph = graph_from_edges(
        &[1, 2, 3, 4, 5],
        &[
            (h(1, false), h(2, false)),
            (h(2, false), h(3, false)),
            (h(3, false), h(4, false)),
            (h(4, false), h(5, false)),
        ],
    );

    let outer_ref = *manager.manage(&outer).unwrap();
    let net = manager.net_graph_of(&outer_ref, &graph, true);

    // Successors of the chain head: straight through to 5, or turn
    // around inside and come back out over 1, reversed.
    let mut successors = rights(&net, h(2, false));
    successors.sort();
    assert_eq!(successors, vec![h(1, true), h(5, false)]);
}

#[test]
fn chain_reached_from_both_sides_reported_once() {
    // Node 1 connects to the chain's head and tail both; the dedup on
    // rewritten handles reports the chain a single time.
    let (manager, graph) =
        chain_fixture(true, &[(h(1, false), h(4, false))]);
    let outer = *manager.manage(&snarl((1, false), (5, false))).unwrap();
    let net = manager.net_graph_of(&outer, &graph, true);

    assert_eq!(rights(&net, h(1, false)), vec![h(2, false)]);
}

/// Scenario: a unary child appears as a single node with no successors.
fn unary_fixture() -> (SnarlManager, HashGraph) {
    let outer = snarl((1, false), (3, false));
    let mut unary = snarl((2, false), (2, true));
    unary.kind = SnarlType::Unary;
    unary.parent = Some(outer.key());
    let manager = SnarlManager::new(vec![outer, unary]);

    let graph = graph_from_edges(
        &[1, 2, 3, 4],
        &[
            (h(1, false), h(2, false)),
            // The unary child's interior tip.
            (h(2, false), h(4, false)),
            // The way on to the outer end attaches to 2's left side.
            (h(2, true), h(3, false)),
        ],
    );
    (manager, graph)
}

#[test]
fn unary_child_in_net_graph() {
    let (manager, graph) = unary_fixture();
    let outer = *manager.manage(&snarl((1, false), (3, false))).unwrap();
    let net = manager.net_graph_of(&outer, &graph, true);

    // The interior of the unary child (node 4) is absorbed; its inward
    // handle shows exactly once.
    let mut handles = all_handles(&net);
    handles.sort();
    assert_eq!(handles, vec![h(1, false), h(2, false), h(3, false)]);
    assert_eq!(net.node_count(), 3);

    // No successors, and with all connectivity flags down, no
    // predecessors via turn-around either.
    assert!(rights(&net, h(2, false)).is_empty());
    assert!(lefts(&net, h(2, false)).is_empty());
    assert!(lefts(&net, h(2, true)).is_empty());
}

#[test]
fn unary_child_as_plain_node() {
    let (manager, graph) = unary_fixture();
    let outer = *manager.manage(&snarl((1, false), (3, false))).unwrap();
    let net = manager.net_graph_of(&outer, &graph, false);

    // Without internal connectivity the unary boundary keeps its real
    // predecessors.
    let mut preds = lefts(&net, h(2, false));
    preds.sort();
    assert_eq!(preds, vec![h(1, false), h(3, true)]);
}

#[test]
fn reachable_unary_child_can_turn_around() {
    let outer = snarl((1, false), (3, false));
    let mut unary = snarl((2, false), (2, true));
    unary.kind = SnarlType::Unary;
    unary.parent = Some(outer.key());
    unary.start_self_reachable = true;
    let manager = SnarlManager::new(vec![outer, unary]);

    let graph = graph_from_edges(
        &[1, 2, 3, 4],
        &[
            (h(1, false), h(2, false)),
            (h(2, false), h(4, false)),
            (h(2, true), h(3, false)),
        ],
    );

    let outer_ref = *manager.manage(&outer).unwrap();
    let net = manager.net_graph_of(&outer_ref, &graph, true);

    // Whatever can reach the child can be exited backward.
    let mut successors = rights(&net, h(2, false));
    successors.sort();
    assert_eq!(successors, vec![h(1, true), h(3, false)]);
}

#[test]
fn follow_edges_is_deterministic() {
    let (manager, graph) = chain_fixture(true, &[]);
    let outer = *manager.manage(&snarl((1, false), (5, false))).unwrap();
    let net = manager.net_graph_of(&outer, &graph, true);

    let first = rights(&net, h(2, false));
    for _ in 0..10 {
        assert_eq!(rights(&net, h(2, false)), first);
    }
}

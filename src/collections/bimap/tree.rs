//! Unbalanced binary search tree over one side of [`Nodes`].
//!
//! These functions only rewire links. Node memory is owned by [`Nodes`] and is
//! allocated and freed by the map. There is no rebalancing, so the shape of a
//! tree depends only on the order of insertions and removals.

use super::nodes::{Link, Links, Nodes, Side};
use compare::Compare;

/// Where a new node would be attached: under `parent`, in the left or right child slot.
/// A `Link::Header` parent means the node becomes the root.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Placement {
    parent: Link,
    as_left: bool,
}

pub fn leftmost<S: Side, L, R>(nodes: &Nodes<L, R>, mut n: usize) -> usize {
    while let Some(c) = nodes.links::<S>(n).left {
        n = c;
    }
    n
}

pub fn rightmost<S: Side, L, R>(nodes: &Nodes<L, R>, mut n: usize) -> usize {
    while let Some(c) = nodes.links::<S>(n).right {
        n = c;
    }
    n
}

pub fn first<S: Side, L, R>(nodes: &Nodes<L, R>) -> Link {
    match nodes.root::<S>() {
        Some(root) => Link::Node(leftmost::<S, L, R>(nodes, root)),
        None => Link::Header,
    }
}

pub fn last<S: Side, L, R>(nodes: &Nodes<L, R>) -> Link {
    match nodes.root::<S>() {
        Some(root) => Link::Node(rightmost::<S, L, R>(nodes, root)),
        None => Link::Header,
    }
}

/// In-order successor. The successor of the last node is the header, and the successor of the header is the first node.
pub fn next<S: Side, L, R>(nodes: &Nodes<L, R>, at: Link) -> Link {
    let mut n = match at {
        Link::Header => return first::<S, L, R>(nodes),
        Link::Node(n) => n,
    };
    if let Some(r) = nodes.links::<S>(n).right {
        return Link::Node(leftmost::<S, L, R>(nodes, r));
    }
    loop {
        match nodes.links::<S>(n).parent {
            Link::Node(p) if nodes.links::<S>(p).right == Some(n) => n = p,
            up => return up,
        }
    }
}

/// In-order predecessor. The predecessor of the header is the last node.
pub fn prev<S: Side, L, R>(nodes: &Nodes<L, R>, at: Link) -> Link {
    let mut n = match at {
        Link::Header => return last::<S, L, R>(nodes),
        Link::Node(n) => n,
    };
    if let Some(l) = nodes.links::<S>(n).left {
        return Link::Node(rightmost::<S, L, R>(nodes, l));
    }
    loop {
        match nodes.links::<S>(n).parent {
            Link::Node(p) if nodes.links::<S>(p).left == Some(n) => n = p,
            up => return up,
        }
    }
}

/// Find where `key` would be attached. Keys equivalent to an existing key go to its right.
pub fn find_place<S, L, R, C>(nodes: &Nodes<L, R>, cmp: &C, key: &S::Value<L, R>) -> Placement
where
    S: Side,
    C: Compare<S::Value<L, R>>,
{
    let mut at = match nodes.root::<S>() {
        Some(root) => root,
        None => {
            return Placement {
                parent: Link::Header,
                as_left: false,
            }
        }
    };
    loop {
        let links = nodes.links::<S>(at);
        let as_left = cmp.compares_lt(key, nodes.value::<S>(at));
        let child = if as_left { links.left } else { links.right };
        match child {
            Some(c) => at = c,
            None => {
                return Placement {
                    parent: Link::Node(at),
                    as_left,
                }
            }
        }
    }
}

/// Attach detached node `n` at `placement`.
pub fn place_node<S: Side, L, R>(nodes: &mut Nodes<L, R>, placement: Placement, n: usize) {
    let links = nodes.links_mut::<S>(n);
    links.parent = placement.parent;
    links.left = None;
    links.right = None;
    match placement.parent {
        Link::Header => nodes.set_root::<S>(Some(n)),
        Link::Node(p) => {
            let pl = nodes.links_mut::<S>(p);
            if placement.as_left {
                pl.left = Some(n);
            } else {
                pl.right = Some(n);
            }
        }
    }
}

/// In the child slots of `parent` (or the root slot), replace `old` with `new`.
fn replace_child<S: Side, L, R>(nodes: &mut Nodes<L, R>, parent: Link, old: usize, new: Option<usize>) {
    match parent {
        Link::Header => nodes.set_root::<S>(new),
        Link::Node(p) => {
            let pl = nodes.links_mut::<S>(p);
            if pl.left == Some(old) {
                pl.left = new;
            } else {
                pl.right = new;
            }
        }
    }
}

/// Exchange the tree positions of nodes `a` and `b`. Either may be the parent of the other.
pub fn swap_nodes<S: Side, L, R>(nodes: &mut Nodes<L, R>, a: usize, b: usize) {
    if a == b {
        return;
    }
    let la = *nodes.links::<S>(a);
    let lb = *nodes.links::<S>(b);
    let swap_ix = |x: usize| {
        if x == a {
            b
        } else if x == b {
            a
        } else {
            x
        }
    };
    let swap_link = |l: Link| match l {
        Link::Node(x) => Link::Node(swap_ix(x)),
        Link::Header => Link::Header,
    };

    // Parents outside the pair see their child slot change. Siblings share a parent, which must only be fixed once.
    let mut parents = [Some(la.parent), Some(lb.parent)];
    if la.parent == lb.parent {
        parents[1] = None;
    }
    for parent in parents.into_iter().flatten() {
        match parent {
            Link::Header => {
                let root = nodes.root::<S>().map(swap_ix);
                nodes.set_root::<S>(root);
            }
            Link::Node(p) if p != a && p != b => {
                let pl = nodes.links_mut::<S>(p);
                pl.left = pl.left.map(swap_ix);
                pl.right = pl.right.map(swap_ix);
            }
            Link::Node(_) => {}
        }
    }

    // Children outside the pair get the other node as parent.
    for (links, new_parent) in [(la, b), (lb, a)] {
        for c in [links.left, links.right].into_iter().flatten() {
            if c != a && c != b {
                nodes.links_mut::<S>(c).parent = Link::Node(new_parent);
            }
        }
    }

    *nodes.links_mut::<S>(a) = Links {
        parent: swap_link(lb.parent),
        left: lb.left.map(swap_ix),
        right: lb.right.map(swap_ix),
    };
    *nodes.links_mut::<S>(b) = Links {
        parent: swap_link(la.parent),
        left: la.left.map(swap_ix),
        right: la.right.map(swap_ix),
    };
}

/// Unlink node `n` from the tree. Returns the position that followed `n` before removal.
pub fn erase<S: Side, L, R>(nodes: &mut Nodes<L, R>, n: usize) -> Link {
    let following = next::<S, L, R>(nodes, Link::Node(n));
    let links = *nodes.links::<S>(n);
    match (links.left, links.right) {
        (None, None) => replace_child::<S, L, R>(nodes, links.parent, n, None),
        (Some(c), None) | (None, Some(c)) => {
            replace_child::<S, L, R>(nodes, links.parent, n, Some(c));
            nodes.links_mut::<S>(c).parent = links.parent;
        }
        (Some(_), Some(r)) => {
            // The successor has no left child, so after the swap `n` has at most one child.
            let succ = leftmost::<S, L, R>(nodes, r);
            swap_nodes::<S, L, R>(nodes, n, succ);
            erase::<S, L, R>(nodes, n);
            return following;
        }
    }
    let links = nodes.links_mut::<S>(n);
    links.parent = Link::Header;
    links.left = None;
    links.right = None;
    following
}

/// First node whose value is not less than `key`.
pub fn lower_bound<S, L, R, C>(nodes: &Nodes<L, R>, cmp: &C, key: &S::Value<L, R>) -> Link
where
    S: Side,
    C: Compare<S::Value<L, R>>,
{
    let mut result = Link::Header;
    let mut at = nodes.root::<S>();
    while let Some(n) = at {
        let links = nodes.links::<S>(n);
        if cmp.compares_lt(nodes.value::<S>(n), key) {
            at = links.right;
        } else {
            result = Link::Node(n);
            at = links.left;
        }
    }
    result
}

/// First node whose value is greater than `key`.
pub fn upper_bound<S, L, R, C>(nodes: &Nodes<L, R>, cmp: &C, key: &S::Value<L, R>) -> Link
where
    S: Side,
    C: Compare<S::Value<L, R>>,
{
    let mut result = Link::Header;
    let mut at = nodes.root::<S>();
    while let Some(n) = at {
        let links = nodes.links::<S>(n);
        if cmp.compares_lt(key, nodes.value::<S>(n)) {
            result = Link::Node(n);
            at = links.left;
        } else {
            at = links.right;
        }
    }
    result
}

/// Node equivalent to `key`, or the header.
pub fn find<S, L, R, C>(nodes: &Nodes<L, R>, cmp: &C, key: &S::Value<L, R>) -> Link
where
    S: Side,
    C: Compare<S::Value<L, R>>,
{
    match lower_bound::<S, L, R, C>(nodes, cmp, key) {
        Link::Node(n) if !cmp.compares_lt(key, nodes.value::<S>(n)) => Link::Node(n),
        _ => Link::Header,
    }
}

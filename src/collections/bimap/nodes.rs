//! Arena of paired nodes. Each slot stores one left value and one right value
//! together with a set of tree links for each side, so a single slot is a node
//! in the left tree and in the right tree at the same time.

use std::collections::TryReserveError;
use std::fmt::Debug;

/// Target of a parent link, or a position within one tree.
///
/// `Header` is the per-side sentinel: it is the parent of the root and also
/// the end position of that side.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Link {
    Header,
    Node(usize),
}

/// Tree links for one side of a node.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Links {
    pub parent: Link,
    pub left: Option<usize>,
    pub right: Option<usize>,
}

impl Links {
    const DETACHED: Links = Links {
        parent: Link::Header,
        left: None,
        right: None,
    };
}

/// One stored pair. `links[Left::INDEX]` are the left tree links, `links[Right::INDEX]` the right tree links.
#[derive(Clone, Debug)]
pub struct Node<L, R> {
    pub left: L,
    pub right: R,
    pub links: [Links; 2],
}

mod private {
    pub trait Sealed {}
}

/// Selects one side of a [`BiMap`](super::BiMap). Implemented only by [`Left`] and [`Right`].
pub trait Side: private::Sealed + Copy + Eq + std::hash::Hash + Debug + 'static {
    /// The other side.
    type Opposite: Side<Opposite = Self>;

    /// Type of the values stored on this side, given the map's left and right value types.
    type Value<L, R>;

    #[doc(hidden)]
    const INDEX: usize;

    #[doc(hidden)]
    fn value<L, R>(node: &Node<L, R>) -> &Self::Value<L, R>;
}

/// The left side of a [`BiMap`](super::BiMap).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Left;

/// The right side of a [`BiMap`](super::BiMap).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Right;

impl private::Sealed for Left {}
impl private::Sealed for Right {}

impl Side for Left {
    type Opposite = Right;
    type Value<L, R> = L;
    const INDEX: usize = 0;

    fn value<L, R>(node: &Node<L, R>) -> &L {
        &node.left
    }
}

impl Side for Right {
    type Opposite = Left;
    type Value<L, R> = R;
    const INDEX: usize = 1;

    fn value<L, R>(node: &Node<L, R>) -> &R {
        &node.right
    }
}

#[derive(Clone, Debug)]
enum State<L, R> {
    Occupied(Node<L, R>),
    Vacant { next_free: Option<usize> },
}

#[derive(Clone, Debug)]
struct Slot<L, R> {
    generation: u32,
    state: State<L, R>,
}

/// Owner of all node memory. Tree code only rewires links, it never allocates or frees.
#[derive(Clone, Debug)]
pub struct Nodes<L, R> {
    slots: Vec<Slot<L, R>>,
    free: Option<usize>,
    roots: [Option<usize>; 2],
    len: usize,
}

impl<L, R> Default for Nodes<L, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L, R> Nodes<L, R> {
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: None,
            roots: [None, None],
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn root<S: Side>(&self) -> Option<usize> {
        self.roots[S::INDEX]
    }

    pub fn set_root<S: Side>(&mut self, root: Option<usize>) {
        self.roots[S::INDEX] = root;
    }

    /// Reserve room for `additional` more nodes beyond those a free list can supply.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        let spare = self.slots.len() - self.len;
        if additional > spare {
            self.slots.try_reserve(additional - spare)?;
        }
        Ok(())
    }

    pub fn reserve(&mut self, additional: usize) {
        let spare = self.slots.len() - self.len;
        if additional > spare {
            self.slots.reserve(additional - spare);
        }
    }

    /// Store a new pair, detached from both trees. Returns the slot index.
    pub fn alloc(&mut self, left: L, right: R) -> usize {
        let node = Node {
            left,
            right,
            links: [Links::DETACHED; 2],
        };
        self.len += 1;
        match self.free {
            Some(ix) => {
                let slot = &mut self.slots[ix];
                if let State::Vacant { next_free } = slot.state {
                    self.free = next_free;
                }
                slot.state = State::Occupied(node);
                ix
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    state: State::Occupied(node),
                });
                self.slots.len() - 1
            }
        }
    }

    /// Release a slot that has already been unlinked from both trees.
    pub fn free(&mut self, ix: usize) -> (L, R) {
        let slot = &mut self.slots[ix];
        let old = std::mem::replace(
            &mut slot.state,
            State::Vacant {
                next_free: self.free,
            },
        );
        match old {
            State::Occupied(node) => {
                slot.generation = slot.generation.wrapping_add(1);
                self.free = Some(ix);
                self.len -= 1;
                (node.left, node.right)
            }
            State::Vacant { .. } => unreachable!("slot {ix} freed twice"),
        }
    }

    pub fn generation(&self, ix: usize) -> u32 {
        self.slots[ix].generation
    }

    /// Is `ix` an occupied slot with generation `generation`?
    pub fn is_live(&self, ix: usize, generation: u32) -> bool {
        match self.slots.get(ix) {
            Some(slot) => slot.generation == generation && matches!(slot.state, State::Occupied(_)),
            None => false,
        }
    }

    pub fn node(&self, ix: usize) -> &Node<L, R> {
        match &self.slots[ix].state {
            State::Occupied(node) => node,
            State::Vacant { .. } => unreachable!("slot {ix} is vacant"),
        }
    }

    fn node_mut(&mut self, ix: usize) -> &mut Node<L, R> {
        match &mut self.slots[ix].state {
            State::Occupied(node) => node,
            State::Vacant { .. } => unreachable!("slot {ix} is vacant"),
        }
    }

    pub fn value<S: Side>(&self, ix: usize) -> &S::Value<L, R> {
        S::value(self.node(ix))
    }

    pub fn links<S: Side>(&self, ix: usize) -> &Links {
        &self.node(ix).links[S::INDEX]
    }

    pub fn links_mut<S: Side>(&mut self, ix: usize) -> &mut Links {
        &mut self.node_mut(ix).links[S::INDEX]
    }

    /// Indices of the occupied slots, in slot order.
    #[cfg(test)]
    pub fn occupied(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| matches!(s.state, State::Occupied(_)))
            .map(|(ix, _)| ix)
    }
}

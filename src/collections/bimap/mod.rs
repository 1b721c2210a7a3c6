//! [`BiMap`], an ordered bidirectional one-to-one map.
//!
//! Every stored pair has a left value and a right value. No two pairs share a left value and
//! no two pairs share a right value, so either side can be used to look up the other.
//!
//! # Implementation
//!
//! The map keeps two binary search trees, one ordered by left values and one ordered by right
//! values. Both trees are built over the same nodes: a node holds one pair plus a set of tree
//! links for each side, so moving from a pair's place in one tree to its place in the other
//! ([`Position::flip`], [`Cursor::flip`]) takes constant time.
//!
//! The trees are not rebalanced. Lookups, insertion and removal take time proportional to the
//! height of the tree, which is logarithmic for random insertion orders but linear when pairs
//! are inserted in sorted order.
//!
//! Keys are ordered by [`Compare`] comparators, [`Natural`] order by default.
//! Two values are treated as equal when neither compares less than the other.
//!
//! # Example
//!
//! ```
//!     use ordbimap::collections::BiMap;
//!     let mut capitals = BiMap::new();
//!     capitals.insert("France", "Paris");
//!     capitals.insert("England", "London");
//!     assert_eq!(capitals.get_left(&"France"), Some(&"Paris"));
//!     assert_eq!(capitals.get_right(&"London"), Some(&"England"));
//!     let paris = capitals.find_right(&"Paris");
//!     assert_eq!(capitals.get(paris.flip()), Some(&"France"));
//! ```

use compare::{natural, Compare, Natural};
use std::{
    collections::TryReserveError,
    error::Error,
    fmt,
    fmt::Debug,
    iter::FusedIterator,
    marker::PhantomData,
    mem,
};

mod nodes;
mod tree;

use nodes::{Link, Nodes};
pub use nodes::{Left, Right, Side};

/// Ordered bidirectional map with comparator `CL` for left values and `CR` for right values.
///
/// # Guide to methods
///
/// Creation: [`new`], [`with_cmp`], [`clone`](Clone::clone), [`take`]
///
/// Insertion: [`insert`], [`try_insert`], [`at_left_or_default`], [`at_right_or_default`]
///
/// Lookup: [`at_left`], [`get_left`], [`contains_left`], [`find_left`],
/// [`lower_bound_left`], [`upper_bound_left`] and their right side counterparts
///
/// Removal: [`erase_left`], [`take_left`], [`erase_left_at`], [`erase_left_range`],
/// their right side counterparts, [`retain`], [`clear`]
///
/// Positions: [`begin_left`], [`end_left`], [`begin_right`], [`end_right`],
/// [`get`], [`get_pair`], [`next`], [`prev`], [`cursor`]
///
/// Iterators: [`iter`], [`iter_left`], [`iter_right`]
///
/// [`new`]: BiMap::new
/// [`with_cmp`]: BiMap::with_cmp
/// [`take`]: BiMap::take
/// [`insert`]: BiMap::insert
/// [`try_insert`]: BiMap::try_insert
/// [`at_left_or_default`]: BiMap::at_left_or_default
/// [`at_right_or_default`]: BiMap::at_right_or_default
/// [`at_left`]: BiMap::at_left
/// [`get_left`]: BiMap::get_left
/// [`contains_left`]: BiMap::contains_left
/// [`find_left`]: BiMap::find_left
/// [`lower_bound_left`]: BiMap::lower_bound_left
/// [`upper_bound_left`]: BiMap::upper_bound_left
/// [`erase_left`]: BiMap::erase_left
/// [`take_left`]: BiMap::take_left
/// [`erase_left_at`]: BiMap::erase_left_at
/// [`erase_left_range`]: BiMap::erase_left_range
/// [`retain`]: BiMap::retain
/// [`clear`]: BiMap::clear
/// [`begin_left`]: BiMap::begin_left
/// [`end_left`]: BiMap::end_left
/// [`begin_right`]: BiMap::begin_right
/// [`end_right`]: BiMap::end_right
/// [`get`]: BiMap::get
/// [`get_pair`]: BiMap::get_pair
/// [`next`]: BiMap::next
/// [`prev`]: BiMap::prev
/// [`cursor`]: BiMap::cursor
/// [`iter`]: BiMap::iter
/// [`iter_left`]: BiMap::iter_left
/// [`iter_right`]: BiMap::iter_right
pub struct BiMap<L, R, CL = Natural<L>, CR = Natural<R>> {
    nodes: Nodes<L, R>,
    left_cmp: CL,
    right_cmp: CR,
}

impl<L: Ord, R: Ord> Default for BiMap<L, R> {
    /// Creates an empty BiMap.
    fn default() -> Self {
        Self::new()
    }
}

impl<L, R, CL, CR> Drop for BiMap<L, R, CL, CR> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<L: Clone, R: Clone, CL: Clone, CR: Clone> Clone for BiMap<L, R, CL, CR> {
    /// The clone has its own nodes, laid out in the same tree shapes as the original.
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            left_cmp: self.left_cmp.clone(),
            right_cmp: self.right_cmp.clone(),
        }
    }
}

impl<L: Ord, R: Ord> BiMap<L, R> {
    /// Returns a new, empty map using the natural order of both sides.
    #[must_use]
    pub fn new() -> Self {
        Self::with_cmp(natural(), natural())
    }
}

impl<L, R, CL, CR> BiMap<L, R, CL, CR> {
    /// Get number of pairs in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Is the map empty?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 0
    }

    /// The comparator for left values.
    pub fn left_cmp(&self) -> &CL {
        &self.left_cmp
    }

    /// The comparator for right values.
    pub fn right_cmp(&self) -> &CR {
        &self.right_cmp
    }

    /// Remove all pairs, in left order.
    pub fn clear(&mut self) {
        let mut at = tree::first::<Left, L, R>(&self.nodes);
        while let Link::Node(ix) = at {
            at = self.remove_node::<Left>(ix).0;
        }
    }

    /// Reserve capacity for at least `additional` more pairs.
    pub fn reserve(&mut self, additional: usize) {
        self.nodes.reserve(additional);
    }

    /// Try to reserve capacity for at least `additional` more pairs.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.nodes.try_reserve(additional)
    }

    /// Exchange the contents (and comparators) of two maps.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Position of the first pair in left order, or [`end_left`](Self::end_left) if the map is empty.
    #[must_use]
    pub fn begin_left(&self) -> Position<Left> {
        self.position(tree::first::<Left, L, R>(&self.nodes))
    }

    /// Position after the last pair in left order.
    #[must_use]
    pub fn end_left(&self) -> Position<Left> {
        Position::end()
    }

    /// Position of the first pair in right order, or [`end_right`](Self::end_right) if the map is empty.
    #[must_use]
    pub fn begin_right(&self) -> Position<Right> {
        self.position(tree::first::<Right, L, R>(&self.nodes))
    }

    /// Position after the last pair in right order.
    #[must_use]
    pub fn end_right(&self) -> Position<Right> {
        Position::end()
    }

    /// Returns the value at `pos`, or `None` for an end position or a position whose pair has been removed.
    #[must_use]
    pub fn get<S: Side>(&self, pos: Position<S>) -> Option<&S::Value<L, R>> {
        match self.resolve(pos) {
            Some(Link::Node(ix)) => Some(self.nodes.value::<S>(ix)),
            _ => None,
        }
    }

    /// Returns the pair at `pos` as `(left, right)`.
    #[must_use]
    pub fn get_pair<S: Side>(&self, pos: Position<S>) -> Option<(&L, &R)> {
        match self.resolve(pos) {
            Some(Link::Node(ix)) => {
                let node = self.nodes.node(ix);
                Some((&node.left, &node.right))
            }
            _ => None,
        }
    }

    /// Position following `pos` on the same side. The end position is followed by the first pair.
    ///
    /// # Panics
    ///
    /// Panics if the pair at `pos` has been removed.
    #[must_use]
    pub fn next<S: Side>(&self, pos: Position<S>) -> Position<S> {
        let at = self.live(pos);
        self.position(tree::next::<S, L, R>(&self.nodes, at))
    }

    /// Position preceding `pos` on the same side. The end position is preceded by the last pair.
    ///
    /// # Panics
    ///
    /// Panics if the pair at `pos` has been removed.
    #[must_use]
    pub fn prev<S: Side>(&self, pos: Position<S>) -> Position<S> {
        let at = self.live(pos);
        self.position(tree::prev::<S, L, R>(&self.nodes, at))
    }

    /// Get a cursor at `pos`.
    ///
    /// # Panics
    ///
    /// Panics if the pair at `pos` has been removed.
    #[must_use]
    pub fn cursor<S: Side>(&self, pos: Position<S>) -> Cursor<'_, S, L, R> {
        Cursor {
            nodes: &self.nodes,
            at: self.live(pos),
            side: PhantomData,
        }
    }

    /// Remove the pair at `pos`, returns the position that followed it in left order.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is the end position or the pair at `pos` has already been removed.
    pub fn erase_left_at(&mut self, pos: Position<Left>) -> Position<Left> {
        self.erase_at(pos)
    }

    /// Remove the pair at `pos`, returns the position that followed it in right order.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is the end position or the pair at `pos` has already been removed.
    pub fn erase_right_at(&mut self, pos: Position<Right>) -> Position<Right> {
        self.erase_at(pos)
    }

    /// Remove the pairs from `first` up to but not including `last` in left order, returns `last`.
    ///
    /// # Panics
    ///
    /// Panics if `last` does not follow `first`.
    pub fn erase_left_range(&mut self, first: Position<Left>, last: Position<Left>) -> Position<Left> {
        self.erase_range(first, last)
    }

    /// Remove the pairs from `first` up to but not including `last` in right order, returns `last`.
    ///
    /// # Panics
    ///
    /// Panics if `last` does not follow `first`.
    pub fn erase_right_range(
        &mut self,
        first: Position<Right>,
        last: Position<Right>,
    ) -> Position<Right> {
        self.erase_range(first, last)
    }

    /// Retains only the pairs specified by the predicate.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&L, &R) -> bool,
    {
        let mut at = tree::first::<Left, L, R>(&self.nodes);
        while let Link::Node(ix) = at {
            let node = self.nodes.node(ix);
            if f(&node.left, &node.right) {
                at = tree::next::<Left, L, R>(&self.nodes, at);
            } else {
                at = self.remove_node::<Left>(ix).0;
            }
        }
    }

    /// Get iterator of pairs in left order.
    pub fn iter(&self) -> Iter<'_, Left, L, R> {
        Iter::new(&self.nodes)
    }

    /// Get iterator of `(left, right)` in left order.
    pub fn iter_left(&self) -> Iter<'_, Left, L, R> {
        Iter::new(&self.nodes)
    }

    /// Get iterator of `(right, left)` in right order.
    pub fn iter_right(&self) -> Iter<'_, Right, L, R> {
        Iter::new(&self.nodes)
    }

    fn position<S: Side>(&self, at: Link) -> Position<S> {
        match at {
            Link::Header => Position::end(),
            Link::Node(ix) => Position {
                node: Some((ix, self.nodes.generation(ix))),
                side: PhantomData,
            },
        }
    }

    fn resolve<S: Side>(&self, pos: Position<S>) -> Option<Link> {
        match pos.node {
            None => Some(Link::Header),
            Some((ix, generation)) => self.nodes.is_live(ix, generation).then_some(Link::Node(ix)),
        }
    }

    fn live<S: Side>(&self, pos: Position<S>) -> Link {
        match self.resolve(pos) {
            Some(at) => at,
            None => panic!("position refers to a pair that has been removed from the BiMap"),
        }
    }

    fn erase_at<S: Side>(&mut self, pos: Position<S>) -> Position<S> {
        match self.live(pos) {
            Link::Node(ix) => {
                let following = self.remove_node::<S>(ix).0;
                self.position(following)
            }
            Link::Header => panic!("cannot erase the end position of a BiMap"),
        }
    }

    fn erase_range<S: Side>(&mut self, first: Position<S>, last: Position<S>) -> Position<S> {
        let mut at = first;
        while at != last {
            at = self.erase_at(at);
        }
        last
    }

    /// Unlink node `ix` from both trees, the opposite side first, then free it.
    /// Returns the position that followed it on side `S`, and the removed pair.
    fn remove_node<S: Side>(&mut self, ix: usize) -> (Link, (L, R)) {
        tree::erase::<S::Opposite, L, R>(&mut self.nodes, ix);
        let following = tree::erase::<S, L, R>(&mut self.nodes, ix);
        (following, self.nodes.free(ix))
    }
}

impl<L, R, CL, CR> BiMap<L, R, CL, CR>
where
    CL: Compare<L>,
    CR: Compare<R>,
{
    /// Returns a new, empty map ordered by the given comparators.
    ///
    /// # Example
    ///
    /// ```
    ///     use compare::{natural, Compare};
    ///     use ordbimap::collections::BiMap;
    ///     let mut map = BiMap::with_cmp(natural().rev(), natural());
    ///     map.insert(1, 'a');
    ///     map.insert(2, 'b');
    ///     let lefts: Vec<_> = map.iter().map(|(l, _)| *l).collect();
    ///     assert_eq!(lefts, [2, 1]);
    /// ```
    #[must_use]
    pub fn with_cmp(left_cmp: CL, right_cmp: CR) -> Self {
        Self {
            nodes: Nodes::new(),
            left_cmp,
            right_cmp,
        }
    }

    /// Move the contents out, leaving `self` empty with the same comparators.
    pub fn take(&mut self) -> Self
    where
        CL: Clone,
        CR: Clone,
    {
        let empty = Self::with_cmp(self.left_cmp.clone(), self.right_cmp.clone());
        mem::replace(self, empty)
    }

    /// Insert a pair. If `left` is already present on the left side or `right` is already present on the
    /// right side the map is not changed and the end position is returned.
    ///
    /// # Example
    ///
    /// ```
    ///     use ordbimap::collections::BiMap;
    ///     let mut map = BiMap::new();
    ///     let pos = map.insert(1, "one");
    ///     assert_eq!(map.get(pos), Some(&1));
    ///     assert!(map.insert(1, "uno").is_end());
    ///     assert!(map.insert(2, "one").is_end());
    ///     assert_eq!(map.len(), 1);
    /// ```
    pub fn insert(&mut self, left: L, right: R) -> Position<Left> {
        match self.try_insert(left, right) {
            Ok(pos) => pos,
            Err(_) => Position::end(),
        }
    }

    /// Insert a pair, or give it back if either value is already present.
    pub fn try_insert(&mut self, left: L, right: R) -> Result<Position<Left>, (L, R)> {
        if self.contains_left(&left) || self.contains_right(&right) {
            return Err((left, right));
        }
        let ix = self.insert_unchecked(left, right);
        Ok(self.position(Link::Node(ix)))
    }

    /// Both attachment points are found before allocating, and nothing after the allocation can fail,
    /// so the pair is either in both trees or in neither.
    fn insert_unchecked(&mut self, left: L, right: R) -> usize {
        let left_place = tree::find_place::<Left, L, R, CL>(&self.nodes, &self.left_cmp, &left);
        let right_place = tree::find_place::<Right, L, R, CR>(&self.nodes, &self.right_cmp, &right);
        let ix = self.nodes.alloc(left, right);
        tree::place_node::<Left, L, R>(&mut self.nodes, left_place, ix);
        tree::place_node::<Right, L, R>(&mut self.nodes, right_place, ix);
        ix
    }

    /// Does the map contain `left` on the left side?
    #[must_use]
    pub fn contains_left(&self, left: &L) -> bool {
        self.find_left_link(left) != Link::Header
    }

    /// Does the map contain `right` on the right side?
    #[must_use]
    pub fn contains_right(&self, right: &R) -> bool {
        self.find_right_link(right) != Link::Header
    }

    /// Position of `left`, or [`end_left`](Self::end_left) if it is not present.
    #[must_use]
    pub fn find_left(&self, left: &L) -> Position<Left> {
        self.position(self.find_left_link(left))
    }

    /// Position of `right`, or [`end_right`](Self::end_right) if it is not present.
    #[must_use]
    pub fn find_right(&self, right: &R) -> Position<Right> {
        self.position(self.find_right_link(right))
    }

    /// Returns the right value paired with `left`.
    pub fn at_left(&self, left: &L) -> Result<&R, KeyNotFoundError> {
        self.get_left(left).ok_or(KeyNotFoundError {})
    }

    /// Returns the left value paired with `right`.
    pub fn at_right(&self, right: &R) -> Result<&L, KeyNotFoundError> {
        self.get_right(right).ok_or(KeyNotFoundError {})
    }

    /// Returns the right value paired with `left`, if any.
    #[must_use]
    pub fn get_left(&self, left: &L) -> Option<&R> {
        match self.find_left_link(left) {
            Link::Node(ix) => Some(&self.nodes.node(ix).right),
            Link::Header => None,
        }
    }

    /// Returns the left value paired with `right`, if any.
    #[must_use]
    pub fn get_right(&self, right: &R) -> Option<&L> {
        match self.find_right_link(right) {
            Link::Node(ix) => Some(&self.nodes.node(ix).left),
            Link::Header => None,
        }
    }

    /// Returns the right value paired with `left`, first inserting `left` with the default right value
    /// if `left` is not present.
    ///
    /// Right values are unique, so if another pair already holds the default right value, that
    /// pair is removed: the default value moves to `left`.
    ///
    /// # Example
    ///
    /// ```
    ///     use ordbimap::collections::BiMap;
    ///     let mut map: BiMap<i32, u8> = BiMap::new();
    ///     assert_eq!(*map.at_left_or_default(1), 0);
    ///     assert_eq!(*map.at_left_or_default(2), 0);
    ///     assert!(!map.contains_left(&1));
    ///     assert_eq!(map.len(), 1);
    /// ```
    pub fn at_left_or_default(&mut self, left: L) -> &R
    where
        R: Default,
    {
        let ix = match self.find_left_link(&left) {
            Link::Node(ix) => ix,
            Link::Header => {
                let default = R::default();
                let holder = self.find_right_link(&default);
                let ix = self.insert_unchecked(left, default);
                if let Link::Node(other) = holder {
                    self.remove_node::<Right>(other);
                }
                ix
            }
        };
        &self.nodes.node(ix).right
    }

    /// Returns the left value paired with `right`, first inserting `right` with the default left value
    /// if `right` is not present.
    ///
    /// Left values are unique, so if another pair already holds the default left value, that
    /// pair is removed: the default value moves to `right`.
    pub fn at_right_or_default(&mut self, right: R) -> &L
    where
        L: Default,
    {
        let ix = match self.find_right_link(&right) {
            Link::Node(ix) => ix,
            Link::Header => {
                let default = L::default();
                let holder = self.find_left_link(&default);
                let ix = self.insert_unchecked(default, right);
                if let Link::Node(other) = holder {
                    self.remove_node::<Left>(other);
                }
                ix
            }
        };
        &self.nodes.node(ix).left
    }

    /// Remove the pair with left value `left`. Returns whether it was present.
    pub fn erase_left(&mut self, left: &L) -> bool {
        self.take_left(left).is_some()
    }

    /// Remove the pair with right value `right`. Returns whether it was present.
    pub fn erase_right(&mut self, right: &R) -> bool {
        self.take_right(right).is_some()
    }

    /// Remove and return the pair with left value `left`.
    pub fn take_left(&mut self, left: &L) -> Option<(L, R)> {
        match self.find_left_link(left) {
            Link::Node(ix) => Some(self.remove_node::<Left>(ix).1),
            Link::Header => None,
        }
    }

    /// Remove and return the pair with right value `right`.
    pub fn take_right(&mut self, right: &R) -> Option<(L, R)> {
        match self.find_right_link(right) {
            Link::Node(ix) => Some(self.remove_node::<Right>(ix).1),
            Link::Header => None,
        }
    }

    /// Position of the first pair whose left value is not less than `left`.
    #[must_use]
    pub fn lower_bound_left(&self, left: &L) -> Position<Left> {
        self.position(tree::lower_bound::<Left, L, R, CL>(
            &self.nodes,
            &self.left_cmp,
            left,
        ))
    }

    /// Position of the first pair whose left value is greater than `left`.
    #[must_use]
    pub fn upper_bound_left(&self, left: &L) -> Position<Left> {
        self.position(tree::upper_bound::<Left, L, R, CL>(
            &self.nodes,
            &self.left_cmp,
            left,
        ))
    }

    /// Position of the first pair whose right value is not less than `right`.
    #[must_use]
    pub fn lower_bound_right(&self, right: &R) -> Position<Right> {
        self.position(tree::lower_bound::<Right, L, R, CR>(
            &self.nodes,
            &self.right_cmp,
            right,
        ))
    }

    /// Position of the first pair whose right value is greater than `right`.
    #[must_use]
    pub fn upper_bound_right(&self, right: &R) -> Position<Right> {
        self.position(tree::upper_bound::<Right, L, R, CR>(
            &self.nodes,
            &self.right_cmp,
            right,
        ))
    }

    fn find_left_link(&self, left: &L) -> Link {
        tree::find::<Left, L, R, CL>(&self.nodes, &self.left_cmp, left)
    }

    fn find_right_link(&self, right: &R) -> Link {
        tree::find::<Right, L, R, CR>(&self.nodes, &self.right_cmp, right)
    }

    #[cfg(test)]
    pub(crate) fn check(&self) {
        self.check_side::<Left, CL>(&self.left_cmp);
        self.check_side::<Right, CR>(&self.right_cmp);
        assert_eq!(self.nodes.occupied().count(), self.len());
    }

    #[cfg(test)]
    fn check_side<S: Side, C: Compare<S::Value<L, R>>>(&self, cmp: &C) {
        let mut count = 0;
        let mut stack: Vec<(usize, Link)> = self
            .nodes
            .root::<S>()
            .map(|root| (root, Link::Header))
            .into_iter()
            .collect();
        while let Some((ix, parent)) = stack.pop() {
            let links = self.nodes.links::<S>(ix);
            assert_eq!(links.parent, parent);
            count += 1;
            for child in [links.left, links.right].into_iter().flatten() {
                stack.push((child, Link::Node(ix)));
            }
        }
        assert_eq!(count, self.len());

        let mut at = tree::first::<S, L, R>(&self.nodes);
        let mut prev: Option<&S::Value<L, R>> = None;
        while let Link::Node(ix) = at {
            let value = self.nodes.value::<S>(ix);
            if let Some(p) = prev {
                assert!(cmp.compares_lt(p, value));
            }
            prev = Some(value);
            at = tree::next::<S, L, R>(&self.nodes, at);
        }
    }
}

/// Two values are equivalent when neither is less than the other.
fn equivalent<T, C: Compare<T>>(cmp: &C, a: &T, b: &T) -> bool {
    !cmp.compares_lt(a, b) && !cmp.compares_lt(b, a)
}

impl<L, R, CL, CR> PartialEq for BiMap<L, R, CL, CR>
where
    CL: Compare<L>,
    CR: Compare<R>,
{
    /// Maps are equal if they have the same length and the pairs at each index in left order
    /// have equivalent left values and equivalent right values, according to `self`'s comparators.
    fn eq(&self, other: &BiMap<L, R, CL, CR>) -> bool {
        self.len() == other.len()
            && self.iter().zip(other.iter()).all(|((l1, r1), (l2, r2))| {
                equivalent(&self.left_cmp, l1, l2) && equivalent(&self.right_cmp, r1, r2)
            })
    }
}

impl<L, R, CL, CR> Eq for BiMap<L, R, CL, CR>
where
    CL: Compare<L>,
    CR: Compare<R>,
{
}

impl<L: Debug, R: Debug, CL, CR> Debug for BiMap<L, R, CL, CR> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<L: Ord, R: Ord> FromIterator<(L, R)> for BiMap<L, R> {
    /// Pairs that clash with an earlier pair are skipped.
    fn from_iter<T: IntoIterator<Item = (L, R)>>(iter: T) -> BiMap<L, R> {
        let mut map = BiMap::new();
        map.extend(iter);
        map
    }
}

impl<L: Ord, R: Ord, const N: usize> From<[(L, R); N]> for BiMap<L, R> {
    fn from(arr: [(L, R); N]) -> BiMap<L, R> {
        BiMap::from_iter(arr)
    }
}

impl<L, R, CL, CR> Extend<(L, R)> for BiMap<L, R, CL, CR>
where
    CL: Compare<L>,
    CR: Compare<R>,
{
    /// Pairs that clash with a pair already in the map are skipped.
    fn extend<T: IntoIterator<Item = (L, R)>>(&mut self, iter: T) {
        for (l, r) in iter {
            self.insert(l, r);
        }
    }
}

impl<'a, L, R, CL, CR> IntoIterator for &'a BiMap<L, R, CL, CR> {
    type Item = (&'a L, &'a R);
    type IntoIter = Iter<'a, Left, L, R>;
    fn into_iter(self) -> Iter<'a, Left, L, R> {
        self.iter()
    }
}

impl<L, R, CL, CR> IntoIterator for BiMap<L, R, CL, CR> {
    type Item = (L, R);
    type IntoIter = IntoIter<L, R, CL, CR>;

    /// Convert BiMap to Iterator of `(left, right)` in left order.
    fn into_iter(self) -> IntoIter<L, R, CL, CR> {
        IntoIter { map: self }
    }
}

/// Error type for [`BiMap::at_left`] and [`BiMap::at_right`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct KeyNotFoundError {}
impl fmt::Display for KeyNotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "key not found in BiMap")
    }
}
impl Error for KeyNotFoundError {}

// Positions.

/// Position of a pair on side `S` of a [`BiMap`], or the end position of that side.
///
/// A position stays valid while its pair is in the map, whatever else is inserted or removed.
/// Once the pair is removed, the position is rejected by the map's methods.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Position<S: Side> {
    node: Option<(usize, u32)>,
    side: PhantomData<S>,
}

impl<S: Side> Position<S> {
    /// The end position of side `S`.
    #[must_use]
    pub const fn end() -> Self {
        Self {
            node: None,
            side: PhantomData,
        }
    }

    /// Is this the end position?
    #[must_use]
    pub const fn is_end(&self) -> bool {
        self.node.is_none()
    }

    /// Position of the same pair on the other side. The end position flips to the other side's end position.
    #[must_use]
    pub const fn flip(self) -> Position<S::Opposite> {
        Position {
            node: self.node,
            side: PhantomData,
        }
    }
}

/// Read-only cursor over one side of a [`BiMap`], returned by [`BiMap::cursor`].
pub struct Cursor<'a, S: Side, L, R> {
    nodes: &'a Nodes<L, R>,
    at: Link,
    side: PhantomData<S>,
}

impl<S: Side, L, R> Clone for Cursor<'_, S, L, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: Side, L, R> Copy for Cursor<'_, S, L, R> {}

impl<S: Side, L, R> PartialEq for Cursor<'_, S, L, R> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.nodes, other.nodes) && self.at == other.at
    }
}

impl<S: Side, L, R> Eq for Cursor<'_, S, L, R> {}

impl<S: Side, L: Debug, R: Debug> Debug for Cursor<'_, S, L, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.pair()).finish()
    }
}

impl<'a, S: Side, L, R> Cursor<'a, S, L, R> {
    /// Value on side `S` at the cursor, `None` at the end.
    #[must_use]
    pub fn get(&self) -> Option<&'a S::Value<L, R>> {
        match self.at {
            Link::Node(ix) => Some(self.nodes.value::<S>(ix)),
            Link::Header => None,
        }
    }

    /// Value on the other side paired with the value at the cursor, `None` at the end.
    #[must_use]
    pub fn paired(&self) -> Option<&'a <S::Opposite as Side>::Value<L, R>> {
        match self.at {
            Link::Node(ix) => Some(self.nodes.value::<S::Opposite>(ix)),
            Link::Header => None,
        }
    }

    /// The pair at the cursor as `(left, right)`, `None` at the end.
    #[must_use]
    pub fn pair(&self) -> Option<(&'a L, &'a R)> {
        match self.at {
            Link::Node(ix) => {
                let node = self.nodes.node(ix);
                Some((&node.left, &node.right))
            }
            Link::Header => None,
        }
    }

    /// Advance the cursor. From the last pair it moves to the end, and from the end to the first pair.
    pub fn move_next(&mut self) {
        self.at = tree::next::<S, L, R>(self.nodes, self.at);
    }

    /// Move the cursor back. From the first pair it moves to the end, and from the end to the last pair.
    pub fn move_prev(&mut self) {
        self.at = tree::prev::<S, L, R>(self.nodes, self.at);
    }

    /// Cursor at the same pair on the other side.
    #[must_use]
    pub fn flip(&self) -> Cursor<'a, S::Opposite, L, R> {
        Cursor {
            nodes: self.nodes,
            at: self.at,
            side: PhantomData,
        }
    }

    /// Is the cursor at the end?
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.at == Link::Header
    }

    /// Position of the cursor.
    #[must_use]
    pub fn position(&self) -> Position<S> {
        Position {
            node: match self.at {
                Link::Node(ix) => Some((ix, self.nodes.generation(ix))),
                Link::Header => None,
            },
            side: PhantomData,
        }
    }
}

// Iterators.

/// Iterator returned by [`BiMap::iter`], [`BiMap::iter_left`] and [`BiMap::iter_right`].
///
/// Yields `(value, paired value)` with values from side `S` in order.
pub struct Iter<'a, S: Side, L, R> {
    nodes: &'a Nodes<L, R>,
    front: Link,
    back: Link,
    len: usize,
    side: PhantomData<S>,
}

impl<S: Side, L, R> Clone for Iter<'_, S, L, R> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes,
            front: self.front,
            back: self.back,
            len: self.len,
            side: PhantomData,
        }
    }
}

impl<'a, S: Side, L, R> Iter<'a, S, L, R> {
    fn new(nodes: &'a Nodes<L, R>) -> Self {
        Self {
            nodes,
            front: tree::first::<S, L, R>(nodes),
            back: tree::last::<S, L, R>(nodes),
            len: nodes.len(),
            side: PhantomData,
        }
    }

    fn item(&self, ix: usize) -> (&'a S::Value<L, R>, &'a <S::Opposite as Side>::Value<L, R>) {
        (
            self.nodes.value::<S>(ix),
            self.nodes.value::<S::Opposite>(ix),
        )
    }
}

impl<'a, S: Side, L, R> Iterator for Iter<'a, S, L, R> {
    type Item = (&'a S::Value<L, R>, &'a <S::Opposite as Side>::Value<L, R>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        let Link::Node(ix) = self.front else {
            return None;
        };
        self.len -= 1;
        self.front = tree::next::<S, L, R>(self.nodes, self.front);
        Some(self.item(ix))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<S: Side, L, R> DoubleEndedIterator for Iter<'_, S, L, R> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        let Link::Node(ix) = self.back else {
            return None;
        };
        self.len -= 1;
        self.back = tree::prev::<S, L, R>(self.nodes, self.back);
        Some(self.item(ix))
    }
}

impl<S: Side, L, R> ExactSizeIterator for Iter<'_, S, L, R> {
    fn len(&self) -> usize {
        self.len
    }
}

impl<S: Side, L, R> FusedIterator for Iter<'_, S, L, R> {}

/// Consuming iterator for [`BiMap`], yields `(left, right)` in left order.
pub struct IntoIter<L, R, CL = Natural<L>, CR = Natural<R>> {
    map: BiMap<L, R, CL, CR>,
}

impl<L, R, CL, CR> Iterator for IntoIter<L, R, CL, CR> {
    type Item = (L, R);

    fn next(&mut self) -> Option<(L, R)> {
        match tree::first::<Left, L, R>(&self.map.nodes) {
            Link::Node(ix) => Some(self.map.remove_node::<Left>(ix).1),
            Link::Header => None,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.map.len();
        (len, Some(len))
    }
}

impl<L, R, CL, CR> DoubleEndedIterator for IntoIter<L, R, CL, CR> {
    fn next_back(&mut self) -> Option<(L, R)> {
        match tree::last::<Left, L, R>(&self.map.nodes) {
            Link::Node(ix) => Some(self.map.remove_node::<Left>(ix).1),
            Link::Header => None,
        }
    }
}

impl<L, R, CL, CR> ExactSizeIterator for IntoIter<L, R, CL, CR> {
    fn len(&self) -> usize {
        self.map.len()
    }
}

impl<L, R, CL, CR> FusedIterator for IntoIter<L, R, CL, CR> {}

// Tests.

#[cfg(all(test, not(miri), feature = "cap"))]
#[global_allocator]
static ALLOCATOR: cap::Cap<std::alloc::System> =
    cap::Cap::new(std::alloc::System, usize::max_value());

#[cfg(test)]
fn print_memory() {
    #[cfg(all(test, not(miri), feature = "cap"))]
    println!("Memory allocated: {} bytes", ALLOCATOR.allocated());
}

/* mimalloc cannot be used with miri */
#[cfg(all(test, not(miri), not(feature = "cap")))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[cfg(test)]
mod mytests;

use crate::collections::bimap::*;
use compare::Compare;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use std::cell::Cell;
use std::cmp::Ordering;
use std::rc::Rc;

const N: usize = if cfg!(miri) { 100 } else { 10000 };

fn shuffled(n: usize, seed: u64) -> Vec<usize> {
    let mut v: Vec<usize> = (0..n).collect();
    v.shuffle(&mut StdRng::seed_from_u64(seed));
    v
}

/// Pairs `i <-> n - i` inserted in random order.
fn random_map(n: usize, seed: u64) -> BiMap<usize, usize> {
    let mut map = BiMap::new();
    for i in shuffled(n, seed) {
        assert!(!map.insert(i, n - i).is_end());
    }
    map
}

#[derive(Clone, Default)]
struct CaseInsensitive;

impl Compare<String> for CaseInsensitive {
    fn compare(&self, l: &String, r: &String) -> Ordering {
        l.to_lowercase().cmp(&r.to_lowercase())
    }
}

#[test]
fn exp_insert_rand() {
    let map = random_map(N, 1);
    map.check();
    assert_eq!(map.len(), N);
    assert_eq!(map.iter_left().count(), N);
    assert_eq!(map.iter_right().count(), N);
    print_memory();
}

#[test]
fn std_insert_rand() {
    let mut left = std::collections::BTreeMap::new();
    let mut right = std::collections::BTreeMap::new();
    for i in shuffled(N, 1) {
        left.insert(i, N - i);
        right.insert(N - i, i);
    }
    let map = random_map(N, 1);
    assert!(map.iter_left().map(|(l, r)| (*l, *r)).eq(left.into_iter()));
    assert!(map.iter_right().map(|(r, l)| (*r, *l)).eq(right.into_iter()));
    print_memory();
}

#[test]
fn exp_insert_seq_fwd() {
    let n = N / 10;
    let mut map = BiMap::new();
    for i in 0..n {
        map.insert(i, i);
    }
    map.check();
    assert!(map.iter().map(|(l, _)| *l).eq(0..n));
    for i in 0..n {
        assert_eq!(map.at_left(&i), Ok(&i));
    }
}

#[test]
fn exp_insert_seq_rev() {
    let n = N / 10;
    let mut map = BiMap::new();
    for i in (0..n).rev() {
        map.insert(i, n - i);
    }
    map.check();
    assert!(map.iter_right().map(|(r, _)| *r).eq(1..=n));
}

#[test]
fn find_then_flip() {
    let map = random_map(100, 2);
    for i in 0..100 {
        assert_eq!(map.get(map.find_left(&i).flip()), Some(&(100 - i)));
        assert_eq!(map.get(map.find_right(&(100 - i)).flip()), Some(&i));
    }
}

#[test]
fn duplicate_insert_is_noop() {
    let mut map = BiMap::new();
    map.insert(1, "a");
    map.insert(2, "b");
    assert!(map.insert(1, "c").is_end());
    assert!(map.insert(3, "a").is_end());
    assert!(map.insert(2, "a").is_end());
    assert_eq!(map.len(), 2);
    assert_eq!(map.at_left(&1), Ok(&"a"));
    assert_eq!(map.at_left(&2), Ok(&"b"));
    assert!(!map.contains_left(&3));
    assert!(!map.contains_right(&"c"));
    assert_eq!(map.try_insert(3, "b"), Err((3, "b")));
    map.check();
}

#[test]
fn erase_left_clears_both_sides() {
    let mut map = random_map(200, 3);
    for i in (0..200).step_by(3) {
        assert!(map.erase_left(&i));
        assert!(map.find_left(&i).is_end());
        assert!(map.find_right(&(200 - i)).is_end());
    }
    assert!(!map.erase_left(&0));
    map.check();
    assert_eq!(map.len(), 200 - 67);
}

#[test]
fn erase_right_clears_both_sides() {
    let mut map = random_map(200, 4);
    for r in (1..=200).step_by(2) {
        assert!(map.erase_right(&r));
        assert!(map.find_right(&r).is_end());
        assert!(map.find_left(&(200 - r)).is_end());
    }
    assert!(!map.erase_right(&1));
    map.check();
    assert_eq!(map.len(), 100);
}

#[test]
fn concrete_scenario() {
    let mut map = BiMap::new();
    map.insert(1, "a".to_string());
    map.insert(2, "b".to_string());
    assert_eq!(map.get(map.find_left(&1).flip()), Some(&"a".to_string()));
    assert!(map.erase_left(&1));
    assert_eq!(map.find_right(&"a".to_string()), map.end_right());
    assert_eq!(map.len(), 1);
}

#[test]
fn flip_is_an_involution() {
    let mut map: BiMap<i32, i32> = BiMap::new();
    assert_eq!(map.end_left().flip(), map.end_right());
    assert_eq!(map.end_right().flip(), map.end_left());
    assert_eq!(map.begin_left(), map.end_left());
    for i in 0..50 {
        map.insert((i * 7) % 50, (i * 13) % 50);
    }
    let mut pos = map.begin_left();
    loop {
        assert_eq!(pos.flip().flip(), pos);
        if pos.is_end() {
            break;
        }
        pos = map.next(pos);
    }
    assert_eq!(map.end_left().flip(), map.end_right());
    assert_eq!(map.end_right().flip(), map.end_left());
}

#[test]
fn at_missing_key() {
    let map: BiMap<i32, i32> = [(1, 10), (2, 20)].into();
    assert_eq!(map.at_left(&3), Err(KeyNotFoundError {}));
    assert_eq!(map.at_right(&1), Err(KeyNotFoundError {}));
    assert_eq!(map.at_right(&20), Ok(&2));
    assert_eq!(map.get_left(&3), None);
    assert_eq!(KeyNotFoundError {}.to_string(), "key not found in BiMap");
}

#[test]
fn default_moves_to_new_key() {
    let mut map: BiMap<i32, String> = BiMap::new();
    assert_eq!(map.at_left_or_default(1), "");
    assert_eq!(map.len(), 1);
    assert_eq!(map.at_left_or_default(2), "");
    assert!(map.find_left(&1).is_end());
    assert_eq!(map.at_right(&String::new()), Ok(&2));
    assert_eq!(map.len(), 1);

    map.insert(3, "x".to_string());
    assert_eq!(map.at_left_or_default(3), "x");
    assert_eq!(map.len(), 2);
    map.check();
}

#[test]
fn default_moves_to_new_right_key() {
    let mut map: BiMap<i32, &str> = BiMap::new();
    map.insert(0, "zero");
    map.insert(5, "five");
    assert_eq!(*map.at_right_or_default("five"), 5);
    assert_eq!(*map.at_right_or_default("nothing"), 0);
    assert!(map.find_right(&"zero").is_end());
    assert_eq!(map.at_left(&0), Ok(&"nothing"));
    assert_eq!(map.len(), 2);
    map.check();
}

#[test]
fn default_with_no_holder() {
    let mut map: BiMap<i32, i32> = BiMap::new();
    map.insert(1, 1);
    assert_eq!(*map.at_left_or_default(2), 0);
    assert_eq!(map.len(), 2);
    assert_eq!(map.at_left(&1), Ok(&1));
    map.check();
}

#[test]
fn bounds() {
    let map: BiMap<i32, i32> = [(10, 3), (20, 2), (30, 1)].into();
    assert_eq!(map.get(map.lower_bound_left(&20)), Some(&20));
    assert_eq!(map.get(map.upper_bound_left(&20)), Some(&30));
    assert_eq!(map.get(map.lower_bound_left(&11)), Some(&20));
    assert!(map.upper_bound_left(&30).is_end());
    assert_eq!(map.lower_bound_left(&0), map.begin_left());
    assert_eq!(map.get(map.lower_bound_right(&2)), Some(&2));
    assert_eq!(map.get(map.upper_bound_right(&2)), Some(&3));
    assert_eq!(map.get(map.upper_bound_right(&0).flip()), Some(&30));
    assert!(map.lower_bound_right(&4).is_end());
}

#[test]
fn equivalence_not_identity() {
    let mut a = BiMap::with_cmp(CaseInsensitive, CaseInsensitive);
    a.insert("Apple".to_string(), "RED".to_string());
    assert!(a.insert("apple".to_string(), "green".to_string()).is_end());
    assert!(a.insert("pear".to_string(), "red".to_string()).is_end());
    assert_eq!(a.get_left(&"APPLE".to_string()), Some(&"RED".to_string()));

    let mut b = BiMap::with_cmp(CaseInsensitive, CaseInsensitive);
    b.insert("APPLE".to_string(), "red".to_string());
    assert!(a == b);
    b.insert("pear".to_string(), "green".to_string());
    assert!(a != b);
}

#[test]
fn clone_is_independent() {
    let mut a = random_map(500, 5);
    let mut b = a.clone();
    assert!(a == b);
    b.check();
    b.erase_left(&0);
    b.insert(1000, 1000);
    assert_eq!(a.len(), 500);
    assert!(a.contains_left(&0));
    assert!(!a.contains_left(&1000));
    a.erase_right(&1);
    assert!(b.contains_right(&1));
    assert!(a != b);
    a.check();
    b.check();
}

#[test]
fn take_leaves_source_empty() {
    let mut a = random_map(300, 6);
    let expect: Vec<(usize, usize)> = a.iter().map(|(l, r)| (*l, *r)).collect();
    let b = a.take();
    assert_eq!(a.len(), 0);
    assert!(a.is_empty());
    assert_eq!(a.begin_left(), a.end_left());
    assert!(b.iter().map(|(l, r)| (*l, *r)).eq(expect.into_iter()));
    b.check();
    a.insert(1, 1);
    a.check();
}

#[test]
fn swap_maps() {
    let mut a: BiMap<i32, char> = [(1, 'a'), (2, 'b')].into();
    let mut b: BiMap<i32, char> = [(3, 'c')].into();
    a.swap(&mut b);
    assert_eq!(a.len(), 1);
    assert_eq!(b.len(), 2);
    assert_eq!(a.end_left().flip(), a.end_right());
    assert_eq!(a.get(a.find_left(&3).flip()), Some(&'c'));
    assert_eq!(b.get(b.find_right(&'b').flip()), Some(&2));
    a.check();
    b.check();
}

#[test]
fn positions_survive_other_removals() {
    let mut map = random_map(100, 7);
    let keep = map.find_left(&50);
    let keep_right = map.find_right(&50);
    for i in 0..100 {
        if i != 50 {
            map.erase_left(&i);
        }
    }
    assert_eq!(map.get(keep), Some(&50));
    assert_eq!(map.get(keep_right), Some(&50));
    assert_eq!(map.get_pair(keep), Some((&50, &50)));
    map.check();
}

#[test]
fn stale_position_is_rejected() {
    let mut map: BiMap<i32, i32> = [(1, 1), (2, 2)].into();
    let pos = map.find_left(&1);
    map.erase_left(&1);
    assert_eq!(map.get(pos), None);
    // The freed slot is reused, the old position must not see the new pair.
    map.insert(3, 3);
    assert_eq!(map.get(pos), None);
    assert_eq!(map.get(pos.flip()), None);
}

#[test]
#[should_panic]
fn erase_stale_position_panics() {
    let mut map: BiMap<i32, i32> = [(1, 1), (2, 2)].into();
    let pos = map.find_left(&1);
    map.erase_left_at(pos);
    map.erase_left_at(pos);
}

#[test]
#[should_panic]
fn erase_end_panics() {
    let mut map: BiMap<i32, i32> = [(1, 1)].into();
    let end = map.end_right();
    map.erase_right_at(end);
}

#[test]
fn erase_at_returns_next() {
    let mut map = random_map(50, 8);
    let mut pos = map.find_left(&10);
    for expect in 11..20 {
        pos = map.erase_left_at(pos);
        assert_eq!(map.get(pos), Some(&expect));
    }
    let last = map.find_right(&50);
    assert!(map.erase_right_at(last).is_end());
    map.check();
    assert_eq!(map.len(), 40);
}

#[test]
fn erase_ranges() {
    let mut map = random_map(100, 9);
    let first = map.find_left(&20);
    let last = map.find_left(&30);
    assert_eq!(map.erase_left_range(first, last), last);
    assert_eq!(map.len(), 90);
    assert!((20..30).all(|i| !map.contains_left(&i)));
    assert_eq!(map.get(map.prev(last)), Some(&19));

    // Right order is the reverse of left order here.
    let first = map.find_right(&1);
    let end = map.end_right();
    map.erase_right_range(first, end);
    assert!(map.is_empty());
    map.check();
}

#[test]
fn cursor_moves_and_flips() {
    let map: BiMap<i32, char> = [(2, 'a'), (1, 'c'), (3, 'b')].into();
    let mut c = map.cursor(map.begin_left());
    assert_eq!(c.get(), Some(&1));
    assert_eq!(c.paired(), Some(&'c'));
    c.move_next();
    assert_eq!(c.pair(), Some((&2, &'a')));
    let mut r = c.flip();
    assert_eq!(r.get(), Some(&'a'));
    r.move_next();
    assert_eq!(r.get(), Some(&'b'));
    assert_eq!(r.flip().get(), Some(&3));
    r.move_next();
    r.move_next();
    assert!(r.is_end());
    assert!(r.flip().is_end());
    assert_eq!(r.position(), map.end_right());
    r.move_prev();
    assert_eq!(r.get(), Some(&'c'));
    r.move_next();
    r.move_next();
    assert_eq!(r.get(), Some(&'a'));
    assert_eq!(c.flip().flip(), c);
    assert_eq!(c.position(), map.find_left(&2));
}

#[test]
fn iterators() {
    let map: BiMap<i32, char> = [(2, 'a'), (1, 'c'), (3, 'b')].into();
    let left: Vec<_> = map.iter().collect();
    assert_eq!(left, [(&1, &'c'), (&2, &'a'), (&3, &'b')]);
    let right: Vec<_> = map.iter_right().rev().collect();
    assert_eq!(right, [(&'c', &1), (&'b', &3), (&'a', &2)]);

    let mut it = map.iter_left();
    assert_eq!(it.len(), 3);
    assert_eq!(it.next(), Some((&1, &'c')));
    assert_eq!(it.next_back(), Some((&3, &'b')));
    assert_eq!(it.next(), Some((&2, &'a')));
    assert_eq!(it.next_back(), None);
    assert_eq!(it.next(), None);

    let owned: Vec<_> = map.clone().into_iter().collect();
    assert_eq!(owned, [(1, 'c'), (2, 'a'), (3, 'b')]);
    let mut owned = map.into_iter();
    assert_eq!(owned.next_back(), Some((3, 'b')));
    assert_eq!(owned.len(), 2);
}

#[test]
fn retain_and_clear() {
    let mut map = random_map(1000, 10);
    map.retain(|l, _| l % 3 == 0);
    map.check();
    assert_eq!(map.len(), 334);
    assert!(map.iter().all(|(l, r)| l % 3 == 0 && l + r == 1000));
    map.clear();
    map.check();
    assert!(map.is_empty());
    assert!(map.begin_right().is_end());
}

#[test]
fn random_insert_erase() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut map = BiMap::new();
    let mut left = std::collections::BTreeMap::new();
    let mut right = std::collections::BTreeMap::new();
    for _ in 0..N {
        let l: u16 = rng.gen_range(0..500);
        let r: u16 = rng.gen_range(0..500);
        if rng.gen_bool(0.6) {
            let accepted = !map.insert(l, r).is_end();
            assert_eq!(accepted, !left.contains_key(&l) && !right.contains_key(&r));
            if accepted {
                left.insert(l, r);
                right.insert(r, l);
            }
        } else if rng.gen_bool(0.5) {
            let removed = map.take_left(&l);
            assert_eq!(removed, left.remove(&l).map(|r| (l, r)));
            if let Some((_, r)) = removed {
                right.remove(&r);
            }
        } else {
            let removed = map.take_right(&r);
            assert_eq!(removed, right.remove(&r).map(|l| (l, r)));
            if let Some((l, _)) = removed {
                left.remove(&l);
            }
        }
    }
    map.check();
    assert!(map.iter_left().map(|(l, r)| (*l, *r)).eq(left.into_iter()));
    assert!(map.iter_right().map(|(r, l)| (*r, *l)).eq(right.into_iter()));
}

struct Counted {
    key: u32,
    drops: Rc<Cell<usize>>,
}

struct ByKey;

impl Compare<Counted> for ByKey {
    fn compare(&self, l: &Counted, r: &Counted) -> Ordering {
        l.key.cmp(&r.key)
    }
}

impl Drop for Counted {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

#[test]
fn every_pair_dropped_once() {
    let drops = Rc::new(Cell::new(0));
    {
        let mut map = BiMap::with_cmp(ByKey, compare::natural());
        for i in shuffled(100, 12) {
            let i = i as u32;
            map.insert(
                Counted {
                    key: i,
                    drops: drops.clone(),
                },
                i,
            );
        }
        map.erase_right(&5);
        assert_eq!(drops.get(), 1);
        let taken = map.take_right(&6);
        assert!(taken.is_some());
        drop(taken);
        assert_eq!(drops.get(), 2);
    }
    assert_eq!(drops.get(), 100);
}

#[test]
fn exp_mem_test() {
    let map = random_map(N, 13);
    println!("Done insertions");
    print_memory();
    println!("Pairs: {}", map.len());
}

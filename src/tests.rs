use std::ops::Range;

use proptest::prelude::*;

use crate::model;

use super::*;

fn insert_find_all(keys: &[u32]) {
    let mut map: AvlMap<u32, u32> = AvlMap::new();

    for &key in keys {
        assert_eq!(map.insert(key, key + 1), None);
        map.assert_invariants();
    }

    for key in keys {
        assert_eq!(map.get(key), Ok(&(key + 1)));
    }
    assert_eq!(map.len(), keys.len());
}

fn permutations(n: u32) -> Vec<Vec<u32>> {
    if n == 0 {
        return vec![vec![]];
    }

    let mut out = Vec::new();
    for perm in permutations(n - 1) {
        for pos in 0..=perm.len() {
            let mut next = perm.clone();
            next.insert(pos, n - 1);
            out.push(next);
        }
    }
    out
}

#[test]
fn zero_elems_find() {
    insert_find_all(&[]);
}

#[test]
fn single_elem_find() {
    insert_find_all(&[0]);
}

#[test]
fn two_elems_find() {
    insert_find_all(&[0, 1]);
    insert_find_all(&[1, 0]);
}

#[test]
fn three_elems_find() {
    insert_find_all(&[0, 1, 2]);
    insert_find_all(&[0, 2, 1]);
    insert_find_all(&[1, 0, 2]);
    insert_find_all(&[1, 2, 0]);
    insert_find_all(&[2, 0, 1]);
    insert_find_all(&[2, 1, 0]);
}

#[test]
fn all_orders_find() {
    for n in 4..=6 {
        for perm in permutations(n) {
            insert_find_all(&perm);
        }
    }
}

fn insert_remove_all(keys: &[u32]) {
    let mut map: AvlMap<u32, u32> = AvlMap::new();

    for &key in keys {
        map.insert(key, key);
        map.assert_invariants();
    }

    for key in keys {
        assert_eq!(map.remove(key), Some(*key));
        map.assert_invariants();
    }
    assert!(map.is_empty());

    for &key in keys {
        map.insert(key, key);
        map.assert_invariants();
    }

    for key in keys.iter().rev() {
        assert_eq!(map.remove(key), Some(*key));
        map.assert_invariants();
    }
    assert!(map.is_empty());
    assert_eq!(map.height(), 0);
}

#[test]
fn remove_one() {
    insert_remove_all(&[0]);
}

#[test]
fn remove_two() {
    insert_remove_all(&[0, 1]);
    insert_remove_all(&[1, 0]);
}

#[test]
fn remove_three() {
    insert_remove_all(&[0, 1, 2]);
    insert_remove_all(&[0, 2, 1]);
    insert_remove_all(&[1, 0, 2]);
    insert_remove_all(&[1, 2, 0]);
    insert_remove_all(&[2, 0, 1]);
    insert_remove_all(&[2, 1, 0]);
}

#[test]
fn remove_all_orders() {
    for n in 4..=6 {
        for perm in permutations(n) {
            insert_remove_all(&perm);
        }
    }
}

#[test]
fn mixed_signs_scenario() {
    let mut map: AvlMap<i32, i32> = AvlMap::new();
    for (key, value) in [(0, 0), (1, -1), (2, -101), (3, 10), (4, 10), (5, 30)] {
        map.insert(key, value);
        map.assert_invariants();
    }

    assert!(map.contains_key(&3));
    assert_eq!(map.get(&3), Ok(&10));
    assert_eq!(map.height(), 3);
    assert_eq!(
        map.iter().map(|(&k, &v)| (k, v)).collect::<Vec<_>>(),
        [(0, 0), (1, -1), (2, -101), (3, 10), (4, 10), (5, 30)]
    );

    assert_eq!(map.remove(&2), Some(-101));
    map.assert_invariants();

    assert!(!map.contains_key(&2));
    assert_eq!(map.keys().copied().collect::<Vec<_>>(), [0, 1, 3, 4, 5]);
    assert!(map.height() <= 3);
}

#[test]
fn overwrite_keeps_one_entry() {
    let mut map: AvlMap<u32, &str> = AvlMap::new();
    map.insert(4, "a");
    map.insert(2, "b");
    map.insert(6, "c");

    assert_eq!(map.insert(4, "d"), Some("a"));
    assert_eq!(map.insert(6, "e"), Some("c"));
    map.assert_invariants();

    assert_eq!(map.len(), 3);
    assert_eq!(map[&4], "d");
    assert_eq!(map.values().copied().collect::<Vec<_>>(), ["b", "d", "e"]);
}

#[test]
fn missing_key() {
    let mut map: AvlMap<u32, u32> = (0..10).map(|k| (k * 2, k)).collect();

    assert_eq!(map.get(&3), Err(Error::NotFound));
    assert_eq!(map.get_mut(&3), Err(Error::NotFound));
    assert_eq!(map.get_key_value(&100), Err(Error::NotFound));
    assert!(!map.contains_key(&3));

    // Removing an absent key changes nothing.
    let before = map.clone();
    assert_eq!(map.remove(&3), None);
    assert_eq!(map, before);
    map.assert_invariants();
}

#[test]
#[should_panic(expected = "key not found")]
fn index_missing_panics() {
    let map: AvlMap<u32, u32> = AvlMap::new();
    let _value: u32 = map[&1];
}

#[test]
fn get_or_insert_default_autovivifies() {
    let mut map: AvlMap<&str, Vec<u32>> = AvlMap::new();

    map.get_or_insert_default("odd").push(1);
    map.get_or_insert_default("even").push(2);
    map.get_or_insert_default("odd").push(3);
    assert_eq!(*map.get_or_insert_default("none"), Vec::<u32>::new());

    assert_eq!(map.len(), 3);
    assert_eq!(map["odd"], [1, 3]);
    assert_eq!(map["even"], [2]);
    map.assert_invariants();
}

#[test]
fn clone_is_isolated() {
    let mut original: AvlMap<u32, String> = (0..32).map(|k| (k, k.to_string())).collect();
    let mut copy = original.clone();
    copy.assert_invariants();
    assert_eq!(copy, original);
    assert_eq!(copy.height(), original.height());

    copy.remove(&7);
    copy.insert(100, "hundred".to_owned());
    copy.get_mut(&0).unwrap().push('!');

    assert!(original.contains_key(&7));
    assert!(!original.contains_key(&100));
    assert_eq!(original[&0], "0");

    original.remove(&8);
    assert!(copy.contains_key(&8));

    original.assert_invariants();
    copy.assert_invariants();
}

#[test]
fn clear_then_reuse() {
    let mut map: AvlMap<u32, u32> = (0..20).map(|k| (k, k)).collect();
    map.clear();
    assert!(map.is_empty());
    assert_eq!(map.first_key_value(), None);
    map.assert_invariants();

    map.extend((0..5).rev().map(|k| (k, k * 10)));
    assert_eq!(map.first_key_value(), Some((&0, &0)));
    assert_eq!(map.last_key_value(), Some((&4, &40)));
    map.assert_invariants();
}

#[test]
fn cursor_traversal_is_complete() {
    let keys = [50u32, 20, 80, 10, 30, 70, 90, 25, 35, 5, 95, 60];
    let map: AvlMap<u32, ()> = keys.iter().map(|&k| (k, ())).collect();

    let mut sorted = keys.to_vec();
    sorted.sort_unstable();

    let mut forward = Vec::new();
    let mut curs = map.cursor_first();
    while let Some(&key) = curs.key() {
        forward.push(key);
        curs.move_next().unwrap();
    }
    assert_eq!(forward, sorted);

    let mut backward = Vec::new();
    let mut curs = map.cursor_last();
    while let Some(&key) = curs.key() {
        backward.push(key);
        curs.move_prev().unwrap();
    }
    sorted.reverse();
    assert_eq!(backward, sorted);
}

#[test]
fn height_stays_logarithmic() {
    let mut map: AvlMap<u32, ()> = AvlMap::new();

    for key in 0..4096 {
        map.insert(key, ());

        let bound = 1.45 * ((map.len() + 2) as f64).log2();
        assert!(
            map.height() as f64 <= bound,
            "height {} exceeds {bound} at {} entries",
            map.height(),
            map.len()
        );
    }
    map.assert_invariants();

    for key in (0..4096).step_by(3) {
        map.remove(&key);
    }
    map.assert_invariants();
    assert!(map.height() as f64 <= 1.45 * ((map.len() + 2) as f64).log2());
}

#[test]
fn removal_keeps_other_nodes() {
    let mut map: AvlMap<u32, u32> = (0..64).map(|k| (k, k)).collect();
    let ids: Vec<(u32, NodeId)> = (0..64)
        .filter(|k| k % 4 != 0)
        .map(|k| (k, map.tree.find(&k).unwrap()))
        .collect();

    for key in (0..64).step_by(4) {
        map.remove(&key);
    }
    map.assert_invariants();

    for (key, id) in ids {
        assert_eq!(map.tree.find(&key), Some(id));
        assert_eq!(map.tree.key(id), &key);
    }
}

#[test]
fn freed_slots_are_reused() {
    let mut map: AvlMap<u32, u32> = (0..8).map(|k| (k, k)).collect();
    map.remove(&3);
    map.remove(&5);
    map.insert(30, 30);
    map.insert(50, 50);
    map.assert_invariants();

    assert_eq!(map.tree.nodes.len(), 8);
    assert_eq!(map.values.len(), 8);
}

#[test]
fn debug_output_is_sorted() {
    let map: AvlMap<u32, char> = [(2, 'b'), (1, 'a'), (3, 'c')].into_iter().collect();
    assert_eq!(format!("{map:?}"), "{1: 'a', 2: 'b', 3: 'c'}");
}

// Only relies on the bounds a caller generic over the key type would have.
fn bump_all<K, V>(map: &mut AvlMap<K, V>, bump: impl Fn(&mut V)) -> String
where
    K: Ord + Clone + std::fmt::Debug,
    V: Clone + Eq + std::fmt::Debug,
{
    let before = map.clone();
    assert_eq!(*map, before);

    for (_, value) in &mut *map {
        bump(value);
    }
    assert_eq!((&*map).into_iter().count(), before.len());

    format!("{map:?}")
}

#[test]
fn generic_key_traits() {
    let mut map: AvlMap<String, u64> = [("b".to_owned(), 2), ("a".to_owned(), 1)]
        .into_iter()
        .collect();

    let out = bump_all(&mut map, |v| *v += 1);
    assert_eq!(out, r#"{"a": 2, "b": 3}"#);
    assert_eq!(map["a"], 2);
}

#[test]
fn clone_from_replaces_contents() {
    let mut src: AvlMap<u32, String> = (0..16).map(|k| (k, k.to_string())).collect();
    let mut dst: AvlMap<u32, String> = (100..140).map(|k| (k, String::new())).collect();

    dst.clone_from(&src);
    dst.assert_invariants();
    assert_eq!(dst, src);
    assert_eq!(dst.height(), src.height());
    assert!(!dst.contains_key(&100));

    dst.insert(200, "two hundred".to_owned());
    dst.remove(&3);
    dst.get_mut(&5).unwrap().push('!');
    src.remove(&4);

    assert!(src.contains_key(&3));
    assert!(!src.contains_key(&200));
    assert_eq!(src[&5], "5");
    assert!(dst.contains_key(&4));
    assert_eq!(dst[&5], "5!");

    src.assert_invariants();
    dst.assert_invariants();
}

#[cfg(miri)]
const FUZZ_RANGE: Range<usize> = 0..10;

#[cfg(not(miri))]
const FUZZ_RANGE: Range<usize> = 0..1000;

proptest::proptest! {
    #![proptest_config(ProptestConfig {
        max_shrink_iters: 65536,
        .. ProptestConfig::default()
    })]

    #[test]
    fn btree_equivalence(ops in proptest::collection::vec(model::op_strategy(), FUZZ_RANGE)) {
        model::run_btree_equivalence(ops);
    }

    #[test]
    fn cursor_equivalence(
        keys in proptest::collection::vec(0u32..500, 0..100),
        ops in proptest::collection::vec(model::cursor_op_strategy(), FUZZ_RANGE),
    ) {
        model::run_cursor_equivalence(keys, ops);
    }
}

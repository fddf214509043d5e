//! Differential testing of [`AvlMap`] against standard library models.
//!
//! Used by the crate's property tests and by the fuzz targets under `fuzz/`.

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use proptest::strategy::{Just, Strategy};

use crate::{AvlMap, Error};

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum ItemValue {
    /// Index into the keys currently in the map, so that operations hit existing entries.
    Index(usize),
    Random(u32),
}

proptest::prop_compose! {
    fn index_strategy()(
        index in 0usize..1000,
    ) -> ItemValue {
        ItemValue::Index(index)
    }
}

proptest::prop_compose! {
    fn random_strategy()(
        random in 0u32..1000,
    ) -> ItemValue {
        ItemValue::Random(random)
    }
}

fn item_strategy() -> impl Strategy<Value = ItemValue> {
    proptest::prop_oneof![index_strategy(), random_strategy()]
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum Op {
    Insert(ItemValue, u32),
    Get(ItemValue),
    ContainsKey(ItemValue),
    Remove(ItemValue),
    GetOrInsertDefault(ItemValue),
    First,
    PopFirst,
    Last,
    PopLast,
    Clone,
}

impl Op {
    fn finalize(self, keys: &[u32]) -> FinalOp {
        fn get_key(keys: &[u32], item: ItemValue) -> u32 {
            match item {
                ItemValue::Index(idx) => {
                    if keys.is_empty() {
                        idx as u32
                    } else {
                        keys[idx % keys.len()]
                    }
                }
                ItemValue::Random(key) => key,
            }
        }

        match self {
            Op::Insert(item, value) => FinalOp::Insert(get_key(keys, item), value),
            Op::Get(item) => FinalOp::Get(get_key(keys, item)),
            Op::ContainsKey(item) => FinalOp::ContainsKey(get_key(keys, item)),
            Op::Remove(item) => FinalOp::Remove(get_key(keys, item)),
            Op::GetOrInsertDefault(item) => FinalOp::GetOrInsertDefault(get_key(keys, item)),
            Op::First => FinalOp::First,
            Op::PopFirst => FinalOp::PopFirst,
            Op::Last => FinalOp::Last,
            Op::PopLast => FinalOp::PopLast,
            Op::Clone => FinalOp::Clone,
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum FinalOp {
    Insert(u32, u32),
    Get(u32),
    ContainsKey(u32),
    Remove(u32),
    GetOrInsertDefault(u32),
    First,
    PopFirst,
    Last,
    PopLast,
    Clone,
}

pub fn op_strategy() -> impl Strategy<Value = Op> {
    proptest::prop_oneof![
        (item_strategy(), proptest::num::u32::ANY).prop_map(|(k, v)| Op::Insert(k, v)),
        item_strategy().prop_map(Op::Get),
        item_strategy().prop_map(Op::ContainsKey),
        item_strategy().prop_map(Op::Remove),
        item_strategy().prop_map(Op::GetOrInsertDefault),
        Just(Op::First),
        Just(Op::PopFirst),
        Just(Op::Last),
        Just(Op::PopLast),
        Just(Op::Clone),
    ]
}

/// Applies `ops` to both an [`AvlMap`] and a [`BTreeMap`], asserting identical results and the
/// tree invariants after every operation.
pub fn run_btree_equivalence(ops: Vec<Op>) {
    let mut btree: BTreeMap<u32, u32> = BTreeMap::new();
    let mut avl: AvlMap<u32, u32> = AvlMap::new();

    let mut final_ops = Vec::with_capacity(ops.len());
    for (op_id, op) in ops.into_iter().enumerate() {
        let keys: Vec<u32> = btree.keys().copied().collect();
        let final_op = op.finalize(&keys);
        final_ops.push(final_op);

        match final_op {
            FinalOp::Insert(key, value) => {
                let from_btree = btree.insert(key, value);
                let from_avl = avl.insert(key, value);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Get(key) => {
                let from_btree = btree.get(&key).ok_or(Error::NotFound);
                let from_avl = avl.get(&key);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::ContainsKey(key) => {
                let from_btree = btree.contains_key(&key);
                let from_avl = avl.contains_key(&key);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Remove(key) => {
                let from_btree = btree.remove(&key);
                let from_avl = avl.remove(&key);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::GetOrInsertDefault(key) => {
                let from_btree = *btree.entry(key).or_default();
                let from_avl = *avl.get_or_insert_default(key);

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::First => {
                let from_btree = btree.first_key_value();
                let from_avl = avl.first_key_value();

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::PopFirst => {
                let from_btree = btree.pop_first();
                let from_avl = avl.pop_first();

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Last => {
                let from_btree = btree.last_key_value();
                let from_avl = avl.last_key_value();

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::PopLast => {
                let from_btree = btree.pop_last();
                let from_avl = avl.pop_last();

                assert_eq!(from_btree, from_avl, "FinalOp #{op_id}: {final_op:?}");
            }

            FinalOp::Clone => {
                let copy = avl.clone();
                copy.assert_invariants();

                assert_eq!(copy, avl, "FinalOp #{op_id}: {final_op:?}");
                avl = copy;
            }
        }

        avl.assert_invariants();
        assert_eq!(btree.len(), avl.len());
        assert!(btree.iter().eq(avl.iter()), "FinalOp #{op_id}: {final_op:?}");
        assert!(
            btree.iter().rev().eq(avl.iter().rev()),
            "FinalOp #{op_id}: {final_op:?}"
        );
    }
}

#[derive(Clone, Debug, Arbitrary)]
pub enum CursorOp {
    // Get is not an operation as it's executed on every loop iteration to check equivalence.
    MovePrev,
    MoveNext,
    PeekNext,
    PeekPrev,
    SetValue(u32),
}

pub fn cursor_op_strategy() -> impl Strategy<Value = CursorOp> {
    proptest::prop_oneof![
        Just(CursorOp::MovePrev),
        Just(CursorOp::MoveNext),
        Just(CursorOp::PeekNext),
        Just(CursorOp::PeekPrev),
        proptest::num::u32::ANY.prop_map(CursorOp::SetValue),
    ]
}

#[derive(Clone, Debug)]
pub struct CursorEquivalenceInput {
    pub keys: Vec<u32>,
    pub ops: Vec<CursorOp>,
}

impl<'a> arbitrary::Arbitrary<'a> for CursorEquivalenceInput {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        fn key(u: &mut arbitrary::Unstructured<'_>) -> u32 {
            u32::arbitrary(u).unwrap_or(0)
        }

        fn op(u: &mut arbitrary::Unstructured<'_>) -> CursorOp {
            CursorOp::arbitrary(u).unwrap_or(CursorOp::MoveNext)
        }

        let num_keys = u8::arbitrary(u)? % 100;
        let num_ops = u16::arbitrary(u)? % 1000;

        let keys = core::iter::repeat_with(|| key(u))
            .take(num_keys.into())
            .collect();

        let ops = core::iter::repeat_with(|| op(u))
            .take(num_ops.into())
            .collect();

        Ok(CursorEquivalenceInput { keys, ops })
    }
}

/// Drives a [`CursorMut`](crate::CursorMut) and a cursor over a sorted `Vec` in lockstep.
///
/// Both cursors start at the first element. `None` stands for the "end" position of the vector
/// cursor.
pub fn run_cursor_equivalence(keys: Vec<u32>, ops: Vec<CursorOp>) {
    let mut vec: Vec<(u32, u32)> = Vec::new();
    let mut avl: AvlMap<u32, u32> = AvlMap::new();

    for key in keys {
        avl.insert(key, key);
    }
    vec.extend(avl.iter().map(|(&k, &v)| (k, v)));

    fn vec_curs_next(v: &[(u32, u32)], curs: Option<usize>) -> Result<Option<usize>, Error> {
        match curs {
            Some(i) => Ok(i.checked_add(1).filter(|&i| i < v.len())),
            None => Err(Error::IteratorOutOfRange),
        }
    }

    fn vec_curs_prev(v: &[(u32, u32)], curs: Option<usize>) -> Result<Option<usize>, Error> {
        match curs {
            Some(i) => Ok(i.checked_sub(1)),
            None => v.len().checked_sub(1).map(Some).ok_or(Error::IteratorOutOfRange),
        }
    }

    fn vec_get(v: &[(u32, u32)], curs: Option<usize>) -> Option<(&u32, &u32)> {
        curs.map(|i| (&v[i].0, &v[i].1))
    }

    let mut vec_curs = (!vec.is_empty()).then_some(0);
    let mut avl_curs = avl.cursor_first_mut();

    // Check that the initial states are equivalent.
    assert_eq!(vec_get(&vec, vec_curs), avl_curs.get());

    for op in ops {
        match op {
            CursorOp::MoveNext => {
                let v = vec_curs_next(&vec, vec_curs);
                let a = avl_curs.move_next();

                assert_eq!(v.map(|_| ()), a);
                if let Ok(next) = v {
                    vec_curs = next;
                }
            }

            CursorOp::MovePrev => {
                let v = vec_curs_prev(&vec, vec_curs);
                let a = avl_curs.move_prev();

                assert_eq!(v.map(|_| ()), a);
                if let Ok(prev) = v {
                    vec_curs = prev;
                }
            }

            CursorOp::PeekNext => {
                let v = vec_curs_next(&vec, vec_curs)
                    .ok()
                    .flatten()
                    .and_then(|i| vec_get(&vec, Some(i)));
                let a = avl_curs.peek_next();

                assert_eq!(v, a);
            }

            CursorOp::PeekPrev => {
                let v = vec_curs_prev(&vec, vec_curs)
                    .ok()
                    .flatten()
                    .and_then(|i| vec_get(&vec, Some(i)));
                let a = avl_curs.peek_prev();

                assert_eq!(v, a);
            }

            CursorOp::SetValue(value) => {
                if let Some(i) = vec_curs {
                    vec[i].1 = value;
                }

                if let Some(slot) = avl_curs.value_mut() {
                    *slot = value;
                }
            }
        }

        assert_eq!(vec_get(&vec, vec_curs), avl_curs.get());
    }

    drop(avl_curs);
    avl.assert_invariants();
    assert!(vec.iter().map(|(k, v)| (k, v)).eq(avl.iter()));
}

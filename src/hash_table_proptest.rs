#![cfg(test)]

// Property tests for HashTable kept inside the crate so they can check
// bucket placement and arena state directly.

use crate::chain::bucket_index;
use crate::config::{HashTableBuilder, RehashPolicy};
use crate::hash_table::HashTable;
use crate::sizing::is_probable_prime;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};

// Pool-indexed operations so shrinking moves towards earlier keys and
// shorter op lists.
#[derive(Clone, Debug)]
enum OpI {
    Put(usize, i32),
    Remove(usize),
    Get(usize),
    ContainsValue(i32),
    Rehash(usize),
    AutoRehash,
    Clear,
    Walk,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=12).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Put(i, v)),
            2 => idx.clone().prop_map(OpI::Remove),
            2 => idx.clone().prop_map(OpI::Get),
            1 => (-3i32..3).prop_map(OpI::ContainsValue),
            1 => (1usize..40).prop_map(OpI::Rehash),
            1 => Just(OpI::AutoRehash),
            1 => Just(OpI::Clear),
            1 => Just(OpI::Walk),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn placement_holds(t: &HashTable<String, i32>, hash: &dyn Fn(&String) -> u64) -> bool {
    let mut seen = 0;
    for bucket in 0..t.bucket_count() {
        let mut link = t.chains.head(bucket);
        while let Some(slot) = link {
            let Some(e) = t.chains.entry(slot) else {
                return false;
            };
            if bucket_index(hash(&e.key), t.bucket_count()) != bucket {
                return false;
            }
            seen += 1;
            link = e.next;
        }
    }
    seen == t.len()
}

fn run(
    mut sut: HashTable<String, i32>,
    hash: &dyn Fn(&String) -> u64,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<String, i32> = HashMap::new();

    for op in ops {
        match op {
            OpI::Put(i, v) => {
                let k = pool[i].clone();
                let before = sut.len();
                let existed = model.insert(k.clone(), v).is_some();
                sut.put(k.clone(), v).expect("put");
                prop_assert_eq!(sut.len(), if existed { before } else { before + 1 });
                prop_assert_eq!(sut.get(&k), Some(&v));
            }
            OpI::Remove(i) => {
                let k = &pool[i];
                let before = sut.len();
                let removed = sut.remove(k);
                prop_assert_eq!(removed, model.remove(k).is_some());
                prop_assert_eq!(sut.len(), if removed { before - 1 } else { before });
                prop_assert!(sut.get(k).is_none());
            }
            OpI::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k), model.get(k));
                prop_assert_eq!(sut.contains_key(k), model.contains_key(k));
            }
            OpI::ContainsValue(v) => {
                let in_model = model.values().any(|&mv| mv == v);
                prop_assert_eq!(sut.contains_value(&v), in_model);
            }
            OpI::Rehash(n) => {
                sut.rehash(n);
                prop_assert_eq!(sut.bucket_count(), n);
            }
            OpI::AutoRehash => {
                sut.rehash(0);
                prop_assert!(is_probable_prime(sut.bucket_count()));
                prop_assert!(sut.bucket_count() >= 5);
            }
            OpI::Clear => {
                sut.remove_all();
                model.clear();
                prop_assert_eq!(sut.bucket_count(), 5);
            }
            OpI::Walk => {
                let mut keys = Vec::new();
                let mut step = sut.first();
                while let Some((cursor, k, v)) = step {
                    prop_assert_eq!(model.get(k), Some(v));
                    keys.push(k.clone());
                    step = sut.next(cursor);
                }
                let unique: BTreeSet<_> = keys.iter().cloned().collect();
                prop_assert_eq!(unique.len(), keys.len(), "no key visited twice");
                let m_keys: BTreeSet<_> = model.keys().cloned().collect();
                prop_assert_eq!(unique, m_keys);
            }
        }

        // Post-conditions after each op
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert_eq!(sut.iter().count(), model.len());
        prop_assert!(sut.bucket_count() > 0);
        prop_assert!(placement_holds(&sut, hash), "entry outside its bucket");
    }
    Ok(())
}

// Property: state-machine equivalence against std::collections::HashMap.
// - put overwrites or grows by exactly one; get returns the newest value.
// - remove shrinks by exactly one iff the key was present.
// - A full cursor walk visits every key once.
// - Every entry sits in hash(key) % bucket_count after every op, including
//   automatic and explicit rehashes.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let hash = |k: &String| k.len() as u64 * 0x9e37_79b9 + k.bytes().map(u64::from).sum::<u64>();
        let sut = HashTableBuilder::<String, i32>::by_content(3)
            .hash_function(Box::new(hash))
            .rehash_policy(RehashPolicy::new(1.0, 0.5, 2.0))
            .build()
            .unwrap();
        run(sut, &hash, &pool, ops)?;
    }
}

// Property: the same invariants when every key collides into one chain.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let hash = |_: &String| 0u64;
        let sut = HashTableBuilder::<String, i32>::by_content(5)
            .hash_function(Box::new(hash))
            .build()
            .unwrap();
        run(sut, &hash, &pool, ops)?;
    }
}

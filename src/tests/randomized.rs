use crate::{MultiTree, Tree};
use ordered_float::OrderedFloat;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use std::collections::BTreeMap;

#[test]
fn tree_matches_btree_map() {
    fn check(seed: u64, key_range: i32, steps: usize) {
        let mut rng = Pcg64::seed_from_u64(seed);
        let mut tree = Tree::new();
        let mut model = BTreeMap::new();

        for _ in 0..steps {
            let key = rng.gen_range(0..key_range);
            if rng.gen_bool(0.6) {
                let value = rng.gen::<u32>();
                assert_eq!(tree.insert(key, value), model.insert(key, value));
            } else {
                assert_eq!(tree.delete(&key), model.remove(&key));
            }
            tree.validate();
            assert_eq!(tree.len(), model.len());
        }

        assert!(tree.iter().eq(model.iter()));
        assert_eq!(
            tree.get_min_node().map(|node| *node.key()),
            model.keys().next().copied()
        );
        assert_eq!(
            tree.get_max_node().map(|node| *node.key()),
            model.keys().next_back().copied()
        );
        for key in 0..key_range {
            let expected = model.range(key + 1..).next().map(|(key, _)| *key);
            let successor = tree.get_successor_node(&key).map(|node| *node.key());
            if model.contains_key(&key) {
                assert_eq!(successor, expected);
            } else {
                assert_eq!(successor, None);
            }
        }
    }

    check(1, 10, 200);
    check(2, 100, 2_000);
    check(3, 1_000, 5_000);
}

#[test]
fn height_stays_logarithmic() {
    let mut rng = Pcg64::seed_from_u64(17);
    let mut tree = Tree::new();
    for _ in 0..10_000 {
        tree.insert(rng.gen::<u64>(), ());
    }
    // AVL bound: height < 1.44 * log2(n + 2)
    let bound = 1.44 * ((tree.len() + 2) as f64).log2();
    assert!((tree.height() as f64) < bound, "height {}", tree.height());
    tree.validate();
}

#[test]
fn float_keys() {
    let mut rng = Pcg64::seed_from_u64(42);
    let mut tree = Tree::new();
    let mut values = Vec::new();
    for _ in 0..500 {
        let value: f64 = rng.gen();
        tree.insert(OrderedFloat(value), value.to_string());
        values.push(value);
    }
    tree.validate();

    values.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(tree.get_min_node().unwrap().key().into_inner(), values[0]);
    assert_eq!(
        tree.get_max_node().unwrap().key().into_inner(),
        values[values.len() - 1]
    );
    let collected = tree.iter().map(|(key, _)| key.into_inner()).collect::<Vec<_>>();
    assert_eq!(collected, values);
}

#[test]
fn multi_tree_matches_btree_map() {
    fn random_key(rng: &mut Pcg64, len: usize) -> Vec<i32> {
        (0..len).map(|_| rng.gen_range(0..4)).collect()
    }

    fn check(seed: u64, dimensions: usize, steps: usize) {
        let mut rng = Pcg64::seed_from_u64(seed);
        let mut tree = MultiTree::new(dimensions);
        let mut model: BTreeMap<Vec<i32>, u32> = BTreeMap::new();

        for _ in 0..steps {
            match rng.gen_range(0..10) {
                0..=5 => {
                    let key = random_key(&mut rng, dimensions);
                    let value = rng.gen::<u32>();
                    assert_eq!(tree.insert(&key, value), Ok(model.insert(key, value)));
                }
                6 | 7 => {
                    let key = random_key(&mut rng, dimensions);
                    let removed = tree.delete(&key).unwrap().and_then(|r| r.into_data());
                    assert_eq!(removed, model.remove(&key));
                }
                8 => {
                    let len = rng.gen_range(1..=dimensions);
                    let prefix = random_key(&mut rng, len);
                    let matching = model
                        .keys()
                        .filter(|key| key.starts_with(&prefix))
                        .cloned()
                        .collect::<Vec<_>>();
                    for key in matching.iter() {
                        model.remove(key);
                    }

                    match tree.delete(&prefix).unwrap() {
                        None => assert!(matching.is_empty()),
                        Some(removed) if len == dimensions => {
                            assert_eq!(matching.len(), 1);
                            assert!(removed.into_data().is_some());
                        }
                        Some(removed) => {
                            let subtree = removed.into_subtree().unwrap();
                            assert_eq!(subtree.dimensions(), dimensions - len);
                            assert_eq!(subtree.len(), matching.len());
                            subtree.validate();
                        }
                    }
                }
                _ => {
                    let key = random_key(&mut rng, dimensions);
                    assert_eq!(tree.find_data_by_key(&key), Ok(model.get(&key)));
                }
            }

            tree.validate();
            assert_eq!(tree.len(), model.len());
            assert_eq!(tree.get_min_data(), model.values().next());
            assert_eq!(tree.get_max_data(), model.values().next_back());
        }
    }

    check(1, 1, 500);
    check(2, 2, 1_000);
    check(3, 3, 2_000);
    check(4, 4, 2_000);
}

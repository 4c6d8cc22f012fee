use crate::node::Tree;
use crate::*;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use std::collections::BTreeMap as StdMap;

fn scan_keys<V>(t: &BTree<V>) -> Vec<Key> {
    let mut a = Vec::new();
    t.scan(|k, _| {
        a.push(k);
        true
    });
    a
}

fn reverse_keys<V>(t: &BTree<V>) -> Vec<Key> {
    let mut a = Vec::new();
    t.reverse(|k, _| {
        a.push(k);
        true
    });
    a
}

fn ascend_keys<V>(t: &BTree<V>, pivot: Key) -> Vec<Key> {
    let mut a = Vec::new();
    t.ascend(pivot, |k, _| {
        a.push(k);
        true
    });
    a
}

fn descend_keys<V>(t: &BTree<V>, pivot: Key) -> Vec<Key> {
    let mut a = Vec::new();
    t.descend(pivot, |k, _| {
        a.push(k);
        true
    });
    a
}

fn perm(rng: &mut StdRng, n: Key) -> Vec<Key> {
    let mut keys: Vec<Key> = (0..n).collect();
    keys.shuffle(rng);
    keys
}

#[test]
fn empty_tree_test() {
    let mut t = BTree::<i64>::default();
    assert_eq!(t.len(), 0);
    assert!(t.is_empty());
    assert_eq!(t.height(), 0);
    assert_eq!(t.get(1), None);
    assert_eq!(t.delete(1), None);
    assert_eq!(t.get_or_nearest(5), None);
    assert_eq!(t.next(5), None);
    assert_eq!(t.prev(5), None);

    let mut count = 0;
    t.scan(|_, _| {
        count += 1;
        true
    });
    t.reverse(|_, _| {
        count += 1;
        true
    });
    t.ascend(1, |_, _| {
        count += 1;
        true
    });
    t.descend(1, |_, _| {
        count += 1;
        true
    });
    assert_eq!(count, 0);

    assert_eq!(t.iter().next(), None);
    assert_eq!(t.range(0..10).next_back(), None);
    assert_eq!(t.first_key_value(), None);
    assert!(t.validate().is_ok());
}

#[test]
fn set_delete_one_test() {
    let mut t = BTree::new();
    for _rep in 0..3 {
        assert_eq!(t.set(1, "1"), None);
        assert_eq!(t.len(), 1);
        assert_eq!(t.delete(1), Some("1"));
        assert!(t.root.is_none());
        assert_eq!(t.height(), 0);
        t.validate().unwrap();
    }
}

#[test]
fn set_replace_test() {
    let mut t = BTree::new();
    for i in 0..100 {
        t.set(i, i);
    }
    assert_eq!(t.set(50, 500), Some(50));
    assert_eq!(t.set(0, -1), Some(0));
    assert_eq!(t.len(), 100);
    assert_eq!(t.get(50), Some(&500));
    assert_eq!(t.get(0), Some(&-1));
    t.validate().unwrap();

    *t.get_mut(7).unwrap() += 1000;
    assert_eq!(t[7], 1007);
    assert_eq!(t.get_mut(1000), None);
}

#[test]
fn delete_absent_test() {
    let mut t: BTree<i64> = (0..500).map(|k| (k * 2, k)).collect();
    assert_eq!(t.delete(3), None);
    assert_eq!(t.delete(-1), None);
    assert_eq!(t.delete(10_000), None);
    assert_eq!(t.len(), 500);
    assert_eq!(t.delete(4), Some(2));
    assert_eq!(t.delete(4), None);
    assert_eq!(t.len(), 499);
    t.validate().unwrap();
}

#[test]
fn tree_256_test() {
    let mut rng = StdRng::seed_from_u64(256);
    let mut t = BTree::new();
    let mut n = 0;
    for _rep in 0..2 {
        for i in perm(&mut rng, 256) {
            assert_eq!(t.set(i, i), None);
            n += 1;
            assert_eq!(t.len(), n);
        }
        t.validate().unwrap();
        for i in perm(&mut rng, 256) {
            assert_eq!(t.get(i), Some(&i));
        }
        for i in perm(&mut rng, 256) {
            assert_eq!(t.delete(i), Some(i));
            n -= 1;
            assert_eq!(t.len(), n);
        }
        for i in perm(&mut rng, 256) {
            assert_eq!(t.get(i), None);
        }
        t.validate().unwrap();
    }
}

#[test]
fn height_test() {
    let mut t = BTree::new();
    for i in 0..MAX_ITEMS as Key - 1 {
        t.set(i, ());
    }
    assert_eq!(t.height(), 0);
    t.set(1_000_000, ());
    assert_eq!(t.height(), 1);
    t.validate().unwrap();

    for i in 0..100_000 {
        t.set(i, ());
    }
    assert!(t.height() >= 2 && t.height() <= 6);
    t.validate().unwrap();

    let mut last = t.height();
    for i in 0..100_000 {
        t.delete(i);
        assert!(t.height() <= last);
        last = t.height();
        if i % 10_000 == 0 {
            t.validate().unwrap();
        }
    }
    assert_eq!(t.len(), 1);
    assert_eq!(t.height(), 0);
    assert_eq!(t.delete(1_000_000), Some(()));
    assert!(t.root.is_none());
    t.validate().unwrap();
}

#[test]
fn floor_test() {
    let mut t = BTree::new();
    let mut model = StdMap::new();
    for i in (0..200).step_by(2) {
        t.set(i, i);
        model.insert(i, i);
    }
    assert_eq!(t.get_or_nearest(61), Some((60, &60)));
    assert_eq!(t.get_or_nearest(63), Some((62, &62)));
    assert_eq!(t.get_or_nearest(202), Some((198, &198)));
    assert_eq!(t.get_or_nearest(0), Some((0, &0)));
    assert_eq!(t.get_or_nearest(-1), None);
    for q in -5..210 {
        let expect = model.range(..=q).next_back().map(|(k, v)| (*k, v));
        assert_eq!(t.get_or_nearest(q), expect, "q={q}");
    }
}

#[test]
fn floor_deep_test() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut t = BTree::new();
    let mut model = StdMap::new();
    for _ in 0..20_000 {
        let k = rng.gen_range(0..1_000_000) * 7;
        t.set(k, k);
        model.insert(k, k);
    }
    assert!(t.height() >= 2);
    for _ in 0..20_000 {
        let q = rng.gen_range(-10..7_000_010);
        let expect = model.range(..=q).next_back().map(|(k, v)| (*k, v));
        assert_eq!(t.get_or_nearest(q), expect, "q={q}");
    }
    for k in model.keys() {
        assert_eq!(t.get_or_nearest(*k), Some((*k, k)));
        assert_eq!(t.get_or_nearest(*k + 1), Some((*k, k)));
    }
}

#[test]
fn pivot_scan_test() {
    let mut t = BTree::new();
    let mut count = 0;
    t.set(0, ());
    t.delete(0);
    t.descend(1, |_, _| {
        count += 1;
        true
    });
    assert_eq!(count, 0);

    for i in (0..1000).step_by(10) {
        t.set(i, ());
    }
    let all: Vec<Key> = (0..1000).step_by(10).collect();
    assert_eq!(ascend_keys(&t, 5), all[1..].to_vec());
    assert_eq!(descend_keys(&t, 5), vec![0]);
    assert_eq!(ascend_keys(&t, -1), all);
    assert_eq!(descend_keys(&t, -1), Vec::<Key>::new());
    assert_eq!(ascend_keys(&t, 991), Vec::<Key>::new());

    for i in -1..1001 {
        let up: Vec<Key> = all.iter().copied().filter(|k| *k >= i).collect();
        let down: Vec<Key> = all.iter().copied().filter(|k| *k <= i).rev().collect();
        assert_eq!(ascend_keys(&t, i), up, "i={i}");
        assert_eq!(descend_keys(&t, i), down, "i={i}");

        let mut g = Vec::new();
        t.greater_or_equal(i, |k, _| {
            g.push(k);
            true
        });
        assert_eq!(g, up);
        let mut l = Vec::new();
        t.less_or_equal(i, |k, _| {
            l.push(k);
            true
        });
        assert_eq!(l, down);
    }
}

#[test]
fn early_stop_test() {
    let t: BTree<()> = (0..1000).map(|k| (k, ())).collect();
    assert!(t.height() >= 1);

    let mut seen = Vec::new();
    t.scan(|k, _| {
        seen.push(k);
        seen.len() < 7
    });
    assert_eq!(seen, (0..7).collect::<Vec<_>>());

    let mut seen = Vec::new();
    t.reverse(|k, _| {
        seen.push(k);
        seen.len() < 7
    });
    assert_eq!(seen, (993..1000).rev().collect::<Vec<_>>());

    for pivot in [0, 15, 16, 500, 997] {
        let mut seen = Vec::new();
        t.ascend(pivot, |k, _| {
            seen.push(k);
            seen.len() < 3
        });
        assert_eq!(seen, (pivot..pivot + 3).collect::<Vec<_>>());

        let mut seen = Vec::new();
        t.descend(pivot + 2, |k, _| {
            seen.push(k);
            seen.len() < 3
        });
        assert_eq!(seen, (pivot..pivot + 3).rev().collect::<Vec<_>>());
    }

    // A stop inside a leaf must not resume at the parent.
    for n in 1..100 {
        let mut calls = 0;
        t.scan(|_, _| {
            calls += 1;
            calls < n
        });
        assert_eq!(calls, n);
    }
}

#[test]
fn next_prev_test() {
    let mut t = BTree::new();
    let mut model = StdMap::new();
    for i in (0..1000).step_by(2) {
        t.set(i, i * 3);
        model.insert(i, i * 3);
    }
    assert_eq!(t.next(10), Some((12, &36)));
    assert_eq!(t.prev(10), Some((8, &24)));
    assert_eq!(t.next(998), None);
    assert_eq!(t.prev(0), None);
    for k in model.keys() {
        let next = model.range(k + 1..).next().map(|(k, v)| (*k, v));
        let prev = model.range(..*k).next_back().map(|(k, v)| (*k, v));
        assert_eq!(t.next(*k), next, "k={k}");
        assert_eq!(t.prev(*k), prev, "k={k}");
    }

    assert_eq!(t.try_next(11), Err(Error::MissingPivot(11)));
    assert_eq!(t.try_prev(11), Err(Error::MissingPivot(11)));
    assert_eq!(t.try_next(10), Ok(Some((12, &36))));
    assert_eq!(t.try_prev(10), Ok(Some((8, &24))));
    assert_eq!(t.try_prev(0), Ok(None));
}

#[test]
fn reserved_key_test() {
    let mut t = BTree::new();
    assert_eq!(t.try_set(Key::MIN, 1), Err(Error::ReservedKey(Key::MIN)));
    assert!(t.is_empty());
    assert_eq!(t.try_set(Key::MIN + 1, 1), Ok(None));
    assert_eq!(t.try_set(Key::MIN + 1, 2), Ok(Some(1)));
    assert_eq!(t.get_or_nearest(Key::MIN + 1), Some((Key::MIN + 1, &2)));
    assert_eq!(t.get_or_nearest(Key::MIN), None);
}

#[test]
fn stress_10000_test() {
    let mut rng = StdRng::seed_from_u64(10_000);
    let mut t = BTree::new();
    let keys = perm(&mut rng, 10_000);
    for k in &keys {
        assert_eq!(t.set(*k, *k), None);
    }
    assert_eq!(t.len(), 10_000);
    t.validate().unwrap();
    assert_eq!(scan_keys(&t), (0..10_000).collect::<Vec<_>>());

    let keys = perm(&mut rng, 10_000);
    for (n, k) in keys.iter().enumerate() {
        assert_eq!(t.delete(*k), Some(*k));
        if n % 1000 == 0 {
            t.validate().unwrap();
        }
    }
    assert_eq!(t.len(), 0);
    assert!(t.root.is_none());
    assert_eq!(t.height(), 0);
    t.validate().unwrap();
}

#[test]
fn random_subset_test() {
    let mut rng = StdRng::seed_from_u64(1000);
    for _rep in 0..50 {
        let mut t = BTree::new();
        let mut keys = perm(&mut rng, 1000);
        let n = rng.gen_range(0..keys.len());
        keys.truncate(n);
        for k in &keys {
            assert_eq!(t.set(*k, *k), None);
        }
        keys.shuffle(&mut rng);
        for k in &keys {
            assert_eq!(t.get(*k), Some(k));
        }
        t.validate().unwrap();
        keys.shuffle(&mut rng);
        for k in &keys {
            assert_eq!(t.delete(*k), Some(*k));
            assert_eq!(t.get(*k), None);
        }
        assert!(t.is_empty());
        t.validate().unwrap();
    }
}

#[test]
fn random_model_test() {
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut t = BTree::new();
        let mut model = StdMap::new();
        for step in 0..5000usize {
            let k = rng.gen_range(0..2000);
            match rng.gen_range(0..3) {
                0 => assert_eq!(t.set(k, step), model.insert(k, step)),
                1 => assert_eq!(t.get(k), model.get(&k)),
                _ => assert_eq!(t.delete(k), model.remove(&k)),
            }
            assert_eq!(t.len(), model.len());
            if step % 500 == 0 {
                t.validate().unwrap();
            }
        }
        t.validate().unwrap();
        assert!(t.iter().eq(model.iter().map(|(k, v)| (*k, v))));
        assert!(t.iter().rev().eq(model.iter().rev().map(|(k, v)| (*k, v))));
        let mut r = scan_keys(&t);
        r.reverse();
        assert_eq!(reverse_keys(&t), r);
    }
}

#[test]
fn scan_random_keys_test() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut t = BTree::new();
    let mut e = Vec::new();
    for _ in 0..1000 {
        let k = rng.gen_range(Key::MIN + 1..=Key::MAX);
        t.set(k, "x");
        e.push(k);
    }
    e.sort_unstable();
    e.dedup();
    assert_eq!(t.len(), e.len());
    assert_eq!(scan_keys(&t), e);

    let i = e.len() / 2 - 5 + rng.gen_range(0..10);
    assert_eq!(ascend_keys(&t, e[i]), e[i..].to_vec());
    let mut er = e[..=i].to_vec();
    er.reverse();
    assert_eq!(descend_keys(&t, e[i]), er);
}

#[test]
fn iter_test() {
    let t: BTree<Key> = (0..1000).map(|k| (k, k * 2)).collect();
    assert_eq!(t.iter().len(), 1000);
    assert!(t.iter().eq((0..1000).map(|k| (k, &t[k]))));
    assert!(t.keys().rev().eq((0..1000).rev()));
    assert!(t.values().eq((0..1000).map(|k| k * 2).collect::<Vec<_>>().iter()));
    assert_eq!(t.first_key_value(), Some((0, &0)));
    assert_eq!(t.last_key_value(), Some((999, &1998)));

    // Both ends meet without repeating or skipping.
    let mut it = t.iter();
    let mut seen = Vec::new();
    loop {
        match (it.next(), it.next_back()) {
            (Some(a), Some(b)) => {
                seen.push(a.0);
                seen.push(b.0);
            }
            (Some(a), None) => seen.push(a.0),
            _ => break,
        }
    }
    seen.sort_unstable();
    assert_eq!(seen, (0..1000).collect::<Vec<_>>());

    let mut n = 0;
    for (k, v) in &t {
        assert_eq!(*v, k * 2);
        n += 1;
    }
    assert_eq!(n, 1000);
}

#[test]
fn range_test() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut t = BTree::new();
    let mut model = StdMap::new();
    for _ in 0..3000 {
        let k = rng.gen_range(0..10_000);
        t.set(k, ());
        model.insert(k, ());
    }
    for _ in 0..500 {
        let a = rng.gen_range(-10..10_010);
        let b = rng.gen_range(a..10_020);
        assert!(t.range(a..b).map(|x| x.0).eq(model.range(a..b).map(|x| *x.0)));
        assert!(t.range(a..=b).rev().map(|x| x.0).eq(model.range(a..=b).rev().map(|x| *x.0)));
        assert!(t.range(a..).map(|x| x.0).eq(model.range(a..).map(|x| *x.0)));
        assert!(t.range(..b).rev().map(|x| x.0).eq(model.range(..b).rev().map(|x| *x.0)));

        assert!(t.range(a..).map(|x| x.0).eq(ascend_keys(&t, a)));
        assert!(t.range(..=a).rev().map(|x| x.0).eq(descend_keys(&t, a)));
    }
    assert_eq!(t.range(..).count(), model.len());
}

#[test]
fn range_both_ends_test() {
    let mut rng = StdRng::seed_from_u64(11);
    let t: BTree<Key> = (0..5000).map(|k| (k * 2, k)).collect();
    let model: StdMap<Key, Key> = (0..5000).map(|k| (k * 2, k)).collect();
    assert!(t.height() >= 2);
    for _ in 0..300 {
        let a = rng.gen_range(-5..10_005);
        let b = rng.gen_range(a..10_010);
        let (mut x, mut y) = (t.range(a..=b), model.range(a..=b));
        loop {
            let (p, q) = if rng.gen_bool(0.5) {
                (x.next(), y.next())
            } else {
                (x.next_back(), y.next_back())
            };
            assert_eq!(p, q.map(|(k, v)| (*k, v)), "a={a} b={b}");
            if p.is_none() {
                break;
            }
        }
        assert_eq!(x.next(), None);
        assert_eq!(x.next_back(), None);
    }

    // Excluded bounds on keys present at every level.
    for pivot in t.keys().step_by(97) {
        let after: Vec<Key> = t
            .range((std::ops::Bound::Excluded(pivot), std::ops::Bound::Unbounded))
            .map(|x| x.0)
            .collect();
        assert_eq!(after, ascend_keys(&t, pivot + 1));
        let before: Vec<Key> = t.range(..pivot).rev().map(|x| x.0).collect();
        assert_eq!(before, descend_keys(&t, pivot - 1));
    }
}

#[test]
#[should_panic(expected = "range start is greater than range end")]
fn inverted_range_test() {
    let t: BTree<()> = (0..10).map(|k| (k, ())).collect();
    let (a, b) = (5, 1);
    let _ = t.range(a..b);
}

#[test]
#[should_panic(expected = "no entry found for key")]
fn index_missing_test() {
    let t = BTree::from([(1, 'a')]);
    let _missing = t[2];
}

#[test]
fn traits_test() {
    let t: BTree<i32> = [(3, 30), (1, 10), (2, 20)].into_iter().collect();
    assert_eq!(scan_keys(&t), vec![1, 2, 3]);
    assert_eq!(t[2], 20);
    let u = BTree::from([(1, 10), (2, 20), (3, 30)]);
    assert_eq!(t, u);
    assert_eq!(format!("{:?}", u), "{1: 10, 2: 20, 3: 30}");

    let mut c = t.clone();
    c.set(4, 40);
    assert_ne!(t, c);
    c.extend([(5, 50), (1, 11)]);
    assert_eq!(c.len(), 5);
    assert_eq!(c[1], 11);
    assert_eq!(t[1], 10);
    c.validate().unwrap();

    c.clear();
    assert!(c.is_empty());
    assert_eq!(c.height(), 0);
    c.validate().unwrap();

    let big: BTree<Key> = (0..5000).map(|k| (k, k)).collect();
    let copy = big.clone();
    copy.validate().unwrap();
    assert_eq!(big, copy);
}

#[test]
fn validate_detects_corruption_test() {
    let mut t: BTree<Key> = (0..100).map(|k| (k, k)).collect();
    t.validate().unwrap();

    t.len += 1;
    assert_eq!(
        t.validate(),
        Err(Error::LengthMismatch {
            tracked: 101,
            found: 100
        })
    );
    t.len -= 1;

    t.height += 1;
    assert!(matches!(t.validate(), Err(Error::Height { .. })));
    t.height -= 1;
    t.validate().unwrap();

    if let Some(Tree::NL(nl)) = &mut t.root {
        nl.v.ixm(0).0 = 1_000_000;
    }
    assert!(matches!(
        t.validate(),
        Err(Error::Unsorted { depth: 0 } | Error::OutOfBounds { .. })
    ));

    let mut t: BTree<Key> = (0..100).map(|k| (k, k)).collect();
    if let Some(Tree::NL(nl)) = &mut t.root {
        if let Tree::L(leaf) = nl.c.ixm(0) {
            while leaf.0.len() >= MIN_ITEMS {
                leaf.0.pop();
            }
        }
    }
    assert!(matches!(t.validate(), Err(Error::Underflow { depth: 1, .. })));
}

#[cfg(feature = "serde")]
#[test]
fn serde_test() {
    let t: BTree<String> = (0..2000).map(|k| (k * 3 - 1000, k.to_string())).collect();
    assert!(t.height() >= 2);
    let s = serde_json::to_string(&t).unwrap();
    let u: BTree<String> = serde_json::from_str(&s).unwrap();
    assert_eq!(t, u);
    u.validate().unwrap();

    let empty: BTree<String> = serde_json::from_str("{}").unwrap();
    assert!(empty.is_empty());
    empty.validate().unwrap();

    let bad = format!("{{\"1\": 1, \"{}\": 2}}", Key::MIN);
    let e = serde_json::from_str::<BTree<i32>>(&bad).unwrap_err();
    assert!(e.to_string().contains("reserved"), "{e}");
}

use std::collections::{HashMap, HashSet};

use assert_matches::assert_matches;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use deltaset_engine::engine::{Change, Collection, Error, Representation};

fn random_collection(rng: &mut StdRng, max_len: usize, range: i32) -> Collection<i32> {
    let len = rng.random_range(0..=max_len);
    (0..len).map(|_| rng.random_range(0..range)).collect()
}

#[test]
fn test_fruit_scenario() {
    let fruits = Collection::from(["apple", "apple", "banana"]);
    let mapped = fruits.map(|fruit| *fruit);

    assert_eq!(mapped.count("apple"), 2);
    assert_eq!(mapped.count("banana"), 1);
    assert_eq!(mapped.count("cherry"), 0);
    assert!(mapped.contains("banana"));
    assert!(!mapped.contains("cherry"));
    assert_eq!(mapped.total_count(), 3);
    assert_eq!(mapped.size(), 2);
}

#[test]
fn test_representations() -> eyre::Result<()> {
    assert_eq!(
        Collection::<u8>::empty().representation(),
        Representation::Empty
    );
    assert_eq!(
        Collection::singleton(1).representation(),
        Representation::Singleton
    );
    assert_eq!(
        Collection::from([1]).representation(),
        Representation::Singleton
    );
    assert_eq!(
        Collection::from([1, 1]).representation(),
        Representation::General
    );

    let general = Collection::from_counts(HashMap::from([("x", 1)]))?;
    assert_eq!(general.representation(), Representation::General);
    assert_eq!(general, Collection::singleton("x"));
    assert_eq!(Collection::singleton("x"), general);

    let empty_general = Collection::<&str>::from_counts(HashMap::new())?;
    assert_eq!(empty_general, Collection::empty());
    assert!(empty_general.is_empty());
    Ok(())
}

#[test]
fn test_operators_collapse_to_empty() {
    let numbers = Collection::from([1, 2, 2, 3]);
    let none = numbers.filter(|x| *x > 10);
    assert_eq!(none.representation(), Representation::Empty);

    let singleton = Collection::singleton(5);
    assert_eq!(
        singleton.filter(|x| *x < 0).representation(),
        Representation::Empty
    );

    let joined = numbers.join(&Collection::from([7, 8]), |x| *x, |y| *y, |x, y| (*x, *y));
    assert_eq!(joined.representation(), Representation::Empty);

    let flattened = numbers.flat_map(|_| Collection::<i32>::empty());
    assert_eq!(flattened.representation(), Representation::Empty);
}

#[test]
fn test_non_positive_multiplicity_rejected() {
    assert_matches!(
        Collection::from_counts(HashMap::from([("a", 2), ("b", 0)])),
        Err(Error::NonPositiveMultiplicity(0))
    );
    assert_matches!(
        Collection::try_from(HashMap::<&str, isize>::from([("a", -3)])),
        Err(Error::NonPositiveMultiplicity(-3))
    );
}

#[test]
fn test_concat_laws() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..50 {
        let x = random_collection(&mut rng, 20, 8);
        let y = random_collection(&mut rng, 20, 8);
        let z = random_collection(&mut rng, 20, 8);

        assert_eq!(x.concat(&y).concat(&z), x.concat(&y.concat(&z)));
        assert_eq!(x.concat(&y), y.concat(&x));
        assert_eq!(x.concat(&Collection::empty()), x);
        assert_eq!(Collection::empty().concat(&x), x);
        assert_eq!(
            x.concat(&y).total_count(),
            x.total_count() + y.total_count()
        );
    }
}

#[test]
fn test_counts_saturate_near_limit() -> eyre::Result<()> {
    let largest = Collection::from_counts(HashMap::from([("x", isize::MAX)]))?;
    let half = Collection::from_counts(HashMap::from([(1, isize::MAX / 2 + 1)]))?;
    let pair = Collection::from_counts(HashMap::from([(2, isize::MAX / 2 + 1)]))?;

    let concatenated = largest.concat(&Collection::singleton("x"));
    assert_eq!(concatenated.count("x"), isize::MAX);

    let merged = half.concat(&pair).map(|_| "merged");
    assert_eq!(merged.count("merged"), isize::MAX);

    let scaled = half.flat_map(|&element| Collection::from([element, element]));
    assert_eq!(scaled.count(&1), isize::MAX);

    let joined = half.join(&Collection::from([1, 1]), |&a| a, |&b| b, |_, _| "r");
    assert_eq!(joined.count("r"), isize::MAX);

    for collection in [&concatenated, &merged, &joined] {
        assert!(collection.iter().all(|(_, count)| count > 0));
        assert!(!collection.is_empty());
    }
    assert!(scaled.iter().all(|(_, count)| count > 0));
    assert_eq!(scaled.to_set(), HashSet::from([1]));
    Ok(())
}

#[test]
fn test_construction_order_irrelevant() {
    let forward: Collection<i32> = [3, 1, 2, 3, 3, 1].into_iter().collect();
    let backward: Collection<i32> = [1, 3, 3, 2, 1, 3].into_iter().collect();
    assert_eq!(forward, backward);
    assert_eq!(forward.count(&3), 3);
}

#[test]
fn test_map_preserves_total_count() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
        let source = random_collection(&mut rng, 30, 20);
        assert_eq!(source.map(|x| x % 3).total_count(), source.total_count());
        assert_eq!(source.map(|_| ()).total_count(), source.total_count());
        assert_eq!(source.map(|x| x * 2).size(), source.size());
    }
}

#[test]
fn test_map_sums_colliding_images() {
    let numbers = Collection::from([1, 2, 3, 4, 4]);
    let parities = numbers.map(|x| x % 2);
    assert_eq!(parities.count(&0), 3);
    assert_eq!(parities.count(&1), 2);
    assert_eq!(parities.size(), 2);
}

#[test]
fn test_filter_keeps_counts() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..50 {
        let source = random_collection(&mut rng, 30, 10);
        let even = source.filter(|x| x % 2 == 0);
        for element in 0..10 {
            let expected = if element % 2 == 0 {
                source.count(&element)
            } else {
                0
            };
            assert_eq!(even.count(&element), expected);
        }
        assert!(even.total_count() <= source.total_count());
    }
}

#[test]
fn test_distinct() {
    let mut rng = StdRng::seed_from_u64(13);
    for _ in 0..50 {
        let source = random_collection(&mut rng, 30, 10);
        let distinct = source.distinct();
        assert!(distinct.iter().all(|(_, count)| count == 1));
        assert_eq!(distinct.size(), source.to_set().len());
        assert_eq!(distinct.total_count(), i128::try_from(distinct.size()).unwrap());
        assert_eq!(distinct.to_set(), source.to_set());
    }
}

#[test]
fn test_flat_map_multiplies_counts() {
    let source = Collection::from(["ab", "ab", "b"]);
    let letters = source.flat_map(|word| word.chars().collect::<Collection<char>>());
    assert_eq!(letters.count(&'a'), 2);
    assert_eq!(letters.count(&'b'), 3);
    assert_eq!(letters.total_count(), 5);

    let scaled = Collection::from([1, 1, 1]).flat_map(|x| Collection::from([*x, *x]));
    assert_eq!(scaled.count(&1), 6);
}

#[test]
fn test_conversions() {
    let source = Collection::from(["a", "b", "a", "c", "a"]);

    let mut list = source.to_list();
    list.sort_unstable();
    assert_eq!(list, vec!["a", "a", "a", "b", "c"]);

    assert_eq!(source.to_set(), HashSet::from(["a", "b", "c"]));
    assert_eq!(
        source.to_multiplicity_map(),
        HashMap::from([("a", 3), ("b", 1), ("c", 1)])
    );

    let mut entries: Vec<_> = source.iter().map(|(e, c)| (*e, c)).collect();
    entries.sort_unstable();
    let mut again: Vec<_> = (&source).into_iter().map(|(e, c)| (*e, c)).collect();
    again.sort_unstable();
    assert_eq!(entries, vec![("a", 3), ("b", 1), ("c", 1)]);
    assert_eq!(entries, again);
}

#[test]
fn test_from_changes() {
    let collection = Collection::from_changes([
        Change::insert("apple"),
        Change::insert("apple"),
        Change::insert("banana"),
        Change::remove("apple"),
        Change::new("banana", 0),
    ]);
    assert_eq!(collection.count("apple"), 1);
    assert_eq!(collection.count("banana"), 1);
}

#[test]
fn test_from_changes_keeps_last_occurrence() {
    // removing the only occurrence leaves it in place
    let collection = Collection::from_changes([Change::insert("x"), Change::remove("x")]);
    assert_eq!(collection, Collection::singleton("x"));

    let collection = Collection::from_changes([
        Change::insert("x"),
        Change::insert("x"),
        Change::remove("x"),
        Change::remove("x"),
        Change::remove("x"),
    ]);
    assert_eq!(collection.count("x"), 1);

    let absent = Collection::from_changes([Change::remove("y")]);
    assert!(absent.is_empty());
}

#[test]
fn test_from_changes_ignores_magnitude() {
    let collection = Collection::from_changes([
        Change::new("x", 5),
        Change::new("x", 2),
        Change::new("x", 3),
        Change::new("x", -4),
    ]);
    assert_eq!(collection.count("x"), 2);
}

#[test]
fn test_equal_collections_hash_equal() {
    let mut left = HashSet::new();
    left.insert(Collection::from(["x", "y", "x"]));
    left.insert(Collection::singleton("z"));

    assert!(left.contains(&Collection::from(["y", "x", "x"])));
    assert!(left.contains(&Collection::from_counts(HashMap::from([("z", 1)])).unwrap()));
    assert!(!left.contains(&Collection::from(["x", "y"])));
}

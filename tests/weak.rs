use pretty_assertions::assert_eq;
use proptest::prelude::*;
use wabi_sorted::{
    BuildError, ComparisonError, IndexError, IterSource, NotFound, Tracked, WeakSortedSequence, WeakSortedUniqueSet,
    resolve_rank,
};

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 1_000;

/// How many owners the randomized tests juggle.
const OWNERS: usize = 64;

fn live_values<T: Copy>(iter: impl Iterator<Item = Tracked<T>>) -> Vec<T> {
    iter.map(|value| *value).collect()
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum WeakOp {
    /// Gives owner slot `idx` a fresh tracked value and adds it.
    Track(usize, i32),
    /// Adds the value already held by owner slot `idx`, if any.
    AddAgain(usize),
    /// Drops the owner in slot `idx`.
    Release(usize),
    Discard(i32),
    Count(i32),
    RankOf(i32),
    Get(isize),
}

fn weak_op_strategy() -> impl Strategy<Value = WeakOp> {
    prop_oneof![
        5 => (0..OWNERS, -30i32..30).prop_map(|(idx, v)| WeakOp::Track(idx, v)),
        1 => (0..OWNERS).prop_map(WeakOp::AddAgain),
        4 => (0..OWNERS).prop_map(WeakOp::Release),
        2 => (-30i32..30).prop_map(WeakOp::Discard),
        1 => (-30i32..30).prop_map(WeakOp::Count),
        1 => (-30i32..30).prop_map(WeakOp::RankOf),
        1 => (-40isize..40).prop_map(WeakOp::Get),
    ]
}

/// Model entry: which owner an entry came from, and its value.
///
/// The model must never hold a `Tracked` itself, or it would keep values alive.
#[derive(Debug, Clone, Copy)]
struct Entry {
    serial: u64,
    value: i32,
}

type Owners = Vec<Option<(u64, Tracked<i32>)>>;

fn retain_live(model: &mut Vec<Entry>, owners: &Owners) {
    model.retain(|entry| owners.iter().flatten().any(|(serial, _)| *serial == entry.serial));
}

/// Values of the model entries in container order: ascending, ties by insertion.
fn expected_view(model: &[Entry]) -> Vec<i32> {
    let mut view: Vec<i32> = model.iter().map(|entry| entry.value).collect();
    view.sort(); // stable
    view
}

/// Removes the model entry that sits at `rank` of the expected view.
fn remove_model_rank(model: &mut Vec<Entry>, rank: usize) {
    let mut order: Vec<usize> = (0..model.len()).collect();
    order.sort_by_key(|&i| model[i].value);
    model.remove(order[rank]);
}

// ─── Liveness model ──────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays random adds, drops and lookups on a `WeakSortedSequence` and a
    /// model that only keeps entries whose owners are still held.
    #[test]
    fn weak_seq_tracks_live_owners(ops in proptest::collection::vec(weak_op_strategy(), TEST_SIZE)) {
        let mut seq = WeakSortedSequence::new();
        let mut owners: Owners = vec![None; OWNERS];
        let mut next_serial = 0u64;
        let mut model: Vec<Entry> = Vec::new();

        for op in &ops {
            match *op {
                WeakOp::Track(idx, v) => {
                    let owner = Tracked::new(v);
                    seq.add(&owner).unwrap();
                    model.push(Entry { serial: next_serial, value: v });
                    owners[idx] = Some((next_serial, owner));
                    next_serial += 1;
                    retain_live(&mut model, &owners);
                }
                WeakOp::AddAgain(idx) => {
                    if let Some((serial, owner)) = &owners[idx] {
                        seq.add(owner).unwrap();
                        model.push(Entry { serial: *serial, value: **owner });
                    }
                }
                WeakOp::Release(idx) => {
                    owners[idx] = None;
                    retain_live(&mut model, &owners);
                }
                WeakOp::Discard(v) => {
                    let view = expected_view(&model);
                    let rank = view.iter().position(|e| *e == v);
                    if let Some(rank) = rank {
                        remove_model_rank(&mut model, rank);
                    }
                    prop_assert_eq!(seq.discard(&v), rank.is_some(), "discard({})", v);
                }
                WeakOp::Count(v) => {
                    let expected = expected_view(&model).iter().filter(|e| **e == v).count();
                    prop_assert_eq!(seq.count(&v), expected, "count({})", v);
                }
                WeakOp::RankOf(v) => {
                    let expected = expected_view(&model).iter().position(|e| *e == v).ok_or(NotFound);
                    prop_assert_eq!(seq.rank_of(&v), expected, "rank_of({})", v);
                }
                WeakOp::Get(rank) => {
                    let view = expected_view(&model);
                    let expected = resolve_rank(rank, view.len()).map(|r| view[r]);
                    prop_assert_eq!(seq.get(rank).map(|v| *v), expected, "get({})", rank);
                }
            }
            prop_assert_eq!(seq.len(), model.len());
        }

        let view = expected_view(&model);
        prop_assert_eq!(live_values(seq.iter()), view.clone());
        let mut reversed = view;
        reversed.reverse();
        prop_assert_eq!(live_values(seq.iter_descending()), reversed);
    }
}

// ─── Concrete scenarios ──────────────────────────────────────────────────────

#[test]
fn survivors_define_the_view() {
    let owners: Vec<Tracked<i32>> = (0..10).map(Tracked::new).collect();
    let mut seq = WeakSortedSequence::new();
    for owner in &owners {
        seq.add(owner).unwrap();
    }
    let survivors: Vec<Tracked<i32>> = owners.into_iter().filter(|o| [0, 2, 5, 7, 9].contains(&**o)).collect();

    assert_eq!(seq.len(), 5);
    assert_eq!(live_values(seq.iter()), [0, 2, 5, 7, 9]);
    assert_eq!(seq.get(2).map(|v| *v), Ok(5));
    assert_eq!(seq.get(-1).map(|v| *v), Ok(9));
    assert_eq!(seq.get(5).map(|v| *v), Err(IndexError { rank: 5, len: 5 }));
    assert_eq!(seq.rank_of(&5), Ok(2));
    assert!(seq.contains(&7));
    assert!(!seq.contains(&3));
    assert_eq!(seq.count(&3), 0);
    assert_eq!(seq.rank_of(&3), Err(NotFound));

    drop(survivors);
    assert!(seq.is_empty());
}

#[test]
fn explicit_reclaim_reports_excisions() {
    let keep = Tracked::new("keep");
    let lose = Tracked::new("lose");
    let mut set = WeakSortedUniqueSet::new();
    set.add(&keep).unwrap();
    set.add(&lose).unwrap();

    drop(lose);
    assert_eq!(set.reclaim(), 1);
    assert_eq!(set.reclaim(), 0);
    assert_eq!(live_values(set.iter()), ["keep"]);
}

#[test]
fn weak_set_rejects_live_duplicates_only() {
    let mut set = WeakSortedUniqueSet::new();
    let a = Tracked::new(5);
    let b = Tracked::new(5);
    assert_eq!(set.add(&a), Ok(true));
    assert_eq!(set.add(&b), Ok(false));
    assert_eq!(set.add(&a), Ok(false));
    assert_eq!(set.len(), 1);
    assert_eq!(set.count(&5), 1);

    drop(a);
    assert_eq!(set.count(&5), 0);
    assert_eq!(set.add(&b), Ok(true));
    assert_eq!(set.rank_of(&5), Ok(0));
}

#[test]
fn weak_comparator_failure_asymmetry() {
    let one = Tracked::new(1.0);
    let nan = Tracked::new(f64::NAN);
    let mut seq = WeakSortedSequence::new();
    seq.add(&one).unwrap();

    assert_eq!(seq.add(&nan), Err(ComparisonError::Incomparable));
    assert!(!seq.contains(&f64::NAN));
    assert_eq!(seq.count(&f64::NAN), 0);
    assert!(!seq.discard(&f64::NAN));
    assert_eq!(seq.rank_of(&f64::NAN), Err(NotFound));
    assert_eq!(seq.len(), 1);
}

#[test]
fn removal_hands_back_the_value() {
    let owners: Vec<Tracked<char>> = "dbca".chars().map(Tracked::new).collect();
    let mut seq = WeakSortedSequence::from_source(owners.clone()).unwrap();

    let removed = seq.remove(&'b').unwrap();
    assert!(Tracked::ptr_eq(&removed, &owners[1]));
    drop(removed);
    assert_eq!(seq.pop(0).map(|v| *v), Ok('a'));
    assert_eq!(seq.first().map(|v| *v), Some('c'));
    assert_eq!(seq.last().map(|v| *v), Some('d'));
    assert_eq!(seq.remove(&'z'), Err(NotFound));

    seq.clear();
    assert!(seq.is_empty());
    assert_eq!(owners.iter().map(|o| Tracked::handle_count(o)).collect::<Vec<_>>(), [1, 1, 1, 1]);
}

#[test]
fn weak_sources() {
    let owners: Vec<Tracked<u8>> = [3, 1, 2].into_iter().map(Tracked::new).collect();
    let mut from_vec = WeakSortedUniqueSet::from_source(owners.clone()).unwrap();
    let mut from_iter = WeakSortedUniqueSet::from_source(IterSource::new(owners.iter().cloned())).unwrap();
    assert_eq!(live_values(from_vec.iter()), [1, 2, 3]);
    assert_eq!(live_values(from_iter.iter()), [1, 2, 3]);

    let nan = vec![Tracked::new(f32::NAN), Tracked::new(0.0)];
    let built = WeakSortedSequence::from_source(nan);
    assert!(matches!(built, Err(BuildError::Comparison(ComparisonError::Incomparable))));
}

#[test]
fn values_dropped_during_iteration_are_skipped() {
    let mut owners: Vec<Option<Tracked<i32>>> = (0..6).map(|v| Some(Tracked::new(v))).collect();
    let mut seq = WeakSortedSequence::new();
    for owner in owners.iter().flatten() {
        seq.add(owner).unwrap();
    }

    let mut seen = Vec::new();
    for value in seq.iter() {
        seen.push(*value);
        // Drop the next two values while the walk is in progress.
        if *value == 1 {
            owners[2] = None;
            owners[3] = None;
        }
    }
    assert_eq!(seen, [0, 1, 4, 5]);
    assert_eq!(seq.len(), 4);
}

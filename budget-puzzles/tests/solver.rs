use budget_puzzles::{knapsack::totals, solve, Instance, Item};
use proptest::prelude::*;

fn items(pairs: &[(u32, u32)]) -> Vec<Item> {
    pairs.iter().cloned().map(Item::from).collect()
}

/// Exhaustive search returning the optimum and how many subsets reach it.
fn brute_force(items: &[Item], capacity: u32) -> (u64, u64) {
    let mut best = 0u64;
    let mut count = 0u64;
    for mask in 0u32..(1 << items.len()) {
        let indices: Vec<usize> = (0..items.len()).filter(|i| mask & (1 << i) != 0).collect();
        let (cost, ret) = totals(items, &indices);
        if cost > capacity as u64 {
            continue;
        }
        if ret > best {
            best = ret;
            count = 1;
        } else if ret == best {
            count += 1;
        }
    }
    (best, count)
}

#[test]
fn test_both_items_fit() {
    let optimum = solve(&items(&[(60000, 90000), (70000, 95000)]), 150000);
    assert_eq!(optimum.max_return, 185000);
    assert_eq!(optimum.solution_count, 1);
    assert_eq!(optimum.selected_indices, vec![0, 1]);
}

#[test]
fn test_only_one_item_fits() {
    let optimum = solve(&items(&[(60000, 90000), (70000, 95000)]), 100000);
    assert_eq!(optimum.max_return, 95000);
    assert_eq!(optimum.solution_count, 1);
    assert_eq!(optimum.selected_indices, vec![1]);
}

#[test]
fn test_empty_items() {
    let optimum = solve(&[], 150000);
    assert_eq!(optimum.max_return, 0);
    assert_eq!(optimum.solution_count, 1);
    assert!(optimum.selected_indices.is_empty());
}

#[test]
fn test_zero_capacity() {
    let optimum = solve(&items(&[(1, 10), (2, 20)]), 0);
    assert_eq!(optimum.max_return, 0);
    assert_eq!(optimum.solution_count, 1);
    assert!(optimum.selected_indices.is_empty());
}

#[test]
fn test_nothing_fits() {
    let optimum = solve(&items(&[(5, 1), (7, 3)]), 4);
    assert_eq!(optimum.max_return, 0);
    assert_eq!(optimum.solution_count, 1);
    assert!(optimum.selected_indices.is_empty());
}

#[test]
fn test_identical_items_tie() {
    let optimum = solve(&items(&[(10, 5), (10, 5)]), 10);
    assert_eq!(optimum.max_return, 5);
    assert_eq!(optimum.solution_count, 2);
    // The later item is left out when skipping it explains the optimum.
    assert_eq!(optimum.selected_indices, vec![0]);
}

#[test]
fn test_different_subsets_tie() {
    // {0} and {1, 2} both cost 3 and return 4.
    let optimum = solve(&items(&[(3, 4), (2, 2), (1, 2)]), 3);
    assert_eq!(optimum.max_return, 4);
    assert_eq!(optimum.solution_count, 2);
    assert_eq!(optimum.selected_indices, vec![0]);
}

#[test]
fn test_count_spans_all_optimal_subsets() {
    // Any 2 of 4 identical items.
    let optimum = solve(&items(&[(4, 7); 4]), 9);
    assert_eq!(optimum.max_return, 14);
    assert_eq!(optimum.solution_count, 6);
    assert_eq!(optimum.selected_indices.len(), 2);
}

#[test]
fn test_instance_solve_matches_free_function() {
    let instance = Instance {
        items: items(&[(30, 50), (20, 40), (25, 45), (40, 70)]),
        capacity: 60,
    };
    assert_eq!(instance.solve(), solve(&instance.items, instance.capacity));
    assert_eq!(instance.solve().max_return, 110);
    assert_eq!(instance.solve().selected_indices, vec![1, 3]);
}

#[test]
fn test_instance_validate() {
    let mut instance = Instance {
        items: items(&[(30, 50)]),
        capacity: 60,
    };
    assert!(instance.validate().is_ok());
    instance.items.push(Item::from((0, 10)));
    assert!(instance.validate().is_err());
    instance.items.pop();
    instance.capacity = 0;
    assert!(instance.validate().is_err());
}

proptest! {
    #[test]
    fn prop_solve_matches_brute_force(
        pairs in prop::collection::vec((1u32..=30, 1u32..=30), 0..=9),
        capacity in 0u32..=120,
    ) {
        let items = items(&pairs);
        let optimum = solve(&items, capacity);
        let (best, count) = brute_force(&items, capacity);
        prop_assert_eq!(optimum.max_return, best);
        prop_assert_eq!(optimum.solution_count, count);

        let (cost, ret) = totals(&items, &optimum.selected_indices);
        prop_assert!(cost <= capacity as u64);
        prop_assert_eq!(ret, optimum.max_return);
        prop_assert!(optimum.selected_indices.windows(2).all(|w| w[0] < w[1]));
    }
}

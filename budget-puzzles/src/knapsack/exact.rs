use super::Item;
use serde::{Deserialize, Serialize};

/// Result of an exact solve: the optimum, how many subsets reach it, and one canonical subset.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Optimum {
    pub max_return: u64,
    pub solution_count: u64,
    pub selected_indices: Vec<usize>,
}

/// Solves the 0/1 knapsack exactly, counting every subset that reaches the optimum.
///
/// Cells hold `(best_return, num_subsets)` for a prefix of the items at a given remaining
/// capacity. Only the previous and current rows are kept; whether an item strictly improved a
/// cell is recorded in a bitset so the canonical subset can be recovered afterwards. When the
/// skip path explains a cell's value, backtracking leaves the item out.
///
/// Runs in `O(items.len() * capacity)` time. Total for any input: an empty item list yields
/// `max_return = 0` with the empty subset counted once.
pub fn solve(items: &[Item], capacity: u32) -> Optimum {
    let width = capacity as usize + 1;

    // The empty subset is the single way to reach a return of 0 at every capacity.
    let mut prev_return = vec![0u64; width];
    let mut prev_count = vec![1u64; width];
    let mut curr_return = vec![0u64; width];
    let mut curr_count = vec![0u64; width];
    let mut taken = TakenBits::new(items.len(), width);

    for (i, item) in items.iter().enumerate() {
        let cost = item.cost as usize;
        let investment_return = item.investment_return as u64;
        for w in 0..width {
            let skip_return = prev_return[w];
            let skip_count = prev_count[w];
            if cost <= w {
                let take_return = investment_return + prev_return[w - cost];
                let take_count = prev_count[w - cost];
                if take_return > skip_return {
                    curr_return[w] = take_return;
                    curr_count[w] = take_count;
                    taken.set(i, w);
                    continue;
                }
                if take_return == skip_return {
                    curr_return[w] = skip_return;
                    curr_count[w] = skip_count.saturating_add(take_count);
                    continue;
                }
            }
            curr_return[w] = skip_return;
            curr_count[w] = skip_count;
        }
        std::mem::swap(&mut prev_return, &mut curr_return);
        std::mem::swap(&mut prev_count, &mut curr_count);
    }

    let max_return = prev_return[capacity as usize];
    let solution_count = prev_count[capacity as usize];

    let mut selected_indices = Vec::new();
    let mut w = capacity as usize;
    for i in (0..items.len()).rev() {
        if taken.get(i, w) {
            selected_indices.push(i);
            w -= items[i].cost as usize;
        }
    }
    selected_indices.reverse();

    Optimum {
        max_return,
        solution_count,
        selected_indices,
    }
}

/// One bit per `(item, capacity)` cell, set when taking the item strictly beat skipping it.
struct TakenBits {
    width: usize,
    words: Vec<u64>,
}

impl TakenBits {
    fn new(rows: usize, width: usize) -> Self {
        Self {
            width,
            words: vec![0; (rows * width + 63) / 64],
        }
    }

    fn set(&mut self, row: usize, col: usize) {
        let bit = row * self.width + col;
        self.words[bit / 64] |= 1u64 << (bit % 64);
    }

    fn get(&self, row: usize, col: usize) -> bool {
        let bit = row * self.width + col;
        self.words[bit / 64] & (1u64 << (bit % 64)) != 0
    }
}

/// Sum of costs and returns over `indices`.
pub fn totals(items: &[Item], indices: &[usize]) -> (u64, u64) {
    indices.iter().fold((0, 0), |(cost, ret), &i| {
        (
            cost + items[i].cost as u64,
            ret + items[i].investment_return as u64,
        )
    })
}

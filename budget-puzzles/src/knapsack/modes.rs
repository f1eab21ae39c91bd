use super::{exact, GeneratorConfig, Instance, Item, Mode, Solution};
use crate::GenerateError;
use rand::Rng;
use std::{collections::HashSet, ops::RangeInclusive};
use tracing::{debug, trace, warn};

/// Returns in the `random` and `trivial` modes are drawn from
/// `[capacity / 2, capacity / 2 + RETURN_SPREAD]`, keeping cost the binding constraint.
pub const RETURN_SPREAD: u32 = 40_000;

struct Bounds {
    cost: RangeInclusive<u32>,
    investment_return: RangeInclusive<u32>,
}

fn invalid(msg: String) -> GenerateError {
    GenerateError::InvalidConfig(msg)
}

fn spread_returns(capacity: u32) -> RangeInclusive<u32> {
    (capacity / 2).max(1)..=capacity / 2 + RETURN_SPREAD
}

fn random_bounds(num_items: usize, capacity: u32) -> Result<Bounds, GenerateError> {
    // Costs never exceed capacity / 2, so with fewer than 3 items every draw fits.
    if num_items < 3 {
        return Err(invalid(format!(
            "random mode needs at least 3 items, got {}",
            num_items
        )));
    }
    let min_cost = (capacity as u64 / (2 * num_items as u64)).max(1) as u32;
    let max_cost = capacity / 2;
    if min_cost > max_cost {
        return Err(invalid(format!(
            "capacity {} is too small for random mode",
            capacity
        )));
    }
    Ok(Bounds {
        cost: min_cost..=max_cost,
        investment_return: spread_returns(capacity),
    })
}

fn trivial_bounds(num_items: usize, capacity: u32) -> Result<Bounds, GenerateError> {
    let min_cost = (capacity as u64 / (2 * num_items as u64)).max(1) as u32;
    let max_cost = (capacity as u64 / num_items as u64) as u32;
    if min_cost > max_cost {
        return Err(invalid(format!(
            "capacity {} cannot hold {} items of positive cost",
            capacity, num_items
        )));
    }
    Ok(Bounds {
        cost: min_cost..=max_cost,
        investment_return: spread_returns(capacity),
    })
}

fn single_item_bounds(num_items: usize, capacity: u32) -> Result<Bounds, GenerateError> {
    // Any two costs above capacity / 2 overflow the capacity together.
    let min_cost = capacity / 2 + 1;
    let max_cost = capacity;
    // Returns must be pairwise distinct, so the range needs room for every item.
    if (max_cost as u64 + 1) < num_items as u64 {
        return Err(invalid(format!(
            "capacity {} leaves too few distinct returns for {} items",
            capacity, num_items
        )));
    }
    Ok(Bounds {
        cost: min_cost..=max_cost,
        investment_return: max_cost..=2 * max_cost,
    })
}

fn uniform_cost(capacity: u32, items_in_solution: usize) -> Result<u32, GenerateError> {
    let k = items_in_solution as u64;
    // k items fit and k + 1 never do.
    let cost = capacity as u64 / (k + 1) + 1;
    if k * cost > capacity as u64 {
        return Err(invalid(format!(
            "capacity {} is too small to fit {} items of cost {}",
            capacity, items_in_solution, cost
        )));
    }
    Ok(cost as u32)
}

pub(super) fn check_bounds(config: &GeneratorConfig) -> Result<(), GenerateError> {
    match config.mode {
        Mode::Random => random_bounds(config.num_items, config.capacity).map(|_| ()),
        Mode::Trivial => trivial_bounds(config.num_items, config.capacity).map(|_| ()),
        Mode::SingleItem => single_item_bounds(config.num_items, config.capacity).map(|_| ()),
        Mode::SingleItemUniform | Mode::NItems => {
            uniform_cost(config.capacity, config.uniform_items_in_solution()?).map(|_| ())
        }
    }
}

fn draw_items<R: Rng + ?Sized>(rng: &mut R, num_items: usize, bounds: &Bounds) -> Vec<Item> {
    (0..num_items)
        .map(|_| Item {
            cost: rng.gen_range(bounds.cost.clone()),
            investment_return: rng.gen_range(bounds.investment_return.clone()),
        })
        .collect()
}

pub(super) fn random<R: Rng + ?Sized>(
    rng: &mut R,
    config: &GeneratorConfig,
) -> Result<(Instance, Solution), GenerateError> {
    let bounds = random_bounds(config.num_items, config.capacity)?;
    for attempt in 1..=config.max_attempts {
        let items = draw_items(rng, config.num_items, &bounds);

        let total_cost: u64 = items.iter().map(|item| item.cost as u64).sum();
        if total_cost <= config.capacity as u64 {
            trace!(attempt, total_cost, "rejected draw: every item fits");
            continue;
        }

        let optimum = exact::solve(&items, config.capacity);
        if optimum.solution_count > 1 {
            trace!(
                attempt,
                solution_count = optimum.solution_count,
                "rejected draw: optimal selection is not unique"
            );
            continue;
        }

        debug!(attempt, "accepted random draw");
        return Ok((
            Instance {
                items,
                capacity: config.capacity,
            },
            Solution {
                max_return: optimum.max_return,
                solution_count: optimum.solution_count,
                selected_indices: Some(optimum.selected_indices),
            },
        ));
    }
    warn!(
        attempts = config.max_attempts,
        num_items = config.num_items,
        capacity = config.capacity,
        "random generation exhausted"
    );
    Err(GenerateError::GenerationExhausted {
        attempts: config.max_attempts,
    })
}

pub(super) fn trivial<R: Rng + ?Sized>(
    rng: &mut R,
    config: &GeneratorConfig,
) -> Result<(Instance, Solution), GenerateError> {
    let bounds = trivial_bounds(config.num_items, config.capacity)?;
    let items = draw_items(rng, config.num_items, &bounds);
    let max_return = items
        .iter()
        .map(|item| item.investment_return as u64)
        .sum();
    Ok((
        Instance {
            items,
            capacity: config.capacity,
        },
        Solution {
            max_return,
            solution_count: 1,
            selected_indices: Some((0..config.num_items).collect()),
        },
    ))
}

pub(super) fn single_item<R: Rng + ?Sized>(
    rng: &mut R,
    config: &GeneratorConfig,
) -> Result<(Instance, Solution), GenerateError> {
    let bounds = single_item_bounds(config.num_items, config.capacity)?;
    let mut items: Vec<Item> = Vec::with_capacity(config.num_items);
    let mut seen = HashSet::with_capacity(config.num_items);
    let mut best = 0;
    for i in 0..config.num_items {
        let cost = rng.gen_range(bounds.cost.clone());
        let mut investment_return = rng.gen_range(bounds.investment_return.clone());
        while !seen.insert(investment_return) {
            investment_return = rng.gen_range(bounds.investment_return.clone());
        }
        if i > 0 && investment_return > items[best].investment_return {
            best = i;
        }
        items.push(Item {
            cost,
            investment_return,
        });
    }
    let solution = Solution {
        max_return: items[best].investment_return as u64,
        solution_count: 1,
        selected_indices: Some(vec![best]),
    };
    Ok((
        Instance {
            items,
            capacity: config.capacity,
        },
        solution,
    ))
}

pub(super) fn uniform(
    config: &GeneratorConfig,
    items_in_solution: usize,
) -> Result<(Instance, Solution), GenerateError> {
    let cost = uniform_cost(config.capacity, items_in_solution)?;
    let item = Item {
        cost,
        investment_return: config.default_return,
    };
    Ok((
        Instance {
            items: vec![item; config.num_items],
            capacity: config.capacity,
        },
        Solution {
            max_return: config.default_return as u64 * items_in_solution as u64,
            solution_count: binomial(config.num_items, items_in_solution),
            selected_indices: None,
        },
    ))
}

/// `n choose k`, saturating at `u64::MAX`.
fn binomial(n: usize, k: usize) -> u64 {
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 0..k as u128 {
        acc = match acc.checked_mul(n as u128 - i) {
            Some(v) => v / (i + 1),
            None => return u64::MAX,
        };
    }
    acc.min(u64::MAX as u128) as u64
}

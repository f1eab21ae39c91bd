mod exact;
mod modes;
pub use exact::{solve, totals, Optimum};
pub use modes::RETURN_SPREAD;

use crate::GenerateError;
use anyhow::{anyhow, Result};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::{from_value, Map, Value};
use std::{collections::HashSet, fmt, str::FromStr};
use tracing::debug;

/// Largest capacity accepted for generation and validated instances. The solver allocates a
/// dense table per unit of capacity, so this bounds memory and keeps drawn returns in `u32`.
pub const MAX_CAPACITY: u32 = 4_000_000;

/// Return shared by every item in the uniform modes unless configured.
pub const DEFAULT_RETURN: u32 = 100_000;
/// Draw budget for `random` mode unless configured.
pub const DEFAULT_MAX_ATTEMPTS: usize = 1_000;

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Item {
    pub cost: u32,
    #[serde(rename = "return")]
    pub investment_return: u32,
}

impl From<(u32, u32)> for Item {
    fn from((cost, investment_return): (u32, u32)) -> Self {
        Self {
            cost,
            investment_return,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub items: Vec<Item>,
    pub capacity: u32,
}

impl Instance {
    pub fn validate(&self) -> Result<(), GenerateError> {
        if self.capacity == 0 || self.capacity > MAX_CAPACITY {
            return Err(GenerateError::InvalidConfig(format!(
                "capacity must be in [1, {}], got {}",
                MAX_CAPACITY, self.capacity
            )));
        }
        for (i, item) in self.items.iter().enumerate() {
            if item.cost == 0 || item.investment_return == 0 {
                return Err(GenerateError::InvalidConfig(format!(
                    "item {} must have a positive cost and return, got ({}, {})",
                    i, item.cost, item.investment_return
                )));
            }
        }
        Ok(())
    }

    pub fn solve(&self) -> Optimum {
        solve(&self.items, self.capacity)
    }
}

/// Expected answer for a generated instance.
///
/// `selected_indices` is `None` for the uniform modes, where any subset of the right size is
/// optimal and only its cardinality can be checked.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub max_return: u64,
    pub solution_count: u64,
    pub selected_indices: Option<Vec<usize>>,
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub enum Mode {
    Random,
    Trivial,
    SingleItem,
    SingleItemUniform,
    NItems,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::Random,
        Mode::Trivial,
        Mode::SingleItem,
        Mode::SingleItemUniform,
        Mode::NItems,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Random => "random",
            Mode::Trivial => "trivial",
            Mode::SingleItem => "single_item",
            Mode::SingleItemUniform => "single_item_uniform",
            Mode::NItems => "n_items",
        }
    }

    /// Uniform modes make every subset of the right size optimal.
    pub fn is_uniform(&self) -> bool {
        matches!(self, Mode::SingleItemUniform | Mode::NItems)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = GenerateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| GenerateError::UnknownMode(s.to_string()))
    }
}

impl TryFrom<String> for Mode {
    type Error = GenerateError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Mode> for String {
    fn from(mode: Mode) -> Self {
        mode.as_str().to_string()
    }
}

fn default_return() -> u32 {
    DEFAULT_RETURN
}

fn default_max_attempts() -> usize {
    DEFAULT_MAX_ATTEMPTS
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub num_items: usize,
    pub capacity: u32,
    pub mode: Mode,
    /// Size of the optimal subset. Required by `n_items`; `single_item_uniform` implies 1.
    #[serde(default)]
    pub items_in_solution: Option<usize>,
    /// Return shared by every item in the uniform modes.
    #[serde(default = "default_return")]
    pub default_return: u32,
    /// Upper bound on whole-instance draws in `random` mode.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
}

impl GeneratorConfig {
    pub fn new(num_items: usize, capacity: u32, mode: Mode) -> Self {
        Self {
            num_items,
            capacity,
            mode,
            items_in_solution: None,
            default_return: DEFAULT_RETURN,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_items_in_solution(mut self, items_in_solution: usize) -> Self {
        self.items_in_solution = Some(items_in_solution);
        self
    }

    /// Number of items every optimal subset holds in a uniform mode.
    pub fn uniform_items_in_solution(&self) -> Result<usize, GenerateError> {
        let k = match (self.mode, self.items_in_solution) {
            (Mode::SingleItemUniform, None | Some(1)) => 1,
            (Mode::SingleItemUniform, Some(k)) => {
                return Err(GenerateError::InvalidConfig(format!(
                    "single_item_uniform always puts 1 item in the solution, got items_in_solution = {}",
                    k
                )))
            }
            (Mode::NItems, Some(k)) => k,
            (Mode::NItems, None) => {
                return Err(GenerateError::InvalidConfig(
                    "n_items mode requires items_in_solution".to_string(),
                ))
            }
            (mode, _) => {
                return Err(GenerateError::InvalidConfig(format!(
                    "{} mode has no uniform solution size",
                    mode
                )))
            }
        };
        if k == 0 || k >= self.num_items {
            return Err(GenerateError::InvalidConfig(format!(
                "items_in_solution must be in [1, {}), got {}",
                self.num_items, k
            )));
        }
        Ok(k)
    }

    pub fn validate(&self) -> Result<(), GenerateError> {
        if self.num_items == 0 {
            return Err(GenerateError::InvalidConfig(
                "num_items must be positive".to_string(),
            ));
        }
        if self.capacity == 0 || self.capacity > MAX_CAPACITY {
            return Err(GenerateError::InvalidConfig(format!(
                "capacity must be in [1, {}], got {}",
                MAX_CAPACITY, self.capacity
            )));
        }
        match self.mode {
            Mode::Random => {
                if self.max_attempts == 0 {
                    return Err(GenerateError::InvalidConfig(
                        "max_attempts must be positive".to_string(),
                    ));
                }
            }
            Mode::SingleItemUniform | Mode::NItems => {
                if self.default_return == 0 {
                    return Err(GenerateError::InvalidConfig(
                        "default_return must be positive".to_string(),
                    ));
                }
                self.uniform_items_in_solution()?;
            }
            Mode::Trivial | Mode::SingleItem => {}
        }
        if !self.mode.is_uniform() && self.items_in_solution.is_some() {
            return Err(GenerateError::InvalidConfig(format!(
                "items_in_solution does not apply to {} mode",
                self.mode
            )));
        }
        modes::check_bounds(self)
    }
}

/// Draws an instance for `config` from `rng` together with its expected solution.
pub fn generate_with_rng<R: Rng + ?Sized>(
    rng: &mut R,
    config: &GeneratorConfig,
) -> Result<(Instance, Solution), GenerateError> {
    config.validate()?;
    let (instance, solution) = match config.mode {
        Mode::Random => modes::random(rng, config)?,
        Mode::Trivial => modes::trivial(rng, config)?,
        Mode::SingleItem => modes::single_item(rng, config)?,
        Mode::SingleItemUniform | Mode::NItems => {
            modes::uniform(config, config.uniform_items_in_solution()?)?
        }
    };
    debug!(
        mode = %config.mode,
        num_items = instance.items.len(),
        capacity = instance.capacity,
        max_return = solution.max_return,
        "generated instance"
    );
    Ok((instance, solution))
}

/// Generates a puzzle from the raw mode tag, failing on tags it does not know.
pub fn generate_instance(
    seed: u64,
    num_items: usize,
    capacity: u32,
    mode: &str,
    items_in_solution: Option<usize>,
) -> Result<Puzzle, GenerateError> {
    let mut config = GeneratorConfig::new(num_items, capacity, mode.parse()?);
    config.items_in_solution = items_in_solution;
    Puzzle::generate_instance(seed, &config)
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    pub seed: u64,
    pub config: GeneratorConfig,
    pub instance: Instance,
    pub solution: Solution,
}

impl Puzzle {
    pub fn generate_instance(seed: u64, config: &GeneratorConfig) -> Result<Self, GenerateError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let (instance, solution) = generate_with_rng(&mut rng, config)?;
        Ok(Self {
            seed,
            config: config.clone(),
            instance,
            solution,
        })
    }

    /// Checks a submitted selection and returns its total return.
    pub fn verify_selection(&self, selection: &[usize]) -> Result<u64> {
        let unique: HashSet<usize> = selection.iter().cloned().collect();
        if unique.len() != selection.len() {
            return Err(anyhow!("Duplicate items selected."));
        }
        if let Some(&item) = selection.iter().find(|&&i| i >= self.instance.items.len()) {
            return Err(anyhow!("Item ({}) is out of bounds", item));
        }

        let (total_cost, total_return) = totals(&self.instance.items, selection);
        if total_cost > self.instance.capacity as u64 {
            return Err(anyhow!(
                "Total cost ({}) exceeded capacity ({})",
                total_cost,
                self.instance.capacity
            ));
        }
        if total_return != self.solution.max_return {
            return Err(anyhow!(
                "Total return ({}) does not match the optimal return ({})",
                total_return,
                self.solution.max_return
            ));
        }

        match &self.solution.selected_indices {
            Some(expected) => {
                let mut selection = selection.to_vec();
                selection.sort_unstable();
                if &selection != expected {
                    return Err(anyhow!(
                        "Selected items {:?} differ from the optimal selection {:?}",
                        selection,
                        expected
                    ));
                }
            }
            None => {
                let k = self.config.uniform_items_in_solution()?;
                if selection.len() != k {
                    return Err(anyhow!(
                        "Expected {} selected items, got {}",
                        k,
                        selection.len()
                    ));
                }
            }
        }
        Ok(total_return)
    }

    pub fn verify_answer(&self, answer: &Answer) -> Result<()> {
        if answer.selected_indices.is_none() && answer.total_return.is_none() {
            return Err(anyhow!("Answer contains neither a selection nor a total return"));
        }
        if let Some(selection) = &answer.selected_indices {
            self.verify_selection(selection)?;
        }
        if let Some(text) = &answer.total_return {
            let renderings = return_renderings(self.solution.max_return);
            if !renderings.iter().any(|r| contains_number(text, r)) {
                return Err(anyhow!(
                    "Total return '{}' does not state the optimal return ({})",
                    text,
                    self.solution.max_return
                ));
            }
        }
        Ok(())
    }
}

/// A submitted answer. Either part may be omitted, but not both.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Answer {
    #[serde(default)]
    pub selected_indices: Option<Vec<usize>>,
    #[serde(default)]
    pub total_return: Option<String>,
}

impl TryFrom<Map<String, Value>> for Answer {
    type Error = serde_json::Error;

    fn try_from(v: Map<String, Value>) -> Result<Self, Self::Error> {
        from_value(Value::Object(v))
    }
}

/// Textual forms of `value` accepted as a stated total return: plain digits, then with `,`,
/// `, ` and ` ` as thousands separators.
pub fn return_renderings(value: u64) -> Vec<String> {
    let plain = value.to_string();
    let mut renderings = vec![plain.clone()];
    if plain.len() > 3 {
        for sep in [",", ", ", " "] {
            renderings.push(group_thousands(&plain, sep));
        }
    }
    renderings
}

fn group_thousands(digits: &str, sep: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + sep.len() * (digits.len() / 3));
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push_str(sep);
        }
        grouped.push(c);
    }
    grouped
}

// Matches `number` only where it is not part of a longer number. A neighbouring digit or a
// comma-grouped digit extends it; a decimal fraction or a space-separated number does not.
fn contains_number(text: &str, number: &str) -> bool {
    fn extends<I: Iterator<Item = char>>(mut chars: I) -> bool {
        match chars.next() {
            Some(c) if c.is_ascii_digit() => true,
            Some(',') => chars.next().is_some_and(|c| c.is_ascii_digit()),
            _ => false,
        }
    }
    text.match_indices(number).any(|(start, _)| {
        let end = start + number.len();
        !extends(text[..start].chars().rev()) && !extends(text[end..].chars())
    })
}

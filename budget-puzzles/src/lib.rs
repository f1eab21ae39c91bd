mod error;
pub use error::GenerateError;
pub mod knapsack;
pub use knapsack::{
    generate_instance, solve, Answer, GeneratorConfig, Instance, Item, Mode, Optimum, Puzzle,
    Solution,
};

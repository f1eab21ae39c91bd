/// Failures raised while building a puzzle instance.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    #[error("unknown generation mode '{0}' (expected one of random, trivial, single_item, single_item_uniform, n_items)")]
    UnknownMode(String),

    #[error("invalid generator config: {0}")]
    InvalidConfig(String),

    /// The `random` mode could not draw an instance with a unique optimum in time.
    #[error("no instance with a unique optimal selection found after {attempts} attempts")]
    GenerationExhausted { attempts: usize },
}
